use thiserror::Error as ThisError;

pub type Result<T> = std::result::Result<T, Error>;

/// Failure taxonomy shared across the workspace.
#[derive(Debug, ThisError)]
pub enum Error {
    /// Missing or malformed submission fields. Never retried.
    #[error("{0}")]
    Validation(String),

    /// A resolved source path tried to escape the site root. Rejected before
    /// any remote call.
    #[error("source path escapes the site root: {0}")]
    PathTraversal(String),

    /// A referenced pull request or comment marker pair is absent.
    #[error("{0}")]
    NotFound(String),

    /// The forge rejected a write as already existing (HTTP 422). Only
    /// branch creation retries on this.
    #[error("forge conflict: {0}")]
    Conflict(String),

    /// Any other non-2xx forge response or transport failure, with the
    /// upstream status code attached (0 when the request never got one).
    #[error("forge request failed with status {status}: {message}")]
    Remote { status: u16, message: String },

    /// The target document does not have the shape the inserter requires.
    #[error("malformed target document: {0}")]
    Document(String),
}

impl Error {
    /// Classify a non-2xx forge response by its status code.
    pub fn remote(status: u16, message: impl Into<String>) -> Self {
        match status {
            404 => Error::NotFound(message.into()),
            422 => Error::Conflict(message.into()),
            _ => Error::Remote {
                status,
                message: message.into(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_classifies_by_status() {
        assert!(matches!(Error::remote(404, "gone"), Error::NotFound(_)));
        assert!(matches!(Error::remote(422, "exists"), Error::Conflict(_)));
        assert!(matches!(
            Error::remote(503, "down"),
            Error::Remote { status: 503, .. }
        ));
    }
}
