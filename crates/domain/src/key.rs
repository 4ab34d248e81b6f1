use sha2::{Digest, Sha256};

/// Retraction secret handed to the commenter exactly once, at creation time.
///
/// The hex SHA-256 of the secret is the marker key embedded in the source
/// document. Only the secret itself ever leaves the server; the key can be
/// derived from it but not the other way around.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentSecret(String);

impl CommentSecret {
    pub fn generate() -> Self {
        Self(format!("{:x}", rand::random::<u128>()))
    }

    /// Wrap a secret presented back by a client (from a status token).
    pub fn from_raw(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    /// One-way marker key derived from the secret.
    pub fn key(&self) -> String {
        hex::encode(Sha256::digest(self.0.as_bytes()))
    }
}
