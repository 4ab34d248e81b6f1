use axum::http::StatusCode;
use axum::Json;
use domain::Error;
use serde_json::{json, Value};

/// HTTP rendering of the shared error taxonomy.
pub fn error_response(err: Error) -> (StatusCode, Json<Value>) {
    let status = match &err {
        Error::Validation(_) | Error::PathTraversal(_) => StatusCode::BAD_REQUEST,
        Error::NotFound(_) => StatusCode::NOT_FOUND,
        Error::Conflict(_) | Error::Remote { .. } | Error::Document(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, Json(json!({ "error": err.to_string() })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_taxonomy_to_status_codes() {
        let (status, _) = error_response(Error::Validation("bad".into()));
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = error_response(Error::PathTraversal("../x".into()));
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = error_response(Error::NotFound("gone".into()));
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = error_response(Error::remote(500, "boom"));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

        let (status, _) = error_response(Error::Conflict("stale".into()));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
