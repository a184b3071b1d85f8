//! Mapping from store errors to HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use dispatch_core::ErrorBody;

/// Handler error, rendered as a status code and an `{error}` body.
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Conflict(String),
    /// An outbound call made on the caller's behalf failed.
    BadGateway(String),
    Internal(dispatch_core::Error),
}

impl From<dispatch_core::Error> for ApiError {
    fn from(err: dispatch_core::Error) -> Self {
        use dispatch_core::Error;
        match err {
            Error::NotFound(what) => ApiError::NotFound(format!("{} not found", what)),
            Error::JobNotFound(_) => ApiError::NotFound("Job not found".to_string()),
            Error::TruckNotFound(_) => ApiError::NotFound("Truck not found".to_string()),
            Error::Validation(msg) | Error::InvalidInput(msg) => ApiError::BadRequest(msg),
            Error::Conflict(msg) => ApiError::Conflict(msg),
            other => ApiError::Internal(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::BadGateway(msg) => (StatusCode::BAD_GATEWAY, msg),
            ApiError::Internal(err) => {
                tracing::error!(error = %err, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dispatch_core::Error;

    fn status_of(err: Error) -> StatusCode {
        ApiError::from(err).into_response().status()
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_of(Error::JobNotFound(3)), StatusCode::NOT_FOUND);
        assert_eq!(status_of(Error::NotFound("Item 4".into())), StatusCode::NOT_FOUND);
        assert_eq!(
            status_of(Error::InvalidInput("bad".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(status_of(Error::Validation("bad".into())), StatusCode::BAD_REQUEST);
        assert_eq!(status_of(Error::Conflict("dup".into())), StatusCode::CONFLICT);
        assert_eq!(
            status_of(Error::Internal("boom".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_not_found_messages() {
        match ApiError::from(Error::NotFound("Category 9".into())) {
            ApiError::NotFound(msg) => assert_eq!(msg, "Category 9 not found"),
            other => panic!("unexpected {:?}", other),
        }
        match ApiError::from(Error::JobNotFound(9)) {
            ApiError::NotFound(msg) => assert_eq!(msg, "Job not found"),
            other => panic!("unexpected {:?}", other),
        }
    }
}
