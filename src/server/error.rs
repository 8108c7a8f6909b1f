//! Service-level errors and their HTTP mapping.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use super::room::RoomClosed;

/// Errors surfaced synchronously to callers of the orchestration layer.
///
/// Everything here is local to one request: none of these conditions is fatal
/// to the process, and a connection-level transport failure never shows up
/// here (it is contained to that connection's teardown).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ServiceError {
    #[error("room '{0}' not found")]
    RoomNotFound(String),

    #[error("room '{0}' already exists")]
    RoomConflict(String),

    #[error("{0}")]
    Validation(String),

    #[error("room is shutting down")]
    RoomClosed,
}

impl From<RoomClosed> for ServiceError {
    fn from(_: RoomClosed) -> Self {
        ServiceError::RoomClosed
    }
}

impl ServiceError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServiceError::RoomNotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::RoomConflict(_) => StatusCode::CONFLICT,
            ServiceError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ServiceError::RoomClosed => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (self.status(), body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ServiceError::RoomNotFound("r".into()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ServiceError::RoomConflict("r".into()).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ServiceError::Validation("bad".into()).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ServiceError::RoomClosed.status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_messages_name_the_room() {
        assert_eq!(
            ServiceError::RoomNotFound("abc".into()).to_string(),
            "room 'abc' not found"
        );
    }
}
