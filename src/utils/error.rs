use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error;
use validator::ValidationErrors;

/// Errors surfaced to API callers.
///
/// Email delivery failures are deliberately absent; they travel on their own
/// channel (`EmailError`) and never reach a response.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Mentor not found")]
    MentorNotFound,
    #[error("Mentor is not available")]
    MentorUnavailable,
    #[error("A mentorship request already exists")]
    DuplicateMentorshipRequest,
    #[error("User not found")]
    UserNotFound,
    #[error("{0}")]
    Unauthorized(String),
    #[error("Validation failed")]
    Validation(#[from] ValidationErrors),
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Database error: {0}")]
    Database(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<mongodb::error::Error> for AppError {
    fn from(err: mongodb::error::Error) -> Self {
        AppError::Database(err.to_string())
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::MentorNotFound
            | AppError::MentorUnavailable
            | AppError::DuplicateMentorshipRequest
            | AppError::Validation(_)
            | AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::UserNotFound | AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();

        match self {
            AppError::Validation(errors) => HttpResponse::build(status).json(serde_json::json!({
                "success": false,
                "error": self.to_string(),
                "details": errors.field_errors(),
            })),
            AppError::Database(_) | AppError::Internal(_) => {
                log::error!("❌ {}", self);
                HttpResponse::build(status).json(serde_json::json!({
                    "success": false,
                    "error": "Internal server error"
                }))
            }
            _ => HttpResponse::build(status).json(serde_json::json!({
                "success": false,
                "error": self.to_string()
            })),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precondition_errors_are_bad_requests() {
        for err in [
            AppError::MentorNotFound,
            AppError::MentorUnavailable,
            AppError::DuplicateMentorshipRequest,
        ] {
            assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn test_precondition_messages() {
        assert_eq!(AppError::MentorNotFound.to_string(), "Mentor not found");
        assert_eq!(AppError::MentorUnavailable.to_string(), "Mentor is not available");
        assert_eq!(
            AppError::DuplicateMentorshipRequest.to_string(),
            "A mentorship request already exists"
        );
    }

    async fn body_of(err: &AppError) -> serde_json::Value {
        let bytes = actix_web::body::to_bytes(err.error_response().into_body())
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[actix_web::test]
    async fn test_internal_errors_hide_details() {
        for err in [
            AppError::Database("connection reset".to_string()),
            AppError::Internal("token signing key missing".to_string()),
        ] {
            assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(
                body_of(&err).await,
                serde_json::json!({ "success": false, "error": "Internal server error" })
            );
        }
        assert_eq!(AppError::UserNotFound.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn test_client_errors_carry_message() {
        let body = body_of(&AppError::MentorUnavailable).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Mentor is not available");
    }
}
