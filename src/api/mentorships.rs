use actix_web::{error::JsonPayloadError, web, HttpRequest, HttpResponse};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::api::metrics;
use crate::middleware::auth::{AuthMiddleware, Claims};
use crate::models::{ApplyResponse, MentorshipRequest};
use crate::services::{mentorship_application, AppServices};
use crate::utils::AppError;

const MAX_BODY_BYTES: usize = 32 * 1024;

const REQUEST_FIELDS: [&str; 3] = ["message", "background", "expectation"];

/// Mounts `/mentorships` behind bearer authentication.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/mentorships")
            .wrap(AuthMiddleware)
            .app_data(json_config())
            .route("/{mentor_id}/apply", web::post().to(apply_for_mentorship)),
    );
}

fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(MAX_BODY_BYTES)
        .error_handler(json_error)
}

/// Well-formed JSON with missing or mistyped fields is a validation failure.
/// Anything else (bad syntax, oversized, wrong content type) is an invalid request.
fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    match err {
        JsonPayloadError::Deserialize(e) if e.is_data() => {
            log::debug!("Rejected mentorship body: {}", e);
            AppError::from(body_field_error(&e.to_string())).into()
        }
        other => {
            log::debug!("Unreadable mentorship body: {}", other);
            AppError::InvalidRequest("Malformed JSON body".to_string()).into()
        }
    }
}

fn body_field_error(detail: &str) -> ValidationErrors {
    let field = REQUEST_FIELDS
        .iter()
        .copied()
        .find(|name| detail.contains(&format!("`{}`", name)))
        .unwrap_or("body");

    let (code, message) = if detail.starts_with("missing field") {
        ("required", format!("{} is required", field))
    } else {
        ("invalid_type", format!("{} has the wrong type", field))
    };

    let mut errors = ValidationErrors::new();
    errors.add(field, ValidationError::new(code).with_message(message.into()));
    errors
}

#[utoipa::path(
    post,
    path = "/mentorships/{mentorId}/apply",
    tag = "Mentorships",
    params(
        ("mentorId" = String, Path, description = "Mentor user id")
    ),
    request_body = MentorshipRequest,
    responses(
        (status = 200, description = "Mentorship request created", body = ApplyResponse),
        (status = 400, description = "Mentor not found, mentor not available, request already exists, or invalid body"),
        (status = 401, description = "Missing or invalid token, or unknown user")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn apply_for_mentorship(
    user: web::ReqData<Claims>,
    path: web::Path<String>,
    body: web::Json<MentorshipRequest>,
    services: web::Data<AppServices>,
) -> Result<HttpResponse, AppError> {
    let mentor_id = path.into_inner();
    log::info!("📝 POST /mentorships/{}/apply - user: {}", mentor_id, user.sub);

    let request = body.into_inner();
    let result = match request.validate() {
        Ok(()) => {
            mentorship_application::apply_for_mentorship(&services, &user.sub, &mentor_id, request)
                .await
        }
        Err(e) => Err(AppError::from(e)),
    };

    match result {
        Ok(response) => {
            metrics::increment_application_count();
            log::info!("✅ Mentorship request sent to mentor {}", mentor_id);
            Ok(HttpResponse::Ok().json(response))
        }
        Err(e) => {
            metrics::increment_application_error_count();
            log::warn!("❌ Mentorship application to {} failed: {}", mentor_id, e);
            Err(e)
        }
    }
}
