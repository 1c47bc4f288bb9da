use crate::api::metrics;
use crate::models::{ApplyResponse, MentorshipRequest, NewMentorship};
use crate::services::{AppServices, EmailMessage};
use crate::utils::AppError;

/// Applies the caller (identified by `auth_id`) for mentorship with `mentor_id`.
///
/// Guard order: mentor exists, mentor available, no existing request. The
/// notification email is best-effort; a delivery failure is reported through
/// the error reporter and never undoes the created mentorship.
pub async fn apply_for_mentorship(
    services: &AppServices,
    auth_id: &str,
    mentor_id: &str,
    request: MentorshipRequest,
) -> Result<ApplyResponse, AppError> {
    let current = services
        .users
        .find_by_auth_id(auth_id)
        .await?
        .ok_or(AppError::UserNotFound)?;

    let mentor = services
        .mentors
        .find_by_id(mentor_id)
        .await?
        .ok_or(AppError::MentorNotFound)?;

    if !mentor.available {
        return Err(AppError::MentorUnavailable);
    }

    if services
        .mentorships
        .find_mentorship(&mentor.id, &current.id)
        .await?
        .is_some()
    {
        return Err(AppError::DuplicateMentorshipRequest);
    }

    let message = request.message.clone();
    let created = services
        .mentorships
        .create_mentorship(NewMentorship::from_request(mentor.id, current.id, request))
        .await?;

    log::info!(
        "🤝 Mentorship {} created: mentor={} mentee={}",
        created.id.map(|id| id.to_hex()).unwrap_or_default(),
        mentor.id,
        current.id
    );

    let email = EmailMessage::mentorship_request(&mentor.email, &current.name, &message);
    if let Err(e) = services.email.send(&email).await {
        log::warn!("⚠️  Mentorship request email to {} failed: {}", mentor.email, e);
        metrics::increment_email_failure_count();
        services.errors.capture_exception(&e);
    }

    Ok(ApplyResponse { success: true })
}
