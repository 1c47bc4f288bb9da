use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Lifecycle of a mentorship request. Only `New` is produced by the apply flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    New,
    Viewed,
    Approved,
    Rejected,
    Cancelled,
    Terminated,
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Status::New => "NEW",
            Status::Viewed => "VIEWED",
            Status::Approved => "APPROVED",
            Status::Rejected => "REJECTED",
            Status::Cancelled => "CANCELLED",
            Status::Terminated => "TERMINATED",
        };
        write!(f, "{}", s)
    }
}

/// Mentorship document (collection `mentorships`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mentorship {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    /// Mentor `_id` in `users`
    pub mentor: ObjectId,

    /// Mentee `_id` in `users`
    pub mentee: ObjectId,

    pub status: Status,

    /// Applicant's message to the mentor
    pub message: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expectation: Option<String>,

    /// Unix timestamp
    pub created_at: i64,

    pub updated_at: i64,
}

/// Fields handed to the store when creating a mentorship.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMentorship {
    pub mentor: ObjectId,
    pub mentee: ObjectId,
    pub status: Status,
    pub message: String,
    pub background: Option<String>,
    pub expectation: Option<String>,
}

impl NewMentorship {
    /// A fresh request in the `New` state carrying the applicant's fields.
    pub fn from_request(mentor: ObjectId, mentee: ObjectId, request: MentorshipRequest) -> Self {
        Self {
            mentor,
            mentee,
            status: Status::New,
            message: request.message,
            background: request.background,
            expectation: request.expectation,
        }
    }

    pub fn into_mentorship(self, id: ObjectId, now: i64) -> Mentorship {
        Mentorship {
            id: Some(id),
            mentor: self.mentor,
            mentee: self.mentee,
            status: self.status,
            message: self.message,
            background: self.background,
            expectation: self.expectation,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Body of `POST /mentorships/{mentorId}/apply`.
///
/// Unknown fields are dropped during deserialization.
#[derive(Debug, Clone, Deserialize, Validate, utoipa::ToSchema)]
pub struct MentorshipRequest {
    #[validate(
        custom(function = "not_blank"),
        length(max = 4000, message = "Message must be at most 4000 characters")
    )]
    pub message: String,

    #[validate(length(max = 4000, message = "Background must be at most 4000 characters"))]
    #[serde(default)]
    pub background: Option<String>,

    #[validate(length(max = 4000, message = "Expectation must be at most 4000 characters"))]
    #[serde(default)]
    pub expectation: Option<String>,
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("not_blank");
        err.message = Some("Message is required".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ApplyResponse {
    pub success: bool,
}
