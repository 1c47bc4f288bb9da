pub mod email_service;
pub mod error_reporter;
pub mod mentorship_application;
pub mod mentorships_service;
pub mod users_service;

#[cfg(test)]
pub mod test_utils;

pub use email_service::*;
pub use error_reporter::*;
pub use mentorships_service::*;
pub use users_service::*;

use std::sync::Arc;

/// Collaborators the request handlers depend on, shared through `web::Data`.
#[derive(Clone)]
pub struct AppServices {
    pub users: Arc<dyn UserLookup>,
    pub mentors: Arc<dyn MentorLookup>,
    pub mentorships: Arc<dyn MentorshipStore>,
    pub email: Arc<dyn EmailSender>,
    pub errors: Arc<dyn ErrorReporter>,
}
