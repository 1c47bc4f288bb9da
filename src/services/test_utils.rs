//! In-memory collaborators for service and handler tests

use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use std::error::Error;
use std::sync::{Arc, Mutex};

use crate::config::JwtConfig;
use crate::middleware::auth::Claims;
use crate::models::{Mentorship, NewMentorship, User, MENTOR_ROLE};
use crate::services::{
    AppServices, EmailError, EmailMessage, EmailSender, ErrorReporter, MentorLookup,
    MentorshipStore, UserLookup,
};
use crate::utils::AppError;

pub fn mentor(name: &str, available: bool) -> User {
    User {
        id: ObjectId::new(),
        auth0_id: format!("auth0|{}", name),
        email: format!("{}@example.com", name),
        name: format!("Mentor {}", name),
        roles: vec!["Member".to_string(), MENTOR_ROLE.to_string()],
        available,
    }
}

pub fn mentee(name: &str) -> User {
    User {
        id: ObjectId::new(),
        auth0_id: format!("auth0|{}", name),
        email: format!("{}@example.com", name),
        name: format!("Mentee {}", name),
        roles: vec!["Member".to_string()],
        available: true,
    }
}

pub struct InMemoryUsers {
    users: Vec<User>,
}

#[async_trait]
impl UserLookup for InMemoryUsers {
    async fn find_by_auth_id(&self, auth_id: &str) -> Result<Option<User>, AppError> {
        Ok(self.users.iter().find(|u| u.auth0_id == auth_id).cloned())
    }
}

#[async_trait]
impl MentorLookup for InMemoryUsers {
    async fn find_by_id(&self, mentor_id: &str) -> Result<Option<User>, AppError> {
        Ok(self
            .users
            .iter()
            .find(|u| u.id.to_hex() == mentor_id && u.is_mentor())
            .cloned())
    }
}

#[derive(Default)]
pub struct InMemoryMentorships {
    records: Mutex<Vec<Mentorship>>,
    fail_writes: Mutex<bool>,
}

impl InMemoryMentorships {
    pub fn all(&self) -> Vec<Mentorship> {
        self.records.lock().unwrap().clone()
    }

    pub fn fail_writes(&self) {
        *self.fail_writes.lock().unwrap() = true;
    }
}

#[async_trait]
impl MentorshipStore for InMemoryMentorships {
    async fn find_mentorship(
        &self,
        mentor: &ObjectId,
        mentee: &ObjectId,
    ) -> Result<Option<Mentorship>, AppError> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .find(|m| &m.mentor == mentor && &m.mentee == mentee)
            .cloned())
    }

    async fn create_mentorship(&self, fields: NewMentorship) -> Result<Mentorship, AppError> {
        if *self.fail_writes.lock().unwrap() {
            return Err(AppError::Database("write rejected".to_string()));
        }

        let mentorship = fields.into_mentorship(ObjectId::new(), 1_700_000_000);
        self.records.lock().unwrap().push(mentorship.clone());
        Ok(mentorship)
    }
}

/// Records every attempted send; optionally fails them.
#[derive(Default)]
pub struct RecordingEmailSender {
    sent: Mutex<Vec<EmailMessage>>,
    fail_status: Mutex<Option<u16>>,
}

impl RecordingEmailSender {
    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().unwrap().clone()
    }

    pub fn fail_with_status(&self, status: u16) {
        *self.fail_status.lock().unwrap() = Some(status);
    }
}

#[async_trait]
impl EmailSender for RecordingEmailSender {
    async fn send(&self, email: &EmailMessage) -> Result<(), EmailError> {
        self.sent.lock().unwrap().push(email.clone());

        match *self.fail_status.lock().unwrap() {
            Some(status) => Err(EmailError::Provider {
                status,
                body: "provider unavailable".to_string(),
            }),
            None => Ok(()),
        }
    }
}

#[derive(Default)]
pub struct RecordingErrorReporter {
    captured: Mutex<Vec<String>>,
}

impl RecordingErrorReporter {
    pub fn captured(&self) -> Vec<String> {
        self.captured.lock().unwrap().clone()
    }
}

impl ErrorReporter for RecordingErrorReporter {
    fn capture_exception(&self, error: &(dyn Error + 'static)) {
        self.captured.lock().unwrap().push(error.to_string());
    }
}

/// Fakes wired together, keeping concrete handles for assertions.
pub struct TestServices {
    pub users: Arc<InMemoryUsers>,
    pub mentorships: Arc<InMemoryMentorships>,
    pub email: Arc<RecordingEmailSender>,
    pub errors: Arc<RecordingErrorReporter>,
}

impl TestServices {
    pub fn new(users: Vec<User>) -> Self {
        Self {
            users: Arc::new(InMemoryUsers { users }),
            mentorships: Arc::new(InMemoryMentorships::default()),
            email: Arc::new(RecordingEmailSender::default()),
            errors: Arc::new(RecordingErrorReporter::default()),
        }
    }

    pub fn services(&self) -> AppServices {
        AppServices {
            users: self.users.clone(),
            mentors: self.users.clone(),
            mentorships: self.mentorships.clone(),
            email: self.email.clone(),
            errors: self.errors.clone(),
        }
    }
}

pub fn jwt_config() -> JwtConfig {
    JwtConfig {
        secret: "test-secret".to_string(),
        issuer: "mentorship-service".to_string(),
        audience: "mentorship-api".to_string(),
    }
}

/// Signs a token for `auth_id` that `jwt_config()` accepts.
pub fn token_for(auth_id: &str) -> String {
    let config = jwt_config();
    let now = chrono::Utc::now().timestamp() as usize;
    let claims = Claims {
        sub: auth_id.to_string(),
        iat: now,
        exp: now + 3600,
        aud: config.audience.clone(),
        iss: config.issuer.clone(),
    };

    jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(config.secret.as_bytes()),
    )
    .unwrap()
}
