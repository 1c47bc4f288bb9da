use async_trait::async_trait;
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::error::{ErrorKind, WriteFailure};

use crate::database::{MongoDB, MENTORSHIPS_COLLECTION};
use crate::models::{Mentorship, NewMentorship};
use crate::utils::AppError;

const DUPLICATE_KEY_CODE: i32 = 11000;

/// Persistence for mentorship records.
///
/// `find_mentorship` followed by `create_mentorship` is check-then-act; an
/// implementation may close the gap with a storage constraint, in which case a
/// rejected insert is reported as `AppError::DuplicateMentorshipRequest`.
#[async_trait]
pub trait MentorshipStore: Send + Sync {
    async fn find_mentorship(
        &self,
        mentor: &ObjectId,
        mentee: &ObjectId,
    ) -> Result<Option<Mentorship>, AppError>;

    async fn create_mentorship(&self, fields: NewMentorship) -> Result<Mentorship, AppError>;
}

#[derive(Clone)]
pub struct MongoMentorshipRepository {
    db: MongoDB,
}

impl MongoMentorshipRepository {
    pub fn new(db: MongoDB) -> Self {
        Self { db }
    }
}

#[async_trait]
impl MentorshipStore for MongoMentorshipRepository {
    async fn find_mentorship(
        &self,
        mentor: &ObjectId,
        mentee: &ObjectId,
    ) -> Result<Option<Mentorship>, AppError> {
        let collection = self.db.collection::<Mentorship>(MENTORSHIPS_COLLECTION);

        let mentorship = collection
            .find_one(doc! { "mentor": *mentor, "mentee": *mentee })
            .await?;
        Ok(mentorship)
    }

    async fn create_mentorship(&self, fields: NewMentorship) -> Result<Mentorship, AppError> {
        let collection = self.db.collection::<Mentorship>(MENTORSHIPS_COLLECTION);

        let now = chrono::Utc::now().timestamp();
        let mentorship = fields.into_mentorship(ObjectId::new(), now);

        match collection.insert_one(&mentorship).await {
            Ok(_) => Ok(mentorship),
            Err(e) if is_duplicate_key(&e) => {
                log::warn!(
                    "⚠️  Concurrent duplicate mentorship rejected by index: mentor={} mentee={}",
                    mentorship.mentor,
                    mentorship.mentee
                );
                Err(AppError::DuplicateMentorshipRequest)
            }
            Err(e) => Err(e.into()),
        }
    }
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(write_error)) if write_error.code == DUPLICATE_KEY_CODE
    )
}
