use async_trait::async_trait;
use mongodb::bson::{doc, oid::ObjectId};

use crate::database::{MongoDB, USERS_COLLECTION};
use crate::models::User;
use crate::utils::AppError;

/// Resolves the authenticated caller to a user record.
#[async_trait]
pub trait UserLookup: Send + Sync {
    async fn find_by_auth_id(&self, auth_id: &str) -> Result<Option<User>, AppError>;
}

/// Resolves a mentor by its public identifier.
///
/// Identifiers that cannot name a mentor (unknown, malformed, or a user
/// without the mentor role) all resolve to `None`.
#[async_trait]
pub trait MentorLookup: Send + Sync {
    async fn find_by_id(&self, mentor_id: &str) -> Result<Option<User>, AppError>;
}

/// Both lookups, backed by the `users` collection.
#[derive(Clone)]
pub struct MongoUserRepository {
    db: MongoDB,
}

impl MongoUserRepository {
    pub fn new(db: MongoDB) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserLookup for MongoUserRepository {
    async fn find_by_auth_id(&self, auth_id: &str) -> Result<Option<User>, AppError> {
        let collection = self.db.collection::<User>(USERS_COLLECTION);

        let user = collection.find_one(doc! { "auth0_id": auth_id }).await?;
        Ok(user)
    }
}

#[async_trait]
impl MentorLookup for MongoUserRepository {
    async fn find_by_id(&self, mentor_id: &str) -> Result<Option<User>, AppError> {
        let object_id = match ObjectId::parse_str(mentor_id) {
            Ok(id) => id,
            Err(_) => {
                log::debug!("🔍 Mentor id is not an ObjectId: {}", mentor_id);
                return Ok(None);
            }
        };

        let collection = self.db.collection::<User>(USERS_COLLECTION);

        let user = collection.find_one(doc! { "_id": object_id }).await?;
        Ok(as_mentor(user))
    }
}

/// Users without the mentor role are not mentors, whatever their id.
fn as_mentor(user: Option<User>) -> Option<User> {
    user.filter(User::is_mentor)
}
