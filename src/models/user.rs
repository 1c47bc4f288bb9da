use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

pub const MENTOR_ROLE: &str = "Mentor";

/// User document as stored in the `users` collection.
///
/// Mentors are users holding the `Mentor` role; `available` only matters for them.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub auth0_id: String,
    pub email: String,
    pub name: String,
    #[serde(default = "default_roles")]
    pub roles: Vec<String>,
    #[serde(default = "default_available")]
    pub available: bool,
}

fn default_roles() -> Vec<String> {
    vec!["Member".to_string()]
}

fn default_available() -> bool {
    true
}

impl User {
    pub fn is_mentor(&self) -> bool {
        self.roles.iter().any(|r| r == MENTOR_ROLE)
    }
}
