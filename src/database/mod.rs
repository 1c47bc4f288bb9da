use mongodb::{Client, Collection, Database};
use std::error::Error;

pub const USERS_COLLECTION: &str = "users";
pub const MENTORSHIPS_COLLECTION: &str = "mentorships";

#[derive(Clone)]
pub struct MongoDB {
    db: Database,
}

impl MongoDB {
    pub async fn new(uri: &str) -> Result<Self, Box<dyn Error>> {
        let mut client_options = mongodb::options::ClientOptions::parse(uri).await?;

        client_options.max_pool_size = Some(20);
        client_options.min_pool_size = Some(5);
        client_options.max_idle_time = Some(std::time::Duration::from_secs(300));

        client_options.connect_timeout = Some(std::time::Duration::from_secs(5));
        client_options.server_selection_timeout = Some(std::time::Duration::from_secs(5));

        let client = Client::with_options(client_options)?;

        let db_name = database_name(uri);
        let db = client.database(&db_name);

        // Test connection
        db.list_collection_names().await?;

        let mongodb = Self { db };
        mongodb.ensure_indexes().await?;

        Ok(mongodb)
    }

    /// Creates the indexes the lookups rely on, including the (mentor, mentee)
    /// uniqueness constraint that backs the duplicate-request check.
    async fn ensure_indexes(&self) -> Result<(), Box<dyn Error>> {
        use mongodb::bson::doc;
        use mongodb::options::IndexOptions;
        use mongodb::IndexModel;

        log::info!("🔧 Creating database indexes...");

        let users = self.collection::<mongodb::bson::Document>(USERS_COLLECTION);

        let auth_index = IndexModel::builder()
            .keys(doc! { "auth0_id": 1 })
            .build();

        match users.create_index(auth_index).await {
            Ok(_) => log::info!("   ✅ Index created: users(auth0_id)"),
            Err(e) => log::debug!("   ℹ️  Index already exists: {}", e),
        }

        let mentorships = self.collection::<mongodb::bson::Document>(MENTORSHIPS_COLLECTION);

        let pair_index = IndexModel::builder()
            .keys(doc! { "mentor": 1, "mentee": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();

        match mentorships.create_index(pair_index).await {
            Ok(_) => log::info!("   ✅ Index created: mentorships(mentor, mentee) unique"),
            Err(e) => log::warn!("   ⚠️  Unique index on mentorships(mentor, mentee) not created: {}", e),
        }

        log::info!("✅ Database indexes ready");

        Ok(())
    }

    pub fn collection<T: Send + Sync>(&self, name: &str) -> Collection<T> {
        self.db.collection(name)
    }

    /// Check if the connection is healthy
    pub async fn health_check(&self) -> bool {
        self.db.list_collection_names().await.is_ok()
    }
}

/// Extracts the database name from the URI path, falling back to `mentorships`.
fn database_name(uri: &str) -> String {
    let without_scheme = uri.split_once("://").map(|(_, rest)| rest).unwrap_or(uri);

    without_scheme
        .split_once('/')
        .map(|(_, path)| path)
        .and_then(|path| path.split('?').next())
        .filter(|name| !name.is_empty())
        .unwrap_or("mentorships")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_name_from_uri() {
        assert_eq!(database_name("mongodb://localhost:27017/coding-coach"), "coding-coach");
        assert_eq!(
            database_name("mongodb+srv://user:pw@cluster.example.net/cc?retryWrites=true"),
            "cc"
        );
        assert_eq!(database_name("mongodb://localhost:27017"), "mentorships");
        assert_eq!(database_name("mongodb://localhost:27017/"), "mentorships");
    }

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn test_mongodb_connection() {
        dotenv::dotenv().ok();
        let uri = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "mongodb://localhost:27017/mentorships_test".to_string());

        let db = MongoDB::new(&uri).await;
        assert!(db.is_ok());
        assert!(db.unwrap().health_check().await);
    }
}
