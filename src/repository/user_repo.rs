use async_trait::async_trait;
use bson::{doc, oid::ObjectId};
use chrono::Utc;
use mongodb::Collection;
use tracing::{error, info};

use crate::config::MongoConfig;
use crate::model::user::User;
use crate::repository::repository_error::{RepositoryError, RepositoryResult};
use crate::repository::request_repo::connect;

/// Customer identities keyed by normalized email.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create-if-absent, else patch name/phone. `email` must already be
    /// normalized (trimmed, lower-cased).
    async fn upsert_by_email(
        &self,
        email: &str,
        name: &str,
        phone: &str,
    ) -> RepositoryResult<User>;
    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>>;
}

pub struct MongoUserRepository {
    collection: Collection<User>,
}

impl MongoUserRepository {
    pub async fn new(config: &MongoConfig) -> Result<Self, mongodb::error::Error> {
        let client = connect(config).await?;
        let collection = client.database(&config.database).collection::<User>("users");
        Ok(MongoUserRepository { collection })
    }
}

#[async_trait]
impl UserRepository for MongoUserRepository {
    #[tracing::instrument(skip(self, name, phone), fields(email = %email))]
    async fn upsert_by_email(
        &self,
        email: &str,
        name: &str,
        phone: &str,
    ) -> RepositoryResult<User> {
        let existing = self.find_by_email(email).await?;

        match existing {
            Some(mut user) => {
                let filter = doc! { "email": email };
                let update = doc! { "$set": {
                    "name": name,
                    "phone": phone,
                    "updatedAt": Utc::now().to_rfc3339(),
                } };
                self.collection
                    .update_one(filter, update, None)
                    .await
                    .map_err(|e| {
                        error!("Failed to patch user: {}", e);
                        RepositoryError::database(format!("Failed to patch user: {}", e))
                    })?;
                user.name = Some(name.to_string());
                user.phone = Some(phone.to_string());
                info!("Existing user patched");
                Ok(user)
            }
            None => {
                let now = Utc::now();
                let user = User {
                    id: Some(ObjectId::new()),
                    email: email.to_string(),
                    name: Some(name.to_string()),
                    phone: Some(phone.to_string()),
                    created_at: Some(now),
                    updated_at: Some(now),
                };
                self.collection
                    .insert_one(user.clone(), None)
                    .await
                    .map_err(|e| {
                        error!("Failed to create user: {}", e);
                        RepositoryError::database(format!("Failed to create user: {}", e))
                    })?;
                info!("New user created");
                Ok(user)
            }
        }
    }

    #[tracing::instrument(skip(self), fields(email = %email))]
    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>> {
        let filter = doc! { "email": email };
        self.collection.find_one(filter, None).await.map_err(|e| {
            RepositoryError::database(format!("Failed to look up user by email: {}", e))
        })
    }
}
