use async_trait::async_trait;
use bson::{doc, oid::ObjectId};
use futures::stream::StreamExt;
use mongodb::Collection;
use tracing::error;

use crate::config::MongoConfig;
use crate::model::contractor::Contractor;
use crate::repository::repository_error::{RepositoryError, RepositoryResult};
use crate::repository::request_repo::connect;

/// Read-only access to the contractor roster.
#[async_trait]
pub trait ContractorRepository: Send + Sync {
    async fn list(&self) -> RepositoryResult<Vec<Contractor>>;
    async fn find_by_id(&self, id: ObjectId) -> RepositoryResult<Option<Contractor>>;
}

pub struct MongoContractorRepository {
    collection: Collection<Contractor>,
}

impl MongoContractorRepository {
    pub async fn new(config: &MongoConfig) -> Result<Self, mongodb::error::Error> {
        let client = connect(config).await?;
        let collection = client
            .database(&config.database)
            .collection::<Contractor>("contractors");
        Ok(MongoContractorRepository { collection })
    }
}

#[async_trait]
impl ContractorRepository for MongoContractorRepository {
    #[tracing::instrument(skip(self))]
    async fn list(&self) -> RepositoryResult<Vec<Contractor>> {
        let mut cursor = self.collection.find(None, None).await.map_err(|e| {
            error!("Failed to list contractors: {}", e);
            RepositoryError::database(format!("Failed to list contractors: {}", e))
        })?;

        let mut contractors = Vec::new();
        while let Some(contractor) = cursor.next().await {
            match contractor {
                Ok(c) => contractors.push(c),
                Err(e) => {
                    error!("Failed to deserialize contractor: {}", e);
                    return Err(RepositoryError::serialization(format!(
                        "Failed to deserialize contractor: {}",
                        e
                    )));
                }
            }
        }
        Ok(contractors)
    }

    #[tracing::instrument(skip(self), fields(id = %id))]
    async fn find_by_id(&self, id: ObjectId) -> RepositoryResult<Option<Contractor>> {
        let filter = doc! { "_id": id };
        self.collection.find_one(filter, None).await.map_err(|e| {
            RepositoryError::database(format!("Failed to fetch contractor: {}", e))
        })
    }
}
