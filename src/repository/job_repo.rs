use async_trait::async_trait;
use bson::{doc, oid::ObjectId};
use chrono::Utc;
use futures::stream::StreamExt;
use mongodb::Collection;
use tracing::{error, info};

use crate::config::MongoConfig;
use crate::model::job::{status, Job};
use crate::repository::repository_error::{RepositoryError, RepositoryResult};
use crate::repository::request_repo::connect;

/// Storage for contractor job offers.
///
/// `confirm_if_active` is the sole arbiter of a batch's winner: it is a
/// single conditional update whose modified-count is authoritative, so two
/// contractors racing on the same batch can never both confirm.
#[async_trait]
pub trait JobRepository: Send + Sync {
    async fn create(&self, job: Job) -> RepositoryResult<Job>;
    async fn find_by_token(&self, token: &str) -> RepositoryResult<Option<Job>>;
    /// Whether any job in the batch has already been confirmed.
    async fn batch_has_winner(&self, batch_id: &str) -> RepositoryResult<bool>;
    /// Atomically transition the job from `active` to `confirmed`. Returns
    /// false when the job was no longer `active` (the caller lost the race).
    async fn confirm_if_active(&self, id: ObjectId) -> RepositoryResult<bool>;
    /// Mark every other still-`active` job in the batch as `taken`.
    /// Returns the number of sibling offers closed.
    async fn take_siblings(&self, batch_id: &str, winner: ObjectId) -> RepositoryResult<u64>;
    async fn list_by_batch(&self, batch_id: &str) -> RepositoryResult<Vec<Job>>;
}

pub struct MongoJobRepository {
    collection: Collection<Job>,
}

impl MongoJobRepository {
    pub async fn new(config: &MongoConfig) -> Result<Self, mongodb::error::Error> {
        let client = connect(config).await?;
        let collection = client.database(&config.database).collection::<Job>("jobs");
        Ok(MongoJobRepository { collection })
    }
}

#[async_trait]
impl JobRepository for MongoJobRepository {
    #[tracing::instrument(skip(self, job), fields(batch_id = %job.batch_id, contractor_id = %job.contractor_id))]
    async fn create(&self, job: Job) -> RepositoryResult<Job> {
        let mut new_job = job;
        new_job.id = Some(ObjectId::new());
        let now = Utc::now();
        new_job.created_at = Some(now);
        new_job.updated_at = Some(now);

        match self.collection.insert_one(new_job.clone(), None).await {
            Ok(_) => {
                info!("Job offer created");
                Ok(new_job)
            }
            Err(e) => {
                error!("Failed to create job offer: {}", e);
                Err(RepositoryError::database(format!(
                    "Failed to create job offer: {}",
                    e
                )))
            }
        }
    }

    #[tracing::instrument(skip(self, token))]
    async fn find_by_token(&self, token: &str) -> RepositoryResult<Option<Job>> {
        let filter = doc! { "confirmationToken": token };
        self.collection.find_one(filter, None).await.map_err(|e| {
            error!("Failed to look up job by token: {}", e);
            RepositoryError::database(format!("Failed to look up job by token: {}", e))
        })
    }

    #[tracing::instrument(skip(self), fields(batch_id = %batch_id))]
    async fn batch_has_winner(&self, batch_id: &str) -> RepositoryResult<bool> {
        let filter = doc! { "batchId": batch_id, "status": status::CONFIRMED };
        let winner = self.collection.find_one(filter, None).await.map_err(|e| {
            RepositoryError::database(format!("Failed to query batch winner: {}", e))
        })?;
        Ok(winner.is_some())
    }

    #[tracing::instrument(skip(self), fields(id = %id))]
    async fn confirm_if_active(&self, id: ObjectId) -> RepositoryResult<bool> {
        let filter = doc! { "_id": id, "status": status::ACTIVE };
        let update = doc! { "$set": {
            "status": status::CONFIRMED,
            "updatedAt": Utc::now().to_rfc3339(),
        } };
        match self.collection.update_one(filter, update, None).await {
            Ok(result) => {
                let won = result.modified_count == 1;
                info!(won, "Conditional job confirmation");
                Ok(won)
            }
            Err(e) => {
                error!("Failed conditional job confirmation: {}", e);
                Err(RepositoryError::database(format!(
                    "Failed conditional job confirmation: {}",
                    e
                )))
            }
        }
    }

    #[tracing::instrument(skip(self), fields(batch_id = %batch_id, winner = %winner))]
    async fn take_siblings(&self, batch_id: &str, winner: ObjectId) -> RepositoryResult<u64> {
        let filter = doc! {
            "batchId": batch_id,
            "_id": { "$ne": winner },
            "status": status::ACTIVE,
        };
        let update = doc! { "$set": {
            "status": status::TAKEN,
            "updatedAt": Utc::now().to_rfc3339(),
        } };
        match self.collection.update_many(filter, update, None).await {
            Ok(result) => {
                info!(taken = result.modified_count, "Sibling job offers closed");
                Ok(result.modified_count)
            }
            Err(e) => {
                error!("Failed to close sibling job offers: {}", e);
                Err(RepositoryError::database(format!(
                    "Failed to close sibling job offers: {}",
                    e
                )))
            }
        }
    }

    #[tracing::instrument(skip(self), fields(batch_id = %batch_id))]
    async fn list_by_batch(&self, batch_id: &str) -> RepositoryResult<Vec<Job>> {
        let filter = doc! { "batchId": batch_id };
        let mut cursor = self.collection.find(filter, None).await.map_err(|e| {
            RepositoryError::database(format!("Failed to list batch jobs: {}", e))
        })?;

        let mut jobs = Vec::new();
        while let Some(job) = cursor.next().await {
            match job {
                Ok(j) => jobs.push(j),
                Err(e) => {
                    error!("Failed to deserialize job: {}", e);
                    return Err(RepositoryError::serialization(format!(
                        "Failed to deserialize job: {}",
                        e
                    )));
                }
            }
        }
        Ok(jobs)
    }
}
