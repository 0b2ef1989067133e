use async_trait::async_trait;
use bson::{doc, oid::ObjectId};
use chrono::Utc;
use mongodb::{
    options::{ClientOptions, Credential, ResolverConfig},
    Client, Collection,
};
use tracing::{error, info};

use crate::config::MongoConfig;
use crate::model::request::ServiceRequest;
use crate::repository::repository_error::{RepositoryError, RepositoryResult};

/// Storage for quote/booking records. One instance per collection; quotes
/// and bookings share the shape but live in separate collections.
#[async_trait]
pub trait RequestRepository: Send + Sync {
    async fn create(&self, request: ServiceRequest) -> RepositoryResult<ServiceRequest>;
    async fn find_by_token(&self, token: &str) -> RepositoryResult<Option<ServiceRequest>>;
    async fn update(&self, id: ObjectId, request: ServiceRequest)
        -> RepositoryResult<ServiceRequest>;
}

pub struct MongoRequestRepository {
    collection: Collection<ServiceRequest>,
}

pub(crate) async fn connect(config: &MongoConfig) -> Result<Client, mongodb::error::Error> {
    let mut client_options =
        ClientOptions::parse_with_resolver_config(&config.uri, ResolverConfig::cloudflare())
            .await?;
    client_options.app_name = Some("KlarstadBackend".to_string());
    client_options.max_pool_size = Some(config.pool_size);
    client_options.connect_timeout = Some(std::time::Duration::from_secs(
        config.connection_timeout_secs,
    ));

    if let (Some(ref username), Some(ref password)) = (&config.username, &config.password) {
        client_options.credential = Some(
            Credential::builder()
                .username(username.clone())
                .password(password.clone())
                .build(),
        );
    }

    Client::with_options(client_options)
}

impl MongoRequestRepository {
    /// Create a repository over the named collection ("quotes" or "bookings").
    pub async fn new(
        config: &MongoConfig,
        collection_name: &str,
    ) -> Result<Self, mongodb::error::Error> {
        let client = connect(config).await?;
        let collection = client
            .database(&config.database)
            .collection::<ServiceRequest>(collection_name);
        Ok(MongoRequestRepository { collection })
    }
}

#[async_trait]
impl RequestRepository for MongoRequestRepository {
    #[tracing::instrument(skip(self, request), fields(service = %request.service))]
    async fn create(&self, request: ServiceRequest) -> RepositoryResult<ServiceRequest> {
        let mut new_request = request;
        new_request.id = Some(ObjectId::new());
        let now = Utc::now();
        new_request.created_at = Some(now);
        new_request.updated_at = Some(now);

        match self.collection.insert_one(new_request.clone(), None).await {
            Ok(_) => {
                info!("Service request created");
                Ok(new_request)
            }
            Err(e) => {
                error!("Failed to create service request: {}", e);
                Err(RepositoryError::database(format!(
                    "Failed to create service request: {}",
                    e
                )))
            }
        }
    }

    #[tracing::instrument(skip(self, token))]
    async fn find_by_token(&self, token: &str) -> RepositoryResult<Option<ServiceRequest>> {
        let filter = doc! { "confirmationToken": token };
        self.collection.find_one(filter, None).await.map_err(|e| {
            error!("Failed to look up request by token: {}", e);
            RepositoryError::database(format!("Failed to look up request by token: {}", e))
        })
    }

    #[tracing::instrument(skip(self, request), fields(id = %id))]
    async fn update(
        &self,
        id: ObjectId,
        request: ServiceRequest,
    ) -> RepositoryResult<ServiceRequest> {
        let mut updated = request;
        updated.updated_at = Some(Utc::now());

        let filter = doc! { "_id": id };
        let mut doc = bson::to_document(&updated)
            .map_err(|e| RepositoryError::serialization(format!("Failed to serialize: {}", e)))?;
        doc.remove("_id");
        let update = doc! { "$set": doc };

        match self.collection.update_one(filter, update, None).await {
            Ok(result) if result.matched_count > 0 => {
                info!("Service request updated");
                Ok(updated)
            }
            Ok(_) => {
                error!("No service request found to update for ID: {}", id);
                Err(RepositoryError::not_found(format!(
                    "No service request found to update for ID: {}",
                    id
                )))
            }
            Err(e) => {
                error!("Failed to update service request: {}", e);
                Err(RepositoryError::database(format!(
                    "Failed to update service request: {}",
                    e
                )))
            }
        }
    }
}
