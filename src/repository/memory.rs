//! In-memory repository implementations.
//!
//! Back the integration tests and local development without a MongoDB
//! instance. The job-store compare-and-swap happens under a single lock, so
//! the at-most-one-winner invariant holds under concurrent confirmations
//! exactly as it does with the Mongo conditional update.

use async_trait::async_trait;
use bson::oid::ObjectId;
use chrono::Utc;
use std::sync::Mutex;

use crate::model::contractor::Contractor;
use crate::model::job::{status as job_status, Job};
use crate::model::request::ServiceRequest;
use crate::model::user::User;
use crate::repository::contractor_repo::ContractorRepository;
use crate::repository::job_repo::JobRepository;
use crate::repository::repository_error::{RepositoryError, RepositoryResult};
use crate::repository::request_repo::RequestRepository;
use crate::repository::user_repo::UserRepository;

fn lock_err() -> RepositoryError {
    RepositoryError::database("store lock poisoned".to_string())
}

#[derive(Default)]
pub struct InMemoryRequestRepository {
    rows: Mutex<Vec<ServiceRequest>>,
    fail_creates: Mutex<bool>,
}

impl InMemoryRequestRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> Vec<ServiceRequest> {
        self.rows.lock().map(|r| r.clone()).unwrap_or_default()
    }

    /// Make every subsequent create fail, to exercise degraded paths.
    pub fn fail_creates(&self, fail: bool) {
        if let Ok(mut f) = self.fail_creates.lock() {
            *f = fail;
        }
    }

    /// Seed a row directly, bypassing create-time stamping.
    pub fn insert_raw(&self, request: ServiceRequest) {
        if let Ok(mut rows) = self.rows.lock() {
            rows.push(request);
        }
    }
}

#[async_trait]
impl RequestRepository for InMemoryRequestRepository {
    async fn create(&self, request: ServiceRequest) -> RepositoryResult<ServiceRequest> {
        if *self.fail_creates.lock().map_err(|_| lock_err())? {
            return Err(RepositoryError::database("simulated insert failure"));
        }
        let mut new_request = request;
        new_request.id = Some(ObjectId::new());
        let now = Utc::now();
        new_request.created_at = Some(now);
        new_request.updated_at = Some(now);
        self.rows
            .lock()
            .map_err(|_| lock_err())?
            .push(new_request.clone());
        Ok(new_request)
    }

    async fn find_by_token(&self, token: &str) -> RepositoryResult<Option<ServiceRequest>> {
        let rows = self.rows.lock().map_err(|_| lock_err())?;
        Ok(rows
            .iter()
            .find(|r| r.confirmation_token.as_deref() == Some(token))
            .cloned())
    }

    async fn update(
        &self,
        id: ObjectId,
        request: ServiceRequest,
    ) -> RepositoryResult<ServiceRequest> {
        let mut rows = self.rows.lock().map_err(|_| lock_err())?;
        let row = rows
            .iter_mut()
            .find(|r| r.id == Some(id))
            .ok_or_else(|| RepositoryError::not_found(format!("no request with id {}", id)))?;
        let mut updated = request;
        updated.id = Some(id);
        updated.updated_at = Some(Utc::now());
        *row = updated.clone();
        Ok(updated)
    }
}

#[derive(Default)]
pub struct InMemoryJobRepository {
    rows: Mutex<Vec<Job>>,
    fail_creates_for: Mutex<Option<ObjectId>>,
}

impl InMemoryJobRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> Vec<Job> {
        self.rows.lock().map(|r| r.clone()).unwrap_or_default()
    }

    /// Make creates fail for one contractor, to exercise partial fan-out.
    pub fn fail_creates_for(&self, contractor_id: Option<ObjectId>) {
        if let Ok(mut f) = self.fail_creates_for.lock() {
            *f = contractor_id;
        }
    }
}

#[async_trait]
impl JobRepository for InMemoryJobRepository {
    async fn create(&self, job: Job) -> RepositoryResult<Job> {
        if *self.fail_creates_for.lock().map_err(|_| lock_err())? == Some(job.contractor_id) {
            return Err(RepositoryError::database("simulated insert failure"));
        }
        let mut new_job = job;
        new_job.id = Some(ObjectId::new());
        let now = Utc::now();
        new_job.created_at = Some(now);
        new_job.updated_at = Some(now);
        self.rows
            .lock()
            .map_err(|_| lock_err())?
            .push(new_job.clone());
        Ok(new_job)
    }

    async fn find_by_token(&self, token: &str) -> RepositoryResult<Option<Job>> {
        let rows = self.rows.lock().map_err(|_| lock_err())?;
        Ok(rows
            .iter()
            .find(|j| j.confirmation_token.as_deref() == Some(token))
            .cloned())
    }

    async fn batch_has_winner(&self, batch_id: &str) -> RepositoryResult<bool> {
        let rows = self.rows.lock().map_err(|_| lock_err())?;
        Ok(rows
            .iter()
            .any(|j| j.batch_id == batch_id && j.status == job_status::CONFIRMED))
    }

    async fn confirm_if_active(&self, id: ObjectId) -> RepositoryResult<bool> {
        // Check and transition under one lock: this is the CAS.
        let mut rows = self.rows.lock().map_err(|_| lock_err())?;
        match rows
            .iter_mut()
            .find(|j| j.id == Some(id) && j.status == job_status::ACTIVE)
        {
            Some(job) => {
                job.status = job_status::CONFIRMED.to_string();
                job.updated_at = Some(Utc::now());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn take_siblings(&self, batch_id: &str, winner: ObjectId) -> RepositoryResult<u64> {
        let mut rows = self.rows.lock().map_err(|_| lock_err())?;
        let mut taken = 0;
        for job in rows.iter_mut() {
            if job.batch_id == batch_id
                && job.id != Some(winner)
                && job.status == job_status::ACTIVE
            {
                job.status = job_status::TAKEN.to_string();
                job.updated_at = Some(Utc::now());
                taken += 1;
            }
        }
        Ok(taken)
    }

    async fn list_by_batch(&self, batch_id: &str) -> RepositoryResult<Vec<Job>> {
        let rows = self.rows.lock().map_err(|_| lock_err())?;
        Ok(rows
            .iter()
            .filter(|j| j.batch_id == batch_id)
            .cloned()
            .collect())
    }
}

/// Fixed roster handed in at construction.
pub struct InMemoryContractorRepository {
    roster: Vec<Contractor>,
}

impl InMemoryContractorRepository {
    pub fn new(roster: Vec<Contractor>) -> Self {
        Self { roster }
    }
}

#[async_trait]
impl ContractorRepository for InMemoryContractorRepository {
    async fn list(&self) -> RepositoryResult<Vec<Contractor>> {
        Ok(self.roster.clone())
    }

    async fn find_by_id(&self, id: ObjectId) -> RepositoryResult<Option<Contractor>> {
        Ok(self.roster.iter().find(|c| c.id == Some(id)).cloned())
    }
}

#[derive(Default)]
pub struct InMemoryUserRepository {
    rows: Mutex<Vec<User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> Vec<User> {
        self.rows.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn upsert_by_email(
        &self,
        email: &str,
        name: &str,
        phone: &str,
    ) -> RepositoryResult<User> {
        let mut rows = self.rows.lock().map_err(|_| lock_err())?;
        if let Some(user) = rows.iter_mut().find(|u| u.email == email) {
            user.name = Some(name.to_string());
            user.phone = Some(phone.to_string());
            user.updated_at = Some(Utc::now());
            return Ok(user.clone());
        }
        let now = Utc::now();
        let user = User {
            id: Some(ObjectId::new()),
            email: email.to_string(),
            name: Some(name.to_string()),
            phone: Some(phone.to_string()),
            created_at: Some(now),
            updated_at: Some(now),
        };
        rows.push(user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>> {
        let rows = self.rows.lock().map_err(|_| lock_err())?;
        Ok(rows.iter().find(|u| u.email == email).cloned())
    }
}
