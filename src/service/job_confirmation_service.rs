use std::sync::Arc;

use chrono::Utc;
use tracing::{info, instrument, warn};

use crate::dto::job_dto::{JobConfirmResponse, JobSummary};
use crate::model::job::Job;
use crate::repository::contractor_repo::ContractorRepository;
use crate::repository::job_repo::JobRepository;
use crate::service::notifications::Notifier;
use crate::util::error::ServiceError;

/// Contractor confirmation with first-confirm-wins semantics. The atomic
/// `confirm_if_active` update is the sole arbiter of the batch winner; the
/// up-front batch check only exists to give late arrivals a precise error.
pub struct JobConfirmationService {
    jobs: Arc<dyn JobRepository>,
    contractors: Arc<dyn ContractorRepository>,
    notifier: Arc<Notifier>,
}

impl JobConfirmationService {
    pub fn new(
        jobs: Arc<dyn JobRepository>,
        contractors: Arc<dyn ContractorRepository>,
        notifier: Arc<Notifier>,
    ) -> Self {
        JobConfirmationService {
            jobs,
            contractors,
            notifier,
        }
    }

    /// Read-only lookup for the contractor-facing confirmation page.
    #[instrument(skip(self, token))]
    pub async fn get_job(&self, token: &str) -> Result<Job, ServiceError> {
        let job = self
            .jobs
            .find_by_token(token)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Invalid or expired link".to_string()))?;

        if !job.is_confirmed() && job.token_expired(Utc::now()) {
            return Err(ServiceError::Expired(
                "This job link has expired".to_string(),
            ));
        }
        Ok(job)
    }

    #[instrument(skip(self, token))]
    pub async fn confirm_job(&self, token: &str) -> Result<JobConfirmResponse, ServiceError> {
        let job = self
            .jobs
            .find_by_token(token)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Invalid or expired link".to_string()))?;

        if job.token_expired(Utc::now()) {
            return Err(ServiceError::Expired(
                "This job link has expired".to_string(),
            ));
        }

        // The same contractor clicking twice: success, no side effects.
        if job.is_confirmed() {
            info!("Job already confirmed, idempotent response");
            return Ok(JobConfirmResponse {
                success: true,
                message: "Job already confirmed".to_string(),
                already_confirmed: true,
                job: JobSummary::from(&job),
            });
        }

        if !job.is_active() {
            return Err(ServiceError::Conflict(
                "This job is no longer available".to_string(),
            ));
        }

        if self.jobs.batch_has_winner(&job.batch_id).await? {
            return Err(ServiceError::Conflict(
                "This job has already been taken by another contractor".to_string(),
            ));
        }

        let job_id = job
            .id
            .ok_or_else(|| ServiceError::InternalError("Job has no id".to_string()))?;

        // Atomic active→confirmed transition; a zero-row update means
        // another contractor got here between the check and now.
        if !self.jobs.confirm_if_active(job_id).await? {
            return Err(ServiceError::Conflict(
                "This job has already been taken by another contractor".to_string(),
            ));
        }

        // Only the winner closes the rest of the batch.
        if let Err(e) = self.jobs.take_siblings(&job.batch_id, job_id).await {
            warn!("Failed to close sibling offers: {}", e);
        }

        let mut confirmed = job.clone();
        confirmed.status = crate::model::job::status::CONFIRMED.to_string();

        match self.contractors.find_by_id(job.contractor_id).await {
            Ok(Some(contractor)) => {
                if let Err(e) = self
                    .notifier
                    .send_job_confirmed_admin_email(&contractor, &confirmed)
                    .await
                {
                    warn!("Admin job-confirmation email failed: {}", e);
                }
                if let Err(e) = self
                    .notifier
                    .send_job_confirmed_email(&contractor, &confirmed)
                    .await
                {
                    warn!("Contractor job-confirmation email failed: {}", e);
                }
            }
            Ok(None) => warn!(contractor_id = %job.contractor_id, "Confirming contractor not on roster"),
            Err(e) => warn!("Failed to load contractor for notifications: {}", e),
        }

        info!(batch_id = %job.batch_id, "Job confirmed");

        Ok(JobConfirmResponse {
            success: true,
            message: "Job confirmed".to_string(),
            already_confirmed: false,
            job: JobSummary::from(&confirmed),
        })
    }
}
