use std::sync::Arc;

use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::model::job::{status, Job};
use crate::model::request::ServiceRequest;
use crate::pricing;
use crate::repository::contractor_repo::ContractorRepository;
use crate::repository::job_repo::JobRepository;
use crate::service::fields;
use crate::service::notifications::Notifier;
use crate::util::error::ServiceError;
use crate::util::token::{expiry_from_now, issue_token, TOKEN_TTL_DAYS};

/// Contractor pay as a fraction of the customer price.
const CONTRACTOR_SHARE: f64 = 0.75;

/// Job fan-out: offers a just-confirmed booking to every contractor on the
/// roster, one job row + offer email each, all under a shared batch id.
/// Fire-and-forget from the caller's perspective.
pub struct DispatchService {
    jobs: Arc<dyn JobRepository>,
    contractors: Arc<dyn ContractorRepository>,
    notifier: Arc<Notifier>,
}

impl DispatchService {
    pub fn new(
        jobs: Arc<dyn JobRepository>,
        contractors: Arc<dyn ContractorRepository>,
        notifier: Arc<Notifier>,
    ) -> Self {
        DispatchService {
            jobs,
            contractors,
            notifier,
        }
    }

    /// Returns the number of job offers dispatched.
    #[instrument(skip(self, booking), fields(service = %booking.service))]
    pub async fn fan_out(&self, booking: &ServiceRequest) -> Result<usize, ServiceError> {
        let roster = self.contractors.list().await?;

        let job_type = booking
            .service_type
            .clone()
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| booking.service.clone());
        let address = booking
            .address
            .clone()
            .filter(|a| !a.trim().is_empty())
            .unwrap_or_else(|| "Not specified".to_string());
        let scheduled_date = booking
            .preferred_date_time
            .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
            .or_else(|| fields::date_from_details(&booking.details));
        let area = booking
            .area
            .or_else(|| fields::area_from_details(&booking.details));

        let customer_price = confirmed_total(booking)
            .or_else(|| pricing::price_for_area(area).map(|q| q.price));
        let contractor_price =
            customer_price.map(|p| (p as f64 * CONTRACTOR_SHARE).round() as i64);

        let batch_id = Uuid::new_v4().to_string();
        let mut dispatched = 0;

        for contractor in &roster {
            let contractor_id = match (contractor.id, contractor.usable_email()) {
                (Some(id), Some(_)) => id,
                _ => {
                    warn!(name = %contractor.name, "Skipping contractor without id or email");
                    continue;
                }
            };

            let token = issue_token();
            let job = Job {
                id: None,
                contractor_id,
                job_type: job_type.clone(),
                address: address.clone(),
                area: area.map(|a| format!("{} m²", a.round() as i64)),
                scheduled_date: scheduled_date.clone(),
                contractor_price,
                status: status::ACTIVE.to_string(),
                confirmation_token: Some(token.clone()),
                token_expires_at: Some(expiry_from_now(TOKEN_TTL_DAYS)),
                batch_id: batch_id.clone(),
                created_at: None,
                updated_at: None,
            };

            // One contractor's failure never aborts the batch.
            let created = match self.jobs.create(job).await {
                Ok(created) => created,
                Err(e) => {
                    warn!(name = %contractor.name, "Job insert failed, skipping contractor: {}", e);
                    continue;
                }
            };

            // Insert succeeded: the offer exists even if the email fails.
            if let Err(e) = self
                .notifier
                .send_job_offer_email(contractor, &created, &token)
                .await
            {
                warn!(name = %contractor.name, "Job offer email failed: {}", e);
            }
            dispatched += 1;
        }

        info!(batch_id = %batch_id, dispatched, "Job fan-out complete");
        Ok(dispatched)
    }
}

/// The total price captured on the confirmation page, when present.
fn confirmed_total(booking: &ServiceRequest) -> Option<i64> {
    booking.details.get("totalPriceKr").and_then(|v| v.as_i64())
}
