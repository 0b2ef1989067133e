use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{error, info, instrument, warn};

use crate::dto::intake_dto::{IntakeRequest, IntakeResponse, SubmissionKind};
use crate::model::request::{status, ServiceRequest};
use crate::model::user::normalize_email;
use crate::pricing;
use crate::repository::request_repo::RequestRepository;
use crate::repository::user_repo::UserRepository;
use crate::service::fields;
use crate::service::notifications::Notifier;
use crate::util::error::ServiceError;
use crate::util::token::{expiry_from_now, issue_token, TOKEN_TTL_DAYS};

/// Lead intake: persists the submission as a quote or booking with a fresh
/// confirmation token and mails the customer and the admin inbox.
pub struct IntakeService {
    quotes: Arc<dyn RequestRepository>,
    bookings: Arc<dyn RequestRepository>,
    users: Arc<dyn UserRepository>,
    notifier: Arc<Notifier>,
}

impl IntakeService {
    pub fn new(
        quotes: Arc<dyn RequestRepository>,
        bookings: Arc<dyn RequestRepository>,
        users: Arc<dyn UserRepository>,
        notifier: Arc<Notifier>,
    ) -> Self {
        IntakeService {
            quotes,
            bookings,
            users,
            notifier,
        }
    }

    #[instrument(skip(self, submission), fields(service = %submission.service, kind = ?submission.submission_kind))]
    pub async fn submit(&self, submission: IntakeRequest) -> Result<IntakeResponse, ServiceError> {
        // This endpoint exists to send mail; without a provider it cannot
        // do its job at all.
        if !self.notifier.is_configured() {
            return Err(ServiceError::Configuration(
                "Email provider is not configured".to_string(),
            ));
        }

        let normalized_email = submission
            .email
            .as_deref()
            .map(normalize_email)
            .filter(|e| !e.is_empty());

        let user_id = match &normalized_email {
            Some(email) => {
                match self
                    .users
                    .upsert_by_email(email, &submission.name, &submission.phone)
                    .await
                {
                    Ok(user) => user.id,
                    Err(e) => {
                        warn!("User upsert failed, continuing without user link: {}", e);
                        None
                    }
                }
            }
            None => None,
        };

        let token = issue_token();
        let details = submission_details(&submission);
        let area = submission_area(&details);
        let price = pricing::price_for_area(area);

        let record = ServiceRequest {
            id: None,
            name: submission.name.clone(),
            phone: submission.phone.clone(),
            email: normalized_email.clone(),
            service: submission.service.clone(),
            service_type: submission.service_type.clone(),
            area,
            address: submission.address.clone(),
            city: submission.city.clone(),
            personal_number: None,
            preferred_date_time: None,
            details,
            status: status::PRICE_SENT.to_string(),
            confirmation_token: Some(token.clone()),
            token_expires_at: Some(expiry_from_now(TOKEN_TTL_DAYS)),
            user_id,
            created_at: None,
            updated_at: None,
        };

        let repo = match submission.submission_kind {
            SubmissionKind::Quote => &self.quotes,
            SubmissionKind::Booking => &self.bookings,
        };

        // Persist failure must not stop the notification emails; the lead
        // still reaches the admin inbox.
        let stored = match repo.create(record.clone()).await {
            Ok(stored) => stored,
            Err(e) => {
                error!("Failed to persist submission, sending emails anyway: {}", e);
                record
            }
        };

        let (user_email_sent, user_email_error) = match &stored.email {
            Some(_) => match self
                .notifier
                .send_quote_email(&stored, price.as_ref(), &token)
                .await
            {
                Ok(()) => (true, None),
                Err(e) => {
                    warn!("Customer email failed: {}", e);
                    (false, Some(e.to_string()))
                }
            },
            None => (false, None),
        };

        let admin_email_sent = match self
            .notifier
            .send_intake_admin_email(&stored, price.as_ref())
            .await
        {
            Ok(()) => true,
            Err(e) => {
                warn!("Admin email failed: {}", e);
                false
            }
        };

        if !admin_email_sent && !user_email_sent {
            return Err(ServiceError::InternalError(
                "Could not deliver any notification email".to_string(),
            ));
        }

        info!(
            admin_email_sent,
            user_email_sent, "Intake submission processed"
        );

        Ok(IntakeResponse {
            message: "Request received".to_string(),
            admin_email_sent,
            user_email_sent,
            user_email_address: stored.email.clone(),
            user_email_error,
        })
    }
}

/// The full original submission as an open JSON map. Typed fields and the
/// service-specific extras all land here; the record's columns are a
/// read-back convenience, the blob is the source of truth.
fn submission_details(submission: &IntakeRequest) -> Map<String, Value> {
    match serde_json::to_value(submission) {
        Ok(Value::Object(map)) => map,
        _ => submission.extra.clone(),
    }
}

/// Area for pricing, picked by the precedence chain over the details blob.
fn submission_area(details: &Map<String, Value>) -> Option<f64> {
    fields::area_from_details(details)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_submission_details_keeps_every_field() {
        let submission: IntakeRequest = serde_json::from_value(json!({
            "name": "Anna",
            "phone": "0701234567",
            "email": "anna@example.com",
            "service": "Flyttstädning",
            "squareMeters": 45,
            "moveOutDate": "2026-09-15"
        }))
        .expect("valid submission");

        let details = submission_details(&submission);
        assert_eq!(details.get("name"), Some(&json!("Anna")));
        assert_eq!(details.get("squareMeters"), Some(&json!(45)));
        assert_eq!(details.get("moveOutDate"), Some(&json!("2026-09-15")));
    }

    #[test]
    fn test_submission_area_uses_precedence_chain() {
        let submission: IntakeRequest = serde_json::from_value(json!({
            "name": "Anna",
            "phone": "0701234567",
            "service": "Kontorsstädning",
            "officeArea": "120",
        }))
        .expect("valid submission");
        let details = submission_details(&submission);
        assert_eq!(submission_area(&details), Some(120.0));
    }
}
