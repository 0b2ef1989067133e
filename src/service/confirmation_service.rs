use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde_json::Value;
use tracing::{error, info, instrument, warn};

use crate::dto::confirm_dto::{AdditionalInfo, ConfirmResponse, ConfirmedRecord};
use crate::model::request::{status, RequestKind, ServiceRequest};
use crate::repository::request_repo::RequestRepository;
use crate::service::dispatch_service::DispatchService;
use crate::service::notifications::Notifier;
use crate::util::error::ServiceError;

/// Customer confirmation: validates the token, promotes the record to
/// `confirmed`, materializes quotes into bookings and triggers the
/// contractor fan-out.
pub struct ConfirmationService {
    quotes: Arc<dyn RequestRepository>,
    bookings: Arc<dyn RequestRepository>,
    notifier: Arc<Notifier>,
    dispatch: Arc<DispatchService>,
}

impl ConfirmationService {
    pub fn new(
        quotes: Arc<dyn RequestRepository>,
        bookings: Arc<dyn RequestRepository>,
        notifier: Arc<Notifier>,
        dispatch: Arc<DispatchService>,
    ) -> Self {
        ConfirmationService {
            quotes,
            bookings,
            notifier,
            dispatch,
        }
    }

    /// Token lookup across both tables: quotes first, then bookings.
    async fn find_by_token(
        &self,
        token: &str,
    ) -> Result<Option<(ServiceRequest, RequestKind)>, ServiceError> {
        if let Some(quote) = self.quotes.find_by_token(token).await? {
            return Ok(Some((quote, RequestKind::Quote)));
        }
        if let Some(booking) = self.bookings.find_by_token(token).await? {
            return Ok(Some((booking, RequestKind::Booking)));
        }
        Ok(None)
    }

    /// Read-only lookup used to render the customer confirmation page.
    #[instrument(skip(self, token))]
    pub async fn get_by_token(
        &self,
        token: &str,
    ) -> Result<(ServiceRequest, RequestKind), ServiceError> {
        let (record, kind) = self
            .find_by_token(token)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Invalid or expired token".to_string()))?;

        if !record.is_confirmed() && record.token_expired(Utc::now()) {
            return Err(ServiceError::Expired(
                "This confirmation link has expired".to_string(),
            ));
        }
        Ok((record, kind))
    }

    #[instrument(skip(self, token, info))]
    pub async fn confirm(
        &self,
        token: &str,
        info: AdditionalInfo,
    ) -> Result<ConfirmResponse, ServiceError> {
        let (record, kind) = self
            .find_by_token(token)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Invalid or expired token".to_string()))?;

        if record.token_expired(Utc::now()) {
            return Err(ServiceError::Expired(
                "This confirmation link has expired".to_string(),
            ));
        }

        // Duplicate confirmation by the customer: success, no side effects.
        if record.is_confirmed() {
            info!("Record already confirmed, idempotent response");
            return Ok(ConfirmResponse {
                success: true,
                message: "Already confirmed".to_string(),
                already_confirmed: true,
                record: summarize(&record),
            });
        }

        let personal_number = validate_personal_number(&info.personal_number)?;
        let preferred_date_time = parse_preferred_date_time(info.preferred_date_time.as_deref())?;

        let mut updated = record.clone();
        updated.status = status::CONFIRMED.to_string();
        updated.personal_number = Some(personal_number);
        if preferred_date_time.is_some() {
            updated.preferred_date_time = preferred_date_time;
        }
        merge_confirmation_details(&mut updated, &info);

        let record_id = updated
            .id
            .ok_or_else(|| ServiceError::InternalError("Record has no id".to_string()))?;

        // Primary mutation; everything after this is best-effort.
        let confirmed = match kind {
            RequestKind::Quote => self.quotes.update(record_id, updated).await?,
            RequestKind::Booking => self.bookings.update(record_id, updated).await?,
        };

        // Quotes materialize into a standalone booking row; the quote row
        // itself stays behind as the inquiry record.
        let dispatch_target = match kind {
            RequestKind::Quote => {
                match self.bookings.create(confirmed.materialize_booking()).await {
                    Ok(booking) => Some(booking),
                    Err(e) => {
                        error!("Failed to materialize booking from quote: {}", e);
                        None
                    }
                }
            }
            RequestKind::Booking => Some(confirmed.clone()),
        };

        if let Err(e) = self.notifier.send_booking_confirmed_email(&confirmed).await {
            warn!("Customer confirmation email failed: {}", e);
        }
        if let Err(e) = self
            .notifier
            .send_booking_confirmed_admin_email(&confirmed)
            .await
        {
            warn!("Admin confirmation email failed: {}", e);
        }

        match dispatch_target {
            Some(booking) => {
                if let Err(e) = self.dispatch.fan_out(&booking).await {
                    error!("Contractor fan-out failed: {}", e);
                }
            }
            None => warn!("No booking to dispatch, skipping contractor fan-out"),
        }

        info!(id = %record_id, "Booking confirmed");

        Ok(ConfirmResponse {
            success: true,
            message: "Booking confirmed".to_string(),
            already_confirmed: false,
            record: summarize(&confirmed),
        })
    }
}

fn summarize(record: &ServiceRequest) -> ConfirmedRecord {
    ConfirmedRecord {
        id: record.id.map(|id| id.to_hex()).unwrap_or_default(),
        status: record.status.clone(),
        service: record.service.clone(),
    }
}

/// Swedish personal ID number: digits only after stripping separators,
/// 10-12 digits long.
pub fn validate_personal_number(raw: &str) -> Result<String, ServiceError> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() < 10 || digits.len() > 12 {
        return Err(ServiceError::InvalidInput(
            "Personal number must contain 10-12 digits".to_string(),
        ));
    }
    Ok(digits)
}

/// The confirmation page sends the preferred time in a handful of shapes;
/// anything unrecognizable is rejected rather than silently dropped.
fn parse_preferred_date_time(raw: Option<&str>) -> Result<Option<DateTime<Utc>>, ServiceError> {
    let raw = match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => raw,
        None => return Ok(None),
    };

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(Some(dt.with_timezone(&Utc)));
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(Some(Utc.from_utc_datetime(&naive)));
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        if let Some(naive) = date.and_hms_opt(0, 0, 0) {
            return Ok(Some(Utc.from_utc_datetime(&naive)));
        }
    }

    Err(ServiceError::InvalidInput(
        "Preferred date/time is not a valid date".to_string(),
    ))
}

/// Non-destructive merge of the confirmation-time additions into the
/// details blob: prior keys survive unless explicitly overwritten.
fn merge_confirmation_details(record: &mut ServiceRequest, info: &AdditionalInfo) {
    let details = &mut record.details;

    if let Some(id) = &info.selected_extra_id {
        details.insert("selectedExtraId".to_string(), Value::from(id.clone()));
    }
    if let Some(label) = &info.selected_extra_label {
        details.insert("selectedExtraLabel".to_string(), Value::from(label.clone()));
    }
    if let Some(price) = info.extra_price_kr {
        details.insert("extraPriceKr".to_string(), Value::from(price));
    }
    if let Some(total) = info.total_price_kr {
        details.insert("totalPriceKr".to_string(), Value::from(total));
    }
    if let Some(dt) = &info.preferred_date_time {
        if !dt.trim().is_empty() {
            details.insert("preferredDateTime".to_string(), Value::from(dt.clone()));
        }
    }
    // An empty comments value with the key present keeps whatever was
    // stored before.
    if let Some(comments) = &info.comments {
        if !comments.trim().is_empty() {
            details.insert("comments".to_string(), Value::from(comments.clone()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_personal_number_lengths() {
        assert!(validate_personal_number("123456789").is_err()); // 9
        assert!(validate_personal_number("1234567890").is_ok()); // 10
        assert!(validate_personal_number("12345678901").is_ok()); // 11
        assert!(validate_personal_number("123456789012").is_ok()); // 12
        assert!(validate_personal_number("1234567890123").is_err()); // 13
    }

    #[test]
    fn test_personal_number_strips_separators() {
        assert_eq!(
            validate_personal_number("880101-1234").expect("valid"),
            "8801011234"
        );
        assert_eq!(
            validate_personal_number("19 800101 1234").expect("valid"),
            "198001011234"
        );
    }

    #[test]
    fn test_preferred_date_time_formats() {
        assert!(parse_preferred_date_time(None).expect("ok").is_none());
        assert!(parse_preferred_date_time(Some("")).expect("ok").is_none());
        assert!(parse_preferred_date_time(Some("2026-09-15T10:30"))
            .expect("ok")
            .is_some());
        assert!(parse_preferred_date_time(Some("2026-09-15"))
            .expect("ok")
            .is_some());
        assert!(parse_preferred_date_time(Some("not a date")).is_err());
    }

    #[test]
    fn test_merge_keeps_prior_keys() {
        let mut record: ServiceRequest = serde_json::from_value(json!({
            "name": "Anna",
            "phone": "0701234567",
            "email": null,
            "service": "Flyttstädning",
            "serviceType": null,
            "area": 45.0,
            "address": null,
            "city": null,
            "personalNumber": null,
            "preferredDateTime": null,
            "details": {"squareMeters": 45, "comments": "ring the bell"},
            "status": "price-sent",
            "confirmationToken": null,
            "tokenExpiresAt": null,
            "userId": null,
            "createdAt": null,
            "updatedAt": null
        }))
        .expect("valid record");

        let info = AdditionalInfo {
            personal_number: "8801011234".to_string(),
            preferred_date_time: None,
            comments: Some("".to_string()),
            selected_extra_id: Some("fridge".to_string()),
            selected_extra_label: Some("Fridge cleaning".to_string()),
            extra_price_kr: Some(300),
            total_price_kr: Some(2125),
        };
        merge_confirmation_details(&mut record, &info);

        assert_eq!(record.details.get("squareMeters"), Some(&json!(45)));
        assert_eq!(record.details.get("comments"), Some(&json!("ring the bell")));
        assert_eq!(record.details.get("selectedExtraId"), Some(&json!("fridge")));
        assert_eq!(record.details.get("totalPriceKr"), Some(&json!(2125)));
    }
}
