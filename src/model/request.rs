use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Statuses a quote/booking record moves through.
pub mod status {
    pub const NEW: &str = "new";
    pub const PENDING: &str = "pending";
    pub const PRICE_SENT: &str = "price-sent";
    pub const CONFIRMED: &str = "confirmed";
}

/// Which collection a record lives in. Quotes and bookings share one shape;
/// the kind tags lookups and API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestKind {
    Quote,
    Booking,
}

impl RequestKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestKind::Quote => "quote",
            RequestKind::Booking => "booking",
        }
    }
}

/// A service request: a price inquiry (quote) or a committed booking.
///
/// `details` owns the full original submission plus confirmation-time
/// additions as an open JSON map; the typed columns are the subset the
/// workflow reads back.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRequest {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub service: String,
    pub service_type: Option<String>,
    pub area: Option<f64>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub personal_number: Option<String>,
    pub preferred_date_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub details: Map<String, Value>,
    pub status: String,
    pub confirmation_token: Option<String>,
    pub token_expires_at: Option<DateTime<Utc>>,
    pub user_id: Option<ObjectId>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl ServiceRequest {
    pub fn is_confirmed(&self) -> bool {
        self.status == status::CONFIRMED
    }

    /// A non-null token always carries an expiry; a missing expiry on a
    /// token-bearing record is treated as expired.
    pub fn token_expired(&self, now: DateTime<Utc>) -> bool {
        match self.token_expires_at {
            Some(expires_at) => expires_at < now,
            None => self.confirmation_token.is_some(),
        }
    }

    /// Copy of this (now confirmed) quote as a standalone booking record.
    /// Identity, token and relation fields are reset; scalar fields and the
    /// details blob carry over.
    pub fn materialize_booking(&self) -> ServiceRequest {
        ServiceRequest {
            id: None,
            confirmation_token: None,
            token_expires_at: None,
            user_id: None,
            created_at: None,
            updated_at: None,
            status: status::CONFIRMED.to_string(),
            ..self.clone()
        }
    }
}
