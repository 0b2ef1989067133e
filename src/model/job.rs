use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Statuses a contractor job offer moves through. `confirmed` and `taken`
/// are terminal.
pub mod status {
    pub const ACTIVE: &str = "active";
    pub const CONFIRMED: &str = "confirmed";
    pub const TAKEN: &str = "taken";
}

/// One contractor's dispatch offer for a confirmed booking. All offers
/// spawned from the same booking confirmation share a `batch_id`; at most
/// one job per batch may ever reach `confirmed`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub contractor_id: ObjectId,
    pub job_type: String,
    pub address: String,
    pub area: Option<String>,
    pub scheduled_date: Option<String>,
    pub contractor_price: Option<i64>,
    pub status: String,
    pub confirmation_token: Option<String>,
    pub token_expires_at: Option<DateTime<Utc>>,
    pub batch_id: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Job {
    pub fn is_confirmed(&self) -> bool {
        self.status == status::CONFIRMED
    }

    pub fn is_active(&self) -> bool {
        self.status == status::ACTIVE
    }

    pub fn token_expired(&self, now: DateTime<Utc>) -> bool {
        match self.token_expires_at {
            Some(expires_at) => expires_at < now,
            None => self.confirmation_token.is_some(),
        }
    }

    /// Contractor price formatted for display ("1369 kr" or "Not specified").
    pub fn price_display(&self) -> String {
        match self.contractor_price {
            Some(price) => format!("{} kr", price),
            None => "Not specified".to_string(),
        }
    }
}
