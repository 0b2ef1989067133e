use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::Validate;

/// Whether the submission is a price inquiry or a direct booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionKind {
    #[default]
    Quote,
    Booking,
}

/// Raw service-request submission from the web forms. Known contact and
/// service fields are typed; every service-specific extra field is captured
/// by the flattened map and preserved in the record's `details` blob.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct IntakeRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,

    #[validate(length(min = 5, max = 20))]
    pub phone: String,

    #[validate(email)]
    pub email: Option<String>,

    #[validate(length(min = 1, max = 100))]
    pub service: String,

    pub service_type: Option<String>,

    pub address: Option<String>,

    pub city: Option<String>,

    #[serde(default)]
    pub submission_kind: SubmissionKind,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Per-email delivery outcome of an intake submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntakeResponse {
    pub message: String,
    pub admin_email_sent: bool,
    pub user_email_sent: bool,
    pub user_email_address: Option<String>,
    pub user_email_error: Option<String>,
}
