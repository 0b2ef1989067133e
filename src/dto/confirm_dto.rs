use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::model::request::{RequestKind, ServiceRequest};

/// Body of `POST /confirm`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmRequest {
    #[validate(length(min = 1))]
    pub token: String,
    pub additional_info: AdditionalInfo,
}

/// Customer-confirmed details captured on the confirmation page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdditionalInfo {
    /// Swedish personal ID number; required, 10-12 digits after stripping.
    pub personal_number: String,
    pub preferred_date_time: Option<String>,
    /// When present but empty, the previously stored comments are kept.
    pub comments: Option<String>,
    pub selected_extra_id: Option<String>,
    pub selected_extra_label: Option<String>,
    pub extra_price_kr: Option<i64>,
    pub total_price_kr: Option<i64>,
}

/// Confirmed-record summary returned from `POST /confirm`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmedRecord {
    pub id: String,
    pub status: String,
    pub service: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmResponse {
    pub success: bool,
    pub message: String,
    pub already_confirmed: bool,
    pub record: ConfirmedRecord,
}

/// Response of `GET /quote/{token}`: the record plus which table it lives in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordResponse {
    pub record: ServiceRequest,
    #[serde(rename = "type")]
    pub kind: RequestKind,
}
