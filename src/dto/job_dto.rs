use serde::{Deserialize, Serialize};

use crate::model::job::Job;

/// Display-formatted job fields for the contractor-facing confirmation page
/// (`GET /contractor/confirm`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobView {
    pub id: String,
    pub job_type: String,
    pub address: String,
    pub area: String,
    pub date: String,
    pub price: String,
    pub status: String,
}

impl From<&Job> for JobView {
    fn from(job: &Job) -> Self {
        JobView {
            id: job.id.map(|id| id.to_hex()).unwrap_or_default(),
            job_type: job.job_type.clone(),
            address: job.address.clone(),
            area: job
                .area
                .clone()
                .unwrap_or_else(|| "Not specified".to_string()),
            date: job
                .scheduled_date
                .clone()
                .unwrap_or_else(|| "Not specified".to_string()),
            price: job.price_display(),
            status: job.status.clone(),
        }
    }
}

/// Job summary returned from `POST /contractor/confirm`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSummary {
    pub id: String,
    pub job_type: String,
    pub address: String,
    pub date: String,
    pub price: String,
}

impl From<&Job> for JobSummary {
    fn from(job: &Job) -> Self {
        JobSummary {
            id: job.id.map(|id| id.to_hex()).unwrap_or_default(),
            job_type: job.job_type.clone(),
            address: job.address.clone(),
            date: job
                .scheduled_date
                .clone()
                .unwrap_or_else(|| "Not specified".to_string()),
            price: job.price_display(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobViewResponse {
    pub job: JobView,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobConfirmResponse {
    pub success: bool,
    pub message: String,
    pub already_confirmed: bool,
    pub job: JobSummary,
}
