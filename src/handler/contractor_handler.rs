use axum::{
    extract::{rejection::JsonRejection, Query, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::dto::job_dto::{JobView, JobViewResponse};
use crate::service::job_confirmation_service::JobConfirmationService;
use crate::util::error::HandlerError;
use crate::util::token::is_well_formed;

#[derive(Debug, Deserialize)]
pub struct TokenQuery {
    pub token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TokenBody {
    pub token: Option<String>,
}

fn required_token(token: Option<String>) -> Result<String, HandlerError> {
    match token {
        Some(token) if is_well_formed(&token) => Ok(token),
        Some(_) => Err(HandlerError::bad_request("Malformed token")),
        None => Err(HandlerError::bad_request("Missing token")),
    }
}

/// GET /contractor/confirm?token= — job details for the confirmation page.
pub async fn get_job_handler(
    State(service): State<Arc<JobConfirmationService>>,
    Query(params): Query<TokenQuery>,
) -> Result<impl IntoResponse, HandlerError> {
    let token = required_token(params.token)?;
    let job = service.get_job(&token).await?;
    Ok(Json(JobViewResponse {
        job: JobView::from(&job),
    }))
}

/// POST /contractor/confirm — claim the job; first confirm wins the batch.
pub async fn confirm_job_handler(
    State(service): State<Arc<JobConfirmationService>>,
    payload: Result<Json<TokenBody>, JsonRejection>,
) -> Result<impl IntoResponse, HandlerError> {
    let Json(payload) = payload.map_err(|e| HandlerError::bad_request(e.body_text()))?;
    let token = required_token(payload.token)?;
    let response = service.confirm_job(&token).await?;
    Ok(Json(response))
}
