use axum::{
    extract::{rejection::JsonRejection, State},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use validator::Validate;

use crate::dto::intake_dto::IntakeRequest;
use crate::service::intake_service::IntakeService;
use crate::util::error::HandlerError;

pub async fn intake_handler(
    State(service): State<Arc<IntakeService>>,
    payload: Result<Json<IntakeRequest>, JsonRejection>,
) -> Result<impl IntoResponse, HandlerError> {
    let Json(payload) = payload.map_err(|e| HandlerError::bad_request(e.body_text()))?;
    payload
        .validate()
        .map_err(|e| HandlerError::bad_request(format!("Validation error: {}", e)))?;

    let response = service.submit(payload).await?;
    Ok(Json(response))
}
