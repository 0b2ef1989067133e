use axum::{
    extract::{rejection::JsonRejection, Path, State},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use validator::Validate;

use crate::dto::confirm_dto::{ConfirmRequest, RecordResponse};
use crate::service::confirmation_service::ConfirmationService;
use crate::util::error::HandlerError;
use crate::util::token::is_well_formed;

/// GET /quote/{token} — the record behind a confirmation link.
pub async fn get_record_handler(
    State(service): State<Arc<ConfirmationService>>,
    Path(token): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    if !is_well_formed(&token) {
        return Err(HandlerError::bad_request("Malformed token"));
    }

    let (record, kind) = service.get_by_token(&token).await?;
    Ok(Json(RecordResponse { record, kind }))
}

/// POST /confirm — confirm a quote/booking with the customer's details.
pub async fn confirm_handler(
    State(service): State<Arc<ConfirmationService>>,
    payload: Result<Json<ConfirmRequest>, JsonRejection>,
) -> Result<impl IntoResponse, HandlerError> {
    let Json(payload) = payload.map_err(|e| HandlerError::bad_request(e.body_text()))?;
    payload
        .validate()
        .map_err(|e| HandlerError::bad_request(format!("Validation error: {}", e)))?;
    if !is_well_formed(&payload.token) {
        return Err(HandlerError::bad_request("Malformed token"));
    }

    let response = service.confirm(&payload.token, payload.additional_info).await?;
    Ok(Json(response))
}
