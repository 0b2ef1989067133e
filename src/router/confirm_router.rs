use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::handler::confirm_handler::{confirm_handler, get_record_handler};
use crate::service::confirmation_service::ConfirmationService;

pub fn confirm_router(service: Arc<ConfirmationService>) -> Router {
    Router::new()
        .route("/quote/{token}", get(get_record_handler))
        .route("/confirm", post(confirm_handler))
        .with_state(service)
}
