use axum::{routing::post, Router};
use std::sync::Arc;

use crate::handler::intake_handler::intake_handler;
use crate::service::intake_service::IntakeService;

pub fn intake_router(service: Arc<IntakeService>) -> Router {
    Router::new()
        .route("/lead-intake", post(intake_handler))
        .with_state(service)
}
