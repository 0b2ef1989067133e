use axum::{routing::get, Router};
use std::sync::Arc;

use crate::handler::contractor_handler::{confirm_job_handler, get_job_handler};
use crate::service::job_confirmation_service::JobConfirmationService;

pub fn contractor_router(service: Arc<JobConfirmationService>) -> Router {
    Router::new()
        .route(
            "/contractor/confirm",
            get(get_job_handler).post(confirm_job_handler),
        )
        .with_state(service)
}
