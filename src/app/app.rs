use std::sync::Arc;

use axum::{routing::get, Json, Router};
use serde_json::json;
use tracing::{info, warn};

use crate::config::{AppConfig, EmailConfig, MongoConfig, SiteConfig};
use crate::repository::contractor_repo::MongoContractorRepository;
use crate::repository::job_repo::MongoJobRepository;
use crate::repository::request_repo::MongoRequestRepository;
use crate::repository::user_repo::MongoUserRepository;
use crate::router::{confirm_router, contractor_router, intake_router};
use crate::service::confirmation_service::ConfirmationService;
use crate::service::dispatch_service::DispatchService;
use crate::service::intake_service::IntakeService;
use crate::service::job_confirmation_service::JobConfirmationService;
use crate::service::notifications::Notifier;
use crate::util::email::{EmailService, SmtpEmailService};

pub struct App {
    router: Router,
    config: AppConfig,
}

impl App {
    pub async fn new() -> Self {
        let config = AppConfig::from_env();
        let mongo_config = MongoConfig::from_env().expect("Failed to load MongoDB config");
        let site_config = SiteConfig::from_env().expect("Failed to load site config");

        let mailer: Option<Arc<dyn EmailService>> = match EmailConfig::from_env() {
            Ok(email_config) => match SmtpEmailService::new(email_config) {
                Ok(service) => {
                    info!("SMTP email service configured");
                    Some(Arc::new(service))
                }
                Err(e) => {
                    warn!("SMTP transport setup failed, email disabled: {}", e);
                    None
                }
            },
            Err(e) => {
                warn!("Email config incomplete, email disabled: {}", e);
                None
            }
        };

        let quotes = Arc::new(
            MongoRequestRepository::new(&mongo_config, "quotes")
                .await
                .expect("Failed to connect to quotes collection"),
        );
        let bookings = Arc::new(
            MongoRequestRepository::new(&mongo_config, "bookings")
                .await
                .expect("Failed to connect to bookings collection"),
        );
        let users = Arc::new(
            MongoUserRepository::new(&mongo_config)
                .await
                .expect("Failed to connect to users collection"),
        );
        let jobs = Arc::new(
            MongoJobRepository::new(&mongo_config)
                .await
                .expect("Failed to connect to jobs collection"),
        );
        let contractors = Arc::new(
            MongoContractorRepository::new(&mongo_config)
                .await
                .expect("Failed to connect to contractors collection"),
        );

        let notifier = Arc::new(Notifier::new(mailer, site_config));

        let intake_service = Arc::new(IntakeService::new(
            quotes.clone(),
            bookings.clone(),
            users,
            notifier.clone(),
        ));
        let dispatch_service = Arc::new(DispatchService::new(
            jobs.clone(),
            contractors.clone(),
            notifier.clone(),
        ));
        let confirmation_service = Arc::new(ConfirmationService::new(
            quotes,
            bookings,
            notifier.clone(),
            dispatch_service,
        ));
        let job_confirmation_service =
            Arc::new(JobConfirmationService::new(jobs, contractors, notifier));

        let router = build_router(
            intake_service,
            confirmation_service,
            job_confirmation_service,
        );

        App { router, config }
    }

    pub async fn start(self) {
        let addr = self.config.bind_addr();
        info!("Listening on {}", addr);

        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .expect("Failed to bind address");
        axum::serve(listener, self.router)
            .await
            .expect("Server error");
    }
}

/// The full route table. Separated from `App` so tests can mount the same
/// routes over in-memory repositories.
pub fn build_router(
    intake: Arc<IntakeService>,
    confirmation: Arc<ConfirmationService>,
    job_confirmation: Arc<JobConfirmationService>,
) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .merge(intake_router(intake))
        .merge(confirm_router(confirmation))
        .merge(contractor_router(job_confirmation))
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}
