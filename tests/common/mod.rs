#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use bson::oid::ObjectId;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use klarstad_backend::app::app::build_router;
use klarstad_backend::config::SiteConfig;
use klarstad_backend::model::contractor::Contractor;
use klarstad_backend::repository::memory::{
    InMemoryContractorRepository, InMemoryJobRepository, InMemoryRequestRepository,
    InMemoryUserRepository,
};
use klarstad_backend::service::confirmation_service::ConfirmationService;
use klarstad_backend::service::dispatch_service::DispatchService;
use klarstad_backend::service::intake_service::IntakeService;
use klarstad_backend::service::job_confirmation_service::JobConfirmationService;
use klarstad_backend::service::notifications::Notifier;
use klarstad_backend::util::email::{EmailService, RecordingMailer};

/// The full application wired over in-memory stores and a recording mailer.
pub struct TestContext {
    pub router: Router,
    pub quotes: Arc<InMemoryRequestRepository>,
    pub bookings: Arc<InMemoryRequestRepository>,
    pub users: Arc<InMemoryUserRepository>,
    pub jobs: Arc<InMemoryJobRepository>,
    pub roster: Vec<Contractor>,
    pub mailer: Arc<RecordingMailer>,
    pub intake: Arc<IntakeService>,
    pub confirmation: Arc<ConfirmationService>,
    pub dispatch: Arc<DispatchService>,
    pub job_confirmation: Arc<JobConfirmationService>,
}

pub fn contractor(name: &str, email: Option<&str>) -> Contractor {
    Contractor {
        id: Some(ObjectId::new()),
        name: name.to_string(),
        email: email.map(String::from),
    }
}

pub fn default_roster() -> Vec<Contractor> {
    vec![
        contractor("Eriks Städ AB", Some("erik@example.com")),
        contractor("Blixtren AB", Some("jobb@blixtren.example.com")),
    ]
}

impl TestContext {
    pub fn new() -> Self {
        Self::build(default_roster(), true)
    }

    pub fn with_roster(roster: Vec<Contractor>) -> Self {
        Self::build(roster, true)
    }

    pub fn without_mailer() -> Self {
        Self::build(default_roster(), false)
    }

    fn build(roster: Vec<Contractor>, with_mailer: bool) -> Self {
        let quotes = Arc::new(InMemoryRequestRepository::new());
        let bookings = Arc::new(InMemoryRequestRepository::new());
        let users = Arc::new(InMemoryUserRepository::new());
        let jobs = Arc::new(InMemoryJobRepository::new());
        let contractors = Arc::new(InMemoryContractorRepository::new(roster.clone()));
        let mailer = Arc::new(RecordingMailer::new());

        let mailer_opt: Option<Arc<dyn EmailService>> = if with_mailer {
            Some(mailer.clone())
        } else {
            None
        };
        let notifier = Arc::new(Notifier::new(mailer_opt, SiteConfig::from_test_env()));

        let intake = Arc::new(IntakeService::new(
            quotes.clone(),
            bookings.clone(),
            users.clone(),
            notifier.clone(),
        ));
        let dispatch = Arc::new(DispatchService::new(
            jobs.clone(),
            contractors.clone(),
            notifier.clone(),
        ));
        let confirmation = Arc::new(ConfirmationService::new(
            quotes.clone(),
            bookings.clone(),
            notifier.clone(),
            dispatch.clone(),
        ));
        let job_confirmation = Arc::new(JobConfirmationService::new(
            jobs.clone(),
            contractors,
            notifier,
        ));

        let router = build_router(
            intake.clone(),
            confirmation.clone(),
            job_confirmation.clone(),
        );

        TestContext {
            router,
            quotes,
            bookings,
            users,
            jobs,
            roster,
            mailer,
            intake,
            confirmation,
            dispatch,
            job_confirmation,
        }
    }
}

pub async fn post_json(router: &Router, uri: &str, body: &Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("failed to build request");
    send(router, request).await
}

pub async fn get(router: &Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("failed to build request");
    send(router, request).await
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router
        .clone()
        .oneshot(request)
        .await
        .expect("router did not respond");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("failed to read body")
        .to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("response body is not JSON")
    };
    (status, body)
}
