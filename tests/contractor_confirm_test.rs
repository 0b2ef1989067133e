mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use serde_json::{json, Map};

use common::{get, post_json, TestContext};
use klarstad_backend::model::job::{status as job_status, Job};
use klarstad_backend::model::request::{status, ServiceRequest};
use klarstad_backend::repository::job_repo::JobRepository;
use klarstad_backend::util::token::{expiry_from_now, issue_token};

/// Fan a booking out through the dispatch service and return the issued
/// job tokens in roster order.
async fn dispatch_batch(ctx: &TestContext) -> Vec<String> {
    let mut details = Map::new();
    details.insert("squareMeters".to_string(), json!(49));
    let booking = ServiceRequest {
        id: Some(bson::oid::ObjectId::new()),
        name: "Anna Svensson".to_string(),
        phone: "0701234567".to_string(),
        email: Some("anna@example.com".to_string()),
        service: "Flyttstädning".to_string(),
        service_type: None,
        area: Some(49.0),
        address: Some("Storgatan 1".to_string()),
        city: None,
        personal_number: Some("8801011234".to_string()),
        preferred_date_time: None,
        details,
        status: status::CONFIRMED.to_string(),
        confirmation_token: None,
        token_expires_at: None,
        user_id: None,
        created_at: Some(Utc::now()),
        updated_at: Some(Utc::now()),
    };
    ctx.dispatch.fan_out(&booking).await.expect("fan-out");
    ctx.jobs
        .all()
        .iter()
        .map(|j| j.confirmation_token.clone().expect("job token"))
        .collect()
}

#[tokio::test]
async fn get_job_renders_offer_details() {
    let ctx = TestContext::new();
    let tokens = dispatch_batch(&ctx).await;

    let (status, body) = get(
        &ctx.router,
        &format!("/contractor/confirm?token={}", tokens[0]),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["job"]["jobType"], "Flyttstädning");
    assert_eq!(body["job"]["address"], "Storgatan 1");
    assert_eq!(body["job"]["price"], "1369 kr");
    assert_eq!(body["job"]["status"], "active");
}

#[tokio::test]
async fn get_job_requires_a_token() {
    let ctx = TestContext::new();
    let (status, _) = get(&ctx.router, "/contractor/confirm").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn first_confirm_wins_and_closes_the_batch() {
    let ctx = TestContext::new();
    let tokens = dispatch_batch(&ctx).await;
    let batch_id = ctx.jobs.all()[0].batch_id.clone();

    let (status, body) = post_json(
        &ctx.router,
        "/contractor/confirm",
        &json!({ "token": tokens[0] }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["alreadyConfirmed"], false);

    let jobs = ctx.jobs.list_by_batch(&batch_id).await.expect("batch jobs");
    assert_eq!(jobs.len(), 2);
    let confirmed: Vec<_> = jobs.iter().filter(|j| j.is_confirmed()).collect();
    let taken: Vec<_> = jobs
        .iter()
        .filter(|j| j.status == job_status::TAKEN)
        .collect();
    assert_eq!(confirmed.len(), 1);
    assert_eq!(taken.len(), 1);
    assert_eq!(
        confirmed[0].confirmation_token.as_deref(),
        Some(tokens[0].as_str())
    );

    // Winner and admin both hear about it.
    assert_eq!(ctx.mailer.sent_to("admin@klarstad.test").len(), 1);
    let winner_email = ctx.roster[0].email.as_deref().expect("email");
    // One offer email from the fan-out plus the confirmation notice.
    assert_eq!(ctx.mailer.sent_to(winner_email).len(), 2);
}

#[tokio::test]
async fn losing_contractor_gets_gone() {
    let ctx = TestContext::new();
    let tokens = dispatch_batch(&ctx).await;

    let (status, _) = post_json(
        &ctx.router,
        "/contractor/confirm",
        &json!({ "token": tokens[0] }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = post_json(
        &ctx.router,
        "/contractor/confirm",
        &json!({ "token": tokens[1] }),
    )
    .await;
    assert_eq!(status, StatusCode::GONE);
    assert!(body["message"]
        .as_str()
        .expect("message")
        .contains("taken by another contractor"));
}

#[tokio::test]
async fn winner_reconfirm_is_idempotent() {
    let ctx = TestContext::new();
    let tokens = dispatch_batch(&ctx).await;
    let body = json!({ "token": tokens[0] });

    let (status, _) = post_json(&ctx.router, "/contractor/confirm", &body).await;
    assert_eq!(status, StatusCode::OK);

    let (status, second) = post_json(&ctx.router, "/contractor/confirm", &body).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["alreadyConfirmed"], true);

    // No duplicate notifications on the repeat.
    assert_eq!(ctx.mailer.sent_to("admin@klarstad.test").len(), 1);
}

#[tokio::test]
async fn concurrent_confirms_produce_exactly_one_winner() {
    let ctx = TestContext::new();
    let tokens = dispatch_batch(&ctx).await;

    let (first, second) = tokio::join!(
        ctx.job_confirmation.confirm_job(&tokens[0]),
        ctx.job_confirmation.confirm_job(&tokens[1]),
    );

    let winners = [first.is_ok(), second.is_ok()]
        .iter()
        .filter(|ok| **ok)
        .count();
    assert_eq!(winners, 1);

    let batch_id = ctx.jobs.all()[0].batch_id.clone();
    let jobs = ctx.jobs.list_by_batch(&batch_id).await.expect("batch jobs");
    let confirmed = jobs.iter().filter(|j| j.is_confirmed()).count();
    assert_eq!(confirmed, 1);
}

#[tokio::test]
async fn confirm_without_token_field_is_rejected() {
    let ctx = TestContext::new();
    let (status, body) = post_json(&ctx.router, "/contractor/confirm", &json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BadRequest");
}

#[tokio::test]
async fn expired_job_token_is_gone() {
    let ctx = TestContext::new();
    let token = issue_token();
    let job = Job {
        id: None,
        contractor_id: ctx.roster[0].id.expect("roster id"),
        job_type: "Flyttstädning".to_string(),
        address: "Storgatan 1".to_string(),
        area: Some("49 m²".to_string()),
        scheduled_date: None,
        contractor_price: Some(1369),
        status: job_status::ACTIVE.to_string(),
        confirmation_token: Some(token.clone()),
        token_expires_at: Some(Utc::now() - Duration::days(1)),
        batch_id: "stale-batch".to_string(),
        created_at: None,
        updated_at: None,
    };
    ctx.jobs.create(job).await.expect("seed job");

    let (status, _) = post_json(&ctx.router, "/contractor/confirm", &json!({ "token": token })).await;
    assert_eq!(status, StatusCode::GONE);
    assert_eq!(ctx.jobs.all()[0].status, job_status::ACTIVE);
}

#[tokio::test]
async fn unknown_job_token_is_not_found() {
    let ctx = TestContext::new();
    let (status, _) = post_json(
        &ctx.router,
        "/contractor/confirm",
        &json!({ "token": issue_token() }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn fresh_job_token_within_ttl_is_accepted() {
    let ctx = TestContext::new();
    let tokens = dispatch_batch(&ctx).await;

    let job = &ctx.jobs.all()[0];
    let expires = job.token_expires_at.expect("expiry set");
    assert!(expires > Utc::now());
    assert!(expires <= expiry_from_now(8));

    let (status, _) = get(
        &ctx.router,
        &format!("/contractor/confirm?token={}", tokens[0]),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}
