mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{get, post_json, TestContext};
use klarstad_backend::util::token::TOKEN_LENGTH;

fn quote_submission() -> serde_json::Value {
    json!({
        "name": "Anna Svensson",
        "phone": "0701234567",
        "email": "Anna@Example.com",
        "service": "Flyttstädning",
        "city": "Stockholm",
        "squareMeters": 45,
        "moveOutDate": "2026-09-15"
    })
}

#[tokio::test]
async fn health_endpoint_responds() {
    let ctx = TestContext::new();
    let (status, body) = get(&ctx.router, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn intake_stores_quote_with_token_and_sends_both_emails() {
    let ctx = TestContext::new();

    let (status, body) = post_json(&ctx.router, "/lead-intake", &quote_submission()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["adminEmailSent"], true);
    assert_eq!(body["userEmailSent"], true);
    assert_eq!(body["userEmailAddress"], "anna@example.com");

    let stored = ctx.quotes.all();
    assert_eq!(stored.len(), 1);
    let quote = &stored[0];
    assert_eq!(quote.status, "price-sent");
    assert_eq!(quote.email.as_deref(), Some("anna@example.com"));
    assert_eq!(quote.area, Some(45.0));

    let token = quote.confirmation_token.as_deref().expect("token issued");
    assert_eq!(token.len(), TOKEN_LENGTH);
    assert!(quote.token_expires_at.is_some());

    // Nothing lands in bookings until the customer confirms.
    assert!(ctx.bookings.all().is_empty());

    // Customer email carries the price for 45 m² and the confirmation link.
    let to_customer = ctx.mailer.sent_to("anna@example.com");
    assert_eq!(to_customer.len(), 1);
    let text = to_customer[0].text_body.as_deref().expect("text body");
    assert!(text.contains("1825"));
    assert!(text.contains("1775-1875"));
    assert!(text.contains(&format!("/confirm/{}", token)));

    let to_admin = ctx.mailer.sent_to("admin@klarstad.test");
    assert_eq!(to_admin.len(), 1);

    // Customer identity is upserted under the normalized email.
    assert_eq!(ctx.users.all().len(), 1);
}

#[tokio::test]
async fn intake_booking_kind_lands_in_bookings_store() {
    let ctx = TestContext::new();

    let mut submission = quote_submission();
    submission["submissionKind"] = json!("booking");

    let (status, _) = post_json(&ctx.router, "/lead-intake", &submission).await;
    assert_eq!(status, StatusCode::OK);
    assert!(ctx.quotes.all().is_empty());
    assert_eq!(ctx.bookings.all().len(), 1);
}

#[tokio::test]
async fn intake_rejects_invalid_submission() {
    let ctx = TestContext::new();

    let mut submission = quote_submission();
    submission["name"] = json!("");

    let (status, body) = post_json(&ctx.router, "/lead-intake", &submission).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BadRequest");
    assert!(ctx.quotes.all().is_empty());
    assert!(ctx.mailer.sent().is_empty());
}

#[tokio::test]
async fn intake_rejects_body_missing_required_fields() {
    let ctx = TestContext::new();

    let (status, body) = post_json(&ctx.router, "/lead-intake", &json!({ "name": "Anna" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BadRequest");
    assert!(ctx.quotes.all().is_empty());
}

#[tokio::test]
async fn intake_fails_fast_without_mail_provider() {
    let ctx = TestContext::without_mailer();

    let (status, _) = post_json(&ctx.router, "/lead-intake", &quote_submission()).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(ctx.quotes.all().is_empty());
}

#[tokio::test]
async fn intake_persist_failure_still_delivers_emails() {
    let ctx = TestContext::new();
    ctx.quotes.fail_creates(true);

    let (status, body) = post_json(&ctx.router, "/lead-intake", &quote_submission()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["adminEmailSent"], true);
    assert_eq!(body["userEmailSent"], true);

    assert!(ctx.quotes.all().is_empty());
    assert_eq!(ctx.mailer.sent().len(), 2);
}

#[tokio::test]
async fn intake_without_customer_email_notifies_admin_only() {
    let ctx = TestContext::new();

    let mut submission = quote_submission();
    submission.as_object_mut().expect("object").remove("email");

    let (status, body) = post_json(&ctx.router, "/lead-intake", &submission).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["adminEmailSent"], true);
    assert_eq!(body["userEmailSent"], false);
    assert_eq!(ctx.mailer.sent().len(), 1);
}

#[tokio::test]
async fn intake_errors_when_no_email_can_be_delivered() {
    let ctx = TestContext::new();
    ctx.mailer.fail_sends(true);

    let (status, _) = post_json(&ctx.router, "/lead-intake", &quote_submission()).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}
