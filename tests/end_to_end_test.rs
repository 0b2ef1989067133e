mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{get, post_json, TestContext};

/// The full lifecycle: intake with a fixed price, customer confirmation,
/// contractor fan-out and a first-confirm-wins race resolution.
#[tokio::test]
async fn quote_to_taken_job_lifecycle() {
    let ctx = TestContext::new();

    // A 45 m² move-out clean prices at 1825 kr in the 1775-1875 band.
    let submission = json!({
        "name": "Anna Svensson",
        "phone": "0701234567",
        "email": "anna@example.com",
        "service": "Flyttstädning",
        "address": "Storgatan 1",
        "city": "Stockholm",
        "squareMeters": 45,
        "moveOutDate": "2026-09-15"
    });
    let (status, body) = post_json(&ctx.router, "/lead-intake", &submission).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["userEmailSent"], true);

    let quote_email = &ctx.mailer.sent_to("anna@example.com")[0];
    let quote_text = quote_email.text_body.as_deref().expect("text body");
    assert!(quote_text.contains("1825"));
    assert!(quote_text.contains("1775-1875"));

    let token = ctx.quotes.all()[0]
        .confirmation_token
        .clone()
        .expect("token issued");

    // The customer opens the link and confirms.
    let (status, body) = get(&ctx.router, &format!("/quote/{}", token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["type"], "quote");

    let confirm = json!({
        "token": token,
        "additionalInfo": {
            "personalNumber": "19 800101 1234",
            "preferredDateTime": "2026-09-15 09:00",
            "comments": "Key under the mat"
        }
    });
    let (status, body) = post_json(&ctx.router, "/confirm", &confirm).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    assert_eq!(
        ctx.quotes.all()[0].personal_number.as_deref(),
        Some("198001011234")
    );
    assert_eq!(ctx.bookings.all().len(), 1);

    // Both contractors got offers at 75% of 1825 kr.
    let jobs = ctx.jobs.all();
    assert_eq!(jobs.len(), 2);
    let job_tokens: Vec<String> = jobs
        .iter()
        .map(|j| j.confirmation_token.clone().expect("job token"))
        .collect();

    let (status, body) = get(
        &ctx.router,
        &format!("/contractor/confirm?token={}", job_tokens[0]),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["job"]["price"], "1369 kr");
    assert_eq!(body["job"]["address"], "Storgatan 1");

    // First contractor takes the job.
    let (status, body) = post_json(
        &ctx.router,
        "/contractor/confirm",
        &json!({ "token": job_tokens[0] }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    // The second contractor is too late.
    let (status, _) = post_json(
        &ctx.router,
        "/contractor/confirm",
        &json!({ "token": job_tokens[1] }),
    )
    .await;
    assert_eq!(status, StatusCode::GONE);

    let jobs = ctx.jobs.all();
    assert_eq!(jobs.iter().filter(|j| j.status == "confirmed").count(), 1);
    assert_eq!(jobs.iter().filter(|j| j.status == "taken").count(), 1);
}
