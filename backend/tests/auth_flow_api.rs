use std::time::Duration as StdDuration;

use axum::http::{Method, StatusCode};
use chrono::Duration;
use evently_backend::repositories::UserRepository;
use serde_json::json;

mod support;

use support::{test_app, test_app_with_failing_mailer};

#[tokio::test]
async fn register_login_logout_then_token_is_rejected() {
    let app = test_app();

    let (status, body) = app.register("alice", "alice@example.com", "pw1").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["username"], "alice");
    assert_eq!(body["email"], "alice@example.com");
    assert!(body.get("password_hash").is_none());
    assert!(body.get("current_token").is_none());

    let (status, body) = app.login("alice", "pw1").await;
    assert_eq!(status, StatusCode::OK);
    let token = body["accessToken"].as_str().unwrap().to_string();

    let (status, body) = app
        .request(Method::DELETE, "/auth/logout", None, Some(&token))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Logout successful");

    let (status, body) = app
        .request(Method::DELETE, "/auth/logout", None, Some(&token))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn register_validates_fields_and_email_format() {
    let app = test_app();

    let (status, body) = app
        .request(
            Method::POST,
            "/auth/register",
            Some(json!({ "username": "alice", "email": "alice@example.com" })),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Username, email, and password are required.");

    let (status, body) = app.register("alice", "alice-at-example", "pw1").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Check your email format.");
}

#[tokio::test]
async fn duplicate_username_or_email_conflicts() {
    let app = test_app();
    assert_eq!(
        app.register("alice", "alice@example.com", "pw1").await.0,
        StatusCode::CREATED
    );

    let (status, body) = app.register("alice", "other@example.com", "pw1").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Username or email is already taken.");

    let (status, _) = app.register("bob", "alice@example.com", "pw1").await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn login_failures_share_one_message() {
    let app = test_app();
    app.register("alice", "alice@example.com", "pw1").await;

    let (status, body) = app.login("", "").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Username and password are required.");

    let (wrong_status, wrong_body) = app.login("alice", "wrong").await;
    let (unknown_status, unknown_body) = app.login("nobody", "pw1").await;
    assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_body, unknown_body);
    assert_eq!(wrong_body["error"], "Invalid username or password.");
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() {
    let app = test_app();
    let (status, body) = app
        .request(
            Method::POST,
            "/auth/login",
            Some(json!("just a string")),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn logout_requires_a_token() {
    let app = test_app();
    let (status, body) = app.request(Method::DELETE, "/auth/logout", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Unauthorized: Missing token");

    let (status, body) = app
        .request(Method::DELETE, "/auth/logout", None, Some("not-a-jwt"))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Unauthorized: Invalid token");
}

#[tokio::test]
async fn session_token_stops_working_after_an_hour() {
    let app = test_app();
    let token = app.signed_in("alice").await;

    app.clock.advance(Duration::minutes(59));
    let event_id = app.create_event(&token).await;
    assert!(!event_id.is_empty());

    app.clock.advance(Duration::minutes(1));
    let (status, body) = app
        .request(Method::DELETE, "/auth/logout", None, Some(&token))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Unauthorized: Invalid token");
}

#[tokio::test]
async fn forgot_and_reset_password_flow() {
    let mut app = test_app();
    app.register("alice", "alice@example.com", "pw1").await;

    let (status, body) = app
        .request(
            Method::POST,
            "/auth/forgotPassword",
            Some(json!({ "email": "alice@example.com" })),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Password reset email sent");

    let (to, reset_token) = tokio::time::timeout(StdDuration::from_secs(5), app.outbox.recv())
        .await
        .expect("reset email dispatched")
        .expect("mailer channel open");
    assert_eq!(to, "alice@example.com");

    let stored = app
        .users
        .find_by_email("alice@example.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.reset_token(), Some(reset_token.as_str()));
    assert_eq!(
        stored.reset_token_expiration(),
        Some(evently_backend::utils::Clock::now(&app.clock) + Duration::hours(2))
    );

    let reset_body = json!({
        "email": "alice@example.com",
        "token": reset_token,
        "newPassword": "pw2"
    });
    let (status, body) = app
        .request(
            Method::POST,
            "/auth/resetPassword",
            Some(reset_body.clone()),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Password reset successful");

    let (status, _) = app
        .request(Method::POST, "/auth/resetPassword", Some(reset_body), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    assert_eq!(app.login("alice", "pw1").await.0, StatusCode::UNAUTHORIZED);
    assert_eq!(app.login("alice", "pw2").await.0, StatusCode::OK);
}

#[tokio::test]
async fn forgot_password_succeeds_when_mail_delivery_fails() {
    let mut app = test_app_with_failing_mailer();
    app.register("alice", "alice@example.com", "pw1").await;

    let (status, body) = app
        .request(
            Method::POST,
            "/auth/forgotPassword",
            Some(json!({ "email": "alice@example.com" })),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Password reset email sent");

    let (to, attempted_token) = tokio::time::timeout(StdDuration::from_secs(5), app.outbox.recv())
        .await
        .expect("delivery attempted")
        .expect("mailer channel open");
    assert_eq!(to, "alice@example.com");

    let stored = app
        .users
        .find_by_email("alice@example.com")
        .await
        .unwrap()
        .unwrap();
    let token = stored.reset_token().expect("reset token stored");
    assert_eq!(token.len(), 64);
    assert_eq!(token, attempted_token);
    assert!(stored.reset_token_expiration().is_some());
}

#[tokio::test]
async fn forgot_password_for_unknown_email_is_unauthorized() {
    let app = test_app();
    let (status, body) = app
        .request(
            Method::POST,
            "/auth/forgotPassword",
            Some(json!({ "email": "ghost@example.com" })),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid email");

    let (status, body) = app
        .request(
            Method::POST,
            "/auth/forgotpassword",
            Some(json!({ "email": "ghost@example.com" })),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid email");
}

#[tokio::test]
async fn expired_reset_token_is_rejected() {
    let mut app = test_app();
    app.register("alice", "alice@example.com", "pw1").await;
    app.request(
        Method::POST,
        "/auth/forgotPassword",
        Some(json!({ "email": "alice@example.com" })),
        None,
    )
    .await;
    let (_, reset_token) = app.outbox.recv().await.expect("reset email");

    app.clock.advance(Duration::hours(2));
    let (status, body) = app
        .request(
            Method::POST,
            "/auth/resetPassword",
            Some(json!({
                "email": "alice@example.com",
                "token": reset_token,
                "newPassword": "pw2"
            })),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid reset token or expired");
    assert_eq!(app.login("alice", "pw1").await.0, StatusCode::OK);
}

#[tokio::test]
async fn reset_with_blank_password_is_a_bad_request() {
    let app = test_app();
    let (status, _) = app
        .request(
            Method::POST,
            "/auth/resetPassword",
            Some(json!({ "email": "alice@example.com", "token": "t", "newPassword": "" })),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn responses_carry_request_id() {
    let app = test_app();
    let response = tower::ServiceExt::oneshot(
        app.router.clone(),
        axum::http::Request::builder()
            .method(Method::POST)
            .uri("/auth/login")
            .header("content-type", "application/json")
            .header("x-request-id", "req-42")
            .body(axum::body::Body::from(r#"{"username":"a","password":"b"}"#))
            .unwrap(),
    )
    .await
    .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.headers().get("x-request-id").unwrap(), "req-42");
}
