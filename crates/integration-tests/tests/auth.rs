//! Integration tests for registration, login, and account management.

#![allow(clippy::unwrap_used)]

use atlas_integration_tests::TestContext;
use reqwest::StatusCode;
use serde_json::{Value, json};

#[tokio::test]
async fn test_register_returns_token_and_user() {
    let ctx = TestContext::new().await;

    let resp = ctx
        .client
        .post(ctx.url("/auth/register"))
        .json(&json!({ "username": "alice", "email": "a@x.com", "password": "secret1" }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = resp.json().await.unwrap();
    assert!(body["token"].as_str().is_some_and(|t| !t.is_empty()));
    assert_eq!(body["user"]["username"], "alice");
    assert_eq!(body["user"]["email"], "a@x.com");
}

#[tokio::test]
async fn test_register_duplicate_username_is_rejected() {
    let ctx = TestContext::new().await;
    ctx.register("alice", "a@x.com", "secret1").await;

    // Same username, different email.
    let resp = ctx
        .client
        .post(ctx.url("/auth/register"))
        .json(&json!({ "username": "alice", "email": "other@x.com", "password": "secret1" }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Username already exists");
}

#[tokio::test]
async fn test_register_short_password_is_rejected() {
    let ctx = TestContext::new().await;

    let resp = ctx
        .client
        .post(ctx.url("/auth/register"))
        .json(&json!({ "username": "alice", "email": "a@x.com", "password": "12345" }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Password must be at least 6 characters");
}

#[tokio::test]
async fn test_login_by_username_or_email() {
    let ctx = TestContext::new().await;
    ctx.register("alice", "a@x.com", "secret1").await;

    for body in [
        json!({ "username": "alice", "password": "secret1" }),
        json!({ "email": "a@x.com", "password": "secret1" }),
    ] {
        let resp = ctx
            .client
            .post(ctx.url("/auth/login"))
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let body: Value = resp.json().await.unwrap();
        assert!(body["token"].as_str().is_some());
    }

    let resp = ctx
        .client
        .post(ctx.url("/auth/login"))
        .json(&json!({ "username": "alice", "password": "wrongpw" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_me_requires_valid_token() {
    let ctx = TestContext::new().await;
    let token = ctx.register("alice", "a@x.com", "secret1").await;

    let resp = ctx
        .client
        .get(ctx.url("/auth/me"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["username"], "alice");

    // Missing and malformed tokens are rejected before the handler.
    let resp = ctx.client.get(ctx.url("/auth/me")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = ctx
        .client
        .get(ctx.url("/auth/me"))
        .bearer_auth("not-a-token")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_acknowledges() {
    let ctx = TestContext::new().await;

    let resp = ctx
        .client
        .post(ctx.url("/auth/logout"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn test_profile_update_rejects_taken_username() {
    let ctx = TestContext::new().await;
    ctx.register("alice", "a@x.com", "secret1").await;
    let token = ctx.register("bob", "b@x.com", "secret1").await;

    let resp = ctx
        .client
        .put(ctx.url("/users/profile"))
        .bearer_auth(&token)
        .json(&json!({ "username": "alice", "email": "b@x.com" }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Username already in use");

    // Keeping your own identifiers is not a conflict.
    let resp = ctx
        .client
        .put(ctx.url("/users/profile"))
        .bearer_auth(&token)
        .json(&json!({ "username": "bob", "email": "b@x.com" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_reset_password_flow() {
    let ctx = TestContext::new().await;
    let token = ctx.register("alice", "a@x.com", "secret1").await;

    // Wrong current password.
    let resp = ctx
        .client
        .put(ctx.url("/users/reset-password"))
        .bearer_auth(&token)
        .json(&json!({ "currentPassword": "wrong", "newPassword": "newsecret" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // Correct current password.
    let resp = ctx
        .client
        .put(ctx.url("/users/reset-password"))
        .bearer_auth(&token)
        .json(&json!({ "currentPassword": "secret1", "newPassword": "newsecret" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    // Old password no longer works, new one does.
    let resp = ctx
        .client
        .post(ctx.url("/auth/login"))
        .json(&json!({ "username": "alice", "password": "secret1" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = ctx
        .client
        .post(ctx.url("/auth/login"))
        .json(&json!({ "username": "alice", "password": "newsecret" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}
