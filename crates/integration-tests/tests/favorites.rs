//! Integration tests for the favorites flow.

#![allow(clippy::unwrap_used)]

use atlas_integration_tests::TestContext;
use reqwest::StatusCode;
use serde_json::{Value, json};

#[tokio::test]
async fn test_add_duplicate_remove_cycle() {
    let ctx = TestContext::new().await;
    let token = ctx.register("alice", "a@x.com", "secret1").await;

    // Add EE.
    let resp = ctx
        .client
        .post(ctx.url("/favorites"))
        .bearer_auth(&token)
        .json(&json!({ "code": "EE", "name": "Estonia", "flag": "https://flagcdn.com/w320/ee.png" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "Added to favorites");
    assert_eq!(body["favorites"].as_array().unwrap().len(), 1);

    // Adding EE again is rejected.
    let resp = ctx
        .client
        .post(ctx.url("/favorites"))
        .bearer_auth(&token)
        .json(&json!({ "code": "EE", "name": "Estonia", "flag": "" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Country already in favorites");

    // The rejected attempt did not grow the sequence.
    let resp = ctx
        .client
        .get(ctx.url("/favorites"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let favorites: Vec<Value> = resp.json().await.unwrap();
    assert_eq!(favorites.len(), 1);

    // Remove EE; favorites are now empty.
    let resp = ctx
        .client
        .delete(ctx.url("/favorites/EE"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "Removed from favorites");
    assert!(body["favorites"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_remove_absent_favorite_is_a_noop() {
    let ctx = TestContext::new().await;
    let token = ctx.register("alice", "a@x.com", "secret1").await;

    let resp = ctx
        .client
        .delete(ctx.url("/favorites/NO"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert!(body["favorites"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_favorites_keep_insertion_order() {
    let ctx = TestContext::new().await;
    let token = ctx.register("alice", "a@x.com", "secret1").await;

    for code in ["NO", "EE", "PE"] {
        let resp = ctx
            .client
            .post(ctx.url("/favorites"))
            .bearer_auth(&token)
            .json(&json!({ "code": code, "name": "", "flag": "" }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let resp = ctx
        .client
        .get(ctx.url("/favorites"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let favorites: Vec<Value> = resp.json().await.unwrap();
    let codes: Vec<&str> = favorites.iter().map(|f| f["code"].as_str().unwrap()).collect();
    assert_eq!(codes, vec!["NO", "EE", "PE"]);
}

#[tokio::test]
async fn test_favorites_require_auth() {
    let ctx = TestContext::new().await;

    let resp = ctx.client.get(ctx.url("/favorites")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}
