//! Integration tests for country lookups against the mock upstream.

#![allow(clippy::unwrap_used)]

use atlas_integration_tests::TestContext;
use reqwest::StatusCode;
use serde_json::Value;

#[tokio::test]
async fn test_all_countries_pagination() {
    let ctx = TestContext::new().await;
    let token = ctx.register("alice", "a@x.com", "secret1").await;

    // Defaults: page 1, limit 5.
    let resp = ctx
        .client
        .get(ctx.url("/countries/all"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let page1: Vec<Value> = resp.json().await.unwrap();
    assert_eq!(page1.len(), 5);
    assert_eq!(page1[0]["name"]["common"], "Estonia");

    // Page 2 of 10 upstream results holds items at indices 5-9.
    let resp = ctx
        .client
        .get(ctx.url("/countries/all?page=2&limit=5"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let page2: Vec<Value> = resp.json().await.unwrap();
    assert_eq!(page2.len(), 5);
    assert_eq!(page2[0]["name"]["common"], "Denmark");
    assert_eq!(page2[4]["name"]["common"], "Ireland");
}

#[tokio::test]
async fn test_lookup_by_name_and_not_found() {
    let ctx = TestContext::new().await;
    let token = ctx.register("alice", "a@x.com", "secret1").await;

    let resp = ctx
        .client
        .get(ctx.url("/countries/name/Estonia"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let countries: Vec<Value> = resp.json().await.unwrap();
    assert_eq!(countries.len(), 1);
    assert_eq!(countries[0]["cca2"], "EE");

    let resp = ctx
        .client
        .get(ctx.url("/countries/name/Atlantis"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Country \"Atlantis\" not found");
}

#[tokio::test]
async fn test_lookup_by_code_records_recent_view() {
    let ctx = TestContext::new().await;
    let token = ctx.register("alice", "a@x.com", "secret1").await;

    let resp = ctx
        .client
        .get(ctx.url("/countries/code/ee"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let country: Value = resp.json().await.unwrap();
    assert_eq!(country["name"]["common"], "Estonia");

    // The lookup left a recently-viewed entry, enriched via the gateway.
    let resp = ctx
        .client
        .get(ctx.url("/users/recently-viewed"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let entries: Vec<Value> = resp.json().await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["countryCode"], "EE");
    assert_eq!(entries[0]["name"], "Estonia");
    assert_eq!(entries[0]["region"], "Europe");
    assert_eq!(entries[0]["rating"], Value::Null);
}

#[tokio::test]
async fn test_recent_views_dedupe_and_order() {
    let ctx = TestContext::new().await;
    let token = ctx.register("alice", "a@x.com", "secret1").await;

    // View EE, NO, then EE again.
    for code in ["EE", "NO", "EE"] {
        let resp = ctx
            .client
            .get(ctx.url(&format!("/countries/code/{code}")))
            .bearer_auth(&token)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let resp = ctx
        .client
        .get(ctx.url("/users/recently-viewed"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let entries: Vec<Value> = resp.json().await.unwrap();

    // EE appears once, at the front.
    let codes: Vec<&str> = entries
        .iter()
        .map(|e| e["countryCode"].as_str().unwrap())
        .collect();
    assert_eq!(codes, vec!["EE", "NO"]);
}

#[tokio::test]
async fn test_batch_lookup_by_codes() {
    let ctx = TestContext::new().await;
    let token = ctx.register("alice", "a@x.com", "secret1").await;

    let resp = ctx
        .client
        .get(ctx.url("/countries/codes?codes=est,no"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let countries: Vec<Value> = resp.json().await.unwrap();
    assert_eq!(countries.len(), 2);

    // The codes parameter is required.
    let resp = ctx
        .client
        .get(ctx.url("/countries/codes"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_code_lookup_survives_failed_view_recording() {
    let ctx = TestContext::new().await;
    let token = ctx.register("alice", "a@x.com", "secret1").await;

    // With the database gone, recording the view fails - but the recording
    // is best-effort and the lookup itself still succeeds.
    ctx.pool.close().await;

    let resp = ctx
        .client
        .get(ctx.url("/countries/code/EE"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let country: Value = resp.json().await.unwrap();
    assert_eq!(country["name"]["common"], "Estonia");
}

#[tokio::test]
async fn test_unknown_code_is_not_found_and_leaves_no_view() {
    let ctx = TestContext::new().await;
    let token = ctx.register("alice", "a@x.com", "secret1").await;

    let resp = ctx
        .client
        .get(ctx.url("/countries/code/ZZ"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // Only successful lookups are recorded.
    let resp = ctx
        .client
        .get(ctx.url("/users/recently-viewed"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let entries: Vec<Value> = resp.json().await.unwrap();
    assert!(entries.is_empty());
}
