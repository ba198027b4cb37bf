//! Integration test harness for Atlas.
//!
//! Each test boots the real router in-process against a fresh in-memory
//! database and a local mock of the REST Countries API, then drives it over
//! HTTP with `reqwest`. No external services are required.
//!
//! # Example
//!
//! ```rust,ignore
//! let ctx = TestContext::new().await;
//! let token = ctx.register("alice", "a@x.com", "secret1").await;
//!
//! let resp = ctx.client
//!     .get(ctx.url("/favorites"))
//!     .bearer_auth(&token)
//!     .send()
//!     .await
//!     .unwrap();
//! assert_eq!(resp.status(), 200);
//! ```

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::net::SocketAddr;

use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use secrecy::SecretString;
use serde_json::{Value, json};
use sqlx::sqlite::SqlitePoolOptions;

use atlas_server::config::{AtlasConfig, CountriesConfig};
use atlas_server::state::AppState;

/// A running Atlas server plus the mock upstream it proxies.
pub struct TestContext {
    /// HTTP client for driving the API.
    pub client: reqwest::Client,
    /// Base URL of the in-process Atlas server.
    pub base_url: String,
    /// The server's database pool. Tests can close it to simulate storage
    /// failures.
    pub pool: sqlx::SqlitePool,
}

impl TestContext {
    /// Boot a mock upstream and an Atlas server on ephemeral ports.
    ///
    /// # Panics
    ///
    /// Panics if either server fails to start - test setup has no recovery.
    pub async fn new() -> Self {
        let upstream_addr = spawn_server(mock_upstream()).await;

        // A single pinned connection: every pooled connection to
        // `sqlite::memory:` would otherwise open its own private database.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .expect("failed to open in-memory database");
        atlas_server::db::MIGRATOR
            .run(&pool)
            .await
            .expect("failed to run migrations");

        let config = AtlasConfig {
            database_url: SecretString::from("sqlite::memory:"),
            host: std::net::IpAddr::from([127, 0, 0, 1]),
            port: 0,
            token_secret: SecretString::from("qN8vK2xR5mW9jT3bY7cF1hL4pD6sG0aZ"),
            token_ttl_hours: 24,
            countries: CountriesConfig {
                base_url: format!("http://{upstream_addr}"),
                timeout_secs: 5,
            },
        };

        let state = AppState::new(config, pool.clone()).expect("failed to build state");
        let addr = spawn_server(atlas_server::app(state)).await;

        Self {
            client: reqwest::Client::new(),
            base_url: format!("http://{addr}"),
            pool,
        }
    }

    /// Absolute URL for an API path.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Register an account and return its bearer token.
    ///
    /// # Panics
    ///
    /// Panics if registration does not return 201 with a token.
    pub async fn register(&self, username: &str, email: &str, password: &str) -> String {
        let resp = self
            .client
            .post(self.url("/auth/register"))
            .json(&json!({ "username": username, "email": email, "password": password }))
            .send()
            .await
            .expect("register request failed");
        assert_eq!(resp.status(), StatusCode::CREATED);

        let body: Value = resp.json().await.expect("register response not JSON");
        body["token"]
            .as_str()
            .expect("register response missing token")
            .to_owned()
    }
}

/// Bind an ephemeral port, serve the router in the background, return the address.
async fn spawn_server(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind ephemeral port");
    let addr = listener.local_addr().expect("listener has no local addr");

    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("test server died");
    });

    addr
}

// =============================================================================
// Mock upstream
// =============================================================================

/// Canned country objects in the upstream's payload shape.
fn mock_countries() -> Vec<Value> {
    [
        ("Estonia", "EE", "EST", "Europe", "Tallinn"),
        ("Norway", "NO", "NOR", "Europe", "Oslo"),
        ("Peru", "PE", "PER", "Americas", "Lima"),
        ("Finland", "FI", "FIN", "Europe", "Helsinki"),
        ("Sweden", "SE", "SWE", "Europe", "Stockholm"),
        ("Denmark", "DK", "DNK", "Europe", "Copenhagen"),
        ("Latvia", "LV", "LVA", "Europe", "Riga"),
        ("Lithuania", "LT", "LTU", "Europe", "Vilnius"),
        ("Iceland", "IS", "ISL", "Europe", "Reykjavik"),
        ("Ireland", "IE", "IRL", "Europe", "Dublin"),
    ]
    .into_iter()
    .map(|(name, cca2, cca3, region, capital)| {
        json!({
            "name": { "common": name, "official": name },
            "cca2": cca2,
            "cca3": cca3,
            "region": region,
            "capital": [capital],
            "flags": { "png": format!("https://flagcdn.com/w320/{}.png", cca2.to_lowercase()) },
        })
    })
    .collect()
}

/// A minimal stand-in for the REST Countries v3.1 API.
fn mock_upstream() -> Router {
    Router::new()
        .route("/independent", get(independent))
        .route("/name/{name}", get(by_name))
        .route("/alpha", get(by_codes))
        .route("/alpha/{code}", get(by_code))
}

async fn independent() -> Json<Vec<Value>> {
    Json(mock_countries())
}

async fn by_name(Path(name): Path<String>) -> impl IntoResponse {
    let matches: Vec<Value> = mock_countries()
        .into_iter()
        .filter(|c| {
            c["name"]["common"]
                .as_str()
                .is_some_and(|n| n.eq_ignore_ascii_case(&name))
        })
        .collect();

    if matches.is_empty() {
        (StatusCode::NOT_FOUND, Json(json!({ "status": 404, "message": "Not Found" }))).into_response()
    } else {
        Json(matches).into_response()
    }
}

async fn by_code(Path(code): Path<String>) -> impl IntoResponse {
    let matches: Vec<Value> = mock_countries()
        .into_iter()
        .filter(|c| code_matches(c, &code))
        .collect();

    if matches.is_empty() {
        (StatusCode::NOT_FOUND, Json(json!({ "status": 404, "message": "Not Found" }))).into_response()
    } else {
        Json(matches).into_response()
    }
}

#[derive(serde::Deserialize)]
struct CodesParams {
    codes: String,
}

async fn by_codes(Query(params): Query<CodesParams>) -> Json<Vec<Value>> {
    let wanted: Vec<&str> = params.codes.split(',').collect();
    Json(
        mock_countries()
            .into_iter()
            .filter(|c| wanted.iter().any(|code| code_matches(c, code)))
            .collect(),
    )
}

fn code_matches(country: &Value, code: &str) -> bool {
    ["cca2", "cca3"].iter().any(|key| {
        country[key]
            .as_str()
            .is_some_and(|c| c.eq_ignore_ascii_case(code))
    })
}
