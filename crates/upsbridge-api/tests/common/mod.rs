//! Common test utilities for API tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use tower::ServiceExt;

use upsbridge_api::{create_router, ServerConfig, ServerState};
use upsbridge_devices::upstream::DEFAULT_ENDPOINT;

pub const API_KEY: &str = "mysecret";

pub const SCRIPT_PAYLOAD: &str = r#"
var ups_input_voltage = "235.0";
var ups_input_frequency = "49.9";
var ups_output_activepower = "0.2";
var ups_bypass_current = "unknown";
var ups_battery_level = "100";
var ups_battery_runtime = 2422;
var ups_battery_lifetime = "46";
var ups_status = "Online";
"#;

pub const LOGIN_PAGE: &str =
    "<!DOCTYPE html><html><body><form><input type=\"password\" name=\"pwd\"></form></body></html>";

/// A fake network card that counts how often it is hit.
pub struct FakeCard {
    pub host: String,
    pub hits: Arc<AtomicUsize>,
}

impl FakeCard {
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

/// Serve `body` with `content_type` on the measurement endpoint, after `delay`.
pub async fn spawn_card(body: &'static str, content_type: &'static str, delay: Duration) -> FakeCard {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&hits);

    let router = Router::new().route(
        DEFAULT_ENDPOINT,
        get(move || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(delay).await;
                ([(header::CONTENT_TYPE, content_type)], body).into_response()
            }
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    FakeCard {
        host: addr.to_string(),
        hits,
    }
}

/// Fake card serving the script payload without delay.
pub async fn spawn_script_card() -> FakeCard {
    spawn_card(SCRIPT_PAYLOAD, "application/javascript", Duration::ZERO).await
}

pub fn test_config(card_host: &str, api_key: Option<&str>) -> ServerConfig {
    let mut config = ServerConfig::new(card_host);
    config.host = "127.0.0.1".to_string();
    config.port = 0;
    config.upstream.scheme = "http".to_string();
    config.upstream.timeout = 1;
    config.api_key = api_key.map(str::to_string);
    config
}

pub fn test_router(config: ServerConfig) -> Router {
    create_router(ServerState::new(config).unwrap())
}

/// Send a GET through the router and return status and JSON body.
pub async fn get_json(router: Router, uri: &str, headers: &[(&str, &str)]) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().uri(uri);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    let response = router
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}
