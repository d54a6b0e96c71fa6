//! Shared fixtures for the client integration tests

#![allow(dead_code)]

use serde_json::Value;
use tcflow_client::{ClientConfig, TrimbleConnectClient};
use wiremock::{MockServer, Request};

pub const TOKEN: &str = "test-token";
pub const PROJECT: &str = "p1";
pub const API_ROOT: &str = "/tc/api/3.0";

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tcflow_client=debug".into()),
        )
        .with_test_writer()
        .try_init();
}

pub fn base_url(server: &MockServer) -> String {
    format!("{}{}", server.uri(), API_ROOT)
}

/// `/tc/api/3.0/projects/p1{suffix}`
pub fn project_path(suffix: &str) -> String {
    format!("{}/projects/{}{}", API_ROOT, PROJECT, suffix)
}

/// Client with a ready session pointed at `server`
pub fn client_for(server: &MockServer) -> TrimbleConnectClient {
    init_tracing();
    TrimbleConnectClient::from_session(ClientConfig::with_base_url(base_url(server)), TOKEN, PROJECT)
        .expect("client")
}

/// Requests the server saw, as (method, path, json body)
pub async fn recorded(server: &MockServer) -> Vec<(String, String, Value)> {
    server
        .received_requests()
        .await
        .expect("request recording enabled")
        .iter()
        .map(|req: &Request| {
            let body = req.body_json::<Value>().unwrap_or(Value::Null);
            (req.method.to_string(), req.url.path().to_string(), body)
        })
        .collect()
}
