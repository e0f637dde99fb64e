//! Request handlers

use crate::address::Family;
use crate::resolve::{ErrorKind, ResolutionDispatcher, ResolutionResult};
use axum::extract::rejection::QueryRejection;
use axum::extract::{ConnectInfo, Query, State};
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;

/// Shared handler state
#[derive(Clone)]
pub struct ApiState {
    pub dispatcher: Arc<ResolutionDispatcher>,
}

impl ApiState {
    pub fn new(dispatcher: Arc<ResolutionDispatcher>) -> Self {
        Self { dispatcher }
    }

    /// Run a resolution on the blocking pool
    async fn resolve(&self, raw_ip: String, family: Option<Family>) -> ResolutionResult {
        let dispatcher = Arc::clone(&self.dispatcher);
        let task = tokio::task::spawn_blocking(move || match family {
            Some(family) => dispatcher.resolve_family(&raw_ip, family),
            None => dispatcher.resolve(&raw_ip),
        });

        match task.await {
            Ok(result) => result,
            Err(e) => {
                log::error!("lookup task failed: {}", e);
                ResolutionResult::failure(ErrorKind::BackendUnavailable, "lookup task failed")
            }
        }
    }
}

/// `?ip=` query string; a missing parameter reads as empty
#[derive(Debug, Default, Deserialize)]
pub struct IpQuery {
    #[serde(default)]
    pub ip: String,
}

/// Health response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub backends: BackendNames,
}

/// Store serving each family, `null` when none
#[derive(Debug, Serialize, Deserialize)]
pub struct BackendNames {
    pub ipv4: Option<String>,
    pub ipv6: Option<String>,
}

const FORWARDED_FOR: &str = "x-forwarded-for";
const REAL_IP: &str = "x-real-ip";

/// Caller address: first `X-Forwarded-For` entry, then `X-Real-IP`, then the peer
pub fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
    };

    if let Some(first) = header(FORWARDED_FOR)
        .and_then(|list| list.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty())
    {
        return first.to_string();
    }
    if let Some(real_ip) = header(REAL_IP) {
        return real_ip.to_string();
    }
    peer.map(|addr| addr.ip().to_string()).unwrap_or_default()
}

/// Read `ip` from a query string, or the envelope answer for a malformed one
fn query_ip(query: Result<Query<IpQuery>, QueryRejection>) -> Result<String, ResolutionResult> {
    match query {
        Ok(Query(query)) => Ok(query.ip),
        Err(rejection) => {
            log::debug!("rejected query string: {}", rejection.body_text());
            Err(ResolutionResult::failure(ErrorKind::InvalidInput, "malformed query string"))
        }
    }
}

pub async fn query_handler(
    State(state): State<ApiState>,
    query: Result<Query<IpQuery>, QueryRejection>,
) -> ResolutionResult {
    match query_ip(query) {
        Ok(ip) => state.resolve(ip, None).await,
        Err(rejected) => rejected,
    }
}

pub async fn query_ipv4_handler(
    State(state): State<ApiState>,
    query: Result<Query<IpQuery>, QueryRejection>,
) -> ResolutionResult {
    match query_ip(query) {
        Ok(ip) => state.resolve(ip, Some(Family::IPv4)).await,
        Err(rejected) => rejected,
    }
}

pub async fn query_ipv6_handler(
    State(state): State<ApiState>,
    query: Result<Query<IpQuery>, QueryRejection>,
) -> ResolutionResult {
    match query_ip(query) {
        Ok(ip) => state.resolve(ip, Some(Family::IPv6)).await,
        Err(rejected) => rejected,
    }
}

pub async fn my_ip_handler(
    State(state): State<ApiState>,
    headers: HeaderMap,
    peer: Option<ConnectInfo<SocketAddr>>,
) -> ResolutionResult {
    let ip = client_ip(&headers, peer.map(|ConnectInfo(addr)| addr));
    state.resolve(ip, None).await
}

pub async fn health_handler(State(state): State<ApiState>) -> impl IntoResponse {
    let registry = state.dispatcher.registry();
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        backends: BackendNames {
            ipv4: registry.backend_name(Family::IPv4).map(str::to_string),
            ipv6: registry.backend_name(Family::IPv6).map(str::to_string),
        },
    })
}
