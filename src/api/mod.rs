//! HTTP API
//!
//! Lookup routes live under the configured prefix; `/health` is always at
//! the root.
//!
//! | Route                        | Family      |
//! |------------------------------|-------------|
//! | `GET {prefix}/ip/query`      | any         |
//! | `GET {prefix}/ip/query/ipv4` | IPv4 only   |
//! | `GET {prefix}/ip/query/ipv6` | IPv6 only   |
//! | `GET {prefix}/ip/my`         | caller's IP |

mod handlers;
mod response;

pub use handlers::{client_ip, ApiState, BackendNames, HealthResponse, IpQuery};
pub use response::{status_for, ApiResponse, SUCCESS_CODE};

use crate::config::{ApiConfig, AppConfig};
use crate::error::Result;
use crate::resolve::ResolutionDispatcher;
use axum::http::header::{ACCEPT, CONTENT_TYPE, ORIGIN};
use axum::http::{HeaderValue, Method};
use axum::middleware;
use axum::routing::get;
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;

const CORS_MAX_AGE: Duration = Duration::from_secs(12 * 60 * 60);

/// Build the application router
pub fn router(dispatcher: Arc<ResolutionDispatcher>, api: &ApiConfig, timeout: Duration) -> Router {
    let prefix = api.prefix.as_str();

    Router::new()
        .route(&format!("{prefix}/ip/query"), get(handlers::query_handler))
        .route(&format!("{prefix}/ip/query/ipv4"), get(handlers::query_ipv4_handler))
        .route(&format!("{prefix}/ip/query/ipv6"), get(handlers::query_ipv6_handler))
        .route(&format!("{prefix}/ip/my"), get(handlers::my_ip_handler))
        .route("/health", get(handlers::health_handler))
        .layer(TimeoutLayer::new(timeout))
        .layer(middleware::map_response(response::timeout_envelope))
        .layer(cors_layer(&api.allow_origins))
        .with_state(ApiState::new(dispatcher))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([ORIGIN, CONTENT_TYPE, ACCEPT])
        .max_age(CORS_MAX_AGE);

    if origins.iter().any(|origin| origin == "*") {
        return layer.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                log::warn!("Ignoring invalid CORS origin: {:?}", origin);
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(allowed))
}

/// Serve until Ctrl-C or SIGTERM
pub async fn serve(config: &AppConfig, dispatcher: Arc<ResolutionDispatcher>) -> Result<()> {
    let app = router(dispatcher, &config.api, config.server.request_timeout());

    let listener = TcpListener::bind(config.server.bind_addr()).await?;
    log::info!(
        "iplookup v{} listening on http://{}{}",
        env!("CARGO_PKG_VERSION"),
        listener.local_addr()?,
        config.api.prefix
    );

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    log::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                log::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    log::info!("Shutdown signal received, draining connections");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::{Address, Family};
    use crate::database::ip2region::fixtures::{sample_v4, write_temp};
    use crate::database::{DatabaseType, IP2RegionDatabase, LocationStore, RawRecord, Registry, StubDatabase};
    use crate::resolve::LocationInfo;
    use axum::body::Body;
    use axum::extract::ConnectInfo;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::Value;
    use tower::ServiceExt;

    /// IPv4 served by an xdb fixture, IPv6 by nothing
    fn create_test_app() -> (Router, tempfile::NamedTempFile) {
        let file = write_temp(&sample_v4());
        let store = IP2RegionDatabase::open(file.path()).unwrap();
        let registry = Registry::new().with(Family::IPv4, Box::new(store)).unwrap();
        let app = router(
            Arc::new(ResolutionDispatcher::new(registry)),
            &ApiConfig::default(),
            Duration::from_secs(5),
        );
        (app, file)
    }

    fn create_stub_app(api: &ApiConfig) -> Router {
        let registry = Registry::new()
            .with(Family::IPv4, Box::new(StubDatabase::default()))
            .unwrap()
            .with(Family::IPv6, Box::new(StubDatabase::default()))
            .unwrap();
        router(Arc::new(ResolutionDispatcher::new(registry)), api, Duration::from_secs(5))
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_query_success() {
        let (app, _file) = create_test_app();
        let (status, body) = send(app, get("/api/v1/ip/query?ip=1.0.1.9")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["code"], 0);
        assert_eq!(body["message"], "success");
        assert_eq!(body["data"]["ip"], "1.0.1.9");
        assert_eq!(body["data"]["country"], "China");
        assert_eq!(body["data"]["isp"], "ChinaNet");
        let info: LocationInfo = serde_json::from_value(body["data"].clone()).unwrap();
        assert_eq!(info.province, "Beijing");
    }

    #[tokio::test]
    async fn test_query_missing_parameter() {
        let (app, _file) = create_test_app();
        let (status, body) = send(app, get("/api/v1/ip/query")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], 1);
        assert_eq!(body["message"], "address required");
        assert!(body.get("data").is_none());
    }

    #[tokio::test]
    async fn test_query_invalid_address() {
        let (app, _file) = create_test_app();
        let (status, body) = send(app, get("/api/v1/ip/query?ip=not-an-ip")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "unparseable address");
    }

    #[tokio::test]
    async fn test_query_not_found() {
        let (app, _file) = create_test_app();
        let (status, body) = send(app, get("/api/v1/ip/query?ip=9.9.9.9")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], 3);
    }

    #[tokio::test]
    async fn test_query_unsupported_family() {
        let (app, _file) = create_test_app();
        let (status, body) = send(app, get("/api/v1/ip/query?ip=2001:db8::1")).await;
        assert_eq!(status, StatusCode::NOT_IMPLEMENTED);
        assert_eq!(body["code"], 4);
    }

    #[tokio::test]
    async fn test_family_routes() {
        let api = ApiConfig::default();

        let (status, _) = send(create_stub_app(&api), get("/api/v1/ip/query/ipv4?ip=8.8.8.8")).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(create_stub_app(&api), get("/api/v1/ip/query/ipv4?ip=2001:db8::1")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "expected an IPv4 address");

        let (status, _) = send(create_stub_app(&api), get("/api/v1/ip/query/ipv6?ip=2001:db8::1")).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(create_stub_app(&api), get("/api/v1/ip/query/ipv6?ip=8.8.8.8")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "expected an IPv6 address");
    }

    #[tokio::test]
    async fn test_malformed_query_string_gets_envelope() {
        let app = create_stub_app(&ApiConfig::default());
        let response = app
            .oneshot(get("/api/v1/ip/query?ip=1.1.1.1&ip=2.2.2.2"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(response.headers().get("content-type").unwrap(), "application/json");

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["code"], 1);
        assert_eq!(body["message"], "malformed query string");

        let app = create_stub_app(&ApiConfig::default());
        let (status, body) = send(app, get("/api/v1/ip/query/ipv6?ip=::1&ip=::2")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], 1);
    }

    /// Store that takes longer than any request timeout used here
    struct SlowStore;

    impl LocationStore for SlowStore {
        fn name(&self) -> &str {
            "slow"
        }

        fn database_type(&self) -> DatabaseType {
            DatabaseType::Stub
        }

        fn supports_ipv4(&self) -> bool {
            true
        }

        fn supports_ipv6(&self) -> bool {
            false
        }

        fn lookup(&self, _address: &Address) -> crate::error::Result<Option<RawRecord>> {
            std::thread::sleep(Duration::from_millis(500));
            Ok(None)
        }
    }

    #[tokio::test]
    async fn test_timeout_gets_envelope() {
        let registry = Registry::new().with(Family::IPv4, Box::new(SlowStore)).unwrap();
        let app = router(
            Arc::new(ResolutionDispatcher::new(registry)),
            &ApiConfig::default(),
            Duration::from_millis(50),
        );
        let (status, body) = send(app, get("/api/v1/ip/query?ip=8.8.8.8")).await;
        assert_eq!(status, StatusCode::REQUEST_TIMEOUT);
        assert_eq!(body["code"], 2);
        assert_eq!(body["message"], "request timed out");
        assert!(body.get("data").is_none());
    }

    #[tokio::test]
    async fn test_my_ip_uses_forwarded_header() {
        let app = create_stub_app(&ApiConfig::default());
        let request = Request::builder()
            .uri("/api/v1/ip/my")
            .header("x-forwarded-for", "203.0.113.9, 10.0.0.1")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["ip"], "203.0.113.9");
    }

    #[tokio::test]
    async fn test_my_ip_uses_peer_address() {
        let app = create_stub_app(&ApiConfig::default());
        let mut request = get("/api/v1/ip/my");
        let peer: SocketAddr = "198.51.100.23:40000".parse().unwrap();
        request.extensions_mut().insert(ConnectInfo(peer));
        let (_, body) = send(app, request).await;
        assert_eq!(body["data"]["ip"], "198.51.100.23");
    }

    #[tokio::test]
    async fn test_my_ip_without_any_source() {
        let app = create_stub_app(&ApiConfig::default());
        let (status, body) = send(app, get("/api/v1/ip/my")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "address required");
    }

    #[tokio::test]
    async fn test_custom_prefix() {
        let api = ApiConfig {
            prefix: "/geo".to_string(),
            ..ApiConfig::default()
        };
        let (status, _) = send(create_stub_app(&api), get("/geo/ip/query?ip=1.1.1.1")).await;
        assert_eq!(status, StatusCode::OK);

        let response = create_stub_app(&api)
            .oneshot(get("/api/v1/ip/query?ip=1.1.1.1"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _file) = create_test_app();
        let (status, body) = send(app, get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
        assert_eq!(body["backends"]["ipv4"], "ip2region");
        assert!(body["backends"]["ipv6"].is_null());
    }

    #[tokio::test]
    async fn test_cors_preflight() {
        let app = create_stub_app(&ApiConfig::default());
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/v1/ip/query")
            .header("origin", "https://example.com")
            .header("access-control-request-method", "GET")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(
            response.headers().get("access-control-allow-origin").unwrap(),
            "*"
        );
        assert_eq!(response.headers().get("access-control-max-age").unwrap(), "43200");
    }

    #[tokio::test]
    async fn test_cors_origin_list() {
        let api = ApiConfig {
            allow_origins: vec!["https://app.example.com".to_string()],
            ..ApiConfig::default()
        };
        let request = Request::builder()
            .uri("/api/v1/ip/query?ip=1.1.1.1")
            .header("origin", "https://app.example.com")
            .body(Body::empty())
            .unwrap();
        let response = create_stub_app(&api).oneshot(request).await.unwrap();
        assert_eq!(
            response.headers().get("access-control-allow-origin").unwrap(),
            "https://app.example.com"
        );

        let request = Request::builder()
            .uri("/api/v1/ip/query?ip=1.1.1.1")
            .header("origin", "https://evil.example.com")
            .body(Body::empty())
            .unwrap();
        let response = create_stub_app(&api).oneshot(request).await.unwrap();
        assert!(response.headers().get("access-control-allow-origin").is_none());
    }
}
