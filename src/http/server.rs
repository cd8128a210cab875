//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the Digipos command handlers
//! - Wire up middleware (request ID, tracing, timeout)
//! - Bind server to listener
//! - Stop accepting on shutdown and drain in-flight requests

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    response::IntoResponse,
    routing::get,
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::{GatewayConfig, ResponseConfig};
use crate::digipos::DigiposService;
use crate::error::GatewayResult;
use crate::http::digipos;
use crate::http::request::{request_id, MakeRequestUuid, X_REQUEST_ID};
use crate::upstream::UpstreamClient;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<DigiposService>,
    pub response: ResponseConfig,
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: GatewayConfig) -> GatewayResult<Self> {
        let upstream = UpstreamClient::new(&config.upstream)?;
        let service = Arc::new(DigiposService::new(upstream, &config.digipos));

        let state = AppState {
            service,
            response: config.response.clone(),
        };

        let router = Self::build_router(&config, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        let middleware = ServiceBuilder::new()
            .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuid))
            .layer(
                TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                    // Path only: command queries carry credentials.
                    tracing::info_span!(
                        "request",
                        method = %request.method(),
                        path = request.uri().path(),
                        request_id = request_id(request.headers()),
                    )
                }),
            )
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::new(X_REQUEST_ID));

        Router::new()
            .route("/health", get(health))
            .route("/health/upstream", get(upstream_health))
            .route("/digipos/login", get(digipos::login))
            .route("/digipos/verify_otp", get(digipos::verify_otp))
            .route("/digipos/balance", get(digipos::balance))
            .route("/digipos/profile", get(digipos::profile))
            .route("/digipos/list_va", get(digipos::list_va))
            .route("/digipos/reward", get(digipos::reward))
            .route("/digipos/banner", get(digipos::banner))
            .route("/digipos/logout", get(digipos::logout))
            .route("/digipos/sim_status", get(digipos::sim_status))
            .with_state(state)
            .layer(middleware)
    }

    /// Router with state and middleware applied.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until a shutdown signal arrives.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream = %self.config.upstream.base_url,
            mode = ?self.config.response.mode,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received, draining connections");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

async fn health() -> &'static str {
    "ok"
}

async fn upstream_health(State(state): State<AppState>) -> impl IntoResponse {
    if state.service.upstream().check_health().await {
        (StatusCode::OK, "reachable")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "unreachable")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use tower::ServiceExt;

    fn server() -> HttpServer {
        let mut config = GatewayConfig::default();
        config.digipos.username = "alice".into();
        config.digipos.password = "secret".into();
        HttpServer::new(config).unwrap()
    }

    #[tokio::test]
    async fn test_health_sets_request_id() {
        let response = server()
            .router()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(X_REQUEST_ID));
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"ok");
    }

    #[tokio::test]
    async fn test_caller_request_id_is_kept() {
        let request = Request::get("/health")
            .header(X_REQUEST_ID, "caller-id")
            .body(Body::empty())
            .unwrap();
        let response = server().router().oneshot(request).await.unwrap();
        assert_eq!(response.headers()[X_REQUEST_ID], "caller-id");
    }

    async fn call(uri: &str) -> (StatusCode, String) {
        let response = server()
            .router()
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_missing_username_is_rejected_in_legacy_form() {
        let (status, body) = call("/digipos/balance").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.starts_with("error=invalid_request&message="), "{body}");
        assert!(body.contains("username"));
    }

    #[tokio::test]
    async fn test_missing_param_is_rejected_in_structured_form() {
        let (status, body) = call("/digipos/sim_status?username=alice&text=false").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let body: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(body["error"], "invalid_request");
    }

    #[tokio::test]
    async fn test_unreadable_flag_is_rejected() {
        let (status, body) = call("/digipos/profile?username=alice&text=maybe").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.starts_with("error=invalid_request"), "{body}");
    }

    #[tokio::test]
    async fn test_wrong_username_is_unauthorized() {
        let (status, _) = call("/digipos/profile?username=mallory&text=false").await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_numeric_flags_reach_credential_check() {
        let (status, body) = call("/digipos/profile?username=mallory&text=1").await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.starts_with("error=authentication"), "{body}");

        let (status, body) = call("/digipos/profile?username=mallory&text=0&debug=yes").await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let body: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(body["error"], "authentication");
    }
}
