use std::net::SocketAddr;
use std::sync::Arc;

use authbridge_auth::federation::{
    LoginOrchestrator, ProviderClient, ProviderClientConfig, ProviderRegistry,
};
use authbridge_auth::http::{AuthApiState, auth_router};
use authbridge_auth::identity::IdentityResolver;
use authbridge_auth::middleware::{GateState, authorization_gate};
use authbridge_auth::session::SessionService;
use authbridge_auth::storage::MemoryUserStorage;
use axum::{Router, middleware, routing::get};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{config::AppConfig, handlers, middleware as app_middleware};

pub struct AuthBridgeServer {
    addr: SocketAddr,
    app: Router,
}

/// Assembles the full application router from configuration.
///
/// Fails when the federation section names a provider that cannot be built,
/// for example an endpoint override that is not a valid URL.
pub fn build_app(cfg: &AppConfig) -> anyhow::Result<Router> {
    let storage = Arc::new(MemoryUserStorage::new());
    let sessions = Arc::new(SessionService::new(&cfg.auth.session));
    let registry = Arc::new(ProviderRegistry::from_config(&cfg.auth.federation)?);
    let client = Arc::new(ProviderClient::new(
        ProviderClientConfig::new().with_request_timeout(cfg.auth.federation.request_timeout),
    ));
    let resolver = Arc::new(IdentityResolver::new(storage.clone()));
    let orchestrator = Arc::new(LoginOrchestrator::new(
        registry,
        client,
        resolver,
        sessions.clone(),
    ));

    let api_state = AuthApiState::new(orchestrator, storage);
    let gate = GateState::new(sessions, &cfg.auth.gate);

    // Layer order is inside-out: the gate runs closest to the handlers, the
    // request-id middleware outermost so the trace span can read the id.
    let app = auth_router(api_state)
        // Health and info endpoints
        .route("/", get(handlers::root))
        .route("/healthz", get(handlers::healthz))
        .route("/readyz", get(handlers::readyz))
        .layer(middleware::from_fn_with_state(gate, authorization_gate))
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    use tracing::field::Empty;
                    // Skip creating a span for browser favicon requests to avoid noisy logs
                    if req.uri().path() == "/favicon.ico" {
                        return tracing::span!(tracing::Level::TRACE, "noop");
                    }
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    let req_id = req
                        .extensions()
                        .get::<axum::http::HeaderValue>()
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("")
                        .to_string();
                    tracing::info_span!(
                        "http.request",
                        http.method = %method,
                        http.target = %uri,
                        http.status_code = Empty,
                        request_id = %req_id
                    )
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &tracing::Span| {
                        span.record(
                            "http.status_code",
                            tracing::field::display(res.status().as_u16()),
                        );
                        // The noop span marks favicon requests; skip their access log.
                        if let Some(meta) = span.metadata()
                            && meta.name() != "noop"
                        {
                            tracing::info!(
                                http.status = %res.status().as_u16(),
                                elapsed_ms = %latency.as_millis(),
                                "request handled"
                            );
                        }
                    },
                ),
        )
        .layer(middleware::from_fn(app_middleware::request_id));

    Ok(app)
}

pub struct ServerBuilder {
    addr: SocketAddr,
    config: AppConfig,
}

impl ServerBuilder {
    pub fn new() -> Self {
        let cfg = AppConfig::default();
        Self {
            addr: cfg.addr(),
            config: cfg,
        }
    }

    pub fn with_addr(mut self, addr: SocketAddr) -> Self {
        self.addr = addr;
        self
    }

    pub fn with_config(mut self, cfg: AppConfig) -> Self {
        self.addr = cfg.addr();
        self.config = cfg;
        self
    }

    pub fn build(self) -> anyhow::Result<AuthBridgeServer> {
        let app = build_app(&self.config)?;

        Ok(AuthBridgeServer {
            addr: self.addr,
            app,
        })
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthBridgeServer {
    pub async fn run(self) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        tracing::info!("listening on {}", self.addr);
        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        Ok(())
    }
}

async fn shutdown_signal() {
    // Wait for Ctrl+C
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}

// =============================================================================
// Tests
// =============================================================================
