//! PayScope API Gateway
//!
//! The main entry point for all external API requests.
//! Handles:
//! - Token verification for signed-in routes
//! - Rate limiting on writes
//! - Request routing
//! - Observability (logging, metrics)

mod extract;
mod handlers;
mod middleware;
#[cfg(test)]
mod tests;

use axum::{
    extract::FromRef,
    middleware::{from_fn, from_fn_with_state},
    routing::{delete, get, post},
    Router,
};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder};
use payscope_common::{
    auth::JwtManager,
    config::AppConfig,
    db::{DbPool, MemoryStore, Repository, Store},
    metrics,
    services::{CommentService, SalaryService, VoteService},
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

use middleware::rate_limit::{create_rate_limiter, rate_limit_middleware};

/// Database URL that selects the in-memory store
const MEMORY_DATABASE_URL: &str = "memory://";

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn Store>,
    pub jwt: Arc<JwtManager>,
    pub salaries: SalaryService,
    pub votes: VoteService,
    pub comments: CommentService,
}

impl AppState {
    pub fn new(config: Arc<AppConfig>, store: Arc<dyn Store>) -> Self {
        Self {
            jwt: Arc::new(JwtManager::from_config(&config.auth)),
            salaries: SalaryService::new(store.clone()),
            votes: VoteService::new(store.clone()),
            comments: CommentService::new(store.clone()),
            store,
            config,
        }
    }
}

impl FromRef<AppState> for Arc<JwtManager> {
    fn from_ref(state: &AppState) -> Self {
        state.jwt.clone()
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration; APP_CONFIG points at a single file instead of config/
    let config = match std::env::var("APP_CONFIG") {
        Ok(path) => AppConfig::from_file(&path)?,
        Err(_) => AppConfig::load()?,
    };
    let config = Arc::new(config);

    init_tracing(&config);
    info!("Starting PayScope API Gateway v{}", payscope_common::VERSION);

    init_metrics(&config)?;

    let store: Arc<dyn Store> = if config.database.url == MEMORY_DATABASE_URL {
        tracing::warn!("Using in-memory store; data is lost on shutdown");
        Arc::new(MemoryStore::new())
    } else {
        let pool = DbPool::new(&config.database).await?;
        pool.migrate().await?;
        Arc::new(Repository::new(pool))
    };

    if config.auth.jwt_secret.is_none() {
        tracing::warn!("No JWT secret configured; signed-in routes will reject every request");
    }

    let state = AppState::new(config.clone(), store);
    let app = create_router(state);

    // Start the server
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

fn init_tracing(config: &AppConfig) {
    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.observability.log_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    if config.observability.json_logging {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn init_metrics(config: &AppConfig) -> anyhow::Result<()> {
    let port = config.observability.metrics_port;
    if port == 0 {
        info!("Metrics exporter disabled");
        return Ok(());
    }

    prometheus_builder(config)?
        .with_http_listener(SocketAddr::from(([0, 0, 0, 0], port)))
        .install()?;

    metrics::register_metrics();
    info!(
        port,
        service = %config.observability.service_name,
        "Prometheus exporter listening"
    );
    Ok(())
}

/// Exporter settings shared by every series: latency buckets and a `service` label
fn prometheus_builder(config: &AppConfig) -> anyhow::Result<PrometheusBuilder> {
    let builder = PrometheusBuilder::new()
        .add_global_label("service", config.observability.service_name.clone())
        .set_buckets_for_metric(
            Matcher::Suffix("duration_seconds".to_string()),
            metrics::LATENCY_BUCKETS,
        )?;
    Ok(builder)
}

/// Create the main application router
fn create_router(state: AppState) -> Router {
    let limits = &state.config.rate_limit;

    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Request ID propagation
    let request_id = SetRequestIdLayer::x_request_id(MakeRequestUuid);
    let propagate_id = PropagateRequestIdLayer::x_request_id();

    let mut api_routes = Router::new()
        // Health endpoints
        .route("/health", get(handlers::health::health))
        .route("/ready", get(handlers::health::ready))
        // Catalogue
        .route(
            "/salaries",
            get(handlers::salaries::list_salaries).post(handlers::salaries::create_salary),
        )
        .route("/salaries/{id}", get(handlers::salaries::get_salary))
        .route(
            "/salaries/by-slug/{company}/{designation}/{location}/{id}",
            get(handlers::salaries::get_salary_by_slug),
        )
        // Votes
        .route(
            "/salaries/{id}/vote",
            get(handlers::votes::get_vote).post(handlers::votes::cast_vote),
        )
        // Comments
        .route(
            "/salaries/{id}/comments",
            get(handlers::comments::list_comments).post(handlers::comments::create_comment),
        )
        .route("/comments/{id}/vote", post(handlers::comments::vote_comment))
        .route("/comments/{id}", delete(handlers::comments::delete_comment));

    // Writes share one token bucket; reads are not limited
    if limits.enabled {
        let limiter = create_rate_limiter(limits.requests_per_second, limits.burst);
        api_routes = api_routes.layer(from_fn_with_state(limiter, rate_limit_middleware));
    }

    // Compose the app
    Router::new()
        .nest("/v1", api_routes)
        .layer(from_fn(middleware::metrics::track_requests))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(state.config.request_timeout()))
        .layer(cors)
        .layer(request_id)
        .layer(propagate_id)
        .with_state(state)
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, starting shutdown..."),
        _ = terminate => info!("Received SIGTERM, starting shutdown..."),
    }
}
