pub mod auth;
pub mod error;
pub mod handlers;
pub mod models;
pub mod openapi;
pub mod popular_classes;
pub mod popular_times;
pub mod records;
pub mod settings;
pub mod tally;
pub mod time;
pub mod validation;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use handlers::{analysis, healthz_live, healthz_ready, popular_classes, popular_times, root};
use tower_http::LatencyUnit;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{Level, info};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::auth::require_token;
use crate::openapi::ApiDoc;
use crate::popular_classes::PopularClassAggregator;
use crate::popular_times::PopularTimeAggregator;
use crate::settings::Settings;

#[derive(Clone)]
pub struct AppState {
    pub settings: Settings,
    pub popular_times: Arc<PopularTimeAggregator>,
    pub popular_classes: Arc<PopularClassAggregator>,
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            popular_times: Arc::new(PopularTimeAggregator::new()),
            popular_classes: Arc::new(PopularClassAggregator::new()),
        }
    }
}

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::from_env()?;

    let env_filter = if settings.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .without_time()
        .init();

    let state = AppState::new(settings);
    let app = build_router(state.clone());

    let addr = SocketAddr::from(([0, 0, 0, 0], state.settings.port));
    info!(max_records = state.settings.max_records, "Starting Class Popularity API on {addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

pub fn build_router(state: AppState) -> Router {
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(
            DefaultOnResponse::new()
                .level(Level::INFO)
                .latency_unit(LatencyUnit::Millis),
        );

    let analysis_routes = Router::new()
        .route("/analysis", post(analysis))
        .route("/analysis/popular-times", post(popular_times))
        .route("/analysis/popular-classes", post(popular_classes))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_token));

    let mut router = Router::new()
        .route("/", get(root))
        .route("/healthz/live", get(healthz_live))
        .route("/healthz/ready", get(healthz_ready))
        .merge(analysis_routes)
        .with_state(state.clone());

    if state.settings.enable_swagger {
        let openapi = ApiDoc::openapi();
        let swagger = SwaggerUi::new("/docs").url("/openapi.json", openapi);
        router = router.merge(swagger);
    }

    router.layer(trace_layer)
}
