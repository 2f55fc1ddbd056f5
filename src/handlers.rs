use axum::{Json, extract::State, response::IntoResponse};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    AppState, error::ApiError, models::AnalysisRequest, popular_classes::ClassPopularity,
    popular_times::PopularTimeReport, validation::validate_batch,
};

#[derive(Debug, Serialize, ToSchema)]
pub struct AnalysisResponse {
    pub popular_times: PopularTimeReport,
    pub popular_classes: Vec<ClassPopularity>,
}

#[utoipa::path(get, path = "/", tag = "analysis")]
pub async fn root() -> impl IntoResponse {
    Json(serde_json::json!({
        "message": "Class Popularity API",
        "endpoints": {
            "/analysis": "Popular times and popular classes in one report",
            "/analysis/popular-times": "Most frequent start times across lessons and bookings",
            "/analysis/popular-classes": "Most popular start time of every class"
        }
    }))
}

#[utoipa::path(get, path = "/healthz/live", tag = "analysis")]
pub async fn healthz_live() -> impl IntoResponse {
    Json(serde_json::json!({"status": "ok"}))
}

#[utoipa::path(get, path = "/healthz/ready", tag = "analysis")]
pub async fn healthz_ready() -> impl IntoResponse {
    Json(serde_json::json!({"status": "ok"}))
}

#[utoipa::path(
    post,
    path = "/analysis/popular-times",
    params(
        ("token" = Option<String>, Query, description = "Authentication token (alternative to Bearer header)")
    ),
    request_body = AnalysisRequest,
    responses(
        (status = 200, description = "Popular time report", body = PopularTimeReport),
        (status = 401, description = "Invalid authentication token"),
        (status = 413, description = "Too many records in one request")
    ),
    security(("bearer_auth" = []), ("query_token" = [])),
    tag = "analysis"
)]
pub async fn popular_times(
    State(state): State<AppState>,
    Json(request): Json<AnalysisRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_batch(&request, state.settings.max_records)?;
    let report = state
        .popular_times
        .analyze(&request.lessons, &request.bookings);
    Ok(Json(report))
}

#[utoipa::path(
    post,
    path = "/analysis/popular-classes",
    params(
        ("token" = Option<String>, Query, description = "Authentication token (alternative to Bearer header)")
    ),
    request_body = AnalysisRequest,
    responses(
        (status = 200, description = "Classes ranked by the count of their peak time", body = [ClassPopularity]),
        (status = 401, description = "Invalid authentication token"),
        (status = 413, description = "Too many records in one request")
    ),
    security(("bearer_auth" = []), ("query_token" = [])),
    tag = "analysis"
)]
pub async fn popular_classes(
    State(state): State<AppState>,
    Json(request): Json<AnalysisRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_batch(&request, state.settings.max_records)?;
    let classes = state
        .popular_classes
        .analyze(&request.lessons, &request.bookings);
    Ok(Json(classes))
}

#[utoipa::path(
    post,
    path = "/analysis",
    params(
        ("token" = Option<String>, Query, description = "Authentication token (alternative to Bearer header)")
    ),
    request_body = AnalysisRequest,
    responses(
        (status = 200, description = "Both reports over the same records", body = AnalysisResponse),
        (status = 401, description = "Invalid authentication token"),
        (status = 413, description = "Too many records in one request")
    ),
    security(("bearer_auth" = []), ("query_token" = [])),
    tag = "analysis"
)]
pub async fn analysis(
    State(state): State<AppState>,
    Json(request): Json<AnalysisRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_batch(&request, state.settings.max_records)?;
    Ok(Json(AnalysisResponse {
        popular_times: state
            .popular_times
            .analyze(&request.lessons, &request.bookings),
        popular_classes: state
            .popular_classes
            .analyze(&request.lessons, &request.bookings),
    }))
}
