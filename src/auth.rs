use axum::extract::{Query, Request, State};
use axum::middleware::Next;
use axum::response::Response;
use axum_extra::extract::TypedHeader;
use axum_extra::headers::Authorization;
use axum_extra::headers::authorization::Bearer;
use tracing::debug;

use crate::AppState;
use crate::error::ApiError;
use crate::settings::Settings;

#[derive(Debug, serde::Deserialize)]
pub struct TokenQuery {
    pub token: Option<String>,
}

/// Accepts the bearer header first, then the `token` query parameter.
pub fn authorize(
    settings: &Settings,
    bearer: Option<&Authorization<Bearer>>,
    query_token: Option<&str>,
) -> Result<(), ApiError> {
    let provided = bearer.map(|header| header.token()).or(query_token);
    if provided == Some(settings.auth_token.as_str()) {
        return Ok(());
    }

    debug!(
        has_header = bearer.is_some(),
        has_query = query_token.is_some(),
        "analysis request failed authentication"
    );
    Err(ApiError::Unauthorized("Invalid authentication token".into()))
}

/// Route layer guarding the analysis endpoints; runs before the body is read.
pub async fn require_token(
    State(state): State<AppState>,
    auth: Option<TypedHeader<Authorization<Bearer>>>,
    Query(query): Query<TokenQuery>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let bearer = auth.map(|TypedHeader(header)| header);
    authorize(&state.settings, bearer.as_ref(), query.token.as_deref())?;
    Ok(next.run(request).await)
}
