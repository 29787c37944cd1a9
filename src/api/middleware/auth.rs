use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::api::{error::ApiError, state::AppState};

pub const API_KEY_HEADER: &str = "X-API-Key";

/// Rejects requests without the configured key. Open when no key is set.
pub async fn api_key_auth(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(expected) = state.config.config.api.api_key.as_deref() else {
        return Ok(next.run(request).await);
    };

    let provided = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok());

    match provided {
        Some(key) if key == expected => Ok(next.run(request).await),
        Some(_) => {
            tracing::warn!(uri = %request.uri(), "invalid api key");
            Err(ApiError::Unauthorized("invalid API key".into()))
        }
        None => Err(ApiError::Unauthorized(format!("missing {API_KEY_HEADER} header"))),
    }
}
