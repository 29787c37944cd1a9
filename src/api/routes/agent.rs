use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::{error::ApiError, state::AppState};

const HISTORY_TURNS: usize = 10;

#[derive(Debug, Deserialize)]
pub struct AgentChatRequest {
    pub message: String,
    /// Prior turns of this conversation are passed to the agent as context.
    pub conversation_id: Option<Uuid>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AgentChatResponse {
    pub response: String,
}

/// Free-form chat through the tool-calling agent.
pub async fn agent_chat(
    State(state): State<AppState>,
    Json(request): Json<AgentChatRequest>,
) -> Result<Json<AgentChatResponse>, ApiError> {
    let agent = state
        .agent
        .as_ref()
        .ok_or_else(|| ApiError::ServiceUnavailable("agent is not configured".into()))?;

    if request.message.trim().is_empty() {
        return Err(ApiError::BadRequest("message must not be empty".into()));
    }

    let history = match request.conversation_id {
        Some(id) => state
            .assistant
            .conversation(id)
            .await?
            .recent_messages(HISTORY_TURNS)
            .to_vec(),
        None => Vec::new(),
    };

    tracing::debug!(history = history.len(), "agent chat");
    let response = agent.chat_with_history(&request.message, &history).await?;

    Ok(Json(AgentChatResponse { response }))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use tower::ServiceExt;

    use crate::api::create_router;
    use crate::infrastructure::AppConfig;
    use crate::test_support::app_state;

    #[tokio::test]
    async fn test_agent_unavailable_without_credentials() {
        let app = create_router(app_state(AppConfig::default()));

        let resp = app
            .oneshot(
                Request::post("/api/v1/agent/chat")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"message":"hello"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
