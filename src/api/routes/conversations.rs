use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::api::{error::ApiError, state::AppState};
use crate::application::AssistantReply;
use crate::domain::{Action, ConversationState, Field, FormKind};

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateConversationResponse {
    pub conversation_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct MessageRequest {
    /// Accepts the canonical names as well as the short aliases
    /// (`question`, `callback`, `appointment`).
    pub action: String,
    pub message: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FormSummary {
    pub kind: FormKind,
    pub step: usize,
    pub field: Option<Field>,
    pub collected: BTreeMap<Field, String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ConversationSummary {
    pub conversation_id: Uuid,
    pub action: Option<Action>,
    pub active_form: Option<FormSummary>,
    pub messages: usize,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<&ConversationState> for ConversationSummary {
    fn from(state: &ConversationState) -> Self {
        let active_form = [FormKind::Callback, FormKind::Appointment]
            .into_iter()
            .map(|kind| state.form(kind))
            .find_map(|form| {
                form.current_step().map(|step| FormSummary {
                    kind: form.kind(),
                    step,
                    field: form.current_field(),
                    collected: form
                        .collected()
                        .iter()
                        .map(|(field, value)| (*field, value.clone()))
                        .collect(),
                })
            });

        Self {
            conversation_id: state.id,
            action: state.action,
            active_form,
            messages: state.messages.len(),
            created_at: state.created_at,
            updated_at: state.updated_at,
        }
    }
}

pub async fn create_conversation(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<CreateConversationResponse>), ApiError> {
    let conversation = state.assistant.start_conversation().await?;
    Ok((
        StatusCode::CREATED,
        Json(CreateConversationResponse {
            conversation_id: conversation.id,
        }),
    ))
}

/// One turn. Rejected form input is a normal `retry` reply, not an error.
pub async fn send_message(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<MessageRequest>,
) -> Result<Json<AssistantReply>, ApiError> {
    let action: Action = request.action.parse()?;
    let reply = state
        .assistant
        .handle(id, action, request.message.as_deref())
        .await?;
    Ok(Json(reply))
}

pub async fn get_conversation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ConversationSummary>, ApiError> {
    let conversation = state.assistant.conversation(id).await?;
    Ok(Json(ConversationSummary::from(&conversation)))
}

/// Abandons any in-progress form and clears the selected action.
pub async fn reset_conversation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.assistant.reset(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
