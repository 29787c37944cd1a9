//! Turn dispatcher.
//!
//! Each turn names an [`Action`]. Form actions feed the message into the
//! matching [`FormSession`]; the question action runs retrieval-augmented
//! answering over the active document. Conversation state is loaded from and
//! saved to the [`SessionStore`] around every turn, and a turn that fails on
//! an external call leaves the stored state untouched.

use chrono::{Duration, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

use crate::application::{DocumentService, RagService};
use crate::domain::{
    ports::SessionStore, Action, ConversationState, DomainError, Field, FormKind, FormRecord,
    MessageRole, SubmitOutcome,
};

const MAX_HISTORY: usize = 50;
const QUESTION_PROMPT: &str = "Ask a question about the document:";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyKind {
    /// The assistant is waiting for the named field.
    Prompt,
    /// The last answer was rejected; the same field is asked again.
    Retry,
    /// A form was completed and confirmed.
    Completed,
    /// A document question was answered.
    Answer,
}

#[derive(Debug, Clone, Serialize)]
pub struct SourcePassage {
    pub chunk_index: usize,
    pub score: f32,
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AssistantReply {
    pub conversation_id: Uuid,
    pub action: Action,
    pub kind: ReplyKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<Field>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<FormRecord>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<SourcePassage>,
}

impl AssistantReply {
    fn new(conversation_id: Uuid, action: Action, kind: ReplyKind, message: String) -> Self {
        Self {
            conversation_id,
            action,
            kind,
            message,
            field: None,
            prompt: None,
            record: None,
            sources: Vec::new(),
        }
    }

    fn from_outcome(conversation_id: Uuid, action: Action, outcome: SubmitOutcome) -> Self {
        match outcome {
            SubmitOutcome::Started { field, prompt } | SubmitOutcome::Advanced { field, prompt } => {
                let mut reply = Self::new(conversation_id, action, ReplyKind::Prompt, prompt);
                reply.field = Some(field);
                reply
            }
            SubmitOutcome::Rejected { field, error } => {
                let mut reply = Self::new(conversation_id, action, ReplyKind::Retry, error);
                reply.field = Some(field);
                reply
            }
            SubmitOutcome::Completed {
                confirmation,
                record,
            } => {
                let mut reply =
                    Self::new(conversation_id, action, ReplyKind::Completed, confirmation);
                reply.record = Some(record);
                reply
            }
        }
    }
}

pub struct AssistantService {
    sessions: Arc<dyn SessionStore>,
    documents: Arc<DocumentService>,
    rag: Arc<RagService>,
    form_ttl: Duration,
}

impl AssistantService {
    pub fn new(
        sessions: Arc<dyn SessionStore>,
        documents: Arc<DocumentService>,
        rag: Arc<RagService>,
    ) -> Self {
        Self {
            sessions,
            documents,
            rag,
            form_ttl: Duration::minutes(30),
        }
    }

    /// In-progress forms idle longer than `ttl` restart from their first field.
    pub fn with_form_ttl(mut self, ttl: Duration) -> Self {
        self.form_ttl = ttl;
        self
    }

    pub fn documents(&self) -> &Arc<DocumentService> {
        &self.documents
    }

    #[instrument(skip(self))]
    pub async fn start_conversation(&self) -> Result<ConversationState, DomainError> {
        let state = ConversationState::new(Uuid::new_v4());
        self.sessions.save(&state).await?;
        tracing::info!(conversation_id = %state.id, "conversation started");
        Ok(state)
    }

    pub async fn conversation(&self, id: Uuid) -> Result<ConversationState, DomainError> {
        self.sessions
            .load(id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("conversation {id}")))
    }

    /// Abandons any in-progress form and clears the selected action.
    #[instrument(skip(self))]
    pub async fn reset(&self, id: Uuid) -> Result<ConversationState, DomainError> {
        let mut state = self.conversation(id).await?;
        state.reset();
        self.sessions.save(&state).await?;
        Ok(state)
    }

    pub async fn end_conversation(&self, id: Uuid) -> Result<(), DomainError> {
        self.sessions.delete(id).await
    }

    /// Runs one user turn.
    ///
    /// Selecting a form whose session is idle starts it and returns the first
    /// prompt without consuming `message`.
    #[instrument(skip(self, message), fields(action = action.as_str()))]
    pub async fn handle(
        &self,
        conversation_id: Uuid,
        action: Action,
        message: Option<&str>,
    ) -> Result<AssistantReply, DomainError> {
        let mut state = match self.sessions.load(conversation_id).await? {
            Some(state) => state,
            None => {
                tracing::info!(%conversation_id, "no stored state, starting fresh");
                ConversationState::new(conversation_id)
            }
        };

        for kind in state.expire_forms(Utc::now(), self.form_ttl) {
            tracing::info!(%conversation_id, form = kind.as_str(), "form expired");
        }
        if state.select(action) {
            tracing::debug!(%conversation_id, "action switched");
        }

        let reply = match action.form_kind() {
            Some(kind) => self.advance_form(&mut state, action, kind, message),
            None => self.answer_question(&state, message).await?,
        };

        if let Some(text) = message.filter(|m| !m.trim().is_empty()) {
            state.add_message(MessageRole::User, text);
        }
        state.add_message(MessageRole::Assistant, &reply.message);
        trim_history(&mut state);

        self.sessions.save(&state).await?;
        Ok(reply)
    }

    fn advance_form(
        &self,
        state: &mut ConversationState,
        action: Action,
        kind: FormKind,
        message: Option<&str>,
    ) -> AssistantReply {
        let form = state.form_mut(kind);
        let outcome = form.submit(message.unwrap_or_default());

        match &outcome {
            SubmitOutcome::Rejected { field, .. } => {
                tracing::info!(form = kind.as_str(), field = field.as_str(), "input rejected");
            }
            SubmitOutcome::Completed { .. } => {
                tracing::info!(form = kind.as_str(), "form completed");
            }
            _ => {}
        }

        let mut reply = AssistantReply::from_outcome(state.id, action, outcome);
        if reply.kind == ReplyKind::Retry {
            reply.prompt = state.form(kind).current_prompt();
        }
        reply
    }

    async fn answer_question(
        &self,
        state: &ConversationState,
        message: Option<&str>,
    ) -> Result<AssistantReply, DomainError> {
        let id = state.id;
        let Some(question) = message.map(str::trim).filter(|q| !q.is_empty()) else {
            return Ok(AssistantReply::new(
                id,
                Action::AnswerQuestion,
                ReplyKind::Prompt,
                QUESTION_PROMPT.to_string(),
            ));
        };

        if !self.documents.has_document() {
            return Err(DomainError::no_document(
                "upload a document before asking questions",
            ));
        }

        let answer = self.rag.answer(question).await.map_err(|e| {
            tracing::error!(conversation_id = %id, error = %e, "question failed");
            e
        })?;

        let mut reply = AssistantReply::new(id, Action::AnswerQuestion, ReplyKind::Answer, answer.answer);
        reply.sources = answer
            .sources
            .into_iter()
            .map(|r| SourcePassage {
                chunk_index: r.chunk.chunk_index,
                score: r.score,
                content: r.chunk.content,
            })
            .collect();
        Ok(reply)
    }
}

fn trim_history(state: &mut ConversationState) {
    if state.messages.len() > MAX_HISTORY {
        let excess = state.messages.len() - MAX_HISTORY;
        state.messages.drain(..excess);
    }
}
