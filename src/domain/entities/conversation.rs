use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use super::form::{FormKind, FormSession};
use crate::domain::DomainError;

/// What the user chose to do in a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    AnswerQuestion,
    RequestCallback,
    BookAppointment,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AnswerQuestion => "answer_question",
            Self::RequestCallback => "request_callback",
            Self::BookAppointment => "book_appointment",
        }
    }

    pub fn form_kind(&self) -> Option<FormKind> {
        match self {
            Self::AnswerQuestion => None,
            Self::RequestCallback => Some(FormKind::Callback),
            Self::BookAppointment => Some(FormKind::Appointment),
        }
    }
}

impl FromStr for Action {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "answer_question" | "question" | "qa" | "ask" => Ok(Self::AnswerQuestion),
            "request_callback" | "callback" => Ok(Self::RequestCallback),
            "book_appointment" | "appointment" | "book" => Ok(Self::BookAppointment),
            other => Err(DomainError::validation(format!("unknown action '{other}'"))),
        }
    }
}

/// Everything one conversation needs between turns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationState {
    pub id: Uuid,
    pub action: Option<Action>,
    pub callback: FormSession,
    pub appointment: FormSession,
    pub messages: Vec<Message>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ConversationState {
    pub fn new(id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id,
            action: None,
            callback: FormSession::callback(),
            appointment: FormSession::appointment(),
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn form_mut(&mut self, kind: FormKind) -> &mut FormSession {
        match kind {
            FormKind::Callback => &mut self.callback,
            FormKind::Appointment => &mut self.appointment,
        }
    }

    pub fn form(&self, kind: FormKind) -> &FormSession {
        match kind {
            FormKind::Callback => &self.callback,
            FormKind::Appointment => &self.appointment,
        }
    }

    /// Switches the selected action. Leaving a form abandons it, so coming
    /// back later starts from the first field.
    pub fn select(&mut self, action: Action) -> bool {
        if self.action == Some(action) {
            return false;
        }
        if let Some(kind) = self.action.and_then(|a| a.form_kind()) {
            self.form_mut(kind).reset();
        }
        self.action = Some(action);
        true
    }

    /// Drops stale in-progress forms.
    pub fn expire_forms(&mut self, now: DateTime<Utc>, ttl: Duration) -> Vec<FormKind> {
        let mut expired = Vec::new();
        for kind in [FormKind::Callback, FormKind::Appointment] {
            let form = self.form_mut(kind);
            if form.is_expired(now, ttl) {
                form.reset();
                expired.push(kind);
            }
        }
        expired
    }

    pub fn reset(&mut self) {
        self.action = None;
        self.callback.reset();
        self.appointment.reset();
        self.touch();
    }

    pub fn add_message(&mut self, role: MessageRole, content: impl Into<String>) {
        self.messages.push(Message {
            role,
            content: content.into(),
        });
        self.touch();
    }

    pub fn last_user_message(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| matches!(m.role, MessageRole::User))
            .map(|m| m.content.as_str())
    }

    /// Most recent messages, oldest first.
    pub fn recent_messages(&self, limit: usize) -> &[Message] {
        let start = self.messages.len().saturating_sub(limit);
        &self.messages[start..]
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "System",
            Self::User => "User",
            Self::Assistant => "Assistant",
        }
    }
}
