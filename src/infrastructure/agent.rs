use rig::client::{CompletionClient, ProviderClient};
use rig::completion::Prompt;
use rig::providers::gemini;
use std::sync::Arc;
use std::time::Duration;

use crate::application::RagService;
use crate::domain::{DomainError, Message};
use crate::infrastructure::config::{AppConfig, KnowledgeBaseToolConfig};
use crate::infrastructure::tools::{
    KnowledgeBaseTool, ParseDateTool, ValidateEmailTool, ValidatePhoneTool,
};

/// Free-form chat agent that routes to the knowledge base and the validation
/// tools. The form flows call the validators directly and never go through
/// this agent.
pub struct ChatAgent {
    client: gemini::Client,
    model: String,
    system_prompt: String,
    temperature: f64,
    rag: Arc<RagService>,
    top_k: usize,
    tool_config: KnowledgeBaseToolConfig,
    max_turns: usize,
    timeout: Duration,
}

impl ChatAgent {
    pub fn new(rag: Arc<RagService>, config: &AppConfig) -> Self {
        Self {
            client: gemini::Client::from_env(),
            model: config.config.llm.model.clone(),
            system_prompt: config.prompts.agent.system.clone(),
            temperature: config.config.llm.temperature,
            rag,
            top_k: config.config.rag.top_k,
            tool_config: config.config.tools.knowledge_base.clone(),
            max_turns: config.config.llm.max_turns,
            timeout: Duration::from_secs(config.config.llm.timeout_seconds),
        }
    }

    pub async fn chat_with_history(
        &self,
        message: &str,
        history: &[Message],
    ) -> Result<String, DomainError> {
        let knowledge_base =
            KnowledgeBaseTool::new(self.rag.clone(), self.top_k, self.tool_config.clone());

        let agent = self
            .client
            .agent(&self.model)
            .preamble(&self.system_prompt)
            .temperature(self.temperature)
            .tool(knowledge_base)
            .tool(ValidateEmailTool)
            .tool(ValidatePhoneTool)
            .tool(ParseDateTool)
            .build();

        let prompt = build_prompt(message, history);

        tokio::time::timeout(self.timeout, agent.prompt(&prompt).multi_turn(self.max_turns))
            .await
            .map_err(|_| DomainError::timeout("Agent execution timed out"))?
            .map_err(|e| DomainError::external(format!("Agent failed: {e}")))
    }
}

fn build_prompt(message: &str, history: &[Message]) -> String {
    if history.is_empty() {
        return message.to_string();
    }

    let context = history
        .iter()
        .map(|m| format!("{}: {}", m.role.as_str(), m.content))
        .collect::<Vec<_>>()
        .join("\n");

    format!("Previous conversation:\n{context}\n\nCurrent message from user: {message}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MessageRole;

    #[test]
    fn test_prompt_without_history_is_message() {
        assert_eq!(build_prompt("hello", &[]), "hello");
    }

    #[test]
    fn test_prompt_includes_history() {
        let history = vec![
            Message::new(MessageRole::User, "Book me in"),
            Message::new(MessageRole::Assistant, "Which date?"),
        ];
        let prompt = build_prompt("next monday", &history);

        assert!(prompt.starts_with("Previous conversation:\nUser: Book me in\nAssistant: Which date?"));
        assert!(prompt.ends_with("Current message from user: next monday"));
    }
}
