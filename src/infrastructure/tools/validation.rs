use rig::completion::ToolDefinition;
use rig::tool::Tool;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::convert::Infallible;

use crate::domain::validation::{format_date, parse_date, validate_email, validate_phone};

pub const VALID_EMAIL: &str = "Valid email";
pub const INVALID_EMAIL: &str = "Invalid email";
pub const VALID_PHONE: &str = "Valid phone";
pub const INVALID_PHONE: &str = "Invalid phone";
pub const INVALID_DATE: &str = "Invalid date";

#[derive(Debug, Deserialize, Serialize)]
pub struct ToolInput {
    pub input: String,
}

fn single_input_schema(description: &str) -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "input": {
                "type": "string",
                "description": description
            }
        },
        "required": ["input"]
    })
}

pub struct ValidateEmailTool;

impl Tool for ValidateEmailTool {
    const NAME: &'static str = "validate_email";

    type Error = Infallible;
    type Args = ToolInput;
    type Output = String;

    async fn definition(&self, _prompt: String) -> ToolDefinition {
        ToolDefinition {
            name: Self::NAME.to_string(),
            description: "Validates an email address.".to_string(),
            parameters: single_input_schema("The email address to check"),
        }
    }

    async fn call(&self, args: Self::Args) -> Result<Self::Output, Self::Error> {
        let verdict = if validate_email(args.input.trim()) {
            VALID_EMAIL
        } else {
            INVALID_EMAIL
        };
        Ok(verdict.to_string())
    }
}

pub struct ValidatePhoneTool;

impl Tool for ValidatePhoneTool {
    const NAME: &'static str = "validate_phone";

    type Error = Infallible;
    type Args = ToolInput;
    type Output = String;

    async fn definition(&self, _prompt: String) -> ToolDefinition {
        ToolDefinition {
            name: Self::NAME.to_string(),
            description: "Validates a phone number (exactly 10 digits).".to_string(),
            parameters: single_input_schema("The phone number to check"),
        }
    }

    async fn call(&self, args: Self::Args) -> Result<Self::Output, Self::Error> {
        let verdict = if validate_phone(args.input.trim()) {
            VALID_PHONE
        } else {
            INVALID_PHONE
        };
        Ok(verdict.to_string())
    }
}

pub struct ParseDateTool;

impl Tool for ParseDateTool {
    const NAME: &'static str = "parse_date";

    type Error = Infallible;
    type Args = ToolInput;
    type Output = String;

    async fn definition(&self, _prompt: String) -> ToolDefinition {
        ToolDefinition {
            name: Self::NAME.to_string(),
            description: "Parses natural language dates into YYYY-MM-DD.".to_string(),
            parameters: single_input_schema("A date such as 'next Monday' or 'March 5'"),
        }
    }

    async fn call(&self, args: Self::Args) -> Result<Self::Output, Self::Error> {
        Ok(parse_date(&args.input)
            .map(format_date)
            .unwrap_or_else(|| INVALID_DATE.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(s: &str) -> ToolInput {
        ToolInput {
            input: s.to_string(),
        }
    }

    #[tokio::test]
    async fn test_email_tool_verdicts() {
        let tool = ValidateEmailTool;
        assert_eq!(tool.call(input("a@b.com")).await.unwrap(), VALID_EMAIL);
        assert_eq!(tool.call(input("nope")).await.unwrap(), INVALID_EMAIL);
    }

    #[tokio::test]
    async fn test_phone_tool_verdicts() {
        let tool = ValidatePhoneTool;
        assert_eq!(tool.call(input("1234567890")).await.unwrap(), VALID_PHONE);
        assert_eq!(tool.call(input("123-456-7890")).await.unwrap(), INVALID_PHONE);
    }

    #[tokio::test]
    async fn test_date_tool_output() {
        let tool = ParseDateTool;
        let parsed = tool.call(input("next monday")).await.unwrap();
        assert_eq!(parsed.len(), 10);
        assert!(chrono::NaiveDate::parse_from_str(&parsed, "%Y-%m-%d").is_ok());

        assert_eq!(tool.call(input("next funday")).await.unwrap(), INVALID_DATE);
    }

    #[tokio::test]
    async fn test_definitions_name_the_tools() {
        let def = ParseDateTool.definition(String::new()).await;
        assert_eq!(def.name, "parse_date");
        assert_eq!(def.parameters["required"][0], "input");
    }
}
