//! LLM-backed company discovery.
//!
//! Talks to an OpenAI-compatible chat-completions endpoint and forces a
//! function call whose arguments carry the structured company list. When
//! a model ignores the tool and answers in prose, the first JSON object
//! embedded in the content is used as a fallback.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::config::LlmConfig;
use crate::error::{AppError, Result};

pub struct CompanySearchClient {
    http: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
    max_tokens: u32,
    temperature: f64,
}

/// One company produced by a discovery search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyProfile {
    pub company_name: String,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CompaniesPayload {
    #[serde(default)]
    companies: Vec<CompanyProfile>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<ToolCall>>,
}

#[derive(Debug, Deserialize)]
struct ToolCall {
    function: FunctionCall,
}

#[derive(Debug, Deserialize)]
struct FunctionCall {
    arguments: String,
}

impl CompanySearchClient {
    pub fn new(config: &LlmConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .unwrap_or_default();

        Self {
            http,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }

    /// Search for companies matching `query`, returning at most
    /// `max_results` entries.
    pub async fn search_companies(
        &self,
        query: &str,
        max_results: u32,
    ) -> Result<Vec<CompanyProfile>> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| AppError::Validation("LLM API key is not configured".to_string()))?;

        let url = format!("{}/chat/completions", self.base_url);
        let prompt = format!(
            "Search for {query} and return up to {max_results} companies with \
             name, website, short description, country and city."
        );

        let payload = json!({
            "model": self.model,
            "messages": [
                {
                    "role": "system",
                    "content": "You are a business research assistant. \
                                Return factual company information only."
                },
                { "role": "user", "content": prompt }
            ],
            "tools": [company_search_tool()],
            "tool_choice": { "type": "function", "function": { "name": "search_companies" } },
            "max_tokens": self.max_tokens,
            "temperature": self.temperature,
        });

        let response = self
            .http
            .post(&url)
            .bearer_auth(api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("LLM request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Upstream(format!("LLM returned {status}: {body}")));
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("LLM response unreadable: {e}")))?;

        let companies = extract_companies(&chat)?;
        tracing::debug!(query, found = companies.len(), "Company search done");

        Ok(companies)
    }
}

/// Tool schema the model is forced to call; its arguments are the
/// structured result.
fn company_search_tool() -> serde_json::Value {
    json!({
        "type": "function",
        "function": {
            "name": "search_companies",
            "description": "Report companies matching the search query",
            "parameters": {
                "type": "object",
                "properties": {
                    "companies": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "properties": {
                                "company_name": { "type": "string" },
                                "website": { "type": "string" },
                                "description": { "type": "string" },
                                "country": { "type": "string" },
                                "city": { "type": "string" }
                            },
                            "required": ["company_name"]
                        }
                    }
                },
                "required": ["companies"]
            }
        }
    })
}

fn extract_companies(chat: &ChatResponse) -> Result<Vec<CompanyProfile>> {
    let message = chat
        .choices
        .first()
        .map(|choice| &choice.message)
        .ok_or_else(|| AppError::Upstream("LLM response had no choices".to_string()))?;

    if let Some(call) = message
        .tool_calls
        .as_ref()
        .and_then(|calls| calls.first())
    {
        let payload: CompaniesPayload = serde_json::from_str(&call.function.arguments)
            .map_err(|e| AppError::Upstream(format!("tool call arguments unreadable: {e}")))?;
        return Ok(payload.companies);
    }

    let content = message.content.as_deref().unwrap_or_default();
    let payload = extract_json_object(content)
        .and_then(|raw| serde_json::from_str::<CompaniesPayload>(raw).ok())
        .ok_or_else(|| {
            AppError::Upstream("LLM response contained no company data".to_string())
        })?;

    Ok(payload.companies)
}

/// Slice out the first-to-last brace span of a prose answer, which is
/// where models that skip the tool call tend to put their JSON.
fn extract_json_object(content: &str) -> Option<&str> {
    let start = content.find('{')?;
    let end = content.rfind('}')?;
    if end > start {
        Some(&content[start..=end])
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chat_with_tool_call(arguments: &str) -> ChatResponse {
        ChatResponse {
            choices: vec![ChatChoice {
                message: ChatMessage {
                    content: None,
                    tool_calls: Some(vec![ToolCall {
                        function: FunctionCall {
                            arguments: arguments.to_string(),
                        },
                    }]),
                },
            }],
        }
    }

    #[test]
    fn test_extract_from_tool_call() {
        let chat = chat_with_tool_call(
            r#"{"companies":[{"company_name":"SweetCo","country":"Germany"}]}"#,
        );
        let companies = extract_companies(&chat).unwrap();
        assert_eq!(companies.len(), 1);
        assert_eq!(companies[0].company_name, "SweetCo");
        assert_eq!(companies[0].country.as_deref(), Some("Germany"));
        assert!(companies[0].website.is_none());
    }

    #[test]
    fn test_extract_from_content_fallback() {
        let chat = ChatResponse {
            choices: vec![ChatChoice {
                message: ChatMessage {
                    content: Some(
                        "Here you go: {\"companies\":[{\"company_name\":\"Stevia Labs\"}]} hope it helps"
                            .to_string(),
                    ),
                    tool_calls: None,
                },
            }],
        };
        let companies = extract_companies(&chat).unwrap();
        assert_eq!(companies[0].company_name, "Stevia Labs");
    }

    #[test]
    fn test_extract_rejects_empty_response() {
        let chat = ChatResponse {
            choices: vec![ChatChoice {
                message: ChatMessage {
                    content: Some("no structured data here".to_string()),
                    tool_calls: None,
                },
            }],
        };
        assert!(extract_companies(&chat).is_err());

        let chat = ChatResponse { choices: vec![] };
        assert!(extract_companies(&chat).is_err());
    }

    #[test]
    fn test_extract_json_object() {
        assert_eq!(extract_json_object("x {\"a\":1} y"), Some("{\"a\":1}"));
        assert_eq!(extract_json_object("no braces"), None);
        assert_eq!(extract_json_object("} reversed {"), None);
    }
}
