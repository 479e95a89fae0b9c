//! HTTP-level tests for the Hunter and LLM clients against a mock server.

use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use outreach_service::clients::{CompanySearchClient, HunterClient};
use outreach_service::config::{HunterConfig, LlmConfig};
use outreach_service::error::AppError;

fn hunter_config(base_url: String, api_key: Option<&str>) -> HunterConfig {
    HunterConfig {
        api_key: api_key.map(str::to_string),
        base_url,
        timeout_seconds: 5,
    }
}

fn llm_config(base_url: String, api_key: Option<&str>) -> LlmConfig {
    LlmConfig {
        api_key: api_key.map(str::to_string),
        base_url,
        model: "gpt-4".to_string(),
        max_tokens: 512,
        temperature: 0.2,
        timeout_seconds: 5,
    }
}

#[tokio::test]
async fn hunter_domain_search_maps_contacts() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/domain-search"))
        .and(query_param("domain", "acme.test"))
        .and(query_param("api_key", "hunter-key"))
        .and(query_param("limit", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "organization": "Acme",
                "emails": [
                    {
                        "value": "jane@acme.test",
                        "first_name": "Jane",
                        "last_name": "Doe",
                        "position": "CTO",
                        "department": "executive"
                    },
                    {
                        "value": "sam@acme.test",
                        "first_name": "Sam",
                        "last_name": null,
                        "position": null,
                        "department": null
                    }
                ]
            }
        })))
        .mount(&server)
        .await;

    let client = HunterClient::new(&hunter_config(server.uri(), Some("hunter-key")));
    let result = client.domain_search("acme.test", 5).await.unwrap();

    assert_eq!(result.total_found, 2);
    assert_eq!(result.contacts[0].name, "Jane Doe");
    assert_eq!(
        result.contacts[0].description,
        "CTO at Acme (executive department)"
    );
    assert_eq!(result.contacts[1].name, "Sam");
    assert_eq!(
        result.contacts[1].description,
        "Unknown Position at Acme"
    );
}

#[tokio::test]
async fn hunter_clamps_limit_to_twenty() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/domain-search"))
        .and(query_param("limit", "20"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "organization": "Acme", "emails": [] }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = HunterClient::new(&hunter_config(server.uri(), Some("hunter-key")));
    let result = client.domain_search("acme.test", 500).await.unwrap();
    assert_eq!(result.total_found, 0);
}

#[tokio::test]
async fn hunter_without_api_key_is_rejected_locally() {
    let server = MockServer::start().await;
    let client = HunterClient::new(&hunter_config(server.uri(), None));

    let error = client.domain_search("acme.test", 5).await.unwrap_err();
    assert!(matches!(error, AppError::Validation(_)));
}

#[tokio::test]
async fn hunter_upstream_error_is_surfaced() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/domain-search"))
        .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
        .mount(&server)
        .await;

    let client = HunterClient::new(&hunter_config(server.uri(), Some("hunter-key")));
    let error = client.domain_search("acme.test", 5).await.unwrap_err();
    assert!(matches!(error, AppError::Upstream(_)));
}

#[tokio::test]
async fn company_search_reads_tool_call_arguments() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{
                "message": {
                    "content": null,
                    "tool_calls": [{
                        "id": "call_1",
                        "type": "function",
                        "function": {
                            "name": "search_companies",
                            "arguments": "{\"companies\":[{\"company_name\":\"SweetCo\",\"website\":\"https://sweetco.test\",\"country\":\"Germany\"}]}"
                        }
                    }]
                }
            }]
        })))
        .mount(&server)
        .await;

    let client = CompanySearchClient::new(&llm_config(server.uri(), Some("llm-key")));
    let companies = client.search_companies("sweetener makers", 10).await.unwrap();

    assert_eq!(companies.len(), 1);
    assert_eq!(companies[0].company_name, "SweetCo");
    assert_eq!(companies[0].website.as_deref(), Some("https://sweetco.test"));
}

#[tokio::test]
async fn company_search_falls_back_to_content_json() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{
                "message": {
                    "content": "Sure! {\"companies\":[{\"company_name\":\"Stevia Labs\"}]}",
                    "tool_calls": null
                }
            }]
        })))
        .mount(&server)
        .await;

    let client = CompanySearchClient::new(&llm_config(server.uri(), Some("llm-key")));
    let companies = client.search_companies("stevia", 5).await.unwrap();

    assert_eq!(companies.len(), 1);
    assert_eq!(companies[0].company_name, "Stevia Labs");
}

#[tokio::test]
async fn company_search_without_key_is_rejected_locally() {
    let server = MockServer::start().await;
    let client = CompanySearchClient::new(&llm_config(server.uri(), None));

    let error = client.search_companies("anything", 5).await.unwrap_err();
    assert!(matches!(error, AppError::Validation(_)));
}
