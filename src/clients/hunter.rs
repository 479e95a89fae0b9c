//! Hunter.io domain-search client: looks up the people publicly
//! associated with a company domain.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::HunterConfig;
use crate::error::{AppError, Result};

/// Hunter caps domain-search results at this size.
const MAX_RESULTS: u32 = 20;

pub struct HunterClient {
    http: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

/// One person found for a domain.
#[derive(Debug, Clone, Serialize)]
pub struct DiscoveredContact {
    pub name: String,
    pub first_name: String,
    pub last_name: String,
    pub position: String,
    pub company: String,
    pub email: String,
    pub description: String,
}

#[derive(Debug, Serialize)]
pub struct DomainSearchResult {
    pub domain: String,
    pub contacts: Vec<DiscoveredContact>,
    pub total_found: usize,
}

#[derive(Debug, Deserialize)]
struct SearchEnvelope {
    data: Option<SearchData>,
}

#[derive(Debug, Deserialize)]
struct SearchData {
    organization: Option<String>,
    #[serde(default)]
    emails: Vec<EmailEntry>,
}

#[derive(Debug, Deserialize)]
struct EmailEntry {
    value: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
    position: Option<String>,
    department: Option<String>,
}

impl HunterClient {
    pub fn new(config: &HunterConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .unwrap_or_default();

        Self {
            http,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Search the contacts known for `domain`. `limit` is clamped to the
    /// upstream maximum of 20.
    pub async fn domain_search(&self, domain: &str, limit: u32) -> Result<DomainSearchResult> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| AppError::Validation("Hunter API key is not configured".to_string()))?;

        let limit = limit.min(MAX_RESULTS).to_string();
        let url = format!("{}/domain-search", self.base_url);

        let response = self
            .http
            .get(&url)
            .query(&[
                ("domain", domain),
                ("api_key", api_key),
                ("limit", limit.as_str()),
            ])
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Hunter request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Upstream(format!(
                "Hunter returned {status}: {body}"
            )));
        }

        let envelope: SearchEnvelope = response
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("Hunter response unreadable: {e}")))?;

        let Some(data) = envelope.data else {
            return Err(AppError::Upstream(format!(
                "Hunter returned no data for domain {domain}"
            )));
        };

        let contacts = map_contacts(&data);

        tracing::debug!(domain, found = contacts.len(), "Hunter domain search done");

        Ok(DomainSearchResult {
            domain: domain.to_string(),
            total_found: contacts.len(),
            contacts,
        })
    }
}

fn map_contacts(data: &SearchData) -> Vec<DiscoveredContact> {
    let company = data
        .organization
        .clone()
        .unwrap_or_else(|| "Unknown Company".to_string());

    data.emails
        .iter()
        .map(|entry| {
            let first_name = entry.first_name.clone().unwrap_or_default();
            let last_name = entry.last_name.clone().unwrap_or_default();
            let name = format!("{first_name} {last_name}").trim().to_string();
            let position = entry
                .position
                .clone()
                .unwrap_or_else(|| "Unknown Position".to_string());

            let mut description = format!("{position} at {company}");
            if let Some(department) = entry.department.as_deref().filter(|d| !d.is_empty()) {
                description.push_str(&format!(" ({department} department)"));
            }

            DiscoveredContact {
                name,
                first_name,
                last_name,
                position,
                company: company.clone(),
                email: entry.value.clone().unwrap_or_default(),
                description,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_contacts_builds_description() {
        let data = SearchData {
            organization: Some("Acme".to_string()),
            emails: vec![EmailEntry {
                value: Some("jane@acme.test".to_string()),
                first_name: Some("Jane".to_string()),
                last_name: Some("Doe".to_string()),
                position: Some("CTO".to_string()),
                department: Some("executive".to_string()),
            }],
        };

        let contacts = map_contacts(&data);
        assert_eq!(contacts.len(), 1);
        assert_eq!(contacts[0].name, "Jane Doe");
        assert_eq!(contacts[0].description, "CTO at Acme (executive department)");
    }

    #[test]
    fn test_map_contacts_defaults() {
        let data = SearchData {
            organization: None,
            emails: vec![EmailEntry {
                value: None,
                first_name: None,
                last_name: None,
                position: None,
                department: None,
            }],
        };

        let contacts = map_contacts(&data);
        assert_eq!(contacts[0].name, "");
        assert_eq!(contacts[0].company, "Unknown Company");
        assert_eq!(contacts[0].description, "Unknown Position at Unknown Company");
    }
}
