//! Contact records and their tag list.

mod service;
mod tags;

pub use service::{ContactFilter, ContactService};
pub use tags::{ContactTag, CreateTagRequest, TagService, UpdateTagRequest};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored contact. `tags` holds a JSON-encoded string array, mirroring
/// the column it is read from.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Contact {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: String,
    pub company: String,
    pub domain: Option<String>,
    pub position: Option<String>,
    pub tags: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Contact {
    /// Parsed tag names; an unparsable column value counts as no tags.
    pub fn tag_names(&self) -> Vec<String> {
        parse_tags(self.tags.as_deref())
    }

    /// One-line summary, e.g. "CTO at Acme".
    pub fn description(&self) -> String {
        let mut parts = Vec::new();
        if let Some(position) = self.position.as_deref().filter(|p| !p.is_empty()) {
            parts.push(position.to_string());
        }
        if !self.company.is_empty() {
            parts.push(format!("at {}", self.company));
        }
        if parts.is_empty() {
            "No description".to_string()
        } else {
            parts.join(" ")
        }
    }
}

/// Decode the JSON tag column. Invalid JSON yields an empty list rather
/// than an error so a corrupt row cannot poison list endpoints.
pub fn parse_tags(raw: Option<&str>) -> Vec<String> {
    match raw {
        Some(text) => serde_json::from_str(text).unwrap_or_default(),
        None => Vec::new(),
    }
}

/// Encode a tag list for storage; an empty list stores as NULL.
pub fn encode_tags(tags: &[String]) -> Option<String> {
    if tags.is_empty() {
        None
    } else {
        // Serializing Vec<String> cannot fail
        serde_json::to_string(tags).ok()
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateContactRequest {
    pub name: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: String,
    pub company: String,
    pub domain: Option<String>,
    pub position: Option<String>,
    pub tag_names: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateContactRequest {
    pub name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub company: Option<String>,
    pub domain: Option<String>,
    pub position: Option<String>,
    pub tag_names: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
pub struct ContactResponse {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: String,
    pub company: String,
    pub domain: Option<String>,
    pub position: Option<String>,
    pub tags: Vec<String>,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<Contact> for ContactResponse {
    fn from(contact: Contact) -> Self {
        let tags = contact.tag_names();
        let description = contact.description();
        Self {
            id: contact.id,
            user_id: contact.user_id,
            name: contact.name,
            first_name: contact.first_name,
            last_name: contact.last_name,
            email: contact.email,
            company: contact.company,
            domain: contact.domain,
            position: contact.position,
            tags,
            description,
            created_at: contact.created_at,
            updated_at: contact.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ContactListResponse {
    pub success: bool,
    pub contacts: Vec<ContactResponse>,
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
    pub total_pages: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_contact() -> Contact {
        Contact {
            id: 1,
            user_id: 1,
            name: "Jane Doe".to_string(),
            first_name: Some("Jane".to_string()),
            last_name: Some("Doe".to_string()),
            email: "jane@acme.test".to_string(),
            company: "Acme".to_string(),
            domain: Some("acme.test".to_string()),
            position: Some("CTO".to_string()),
            tags: Some(r#"["VIP","lead"]"#.to_string()),
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn test_tag_names_parses_json() {
        let contact = sample_contact();
        assert_eq!(contact.tag_names(), vec!["VIP", "lead"]);
    }

    #[test]
    fn test_tag_names_tolerates_garbage() {
        let mut contact = sample_contact();
        contact.tags = Some("not json".to_string());
        assert!(contact.tag_names().is_empty());

        contact.tags = None;
        assert!(contact.tag_names().is_empty());
    }

    #[test]
    fn test_encode_tags_round_trip() {
        let tags = vec!["VIP".to_string(), "lead".to_string()];
        let encoded = encode_tags(&tags).unwrap();
        assert_eq!(parse_tags(Some(&encoded)), tags);

        assert_eq!(encode_tags(&[]), None);
    }

    #[test]
    fn test_description() {
        let contact = sample_contact();
        assert_eq!(contact.description(), "CTO at Acme");

        let mut bare = sample_contact();
        bare.position = None;
        assert_eq!(bare.description(), "at Acme");

        bare.company = String::new();
        assert_eq!(bare.description(), "No description");
    }
}
