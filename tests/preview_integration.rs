//! End-to-end tests for the rendering pipeline: placeholder scanning,
//! per-contact variable maps and batch preview aggregation, run against an
//! in-memory data source.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;

use outreach_service::config::SenderProfile;
use outreach_service::domain::contact::Contact;
use outreach_service::domain::template::{
    batch_preview, render_content, EmailTemplate, PreviewSource,
};
use outreach_service::error::Result;

struct MemorySource {
    templates: Vec<EmailTemplate>,
    contacts: Vec<Contact>,
}

#[async_trait]
impl PreviewSource for MemorySource {
    async fn template(&self, template_id: i64, user_id: i64) -> Result<Option<EmailTemplate>> {
        Ok(self
            .templates
            .iter()
            .find(|t| t.id == template_id && t.user_id == user_id)
            .cloned())
    }

    async fn contacts_by_ids(&self, ids: &[i64], user_id: i64) -> Result<Vec<Contact>> {
        // Intentionally reversed to mimic an unordered `id IN (...)` query;
        // the engine must restore caller order itself.
        let mut found: Vec<Contact> = self
            .contacts
            .iter()
            .filter(|c| ids.contains(&c.id) && c.user_id == user_id)
            .cloned()
            .collect();
        found.reverse();
        Ok(found)
    }
}

fn contact(id: i64, name: &str, first_name: Option<&str>, position: Option<&str>) -> Contact {
    Contact {
        id,
        user_id: 1,
        name: name.to_string(),
        first_name: first_name.map(str::to_string),
        last_name: None,
        email: format!("{}@acme.test", name.to_lowercase()),
        company: "Acme".to_string(),
        domain: None,
        position: position.map(str::to_string),
        tags: None,
        created_at: Utc::now(),
        updated_at: None,
    }
}

fn template(id: i64, content: &str) -> EmailTemplate {
    EmailTemplate {
        id,
        user_id: 1,
        title: "Outreach intro".to_string(),
        content: content.to_string(),
        created_at: Utc::now(),
        updated_at: None,
    }
}

fn sender() -> SenderProfile {
    SenderProfile {
        sender_name: "Alex Carter".to_string(),
        sender_company: "Northwind".to_string(),
        product_name: "Sampler".to_string(),
        contact_phone: "+1-555-0100".to_string(),
    }
}

fn source() -> MemorySource {
    MemorySource {
        templates: vec![template(
            1,
            "Hi {{ first_name }}, this is {{sender_name}} from {{my_company}}. \
             I noticed {{company}} is hiring for {{position}}.",
        )],
        contacts: vec![
            contact(10, "Ana", Some("Ana"), Some("Head of Sales")),
            contact(11, "Bo", None, None),
            contact(12, "Cy", Some("Cy"), Some("CTO")),
        ],
    }
}

#[tokio::test]
async fn batch_preview_renders_each_contact_with_merged_variables() {
    let result = batch_preview(&source(), &sender(), 1, &[10, 11], 1)
        .await
        .unwrap();

    assert!(result.success);
    assert_eq!(result.template_title, "Outreach intro");
    assert_eq!(result.total_contacts, 2);
    assert_eq!(result.successful_previews, 2);
    assert_eq!(result.failed_previews, 0);

    let ana = &result.previews[0];
    assert_eq!(
        ana.rendered_content,
        "Hi Ana, this is Alex Carter from Northwind. \
         I noticed Acme is hiring for Head of Sales."
    );

    // Optional fields missing on the contact render as empty strings, not
    // as missing variables.
    let bo = &result.previews[1];
    assert_eq!(
        bo.rendered_content,
        "Hi , this is Alex Carter from Northwind. \
         I noticed Acme is hiring for ."
    );
    assert!(bo.variables_missing.is_empty());
}

#[tokio::test]
async fn batch_preview_restores_caller_order() {
    let result = batch_preview(&source(), &sender(), 1, &[12, 10, 11], 1)
        .await
        .unwrap();

    let ids: Vec<i64> = result.previews.iter().map(|p| p.contact_id).collect();
    assert_eq!(ids, vec![12, 10, 11]);
}

#[tokio::test]
async fn batch_preview_drops_unresolved_ids_from_counts_only() {
    // 99 does not exist and 12 is requested twice: the denominator keeps
    // all four entries while previews collapse to the three real contacts.
    let result = batch_preview(&source(), &sender(), 1, &[12, 99, 12, 10], 1)
        .await
        .unwrap();

    assert_eq!(result.total_contacts, 4);
    assert_eq!(result.successful_previews, 2);
    assert_eq!(result.failed_previews, 0);
    assert_eq!(result.previews.len(), 2);
}

#[tokio::test]
async fn batch_preview_with_missing_template_fails_whole_batch() {
    let result = batch_preview(&source(), &sender(), 404, &[10, 11, 12], 1)
        .await
        .unwrap();

    assert!(!result.success);
    assert_eq!(result.template_title, "");
    assert_eq!(result.total_contacts, 3);
    assert_eq!(result.successful_previews, 0);
    assert_eq!(result.failed_previews, 3);
    assert!(result.previews.is_empty());
}

#[tokio::test]
async fn batch_preview_reports_unknown_placeholders_per_contact() {
    let source = MemorySource {
        templates: vec![template(2, "{{name}}: {{discount_code}}")],
        contacts: vec![contact(10, "Ana", Some("Ana"), None)],
    };

    let result = batch_preview(&source, &sender(), 2, &[10], 1).await.unwrap();
    let preview = &result.previews[0];

    assert_eq!(preview.rendered_content, "Ana: {{discount_code}}");
    assert_eq!(preview.variables_missing, vec!["discount_code"]);
    assert_eq!(preview.variables_used["name"], json!("Ana"));
    // A missing variable does not fail the preview; the render still
    // succeeds with the placeholder left verbatim.
    assert_eq!(result.successful_previews, 1);
}

#[test]
fn render_is_idempotent_across_calls() {
    let variables = serde_json::Map::from_iter([
        ("name".to_string(), json!("Ana")),
        ("company".to_string(), json!("Acme")),
    ]);
    let content = "Hello {{name}} at {{company}}, {{name}} again; {{absent}} stays.";

    let first = render_content(content, &variables);
    let second = render_content(content, &variables);

    assert_eq!(first, second);
    assert_eq!(
        first.content,
        "Hello Ana at Acme, Ana again; {{absent}} stays."
    );
}
