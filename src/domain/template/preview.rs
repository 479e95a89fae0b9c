//! Batch preview: render one template against many contacts.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::config::SenderProfile;
use crate::domain::contact::Contact;
use crate::error::Result;

use super::render::render_content;
use super::types::{BatchPreviewResponse, ContactPreview, EmailTemplate};

/// Lookups the preview engine depends on. Implemented by the database-
/// backed template service; tests supply an in-memory source.
#[async_trait]
pub trait PreviewSource {
    /// Template by id, owner-scoped; `None` when absent or unowned.
    async fn template(&self, template_id: i64, user_id: i64) -> Result<Option<EmailTemplate>>;

    /// Existing, owned contacts among `ids`; the rest are silently
    /// omitted. Order is unspecified.
    async fn contacts_by_ids(&self, ids: &[i64], user_id: i64) -> Result<Vec<Contact>>;
}

/// Build the variable map for one contact: contact fields (optional ones
/// defaulting to the empty string, with camelCase and `contact_`-prefixed
/// aliases) merged with the configured sender profile.
pub fn contact_variables(contact: &Contact, sender: &SenderProfile) -> Map<String, Value> {
    let text = |value: &Option<String>| {
        Value::String(value.clone().unwrap_or_default())
    };

    let mut variables = Map::new();

    // Contact fields
    variables.insert("name".to_string(), Value::String(contact.name.clone()));
    variables.insert("first_name".to_string(), text(&contact.first_name));
    variables.insert("firstName".to_string(), text(&contact.first_name));
    variables.insert("last_name".to_string(), text(&contact.last_name));
    variables.insert("lastName".to_string(), text(&contact.last_name));
    variables.insert("email".to_string(), Value::String(contact.email.clone()));
    variables.insert("company".to_string(), Value::String(contact.company.clone()));
    variables.insert(
        "contact_company".to_string(),
        Value::String(contact.company.clone()),
    );
    variables.insert("position".to_string(), text(&contact.position));
    variables.insert("domain".to_string(), text(&contact.domain));
    variables.insert("contact_domain".to_string(), text(&contact.domain));

    // Sender profile
    variables.insert(
        "sender_name".to_string(),
        Value::String(sender.sender_name.clone()),
    );
    variables.insert(
        "my_company".to_string(),
        Value::String(sender.sender_company.clone()),
    );
    variables.insert(
        "sender_company".to_string(),
        Value::String(sender.sender_company.clone()),
    );
    variables.insert(
        "product_name".to_string(),
        Value::String(sender.product_name.clone()),
    );
    variables.insert(
        "contact_phone".to_string(),
        Value::String(sender.contact_phone.clone()),
    );

    variables
}

fn build_preview(
    template: &EmailTemplate,
    contact: &Contact,
    sender: &SenderProfile,
) -> Option<ContactPreview> {
    let variables = contact_variables(contact, sender);
    let rendered = render_content(&template.content, &variables);

    Some(ContactPreview {
        contact_id: contact.id,
        contact_name: contact.name.clone(),
        first_name: contact.first_name.clone(),
        last_name: contact.last_name.clone(),
        email: contact.email.clone(),
        company: contact.company.clone(),
        position: contact.position.clone(),
        rendered_content: rendered.content,
        variables_used: rendered.used,
        variables_missing: rendered.missing,
    })
}

/// Render `template_id` against every resolvable contact in
/// `contact_ids`.
///
/// Requested ids that do not resolve to an owned contact (unknown,
/// unowned, or duplicated) are dropped without error; `total_contacts`
/// still counts the raw request list. Previews come back in the caller's
/// order (first occurrence of each id). One contact's failure only
/// increments `failed_previews`; it never aborts the batch.
pub async fn batch_preview<S>(
    source: &S,
    sender: &SenderProfile,
    template_id: i64,
    contact_ids: &[i64],
    user_id: i64,
) -> Result<BatchPreviewResponse>
where
    S: PreviewSource + Sync,
{
    let Some(template) = source.template(template_id, user_id).await? else {
        tracing::debug!(template_id, user_id, "Batch preview for unknown template");
        return Ok(BatchPreviewResponse::template_not_found(
            template_id,
            contact_ids.len(),
        ));
    };

    let resolved = source.contacts_by_ids(contact_ids, user_id).await?;
    let mut by_id: HashMap<i64, Contact> =
        resolved.into_iter().map(|c| (c.id, c)).collect();

    // Re-establish the caller's order, one preview per distinct id.
    let mut seen = HashSet::new();
    let ordered: Vec<Contact> = contact_ids
        .iter()
        .filter(|id| seen.insert(**id))
        .filter_map(|id| by_id.remove(id))
        .collect();

    let mut previews = Vec::with_capacity(ordered.len());
    let mut successful = 0usize;
    let mut failed = 0usize;

    // One contact's preview is built in isolation: a failure is counted
    // and logged without touching the rest of the batch. With the template
    // already in hand a render cannot fail, so in practice every resolved
    // contact succeeds.
    for contact in &ordered {
        match build_preview(&template, contact, sender) {
            Some(preview) => {
                previews.push(preview);
                successful += 1;
            }
            None => {
                tracing::warn!(contact_id = contact.id, "Preview build failed for contact");
                failed += 1;
            }
        }
    }

    tracing::debug!(
        template_id,
        requested = contact_ids.len(),
        resolved = ordered.len(),
        successful,
        "Batch preview rendered"
    );

    Ok(BatchPreviewResponse {
        success: true,
        template_id,
        template_title: template.title,
        total_contacts: contact_ids.len(),
        successful_previews: successful,
        failed_previews: failed,
        previews,
    })
}
