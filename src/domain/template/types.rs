//! Template types and request/response shapes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A stored email template. `content` may contain `{{variable}}`
/// placeholders; the record itself is never mutated by rendering.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EmailTemplate {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct CreateTemplateRequest {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTemplateRequest {
    pub title: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TemplateResponse {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<EmailTemplate> for TemplateResponse {
    fn from(template: EmailTemplate) -> Self {
        Self {
            id: template.id,
            user_id: template.user_id,
            title: template.title,
            content: template.content,
            created_at: template.created_at,
            updated_at: template.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TemplateListResponse {
    pub success: bool,
    pub templates: Vec<TemplateResponse>,
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
    pub total_pages: i64,
}

/// Outcome of rendering one template against one variable map.
///
/// `success` is false only when the template could not be found for the
/// requesting owner; rendering itself always succeeds.
#[derive(Debug, Clone, Serialize)]
pub struct RenderResponse {
    pub success: bool,
    pub template_id: i64,
    pub title: String,
    pub rendered_content: String,
    pub variables_used: Map<String, Value>,
    pub variables_missing: Vec<String>,
}

impl RenderResponse {
    /// The reported (not raised) shape for a template that does not exist
    /// for this owner.
    pub fn not_found(template_id: i64) -> Self {
        Self {
            success: false,
            template_id,
            title: String::new(),
            rendered_content: String::new(),
            variables_used: Map::new(),
            variables_missing: Vec::new(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TemplateVariablesResponse {
    pub success: bool,
    pub template_id: i64,
    pub variables: Vec<String>,
    pub total_variables: usize,
}

#[derive(Debug, Deserialize)]
pub struct BatchPreviewRequest {
    pub template_id: i64,
    pub contact_ids: Vec<i64>,
}

/// One contact's personalized rendering inside a batch preview.
#[derive(Debug, Clone, Serialize)]
pub struct ContactPreview {
    pub contact_id: i64,
    pub contact_name: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: String,
    pub company: String,
    pub position: Option<String>,
    pub rendered_content: String,
    pub variables_used: Map<String, Value>,
    pub variables_missing: Vec<String>,
}

/// Aggregate of a batch preview run.
///
/// `total_contacts` counts the ids the caller requested, duplicates
/// included; ids that resolve to no owned contact are dropped from both
/// counters, so `successful_previews + failed_previews` equals the number
/// of contacts actually found.
#[derive(Debug, Serialize)]
pub struct BatchPreviewResponse {
    pub success: bool,
    pub template_id: i64,
    pub template_title: String,
    pub total_contacts: usize,
    pub successful_previews: usize,
    pub failed_previews: usize,
    pub previews: Vec<ContactPreview>,
}

impl BatchPreviewResponse {
    /// All-failed shape for a template missing for this owner.
    pub fn template_not_found(template_id: i64, requested: usize) -> Self {
        Self {
            success: false,
            template_id,
            template_title: String::new(),
            total_contacts: requested,
            successful_previews: 0,
            failed_previews: requested,
            previews: Vec::new(),
        }
    }
}
