//! Template persistence, rendering and preview orchestration.

use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::PgPool;

use crate::domain::contact::{Contact, ContactService};
use crate::domain::pagination::Page;
use crate::error::Result;

use super::preview::PreviewSource;
use super::render::{placeholder_names, render_content};
use super::types::{
    CreateTemplateRequest, EmailTemplate, RenderResponse, UpdateTemplateRequest,
};

const TEMPLATE_COLUMNS: &str = "id, user_id, title, content, created_at, updated_at";

#[derive(Clone)]
pub struct TemplateService {
    pool: PgPool,
}

impl TemplateService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        request: CreateTemplateRequest,
        user_id: i64,
    ) -> Result<EmailTemplate> {
        let template = sqlx::query_as::<_, EmailTemplate>(&format!(
            r#"
            INSERT INTO email_templates (user_id, title, content)
            VALUES ($1, $2, $3)
            RETURNING {TEMPLATE_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(&request.title)
        .bind(&request.content)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!(template_id = template.id, user_id, "Template created");
        Ok(template)
    }

    pub async fn get(&self, template_id: i64, user_id: i64) -> Result<Option<EmailTemplate>> {
        let template = sqlx::query_as::<_, EmailTemplate>(&format!(
            "SELECT {TEMPLATE_COLUMNS} FROM email_templates WHERE id = $1 AND user_id = $2"
        ))
        .bind(template_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(template)
    }

    /// Paginated listing, newest first, with optional substring search
    /// over title and content.
    pub async fn list(
        &self,
        user_id: i64,
        page: Page,
        search: Option<&str>,
    ) -> Result<(Vec<EmailTemplate>, i64)> {
        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM email_templates
            WHERE user_id = $1
              AND ($2::TEXT IS NULL
                   OR title ILIKE '%' || $2 || '%'
                   OR content ILIKE '%' || $2 || '%')
            "#,
        )
        .bind(user_id)
        .bind(search)
        .fetch_one(&self.pool)
        .await?;

        let templates = sqlx::query_as::<_, EmailTemplate>(&format!(
            r#"
            SELECT {TEMPLATE_COLUMNS} FROM email_templates
            WHERE user_id = $1
              AND ($2::TEXT IS NULL
                   OR title ILIKE '%' || $2 || '%'
                   OR content ILIKE '%' || $2 || '%')
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            "#
        ))
        .bind(user_id)
        .bind(search)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok((templates, total))
    }

    pub async fn update(
        &self,
        template_id: i64,
        request: UpdateTemplateRequest,
        user_id: i64,
    ) -> Result<Option<EmailTemplate>> {
        let template = sqlx::query_as::<_, EmailTemplate>(&format!(
            r#"
            UPDATE email_templates SET
                title = COALESCE($3::TEXT, title),
                content = COALESCE($4::TEXT, content),
                updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING {TEMPLATE_COLUMNS}
            "#
        ))
        .bind(template_id)
        .bind(user_id)
        .bind(&request.title)
        .bind(&request.content)
        .fetch_optional(&self.pool)
        .await?;

        Ok(template)
    }

    pub async fn delete(&self, template_id: i64, user_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM email_templates WHERE id = $1 AND user_id = $2")
            .bind(template_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Render a stored template against a caller-supplied variable map.
    ///
    /// A missing template is a reported outcome (`success: false`), not an
    /// error; rendering an existing template always succeeds.
    pub async fn render(
        &self,
        template_id: i64,
        variables: &Map<String, Value>,
        user_id: i64,
    ) -> Result<RenderResponse> {
        let Some(template) = self.get(template_id, user_id).await? else {
            return Ok(RenderResponse::not_found(template_id));
        };

        let rendered = render_content(&template.content, variables);

        Ok(RenderResponse {
            success: true,
            template_id,
            title: template.title,
            rendered_content: rendered.content,
            variables_used: rendered.used,
            variables_missing: rendered.missing,
        })
    }

    /// Distinct placeholder names used by a stored template, or `None`
    /// when the template does not exist for this owner.
    pub async fn variables(&self, template_id: i64, user_id: i64) -> Result<Option<Vec<String>>> {
        let template = self.get(template_id, user_id).await?;
        Ok(template.map(|t| placeholder_names(&t.content)))
    }
}

#[async_trait]
impl PreviewSource for TemplateService {
    async fn template(&self, template_id: i64, user_id: i64) -> Result<Option<EmailTemplate>> {
        self.get(template_id, user_id).await
    }

    async fn contacts_by_ids(&self, ids: &[i64], user_id: i64) -> Result<Vec<Contact>> {
        ContactService::new(self.pool.clone())
            .get_by_ids(ids, user_id)
            .await
    }
}
