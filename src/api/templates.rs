//! Email template CRUD, rendering and batch preview endpoints.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::auth::CurrentUser;
use crate::domain::pagination::Page;
use crate::domain::template::{
    batch_preview, BatchPreviewRequest, BatchPreviewResponse, CreateTemplateRequest,
    RenderResponse, TemplateListResponse, TemplateResponse, TemplateService,
    TemplateVariablesResponse, UpdateTemplateRequest,
};
use crate::error::{AppError, Result};
use crate::server::AppState;

use super::MessageResponse;

#[derive(Debug, Deserialize)]
pub struct ListTemplatesQuery {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    pub search: Option<String>,
}

/// GET /api/v1/email-templates - List templates with title/content search
#[tracing::instrument(name = "http.list_templates", skip(state, query))]
pub async fn list_templates(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<ListTemplatesQuery>,
) -> Result<Json<TemplateListResponse>> {
    let page = Page {
        page: query.page.unwrap_or(1),
        page_size: query.page_size.unwrap_or(Page::default().page_size),
    }
    .normalized();

    let service = TemplateService::new(state.pool.clone());
    let (templates, total) = service.list(user.id, page, query.search.as_deref()).await?;

    Ok(Json(TemplateListResponse {
        success: true,
        templates: templates.into_iter().map(TemplateResponse::from).collect(),
        total,
        page: page.page,
        page_size: page.page_size,
        total_pages: page.total_pages(total),
    }))
}

/// POST /api/v1/email-templates - Create a template
#[tracing::instrument(name = "http.create_template", skip(state, request))]
pub async fn create_template(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<CreateTemplateRequest>,
) -> Result<(StatusCode, Json<TemplateResponse>)> {
    let service = TemplateService::new(state.pool.clone());
    let template = service.create(request, user.id).await?;

    Ok((StatusCode::CREATED, Json(template.into())))
}

/// GET /api/v1/email-templates/{id} - Get a single template
#[tracing::instrument(name = "http.get_template", skip(state))]
pub async fn get_template(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(template_id): Path<i64>,
) -> Result<Json<TemplateResponse>> {
    let service = TemplateService::new(state.pool.clone());
    let template = service
        .get(template_id, user.id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("email template {template_id}")))?;

    Ok(Json(template.into()))
}

/// PUT /api/v1/email-templates/{id} - Update a template
#[tracing::instrument(name = "http.update_template", skip(state, request))]
pub async fn update_template(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(template_id): Path<i64>,
    Json(request): Json<UpdateTemplateRequest>,
) -> Result<Json<TemplateResponse>> {
    let service = TemplateService::new(state.pool.clone());
    let template = service
        .update(template_id, request, user.id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("email template {template_id}")))?;

    Ok(Json(template.into()))
}

/// DELETE /api/v1/email-templates/{id} - Delete a template
#[tracing::instrument(name = "http.delete_template", skip(state))]
pub async fn delete_template(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(template_id): Path<i64>,
) -> Result<Json<MessageResponse>> {
    let service = TemplateService::new(state.pool.clone());
    if !service.delete(template_id, user.id).await? {
        return Err(AppError::NotFound(format!("email template {template_id}")));
    }

    Ok(Json(MessageResponse::ok("email template deleted")))
}

/// POST /api/v1/email-templates/{id}/render - Render with caller-supplied
/// variables
#[tracing::instrument(name = "http.render_template", skip(state, variables))]
pub async fn render_template(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(template_id): Path<i64>,
    Json(variables): Json<Map<String, Value>>,
) -> Result<Json<RenderResponse>> {
    let service = TemplateService::new(state.pool.clone());
    let outcome = service.render(template_id, &variables, user.id).await?;

    if !outcome.success {
        return Err(AppError::NotFound(format!("email template {template_id}")));
    }

    Ok(Json(outcome))
}

/// GET /api/v1/email-templates/{id}/variables - Distinct placeholder names
#[tracing::instrument(name = "http.template_variables", skip(state))]
pub async fn template_variables(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(template_id): Path<i64>,
) -> Result<Json<TemplateVariablesResponse>> {
    let service = TemplateService::new(state.pool.clone());
    let variables = service
        .variables(template_id, user.id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("email template {template_id}")))?;

    Ok(Json(TemplateVariablesResponse {
        success: true,
        template_id,
        total_variables: variables.len(),
        variables,
    }))
}

/// POST /api/v1/email-templates/batch-preview - Render one template
/// against many contacts
#[tracing::instrument(
    name = "http.batch_preview",
    skip(state, request),
    fields(template_id = request.template_id, contacts = request.contact_ids.len())
)]
pub async fn batch_preview_template(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<BatchPreviewRequest>,
) -> Result<Json<BatchPreviewResponse>> {
    let service = TemplateService::new(state.pool.clone());
    let outcome = batch_preview(
        &service,
        &state.settings.sender,
        request.template_id,
        &request.contact_ids,
        user.id,
    )
    .await?;

    if !outcome.success {
        return Err(AppError::NotFound(format!(
            "email template {}",
            request.template_id
        )));
    }

    Ok(Json(outcome))
}
