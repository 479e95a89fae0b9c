//! Contact tag CRUD endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::auth::CurrentUser;
use crate::domain::contact::{ContactTag, CreateTagRequest, TagService, UpdateTagRequest};
use crate::error::{AppError, Result};
use crate::server::AppState;

use super::MessageResponse;

/// GET /api/v1/contacts/tags - List all tags for the current user
#[tracing::instrument(name = "http.list_tags", skip(state))]
pub async fn list_tags(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<ContactTag>>> {
    let service = TagService::new(state.pool.clone());
    let tags = service.list(user.id).await?;

    Ok(Json(tags))
}

/// POST /api/v1/contacts/tags - Create a tag
#[tracing::instrument(name = "http.create_tag", skip(state, request))]
pub async fn create_tag(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<CreateTagRequest>,
) -> Result<(StatusCode, Json<ContactTag>)> {
    let service = TagService::new(state.pool.clone());
    let tag = service.create(request, user.id).await?;

    Ok((StatusCode::CREATED, Json(tag)))
}

/// PUT /api/v1/contacts/tags/{tag_id} - Rename a tag
#[tracing::instrument(name = "http.update_tag", skip(state, request))]
pub async fn update_tag(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(tag_id): Path<i64>,
    Json(request): Json<UpdateTagRequest>,
) -> Result<Json<ContactTag>> {
    let service = TagService::new(state.pool.clone());
    let tag = service
        .update(tag_id, request, user.id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("tag {tag_id}")))?;

    Ok(Json(tag))
}

/// DELETE /api/v1/contacts/tags/{tag_id} - Delete a tag
#[tracing::instrument(name = "http.delete_tag", skip(state))]
pub async fn delete_tag(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(tag_id): Path<i64>,
) -> Result<Json<MessageResponse>> {
    let service = TagService::new(state.pool.clone());
    if !service.delete(tag_id, user.id).await? {
        return Err(AppError::NotFound(format!("tag {tag_id}")));
    }

    Ok(Json(MessageResponse::ok("tag deleted")))
}
