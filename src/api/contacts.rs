//! Contact CRUD and tag-assignment endpoints.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::auth::CurrentUser;
use crate::domain::contact::{
    ContactFilter, ContactListResponse, ContactResponse, ContactService, CreateContactRequest,
    UpdateContactRequest,
};
use crate::domain::pagination::Page;
use crate::error::{AppError, Result};
use crate::server::AppState;

use super::MessageResponse;

#[derive(Debug, Deserialize)]
pub struct ListContactsQuery {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    pub search: Option<String>,
    /// Comma-separated tag names, e.g. `VIP,partner`.
    pub tags: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// Parse an ISO-8601 timestamp; invalid values are silently ignored so a
/// malformed filter never breaks the listing.
fn parse_date(value: Option<&str>) -> Option<DateTime<Utc>> {
    value.and_then(|v| {
        DateTime::parse_from_rfc3339(v)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    })
}

fn split_tags(raw: Option<&str>) -> Vec<String> {
    raw.map(|tags| {
        tags.split(',')
            .map(|tag| tag.trim().to_string())
            .filter(|tag| !tag.is_empty())
            .collect()
    })
    .unwrap_or_default()
}

/// GET /api/v1/contacts - List contacts with search, tag and date filters
#[tracing::instrument(name = "http.list_contacts", skip(state, query))]
pub async fn list_contacts(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<ListContactsQuery>,
) -> Result<Json<ContactListResponse>> {
    let page = Page {
        page: query.page.unwrap_or(1),
        page_size: query.page_size.unwrap_or(Page::default().page_size),
    }
    .normalized();

    let filter = ContactFilter {
        search: query.search.clone(),
        tag_names: split_tags(query.tags.as_deref()),
        start_date: parse_date(query.start_date.as_deref()),
        end_date: parse_date(query.end_date.as_deref()),
    };

    let service = ContactService::new(state.pool.clone());
    let (contacts, total) = service.list(user.id, page, &filter).await?;

    Ok(Json(ContactListResponse {
        success: true,
        contacts: contacts.into_iter().map(ContactResponse::from).collect(),
        total,
        page: page.page,
        page_size: page.page_size,
        total_pages: page.total_pages(total),
    }))
}

/// POST /api/v1/contacts - Create a contact
#[tracing::instrument(name = "http.create_contact", skip(state, request))]
pub async fn create_contact(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<CreateContactRequest>,
) -> Result<(StatusCode, Json<ContactResponse>)> {
    let service = ContactService::new(state.pool.clone());
    let contact = service.create(request, user.id).await?;

    Ok((StatusCode::CREATED, Json(contact.into())))
}

/// GET /api/v1/contacts/{id} - Get a single contact
#[tracing::instrument(name = "http.get_contact", skip(state))]
pub async fn get_contact(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(contact_id): Path<i64>,
) -> Result<Json<ContactResponse>> {
    let service = ContactService::new(state.pool.clone());
    let contact = service
        .get(contact_id, user.id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("contact {contact_id}")))?;

    Ok(Json(contact.into()))
}

/// PUT /api/v1/contacts/{id} - Update a contact
#[tracing::instrument(name = "http.update_contact", skip(state, request))]
pub async fn update_contact(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(contact_id): Path<i64>,
    Json(request): Json<UpdateContactRequest>,
) -> Result<Json<ContactResponse>> {
    let service = ContactService::new(state.pool.clone());
    let contact = service
        .update(contact_id, request, user.id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("contact {contact_id}")))?;

    Ok(Json(contact.into()))
}

/// DELETE /api/v1/contacts/{id} - Delete a contact
#[tracing::instrument(name = "http.delete_contact", skip(state))]
pub async fn delete_contact(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(contact_id): Path<i64>,
) -> Result<Json<MessageResponse>> {
    let service = ContactService::new(state.pool.clone());
    if !service.delete(contact_id, user.id).await? {
        return Err(AppError::NotFound(format!("contact {contact_id}")));
    }

    Ok(Json(MessageResponse::ok("contact deleted")))
}

/// POST /api/v1/contacts/{id}/tags/{tag_id} - Attach a tag
#[tracing::instrument(name = "http.add_contact_tag", skip(state))]
pub async fn add_tag_to_contact(
    State(state): State<AppState>,
    user: CurrentUser,
    Path((contact_id, tag_id)): Path<(i64, i64)>,
) -> Result<Json<MessageResponse>> {
    let service = ContactService::new(state.pool.clone());
    if !service.add_tag(contact_id, tag_id, user.id).await? {
        return Err(AppError::NotFound(format!(
            "contact {contact_id} or tag {tag_id}"
        )));
    }

    Ok(Json(MessageResponse::ok("tag attached")))
}

/// DELETE /api/v1/contacts/{id}/tags/{tag_id} - Detach a tag
#[tracing::instrument(name = "http.remove_contact_tag", skip(state))]
pub async fn remove_tag_from_contact(
    State(state): State<AppState>,
    user: CurrentUser,
    Path((contact_id, tag_id)): Path<(i64, i64)>,
) -> Result<Json<MessageResponse>> {
    let service = ContactService::new(state.pool.clone());
    if !service.remove_tag(contact_id, tag_id, user.id).await? {
        return Err(AppError::NotFound(format!(
            "contact {contact_id} or tag {tag_id}"
        )));
    }

    Ok(Json(MessageResponse::ok("tag detached")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_tags() {
        assert_eq!(split_tags(Some("VIP, partner ,")), vec!["VIP", "partner"]);
        assert!(split_tags(Some("")).is_empty());
        assert!(split_tags(None).is_empty());
    }

    #[test]
    fn test_parse_date_ignores_invalid() {
        assert!(parse_date(Some("2025-01-01T00:00:00Z")).is_some());
        assert!(parse_date(Some("not a date")).is_none());
        assert!(parse_date(None).is_none());
    }
}
