//! Email account CRUD, connectivity test and send endpoints.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::auth::CurrentUser;
use crate::domain::account::{
    AccountListResponse, AccountResponse, AccountService, AccountStatistics,
    ConnectionTestResponse, CreateAccountRequest, SendMailRequest, SendMailResponse,
    UpdateAccountRequest,
};
use crate::domain::pagination::Page;
use crate::error::{AppError, Result};
use crate::server::AppState;

use super::MessageResponse;

#[derive(Debug, Deserialize)]
pub struct ListAccountsQuery {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    pub is_active: Option<bool>,
}

/// GET /api/v1/email-accounts - List accounts
#[tracing::instrument(name = "http.list_accounts", skip(state, query))]
pub async fn list_accounts(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<ListAccountsQuery>,
) -> Result<Json<AccountListResponse>> {
    let page = Page {
        page: query.page.unwrap_or(1),
        page_size: query.page_size.unwrap_or(Page::default().page_size),
    }
    .normalized();

    let service = AccountService::new(state.pool.clone());
    let (accounts, total) = service.list(user.id, page, query.is_active).await?;

    Ok(Json(AccountListResponse {
        success: true,
        email_accounts: accounts.into_iter().map(AccountResponse::from).collect(),
        total,
        page: page.page,
        page_size: page.page_size,
        total_pages: page.total_pages(total),
    }))
}

/// POST /api/v1/email-accounts - Register an account
#[tracing::instrument(name = "http.create_account", skip(state, request))]
pub async fn create_account(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<CreateAccountRequest>,
) -> Result<(StatusCode, Json<AccountResponse>)> {
    let service = AccountService::new(state.pool.clone());
    let account = service.create(request, user.id).await?;

    Ok((StatusCode::CREATED, Json(account.into())))
}

/// GET /api/v1/email-accounts/{id} - Get a single account
#[tracing::instrument(name = "http.get_account", skip(state))]
pub async fn get_account(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(account_id): Path<i64>,
) -> Result<Json<AccountResponse>> {
    let service = AccountService::new(state.pool.clone());
    let account = service
        .get(account_id, user.id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("email account {account_id}")))?;

    Ok(Json(account.into()))
}

/// PUT /api/v1/email-accounts/{id} - Update an account
#[tracing::instrument(name = "http.update_account", skip(state, request))]
pub async fn update_account(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(account_id): Path<i64>,
    Json(request): Json<UpdateAccountRequest>,
) -> Result<Json<AccountResponse>> {
    let service = AccountService::new(state.pool.clone());
    let account = service
        .update(account_id, request, user.id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("email account {account_id}")))?;

    Ok(Json(account.into()))
}

/// DELETE /api/v1/email-accounts/{id} - Delete an account
#[tracing::instrument(name = "http.delete_account", skip(state))]
pub async fn delete_account(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(account_id): Path<i64>,
) -> Result<Json<MessageResponse>> {
    let service = AccountService::new(state.pool.clone());
    if !service.delete(account_id, user.id).await? {
        return Err(AppError::NotFound(format!("email account {account_id}")));
    }

    Ok(Json(MessageResponse::ok("email account deleted")))
}

/// POST /api/v1/email-accounts/{id}/test - Probe SMTP and IMAP servers
#[tracing::instrument(name = "http.test_account", skip(state))]
pub async fn test_account(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(account_id): Path<i64>,
) -> Result<Json<ConnectionTestResponse>> {
    let service = AccountService::new(state.pool.clone());
    let outcome = service.test_connection(account_id, user.id).await?;

    Ok(Json(outcome))
}

/// POST /api/v1/email-accounts/{id}/send - Send mail through the account
#[tracing::instrument(name = "http.send_mail", skip(state, request))]
pub async fn send_mail(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(account_id): Path<i64>,
    Json(request): Json<SendMailRequest>,
) -> Result<Json<SendMailResponse>> {
    let service = AccountService::new(state.pool.clone());
    let outcome = service.send_mail(account_id, request, user.id).await?;

    Ok(Json(outcome))
}

/// GET /api/v1/email-accounts/statistics/overview - Account totals and
/// connection states
#[tracing::instrument(name = "http.account_statistics", skip(state))]
pub async fn account_statistics(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<AccountStatistics>> {
    let service = AccountService::new(state.pool.clone());
    let statistics = service.statistics(user.id).await?;

    Ok(Json(statistics))
}
