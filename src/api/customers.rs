//! Customer CRUD and follow-up tracking endpoints.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::auth::CurrentUser;
use crate::domain::customer::{
    CommunicationProgress, CreateCustomerRequest, CustomerFilter, CustomerListResponse,
    CustomerResponse, CustomerService, CustomerStatistics, InterestLevel, UpdateCustomerRequest,
    UpdateEmailCountRequest, UpdateProgressRequest,
};
use crate::domain::pagination::Page;
use crate::error::{AppError, Result};
use crate::server::AppState;

use super::MessageResponse;

#[derive(Debug, Deserialize)]
pub struct ListCustomersQuery {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    pub search: Option<String>,
    pub communication_progress: Option<CommunicationProgress>,
    pub interest_level: Option<InterestLevel>,
}

/// GET /api/v1/customers - List customers with search and status filters
#[tracing::instrument(name = "http.list_customers", skip(state, query))]
pub async fn list_customers(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<ListCustomersQuery>,
) -> Result<Json<CustomerListResponse>> {
    let page = Page {
        page: query.page.unwrap_or(1),
        page_size: query.page_size.unwrap_or(Page::default().page_size),
    }
    .normalized();

    let filter = CustomerFilter {
        search: query.search.clone(),
        communication_progress: query.communication_progress,
        interest_level: query.interest_level,
    };

    let service = CustomerService::new(state.pool.clone());
    let (customers, total) = service.list(user.id, page, &filter).await?;

    Ok(Json(CustomerListResponse {
        success: true,
        customers: customers.into_iter().map(CustomerResponse::from).collect(),
        total,
        page: page.page,
        page_size: page.page_size,
        total_pages: page.total_pages(total),
    }))
}

/// POST /api/v1/customers - Create a customer
#[tracing::instrument(name = "http.create_customer", skip(state, request))]
pub async fn create_customer(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<CreateCustomerRequest>,
) -> Result<(StatusCode, Json<CustomerResponse>)> {
    let service = CustomerService::new(state.pool.clone());
    let customer = service.create(request, user.id).await?;

    Ok((StatusCode::CREATED, Json(customer.into())))
}

/// GET /api/v1/customers/{id} - Get a single customer
#[tracing::instrument(name = "http.get_customer", skip(state))]
pub async fn get_customer(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(customer_id): Path<i64>,
) -> Result<Json<CustomerResponse>> {
    let service = CustomerService::new(state.pool.clone());
    let customer = service
        .get(customer_id, user.id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("customer {customer_id}")))?;

    Ok(Json(customer.into()))
}

/// PUT /api/v1/customers/{id} - Update a customer
#[tracing::instrument(name = "http.update_customer", skip(state, request))]
pub async fn update_customer(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(customer_id): Path<i64>,
    Json(request): Json<UpdateCustomerRequest>,
) -> Result<Json<CustomerResponse>> {
    let service = CustomerService::new(state.pool.clone());
    let customer = service
        .update(customer_id, request, user.id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("customer {customer_id}")))?;

    Ok(Json(customer.into()))
}

/// PATCH /api/v1/customers/{id}/progress - Update follow-up state
#[tracing::instrument(name = "http.update_customer_progress", skip(state, request))]
pub async fn update_customer_progress(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(customer_id): Path<i64>,
    Json(request): Json<UpdateProgressRequest>,
) -> Result<Json<CustomerResponse>> {
    let service = CustomerService::new(state.pool.clone());
    let customer = service
        .update_progress(customer_id, request, user.id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("customer {customer_id}")))?;

    Ok(Json(customer.into()))
}

/// PATCH /api/v1/customers/{id}/email-count - Record exchanged mail count
#[tracing::instrument(name = "http.update_customer_email_count", skip(state, request))]
pub async fn update_customer_email_count(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(customer_id): Path<i64>,
    Json(request): Json<UpdateEmailCountRequest>,
) -> Result<Json<CustomerResponse>> {
    let service = CustomerService::new(state.pool.clone());
    let customer = service
        .update_email_count(customer_id, request, user.id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("customer {customer_id}")))?;

    Ok(Json(customer.into()))
}

/// DELETE /api/v1/customers/{id} - Delete a customer
#[tracing::instrument(name = "http.delete_customer", skip(state))]
pub async fn delete_customer(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(customer_id): Path<i64>,
) -> Result<Json<MessageResponse>> {
    let service = CustomerService::new(state.pool.clone());
    if !service.delete(customer_id, user.id).await? {
        return Err(AppError::NotFound(format!("customer {customer_id}")));
    }

    Ok(Json(MessageResponse::ok("customer deleted")))
}

/// GET /api/v1/customers/statistics/overview - Counts per progress and
/// interest level
#[tracing::instrument(name = "http.customer_statistics", skip(state))]
pub async fn customer_statistics(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<CustomerStatistics>> {
    let service = CustomerService::new(state.pool.clone());
    let statistics = service.statistics(user.id).await?;

    Ok(Json(statistics))
}
