//! Discovery endpoints: contact lookup via Hunter and company search via
//! the LLM provider.

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::CurrentUser;
use crate::clients::{CompanyProfile, DiscoveredContact};
use crate::error::Result;
use crate::server::AppState;

#[derive(Debug, Deserialize)]
pub struct ContactSearchQuery {
    pub domain: String,
    pub limit: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct ContactSearchResponse {
    pub success: bool,
    pub domain: String,
    pub contacts: Vec<DiscoveredContact>,
    pub total_found: usize,
    pub generated_at: DateTime<Utc>,
}

/// GET /api/v1/discovery/contacts - People associated with a domain
#[tracing::instrument(name = "http.discover_contacts", skip(state), fields(domain = %query.domain))]
pub async fn discover_contacts(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(query): Query<ContactSearchQuery>,
) -> Result<Json<ContactSearchResponse>> {
    let result = state
        .hunter
        .domain_search(&query.domain, query.limit.unwrap_or(20))
        .await?;

    Ok(Json(ContactSearchResponse {
        success: true,
        domain: result.domain,
        total_found: result.total_found,
        contacts: result.contacts,
        generated_at: Utc::now(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct CompanySearchQuery {
    pub query: Option<String>,
    pub max_results: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct CompanySearchResponse {
    pub success: bool,
    pub total_found: usize,
    pub companies: Vec<CompanyProfile>,
    pub search_query: String,
    pub generated_at: DateTime<Utc>,
    pub search_duration: f64,
}

/// GET /api/v1/discovery/companies - LLM-backed company search. Without a
/// `query` parameter the configured default query is used.
#[tracing::instrument(name = "http.discover_companies", skip(state, query))]
pub async fn discover_companies(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(query): Query<CompanySearchQuery>,
) -> Result<Json<CompanySearchResponse>> {
    let search_query = query
        .query
        .unwrap_or_else(|| state.settings.discovery.default_company_query.clone());
    let max_results = query
        .max_results
        .unwrap_or(state.settings.discovery.max_companies_per_search);

    let started = std::time::Instant::now();
    let companies = state
        .company_search
        .search_companies(&search_query, max_results)
        .await?;
    let duration = started.elapsed().as_secs_f64();

    Ok(Json(CompanySearchResponse {
        success: true,
        total_found: companies.len(),
        companies,
        search_query,
        generated_at: Utc::now(),
        search_duration: duration,
    }))
}
