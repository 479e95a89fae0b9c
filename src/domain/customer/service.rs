//! Customer persistence and query logic.

use std::collections::HashMap;

use chrono::Utc;
use serde::Serialize;
use sqlx::PgPool;

use crate::domain::pagination::Page;
use crate::error::Result;

use super::{
    CommunicationProgress, CreateCustomerRequest, Customer, InterestLevel, UpdateCustomerRequest,
    UpdateEmailCountRequest, UpdateProgressRequest,
};

const CUSTOMER_COLUMNS: &str = "id, user_id, name, email, company, email_count, \
                                communication_progress, interest_level, \
                                last_communication_time, current_progress, \
                                created_at, updated_at";

#[derive(Debug, Default, Clone)]
pub struct CustomerFilter {
    pub search: Option<String>,
    pub communication_progress: Option<CommunicationProgress>,
    pub interest_level: Option<InterestLevel>,
}

#[derive(Debug, Serialize)]
pub struct CustomerStatistics {
    pub total_customers: i64,
    pub communication_progress: HashMap<String, i64>,
    pub interest_level: HashMap<String, i64>,
}

#[derive(Clone)]
pub struct CustomerService {
    pool: PgPool,
}

impl CustomerService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, request: CreateCustomerRequest, user_id: i64) -> Result<Customer> {
        let progress = request
            .communication_progress
            .unwrap_or(CommunicationProgress::Pending);
        let interest = request.interest_level.unwrap_or(InterestLevel::NoInterest);

        let customer = sqlx::query_as::<_, Customer>(&format!(
            r#"
            INSERT INTO customers (user_id, name, email, company, email_count,
                                   communication_progress, interest_level,
                                   last_communication_time, current_progress)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {CUSTOMER_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(&request.name)
        .bind(&request.email)
        .bind(&request.company)
        .bind(request.email_count)
        .bind(progress.as_str())
        .bind(interest.as_str())
        .bind(request.last_communication_time)
        .bind(&request.current_progress)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!(customer_id = customer.id, user_id, "Customer created");
        Ok(customer)
    }

    pub async fn get(&self, customer_id: i64, user_id: i64) -> Result<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id = $1 AND user_id = $2"
        ))
        .bind(customer_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    /// Paginated listing, newest first, with optional search and equality
    /// filters on progress and interest level.
    pub async fn list(
        &self,
        user_id: i64,
        page: Page,
        filter: &CustomerFilter,
    ) -> Result<(Vec<Customer>, i64)> {
        let progress = filter.communication_progress.map(|p| p.as_str());
        let interest = filter.interest_level.map(|i| i.as_str());

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM customers
            WHERE user_id = $1
              AND ($2::TEXT IS NULL
                   OR name ILIKE '%' || $2 || '%'
                   OR email ILIKE '%' || $2 || '%'
                   OR company ILIKE '%' || $2 || '%')
              AND ($3::TEXT IS NULL OR communication_progress = $3)
              AND ($4::TEXT IS NULL OR interest_level = $4)
            "#,
        )
        .bind(user_id)
        .bind(&filter.search)
        .bind(progress)
        .bind(interest)
        .fetch_one(&self.pool)
        .await?;

        let customers = sqlx::query_as::<_, Customer>(&format!(
            r#"
            SELECT {CUSTOMER_COLUMNS} FROM customers
            WHERE user_id = $1
              AND ($2::TEXT IS NULL
                   OR name ILIKE '%' || $2 || '%'
                   OR email ILIKE '%' || $2 || '%'
                   OR company ILIKE '%' || $2 || '%')
              AND ($3::TEXT IS NULL OR communication_progress = $3)
              AND ($4::TEXT IS NULL OR interest_level = $4)
            ORDER BY created_at DESC
            LIMIT $5 OFFSET $6
            "#
        ))
        .bind(user_id)
        .bind(&filter.search)
        .bind(progress)
        .bind(interest)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok((customers, total))
    }

    pub async fn update(
        &self,
        customer_id: i64,
        request: UpdateCustomerRequest,
        user_id: i64,
    ) -> Result<Option<Customer>> {
        let progress = request.communication_progress.map(|p| p.as_str());
        let interest = request.interest_level.map(|i| i.as_str());

        let customer = sqlx::query_as::<_, Customer>(&format!(
            r#"
            UPDATE customers SET
                name = COALESCE($3::TEXT, name),
                email = COALESCE($4::TEXT, email),
                company = COALESCE($5::TEXT, company),
                email_count = COALESCE($6::INT, email_count),
                communication_progress = COALESCE($7::TEXT, communication_progress),
                interest_level = COALESCE($8::TEXT, interest_level),
                last_communication_time = COALESCE($9::TIMESTAMPTZ, last_communication_time),
                current_progress = COALESCE($10::TEXT, current_progress),
                updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING {CUSTOMER_COLUMNS}
            "#
        ))
        .bind(customer_id)
        .bind(user_id)
        .bind(&request.name)
        .bind(&request.email)
        .bind(&request.company)
        .bind(request.email_count)
        .bind(progress)
        .bind(interest)
        .bind(request.last_communication_time)
        .bind(&request.current_progress)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    /// Narrow update for the follow-up tracking fields.
    pub async fn update_progress(
        &self,
        customer_id: i64,
        request: UpdateProgressRequest,
        user_id: i64,
    ) -> Result<Option<Customer>> {
        let progress = request.communication_progress.map(|p| p.as_str());
        let interest = request.interest_level.map(|i| i.as_str());

        let customer = sqlx::query_as::<_, Customer>(&format!(
            r#"
            UPDATE customers SET
                communication_progress = COALESCE($3::TEXT, communication_progress),
                interest_level = COALESCE($4::TEXT, interest_level),
                current_progress = COALESCE($5::TEXT, current_progress),
                last_communication_time = COALESCE($6::TIMESTAMPTZ, last_communication_time),
                updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING {CUSTOMER_COLUMNS}
            "#
        ))
        .bind(customer_id)
        .bind(user_id)
        .bind(progress)
        .bind(interest)
        .bind(&request.current_progress)
        .bind(request.last_communication_time)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    /// Record an exchanged-email count. The communication timestamp
    /// defaults to now when the caller does not supply one.
    pub async fn update_email_count(
        &self,
        customer_id: i64,
        request: UpdateEmailCountRequest,
        user_id: i64,
    ) -> Result<Option<Customer>> {
        let last_communication = request.last_communication_time.unwrap_or_else(Utc::now);

        let customer = sqlx::query_as::<_, Customer>(&format!(
            r#"
            UPDATE customers SET
                email_count = $3,
                last_communication_time = $4,
                updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING {CUSTOMER_COLUMNS}
            "#
        ))
        .bind(customer_id)
        .bind(user_id)
        .bind(request.email_count)
        .bind(last_communication)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    pub async fn delete(&self, customer_id: i64, user_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM customers WHERE id = $1 AND user_id = $2")
            .bind(customer_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Per-progress and per-interest counts. Every known value appears in
    /// the maps, zero-filled when absent from the data.
    pub async fn statistics(&self, user_id: i64) -> Result<CustomerStatistics> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM customers WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        let progress_rows: Vec<(String, i64)> = sqlx::query_as(
            "SELECT communication_progress, COUNT(*) FROM customers WHERE user_id = $1 GROUP BY communication_progress",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let interest_rows: Vec<(String, i64)> = sqlx::query_as(
            "SELECT interest_level, COUNT(*) FROM customers WHERE user_id = $1 GROUP BY interest_level",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let mut progress_stats: HashMap<String, i64> = CommunicationProgress::ALL
            .iter()
            .map(|p| (p.as_str().to_string(), 0))
            .collect();
        for (value, count) in progress_rows {
            progress_stats.insert(value, count);
        }

        let mut interest_stats: HashMap<String, i64> = InterestLevel::ALL
            .iter()
            .map(|i| (i.as_str().to_string(), 0))
            .collect();
        for (value, count) in interest_rows {
            interest_stats.insert(value, count);
        }

        Ok(CustomerStatistics {
            total_customers: total,
            communication_progress: progress_stats,
            interest_level: interest_stats,
        })
    }
}
