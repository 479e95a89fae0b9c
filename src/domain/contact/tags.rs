//! Contact tag records. Tags are plain named labels owned by a user; the
//! association lives as a JSON name list on the contact row.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::error::Result;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ContactTag {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateTagRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTagRequest {
    pub name: Option<String>,
}

#[derive(Clone)]
pub struct TagService {
    pool: PgPool,
}

impl TagService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, request: CreateTagRequest, user_id: i64) -> Result<ContactTag> {
        let tag = sqlx::query_as::<_, ContactTag>(
            r#"
            INSERT INTO contact_tags (user_id, name)
            VALUES ($1, $2)
            RETURNING id, user_id, name, created_at
            "#,
        )
        .bind(user_id)
        .bind(&request.name)
        .fetch_one(&self.pool)
        .await?;

        Ok(tag)
    }

    pub async fn get(&self, tag_id: i64, user_id: i64) -> Result<Option<ContactTag>> {
        let tag = sqlx::query_as::<_, ContactTag>(
            "SELECT id, user_id, name, created_at FROM contact_tags WHERE id = $1 AND user_id = $2",
        )
        .bind(tag_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(tag)
    }

    /// All tags for a user, oldest first.
    pub async fn list(&self, user_id: i64) -> Result<Vec<ContactTag>> {
        let tags = sqlx::query_as::<_, ContactTag>(
            "SELECT id, user_id, name, created_at FROM contact_tags WHERE user_id = $1 ORDER BY created_at",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(tags)
    }

    pub async fn update(
        &self,
        tag_id: i64,
        request: UpdateTagRequest,
        user_id: i64,
    ) -> Result<Option<ContactTag>> {
        let tag = sqlx::query_as::<_, ContactTag>(
            r#"
            UPDATE contact_tags SET name = COALESCE($3::TEXT, name)
            WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, name, created_at
            "#,
        )
        .bind(tag_id)
        .bind(user_id)
        .bind(&request.name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(tag)
    }

    pub async fn delete(&self, tag_id: i64, user_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM contact_tags WHERE id = $1 AND user_id = $2")
            .bind(tag_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
