//! Contact persistence and query logic.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::pagination::Page;
use crate::error::Result;

use super::{encode_tags, Contact, CreateContactRequest, UpdateContactRequest};

const CONTACT_COLUMNS: &str = "id, user_id, name, first_name, last_name, email, company, \
                               domain, position, tags, created_at, updated_at";

/// Optional filters for contact listing. All filters compose with AND;
/// the tag filter matches a contact carrying ANY of the given names.
#[derive(Debug, Default, Clone)]
pub struct ContactFilter {
    pub search: Option<String>,
    pub tag_names: Vec<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

impl ContactFilter {
    /// ILIKE patterns matching the JSON-encoded tag column, e.g. `%"VIP"%`.
    fn tag_patterns(&self) -> Option<Vec<String>> {
        if self.tag_names.is_empty() {
            None
        } else {
            Some(
                self.tag_names
                    .iter()
                    .map(|name| format!("%\"{}\"%", name))
                    .collect(),
            )
        }
    }
}

#[derive(Clone)]
pub struct ContactService {
    pool: PgPool,
}

impl ContactService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, request: CreateContactRequest, user_id: i64) -> Result<Contact> {
        let tags = request.tag_names.as_deref().and_then(|t| encode_tags(t));

        let contact = sqlx::query_as::<_, Contact>(&format!(
            r#"
            INSERT INTO contacts (user_id, name, first_name, last_name, email, company, domain, position, tags)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {CONTACT_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(&request.name)
        .bind(&request.first_name)
        .bind(&request.last_name)
        .bind(&request.email)
        .bind(&request.company)
        .bind(&request.domain)
        .bind(&request.position)
        .bind(&tags)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!(contact_id = contact.id, user_id, "Contact created");
        Ok(contact)
    }

    pub async fn get(&self, contact_id: i64, user_id: i64) -> Result<Option<Contact>> {
        let contact = sqlx::query_as::<_, Contact>(&format!(
            "SELECT {CONTACT_COLUMNS} FROM contacts WHERE id = $1 AND user_id = $2"
        ))
        .bind(contact_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(contact)
    }

    /// Paginated listing, newest first, with optional search, tag and
    /// creation-date filters.
    pub async fn list(
        &self,
        user_id: i64,
        page: Page,
        filter: &ContactFilter,
    ) -> Result<(Vec<Contact>, i64)> {
        let tag_patterns = filter.tag_patterns();

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM contacts
            WHERE user_id = $1
              AND ($2::TEXT IS NULL
                   OR name ILIKE '%' || $2 || '%'
                   OR first_name ILIKE '%' || $2 || '%'
                   OR last_name ILIKE '%' || $2 || '%'
                   OR email ILIKE '%' || $2 || '%'
                   OR company ILIKE '%' || $2 || '%')
              AND ($3::TEXT[] IS NULL OR tags ILIKE ANY($3))
              AND ($4::TIMESTAMPTZ IS NULL OR created_at >= $4)
              AND ($5::TIMESTAMPTZ IS NULL OR created_at <= $5)
            "#,
        )
        .bind(user_id)
        .bind(&filter.search)
        .bind(&tag_patterns)
        .bind(filter.start_date)
        .bind(filter.end_date)
        .fetch_one(&self.pool)
        .await?;

        let contacts = sqlx::query_as::<_, Contact>(&format!(
            r#"
            SELECT {CONTACT_COLUMNS} FROM contacts
            WHERE user_id = $1
              AND ($2::TEXT IS NULL
                   OR name ILIKE '%' || $2 || '%'
                   OR first_name ILIKE '%' || $2 || '%'
                   OR last_name ILIKE '%' || $2 || '%'
                   OR email ILIKE '%' || $2 || '%'
                   OR company ILIKE '%' || $2 || '%')
              AND ($3::TEXT[] IS NULL OR tags ILIKE ANY($3))
              AND ($4::TIMESTAMPTZ IS NULL OR created_at >= $4)
              AND ($5::TIMESTAMPTZ IS NULL OR created_at <= $5)
            ORDER BY created_at DESC
            LIMIT $6 OFFSET $7
            "#
        ))
        .bind(user_id)
        .bind(&filter.search)
        .bind(&tag_patterns)
        .bind(filter.start_date)
        .bind(filter.end_date)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok((contacts, total))
    }

    pub async fn update(
        &self,
        contact_id: i64,
        request: UpdateContactRequest,
        user_id: i64,
    ) -> Result<Option<Contact>> {
        let tags_provided = request.tag_names.is_some();
        let tags = request.tag_names.as_deref().and_then(|t| encode_tags(t));

        let contact = sqlx::query_as::<_, Contact>(&format!(
            r#"
            UPDATE contacts SET
                name = COALESCE($3::TEXT, name),
                first_name = COALESCE($4::TEXT, first_name),
                last_name = COALESCE($5::TEXT, last_name),
                email = COALESCE($6::TEXT, email),
                company = COALESCE($7::TEXT, company),
                domain = COALESCE($8::TEXT, domain),
                position = COALESCE($9::TEXT, position),
                tags = CASE WHEN $10 THEN $11::TEXT ELSE tags END,
                updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING {CONTACT_COLUMNS}
            "#
        ))
        .bind(contact_id)
        .bind(user_id)
        .bind(&request.name)
        .bind(&request.first_name)
        .bind(&request.last_name)
        .bind(&request.email)
        .bind(&request.company)
        .bind(&request.domain)
        .bind(&request.position)
        .bind(tags_provided)
        .bind(&tags)
        .fetch_optional(&self.pool)
        .await?;

        Ok(contact)
    }

    pub async fn delete(&self, contact_id: i64, user_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM contacts WHERE id = $1 AND user_id = $2")
            .bind(contact_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Resolve the subset of `ids` that exist and belong to `user_id`.
    /// Unknown and unowned ids are silently omitted; row order is
    /// unspecified.
    pub async fn get_by_ids(&self, ids: &[i64], user_id: i64) -> Result<Vec<Contact>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let contacts = sqlx::query_as::<_, Contact>(&format!(
            "SELECT {CONTACT_COLUMNS} FROM contacts WHERE id = ANY($1) AND user_id = $2"
        ))
        .bind(ids)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(contacts)
    }

    /// Attach a stored tag to a contact. Returns false when either the
    /// contact or the tag does not exist for this owner. Adding a tag the
    /// contact already carries is a no-op.
    pub async fn add_tag(&self, contact_id: i64, tag_id: i64, user_id: i64) -> Result<bool> {
        let Some(contact) = self.get(contact_id, user_id).await? else {
            return Ok(false);
        };
        let Some(tag_name) = self.tag_name(tag_id, user_id).await? else {
            return Ok(false);
        };

        let mut tags = contact.tag_names();
        if !tags.contains(&tag_name) {
            tags.push(tag_name);
            self.store_tags(contact_id, user_id, &tags).await?;
        }

        Ok(true)
    }

    /// Detach a stored tag from a contact. Removing a tag the contact does
    /// not carry is a no-op; the tag and contact must still both exist.
    pub async fn remove_tag(&self, contact_id: i64, tag_id: i64, user_id: i64) -> Result<bool> {
        let Some(contact) = self.get(contact_id, user_id).await? else {
            return Ok(false);
        };
        let Some(tag_name) = self.tag_name(tag_id, user_id).await? else {
            return Ok(false);
        };

        let mut tags = contact.tag_names();
        if let Some(pos) = tags.iter().position(|t| *t == tag_name) {
            tags.remove(pos);
            self.store_tags(contact_id, user_id, &tags).await?;
        }

        Ok(true)
    }

    async fn tag_name(&self, tag_id: i64, user_id: i64) -> Result<Option<String>> {
        let name: Option<String> =
            sqlx::query_scalar("SELECT name FROM contact_tags WHERE id = $1 AND user_id = $2")
                .bind(tag_id)
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(name)
    }

    async fn store_tags(&self, contact_id: i64, user_id: i64, tags: &[String]) -> Result<()> {
        sqlx::query(
            "UPDATE contacts SET tags = $3, updated_at = NOW() WHERE id = $1 AND user_id = $2",
        )
        .bind(contact_id)
        .bind(user_id)
        .bind(encode_tags(tags))
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_patterns() {
        let filter = ContactFilter {
            tag_names: vec!["VIP".to_string(), "key account".to_string()],
            ..Default::default()
        };
        let patterns = filter.tag_patterns().unwrap();
        assert_eq!(patterns, vec!["%\"VIP\"%", "%\"key account\"%"]);

        assert!(ContactFilter::default().tag_patterns().is_none());
    }
}
