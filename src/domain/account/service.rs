//! Email account persistence plus SMTP/IMAP connectivity operations.

use std::collections::HashMap;

use chrono::Utc;
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::pagination::Page;
use crate::error::{AppError, Result};
use crate::mail::{self, MailServerConfig, OutgoingMail, SmtpMailer};

use super::{
    ConnectionStatus, ConnectionTestResponse, CreateAccountRequest, EmailAccount,
    SendMailRequest, SendMailResponse, UpdateAccountRequest,
};

const ACCOUNT_COLUMNS: &str = "id, user_id, email_address, email_password, smtp_server, \
                               smtp_port, imap_server, imap_port, is_ssl, is_active, \
                               connection_status, last_connection_test, created_at, updated_at";

#[derive(Debug, Serialize)]
pub struct AccountStatistics {
    pub total_accounts: i64,
    pub active_accounts: i64,
    pub inactive_accounts: i64,
    pub connection_status: HashMap<String, i64>,
}

#[derive(Clone)]
pub struct AccountService {
    pool: PgPool,
}

impl AccountService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, request: CreateAccountRequest, user_id: i64) -> Result<EmailAccount> {
        validate_port(request.smtp_port, "smtp_port")?;
        validate_port(request.imap_port, "imap_port")?;

        let existing: Option<i64> = sqlx::query_scalar(
            "SELECT id FROM email_accounts WHERE user_id = $1 AND email_address = $2",
        )
        .bind(user_id)
        .bind(&request.email_address)
        .fetch_optional(&self.pool)
        .await?;

        if existing.is_some() {
            return Err(AppError::Conflict(format!(
                "email account {} already exists",
                request.email_address
            )));
        }

        let account = sqlx::query_as::<_, EmailAccount>(&format!(
            r#"
            INSERT INTO email_accounts (user_id, email_address, email_password, smtp_server,
                                        smtp_port, imap_server, imap_port, is_ssl, is_active,
                                        connection_status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {ACCOUNT_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(&request.email_address)
        .bind(&request.email_password)
        .bind(&request.smtp_server)
        .bind(request.smtp_port)
        .bind(&request.imap_server)
        .bind(request.imap_port)
        .bind(request.is_ssl)
        .bind(request.is_active)
        .bind(ConnectionStatus::Unknown.as_str())
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!(account_id = account.id, user_id, "Email account created");
        Ok(account)
    }

    pub async fn get(&self, account_id: i64, user_id: i64) -> Result<Option<EmailAccount>> {
        let account = sqlx::query_as::<_, EmailAccount>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM email_accounts WHERE id = $1 AND user_id = $2"
        ))
        .bind(account_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(account)
    }

    /// Paginated listing, newest first, optionally filtered by active
    /// state.
    pub async fn list(
        &self,
        user_id: i64,
        page: Page,
        is_active: Option<bool>,
    ) -> Result<(Vec<EmailAccount>, i64)> {
        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM email_accounts
            WHERE user_id = $1 AND ($2::BOOL IS NULL OR is_active = $2)
            "#,
        )
        .bind(user_id)
        .bind(is_active)
        .fetch_one(&self.pool)
        .await?;

        let accounts = sqlx::query_as::<_, EmailAccount>(&format!(
            r#"
            SELECT {ACCOUNT_COLUMNS} FROM email_accounts
            WHERE user_id = $1 AND ($2::BOOL IS NULL OR is_active = $2)
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            "#
        ))
        .bind(user_id)
        .bind(is_active)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok((accounts, total))
    }

    pub async fn update(
        &self,
        account_id: i64,
        request: UpdateAccountRequest,
        user_id: i64,
    ) -> Result<Option<EmailAccount>> {
        if let Some(port) = request.smtp_port {
            validate_port(port, "smtp_port")?;
        }
        if let Some(port) = request.imap_port {
            validate_port(port, "imap_port")?;
        }

        let account = sqlx::query_as::<_, EmailAccount>(&format!(
            r#"
            UPDATE email_accounts SET
                email_password = COALESCE($3::TEXT, email_password),
                smtp_server = COALESCE($4::TEXT, smtp_server),
                smtp_port = COALESCE($5::INT, smtp_port),
                imap_server = COALESCE($6::TEXT, imap_server),
                imap_port = COALESCE($7::INT, imap_port),
                is_ssl = COALESCE($8::BOOL, is_ssl),
                is_active = COALESCE($9::BOOL, is_active),
                updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING {ACCOUNT_COLUMNS}
            "#
        ))
        .bind(account_id)
        .bind(user_id)
        .bind(&request.email_password)
        .bind(&request.smtp_server)
        .bind(request.smtp_port)
        .bind(&request.imap_server)
        .bind(request.imap_port)
        .bind(request.is_ssl)
        .bind(request.is_active)
        .fetch_optional(&self.pool)
        .await?;

        Ok(account)
    }

    pub async fn delete(&self, account_id: i64, user_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM email_accounts WHERE id = $1 AND user_id = $2")
            .bind(account_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Probe the account's SMTP and IMAP servers independently and record
    /// the outcome on the account row.
    pub async fn test_connection(
        &self,
        account_id: i64,
        user_id: i64,
    ) -> Result<ConnectionTestResponse> {
        let account = self
            .get(account_id, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("email account {account_id}")))?;

        let smtp_result = probe_smtp(&account).await;
        let imap_result = mail::check_login(&server_config(
            &account,
            account.imap_server.clone(),
            account.imap_port,
        ))
        .await;

        let smtp_ok = smtp_result.is_ok();
        let imap_ok = imap_result.is_ok();
        let success = smtp_ok && imap_ok;

        let mut errors = Vec::new();
        if let Err(e) = smtp_result {
            errors.push(format!("SMTP: {e}"));
        }
        if let Err(e) = imap_result {
            errors.push(format!("IMAP: {e}"));
        }

        let status = if success {
            ConnectionStatus::Connected
        } else {
            ConnectionStatus::Error
        };

        sqlx::query(
            r#"
            UPDATE email_accounts
            SET connection_status = $3, last_connection_test = NOW(), updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(account_id)
        .bind(user_id)
        .bind(status.as_str())
        .execute(&self.pool)
        .await?;

        tracing::info!(
            account_id,
            smtp_ok,
            imap_ok,
            "Email account connection test finished"
        );

        Ok(ConnectionTestResponse {
            success,
            email_account_id: account_id,
            email_address: account.email_address,
            connection_status: status,
            smtp_test: smtp_ok,
            imap_test: imap_ok,
            error_message: if errors.is_empty() {
                None
            } else {
                Some(errors.join("; "))
            },
            test_time: Utc::now(),
        })
    }

    /// Send a message through the account's SMTP server. Delivery failure
    /// is a reported outcome in the response, not an error.
    pub async fn send_mail(
        &self,
        account_id: i64,
        request: SendMailRequest,
        user_id: i64,
    ) -> Result<SendMailResponse> {
        let account = self
            .get(account_id, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("email account {account_id}")))?;

        let outgoing = OutgoingMail {
            to: request.to_emails,
            cc: request.cc_emails,
            bcc: request.bcc_emails,
            subject: request.subject,
            content: request.content,
            is_html: request.is_html,
        };

        let delivery = async {
            let mailer = SmtpMailer::connect(&server_config(
                &account,
                account.smtp_server.clone(),
                account.smtp_port,
            ))?;
            mailer.send(&outgoing).await
        }
        .await;

        let response = match delivery {
            Ok(()) => {
                tracing::info!(
                    account_id,
                    recipients = outgoing.recipient_count(),
                    "Email sent"
                );
                SendMailResponse {
                    success: true,
                    email_account_id: account_id,
                    email_address: account.email_address,
                    sent_count: outgoing.recipient_count(),
                    failed_count: 0,
                    message_ids: vec![Uuid::new_v4().to_string()],
                    error_message: None,
                    sent_time: Utc::now(),
                }
            }
            Err(e) => {
                tracing::warn!(account_id, error = %e, "Email delivery failed");
                SendMailResponse {
                    success: false,
                    email_account_id: account_id,
                    email_address: account.email_address,
                    sent_count: 0,
                    failed_count: outgoing.to.len(),
                    message_ids: Vec::new(),
                    error_message: Some(e.to_string()),
                    sent_time: Utc::now(),
                }
            }
        };

        Ok(response)
    }

    /// Account totals plus per-connection-status counts, zero-filled for
    /// statuses absent from the data.
    pub async fn statistics(&self, user_id: i64) -> Result<AccountStatistics> {
        let (total, active): (i64, i64) = sqlx::query_as(
            r#"
            SELECT COUNT(*), COUNT(*) FILTER (WHERE is_active)
            FROM email_accounts WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        let status_rows: Vec<(String, i64)> = sqlx::query_as(
            "SELECT connection_status, COUNT(*) FROM email_accounts WHERE user_id = $1 GROUP BY connection_status",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let mut status_stats: HashMap<String, i64> = ConnectionStatus::ALL
            .iter()
            .map(|s| (s.as_str().to_string(), 0))
            .collect();
        for (value, count) in status_rows {
            status_stats.insert(value, count);
        }

        Ok(AccountStatistics {
            total_accounts: total,
            active_accounts: active,
            inactive_accounts: total - active,
            connection_status: status_stats,
        })
    }
}

async fn probe_smtp(account: &EmailAccount) -> std::result::Result<(), crate::mail::MailError> {
    let mailer = SmtpMailer::connect(&server_config(
        account,
        account.smtp_server.clone(),
        account.smtp_port,
    ))?;
    mailer.verify().await
}

fn server_config(account: &EmailAccount, host: String, port: i32) -> MailServerConfig {
    MailServerConfig {
        host,
        port: port as u16,
        ssl: account.is_ssl,
        username: account.email_address.clone(),
        password: account.email_password.clone(),
    }
}

fn validate_port(port: i32, field: &str) -> Result<()> {
    if (1..=65535).contains(&port) {
        Ok(())
    } else {
        Err(AppError::Validation(format!(
            "{field} must be between 1 and 65535"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_port() {
        assert!(validate_port(1, "smtp_port").is_ok());
        assert!(validate_port(65535, "smtp_port").is_ok());
        assert!(validate_port(0, "smtp_port").is_err());
        assert!(validate_port(65536, "imap_port").is_err());
        assert!(validate_port(-25, "imap_port").is_err());
    }
}
