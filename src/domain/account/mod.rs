//! Email accounts: the SMTP/IMAP credentials outreach mail is sent with.

mod service;

pub use service::{AccountService, AccountStatistics};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Last known state of an account's mail server connectivity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    Unknown,
    Connected,
    Disconnected,
    Error,
}

impl ConnectionStatus {
    pub const ALL: [ConnectionStatus; 4] = [
        ConnectionStatus::Unknown,
        ConnectionStatus::Connected,
        ConnectionStatus::Disconnected,
        ConnectionStatus::Error,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionStatus::Unknown => "unknown",
            ConnectionStatus::Connected => "connected",
            ConnectionStatus::Disconnected => "disconnected",
            ConnectionStatus::Error => "error",
        }
    }

    pub fn parse(value: &str) -> Self {
        match value {
            "connected" => ConnectionStatus::Connected,
            "disconnected" => ConnectionStatus::Disconnected,
            "error" => ConnectionStatus::Error,
            _ => ConnectionStatus::Unknown,
        }
    }
}

/// A stored email account. The password never leaves the service layer;
/// responses are built from the other fields only.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EmailAccount {
    pub id: i64,
    pub user_id: i64,
    pub email_address: String,
    pub email_password: String,
    pub smtp_server: String,
    pub smtp_port: i32,
    pub imap_server: String,
    pub imap_port: i32,
    pub is_ssl: bool,
    pub is_active: bool,
    pub connection_status: String,
    pub last_connection_test: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct CreateAccountRequest {
    pub email_address: String,
    pub email_password: String,
    pub smtp_server: String,
    pub smtp_port: i32,
    pub imap_server: String,
    pub imap_port: i32,
    #[serde(default = "default_true")]
    pub is_ssl: bool,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct UpdateAccountRequest {
    pub email_password: Option<String>,
    pub smtp_server: Option<String>,
    pub smtp_port: Option<i32>,
    pub imap_server: Option<String>,
    pub imap_port: Option<i32>,
    pub is_ssl: Option<bool>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct AccountResponse {
    pub id: i64,
    pub user_id: i64,
    pub email_address: String,
    pub smtp_server: String,
    pub smtp_port: i32,
    pub imap_server: String,
    pub imap_port: i32,
    pub is_ssl: bool,
    pub is_active: bool,
    pub connection_status: ConnectionStatus,
    pub last_connection_test: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<EmailAccount> for AccountResponse {
    fn from(account: EmailAccount) -> Self {
        Self {
            id: account.id,
            user_id: account.user_id,
            email_address: account.email_address,
            smtp_server: account.smtp_server,
            smtp_port: account.smtp_port,
            imap_server: account.imap_server,
            imap_port: account.imap_port,
            is_ssl: account.is_ssl,
            is_active: account.is_active,
            connection_status: ConnectionStatus::parse(&account.connection_status),
            last_connection_test: account.last_connection_test,
            created_at: account.created_at,
            updated_at: account.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AccountListResponse {
    pub success: bool,
    pub email_accounts: Vec<AccountResponse>,
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
    pub total_pages: i64,
}

/// Result of probing an account's SMTP and IMAP servers.
#[derive(Debug, Serialize)]
pub struct ConnectionTestResponse {
    pub success: bool,
    pub email_account_id: i64,
    pub email_address: String,
    pub connection_status: ConnectionStatus,
    pub smtp_test: bool,
    pub imap_test: bool,
    pub error_message: Option<String>,
    pub test_time: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct SendMailRequest {
    pub to_emails: Vec<String>,
    #[serde(default)]
    pub cc_emails: Vec<String>,
    #[serde(default)]
    pub bcc_emails: Vec<String>,
    pub subject: String,
    pub content: String,
    #[serde(default)]
    pub is_html: bool,
}

#[derive(Debug, Serialize)]
pub struct SendMailResponse {
    pub success: bool,
    pub email_account_id: i64,
    pub email_address: String,
    pub sent_count: usize,
    pub failed_count: usize,
    pub message_ids: Vec<String>,
    pub error_message: Option<String>,
    pub sent_time: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_status_round_trip() {
        for status in ConnectionStatus::ALL {
            assert_eq!(ConnectionStatus::parse(status.as_str()), status);
        }
        assert_eq!(ConnectionStatus::parse("bogus"), ConnectionStatus::Unknown);
    }

    #[test]
    fn test_response_drops_password() {
        let json = serde_json::to_value(AccountResponse {
            id: 1,
            user_id: 1,
            email_address: "a@b.test".to_string(),
            smtp_server: "smtp.b.test".to_string(),
            smtp_port: 465,
            imap_server: "imap.b.test".to_string(),
            imap_port: 993,
            is_ssl: true,
            is_active: true,
            connection_status: ConnectionStatus::Unknown,
            last_connection_test: None,
            created_at: chrono::Utc::now(),
            updated_at: None,
        })
        .unwrap();
        assert!(json.get("email_password").is_none());
    }
}
