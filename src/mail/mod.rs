//! Outbound mail: SMTP sending and server connectivity probes.

mod imap;
mod smtp;

pub use imap::check_login;
pub use smtp::SmtpMailer;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("invalid email address: {0}")]
    InvalidAddress(String),

    #[error("failed to build message: {0}")]
    Build(String),

    #[error("SMTP error: {0}")]
    Smtp(String),

    #[error("TLS error: {0}")]
    Tls(String),

    #[error("IMAP error: {0}")]
    Imap(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Connection parameters for one mail server endpoint.
#[derive(Debug, Clone)]
pub struct MailServerConfig {
    pub host: String,
    pub port: u16,
    pub ssl: bool,
    pub username: String,
    pub password: String,
}

/// A message to deliver through an account's SMTP server.
#[derive(Debug, Clone)]
pub struct OutgoingMail {
    pub to: Vec<String>,
    pub cc: Vec<String>,
    pub bcc: Vec<String>,
    pub subject: String,
    pub content: String,
    pub is_html: bool,
}

impl OutgoingMail {
    /// Total number of addressed recipients.
    pub fn recipient_count(&self) -> usize {
        self.to.len() + self.cc.len() + self.bcc.len()
    }
}
