//! SMTP transport built per account from stored credentials.

use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use super::{MailError, MailServerConfig, OutgoingMail};

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    sender: Mailbox,
}

impl SmtpMailer {
    /// Build a transport for the given server. `ssl` selects implicit TLS
    /// (wrapper mode, typically port 465); without it the connection is
    /// plaintext, as stored on the account.
    pub fn connect(config: &MailServerConfig) -> Result<Self, MailError> {
        let builder =
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(config.host.clone())
                .port(config.port);

        let builder = if config.ssl {
            let tls = TlsParameters::new(config.host.clone())
                .map_err(|e| MailError::Tls(e.to_string()))?;
            builder.tls(Tls::Wrapper(tls))
        } else {
            builder.tls(Tls::None)
        };

        let transport = builder
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .build();

        let sender: Mailbox = config
            .username
            .parse()
            .map_err(|_| MailError::InvalidAddress(config.username.clone()))?;

        Ok(Self { transport, sender })
    }

    /// Open a connection, authenticate and send NOOP.
    pub async fn verify(&self) -> Result<(), MailError> {
        match self.transport.test_connection().await {
            Ok(true) => Ok(()),
            Ok(false) => Err(MailError::Smtp("connection test failed".to_string())),
            Err(e) => Err(MailError::Smtp(e.to_string())),
        }
    }

    /// Deliver one message to all of its recipients.
    pub async fn send(&self, mail: &OutgoingMail) -> Result<(), MailError> {
        let message = build_message(&self.sender, mail)?;

        self.transport
            .send(message)
            .await
            .map(|_| ())
            .map_err(|e| MailError::Smtp(e.to_string()))
    }
}

fn build_message(sender: &Mailbox, mail: &OutgoingMail) -> Result<Message, MailError> {
    if mail.to.is_empty() {
        return Err(MailError::Build("at least one recipient required".to_string()));
    }

    let mut builder = Message::builder()
        .from(sender.clone())
        .subject(mail.subject.clone());

    for address in &mail.to {
        builder = builder.to(parse_mailbox(address)?);
    }
    for address in &mail.cc {
        builder = builder.cc(parse_mailbox(address)?);
    }
    for address in &mail.bcc {
        builder = builder.bcc(parse_mailbox(address)?);
    }

    let content_type = if mail.is_html {
        ContentType::TEXT_HTML
    } else {
        ContentType::TEXT_PLAIN
    };

    builder
        .header(content_type)
        .body(mail.content.clone())
        .map_err(|e| MailError::Build(e.to_string()))
}

fn parse_mailbox(address: &str) -> Result<Mailbox, MailError> {
    address
        .parse()
        .map_err(|_| MailError::InvalidAddress(address.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outgoing() -> OutgoingMail {
        OutgoingMail {
            to: vec!["to@example.test".to_string()],
            cc: vec!["cc@example.test".to_string()],
            bcc: vec![],
            subject: "Hello".to_string(),
            content: "Body".to_string(),
            is_html: false,
        }
    }

    #[test]
    fn test_build_message() {
        let sender: Mailbox = "sender@example.test".parse().unwrap();
        let message = build_message(&sender, &outgoing()).unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("To: to@example.test"));
        assert!(raw.contains("Cc: cc@example.test"));
        assert!(raw.contains("Subject: Hello"));
    }

    #[test]
    fn test_build_message_requires_recipient() {
        let sender: Mailbox = "sender@example.test".parse().unwrap();
        let mut mail = outgoing();
        mail.to.clear();
        assert!(matches!(
            build_message(&sender, &mail),
            Err(MailError::Build(_))
        ));
    }

    #[test]
    fn test_invalid_address_rejected() {
        let sender: Mailbox = "sender@example.test".parse().unwrap();
        let mut mail = outgoing();
        mail.to = vec!["not an address".to_string()];
        assert!(matches!(
            build_message(&sender, &mail),
            Err(MailError::InvalidAddress(_))
        ));
    }

    #[test]
    fn test_recipient_count() {
        let mut mail = outgoing();
        mail.bcc.push("bcc@example.test".to_string());
        assert_eq!(mail.recipient_count(), 3);
    }
}
