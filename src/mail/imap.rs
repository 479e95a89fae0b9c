//! Minimal IMAP connectivity probe: connect, read the greeting, LOGIN,
//! LOGOUT. Enough to verify stored credentials without speaking the rest
//! of the protocol.

use std::sync::Arc;
use std::time::Duration;

use rustls::pki_types::ServerName;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;

use super::{MailError, MailServerConfig};

const PROBE_TIMEOUT: Duration = Duration::from_secs(30);

/// Verify that the IMAP server accepts the account's credentials.
pub async fn check_login(config: &MailServerConfig) -> Result<(), MailError> {
    let probe = async {
        let addr = format!("{}:{}", config.host, config.port);
        let tcp = TcpStream::connect(&addr).await?;

        if config.ssl {
            let connector = tls_connector();
            let server_name = ServerName::try_from(config.host.clone())
                .map_err(|e| MailError::Tls(e.to_string()))?;
            let stream = connector.connect(server_name, tcp).await?;
            login_exchange(stream, &config.username, &config.password).await
        } else {
            login_exchange(tcp, &config.username, &config.password).await
        }
    };

    match tokio::time::timeout(PROBE_TIMEOUT, probe).await {
        Ok(result) => result,
        Err(_) => Err(MailError::Imap("connection probe timed out".to_string())),
    }
}

fn tls_connector() -> TlsConnector {
    let root_store = rustls::RootCertStore {
        roots: webpki_roots::TLS_SERVER_ROOTS.to_vec(),
    };

    let config = rustls::ClientConfig::builder()
        .with_root_certificates(root_store)
        .with_no_client_auth();

    TlsConnector::from(Arc::new(config))
}

async fn login_exchange<S>(stream: S, username: &str, password: &str) -> Result<(), MailError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let (read_half, mut write_half) = tokio::io::split(stream);
    let mut reader = BufReader::new(read_half);

    let mut line = String::new();
    reader.read_line(&mut line).await?;
    if !line.starts_with("* OK") {
        return Err(MailError::Imap(format!(
            "unexpected greeting: {}",
            line.trim()
        )));
    }

    let command = format!("a1 LOGIN {} {}\r\n", quote(username), quote(password));
    write_half.write_all(command.as_bytes()).await?;
    write_half.flush().await?;

    // Skip untagged responses until the tagged LOGIN reply arrives.
    loop {
        line.clear();
        let read = reader.read_line(&mut line).await?;
        if read == 0 {
            return Err(MailError::Imap(
                "connection closed during login".to_string(),
            ));
        }
        if line.starts_with("a1 ") {
            if line.starts_with("a1 OK") {
                let _ = write_half.write_all(b"a2 LOGOUT\r\n").await;
                return Ok(());
            }
            return Err(MailError::Imap(format!("login rejected: {}", line.trim())));
        }
    }
}

/// Quote a LOGIN argument, escaping backslashes and double quotes.
fn quote(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{}\"", escaped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;

    #[test]
    fn test_quote_escapes() {
        assert_eq!(quote("plain"), "\"plain\"");
        assert_eq!(quote("pa\"ss"), "\"pa\\\"ss\"");
        assert_eq!(quote("back\\slash"), "\"back\\\\slash\"");
    }

    #[tokio::test]
    async fn test_login_exchange_accepts_ok() {
        let (client, mut server) = tokio::io::duplex(4096);

        let server_task = tokio::spawn(async move {
            server
                .write_all(b"* OK IMAP4rev1 ready\r\n")
                .await
                .unwrap();
            let mut buf = vec![0u8; 256];
            let n = server.read(&mut buf).await.unwrap();
            let command = String::from_utf8_lossy(&buf[..n]).to_string();
            server
                .write_all(b"* CAPABILITY IMAP4rev1\r\na1 OK LOGIN completed\r\n")
                .await
                .unwrap();
            command
        });

        login_exchange(client, "user@example.test", "secret")
            .await
            .unwrap();

        let command = server_task.await.unwrap();
        assert!(command.starts_with("a1 LOGIN \"user@example.test\" \"secret\""));
    }

    #[tokio::test]
    async fn test_login_exchange_rejects_no() {
        let (client, mut server) = tokio::io::duplex(4096);

        tokio::spawn(async move {
            server.write_all(b"* OK ready\r\n").await.unwrap();
            let mut buf = vec![0u8; 256];
            let _ = server.read(&mut buf).await.unwrap();
            server
                .write_all(b"a1 NO [AUTHENTICATIONFAILED] invalid credentials\r\n")
                .await
                .unwrap();
        });

        let result = login_exchange(client, "user@example.test", "wrong").await;
        assert!(matches!(result, Err(MailError::Imap(_))));
    }

    #[tokio::test]
    async fn test_bad_greeting_rejected() {
        let (client, mut server) = tokio::io::duplex(4096);

        tokio::spawn(async move {
            server.write_all(b"* BYE overloaded\r\n").await.unwrap();
        });

        let result = login_exchange(client, "user@example.test", "secret").await;
        assert!(matches!(result, Err(MailError::Imap(_))));
    }
}
