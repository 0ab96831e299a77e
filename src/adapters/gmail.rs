use base64::engine::general_purpose::{STANDARD, URL_SAFE};
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::GmailCredentials;
use crate::utils::error::{DigestError, Result};

const BODY_LINE_WIDTH: usize = 76;
// Status reported when the request never got an HTTP response.
const NO_RESPONSE: u16 = 0;

/// Sends mail through the Gmail REST API with a fresh access token per message.
pub struct GmailMailer {
    client: Client,
    token_endpoint: String,
    send_endpoint: String,
    credentials: GmailCredentials,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    raw: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SendResponse {
    id: String,
    #[serde(default)]
    thread_id: Option<String>,
}

impl GmailMailer {
    pub fn new(
        client: Client,
        token_endpoint: impl Into<String>,
        send_endpoint: impl Into<String>,
        credentials: GmailCredentials,
    ) -> Self {
        Self {
            client,
            token_endpoint: token_endpoint.into(),
            send_endpoint: send_endpoint.into(),
            credentials,
        }
    }

    /// Exchanges the stored refresh token for a short-lived access token.
    pub async fn refresh_access_token(&self) -> Result<String> {
        let response = self
            .client
            .post(&self.token_endpoint)
            .form(&[
                ("client_id", self.credentials.client_id.as_str()),
                ("client_secret", self.credentials.client_secret.as_str()),
                ("refresh_token", self.credentials.refresh_token.as_str()),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await
            .map_err(|e| DigestError::TokenRefreshError {
                status: NO_RESPONSE,
                detail: e.to_string(),
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| DigestError::TokenRefreshError {
                status: status.as_u16(),
                detail: format!("failed to read token response: {}", e),
            })?;
        if !status.is_success() {
            return Err(DigestError::TokenRefreshError {
                status: status.as_u16(),
                detail: body,
            });
        }

        let token: TokenResponse =
            serde_json::from_str(&body).map_err(|e| DigestError::TokenRefreshError {
                status: status.as_u16(),
                detail: format!("unexpected token response: {}", e),
            })?;
        tracing::debug!("Access token obtained (expires in {:?}s)", token.expires_in);
        Ok(token.access_token)
    }

    /// Refreshes the token, then sends one HTML message. Returns the Gmail message id.
    pub async fn send_html(&self, recipient: &str, subject: &str, html: &str) -> Result<String> {
        let access_token = self.refresh_access_token().await?;

        let raw = encode_raw(&build_mime_message(recipient, subject, html));
        let response = self
            .client
            .post(&self.send_endpoint)
            .bearer_auth(access_token)
            .json(&SendRequest { raw: &raw })
            .send()
            .await
            .map_err(|e| DigestError::SendError {
                status: NO_RESPONSE,
                detail: e.to_string(),
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| DigestError::SendError {
                status: status.as_u16(),
                detail: format!("failed to read send response: {}", e),
            })?;
        if !status.is_success() {
            return Err(DigestError::SendError {
                status: status.as_u16(),
                detail: body,
            });
        }

        let sent: SendResponse =
            serde_json::from_str(&body).map_err(|e| DigestError::SendError {
                status: status.as_u16(),
                detail: format!("unexpected send response: {}", e),
            })?;
        tracing::debug!("Gmail thread id: {:?}", sent.thread_id);
        Ok(sent.id)
    }
}

/// Single-part `text/html` message with a base64 body.
pub fn build_mime_message(recipient: &str, subject: &str, html: &str) -> String {
    let body = STANDARD.encode(html.as_bytes());
    let wrapped = body
        .as_bytes()
        .chunks(BODY_LINE_WIDTH)
        .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
        .collect::<Vec<_>>()
        .join("\r\n");

    format!(
        "To: {}\r\nSubject: {}\r\nMIME-Version: 1.0\r\nContent-Type: text/html; charset=\"utf-8\"\r\nContent-Transfer-Encoding: base64\r\n\r\n{}\r\n",
        recipient.trim(),
        encode_header(subject),
        wrapped
    )
}

/// RFC 2047 encoded-word when the header value is not plain ASCII.
fn encode_header(value: &str) -> String {
    let value: String = value.chars().filter(|c| *c != '\r' && *c != '\n').collect();
    if value.is_ascii() {
        value
    } else {
        format!("=?UTF-8?B?{}?=", STANDARD.encode(value.as_bytes()))
    }
}

/// The `raw` field of `users.messages.send`: base64url of the full message.
pub fn encode_raw(message: &str) -> String {
    URL_SAFE.encode(message.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_message_headers_and_body() {
        let message = build_mime_message(
            "reader@example.com",
            "Kernel Fusion & CuTe DSL Research Digest — October 18, 2026",
            "<html><body>hi</body></html>",
        );

        assert!(message.starts_with("To: reader@example.com\r\n"));
        assert!(message.contains("Subject: =?UTF-8?B?"));
        assert!(message.contains("Content-Type: text/html; charset=\"utf-8\"\r\n"));

        let (_, body) = message.split_once("\r\n\r\n").unwrap();
        let decoded = STANDARD.decode(body.replace("\r\n", "")).unwrap();
        assert_eq!(decoded, b"<html><body>hi</body></html>");
    }

    #[test]
    fn test_encoded_subject_round_trips() {
        let subject = "Digest — October 18, 2026";
        let header = encode_header(subject);
        let encoded = header
            .strip_prefix("=?UTF-8?B?")
            .and_then(|h| h.strip_suffix("?="))
            .unwrap();
        assert_eq!(STANDARD.decode(encoded).unwrap(), subject.as_bytes());
    }

    #[test]
    fn test_ascii_subject_is_plain_and_single_line() {
        assert_eq!(encode_header("Daily digest"), "Daily digest");
        assert_eq!(encode_header("Daily\r\nBcc: someone@example.com"), "DailyBcc: someone@example.com");
    }

    #[test]
    fn test_long_body_lines_are_wrapped() {
        let html = "x".repeat(1000);
        let message = build_mime_message("reader@example.com", "s", &html);
        let (_, body) = message.split_once("\r\n\r\n").unwrap();
        assert!(body.lines().all(|line| line.trim_end().len() <= BODY_LINE_WIDTH));
    }

    #[test]
    fn test_raw_uses_url_safe_alphabet() {
        let raw = encode_raw("subject??>>>~~~ with bytes that map to + and /");
        assert!(!raw.contains('+'));
        assert!(!raw.contains('/'));
        assert_eq!(
            URL_SAFE.decode(&raw).unwrap(),
            b"subject??>>>~~~ with bytes that map to + and /"
        );
    }

    /// Answers one request with a status line and a body shorter than its Content-Length.
    async fn truncated_body_server(status_line: &'static str, request_marker: &'static str) -> String {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 4096];
            while !String::from_utf8_lossy(&request).contains(request_marker) {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            let response = format!("{}\r\nContent-Length: 100\r\n\r\npartial", status_line);
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.flush().await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn mailer(token_endpoint: String, send_endpoint: String) -> GmailMailer {
        GmailMailer::new(
            Client::new(),
            token_endpoint,
            send_endpoint,
            GmailCredentials {
                client_id: "client".to_string(),
                client_secret: "secret".to_string(),
                refresh_token: "refresh".to_string(),
            },
        )
    }

    #[tokio::test]
    async fn test_unreadable_token_response_keeps_reason() {
        let base = truncated_body_server("HTTP/1.1 400 Bad Request", "grant_type=refresh_token").await;
        let mailer = mailer(format!("{}/token", base), format!("{}/send", base));

        let err = mailer.refresh_access_token().await.unwrap_err();
        match err {
            DigestError::TokenRefreshError { status, detail } => {
                assert_eq!(status, 400);
                assert!(detail.starts_with("failed to read token response: "));
                assert!(detail.len() > "failed to read token response: ".len());
            }
            other => panic!("expected TokenRefreshError, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unreachable_token_endpoint_is_delivery_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let mailer = mailer(format!("http://{}/token", addr), format!("http://{}/send", addr));

        let err = mailer.send_html("reader@example.com", "s", "<p>hi</p>").await.unwrap_err();
        assert!(matches!(err, DigestError::TokenRefreshError { status: NO_RESPONSE, .. }));
        assert_eq!(err.exit_code(), 3);
    }
}
