//! Shared HTTP client construction.

use crate::defaults;
use crate::error::{NavError, Result};
use std::time::Duration;

/// Build a client with a fixed request timeout and user agent.
pub fn client(user_agent: &str, timeout: Duration) -> Result<reqwest::Client> {
    let agent = if user_agent.is_empty() {
        defaults::USER_AGENT
    } else {
        user_agent
    };
    reqwest::Client::builder()
        .user_agent(agent)
        .timeout(timeout)
        .build()
        .map_err(|e| NavError::Other(format!("Failed to build HTTP client: {e}")))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Serve exactly one canned response on a local port.
    ///
    /// Returns the base URL and a handle resolving to the raw request text.
    pub async fn serve_once(
        status: &str,
        content_type: &str,
        body: impl Into<Vec<u8>>,
    ) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let status = status.to_string();
        let content_type = content_type.to_string();
        let body = body.into();

        let handle = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let request = read_request(&mut stream).await;

            let head = format!(
                "HTTP/1.1 {status}\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                body.len()
            );
            stream.write_all(head.as_bytes()).await.unwrap();
            stream.write_all(&body).await.unwrap();
            stream.shutdown().await.ok();
            request
        });

        (base, handle)
    }

    /// A base URL nothing is listening on.
    pub async fn refused_url() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);
        base
    }

    async fn read_request(stream: &mut tokio::net::TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = stream.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                let head = String::from_utf8_lossy(&buf[..end]).to_lowercase();
                let length = head
                    .lines()
                    .find_map(|line| line.strip_prefix("content-length:"))
                    .and_then(|v| v.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= end + 4 + length {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&buf).to_string()
    }

    #[tokio::test]
    async fn test_client_sends_user_agent() {
        let (base, request) = serve_once("200 OK", "text/plain", "ok").await;
        let client = client("voicenav-test/1", Duration::from_secs(5)).unwrap();

        let body = client.get(&base).send().await.unwrap().text().await.unwrap();

        assert_eq!(body, "ok");
        let request = request.await.unwrap().to_lowercase();
        assert!(request.contains("user-agent: voicenav-test/1"));
    }

    #[tokio::test]
    async fn test_empty_user_agent_falls_back_to_default() {
        let (base, request) = serve_once("204 No Content", "text/plain", "").await;
        let client = client("", Duration::from_secs(5)).unwrap();

        client.get(&base).send().await.unwrap();

        let request = request.await.unwrap();
        assert!(request.contains(defaults::USER_AGENT));
    }
}
