use std::borrow::Cow;
use std::net::IpAddr;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{CONNECTION, CONTENT_TYPE};
use reqwest::Client;
use tracing::{debug, info, Instrument, Span};

use crate::core::{Config, Error, Result};

/// Status of an accepted request
pub const STATUS_OK: u16 = 200;

/// Status reported when the TV answers a serial command with `NG`
pub const STATUS_NOT_ACCEPTABLE: u16 = 406;

/// What came back from the device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: u16,
    pub body: Bytes,
}

impl Reply {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Reply {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == STATUS_OK
    }

    /// The body as a byte reader
    pub fn reader(&self) -> impl std::io::Read + '_ {
        &self.body[..]
    }

    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

/// How requests reach the device
///
/// Discovery, pairing and dispatch only ever talk to the TV through this
/// trait, so tests swap in a scripted implementation.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Points the transport at a device found by discovery
    fn bind_device(&self, _ip: IpAddr) {}

    /// Sends `body` to `path` and waits for the reply
    async fn send(&self, path: &str, body: &[u8]) -> Result<Reply>;
}

/// UDAP over HTTP
pub struct HttpTransport {
    client: Client,
    port: u16,
    device: RwLock<Option<IpAddr>>,
    span: Span,
}

impl HttpTransport {
    /// Creates a transport with no device bound yet
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.http_timeout)
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| Error::transport(format!("Failed to build HTTP client: {}", e)))?;

        Ok(HttpTransport {
            client,
            port: config.device_port,
            device: RwLock::new(None),
            span: Span::none(),
        })
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Binds the transport to a known address, skipping discovery
    pub fn with_device(self, ip: IpAddr) -> Self {
        self.bind_device(ip);
        self
    }

    pub fn device(&self) -> Option<IpAddr> {
        *self.device.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn url(&self, path: &str) -> Result<(IpAddr, String)> {
        let ip = self
            .device()
            .ok_or_else(|| Error::transport("no device bound; run discovery first"))?;
        let host = match ip {
            IpAddr::V4(v4) => v4.to_string(),
            IpAddr::V6(v6) => format!("[{}]", v6),
        };
        Ok((ip, format!("http://{}:{}{}", host, self.port, path)))
    }

    async fn post(&self, path: &str, body: &[u8]) -> Result<Reply> {
        let (ip, url) = self.url(path)?;
        info!(%url, request = %String::from_utf8_lossy(body), "contacting TV");

        let response = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, "text/xml; charset=utf-8")
            .header(CONNECTION, "Close")
            .body(body.to_vec())
            .send()
            .await
            .map_err(|e| Error::transport(format!("Unable to get response from {}: {}", ip, e)))?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| Error::transport(format!("Failed to read response from {}: {}", ip, e)))?;

        if body.is_empty() {
            debug!(%ip, status, "TV did not confirm command received");
        } else {
            debug!(%ip, status, reply = %String::from_utf8_lossy(&body), "TV replied");
        }

        Ok(Reply::new(status, body))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    fn bind_device(&self, ip: IpAddr) {
        *self.device.write().unwrap_or_else(PoisonError::into_inner) = Some(ip);
    }

    async fn send(&self, path: &str, body: &[u8]) -> Result<Reply> {
        self.post(path, body).instrument(self.span.clone()).await
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn test_reply() {
        let reply = Reply::new(STATUS_OK, &b"<ok/>"[..]);
        assert!(reply.is_success());
        assert_eq!(reply.text(), "<ok/>");

        let mut body = String::new();
        reply.reader().read_to_string(&mut body).unwrap();
        assert_eq!(body, "<ok/>");

        assert!(!Reply::new(STATUS_NOT_ACCEPTABLE, Bytes::new()).is_success());
    }

    #[tokio::test]
    async fn test_http_requires_device() {
        let transport = HttpTransport::new(&Config::default()).unwrap();
        let err = transport.send("/udap/api/command", b"").await.unwrap_err();
        assert!(matches!(err, Error::Transport(_)));
    }

    #[test]
    fn test_http_url() {
        let transport = HttpTransport::new(&Config::default())
            .unwrap()
            .with_device("192.168.1.20".parse().unwrap());

        let (_, url) = transport.url("/udap/api/pairing").unwrap();
        assert_eq!(url, "http://192.168.1.20:8080/udap/api/pairing");

        transport.bind_device("::1".parse().unwrap());
        let (_, url) = transport.url("/x").unwrap();
        assert_eq!(url, "http://[::1]:8080/x");
    }

    #[tokio::test]
    async fn test_http_unreachable_device_is_transport_error() {
        let config = Config {
            device_port: 9,
            http_timeout: std::time::Duration::from_millis(500),
            ..Config::default()
        };
        let transport = HttpTransport::new(&config)
            .unwrap()
            .with_device("127.0.0.1".parse().unwrap());

        let err = transport.send("/udap/api/command", b"<x/>").await.unwrap_err();
        assert!(matches!(err, Error::Transport(_)));
    }
}
