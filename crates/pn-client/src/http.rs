//! Blocking HTTP implementation of [`DiagramApi`].

use crate::api::DiagramApi;
use crate::error::{TransportError, TransportResult, error_detail};
use crate::types::{DiagramRequest, DiagramResponse};
use reqwest::Url;
use reqwest::blocking::{Client, Response};
use std::net::IpAddr;
use tracing::{debug, warn};

const API_PREFIX: &str = "/api";

#[derive(Clone, Debug)]
pub struct HttpClient {
    base_url: String,
    client: Client,
}

impl HttpClient {
    /// `base_url` is the server root, e.g. `http://127.0.0.1:8000`.
    pub fn new(base_url: &str) -> TransportResult<Self> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        let parsed = Url::parse(&base_url)
            .map_err(|e| TransportError::InvalidUrl(format!("{base_url}: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(TransportError::InvalidUrl(base_url));
        }
        let mut builder = Client::builder();
        if is_loopback(&parsed) {
            builder = builder.no_proxy();
        }
        let client = builder.build()?;
        Ok(Self { base_url, client })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url, API_PREFIX, path)
    }

    fn read_json(response: Response) -> TransportResult<serde_json::Value> {
        let status = response.status();
        let body = response.text()?;
        if !status.is_success() {
            let detail = error_detail(status.as_u16(), &body);
            warn!(status = status.as_u16(), %detail, "request rejected");
            return Err(TransportError::Status {
                status: status.as_u16(),
                detail,
            });
        }
        serde_json::from_str(&body).map_err(|e| TransportError::MalformedBody(e.to_string()))
    }
}

/// Local servers are reached directly, whatever the proxy environment says.
fn is_loopback(url: &Url) -> bool {
    match url.host_str() {
        Some("localhost") => true,
        Some(host) => host
            .trim_start_matches('[')
            .trim_end_matches(']')
            .parse::<IpAddr>()
            .is_ok_and(|ip| ip.is_loopback()),
        None => false,
    }
}

impl DiagramApi for HttpClient {
    fn generate_diagram(
        &self,
        request: &DiagramRequest,
        api_key: &str,
    ) -> TransportResult<DiagramResponse> {
        let url = self.endpoint("/diagrams/");
        debug!(%url, "posting diagram request");
        let response = self
            .client
            .post(&url)
            .header("X-API-KEY", api_key)
            .json(request)
            .send()?;
        DiagramResponse::from_value(Self::read_json(response)?)
    }

    fn check_health(&self) -> TransportResult<serde_json::Value> {
        let url = self.endpoint("/health/");
        debug!(%url, "health check");
        let response = self.client.get(&url).send()?;
        Self::read_json(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_join_without_double_slash() {
        let client = HttpClient::new("http://localhost:8000/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000");
        assert_eq!(client.endpoint("/diagrams/"), "http://localhost:8000/api/diagrams/");
    }

    fn loopback(url: &str) -> bool {
        is_loopback(&Url::parse(url).unwrap())
    }

    #[test]
    fn loopback_hosts() {
        assert!(loopback("http://127.0.0.1:8000"));
        assert!(loopback("http://127.0.0.2:8000"));
        assert!(loopback("http://LOCALHOST"));
        assert!(loopback("http://[::1]:8000/x"));
        assert!(!loopback("https://api.example.org"));
        assert!(!loopback("http://10.0.0.1"));
    }

    #[test]
    fn rejects_non_http_base() {
        assert!(matches!(
            HttpClient::new("localhost:8000"),
            Err(TransportError::InvalidUrl(_))
        ));
        assert!(matches!(
            HttpClient::new("ftp://example.org"),
            Err(TransportError::InvalidUrl(_))
        ));
        assert!(matches!(
            HttpClient::new("not a url"),
            Err(TransportError::InvalidUrl(_))
        ));
    }
}
