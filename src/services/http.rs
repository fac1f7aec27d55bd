use crate::constants::api::USER_AGENT;
use crate::constants::network;
use crate::errors::ToolError;
use crate::services::logger::Logger;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        self.status < 400
    }
}

/// Sends one request and reports status + body. Status codes >= 400 are
/// returned as responses; only transport failures are errors.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ToolError>;
}

#[derive(Clone)]
pub struct ReqwestTransport {
    logger: Logger,
    client: Client,
    timeout_ms: u64,
}

impl ReqwestTransport {
    pub fn new(logger: Logger, timeout_ms: u64) -> Result<Self, ToolError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(Duration::from_millis(network::TIMEOUT_CONNECTION_MS))
            .build()
            .map_err(|err| ToolError::internal(format!("Failed to build HTTP client: {}", err)))?;
        Ok(Self {
            logger: logger.child("http"),
            client,
            timeout_ms,
        })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ToolError> {
        let mut req = self
            .client
            .request(request.method.clone(), request.url.as_str())
            .headers(headers_to_headermap(&request.headers)?)
            .timeout(Duration::from_millis(self.timeout_ms));
        if let Some(body) = request.body {
            req = req.body(body);
        }

        let started = Instant::now();
        let response = req.send().await.map_err(map_reqwest_error)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(map_reqwest_error)?;
        self.logger.debug(
            "HTTP exchange",
            Some(&serde_json::json!({
                "method": request.method.as_str(),
                "url": request.url,
                "status": status,
                "bytes": body.len(),
                "duration_ms": started.elapsed().as_millis() as u64,
            })),
        );
        Ok(HttpResponse { status, body })
    }
}

pub(crate) fn map_reqwest_error(err: reqwest::Error) -> ToolError {
    if err.is_timeout() {
        return ToolError::timeout("HTTP request timed out");
    }
    ToolError::retryable(err.to_string())
}

fn headers_to_headermap(headers: &[(String, String)]) -> Result<HeaderMap, ToolError> {
    let mut map = HeaderMap::new();
    for (key, value) in headers {
        let name = HeaderName::from_bytes(key.as_bytes())
            .map_err(|_| ToolError::invalid_params(format!("Invalid header name: {}", key)))?;
        let val = HeaderValue::from_str(value)
            .map_err(|_| ToolError::invalid_params(format!("Invalid value for header {}", key)))?;
        map.insert(name, val);
    }
    Ok(map)
}
