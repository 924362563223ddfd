//! Blocking HTTP transport with a fixed-delay retry on server errors.

use std::thread;
use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::header::{CONTENT_TYPE, HeaderMap};

use crate::error::TransportError;
use crate::ir::HttpMethod;

/// Retry and timeout settings.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Extra attempts after a 5xx response; at most `1 + max_retries` calls.
    pub max_retries: u32,
    pub retry_delay: Duration,
    pub connect_timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_delay: Duration::from_secs(3),
            connect_timeout: Duration::from_secs(30),
        }
    }
}

/// One outgoing call.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub query: Vec<(String, String)>,
    /// Sent as `application/x-www-form-urlencoded` when present.
    pub form: Option<Vec<(String, String)>>,
}

impl HttpRequest {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            query: Vec::new(),
            form: None,
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn query(mut self, pairs: &[(String, String)]) -> Self {
        self.query.extend_from_slice(pairs);
        self
    }

    pub fn form(mut self, pairs: Vec<(String, String)>) -> Self {
        self.form = Some(pairs);
        self
    }
}

/// A fully read response.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Media type without parameters: `application/json; charset=utf-8` → `application/json`.
    pub fn content_type(&self) -> &str {
        self.headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .map(str::trim)
            .unwrap_or("")
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

pub struct Transport {
    client: Client,
    config: TransportConfig,
}

impl Transport {
    pub fn new(config: TransportConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(None)
            .build()
            .map_err(TransportError::ClientBuild)?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    /// Issue the request, retrying on 5xx. The final response is returned as
    /// data even if it is still a server error.
    pub fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut response = self.send_once(request)?;
        let mut retries = 0;

        while response.status.is_server_error() && retries < self.config.max_retries {
            retries += 1;
            log::warn!(
                "{} {} returned {}, retry {}/{} in {:?}",
                request.method,
                request.url,
                response.status,
                retries,
                self.config.max_retries,
                self.config.retry_delay
            );
            thread::sleep(self.config.retry_delay);
            response = self.send_once(request)?;
        }

        Ok(response)
    }

    fn send_once(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut req = self
            .client
            .request(request.method.to_reqwest(), &request.url);

        for (name, value) in &request.headers {
            req = req.header(name, value);
        }
        if !request.query.is_empty() {
            req = req.query(&request.query);
        }
        if let Some(form) = &request.form {
            req = req.form(form);
        }

        let resp = req.send().map_err(|source| TransportError::Request {
            url: request.url.clone(),
            source,
        })?;
        let status = resp.status();
        let headers = resp.headers().clone();
        let body = resp
            .bytes()
            .map_err(|source| TransportError::ResponseRead {
                url: request.url.clone(),
                source,
            })?
            .to_vec();

        log::debug!("{} {} -> {}", request.method, request.url, status);
        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
