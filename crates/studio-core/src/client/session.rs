//! Authenticated access to the public API.

use reqwest::StatusCode;
use serde::Deserialize;

use crate::config::{CredentialStore, Credentials};
use crate::error::{AuthError, ClientError, ConfigError};
use crate::ir::HttpMethod;
use crate::parse;
use crate::parse::spec::ApiSchema;

use super::transport::{HttpRequest, HttpResponse, Transport, TransportConfig};

/// Which URL prefix a relative path is resolved against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiPrefix {
    /// `/api/public/v1/`
    Versioned,
    /// `/api/public/`, used for the schema document and the token endpoint.
    Unversioned,
}

impl ApiPrefix {
    fn as_str(self) -> &'static str {
        match self {
            ApiPrefix::Versioned => "api/public/v1",
            ApiPrefix::Unversioned => "api/public",
        }
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
}

/// Bearer-token client that refreshes expired credentials once per call.
pub struct SessionClient {
    transport: Transport,
    store: Box<dyn CredentialStore>,
    credentials: Credentials,
    origin: String,
}

impl SessionClient {
    /// Load credentials from `store`. No network traffic happens here.
    pub fn new(store: Box<dyn CredentialStore>, transport: Transport) -> Result<Self, ConfigError> {
        let credentials = store.load()?;
        let origin = credentials.origin();
        Ok(Self {
            transport,
            store,
            credentials,
            origin,
        })
    }

    pub fn with_default_transport(store: Box<dyn CredentialStore>) -> Result<Self, ClientError> {
        let transport = Transport::new(TransportConfig::default())?;
        Ok(Self::new(store, transport)?)
    }

    /// Send requests to `origin` (scheme and host) instead of
    /// `https://{subdomain}.{domain}`.
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = origin.into().trim_end_matches('/').to_string();
        self
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn url(&self, prefix: ApiPrefix, relative_path: &str) -> String {
        format!(
            "{}/{}/{}",
            self.origin,
            prefix.as_str(),
            relative_path.trim_start_matches('/')
        )
    }

    /// Call a versioned API endpoint.
    pub fn call(
        &mut self,
        method: HttpMethod,
        relative_path: &str,
        query: &[(String, String)],
    ) -> Result<HttpResponse, ClientError> {
        self.call_with_prefix(ApiPrefix::Versioned, method, relative_path, query)
    }

    /// Issue an authorized call. A 401 triggers one token refresh and one
    /// retry; a second 401 is an [`AuthError::Unauthorized`].
    pub fn call_with_prefix(
        &mut self,
        prefix: ApiPrefix,
        method: HttpMethod,
        relative_path: &str,
        query: &[(String, String)],
    ) -> Result<HttpResponse, ClientError> {
        let url = self.url(prefix, relative_path);

        for attempt in 0..2 {
            if attempt > 0 {
                self.refresh()?;
            }
            let request = HttpRequest::new(method, url.as_str())
                .header(
                    "Authorization",
                    format!("Bearer {}", self.credentials.access_token),
                )
                .query(query);
            let response = self.transport.send(&request)?;
            if response.status != StatusCode::UNAUTHORIZED {
                return Ok(response);
            }
            log::debug!("{method} {url} returned 401");
        }

        Err(AuthError::Unauthorized { url }.into())
    }

    /// Fetch and decode the API description.
    pub fn fetch_schema(&mut self) -> Result<ApiSchema, ClientError> {
        let response = self.call_with_prefix(
            ApiPrefix::Unversioned,
            HttpMethod::Get,
            parse::SCHEMA_PATH,
            &[],
        )?;

        if response.status != StatusCode::OK {
            return Err(ClientError::SchemaFetch {
                url: self.url(ApiPrefix::Unversioned, parse::SCHEMA_PATH),
                status: response.status,
                body: response.text(),
            });
        }

        parse::from_slice(&response.body).map_err(ClientError::SchemaDecode)
    }

    /// Exchange the refresh token for a new token pair and persist it.
    ///
    /// The new pair is written to the store before it replaces the in-memory
    /// one; if either step fails the session keeps its old tokens.
    pub fn refresh(&mut self) -> Result<(), ClientError> {
        let url = self.url(ApiPrefix::Unversioned, "oauth/token");
        let form = vec![
            ("client_id".to_string(), self.credentials.client_id.clone()),
            (
                "client_secret".to_string(),
                self.credentials.client_secret.clone(),
            ),
            (
                "refresh_token".to_string(),
                self.credentials.refresh_token.clone(),
            ),
            ("grant_type".to_string(), "refresh_token".to_string()),
        ];

        let response = self
            .transport
            .send(&HttpRequest::new(HttpMethod::Post, url).form(form))?;

        if response.status != StatusCode::OK {
            return Err(AuthError::RefreshRejected {
                status: response.status,
                body: response.text(),
            }
            .into());
        }

        let tokens: TokenResponse =
            serde_json::from_slice(&response.body).map_err(AuthError::MalformedTokenResponse)?;
        let updated = self
            .credentials
            .with_tokens(tokens.access_token, tokens.refresh_token);

        self.store.save(&updated).map_err(AuthError::Storage)?;
        self.credentials = updated;
        log::debug!("refreshed access token");
        Ok(())
    }
}
