use std::fmt;

use thiserror::Error;

use crate::parse::operation::OperationSpec;

/// HTTP method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Options,
    Head,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Head => "HEAD",
        }
    }

    /// Command verb for the methods that map onto CLI actions.
    pub fn verb(&self) -> Option<&'static str> {
        match self {
            HttpMethod::Get => Some("show"),
            HttpMethod::Post => Some("add"),
            HttpMethod::Put => Some("update"),
            HttpMethod::Delete => Some("delete"),
            _ => None,
        }
    }

    pub fn to_reqwest(self) -> reqwest::Method {
        match self {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Options => reqwest::Method::OPTIONS,
            HttpMethod::Head => reqwest::Method::HEAD,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why an operation was kept off the CLI surface.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("{0} operations have no command verb")]
    UnsupportedMethod(HttpMethod),

    #[error("path parameters not declared: {}", .0.join(", "))]
    UndeclaredPathParameters(Vec<String>),

    #[error("parameter '{0}' must be sent in the request body")]
    PayloadParameter(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Eligibility {
    Eligible,
    Rejected(Rejection),
}

/// A CLI command derived from one schema operation.
#[derive(Debug, Clone)]
pub struct Command {
    pub name: String,
    pub method: HttpMethod,
    /// URL template relative to the API root, e.g. `/media/{media_id}`.
    pub path: String,
    /// Names of the `{...}` segments of `path`, in order.
    pub path_params: Vec<String>,
    pub operation: OperationSpec,
    pub eligibility: Eligibility,
}

impl Command {
    pub fn is_eligible(&self) -> bool {
        self.eligibility == Eligibility::Eligible
    }

    pub fn summary(&self) -> &str {
        &self.operation.summary
    }

    pub fn is_path_param(&self, name: &str) -> bool {
        self.path_params.iter().any(|p| p == name)
    }
}
