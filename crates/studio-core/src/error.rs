use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is invalid, please format it as a JSON object: {reason}", path.display())]
    Malformed { path: PathBuf, reason: String },

    #[error("required configuration parameter '{field}' missing from {}", path.display())]
    MissingField { path: PathBuf, field: &'static str },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request to {url} failed")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to read response body from {url}")]
    ResponseRead {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to build HTTP client")]
    ClientBuild(#[source] reqwest::Error),
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("could not refresh tokens ({status}): {body}")]
    RefreshRejected { status: StatusCode, body: String },

    #[error("token endpoint returned an unexpected body: {0}")]
    MalformedTokenResponse(#[source] serde_json::Error),

    #[error("{url} still returned 401 after refreshing tokens")]
    Unauthorized { url: String },

    #[error("could not persist refreshed tokens")]
    Storage(#[from] ConfigError),
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("could not get API schema from {url} ({status}): {body}")]
    SchemaFetch {
        url: String,
        status: StatusCode,
        body: String,
    },

    #[error("API schema is not valid JSON: {0}")]
    SchemaDecode(#[source] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum SynthesisError {
    #[error("command name '{name}' derived from both {first} and {second}")]
    DuplicateCommand {
        name: String,
        first: String,
        second: String,
    },
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("response declared application/json but could not be decoded: {0}")]
    Json(#[from] serde_json::Error),

    #[error("response is not valid CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum ExecError {
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("missing value for path parameter '{0}'")]
    MissingPathArgument(String),

    #[error("{status}: {message}")]
    Api { status: u16, message: String },

    #[error("{status}: response carries no decodable 'error' field: {body}")]
    UndecodableApiError { status: u16, body: String },
}

impl From<TransportError> for ExecError {
    fn from(err: TransportError) -> Self {
        ExecError::Client(ClientError::Transport(err))
    }
}

impl From<AuthError> for ExecError {
    fn from(err: AuthError) -> Self {
        ExecError::Client(ClientError::Auth(err))
    }
}
