use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tempfile::NamedTempFile;

use crate::error::ConfigError;

/// Default config file name, resolved against the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "config.json";

/// Host used when the config does not name a `domain`.
pub const DEFAULT_DOMAIN: &str = "instructuremedia.com";

/// Keys that must be present, checked in this order.
pub const REQUIRED_FIELDS: [&str; 5] = [
    "access_token",
    "client_id",
    "client_secret",
    "refresh_token",
    "subdomain",
];

/// OAuth client credentials and the current token pair.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Credentials {
    pub access_token: String,
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
    pub subdomain: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    /// Unrecognised keys, written back untouched.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Credentials {
    pub fn domain(&self) -> &str {
        self.domain.as_deref().unwrap_or(DEFAULT_DOMAIN)
    }

    /// `https://{subdomain}.{domain}`
    pub fn origin(&self) -> String {
        format!("https://{}.{}", self.subdomain, self.domain())
    }

    pub fn with_tokens(&self, access_token: String, refresh_token: String) -> Self {
        Self {
            access_token,
            refresh_token,
            ..self.clone()
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_token", &"<redacted>")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .field("subdomain", &self.subdomain)
            .field("domain", &self.domain)
            .finish_non_exhaustive()
    }
}

/// Durable storage for [`Credentials`].
pub trait CredentialStore {
    fn load(&self) -> Result<Credentials, ConfigError>;

    /// Replace the stored record in full.
    fn save(&self, credentials: &Credentials) -> Result<(), ConfigError>;
}

/// Credentials kept in a JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for JsonFileStore {
    fn default() -> Self {
        Self::new(DEFAULT_CONFIG_FILE)
    }
}

impl CredentialStore for JsonFileStore {
    fn load(&self) -> Result<Credentials, ConfigError> {
        let content = fs::read_to_string(&self.path).map_err(|source| ConfigError::Read {
            path: self.path.clone(),
            source,
        })?;
        parse_credentials(&content, &self.path)
    }

    /// Writes sorted keys with 4-space indentation through a temporary file
    /// renamed over the original, so a failed write leaves the old file intact.
    fn save(&self, credentials: &Credentials) -> Result<(), ConfigError> {
        let write_err = |source| ConfigError::Write {
            path: self.path.clone(),
            source,
        };

        let bytes = to_sorted_json(credentials).map_err(|e| write_err(e.into()))?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
        tmp.write_all(&bytes).map_err(write_err)?;
        tmp.as_file().sync_all().map_err(write_err)?;
        tmp.persist(&self.path).map_err(|e| write_err(e.error))?;
        Ok(())
    }
}

/// Parse and validate a credentials document.
pub fn parse_credentials(content: &str, path: &Path) -> Result<Credentials, ConfigError> {
    let malformed = |reason: String| ConfigError::Malformed {
        path: path.to_path_buf(),
        reason,
    };

    let value: Value = serde_json::from_str(content).map_err(|e| malformed(e.to_string()))?;
    let Value::Object(map) = &value else {
        return Err(malformed("expected a JSON object".to_string()));
    };

    if let Some(field) = REQUIRED_FIELDS.into_iter().find(|f| !map.contains_key(*f)) {
        return Err(ConfigError::MissingField {
            path: path.to_path_buf(),
            field,
        });
    }

    serde_json::from_value(value).map_err(|e| malformed(e.to_string()))
}

fn to_sorted_json(credentials: &Credentials) -> Result<Vec<u8>, serde_json::Error> {
    let sorted: BTreeMap<String, Value> = match serde_json::to_value(credentials)? {
        Value::Object(map) => map.into_iter().collect(),
        _ => BTreeMap::new(),
    };

    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut out, formatter);
    sorted.serialize(&mut ser)?;
    out.push(b'\n');
    Ok(out)
}
