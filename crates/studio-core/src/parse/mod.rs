pub mod operation;
pub mod parameter;
pub mod response;
pub mod schema;
pub mod spec;

use spec::ApiSchema;

/// Relative path of the schema document, served outside the versioned API prefix.
pub const SCHEMA_PATH: &str = "apidocs";

/// Parse an API description from JSON.
pub fn from_json(input: &str) -> Result<ApiSchema, serde_json::Error> {
    serde_json::from_str(input)
}

/// Parse an API description from raw response bytes.
pub fn from_slice(input: &[u8]) -> Result<ApiSchema, serde_json::Error> {
    serde_json::from_slice(input)
}
