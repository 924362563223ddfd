use serde::{Deserialize, Serialize};

/// Parameter location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ParameterLocation {
    Path,
    Query,
    Header,
    Body,
    FormData,
    #[serde(other)]
    Other,
}

impl ParameterLocation {
    /// Body and form-data parameters carry request payloads, which synthesized
    /// commands cannot supply.
    pub fn is_payload(self) -> bool {
        matches!(self, ParameterLocation::Body | ParameterLocation::FormData)
    }
}

/// Declared parameter type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterType {
    Integer,
    Number,
    Boolean,
    #[default]
    String,
    Object,
    Array,
    File,
    #[serde(other)]
    Other,
}

/// An API parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSpec {
    pub name: String,

    #[serde(rename = "in")]
    pub location: ParameterLocation,

    #[serde(rename = "type", default)]
    pub param_type: ParameterType,

    #[serde(default)]
    pub required: bool,

    #[serde(rename = "enum", default, skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<serde_json::Value>,

    #[serde(default)]
    pub description: String,
}
