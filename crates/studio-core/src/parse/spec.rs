use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::operation::PathItem;

/// Info object describing the API.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Info {
    #[serde(default)]
    pub title: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub version: String,
}

/// Top-level API description as served by the documentation endpoint.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ApiSchema {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub swagger: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub info: Option<Info>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub paths: IndexMap<String, PathItem>,
}
