use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::parameter::ParameterSpec;
use super::response::ResponseSpec;
use crate::ir::HttpMethod;

/// An API operation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OperationSpec {
    #[serde(default)]
    pub summary: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<ParameterSpec>,

    /// Response descriptions keyed by status code string (`"200"`, `"204"`, ...).
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub responses: IndexMap<String, ResponseSpec>,
}

impl OperationSpec {
    pub fn parameter_names(&self) -> impl Iterator<Item = &str> {
        self.parameters.iter().map(|p| p.name.as_str())
    }

    pub fn response(&self, status: u16) -> Option<&ResponseSpec> {
        self.responses.get(status.to_string().as_str())
    }
}

/// A path item, containing operations keyed by HTTP method.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PathItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub get: Option<OperationSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post: Option<OperationSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub put: Option<OperationSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete: Option<OperationSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patch: Option<OperationSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<OperationSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub head: Option<OperationSpec>,
}

impl PathItem {
    /// Declared operations in a fixed method order.
    pub fn operations(&self) -> impl Iterator<Item = (HttpMethod, &OperationSpec)> {
        [
            (HttpMethod::Get, &self.get),
            (HttpMethod::Post, &self.post),
            (HttpMethod::Put, &self.put),
            (HttpMethod::Delete, &self.delete),
            (HttpMethod::Patch, &self.patch),
            (HttpMethod::Options, &self.options),
            (HttpMethod::Head, &self.head),
        ]
        .into_iter()
        .filter_map(|(method, op)| op.as_ref().map(|op| (method, op)))
    }
}
