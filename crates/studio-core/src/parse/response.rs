use serde::{Deserialize, Serialize};

use super::schema::ResponseSchema;

/// A response definition.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ResponseSpec {
    #[serde(default)]
    pub description: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<ResponseSchema>,
}
