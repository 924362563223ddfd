use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A JSON Schema type keyword value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaType {
    String,
    Number,
    Integer,
    Boolean,
    Array,
    Object,
    File,
    Null,
    #[serde(other)]
    Other,
}

/// The `type` field can be a single type or an array of types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TypeSet {
    Single(SchemaType),
    Multiple(Vec<SchemaType>),
}

impl TypeSet {
    pub fn is_array(&self) -> bool {
        match self {
            TypeSet::Single(t) => *t == SchemaType::Array,
            TypeSet::Multiple(types) => types.iter().all(|t| *t == SchemaType::Array),
        }
    }
}

/// The subset of a response schema the command synthesizer looks at.
///
/// `$ref` and every other keyword are ignored, so a reference-only schema
/// decodes as an empty one.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ResponseSchema {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<TypeSet>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, ResponseSchema>,

    #[serde(rename = "allOf", default, skip_serializing_if = "Vec::is_empty")]
    pub all_of: Vec<ResponseSchema>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<ResponseSchema>>,
}

impl ResponseSchema {
    pub fn is_array(&self) -> bool {
        self.schema_type.as_ref().is_some_and(TypeSet::is_array)
    }

    /// Properties exposed directly, or through the first `allOf` member when
    /// the schema declares none of its own.
    pub fn exposed_properties(&self) -> Option<&IndexMap<String, ResponseSchema>> {
        if !self.properties.is_empty() {
            return Some(&self.properties);
        }
        self.all_of
            .first()
            .map(|member| &member.properties)
            .filter(|props| !props.is_empty())
    }
}
