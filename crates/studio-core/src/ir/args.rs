use crate::parse::parameter::{ParameterSpec, ParameterType};

use super::command::Command;

/// Value type of a command-line flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgKind {
    Integer,
    Text,
}

/// Front-end independent description of one `--flag` of a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgSpec {
    pub name: String,
    pub kind: ArgKind,
    pub required: bool,
    pub allowed_values: Vec<String>,
    pub help: String,
}

impl ArgSpec {
    pub fn from_parameter(param: &ParameterSpec) -> Self {
        let kind = match param.param_type {
            ParameterType::Integer => ArgKind::Integer,
            _ => ArgKind::Text,
        };
        let allowed_values = param
            .enum_values
            .iter()
            .map(|v| match v {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect();

        ArgSpec {
            name: param.name.clone(),
            kind,
            required: param.required,
            allowed_values,
            help: param.description.clone(),
        }
    }
}

impl Command {
    /// One flag per declared parameter, in declaration order.
    pub fn arg_specs(&self) -> Vec<ArgSpec> {
        self.operation
            .parameters
            .iter()
            .map(ArgSpec::from_parameter)
            .collect()
    }
}
