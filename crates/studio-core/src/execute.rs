//! Run a synthesized command against the live API.

use std::collections::HashMap;

use serde::Deserialize;

use crate::client::SessionClient;
use crate::error::ExecError;
use crate::ir::Command;
use crate::render::{RenderOptions, render};

/// Argument values supplied on the command line, keyed by parameter name.
pub type CallArgs = HashMap<String, String>;

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// Substitute path parameters into the command's URL template.
///
/// The leading `/` is dropped so the result is relative to the API root.
pub fn build_path(command: &Command, args: &CallArgs) -> Result<String, ExecError> {
    let mut path = command.path.trim_start_matches('/').to_string();
    for name in &command.path_params {
        let value = args
            .get(name)
            .ok_or_else(|| ExecError::MissingPathArgument(name.clone()))?;
        path = path.replace(&format!("{{{name}}}"), &urlencoding::encode(value));
    }
    Ok(path)
}

/// Query pairs for every supplied non-path parameter, in declaration order.
pub fn build_query(command: &Command, args: &CallArgs) -> Vec<(String, String)> {
    command
        .operation
        .parameter_names()
        .filter(|name| !command.is_path_param(name))
        .filter_map(|name| args.get(name).map(|v| (name.to_string(), v.clone())))
        .collect()
}

/// Execute `command` and render the response.
pub fn execute(
    client: &mut SessionClient,
    command: &Command,
    args: &CallArgs,
    options: &RenderOptions,
) -> Result<String, ExecError> {
    let path = build_path(command, args)?;
    let query = build_query(command, args);

    let response = client.call(command.method, &path, &query)?;

    if !response.status.is_success() {
        let status = response.status.as_u16();
        return Err(match serde_json::from_slice::<ErrorBody>(&response.body) {
            Ok(body) => ExecError::Api {
                status,
                message: body.error,
            },
            Err(_) => ExecError::UndecodableApiError {
                status,
                body: response.text(),
            },
        });
    }

    Ok(render(command, &response, options)?)
}
