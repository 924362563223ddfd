use crate::ir::{Command, Eligibility, HttpMethod, Rejection};
use crate::parse::operation::OperationSpec;
use crate::parse::spec::ApiSchema;

use super::naming::{PathSegments, derive_name, segment_path};

/// Turn every (path, method) pair of the schema into a command, eligible or not.
///
/// Order follows the schema's path order, then get, post, put, delete.
pub fn synthesize(schema: &ApiSchema) -> Vec<Command> {
    let mut commands = Vec::new();

    for (path, item) in &schema.paths {
        let segments = segment_path(path);
        for (method, op) in item.operations() {
            commands.push(build_command(method, &segments, op));
        }
    }

    commands
}

fn build_command(method: HttpMethod, segments: &PathSegments<'_>, op: &OperationSpec) -> Command {
    let name = derive_name(method, segments, op);
    let eligibility = check_eligibility(method, segments, op);

    match &eligibility {
        Eligibility::Eligible => {}
        Eligibility::Rejected(reason @ Rejection::UndeclaredPathParameters(_)) => {
            log::warn!("Skipping {name} for {}, {reason}", segments.template);
        }
        Eligibility::Rejected(reason) => {
            log::debug!("Skipping {name} for {}, {reason}", segments.template);
        }
    }

    Command {
        name,
        method,
        path: segments.template.to_string(),
        path_params: segments.params.iter().map(|p| p.to_string()).collect(),
        operation: op.clone(),
        eligibility,
    }
}

/// Decide whether an operation can be exposed as a command.
pub fn check_eligibility(
    method: HttpMethod,
    segments: &PathSegments<'_>,
    op: &OperationSpec,
) -> Eligibility {
    if method.verb().is_none() {
        return Eligibility::Rejected(Rejection::UnsupportedMethod(method));
    }

    let missing: Vec<String> = segments
        .params
        .iter()
        .filter(|p| !op.parameter_names().any(|name| name == **p))
        .map(|p| p.to_string())
        .collect();
    if !missing.is_empty() {
        return Eligibility::Rejected(Rejection::UndeclaredPathParameters(missing));
    }

    if let Some(payload) = op.parameters.iter().find(|p| p.location.is_payload()) {
        return Eligibility::Rejected(Rejection::PayloadParameter(payload.name.clone()));
    }

    Eligibility::Eligible
}
