use crate::ir::HttpMethod;
use crate::parse::operation::OperationSpec;

/// Trailing path entities that read as actions rather than resources.
pub const ACTION_VERBS: [&str; 5] = ["search", "download", "complete", "ping", "transfer_media"];

/// A URL template split into `{parameter}` names and literal entities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathSegments<'a> {
    pub template: &'a str,
    pub params: Vec<&'a str>,
    pub entities: Vec<&'a str>,
}

pub fn segment_path(template: &str) -> PathSegments<'_> {
    let mut params = Vec::new();
    let mut entities = Vec::new();

    for seg in template.split('/').filter(|s| !s.is_empty()) {
        match seg.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
            Some(name) => params.push(name),
            None => entities.push(seg),
        }
    }

    PathSegments {
        template,
        params,
        entities,
    }
}

/// Derive a snake_case command name from HTTP method + path.
///
/// Examples:
/// - `GET /media` → `show_media`
/// - `GET /collections/{collection_id}` → `show_collection` (singular response)
/// - `POST /media/{media_id}/permissions` → `add_media_permissions`
/// - `GET /media/search` → `search_media`
/// - `GET /media/{media_id}/captions/{caption_file_id}/download` → `download_media_captions`
pub fn derive_name(method: HttpMethod, segments: &PathSegments<'_>, op: &OperationSpec) -> String {
    if let Some((last, rest)) = segments.entities.split_last() {
        if ACTION_VERBS.contains(last) {
            let mut parts = vec![*last];
            parts.extend_from_slice(rest);
            return parts.join("_");
        }
    }

    let verb = match method.verb() {
        Some(verb) => verb.to_string(),
        None => method.as_str().to_ascii_lowercase(),
    };

    let mut name = verb;
    for entity in &segments.entities {
        name.push('_');
        name.push_str(entity);
    }

    if name.ends_with('s') && is_singular(method, segments.template, op) {
        name.pop();
    }

    name
}

/// Whether the operation acts on a single resource rather than a collection.
///
/// A GET counts as singular only when its `200` schema exposes at least one
/// non-array property; every other response shape counts as a collection.
pub fn is_singular(method: HttpMethod, path: &str, op: &OperationSpec) -> bool {
    match method {
        HttpMethod::Post => !path.ends_with("permissions"),
        HttpMethod::Get => op
            .response(200)
            .and_then(|ok| ok.schema.as_ref())
            .and_then(|schema| schema.exposed_properties())
            .is_some_and(|props| props.values().any(|p| !p.is_array())),
        _ => false,
    }
}
