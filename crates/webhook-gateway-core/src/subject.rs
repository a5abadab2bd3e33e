//! Deterministic subject derivation from webhook payloads.
//!
//! A subject is always exactly four dot-separated tokens:
//! `<provider>.<scope-a>.<scope-b>.<event-kind>`. No token may contain a
//! literal `.`; wherever the payload supplies a path-like string (a GitLab
//! `path_with_namespace`, a URL), internal `.` or `/` characters are folded
//! into `~` so the subject's own dots stay unambiguous. `?` marks a scope
//! token the payload didn't give us enough information to fill in.

use serde_json::Value;
use std::fmt;

const UNKNOWN: &str = "?";

/// A validated, four-token subject string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Subject(String);

impl Subject {
    fn from_tokens(provider: &str, scope_a: &str, scope_b: &str, event_kind: &str) -> Self {
        debug_assert!(!provider.contains('.'));
        debug_assert!(!scope_a.contains('.'));
        debug_assert!(!scope_b.contains('.'));
        debug_assert!(!event_kind.contains('.'));
        Self(format!("{provider}.{scope_a}.{scope_b}.{event_kind}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Replaces every `.` in a token with `~`. Subject tokens may carry `~` as an
/// internal separator but never the dot that delimits tokens themselves.
fn sanitize_token(raw: &str) -> String {
    raw.replace('.', "~")
}

fn non_empty_str(value: &Value) -> Option<&str> {
    value.as_str().filter(|s| !s.is_empty())
}

fn get_path<'a>(root: &'a Value, path: &[&str]) -> Option<&'a Value> {
    let mut current = root;
    for segment in path {
        current = current.get(segment)?;
    }
    Some(current)
}

fn get_str<'a>(root: &'a Value, path: &[&str]) -> Option<&'a str> {
    get_path(root, path).and_then(non_empty_str)
}

/// Splits a `/`-delimited path into `(namespace, project)`, sanitizing each
/// segment and dropping empty ones, per the project-scoped derivation rule.
fn split_namespace_and_project(path: &str) -> (String, String) {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    match segments.split_last() {
        None => (UNKNOWN.to_string(), UNKNOWN.to_string()),
        Some((last, rest)) => {
            if rest.is_empty() {
                (sanitize_token(last), UNKNOWN.to_string())
            } else {
                let namespace = rest
                    .iter()
                    .map(|s| sanitize_token(s))
                    .collect::<Vec<_>>()
                    .join("~");
                (namespace, sanitize_token(last))
            }
        }
    }
}

/// Builds the subject for a GitHub delivery.
///
/// `event_kind` is taken from the `X-GitHub-Event` header, not the body — the
/// header is always present and authoritative, unlike payload fields.
pub fn build_github_subject(event_kind: &str, payload: &Value) -> Subject {
    let (org, repo) = match (
        get_str(payload, &["repository", "owner", "login"]),
        get_str(payload, &["repository", "name"]),
    ) {
        (Some(owner), Some(name)) => (sanitize_token(owner), sanitize_token(name)),
        _ => match get_str(payload, &["organization", "login"]) {
            Some(org) => (sanitize_token(org), UNKNOWN.to_string()),
            None => (UNKNOWN.to_string(), UNKNOWN.to_string()),
        },
    };

    Subject::from_tokens("github", &org, &repo, &sanitize_token(event_kind))
}

/// Builds the subject for a GitLab event.
///
/// The event kind comes from the body itself (`object_kind`, falling back to
/// `event_name`) since GitLab does not send a dedicated event-kind header for
/// every hook type.
pub fn build_gitlab_subject(payload: &Value) -> Subject {
    let event_kind = get_str(payload, &["object_kind"])
        .or_else(|| get_str(payload, &["event_name"]))
        .map(|s| sanitize_token(&s.to_ascii_lowercase()))
        .unwrap_or_else(|| "unknown".to_string());

    let (namespace, project) = derive_gitlab_scope(payload);

    Subject::from_tokens("gitlab", &namespace, &project, &event_kind)
}

fn derive_gitlab_scope(payload: &Value) -> (String, String) {
    // Rule 1: project-scoped path, either at the top level or under `project`.
    if let Some(path) = get_str(payload, &["path_with_namespace"])
        .or_else(|| get_str(payload, &["project", "path_with_namespace"]))
    {
        return split_namespace_and_project(path);
    }

    // Rule 2: group-scoped path.
    if let Some(group_path) =
        get_str(payload, &["group", "full_path"]).or_else(|| get_str(payload, &["group", "path"]))
    {
        return (sanitize_token(group_path), UNKNOWN.to_string());
    }

    // Rule 3: derived from a URL embedded in `object_attributes.url`.
    if let Some(url) = get_str(payload, &["object_attributes", "url"]) {
        let has_project_id = get_path(payload, &["project_id"]).is_some();
        let path = strip_scheme_and_host(url);
        let path = path.split("/-/").next().unwrap_or("");
        return if has_project_id {
            split_namespace_and_project(path)
        } else {
            let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
            match segments.as_slice() {
                [] => (UNKNOWN.to_string(), UNKNOWN.to_string()),
                parts => (
                    parts.iter().map(|s| sanitize_token(s)).collect::<Vec<_>>().join("~"),
                    UNKNOWN.to_string(),
                ),
            }
        };
    }

    // Rule 4: instance-wide fallback.
    (UNKNOWN.to_string(), UNKNOWN.to_string())
}

/// Strips a `scheme://host` prefix from a URL, leaving the path portion.
fn strip_scheme_and_host(url: &str) -> &str {
    let without_scheme = url.split_once("://").map(|(_, rest)| rest).unwrap_or(url);
    match without_scheme.find('/') {
        Some(idx) => &without_scheme[idx..],
        None => "",
    }
}

#[cfg(test)]
#[path = "subject_tests.rs"]
mod tests;
