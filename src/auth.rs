use serde_json::Value as JsonValue;
use thiserror::Error;

pub const API_KEY_HEADER: &str = "x-api-key";

#[derive(Debug, Error, PartialEq)]
pub enum AuthError {
    #[error("no API key supplied")]
    Missing,
    #[error("API_KEY is not configured")]
    NotConfigured,
    #[error("API key mismatch")]
    Mismatch,
}

/// Header value by name, ignoring case. Non-string values are skipped.
pub fn get_header<'a>(evt: &'a JsonValue, name: &str) -> Option<&'a str> {
    let headers = evt.get("headers")?.as_object()?;
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .and_then(|(_, v)| v.as_str())
}

/// The caller's key: a non-empty `apiKey` field wins over the header.
pub fn provided_api_key(evt: &JsonValue) -> Option<&str> {
    evt.get("apiKey")
        .and_then(|v| v.as_str())
        .filter(|k| !k.is_empty())
        .or_else(|| get_header(evt, API_KEY_HEADER))
        .filter(|k| !k.is_empty())
}

/// Plain string equality against the configured key.
// TODO: switch to a constant-time comparison once callers agree on the behavior change.
pub fn authorize(provided: Option<&str>, expected: Option<&str>) -> Result<(), AuthError> {
    let provided = provided.ok_or(AuthError::Missing)?;
    let expected = expected.ok_or(AuthError::NotConfigured)?;
    if provided != expected {
        return Err(AuthError::Mismatch);
    }
    Ok(())
}
