use regex::Regex;
use std::sync::OnceLock;

use crate::config::OTP_LENGTH;

fn email_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"^\S+@\S+\.\S+$").expect("Regex should compile"))
}

fn otp_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(&format!(r"^\d{{{}}}$", OTP_LENGTH)).expect("Regex should compile")
    })
}

pub fn is_email_shaped(email: &str) -> bool {
    email_regex().is_match(email)
}

pub fn is_otp_shaped(code: &str) -> bool {
    otp_regex().is_match(code)
}

/// Pull a human-readable message out of an error body.
///
/// Looks at `message` first, then `error`. Anything that is not a JSON
/// object with a non-empty string there yields `None`.
pub fn extract_message(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    ["message", "error"]
        .iter()
        .filter_map(|key| value.get(key).and_then(|v| v.as_str()))
        .map(str::trim)
        .find(|msg| !msg.is_empty())
        .map(str::to_string)
}

/// Drop blank lines in front of the first real character.
pub fn strip_leading_newlines(content: &str) -> &str {
    content.trim_start_matches(&['\n', '\r'][..])
}
