//! Input validation and small text helpers.
//!
//! These are pure functions with no I/O, shared by sign-up, journal saving
//! and the CLI.

use crate::constants::MIN_PASSWORD_LENGTH;

/// Whether a string is empty or whitespace only.
pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Whether any of the given strings is blank. An empty slice counts as blank.
pub fn any_blank(values: &[&str]) -> bool {
    values.is_empty() || values.iter().any(|v| is_blank(v))
}

/// Loose structural email check: one `@`, a non-empty local part, and a
/// dotted domain with no empty labels. No whitespace anywhere.
pub fn is_valid_email(email: &str) -> bool {
    if is_blank(email) || email.chars().any(char::is_whitespace) {
        return false;
    }

    let mut parts = email.split('@');
    let (local, domain) = match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => (local, domain),
        _ => return false,
    };

    !local.is_empty() && domain.contains('.') && domain.split('.').all(|label| !label.is_empty())
}

/// Account password rule: at least six characters with at least one
/// letter, one digit and one symbol.
pub fn is_valid_password(password: &str) -> bool {
    if is_blank(password) || password.chars().count() < MIN_PASSWORD_LENGTH {
        return false;
    }

    let has_letter = password.chars().any(|c| c.is_ascii_alphabetic());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_symbol = password.chars().any(|c| !c.is_ascii_alphanumeric());

    has_letter && has_digit && has_symbol
}

/// Counts whitespace-separated words.
pub fn word_count(content: &str) -> u32 {
    content.split_whitespace().count() as u32
}

/// Upper-cased first letter of each whitespace-separated name part.
pub fn initials(full_name: &str) -> String {
    full_name
        .split_whitespace()
        .filter_map(|part| part.chars().next())
        .flat_map(char::to_uppercase)
        .collect()
}
