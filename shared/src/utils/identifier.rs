//! Identifier classification and masking
//!
//! Users sign in with whatever they type into a single "email or phone" field.
//! These helpers decide which kind of identifier it is and produce the masked
//! form that is safe to show on screen or write to logs.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::phone::{
    is_valid_phone, looks_like_phone_input, mask_phone_number, normalize_phone_number,
};

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}$").expect("email regex is valid")
});

/// Kind of identifier entered by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentifierKind {
    Email,
    Phone,
    Unknown,
}

impl std::fmt::Display for IdentifierKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IdentifierKind::Email => write!(f, "email"),
            IdentifierKind::Phone => write!(f, "phone"),
            IdentifierKind::Unknown => write!(f, "unknown"),
        }
    }
}

/// Classify a raw identifier as email, phone or unknown. Pure, no I/O.
pub fn classify_identifier(raw: &str) -> IdentifierKind {
    let value = raw.trim();
    if value.is_empty() {
        return IdentifierKind::Unknown;
    }
    if value.contains('@') {
        return if EMAIL_REGEX.is_match(value) {
            IdentifierKind::Email
        } else {
            IdentifierKind::Unknown
        };
    }
    if looks_like_phone_input(value) && is_valid_phone(value) {
        return IdentifierKind::Phone;
    }
    IdentifierKind::Unknown
}

/// Canonical form used when talking to delivery gateways and verifiers
pub fn normalize_identifier(raw: &str) -> String {
    match classify_identifier(raw) {
        IdentifierKind::Email => raw.trim().to_lowercase(),
        IdentifierKind::Phone => normalize_phone_number(raw),
        IdentifierKind::Unknown => raw.trim().to_string(),
    }
}

/// Mask an email address for display (e.g., j***@example.com)
pub fn mask_email(email: &str) -> String {
    match email.trim().split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => {
            let first = local.chars().next().map(String::from).unwrap_or_default();
            format!("{}***@{}", first, domain)
        }
        _ => "****".to_string(),
    }
}

/// Mask any identifier according to its kind
pub fn mask_identifier(raw: &str) -> String {
    match classify_identifier(raw) {
        IdentifierKind::Email => mask_email(raw),
        IdentifierKind::Phone => mask_phone_number(raw),
        IdentifierKind::Unknown => "****".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_email() {
        assert_eq!(classify_identifier("jane.doe@example.com"), IdentifierKind::Email);
        assert_eq!(classify_identifier("  Jane+ops@Example.co.ug "), IdentifierKind::Email);
        assert_eq!(classify_identifier("jane@localhost"), IdentifierKind::Unknown);
        assert_eq!(classify_identifier("@example.com"), IdentifierKind::Unknown);
    }

    #[test]
    fn test_classify_phone() {
        assert_eq!(classify_identifier("+256 772 123456"), IdentifierKind::Phone);
        assert_eq!(classify_identifier("(415) 555-2671"), IdentifierKind::Phone);
        assert_eq!(classify_identifier("12345"), IdentifierKind::Unknown);
        assert_eq!(classify_identifier("call-me-maybe"), IdentifierKind::Unknown);
    }

    #[test]
    fn test_classify_unknown() {
        assert_eq!(classify_identifier(""), IdentifierKind::Unknown);
        assert_eq!(classify_identifier("   "), IdentifierKind::Unknown);
        assert_eq!(classify_identifier("janedoe"), IdentifierKind::Unknown);
    }

    #[test]
    fn test_normalize_identifier() {
        assert_eq!(normalize_identifier(" Jane@Example.com "), "jane@example.com");
        assert_eq!(normalize_identifier("+256 772-123-456"), "+256772123456");
        assert_eq!(normalize_identifier(" janedoe "), "janedoe");
    }

    #[test]
    fn test_masking() {
        assert_eq!(mask_email("jane@example.com"), "j***@example.com");
        assert_eq!(mask_email("broken"), "****");
        assert_eq!(mask_identifier("+256772123456"), "+25****3456");
        assert_eq!(mask_identifier("jane@example.com"), "j***@example.com");
        assert_eq!(mask_identifier("janedoe"), "****");
    }
}
