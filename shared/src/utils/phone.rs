//! Phone number utilities

use once_cell::sync::Lazy;
use regex::Regex;

// International phone number regex (E.164 format, optional leading +)
static INTERNATIONAL_PHONE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\+?[1-9]\d{6,14}$").expect("phone regex is valid")
});

// Characters a user may type while entering a phone number
static PHONE_INPUT_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[\d\s\-+().]+$").expect("phone input regex is valid")
});

/// Normalize a phone number by removing common formatting characters
pub fn normalize_phone_number(phone: &str) -> String {
    phone
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect()
}

/// Check if raw input looks like a phone number (only digits and formatting)
pub fn looks_like_phone_input(raw: &str) -> bool {
    PHONE_INPUT_REGEX.is_match(raw.trim())
}

/// Check if a phone number is valid (international format, `+` optional)
pub fn is_valid_phone(phone: &str) -> bool {
    let normalized = normalize_phone_number(phone);
    INTERNATIONAL_PHONE_REGEX.is_match(&normalized)
}

/// Mask a phone number for display (e.g., +86****5678)
pub fn mask_phone_number(phone: &str) -> String {
    let normalized = normalize_phone_number(phone);
    if normalized.len() >= 7 {
        format!(
            "{}****{}",
            &normalized[0..3],
            &normalized[normalized.len() - 4..]
        )
    } else {
        "****".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_phone_number() {
        assert_eq!(normalize_phone_number("138-1234-5678"), "13812345678");
        assert_eq!(normalize_phone_number("+86 138 1234 5678"), "+8613812345678");
        assert_eq!(normalize_phone_number("(415) 555.2671"), "4155552671");
    }

    #[test]
    fn test_is_valid_phone() {
        assert!(is_valid_phone("+8613812345678"));
        assert!(is_valid_phone("+1 (415) 555-2671"));
        assert!(is_valid_phone("256772123456"));
        assert!(!is_valid_phone("+0123456789")); // Invalid country code
        assert!(!is_valid_phone("12345")); // Too short
        assert!(!is_valid_phone("+1234567890123456")); // Too long
    }

    #[test]
    fn test_looks_like_phone_input() {
        assert!(looks_like_phone_input(" +256 (772) 123-456 "));
        assert!(!looks_like_phone_input("abc1234567"));
        assert!(!looks_like_phone_input("user@example.com"));
    }

    #[test]
    fn test_mask_phone_number() {
        assert_eq!(mask_phone_number("13812345678"), "138****5678");
        assert_eq!(mask_phone_number("+8613812345678"), "+86****5678");
        assert_eq!(mask_phone_number("12345"), "****");
    }
}
