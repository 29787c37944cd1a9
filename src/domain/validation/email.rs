use regex::Regex;
use std::sync::LazyLock;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9_.+-]+@[a-zA-Z0-9-]+\.[a-zA-Z0-9.-]+$").expect("valid email regex")
});

/// Returns `true` when the whole string has the shape `local@domain.tld`.
///
/// No normalization is applied; surrounding whitespace makes the input invalid.
pub fn validate_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_plain_and_tagged_addresses() {
        assert!(validate_email("a@b.com"));
        assert!(validate_email("a.b+c@example.co"));
        assert!(validate_email("first_last-1@mail-server.example.org"));
    }

    #[test]
    fn test_rejects_missing_parts() {
        assert!(!validate_email("not-an-email"));
        assert!(!validate_email("user@localhost"));
        assert!(!validate_email("@example.com"));
        assert!(!validate_email("user@.com"));
        assert!(!validate_email(""));
    }

    #[test]
    fn test_match_is_anchored() {
        assert!(!validate_email(" a@b.com"));
        assert!(!validate_email("a@b.com "));
        assert!(!validate_email("a@b.com\n"));
        assert!(!validate_email("two words@b.com"));
    }
}
