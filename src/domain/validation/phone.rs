const PHONE_DIGITS: usize = 10;

/// Accepts exactly ten ASCII digits and nothing else.
pub fn validate_phone(phone: &str) -> bool {
    phone.len() == PHONE_DIGITS && phone.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_ten_digits() {
        assert!(validate_phone("1234567890"));
        assert!(validate_phone("0000000000"));
    }

    #[test]
    fn test_rejects_formatting_and_wrong_length() {
        assert!(!validate_phone("123-456-7890"));
        assert!(!validate_phone("12345"));
        assert!(!validate_phone("12345678901"));
        assert!(!validate_phone("+1234567890"));
        assert!(!validate_phone("123 4567890"));
        assert!(!validate_phone("abc"));
        assert!(!validate_phone(""));
    }

    #[test]
    fn test_rejects_non_ascii_digits() {
        // Arabic-Indic digits are numeric but not ASCII.
        assert!(!validate_phone("١٢٣٤٥٦٧٨٩٠"));
    }
}
