//! OCR output filtering.

/// Length of every captcha the portal issues.
pub const CANDIDATE_LEN: usize = 4;

/// Whether OCR output is worth submitting.
///
/// Only filters obvious garbage. A well-formed candidate can still be the
/// wrong answer; only the portal knows.
pub fn is_valid_candidate(text: &str) -> bool {
    text.chars().count() == CANDIDATE_LEN && text.chars().all(char::is_alphanumeric)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_four_alphanumerics() {
        for text in ["ab3d", "0000", "zzzz", "a1b2", "9x9x"] {
            assert!(is_valid_candidate(text), "{text:?} should be accepted");
        }
    }

    #[test]
    fn test_rejects_wrong_length() {
        for text in ["", "a", "ab3", "ab3de", "abcdefgh"] {
            assert!(!is_valid_candidate(text), "{text:?} should be rejected");
        }
    }

    #[test]
    fn test_rejects_non_alphanumeric() {
        for text in ["ab d", "ab-d", "ab3.", "a\nbc", "ab3\t", "____"] {
            assert!(!is_valid_candidate(text), "{text:?} should be rejected");
        }
    }

    #[test]
    fn test_counts_characters_not_bytes() {
        // Four chars, more than four bytes
        assert!(is_valid_candidate("ñab3"));
        // Four bytes, two chars
        assert!(!is_valid_candidate("ññ"));
    }
}
