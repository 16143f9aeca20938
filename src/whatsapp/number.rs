//! Destination Number Normalization
//!
//! Turns whatever the operator typed into the canonical `91…` identifier
//! the backend expects. Total function: every input maps to some number.

use std::fmt;

/// Country code every normalized number starts with.
pub const COUNTRY_CODE: &str = "91";

/// A digits-only destination identifier beginning with [`COUNTRY_CODE`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedNumber(String);

impl NormalizedNumber {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for NormalizedNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NormalizedNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Normalize raw operator input into a [`NormalizedNumber`].
///
/// 1. keep only ASCII digits
/// 2. a leading trunk `0` is replaced by the country code
/// 3. anything not already starting with the country code gets it prepended
///
/// A `91` appearing later in the number is not deduplicated, so
/// `"5591…"` becomes `"915591…"`.
pub fn normalize(input: &str) -> NormalizedNumber {
    let mut digits: String = input.chars().filter(char::is_ascii_digit).collect();

    if let Some(rest) = digits.strip_prefix('0') {
        digits = format!("{COUNTRY_CODE}{rest}");
    }
    if !digits.starts_with(COUNTRY_CODE) {
        digits.insert_str(0, COUNTRY_CODE);
    }

    NormalizedNumber(digits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case("9876543210", "919876543210")]
    #[case("09876543210", "919876543210")]
    #[case("919876543210", "919876543210")]
    #[case("", "91")]
    #[case("+91 98765-43210", "919876543210")]
    #[case("  (098) 765 43210 ", "919876543210")]
    #[case("0", "91")]
    #[case("abc", "91")]
    fn test_normalize(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(normalize(input).as_str(), expected);
    }

    #[test]
    fn test_embedded_country_code_is_not_deduplicated() {
        assert_eq!(normalize("5591234567").as_str(), "915591234567");
    }

    #[test]
    fn test_only_one_leading_zero_is_replaced() {
        // "00…" loses the first zero, then "910…" already has the prefix
        assert_eq!(normalize("0012345678").as_str(), "91012345678");
    }

    #[test]
    fn test_non_ascii_digits_are_stripped() {
        assert_eq!(normalize("٩٨٧6543210").as_str(), "916543210");
    }

    proptest! {
        #[test]
        fn prop_normalize_is_idempotent(input in ".*") {
            let once = normalize(&input);
            let twice = normalize(once.as_str());
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn prop_output_is_prefixed_digits(input in ".*") {
            let n = normalize(&input);
            prop_assert!(n.as_str().starts_with(COUNTRY_CODE));
            prop_assert!(n.as_str().chars().all(|c| c.is_ascii_digit()));
        }
    }
}
