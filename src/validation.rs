//! Payment-instrument validation: UPI VPA format, card number (Luhn),
//! card network detection, and expiry checks.
//!
//! Everything here is pure. The expiry check depends on the current time, so
//! the clock-taking `validate_expiry_at` is the canonical form and
//! `validate_expiry` is a thin wrapper over `Utc::now()`.

use chrono::{DateTime, Datelike, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

static VPA_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9._-]+@[A-Za-z0-9]+$").expect("valid VPA regex"));

/// Card network families recognized by the simulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardNetwork {
    Visa,
    Mastercard,
    Amex,
    Rupay,
    Unknown,
}

impl CardNetwork {
    pub fn as_str(&self) -> &'static str {
        match self {
            CardNetwork::Visa => "visa",
            CardNetwork::Mastercard => "mastercard",
            CardNetwork::Amex => "amex",
            CardNetwork::Rupay => "rupay",
            CardNetwork::Unknown => "unknown",
        }
    }
}

/// Validates a UPI virtual payment address (`handle@bank`).
pub fn validate_vpa(vpa: &str) -> bool {
    if vpa.is_empty() {
        return false;
    }
    VPA_REGEX.is_match(vpa)
}

/// Strips spaces and hyphens from a card number as entered by a user.
pub fn clean_card_number(number: &str) -> String {
    number.chars().filter(|c| *c != ' ' && *c != '-').collect()
}

/// Validates a card number: 13-19 digits after cleaning, passing the Luhn
/// checksum (double every second digit from the right, subtract 9 if the
/// doubled digit exceeds 9, sum must be divisible by 10).
pub fn validate_card_number(number: &str) -> bool {
    let cleaned = clean_card_number(number);
    if cleaned.len() < 13 || cleaned.len() > 19 || !cleaned.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }

    let mut sum = 0u32;
    let mut double = false;
    for b in cleaned.bytes().rev() {
        let mut digit = u32::from(b - b'0');
        if double {
            digit *= 2;
            if digit > 9 {
                digit -= 9;
            }
        }
        sum += digit;
        double = !double;
    }

    sum % 10 == 0
}

/// Detects the card network from the cleaned number's prefix. Callers run
/// this only after `validate_card_number` has passed.
pub fn detect_network(number: &str) -> CardNetwork {
    let cleaned = clean_card_number(number);
    if cleaned.is_empty() {
        return CardNetwork::Unknown;
    }

    if cleaned.starts_with('4') {
        return CardNetwork::Visa;
    }

    let two_digit: Option<u32> = cleaned.get(0..2).and_then(|p| p.parse().ok());
    match two_digit {
        Some(p) if (51..=55).contains(&p) => CardNetwork::Mastercard,
        Some(34) | Some(37) => CardNetwork::Amex,
        Some(60) | Some(65) => CardNetwork::Rupay,
        Some(p) if (81..=89).contains(&p) => CardNetwork::Rupay,
        _ => CardNetwork::Unknown,
    }
}

/// Validates a card expiry against the supplied clock. Two-digit years are
/// interpreted as `2000 + year`. The pair fails when it is strictly before
/// the current (year, month).
pub fn validate_expiry_at(month: i32, year: i32, now: DateTime<Utc>) -> bool {
    if !(1..=12).contains(&month) {
        return false;
    }

    let year = if (0..100).contains(&year) { year + 2000 } else { year };

    let current_year = now.year();
    let current_month = now.month() as i32;

    if year < current_year {
        return false;
    }
    if year == current_year && month < current_month {
        return false;
    }

    true
}

/// Validates a card expiry against the system clock.
pub fn validate_expiry(month: i32, year: i32) -> bool {
    validate_expiry_at(month, year, Utc::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;
    use test_case::test_case;

    fn fixed_now() -> DateTime<Utc> {
        // 2026-08-15 12:00:00 UTC
        Utc.with_ymd_and_hms(2026, 8, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn vpa_accepts_handle_at_bank() {
        assert!(validate_vpa("user.name@bank"));
        assert!(validate_vpa("a_b-c.d@okaxis"));
    }

    #[test]
    fn vpa_rejects_malformed_input() {
        assert!(!validate_vpa(""));
        assert!(!validate_vpa("bad vpa"));
        assert!(!validate_vpa("no-at-sign"));
        assert!(!validate_vpa("user@"));
        assert!(!validate_vpa("@bank"));
        assert!(!validate_vpa("user@bank.name"));
    }

    #[test]
    fn luhn_accepts_known_valid_numbers() {
        assert!(validate_card_number("4111111111111111"));
        assert!(validate_card_number("5105105105105100"));
        assert!(validate_card_number("340000000000009"));
        assert!(validate_card_number("6521111111111117"));
    }

    #[test]
    fn luhn_accepts_numbers_with_separators() {
        assert!(validate_card_number("4111 1111 1111 1111"));
        assert!(validate_card_number("4111-1111-1111-1111"));
    }

    #[test]
    fn luhn_rejects_wrong_length_or_non_digits() {
        assert!(!validate_card_number(""));
        assert!(!validate_card_number("411111111111")); // 12 digits
        assert!(!validate_card_number("41111111111111111111")); // 20 digits
        assert!(!validate_card_number("4111111111111a11"));
    }

    #[test]
    fn luhn_rejects_every_single_digit_mutation() {
        // The per-digit Luhn contribution map is injective for both weights,
        // so changing any one digit to any other value must break the sum.
        let valid = "4111111111111111";
        for pos in 0..valid.len() {
            let original = valid.as_bytes()[pos];
            for replacement in b'0'..=b'9' {
                if replacement == original {
                    continue;
                }
                let mut mutated = valid.as_bytes().to_vec();
                mutated[pos] = replacement;
                let mutated = String::from_utf8(mutated).unwrap();
                assert!(
                    !validate_card_number(&mutated),
                    "mutation at {} to {} unexpectedly valid: {}",
                    pos,
                    replacement as char,
                    mutated
                );
            }
        }
    }

    proptest! {
        #[test]
        fn luhn_accepts_any_number_with_corrected_check_digit(digits in proptest::collection::vec(0u8..10, 15)) {
            // Build a 16-digit number whose last digit is chosen to satisfy Luhn.
            let mut sum = 0u32;
            for (i, d) in digits.iter().rev().enumerate() {
                let mut v = u32::from(*d);
                // Positions counted from the check digit: these all double.
                if i % 2 == 0 {
                    v *= 2;
                    if v > 9 {
                        v -= 9;
                    }
                }
                sum += v;
            }
            let check = (10 - (sum % 10)) % 10;
            let number: String = digits
                .iter()
                .map(|d| char::from(b'0' + d))
                .chain(std::iter::once(char::from(b'0' + check as u8)))
                .collect();
            prop_assert!(validate_card_number(&number));
        }
    }

    #[test_case("4111111111111111", CardNetwork::Visa; "visa")]
    #[test_case("5105105105105100", CardNetwork::Mastercard; "mastercard")]
    #[test_case("340000000000009", CardNetwork::Amex; "amex 34")]
    #[test_case("370000000000002", CardNetwork::Amex; "amex 37")]
    #[test_case("6011111111111117", CardNetwork::Rupay; "prefix 60")]
    #[test_case("6521111111111117", CardNetwork::Rupay; "prefix 65")]
    #[test_case("8111111111111119", CardNetwork::Rupay; "prefix 81")]
    #[test_case("9999999999999995", CardNetwork::Unknown; "unknown prefix")]
    fn network_detection(number: &str, expected: CardNetwork) {
        assert_eq!(detect_network(number), expected);
    }

    #[test]
    fn expiry_rejects_past_year() {
        assert!(!validate_expiry_at(1, 2025, fixed_now()));
    }

    #[test]
    fn expiry_accepts_current_month() {
        assert!(validate_expiry_at(8, 2026, fixed_now()));
    }

    #[test]
    fn expiry_rejects_earlier_month_of_current_year() {
        assert!(!validate_expiry_at(7, 2026, fixed_now()));
    }

    #[test]
    fn expiry_accepts_future_dates() {
        assert!(validate_expiry_at(1, 2027, fixed_now()));
        assert!(validate_expiry_at(12, 2026, fixed_now()));
    }

    #[test]
    fn expiry_rejects_out_of_range_month() {
        assert!(!validate_expiry_at(0, 2030, fixed_now()));
        assert!(!validate_expiry_at(13, 2026, fixed_now()));
    }

    #[test]
    fn expiry_interprets_two_digit_years() {
        assert!(validate_expiry_at(12, 28, fixed_now())); // 2028
        assert!(!validate_expiry_at(12, 25, fixed_now())); // 2025
    }
}
