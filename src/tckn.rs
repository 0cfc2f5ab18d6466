//! Turkish national identity number (TCKN) validation and masking.
//!
//! A TCKN is 11 ASCII digits, never starting with `0`. The 10th digit is
//! `(7 * (d1 + d3 + d5 + d7 + d9) - (d2 + d4 + d6 + d8)) mod 10` and the
//! 11th is the sum of the first ten digits mod 10 (1-based positions).

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const TCKN_LENGTH: usize = 11;

/// Number of trailing characters left visible by [`mask_tckn`]
const VISIBLE_SUFFIX: usize = 2;

/// Reason a TCKN was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TcknError {
    #[error("TCKN is empty")]
    Empty,
    #[error("TCKN must be exactly 11 characters, got {0}")]
    Length(usize),
    #[error("TCKN must contain only digits")]
    NonDigit,
    #[error("TCKN cannot start with 0")]
    LeadingZero,
    #[error("TCKN checksum digits do not match")]
    Checksum,
}

/// Check structure and both checksum digits, reporting the first failed rule
pub fn check_tckn(value: &str) -> Result<(), TcknError> {
    if value.is_empty() {
        return Err(TcknError::Empty);
    }
    let length = value.chars().count();
    if length != TCKN_LENGTH {
        return Err(TcknError::Length(length));
    }
    if !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(TcknError::NonDigit);
    }

    let digits: Vec<i32> = value.bytes().map(|b| i32::from(b - b'0')).collect();
    if digits[0] == 0 {
        return Err(TcknError::LeadingZero);
    }

    let odd_sum = digits[0] + digits[2] + digits[4] + digits[6] + digits[8];
    let even_sum = digits[1] + digits[3] + digits[5] + digits[7];
    let check10 = (odd_sum * 7 - even_sum).rem_euclid(10);
    let check11 = digits[..10].iter().sum::<i32>() % 10;

    if digits[9] == check10 && digits[10] == check11 {
        Ok(())
    } else {
        Err(TcknError::Checksum)
    }
}

/// Whether `value` is a valid TCKN. Absent and empty input is invalid.
pub fn is_valid_tckn(value: Option<&str>) -> bool {
    value.is_some_and(|v| check_tckn(v).is_ok())
}

/// Mask all but the last two characters with `*`.
///
/// Does not validate; absent input masks to an empty string and inputs of
/// two characters or fewer come back unchanged.
pub fn mask_tckn(value: Option<&str>) -> String {
    let Some(value) = value else {
        return String::new();
    };

    let length = value.chars().count();
    if length <= VISIBLE_SUFFIX {
        return value.to_string();
    }

    let hidden = length - VISIBLE_SUFFIX;
    value
        .chars()
        .enumerate()
        .map(|(index, c)| if index < hidden { '*' } else { c })
        .collect()
}

/// A validated TCKN.
///
/// `Display` prints the masked form so the number does not leak into logs;
/// use [`Tckn::as_str`] for the raw digits.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Tckn(String);

impl Tckn {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn masked(&self) -> String {
        mask_tckn(Some(&self.0))
    }
}

impl FromStr for Tckn {
    type Err = TcknError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        check_tckn(trimmed)?;
        Ok(Tckn(trimmed.to_string()))
    }
}

impl TryFrom<String> for Tckn {
    type Error = TcknError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for Tckn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.masked())
    }
}

impl fmt::Debug for Tckn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Tckn").field(&self.masked()).finish()
    }
}

impl Serialize for Tckn {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Tckn {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    // Checksums computed by hand from the formula
    const VALID: &str = "10000000146";
    const VALID_2: &str = "12345678950";

    /// Append both checksum digits to a 9-digit prefix
    fn with_checksums(prefix: &[u8; 9]) -> String {
        let d: Vec<i32> = prefix.iter().map(|&b| i32::from(b)).collect();
        let odd = d[0] + d[2] + d[4] + d[6] + d[8];
        let even = d[1] + d[3] + d[5] + d[7];
        let c10 = (odd * 7 - even).rem_euclid(10);
        let c11 = (d.iter().sum::<i32>() + c10) % 10;
        let mut s: String = d.iter().map(|x| x.to_string()).collect();
        s.push_str(&c10.to_string());
        s.push_str(&c11.to_string());
        s
    }

    // ==================== Validation Tests ====================

    #[test]
    fn test_known_valid_numbers() {
        assert!(is_valid_tckn(Some(VALID)));
        assert!(is_valid_tckn(Some(VALID_2)));
    }

    #[test]
    fn test_structural_rejects() {
        assert!(!is_valid_tckn(None));
        assert!(!is_valid_tckn(Some("")));
        assert!(!is_valid_tckn(Some("123")));
        assert!(!is_valid_tckn(Some("01234567890")));
        assert!(!is_valid_tckn(Some("1234567895a")));
        assert!(!is_valid_tckn(Some("123456789500")));
    }

    #[test]
    fn test_check_reports_rule() {
        assert_eq!(check_tckn(""), Err(TcknError::Empty));
        assert_eq!(check_tckn("123"), Err(TcknError::Length(3)));
        assert_eq!(check_tckn("1234567890x"), Err(TcknError::NonDigit));
        assert_eq!(check_tckn("01234567890"), Err(TcknError::LeadingZero));
        assert_eq!(check_tckn("12345678951"), Err(TcknError::Checksum));
    }

    #[test]
    fn test_negative_intermediate_is_normalized() {
        // odd sum 1, even sum 36: 7 - 36 = -29, which must map to 1, not -9
        let number = with_checksums(&[1, 9, 0, 9, 0, 9, 0, 9, 0]);
        assert_eq!(&number[9..10], "1");
        assert!(is_valid_tckn(Some(&number)));
    }

    #[test]
    fn test_non_ascii_digits_rejected() {
        // Arabic-Indic digits are numeric but not ASCII
        assert!(!is_valid_tckn(Some("١٢٣٤٥٦٧٨٩٥٠")));
    }

    // ==================== Masking Tests ====================

    #[test]
    fn test_mask_full_number() {
        assert_eq!(mask_tckn(Some("12345678901")), "*********01");
    }

    #[test]
    fn test_mask_short_inputs() {
        assert_eq!(mask_tckn(Some("12")), "12");
        assert_eq!(mask_tckn(Some("1")), "1");
        assert_eq!(mask_tckn(Some("")), "");
        assert_eq!(mask_tckn(None), "");
    }

    #[test]
    fn test_length_counts_characters() {
        assert_eq!(check_tckn("1234567890ç"), Err(TcknError::NonDigit));
        assert_eq!(check_tckn("1234567890çç"), Err(TcknError::Length(12)));
    }

    #[test]
    fn test_mask_does_not_validate() {
        assert_eq!(mask_tckn(Some("abc")), "*bc");
    }

    #[test]
    fn test_mask_counts_characters() {
        assert_eq!(mask_tckn(Some("çğüş")), "**üş");
    }

    // ==================== Newtype Tests ====================

    #[test]
    fn test_tckn_parse_and_display() {
        let tckn: Tckn = VALID.parse().expect("valid");
        assert_eq!(tckn.as_str(), VALID);
        assert_eq!(tckn.to_string(), "*********46");
        assert!(!format!("{:?}", tckn).contains(VALID));
    }

    #[test]
    fn test_tckn_parse_trims() {
        let tckn: Tckn = format!("  {}\n", VALID).parse().expect("valid");
        assert_eq!(tckn.as_str(), VALID);
    }

    #[test]
    fn test_tckn_serde() {
        let tckn = Tckn::try_from(VALID_2.to_string()).expect("valid");
        let json = serde_json::to_string(&tckn).expect("serialize");
        assert_eq!(json, format!("\"{}\"", VALID_2));

        let back: Tckn = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, tckn);

        let bad = serde_json::from_str::<Tckn>("\"12345678951\"");
        assert!(bad.is_err());
    }

    // ==================== Property Tests ====================

    proptest! {
        #[test]
        fn prop_generated_numbers_are_valid(
            first in 1u8..=9,
            rest in proptest::array::uniform8(0u8..=9),
        ) {
            let mut prefix = [0u8; 9];
            prefix[0] = first;
            prefix[1..].copy_from_slice(&rest);
            let number = with_checksums(&prefix);
            prop_assert!(is_valid_tckn(Some(&number)));
        }

        #[test]
        fn prop_single_digit_corruption_in_check_digits_is_detected(
            first in 1u8..=9,
            rest in proptest::array::uniform8(0u8..=9),
            position in 9usize..11,
            delta in 1u8..=9,
        ) {
            let mut prefix = [0u8; 9];
            prefix[0] = first;
            prefix[1..].copy_from_slice(&rest);
            let mut bytes = with_checksums(&prefix).into_bytes();
            let digit = bytes[position] - b'0';
            bytes[position] = b'0' + (digit + delta) % 10;
            let corrupted = String::from_utf8(bytes).unwrap();
            prop_assert!(!is_valid_tckn(Some(&corrupted)));
        }

        #[test]
        fn prop_single_digit_corruption_in_payload_is_detected(
            first in 1u8..=9,
            rest in proptest::array::uniform8(0u8..=9),
            position in 0usize..9,
            delta in 1u8..=9,
        ) {
            let mut prefix = [0u8; 9];
            prefix[0] = first;
            prefix[1..].copy_from_slice(&rest);
            let mut bytes = with_checksums(&prefix).into_bytes();
            let digit = bytes[position] - b'0';
            bytes[position] = b'0' + (digit + delta) % 10;
            let corrupted = String::from_utf8(bytes).unwrap();
            prop_assert!(!is_valid_tckn(Some(&corrupted)));
        }

        #[test]
        fn prop_mask_preserves_length_and_suffix(value in "[0-9a-z]{3,20}") {
            let masked = mask_tckn(Some(&value));
            prop_assert_eq!(masked.len(), value.len());
            prop_assert_eq!(&masked[masked.len() - 2..], &value[value.len() - 2..]);
            prop_assert!(masked[..masked.len() - 2].chars().all(|c| c == '*'));
        }
    }
}
