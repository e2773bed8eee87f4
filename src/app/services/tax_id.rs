//! CNPJ normalization, checksum validation and display formatting
//!
//! Registry files carry the tax identifier in many shapes: formatted
//! (`11.222.333/0001-81`), digits only, or with leading zeros lost. Everything
//! downstream works on the fixed 14-digit form produced by [`normalize`].

use crate::constants::TAX_ID_LEN;

/// Weights for the check digits, applied from the rightmost preceding digit
const WEIGHTS: [u32; 8] = [2, 3, 4, 5, 6, 7, 8, 9];

/// Normalize a raw CNPJ to exactly 14 digits
///
/// Non-digit characters are dropped. An empty result stays empty; shorter
/// results are left-padded with `0`, longer ones keep their first 14 digits.
pub fn normalize(raw: &str) -> String {
    let digits: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit())
        .take(TAX_ID_LEN)
        .collect();

    if digits.is_empty() {
        return digits;
    }

    format!("{:0>width$}", digits, width = TAX_ID_LEN)
}

/// Check a normalized CNPJ against both modulo-11 check digits
///
/// Identifiers made of a single repeated digit are rejected even though
/// they satisfy the checksum.
pub fn is_valid(id: &str) -> bool {
    if id.len() != TAX_ID_LEN || !id.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }

    let digits: Vec<u32> = id.bytes().map(|b| u32::from(b - b'0')).collect();

    if digits.iter().all(|&d| d == digits[0]) {
        return false;
    }

    let first = check_digit(&digits[..12]);
    let second = check_digit(&digits[..13]);

    digits[12] == first && digits[13] == second
}

/// Format a 14-digit CNPJ as `XX.XXX.XXX/XXXX-XX`
///
/// Any other input is returned unchanged.
pub fn format(id: &str) -> String {
    if id.len() != TAX_ID_LEN || !id.is_ascii() {
        return id.to_string();
    }

    format!(
        "{}.{}.{}/{}-{}",
        &id[0..2],
        &id[2..5],
        &id[5..8],
        &id[8..12],
        &id[12..14]
    )
}

fn check_digit(preceding: &[u32]) -> u32 {
    let sum: u32 = preceding
        .iter()
        .rev()
        .zip(WEIGHTS.iter().cycle())
        .map(|(digit, weight)| digit * weight)
        .sum();

    match sum % 11 {
        remainder if remainder < 2 => 0,
        remainder => 11 - remainder,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_IDS: &[&str] = &["11222333000181", "11444777000161", "00000000000191"];

    #[test]
    fn test_normalize_strips_formatting() {
        assert_eq!(normalize("11.222.333/0001-81"), "11222333000181");
        assert_eq!(normalize(" 11 222 333 0001 81 "), "11222333000181");
    }

    #[test]
    fn test_normalize_pads_and_truncates() {
        assert_eq!(normalize("191"), "00000000000191");
        assert_eq!(normalize("1122233300018199"), "11222333000181");
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("abc/-."), "");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let inputs = [
            "",
            "1",
            "11.222.333/0001-81",
            "123456789012345678",
            "x9y8z7",
            "00000000000000",
        ];

        for input in inputs {
            let once = normalize(input);
            assert_eq!(normalize(&once), once, "input {:?}", input);
            assert!(once.is_empty() || once.len() == TAX_ID_LEN);
            assert!(once.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_known_valid_ids() {
        for id in VALID_IDS {
            assert!(is_valid(id), "{} should be valid", id);
        }
    }

    #[test]
    fn test_check_digit_mutations_invalidate() {
        for id in VALID_IDS {
            for position in [12, 13] {
                let original = id.as_bytes()[position];
                for replacement in b'0'..=b'9' {
                    if replacement == original {
                        continue;
                    }
                    let mut mutated = id.as_bytes().to_vec();
                    mutated[position] = replacement;
                    let mutated = String::from_utf8(mutated).unwrap();
                    assert!(!is_valid(&mutated), "{} should be invalid", mutated);
                }
            }
        }
    }

    #[test]
    fn test_repeated_digits_rejected() {
        for digit in '0'..='9' {
            let id: String = std::iter::repeat(digit).take(TAX_ID_LEN).collect();
            assert!(!is_valid(&id));
        }
    }

    #[test]
    fn test_wrong_shape_rejected() {
        assert!(!is_valid(""));
        assert!(!is_valid("1122233300018"));
        assert!(!is_valid("11.222.333/0001-81"));
        assert!(!is_valid("1122233300018a"));
    }

    #[test]
    fn test_format() {
        assert_eq!(format("11222333000181"), "11.222.333/0001-81");
        assert_eq!(format("123"), "123");
        assert_eq!(format(""), "");
    }
}
