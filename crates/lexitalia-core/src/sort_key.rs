//! Sort key normalisation for Italian article numbers.
//!
//! Converts reference tokens (e.g., "3", "3-bis", "615-ter", "2-terdecies")
//! into lexicographically-sortable strings so that ordering by sort key
//! recovers insertion order.
//!
//! # Italian numbering conventions
//!
//! - Plain numeric: art. 1, art. 2, ..., art. 10
//! - Latin ordinal suffix (amendment insertion): art. 3-bis between art. 3 and art. 4
//! - Suffixes follow the ordinal sequence, not the alphabet: bis < ter < quater < quinquies
//! - Long insertion runs continue past decies: undecies, duodecies, terdecies, ...

use crate::model::suffix_rank;

/// Normalise an article token into a lexicographically-sortable string.
///
/// Input: token like "3", "3-bis", "615 ter", "2-terdecies"
/// Output: "00003.00", "00003.01", "00615.02", "00002.12"
///
/// # Algorithm
///
/// 1. Extract leading ASCII digits → base number (zero-padded to 5 digits)
/// 2. Strip separators and look the remainder up in the ordinal vocabulary
/// 3. Suffix rank (bis=01, ter=02, ...) becomes the second segment; unknown
///    suffixes sort after every known one (99)
pub fn normalize_article(s: &str) -> String {
    let s = s.trim();
    if s.is_empty() {
        return "00000.00".to_string();
    }

    let lower = s.to_ascii_lowercase();
    let lower = lower.strip_prefix("art").unwrap_or(&lower);
    let lower = lower.trim_start_matches(['.', ' ']);

    let digit_end = lower
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(lower.len());
    let base: u32 = lower[..digit_end].parse().unwrap_or(0);

    let rest = lower[digit_end..].trim_matches(['-', ' ', '.']);
    let rank = if rest.is_empty() {
        0
    } else {
        suffix_rank(rest).unwrap_or(99)
    };

    format!("{:05}.{:02}", base, rank)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Helper: assert a list of inputs produces sort keys in strictly ascending order.
    fn assert_sorted_order(inputs: &[&str]) {
        let keys: Vec<String> = inputs.iter().map(|s| normalize_article(s)).collect();
        for i in 1..keys.len() {
            assert!(
                keys[i - 1] < keys[i],
                "Expected {:?} ({}) < {:?} ({}), got {:?} >= {:?}",
                inputs[i - 1],
                keys[i - 1],
                inputs[i],
                keys[i],
                keys[i - 1],
                keys[i],
            );
        }
    }

    #[test]
    fn plain_numeric_sequence() {
        assert_sorted_order(&["1", "2", "3", "4", "5", "10", "11", "100"]);
    }

    #[test]
    fn ordinal_insertion() {
        assert_sorted_order(&["3", "3-bis", "3-ter", "3-quater", "3-quinquies", "4"]);
    }

    #[test]
    fn ordinal_not_alphabetical() {
        // Alphabetically "quater" < "ter"; ordinally ter comes first.
        assert_sorted_order(&["7-bis", "7-ter", "7-quater", "7-decies", "7-undecies"]);
    }

    #[test]
    fn codice_penale_real_world() {
        assert_sorted_order(&["615", "615-bis", "615-ter", "615-quater", "615-quinquies", "616"]);
    }

    #[test]
    fn exact_values() {
        assert_eq!(normalize_article("3"), "00003.00");
        assert_eq!(normalize_article("3-bis"), "00003.01");
        assert_eq!(normalize_article("615-ter"), "00615.02");
        assert_eq!(normalize_article("2-terdecies"), "00002.12");
        assert_eq!(normalize_article("art2-bis"), "00002.01");
    }

    #[test]
    fn unknown_suffix_sorts_last() {
        assert_eq!(normalize_article("9-zzz"), "00009.99");
        assert_sorted_order(&["9-vicies", "9-zzz", "10"]);
    }

    #[test]
    fn empty_string() {
        assert_eq!(normalize_article(""), "00000.00");
    }

    #[test]
    fn separators_and_case_normalised() {
        assert_eq!(normalize_article("3 BIS"), normalize_article("3-bis"));
        assert_eq!(normalize_article("3bis"), normalize_article("3-bis"));
        assert_eq!(normalize_article("  3-bis  "), normalize_article("3-bis"));
    }
}
