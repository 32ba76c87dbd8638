//! Ordering for printed page labels.

use std::cmp::Ordering;

/// Compare two page labels, numerically when possible.
///
/// When both labels fully parse as non-negative integers they are compared as
/// numbers, so `"2"` sorts before `"10"`. Otherwise they compare as ordinary
/// strings. A set that mixes numeric and non-numeric labels therefore has no
/// guaranteed total order across the mix; page labels in practice are either
/// all numbers or all names, and sorts using this comparator are stable.
pub fn compare(a: &str, b: &str) -> Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(lhs), Ok(rhs)) => lhs.cmp(&rhs),
        _ => a.cmp(b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_labels_compare_as_numbers() {
        assert_eq!(compare("2", "10"), Ordering::Less);
        assert_eq!(compare("10", "2"), Ordering::Greater);
        assert_eq!(compare("3", "3"), Ordering::Equal);
    }

    #[test]
    fn non_numeric_labels_compare_as_strings() {
        assert_eq!(compare("b", "a"), Ordering::Greater);
        assert_eq!(compare("alpha", "beta"), Ordering::Less);
    }

    #[test]
    fn mixed_labels_fall_back_to_string_order() {
        // "2" < "a" lexicographically; the numeric parse of one side alone
        // does not change the rule.
        assert_eq!(compare("2", "a"), Ordering::Less);
        assert_eq!(compare("a", "2"), Ordering::Greater);
    }

    #[test]
    fn negative_numbers_are_not_numeric_labels() {
        assert_eq!(compare("-2", "-10"), "-2".cmp("-10"));
    }
}
