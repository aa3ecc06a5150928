//! Number and text formatting utilities.
//!
//! This module provides common formatting functions used across commands
//! for consistent output presentation.

/// Formats a number with comma separators for thousands.
///
/// # Examples
///
/// ```
/// use ratkiez::utils::format::format_number;
///
/// assert_eq!(format_number(1234), "1,234");
/// assert_eq!(format_number(1234567), "1,234,567");
/// assert_eq!(format_number(42), "42");
/// ```
pub fn format_number(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}

/// Joins policy names for a single output cell.
///
/// ```
/// use ratkiez::utils::format::join_policies;
///
/// let policies = vec!["ReadOnlyAccess".to_string(), "Billing".to_string()];
/// assert_eq!(join_policies(&policies, "; "), "ReadOnlyAccess; Billing");
/// assert_eq!(join_policies(&[], ", "), "");
/// ```
pub fn join_policies(policies: &[String], separator: &str) -> String {
    policies.join(separator)
}

/// Pluralizes `word` for `count`, e.g. `1 profile` / `3 profiles`.
pub fn plural(count: usize, word: &str) -> String {
    if count == 1 {
        format!("{} {}", format_number(count), word)
    } else {
        format!("{} {}s", format_number(count), word)
    }
}
