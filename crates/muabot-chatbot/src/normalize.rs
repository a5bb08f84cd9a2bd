// SPDX-FileCopyrightText: 2026 Muabot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Input normalization for the sales flow.
//!
//! Token matching is a case-insensitive substring test against curated lists,
//! not tokenization. Phone and name normalization follow Vietnamese
//! conventions: `+84`/`84` prefixes collapse to `0`, names are title-cased
//! per whitespace-separated word.

use std::sync::LazyLock;

use regex::Regex;

/// Tokens that start the sales flow from `idle`.
pub const TRIGGER_TOKENS: &[&str] = &["mua", "order", "buy", "menu", "đặt hàng"];

/// Tokens that confirm the order in `confirm_order`.
pub const CONFIRM_TOKENS: &[&str] = &["có", "yes", "ok", "đồng ý", "xác nhận"];

/// Tokens that cancel back to product selection in `confirm_order`.
pub const CANCEL_TOKENS: &[&str] = &["không", "no", "hủy", "cancel"];

/// Vietnamese mobile number after normalization: `0` plus 9 or 10 digits.
static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^0\d{9,10}$").unwrap());

/// Case-insensitive substring test against a token list.
pub fn matches_any(input: &str, tokens: &[&str]) -> bool {
    let lowered = input.trim().to_lowercase();
    tokens.iter().any(|token| lowered.contains(token))
}

/// Normalize a customer name: trim, then title-case each whitespace-separated
/// word. Inner whitespace is preserved as typed.
///
/// Returns `None` when the trimmed input is shorter than 2 characters.
pub fn normalize_name(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.chars().count() < 2 {
        return None;
    }

    let mut normalized = String::with_capacity(trimmed.len());
    let mut at_word_start = true;
    for ch in trimmed.chars() {
        if ch.is_whitespace() {
            normalized.push(ch);
            at_word_start = true;
        } else if at_word_start {
            normalized.extend(ch.to_uppercase());
            at_word_start = false;
        } else {
            normalized.extend(ch.to_lowercase());
        }
    }
    Some(normalized)
}

/// Normalize a customer phone number.
///
/// Strips whitespace, hyphens, and parentheses, rewrites a leading `+84` or
/// `84` country prefix to `0`, then validates against `^0\d{9,10}$`.
/// Returns `None` when the result is not a Vietnamese mobile number.
pub fn normalize_phone(input: &str) -> Option<String> {
    let stripped: String = input
        .chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '-' | '(' | ')'))
        .collect();

    let normalized = if let Some(rest) = stripped.strip_prefix("+84") {
        format!("0{rest}")
    } else if let Some(rest) = stripped.strip_prefix("84") {
        format!("0{rest}")
    } else {
        stripped
    };

    if PHONE_RE.is_match(&normalized) {
        Some(normalized)
    } else {
        None
    }
}

/// Parse a product quick-reply payload of the form `PRODUCT_<id>`.
pub fn parse_product_payload(input: &str) -> Option<i64> {
    input.strip_prefix("PRODUCT_")?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn trigger_tokens_match_as_substrings() {
        assert!(matches_any("mua", TRIGGER_TOKENS));
        assert!(matches_any("  MUA  ", TRIGGER_TOKENS));
        assert!(matches_any("tôi muốn đặt hàng ngay", TRIGGER_TOKENS));
        assert!(matches_any("Order please", TRIGGER_TOKENS));
        assert!(!matches_any("xin chào", TRIGGER_TOKENS));
    }

    #[test]
    fn confirm_and_cancel_tokens_match() {
        assert!(matches_any("Có", CONFIRM_TOKENS));
        assert!(matches_any("đồng ý nhé", CONFIRM_TOKENS));
        assert!(matches_any("OK", CONFIRM_TOKENS));
        assert!(matches_any("không", CANCEL_TOKENS));
        assert!(matches_any("Hủy đơn", CANCEL_TOKENS));
        assert!(!matches_any("để tôi nghĩ", CONFIRM_TOKENS));
        assert!(!matches_any("để tôi nghĩ", CANCEL_TOKENS));
    }

    #[test]
    fn name_title_cases_each_word_and_keeps_inner_whitespace() {
        assert_eq!(
            normalize_name("  nguyễn  văn   a").as_deref(),
            Some("Nguyễn  Văn   A")
        );
        assert_eq!(normalize_name("alice").as_deref(), Some("Alice"));
        assert_eq!(normalize_name("TRẦN BÌNH").as_deref(), Some("Trần Bình"));
    }

    #[test]
    fn name_shorter_than_two_chars_is_rejected() {
        assert_eq!(normalize_name("a"), None);
        assert_eq!(normalize_name("  a  "), None);
        assert_eq!(normalize_name(""), None);
        assert_eq!(normalize_name("   "), None);
    }

    #[test]
    fn phone_strips_separators_and_country_prefix() {
        assert_eq!(
            normalize_phone("+84 912-345 678").as_deref(),
            Some("0912345678")
        );
        assert_eq!(normalize_phone("84912345678").as_deref(), Some("0912345678"));
        assert_eq!(normalize_phone("(091) 234-5678").as_deref(), Some("0912345678"));
        assert_eq!(normalize_phone("0912345678").as_deref(), Some("0912345678"));
    }

    #[test]
    fn phone_rejects_short_and_non_numeric_input() {
        assert_eq!(normalize_phone("091234567"), None);
        assert_eq!(normalize_phone("abc"), None);
        assert_eq!(normalize_phone("12345678901"), None);
        assert_eq!(normalize_phone(""), None);
    }

    #[test]
    fn product_payload_parses_id() {
        assert_eq!(parse_product_payload("PRODUCT_42"), Some(42));
        assert_eq!(parse_product_payload("PRODUCT_"), None);
        assert_eq!(parse_product_payload("PRODUCT_abc"), None);
        assert_eq!(parse_product_payload("có"), None);
    }

    proptest! {
        /// Every accepted phone is `0` followed by 9 or 10 digits.
        #[test]
        fn accepted_phones_are_canonical(s in ".{0,20}") {
            if let Some(phone) = normalize_phone(&s) {
                prop_assert!(phone.starts_with('0'));
                prop_assert!((10..=11).contains(&phone.len()));
                prop_assert!(phone.chars().all(|c| c.is_ascii_digit()));
            }
        }

        /// Accepted names never gain or lose non-whitespace characters.
        #[test]
        fn normalized_name_keeps_word_count(s in "[a-zA-Zàáâãèéêìíòóôõùúăđĩũơư ]{0,30}") {
            if let Some(name) = normalize_name(&s) {
                prop_assert_eq!(
                    name.split_whitespace().count(),
                    s.split_whitespace().count()
                );
            }
        }
    }
}
