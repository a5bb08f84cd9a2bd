// SPDX-FileCopyrightText: 2026 Muabot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Product list presentation.
//!
//! Turns the tenant's active offers into the numbered text block and the
//! quick-reply buttons sent during `show_products`. Offers arrive already
//! ordered by (sequence, id); this module only formats.

use muabot_core::{Offer, QuickReply, QUICK_REPLY_TITLE_MAX};

use crate::replies;

/// Messenger rejects more than 11 quick replies per message.
pub const QUICK_REPLY_LIMIT: usize = 11;

/// The numbered product list, one line per offer.
///
/// Line format: `N. <name> — <price>đ`, with "Liên hệ" standing in for a
/// zero price.
pub fn list_text(offers: &[Offer]) -> String {
    let mut text = String::from(replies::product_list_intro());
    for (i, offer) in offers.iter().enumerate() {
        text.push('\n');
        text.push_str(&format!(
            "{}. {} — {}",
            i + 1,
            offer.product_name,
            replies::price_label(offer.list_price)
        ));
    }
    text
}

/// Quick-reply buttons for the offers, capped at the platform limit.
///
/// The button title is the offer's caption when set, otherwise the product
/// name truncated to 20 characters. Payloads carry the offer id.
pub fn quick_replies(offers: &[Offer]) -> Vec<QuickReply> {
    offers
        .iter()
        .take(QUICK_REPLY_LIMIT)
        .map(|offer| QuickReply {
            title: button_title(offer),
            payload: format!("PRODUCT_{}", offer.id),
        })
        .collect()
}

fn button_title(offer: &Offer) -> String {
    match &offer.caption {
        Some(caption) => caption.clone(),
        None => offer.product_name.chars().take(QUICK_REPLY_TITLE_MAX).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offer(id: i64, name: &str, price: i64, caption: Option<&str>) -> Offer {
        Offer {
            id,
            tenant_id: 1,
            product_id: id,
            sequence: id * 10,
            caption: caption.map(str::to_string),
            active: true,
            product_name: name.to_string(),
            list_price: price,
        }
    }

    #[test]
    fn list_lines_are_numbered_with_prices() {
        let offers = vec![offer(1, "Cà phê", 25000, None), offer(2, "Trà sữa", 30000, None)];
        let text = list_text(&offers);
        assert!(text.contains("1. Cà phê — 25,000đ"));
        assert!(text.contains("2. Trà sữa — 30,000đ"));
    }

    #[test]
    fn zero_price_renders_contact_label() {
        let text = list_text(&[offer(1, "Hàng đặt riêng", 0, None)]);
        assert!(text.contains("1. Hàng đặt riêng — Liên hệ"));
    }

    #[test]
    fn buttons_prefer_caption_over_name() {
        let offers = vec![
            offer(1, "Cà phê sữa đá truyền thống", 25000, Some("Cà phê sữa")),
            offer(2, "Trà sữa", 30000, None),
        ];
        let buttons = quick_replies(&offers);
        assert_eq!(buttons[0].title, "Cà phê sữa");
        assert_eq!(buttons[0].payload, "PRODUCT_1");
        assert_eq!(buttons[1].title, "Trà sữa");
    }

    #[test]
    fn long_names_truncate_to_twenty_characters() {
        let offers = vec![offer(9, "Cà phê sữa đá đặc biệt thượng hạng", 40000, None)];
        let buttons = quick_replies(&offers);
        assert_eq!(buttons[0].title.chars().count(), 20);
        assert!(buttons[0].title.starts_with("Cà phê sữa đá"));
    }

    #[test]
    fn buttons_cap_at_eleven() {
        let offers: Vec<Offer> = (1..=15)
            .map(|i| offer(i, &format!("Sản phẩm {i}"), 10000 * i, None))
            .collect();
        let buttons = quick_replies(&offers);
        assert_eq!(buttons.len(), QUICK_REPLY_LIMIT);
        assert_eq!(buttons[0].payload, "PRODUCT_1");
        assert_eq!(buttons[10].payload, "PRODUCT_11");
    }
}
