// SPDX-FileCopyrightText: 2026 Muabot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! All user-visible Vietnamese copy, in one place.
//!
//! State handlers never build message text inline; every prompt, error, and
//! acknowledgement lives here so the wording can be reviewed and changed
//! without touching flow logic.

use muabot_orders::ValidationFailure;

/// Hint sent from `idle` when the input carries no trigger token.
pub fn idle_hint() -> &'static str {
    "Chào bạn! Gửi \"mua\" để bắt đầu đặt hàng nhé."
}

/// Greeting after a trigger token, asking for the customer's name.
pub fn greeting_ask_name() -> &'static str {
    "Xin chào! Bạn vui lòng cho biết tên của bạn?"
}

/// Re-prompt when the name is shorter than two characters.
pub fn name_too_short() -> &'static str {
    "Tên ngắn quá, bạn vui lòng nhập lại (ít nhất 2 ký tự)."
}

/// Prompt for the phone number, addressing the customer by name.
pub fn ask_phone(name: &str) -> String {
    format!("Cảm ơn {name}! Bạn vui lòng cho xin số điện thoại?")
}

/// Re-prompt when the phone number fails validation.
pub fn phone_invalid() -> &'static str {
    "Số điện thoại chưa đúng. Bạn vui lòng nhập lại, ví dụ: 0912345678."
}

/// Header line above the numbered product list.
pub fn product_list_intro() -> &'static str {
    "Bạn muốn mua sản phẩm nào? Chọn bên dưới nhé:"
}

/// Sent when the tenant has no active offers.
pub fn no_products() -> &'static str {
    "Hiện chưa có sản phẩm nào. Bạn vui lòng quay lại sau nhé!"
}

/// Sent when a product payload points at a missing or inactive offer.
pub fn product_not_found() -> &'static str {
    "Sản phẩm không tồn tại, bạn vui lòng chọn lại."
}

/// Confirmation card echoing the pending order. Ends with the two accepted
/// answers so the user knows what to type.
pub fn confirmation_card(
    product_name: &str,
    price: i64,
    quantity: i64,
    customer_name: &str,
    customer_phone: &str,
) -> String {
    format!(
        "Xác nhận đơn hàng:\n\
         - Sản phẩm: {product_name}\n\
         - Đơn giá: {}\n\
         - Số lượng: {quantity}\n\
         - Khách hàng: {customer_name} / {customer_phone}\n\
         Bạn xác nhận đặt hàng chứ? (Có / Không)",
        price_label(price)
    )
}

/// Re-prompt when input in `confirm_order` is neither confirm nor cancel.
pub fn confirm_reprompt() -> &'static str {
    "Bạn vui lòng trả lời \"Có\" để xác nhận hoặc \"Không\" để chọn lại."
}

/// Static acknowledgement during the post-order cooldown window.
pub fn cooldown_ack() -> &'static str {
    "Đơn hàng của bạn đang được xử lý. Cảm ơn bạn đã mua hàng!"
}

/// Generic retry message after an unexpected failure.
pub fn generic_retry() -> &'static str {
    "Có lỗi xảy ra, bạn vui lòng thử lại sau."
}

/// Success envelope sent after the order commits.
pub fn order_success(
    order_name: &str,
    total: i64,
    customer_name: &str,
    customer_phone: &str,
) -> String {
    format!(
        "Đặt hàng thành công!\n\
         Mã đơn hàng: {order_name}\n\
         Tổng tiền: {} đ\n\
         Khách hàng: {customer_name} / {customer_phone}\n\
         Chúng tôi sẽ liên hệ với bạn sớm nhất!",
        format_thousands(total)
    )
}

/// User-visible wording for an order validation failure.
pub fn validation_error(failure: &ValidationFailure) -> &'static str {
    match failure {
        ValidationFailure::MissingName => "Chưa có tên khách hàng, bạn vui lòng thử lại.",
        ValidationFailure::MissingPhone => "Chưa có số điện thoại, bạn vui lòng thử lại.",
        ValidationFailure::EmptySelection => {
            "Bạn chưa chọn sản phẩm nào. Trả lời \"Không\" để chọn lại nhé."
        }
    }
}

/// Price display: thousands-separated VND, or "Liên hệ" when the price is
/// zero (price on request).
pub fn price_label(price: i64) -> String {
    if price == 0 {
        "Liên hệ".to_string()
    } else {
        format!("{}đ", format_thousands(price))
    }
}

/// Group digits with `,` every three, no decimals.
pub fn format_thousands(amount: i64) -> String {
    let raw = amount.to_string();
    let (sign, digits) = match raw.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", raw.as_str()),
    };
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{sign}{grouped}")
}
