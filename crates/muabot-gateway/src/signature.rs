// SPDX-FileCopyrightText: 2026 Muabot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Webhook authenticity checks.
//!
//! Facebook signs each delivery with `X-Hub-Signature-256`, an HMAC-SHA256
//! of the raw request body keyed by the app secret. Both that check and the
//! verification-handshake token comparison run in constant time.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Verify an `X-Hub-Signature-256` header against the raw body.
///
/// The header carries `sha256=<lowercase hex>`. Any malformed header fails
/// verification; so does an empty one.
pub fn verify_delivery(app_secret: &str, body: &[u8], header_value: &str) -> bool {
    let Some(hex_digest) = header_value.strip_prefix("sha256=") else {
        return false;
    };
    let Ok(presented) = hex::decode(hex_digest) else {
        return false;
    };

    let mut mac = HmacSha256::new_from_slice(app_secret.as_bytes())
        .expect("hmac accepts keys of any length");
    mac.update(body);
    let computed = mac.finalize().into_bytes();

    computed.as_slice().ct_eq(&presented).into()
}

/// Constant-time comparison of the configured verify token against the one
/// presented in the handshake.
pub fn tokens_match(expected: &str, presented: &str) -> bool {
    expected.as_bytes().ct_eq(presented.as_bytes()).into()
}
