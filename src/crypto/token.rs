use rand::RngCore;
use rand::rngs::OsRng;
use base64::{Engine as _, engine::general_purpose};
use subtle::ConstantTimeEq;

/// The size of session and CSRF tokens in bytes.
const TOKEN_SIZE: usize = 32;

/// Generates a new random token.
///
/// # Returns
///
/// A URL-safe base64-encoded token.
pub fn generate_token() -> String {
    let mut token = [0u8; TOKEN_SIZE];
    OsRng.fill_bytes(&mut token);

    general_purpose::URL_SAFE_NO_PAD.encode(token)
}

/// Compares two tokens without short-circuiting on the first differing byte.
pub fn tokens_match(a: &str, b: &str) -> bool {
    a.len() == b.len() && bool::from(a.as_bytes().ct_eq(b.as_bytes()))
}
