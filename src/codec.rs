//! Conversion between the browser's base64url key encoding and raw bytes.

use base64::{STANDARD, URL_SAFE_NO_PAD, decode_config, encode_config};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("invalid base64url key: {0}")]
pub struct DecodeError(#[from] base64::DecodeError);

/// Decodes a base64url signing key, tolerating missing `=` padding.
pub fn decode_signing_key(input: &str) -> Result<Vec<u8>, DecodeError> {
    let padding = (4 - input.len() % 4) % 4;
    let mut standard = String::with_capacity(input.len() + padding);
    standard.extend(input.chars().map(|ch| match ch {
        '-' => '+',
        '_' => '/',
        other => other,
    }));
    standard.extend(std::iter::repeat_n('=', padding));
    Ok(decode_config(&standard, STANDARD)?)
}

/// Encodes raw key bytes the way browsers serialise subscription keys.
pub fn encode_key(bytes: &[u8]) -> String {
    encode_config(bytes, URL_SAFE_NO_PAD)
}
