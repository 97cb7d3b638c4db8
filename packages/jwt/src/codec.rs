//! Compact token codec
//!
//! Splits `header.payload.signature` into its parts and keeps the exact
//! signed span. The codec is a pure parser: no key material and no I/O.

use crate::{
    error::{JwtError, JwtResult},
    types::{Claims, DecodedToken, Header},
};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use serde::{Serialize, de::DeserializeOwned};

/// Encode bytes as unpadded base64url
#[inline]
#[must_use]
pub fn b64_encode(bytes: impl AsRef<[u8]>) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Decode unpadded base64url, rejecting padding and non-canonical trailing bits
pub fn b64_decode(segment: &str) -> JwtResult<Vec<u8>> {
    URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|e| JwtError::malformed(format!("invalid base64url: {e}")))
}

/// Serialize a value to JSON and base64url-encode it
pub fn encode_segment<T: Serialize>(value: &T) -> JwtResult<String> {
    let json = serde_json::to_vec(value)
        .map_err(|e| JwtError::malformed(format!("cannot serialize segment: {e}")))?;
    Ok(b64_encode(json))
}

/// Decode a compact token without checking its signature or claims
///
/// The returned `signed_data` is the literal `header.payload` prefix of
/// `token`, so verification covers exactly the bytes the signer produced.
pub fn decode(token: &str) -> JwtResult<DecodedToken> {
    let (header_seg, payload_seg, signature_seg) = split(token)?;

    let header: Header = decode_json_object(header_seg, "header")?;
    let payload: Claims = decode_json_object(payload_seg, "payload")?;
    let signature = b64_decode(signature_seg)?;

    let signed_len = header_seg.len() + 1 + payload_seg.len();
    let signed_data = token.as_bytes()[..signed_len].to_vec();

    Ok(DecodedToken {
        header,
        payload,
        signature,
        signed_data,
    })
}

/// Decode only the header segment, after the same structural checks as [`decode`]
pub fn decode_header(token: &str) -> JwtResult<Header> {
    let (header_seg, _, _) = split(token)?;
    decode_json_object(header_seg, "header")
}

fn split(token: &str) -> JwtResult<(&str, &str, &str)> {
    let mut parts = token.split('.');
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(h), Some(p), Some(s), None) if !h.is_empty() && !p.is_empty() && !s.is_empty() => {
            Ok((h, p, s))
        }
        _ => Err(JwtError::malformed(
            "expected three non-empty dot-separated segments",
        )),
    }
}

fn decode_json_object<T: DeserializeOwned>(segment: &str, what: &str) -> JwtResult<T> {
    let bytes = b64_decode(segment)?;
    let value: serde_json::Value = serde_json::from_slice(&bytes)
        .map_err(|e| JwtError::malformed(format!("{what} is not valid JSON: {e}")))?;
    if !value.is_object() {
        return Err(JwtError::malformed(format!("{what} is not a JSON object")));
    }
    serde_json::from_value(value)
        .map_err(|e| JwtError::malformed(format!("{what} has invalid claims: {e}")))
}
