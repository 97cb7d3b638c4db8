//! ECDSA signatures over NIST curves (ES256 / ES384 / ES512)
//!
//! Signatures use the fixed-width `r || s` encoding, never DER.

use crate::{
    error::{JwtError, JwtResult},
    keys::material::{EcSigningKey, EcVerifyingKey},
};
use p256::ecdsa::signature::{Signer, Verifier};

pub(crate) fn sign(key: &EcSigningKey, data: &[u8]) -> JwtResult<Vec<u8>> {
    let failed = |e: p256::ecdsa::Error| JwtError::signing_failed(format!("ECDSA signing failed: {e}"));
    let bytes = match key {
        EcSigningKey::P256(key) => {
            let signature: p256::ecdsa::Signature = key.try_sign(data).map_err(failed)?;
            signature.to_bytes().to_vec()
        }
        EcSigningKey::P384(key) => {
            let signature: p384::ecdsa::Signature = key.try_sign(data).map_err(failed)?;
            signature.to_bytes().to_vec()
        }
        EcSigningKey::P521(key) => {
            let signature: p521::ecdsa::Signature = key.try_sign(data).map_err(failed)?;
            signature.to_bytes().to_vec()
        }
    };
    Ok(bytes)
}

/// Wrong-length or out-of-range `r || s` values are reported as a mismatch
pub(crate) fn verify(key: &EcVerifyingKey, data: &[u8], signature: &[u8]) -> JwtResult<bool> {
    let valid = match key {
        EcVerifyingKey::P256(key) => p256::ecdsa::Signature::from_slice(signature)
            .is_ok_and(|signature| key.verify(data, &signature).is_ok()),
        EcVerifyingKey::P384(key) => p384::ecdsa::Signature::from_slice(signature)
            .is_ok_and(|signature| key.verify(data, &signature).is_ok()),
        EcVerifyingKey::P521(key) => p521::ecdsa::Signature::from_slice(signature)
            .is_ok_and(|signature| key.verify(data, &signature).is_ok()),
    };
    Ok(valid)
}
