//! Signature primitives
//!
//! Dispatches an [`AlgorithmId`] plus key material to the matching
//! RustCrypto implementation. These are synchronous and CPU-bound; the
//! signer and verifier run them on the blocking pool.

mod ec;
mod mac;
mod pkcs1;

use crate::{
    algorithms::{AlgorithmId, Family},
    error::{JwtError, JwtResult},
    keys::material::KeyMaterial,
};

fn mismatch(algorithm: AlgorithmId, material: &KeyMaterial, op: &str) -> JwtError {
    JwtError::invalid_key(format!(
        "{} cannot {op} {algorithm} signatures",
        material.describe()
    ))
}

/// Produce the raw signature over `data`
pub(crate) fn sign(
    algorithm: AlgorithmId,
    material: &KeyMaterial,
    data: &[u8],
) -> JwtResult<Vec<u8>> {
    let spec = algorithm.spec();
    match (spec.family, material) {
        (Family::Hmac, KeyMaterial::Hmac(secret)) => mac::sign(spec.hash, secret, data),
        (Family::RsaPkcs1v15, KeyMaterial::RsaPrivate(key)) => pkcs1::sign(spec.hash, key, data),
        (Family::Ecdsa, KeyMaterial::EcPrivate(key)) if spec.curve == Some(key.public.curve) => {
            ec::sign(&key.key, data)
        }
        _ => Err(mismatch(algorithm, material, "produce")),
    }
}

/// Check `signature` over `data`; `Ok(false)` means the signature does not match
pub(crate) fn verify(
    algorithm: AlgorithmId,
    material: &KeyMaterial,
    data: &[u8],
    signature: &[u8],
) -> JwtResult<bool> {
    let spec = algorithm.spec();
    match (spec.family, material) {
        (Family::Hmac, KeyMaterial::Hmac(secret)) => mac::verify(spec.hash, secret, data, signature),
        (Family::RsaPkcs1v15, KeyMaterial::RsaPublic(key)) => {
            pkcs1::verify(spec.hash, key, data, signature)
        }
        (Family::RsaPkcs1v15, KeyMaterial::RsaPrivate(key)) => {
            pkcs1::verify(spec.hash, &key.to_public_key(), data, signature)
        }
        (Family::Ecdsa, KeyMaterial::EcPublic(key)) if spec.curve == Some(key.curve) => {
            ec::verify(&key.key, data, signature)
        }
        (Family::Ecdsa, KeyMaterial::EcPrivate(key)) if spec.curve == Some(key.public.curve) => {
            ec::verify(&key.public.key, data, signature)
        }
        _ => Err(mismatch(algorithm, material, "check")),
    }
}
