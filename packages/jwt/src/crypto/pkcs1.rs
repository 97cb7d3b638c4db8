//! RSASSA-PKCS1-v1_5 signatures (RS256 / RS384 / RS512)

use crate::{
    algorithms::HashFunction,
    error::{JwtError, JwtResult},
};
use rsa::{
    RsaPrivateKey, RsaPublicKey,
    pkcs1v15::{Signature, SigningKey, VerifyingKey},
    signature::{SignatureEncoding, Signer, Verifier},
};
use sha2::{Sha256, Sha384, Sha512};

pub(crate) fn sign(hash: HashFunction, key: &RsaPrivateKey, data: &[u8]) -> JwtResult<Vec<u8>> {
    let signature = match hash {
        HashFunction::Sha256 => SigningKey::<Sha256>::new(key.clone()).try_sign(data),
        HashFunction::Sha384 => SigningKey::<Sha384>::new(key.clone()).try_sign(data),
        HashFunction::Sha512 => SigningKey::<Sha512>::new(key.clone()).try_sign(data),
    }
    .map_err(|e| JwtError::signing_failed(format!("RSA signing failed: {e}")))?;
    Ok(signature.to_vec())
}

/// A signature that does not even parse is reported as a mismatch
pub(crate) fn verify(
    hash: HashFunction,
    key: &RsaPublicKey,
    data: &[u8],
    signature: &[u8],
) -> JwtResult<bool> {
    let Ok(signature) = Signature::try_from(signature) else {
        return Ok(false);
    };
    let valid = match hash {
        HashFunction::Sha256 => VerifyingKey::<Sha256>::new(key.clone()).verify(data, &signature),
        HashFunction::Sha384 => VerifyingKey::<Sha384>::new(key.clone()).verify(data, &signature),
        HashFunction::Sha512 => VerifyingKey::<Sha512>::new(key.clone()).verify(data, &signature),
    };
    Ok(valid.is_ok())
}
