//! HMAC-SHA2 signatures (HS256 / HS384 / HS512)

use crate::{
    algorithms::HashFunction,
    error::{JwtError, JwtResult},
};
use hmac::{Hmac, Mac, digest::KeyInit};
use sha2::{Sha256, Sha384, Sha512};

fn keyed<M: Mac + KeyInit>(secret: &[u8], data: &[u8]) -> JwtResult<M> {
    let mut mac = <M as Mac>::new_from_slice(secret)
        .map_err(|_| JwtError::invalid_key("Invalid HMAC key"))?;
    mac.update(data);
    Ok(mac)
}

pub(crate) fn sign(hash: HashFunction, secret: &[u8], data: &[u8]) -> JwtResult<Vec<u8>> {
    // Tag widths differ per hash, so each arm copies into a Vec.
    let tag = match hash {
        HashFunction::Sha256 => keyed::<Hmac<Sha256>>(secret, data)?.finalize().into_bytes().to_vec(),
        HashFunction::Sha384 => keyed::<Hmac<Sha384>>(secret, data)?.finalize().into_bytes().to_vec(),
        HashFunction::Sha512 => keyed::<Hmac<Sha512>>(secret, data)?.finalize().into_bytes().to_vec(),
    };
    Ok(tag)
}

/// Constant-time tag comparison
pub(crate) fn verify(
    hash: HashFunction,
    secret: &[u8],
    data: &[u8],
    signature: &[u8],
) -> JwtResult<bool> {
    let valid = match hash {
        HashFunction::Sha256 => keyed::<Hmac<Sha256>>(secret, data)?.verify_slice(signature),
        HashFunction::Sha384 => keyed::<Hmac<Sha384>>(secret, data)?.verify_slice(signature),
        HashFunction::Sha512 => keyed::<Hmac<Sha512>>(secret, data)?.verify_slice(signature),
    };
    Ok(valid.is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_widths_follow_the_hash() {
        for hash in [HashFunction::Sha256, HashFunction::Sha384, HashFunction::Sha512] {
            let tag = sign(hash, b"secret", b"data").unwrap();
            assert_eq!(tag.len(), hash.output_len());
            assert!(verify(hash, b"secret", b"data", &tag).unwrap());
        }
    }

    #[test]
    fn truncated_or_foreign_tags_fail() {
        let tag = sign(HashFunction::Sha256, b"secret", b"data").unwrap();
        assert!(!verify(HashFunction::Sha256, b"secret", b"data", &tag[..16]).unwrap());
        assert!(!verify(HashFunction::Sha256, b"other", b"data", &tag).unwrap());
        assert!(!verify(HashFunction::Sha256, b"secret", b"datb", &tag).unwrap());
    }
}
