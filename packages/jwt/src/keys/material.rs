//! Parsed key material behind a [`Key`](super::Key) handle

use crate::{
    algorithms::Curve,
    error::{JwtError, JwtResult},
};
use rsa::{RsaPrivateKey, RsaPublicKey};
use zeroize::Zeroizing;

pub(crate) enum KeyMaterial {
    Hmac(Zeroizing<Vec<u8>>),
    RsaPrivate(RsaPrivateKey),
    RsaPublic(RsaPublicKey),
    EcPrivate(EcPrivateKey),
    EcPublic(EcPublicKey),
}

impl KeyMaterial {
    /// Public half of the material; HMAC secrets are their own verifier
    pub(crate) fn to_public(&self) -> KeyMaterial {
        match self {
            KeyMaterial::Hmac(secret) => KeyMaterial::Hmac(secret.clone()),
            KeyMaterial::RsaPrivate(key) => KeyMaterial::RsaPublic(key.to_public_key()),
            KeyMaterial::RsaPublic(key) => KeyMaterial::RsaPublic(key.clone()),
            KeyMaterial::EcPrivate(key) => KeyMaterial::EcPublic(key.public.clone()),
            KeyMaterial::EcPublic(key) => KeyMaterial::EcPublic(key.clone()),
        }
    }

    pub(crate) fn describe(&self) -> &'static str {
        match self {
            KeyMaterial::Hmac(_) => "HMAC secret",
            KeyMaterial::RsaPrivate(_) => "RSA private key",
            KeyMaterial::RsaPublic(_) => "RSA public key",
            KeyMaterial::EcPrivate(_) => "EC private key",
            KeyMaterial::EcPublic(_) => "EC public key",
        }
    }
}

pub(crate) enum EcSigningKey {
    P256(p256::ecdsa::SigningKey),
    P384(p384::ecdsa::SigningKey),
    P521(p521::ecdsa::SigningKey),
}

#[derive(Clone)]
pub(crate) enum EcVerifyingKey {
    P256(p256::ecdsa::VerifyingKey),
    P384(p384::ecdsa::VerifyingKey),
    P521(p521::ecdsa::VerifyingKey),
}

/// EC public key plus its uncompressed SEC1 encoding (`04 || x || y`)
#[derive(Clone)]
pub(crate) struct EcPublicKey {
    pub(crate) curve: Curve,
    pub(crate) key: EcVerifyingKey,
    pub(crate) point: Vec<u8>,
}

pub(crate) struct EcPrivateKey {
    pub(crate) key: EcSigningKey,
    pub(crate) public: EcPublicKey,
}

impl EcPublicKey {
    /// Affine `(x, y)` coordinates, each `curve.coordinate_len()` bytes
    pub(crate) fn coordinates(&self) -> (&[u8], &[u8]) {
        let n = self.curve.coordinate_len();
        (&self.point[1..=n], &self.point[1 + n..])
    }
}

fn ec_error<E: std::fmt::Display>(what: &'static str, curve: Curve) -> impl Fn(E) -> JwtError {
    move |e| JwtError::invalid_key(format!("invalid {} {what}: {e}", curve.jwk_name()))
}

macro_rules! ec_curve {
    ($module:ident, $krate:ident, $curve:expr, $variant:ident) => {
        pub(crate) mod $module {
            use super::*;
            use $krate::{
                PublicKey, SecretKey,
                elliptic_curve::sec1::ToEncodedPoint,
                pkcs8::{DecodePrivateKey, DecodePublicKey},
            };

            fn public(key: &PublicKey) -> JwtResult<EcPublicKey> {
                let point = key.to_encoded_point(false);
                let verifying = $krate::ecdsa::VerifyingKey::from_sec1_bytes(point.as_bytes())
                    .map_err(|e| {
                        JwtError::invalid_key(format!("invalid {} point: {e}", $curve.jwk_name()))
                    })?;
                Ok(EcPublicKey {
                    curve: $curve,
                    key: EcVerifyingKey::$variant(verifying),
                    point: point.as_bytes().to_vec(),
                })
            }

            fn private(secret: &SecretKey) -> JwtResult<EcPrivateKey> {
                let signing = $krate::ecdsa::SigningKey::from_bytes(&secret.to_bytes())
                    .map_err(|e| {
                        JwtError::invalid_key(format!("invalid {} scalar: {e}", $curve.jwk_name()))
                    })?;
                Ok(EcPrivateKey {
                    key: EcSigningKey::$variant(signing),
                    public: public(&secret.public_key())?,
                })
            }

            pub(crate) fn public_from_sec1(bytes: &[u8]) -> JwtResult<EcPublicKey> {
                let key = PublicKey::from_sec1_bytes(bytes)
                    .map_err(ec_error("public point", $curve))?;
                public(&key)
            }

            pub(crate) fn public_from_der(der: &[u8]) -> JwtResult<EcPublicKey> {
                let key = PublicKey::from_public_key_der(der).map_err(|e| {
                    JwtError::invalid_key(format!("not a {} SPKI key: {e}", $curve.jwk_name()))
                })?;
                public(&key)
            }

            pub(crate) fn public_from_pem(pem: &str) -> JwtResult<EcPublicKey> {
                let key = PublicKey::from_public_key_pem(pem).map_err(|e| {
                    JwtError::invalid_key(format!("not a {} SPKI key: {e}", $curve.jwk_name()))
                })?;
                public(&key)
            }

            pub(crate) fn private_from_scalar(d: &[u8]) -> JwtResult<EcPrivateKey> {
                if d.len() != $curve.coordinate_len() {
                    return Err(JwtError::invalid_key(format!(
                        "{} private scalar must be {} bytes",
                        $curve.jwk_name(),
                        $curve.coordinate_len()
                    )));
                }
                let secret = SecretKey::from_slice(d).map_err(ec_error("private scalar", $curve))?;
                private(&secret)
            }

            pub(crate) fn private_from_der(der: &[u8]) -> JwtResult<EcPrivateKey> {
                let secret = SecretKey::from_pkcs8_der(der).map_err(|e| {
                    JwtError::invalid_key(format!("not a {} PKCS#8 key: {e}", $curve.jwk_name()))
                })?;
                private(&secret)
            }

            pub(crate) fn private_from_pem(pem: &str) -> JwtResult<EcPrivateKey> {
                let secret = SecretKey::from_pkcs8_pem(pem).map_err(|e| {
                    JwtError::invalid_key(format!("not a {} PKCS#8 key: {e}", $curve.jwk_name()))
                })?;
                private(&secret)
            }
        }
    };
}

ec_curve!(p256_keys, p256, Curve::P256, P256);
ec_curve!(p384_keys, p384, Curve::P384, P384);
ec_curve!(p521_keys, p521, Curve::P521, P521);

/// Dispatch an EC import function by curve
macro_rules! by_curve {
    ($curve:expr, $func:ident($($arg:expr),*)) => {
        match $curve {
            $crate::algorithms::Curve::P256 => $crate::keys::material::p256_keys::$func($($arg),*),
            $crate::algorithms::Curve::P384 => $crate::keys::material::p384_keys::$func($($arg),*),
            $crate::algorithms::Curve::P521 => $crate::keys::material::p521_keys::$func($($arg),*),
        }
    };
}
pub(crate) use by_curve;
