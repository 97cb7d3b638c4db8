//! Key handles
//!
//! A [`Key`] is opaque parsed key material bound to exactly one
//! [`AlgorithmId`] at import time. Its type parameter records what it may be
//! used for, so verifying with a signing-only handle does not compile.
//!
//! Import is the single fallible boundary: material that does not fit the
//! algorithm family (wrong key type, wrong curve, malformed encoding) is
//! rejected here with [`JwtError::InvalidKey`].

mod jwk;
pub(crate) mod material;

pub use jwk::Jwk;

use crate::{
    algorithms::{AlgorithmId, Curve, Family},
    codec::{b64_decode, b64_encode},
    error::{JwtError, JwtResult},
};
use base64::{Engine, engine::general_purpose::STANDARD};
use material::{KeyMaterial, by_curve};
use rsa::{
    BigUint, RsaPrivateKey, RsaPublicKey,
    pkcs1::DecodeRsaPrivateKey,
    pkcs8::{DecodePrivateKey, DecodePublicKey},
    traits::PublicKeyParts,
};
use std::{fmt, marker::PhantomData, sync::Arc};
use zeroize::Zeroizing;

mod sealed {
    pub trait Sealed {}
}

/// Capability marker for a [`Key`]
pub trait Capability: sealed::Sealed + Send + Sync + 'static {
    /// Whether the handle carries signing material
    const CAN_SIGN: bool;
    /// Human-readable capability name
    const NAME: &'static str;
}

/// Marker: the key may produce signatures
pub trait CanSign: Capability {}

/// Marker: the key may check signatures
pub trait CanVerify: Capability {}

/// Capability: sign only
#[derive(Debug, Clone, Copy)]
pub struct SignOnly;

/// Capability: verify only
#[derive(Debug, Clone, Copy)]
pub struct VerifyOnly;

/// Capability: sign and verify
#[derive(Debug, Clone, Copy)]
pub struct SignAndVerify;

impl sealed::Sealed for SignOnly {}
impl sealed::Sealed for VerifyOnly {}
impl sealed::Sealed for SignAndVerify {}

impl Capability for SignOnly {
    const CAN_SIGN: bool = true;
    const NAME: &'static str = "sign";
}

impl Capability for VerifyOnly {
    const CAN_SIGN: bool = false;
    const NAME: &'static str = "verify";
}

impl Capability for SignAndVerify {
    const CAN_SIGN: bool = true;
    const NAME: &'static str = "sign+verify";
}

impl CanSign for SignOnly {}
impl CanSign for SignAndVerify {}
impl CanVerify for VerifyOnly {}
impl CanVerify for SignAndVerify {}

/// Key that can only sign
pub type SigningKey = Key<SignOnly>;
/// Key that can only verify
pub type VerifyingKey = Key<VerifyOnly>;
/// Key that can sign and verify (HMAC secrets, or private keys used both ways)
pub type SymmetricKey = Key<SignAndVerify>;

/// Opaque key handle bound to one algorithm
///
/// Cloning is cheap; the parsed material is shared.
pub struct Key<U: Capability> {
    algorithm: AlgorithmId,
    material: Arc<KeyMaterial>,
    _capability: PhantomData<U>,
}

impl<U: Capability> Clone for Key<U> {
    fn clone(&self) -> Self {
        Self {
            algorithm: self.algorithm,
            material: Arc::clone(&self.material),
            _capability: PhantomData,
        }
    }
}

impl<U: Capability> fmt::Debug for Key<U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Key")
            .field("algorithm", &self.algorithm)
            .field("capability", &U::NAME)
            .finish_non_exhaustive()
    }
}

impl<U: Capability> Key<U> {
    fn new(algorithm: AlgorithmId, material: KeyMaterial) -> Self {
        Self {
            algorithm,
            material: Arc::new(material),
            _capability: PhantomData,
        }
    }

    /// Algorithm this key is bound to
    #[inline]
    #[must_use]
    pub fn algorithm(&self) -> AlgorithmId {
        self.algorithm
    }

    /// Verify-only handle over the public half of this key
    #[must_use]
    pub fn verifying_key(&self) -> VerifyingKey {
        Key::new(self.algorithm, self.material.to_public())
    }

    /// Material for `algorithm`, or `InvalidKey` when the key is bound elsewhere
    pub(crate) fn material_for(&self, algorithm: AlgorithmId) -> JwtResult<Arc<KeyMaterial>> {
        if algorithm != self.algorithm {
            return Err(JwtError::invalid_key(format!(
                "key is bound to {}, not {algorithm}",
                self.algorithm
            )));
        }
        Ok(Arc::clone(&self.material))
    }

    /// HMAC key from raw secret bytes
    pub fn from_secret(algorithm: AlgorithmId, secret: impl AsRef<[u8]>) -> JwtResult<Self> {
        expect_family(algorithm, Family::Hmac)?;
        let secret = secret.as_ref();
        if secret.is_empty() {
            return Err(JwtError::invalid_key("HMAC secret must not be empty"));
        }
        Ok(Self::new(
            algorithm,
            KeyMaterial::Hmac(Zeroizing::new(secret.to_vec())),
        ))
    }

    /// HMAC key from a standard (padded) base64 secret, as typically found in
    /// environment variables
    pub fn from_base64_secret(algorithm: AlgorithmId, encoded: &str) -> JwtResult<Self> {
        let secret = Zeroizing::new(
            STANDARD
                .decode(encoded.trim())
                .map_err(|e| JwtError::invalid_key(format!("secret is not base64: {e}")))?,
        );
        Self::from_secret(algorithm, &*secret)
    }

    /// Import a JSON Web Key
    ///
    /// Signing-capable handles need the private members (`d`, or `k` for
    /// `oct` keys). `alg`, `use` and `key_ops` are checked when present.
    pub fn from_jwk(algorithm: AlgorithmId, jwk: &Jwk) -> JwtResult<Self> {
        if let Some(alg) = &jwk.alg {
            if alg != algorithm.as_str() {
                return Err(JwtError::invalid_key(format!(
                    "JWK is for {alg}, not {algorithm}"
                )));
            }
        }
        if let Some(key_use) = &jwk.key_use {
            if key_use != "sig" {
                return Err(JwtError::invalid_key(format!(
                    "JWK use '{key_use}' is not 'sig'"
                )));
            }
        }
        let op = if U::CAN_SIGN { "sign" } else { "verify" };
        if !jwk.permits(op) {
            return Err(JwtError::invalid_key(format!("JWK key_ops do not permit '{op}'")));
        }

        let spec = algorithm.spec();
        let material = match (spec.family, spec.curve) {
            (Family::Hmac, _) => {
                expect_kty(jwk, "oct")?;
                let k = Zeroizing::new(jwk_member(jwk.k.as_deref(), "k")?);
                return Self::from_secret(algorithm, &*k);
            }
            (Family::RsaPkcs1v15, _) => {
                expect_kty(jwk, "RSA")?;
                rsa_from_jwk(jwk, U::CAN_SIGN)?
            }
            (Family::Ecdsa, Some(curve)) => {
                expect_kty(jwk, "EC")?;
                ec_from_jwk(jwk, curve, U::CAN_SIGN)?
            }
            (Family::Ecdsa, None) => {
                return Err(JwtError::unsupported_algorithm(algorithm.as_str()));
            }
        };
        Ok(Self::new(algorithm, material))
    }
}

impl<U: CanSign> Key<U> {
    /// RSA or EC private key from PKCS#8 DER
    pub fn from_pkcs8_der(algorithm: AlgorithmId, der: &[u8]) -> JwtResult<Self> {
        let spec = algorithm.spec();
        let material = match (spec.family, spec.curve) {
            (Family::RsaPkcs1v15, _) => KeyMaterial::RsaPrivate(
                RsaPrivateKey::from_pkcs8_der(der)
                    .or_else(|_| RsaPrivateKey::from_pkcs1_der(der))
                    .map_err(|e| JwtError::invalid_key(format!("not an RSA private key: {e}")))?,
            ),
            (Family::Ecdsa, Some(curve)) => {
                KeyMaterial::EcPrivate(by_curve!(curve, private_from_der(der))?)
            }
            _ => return Err(not_asymmetric(algorithm)),
        };
        Ok(Self::new(algorithm, material))
    }

    /// RSA or EC private key from PEM (`PRIVATE KEY`, or `RSA PRIVATE KEY`)
    pub fn from_pkcs8_pem(algorithm: AlgorithmId, pem: &str) -> JwtResult<Self> {
        let spec = algorithm.spec();
        let material = match (spec.family, spec.curve) {
            (Family::RsaPkcs1v15, _) => KeyMaterial::RsaPrivate(
                RsaPrivateKey::from_pkcs8_pem(pem)
                    .or_else(|_| RsaPrivateKey::from_pkcs1_pem(pem))
                    .map_err(|e| JwtError::invalid_key(format!("not an RSA private key: {e}")))?,
            ),
            (Family::Ecdsa, Some(curve)) => {
                KeyMaterial::EcPrivate(by_curve!(curve, private_from_pem(pem))?)
            }
            _ => return Err(not_asymmetric(algorithm)),
        };
        Ok(Self::new(algorithm, material))
    }
}

impl Key<VerifyOnly> {
    /// RSA or EC public key from SubjectPublicKeyInfo DER
    pub fn from_public_key_der(algorithm: AlgorithmId, der: &[u8]) -> JwtResult<Self> {
        let spec = algorithm.spec();
        let material = match (spec.family, spec.curve) {
            (Family::RsaPkcs1v15, _) => KeyMaterial::RsaPublic(
                RsaPublicKey::from_public_key_der(der)
                    .map_err(|e| JwtError::invalid_key(format!("not an RSA public key: {e}")))?,
            ),
            (Family::Ecdsa, Some(curve)) => {
                KeyMaterial::EcPublic(by_curve!(curve, public_from_der(der))?)
            }
            _ => return Err(not_asymmetric(algorithm)),
        };
        Ok(Self::new(algorithm, material))
    }

    /// RSA or EC public key from PEM (`PUBLIC KEY`)
    pub fn from_public_key_pem(algorithm: AlgorithmId, pem: &str) -> JwtResult<Self> {
        let spec = algorithm.spec();
        let material = match (spec.family, spec.curve) {
            (Family::RsaPkcs1v15, _) => KeyMaterial::RsaPublic(
                RsaPublicKey::from_public_key_pem(pem)
                    .map_err(|e| JwtError::invalid_key(format!("not an RSA public key: {e}")))?,
            ),
            (Family::Ecdsa, Some(curve)) => {
                KeyMaterial::EcPublic(by_curve!(curve, public_from_pem(pem))?)
            }
            _ => return Err(not_asymmetric(algorithm)),
        };
        Ok(Self::new(algorithm, material))
    }
}

impl<U: CanVerify> Key<U> {
    /// Export the verification material as a JWK
    ///
    /// RSA and EC keys export public members only. HMAC keys export the
    /// secret itself (`k`), so only publish those to trusted parties.
    #[must_use]
    pub fn to_jwk(&self) -> Jwk {
        let mut jwk = Jwk {
            alg: Some(self.algorithm.as_str().to_string()),
            key_use: Some("sig".to_string()),
            ..Jwk::default()
        };
        match &*self.material {
            KeyMaterial::Hmac(secret) => {
                jwk.kty = "oct".to_string();
                jwk.k = Some(b64_encode(secret.as_slice()));
            }
            KeyMaterial::RsaPrivate(key) => set_rsa_public(&mut jwk, key.n(), key.e()),
            KeyMaterial::RsaPublic(key) => set_rsa_public(&mut jwk, key.n(), key.e()),
            KeyMaterial::EcPrivate(key) => set_ec_public(&mut jwk, &key.public),
            KeyMaterial::EcPublic(key) => set_ec_public(&mut jwk, key),
        }
        jwk
    }
}

fn set_rsa_public(jwk: &mut Jwk, n: &BigUint, e: &BigUint) {
    jwk.kty = "RSA".to_string();
    jwk.n = Some(b64_encode(n.to_bytes_be()));
    jwk.e = Some(b64_encode(e.to_bytes_be()));
}

fn set_ec_public(jwk: &mut Jwk, key: &material::EcPublicKey) {
    let (x, y) = key.coordinates();
    jwk.kty = "EC".to_string();
    jwk.crv = Some(key.curve.jwk_name().to_string());
    jwk.x = Some(b64_encode(x));
    jwk.y = Some(b64_encode(y));
}

fn expect_family(algorithm: AlgorithmId, family: Family) -> JwtResult<()> {
    if algorithm.family() == family {
        Ok(())
    } else {
        Err(JwtError::invalid_key(format!(
            "{algorithm} cannot use {family:?} key material"
        )))
    }
}

fn not_asymmetric(algorithm: AlgorithmId) -> JwtError {
    JwtError::invalid_key(format!("{algorithm} does not use a public/private key pair"))
}

fn expect_kty(jwk: &Jwk, kty: &str) -> JwtResult<()> {
    if jwk.kty == kty {
        Ok(())
    } else {
        Err(JwtError::invalid_key(format!(
            "JWK kty '{}' does not match '{kty}'",
            jwk.kty
        )))
    }
}

fn jwk_member(value: Option<&str>, name: &str) -> JwtResult<Vec<u8>> {
    let value = value.ok_or_else(|| JwtError::invalid_key(format!("JWK is missing '{name}'")))?;
    b64_decode(value).map_err(|_| JwtError::invalid_key(format!("JWK '{name}' is not base64url")))
}

fn rsa_from_jwk(jwk: &Jwk, private: bool) -> JwtResult<KeyMaterial> {
    let uint = |value: Option<&str>, name: &str| -> JwtResult<BigUint> {
        Ok(BigUint::from_bytes_be(&jwk_member(value, name)?))
    };
    let n = uint(jwk.n.as_deref(), "n")?;
    let e = uint(jwk.e.as_deref(), "e")?;

    if !private {
        let key = RsaPublicKey::new(n, e)
            .map_err(|err| JwtError::invalid_key(format!("invalid RSA public key: {err}")))?;
        return Ok(KeyMaterial::RsaPublic(key));
    }

    let d = uint(jwk.d.as_deref(), "d")?;
    let p = uint(jwk.p.as_deref(), "p")?;
    let q = uint(jwk.q.as_deref(), "q")?;
    let key = RsaPrivateKey::from_components(n, e, d, vec![p, q])
        .map_err(|err| JwtError::invalid_key(format!("invalid RSA private key: {err}")))?;
    key.validate()
        .map_err(|err| JwtError::invalid_key(format!("invalid RSA private key: {err}")))?;
    Ok(KeyMaterial::RsaPrivate(key))
}

fn ec_from_jwk(jwk: &Jwk, curve: Curve, private: bool) -> JwtResult<KeyMaterial> {
    match jwk.crv.as_deref() {
        Some(crv) if crv == curve.jwk_name() => {}
        other => {
            return Err(JwtError::invalid_key(format!(
                "JWK crv {other:?} does not match {}",
                curve.jwk_name()
            )));
        }
    }

    let x = jwk_member(jwk.x.as_deref(), "x")?;
    let y = jwk_member(jwk.y.as_deref(), "y")?;
    let width = curve.coordinate_len();
    if x.len() != width || y.len() != width {
        return Err(JwtError::invalid_key(format!(
            "{} coordinates must be {width} bytes",
            curve.jwk_name()
        )));
    }
    let mut point = Vec::with_capacity(1 + 2 * width);
    point.push(0x04);
    point.extend_from_slice(&x);
    point.extend_from_slice(&y);
    let public = by_curve!(curve, public_from_sec1(&point))?;

    if !private {
        return Ok(KeyMaterial::EcPublic(public));
    }

    let d = Zeroizing::new(jwk_member(jwk.d.as_deref(), "d")?);
    let key = by_curve!(curve, private_from_scalar(&d))?;
    if key.public.point != public.point {
        return Err(JwtError::invalid_key("JWK private scalar does not match x/y"));
    }
    Ok(KeyMaterial::EcPrivate(key))
}
