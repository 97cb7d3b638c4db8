//! JWT algorithm registry
//!
//! Maps the nine supported `alg` identifiers onto the parameters the
//! signature primitives need. The mapping is a compile-time total match and
//! never changes at runtime.

use crate::error::JwtError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, str::FromStr};

/// Signature algorithm identifier carried in the `alg` header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlgorithmId {
    /// HMAC using SHA-256
    HS256,
    /// HMAC using SHA-384
    HS384,
    /// HMAC using SHA-512
    HS512,
    /// RSASSA-PKCS1-v1_5 using SHA-256
    RS256,
    /// RSASSA-PKCS1-v1_5 using SHA-384
    RS384,
    /// RSASSA-PKCS1-v1_5 using SHA-512
    RS512,
    /// ECDSA using P-256 and SHA-256
    ES256,
    /// ECDSA using P-384 and SHA-384
    ES384,
    /// ECDSA using P-521 and SHA-512
    ES512,
}

/// Primitive family of an algorithm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    /// Keyed-hash MAC
    Hmac,
    /// RSASSA-PKCS1-v1_5
    RsaPkcs1v15,
    /// ECDSA with fixed-width `r || s` signatures
    Ecdsa,
}

/// Hash function used by an algorithm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashFunction {
    /// SHA-256
    Sha256,
    /// SHA-384
    Sha384,
    /// SHA-512
    Sha512,
}

/// Named elliptic curve (ECDSA only)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Curve {
    /// NIST P-256
    P256,
    /// NIST P-384
    P384,
    /// NIST P-521
    P521,
}

/// Everything a signature primitive needs to know about an algorithm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AlgorithmSpec {
    /// Primitive family
    pub family: Family,
    /// Hash function
    pub hash: HashFunction,
    /// Curve, set for ECDSA only
    pub curve: Option<Curve>,
}

impl AlgorithmId {
    /// Every supported algorithm, HMAC first
    pub const ALL: [AlgorithmId; 9] = [
        AlgorithmId::HS256,
        AlgorithmId::HS384,
        AlgorithmId::HS512,
        AlgorithmId::RS256,
        AlgorithmId::RS384,
        AlgorithmId::RS512,
        AlgorithmId::ES256,
        AlgorithmId::ES384,
        AlgorithmId::ES512,
    ];

    /// Resolve the primitive parameters for this algorithm
    #[must_use]
    pub const fn spec(self) -> AlgorithmSpec {
        use {Curve::*, Family::*, HashFunction::*};

        let (family, hash, curve) = match self {
            AlgorithmId::HS256 => (Hmac, Sha256, None),
            AlgorithmId::HS384 => (Hmac, Sha384, None),
            AlgorithmId::HS512 => (Hmac, Sha512, None),
            AlgorithmId::RS256 => (RsaPkcs1v15, Sha256, None),
            AlgorithmId::RS384 => (RsaPkcs1v15, Sha384, None),
            AlgorithmId::RS512 => (RsaPkcs1v15, Sha512, None),
            AlgorithmId::ES256 => (Ecdsa, Sha256, Some(P256)),
            AlgorithmId::ES384 => (Ecdsa, Sha384, Some(P384)),
            AlgorithmId::ES512 => (Ecdsa, Sha512, Some(P521)),
        };

        AlgorithmSpec {
            family,
            hash,
            curve,
        }
    }

    /// Wire identifier, e.g. `"HS256"`
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            AlgorithmId::HS256 => "HS256",
            AlgorithmId::HS384 => "HS384",
            AlgorithmId::HS512 => "HS512",
            AlgorithmId::RS256 => "RS256",
            AlgorithmId::RS384 => "RS384",
            AlgorithmId::RS512 => "RS512",
            AlgorithmId::ES256 => "ES256",
            AlgorithmId::ES384 => "ES384",
            AlgorithmId::ES512 => "ES512",
        }
    }

    /// Primitive family shortcut
    #[inline]
    #[must_use]
    pub const fn family(self) -> Family {
        self.spec().family
    }
}

impl FromStr for AlgorithmId {
    type Err = JwtError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AlgorithmId::ALL
            .into_iter()
            .find(|alg| alg.as_str() == s)
            .ok_or_else(|| JwtError::unsupported_algorithm(s))
    }
}

impl fmt::Display for AlgorithmId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for AlgorithmId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for AlgorithmId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl HashFunction {
    /// Digest length in bytes
    #[must_use]
    pub const fn output_len(self) -> usize {
        match self {
            HashFunction::Sha256 => 32,
            HashFunction::Sha384 => 48,
            HashFunction::Sha512 => 64,
        }
    }
}

impl Curve {
    /// JWK `crv` name
    #[must_use]
    pub const fn jwk_name(self) -> &'static str {
        match self {
            Curve::P256 => "P-256",
            Curve::P384 => "P-384",
            Curve::P521 => "P-521",
        }
    }

    /// Width of one affine coordinate (and of the private scalar) in bytes
    #[must_use]
    pub const fn coordinate_len(self) -> usize {
        match self {
            Curve::P256 => 32,
            Curve::P384 => 48,
            Curve::P521 => 66,
        }
    }

    /// Width of a fixed-size `r || s` signature in bytes
    #[must_use]
    pub const fn signature_len(self) -> usize {
        self.coordinate_len() * 2
    }
}
