//! Compact JSON Web Token signing and verification
//!
//! This crate provides:
//! - HS256/384/512, RS256/384/512 and ES256/384/512 signatures
//! - Key handles typed by capability and bound to one algorithm
//! - Verification of `nbf`/`exp` with an optional algorithm allow-list
//! - Key resolution from a remote JSON Web Key Set
//!
//! ```no_run
//! use tweezer_jwt::{AlgorithmId, Claims, SignOptions, SymmetricKey, sign, verify};
//!
//! # async fn demo() -> tweezer_jwt::JwtResult<()> {
//! let key = SymmetricKey::from_secret(AlgorithmId::HS256, b"secret")?;
//! let token = sign(&Claims::new("t1").with_subject("u1"), &key, &AlgorithmId::HS256.into()).await?;
//! let verified = verify(&token, &key).await?;
//! assert_eq!(verified.payload.sub.as_deref(), Some("u1"));
//! # Ok(())
//! # }
//! ```

pub mod algorithms;
pub mod codec;
mod crypto;
mod error;
pub mod jwks;
pub mod keys;
mod signer;
mod task;
mod types;
mod verifier;

pub use algorithms::{AlgorithmId, AlgorithmSpec, Curve, Family, HashFunction};
pub use codec::{decode, decode_header};
pub use error::{JwtError, JwtErrorKind, JwtResult};
pub use jwks::{
    CachingKeySetFetcher, HttpKeySetFetcher, JwksResolver, KeyEntry, KeySetDocument,
    KeySetFetcher, verify_via_key_set,
};
pub use keys::{
    CanSign, CanVerify, Jwk, Key, SignAndVerify, SignOnly, SigningKey, SymmetricKey, VerifyOnly,
    VerifyingKey,
};
pub use signer::{SignOptions, sign};
pub use types::{
    Audience, Claims, DecodedToken, Header, NumericDate, TOKEN_TYPE, VerifiedToken,
};
pub use verifier::{VerifyOptions, verify, verify_with};

/// Re-exported so callers can build [`SignOptions`] and [`VerifyOptions`]
/// cancellation without a direct `tokio-util` dependency
pub use tokio_util::sync::CancellationToken;
/// Re-exported for [`JwksResolver::verify`] locations
pub use url::Url;
