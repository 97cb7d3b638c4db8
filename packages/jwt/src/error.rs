//! JWT error types
//!
//! Every failure the token engine can produce is a distinct variant of
//! [`JwtError`]. Nothing is retried internally and nothing is downgraded to a
//! default value; callers must treat any `Err` as a rejected token.

use thiserror::Error;

/// JWT operation result type
pub type JwtResult<T> = Result<T, JwtError>;

/// JWT error types
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JwtError {
    /// Token is not three base64url segments of JSON objects
    #[error("Malformed token: {0}")]
    MalformedToken(String),

    /// Algorithm identifier outside the supported set
    #[error("Unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// Key material does not fit the algorithm, or could not be imported
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// `nbf` lies in the future
    #[error("Token not yet valid")]
    NotYetValid,

    /// `exp` has passed
    #[error("Token has expired")]
    Expired,

    /// Signature does not match the signed span
    #[error("Invalid token signature")]
    SignatureInvalid,

    /// Key-set document failed schema validation
    #[error("Invalid key set document: {0}")]
    InvalidJwks(String),

    /// No key-set entry matched (carries the requested `kid`, if any)
    #[error("No matching key found{}", kid_suffix(.0))]
    KeyNotFound(Option<String>),

    /// Key-set document could not be fetched
    #[error("Network failure: {0}")]
    NetworkFailure(String),

    /// Signature primitive failed while signing
    #[error("Signing failed: {0}")]
    SigningFailed(String),

    /// Required claim absent from a payload about to be signed
    #[error("Missing required claim: {0}")]
    MissingClaim(String),

    /// Algorithm is valid but excluded by the caller's allow-list
    #[error("Algorithm not allowed: {0}")]
    AlgorithmNotAllowed(String),

    /// Caller-supplied cancellation token fired
    #[error("Operation cancelled")]
    Cancelled,

    /// Background crypto task could not be joined
    #[error("Background task failed")]
    TaskFailed,
}

/// Payload-free discriminant of [`JwtError`], for matching on the taxonomy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JwtErrorKind {
    /// See [`JwtError::MalformedToken`]
    MalformedToken,
    /// See [`JwtError::UnsupportedAlgorithm`]
    UnsupportedAlgorithm,
    /// See [`JwtError::InvalidKey`]
    InvalidKey,
    /// See [`JwtError::NotYetValid`]
    NotYetValid,
    /// See [`JwtError::Expired`]
    Expired,
    /// See [`JwtError::SignatureInvalid`]
    SignatureInvalid,
    /// See [`JwtError::InvalidJwks`]
    InvalidJwks,
    /// See [`JwtError::KeyNotFound`]
    KeyNotFound,
    /// See [`JwtError::NetworkFailure`]
    NetworkFailure,
    /// See [`JwtError::SigningFailed`]
    SigningFailed,
    /// See [`JwtError::MissingClaim`]
    MissingClaim,
    /// See [`JwtError::AlgorithmNotAllowed`]
    AlgorithmNotAllowed,
    /// See [`JwtError::Cancelled`]
    Cancelled,
    /// See [`JwtError::TaskFailed`]
    TaskFailed,
}

fn kid_suffix(kid: &Option<String>) -> String {
    kid.as_ref()
        .map(|kid| format!(" for kid '{kid}'"))
        .unwrap_or_default()
}

impl JwtError {
    /// Create a malformed token error
    #[inline]
    #[must_use]
    pub fn malformed(msg: impl Into<String>) -> Self {
        JwtError::MalformedToken(msg.into())
    }

    /// Create an unsupported algorithm error
    #[inline]
    #[must_use]
    pub fn unsupported_algorithm(alg: impl Into<String>) -> Self {
        JwtError::UnsupportedAlgorithm(alg.into())
    }

    /// Create an invalid key error
    #[inline]
    #[must_use]
    pub fn invalid_key(msg: impl Into<String>) -> Self {
        JwtError::InvalidKey(msg.into())
    }

    /// Create an invalid key set error
    #[inline]
    #[must_use]
    pub fn invalid_jwks(msg: impl Into<String>) -> Self {
        JwtError::InvalidJwks(msg.into())
    }

    /// Create a network failure error
    #[inline]
    #[must_use]
    pub fn network(msg: impl Into<String>) -> Self {
        JwtError::NetworkFailure(msg.into())
    }

    /// Create a signing failure error
    #[inline]
    #[must_use]
    pub fn signing_failed(msg: impl Into<String>) -> Self {
        JwtError::SigningFailed(msg.into())
    }

    /// Create a missing claim error
    #[inline]
    #[must_use]
    pub fn missing_claim(claim: &str) -> Self {
        JwtError::MissingClaim(claim.to_string())
    }

    /// Taxonomy kind of this error
    #[must_use]
    pub fn kind(&self) -> JwtErrorKind {
        match self {
            JwtError::MalformedToken(_) => JwtErrorKind::MalformedToken,
            JwtError::UnsupportedAlgorithm(_) => JwtErrorKind::UnsupportedAlgorithm,
            JwtError::InvalidKey(_) => JwtErrorKind::InvalidKey,
            JwtError::NotYetValid => JwtErrorKind::NotYetValid,
            JwtError::Expired => JwtErrorKind::Expired,
            JwtError::SignatureInvalid => JwtErrorKind::SignatureInvalid,
            JwtError::InvalidJwks(_) => JwtErrorKind::InvalidJwks,
            JwtError::KeyNotFound(_) => JwtErrorKind::KeyNotFound,
            JwtError::NetworkFailure(_) => JwtErrorKind::NetworkFailure,
            JwtError::SigningFailed(_) => JwtErrorKind::SigningFailed,
            JwtError::MissingClaim(_) => JwtErrorKind::MissingClaim,
            JwtError::AlgorithmNotAllowed(_) => JwtErrorKind::AlgorithmNotAllowed,
            JwtError::Cancelled => JwtErrorKind::Cancelled,
            JwtError::TaskFailed => JwtErrorKind::TaskFailed,
        }
    }
}
