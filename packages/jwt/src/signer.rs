//! Token signing

use crate::{
    algorithms::AlgorithmId,
    codec::{b64_encode, encode_segment},
    crypto,
    error::{JwtError, JwtResult},
    keys::{CanSign, Key},
    task,
    types::{Claims, Header, NumericDate},
};
use tokio_util::sync::CancellationToken;

/// Options for [`sign`]
#[derive(Debug, Clone)]
pub struct SignOptions {
    /// Algorithm written into `alg` and used to sign
    pub algorithm: AlgorithmId,
    /// Optional `kid` header
    pub kid: Option<String>,
    /// Abandon the signature primitive when this fires
    pub cancellation: Option<CancellationToken>,
}

impl SignOptions {
    /// Options for `algorithm` with no `kid`
    #[inline]
    #[must_use]
    pub fn new(algorithm: AlgorithmId) -> Self {
        Self {
            algorithm,
            kid: None,
            cancellation: None,
        }
    }

    /// Set the `kid` header
    #[must_use]
    pub fn with_kid(mut self, kid: impl Into<String>) -> Self {
        self.kid = Some(kid.into());
        self
    }

    /// Attach a cancellation token
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }
}

impl From<AlgorithmId> for SignOptions {
    fn from(algorithm: AlgorithmId) -> Self {
        Self::new(algorithm)
    }
}

/// Sign `payload` into a compact token
///
/// `iat` is set to the current time unless the payload already carries one.
/// Every other claim is emitted as given. The payload must carry a `jti`.
///
/// # Errors
///
/// - [`JwtError::MissingClaim`] when `jti` is absent
/// - [`JwtError::InvalidKey`] when `key` is not bound to `options.algorithm`
/// - [`JwtError::SigningFailed`] when the signature primitive fails
/// - [`JwtError::Cancelled`] when the cancellation token fires first
pub async fn sign<U: CanSign>(
    payload: &Claims,
    key: &Key<U>,
    options: &SignOptions,
) -> JwtResult<String> {
    if !payload.has_claim("jti") {
        return Err(JwtError::missing_claim("jti"));
    }
    let algorithm = options.algorithm;
    let material = key.material_for(algorithm)?;

    let mut header = Header::new(algorithm);
    header.kid.clone_from(&options.kid);

    let mut claims = payload.clone();
    if !claims.has_claim("iat") {
        claims.iat = Some(NumericDate::now());
    }

    let mut token = encode_segment(&header)?;
    token.push('.');
    token.push_str(&encode_segment(&claims)?);

    let signing_input = token.clone().into_bytes();
    let signature = task::run_blocking(options.cancellation.as_ref(), move || {
        crypto::sign(algorithm, &material, &signing_input)
    })
    .await?;

    token.push('.');
    token.push_str(&b64_encode(signature));

    tracing::debug!(
        alg = %algorithm,
        kid = options.kid.as_deref(),
        jti = payload.jti.as_deref(),
        "signed token"
    );
    Ok(token)
}
