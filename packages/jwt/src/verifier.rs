//! Token verification
//!
//! Checks run in a fixed order: structure, `nbf`, `exp`, algorithm,
//! optional allow-list, signature. The first failure wins.

use crate::{
    algorithms::AlgorithmId,
    codec, crypto,
    error::{JwtError, JwtResult},
    keys::{CanVerify, Key},
    task,
    types::{Claims, VerifiedToken, unix_now},
};
use chrono::Duration;
use tokio_util::sync::CancellationToken;

/// Verification options
///
/// The default reproduces plain [`verify`]: the token's own `alg` header
/// selects the algorithm, with zero leeway and no cancellation.
#[derive(Debug, Clone)]
pub struct VerifyOptions {
    /// Accept only these algorithms, when set
    pub allowed_algorithms: Option<Vec<AlgorithmId>>,
    /// Clock-skew tolerance applied to `nbf` and `exp`
    pub leeway: Duration,
    /// Abandon the signature primitive when this fires
    pub cancellation: Option<CancellationToken>,
}

impl Default for VerifyOptions {
    fn default() -> Self {
        Self {
            allowed_algorithms: None,
            leeway: Duration::zero(),
            cancellation: None,
        }
    }
}

impl VerifyOptions {
    /// Default options
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict verification to the given algorithms
    #[must_use]
    pub fn with_allowed_algorithms(
        mut self,
        algorithms: impl IntoIterator<Item = AlgorithmId>,
    ) -> Self {
        self.allowed_algorithms = Some(algorithms.into_iter().collect());
        self
    }

    /// Set the clock-skew leeway
    #[must_use]
    pub fn with_leeway(mut self, leeway: Duration) -> Self {
        self.leeway = leeway;
        self
    }

    /// Attach a cancellation token
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    fn allows(&self, algorithm: AlgorithmId) -> bool {
        self.allowed_algorithms
            .as_ref()
            .is_none_or(|allowed| allowed.contains(&algorithm))
    }
}

/// Enforce `nbf` then `exp` against `now`
///
/// Dates compare as numbers, so fractional seconds count.
pub(crate) fn check_time_window(claims: &Claims, now: i64, leeway: Duration) -> JwtResult<()> {
    let leeway = leeway.num_seconds().max(0);
    let latest_start = now.saturating_add(leeway) as f64;
    let earliest_end = now.saturating_sub(leeway) as f64;
    if claims.nbf.as_ref().is_some_and(|nbf| nbf.seconds() > latest_start) {
        return Err(JwtError::NotYetValid);
    }
    if claims.exp.as_ref().is_some_and(|exp| exp.seconds() <= earliest_end) {
        return Err(JwtError::Expired);
    }
    Ok(())
}

/// Verify `token` with `key` using default options
pub async fn verify<U: CanVerify>(token: &str, key: &Key<U>) -> JwtResult<VerifiedToken> {
    verify_with(token, key, &VerifyOptions::default()).await
}

/// Verify `token` with `key`
///
/// # Errors
///
/// [`JwtError::MalformedToken`], [`JwtError::NotYetValid`],
/// [`JwtError::Expired`], [`JwtError::UnsupportedAlgorithm`],
/// [`JwtError::AlgorithmNotAllowed`], [`JwtError::InvalidKey`] (the key is
/// bound to a different algorithm than the header names),
/// [`JwtError::SignatureInvalid`] or [`JwtError::Cancelled`].
pub async fn verify_with<U: CanVerify>(
    token: &str,
    key: &Key<U>,
    options: &VerifyOptions,
) -> JwtResult<VerifiedToken> {
    let result = verify_inner(token, key, options).await;
    match &result {
        Ok(verified) => tracing::debug!(
            alg = %verified.header.alg,
            kid = verified.header.kid.as_deref(),
            "token verified"
        ),
        Err(e) => tracing::warn!(kind = ?e.kind(), error = %e, "token rejected"),
    }
    result
}

async fn verify_inner<U: CanVerify>(
    token: &str,
    key: &Key<U>,
    options: &VerifyOptions,
) -> JwtResult<VerifiedToken> {
    let decoded = codec::decode(token)?;

    check_time_window(&decoded.payload, unix_now(), options.leeway)?;

    let algorithm = decoded.header.algorithm()?;
    if !options.allows(algorithm) {
        return Err(JwtError::AlgorithmNotAllowed(algorithm.to_string()));
    }
    let material = key.material_for(algorithm)?;

    let signature = decoded.signature;
    let signed_data = decoded.signed_data;
    let valid = task::run_blocking(options.cancellation.as_ref(), move || {
        crypto::verify(algorithm, &material, &signed_data, &signature)
    })
    .await?;

    if !valid {
        return Err(JwtError::SignatureInvalid);
    }
    Ok(VerifiedToken {
        header: decoded.header,
        payload: decoded.payload,
    })
}
