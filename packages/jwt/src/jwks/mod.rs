//! Key-set resolution
//!
//! [`JwksResolver`] reads the `kid` from a token header, fetches the
//! key-set document, picks the matching entry, imports it as a verify-only
//! key and hands over to [`verify_with`](crate::verifier::verify_with).
//! Nothing is cached unless the fetcher does it.

mod document;
mod fetcher;

pub use document::{KeyEntry, KeySetDocument};
pub use fetcher::{CachingKeySetFetcher, HttpKeySetFetcher, KeySetFetcher};

use crate::{
    codec,
    error::JwtResult,
    keys::VerifyingKey,
    task,
    types::VerifiedToken,
    verifier::{VerifyOptions, verify_with},
};
use url::Url;

/// Verifies tokens against a remotely published key set
#[derive(Debug, Clone, Default)]
pub struct JwksResolver<F = HttpKeySetFetcher> {
    fetcher: F,
    options: VerifyOptions,
}

impl JwksResolver {
    /// Resolver with a default HTTP fetcher and default options
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl<F: KeySetFetcher> JwksResolver<F> {
    /// Resolver using `fetcher`
    #[must_use]
    pub fn with_fetcher(fetcher: F) -> Self {
        Self {
            fetcher,
            options: VerifyOptions::default(),
        }
    }

    /// Replace the verification options
    #[must_use]
    pub fn with_options(mut self, options: VerifyOptions) -> Self {
        self.options = options;
        self
    }

    /// Verification options in use
    #[must_use]
    pub fn options(&self) -> &VerifyOptions {
        &self.options
    }

    /// Verify `token` with the matching key from the set at `location`
    ///
    /// # Errors
    ///
    /// Header decoding fails with `MalformedToken`. The fetch fails with
    /// `NetworkFailure` or `InvalidJwks`. Selection fails with `KeyNotFound`,
    /// and an entry without a usable `alg` gives `UnsupportedAlgorithm`.
    /// Import fails with `InvalidKey`. Anything [`verify_with`] returns
    /// passes through unchanged.
    pub async fn verify(&self, token: &str, location: &Url) -> JwtResult<VerifiedToken> {
        let header = codec::decode_header(token)?;

        let document = task::cancellable(
            self.options.cancellation.as_ref(),
            self.fetcher.fetch(location),
        )
        .await?;

        let entry = document.select(header.kid.as_deref())?;
        let algorithm = entry.algorithm()?;
        let key = VerifyingKey::from_jwk(algorithm, &entry.to_jwk()?)?;

        tracing::debug!(
            location = %location,
            kid = entry.kid(),
            alg = %algorithm,
            "selected key-set entry"
        );

        verify_with(token, &key, &self.options).await
    }
}

/// Verify `token` against the key set at `location` with default settings
///
/// Every call fetches the document again.
pub async fn verify_via_key_set(token: &str, location: &Url) -> JwtResult<VerifiedToken> {
    JwksResolver::new().verify(token, location).await
}
