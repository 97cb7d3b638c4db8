//! Key-set document schema

use crate::{
    algorithms::AlgorithmId,
    error::{JwtError, JwtResult},
    keys::Jwk,
};
use serde_json::{Map, Value};

/// One entry of a key-set document, kept as the raw JSON object
#[derive(Debug, Clone, PartialEq)]
pub struct KeyEntry(Map<String, Value>);

impl KeyEntry {
    /// `kid` member, when it is a string
    #[must_use]
    pub fn kid(&self) -> Option<&str> {
        self.0.get("kid").and_then(Value::as_str)
    }

    /// `alg` member, when it is a string
    #[must_use]
    pub fn alg(&self) -> Option<&str> {
        self.0.get("alg").and_then(Value::as_str)
    }

    /// Resolve `alg` against the registry
    ///
    /// A missing, non-string or unknown `alg` is `UnsupportedAlgorithm`.
    pub fn algorithm(&self) -> JwtResult<AlgorithmId> {
        match self.0.get("alg") {
            Some(Value::String(alg)) => alg.parse(),
            Some(other) => Err(JwtError::unsupported_algorithm(other.to_string())),
            None => Err(JwtError::unsupported_algorithm("<missing alg>")),
        }
    }

    /// Typed view of the entry for key import
    pub fn to_jwk(&self) -> JwtResult<Jwk> {
        serde_json::from_value(Value::Object(self.0.clone()))
            .map_err(|e| JwtError::invalid_key(format!("key-set entry is not a JWK: {e}")))
    }

    /// Raw JSON members
    #[must_use]
    pub fn members(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl TryFrom<Jwk> for KeyEntry {
    type Error = JwtError;

    fn try_from(jwk: Jwk) -> JwtResult<Self> {
        match serde_json::to_value(jwk) {
            Ok(Value::Object(map)) => Ok(Self(map)),
            Ok(other) => Err(JwtError::invalid_key(format!(
                "JWK serialized to {other} instead of an object"
            ))),
            Err(e) => Err(JwtError::invalid_key(format!("JWK does not serialize: {e}"))),
        }
    }
}

/// Validated `{ "keys": [ ... ] }` document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeySetDocument {
    /// Entries in document order
    pub keys: Vec<KeyEntry>,
}

impl KeySetDocument {
    /// Parse and validate raw JSON bytes
    pub fn from_slice(bytes: &[u8]) -> JwtResult<Self> {
        let value: Value = serde_json::from_slice(bytes)
            .map_err(|e| JwtError::invalid_jwks(format!("not JSON: {e}")))?;
        Self::from_value(value)
    }

    /// Validate an already-parsed JSON value
    pub fn from_value(value: Value) -> JwtResult<Self> {
        let Value::Object(mut root) = value else {
            return Err(JwtError::invalid_jwks("document is not a JSON object"));
        };
        let Some(Value::Array(entries)) = root.remove("keys") else {
            return Err(JwtError::invalid_jwks("document has no 'keys' array"));
        };
        let keys = entries
            .into_iter()
            .enumerate()
            .map(|(i, entry)| match entry {
                Value::Object(map) => Ok(KeyEntry(map)),
                _ => Err(JwtError::invalid_jwks(format!("keys[{i}] is not an object"))),
            })
            .collect::<JwtResult<Vec<_>>>()?;
        Ok(Self { keys })
    }

    /// Pick the entry to verify with
    ///
    /// With a `kid`, the first entry carrying that `kid`; without one, the
    /// first entry. An empty `kid` counts as no `kid`. `KeyNotFound`
    /// otherwise.
    pub fn select(&self, kid: Option<&str>) -> JwtResult<&KeyEntry> {
        match kid.filter(|kid| !kid.is_empty()) {
            Some(kid) => self
                .keys
                .iter()
                .find(|entry| entry.kid() == Some(kid))
                .ok_or_else(|| JwtError::KeyNotFound(Some(kid.to_string()))),
            None => self.keys.first().ok_or(JwtError::KeyNotFound(None)),
        }
    }

    /// Add an entry, for publishing a key set
    #[must_use]
    pub fn with_key(mut self, entry: KeyEntry) -> Self {
        self.keys.push(entry);
        self
    }

    /// Serialize back to `{ "keys": [ ... ] }`
    #[must_use]
    pub fn to_value(&self) -> Value {
        let keys = self
            .keys
            .iter()
            .map(|entry| Value::Object(entry.0.clone()))
            .collect();
        let mut root = Map::new();
        root.insert("keys".to_string(), Value::Array(keys));
        Value::Object(root)
    }
}
