//! Token header, claims and decoded token types

use crate::{algorithms::AlgorithmId, error::JwtResult};
use serde::{
    Deserialize, Deserializer, Serialize, Serializer, de::Error as _, ser::SerializeMap,
};
use serde_json::{Map, Number, Value};

/// Token type marker written into every emitted header
pub const TOKEN_TYPE: &str = "JWT";

/// JOSE header
///
/// Unknown members are kept in `extra` and re-serialized verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Header {
    /// Token type, `"JWT"` when emitted by this crate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typ: Option<String>,
    /// Algorithm identifier as found on the wire
    #[serde(default)]
    pub alg: String,
    /// Key identifier hint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,
    /// Additional header members
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Header {
    /// Header for a token about to be signed with `alg`
    #[must_use]
    pub fn new(alg: AlgorithmId) -> Self {
        Self {
            typ: Some(TOKEN_TYPE.to_string()),
            alg: alg.as_str().to_string(),
            kid: None,
            extra: Map::new(),
        }
    }

    /// Set the key identifier
    #[must_use]
    pub fn with_kid(mut self, kid: impl Into<String>) -> Self {
        self.kid = Some(kid.into());
        self
    }

    /// Resolve `alg` against the registry
    pub fn algorithm(&self) -> JwtResult<AlgorithmId> {
        self.alg.parse()
    }
}

/// `aud` claim: a single audience or a list of them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Audience {
    /// One audience string
    Single(String),
    /// Several audience strings
    Multiple(Vec<String>),
}

impl Audience {
    /// Whether `aud` names the given audience
    #[must_use]
    pub fn contains(&self, audience: &str) -> bool {
        match self {
            Audience::Single(a) => a == audience,
            Audience::Multiple(list) => list.iter().any(|a| a == audience),
        }
    }
}

/// JWT NumericDate: seconds since the Unix epoch, possibly fractional
///
/// The JSON number is kept as received so integer timestamps re-serialize
/// without a trailing `.0`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NumericDate(Number);

impl NumericDate {
    /// Current time, whole seconds
    #[must_use]
    pub fn now() -> Self {
        Self::from(unix_now())
    }

    /// Value in seconds
    #[must_use]
    pub fn seconds(&self) -> f64 {
        self.0.as_f64().unwrap_or(f64::NAN)
    }

    /// Value as whole seconds, when it is an integer
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        self.0.as_i64()
    }
}

impl From<i64> for NumericDate {
    fn from(seconds: i64) -> Self {
        Self(Number::from(seconds))
    }
}

/// Current Unix time in seconds
pub(crate) fn unix_now() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Token payload
///
/// Registered claims with the expected JSON type are lifted into the typed
/// fields; everything else, including a registered claim of another type,
/// stays in `extra`. A name is never serialized twice: a typed field that is
/// set shadows an `extra` member of the same name.
///
/// `exp` and `nbf` must be numbers (or `null`) for the payload to decode.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Claims {
    /// Issuer
    pub iss: Option<String>,
    /// Subject
    pub sub: Option<String>,
    /// Audience
    pub aud: Option<Audience>,
    /// Expiration time
    pub exp: Option<NumericDate>,
    /// Not before
    pub nbf: Option<NumericDate>,
    /// Issued at
    pub iat: Option<NumericDate>,
    /// Token identifier, required when signing
    pub jti: Option<String>,
    /// Private claims
    pub extra: Map<String, Value>,
}

fn audience(value: &Value) -> Option<Audience> {
    match value {
        Value::String(aud) => Some(Audience::Single(aud.clone())),
        Value::Array(items) => items
            .iter()
            .map(|item| item.as_str().map(str::to_owned))
            .collect::<Option<Vec<_>>>()
            .map(Audience::Multiple),
        _ => None,
    }
}

impl Claims {
    /// Claims carrying only a token identifier
    #[must_use]
    pub fn new(jti: impl Into<String>) -> Self {
        Self {
            jti: Some(jti.into()),
            ..Self::default()
        }
    }

    /// Set `sub`
    #[must_use]
    pub fn with_subject(mut self, sub: impl Into<String>) -> Self {
        self.extra.remove("sub");
        self.sub = Some(sub.into());
        self
    }

    /// Set `iss`
    #[must_use]
    pub fn with_issuer(mut self, iss: impl Into<String>) -> Self {
        self.extra.remove("iss");
        self.iss = Some(iss.into());
        self
    }

    /// Set `aud`
    #[must_use]
    pub fn with_audience(mut self, aud: Audience) -> Self {
        self.extra.remove("aud");
        self.aud = Some(aud);
        self
    }

    /// Set `exp`
    #[must_use]
    pub fn with_expiry(mut self, exp: i64) -> Self {
        self.extra.remove("exp");
        self.exp = Some(exp.into());
        self
    }

    /// Set `nbf`
    #[must_use]
    pub fn with_not_before(mut self, nbf: i64) -> Self {
        self.extra.remove("nbf");
        self.nbf = Some(nbf.into());
        self
    }

    /// Set `iat`, overriding the value the signer would compute
    #[must_use]
    pub fn with_issued_at(mut self, iat: i64) -> Self {
        self.extra.remove("iat");
        self.iat = Some(iat.into());
        self
    }

    /// Set any claim by name
    ///
    /// Registered names land in their typed field when the value has the
    /// expected type. The last write for a name wins.
    #[must_use]
    pub fn with_claim(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        let name = name.into();
        self.clear_typed(&name);
        self.extra.remove(&name);
        if let Some(value) = self.lift(&name, value.into()) {
            self.extra.insert(name, value);
        }
        self
    }

    /// Look up a claim kept as raw JSON
    #[must_use]
    pub fn claim(&self, name: &str) -> Option<&Value> {
        self.extra.get(name)
    }

    /// Whether the payload carries `name`, typed or raw
    #[must_use]
    pub fn has_claim(&self, name: &str) -> bool {
        self.has_typed(name) || self.extra.contains_key(name)
    }

    /// Move `value` into the typed field for `name`, or hand it back
    fn lift(&mut self, name: &str, value: Value) -> Option<Value> {
        match (name, value) {
            ("iss", Value::String(iss)) => self.iss = Some(iss),
            ("sub", Value::String(sub)) => self.sub = Some(sub),
            ("jti", Value::String(jti)) => self.jti = Some(jti),
            ("exp", Value::Number(exp)) => self.exp = Some(NumericDate(exp)),
            ("nbf", Value::Number(nbf)) => self.nbf = Some(NumericDate(nbf)),
            ("iat", Value::Number(iat)) => self.iat = Some(NumericDate(iat)),
            ("aud", value) => match audience(&value) {
                Some(aud) => self.aud = Some(aud),
                None => return Some(value),
            },
            (_, value) => return Some(value),
        }
        None
    }

    fn has_typed(&self, name: &str) -> bool {
        match name {
            "iss" => self.iss.is_some(),
            "sub" => self.sub.is_some(),
            "aud" => self.aud.is_some(),
            "exp" => self.exp.is_some(),
            "nbf" => self.nbf.is_some(),
            "iat" => self.iat.is_some(),
            "jti" => self.jti.is_some(),
            _ => false,
        }
    }

    fn clear_typed(&mut self, name: &str) {
        match name {
            "iss" => self.iss = None,
            "sub" => self.sub = None,
            "aud" => self.aud = None,
            "exp" => self.exp = None,
            "nbf" => self.nbf = None,
            "iat" => self.iat = None,
            "jti" => self.jti = None,
            _ => {}
        }
    }
}

impl Serialize for Claims {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        if let Some(iss) = &self.iss {
            map.serialize_entry("iss", iss)?;
        }
        if let Some(sub) = &self.sub {
            map.serialize_entry("sub", sub)?;
        }
        if let Some(aud) = &self.aud {
            map.serialize_entry("aud", aud)?;
        }
        if let Some(exp) = &self.exp {
            map.serialize_entry("exp", exp)?;
        }
        if let Some(nbf) = &self.nbf {
            map.serialize_entry("nbf", nbf)?;
        }
        if let Some(iat) = &self.iat {
            map.serialize_entry("iat", iat)?;
        }
        if let Some(jti) = &self.jti {
            map.serialize_entry("jti", jti)?;
        }
        for (name, value) in &self.extra {
            if !self.has_typed(name) {
                map.serialize_entry(name, value)?;
            }
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Claims {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let members = Map::<String, Value>::deserialize(deserializer)?;
        let mut claims = Claims::default();
        for (name, value) in members {
            if matches!(name.as_str(), "exp" | "nbf") && !(value.is_number() || value.is_null()) {
                return Err(D::Error::custom(format!("`{name}` is not a NumericDate")));
            }
            if let Some(value) = claims.lift(&name, value) {
                claims.extra.insert(name, value);
            }
        }
        Ok(claims)
    }
}

/// Output of the token codec
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedToken {
    /// Parsed header
    pub header: Header,
    /// Parsed payload
    pub payload: Claims,
    /// Raw signature bytes
    pub signature: Vec<u8>,
    /// Literal `header.payload` bytes the signature covers
    pub signed_data: Vec<u8>,
}

/// A token whose structure, time window and signature all checked out
#[derive(Debug, Clone, PartialEq)]
pub struct VerifiedToken {
    /// Header as decoded
    pub header: Header,
    /// Payload as decoded
    pub payload: Claims,
}
