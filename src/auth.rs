use std::collections::BTreeMap;
use std::fmt;

use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use crate::error::{HarvestError, Result};

/// App credentials for the rabota.ru API. Loaded once at startup.
#[derive(Clone)]
pub struct Credentials {
    pub app_id: String,
    pub app_secret: String,
    pub code: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("app_id", &self.app_id)
            .field("app_secret", &"***")
            .field("code", &"***")
            .finish()
    }
}

/// Short-lived token returned by the token endpoint. Never refreshed.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

/// Compute the request signature for a parameter set.
///
/// Values are coerced to text, sorted by key, serialized as compact JSON
/// (non-ASCII kept as-is), suffixed with the secret and hashed with SHA-256.
///
/// Only string and integer values are expected. Floats in exponent form
/// format as `1e16` here but `1e+16` on the API side, so their signatures
/// would not match.
pub fn sign(params: &Map<String, Value>, secret: &str) -> Result<String> {
    let mut stringified = BTreeMap::new();
    for (key, value) in params {
        stringified.insert(key.as_str(), stringify(key, value)?);
    }
    sign_sorted(&stringified, secret)
}

fn sign_sorted<K, V>(sorted: &BTreeMap<K, V>, secret: &str) -> Result<String>
where
    K: serde::Serialize + Ord,
    V: serde::Serialize,
{
    let canonical = serde_json::to_string(sorted)?;
    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    hasher.update(secret.as_bytes());
    Ok(hex::encode(hasher.finalize()))
}

/// Text form of a scalar, matching what the API side computes its own
/// signature from.
fn stringify(key: &str, value: &Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(true) => Ok("True".to_string()),
        Value::Bool(false) => Ok("False".to_string()),
        Value::Null => Ok("None".to_string()),
        Value::Array(_) | Value::Object(_) => Err(HarvestError::Serialization(format!(
            "parameter '{key}' is not a scalar and cannot be signed"
        ))),
    }
}

/// Parameter set that carries its own signature once sealed.
#[derive(Debug, Default, Clone)]
pub struct SignedParams {
    params: BTreeMap<String, String>,
}

impl SignedParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.params.insert(key.into(), value.to_string());
        self
    }

    pub fn signature(&self, secret: &str) -> Result<String> {
        sign_sorted(&self.params, secret)
    }

    /// All params plus the `signature` field, ready to send as a form body.
    pub fn into_form(self, secret: &str) -> Result<Map<String, Value>> {
        let signature = self.signature(secret)?;
        let mut form: Map<String, Value> = self
            .params
            .into_iter()
            .map(|(k, v)| (k, Value::String(v)))
            .collect();
        form.insert("signature".to_string(), Value::String(signature));
        Ok(form)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn matches_reference_signature() {
        let params = object(json!({"app_id": "123", "time": "1700000000", "code": "abc"}));
        assert_eq!(
            sign(&params, "s3cret").unwrap(),
            "b58c059049877f72e4a3064c93fa8521437f41270041404f48fc4c67bf580d40"
        );
    }

    #[test]
    fn coerces_scalars_and_keeps_non_ascii() {
        let params = object(json!({"town": "Москва", "n": 5, "flag": true, "none": null}));
        assert_eq!(
            sign(&params, "k").unwrap(),
            "4783a51c3b83d0e6d67cf58aa150254b33385eb22d1a2d305abc85ee25612f49"
        );
    }

    #[test]
    fn insertion_order_does_not_matter() {
        let a = SignedParams::new()
            .with("time", 1700000000)
            .with("app_id", "123")
            .with("code", "abc");
        let b = SignedParams::new()
            .with("code", "abc")
            .with("app_id", 123)
            .with("time", "1700000000");
        assert_eq!(a.signature("s3cret").unwrap(), b.signature("s3cret").unwrap());

        let map = object(json!({"app_id": "123", "time": "1700000000", "code": "abc"}));
        assert_eq!(a.signature("s3cret").unwrap(), sign(&map, "s3cret").unwrap());
    }

    #[test]
    fn integers_sign_like_their_decimal_text() {
        let params = object(json!({"app_id": 123, "time": 1700000000, "code": "abc"}));
        assert_eq!(
            sign(&params, "s3cret").unwrap(),
            "b58c059049877f72e4a3064c93fa8521437f41270041404f48fc4c67bf580d40"
        );
    }

    #[test]
    fn secret_changes_signature() {
        let params = SignedParams::new().with("app_id", "123");
        assert_ne!(
            params.signature("one").unwrap(),
            params.signature("two").unwrap()
        );
    }

    #[test]
    fn nested_values_are_rejected() {
        let params = object(json!({"app_id": "1", "scope": ["a", "b"]}));
        let err = sign(&params, "k").unwrap_err();
        assert!(matches!(err, HarvestError::Serialization(_)));
    }

    #[test]
    fn form_carries_signature() {
        let params = SignedParams::new().with("app_id", "123");
        let expected = params.signature("k").unwrap();
        let form = params.into_form("k").unwrap();
        assert_eq!(form["app_id"], "123");
        assert_eq!(form["signature"], Value::String(expected));
    }
}
