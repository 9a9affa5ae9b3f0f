use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use serde_json::Value;

pub use reqwest::Method;

use crate::error::{HarvestError, Result};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// A single outbound API call.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub params: Vec<(String, String)>,
    pub body: Option<Value>,
    pub timeout: Duration,
}

impl ApiRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            params: Vec::new(),
            body: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::POST, url)
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((name.into(), value.into()));
        self
    }

    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn is_form(&self) -> bool {
        self.headers.iter().any(|(name, value)| {
            name.eq_ignore_ascii_case(CONTENT_TYPE.as_str())
                && value.to_ascii_lowercase().contains(FORM_URLENCODED)
        })
    }
}

/// Decoded response body.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Json(Value),
    Text(String),
    Bytes(Vec<u8>),
}

impl Payload {
    pub fn into_json(self) -> Result<Value> {
        match self {
            Payload::Json(value) => Ok(value),
            Payload::Text(text) => Err(HarvestError::UnexpectedPayload(format!(
                "expected JSON, got text: {}",
                truncate(&text, 200)
            ))),
            Payload::Bytes(bytes) => Err(HarvestError::UnexpectedPayload(format!(
                "expected JSON, got {} bytes",
                bytes.len()
            ))),
        }
    }
}

/// Shared request executor for every source.
#[derive(Debug, Clone)]
pub struct Gateway {
    client: reqwest::Client,
}

impl Gateway {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("vacancy-harvester/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }

    pub async fn request(&self, req: ApiRequest) -> Result<Payload> {
        tracing::info!("Requesting {} {}", req.method, req.url);

        let mut builder = self
            .client
            .request(req.method.clone(), &req.url)
            .timeout(req.timeout);

        for (name, value) in &req.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if !req.params.is_empty() {
            builder = builder.query(&req.params);
        }
        if let Some(body) = &req.body {
            builder = if req.is_form() {
                builder.form(&form_pairs(body)?)
            } else {
                builder.json(body)
            };
        }

        let resp = builder.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(HarvestError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        let is_json = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|ct| ct.to_ascii_lowercase().contains("application/json"))
            .unwrap_or(false);

        let bytes = resp.bytes().await?;
        if is_json {
            let value = serde_json::from_slice(&bytes).map_err(|e| {
                HarvestError::UnexpectedPayload(format!("invalid JSON body: {e}"))
            })?;
            return Ok(Payload::Json(value));
        }

        match String::from_utf8(bytes.to_vec()) {
            Ok(text) => Ok(Payload::Text(text)),
            Err(e) => Ok(Payload::Bytes(e.into_bytes())),
        }
    }
}

/// Flatten a JSON object into form fields. Only scalar values are allowed.
fn form_pairs(body: &Value) -> Result<Vec<(String, String)>> {
    let obj = body.as_object().ok_or_else(|| {
        HarvestError::Serialization("form body must be a JSON object".to_string())
    })?;

    obj.iter()
        .map(|(key, value)| {
            let text = match value {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                Value::Null => String::new(),
                Value::Array(_) | Value::Object(_) => {
                    return Err(HarvestError::Serialization(format!(
                        "form field '{key}' is not a scalar"
                    )));
                }
            };
            Ok((key.clone(), text))
        })
        .collect()
}

fn truncate(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn detects_form_content_type_case_insensitively() {
        let req = ApiRequest::post("http://x")
            .header("Content-Type", "Application/X-WWW-Form-Urlencoded; charset=utf-8");
        assert!(req.is_form());

        let req = ApiRequest::post("http://x").header("content-type", "application/json");
        assert!(!req.is_form());
        assert!(!ApiRequest::post("http://x").is_form());
    }

    #[test]
    fn form_pairs_stringify_scalars() {
        let pairs = form_pairs(&json!({"a": "x", "b": 2, "c": false, "d": null})).unwrap();
        assert_eq!(
            pairs,
            vec![
                ("a".to_string(), "x".to_string()),
                ("b".to_string(), "2".to_string()),
                ("c".to_string(), "false".to_string()),
                ("d".to_string(), String::new()),
            ]
        );
        assert!(form_pairs(&json!({"a": [1]})).is_err());
        assert!(form_pairs(&json!("plain")).is_err());
    }

    #[test]
    fn text_payload_is_not_json() {
        let err = Payload::Text("<html>".into()).into_json().unwrap_err();
        assert!(matches!(err, HarvestError::UnexpectedPayload(_)));
    }

    #[test]
    fn default_timeout_is_sixty_seconds() {
        assert_eq!(ApiRequest::get("http://x").timeout, Duration::from_secs(60));
    }
}
