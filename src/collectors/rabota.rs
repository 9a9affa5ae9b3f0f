use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::auth::{AccessToken, Credentials, SignedParams};
use crate::collectors::VacancyApi;
use crate::error::{HarvestError, Result};
use crate::gateway::{ApiRequest, DEFAULT_TIMEOUT, Gateway};

pub const DEFAULT_BASE_URL: &str = "https://api.rabota.ru";
pub const DEFAULT_REDIRECT_URI: &str = "http://www.example.com/oauth";

const AUTH_SCOPE: &str = "profile,vacancies";

/// Page the account owner opens to grant access and obtain the long-lived
/// `code`.
pub fn authorization_url(base_url: &str, app_id: &str, redirect_uri: &str) -> Result<String> {
    let url = reqwest::Url::parse_with_params(
        &format!("{}/oauth/authorize.html", base_url.trim_end_matches('/')),
        &[
            ("app_id", app_id),
            ("scope", AUTH_SCOPE),
            ("display", "page"),
            ("redirect_uri", redirect_uri),
        ],
    )
    .map_err(|e| HarvestError::InvalidUrl(e.to_string()))?;
    Ok(url.into())
}

/// Client for the rabota.ru v6 API.
pub struct RabotaClient {
    gateway: Gateway,
    base_url: String,
    credentials: Credentials,
    timeout: Duration,
}

impl RabotaClient {
    pub fn new(gateway: Gateway, base_url: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            gateway,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credentials,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Exchange the signed `{app_id, time, code}` set for an access token.
    async fn request_token(&self, unix_time: i64) -> Result<AccessToken> {
        tracing::info!("Getting rabota.ru auth token");

        let form = SignedParams::new()
            .with("app_id", &self.credentials.app_id)
            .with("time", unix_time)
            .with("code", &self.credentials.code)
            .into_form(&self.credentials.app_secret)?;

        let req = ApiRequest::post(format!("{}/oauth/token.json", self.base_url))
            .header("content-type", "application/x-www-form-urlencoded")
            .body(Value::Object(form))
            .timeout(self.timeout);

        let response = self
            .gateway
            .request(req)
            .await?
            .into_json()
            .map_err(|e| HarvestError::Authentication(e.to_string()))?;

        match response.get("access_token").and_then(Value::as_str) {
            Some(token) => {
                tracing::info!("Token received successfully");
                Ok(AccessToken::new(token))
            }
            None => {
                tracing::error!("Failed to get token");
                Err(HarvestError::Authentication(
                    "no access_token in token response".to_string(),
                ))
            }
        }
    }
}

#[async_trait]
impl VacancyApi for RabotaClient {
    fn name(&self) -> &str {
        "rabota.ru"
    }

    async fn authenticate(&self) -> Result<AccessToken> {
        self.request_token(chrono::Utc::now().timestamp()).await
    }

    async fn fetch_vacancy(&self, token: &AccessToken, id: i64) -> Result<Value> {
        let req = ApiRequest::post(format!("{}/v6/vacancy.json", self.base_url))
            .header("Content-Type", "application/json")
            .header("X-Token", token.as_str())
            .body(json!({ "request": { "vacancy_id": id } }))
            .timeout(self.timeout);

        let mut response = self.gateway.request(req).await?.into_json()?;
        match response.get_mut("response") {
            Some(vacancy) if vacancy.is_object() => Ok(vacancy.take()),
            _ => Err(HarvestError::UnexpectedPayload(format!(
                "vacancy {id}: no 'response' object"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authorization_url_carries_app_and_scope() {
        let url = authorization_url("https://api.rabota.ru/", "1234", DEFAULT_REDIRECT_URI).unwrap();
        assert_eq!(
            url,
            "https://api.rabota.ru/oauth/authorize.html?app_id=1234&scope=profile%2Cvacancies\
             &display=page&redirect_uri=http%3A%2F%2Fwww.example.com%2Foauth"
        );
    }

    #[test]
    fn bad_base_url_is_reported() {
        let err = authorization_url("not a url", "1", "x").unwrap_err();
        assert!(matches!(err, HarvestError::InvalidUrl(_)));
    }
}
