//! Dashboard API client
//!
//! Thin async client for the Meraki Dashboard API v1. List endpoints are
//! paginated with `Link: rel=next` headers, which [`DashboardClient`] follows
//! transparently so callers always see complete collections.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, LINK};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::config::ApiConfig;
use crate::dashboard::models::{Network, NewWebhookReceiver, Organization, WebhookReceiver};
use crate::error::{Error, Result};

/// Environment variable the Dashboard API key is read from
pub const API_KEY_ENV: &str = "MERAKI_DASHBOARD_API_KEY";

/// Client for the Meraki Dashboard API v1
#[derive(Debug, Clone)]
pub struct DashboardClient {
    http: Client,
    base_url: String,
    per_page: usize,
}

impl DashboardClient {
    /// Create a client authenticated with the given API key.
    ///
    /// The key is sent as a `Bearer` token on every request and marked
    /// sensitive so it never shows up in debug output.
    pub fn new(api_key: &str, config: &ApiConfig) -> Result<Self> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {api_key}"))
            .map_err(|_| Error::auth("API key contains characters not allowed in a header"))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);

        let http = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("alertsync/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            per_page: config.per_page,
        })
    }

    /// List organizations the API key has access to
    pub async fn organizations(&self) -> Result<Vec<Organization>> {
        self.get_paginated(&format!("{}/organizations", self.base_url))
            .await
    }

    /// List networks in an organization
    pub async fn organization_networks(&self, org_id: &str) -> Result<Vec<Network>> {
        self.get_paginated(&format!("{}/organizations/{org_id}/networks", self.base_url))
            .await
    }

    /// List webhook receivers configured on a network
    pub async fn webhook_receivers(&self, network_id: &str) -> Result<Vec<WebhookReceiver>> {
        let url = format!("{}/networks/{network_id}/webhooks/httpServers", self.base_url);
        let response = self.http.get(&url).send().await?;
        decode(response).await
    }

    /// Create a webhook receiver on a network
    pub async fn create_webhook_receiver(
        &self,
        network_id: &str,
        receiver: &NewWebhookReceiver,
    ) -> Result<WebhookReceiver> {
        let url = format!("{}/networks/{network_id}/webhooks/httpServers", self.base_url);
        let response = self.http.post(&url).json(receiver).send().await?;
        decode(response).await
    }

    /// Fetch the alert settings of a network
    pub async fn alert_settings(&self, network_id: &str) -> Result<Value> {
        let url = format!("{}/networks/{network_id}/alerts/settings", self.base_url);
        let response = self.http.get(&url).send().await?;
        decode(response).await
    }

    /// Replace the alert settings of a network
    pub async fn update_alert_settings(&self, network_id: &str, settings: &Value) -> Result<Value> {
        let url = format!("{}/networks/{network_id}/alerts/settings", self.base_url);
        let response = self.http.put(&url).json(settings).send().await?;
        decode(response).await
    }

    /// GET a list endpoint, following `Link: rel=next` until exhausted
    async fn get_paginated<T: DeserializeOwned>(&self, url: &str) -> Result<Vec<T>> {
        let mut items = Vec::new();
        let mut next = Some(format!("{url}?perPage={}", self.per_page));

        while let Some(url) = next {
            debug!(url = %url, "fetching page");
            let response = self.http.get(&url).send().await?;
            next = next_link(response.headers());
            let page: Vec<T> = decode(response).await?;
            items.extend(page);
        }

        Ok(items)
    }
}

/// Decode a response body, mapping Dashboard error payloads to [`Error`]
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }

    let body = response.text().await.unwrap_or_default();
    let message = api_error_message(&body);

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(Error::auth(message)),
        _ => Err(Error::api(status.as_u16(), message)),
    }
}

/// Pull the human-readable messages out of a Dashboard error body.
///
/// Error responses carry `{"errors": ["..."]}`; anything else is passed
/// through trimmed.
fn api_error_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        if let Some(errors) = value.get("errors").and_then(Value::as_array) {
            let messages: Vec<&str> = errors.iter().filter_map(Value::as_str).collect();
            if !messages.is_empty() {
                return messages.join("; ");
            }
        }
    }

    if body.trim().is_empty() {
        "no error detail in response".to_string()
    } else {
        body.trim().to_string()
    }
}

/// Extract the `rel=next` target from a `Link` response header
fn next_link(headers: &HeaderMap) -> Option<String> {
    let link = headers.get(LINK)?.to_str().ok()?;

    link.split(',').find_map(|entry| {
        let (target, params) = entry.split_once(';')?;
        let is_next = params.split(';').any(|param| {
            let param = param.trim();
            param == "rel=next" || param == r#"rel="next""#
        });
        if !is_next {
            return None;
        }

        let target = target.trim();
        Some(
            target
                .trim_start_matches('<')
                .trim_end_matches('>')
                .to_string(),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(base_url: &str) -> DashboardClient {
        let config = ApiConfig {
            base_url: base_url.to_string(),
            timeout_secs: 5,
            per_page: 2,
        };
        DashboardClient::new("test-key", &config).unwrap()
    }

    #[test]
    fn next_link_finds_rel_next() {
        let mut headers = HeaderMap::new();
        headers.insert(
            LINK,
            HeaderValue::from_static(
                "<https://api.example.com/orgs?page=1>; rel=first, \
                 <https://api.example.com/orgs?page=3>; rel=next, \
                 <https://api.example.com/orgs?page=9>; rel=last",
            ),
        );

        assert_eq!(
            next_link(&headers).as_deref(),
            Some("https://api.example.com/orgs?page=3")
        );
    }

    #[test]
    fn next_link_accepts_quoted_rel() {
        let mut headers = HeaderMap::new();
        headers.insert(
            LINK,
            HeaderValue::from_static(r#"<https://api.example.com/orgs?page=2>; rel="next""#),
        );

        assert_eq!(
            next_link(&headers).as_deref(),
            Some("https://api.example.com/orgs?page=2")
        );
    }

    #[test]
    fn next_link_absent_when_no_next_rel() {
        let mut headers = HeaderMap::new();
        headers.insert(
            LINK,
            HeaderValue::from_static("<https://api.example.com/orgs?page=9>; rel=last"),
        );
        assert_eq!(next_link(&headers), None);

        assert_eq!(next_link(&HeaderMap::new()), None);
    }

    #[test]
    fn api_error_message_joins_error_array() {
        let body = r#"{"errors": ["Invalid network ID", "Try again"]}"#;
        assert_eq!(api_error_message(body), "Invalid network ID; Try again");
    }

    #[test]
    fn api_error_message_falls_back_to_raw_body() {
        assert_eq!(api_error_message("  gateway timeout  "), "gateway timeout");
        assert_eq!(api_error_message(""), "no error detail in response");
    }

    #[tokio::test]
    async fn organizations_follow_pagination() {
        let server = MockServer::start().await;

        let next = format!("<{}/organizations?startingAfter=org2>; rel=next", server.uri());
        Mock::given(method("GET"))
            .and(path("/organizations"))
            .and(query_param("perPage", "2"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([
                        {"id": "org1", "name": "First"},
                        {"id": "org2", "name": "Second"}
                    ]))
                    .insert_header("Link", next.as_str()),
            )
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/organizations"))
            .and(query_param("startingAfter", "org2"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!([{"id": "org3", "name": "Third"}])),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let orgs = client.organizations().await.unwrap();

        let ids: Vec<&str> = orgs.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["org1", "org2", "org3"]);
    }

    #[tokio::test]
    async fn unauthorized_maps_to_auth_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/organizations"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({"errors": ["Invalid API key"]})),
            )
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let err = client.organizations().await.unwrap_err();

        match err {
            Error::Auth(message) => assert_eq!(message, "Invalid API key"),
            other => panic!("expected auth error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn api_errors_carry_status_and_message() {
        let server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path("/networks/N_1/alerts/settings"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(json!({"errors": ["alerts must be an array"]})),
            )
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let err = client
            .update_alert_settings("N_1", &json!({"alerts": {}}))
            .await
            .unwrap_err();

        match err {
            Error::Api { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "alerts must be an array");
            }
            other => panic!("expected API error, got {other:?}"),
        }
    }
}
