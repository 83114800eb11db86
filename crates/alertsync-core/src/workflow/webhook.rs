//! Webhook receiver provisioning
//!
//! Receivers are provisioned idempotently: an existing receiver matching the
//! requested name or URL is reused, so rerunning against the same networks
//! never piles up duplicates.

use console::style;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, Password};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde_json::Value;
use tracing::info;

use crate::dashboard::{DashboardClient, NewWebhookReceiver, PayloadTemplate, WebhookReceiver};
use crate::error::Result;

/// Length of a generated shared secret
pub const GENERATED_SECRET_LEN: usize = 24;

/// Webhook parameters collected once per run and reused for every network
#[derive(Debug, Clone)]
pub struct WebhookSpec {
    /// Receiver name
    pub name: String,

    /// Destination URL, HTTPS only
    pub url: String,

    /// Shared secret included in notification signatures
    pub shared_secret: String,

    /// Whether the receiver is also added to every alert's destinations
    pub link_as_destination: bool,
}

/// Generate a random alphanumeric shared secret
pub fn generate_secret() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(GENERATED_SECRET_LEN)
        .map(char::from)
        .collect()
}

/// A provisioned receiver, distinguishing reuse from creation
#[derive(Debug, Clone)]
pub enum ProvisionedWebhook {
    /// An existing receiver matched the requested name or URL
    Reused(WebhookReceiver),
    /// No receiver matched and a new one was created
    Created(WebhookReceiver),
}

impl ProvisionedWebhook {
    /// The receiver, however it was obtained
    pub fn receiver(&self) -> &WebhookReceiver {
        match self {
            Self::Reused(receiver) | Self::Created(receiver) => receiver,
        }
    }
}

/// Find or create the receiver described by `spec` on a network.
///
/// An existing receiver matching either the name or the URL is returned
/// unchanged, mismatched fields included. At most one receiver is created per
/// network per run.
pub async fn ensure_webhook(
    client: &DashboardClient,
    network_id: &str,
    spec: &WebhookSpec,
) -> Result<ProvisionedWebhook> {
    let existing = client.webhook_receivers(network_id).await?;
    if let Some(hook) = existing
        .into_iter()
        .find(|h| h.matches(&spec.name, &spec.url))
    {
        info!(network_id, receiver_id = %hook.id, "reusing existing webhook receiver");
        return Ok(ProvisionedWebhook::Reused(hook));
    }

    let receiver = client
        .create_webhook_receiver(
            network_id,
            &NewWebhookReceiver {
                name: spec.name.clone(),
                url: spec.url.clone(),
                shared_secret: spec.shared_secret.clone(),
                payload_template: PayloadTemplate::included(),
            },
        )
        .await?;

    info!(network_id, receiver_id = %receiver.id, "created webhook receiver");
    Ok(ProvisionedWebhook::Created(receiver))
}

/// Return a copy of `document` with `webhook_id` appended to the
/// `httpServerIds` destination list of every entry under `alerts`.
///
/// Entries already carrying the ID keep a single copy. The input document is
/// never touched; whether linking applies at all is a per-run choice.
pub fn link_webhook_destination(document: &Value, webhook_id: &str) -> Value {
    let mut doc = document.clone();

    if let Some(alerts) = doc.get_mut("alerts").and_then(Value::as_array_mut) {
        for alert in alerts {
            let Some(alert) = alert.as_object_mut() else {
                continue;
            };

            let destinations = alert
                .entry("alertDestinations")
                .or_insert_with(|| Value::Object(serde_json::Map::new()));
            let Some(destinations) = destinations.as_object_mut() else {
                continue;
            };

            let ids = destinations
                .entry("httpServerIds")
                .or_insert_with(|| Value::Array(Vec::new()));
            let Some(ids) = ids.as_array_mut() else {
                continue;
            };

            if !ids.iter().any(|id| id.as_str() == Some(webhook_id)) {
                ids.push(Value::String(webhook_id.to_string()));
            }
        }
    }

    doc
}

/// Ask whether a webhook should be provisioned and collect its parameters.
///
/// Returns `None` when the operator declines. An empty secret generates a
/// random one, printed once so it can be stored in the receiving system.
pub fn prompt_webhook_spec() -> Result<Option<WebhookSpec>> {
    let wanted = Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt("Create/link a webhook receiver for these alerts?")
        .default(false)
        .interact()?;
    if !wanted {
        return Ok(None);
    }

    let name: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt("Webhook receiver name")
        .interact_text()?;

    let url: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt("Webhook destination URL (https)")
        .validate_with(|candidate: &String| validate_https_url(candidate))
        .interact_text()?;

    let secret: String = Password::with_theme(&ColorfulTheme::default())
        .with_prompt("Shared secret (leave empty to generate)")
        .allow_empty_password(true)
        .interact()?;

    let shared_secret = if secret.is_empty() {
        let generated = generate_secret();
        println!(
            "Generated shared secret: {} {}",
            style(&generated).bold(),
            style("(store it now; it will not be shown again)").dim()
        );
        generated
    } else {
        secret
    };

    let link_as_destination = Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt("Also add the receiver to every alert's destinations?")
        .default(false)
        .interact()?;

    Ok(Some(WebhookSpec {
        name,
        url,
        shared_secret,
        link_as_destination,
    }))
}

/// Validate that a candidate URL parses and uses HTTPS
fn validate_https_url(candidate: &str) -> std::result::Result<(), String> {
    match url::Url::parse(candidate) {
        Ok(parsed) if parsed.scheme() == "https" => Ok(()),
        Ok(parsed) => Err(format!("URL must use https, got {}", parsed.scheme())),
        Err(e) => Err(format!("not a valid URL: {e}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::config::ApiConfig;

    fn test_client(base_url: &str) -> DashboardClient {
        let config = ApiConfig {
            base_url: base_url.to_string(),
            timeout_secs: 5,
            per_page: 100,
        };
        DashboardClient::new("test-key", &config).unwrap()
    }

    fn spec() -> WebhookSpec {
        WebhookSpec {
            name: "Ops Hook".to_string(),
            url: "https://hooks.example.com/meraki".to_string(),
            shared_secret: "s3cret".to_string(),
            link_as_destination: false,
        }
    }

    #[test]
    fn generated_secrets_are_long_and_distinct() {
        let a = generate_secret();
        let b = generate_secret();
        assert_eq!(a.len(), GENERATED_SECRET_LEN);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(a, b);
    }

    #[test]
    fn https_validation() {
        assert!(validate_https_url("https://hooks.example.com/x").is_ok());
        assert!(validate_https_url("http://hooks.example.com/x").is_err());
        assert!(validate_https_url("not a url").is_err());
    }

    #[test]
    fn link_appends_to_each_alert_once() {
        let document = json!({
            "alerts": [
                {"type": "gatewayDown", "enabled": true},
                {"type": "usageAlert", "alertDestinations": {"httpServerIds": ["existing"]}},
                {"type": "dhcpLease", "alertDestinations": {"httpServerIds": ["web_1"]}}
            ]
        });

        let linked = link_webhook_destination(&document, "web_1");

        assert_eq!(
            linked,
            json!({
                "alerts": [
                    {"type": "gatewayDown", "enabled": true,
                     "alertDestinations": {"httpServerIds": ["web_1"]}},
                    {"type": "usageAlert",
                     "alertDestinations": {"httpServerIds": ["existing", "web_1"]}},
                    {"type": "dhcpLease",
                     "alertDestinations": {"httpServerIds": ["web_1"]}}
                ]
            })
        );

        // source document untouched
        assert!(document["alerts"][0].get("alertDestinations").is_none());
    }

    #[test]
    fn link_without_alerts_key_is_a_noop() {
        let document = json!({"defaultDestinations": {"emails": ["noc@example.com"]}});
        assert_eq!(link_webhook_destination(&document, "web_1"), document);
    }

    #[tokio::test]
    async fn ensure_webhook_reuses_name_match() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/networks/N_1/webhooks/httpServers"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": "web_9", "name": "Ops Hook", "url": "https://elsewhere.example.com"}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/networks/N_1/webhooks/httpServers"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({})))
            .expect(0)
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let provisioned = ensure_webhook(&client, "N_1", &spec()).await.unwrap();
        assert!(matches!(provisioned, ProvisionedWebhook::Reused(_)));
        assert_eq!(provisioned.receiver().id, "web_9");
    }

    #[tokio::test]
    async fn ensure_webhook_creates_when_no_match() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/networks/N_1/webhooks/httpServers"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": "web_1", "name": "Other", "url": "https://other.example.com"}
            ])))
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/networks/N_1/webhooks/httpServers"))
            .and(body_partial_json(json!({
                "name": "Ops Hook",
                "url": "https://hooks.example.com/meraki",
                "sharedSecret": "s3cret",
                "payloadTemplate": {"payloadTemplateId": "wpt_00001"}
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "id": "web_2",
                "name": "Ops Hook",
                "url": "https://hooks.example.com/meraki"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let provisioned = ensure_webhook(&client, "N_1", &spec()).await.unwrap();
        assert!(matches!(provisioned, ProvisionedWebhook::Created(_)));
        assert_eq!(provisioned.receiver().id, "web_2");
    }
}
