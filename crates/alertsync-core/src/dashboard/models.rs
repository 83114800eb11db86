//! Dashboard API data models

use serde::{Deserialize, Serialize};

/// Payload template identifier for the built-in Meraki webhook format
pub const INCLUDED_PAYLOAD_TEMPLATE_ID: &str = "wpt_00001";

/// An organization the API key has access to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    /// Organization ID
    pub id: String,

    /// Organization name
    pub name: String,
}

/// A network within an organization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Network {
    /// Network ID
    pub id: String,

    /// Network name
    pub name: String,

    /// Tags assigned to the network
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Network {
    /// Check whether this network carries the given tag
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// A webhook HTTP receiver configured on a network
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookReceiver {
    /// Receiver ID
    pub id: String,

    /// Receiver name
    pub name: String,

    /// Destination URL notifications are POSTed to
    pub url: String,

    /// Payload template the receiver formats notifications with
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload_template: Option<PayloadTemplate>,
}

impl WebhookReceiver {
    /// Check whether this receiver already covers the requested name or URL.
    ///
    /// A match on either field is enough: two receivers on one network may not
    /// share a name, and a second receiver for the same URL would double-send
    /// every notification.
    pub fn matches(&self, name: &str, url: &str) -> bool {
        self.name == name || self.url == url
    }
}

/// Payload template reference on a webhook receiver
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayloadTemplate {
    /// Template ID
    pub payload_template_id: String,

    /// Template name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl PayloadTemplate {
    /// The built-in "Meraki (included)" payload template
    pub fn included() -> Self {
        Self {
            payload_template_id: INCLUDED_PAYLOAD_TEMPLATE_ID.to_string(),
            name: Some("Meraki (included)".to_string()),
        }
    }
}

/// Input for creating a webhook receiver on a network
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewWebhookReceiver {
    /// Receiver name
    pub name: String,

    /// Destination URL, must be HTTPS
    pub url: String,

    /// Shared secret included in notification signatures
    pub shared_secret: String,

    /// Payload template to format notifications with
    pub payload_template: PayloadTemplate,
}
