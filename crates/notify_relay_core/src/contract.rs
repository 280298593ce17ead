use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const STATUS_OK: u16 = 200;
pub const TRANSPORT_FAILURE_STATUS: u16 = 400;
pub const TRANSPORT_FAILURE_BODY: &str = "error";
pub const ACK_REASON_PREFIX: &str = "See the details in CloudWatch Log Stream: ";

/// Lifecycle action declared by the orchestrator, decided once at decode time.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum RequestType {
    Create,
    Update,
    Delete,
    Other(String),
}

impl RequestType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Create => "Create",
            Self::Update => "Update",
            Self::Delete => "Delete",
            Self::Other(raw) => raw,
        }
    }
}

impl From<String> for RequestType {
    fn from(raw: String) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "create" => Self::Create,
            "update" => Self::Update,
            "delete" => Self::Delete,
            _ => Self::Other(raw),
        }
    }
}

impl From<&str> for RequestType {
    fn from(raw: &str) -> Self {
        Self::from(raw.to_string())
    }
}

impl Serialize for RequestType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl std::fmt::Display for RequestType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ResourceProperties {
    #[serde(rename = "NotificationUrl", default)]
    pub notification_url: Option<String>,
    #[serde(rename = "RoleArn", default)]
    pub role_arn: Option<String>,
    #[serde(rename = "ExternalID", default)]
    pub external_id: Option<String>,
    #[serde(rename = "AccountID", default)]
    pub account_id: Option<String>,
    #[serde(rename = "CurPath", default)]
    pub cur_path: Option<String>,
    #[serde(rename = "S3Bucket", default)]
    pub s3_bucket: Option<String>,
}

/// Custom-resource request carried inside the pub/sub message.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProvisioningEvent {
    pub request_type: RequestType,
    pub stack_id: String,
    #[serde(rename = "ResponseURL", default)]
    pub response_url: Option<String>,
    #[serde(default)]
    pub request_id: Option<String>,
    #[serde(default)]
    pub logical_resource_id: Option<String>,
    #[serde(default)]
    pub physical_resource_id: Option<String>,
    #[serde(default)]
    pub resource_properties: ResourceProperties,
}

impl ProvisioningEvent {
    /// Target of the forward; only read once the request kind needs one.
    pub fn notification_url(&self) -> Option<&str> {
        self.resource_properties
            .notification_url
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }

    pub fn forward_payload(&self) -> ForwardPayload {
        let properties = &self.resource_properties;
        ForwardPayload {
            stack_id: self.stack_id.clone(),
            management_arn: properties.role_arn.clone(),
            external_id: properties.external_id.clone(),
            account_id: properties.account_id.clone(),
            cur_path: properties.cur_path.clone(),
            s3_bucket: properties.s3_bucket.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForwardPayload {
    pub stack_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub management_arn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cur_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub s3_bucket: Option<String>,
}

/// Status and body returned by the management endpoint, or the transport fallback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForwardOutcome {
    pub status_code: u16,
    pub body: String,
}

impl ForwardOutcome {
    pub fn new(status_code: u16, body: impl Into<String>) -> Self {
        Self {
            status_code,
            body: body.into(),
        }
    }

    pub fn transport_failure() -> Self {
        Self::new(TRANSPORT_FAILURE_STATUS, TRANSPORT_FAILURE_BODY)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AckStatus {
    Success,
    Failed,
}

/// Response document the orchestrator reads from the pre-signed response URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Acknowledgment {
    pub status: AckStatus,
    pub reason: String,
    pub physical_resource_id: String,
    pub stack_id: String,
    pub request_id: Option<String>,
    pub logical_resource_id: Option<String>,
    pub no_echo: bool,
    pub data: Map<String, Value>,
}

impl Acknowledgment {
    /// Keys the acknowledgment to `event`; the physical id falls back to the log stream.
    pub fn for_event(event: &ProvisioningEvent, status: AckStatus, log_stream_name: &str) -> Self {
        let physical_resource_id = event
            .physical_resource_id
            .as_deref()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or(log_stream_name)
            .to_string();

        Self {
            status,
            reason: format!("{ACK_REASON_PREFIX}{log_stream_name}"),
            physical_resource_id,
            stack_id: event.stack_id.clone(),
            request_id: event.request_id.clone(),
            logical_resource_id: event.logical_resource_id.clone(),
            no_echo: false,
            data: Map::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelayReport {
    pub request_type: RequestType,
    pub forwarded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    pub acknowledgment: AckStatus,
}
