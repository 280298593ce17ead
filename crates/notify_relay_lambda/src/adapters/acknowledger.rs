use async_trait::async_trait;

use crate::runtime::contract::{AckStatus, Acknowledgment, ProvisioningEvent};

#[derive(Debug, thiserror::Error)]
pub enum AcknowledgeError {
    #[error("provisioning event has no ResponseURL to acknowledge")]
    MissingResponseUrl,

    #[error("failed to serialize acknowledgment: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to deliver acknowledgment: {0}")]
    Http(#[from] reqwest::Error),

    #[error("orchestrator rejected acknowledgment with status {0}")]
    Rejected(u16),
}

/// Reports the invocation result back to the orchestrator that triggered it.
#[async_trait]
pub trait Acknowledger: Send + Sync {
    async fn acknowledge(
        &self,
        event: &ProvisioningEvent,
        status: AckStatus,
    ) -> Result<(), AcknowledgeError>;
}

/// Uploads the response document to the event's pre-signed response URL.
#[derive(Debug, Clone)]
pub struct CfnResponseAcknowledger {
    client: reqwest::Client,
    log_stream_name: String,
}

impl CfnResponseAcknowledger {
    pub fn new(client: reqwest::Client, log_stream_name: impl Into<String>) -> Self {
        Self {
            client,
            log_stream_name: log_stream_name.into(),
        }
    }
}

#[async_trait]
impl Acknowledger for CfnResponseAcknowledger {
    async fn acknowledge(
        &self,
        event: &ProvisioningEvent,
        status: AckStatus,
    ) -> Result<(), AcknowledgeError> {
        let response_url = event
            .response_url
            .as_deref()
            .filter(|value| !value.trim().is_empty())
            .ok_or(AcknowledgeError::MissingResponseUrl)?;

        let document = Acknowledgment::for_event(event, status, &self.log_stream_name);
        let body = serde_json::to_vec(&document)?;

        tracing::info!(
            status = ?status,
            physical_resource_id = %document.physical_resource_id,
            "sending acknowledgment to orchestrator"
        );

        // The pre-signed URL is signed without a content type.
        let response = self.client.put(response_url).body(body).send().await?;
        if !response.status().is_success() {
            return Err(AcknowledgeError::Rejected(response.status().as_u16()));
        }

        tracing::debug!(status_code = response.status().as_u16(), "acknowledgment accepted");
        Ok(())
    }
}
