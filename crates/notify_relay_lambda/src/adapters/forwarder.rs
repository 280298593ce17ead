use async_trait::async_trait;
use reqwest::Url;

use crate::runtime::contract::{ForwardOutcome, ForwardPayload};
use crate::runtime::dispatch::ForwardMethod;

/// Delivers the derived payload to the management endpoint.
///
/// Implementations never fail: transport problems become
/// [`ForwardOutcome::transport_failure`] so the caller always has exactly one
/// outcome to report.
#[async_trait]
pub trait ManagementForwarder: Send + Sync {
    async fn forward(
        &self,
        target_url: &str,
        method: ForwardMethod,
        payload: &ForwardPayload,
    ) -> ForwardOutcome;
}

#[derive(Debug, Clone)]
pub struct HttpForwarder {
    client: reqwest::Client,
}

impl HttpForwarder {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ManagementForwarder for HttpForwarder {
    async fn forward(
        &self,
        target_url: &str,
        method: ForwardMethod,
        payload: &ForwardPayload,
    ) -> ForwardOutcome {
        let url = match Url::parse(target_url) {
            Ok(value) => value,
            Err(error) => {
                tracing::warn!(url = target_url, %error, "notification url is not a valid url");
                return ForwardOutcome::transport_failure();
            }
        };

        tracing::info!(
            method = method.as_str(),
            host = url.host_str().unwrap_or_default(),
            path = url.path(),
            "forwarding provisioning notification"
        );

        let request = match method {
            ForwardMethod::Put => self.client.put(url),
            ForwardMethod::Post => self.client.post(url),
        };

        let response = match request.json(payload).send().await {
            Ok(value) => value,
            Err(error) => {
                tracing::warn!(%error, "management endpoint request failed");
                return ForwardOutcome::transport_failure();
            }
        };

        let status_code = response.status().as_u16();
        match response.text().await {
            Ok(body) => ForwardOutcome::new(status_code, body),
            Err(error) => {
                tracing::warn!(status_code, %error, "failed to read management endpoint response");
                ForwardOutcome::transport_failure()
            }
        }
    }
}
