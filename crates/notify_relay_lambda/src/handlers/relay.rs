use serde_json::Value;

use crate::adapters::acknowledger::{AcknowledgeError, Acknowledger};
use crate::adapters::forwarder::ManagementForwarder;
use crate::runtime::contract::{AckStatus, ForwardOutcome, RelayReport};
use crate::runtime::dispatch::{acknowledgment_status, forward_method, requires_notification};
use crate::runtime::envelope::{decode_envelope, DecodeError, DecodedEnvelope};

#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Acknowledge(#[from] AcknowledgeError),
}

/// Runs one invocation: decode, filter, forward, then acknowledge exactly once.
///
/// Decode and acknowledgment failures abort the invocation. Forwarding never
/// does; its failures are reported to the orchestrator as `FAILED`.
pub async fn handle_relay_event(
    envelope: &Value,
    forwarder: &impl ManagementForwarder,
    acknowledger: &impl Acknowledger,
) -> Result<RelayReport, RelayError> {
    let DecodedEnvelope {
        event,
        ignored_records,
    } = decode_envelope(envelope).inspect_err(|error| {
        tracing::error!(%error, "failed to decode provisioning event");
    })?;

    if ignored_records > 0 {
        tracing::warn!(
            ignored_records,
            "envelope carried extra records; only the first is relayed"
        );
    }
    tracing::info!(
        request_type = %event.request_type,
        stack_id = %event.stack_id,
        "decoded provisioning event"
    );

    if !requires_notification(&event.request_type) {
        tracing::info!(
            request_type = %event.request_type,
            "request type needs no notification; acknowledging success"
        );
        acknowledger.acknowledge(&event, AckStatus::Success).await?;
        return Ok(RelayReport {
            request_type: event.request_type,
            forwarded: false,
            status_code: None,
            acknowledgment: AckStatus::Success,
        });
    }

    let outcome = match event.notification_url() {
        Some(target_url) => {
            forwarder
                .forward(
                    target_url,
                    forward_method(&event.request_type),
                    &event.forward_payload(),
                )
                .await
        }
        None => {
            tracing::warn!(
                request_type = %event.request_type,
                "event has no NotificationUrl; reporting transport failure"
            );
            ForwardOutcome::transport_failure()
        }
    };
    let status = acknowledgment_status(&outcome);
    tracing::info!(
        status_code = outcome.status_code,
        body_len = outcome.body.len(),
        acknowledgment = ?status,
        "management endpoint responded"
    );
    tracing::debug!(body = %outcome.body, "management endpoint response body");

    acknowledger.acknowledge(&event, status).await?;

    Ok(RelayReport {
        request_type: event.request_type,
        forwarded: true,
        status_code: Some(outcome.status_code),
        acknowledgment: status,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::json;

    use super::*;
    use crate::runtime::contract::{ForwardPayload, ProvisioningEvent, RequestType};
    use crate::runtime::dispatch::ForwardMethod;

    struct ScriptedForwarder {
        outcome: ForwardOutcome,
        calls: Mutex<Vec<(String, ForwardMethod, ForwardPayload)>>,
    }

    impl ScriptedForwarder {
        fn returning(outcome: ForwardOutcome) -> Self {
            Self {
                outcome,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<(String, ForwardMethod, ForwardPayload)> {
            self.calls.lock().expect("poisoned mutex").clone()
        }
    }

    #[async_trait]
    impl ManagementForwarder for ScriptedForwarder {
        async fn forward(
            &self,
            target_url: &str,
            method: ForwardMethod,
            payload: &ForwardPayload,
        ) -> ForwardOutcome {
            self.calls.lock().expect("poisoned mutex").push((
                target_url.to_string(),
                method,
                payload.clone(),
            ));
            self.outcome.clone()
        }
    }

    struct RecordingAcknowledger {
        statuses: Mutex<Vec<AckStatus>>,
        fail: bool,
    }

    impl RecordingAcknowledger {
        fn new() -> Self {
            Self {
                statuses: Mutex::new(Vec::new()),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                statuses: Mutex::new(Vec::new()),
                fail: true,
            }
        }

        fn statuses(&self) -> Vec<AckStatus> {
            self.statuses.lock().expect("poisoned mutex").clone()
        }
    }

    #[async_trait]
    impl Acknowledger for RecordingAcknowledger {
        async fn acknowledge(
            &self,
            _event: &ProvisioningEvent,
            status: AckStatus,
        ) -> Result<(), AcknowledgeError> {
            self.statuses.lock().expect("poisoned mutex").push(status);
            if self.fail {
                return Err(AcknowledgeError::Rejected(403));
            }
            Ok(())
        }
    }

    fn envelope(request_type: &str) -> Value {
        let message = json!({
            "RequestType": request_type,
            "StackId": "stack-1",
            "ResponseURL": "https://cfn-response.example/presigned",
            "ResourceProperties": {
                "NotificationUrl": "https://cmp.example/hook",
                "RoleArn": "arn:aws:iam::123456789012:role/cmp",
                "ExternalID": "customer-1",
                "AccountID": "123456789012",
                "CurPath": "reports/cur",
                "S3Bucket": "cur-bucket",
                "Unrelated": "ignored"
            }
        });
        json!({"Records": [{"Sns": {"Message": message.to_string()}}]})
    }

    #[tokio::test]
    async fn create_puts_and_acknowledges_success_on_ok() {
        let forwarder = ScriptedForwarder::returning(ForwardOutcome::new(200, "ok"));
        let acknowledger = RecordingAcknowledger::new();

        let report = handle_relay_event(&envelope("Create"), &forwarder, &acknowledger)
            .await
            .expect("relay should succeed");

        let calls = forwarder.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "https://cmp.example/hook");
        assert_eq!(calls[0].1, ForwardMethod::Put);
        assert_eq!(calls[0].2.s3_bucket.as_deref(), Some("cur-bucket"));
        assert_eq!(acknowledger.statuses(), vec![AckStatus::Success]);
        assert_eq!(
            report,
            RelayReport {
                request_type: RequestType::Create,
                forwarded: true,
                status_code: Some(200),
                acknowledgment: AckStatus::Success,
            }
        );
    }

    #[tokio::test]
    async fn delete_posts_and_acknowledges_failure_on_error_status() {
        let forwarder = ScriptedForwarder::returning(ForwardOutcome::new(500, "boom"));
        let acknowledger = RecordingAcknowledger::new();

        let report = handle_relay_event(&envelope("DELETE"), &forwarder, &acknowledger)
            .await
            .expect("relay should succeed");

        assert_eq!(forwarder.calls()[0].1, ForwardMethod::Post);
        assert_eq!(acknowledger.statuses(), vec![AckStatus::Failed]);
        assert_eq!(report.status_code, Some(500));
    }

    #[tokio::test]
    async fn non_lifecycle_requests_skip_forwarding() {
        for request_type in ["Update", "update", "Rollback"] {
            let forwarder = ScriptedForwarder::returning(ForwardOutcome::new(200, ""));
            let acknowledger = RecordingAcknowledger::new();

            let report = handle_relay_event(&envelope(request_type), &forwarder, &acknowledger)
                .await
                .expect("relay should succeed");

            assert!(forwarder.calls().is_empty());
            assert_eq!(acknowledger.statuses(), vec![AckStatus::Success]);
            assert!(!report.forwarded);
            assert_eq!(report.status_code, None);
        }
    }

    fn envelope_without_url(request_type: &str) -> Value {
        let message = json!({
            "RequestType": request_type,
            "StackId": "stack-1",
            "ResponseURL": "https://cfn-response.example/presigned",
            "ResourceProperties": {"RoleArn": "arn:aws:iam::123456789012:role/cmp"}
        });
        json!({"Records": [{"Sns": {"Message": message.to_string()}}]})
    }

    #[tokio::test]
    async fn update_without_notification_url_still_acknowledges_success() {
        let forwarder = ScriptedForwarder::returning(ForwardOutcome::new(200, ""));
        let acknowledger = RecordingAcknowledger::new();

        let report = handle_relay_event(&envelope_without_url("Update"), &forwarder, &acknowledger)
            .await
            .expect("update needs no url");

        assert!(forwarder.calls().is_empty());
        assert_eq!(acknowledger.statuses(), vec![AckStatus::Success]);
        assert_eq!(report.request_type, RequestType::Update);
        assert!(!report.forwarded);
    }

    #[tokio::test]
    async fn create_without_notification_url_acknowledges_failure() {
        let forwarder = ScriptedForwarder::returning(ForwardOutcome::new(200, ""));
        let acknowledger = RecordingAcknowledger::new();

        let report = handle_relay_event(&envelope_without_url("Create"), &forwarder, &acknowledger)
            .await
            .expect("missing url is reported, not raised");

        assert!(forwarder.calls().is_empty());
        assert_eq!(acknowledger.statuses(), vec![AckStatus::Failed]);
        assert_eq!(report.status_code, Some(400));
        assert_eq!(report.acknowledgment, AckStatus::Failed);
    }

    #[tokio::test]
    async fn transport_failure_is_acknowledged_as_failed() {
        let forwarder = ScriptedForwarder::returning(ForwardOutcome::transport_failure());
        let acknowledger = RecordingAcknowledger::new();

        let report = handle_relay_event(&envelope("create"), &forwarder, &acknowledger)
            .await
            .expect("relay should succeed");

        assert_eq!(report.status_code, Some(400));
        assert_eq!(acknowledger.statuses(), vec![AckStatus::Failed]);
    }

    #[tokio::test]
    async fn decode_failure_aborts_without_side_effects() {
        let forwarder = ScriptedForwarder::returning(ForwardOutcome::new(200, ""));
        let acknowledger = RecordingAcknowledger::new();

        let error = handle_relay_event(&json!({"Records": []}), &forwarder, &acknowledger)
            .await
            .expect_err("empty envelope should fail");

        assert!(matches!(error, RelayError::Decode(_)));
        assert!(forwarder.calls().is_empty());
        assert!(acknowledger.statuses().is_empty());
    }

    #[tokio::test]
    async fn acknowledgment_failure_propagates() {
        let forwarder = ScriptedForwarder::returning(ForwardOutcome::new(200, ""));
        let acknowledger = RecordingAcknowledger::failing();

        let error = handle_relay_event(&envelope("Create"), &forwarder, &acknowledger)
            .await
            .expect_err("ack failure should propagate");

        assert!(matches!(
            error,
            RelayError::Acknowledge(AcknowledgeError::Rejected(403))
        ));
        assert_eq!(forwarder.calls().len(), 1);
        assert_eq!(acknowledger.statuses().len(), 1);
    }
}
