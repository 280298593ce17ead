use serde_json::Value;

use crate::contract::ProvisioningEvent;

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("event envelope must include a non-empty Records array")]
    MissingRecords,

    #[error("envelope record must carry its message as a string")]
    MissingMessage,

    #[error("invalid provisioning event: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// A decoded event plus how many extra records were ignored alongside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedEnvelope {
    pub event: ProvisioningEvent,
    pub ignored_records: usize,
}

/// Extracts the provisioning event from the first record of a pub/sub envelope.
pub fn decode_envelope(envelope: &Value) -> Result<DecodedEnvelope, DecodeError> {
    let records = envelope
        .get("Records")
        .and_then(Value::as_array)
        .filter(|records| !records.is_empty())
        .ok_or(DecodeError::MissingRecords)?;

    let message = record_message(&records[0]).ok_or(DecodeError::MissingMessage)?;
    let event: ProvisioningEvent = serde_json::from_str(message)?;

    Ok(DecodedEnvelope {
        event,
        ignored_records: records.len() - 1,
    })
}

fn record_message(record: &Value) -> Option<&str> {
    record
        .get("Sns")
        .and_then(|sns| sns.get("Message"))
        .or_else(|| record.get("Message"))
        .and_then(Value::as_str)
}
