use crate::contract::{AckStatus, ForwardOutcome, RequestType, STATUS_OK};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForwardMethod {
    Put,
    Post,
}

impl ForwardMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Put => "PUT",
            Self::Post => "POST",
        }
    }
}

/// Only creation and deletion of the managed resource concern the management endpoint.
pub fn requires_notification(request_type: &RequestType) -> bool {
    matches!(request_type, RequestType::Create | RequestType::Delete)
}

pub fn forward_method(request_type: &RequestType) -> ForwardMethod {
    match request_type {
        RequestType::Delete => ForwardMethod::Post,
        _ => ForwardMethod::Put,
    }
}

pub fn acknowledgment_status(outcome: &ForwardOutcome) -> AckStatus {
    if outcome.status_code == STATUS_OK {
        AckStatus::Success
    } else {
        AckStatus::Failed
    }
}
