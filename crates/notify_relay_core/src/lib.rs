//! Shared provisioning-notification domain primitives.
//!
//! This crate owns the relay's contracts and its pure decisions: decoding the
//! transport envelope, filtering request kinds, choosing the forward method and
//! classifying outcomes. It intentionally excludes HTTP and Lambda runtime
//! concerns.

pub mod contract;
pub mod dispatch;
pub mod envelope;
