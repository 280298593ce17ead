//! AWS-oriented adapters and handler for the provisioning notification relay.
//!
//! This crate owns runtime integration details (the Lambda handler, the HTTP
//! forwarder and the orchestrator acknowledgment) and exposes a single runtime
//! module boundary for the contract, envelope and dispatch primitives.

pub mod adapters;
pub mod config;
pub mod handlers;
pub mod runtime;
