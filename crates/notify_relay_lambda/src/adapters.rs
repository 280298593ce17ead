pub mod acknowledger;
pub mod forwarder;
