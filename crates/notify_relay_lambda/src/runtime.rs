pub use notify_relay_core::{contract, dispatch, envelope};
