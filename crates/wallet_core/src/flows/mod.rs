//! Dialog flows as plain state machines. Engine calls happen in the controller.

pub mod receive;
pub mod send;

/// Identifies one opening of a dialog; results for a stale id are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FlowId(pub u64);
