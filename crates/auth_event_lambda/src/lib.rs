//! AWS-oriented adapters and the handler that forwards auth events to the bus.
//!
//! The contract types live in `auth_event_core`; this crate owns runtime
//! configuration, the bus client seam and the per-invocation forwarding flow.

pub mod adapters;
pub mod config;
pub mod handlers;
