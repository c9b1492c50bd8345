//! Auth event forwarding contract.
//!
//! This crate owns the event record, its wire envelope, topic naming and
//! trigger payload decoding. It intentionally excludes AWS SDK and Lambda
//! runtime concerns, which live in `auth_event_lambda`.

pub mod contract;
pub mod trigger;
