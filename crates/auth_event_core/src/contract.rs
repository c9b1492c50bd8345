use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Destination for every forwarded authentication event.
pub const AUTH_EVENTS_TOPIC: &str = "firebase-authentication";

/// A user-authentication change as delivered by the auth platform.
///
/// Only `email` and `uid` are forwarded; any other user fields in the trigger
/// payload are dropped on decode.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthEvent {
    #[serde(default)]
    pub email: String,
    pub uid: String,
}

impl AuthEvent {
    pub fn new(email: impl Into<String>, uid: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            uid: uid.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum EnvelopeError {
    #[error("failed to serialize envelope: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("failed to decode envelope: {0}")]
    Decode(#[source] serde_json::Error),
}

/// Serialized JSON form of a single record, ready for transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    body: String,
}

impl Envelope {
    pub fn encode(record: &impl Serialize) -> Result<Self, EnvelopeError> {
        serde_json::to_string(record)
            .map(|body| Self { body })
            .map_err(EnvelopeError::Serialize)
    }

    pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, EnvelopeError> {
        serde_json::from_slice(bytes).map_err(EnvelopeError::Decode)
    }

    pub fn as_str(&self) -> &str {
        &self.body
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.body.as_bytes()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.body.into_bytes()
    }

    pub fn into_string(self) -> String {
        self.body
    }
}

/// A resolved bus destination: the logical topic name plus the identifier
/// the transport addresses it by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topic {
    name: String,
    identifier: String,
}

impl Topic {
    pub fn new(name: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            identifier: identifier.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.identifier)
    }
}
