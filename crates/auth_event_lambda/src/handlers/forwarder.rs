use std::fmt::Debug;

use auth_event_core::contract::{AuthEvent, Envelope, EnvelopeError, Topic, AUTH_EVENTS_TOPIC};
use auth_event_core::trigger::TriggerMetadata;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::adapters::bus::{BusClient, BusConnector};
use crate::config::{ForwarderConfig, NAMESPACE_ENV_VAR};

const COMPONENT: &str = "auth_event_forwarder";

/// Per-invocation data supplied by the hosting platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationContext {
    pub request_id: String,
    pub deadline: Option<DateTime<Utc>>,
    pub metadata: Option<TriggerMetadata>,
}

impl InvocationContext {
    pub fn trigger_metadata(&self) -> Result<&TriggerMetadata, ForwardError> {
        self.metadata.as_ref().ok_or_else(|| {
            ForwardError::MetadataUnavailable(format!(
                "invocation {} carries no trigger resource",
                self.request_id
            ))
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardReceipt {
    pub topic: Topic,
    pub message_id: String,
    pub payload: String,
}

#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("trigger metadata unavailable: {0}")]
    MetadataUnavailable(String),

    #[error("failed to create bus client: {0}")]
    ClientConstructionFailed(String),

    #[error("failed to serialize auth event: {0}")]
    SerializationFailed(#[source] EnvelopeError),

    #[error("failed to publish message to {topic}: {message}")]
    PublishFailed { topic: String, message: String },
}

impl ForwardError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MetadataUnavailable(_) => "metadata_unavailable",
            Self::ClientConstructionFailed(_) => "client_construction_failed",
            Self::SerializationFailed(_) => "serialization_failed",
            Self::PublishFailed { .. } => "publish_failed",
        }
    }
}

/// Publishes one auth event to the auth events topic and waits for the bus
/// to acknowledge it. Nothing is retried; the platform owns redelivery.
pub fn forward_auth_event(
    ctx: &InvocationContext,
    event: &AuthEvent,
    config: &ForwarderConfig,
    connector: &impl BusConnector,
) -> Result<ForwardReceipt, ForwardError> {
    forward_record(ctx, event, config, connector)
}

pub(crate) fn forward_record<R: Serialize + Debug>(
    ctx: &InvocationContext,
    record: &R,
    config: &ForwarderConfig,
    connector: &impl BusConnector,
) -> Result<ForwardReceipt, ForwardError> {
    let metadata = ctx.trigger_metadata()?;
    info!(
        component = COMPONENT,
        event = "trigger_received",
        request_id = %ctx.request_id,
        resource = %metadata.resource,
        event_id = metadata.event_id.as_deref().unwrap_or_default(),
        event_type = metadata.event_type.as_deref().unwrap_or_default(),
        event_time = metadata
            .timestamp
            .map(|timestamp| timestamp.to_rfc3339())
            .unwrap_or_default(),
        "Function triggered by change to: {}",
        metadata.resource
    );
    info!(
        component = COMPONENT,
        event = "auth_event",
        request_id = %ctx.request_id,
        "{record:?}"
    );
    if let Some(deadline) = ctx.deadline {
        debug!(
            component = COMPONENT,
            request_id = %ctx.request_id,
            remaining_ms = (deadline - Utc::now()).num_milliseconds(),
            "invocation deadline"
        );
    }

    let namespace = config.namespace.as_deref().ok_or_else(|| {
        ForwardError::ClientConstructionFailed(format!("{NAMESPACE_ENV_VAR} is not configured"))
    })?;
    let client = connector
        .connect(namespace)
        .map_err(ForwardError::ClientConstructionFailed)?;

    let topic = client.topic(AUTH_EVENTS_TOPIC);
    let envelope = Envelope::encode(record).map_err(ForwardError::SerializationFailed)?;
    let payload = envelope.as_str().to_string();

    let ack = client
        .publish(&topic, envelope)
        .map_err(|message| ForwardError::PublishFailed {
            topic: topic.to_string(),
            message,
        })?;
    drop(client);

    info!(
        component = COMPONENT,
        event = "message_published",
        request_id = %ctx.request_id,
        topic = %topic,
        message_id = %ack.message_id,
        "Message published to topic {}: {}",
        topic.name(),
        payload
    );

    Ok(ForwardReceipt {
        topic,
        message_id: ack.message_id,
        payload,
    })
}
