use auth_event_core::contract::{Envelope, Topic};

/// Transport confirmation that the bus durably accepted a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishAck {
    pub message_id: String,
}

/// A connected bus client. Dropping it releases the connection.
pub trait BusClient {
    /// Resolves a topic name to the destination this client publishes to.
    fn topic(&self, name: &str) -> Topic;

    /// Publishes one envelope and blocks until the bus acknowledges it.
    fn publish(&self, topic: &Topic, envelope: Envelope) -> Result<PublishAck, String>;
}

pub trait BusConnector {
    type Client: BusClient;

    fn connect(&self, namespace: &str) -> Result<Self::Client, String>;
}
