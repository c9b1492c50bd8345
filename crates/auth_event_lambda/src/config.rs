/// Environment variable naming the bus project/namespace.
pub const NAMESPACE_ENV_VAR: &str = "AUTH_EVENT_BUS_NAMESPACE";

/// Process-wide forwarder settings, read once at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForwarderConfig {
    pub namespace: Option<String>,
}

impl ForwarderConfig {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: normalize(Some(namespace.into())),
        }
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            namespace: normalize(lookup(NAMESPACE_ENV_VAR)),
        }
    }
}

fn normalize(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
