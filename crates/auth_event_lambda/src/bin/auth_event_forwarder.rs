use auth_event_core::contract::{Envelope, Topic};
use auth_event_core::trigger::{decode_trigger, TriggerMetadata};
use auth_event_lambda::adapters::bus::{BusClient, BusConnector, PublishAck};
use auth_event_lambda::config::ForwarderConfig;
use auth_event_lambda::handlers::forwarder::{forward_auth_event, InvocationContext};
use chrono::{DateTime, Utc};
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;
use tracing::{debug, error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

struct SnsBusConnector {
    sdk_config: aws_config::SdkConfig,
}

struct SnsBusClient {
    sns_client: aws_sdk_sns::Client,
    region: String,
    account_id: String,
}

impl BusConnector for SnsBusConnector {
    type Client = SnsBusClient;

    fn connect(&self, namespace: &str) -> Result<SnsBusClient, String> {
        let region = self
            .sdk_config
            .region()
            .ok_or_else(|| "AWS region is not configured".to_string())?;

        Ok(SnsBusClient {
            sns_client: aws_sdk_sns::Client::new(&self.sdk_config),
            region: region.to_string(),
            account_id: namespace.to_string(),
        })
    }
}

impl BusClient for SnsBusClient {
    fn topic(&self, name: &str) -> Topic {
        Topic::new(name, sns_topic_arn(&self.region, &self.account_id, name))
    }

    fn publish(&self, topic: &Topic, envelope: Envelope) -> Result<PublishAck, String> {
        let client = self.sns_client.clone();
        let topic_arn = topic.identifier().to_string();
        let message = envelope.into_string();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                let published = client
                    .publish()
                    .topic_arn(topic_arn)
                    .message(message)
                    .send()
                    .await
                    .map_err(|error| format!("sns publish failed: {error}"))?;

                published
                    .message_id()
                    .map(|message_id| PublishAck {
                        message_id: message_id.to_string(),
                    })
                    .ok_or_else(|| "sns publish returned no message id".to_string())
            })
        })
    }
}

impl Drop for SnsBusClient {
    fn drop(&mut self) {
        debug!(account_id = %self.account_id, "bus client released");
    }
}

fn sns_topic_arn(region: &str, account_id: &str, name: &str) -> String {
    let partition = if region.starts_with("cn-") {
        "aws-cn"
    } else if region.starts_with("us-gov-") {
        "aws-us-gov"
    } else {
        "aws"
    };
    format!("arn:{partition}:sns:{region}:{account_id}:{name}")
}

struct RuntimeDependencies {
    config: ForwarderConfig,
    connector: SnsBusConnector,
}

async fn handle_request(
    event: LambdaEvent<Value>,
    deps: &RuntimeDependencies,
) -> Result<(), Error> {
    let LambdaEvent { payload, context } = event;

    let trigger = decode_trigger(payload).map_err(|decode_error| {
        error!(
            component = "auth_event_forwarder",
            event = "trigger_rejected",
            request_id = %context.request_id,
            error = %decode_error,
            "invalid auth trigger payload"
        );
        Error::from(format!("invalid auth trigger payload: {decode_error}"))
    })?;

    let ctx = invocation_context(&context.request_id, context.deadline, trigger.metadata);
    match forward_auth_event(&ctx, &trigger.event, &deps.config, &deps.connector) {
        Ok(_) => Ok(()),
        Err(forward_error) => {
            error!(
                component = "auth_event_forwarder",
                event = "forward_failed",
                request_id = %ctx.request_id,
                kind = forward_error.kind(),
                error = %forward_error,
                "auth event was not forwarded"
            );
            Err(Error::from(forward_error))
        }
    }
}

fn invocation_context(
    request_id: &str,
    deadline_ms: u64,
    metadata: Option<TriggerMetadata>,
) -> InvocationContext {
    InvocationContext {
        request_id: request_id.to_string(),
        deadline: i64::try_from(deadline_ms)
            .ok()
            .filter(|millis| *millis > 0)
            .and_then(DateTime::<Utc>::from_timestamp_millis),
        metadata,
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer().json())
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    init_tracing();

    let deps = RuntimeDependencies {
        config: ForwarderConfig::from_env(),
        connector: SnsBusConnector {
            sdk_config: aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await,
        },
    };
    info!(
        component = "auth_event_forwarder",
        namespace = deps.config.namespace.as_deref().unwrap_or_default(),
        "forwarder configured"
    );

    let deps = &deps;
    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| async move {
        handle_request(event, deps).await
    }))
    .await
}
