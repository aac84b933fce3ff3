//! SQS client wrapper.
//!
//! The poll loop only needs three calls from the queue service, so it talks to
//! a [`QueueClient`] rather than to the SDK directly.

use anyhow::Context;
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_sdk_sqs as sqs;
use log::warn;

use crate::config::SqsSourceConfig;
use crate::credentials::CredentialPluginRegistry;
use crate::record::ReceivedMessage;

#[async_trait]
pub trait QueueClient: Send + Sync {
    /// Looks up the URL of a queue by its name.
    async fn queue_url(&self, queue_name: &str) -> anyhow::Result<String>;

    /// Receives up to `max_messages`, waiting up to `wait_time_seconds` for at
    /// least one to arrive.
    async fn receive(
        &self,
        queue_url: &str,
        max_messages: i32,
        wait_time_seconds: i32,
    ) -> anyhow::Result<Vec<ReceivedMessage>>;

    /// Acknowledges a message so it is not redelivered.
    async fn delete(&self, queue_url: &str, receipt_handle: &str) -> anyhow::Result<()>;
}

/// [`QueueClient`] backed by the AWS SDK.
#[derive(Clone)]
pub struct SqsQueueClient {
    /// The AWS SDK configuration used for SQS operations
    pub config: SdkConfig,
    /// The SQS client instance
    pub client: sqs::Client,
}

impl SqsQueueClient {
    /// Creates a client from a pre-built AWS SDK config.
    pub fn from_config(config: SdkConfig) -> Self {
        let client = sqs::Client::new(&config);
        Self { config, client }
    }

    /// Creates a client for the configured region, endpoint and credential
    /// plugin.
    ///
    /// No request is made here; credentials are resolved lazily on the first
    /// call.
    pub async fn connect(config: &SqsSourceConfig, plugins: &CredentialPluginRegistry) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region().to_string()));

        if let Some(endpoint_url) = config.endpoint_url() {
            loader = loader.endpoint_url(endpoint_url);
        }

        if let Some(provider) = plugins.credentials_provider(
            config.aws_credential_plugin_name(),
            config.aws_credential_plugin_param(),
        ) {
            loader = loader.credentials_provider(provider);
        }

        Self::from_config(loader.load().await)
    }
}

#[async_trait]
impl QueueClient for SqsQueueClient {
    async fn queue_url(&self, queue_name: &str) -> anyhow::Result<String> {
        let output = self
            .client
            .get_queue_url()
            .queue_name(queue_name)
            .send()
            .await
            .with_context(|| format!("failed to get the URL of queue `{}`", queue_name))?;

        output
            .queue_url
            .with_context(|| format!("no URL returned for queue `{}`", queue_name))
    }

    async fn receive(
        &self,
        queue_url: &str,
        max_messages: i32,
        wait_time_seconds: i32,
    ) -> anyhow::Result<Vec<ReceivedMessage>> {
        let output = self
            .client
            .receive_message()
            .queue_url(queue_url)
            .max_number_of_messages(max_messages)
            .wait_time_seconds(wait_time_seconds)
            .message_system_attribute_names(sqs::types::MessageSystemAttributeName::All)
            .send()
            .await
            .context("failed to receive messages")?;

        Ok(output
            .messages
            .unwrap_or_default()
            .into_iter()
            .filter_map(|message| {
                let message_id = message.message_id.clone();
                let received = ReceivedMessage::from_aws_message(message);
                if received.is_none() {
                    warn!(
                        "dropping message {:?} from {}: no receipt handle",
                        message_id, queue_url
                    );
                }
                received
            })
            .collect())
    }

    async fn delete(&self, queue_url: &str, receipt_handle: &str) -> anyhow::Result<()> {
        self.client
            .delete_message()
            .queue_url(queue_url)
            .receipt_handle(receipt_handle)
            .send()
            .await
            .context("failed to delete message")?;

        Ok(())
    }
}
