//! The host-facing open/close lifecycle.

use std::sync::Arc;

use log::{info, warn};

use crate::client::{QueueClient, SqsQueueClient};
use crate::config::{ConfigMap, SqsSourceConfig};
use crate::credentials::CredentialPluginRegistry;
use crate::error::SourceError;
use crate::receiver::MessageReceiver;
use crate::resolver::resolve_queues;
use crate::sink::RecordSink;

/// A source that copies messages from SQS to a [`RecordSink`].
///
/// ```no_run
/// use std::sync::Arc;
/// use sqs_source::{SqsRecord, SqsSource};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = serde_json::json!({ "queueName": "example-queue-name" });
/// let (tx, mut rx) = tokio::sync::mpsc::channel::<SqsRecord>(100);
///
/// let mut source = SqsSource::new();
/// source
///     .open(config.as_object().unwrap(), Arc::new(tx))
///     .await?;
///
/// while let Some(record) = rx.recv().await {
///     println!("{}", record.value());
/// }
///
/// source.close().await;
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct SqsSource {
    plugins: CredentialPluginRegistry,
    receiver: Option<MessageReceiver>,
}

impl SqsSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses a custom set of credential plugins instead of the built-in ones.
    pub fn with_credential_plugins(plugins: CredentialPluginRegistry) -> Self {
        Self {
            plugins,
            receiver: None,
        }
    }

    /// Validates `config`, resolves its queues and starts polling.
    ///
    /// Configuration errors are reported before any request is made. A queue
    /// that cannot be resolved aborts the whole call. Opening an already open
    /// source does nothing.
    pub async fn open(
        &mut self,
        config: &ConfigMap,
        sink: Arc<dyn RecordSink>,
    ) -> Result<(), SourceError> {
        let config = SqsSourceConfig::from_map(config)?;
        self.open_with_config(&config, sink).await
    }

    pub async fn open_with_config(
        &mut self,
        config: &SqsSourceConfig,
        sink: Arc<dyn RecordSink>,
    ) -> Result<(), SourceError> {
        if self.is_open() {
            warn!("source is already open");
            return Ok(());
        }

        let client = SqsQueueClient::connect(config, &self.plugins).await;
        self.open_with_client(config, Arc::new(client), sink).await
    }

    /// Like [`SqsSource::open_with_config`], with a caller-provided queue
    /// client.
    pub async fn open_with_client(
        &mut self,
        config: &SqsSourceConfig,
        client: Arc<dyn QueueClient>,
        sink: Arc<dyn RecordSink>,
    ) -> Result<(), SourceError> {
        if self.is_open() {
            warn!("source is already open");
            return Ok(());
        }

        let queues = resolve_queues(client.as_ref(), config).await?;

        let mut receiver = MessageReceiver::new(client, queues, sink);
        receiver.start()?;
        self.receiver = Some(receiver);

        info!(
            "sqs source opened for {} queue(s) in {}",
            config.queue_names().len(),
            config.region()
        );

        Ok(())
    }

    pub fn is_open(&self) -> bool {
        self.receiver.is_some()
    }

    /// Stops polling and releases the queue client. A no-op when not open.
    pub async fn close(&mut self) {
        if let Some(mut receiver) = self.receiver.take() {
            receiver.stop().await;
            info!("sqs source closed");
        }
    }
}
