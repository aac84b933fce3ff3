//! The poll–consume–acknowledge loop.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures::FutureExt;
use log::{debug, error, info, warn};
use tokio::task::JoinHandle;

use crate::client::QueueClient;
use crate::error::SourceError;
use crate::record::{ReceivedMessage, SqsRecord};
use crate::resolver::ResolvedQueue;
use crate::sink::RecordSink;

/// Largest batch a single receive call asks for.
pub const MAX_MESSAGES: i32 = 10;

/// Long-poll wait of a single receive call, in seconds.
pub const WAIT_TIME_SECONDS: i32 = 20;

/// Polls a set of resolved queues on a dedicated worker task.
///
/// Each pass receives one batch from every queue in order and forwards the
/// messages one at a time. A message is deleted only after the sink accepted
/// it. A sink that errors or panics leaves the message for redelivery. Receive
/// and delete failures are logged and the loop carries on with its next pass;
/// only [`MessageReceiver::stop`] ends it.
///
/// The run flag is checked once per pass, so stopping waits for the in-flight
/// pass to finish, up to one long-poll wait per queue plus processing time.
pub struct MessageReceiver {
    client: Option<Arc<dyn QueueClient>>,
    queues: Arc<[ResolvedQueue]>,
    sink: Arc<dyn RecordSink>,
    running: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl MessageReceiver {
    pub fn new(
        client: Arc<dyn QueueClient>,
        queues: Vec<ResolvedQueue>,
        sink: Arc<dyn RecordSink>,
    ) -> Self {
        Self {
            client: Some(client),
            queues: queues.into(),
            sink,
            running: Arc::new(AtomicBool::new(false)),
            worker: None,
        }
    }

    /// Spawns the poll loop onto the current tokio runtime.
    ///
    /// Does nothing if the loop is already running. Fails once the receiver
    /// has been stopped, since stopping releases the queue client.
    pub fn start(&mut self) -> Result<(), SourceError> {
        let Some(client) = self.client.clone() else {
            return Err(SourceError::ReceiverClosed);
        };

        if self.is_running() {
            warn!("receiver is already running");
            return Ok(());
        }

        self.running.store(true, Ordering::SeqCst);

        let poll_loop = PollLoop {
            client,
            queues: self.queues.clone(),
            sink: self.sink.clone(),
            running: self.running.clone(),
        };
        self.worker = Some(tokio::spawn(poll_loop.run()));

        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.worker
            .as_ref()
            .is_some_and(|worker| !worker.is_finished())
    }

    /// Stops the loop after its current pass and releases the queue client.
    ///
    /// Safe to call whether or not the loop was started, and more than once.
    pub async fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);

        if let Some(worker) = self.worker.take() {
            if let Err(e) = worker.await {
                error!("poll loop terminated abnormally: {}", e);
            }
        }

        if self.client.take().is_some() {
            info!("receiver stopped");
        }
    }
}

impl Drop for MessageReceiver {
    fn drop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
    }
}

struct PollLoop {
    client: Arc<dyn QueueClient>,
    queues: Arc<[ResolvedQueue]>,
    sink: Arc<dyn RecordSink>,
    running: Arc<AtomicBool>,
}

impl PollLoop {
    async fn run(self) {
        while self.running.load(Ordering::SeqCst) {
            if let Err(e) = self.poll_once().await {
                error!("error processing SQS messages: {:#}", e);
                tokio::task::yield_now().await;
            }
        }

        debug!("poll loop exited");
    }

    /// One pass over every queue.
    async fn poll_once(&self) -> anyhow::Result<()> {
        for queue in self.queues.iter() {
            debug!("consuming messages from queue: {}", queue.name);

            let messages = self
                .client
                .receive(&queue.url, MAX_MESSAGES, WAIT_TIME_SECONDS)
                .await?;

            for message in messages {
                self.forward(queue, message).await?;
            }
        }

        Ok(())
    }

    /// Hands one message to the sink and acknowledges it on success.
    ///
    /// A rejected or panicking hand-off is not an error for the loop; only a
    /// failed delete is.
    async fn forward(
        &self,
        queue: &ResolvedQueue,
        message: ReceivedMessage,
    ) -> anyhow::Result<()> {
        let id = message.message_id.as_deref().unwrap_or_default();
        debug!("consuming message. Id: {}", id);

        let record = SqsRecord::new(&queue.name, &message);
        match AssertUnwindSafe(self.sink.consume(record))
            .catch_unwind()
            .await
        {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                warn!(
                    "message {} from {} was not handed off and will be redelivered: {:#}",
                    id, queue.name, e
                );
                return Ok(());
            }
            Err(panic) => {
                error!(
                    "sink panicked on message {} from {}, it will be redelivered: {}",
                    id,
                    queue.name,
                    panic_message(&*panic)
                );
                return Ok(());
            }
        }

        self.client.delete(&queue.url, &message.receipt_handle).await
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        msg
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg
    } else {
        "unknown panic"
    }
}
