//! The downstream hand-off.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::record::SqsRecord;

/// Receives every record the poll loop forwards.
///
/// `consume` is awaited before the message is deleted: returning `Ok` means
/// the record has been handed off and the message may be acknowledged.
/// Returning an error leaves the message on the queue for redelivery once its
/// visibility timeout elapses. Messages can be delivered more than once, so
/// implementations should be idempotent with respect to [`SqsRecord::key`].
#[async_trait]
pub trait RecordSink: Send + Sync {
    async fn consume(&self, record: SqsRecord) -> anyhow::Result<()>;
}

/// Hands records to a channel. A closed channel counts as a failed hand-off.
#[async_trait]
impl RecordSink for mpsc::Sender<SqsRecord> {
    async fn consume(&self, record: SqsRecord) -> anyhow::Result<()> {
        self.send(record)
            .await
            .map_err(|_| anyhow::anyhow!("record channel is closed"))
    }
}
