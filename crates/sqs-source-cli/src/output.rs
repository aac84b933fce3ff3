use anyhow::Context;
use async_trait::async_trait;
use sqs_source::{RecordSink, SqsRecord};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;

/// Writes each record as one JSON object per line.
///
/// A record counts as handed off once the line has been flushed, so a closed
/// output leaves the message on the queue.
pub struct JsonLines<W = tokio::io::Stdout> {
    out: Mutex<W>,
}

impl JsonLines {
    pub fn stdout() -> Self {
        Self::new(tokio::io::stdout())
    }
}

impl<W> JsonLines<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }
}

#[async_trait]
impl<W> RecordSink for JsonLines<W>
where
    W: AsyncWrite + Unpin + Send,
{
    async fn consume(&self, record: SqsRecord) -> anyhow::Result<()> {
        let mut line = serde_json::to_vec(&record)?;
        line.push(b'\n');

        let mut out = self.out.lock().await;
        out.write_all(&line)
            .await
            .context("failed to write record")?;
        out.flush().await.context("failed to flush output")?;

        Ok(())
    }
}
