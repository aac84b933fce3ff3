#![allow(dead_code)]

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use sqs_source::{QueueClient, ReceivedMessage, RecordSink, SqsRecord};

/// Everything the loop did, in the order it did it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    QueueUrl(String),
    Receive { url: String, max: i32, wait: i32 },
    Consume(String),
    Delete { url: String, receipt_handle: String },
}

pub type CallLog = Arc<Mutex<Vec<Call>>>;

/// In-memory queue service that replays scripted receive results.
///
/// Once a queue's script is exhausted, receives idle briefly and come back
/// empty, like a long poll on an empty queue.
#[derive(Default)]
pub struct ScriptedQueueClient {
    urls: HashMap<String, String>,
    batches: Mutex<HashMap<String, VecDeque<anyhow::Result<Vec<ReceivedMessage>>>>>,
    failing_deletes: HashSet<String>,
    calls: CallLog,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedQueueClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_queue(mut self, name: &str) -> Self {
        self.urls.insert(name.to_string(), url(name));
        self
    }

    pub fn with_batch(self, name: &str, batch: anyhow::Result<Vec<ReceivedMessage>>) -> Self {
        self.batches
            .lock()
            .unwrap()
            .entry(url(name))
            .or_default()
            .push_back(batch);
        self
    }

    pub fn with_failing_delete(mut self, receipt_handle: &str) -> Self {
        self.failing_deletes.insert(receipt_handle.to_string());
        self
    }

    pub fn log(&self) -> CallLog {
        self.calls.clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl QueueClient for ScriptedQueueClient {
    async fn queue_url(&self, queue_name: &str) -> anyhow::Result<String> {
        self.record(Call::QueueUrl(queue_name.to_string()));
        self.urls
            .get(queue_name)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("AWS.SimpleQueueService.NonExistentQueue"))
    }

    async fn receive(
        &self,
        queue_url: &str,
        max_messages: i32,
        wait_time_seconds: i32,
    ) -> anyhow::Result<Vec<ReceivedMessage>> {
        self.record(Call::Receive {
            url: queue_url.to_string(),
            max: max_messages,
            wait: wait_time_seconds,
        });

        let in_flight = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(in_flight, Ordering::SeqCst);

        let scripted = self
            .batches
            .lock()
            .unwrap()
            .get_mut(queue_url)
            .and_then(VecDeque::pop_front);

        let result = match scripted {
            Some(batch) => batch,
            None => {
                tokio::time::sleep(Duration::from_millis(2)).await;
                Ok(Vec::new())
            }
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }

    async fn delete(&self, queue_url: &str, receipt_handle: &str) -> anyhow::Result<()> {
        self.record(Call::Delete {
            url: queue_url.to_string(),
            receipt_handle: receipt_handle.to_string(),
        });

        if self.failing_deletes.contains(receipt_handle) {
            anyhow::bail!("ReceiptHandleIsInvalid");
        }
        Ok(())
    }
}

/// Sink that keeps every record and rejects the configured message ids.
pub struct RecordingSink {
    calls: CallLog,
    failing_ids: HashSet<String>,
    pub records: Mutex<Vec<SqsRecord>>,
}

impl RecordingSink {
    pub fn new(calls: CallLog, failing_ids: &[&str]) -> Self {
        Self {
            calls,
            failing_ids: failing_ids.iter().map(|id| id.to_string()).collect(),
            records: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl RecordSink for RecordingSink {
    async fn consume(&self, record: SqsRecord) -> anyhow::Result<()> {
        let id = record.key().unwrap_or_default().to_string();
        self.calls.lock().unwrap().push(Call::Consume(id.clone()));
        self.records.lock().unwrap().push(record);

        if self.failing_ids.contains(&id) {
            anyhow::bail!("downstream rejected {}", id);
        }
        Ok(())
    }
}

pub fn url(name: &str) -> String {
    format!("https://sqs.us-east-1.amazonaws.com/000000000000/{name}")
}

pub fn message(id: &str) -> ReceivedMessage {
    ReceivedMessage {
        message_id: Some(id.to_string()),
        body: format!("body of {id}"),
        receipt_handle: format!("rh-{id}"),
        attributes: HashMap::from([("ApproximateReceiveCount".to_string(), "1".to_string())]),
    }
}

pub fn receives(calls: &CallLog) -> usize {
    calls
        .lock()
        .unwrap()
        .iter()
        .filter(|call| matches!(call, Call::Receive { .. }))
        .count()
}

pub fn deletes(calls: &CallLog) -> Vec<String> {
    calls
        .lock()
        .unwrap()
        .iter()
        .filter_map(|call| match call {
            Call::Delete { receipt_handle, .. } => Some(receipt_handle.clone()),
            _ => None,
        })
        .collect()
}

/// Waits until `condition` holds, failing the test after a few seconds.
pub async fn wait_for(mut condition: impl FnMut() -> bool) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
    })
    .await
    .expect("condition not met in time");
}
