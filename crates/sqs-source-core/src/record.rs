//! Received messages and the records handed downstream.

use std::collections::HashMap;

/// A message as returned by a receive call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReceivedMessage {
    /// Unique identifier for the message assigned by SQS
    pub message_id: Option<String>,
    /// The actual message content
    pub body: String,
    /// Handle used to delete the message; distinct from the message id
    pub receipt_handle: String,
    /// System attributes (`SentTimestamp`, `ApproximateReceiveCount`, ...)
    pub attributes: HashMap<String, String>,
}

impl ReceivedMessage {
    /// Converts an AWS SDK message.
    ///
    /// Returns `None` when the message carries no receipt handle, since such a
    /// message could never be acknowledged.
    pub fn from_aws_message(message: aws_sdk_sqs::types::Message) -> Option<Self> {
        Some(Self {
            receipt_handle: message.receipt_handle?,
            message_id: message.message_id,
            body: message.body.unwrap_or_default(),
            attributes: message
                .attributes
                .unwrap_or_default()
                .into_iter()
                .map(|(name, value)| (name.as_str().to_string(), value))
                .collect(),
        })
    }
}

/// The record forwarded to the downstream consumer.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct SqsRecord {
    key: Option<String>,
    value: String,
    topic: Option<String>,
    properties: HashMap<String, String>,
}

impl SqsRecord {
    /// Builds the record for a message received from `queue_name`.
    ///
    /// The record owns copies of everything it exposes, so it stays valid
    /// after the message has been deleted.
    pub fn new(queue_name: &str, message: &ReceivedMessage) -> Self {
        Self {
            key: message.message_id.clone(),
            value: message.body.clone(),
            topic: Some(queue_name.to_string()),
            properties: message.attributes.clone(),
        }
    }

    /// The SQS message id.
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// The message body.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// The logical name of the queue the message came from.
    pub fn topic(&self) -> Option<&str> {
        self.topic.as_deref()
    }

    pub fn properties(&self) -> &HashMap<String, String> {
        &self.properties
    }
}
