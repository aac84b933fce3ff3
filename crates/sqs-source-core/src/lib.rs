//! # sqs-source-core
//!
//! Core library for streaming messages out of AWS SQS queues.
//!
//! A [`SqsSource`] resolves the configured queue names once, then polls every
//! queue on a single worker task. Each received message is turned into a
//! [`SqsRecord`] and handed to a [`RecordSink`]; the message is deleted from
//! the queue only after the sink accepted it, so delivery is at-least-once.
//!
//! ## Features
//!
//! - **Configuration**: JSON, YAML or an untyped map, see [`SqsSourceConfig`]
//! - **Credentials**: pluggable providers selected by name, see [`credentials`]
//! - **Polling**: long-polling receive loop with per-message acknowledgement
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use sqs_source::{SqsRecord, SqsSource, SqsSourceConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = SqsSourceConfig::load(
//!     r#"
//! queueName: example-queue-name
//! region: us-west-2
//! "#,
//! )?;
//!
//! let (tx, mut rx) = tokio::sync::mpsc::channel::<SqsRecord>(100);
//! let mut source = SqsSource::new();
//! source.open_with_config(&config, Arc::new(tx)).await?;
//!
//! while let Some(record) = rx.recv().await {
//!     println!("{:?}: {}", record.key(), record.value());
//! }
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod connector;
pub mod credentials;
mod error;
mod receiver;
mod record;
mod resolver;
mod sink;

#[cfg(test)]
mod test_utils;

pub use client::*;
pub use config::*;
pub use connector::*;
pub use error::*;
pub use receiver::*;
pub use record::*;
pub use resolver::*;
pub use sink::*;
