use log::info;

use crate::client::QueueClient;
use crate::config::SqsSourceConfig;
use crate::error::SourceError;

/// A configured queue together with the URL it resolved to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedQueue {
    /// Logical queue name, as configured
    pub name: String,
    /// Queue URL used for receive and delete calls
    pub url: String,
}

/// Resolves every configured queue name, in configuration order.
///
/// Makes exactly one lookup per name and stops at the first failure; a
/// partial set of queues is never returned.
pub async fn resolve_queues(
    client: &dyn QueueClient,
    config: &SqsSourceConfig,
) -> Result<Vec<ResolvedQueue>, SourceError> {
    let mut queues = Vec::with_capacity(config.queue_names().len());

    for name in config.queue_names() {
        let url = client
            .queue_url(name)
            .await
            .map_err(|source| SourceError::QueueResolution {
                queue_name: name.clone(),
                source,
            })?;

        info!("resolved queue {} to {}", name, url);
        queues.push(ResolvedQueue {
            name: name.clone(),
            url,
        });
    }

    Ok(queues)
}
