//! Pluggable credential selection.
//!
//! A plugin turns the free-form `awsCredentialPluginParam` blob into a
//! request-signing credentials provider. Returning `None` defers to the SDK's
//! default provider chain (environment, shared config, IMDS, ...).

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Context;
use aws_credential_types::provider::SharedCredentialsProvider;
use aws_credential_types::Credentials;
use log::{error, warn};

pub const DEFAULT_PLUGIN: &str = "default";
pub const PROFILE_PLUGIN: &str = "profile";

pub trait CredentialProviderPlugin: Send + Sync {
    fn create(&self, param: Option<&str>) -> anyhow::Result<Option<SharedCredentialsProvider>>;
}

/// Used when no plugin name is configured.
///
/// Accepts a JSON map of `accessKey` / `secretKey` (and optionally
/// `sessionToken`). Without keys, the default chain applies.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultCredentialPlugin;

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct StaticKeys {
    access_key: Option<String>,
    secret_key: Option<String>,
    session_token: Option<String>,
}

impl CredentialProviderPlugin for DefaultCredentialPlugin {
    fn create(&self, param: Option<&str>) -> anyhow::Result<Option<SharedCredentialsProvider>> {
        let Some(param) = param else {
            return Ok(None);
        };

        let keys: StaticKeys =
            serde_json::from_str(param).context("credential plugin param is not a JSON map")?;

        match (keys.access_key, keys.secret_key) {
            (Some(access_key), Some(secret_key)) => Ok(Some(SharedCredentialsProvider::new(
                Credentials::new(access_key, secret_key, keys.session_token, None, "static"),
            ))),
            (None, None) => Ok(None),
            _ => anyhow::bail!("credential plugin param needs both accessKey and secretKey"),
        }
    }
}

/// Reads a named profile from the shared AWS config files.
///
/// Param: `{"profileName": "..."}`.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProfileCredentialPlugin;

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProfileParam {
    profile_name: String,
}

impl CredentialProviderPlugin for ProfileCredentialPlugin {
    fn create(&self, param: Option<&str>) -> anyhow::Result<Option<SharedCredentialsProvider>> {
        let param = param.context("profile plugin requires a `profileName` param")?;
        let ProfileParam { profile_name } =
            serde_json::from_str(param).context("invalid profile plugin param")?;

        let provider = aws_config::profile::ProfileFileCredentialsProvider::builder()
            .profile_name(profile_name)
            .build();

        Ok(Some(SharedCredentialsProvider::new(provider)))
    }
}

/// Plugins addressable by `awsCredentialPluginName`.
#[derive(Clone)]
pub struct CredentialPluginRegistry {
    plugins: HashMap<String, Arc<dyn CredentialProviderPlugin>>,
}

impl Default for CredentialPluginRegistry {
    fn default() -> Self {
        let mut registry = Self {
            plugins: HashMap::new(),
        };
        registry.register(DEFAULT_PLUGIN, DefaultCredentialPlugin);
        registry.register(PROFILE_PLUGIN, ProfileCredentialPlugin);
        registry
    }
}

impl CredentialPluginRegistry {
    pub fn register(
        &mut self,
        name: impl Into<String>,
        plugin: impl CredentialProviderPlugin + 'static,
    ) -> &mut Self {
        self.plugins.insert(name.into(), Arc::new(plugin));
        self
    }

    /// Picks the credentials provider for a plugin name and param.
    ///
    /// Without a name the [`DefaultCredentialPlugin`] is used. An unknown name
    /// or a plugin that fails to build logs the problem and falls back to the
    /// SDK default chain.
    pub fn credentials_provider(
        &self,
        plugin_name: Option<&str>,
        param: Option<&str>,
    ) -> Option<SharedCredentialsProvider> {
        let name = plugin_name.unwrap_or(DEFAULT_PLUGIN);

        let Some(plugin) = self.plugins.get(name) else {
            warn!(
                "unknown credential plugin `{}`, using the default credential chain instead",
                name
            );
            return None;
        };

        match plugin.create(param) {
            Ok(provider) => provider,
            Err(e) => {
                error!(
                    "error creating credential provider with plugin `{}`, using the default credential chain instead: {:#}",
                    name, e
                );
                None
            }
        }
    }
}
