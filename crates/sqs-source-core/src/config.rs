//! Connector configuration.
//!
//! Configuration arrives as an untyped key/value map, either straight from a
//! host or decoded from a JSON or YAML document. Every value is normalised to a
//! string before validation: strings pass through untouched and anything else
//! is stored as its compact JSON serialization. That keeps
//! `awsCredentialPluginParam` identical whether it was written as a nested
//! object or as an already-encoded string.

use serde_json::Value;

use crate::error::ConfigError;

/// The untyped map shape every configuration source decodes to.
pub type ConfigMap = serde_json::Map<String, Value>;

pub const DEFAULT_REGION: &str = "us-east-1";

const QUEUE_NAME: &str = "queueName";
const REGION: &str = "region";
const CREDENTIAL_PLUGIN_NAME: &str = "awsCredentialPluginName";
const CREDENTIAL_PLUGIN_PARAM: &str = "awsCredentialPluginParam";
const ENDPOINT_URL: &str = "endpointUrl";

/// Validated configuration for an SQS source.
///
/// `queueName` accepts either a single name or a list of names; the loop
/// treats both the same way. Deserializing through serde goes through
/// [`SqsSourceConfig::from_map`], so `serde_json::from_str` and
/// `serde_yaml::from_str` agree with [`SqsSourceConfig::load`].
#[derive(Clone, Debug, PartialEq, Eq, serde::Deserialize)]
#[serde(try_from = "ConfigMap")]
pub struct SqsSourceConfig {
    queue_names: Vec<String>,
    region: String,
    aws_credential_plugin_name: Option<String>,
    aws_credential_plugin_param: Option<String>,
    endpoint_url: Option<String>,
}

impl SqsSourceConfig {
    /// Builds a config from a host-provided map.
    pub fn from_map(map: &ConfigMap) -> Result<Self, ConfigError> {
        let queue_names = queue_names(map.get(QUEUE_NAME))?;

        Ok(Self {
            queue_names,
            region: optional(map, REGION).unwrap_or_else(|| DEFAULT_REGION.to_string()),
            aws_credential_plugin_name: optional(map, CREDENTIAL_PLUGIN_NAME),
            aws_credential_plugin_param: optional(map, CREDENTIAL_PLUGIN_PARAM),
            endpoint_url: optional(map, ENDPOINT_URL),
        })
    }

    /// Builds a config from a JSON or YAML document.
    ///
    /// JSON is tried first; anything it rejects is handed to the YAML decoder,
    /// whose error is the one reported.
    pub fn load(document: &str) -> Result<Self, ConfigError> {
        let map: ConfigMap = match serde_json::from_str(document) {
            Ok(map) => map,
            Err(_) => {
                serde_yaml::from_str(document).map_err(|e| ConfigError::Parse(e.to_string()))?
            }
        };

        Self::from_map(&map)
    }

    /// Logical queue names, in configuration order. Never empty.
    pub fn queue_names(&self) -> &[String] {
        &self.queue_names
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn aws_credential_plugin_name(&self) -> Option<&str> {
        self.aws_credential_plugin_name.as_deref()
    }

    pub fn aws_credential_plugin_param(&self) -> Option<&str> {
        self.aws_credential_plugin_param.as_deref()
    }

    pub fn endpoint_url(&self) -> Option<&str> {
        self.endpoint_url.as_deref()
    }

    /// Points the client at a custom endpoint, e.g. LocalStack.
    pub fn with_endpoint_url(mut self, endpoint_url: impl Into<String>) -> Self {
        self.endpoint_url = Some(endpoint_url.into());
        self
    }
}

impl TryFrom<ConfigMap> for SqsSourceConfig {
    type Error = ConfigError;

    fn try_from(map: ConfigMap) -> Result<Self, Self::Error> {
        Self::from_map(&map)
    }
}

/// Canonical string form of a config value. `null` counts as absent.
fn stringify(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Optional keys treat an empty string the same as an absent key.
fn optional(map: &ConfigMap, key: &str) -> Option<String> {
    map.get(key)
        .and_then(stringify)
        .filter(|value| !value.is_empty())
}

fn queue_names(value: Option<&Value>) -> Result<Vec<String>, ConfigError> {
    let names = match value {
        None | Some(Value::Null) => return Err(ConfigError::MissingField(QUEUE_NAME)),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| stringify(item).ok_or(ConfigError::EmptyField(QUEUE_NAME)))
            .collect::<Result<Vec<_>, _>>()?,
        Some(other) => stringify(other).into_iter().collect(),
    };

    if names.is_empty() || names.iter().any(|name| name.trim().is_empty()) {
        return Err(ConfigError::EmptyField(QUEUE_NAME));
    }

    for (i, name) in names.iter().enumerate() {
        if names[..i].contains(name) {
            return Err(ConfigError::DuplicateQueue(name.clone()));
        }
    }

    Ok(names)
}
