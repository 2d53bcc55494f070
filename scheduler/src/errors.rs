use std::fmt;

use crate::framework::Status;

/// Represents errors raised by the plugin or by the cluster state it reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PluginError {
    /// Plugin args could not be decoded
    MalformedArgs(String),
    /// Args decoded but the mode is neither `Least` nor `Most`
    InvalidMode(String),
    /// Pod is missing a label the plugin depends on
    MissingLabel(String),
    /// `minAvailable` label is not a non-negative integer
    InvalidMinAvailable(String),
    /// Node is absent from the cluster snapshot
    NodeNotFound(String),
    /// Normalization was called before any node was scored
    EmptyScoreList,
    /// Score range bounds are inverted
    InvalidScoreRange(i64, i64),
}

impl PluginError {
    /// Maps the error to the framework status reported for the attempt.
    pub fn to_status(&self) -> Status {
        Status::error(self.to_string())
    }
}

impl fmt::Display for PluginError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PluginError::MalformedArgs(msg) => write!(f, "Malformed plugin args: {}", msg),
            PluginError::InvalidMode(mode) => write!(f, "Invalid mode, got '{}'", mode),
            PluginError::MissingLabel(label) => write!(f, "Missing label: {}", label),
            PluginError::InvalidMinAvailable(value) => {
                write!(f, "Invalid minAvailable label value: '{}'", value)
            }
            PluginError::NodeNotFound(name) => write!(f, "Node not found: {}", name),
            PluginError::EmptyScoreList => write!(f, "No scores to normalize"),
            PluginError::InvalidScoreRange(min, max) => {
                write!(f, "Invalid score range: min {} exceeds max {}", min, max)
            }
        }
    }
}

impl std::error::Error for PluginError {}

/// Errors raised while bootstrapping the dry-run binary.
#[derive(Debug)]
pub enum ConfigError {
    /// A file named by the environment could not be read
    Io(String, std::io::Error),
    /// Environment variable holds an unusable value
    InvalidVar(String, String),
    /// Cluster snapshot is not valid JSON
    Snapshot(serde_json::Error),
    Plugin(PluginError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(path, err) => write!(f, "Failed to read '{}': {}", path, err),
            ConfigError::InvalidVar(var, value) => {
                write!(f, "Invalid value for {}: '{}'", var, value)
            }
            ConfigError::Snapshot(err) => write!(f, "Failed to parse snapshot: {}", err),
            ConfigError::Plugin(err) => write!(f, "Plugin initialization failed: {}", err),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<PluginError> for ConfigError {
    fn from(err: PluginError) -> Self {
        ConfigError::Plugin(err)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Snapshot(err)
    }
}
