//! Error types for hosting a relay agent.

use thiserror::Error;

/// Errors that can occur while setting up or running an agent.
#[derive(Debug, Error)]
pub enum AgentError {
    /// Configuration file not found or unreadable
    #[error("Config error: {0}")]
    Config(String),

    /// Failed to parse configuration YAML
    #[error("Parse error: {0}")]
    Parse(String),

    /// Zenoh communication error
    #[error("Zenoh error: {0}")]
    Zenoh(String),

    /// Agent initialization failed
    #[error("Init error: {0}")]
    Init(String),
}

impl From<serde_yaml::Error> for AgentError {
    fn from(err: serde_yaml::Error) -> Self {
        AgentError::Parse(err.to_string())
    }
}

impl From<zenoh::Error> for AgentError {
    fn from(err: zenoh::Error) -> Self {
        AgentError::Zenoh(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_error_display() {
        let err = AgentError::Config("missing file".to_string());
        assert_eq!(err.to_string(), "Config error: missing file");
    }

    #[test]
    fn test_yaml_error_converts_to_parse() {
        let yaml_err = serde_yaml::from_str::<u32>("not a number").unwrap_err();
        let err: AgentError = yaml_err.into();
        assert!(matches!(err, AgentError::Parse(_)));
    }

    #[test]
    fn test_zenoh_error_converts() {
        let zenoh_err: zenoh::Error = "session closed".into();
        let err = AgentError::from(zenoh_err);
        assert_eq!(err.to_string(), "Zenoh error: session closed");
    }
}
