// Error taxonomy shared by the bootstrap, the registry and the actions

/// Required process configuration is absent.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Missing required environment variables: {}", .missing.join(", "))]
pub struct ConfigurationError {
    /// Every missing variable, in declaration order.
    pub missing: Vec<String>,
}

/// An action's input schema has no equivalent in the MCP tool schema.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("field `{field}`: {reason}")]
pub struct SchemaAdaptationError {
    /// Dotted path of the offending field (`position.bounds`).
    pub field: String,
    pub reason: String,
}

impl SchemaAdaptationError {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Outbound HTTP call failed.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The request never produced a response (DNS, TLS, connection reset...).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Upstream answered with a non-2xx status.
    #[error("Network response was not ok (status {status})")]
    Status { status: u16 },

    /// Upstream answered 2xx but the body is not the expected shape.
    #[error("Malformed response body: {0}")]
    MalformedBody(String),
}

/// Failure of a single action invocation. Never fatal to the process.
#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    /// A credential the action needs is not configured.
    #[error("No {0} provided")]
    MissingCredential(&'static str),

    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Arguments do not match the action's input schema.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_error_lists_all_missing() {
        let err = ConfigurationError {
            missing: vec!["SOLANA_PRIVATE_KEY".to_string(), "RPC_URL".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Missing required environment variables: SOLANA_PRIVATE_KEY, RPC_URL"
        );
    }

    #[test]
    fn test_schema_error_names_field() {
        let err = SchemaAdaptationError::new("position.bounds", "union types are not supported");
        assert!(err.to_string().contains("position.bounds"));
    }

    #[test]
    fn test_transport_error_converts_into_action_error() {
        let err: ActionError = TransportError::Status { status: 503 }.into();
        assert!(matches!(
            err,
            ActionError::Transport(TransportError::Status { status: 503 })
        ));
        assert_eq!(err.to_string(), "Network response was not ok (status 503)");
    }
}
