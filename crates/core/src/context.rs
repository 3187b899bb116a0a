// Runtime context handed to every action invocation

use secrecy::{ExposeSecret, SecretString};

/// Third-party credentials. Unset keys are empty strings, never absent.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct AgentConfig {
    pub openai_api_key: String,
    pub perplexity_api_key: String,
    pub coingecko_pro_api_key: String,
}

/// Credentials and connection settings for the agent.
///
/// Built once at bootstrap and shared read-only (`Arc<AgentContext>`) with
/// every handler.
pub struct AgentContext {
    private_key: SecretString,
    rpc_url: String,
    config: AgentConfig,
}

impl std::fmt::Debug for AgentConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let set = |key: &str| if key.is_empty() { "<unset>" } else { "<set>" };
        f.debug_struct("AgentConfig")
            .field("openai_api_key", &set(&self.openai_api_key))
            .field("perplexity_api_key", &set(&self.perplexity_api_key))
            .field("coingecko_pro_api_key", &set(&self.coingecko_pro_api_key))
            .finish()
    }
}

impl AgentContext {
    pub fn new(private_key: SecretString, rpc_url: impl Into<String>, config: AgentConfig) -> Self {
        Self {
            private_key,
            rpc_url: rpc_url.into(),
            config,
        }
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }

    /// Raw private key material. Callers must not log it.
    pub fn private_key(&self) -> &str {
        self.private_key.expose_secret()
    }
}

impl std::fmt::Debug for AgentContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentContext")
            .field("private_key", &"[REDACTED]")
            .field("rpc_url", &self.rpc_url)
            .field("config", &self.config)
            .finish()
    }
}
