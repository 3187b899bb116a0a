// Process configuration read from environment-style key/value pairs

use crate::context::{AgentConfig, AgentContext};
use crate::error::ConfigurationError;
use secrecy::SecretString;
use std::collections::HashMap;
use std::path::Path;

pub const SOLANA_PRIVATE_KEY: &str = "SOLANA_PRIVATE_KEY";
pub const RPC_URL: &str = "RPC_URL";
pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const PERPLEXITY_API_KEY: &str = "PERPLEXITY_API_KEY";
pub const COINGECKO_PRO_API_KEY: &str = "COINGECKO_PRO_API_KEY";

/// Variables the process refuses to start without, in reporting order.
pub const REQUIRED_VARS: [&str; 2] = [SOLANA_PRIVATE_KEY, RPC_URL];

/// Check that every required variable is set to a non-empty value.
///
/// All missing variables are collected before failing, so one error names
/// everything the operator has to fix.
pub fn validate_environment<F>(lookup: F) -> Result<(), ConfigurationError>
where
    F: Fn(&str) -> Option<String>,
{
    let missing: Vec<String> = REQUIRED_VARS
        .into_iter()
        .filter(|key| lookup(*key).map_or(true, |value| value.is_empty()))
        .map(|key| key.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ConfigurationError { missing })
    }
}

/// Validated configuration values.
pub struct EnvConfig {
    pub private_key: SecretString,
    pub rpc_url: String,
    pub openai_api_key: String,
    pub perplexity_api_key: String,
    pub coingecko_pro_api_key: String,
}

impl std::fmt::Debug for EnvConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnvConfig")
            .field("private_key", &"[REDACTED]")
            .field("rpc_url", &self.rpc_url)
            .finish_non_exhaustive()
    }
}

impl EnvConfig {
    /// Validate and read configuration through `lookup`.
    ///
    /// Optional keys that are unset become empty strings.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigurationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        validate_environment(&lookup)?;

        let value = |key: &str| lookup(key).unwrap_or_default();

        Ok(Self {
            private_key: SecretString::from(value(SOLANA_PRIVATE_KEY)),
            rpc_url: value(RPC_URL),
            openai_api_key: value(OPENAI_API_KEY),
            perplexity_api_key: value(PERPLEXITY_API_KEY),
            coingecko_pro_api_key: value(COINGECKO_PRO_API_KEY),
        })
    }

    /// Build the runtime context these values describe.
    pub fn into_context(self) -> AgentContext {
        AgentContext::new(
            self.private_key,
            self.rpc_url,
            AgentConfig {
                openai_api_key: self.openai_api_key,
                perplexity_api_key: self.perplexity_api_key,
                coingecko_pro_api_key: self.coingecko_pro_api_key,
            },
        )
    }
}

/// Key/value pairs loaded from a dotenv file.
///
/// Values already present in the process environment take precedence over
/// the file. The file is read without touching the process environment.
#[derive(Debug, Clone, Default)]
pub struct DotEnv {
    vars: HashMap<String, String>,
}

impl DotEnv {
    /// Load `path`. A missing file yields an empty set; unreadable or
    /// malformed files are errors.
    pub fn load(path: &Path) -> Result<Self, dotenvy::Error> {
        let iter = match dotenvy::from_path_iter(path) {
            Ok(iter) => iter,
            Err(e) if e.not_found() => {
                tracing::debug!(path = %path.display(), "No env file found");
                return Ok(Self::default());
            }
            Err(e) => return Err(e),
        };

        let vars = iter.collect::<Result<HashMap<_, _>, _>>()?;
        tracing::debug!(path = %path.display(), count = vars.len(), "Loaded env file");
        Ok(Self { vars })
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }

    /// Lookup that prefers the process environment and falls back to the file.
    pub fn lookup(&self, key: &str) -> Option<String> {
        std::env::var(key).ok().or_else(|| self.get(key))
    }
}
