// Process bootstrap: configuration, runtime context, registry, server start

use crate::fatal;
use crate::protocol::ServerInfo;
use crate::server::ProtocolServer;
use crate::tools::{default_rename_rules, RegistryBuilder, RenameRule};
use solana_mcp_core::{Catalog, ConfigurationError, EnvConfig};
use std::sync::Arc;

pub const SERVER_NAME: &str = "solana-agent";
pub const SERVER_VERSION: &str = "0.1.0";

/// Failure before or while the server runs. Always fatal.
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error("{0:#}")]
    Server(anyhow::Error),
}

/// Startup sequence for the MCP process.
pub struct Bootstrap {
    catalog: Catalog,
    rules: Vec<RenameRule>,
    identity: ServerInfo,
    fatal_handlers: bool,
}

impl Bootstrap {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            rules: default_rename_rules(),
            identity: ServerInfo::new(SERVER_NAME, SERVER_VERSION),
            fatal_handlers: true,
        }
    }

    pub fn with_identity(mut self, identity: ServerInfo) -> Self {
        self.identity = identity;
        self
    }

    pub fn with_rules(mut self, rules: Vec<RenameRule>) -> Self {
        self.rules = rules;
        self
    }

    /// Skip the process-wide panic hook. For embedding in tests.
    pub fn without_fatal_handlers(mut self) -> Self {
        self.fatal_handlers = false;
        self
    }

    /// Run the startup sequence and serve until the server returns.
    ///
    /// Fatal handlers are installed before anything else happens. The
    /// configuration is read through `lookup`; optional credentials that are
    /// unset become empty strings.
    pub async fn run<F, S>(self, lookup: F, server: &S) -> Result<(), BootstrapError>
    where
        F: Fn(&str) -> Option<String>,
        S: ProtocolServer + ?Sized,
    {
        if self.fatal_handlers {
            fatal::install();
        }

        let config = EnvConfig::from_lookup(lookup)?;
        tracing::info!(rpc_url = %config.rpc_url, "Configuration validated");

        let context = Arc::new(config.into_context());

        // Skipped actions are logged by the builder
        let (registry, _report) = RegistryBuilder::new(self.rules).build(&self.catalog);

        server
            .start(Arc::new(registry), context, self.identity)
            .await
            .map_err(BootstrapError::Server)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::Registry;
    use anyhow::Result;
    use serde_json::Value;
    use solana_mcp_core::{
        ActionDescriptor, ActionError, ActionHandler, AgentContext, FieldSpec, FieldType,
        InputSchema,
    };
    use std::collections::HashMap;
    use std::sync::Mutex;

    struct Noop;

    #[async_trait::async_trait]
    impl ActionHandler for Noop {
        async fn handle(&self, _ctx: &AgentContext, _input: Value) -> Result<Value, ActionError> {
            Ok(Value::Null)
        }
    }

    #[derive(Default)]
    struct RecordingServer {
        started: Mutex<Vec<(Arc<Registry>, Arc<AgentContext>, ServerInfo)>>,
    }

    #[async_trait::async_trait]
    impl ProtocolServer for RecordingServer {
        async fn start(
            &self,
            registry: Arc<Registry>,
            context: Arc<AgentContext>,
            identity: ServerInfo,
        ) -> Result<()> {
            self.started
                .lock()
                .unwrap()
                .push((registry, context, identity));
            Ok(())
        }
    }

    struct FailingServer;

    #[async_trait::async_trait]
    impl ProtocolServer for FailingServer {
        async fn start(
            &self,
            _registry: Arc<Registry>,
            _context: Arc<AgentContext>,
            _identity: ServerInfo,
        ) -> Result<()> {
            anyhow::bail!("stdout closed")
        }
    }

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn full_env() -> impl Fn(&str) -> Option<String> {
        env(&[("SOLANA_PRIVATE_KEY", "key"), ("RPC_URL", "https://rpc")])
    }

    fn catalog() -> Catalog {
        Catalog::new()
            .with(
                "broken",
                ActionDescriptor::new("BROKEN", "bad schema", Arc::new(Noop)).with_schema(
                    InputSchema::empty().field(FieldSpec::required(
                        "owner",
                        FieldType::refined(FieldType::String, "base58 public key"),
                    )),
                ),
            )
            .with(
                "balance",
                ActionDescriptor::new("GET_BALANCE", "balance", Arc::new(Noop)),
            )
    }

    #[tokio::test]
    async fn test_run_starts_server_with_valid_actions_only() {
        let server = RecordingServer::default();

        Bootstrap::new(catalog())
            .without_fatal_handlers()
            .run(full_env(), &server)
            .await
            .unwrap();

        let started = server.started.lock().unwrap();
        assert_eq!(started.len(), 1);

        let (registry, context, identity) = &started[0];
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["GET_BALANCE"]);
        assert_eq!(context.rpc_url(), "https://rpc");
        assert_eq!(context.config().coingecko_pro_api_key, "");
        assert_eq!(identity, &ServerInfo::new(SERVER_NAME, SERVER_VERSION));
    }

    #[tokio::test]
    async fn test_run_fails_before_start_on_missing_config() {
        let server = RecordingServer::default();

        let err = Bootstrap::new(catalog())
            .without_fatal_handlers()
            .run(env(&[("SOLANA_PRIVATE_KEY", "key")]), &server)
            .await
            .unwrap_err();

        match err {
            BootstrapError::Configuration(e) => assert_eq!(e.missing, vec!["RPC_URL".to_string()]),
            other => panic!("unexpected error: {other}"),
        }
        assert!(server.started.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_run_surfaces_server_failure() {
        let err = Bootstrap::new(catalog())
            .without_fatal_handlers()
            .run(full_env(), &FailingServer)
            .await
            .unwrap_err();

        assert!(matches!(err, BootstrapError::Server(_)));
        assert_eq!(err.to_string(), "stdout closed");
    }

    #[tokio::test]
    async fn test_run_passes_optional_credentials_and_identity() {
        let server = RecordingServer::default();
        let lookup = env(&[
            ("SOLANA_PRIVATE_KEY", "key"),
            ("RPC_URL", "https://rpc"),
            ("COINGECKO_PRO_API_KEY", "cg"),
        ]);

        Bootstrap::new(Catalog::new())
            .with_identity(ServerInfo::new("custom", "9.9.9"))
            .without_fatal_handlers()
            .run(lookup, &server)
            .await
            .unwrap();

        let started = server.started.lock().unwrap();
        let (registry, context, identity) = &started[0];
        assert!(registry.is_empty());
        assert_eq!(context.config().coingecko_pro_api_key, "cg");
        assert_eq!(identity.name, "custom");
    }
}
