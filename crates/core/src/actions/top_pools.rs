// Top Orca liquidity pools on Solana, from the CoinGecko Pro on-chain API

use crate::action::{ActionDescriptor, ActionHandler};
use crate::context::AgentContext;
use crate::error::{ActionError, TransportError};
use serde_json::Value;
use std::sync::Arc;

pub const CATALOG_KEY: &str = "TOP_LIST_POOLS_ACTION";
pub const ACTION_NAME: &str = "FETCH_TOP_LIST_LIQUIDITY_POOLS";

pub const DEFAULT_BASE_URL: &str = "https://pro-api.coingecko.com/api/v3";
const POOLS_PATH: &str = "/onchain/networks/solana/dexes/orca/pools";
const SORT_BY_VOLUME: (&str, &str) = ("sort", "h24_volume_usd_desc");
const API_KEY_HEADER: &str = "x-cg-pro-api-key";
const CREDENTIAL: &str = "COINGECKO_PRO_API_KEY";

/// Number of pools returned per call.
pub const MAX_POOLS: usize = 5;

/// Fetches the highest-volume Orca pools.
///
/// One GET per invocation, no retry and no client-side timeout.
pub struct TopPoolsAction {
    client: reqwest::Client,
    base_url: String,
}

impl TopPoolsAction {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Catalog entry wrapping `handler`.
    pub fn descriptor(handler: Arc<TopPoolsAction>) -> ActionDescriptor {
        ActionDescriptor::new(
            ACTION_NAME,
            "Fetch the top list of liquidity pools in Orca for order by highest APY",
            handler,
        )
        .with_similes([
            "fetch top list of liquidity pools",
            "fetch top list of orca pools",
            "I want to see the top list of liquidity pools",
        ])
    }

    fn endpoint(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), POOLS_PATH)
    }

    async fn fetch(&self, api_key: &str) -> Result<Vec<Value>, TransportError> {
        let url = self.endpoint();
        tracing::debug!(url = %url, "Fetching top pools");

        let response = self
            .client
            .get(&url)
            .query(&[SORT_BY_VOLUME])
            .header(API_KEY_HEADER, api_key)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "Top pools request rejected");
            return Err(TransportError::Status {
                status: status.as_u16(),
            });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| TransportError::MalformedBody(e.to_string()))?;

        match body {
            Value::Object(mut map) => match map.remove("data") {
                Some(Value::Array(pools)) => Ok(pools),
                Some(_) => Err(TransportError::MalformedBody(
                    "`data` is not an array".to_string(),
                )),
                None => Err(TransportError::MalformedBody(
                    "missing `data` field".to_string(),
                )),
            },
            _ => Err(TransportError::MalformedBody(
                "expected a JSON object".to_string(),
            )),
        }
    }
}

impl Default for TopPoolsAction {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ActionHandler for TopPoolsAction {
    async fn handle(&self, ctx: &AgentContext, _input: Value) -> Result<Value, ActionError> {
        let api_key = &ctx.config().coingecko_pro_api_key;
        if api_key.is_empty() {
            return Err(ActionError::MissingCredential(CREDENTIAL));
        }

        let mut pools = self.fetch(api_key).await?;
        pools.truncate(MAX_POOLS);

        Ok(Value::Array(pools))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::AgentConfig;
    use secrecy::SecretString;
    use serde_json::json;
    use wiremock::matchers::{any, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn ctx_with_key(key: &str) -> AgentContext {
        AgentContext::new(
            SecretString::from("key".to_string()),
            "http://localhost:8899",
            AgentConfig {
                coingecko_pro_api_key: key.to_string(),
                ..Default::default()
            },
        )
    }

    fn pools(n: usize) -> Vec<Value> {
        // Descending 24h volume, as upstream sorts them
        (0..n)
            .map(|i| {
                json!({
                    "id": format!("solana_pool{}", i),
                    "type": "pool",
                    "attributes": { "volume_usd": { "h24": (1000 - i * 10).to_string() } }
                })
            })
            .collect()
    }

    async fn mount_pools(server: &MockServer, records: Vec<Value>) {
        Mock::given(method("GET"))
            .and(path(POOLS_PATH))
            .and(query_param("sort", "h24_volume_usd_desc"))
            .and(header(API_KEY_HEADER, "cg-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": records })))
            .expect(1)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_missing_credential_makes_no_request() {
        let server = MockServer::start().await;
        Mock::given(any())
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let action = TopPoolsAction::with_base_url(server.uri());
        let err = action.handle(&ctx_with_key(""), Value::Null).await.unwrap_err();

        assert!(matches!(err, ActionError::MissingCredential(CREDENTIAL)));
        assert_eq!(err.to_string(), "No COINGECKO_PRO_API_KEY provided");
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_returns_first_five_in_upstream_order() {
        let server = MockServer::start().await;
        let records = pools(8);
        mount_pools(&server, records.clone()).await;

        let action = TopPoolsAction::with_base_url(server.uri());
        let result = action
            .handle(&ctx_with_key("cg-test"), json!({}))
            .await
            .unwrap();

        assert_eq!(result, Value::Array(records[..5].to_vec()));
    }

    #[tokio::test]
    async fn test_fewer_than_five_are_returned_as_is() {
        let server = MockServer::start().await;
        let records = pools(3);
        mount_pools(&server, records.clone()).await;

        let action = TopPoolsAction::with_base_url(server.uri());
        let result = action
            .handle(&ctx_with_key("cg-test"), json!({}))
            .await
            .unwrap();

        assert_eq!(result.as_array().unwrap().len(), 3);
        assert_eq!(result, Value::Array(records));
    }

    #[tokio::test]
    async fn test_non_success_status_is_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429))
            .expect(1)
            .mount(&server)
            .await;

        let action = TopPoolsAction::with_base_url(server.uri());
        let err = action
            .handle(&ctx_with_key("cg-test"), json!({}))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ActionError::Transport(TransportError::Status { status: 429 })
        ));
    }

    #[tokio::test]
    async fn test_missing_data_is_malformed_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "errors": [] })))
            .mount(&server)
            .await;

        let action = TopPoolsAction::with_base_url(server.uri());
        let err = action
            .handle(&ctx_with_key("cg-test"), json!({}))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ActionError::Transport(TransportError::MalformedBody(_))
        ));
    }

    #[tokio::test]
    async fn test_non_json_body_is_malformed_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let action = TopPoolsAction::with_base_url(format!("{}/", server.uri()));
        let err = action
            .handle(&ctx_with_key("cg-test"), json!({}))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ActionError::Transport(TransportError::MalformedBody(_))
        ));
    }

    #[test]
    fn test_descriptor_metadata() {
        let descriptor = TopPoolsAction::descriptor(Arc::new(TopPoolsAction::new()));
        assert_eq!(descriptor.name, ACTION_NAME);
        assert_eq!(descriptor.similes.len(), 3);
        assert!(descriptor.examples.is_empty());
        assert!(descriptor.input_schema.is_empty());
    }
}
