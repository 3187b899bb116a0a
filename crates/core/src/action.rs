// Action descriptors and the raw action catalog

use crate::context::AgentContext;
use crate::error::ActionError;
use crate::schema::InputSchema;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// Async body of an action
#[async_trait::async_trait]
pub trait ActionHandler: Send + Sync {
    /// Run the action. `input` has already been checked against the
    /// action's input schema.
    async fn handle(&self, ctx: &AgentContext, input: Value) -> Result<Value, ActionError>;
}

/// One example exchange shown to agents
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionExample {
    pub input: Value,
    pub output: Value,
    pub explanation: String,
}

/// A callable operation: metadata, input schema and handler.
///
/// Cloning is cheap, the handler is shared.
#[derive(Clone)]
pub struct ActionDescriptor {
    pub name: String,
    pub description: String,
    pub similes: Vec<String>,
    pub examples: Vec<Vec<ActionExample>>,
    pub input_schema: InputSchema,
    pub handler: Arc<dyn ActionHandler>,
}

impl ActionDescriptor {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        handler: Arc<dyn ActionHandler>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            similes: Vec::new(),
            examples: Vec::new(),
            input_schema: InputSchema::empty(),
            handler,
        }
    }

    pub fn with_similes<I, S>(mut self, similes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.similes = similes.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_examples(mut self, examples: Vec<Vec<ActionExample>>) -> Self {
        self.examples = examples;
        self
    }

    pub fn with_schema(mut self, schema: InputSchema) -> Self {
        self.input_schema = schema;
        self
    }

    /// Copy of this descriptor advertised under another name.
    pub fn with_name(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..self.clone()
        }
    }

    /// Check `input` against the schema, then run the handler.
    pub async fn invoke(&self, ctx: &AgentContext, input: Value) -> Result<Value, ActionError> {
        self.input_schema
            .check(&input)
            .map_err(ActionError::InvalidInput)?;
        self.handler.handle(ctx, input).await
    }
}

impl std::fmt::Debug for ActionDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionDescriptor")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("similes", &self.similes)
            .field("input_schema", &self.input_schema)
            .finish_non_exhaustive()
    }
}

/// The raw action catalog: catalog key to descriptor, in insertion order.
///
/// Consumers only read it; renaming produces copies.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    actions: IndexMap<String, ActionDescriptor>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert under `key`. An existing key keeps its position and takes the
    /// new descriptor.
    pub fn insert(&mut self, key: impl Into<String>, action: ActionDescriptor) {
        self.actions.insert(key.into(), action);
    }

    pub fn with(mut self, key: impl Into<String>, action: ActionDescriptor) -> Self {
        self.insert(key, action);
        self
    }

    pub fn get(&self, key: &str) -> Option<&ActionDescriptor> {
        self.actions.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ActionDescriptor)> {
        self.actions.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

impl FromIterator<(String, ActionDescriptor)> for Catalog {
    fn from_iter<T: IntoIterator<Item = (String, ActionDescriptor)>>(iter: T) -> Self {
        Self {
            actions: iter.into_iter().collect(),
        }
    }
}
