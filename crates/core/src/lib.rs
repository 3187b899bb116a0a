// Core types and functionality for the Solana agent MCP server

pub mod action;
pub mod actions;
pub mod config;
pub mod context;
pub mod error;
pub mod schema;

pub use action::{ActionDescriptor, ActionExample, ActionHandler, Catalog};
pub use config::{validate_environment, EnvConfig};
pub use context::{AgentConfig, AgentContext};
pub use error::{ActionError, ConfigurationError, SchemaAdaptationError, TransportError};
pub use schema::{Constraint, FieldSpec, FieldType, InputSchema};
