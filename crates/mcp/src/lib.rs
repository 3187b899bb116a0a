// MCP (Model Context Protocol) server for the Solana agent actions
// Adapts the action catalog into MCP tools and serves them over stdio

pub mod bootstrap;
pub mod fatal;
pub mod protocol;
pub mod server;
pub mod tools;

pub use bootstrap::{Bootstrap, BootstrapError};
pub use server::{McpServer, ProtocolServer, StdioServer};
