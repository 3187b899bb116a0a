// MCP server: JSON-RPC 2.0 over newline-delimited stdio

use crate::fatal;
use crate::protocol::{
    CallToolParams, CallToolResult, InitializeParams, InitializeResult, JsonRpcError,
    JsonRpcRequest, JsonRpcResponse, ListToolsResult, ServerCapabilities, ServerInfo,
    ToolsCapability, JSONRPC_VERSION, PROTOCOL_VERSION,
};
use crate::tools::Registry;
use anyhow::{Context, Result};
use bytes::BytesMut;
use futures::StreamExt;
use serde_json::Value;
use solana_mcp_core::AgentContext;
use std::io;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::codec::{Decoder, FramedRead, LinesCodec, LinesCodecError};

/// Longest request line accepted from a client, in bytes.
pub const MAX_LINE_BYTES: usize = 1_000_000;

/// Something that serves a frozen registry to protocol clients.
#[async_trait::async_trait]
pub trait ProtocolServer: Send + Sync {
    /// Serve until the client goes away. Called once per process.
    async fn start(
        &self,
        registry: Arc<Registry>,
        context: Arc<AgentContext>,
        identity: ServerInfo,
    ) -> Result<()>;
}

/// Serves the registry over the process's stdin/stdout.
#[derive(Debug, Default)]
pub struct StdioServer;

#[async_trait::async_trait]
impl ProtocolServer for StdioServer {
    async fn start(
        &self,
        registry: Arc<Registry>,
        context: Arc<AgentContext>,
        identity: ServerInfo,
    ) -> Result<()> {
        tracing::info!(
            name = %identity.name,
            version = %identity.version,
            tools = registry.len(),
            "MCP server listening on stdio"
        );
        let server = Arc::new(McpServer::new(registry, context, identity));
        server.serve(tokio::io::stdin(), tokio::io::stdout()).await
    }
}

/// Request dispatcher for one MCP session.
pub struct McpServer {
    registry: Arc<Registry>,
    context: Arc<AgentContext>,
    identity: ServerInfo,
    max_line_bytes: usize,
}

impl McpServer {
    pub fn new(registry: Arc<Registry>, context: Arc<AgentContext>, identity: ServerInfo) -> Self {
        Self {
            registry,
            context,
            identity,
            max_line_bytes: MAX_LINE_BYTES,
        }
    }

    pub fn with_max_line_bytes(mut self, max_line_bytes: usize) -> Self {
        self.max_line_bytes = max_line_bytes;
        self
    }

    /// Read requests from `reader` until EOF, writing responses to `writer`.
    ///
    /// Each request runs in its own task, so a slow tool call does not hold
    /// up the others; responses may therefore leave out of order. Lines that
    /// are too long or not UTF-8 are answered with a parse error and the
    /// session continues. Only an I/O error on `reader` ends it early.
    pub async fn serve<R, W>(self: Arc<Self>, reader: R, writer: W) -> Result<()>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<JsonRpcResponse>();

        let writer_task = fatal::spawn_observed("mcp-writer", async move {
            let mut writer = writer;
            while let Some(response) = rx.recv().await {
                write_frame(&mut writer, &response).await?;
            }
            Ok(())
        });

        let mut frames = FramedRead::new(reader, RequestCodec::new(self.max_line_bytes));
        let mut requests = JoinSet::new();

        while let Some(frame) = frames.next().await {
            let line = match frame.context("Failed to read from client")? {
                Frame::Line(line) => line,
                rejected => {
                    tracing::warn!(frame = ?rejected, "Rejected request line");
                    send(&tx, JsonRpcResponse::error(Value::Null, JsonRpcError::parse_error()));
                    continue;
                }
            };
            if line.trim().is_empty() {
                continue;
            }

            let server = Arc::clone(&self);
            let tx = tx.clone();
            requests.spawn(async move {
                if let Some(response) = server.handle_line(&line).await {
                    send(&tx, response);
                }
            });

            // Reap finished requests so the set does not grow unbounded
            while let Some(done) = requests.try_join_next() {
                log_join_error(done);
            }
        }

        while let Some(done) = requests.join_next().await {
            log_join_error(done);
        }

        drop(tx);
        writer_task.await.context("Writer task failed")?;

        tracing::info!("Client disconnected, MCP server stopping");
        Ok(())
    }

    /// Parse and dispatch one line. `None` for notifications.
    pub async fn handle_line(&self, line: &str) -> Option<JsonRpcResponse> {
        let request: JsonRpcRequest = match serde_json::from_str(line) {
            Ok(request) => request,
            Err(e) => {
                tracing::warn!(error = %e, "Unparseable request");
                return Some(JsonRpcResponse::error(Value::Null, JsonRpcError::parse_error()));
            }
        };

        self.handle_request(request).await
    }

    pub async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        tracing::debug!(method = %request.method, "Handling request");

        let Some(id) = request.id.clone() else {
            // Notifications (e.g. notifications/initialized) need no answer
            tracing::debug!(method = %request.method, "Notification received");
            return None;
        };

        if request.jsonrpc != JSONRPC_VERSION {
            return Some(JsonRpcResponse::error(id, JsonRpcError::invalid_request()));
        }

        let params = request.params.unwrap_or(Value::Null);
        let response = match request.method.as_str() {
            "initialize" => JsonRpcResponse::success(id, self.initialize(params)),
            "ping" => JsonRpcResponse::success(id, serde_json::json!({})),
            "tools/list" => JsonRpcResponse::success(
                id,
                ListToolsResult {
                    tools: self.registry.list_schemas(),
                },
            ),
            "tools/call" => match self.call_tool(params).await {
                Ok(result) => JsonRpcResponse::success(id, result),
                Err(error) => JsonRpcResponse::error(id, error),
            },
            other => JsonRpcResponse::error(id, JsonRpcError::method_not_found(other)),
        };

        Some(response)
    }

    fn initialize(&self, params: Value) -> InitializeResult {
        match serde_json::from_value::<InitializeParams>(params) {
            Ok(params) => tracing::info!(
                client = ?params.client_info,
                protocol_version = %params.protocol_version,
                "Client initialized"
            ),
            Err(e) => tracing::debug!(error = %e, "Initialize without recognizable params"),
        }

        InitializeResult {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {
                    list_changed: false,
                }),
            },
            server_info: self.identity.clone(),
        }
    }

    /// Invoke a registered action. Handler failures come back as tool
    /// errors, not JSON-RPC errors.
    async fn call_tool(&self, params: Value) -> Result<CallToolResult, JsonRpcError> {
        let params: CallToolParams = serde_json::from_value(params).map_err(|e| {
            JsonRpcError::invalid_params(format!("Invalid tools/call params: {}", e))
        })?;

        let entry = self
            .registry
            .get(&params.name)
            .ok_or_else(|| JsonRpcError::invalid_params(format!("Unknown tool: {}", params.name)))?;

        match entry.action.invoke(&self.context, params.arguments).await {
            Ok(value) => {
                let text =
                    serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string());
                Ok(CallToolResult::text(text))
            }
            Err(e) => {
                tracing::warn!(tool = %params.name, error = %e, "Tool call failed");
                Ok(CallToolResult::error(e.to_string()))
            }
        }
    }
}

/// One newline-delimited frame read from the client.
#[derive(Debug, PartialEq)]
enum Frame {
    Line(String),
    /// Longer than the line limit; the rest of the line is discarded.
    Oversized,
    NotUtf8,
}

/// `LinesCodec` that reports bad lines as frames instead of errors.
///
/// `FramedRead` stops yielding after a decoder error, so recoverable line
/// faults must not surface as one.
struct RequestCodec {
    lines: LinesCodec,
}

impl RequestCodec {
    fn new(max_line_bytes: usize) -> Self {
        Self {
            lines: LinesCodec::new_with_max_length(max_line_bytes),
        }
    }

    fn recover(decoded: Result<Option<String>, LinesCodecError>) -> io::Result<Option<Frame>> {
        match decoded {
            Ok(line) => Ok(line.map(Frame::Line)),
            Err(LinesCodecError::MaxLineLengthExceeded) => Ok(Some(Frame::Oversized)),
            Err(LinesCodecError::Io(e)) if e.kind() == io::ErrorKind::InvalidData => {
                Ok(Some(Frame::NotUtf8))
            }
            Err(LinesCodecError::Io(e)) => Err(e),
        }
    }
}

impl Decoder for RequestCodec {
    type Item = Frame;
    type Error = io::Error;

    fn decode(&mut self, buf: &mut BytesMut) -> io::Result<Option<Frame>> {
        Self::recover(self.lines.decode(buf))
    }

    fn decode_eof(&mut self, buf: &mut BytesMut) -> io::Result<Option<Frame>> {
        Self::recover(self.lines.decode_eof(buf))
    }
}

fn send(tx: &mpsc::UnboundedSender<JsonRpcResponse>, response: JsonRpcResponse) {
    if tx.send(response).is_err() {
        tracing::debug!("Client writer closed, dropping response");
    }
}

async fn write_frame<W>(out: &mut W, response: &JsonRpcResponse) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let mut frame = serde_json::to_string(response)?;
    frame.push('\n');
    out.write_all(frame.as_bytes()).await?;
    out.flush().await?;
    Ok(())
}

fn log_join_error(result: std::result::Result<(), tokio::task::JoinError>) {
    if let Err(e) = result {
        tracing::error!(error = %e, "Request task aborted");
    }
}
