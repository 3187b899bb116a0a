// Standalone MCP server binary

use clap::{Parser, ValueEnum};
use solana_mcp::bootstrap::{Bootstrap, SERVER_NAME, SERVER_VERSION};
use solana_mcp::fatal::EXIT_FAILURE;
use solana_mcp::protocol::ServerInfo;
use solana_mcp::server::StdioServer;
use solana_mcp_core::actions;
use solana_mcp_core::config::DotEnv;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormat {
    Pretty,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "solana-mcp")]
#[command(about = "MCP server exposing Solana agent actions over stdio", long_about = None)]
struct Args {
    /// Dotenv file read before validating the environment
    #[arg(long, default_value = ".env")]
    env_file: PathBuf,

    /// Log output format (logs always go to stderr)
    #[arg(long, value_enum, env = "SOLANA_MCP_LOG_FORMAT", default_value = "pretty")]
    log_format: LogFormat,

    /// Server name advertised to clients
    #[arg(long, default_value = SERVER_NAME)]
    server_name: String,

    /// Server version advertised to clients
    #[arg(long, default_value = SERVER_VERSION)]
    server_version: String,
}

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "solana_mcp=info,solana_mcp_core=info".into());

    // stdout carries the protocol
    match format {
        LogFormat::Pretty => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init(),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = Args::parse();
    init_tracing(args.log_format);

    tracing::info!("Solana MCP server starting...");

    let dotenv = match DotEnv::load(&args.env_file) {
        Ok(dotenv) => dotenv,
        Err(e) => {
            tracing::error!(
                "Failed to start MCP server: cannot read {}: {}",
                args.env_file.display(),
                e
            );
            std::process::exit(EXIT_FAILURE);
        }
    };

    let result = Bootstrap::new(actions::catalog())
        .with_identity(ServerInfo::new(args.server_name, args.server_version))
        .run(|key| dotenv.lookup(key), &StdioServer)
        .await;

    if let Err(e) = result {
        tracing::error!("Failed to start MCP server: {}", e);
        std::process::exit(EXIT_FAILURE);
    }
}
