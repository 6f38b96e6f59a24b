//! MCP server for the Arcanna AI decisioning platform.
//!
//! Run with `arcanna-mcp`; configuration comes from flags, the environment
//! or a `.env` file in the working directory.

use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use arcanna_mcp::{ArcannaSession, McpServer, Settings};

/// MCP server for Arcanna.
///
/// Exposes Arcanna job, event, resource and code tools to AI agents.
/// Communicates via JSON-RPC 2.0 over stdin/stdout.
#[derive(Parser)]
#[command(name = "arcanna-mcp")]
#[command(version, about, long_about = None)]
struct Args {
    /// Base URL of the Arcanna instance.
    #[arg(long, env = "ARCANNA_HOST", value_name = "URL")]
    host: Option<String>,

    /// API key for management operations (jobs, resources, code execution).
    #[arg(long, env = "ARCANNA_MANAGEMENT_API_KEY", hide_env_values = true)]
    management_api_key: Option<String>,

    /// API key for event ingestion. Defaults to the management key.
    #[arg(long, env = "ARCANNA_INPUT_API_KEY", hide_env_values = true)]
    input_api_key: Option<String>,

    /// User name recorded on job actions and feedback (sent as MCP-<user>).
    #[arg(long, env = "ARCANNA_USER")]
    user: Option<String>,

    /// Timeout in seconds for each Arcanna API call.
    #[arg(long, env = "ARCANNA_TIMEOUT_SECS", default_value_t = arcanna_mcp::config::DEFAULT_TIMEOUT_SECS)]
    timeout_secs: u64,

    /// Enable debug logging to stderr.
    #[arg(long, short)]
    verbose: bool,
}

impl Args {
    fn settings(&self) -> Settings {
        Settings {
            host: self.host.clone(),
            management_api_key: self.management_api_key.clone(),
            input_api_key: self.input_api_key.clone(),
            user: self.user.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("arcanna_mcp=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("arcanna_mcp=warn"))
    };

    // stdout carries the protocol
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // A missing .env file is fine
    let dotenv = dotenvy::dotenv();

    let args = Args::parse();
    init_logging(args.verbose);

    if let Ok(path) = dotenv {
        tracing::debug!(path = %path.display(), "loaded .env");
    }

    let settings = args.settings();

    // Keep serving on bad configuration so every tool call reports it to the client
    if let Err(e) = settings.validate() {
        tracing::error!(error = %e, "invalid configuration; tool calls will fail");
        eprintln!("Warning: {}", e);
    }

    let session = match ArcannaSession::connect(settings) {
        Ok(session) => session,
        Err(e) => {
            eprintln!("Error: Failed to create HTTP client: {}", e);
            std::process::exit(1);
        }
    };

    let mut server = McpServer::new(session);

    if let Err(e) = server.run().await {
        eprintln!("Error: Server error: {}", e);
        std::process::exit(1);
    }
}
