//! # arcanna-mcp
//!
//! MCP (Model Context Protocol) server for the Arcanna AI decisioning platform.
//!
//! This crate exposes Arcanna's Management and Input REST APIs as tools for
//! AI agents. It implements the MCP protocol over stdin/stdout using JSON-RPC 2.0.
//! Every tool is a stateless proxy: arguments are validated, turned into a
//! single HTTP request (two for name-based job actions), and the upstream
//! response is handed back to the model.
//!
//! ## Tools
//!
//! - **Jobs**: list, get by id or name, labels, start/stop/train by id or name
//! - **Events**: send (with or without id), get, feedback, query, filter fields
//! - **Resources**: upsert/get/delete api keys, integrations and jobs; integration schema
//! - **Code blocks**: generate, execute on Arcanna, save as integration
//! - **Health**: API reachability and key validity
//!
//! ## Usage
//!
//! The server is typically run as an executable and configured in AI tools like Claude Desktop:
//!
//! ```json
//! {
//!   "mcpServers": {
//!     "arcanna": {
//!       "command": "/path/to/arcanna-mcp",
//!       "env": {
//!         "ARCANNA_HOST": "https://arcanna.example.com",
//!         "ARCANNA_MANAGEMENT_API_KEY": "...",
//!         "ARCANNA_USER": "alice"
//!       }
//!     }
//!   }
//! }
//! ```
//!
//! ## Library Usage
//!
//! For testing or embedding, you can use the library API:
//!
//! ```no_run
//! use arcanna_mcp::{ArcannaSession, McpServer, Settings};
//!
//! # async fn run() -> arcanna_mcp::Result<()> {
//! let settings = Settings::new("https://arcanna.example.com", "management-key");
//! let session = ArcannaSession::connect(settings)?;
//! let mut server = McpServer::new(session);
//!
//! // Reads from stdin, writes to stdout
//! server.run().await?;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod config;
mod convert;
mod error;
pub mod models;
mod server;
mod session;
mod tools;
mod transport;

pub use config::{KeyScope, Settings};
pub use convert::{parse_body, translate_response};
pub use error::{McpError, Result};
pub use server::{tool_response, JsonRpcRequest, JsonRpcResponse, McpServer};
pub use session::ArcannaSession;
pub use tools::{ToolDef, ToolRegistry};
pub use transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport, API_KEY_HEADER};
