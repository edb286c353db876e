//! ServerHandler implementation for the query gateway.
//!
//! This module implements the rmcp `ServerHandler` trait which defines how
//! the server responds to MCP protocol requests.

use crate::server::MssqlGatewayServer;
use rmcp::handler::server::ServerHandler;
use rmcp::model::{Implementation, ProtocolVersion, ServerCapabilities, ServerInfo};
use rmcp::tool_handler;
use tracing::info;

/// The `#[tool_handler]` macro wires up tool routing automatically.
/// It generates the `list_tools` and `call_tool` method implementations.
#[tool_handler]
impl ServerHandler for MssqlGatewayServer {
    /// Server identification - called during initialization handshake.
    fn get_info(&self) -> ServerInfo {
        info!("MCP client requesting server info");

        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: env!("CARGO_PKG_NAME").to_string(),
                title: Some("MSSQL Query Gateway".to_string()),
                version: env!("CARGO_PKG_VERSION").to_string(),
                icons: None,
                website_url: None,
            },
            instructions: Some(build_instructions(self)),
        }
    }
}

/// Build server instructions from the configured connections.
fn build_instructions(server: &MssqlGatewayServer) -> String {
    let mut instructions = String::new();

    instructions.push_str("# MSSQL Query Gateway\n\n");
    instructions.push_str(
        "This server runs SQL against Microsoft SQL Server through named connections.\n\n",
    );

    let names = server.connection_names();
    if names.is_empty() {
        instructions.push_str("**No connections are configured.** Every tool call will fail until ");
        instructions.push_str("`MSSQL_CONN1_*` (or the legacy `MSSQL_*`) variables are set.\n\n");
    } else {
        instructions.push_str("**Configured connections:** ");
        instructions.push_str(
            &names
                .iter()
                .map(|n| format!("`{}`", n))
                .collect::<Vec<_>>()
                .join(", "),
        );
        instructions.push_str("\n\n");
    }

    instructions.push_str("### Tools\n");
    instructions.push_str("- `list_configured_connections`: find a `connectionName`\n");
    instructions.push_str("- `list_databases`, `list_tables`, `get_table_schema`: explore the catalog\n");
    instructions.push_str("- `execute_query`: run one SQL statement\n");

    if server.context().masking.masker.is_enabled() {
        instructions.push_str("\nSensitive columns in `execute_query` results are masked.\n");
    }

    instructions
}
