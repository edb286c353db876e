//! MCP tools for the query gateway.
//!
//! - `list_configured_connections`: Names of the configured connections
//! - `execute_query`: Run arbitrary SQL on a named connection
//! - `list_databases`: Online databases on a named connection
//! - `list_tables`: Base tables of a database
//! - `get_table_schema`: Column definitions of a table
//!
//! Every tool answers with JSON text. Failures are tool results flagged as
//! errors and carry `{status: "error", connectionName?, message}`.

mod inputs;

pub use inputs::*;

use crate::operations::{self, ErrorResponse};
use crate::server::MssqlGatewayServer;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{CallToolResult, Content};
use rmcp::{tool, tool_router, ErrorData as McpError};
use serde::Serialize;

#[tool_router(vis = "pub(crate)")]
impl MssqlGatewayServer {
    #[tool(
        description = "List the names of the configured SQL Server connections. Call this first to find a connectionName for the other tools."
    )]
    async fn list_configured_connections(&self) -> Result<CallToolResult, McpError> {
        reply(operations::list_configured_connections(&self.context).await)
    }

    #[tool(
        description = "Execute a SQL statement on a named connection.\nSELECT-like statements return {connectionName, columns, rows}; DML returns {connectionName, rowCount, message}; other statements return {connectionName, status, message}."
    )]
    async fn execute_query(
        &self,
        Parameters(input): Parameters<ExecuteQueryInput>,
    ) -> Result<CallToolResult, McpError> {
        reply(operations::execute_query(&self.context, &input.connection_name, &input.query).await)
    }

    #[tool(description = "List the online databases visible from a named connection.")]
    async fn list_databases(
        &self,
        Parameters(input): Parameters<ListDatabasesInput>,
    ) -> Result<CallToolResult, McpError> {
        reply(operations::list_databases(&self.context, &input.connection_name).await)
    }

    #[tool(
        description = "List base tables (views excluded) as schema.table. Uses the connection's database unless databaseName is given."
    )]
    async fn list_tables(
        &self,
        Parameters(input): Parameters<ListTablesInput>,
    ) -> Result<CallToolResult, McpError> {
        reply(
            operations::list_tables(
                &self.context,
                &input.connection_name,
                input.database_name.as_deref(),
            )
            .await,
        )
    }

    #[tool(
        description = "Get column name, data type, maximum length (-1 when not applicable) and nullability for a table, in ordinal order."
    )]
    async fn get_table_schema(
        &self,
        Parameters(input): Parameters<GetTableSchemaInput>,
    ) -> Result<CallToolResult, McpError> {
        reply(
            operations::get_table_schema(
                &self.context,
                &input.connection_name,
                &input.table_name,
                &input.schema_name,
                input.database_name.as_deref(),
            )
            .await,
        )
    }
}

/// Serialize an operation outcome into a tool result.
fn reply<T: Serialize>(outcome: Result<T, ErrorResponse>) -> Result<CallToolResult, McpError> {
    match outcome {
        Ok(value) => Ok(CallToolResult::success(vec![Content::text(to_json(&value)?)])),
        Err(error) => Ok(CallToolResult::error(vec![Content::text(to_json(&error)?)])),
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String, McpError> {
    serde_json::to_string(value).map_err(|e| {
        McpError::internal_error(format!("Failed to serialize response: {}", e), None)
    })
}
