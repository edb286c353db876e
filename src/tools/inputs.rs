//! Tool input types with JSON Schema generation.

use crate::constants::DEFAULT_SCHEMA;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Input for the `execute_query` tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteQueryInput {
    /// Logical connection name.
    #[schemars(description = "Name of a configured connection (see list_configured_connections)")]
    pub connection_name: String,

    /// The SQL to run.
    #[schemars(description = "SQL statement to execute")]
    pub query: String,
}

/// Input for the `list_databases` tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListDatabasesInput {
    #[schemars(description = "Name of a configured connection (see list_configured_connections)")]
    pub connection_name: String,
}

/// Input for the `list_tables` tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListTablesInput {
    #[schemars(description = "Name of a configured connection (see list_configured_connections)")]
    pub connection_name: String,

    /// Database to list instead of the connection's default.
    #[serde(default)]
    #[schemars(description = "Database to inspect (default: the connection's database)")]
    pub database_name: Option<String>,
}

/// Input for the `get_table_schema` tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GetTableSchemaInput {
    #[schemars(description = "Name of a configured connection (see list_configured_connections)")]
    pub connection_name: String,

    #[schemars(description = "Table name without schema prefix")]
    pub table_name: String,

    #[serde(default = "default_schema")]
    #[schemars(description = "Schema name (default: dbo)")]
    pub schema_name: String,

    #[serde(default)]
    #[schemars(description = "Database to inspect (default: the connection's database)")]
    pub database_name: Option<String>,
}

fn default_schema() -> String {
    DEFAULT_SCHEMA.to_string()
}
