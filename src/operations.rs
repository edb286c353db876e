//! The five gateway operations.
//!
//! Each operation resolves a logical connection name, opens one connection,
//! runs one statement, closes the connection and returns a serializable
//! response. Every failure, including a panic, comes back as an
//! [`ErrorResponse`]; nothing escapes to the transport.

use crate::constants::{CALL_ID_LENGTH, DEFAULT_SCHEMA, LOG_QUERY_TRUNCATE_LENGTH};
use crate::database::connection::truncate_for_log;
use crate::database::metadata::{self, ColumnSchema};
use crate::database::{
    build_connection_string, Connection, ConnectionString, QueryExecutor, QueryResult, SqlValue,
};
use crate::error::ServerError;
use crate::masking::panic_message;
use crate::state::AppContext;
use futures_util::FutureExt;
use serde::Serialize;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::time::Instant;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

// =========================================================================
// Responses
// =========================================================================

/// Response of `list_configured_connections`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionsResponse {
    pub connections: Vec<ConnectionEntry>,
}

/// One configured connection. Only the name is exposed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionEntry {
    pub name: String,
}

/// Response of `execute_query`, one of three shapes.
///
/// Tabular and affected results carry no `status` field; a completed
/// statement reports `status: "success"`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ExecuteQueryResponse {
    #[serde(rename_all = "camelCase")]
    Tabular {
        connection_name: String,
        columns: Vec<String>,
        rows: Vec<Vec<SqlValue>>,
    },
    #[serde(rename_all = "camelCase")]
    Affected {
        connection_name: String,
        row_count: u64,
        message: String,
    },
    #[serde(rename_all = "camelCase")]
    Completed {
        connection_name: String,
        status: &'static str,
        message: String,
    },
}

/// Response of `list_databases`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabasesResponse {
    pub connection_name: String,
    pub databases: Vec<String>,
}

/// Response of `list_tables`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TablesResponse {
    pub connection_name: String,
    pub database_name: String,
    pub tables: Vec<String>,
}

/// Response of `get_table_schema`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableSchemaResponse {
    pub connection_name: String,
    pub database_name: String,
    pub schema: Vec<ColumnSchema>,
}

/// Structured failure of any operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    /// Always `"error"`
    pub status: &'static str,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection_name: Option<String>,

    pub message: String,

    /// Error category, for logs and tests
    #[serde(skip)]
    pub kind: &'static str,
}

impl ErrorResponse {
    fn from_error(connection_name: Option<String>, error: &ServerError) -> Self {
        Self {
            status: "error",
            connection_name,
            message: error.to_string(),
            kind: error.kind(),
        }
    }

    fn unexpected(connection_name: Option<String>, detail: &str) -> Self {
        Self {
            status: "error",
            connection_name,
            message: format!("An unexpected error occurred: {}", detail),
            kind: "unexpected",
        }
    }
}

// =========================================================================
// Operations
// =========================================================================

/// Names of all configured connections, in slot order.
pub async fn list_configured_connections(
    ctx: &AppContext,
) -> Result<ConnectionsResponse, ErrorResponse> {
    guarded("list_configured_connections", None, async {
        Ok(ConnectionsResponse {
            connections: ctx
                .registry
                .names()
                .into_iter()
                .map(|name| ConnectionEntry {
                    name: name.to_string(),
                })
                .collect(),
        })
    })
    .await
}

/// Run arbitrary SQL on the named connection.
///
/// Tabular results pass through the masking post-processor.
pub async fn execute_query(
    ctx: &AppContext,
    connection_name: &str,
    query: &str,
) -> Result<ExecuteQueryResponse, ErrorResponse> {
    guarded("execute_query", label(connection_name), async {
        let name = lookup_name(connection_name)?;
        required("query", query)?;
        let target = resolve_target(ctx, name, None)?;

        info!(
            "Executing on '{}': {}",
            name,
            truncate_for_log(query, LOG_QUERY_TRUNCATE_LENGTH)
        );

        let mut conn = open(ctx, &target).await?;
        let result = QueryExecutor::execute(conn.as_mut(), query, &[]).await;
        let result = release(conn, &target, result).await?;

        let connection_name = name.to_string();
        Ok(match result {
            QueryResult::Tabular { columns, rows } => {
                let rows = ctx.masking.apply(&columns, rows)?;
                ExecuteQueryResponse::Tabular {
                    connection_name,
                    columns,
                    rows,
                }
            }
            QueryResult::Affected { row_count } => ExecuteQueryResponse::Affected {
                connection_name,
                row_count,
                message: format!("Query executed successfully. Rows affected: {}", row_count),
            },
            QueryResult::Completed => ExecuteQueryResponse::Completed {
                connection_name,
                status: "success",
                message: "Query executed successfully. No rows returned.".to_string(),
            },
        })
    })
    .await
}

/// Online databases visible from the named connection.
pub async fn list_databases(
    ctx: &AppContext,
    connection_name: &str,
) -> Result<DatabasesResponse, ErrorResponse> {
    guarded("list_databases", label(connection_name), async {
        let name = lookup_name(connection_name)?;
        let target = resolve_target(ctx, name, None)?;

        let mut conn = open(ctx, &target).await?;
        let result = metadata::list_databases(conn.as_mut()).await;
        let databases = release(conn, &target, result).await?;

        Ok(DatabasesResponse {
            connection_name: name.to_string(),
            databases,
        })
    })
    .await
}

/// Base tables of the connection's database, or of `database_name`.
pub async fn list_tables(
    ctx: &AppContext,
    connection_name: &str,
    database_name: Option<&str>,
) -> Result<TablesResponse, ErrorResponse> {
    guarded("list_tables", label(connection_name), async {
        let name = lookup_name(connection_name)?;
        let target = resolve_target(ctx, name, database_name)?;

        let mut conn = open(ctx, &target).await?;
        let result = metadata::list_tables(conn.as_mut()).await;
        let tables = release(conn, &target, result).await?;

        Ok(TablesResponse {
            connection_name: name.to_string(),
            database_name: target.database.clone(),
            tables,
        })
    })
    .await
}

/// Columns of `schema_name.table_name`. A blank schema means `dbo`.
pub async fn get_table_schema(
    ctx: &AppContext,
    connection_name: &str,
    table_name: &str,
    schema_name: &str,
    database_name: Option<&str>,
) -> Result<TableSchemaResponse, ErrorResponse> {
    guarded("get_table_schema", label(connection_name), async {
        let name = lookup_name(connection_name)?;
        let table = required("tableName", table_name)?;
        let schema = match schema_name.trim() {
            "" => DEFAULT_SCHEMA,
            s => s,
        };
        let target = resolve_target(ctx, name, database_name)?;

        let mut conn = open(ctx, &target).await?;
        let result = metadata::table_schema(conn.as_mut(), table, schema, &target.database).await;
        let columns = release(conn, &target, result).await?;

        Ok(TableSchemaResponse {
            connection_name: name.to_string(),
            database_name: target.database.clone(),
            schema: columns,
        })
    })
    .await
}

// =========================================================================
// Call plumbing
// =========================================================================

/// Run one tool call inside its span, converting errors and panics into
/// an [`ErrorResponse`].
async fn guarded<T, F>(
    tool: &'static str,
    connection_name: Option<String>,
    work: F,
) -> Result<T, ErrorResponse>
where
    F: Future<Output = Result<T, ServerError>>,
{
    let span = info_span!("tool", name = tool, call_id = %new_call_id());

    async move {
        let started = Instant::now();
        debug!("Tool call started");

        match AssertUnwindSafe(work).catch_unwind().await {
            Ok(Ok(value)) => {
                debug!("Tool call finished in {} ms", started.elapsed().as_millis());
                Ok(value)
            }
            Ok(Err(e)) => {
                warn!(kind = e.kind(), "Tool call failed: {}", e);
                Err(ErrorResponse::from_error(connection_name, &e))
            }
            Err(panic) => {
                let detail = panic_message(&*panic);
                error!("Tool call panicked: {}", detail);
                Err(ErrorResponse::unexpected(connection_name, &detail))
            }
        }
    }
    .instrument(span)
    .await
}

fn new_call_id() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(CALL_ID_LENGTH);
    id
}

/// Connection name to echo back in an error, if one was given.
fn label(connection_name: &str) -> Option<String> {
    (!connection_name.trim().is_empty()).then(|| connection_name.to_string())
}

/// A non-blank connection name, kept verbatim. Registry lookup is an exact,
/// case-sensitive match.
fn lookup_name(value: &str) -> Result<&str, ServerError> {
    required("connectionName", value)?;
    Ok(value)
}

fn required<'a>(field: &str, value: &'a str) -> Result<&'a str, ServerError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ServerError::invalid_input(format!("{} is required", field)));
    }
    Ok(trimmed)
}

fn resolve_target(
    ctx: &AppContext,
    name: &str,
    database_override: Option<&str>,
) -> Result<ConnectionString, ServerError> {
    let config = ctx.registry.resolve(name)?;
    build_connection_string(config, database_override)
}

async fn open(
    ctx: &AppContext,
    target: &ConnectionString,
) -> Result<Box<dyn Connection>, ServerError> {
    debug!(
        "Opening '{}' at {} (database '{}')",
        target.connection_name,
        target.address(),
        target.database
    );
    ctx.connector.open(target, ctx.connect_timeout).await
}

/// Close `conn`, then hand back the statement's result. A failed close is
/// logged and does not change the result.
async fn release<T>(
    conn: Box<dyn Connection>,
    target: &ConnectionString,
    result: Result<T, ServerError>,
) -> Result<T, ServerError> {
    if let Err(e) = conn.close().await {
        warn!(
            "Failed to close connection '{}': {}",
            target.connection_name, e
        );
    }
    result
}


#[cfg(test)]
mod tests {
    use super::testing::{affected, completed, tabular, FakeConnector};
    use super::*;
    use crate::config::{AuthMethod, ConnectionConfig};
    use crate::constants::{LIST_DATABASES_SQL, LIST_TABLES_SQL, TABLE_SCHEMA_SQL};
    use crate::database::StatementOutcome;
    use crate::masking::{MaskingPolicy, MaskingSetup, RuleMasker, RuleSpec, StrategyRegistry};
    use crate::registry::Registry;
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;

    fn sql_login(name: &str, server: &str, database: &str) -> ConnectionConfig {
        let mut config = ConnectionConfig::new(name, server, database);
        config.username = Some("gateway".to_string());
        config.password = Some("s3cret".to_string());
        config
    }

    fn registry() -> Registry {
        Registry::from_configs([
            sql_login("primary", "db1.internal", "sales"),
            sql_login("archive", "db2.internal", "history"),
        ])
    }

    fn context(connector: &Arc<FakeConnector>, masking: MaskingSetup) -> AppContext {
        AppContext::new(
            registry(),
            masking,
            connector.clone(),
            Duration::from_secs(1),
        )
    }

    fn connector(
        handler: impl Fn(&str, &str, &[String]) -> Result<StatementOutcome, ServerError>
            + Send
            + Sync
            + 'static,
    ) -> Arc<FakeConnector> {
        Arc::new(FakeConnector::new(handler))
    }

    fn ssn_masking(policy: MaskingPolicy) -> MaskingSetup {
        let rules: Vec<RuleSpec> = serde_json::from_value(json!([
            { "column": "ssn", "strategy": "redact" },
            { "column": "name", "strategy": "redact" }
        ]))
        .unwrap();
        MaskingSetup {
            masker: Arc::new(
                RuleMasker::compile(&rules, &StrategyRegistry::with_builtins()).unwrap(),
            ),
            policy,
        }
    }

    #[tokio::test]
    async fn test_list_configured_connections() {
        let fake = connector(|_, _, _| Ok(completed()));
        let ctx = context(&fake, MaskingSetup::disabled());

        let response = list_configured_connections(&ctx).await.unwrap();
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({ "connections": [{ "name": "primary" }, { "name": "archive" }] })
        );
        assert!(fake.events().is_empty());
    }

    #[tokio::test]
    async fn test_select_with_no_rows_is_tabular() {
        let fake = connector(|_, _, _| Ok(tabular(&["id", "email"], vec![])));
        let ctx = context(&fake, MaskingSetup::disabled());

        let response = execute_query(&ctx, "primary", "SELECT id, email FROM users WHERE 1 = 0")
            .await
            .unwrap();
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({ "connectionName": "primary", "columns": ["id", "email"], "rows": [] })
        );
        assert_eq!(
            fake.events(),
            vec!["open primary/sales", "execute primary", "close primary"]
        );
    }

    #[tokio::test]
    async fn test_update_reports_affected_rows() {
        let fake = connector(|_, _, _| Ok(affected(3)));
        let ctx = context(&fake, MaskingSetup::disabled());

        let response = execute_query(&ctx, "primary", "UPDATE users SET active = 0")
            .await
            .unwrap();
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({
                "connectionName": "primary",
                "rowCount": 3,
                "message": "Query executed successfully. Rows affected: 3"
            })
        );
    }

    #[tokio::test]
    async fn test_ddl_reports_completion() {
        let fake = connector(|_, _, _| Ok(completed()));
        let ctx = context(&fake, MaskingSetup::disabled());

        let response = execute_query(&ctx, "archive", "CREATE TABLE t (id INT)")
            .await
            .unwrap();
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({
                "connectionName": "archive",
                "status": "success",
                "message": "Query executed successfully. No rows returned."
            })
        );
    }

    #[tokio::test]
    async fn test_unknown_connection_is_not_found() {
        let fake = connector(|_, _, _| Ok(completed()));
        let ctx = context(&fake, MaskingSetup::disabled());

        let err = execute_query(&ctx, "reporting", "SELECT 1").await.unwrap_err();
        assert_eq!(err.kind, "not_found");
        assert_eq!(
            serde_json::to_value(&err).unwrap(),
            json!({
                "status": "error",
                "connectionName": "reporting",
                "message": "Connection 'reporting' not found. Available connections: primary, archive"
            })
        );
        assert!(fake.events().is_empty());
    }

    #[tokio::test]
    async fn test_connection_lookup_is_exact() {
        let fake = connector(|_, _, _| Ok(completed()));
        let ctx = context(&fake, MaskingSetup::disabled());

        for name in [" archive ", "Archive", "archive\t"] {
            let err = execute_query(&ctx, name, "SELECT 1").await.unwrap_err();
            assert_eq!(err.kind, "not_found");
            assert_eq!(err.connection_name.as_deref(), Some(name));
        }
        assert!(fake.events().is_empty());
    }

    #[tokio::test]
    async fn test_blank_arguments_are_rejected() {
        let fake = connector(|_, _, _| Ok(completed()));
        let ctx = context(&fake, MaskingSetup::disabled());

        let err = execute_query(&ctx, "  ", "SELECT 1").await.unwrap_err();
        assert_eq!(err.kind, "invalid_input");
        assert_eq!(err.connection_name, None);
        assert!(err.message.contains("connectionName is required"));

        let err = execute_query(&ctx, "primary", "\n").await.unwrap_err();
        assert!(err.message.contains("query is required"));

        let err = get_table_schema(&ctx, "primary", "", "dbo", None)
            .await
            .unwrap_err();
        assert!(err.message.contains("tableName is required"));
        assert!(fake.events().is_empty());
    }

    #[tokio::test]
    async fn test_query_error_still_closes_connection() {
        let fake = connector(|_, _, _| {
            Err(crate::error::from_sql_error(208, "Invalid object name 'nope'."))
        });
        let ctx = context(&fake, MaskingSetup::disabled());

        let err = execute_query(&ctx, "primary", "SELECT * FROM nope")
            .await
            .unwrap_err();
        assert_eq!(err.kind, "query");
        assert!(err.message.contains("Invalid object name 'nope'."));
        assert_eq!(err.connection_name.as_deref(), Some("primary"));
        assert_eq!(
            fake.events(),
            vec!["open primary/sales", "execute primary", "close primary"]
        );
    }

    #[tokio::test]
    async fn test_open_failure_names_target() {
        let fake = Arc::new(FakeConnector::new(|_, _, _| Ok(completed())).refusing("archive"));
        let ctx = context(&fake, MaskingSetup::disabled());

        let err = list_databases(&ctx, "archive").await.unwrap_err();
        assert_eq!(err.kind, "connection");
        assert!(err.message.contains("'archive' (db2.internal:1433)"));
        assert_eq!(fake.events(), vec!["open archive/history"]);
    }

    #[tokio::test]
    async fn test_config_error_surfaces_before_opening() {
        let mut config = sql_login("legacy", "db3.internal", "ops");
        config.auth_method = AuthMethod::parse("kerberos");
        let fake = connector(|_, _, _| Ok(completed()));
        let ctx = AppContext::new(
            Registry::from_configs([config]),
            MaskingSetup::disabled(),
            fake.clone(),
            Duration::from_secs(1),
        );

        let err = execute_query(&ctx, "legacy", "SELECT 1").await.unwrap_err();
        assert_eq!(err.kind, "config");
        assert!(err.message.contains("unsupported authentication method"));
        assert!(fake.events().is_empty());
    }

    #[tokio::test]
    async fn test_masking_applies_to_queries_only() {
        let fake = connector(|_, sql, _| {
            if sql == LIST_DATABASES_SQL {
                Ok(tabular(&["name"], vec![vec!["master".into()], vec!["sales".into()]]))
            } else {
                Ok(tabular(
                    &["id", "SSN", "name"],
                    vec![vec![SqlValue::I32(7), "123-45-6789".into(), "Ada".into()]],
                ))
            }
        });
        let ctx = context(&fake, ssn_masking(MaskingPolicy::ReturnUnmasked));

        let response = execute_query(&ctx, "primary", "SELECT id, ssn, name FROM people")
            .await
            .unwrap();
        let ExecuteQueryResponse::Tabular { rows, .. } = response else {
            panic!("expected a tabular response");
        };
        assert_eq!(
            rows,
            vec![vec![SqlValue::I32(7), "[REDACTED]".into(), "[REDACTED]".into()]]
        );

        let databases = list_databases(&ctx, "primary").await.unwrap();
        assert_eq!(databases.databases, vec!["master", "sales"]);
    }

    #[tokio::test]
    async fn test_fail_closed_masking_withholds_rows() {
        // A row shorter than its header makes the masker fail.
        let fake = connector(|_, _, _| Ok(tabular(&["ssn", "name"], vec![vec!["1".into()]])));
        let ctx = context(&fake, ssn_masking(MaskingPolicy::FailClosed));

        let err = execute_query(&ctx, "primary", "SELECT ssn, name FROM people")
            .await
            .unwrap_err();
        assert_eq!(err.kind, "masking");

        let ctx = context(&fake, ssn_masking(MaskingPolicy::ReturnUnmasked));
        let response = execute_query(&ctx, "primary", "SELECT ssn, name FROM people")
            .await
            .unwrap();
        assert!(matches!(
            response,
            ExecuteQueryResponse::Tabular { ref rows, .. } if rows == &vec![vec![SqlValue::from("1")]]
        ));
    }

    #[tokio::test]
    async fn test_list_tables_uses_database_override() {
        let fake = connector(|_, sql, _| {
            assert_eq!(sql, LIST_TABLES_SQL);
            Ok(tabular(
                &["TABLE_SCHEMA", "TABLE_NAME"],
                vec![
                    vec!["dbo".into(), "orders".into()],
                    vec!["hr".into(), "staff".into()],
                ],
            ))
        });
        let ctx = context(&fake, MaskingSetup::disabled());

        let response = list_tables(&ctx, "primary", Some("warehouse")).await.unwrap();
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({
                "connectionName": "primary",
                "databaseName": "warehouse",
                "tables": ["dbo.orders", "hr.staff"]
            })
        );

        let response = list_tables(&ctx, "primary", Some(" ")).await.unwrap();
        assert_eq!(response.database_name, "sales");

        let opens: Vec<String> = fake
            .events()
            .into_iter()
            .filter(|e| e.starts_with("open"))
            .collect();
        assert_eq!(opens, vec!["open primary/warehouse", "open primary/sales"]);
    }

    #[tokio::test]
    async fn test_get_table_schema() {
        let fake = connector(|_, sql, params| {
            assert_eq!(sql, TABLE_SCHEMA_SQL);
            if params == ["customers".to_string(), "dbo".to_string()] {
                Ok(tabular(
                    &["COLUMN_NAME", "DATA_TYPE", "CHARACTER_MAXIMUM_LENGTH", "IS_NULLABLE"],
                    vec![
                        vec!["id".into(), "int".into(), SqlValue::Null, "NO".into()],
                        vec!["email".into(), "nvarchar".into(), SqlValue::I32(255), "YES".into()],
                    ],
                ))
            } else {
                Ok(tabular(
                    &["COLUMN_NAME", "DATA_TYPE", "CHARACTER_MAXIMUM_LENGTH", "IS_NULLABLE"],
                    vec![],
                ))
            }
        });
        let ctx = context(&fake, MaskingSetup::disabled());

        let response = get_table_schema(&ctx, "primary", "customers", " ", None)
            .await
            .unwrap();
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({
                "connectionName": "primary",
                "databaseName": "sales",
                "schema": [
                    { "columnName": "id", "dataType": "int", "maxLength": -1, "isNullable": false },
                    { "columnName": "email", "dataType": "nvarchar", "maxLength": 255, "isNullable": true }
                ]
            })
        );

        let err = get_table_schema(&ctx, "primary", "missing", "dbo", Some("archive_db"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, "not_found");
        assert_eq!(
            err.message,
            "Table 'dbo.missing' not found or has no columns in database 'archive_db'."
        );
    }

    #[tokio::test]
    async fn test_panic_becomes_error_response() {
        let fake = connector(|_, _, _| panic!("driver exploded"));
        let ctx = context(&fake, MaskingSetup::disabled());

        let err = execute_query(&ctx, "primary", "SELECT 1").await.unwrap_err();
        assert_eq!(err.kind, "unexpected");
        assert_eq!(err.message, "An unexpected error occurred: driver exploded");

        // The context is still usable afterwards.
        assert_eq!(
            list_configured_connections(&ctx).await.unwrap().connections.len(),
            2
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_calls_use_separate_connections() {
        let fake = connector(|connection, _, _| {
            Ok(tabular(&["source"], vec![vec![SqlValue::from(connection)]]))
        });
        let ctx = context(&fake, MaskingSetup::disabled());

        let calls = (0..8).map(|i| {
            let name = if i % 2 == 0 { "primary" } else { "archive" };
            let ctx = &ctx;
            async move { (name, execute_query(ctx, name, "SELECT @@SERVERNAME").await) }
        });
        let results = futures_util::future::join_all(calls).await;

        for (name, result) in results {
            let ExecuteQueryResponse::Tabular {
                connection_name,
                rows,
                ..
            } = result.unwrap()
            else {
                panic!("expected a tabular response");
            };
            assert_eq!(connection_name, name);
            assert_eq!(rows, vec![vec![SqlValue::from(name)]]);
        }

        let events = fake.events();
        for kind in ["open", "execute", "close"] {
            assert_eq!(events.iter().filter(|e| e.starts_with(kind)).count(), 8);
        }
        assert_eq!(ctx.registry.names(), vec!["primary", "archive"]);
    }
}
