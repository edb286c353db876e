//! Catalog introspection over the information schema.

use super::connection::Connection;
use super::query::{QueryExecutor, QueryResult};
use super::types::SqlValue;
use crate::constants::{LIST_DATABASES_SQL, LIST_TABLES_SQL, TABLE_SCHEMA_SQL};
use crate::error::ServerError;
use serde::Serialize;

/// One column of a table, as reported by `get_table_schema`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnSchema {
    pub column_name: String,
    pub data_type: String,
    /// Character maximum length, `-1` when not applicable.
    pub max_length: i64,
    pub is_nullable: bool,
}

/// Online databases, ascending by name.
pub async fn list_databases(conn: &mut dyn Connection) -> Result<Vec<String>, ServerError> {
    let rows = tabular_rows(QueryExecutor::execute(conn, LIST_DATABASES_SQL, &[]).await?)?;
    Ok(rows
        .iter()
        .filter_map(|row| extract_string(row, 0))
        .collect())
}

/// Base tables of the connected database as `schema.table`.
pub async fn list_tables(conn: &mut dyn Connection) -> Result<Vec<String>, ServerError> {
    let rows = tabular_rows(QueryExecutor::execute(conn, LIST_TABLES_SQL, &[]).await?)?;
    Ok(rows
        .iter()
        .filter_map(|row| {
            let schema = extract_string(row, 0)?;
            let table = extract_string(row, 1)?;
            Some(format!("{}.{}", schema, table))
        })
        .collect())
}

/// Columns of `schema.table` in ordinal order.
///
/// An empty result is a not-found error, never an empty schema.
pub async fn table_schema(
    conn: &mut dyn Connection,
    table: &str,
    schema: &str,
    database: &str,
) -> Result<Vec<ColumnSchema>, ServerError> {
    let params = [table.to_string(), schema.to_string()];
    let rows = tabular_rows(QueryExecutor::execute(conn, TABLE_SCHEMA_SQL, &params).await?)?;

    let columns: Vec<ColumnSchema> = rows
        .iter()
        .map(|row| ColumnSchema {
            column_name: extract_string(row, 0).unwrap_or_default(),
            data_type: extract_string(row, 1).unwrap_or_default(),
            max_length: extract_i64(row, 2).unwrap_or(-1),
            is_nullable: extract_string(row, 3)
                .map(|v| v.eq_ignore_ascii_case("YES"))
                .unwrap_or(false),
        })
        .collect();

    if columns.is_empty() {
        return Err(ServerError::not_found(format!(
            "Table '{}.{}' not found or has no columns in database '{}'.",
            schema, table, database
        )));
    }

    Ok(columns)
}

fn tabular_rows(result: QueryResult) -> Result<Vec<Vec<SqlValue>>, ServerError> {
    match result {
        QueryResult::Tabular { rows, .. } => Ok(rows),
        other => Err(ServerError::internal(format!(
            "catalog query returned no result set ({})",
            other.kind()
        ))),
    }
}

// Helper functions to extract values from result rows
fn extract_string(row: &[SqlValue], idx: usize) -> Option<String> {
    match row.get(idx)? {
        SqlValue::String(s) => Some(s.clone()),
        SqlValue::Null => None,
        other => Some(other.to_display_string()),
    }
}

fn extract_i64(row: &[SqlValue], idx: usize) -> Option<i64> {
    match row.get(idx)? {
        SqlValue::I64(v) => Some(*v),
        SqlValue::I32(v) => Some(i64::from(*v)),
        SqlValue::I16(v) => Some(i64::from(*v)),
        _ => None,
    }
}
