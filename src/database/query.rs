//! Query execution and result normalization.

use super::connection::{Connection, FetchError, StatementOutcome};
use super::types::SqlValue;
use crate::error::ServerError;
use std::time::Instant;
use tracing::debug;

/// Normalized outcome of one statement.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryResult {
    /// The statement produced a result set (possibly empty).
    Tabular {
        columns: Vec<String>,
        rows: Vec<Vec<SqlValue>>,
    },
    /// No result set; the backend reported how many rows were affected.
    Affected { row_count: u64 },
    /// No result set and no row count.
    Completed,
}

impl QueryResult {
    /// Classify a raw statement outcome.
    pub fn from_outcome(outcome: StatementOutcome) -> Result<Self, ServerError> {
        let rows = match outcome.fetch {
            Ok(rows) => rows,
            Err(FetchError::NoResultSet) => Vec::new(),
            Err(FetchError::Driver(e)) => return Err(e),
        };

        if let Some(columns) = outcome.columns {
            return Ok(Self::Tabular { columns, rows });
        }

        if !rows.is_empty() {
            return Err(ServerError::internal(
                "driver returned rows without column metadata",
            ));
        }

        Ok(match outcome.row_count {
            Some(row_count) => Self::Affected { row_count },
            None => Self::Completed,
        })
    }

    /// Number of rows returned or affected.
    pub fn row_count(&self) -> u64 {
        match self {
            Self::Tabular { rows, .. } => rows.len() as u64,
            Self::Affected { row_count } => *row_count,
            Self::Completed => 0,
        }
    }

    /// Shape name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Tabular { .. } => "tabular",
            Self::Affected { .. } => "affected",
            Self::Completed => "completed",
        }
    }
}

/// Runs single statements on an open connection.
pub struct QueryExecutor;

impl QueryExecutor {
    /// Execute `sql` and normalize the outcome. Errors are not retried.
    pub async fn execute(
        conn: &mut dyn Connection,
        sql: &str,
        params: &[String],
    ) -> Result<QueryResult, ServerError> {
        let start = Instant::now();
        let outcome = conn.execute(sql, params).await?;
        let result = QueryResult::from_outcome(outcome)?;

        debug!(
            "Query completed: {} ({} rows) in {} ms",
            result.kind(),
            result.row_count(),
            start.elapsed().as_millis()
        );

        Ok(result)
    }
}
