//! Opening connections and running single statements.
//!
//! [`Connector`] and [`Connection`] are the seam between the gateway and the
//! TDS driver. Production uses [`TiberiusConnector`]; tests plug in a
//! scripted fake.

use super::auth::ConnectionString;
use super::types::{SqlValue, TypeMapper};
use crate::constants::{LOG_QUERY_TRUNCATE_LENGTH, ROWCOUNT_SQL};
use crate::error::ServerError;
use async_trait::async_trait;
use futures_util::stream::TryStreamExt;
use once_cell::sync::Lazy;
use regex::Regex;
use std::time::Duration;
use tiberius::{Client, QueryItem, QueryStream, ToSql};
use tokio::net::TcpStream;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};
use tracing::debug;

/// Type alias for a raw tiberius connection.
pub type RawConnection = Client<Compat<TcpStream>>;

/// Leading keyword of statements whose affected-row count is reported.
static ROW_COUNTING_STATEMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(INSERT|UPDATE|DELETE|MERGE|WITH)\b")
        .unwrap_or_else(|e| panic!("Internal error: invalid statement pattern: {}", e))
});

/// Leading whitespace, line comments and block comments.
static LEADING_TRIVIA: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:\s+|--[^\n]*(?:\n|$)|/\*(?s:.*?)\*/)*")
        .unwrap_or_else(|e| panic!("Internal error: invalid trivia pattern: {}", e))
});

/// Why a statement produced no fetchable rows.
#[derive(Debug)]
pub enum FetchError {
    /// The statement has no result set to fetch from (DDL, DML).
    NoResultSet,
    /// Fetching failed.
    Driver(ServerError),
}

/// Raw outcome of running one statement.
#[derive(Debug)]
pub struct StatementOutcome {
    /// Column names of the first result set, if the statement produced one.
    pub columns: Option<Vec<String>>,
    /// Rows of the first result set.
    pub fetch: Result<Vec<Vec<SqlValue>>, FetchError>,
    /// Affected-row count, when the driver reports one.
    pub row_count: Option<u64>,
}

/// Opens connections to a target.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Open a connection, failing after `timeout`.
    async fn open(
        &self,
        target: &ConnectionString,
        timeout: Duration,
    ) -> Result<Box<dyn Connection>, ServerError>;
}

/// One open connection, exclusively owned by a single call.
#[async_trait]
pub trait Connection: Send {
    /// Run one statement. `params` bind to `@P1`, `@P2`, ... in order.
    async fn execute(&mut self, sql: &str, params: &[String])
        -> Result<StatementOutcome, ServerError>;

    /// Close the connection.
    async fn close(self: Box<Self>) -> Result<(), ServerError>;
}

/// Connector backed by tiberius over TCP.
#[derive(Debug, Clone, Copy, Default)]
pub struct TiberiusConnector;

#[async_trait]
impl Connector for TiberiusConnector {
    async fn open(
        &self,
        target: &ConnectionString,
        timeout: Duration,
    ) -> Result<Box<dyn Connection>, ServerError> {
        let config = target.to_tiberius_config()?;
        let address = target.address();
        debug!("Connecting: {}", target.redacted());

        let connect = async {
            let tcp = TcpStream::connect(&address)
                .await
                .map_err(|e| ServerError::connection_with_source("TCP connect failed", e))?;

            tcp.set_nodelay(true).map_err(|e| {
                ServerError::connection_with_source("Failed to set TCP_NODELAY", e)
            })?;

            Client::connect(config, tcp.compat_write())
                .await
                .map_err(ServerError::from)
        };

        let client = tokio::time::timeout(timeout, connect)
            .await
            .map_err(|_| {
                ServerError::connection(format!(
                    "timed out after {} seconds",
                    timeout.as_secs()
                ))
            })?
            .map_err(|e| match e {
                ServerError::Query { message, .. } => ServerError::connection(message),
                other => other,
            })
            .map_err(|e| e.with_target(&target.connection_name, &address))?;

        debug!("Connection established to {}", address);
        Ok(Box::new(TiberiusConnection { client }))
    }
}

/// An open tiberius client.
pub struct TiberiusConnection {
    client: RawConnection,
}

#[async_trait]
impl Connection for TiberiusConnection {
    async fn execute(
        &mut self,
        sql: &str,
        params: &[String],
    ) -> Result<StatementOutcome, ServerError> {
        debug!(
            "Executing: {}",
            truncate_for_log(sql, LOG_QUERY_TRUNCATE_LENGTH)
        );

        let stream = if params.is_empty() {
            self.client.simple_query(sql).await?
        } else {
            let args: Vec<&dyn ToSql> = params.iter().map(|p| p as &dyn ToSql).collect();
            self.client.query(sql, &args).await?
        };
        let (columns, rows) = first_result_set(stream).await?;

        if columns.is_some() {
            return Ok(StatementOutcome {
                columns,
                fetch: Ok(rows),
                row_count: None,
            });
        }

        let row_count = if reports_row_count(sql) {
            self.last_row_count().await?
        } else {
            None
        };

        Ok(StatementOutcome {
            columns: None,
            fetch: Err(FetchError::NoResultSet),
            row_count,
        })
    }

    async fn close(self: Box<Self>) -> Result<(), ServerError> {
        self.client.close().await.map_err(ServerError::from)
    }
}

impl TiberiusConnection {
    /// `@@ROWCOUNT` of the previous statement on this session.
    async fn last_row_count(&mut self) -> Result<Option<u64>, ServerError> {
        let row = self.client.simple_query(ROWCOUNT_SQL).await?.into_row().await?;
        Ok(row
            .and_then(|r| r.try_get::<i64, _>(0).ok().flatten())
            .and_then(|n| u64::try_from(n).ok()))
    }
}

/// Collect the first result set and drain any that follow.
async fn first_result_set(
    mut stream: QueryStream<'_>,
) -> Result<(Option<Vec<String>>, Vec<Vec<SqlValue>>), ServerError> {
    let mut columns: Option<Vec<String>> = None;
    let mut rows = Vec::new();

    while let Some(item) = stream.try_next().await? {
        match item {
            QueryItem::Metadata(meta) if meta.result_index() == 0 => {
                debug!(
                    "Result columns: {}",
                    meta.columns()
                        .iter()
                        .map(|c| format!("{} {}", c.name(), TypeMapper::sql_type_name(c)))
                        .collect::<Vec<_>>()
                        .join(", ")
                );
                columns = Some(meta.columns().iter().map(|c| c.name().to_string()).collect());
            }
            QueryItem::Row(row) if row.result_index() == 0 => {
                rows.push(TypeMapper::row_values(&row));
            }
            _ => {}
        }
    }

    Ok((columns, rows))
}

/// Whether `sql` starts with a statement that affects rows.
pub fn reports_row_count(sql: &str) -> bool {
    let trimmed = LEADING_TRIVIA
        .find(sql)
        .map(|m| &sql[m.end()..])
        .unwrap_or(sql);
    ROW_COUNTING_STATEMENT.is_match(trimmed)
}

/// Truncate a string for logging purposes.
pub fn truncate_for_log(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        return s.to_string();
    }
    let mut end = max_len;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &s[..end])
}
