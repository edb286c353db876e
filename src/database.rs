//! Database connectivity and query execution.

pub mod auth;
pub mod connection;
pub mod metadata;
mod query;
pub mod types;

pub use auth::{build_connection_string, ConnectionString, Credentials};
pub use connection::{
    Connection, Connector, FetchError, StatementOutcome, TiberiusConnector,
};
pub use metadata::ColumnSchema;
pub use query::{QueryExecutor, QueryResult};
pub use types::{SqlValue, TypeMapper};
