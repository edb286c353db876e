//! Error types for the MSSQL query gateway.
//!
//! Every failure a tool call can hit is one of the variants below. SQL Server
//! error numbers are mapped to clearer messages, nothing is retried.

use thiserror::Error;

/// Domain-specific errors for the gateway.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Bad or missing connection parameters, unsupported auth method
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network, login or TLS failure while opening a connection
    #[error("Connection error: {message}")]
    Connection {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Unknown connection name, missing table
    #[error("{0}")]
    NotFound(String),

    /// The backend rejected the statement
    #[error("Query execution error: {message}")]
    Query {
        message: String,
        sql_error_code: Option<i32>,
    },

    /// Masking failed under a fail-closed policy
    #[error("Masking error: {0}")]
    Masking(String),

    /// Invalid tool arguments
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServerError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection {
            message: msg.into(),
            source: None,
        }
    }

    /// Create a connection error with a source.
    pub fn connection_with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Connection {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a not-found error.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a query execution error.
    pub fn query_error(msg: impl Into<String>) -> Self {
        Self::Query {
            message: msg.into(),
            sql_error_code: None,
        }
    }

    /// Create a query execution error with the SQL Server error number.
    pub fn query_error_with_code(msg: impl Into<String>, code: i32) -> Self {
        Self::Query {
            message: msg.into(),
            sql_error_code: Some(code),
        }
    }

    /// Create a masking error.
    pub fn masking(msg: impl Into<String>) -> Self {
        Self::Masking(msg.into())
    }

    /// Create an invalid input error.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create an internal error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Short machine-readable kind, used as a log field.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::Connection { .. } => "connection",
            Self::NotFound(_) => "not_found",
            Self::Query { .. } => "query",
            Self::Masking(_) => "masking",
            Self::InvalidInput(_) => "invalid_input",
            Self::Internal(_) => "internal",
        }
    }

    /// Prefix a connection error message with the logical name and address
    /// it was opened for. Other variants are returned unchanged.
    pub fn with_target(self, name: &str, address: &str) -> Self {
        match self {
            Self::Connection { message, source } => Self::Connection {
                message: format!("'{}' ({}): {}", name, address, message),
                source,
            },
            other => other,
        }
    }
}

/// Map SQL Server error numbers to clearer query errors.
pub fn from_sql_error(code: i32, message: &str) -> ServerError {
    match code {
        // Login failures happen during the handshake
        18456 => ServerError::connection(format!("Login failed: {}", message)),
        4060 => ServerError::connection(format!("Cannot open database: {}", message)),

        102 => ServerError::query_error_with_code(format!("Syntax error: {}", message), code),
        207 => ServerError::query_error_with_code(format!("Invalid column: {}", message), code),
        208 => ServerError::query_error_with_code(format!("Invalid object: {}", message), code),
        229 | 230 | 262 => {
            ServerError::query_error_with_code(format!("Permission denied: {}", message), code)
        }
        547 | 2601 | 2627 => {
            ServerError::query_error_with_code(format!("Constraint violation: {}", message), code)
        }
        1205 => ServerError::query_error_with_code(
            "Transaction was deadlocked and has been rolled back",
            code,
        ),

        _ => ServerError::query_error_with_code(message, code),
    }
}

impl From<tiberius::error::Error> for ServerError {
    fn from(e: tiberius::error::Error) -> Self {
        use tiberius::error::Error;

        match &e {
            Error::Server(token) => from_sql_error(token.code() as i32, token.message()),
            Error::Io { .. } => ServerError::connection(format!("I/O failure: {}", e)),
            Error::Tls(_) => ServerError::connection(format!("TLS failure: {}", e)),
            Error::Routing { host, port } => ServerError::connection(format!(
                "server requested a redirect to {}:{}",
                host, port
            )),
            Error::Conversion(_) | Error::Utf8 | Error::Utf16 | Error::ParseInt(_) => {
                ServerError::query_error(format!("Type conversion error: {}", e))
            }
            _ => ServerError::query_error(e.to_string()),
        }
    }
}
