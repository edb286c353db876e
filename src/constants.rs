//! Centralized constants for the MSSQL query gateway.
//!
//! Environment variable names, defaults and catalog SQL live here so the
//! configuration surface can be read in one place.

// =============================================================================
// Connection Defaults
// =============================================================================

/// Default SQL Server port.
pub const DEFAULT_PORT: u16 = 1433;

/// Default client driver identifier written into connection strings.
pub const DEFAULT_DRIVER: &str = "ODBC Driver 17 for SQL Server";

/// Authentication method used when none is configured.
pub const DEFAULT_AUTH_METHOD: &str = "sql_server_authentication";

/// Name given to the legacy single-connection configuration.
pub const DEFAULT_CONNECTION_NAME: &str = "default";

/// Application name reported to SQL Server.
pub const APPLICATION_NAME: &str = "mssql-query-gateway";

/// Schema used by `get_table_schema` when the caller does not give one.
pub const DEFAULT_SCHEMA: &str = "dbo";

// =============================================================================
// Timeout Constants
// =============================================================================

/// Default connection-open timeout in seconds.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 8;

/// Lower bound for a configured connection-open timeout.
pub const MIN_CONNECT_TIMEOUT_SECS: u64 = 1;

/// Upper bound for a configured connection-open timeout.
pub const MAX_CONNECT_TIMEOUT_SECS: u64 = 30;

// =============================================================================
// Environment Variables
// =============================================================================

/// Number of named connection slots scanned at startup.
pub const CONNECTION_SLOT_COUNT: usize = 3;

/// Prefix shared by every slot variable, followed by the slot number.
pub const SLOT_PREFIX: &str = "MSSQL_CONN";

/// Per-slot variable suffixes.
pub const SLOT_ENABLE: &str = "ENABLE";
pub const SLOT_NAME: &str = "NAME";
pub const SLOT_SERVER: &str = "SERVER";
pub const SLOT_PORT: &str = "PORT";
pub const SLOT_DATABASE: &str = "DATABASE";
pub const SLOT_AUTH_METHOD: &str = "AUTH_METHOD";
pub const SLOT_USERNAME: &str = "USERNAME";
pub const SLOT_PASSWORD: &str = "PASSWORD";
pub const SLOT_DRIVER: &str = "DRIVER";
pub const SLOT_TRUST_CERT: &str = "TRUST_CERT";
pub const SLOT_ENCRYPT: &str = "ENCRYPT";

/// Legacy single-connection variables.
pub const ENV_CONNECTION_NAME: &str = "MSSQL_CONNECTION_NAME";
pub const ENV_SERVER_ADDRESS: &str = "MSSQL_SERVER_ADDRESS";
pub const ENV_PORT: &str = "MSSQL_PORT";
pub const ENV_DATABASE_NAME: &str = "MSSQL_DATABASE_NAME";
pub const ENV_USERNAME: &str = "MSSQL_USERNAME";
pub const ENV_PASSWORD: &str = "MSSQL_PASSWORD";
pub const ENV_AUTH_METHOD: &str = "MSSQL_AUTHENTICATION_METHOD";
pub const ENV_DRIVER: &str = "MSSQL_ODBC_DRIVER";
pub const ENV_TRUST_CERT: &str = "MSSQL_TRUST_SERVER_CERTIFICATE";
pub const ENV_ENCRYPT: &str = "MSSQL_ENCRYPT";

/// Connection-open timeout override, in seconds.
pub const ENV_CONNECT_TIMEOUT: &str = "MSSQL_CONNECT_TIMEOUT";

// =============================================================================
// PII Masking
// =============================================================================

/// File name of the packaged manifest carrying the masking section.
pub const MANIFEST_FILE_NAME: &str = "manifest.json";

/// Key of the masking section inside the manifest.
pub const MASKING_SECTION: &str = "pii_masking";

/// How many directories above the executable are searched for the manifest.
pub const MANIFEST_SEARCH_DEPTH: usize = 3;

/// Replacement written by the `redact` strategy when none is configured.
pub const DEFAULT_REDACTION: &str = "[REDACTED]";

/// Mask character used by the `partial` strategy when none is configured.
pub const DEFAULT_MASK_CHAR: char = '*';

// =============================================================================
// Catalog Queries
// =============================================================================

/// Online databases, ascending by name.
pub const LIST_DATABASES_SQL: &str = "SELECT name FROM sys.databases WHERE state = 0 ORDER BY name";

/// Base tables of the current database, ordered by schema then name.
pub const LIST_TABLES_SQL: &str = "SELECT TABLE_SCHEMA, TABLE_NAME \
     FROM INFORMATION_SCHEMA.TABLES \
     WHERE TABLE_TYPE = 'BASE TABLE' \
     ORDER BY TABLE_SCHEMA, TABLE_NAME";

/// Columns of one table (`@P1` table, `@P2` schema) in ordinal order.
pub const TABLE_SCHEMA_SQL: &str = "SELECT COLUMN_NAME, DATA_TYPE, \
     CAST(CHARACTER_MAXIMUM_LENGTH AS INT) AS CHARACTER_MAXIMUM_LENGTH, IS_NULLABLE \
     FROM INFORMATION_SCHEMA.COLUMNS \
     WHERE TABLE_NAME = @P1 AND TABLE_SCHEMA = @P2 \
     ORDER BY ORDINAL_POSITION";

/// Row count of the last statement on the session.
pub const ROWCOUNT_SQL: &str = "SELECT CAST(@@ROWCOUNT AS BIGINT)";

// =============================================================================
// Logging Constants
// =============================================================================

/// Default truncation length for query logging.
pub const LOG_QUERY_TRUNCATE_LENGTH: usize = 100;

/// Length of the per-call correlation id.
pub const CALL_ID_LENGTH: usize = 8;
