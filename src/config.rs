//! Configuration management for the MSSQL query gateway.
//!
//! Connection parameters come from environment variables following the
//! 12-factor app pattern. Hosts that template their configuration can leave
//! unresolved tokens such as `${user_config.server}` behind; every read goes
//! through [`EnvValue::classify`] so such values behave exactly like unset ones.

use crate::constants::{
    DEFAULT_AUTH_METHOD, DEFAULT_CONNECTION_NAME, DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_DRIVER,
    DEFAULT_PORT, ENV_AUTH_METHOD, ENV_CONNECTION_NAME, ENV_CONNECT_TIMEOUT, ENV_DATABASE_NAME,
    ENV_DRIVER, ENV_ENCRYPT, ENV_PASSWORD, ENV_PORT, ENV_SERVER_ADDRESS, ENV_TRUST_CERT,
    ENV_USERNAME, MAX_CONNECT_TIMEOUT_SECS, MIN_CONNECT_TIMEOUT_SECS, SLOT_AUTH_METHOD,
    SLOT_DATABASE, SLOT_DRIVER, SLOT_ENABLE, SLOT_ENCRYPT, SLOT_NAME, SLOT_PASSWORD, SLOT_PORT,
    SLOT_PREFIX, SLOT_SERVER, SLOT_TRUST_CERT, SLOT_USERNAME,
};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;
use tracing::warn;

/// An unresolved host-template token, e.g. `${user_config.password}`.
static PLACEHOLDER_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\$\{[^}]*\}$").unwrap_or_else(|e| panic!("invalid placeholder regex: {}", e))
});

/// Source of environment-style key/value configuration.
pub trait EnvSource: Send + Sync {
    /// Raw value of `key`, if present.
    fn get(&self, key: &str) -> Option<String>;
}

/// Reads from the process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// A fixed snapshot of variables, used by tests and embedders.
impl EnvSource for HashMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).cloned()
    }
}

/// Outcome of reading one variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvValue {
    /// Not set at all.
    Absent,
    /// Set to an unresolved template token.
    Placeholder(String),
    /// Set to a real value (possibly empty).
    Present(String),
}

impl EnvValue {
    /// Classify a raw value.
    pub fn classify(raw: Option<String>) -> Self {
        match raw {
            None => Self::Absent,
            Some(v) if PLACEHOLDER_PATTERN.is_match(v.trim()) => Self::Placeholder(v),
            Some(v) => Self::Present(v),
        }
    }

    /// Read and classify `key` from `env`.
    pub fn read(env: &dyn EnvSource, key: &str) -> Self {
        Self::classify(env.get(key))
    }

    /// The value, with placeholders collapsed to `None`.
    pub fn into_option(self) -> Option<String> {
        match self {
            Self::Present(v) => Some(v),
            Self::Absent | Self::Placeholder(_) => None,
        }
    }

    /// The value trimmed, with placeholders and blank strings collapsed to `None`.
    pub fn non_empty(self) -> Option<String> {
        self.into_option()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    /// Whether the variable was set to anything, placeholder included.
    pub fn is_set(&self) -> bool {
        !matches!(self, Self::Absent)
    }
}

/// Parse a boolean flag. `true`, `1` and `yes` are true, other values false.
pub fn parse_bool(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "true" | "1" | "yes"
    )
}

/// Supported authentication methods.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthMethod {
    /// Integrated Windows authentication (trusted connection)
    WindowsAuthentication,
    /// SQL Server login with username and password
    SqlServerAuthentication,
    /// Anything else; rejected when a connection string is built
    Unsupported(String),
}

impl AuthMethod {
    /// Parse a configured method name. Unknown names are kept, not rejected.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "windows_authentication" => Self::WindowsAuthentication,
            "sql_server_authentication" => Self::SqlServerAuthentication,
            _ => Self::Unsupported(value.to_string()),
        }
    }

    /// The configured method name.
    pub fn as_str(&self) -> &str {
        match self {
            Self::WindowsAuthentication => "windows_authentication",
            Self::SqlServerAuthentication => "sql_server_authentication",
            Self::Unsupported(raw) => raw,
        }
    }
}

impl Default for AuthMethod {
    fn default() -> Self {
        Self::parse(DEFAULT_AUTH_METHOD)
    }
}

impl fmt::Display for AuthMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One configured SQL Server target.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    /// Lookup key (case-sensitive)
    pub name: String,

    /// SQL Server hostname or IP address
    pub server_address: String,

    /// SQL Server port (default: 1433)
    pub port: u16,

    /// Default database
    pub database_name: String,

    /// Authentication method
    pub auth_method: AuthMethod,

    /// SQL login name
    pub username: Option<String>,

    /// SQL login password; `Some("")` is an explicit blank password
    pub password: Option<String>,

    /// Client driver identifier
    pub driver_name: String,

    /// Trust server certificate (for self-signed certs)
    pub trust_server_certificate: bool,

    /// Require TLS for the whole session
    pub encrypt: bool,

    /// Only enabled configs reach the registry
    pub enabled: bool,
}

impl ConnectionConfig {
    /// A config with defaults for everything but the identity fields.
    pub fn new(
        name: impl Into<String>,
        server_address: impl Into<String>,
        database_name: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            server_address: server_address.into(),
            port: DEFAULT_PORT,
            database_name: database_name.into(),
            auth_method: AuthMethod::default(),
            username: None,
            password: None,
            driver_name: DEFAULT_DRIVER.to_string(),
            trust_server_certificate: false,
            encrypt: false,
            enabled: true,
        }
    }

    /// `host:port`, for logs and error messages.
    pub fn address(&self) -> String {
        format!("{}:{}", self.server_address, self.port)
    }
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("name", &self.name)
            .field("server_address", &self.server_address)
            .field("port", &self.port)
            .field("database_name", &self.database_name)
            .field("auth_method", &self.auth_method)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "********"))
            .field("driver_name", &self.driver_name)
            .field("trust_server_certificate", &self.trust_server_certificate)
            .field("encrypt", &self.encrypt)
            .field("enabled", &self.enabled)
            .finish()
    }
}

/// Variable names for one configuration group.
#[derive(Debug, Clone)]
pub struct ConfigKeys {
    /// Human-readable label used in diagnostics, e.g. `slot 2`
    pub label: String,
    pub enable: Option<String>,
    pub name: Option<String>,
    pub server: String,
    pub port: String,
    pub database: String,
    pub auth_method: String,
    pub username: String,
    pub password: String,
    pub driver: String,
    pub trust_cert: String,
    pub encrypt: String,
}

impl ConfigKeys {
    /// Keys of numbered slot `index` (1-based), e.g. `MSSQL_CONN2_SERVER`.
    pub fn slot(index: usize) -> Self {
        let key = |suffix: &str| format!("{}{}_{}", SLOT_PREFIX, index, suffix);
        Self {
            label: format!("slot {}", index),
            enable: Some(key(SLOT_ENABLE)),
            name: Some(key(SLOT_NAME)),
            server: key(SLOT_SERVER),
            port: key(SLOT_PORT),
            database: key(SLOT_DATABASE),
            auth_method: key(SLOT_AUTH_METHOD),
            username: key(SLOT_USERNAME),
            password: key(SLOT_PASSWORD),
            driver: key(SLOT_DRIVER),
            trust_cert: key(SLOT_TRUST_CERT),
            encrypt: key(SLOT_ENCRYPT),
        }
    }

    /// Keys of the single default configuration.
    pub fn legacy() -> Self {
        Self {
            label: "default configuration".to_string(),
            enable: None,
            name: Some(ENV_CONNECTION_NAME.to_string()),
            server: ENV_SERVER_ADDRESS.to_string(),
            port: ENV_PORT.to_string(),
            database: ENV_DATABASE_NAME.to_string(),
            auth_method: ENV_AUTH_METHOD.to_string(),
            username: ENV_USERNAME.to_string(),
            password: ENV_PASSWORD.to_string(),
            driver: ENV_DRIVER.to_string(),
            trust_cert: ENV_TRUST_CERT.to_string(),
            encrypt: ENV_ENCRYPT.to_string(),
        }
    }

    fn all(&self) -> impl Iterator<Item = &str> {
        self.enable
            .iter()
            .chain(self.name.iter())
            .map(String::as_str)
            .chain([
                self.server.as_str(),
                self.port.as_str(),
                self.database.as_str(),
                self.auth_method.as_str(),
                self.username.as_str(),
                self.password.as_str(),
                self.driver.as_str(),
                self.trust_cert.as_str(),
                self.encrypt.as_str(),
            ])
    }
}

/// Result of reading one configuration group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotOutcome {
    /// The group is enabled and complete.
    Loaded(ConnectionConfig),
    /// The group is switched off.
    Disabled,
    /// None of the group's variables are set.
    Unset,
    /// The group is enabled but an identity field is missing.
    Incomplete { missing: Vec<&'static str> },
}

/// Read one configuration group.
///
/// `enabled_by_default` applies when the enable flag is absent or a placeholder.
/// `default_name` is used when the group has no name variable set.
pub fn read_connection(
    env: &dyn EnvSource,
    keys: &ConfigKeys,
    enabled_by_default: bool,
    default_name: Option<&str>,
) -> SlotOutcome {
    if !keys.all().any(|k| EnvValue::read(env, k).is_set()) {
        return SlotOutcome::Unset;
    }

    let enabled = keys
        .enable
        .as_deref()
        .and_then(|k| EnvValue::read(env, k).into_option())
        .map(|v| parse_bool(&v))
        .unwrap_or(enabled_by_default);
    if !enabled {
        return SlotOutcome::Disabled;
    }

    let name = keys
        .name
        .as_deref()
        .and_then(|k| EnvValue::read(env, k).non_empty())
        .or_else(|| default_name.map(str::to_string));
    let server_address = EnvValue::read(env, &keys.server).non_empty();
    let database_name = EnvValue::read(env, &keys.database).non_empty();

    let mut missing = Vec::new();
    if name.is_none() {
        missing.push("name");
    }
    if server_address.is_none() {
        missing.push("server");
    }
    if database_name.is_none() {
        missing.push("database");
    }
    let (Some(name), Some(server_address), Some(database_name)) =
        (name, server_address, database_name)
    else {
        return SlotOutcome::Incomplete { missing };
    };

    let port = match EnvValue::read(env, &keys.port).non_empty() {
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            warn!(
                "{}: invalid port '{}', using {}",
                keys.label, raw, DEFAULT_PORT
            );
            DEFAULT_PORT
        }),
        None => DEFAULT_PORT,
    };

    let auth_method = EnvValue::read(env, &keys.auth_method)
        .non_empty()
        .map(|v| AuthMethod::parse(&v))
        .unwrap_or_default();

    let flag = |key: &str| {
        EnvValue::read(env, key)
            .into_option()
            .map(|v| parse_bool(&v))
            .unwrap_or(false)
    };

    SlotOutcome::Loaded(ConnectionConfig {
        name,
        server_address,
        port,
        database_name,
        auth_method,
        username: EnvValue::read(env, &keys.username).into_option(),
        password: EnvValue::read(env, &keys.password).into_option(),
        driver_name: EnvValue::read(env, &keys.driver)
            .non_empty()
            .unwrap_or_else(|| DEFAULT_DRIVER.to_string()),
        trust_server_certificate: flag(&keys.trust_cert),
        encrypt: flag(&keys.encrypt),
        enabled,
    })
}

/// Connection-open timeout, from `MSSQL_CONNECT_TIMEOUT` seconds, clamped.
pub fn connect_timeout(env: &dyn EnvSource) -> Duration {
    let secs = EnvValue::read(env, ENV_CONNECT_TIMEOUT)
        .non_empty()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS)
        .clamp(MIN_CONNECT_TIMEOUT_SECS, MAX_CONNECT_TIMEOUT_SECS);
    Duration::from_secs(secs)
}

/// The name the legacy configuration registers under when unnamed.
pub fn legacy_default_name() -> &'static str {
    DEFAULT_CONNECTION_NAME
}
