//! Connection string construction per authentication mode.
//!
//! [`build_connection_string`] is a pure function over a [`ConnectionConfig`].
//! It enforces the required fields and credential rules, and renders the
//! familiar ODBC-style key/value form. The same typed value is turned into a
//! tiberius [`Config`] when a connection is opened.

use crate::config::{AuthMethod, ConnectionConfig};
use crate::constants::APPLICATION_NAME;
use crate::error::ServerError;
use std::fmt;
use tiberius::{Config, EncryptionLevel};

/// Credentials carried by a connection string.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// Trusted (integrated Windows) connection.
    Integrated,
    /// SQL Server login. An empty password is sent as an empty password.
    SqlLogin { username: String, password: String },
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integrated => f.write_str("Integrated"),
            Self::SqlLogin { username, .. } => f
                .debug_struct("SqlLogin")
                .field("username", username)
                .field("password", &"********")
                .finish(),
        }
    }
}

/// A fully validated connection target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionString {
    /// Logical connection name, for diagnostics
    pub connection_name: String,
    pub driver: String,
    pub server: String,
    pub port: u16,
    pub database: String,
    pub credentials: Credentials,
    pub trust_server_certificate: bool,
    pub encrypt: bool,
}

/// Build the connection string for `config`, optionally against another database.
///
/// A blank override falls back to the configured database.
pub fn build_connection_string(
    config: &ConnectionConfig,
    database_override: Option<&str>,
) -> Result<ConnectionString, ServerError> {
    let database = database_override
        .map(str::trim)
        .filter(|db| !db.is_empty())
        .unwrap_or(config.database_name.trim());

    for (field, value) in [
        ("server address", config.server_address.trim()),
        ("database name", database),
        ("driver", config.driver_name.trim()),
    ] {
        if value.is_empty() {
            return Err(ServerError::config(format!(
                "missing required field: {} (connection '{}')",
                field, config.name
            )));
        }
    }

    let credentials = match &config.auth_method {
        AuthMethod::WindowsAuthentication => Credentials::Integrated,
        AuthMethod::SqlServerAuthentication => {
            let username = config
                .username
                .as_deref()
                .map(str::trim)
                .filter(|u| !u.is_empty())
                .ok_or_else(|| {
                    ServerError::config(format!(
                        "missing required field: username is required for SQL Server authentication (connection '{}')",
                        config.name
                    ))
                })?;
            let password = config.password.as_deref().ok_or_else(|| {
                ServerError::config(format!(
                    "missing required field: password is required for SQL Server authentication (connection '{}')",
                    config.name
                ))
            })?;
            Credentials::SqlLogin {
                username: username.to_string(),
                password: password.to_string(),
            }
        }
        AuthMethod::Unsupported(method) => {
            return Err(ServerError::config(format!(
                "unsupported authentication method: '{}' (connection '{}')",
                method, config.name
            )))
        }
    };

    Ok(ConnectionString {
        connection_name: config.name.clone(),
        driver: config.driver_name.trim().to_string(),
        server: config.server_address.trim().to_string(),
        port: config.port,
        database: database.to_string(),
        credentials,
        trust_server_certificate: config.trust_server_certificate,
        encrypt: config.encrypt,
    })
}

impl ConnectionString {
    /// `host:port`.
    pub fn address(&self) -> String {
        format!("{}:{}", self.server, self.port)
    }

    /// The rendered string with the password masked, safe for logs.
    pub fn redacted(&self) -> String {
        self.render(true)
    }

    fn render(&self, redact: bool) -> String {
        let mut out = format!(
            "DRIVER={};SERVER={},{};DATABASE={};",
            braced(&self.driver),
            self.server,
            self.port,
            braced(&self.database)
        );
        match &self.credentials {
            Credentials::Integrated => out.push_str("Trusted_Connection=yes;"),
            Credentials::SqlLogin { username, password } => {
                let password = if redact { "********" } else { password };
                out.push_str(&format!("UID={};PWD={};", braced(username), braced(password)));
            }
        }
        if self.encrypt {
            out.push_str("Encrypt=yes;");
        }
        if self.trust_server_certificate {
            out.push_str("TrustServerCertificate=yes;");
        }
        out
    }

    /// Build the tiberius client configuration.
    pub fn to_tiberius_config(&self) -> Result<Config, ServerError> {
        let mut config = Config::new();
        config.host(&self.server);
        config.port(self.port);
        config.database(&self.database);
        config.application_name(APPLICATION_NAME);

        match &self.credentials {
            Credentials::SqlLogin { username, password } => {
                config.authentication(tiberius::AuthMethod::sql_server(username, password));
            }
            #[cfg(windows)]
            Credentials::Integrated => {
                config.authentication(tiberius::AuthMethod::Integrated);
            }
            #[cfg(not(windows))]
            Credentials::Integrated => {
                return Err(ServerError::config(format!(
                    "windows_authentication is only available on Windows hosts (connection '{}')",
                    self.connection_name
                )));
            }
        }

        if self.encrypt {
            config.encryption(EncryptionLevel::Required);
        } else {
            config.encryption(EncryptionLevel::Off);
        }

        if self.trust_server_certificate {
            config.trust_cert();
        }

        Ok(config)
    }
}

impl fmt::Display for ConnectionString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(false))
    }
}

/// Wrap a value in braces, doubling any closing brace inside it.
fn braced(value: &str) -> String {
    format!("{{{}}}", value.replace('}', "}}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sql_config(username: Option<&str>, password: Option<&str>) -> ConnectionConfig {
        let mut config = ConnectionConfig::new("primary", "db.local", "sales");
        config.auth_method = AuthMethod::SqlServerAuthentication;
        config.username = username.map(str::to_string);
        config.password = password.map(str::to_string);
        config
    }

    #[test]
    fn test_sql_login_string() {
        let target = build_connection_string(&sql_config(Some("reader"), Some("pw")), None).unwrap();
        assert_eq!(
            target.to_string(),
            "DRIVER={ODBC Driver 17 for SQL Server};SERVER=db.local,1433;DATABASE={sales};UID={reader};PWD={pw};"
        );
    }

    #[test]
    fn test_sql_login_always_has_uid_and_pwd() {
        for password in ["", "p", "with;semicolon", "brace}"] {
            let target =
                build_connection_string(&sql_config(Some("u"), Some(password)), None).unwrap();
            let rendered = target.to_string();
            assert!(rendered.contains("UID={u};"));
            assert!(rendered.contains("PWD={"));
        }
    }

    #[test]
    fn test_empty_password_is_encoded() {
        let target = build_connection_string(&sql_config(Some("sa"), Some("")), None).unwrap();
        assert!(target.to_string().contains("PWD={};"));
    }

    #[test]
    fn test_closing_brace_escaped() {
        let target = build_connection_string(&sql_config(Some("sa"), Some("a}b")), None).unwrap();
        assert!(target.to_string().contains("PWD={a}}b};"));
    }

    #[test]
    fn test_separators_in_values_stay_inside_braces() {
        let mut config = sql_config(Some("ops;admin"), Some("pw"));
        config.database_name = "sales;Encrypt=no".to_string();
        let rendered = build_connection_string(&config, None).unwrap().redacted();
        assert!(rendered.contains("DATABASE={sales;Encrypt=no};"));
        assert!(rendered.contains("UID={ops;admin};PWD={********};"));
    }

    #[test]
    fn test_missing_username_rejected() {
        for username in [None, Some(""), Some("   ")] {
            let err = build_connection_string(&sql_config(username, Some("pw")), None).unwrap_err();
            assert!(matches!(err, ServerError::Config(_)));
        }
    }

    #[test]
    fn test_missing_password_rejected() {
        let err = build_connection_string(&sql_config(Some("sa"), None), None).unwrap_err();
        assert!(matches!(err, ServerError::Config(_)));
    }

    #[test]
    fn test_unsupported_method_rejected_regardless_of_fields() {
        let mut config = sql_config(Some("sa"), Some("pw"));
        config.auth_method = AuthMethod::parse("azure_active_directory");
        let err = build_connection_string(&config, None).unwrap_err();
        assert!(err.to_string().contains("unsupported authentication method"));

        config.server_address.clear();
        assert!(matches!(
            build_connection_string(&config, None),
            Err(ServerError::Config(_))
        ));
    }

    #[test]
    fn test_windows_auth_ignores_credentials() {
        let mut config = sql_config(Some("sa"), Some("pw"));
        config.auth_method = AuthMethod::WindowsAuthentication;
        let target = build_connection_string(&config, None).unwrap();
        assert_eq!(target.credentials, Credentials::Integrated);
        let rendered = target.to_string();
        assert!(rendered.contains("Trusted_Connection=yes;"));
        assert!(!rendered.contains("UID="));
    }

    #[test]
    fn test_database_override() {
        let config = sql_config(Some("sa"), Some("pw"));
        let target = build_connection_string(&config, Some("archive")).unwrap();
        assert_eq!(target.database, "archive");

        let target = build_connection_string(&config, Some("  ")).unwrap();
        assert_eq!(target.database, "sales");
    }

    #[test]
    fn test_missing_required_fields() {
        let mut config = sql_config(Some("sa"), Some("pw"));
        config.database_name.clear();
        let err = build_connection_string(&config, None).unwrap_err();
        assert!(err.to_string().contains("missing required field"));

        let mut config = sql_config(Some("sa"), Some("pw"));
        config.driver_name = " ".to_string();
        assert!(build_connection_string(&config, None).is_err());
    }

    #[test]
    fn test_trust_and_encrypt_markers() {
        let mut config = sql_config(Some("sa"), Some("pw"));
        config.trust_server_certificate = true;
        config.encrypt = true;
        let rendered = build_connection_string(&config, None).unwrap().to_string();
        assert!(rendered.ends_with("Encrypt=yes;TrustServerCertificate=yes;"));
    }

    #[test]
    fn test_redacted_hides_password() {
        let target =
            build_connection_string(&sql_config(Some("sa"), Some("hunter2")), None).unwrap();
        assert!(!target.redacted().contains("hunter2"));
        assert!(!format!("{:?}", target).contains("hunter2"));
    }

    #[cfg(not(windows))]
    #[test]
    fn test_integrated_auth_unavailable_off_windows() {
        let mut config = ConnectionConfig::new("w", "h", "d");
        config.auth_method = AuthMethod::WindowsAuthentication;
        let target = build_connection_string(&config, None).unwrap();
        assert!(matches!(
            target.to_tiberius_config(),
            Err(ServerError::Config(_))
        ));
    }
}
