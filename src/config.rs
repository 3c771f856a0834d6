use crate::error::InsightError;
use figment::providers::{Env, Serialized};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Azure SQL connection settings. Loaded once at startup and handed to the
/// components that need them; nothing reads the environment afterwards.
#[derive(Clone, PartialEq)]
pub struct AzureSqlConfig {
    pub server: String,
    pub database: String,
    pub username: String,
    pub password: String,
}

// The password must never reach logs or diagnostics.
impl fmt::Debug for AzureSqlConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AzureSqlConfig")
            .field("server", &self.server)
            .field("database", &self.database)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub azure_sql: AzureSqlConfig,
    pub host: String,
    pub port: u16,
    pub loglevel: String,
    pub data_dir: PathBuf,
}

impl AppConfig {
    /// Default provider stack: serialized defaults, then `INSIGHT_*` service
    /// settings, then the required `AZURE_SQL_*` connection quartet nested
    /// under `azure_sql`.
    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(RawConfig::default()))
            .merge(Env::prefixed("INSIGHT_"))
            .merge(Env::prefixed("AZURE_SQL_").map(|key| format!("azure_sql.{}", key).into()))
    }

    pub fn load() -> Result<Self, InsightError> {
        Self::from_figment(Self::figment())
    }

    /// Extract and validate from any provider stack. Tests inject providers
    /// here instead of mutating the process environment.
    pub fn from_figment(figment: Figment) -> Result<Self, InsightError> {
        let raw: RawConfig = figment.extract()?;
        Ok(Self {
            azure_sql: raw.azure_sql.validate()?,
            host: raw.host,
            port: raw.port,
            loglevel: raw.loglevel,
            data_dir: raw.data_dir,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct RawConfig {
    pub(crate) azure_sql: RawAzureSql,
    pub(crate) host: String,
    pub(crate) port: u16,
    pub(crate) loglevel: String,
    pub(crate) data_dir: PathBuf,
}

impl Default for RawConfig {
    fn default() -> Self {
        Self {
            azure_sql: RawAzureSql::default(),
            host: "127.0.0.1".to_string(),
            port: 8000,
            loglevel: "info".to_string(),
            data_dir: PathBuf::from("data"),
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub(crate) struct RawAzureSql {
    pub(crate) server: Option<String>,
    pub(crate) database: Option<String>,
    pub(crate) username: Option<String>,
    pub(crate) password: Option<String>,
}

impl RawAzureSql {
    /// All four settings are required and must be non-empty. The listener is
    /// never created when any of them is absent.
    fn validate(self) -> Result<AzureSqlConfig, InsightError> {
        Ok(AzureSqlConfig {
            server: require(self.server, "AZURE_SQL_SERVER")?,
            database: require(self.database, "AZURE_SQL_DATABASE")?,
            username: require(self.username, "AZURE_SQL_USERNAME")?,
            password: require(self.password, "AZURE_SQL_PASSWORD")?,
        })
    }
}

fn require(value: Option<String>, key: &'static str) -> Result<String, InsightError> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(InsightError::MissingConfiguration { key }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn figment_with(
        server: Option<&str>,
        database: Option<&str>,
        username: Option<&str>,
        password: Option<&str>,
    ) -> Figment {
        let raw = RawConfig {
            azure_sql: RawAzureSql {
                server: server.map(str::to_string),
                database: database.map(str::to_string),
                username: username.map(str::to_string),
                password: password.map(str::to_string),
            },
            ..RawConfig::default()
        };
        Figment::from(Serialized::defaults(raw))
    }

    #[test]
    fn loads_all_four_settings_verbatim() {
        let cfg = AppConfig::from_figment(figment_with(
            Some("srv.example.com"),
            Some("pharmadb"),
            Some("svcuser"),
            Some("p@ss"),
        ))
        .expect("config should load");

        assert_eq!(cfg.azure_sql.server, "srv.example.com");
        assert_eq!(cfg.azure_sql.database, "pharmadb");
        assert_eq!(cfg.azure_sql.username, "svcuser");
        assert_eq!(cfg.azure_sql.password, "p@ss");
        assert_eq!(cfg.host, "127.0.0.1");
        assert_eq!(cfg.port, 8000);
    }

    #[test]
    fn missing_password_fails_fast_naming_the_key() {
        let err = AppConfig::from_figment(figment_with(
            Some("srv.example.com"),
            Some("pharmadb"),
            Some("svcuser"),
            None,
        ))
        .expect_err("missing password must fail");

        match err {
            InsightError::MissingConfiguration { key } => assert_eq!(key, "AZURE_SQL_PASSWORD"),
            other => panic!("expected MissingConfiguration, got {other}"),
        }
    }

    #[test]
    fn empty_value_counts_as_missing() {
        let err = AppConfig::from_figment(figment_with(
            Some(""),
            Some("pharmadb"),
            Some("svcuser"),
            Some("p@ss"),
        ))
        .expect_err("empty server must fail");

        match err {
            InsightError::MissingConfiguration { key } => assert_eq!(key, "AZURE_SQL_SERVER"),
            other => panic!("expected MissingConfiguration, got {other}"),
        }
    }

    #[test]
    fn each_setting_is_reported_by_its_own_key() {
        let cases = [
            (figment_with(None, Some("d"), Some("u"), Some("p")), "AZURE_SQL_SERVER"),
            (figment_with(Some("s"), None, Some("u"), Some("p")), "AZURE_SQL_DATABASE"),
            (figment_with(Some("s"), Some("d"), None, Some("p")), "AZURE_SQL_USERNAME"),
            (figment_with(Some("s"), Some("d"), Some("u"), None), "AZURE_SQL_PASSWORD"),
        ];
        for (figment, expected) in cases {
            match AppConfig::from_figment(figment) {
                Err(InsightError::MissingConfiguration { key }) => assert_eq!(key, expected),
                other => panic!("expected MissingConfiguration for {expected}, got {other:?}"),
            }
        }
    }

    #[test]
    fn debug_output_redacts_the_password() {
        let cfg = AppConfig::from_figment(figment_with(
            Some("srv.example.com"),
            Some("pharmadb"),
            Some("svcuser"),
            Some("p@ss"),
        ))
        .unwrap();

        let rendered = format!("{:?}", cfg);
        assert!(rendered.contains("srv.example.com"));
        assert!(rendered.contains("<redacted>"));
        assert!(!rendered.contains("p@ss"));
    }

    #[test]
    fn missing_configuration_error_never_echoes_values() {
        let err = AppConfig::from_figment(figment_with(
            Some("srv.example.com"),
            Some("pharmadb"),
            Some("svcuser"),
            Some(""),
        ))
        .unwrap_err();

        let rendered = err.to_string();
        assert!(rendered.contains("AZURE_SQL_PASSWORD"));
        assert!(!rendered.contains("srv.example.com"));
    }
}
