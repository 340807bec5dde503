//! Handles settings for the application. Configuration is written in
//! `settings.toml`; any key can be overridden from the environment with the
//! `TRIP_LEDGER__` prefix, e.g. `TRIP_LEDGER__SERVER__PORT=8080`.
//!
//! ```toml
//! [app]
//! level = "info"
//!
//! [server]
//! bind = "0.0.0.0"
//! port = 3000
//! database = { sqlite = "trip_ledger.db" }
//! attachments_dir = "uploads/expense_attachments"
//! max_upload_bytes = 10485760
//! ```
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

pub const DEFAULT_ATTACHMENTS_DIR: &str = "uploads/expense_attachments";

#[derive(Debug, Deserialize)]
pub struct App {
    pub level: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: Option<String>,
    pub port: u16,
    pub database: Database,
    pub attachments_dir: Option<String>,
    pub max_upload_bytes: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub app: App,
    pub server: Option<Server>,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::from_file("settings")
    }

    fn from_file(name: &str) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .set_default("app.level", "info")?
            .add_source(File::with_name(name).required(false))
            .add_source(Environment::with_prefix("TRIP_LEDGER").separator("__"))
            .build()?;

        settings.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_server_section() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(
            &path,
            r#"
[app]
level = "debug"

[server]
port = 8080
database = { sqlite = "ledger.db" }
max_upload_bytes = 1024
"#,
        )
        .unwrap();

        let settings = Settings::from_file(path.to_str().unwrap()).unwrap();
        assert_eq!(settings.app.level, "debug");
        let server = settings.server.unwrap();
        assert_eq!(server.port, 8080);
        assert!(matches!(server.database, Database::Sqlite(ref path) if path == "ledger.db"));
        assert_eq!(server.bind, None);
        assert_eq!(server.attachments_dir, None);
        assert_eq!(server.max_upload_bytes, Some(1024));
    }

    #[test]
    fn memory_database_and_default_level() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "[server]\nport = 3000\ndatabase = \"memory\"\n").unwrap();

        let settings = Settings::from_file(path.to_str().unwrap()).unwrap();
        assert_eq!(settings.app.level, "info");
        assert!(matches!(settings.server.unwrap().database, Database::Memory));
    }
}
