use config::{Config, ConfigError, Environment, File, FileFormat, Source};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Server {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
pub struct Database {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub server: Server,
    pub database: Database,
}

impl Settings {
    /// Defaults, then `imager.toml` if present, then `IMAGER_*` variables
    /// such as `IMAGER_SERVER__PORT`.
    pub fn new() -> Result<Self, ConfigError> {
        Self::load(
            File::with_name("imager")
                .format(FileFormat::Toml)
                .required(false),
            Environment::with_prefix("IMAGER"),
        )
    }

    fn load(
        file: impl Source + Send + Sync + 'static,
        env: Environment,
    ) -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("database.url", "sqlite:imager.db?mode=rwc")?
            .set_default("database.max_connections", 5)?
            .add_source(file)
            .add_source(env.prefix_separator("_").separator("__").try_parsing(true))
            .build()?
            .try_deserialize()
    }
}
