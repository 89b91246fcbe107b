use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Which persistence backend the library runs on.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    /// JSON documents under `data_dir`.
    #[default]
    Local,
    /// SQL tables reached through `database_url`.
    Database,
}

impl std::str::FromStr for StorageKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(StorageKind::Local),
            "database" => Ok(StorageKind::Database),
            other => Err(format!("STORAGE must be 'local' or 'database', got '{other}'")),
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct ServerConfig {
    pub listen_addr: String,
    pub jwt_secret: String,
    pub storage: StorageKind,
    pub database_url: Option<String>,
    pub data_dir: String,
    pub log_dir: String,
}

// Partial config for layering
#[derive(Deserialize, Default, Debug)]
struct PartialServerConfig {
    listen_addr: Option<String>,
    jwt_secret: Option<String>,
    storage: Option<StorageKind>,
    database_url: Option<String>,
    data_dir: Option<String>,
    log_dir: Option<String>,
}

fn default_listen_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_data_dir() -> String {
    "data".to_string()
}

fn default_log_dir() -> String {
    "logs".to_string()
}

impl ServerConfig {
    /// Loads the configuration: TOML file (optional), then environment
    /// variables, which win over the file.
    pub fn load(config_path: Option<&str>) -> Result<Self, String> {
        dotenv::dotenv().ok();
        Self::load_with(config_path, |key| std::env::var(key).ok())
    }

    pub fn load_with(
        config_path: Option<&str>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, String> {
        // 1. Load from file (optional)
        let file_config: PartialServerConfig = match config_path {
            Some(path_str) if Path::new(path_str).exists() => {
                let path = Path::new(path_str);
                let contents = fs::read_to_string(path)
                    .map_err(|e| format!("Failed to read config file at {path:?}: {e}"))?;
                toml::from_str(&contents)
                    .map_err(|e| format!("Failed to parse TOML from config file at {path:?}: {e}"))?
            }
            _ => PartialServerConfig::default(),
        };

        // 2. Load from environment variables
        let env_config = PartialServerConfig {
            listen_addr: env("LISTEN_ADDR"),
            jwt_secret: env("JWT_SECRET"),
            storage: env("STORAGE").map(|s| s.parse()).transpose()?,
            database_url: env("DATABASE_URL"),
            data_dir: env("DATA_DIR"),
            log_dir: env("LOG_DIR"),
        };

        // 3. Merge: environment overrides file
        let final_config = ServerConfig {
            listen_addr: env_config
                .listen_addr
                .or(file_config.listen_addr)
                .unwrap_or_else(default_listen_addr),
            jwt_secret: env_config
                .jwt_secret
                .or(file_config.jwt_secret)
                .filter(|s| !s.is_empty())
                .ok_or("JWT_SECRET is required")?,
            storage: env_config.storage.or(file_config.storage).unwrap_or_default(),
            database_url: env_config.database_url.or(file_config.database_url),
            data_dir: env_config
                .data_dir
                .or(file_config.data_dir)
                .unwrap_or_else(default_data_dir),
            log_dir: env_config
                .log_dir
                .or(file_config.log_dir)
                .unwrap_or_else(default_log_dir),
        };

        if final_config.storage == StorageKind::Database && final_config.database_url.is_none() {
            return Err("DATABASE_URL is required when STORAGE is 'database'".to_string());
        }

        Ok(final_config)
    }
}
