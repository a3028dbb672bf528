use std::env;
use std::fmt;

/// Minimum number of bytes accepted for the session signing secret.
pub const MIN_SECRET_LEN: usize = 32;

const DEFAULT_CORS_ORIGINS: &str = "http://localhost:3000,http://localhost:8080";

/// Deployment flavour; decides the cookie policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(AppEnv::Development),
            "production" | "prod" => Ok(AppEnv::Production),
            other => Err(ConfigError::Invalid("APP_ENV", other.to_string())),
        }
    }

    /// Name of the dotenv file loaded before configuration is read.
    pub fn dotenv_file(&self) -> &'static str {
        match self {
            AppEnv::Development => ".env.development",
            AppEnv::Production => ".env",
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str, String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "{} must be set", key),
            ConfigError::Invalid(key, value) => write!(f, "{} has an invalid value: {}", key, value),
        }
    }
}

impl std::error::Error for ConfigError {}

pub struct Config {
    pub app_env: AppEnv,
    /// When absent the in-memory repositories are used.
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub server_port: u16,
    pub server_host: String,
    pub jwt_secret: String,
    pub cors_allow_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let app_env = match lookup("APP_ENV") {
            Some(value) => AppEnv::parse(&value)?,
            None => AppEnv::Development,
        };

        let server_port = match lookup("SERVER_PORT") {
            Some(value) => value
                .parse()
                .map_err(|_| ConfigError::Invalid("SERVER_PORT", value))?,
            None => 8080,
        };

        let database_max_connections = match lookup("DATABASE_MAX_CONNECTIONS") {
            Some(value) => value
                .parse()
                .map_err(|_| ConfigError::Invalid("DATABASE_MAX_CONNECTIONS", value))?,
            None => 5,
        };

        let jwt_secret = lookup("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;
        if jwt_secret.len() < MIN_SECRET_LEN {
            return Err(ConfigError::Invalid(
                "JWT_SECRET",
                format!("must be at least {} bytes", MIN_SECRET_LEN),
            ));
        }

        let cors_allow_origins = lookup("CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|| DEFAULT_CORS_ORIGINS.to_string())
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(String::from)
            .collect();

        Ok(Self {
            app_env,
            database_url: lookup("DATABASE_URL").filter(|url| !url.is_empty()),
            database_max_connections,
            server_port,
            server_host: lookup("SERVER_HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            jwt_secret,
            cors_allow_origins,
        })
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }
}
