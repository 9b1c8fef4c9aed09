use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub line: LineConfig,
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct LineConfig {
    pub channel_secret: SecretString,
    pub channel_access_token: SecretString,
    pub reply_url: String,
    pub call_timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    pub health_check_port: u16,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub database_url: Option<String>,
    pub log_level: Option<String>,
    pub channel_secret: Option<String>,
    pub channel_access_token: Option<String>,
    pub reply_url: Option<String>,
    pub call_timeout_secs: Option<u64>,
    pub bind_address: Option<String>,
    pub port: Option<u16>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            line: LineConfig {
                channel_secret: String::new().into(),
                channel_access_token: String::new().into(),
                reply_url: "https://api.line.me/v2/bot/message/reply".to_string(),
                call_timeout_secs: 10,
            },
            database: DatabaseConfig {
                url: "sqlite://wardline.db".to_string(),
                max_connections: 5,
                timeout_secs: 30,
            },
            server: ServerConfig {
                bind_address: "127.0.0.1".to_string(),
                port: 8443,
                health_check_port: 8080,
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

fn secret_value(value: String) -> SecretString {
    value.into()
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    line: Option<LinePatch>,
    database: Option<DatabasePatch>,
    server: Option<ServerPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct LinePatch {
    channel_secret: Option<String>,
    channel_access_token: Option<String>,
    reply_url: Option<String>,
    call_timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct DatabasePatch {
    url: Option<String>,
    max_connections: Option<u32>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
    health_check_port: Option<u16>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("wardline.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(line) = patch.line {
            if let Some(channel_secret) = line.channel_secret {
                self.line.channel_secret = secret_value(channel_secret);
            }
            if let Some(channel_access_token) = line.channel_access_token {
                self.line.channel_access_token = secret_value(channel_access_token);
            }
            if let Some(reply_url) = line.reply_url {
                self.line.reply_url = reply_url;
            }
            if let Some(call_timeout_secs) = line.call_timeout_secs {
                self.line.call_timeout_secs = call_timeout_secs;
            }
        }

        if let Some(database) = patch.database {
            if let Some(url) = database.url {
                self.database.url = url;
            }
            if let Some(max_connections) = database.max_connections {
                self.database.max_connections = max_connections;
            }
            if let Some(timeout_secs) = database.timeout_secs {
                self.database.timeout_secs = timeout_secs;
            }
        }

        if let Some(server) = patch.server {
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(port) = server.port {
                self.server.port = port;
            }
            if let Some(health_check_port) = server.health_check_port {
                self.server.health_check_port = health_check_port;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("WARDLINE_CHANNEL_SECRET") {
            self.line.channel_secret = secret_value(value);
        }
        if let Some(value) = read_env("WARDLINE_CHANNEL_ACCESS_TOKEN") {
            self.line.channel_access_token = secret_value(value);
        }
        if let Some(value) = read_env("WARDLINE_REPLY_URL") {
            self.line.reply_url = value;
        }
        if let Some(value) = read_env("WARDLINE_CALL_TIMEOUT_SECS") {
            self.line.call_timeout_secs = parse_u64("WARDLINE_CALL_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("WARDLINE_DATABASE_URL") {
            self.database.url = value;
        }
        if let Some(value) = read_env("WARDLINE_DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections =
                parse_u32("WARDLINE_DATABASE_MAX_CONNECTIONS", &value)?;
        }
        if let Some(value) = read_env("WARDLINE_DATABASE_TIMEOUT_SECS") {
            self.database.timeout_secs = parse_u64("WARDLINE_DATABASE_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("WARDLINE_SERVER_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        if let Some(value) = read_env("WARDLINE_SERVER_PORT") {
            self.server.port = parse_u16("WARDLINE_SERVER_PORT", &value)?;
        }
        if let Some(value) = read_env("WARDLINE_SERVER_HEALTH_CHECK_PORT") {
            self.server.health_check_port =
                parse_u16("WARDLINE_SERVER_HEALTH_CHECK_PORT", &value)?;
        }

        if let Some(value) = read_env("WARDLINE_LOGGING_LEVEL") {
            self.logging.level = value;
        }
        if let Some(value) = read_env("WARDLINE_LOGGING_FORMAT") {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(database_url) = overrides.database_url {
            self.database.url = database_url;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(channel_secret) = overrides.channel_secret {
            self.line.channel_secret = secret_value(channel_secret);
        }
        if let Some(channel_access_token) = overrides.channel_access_token {
            self.line.channel_access_token = secret_value(channel_access_token);
        }
        if let Some(reply_url) = overrides.reply_url {
            self.line.reply_url = reply_url;
        }
        if let Some(call_timeout_secs) = overrides.call_timeout_secs {
            self.line.call_timeout_secs = call_timeout_secs;
        }
        if let Some(bind_address) = overrides.bind_address {
            self.server.bind_address = bind_address;
        }
        if let Some(port) = overrides.port {
            self.server.port = port;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_line(&self.line)?;
        validate_database(&self.database)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("wardline.toml"), PathBuf::from("config/wardline.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_line(line: &LineConfig) -> Result<(), ConfigError> {
    if line.channel_secret.expose_secret().is_empty() {
        return Err(ConfigError::Validation(
            "line.channel_secret is required. Get it from the LINE Developers console > \
             Your Channel > Basic settings"
                .to_string(),
        ));
    }
    if line.channel_access_token.expose_secret().is_empty() {
        return Err(ConfigError::Validation(
            "line.channel_access_token is required. Issue one from the LINE Developers \
             console > Your Channel > Messaging API"
                .to_string(),
        ));
    }
    if !line.reply_url.starts_with("http://") && !line.reply_url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "line.reply_url must be an http(s) URL, got `{}`",
            line.reply_url
        )));
    }
    if line.call_timeout_secs == 0 || line.call_timeout_secs > 60 {
        return Err(ConfigError::Validation(
            "line.call_timeout_secs must be in range 1..=60".to_string(),
        ));
    }
    Ok(())
}

fn validate_database(database: &DatabaseConfig) -> Result<(), ConfigError> {
    let url = database.url.trim();
    let sqlite_url =
        url.starts_with("sqlite://") || url.starts_with("sqlite::") || url == ":memory:";
    if !sqlite_url {
        return Err(ConfigError::Validation(
            "database.url must be a sqlite URL (`sqlite://...`, `sqlite::...`, or `:memory:`)"
                .to_string(),
        ));
    }

    if database.max_connections == 0 {
        return Err(ConfigError::Validation(
            "database.max_connections must be greater than zero".to_string(),
        ));
    }

    if database.timeout_secs == 0 || database.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "database.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    match logging.level.trim().to_ascii_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        other => Err(ConfigError::Validation(format!(
            "unsupported logging.level `{other}` (expected trace|debug|info|warn|error)"
        ))),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().map(|value| value.trim().to_string()).filter(|value| !value.is_empty())
}

fn parse_u16(key: &str, value: &str) -> Result<u16, ConfigError> {
    value
        .parse::<u16>()
        .map_err(|_| ConfigError::InvalidEnvOverride { key: key.to_string(), value: value.to_string() })
}

fn parse_u32(key: &str, value: &str) -> Result<u32, ConfigError> {
    value
        .parse::<u32>()
        .map_err(|_| ConfigError::InvalidEnvOverride { key: key.to_string(), value: value.to_string() })
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value
        .parse::<u64>()
        .map_err(|_| ConfigError::InvalidEnvOverride { key: key.to_string(), value: value.to_string() })
}
