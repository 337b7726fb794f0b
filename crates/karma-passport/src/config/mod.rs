//! Environment-driven settings, read once at startup after loading `.env`.

use std::env;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppEnvironment {
    #[default]
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    /// Unrecognised names fall back to development.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Test => "test",
            Self::Production => "production",
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub session: SessionConfig,
}

impl AppConfig {
    /// Reads `APP_ENV`, `APP_HOST`, `APP_PORT`, `APP_LOG_LEVEL`, and
    /// `APP_SESSION_TTL_MINUTES`.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Ok(Self {
            environment: env::var("APP_ENV")
                .map(|value| AppEnvironment::parse(&value))
                .unwrap_or_default(),
            server: ServerConfig::from_env()?,
            telemetry: TelemetryConfig {
                log_level: var_or("APP_LOG_LEVEL", DEFAULT_LOG_LEVEL),
            },
            session: SessionConfig::from_env()?,
        })
    }
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| default.to_string())
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let raw_port = var_or("APP_PORT", &DEFAULT_PORT.to_string());
        let port = raw_port
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort { value: raw_port })?;

        Ok(Self {
            host: var_or("APP_HOST", DEFAULT_HOST),
            port,
        })
    }

    /// `localhost` maps to the IPv4 loopback; anything else must be a literal address.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip = if self.host.eq_ignore_ascii_case("localhost") {
            IpAddr::V4(Ipv4Addr::LOCALHOST)
        } else {
            self.host
                .parse::<IpAddr>()
                .map_err(|source| ConfigError::InvalidHost {
                    value: self.host.clone(),
                    source,
                })?
        };

        Ok(SocketAddr::new(ip, self.port))
    }
}

#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// `EnvFilter` directive, e.g. `info` or `karma_passport=debug,info`.
    pub log_level: String,
}

/// Lifetime of sessions issued at login.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub ttl_minutes: u32,
}

impl SessionConfig {
    pub const DEFAULT_TTL_MINUTES: u32 = 720;

    fn from_env() -> Result<Self, ConfigError> {
        let raw = var_or(
            "APP_SESSION_TTL_MINUTES",
            &Self::DEFAULT_TTL_MINUTES.to_string(),
        );
        let ttl_minutes = raw
            .parse::<u32>()
            .ok()
            .filter(|minutes| *minutes > 0)
            .ok_or(ConfigError::InvalidSessionTtl { value: raw })?;
        Ok(Self { ttl_minutes })
    }

    pub fn ttl(&self) -> chrono::Duration {
        chrono::Duration::minutes(i64::from(self.ttl_minutes))
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_minutes: Self::DEFAULT_TTL_MINUTES,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort {
        value: String,
    },
    InvalidHost {
        value: String,
        source: std::net::AddrParseError,
    },
    InvalidSessionTtl {
        value: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort { value } => {
                write!(f, "APP_PORT '{}' is not a port number", value)
            }
            ConfigError::InvalidHost { value, .. } => {
                write!(f, "APP_HOST '{}' is not an IP address or localhost", value)
            }
            ConfigError::InvalidSessionTtl { value } => write!(
                f,
                "APP_SESSION_TTL_MINUTES '{}' must be a positive number of minutes",
                value
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source, .. } => Some(source),
            ConfigError::InvalidPort { .. } | ConfigError::InvalidSessionTtl { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Mutex, OnceLock};

    const KEYS: [&str; 5] = [
        "APP_ENV",
        "APP_HOST",
        "APP_PORT",
        "APP_LOG_LEVEL",
        "APP_SESSION_TTL_MINUTES",
    ];

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn with_env<T>(vars: &[(&str, &str)], f: impl FnOnce() -> T) -> T {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        KEYS.iter().for_each(|key| env::remove_var(key));
        for (key, value) in vars {
            env::set_var(key, value);
        }
        let result = f();
        KEYS.iter().for_each(|key| env::remove_var(key));
        result
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = with_env(&[], AppConfig::load).expect("defaults load");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.session.ttl(), chrono::Duration::hours(12));
    }

    #[test]
    fn localhost_binds_loopback() {
        let config = with_env(&[("APP_HOST", "localhost"), ("APP_PORT", "8088")], AppConfig::load)
            .expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::from(([127, 0, 0, 1], 8088)));
    }

    #[test]
    fn hostname_other_than_localhost_is_rejected() {
        let config =
            with_env(&[("APP_HOST", "karma.internal")], AppConfig::load).expect("config loads");
        let err = config.server.socket_addr().expect_err("not an address");
        assert!(err.to_string().contains("karma.internal"));
    }

    #[test]
    fn bad_port_reports_value() {
        let err = with_env(&[("APP_PORT", "70000")], AppConfig::load).expect_err("port rejected");
        assert!(matches!(err, ConfigError::InvalidPort { ref value } if value == "70000"));
    }

    #[test]
    fn zero_session_ttl_is_rejected() {
        let err = with_env(&[("APP_SESSION_TTL_MINUTES", "0")], AppConfig::load)
            .expect_err("ttl rejected");
        assert!(matches!(err, ConfigError::InvalidSessionTtl { .. }));
    }

    #[test]
    fn production_with_short_sessions() {
        let config = with_env(
            &[("APP_ENV", "prod"), ("APP_SESSION_TTL_MINUTES", "30")],
            AppConfig::load,
        )
        .expect("config loads");
        assert_eq!(config.environment, AppEnvironment::Production);
        assert_eq!(config.environment.label(), "production");
        assert_eq!(config.session.ttl(), chrono::Duration::minutes(30));
    }
}
