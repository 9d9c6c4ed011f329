//! Process configuration, read from the environment once on first access.
//!
//! Unset or unparsable values fall back to the defaults below.

use lazy_static::lazy_static;
use std::str::FromStr;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_INSTANCE_LIMIT: usize = 3;
pub const DEFAULT_CREDENTIALS_HOST: &str = "127.0.0.1";
pub const DEFAULT_CREDENTIALS_PORT: u16 = 5432;
pub const DEFAULT_LOG_LEVEL: &str = "info";

lazy_static! {
    pub static ref BIND_ADDR: String = env_or("OSB_BIND_ADDR", DEFAULT_BIND_ADDR.to_string());
    pub static ref CATALOG_PATH: Option<String> = non_empty(std::env::var("OSB_CATALOG_PATH").ok());
    pub static ref INSTANCE_LIMIT: usize = env_or("OSB_INSTANCE_LIMIT", DEFAULT_INSTANCE_LIMIT);
    pub static ref DASHBOARD_BASE_URL: String = env_or("OSB_DASHBOARD_BASE_URL", String::new());
    pub static ref CREDENTIALS_HOST: String = env_or("OSB_CREDENTIALS_HOST", DEFAULT_CREDENTIALS_HOST.to_string());
    pub static ref CREDENTIALS_PORT: u16 = env_or("OSB_CREDENTIALS_PORT", DEFAULT_CREDENTIALS_PORT);
    pub static ref LOG_LEVEL: String = env_or("OSB_LOG_LEVEL", DEFAULT_LOG_LEVEL.to_string());
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    parse_or(std::env::var(key).ok().as_deref(), default)
}

fn parse_or<T: FromStr>(raw: Option<&str>, default: T) -> T {
    raw.map(str::trim)
        .filter(|v| !v.is_empty())
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn non_empty(raw: Option<String>) -> Option<String> {
    raw.filter(|v| !v.trim().is_empty())
}
