// server/src/config.rs

use crate::errors::{AppError, Result};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;

/// One year.
pub const MAX_SESSION_TTL_HOURS: i64 = 24 * 366;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
  Text,
  Json,
}

impl FromStr for LogFormat {
  type Err = AppError;

  fn from_str(s: &str) -> Result<Self> {
    match s.trim().to_ascii_lowercase().as_str() {
      "text" | "pretty" => Ok(LogFormat::Text),
      "json" => Ok(LogFormat::Json),
      other => Err(AppError::Config(format!("Invalid LOG_FORMAT '{}': expected 'text' or 'json'", other))),
    }
  }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  pub database_url: String,
  pub database_max_connections: u32,

  pub session_ttl_hours: i64,

  /// Share of a completed booking's final price credited to the car's partner.
  pub partner_share_percent: u32,
  /// Share of the final price charged as a prepayment.
  pub prepayment_percent: u32,

  pub mock_payment_account_id: String,

  pub run_migrations: bool,
  pub seed_db: bool,
  pub log_format: LogFormat,
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok();
    let config = Self::from_lookup(|key| env::var(key).ok())?;
    tracing::info!("Application configuration loaded successfully.");
    Ok(config)
  }

  /// Builds the config from any key lookup; `from_env` passes the process environment.
  pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
    let get_env = |var_name: &str| {
      lookup(var_name).ok_or_else(|| AppError::Config(format!("Missing environment variable '{}'", var_name)))
    };
    let get_or = |var_name: &str, default: &str| lookup(var_name).unwrap_or_else(|| default.to_string());

    let server_host = get_or("SERVER_HOST", "127.0.0.1");
    let server_port = parse_value::<u16>("SERVER_PORT", &get_or("SERVER_PORT", "8080"))?;
    let database_url = get_env("DATABASE_URL")?;
    let database_max_connections = parse_value::<u32>("DATABASE_MAX_CONNECTIONS", &get_or("DATABASE_MAX_CONNECTIONS", "10"))?;

    let session_ttl_hours = parse_value::<i64>("SESSION_TTL_HOURS", &get_or("SESSION_TTL_HOURS", "72"))?;
    if !(1..=MAX_SESSION_TTL_HOURS).contains(&session_ttl_hours) {
      return Err(AppError::Config(format!(
        "SESSION_TTL_HOURS must be between 1 and {}, got {}",
        MAX_SESSION_TTL_HOURS, session_ttl_hours
      )));
    }

    let partner_share_percent = parse_percent("PARTNER_SHARE_PERCENT", &get_or("PARTNER_SHARE_PERCENT", "80"))?;
    let prepayment_percent = parse_percent("PREPAYMENT_PERCENT", &get_or("PREPAYMENT_PERCENT", "30"))?;

    let mock_payment_account_id = get_or("MOCK_PAYMENT_ACCOUNT_ID", "mock_main_acct");

    let run_migrations = parse_value::<bool>("RUN_MIGRATIONS", &get_or("RUN_MIGRATIONS", "true"))?;
    let seed_db = parse_value::<bool>("SEED_DB", &get_or("SEED_DB", "false"))?;
    let log_format = get_or("LOG_FORMAT", "text").parse::<LogFormat>()?;

    Ok(Self {
      server_host,
      server_port,
      database_url,
      database_max_connections,
      session_ttl_hours,
      partner_share_percent,
      prepayment_percent,
      mock_payment_account_id,
      run_migrations,
      seed_db,
      log_format,
    })
  }

  pub fn bind_address(&self) -> String {
    format!("{}:{}", self.server_host, self.server_port)
  }
}

fn parse_value<T>(var_name: &str, raw: &str) -> Result<T>
where
  T: FromStr,
  T::Err: std::fmt::Display,
{
  raw
    .trim()
    .parse::<T>()
    .map_err(|e| AppError::Config(format!("Invalid {} value '{}': {}", var_name, raw, e)))
}

fn parse_percent(var_name: &str, raw: &str) -> Result<u32> {
  let value = parse_value::<u32>(var_name, raw)?;
  if value > 100 {
    return Err(AppError::Config(format!("{} must be between 0 and 100, got {}", var_name, value)));
  }
  Ok(value)
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashMap;

  fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    move |key| map.get(key).cloned()
  }

  #[test]
  fn defaults_apply_when_only_database_url_is_set() {
    let cfg = AppConfig::from_lookup(lookup_from(&[("DATABASE_URL", "postgres://localhost/carshare")])).unwrap();
    assert_eq!(cfg.bind_address(), "127.0.0.1:8080");
    assert_eq!(cfg.database_max_connections, 10);
    assert_eq!(cfg.session_ttl_hours, 72);
    assert_eq!(cfg.partner_share_percent, 80);
    assert_eq!(cfg.prepayment_percent, 30);
    assert_eq!(cfg.mock_payment_account_id, "mock_main_acct");
    assert!(cfg.run_migrations);
    assert!(!cfg.seed_db);
    assert_eq!(cfg.log_format, LogFormat::Text);
  }

  #[test]
  fn database_url_is_required() {
    let err = AppConfig::from_lookup(lookup_from(&[])).unwrap_err();
    assert!(matches!(err, AppError::Config(msg) if msg.contains("DATABASE_URL")));
  }

  #[test]
  fn rejects_malformed_values() {
    let bad_port = AppConfig::from_lookup(lookup_from(&[("DATABASE_URL", "postgres://x"), ("SERVER_PORT", "eighty")]));
    assert!(matches!(bad_port, Err(AppError::Config(_))));

    let bad_share = AppConfig::from_lookup(lookup_from(&[("DATABASE_URL", "postgres://x"), ("PARTNER_SHARE_PERCENT", "120")]));
    assert!(matches!(bad_share, Err(AppError::Config(msg)) if msg.contains("PARTNER_SHARE_PERCENT")));

    let bad_ttl = AppConfig::from_lookup(lookup_from(&[("DATABASE_URL", "postgres://x"), ("SESSION_TTL_HOURS", "0")]));
    assert!(bad_ttl.is_err());
  }

  #[test]
  fn session_ttl_is_capped_at_a_year() {
    let huge = AppConfig::from_lookup(lookup_from(&[
      ("DATABASE_URL", "postgres://x"),
      ("SESSION_TTL_HOURS", "9223372036854775807"),
    ]));
    assert!(matches!(huge, Err(AppError::Config(msg)) if msg.contains("SESSION_TTL_HOURS")));

    let max = MAX_SESSION_TTL_HOURS.to_string();
    let cfg = AppConfig::from_lookup(lookup_from(&[("DATABASE_URL", "postgres://x"), ("SESSION_TTL_HOURS", max.as_str())]))
    .unwrap();
    assert_eq!(cfg.session_ttl_hours, MAX_SESSION_TTL_HOURS);
  }

  #[test]
  fn overrides_are_read() {
    let cfg = AppConfig::from_lookup(lookup_from(&[
      ("DATABASE_URL", "postgres://x"),
      ("SERVER_HOST", "0.0.0.0"),
      ("SERVER_PORT", "9000"),
      ("LOG_FORMAT", "JSON"),
      ("SEED_DB", "true"),
      ("PREPAYMENT_PERCENT", "50"),
    ]))
    .unwrap();
    assert_eq!(cfg.bind_address(), "0.0.0.0:9000");
    assert_eq!(cfg.log_format, LogFormat::Json);
    assert!(cfg.seed_db);
    assert_eq!(cfg.prepayment_percent, 50);
  }
}
