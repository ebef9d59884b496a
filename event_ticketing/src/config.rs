// event_ticketing/src/config.rs

use crate::errors::{AppError, Result};
use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct AdminSeed {
  pub email: String,
  pub password: String,
  pub name: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  /// `None` selects the in-process memory store.
  pub database_url: Option<String>,
  pub app_base_url: String,

  pub payment_provider_key_id: String,

  pub email_sender: String,
  pub email_display_name: String,

  pub report_font_dir: PathBuf,
  pub report_font_name: String,

  pub admin_seed: Option<AdminSeed>,
  pub session_ttl_minutes: i64,
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok();
    Self::from_lookup(|name| env::var(name).ok())
  }

  /// Builds the config from any variable source; empty values count as unset.
  pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
    let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

    let server_host = get("SERVER_HOST").unwrap_or_else(|| "127.0.0.1".to_string());
    let server_port = get("SERVER_PORT")
      .unwrap_or_else(|| "8080".to_string())
      .parse::<u16>()
      .map_err(|e| AppError::Config(format!("Invalid SERVER_PORT: {}", e)))?;
    let database_url = get("DATABASE_URL");
    let app_base_url = get("APP_BASE_URL").unwrap_or_else(|| format!("http://{}:{}", server_host, server_port));

    let payment_provider_key_id = get("PAYMENT_PROVIDER_KEY_ID").unwrap_or_else(|| "rzp_test_stub".to_string());
    let email_sender = get("EMAIL_SENDER").unwrap_or_else(|| "noreply@example.com".to_string());
    let email_display_name = get("EMAIL_DISPLAY_NAME").unwrap_or_else(|| "Event Ticketing".to_string());

    let report_font_dir = PathBuf::from(get("REPORT_FONT_DIR").unwrap_or_else(|| "./fonts".to_string()));
    let report_font_name = get("REPORT_FONT_NAME").unwrap_or_else(|| "LiberationSans".to_string());

    let admin_seed = match (get("ADMIN_EMAIL"), get("ADMIN_PASSWORD")) {
      (Some(email), Some(password)) => Some(AdminSeed {
        email,
        password,
        name: get("ADMIN_NAME").unwrap_or_else(|| "Administrator".to_string()),
      }),
      (None, None) => None,
      _ => {
        return Err(AppError::Config(
          "ADMIN_EMAIL and ADMIN_PASSWORD must be set together".to_string(),
        ))
      }
    };

    let session_ttl_minutes = get("SESSION_TTL_MINUTES")
      .unwrap_or_else(|| "720".to_string())
      .parse::<i64>()
      .map_err(|e| AppError::Config(format!("Invalid SESSION_TTL_MINUTES: {}", e)))?;
    if session_ttl_minutes <= 0 {
      return Err(AppError::Config("SESSION_TTL_MINUTES must be positive".to_string()));
    }

    tracing::info!(
      memory_store = database_url.is_none(),
      admin_seed = admin_seed.is_some(),
      "Application configuration loaded."
    );

    Ok(Self {
      server_host,
      server_port,
      database_url,
      app_base_url,
      payment_provider_key_id,
      email_sender,
      email_display_name,
      report_font_dir,
      report_font_name,
      admin_seed,
      session_ttl_minutes,
    })
  }
}

impl Default for AppConfig {
  fn default() -> Self {
    Self {
      server_host: "127.0.0.1".to_string(),
      server_port: 8080,
      database_url: None,
      app_base_url: "http://127.0.0.1:8080".to_string(),
      payment_provider_key_id: "rzp_test_stub".to_string(),
      email_sender: "noreply@example.com".to_string(),
      email_display_name: "Event Ticketing".to_string(),
      report_font_dir: PathBuf::from("./fonts"),
      report_font_name: "LiberationSans".to_string(),
      admin_seed: None,
      session_ttl_minutes: 720,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashMap;

  fn config_from(vars: &[(&str, &str)]) -> Result<AppConfig> {
    let map: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    AppConfig::from_lookup(|name| map.get(name).cloned())
  }

  #[test]
  fn defaults_select_memory_store() {
    let cfg = config_from(&[]).unwrap();
    assert_eq!(cfg.server_port, 8080);
    assert!(cfg.database_url.is_none());
    assert_eq!(cfg.app_base_url, "http://127.0.0.1:8080");
    assert!(cfg.admin_seed.is_none());
  }

  #[test]
  fn empty_database_url_counts_as_unset() {
    let cfg = config_from(&[("DATABASE_URL", "  ")]).unwrap();
    assert!(cfg.database_url.is_none());
  }

  #[test]
  fn invalid_port_is_a_config_error() {
    assert!(matches!(config_from(&[("SERVER_PORT", "http")]), Err(AppError::Config(_))));
  }

  #[test]
  fn half_configured_admin_seed_is_rejected() {
    assert!(matches!(
      config_from(&[("ADMIN_EMAIL", "admin@example.com")]),
      Err(AppError::Config(_))
    ));
    let cfg = config_from(&[("ADMIN_EMAIL", "admin@example.com"), ("ADMIN_PASSWORD", "Secret1")]).unwrap();
    let seed = cfg.admin_seed.unwrap();
    assert_eq!(seed.name, "Administrator");
  }
}
