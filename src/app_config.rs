//! Application configuration from file and environment variables
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. Environment variables (prefixed with PORTAL_)
//! 2. Config file (config.toml)
//! 3. Default values
//!
//! `DATABASE_URL` and `SECRET_KEY` are read directly from the environment
//! and never from the config file.

use config::{Config, ConfigError, Environment, File};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::sync::RwLock;

/// Global application configuration
pub static APP_CONFIG: Lazy<RwLock<AppConfig>> = Lazy::new(|| {
    RwLock::new(AppConfig::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config file, using defaults: {}", e);
        AppConfig::default()
    }))
});

/// Site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub name: String,
    pub base_url: String,
    /// Where anonymous users are sent when a page needs a login.
    pub login_url: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            name: "GroupPortal".to_string(),
            base_url: "http://localhost:8080".to_string(),
            login_url: "/login/".to_string(),
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    /// Marks the session cookie Secure. Enable behind TLS.
    pub secure_cookies: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8080".to_string(),
            secure_cookies: false,
        }
    }
}

/// Recent activity configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecentConfig {
    /// Size of the look-back window in days.
    pub window_days: u32,
    /// Maximum rows per section on the recent activity page.
    pub limit: u32,
}

impl Default for RecentConfig {
    fn default() -> Self {
        Self {
            window_days: 7,
            limit: 100,
        }
    }
}

/// Content limits configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum length of a thread description or comment body.
    pub max_content_length: u32,
    /// Maximum number of options on one poll.
    pub max_poll_options: u32,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_content_length: 50_000,
            max_poll_options: 20,
        }
    }
}

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub site: SiteConfig,
    pub server: ServerConfig,
    pub recent: RecentConfig,
    pub limits: LimitsConfig,
}

impl AppConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_path("config.toml")
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &str) -> Result<Self, ConfigError> {
        use config::FileFormat;

        let config = Config::builder()
            .add_source(config::Config::try_from(&AppConfig::default())?)
            .add_source(File::new(path, FileFormat::Toml).required(false))
            // e.g. PORTAL_SERVER__BIND, PORTAL_RECENT__WINDOW_DAYS
            .add_source(
                Environment::with_prefix("PORTAL")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

/// Initialize application configuration
///
/// Triggers the lazy load and logs the result. Call early in startup.
pub fn init() {
    let config = get_config();
    log::info!(
        "Configuration loaded: site.name = {}, server.bind = {}",
        config.site.name,
        config.server.bind
    );
}

/// Get the current application configuration
pub fn get_config() -> AppConfig {
    APP_CONFIG.read().map(|c| c.clone()).unwrap_or_default()
}

pub fn site() -> SiteConfig {
    get_config().site
}

pub fn server() -> ServerConfig {
    get_config().server
}

pub fn recent() -> RecentConfig {
    get_config().recent
}

pub fn limits() -> LimitsConfig {
    get_config().limits
}
