use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    pub allow_origins: Vec<String>,
    pub max_age: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors: CorsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    /// E-mail addresses granted admin access regardless of their stored role.
    #[serde(default)]
    pub admin_emails: Vec<String>,
}

/// Settings for the Wikimedia photo pipeline: API endpoints, fetch policy
/// limits, and the identification headers Wikimedia's hotlink policy expects.
#[derive(Debug, Deserialize, Clone)]
pub struct WikimediaConfig {
    pub commons_api: String,
    pub wikipedia_api: String,
    pub user_agent: String,
    pub timeout_secs: u64,
    /// Total attempts per upstream request (1 = no retries).
    pub max_attempts: u32,
    /// Hard ceiling on proxied image bytes.
    pub max_image_bytes: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RateLimitConfig {
    /// Requests allowed per client key per window. 0 disables the check.
    pub requests_per_window: u32,
    pub window_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub wikimedia: WikimediaConfig,
    pub rate_limit: RateLimitConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("server.cors.allow_origins", Vec::<String>::new())?
            .set_default("server.cors.max_age", 3600)?
            .set_default(
                "wikimedia.commons_api",
                "https://commons.wikimedia.org/w/api.php",
            )?
            .set_default(
                "wikimedia.wikipedia_api",
                "https://ja.wikipedia.org/w/api.php",
            )?
            .set_default(
                "wikimedia.user_agent",
                "yamatabi/0.1 (https://yamatabi.example; contact@yamatabi.example)",
            )?
            .set_default("wikimedia.timeout_secs", 10)?
            .set_default("wikimedia.max_attempts", 3)?
            .set_default("wikimedia.max_image_bytes", 5 * 1024 * 1024)?
            .set_default("rate_limit.requests_per_window", 60)?
            .set_default("rate_limit.window_secs", 60)?
            // Load from config/config.toml
            .add_source(File::with_name("config/config").required(false))
            // Override from environment (e.g., YAMATABI__AUTH__JWT_SECRET)
            .add_source(Environment::with_prefix("YAMATABI").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
