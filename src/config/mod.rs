//! Application configuration management

use std::env;

use anyhow::{Context, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use rand::RngCore;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Bind address
    pub host: String,

    /// Server port
    pub port: u16,

    /// Catalog database (SQLite path or `sqlite:` URL)
    pub database_url: String,

    /// Identity database holding users and roles; defaults to the catalog database
    pub identity_database_url: String,

    /// Maximum pooled connections per database
    pub database_max_connections: u32,

    /// Base64-encoded HS256 signing secret
    pub jwt_secret: String,

    /// `iss` claim of issued tokens
    pub jwt_issuer: String,

    /// Token lifetime in seconds
    pub token_lifetime_secs: i64,

    /// Clock skew tolerated when validating tokens
    pub token_leeway_secs: u64,

    /// Tag id hidden from corpus listings
    pub corpus_untagged_tag_id: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3001,
            database_url: "./data/libapi.db".to_string(),
            identity_database_url: "./data/libapi.db".to_string(),
            database_max_connections: 10,
            jwt_secret: random_secret(),
            jwt_issuer: "libapi".to_string(),
            token_lifetime_secs: 36000,
            token_leeway_secs: 60,
            corpus_untagged_tag_id: 1,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        // Prefer DATABASE_PATH, fall back to DATABASE_URL
        let database_url = env::var("DATABASE_PATH")
            .or_else(|_| env::var("DATABASE_URL"))
            .unwrap_or(defaults.database_url);

        let identity_database_url =
            env::var("IDENTITY_DATABASE_URL").unwrap_or_else(|_| database_url.clone());

        // Tokens signed with a generated secret do not survive a restart
        let jwt_secret = match env::var("JWT_SECRET") {
            Ok(secret) => {
                STANDARD
                    .decode(&secret)
                    .context("JWT_SECRET must be base64")?;
                secret
            }
            Err(_) => {
                tracing::warn!("JWT_SECRET not set, using a random development secret");
                defaults.jwt_secret
            }
        };

        Ok(Self {
            host: env::var("HOST").unwrap_or(defaults.host),

            port: env::var("PORT")
                .unwrap_or_else(|_| "3001".to_string())
                .parse()
                .context("Invalid PORT")?,

            database_url,

            identity_database_url,

            database_max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.database_max_connections),

            jwt_secret,

            jwt_issuer: env::var("JWT_ISSUER").unwrap_or(defaults.jwt_issuer),

            token_lifetime_secs: env::var("TOKEN_LIFETIME_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.token_lifetime_secs),

            token_leeway_secs: env::var("TOKEN_LEEWAY_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.token_leeway_secs),

            corpus_untagged_tag_id: env::var("CORPUS_UNTAGGED_TAG_ID")
                .unwrap_or_else(|_| "1".to_string())
                .parse()
                .context("Invalid CORPUS_UNTAGGED_TAG_ID")?,
        })
    }
}

fn random_secret() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    STANDARD.encode(bytes)
}
