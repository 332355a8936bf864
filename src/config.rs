use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub access_token_ttl_seconds: u64,
    pub app_env: String,
    pub bind_address: String,
    pub cleanup_interval_seconds: u64,
    pub data_dir: String,
    pub jwt_refresh_secret: String,
    pub jwt_secret: String,
    pub refresh_token_ttl_seconds: u64,
    pub session_ttl_seconds: u64,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let bind_address =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

        let data_dir = std::env::var("DATA_DIR").unwrap_or_else(|_| "./data".to_string());

        let app_env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        let jwt_secret = std::env::var("JWT_SECRET").unwrap_or_default();
        let jwt_refresh_secret = std::env::var("JWT_REFRESH_SECRET").unwrap_or_default();

        let session_ttl_seconds = env_u64("SESSION_TTL_SECONDS", 86_400); // 24 hours
        let cleanup_interval_seconds = env_u64("CLEANUP_INTERVAL_SECONDS", 3_600);
        let access_token_ttl_seconds = env_u64("ACCESS_TOKEN_TTL_SECONDS", 900); // 15 minutes
        let refresh_token_ttl_seconds = env_u64("REFRESH_TOKEN_TTL_SECONDS", 604_800); // 7 days

        let config = Config {
            access_token_ttl_seconds,
            app_env,
            bind_address,
            cleanup_interval_seconds,
            data_dir,
            jwt_refresh_secret,
            jwt_secret,
            refresh_token_ttl_seconds,
            session_ttl_seconds,
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.is_production() {
            if self.jwt_secret.is_empty() {
                return Err(ConfigError::ValidationError(
                    "JWT_SECRET must be set in production".to_string(),
                ));
            }
            if self.jwt_refresh_secret.is_empty() {
                return Err(ConfigError::ValidationError(
                    "JWT_REFRESH_SECRET must be set in production".to_string(),
                ));
            }
            if self.jwt_secret == self.jwt_refresh_secret {
                return Err(ConfigError::ValidationError(
                    "JWT_SECRET and JWT_REFRESH_SECRET must differ".to_string(),
                ));
            }
        } else if self.jwt_secret.is_empty() || self.jwt_refresh_secret.is_empty() {
            tracing::warn!("JWT secrets not set; using development defaults");
        }

        if self.session_ttl_seconds == 0 {
            return Err(ConfigError::ValidationError(
                "SESSION_TTL_SECONDS must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.app_env == "production"
    }

    /// Secret used to sign access tokens (development fallback outside prod)
    pub fn access_secret(&self) -> &str {
        if self.jwt_secret.is_empty() {
            "dev-access-secret"
        } else {
            &self.jwt_secret
        }
    }

    /// Secret used to sign refresh tokens (development fallback outside prod)
    pub fn refresh_secret(&self) -> &str {
        if self.jwt_refresh_secret.is_empty() {
            "dev-refresh-secret"
        } else {
            &self.jwt_refresh_secret
        }
    }
}

fn env_u64(name: &str, default: u64) -> u64 {
    std::env::var(name)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}
