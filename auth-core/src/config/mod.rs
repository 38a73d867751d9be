use serde::Deserialize;
use std::env;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is required but not set")]
    Missing(String),

    #[error("invalid value for {0}: {1}")]
    Invalid(String, String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    pub environment: Environment,
    pub log_level: String,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub hasher: HasherConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Dev,
    Prod,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

/// Signing contexts for the token codec. Access and refresh secrets are
/// independent: a leaked refresh secret must not mint access tokens.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub access_secret: String,
    pub refresh_secret: String,
    pub access_token_expiry_minutes: i64,
    pub refresh_token_expiry_days: i64,
}

/// Argon2id work factor, fixed for the process lifetime.
#[derive(Debug, Clone, Deserialize)]
pub struct HasherConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl AuthConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let env_str = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string());
        let environment: Environment = env_str
            .parse()
            .map_err(|e: String| ConfigError::Invalid("ENVIRONMENT".to_string(), e))?;

        let is_prod = environment == Environment::Prod;

        let config = AuthConfig {
            environment,
            log_level: get_env("LOG_LEVEL", Some("info"), is_prod)?,
            database: DatabaseConfig {
                url: get_env("DATABASE_URL", None, is_prod)?,
                max_connections: parse_env("DATABASE_MAX_CONNECTIONS", Some("10"), is_prod)?,
                min_connections: parse_env("DATABASE_MIN_CONNECTIONS", Some("1"), is_prod)?,
            },
            jwt: JwtConfig {
                access_secret: get_env("JWT_ACCESS_SECRET", None, is_prod)?,
                refresh_secret: get_env("JWT_REFRESH_SECRET", None, is_prod)?,
                access_token_expiry_minutes: parse_env(
                    "JWT_ACCESS_TOKEN_EXPIRY_MINUTES",
                    Some("15"),
                    is_prod,
                )?,
                refresh_token_expiry_days: parse_env(
                    "JWT_REFRESH_TOKEN_EXPIRY_DAYS",
                    Some("7"),
                    is_prod,
                )?,
            },
            hasher: HasherConfig {
                memory_kib: parse_env("ARGON2_MEMORY_KIB", Some("19456"), is_prod)?,
                iterations: parse_env("ARGON2_ITERATIONS", Some("2"), is_prod)?,
                parallelism: parse_env("ARGON2_PARALLELISM", Some("1"), is_prod)?,
            },
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt.access_token_expiry_minutes <= 0 {
            return Err(ConfigError::Invalid(
                "JWT_ACCESS_TOKEN_EXPIRY_MINUTES".to_string(),
                "must be positive".to_string(),
            ));
        }

        if self.jwt.refresh_token_expiry_days <= 0 {
            return Err(ConfigError::Invalid(
                "JWT_REFRESH_TOKEN_EXPIRY_DAYS".to_string(),
                "must be positive".to_string(),
            ));
        }

        if self.jwt.access_secret == self.jwt.refresh_secret {
            return Err(ConfigError::Invalid(
                "JWT_REFRESH_SECRET".to_string(),
                "must differ from JWT_ACCESS_SECRET".to_string(),
            ));
        }

        if self.environment == Environment::Prod {
            for (key, secret) in [
                ("JWT_ACCESS_SECRET", &self.jwt.access_secret),
                ("JWT_REFRESH_SECRET", &self.jwt.refresh_secret),
            ] {
                if secret.len() < 32 {
                    return Err(ConfigError::Invalid(
                        key.to_string(),
                        "must be at least 32 bytes in production".to_string(),
                    ));
                }
            }
        }

        Ok(())
    }
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, ConfigError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(ConfigError::Missing(key.to_string()))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(ConfigError::Missing(key.to_string()))
            }
        }
    }
}

fn parse_env<T>(key: &str, default: Option<&str>, is_prod: bool) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    get_env(key, default, is_prod)?
        .parse()
        .map_err(|e: T::Err| ConfigError::Invalid(key.to_string(), e.to_string()))
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dev" => Ok(Environment::Dev),
            "prod" => Ok(Environment::Prod),
            _ => Err(format!("Invalid environment: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> AuthConfig {
        AuthConfig {
            environment: Environment::Dev,
            log_level: "debug".to_string(),
            database: DatabaseConfig {
                url: "postgres://localhost/auth_test".to_string(),
                max_connections: 5,
                min_connections: 1,
            },
            jwt: JwtConfig {
                access_secret: "access-secret".to_string(),
                refresh_secret: "refresh-secret".to_string(),
                access_token_expiry_minutes: 15,
                refresh_token_expiry_days: 7,
            },
            hasher: HasherConfig {
                memory_kib: 1024,
                iterations: 1,
                parallelism: 1,
            },
        }
    }

    #[test]
    fn validate_accepts_sane_dev_config() {
        assert!(base_config().validate().is_ok());
    }

    #[test]
    fn validate_rejects_non_positive_expiries() {
        let mut config = base_config();
        config.jwt.access_token_expiry_minutes = 0;
        assert!(config.validate().is_err());

        let mut config = base_config();
        config.jwt.refresh_token_expiry_days = -1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_shared_secret() {
        let mut config = base_config();
        config.jwt.refresh_secret = config.jwt.access_secret.clone();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_requires_long_secrets_in_prod() {
        let mut config = base_config();
        config.environment = Environment::Prod;
        assert!(config.validate().is_err());

        config.jwt.access_secret = "a".repeat(32);
        config.jwt.refresh_secret = "r".repeat(32);
        assert!(config.validate().is_ok());
    }
}
