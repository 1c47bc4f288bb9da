use std::env;

use crate::utils::AppError;

const DEFAULT_SENDGRID_API_URL: &str = "https://api.sendgrid.com";
const DEFAULT_EMAIL_FROM: &str = "Coding Coach <admin@codingcoach.io>";

/// Runtime configuration, read once at startup from the environment (and `.env`).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: String,
    pub database_url: String,
    pub environment: String,
    pub cors_origins: Vec<String>,
    pub jwt: JwtConfig,
    pub email: EmailConfig,
    pub sentry_dsn: Option<String>,
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
}

#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub api_key: Option<String>,
    pub api_url: String,
    pub from: String,
    pub mentorship_request_template: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let database_url = env::var("DATABASE_URL")
            .map_err(|_| AppError::Internal("DATABASE_URL must be set".to_string()))?;

        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT").unwrap_or_else(|_| "3002".to_string()),
            database_url,
            environment: env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
            cors_origins: parse_origins(
                &env::var("CORS_ORIGINS").unwrap_or_else(|_| "http://localhost:3000".to_string()),
            ),
            jwt: JwtConfig::from_env()?,
            email: EmailConfig {
                api_key: non_empty_var("SENDGRID_API_KEY"),
                api_url: env::var("SENDGRID_API_URL")
                    .unwrap_or_else(|_| DEFAULT_SENDGRID_API_URL.to_string()),
                from: env::var("EMAIL_FROM").unwrap_or_else(|_| DEFAULT_EMAIL_FROM.to_string()),
                mentorship_request_template: env::var("SENDGRID_TEMPLATE_MENTORSHIP_REQUEST")
                    .unwrap_or_default(),
            },
            sentry_dsn: non_empty_var("SENTRY_DSN"),
        })
    }
}

impl JwtConfig {
    /// `JWT_SECRET` has no default: a known key would let anyone mint tokens.
    pub fn from_env() -> Result<Self, AppError> {
        let secret = non_empty_var("JWT_SECRET")
            .ok_or_else(|| AppError::Internal("JWT_SECRET must be set".to_string()))?;

        Ok(Self {
            secret,
            issuer: env::var("JWT_ISSUER").unwrap_or_else(|_| "mentorship-service".to_string()),
            audience: env::var("JWT_AUDIENCE").unwrap_or_else(|_| "mentorship-api".to_string()),
        })
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}
