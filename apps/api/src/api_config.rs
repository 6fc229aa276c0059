use std::collections::HashSet;
use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use genoshare_core::AppError;
use genoshare_infrastructure::{PlatformBackend, PlatformConfig, PlatformSettings};
use tracing_subscriber::EnvFilter;
use url::Url;

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub migrate_only: bool,
    pub database_url: String,
    pub frontend_url: String,
    pub bootstrap_token: String,
    pub api_host: String,
    pub api_port: u16,
    pub cookie_secure: bool,
    pub admin_dxusers: HashSet<String>,
    pub featured_org_handle: Option<String>,
    pub platform_admin_token: Option<String>,
    pub platform: PlatformConfig,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        let migrate_only = env::args().nth(1).as_deref() == Some("migrate");

        let database_url = required_env("DATABASE_URL")?;
        let frontend_url =
            env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:3000".to_owned());
        Url::parse(&frontend_url).map_err(|error| {
            AppError::Validation(format!("invalid FRONTEND_URL '{frontend_url}': {error}"))
        })?;

        let bootstrap_token = required_env("AUTH_BOOTSTRAP_TOKEN")?;
        if bootstrap_token.len() < 32 {
            return Err(AppError::Validation(
                "AUTH_BOOTSTRAP_TOKEN must be at least 32 characters".to_owned(),
            ));
        }

        let api_host = env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_owned());
        let api_port = env::var("API_PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(3001);
        let cookie_secure = env::var("SESSION_COOKIE_SECURE")
            .unwrap_or_else(|_| "false".to_owned())
            .eq_ignore_ascii_case("true");

        let admin_dxusers = parse_dxuser_list(&env::var("ADMIN_DXUSERS").unwrap_or_default());
        let featured_org_handle = optional_non_empty_env("FEATURED_ORG_HANDLE");
        let platform_admin_token = optional_non_empty_env("PLATFORM_ADMIN_TOKEN");

        let platform = PlatformConfig::from_settings(&PlatformSettings {
            backend: PlatformBackend::from_str(
                &env::var("PLATFORM_BACKEND").unwrap_or_default(),
            )?,
            dev_host: optional_non_empty_env("DEV_HOST"),
            local_development: env::var("LOCAL_DEVELOPMENT")
                .unwrap_or_else(|_| "false".to_owned())
                .eq_ignore_ascii_case("true"),
        })?;

        Ok(Self {
            migrate_only,
            database_url,
            frontend_url,
            bootstrap_token,
            api_host,
            api_port,
            cookie_secure,
            admin_dxusers,
            featured_org_handle,
            platform_admin_token,
            platform,
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Internal(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn required_env(name: &str) -> Result<String, AppError> {
    env::var(name).map_err(|_| AppError::Validation(format!("{name} is required")))
}

fn optional_non_empty_env(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

/// Comma separated, blanks ignored.
fn parse_dxuser_list(value: &str) -> HashSet<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|dxuser| !dxuser.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}
