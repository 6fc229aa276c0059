use std::str::FromStr;

use chrono::{DateTime, TimeZone, Utc};
use genoshare_core::{AppError, AppResult};
use serde::Serialize;
use url::Url;

/// Remote platform deployment the service talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlatformBackend {
    /// Production platform.
    Production,
    /// Staging platform.
    Staging,
}

impl PlatformBackend {
    /// Returns the stable configuration value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Production => "production",
            Self::Staging => "staging",
        }
    }
}

impl FromStr for PlatformBackend {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "production" => Ok(Self::Production),
            "staging" | "" => Ok(Self::Staging),
            _ => Err(AppError::Validation(format!(
                "PLATFORM_BACKEND must be 'production' or 'staging', got '{value}'"
            ))),
        }
    }
}

/// Raw deployment inputs the platform configuration is derived from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformSettings {
    /// Selected backend.
    pub backend: PlatformBackend,
    /// Host of a personal development deployment, if any.
    pub dev_host: Option<String>,
    /// Local development mode.
    pub local_development: bool,
}

/// Position of "now" within a challenge timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChallengePhase {
    /// Submissions have not opened.
    Upcoming,
    /// Submissions are accepted.
    Open,
    /// Submissions closed, results pending.
    Closed,
    /// Results are published.
    ResultsAnnounced,
}

/// Start, end and results instants of one challenge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChallengeWindow {
    /// Submissions open.
    pub starts_at: DateTime<Utc>,
    /// Submissions close.
    pub ends_at: DateTime<Utc>,
    /// Results go public.
    pub results_at: DateTime<Utc>,
}

impl ChallengeWindow {
    /// Returns the phase at `now`.
    #[must_use]
    pub fn phase(&self, now: DateTime<Utc>) -> ChallengePhase {
        if now < self.starts_at {
            ChallengePhase::Upcoming
        } else if now < self.ends_at {
            ChallengePhase::Open
        } else if now < self.results_at {
            ChallengePhase::Closed
        } else {
            ChallengePhase::ResultsAnnounced
        }
    }
}

/// Published challenge timelines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChallengeSchedule {
    /// Consistency challenge.
    pub consistency: ChallengeWindow,
    /// Truth challenge.
    pub truth: ChallengeWindow,
    /// App-a-thon results announcement.
    pub appathon_results_at: DateTime<Utc>,
}

impl Default for ChallengeSchedule {
    fn default() -> Self {
        Self {
            consistency: ChallengeWindow {
                starts_at: utc(2016, 2, 26, 3, 59, 59),
                ends_at: utc(2016, 4, 26, 3, 59, 59),
                results_at: utc(2016, 5, 26, 0, 50, 0),
            },
            truth: ChallengeWindow {
                starts_at: utc(2016, 4, 27, 3, 59, 59),
                ends_at: utc(2016, 5, 27, 3, 59, 59),
                results_at: utc(2016, 6, 29, 13, 30, 0),
            },
            appathon_results_at: utc(2017, 1, 4, 22, 10, 0),
        }
    }
}

fn utc(year: i32, month: u32, day: u32, hour: u32, minute: u32, second: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, second)
        .single()
        .unwrap_or_default()
}

/// Immutable platform endpoints, identities and schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformConfig {
    /// Selected backend.
    pub backend: PlatformBackend,
    /// OAuth authorization server.
    pub auth_server_uri: Url,
    /// API server used for object calls.
    pub api_server_uri: Url,
    /// Web platform.
    pub platform_uri: Url,
    /// OAuth return URL of this deployment.
    pub oauth_redirect_uri: Url,
    /// OAuth client id of this deployment.
    pub oauth_client_id: String,
    /// Handle of the organization every user belongs to.
    pub org_everyone_handle: String,
    /// Placeholder organization for users without one.
    pub org_dummy: String,
    /// Platform user owning administrative objects.
    pub admin_user: String,
    /// Challenge timelines.
    pub challenges: ChallengeSchedule,
}

impl PlatformConfig {
    /// Derives the configuration for a deployment.
    pub fn from_settings(settings: &PlatformSettings) -> AppResult<Self> {
        let dev_host = settings
            .dev_host
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty());

        let (oauth_redirect_uri, oauth_client_id) = if settings.local_development {
            ("https://localhost:3000/return_from_login".to_owned(), "genoshare")
        } else if settings.backend == PlatformBackend::Production {
            ("https://genoshare.example.org/return_from_login".to_owned(), "genoshare_prod")
        } else if let Some(host) = dev_host {
            (format!("https://{host}/return_from_login"), "genoshare")
        } else {
            (
                "https://genoshare-staging.example.org/return_from_login".to_owned(),
                "genoshare_prod",
            )
        };

        let (auth, api, platform) = match settings.backend {
            PlatformBackend::Production => (
                "https://auth.dnanexus.com/",
                "https://api.dnanexus.com/",
                "https://platform.dnanexus.com/",
            ),
            PlatformBackend::Staging => (
                "https://stagingauth.dnanexus.com/",
                "https://stagingapi.dnanexus.com/",
                "https://staging.dnanexus.com/",
            ),
        };

        let dev_suffix = match (settings.backend, dev_host) {
            (PlatformBackend::Staging, Some(_)) => "_dev",
            _ => "",
        };

        Ok(Self {
            backend: settings.backend,
            auth_server_uri: parse_url("auth server", auth)?,
            api_server_uri: parse_url("api server", api)?,
            platform_uri: parse_url("platform", platform)?,
            oauth_redirect_uri: parse_url("oauth redirect", oauth_redirect_uri.as_str())?,
            oauth_client_id: oauth_client_id.to_owned(),
            org_everyone_handle: format!("genoshare{dev_suffix}"),
            org_dummy: format!("org-genoshare.dummy{dev_suffix}"),
            admin_user: format!("user-genoshare.admin{dev_suffix}"),
            challenges: ChallengeSchedule::default(),
        })
    }

    /// Returns the platform id of the everyone organization.
    #[must_use]
    pub fn org_everyone(&self) -> String {
        format!("org-{}", self.org_everyone_handle)
    }
}

fn parse_url(label: &str, value: &str) -> AppResult<Url> {
    Url::parse(value)
        .map_err(|error| AppError::Validation(format!("invalid {label} URL '{value}': {error}")))
}
