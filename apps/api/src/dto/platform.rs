use chrono::{DateTime, Utc};
use genoshare_infrastructure::{ChallengePhase, ChallengeWindow, PlatformConfig};
use serde::Serialize;
use ts_rs::TS;

/// Timeline of one challenge as seen at request time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/challenge-response.ts"
)]
pub struct ChallengeResponse {
    pub name: String,
    pub starts_at: String,
    pub ends_at: String,
    pub results_at: String,
    pub phase: String,
}

/// Public platform settings the frontend needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/platform-config-response.ts"
)]
pub struct PlatformConfigResponse {
    pub backend: String,
    pub auth_server_uri: String,
    pub api_server_uri: String,
    pub platform_uri: String,
    pub oauth_redirect_uri: String,
    pub oauth_client_id: String,
    pub org_everyone: String,
    pub challenges: Vec<ChallengeResponse>,
    pub appathon_results_at: String,
}

impl PlatformConfigResponse {
    pub fn from_config(config: &PlatformConfig, now: DateTime<Utc>) -> Self {
        let schedule = config.challenges;

        Self {
            backend: config.backend.as_str().to_owned(),
            auth_server_uri: config.auth_server_uri.to_string(),
            api_server_uri: config.api_server_uri.to_string(),
            platform_uri: config.platform_uri.to_string(),
            oauth_redirect_uri: config.oauth_redirect_uri.to_string(),
            oauth_client_id: config.oauth_client_id.clone(),
            org_everyone: config.org_everyone(),
            challenges: vec![
                challenge("consistency", schedule.consistency, now),
                challenge("truth", schedule.truth, now),
            ],
            appathon_results_at: schedule.appathon_results_at.to_rfc3339(),
        }
    }
}

fn challenge(name: &str, window: ChallengeWindow, now: DateTime<Utc>) -> ChallengeResponse {
    ChallengeResponse {
        name: name.to_owned(),
        starts_at: window.starts_at.to_rfc3339(),
        ends_at: window.ends_at.to_rfc3339(),
        results_at: window.results_at.to_rfc3339(),
        phase: phase_label(window.phase(now)).to_owned(),
    }
}

fn phase_label(phase: ChallengePhase) -> &'static str {
    match phase {
        ChallengePhase::Upcoming => "upcoming",
        ChallengePhase::Open => "open",
        ChallengePhase::Closed => "closed",
        ChallengePhase::ResultsAnnounced => "results_announced",
    }
}
