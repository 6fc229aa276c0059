use std::str::FromStr;

use async_trait::async_trait;
use genoshare_application::{RemoteObjectState, StoragePlatform};
use genoshare_core::{AppError, AppResult};
use genoshare_domain::AssetState;
use reqwest::header;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::warn;
use url::Url;

const DOWNLOAD_LINK_SECONDS: u32 = 86_400;

/// HTTP client for the remote compute/storage platform API.
///
/// Every call is `POST {api}/{subject}/{method}` with a JSON body and the
/// caller's bearer token.
#[derive(Clone)]
pub struct DnanexusPlatformClient {
    http_client: reqwest::Client,
    api_server_uri: Url,
}

impl DnanexusPlatformClient {
    /// Creates a client for the given API server.
    #[must_use]
    pub fn new(http_client: reqwest::Client, api_server_uri: Url) -> Self {
        Self {
            http_client,
            api_server_uri,
        }
    }

    fn endpoint(&self, subject: &str, method: &str) -> AppResult<Url> {
        self.api_server_uri
            .join(format!("{subject}/{method}").as_str())
            .map_err(|error| {
                AppError::Internal(format!(
                    "invalid platform endpoint '{subject}/{method}': {error}"
                ))
            })
    }

    async fn call<B, R>(&self, token: &str, subject: &str, method: &str, body: &B) -> AppResult<R>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let endpoint = self.endpoint(subject, method)?;
        let response = self
            .http_client
            .post(endpoint)
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .json(body)
            .send()
            .await
            .map_err(|error| {
                AppError::ExternalService(format!(
                    "platform call {subject}/{method} failed: {error}"
                ))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_owned());
            return Err(AppError::ExternalService(format!(
                "platform call {subject}/{method} returned status {}: {body}",
                status.as_u16()
            )));
        }

        response.json::<R>().await.map_err(|error| {
            AppError::ExternalService(format!(
                "failed to parse platform {subject}/{method} response: {error}"
            ))
        })
    }
}

#[derive(Debug, Serialize)]
struct ObjectsRequest<'a> {
    objects: &'a [String],
}

#[derive(Debug, Serialize)]
struct DownloadRequest<'a> {
    project: &'a str,
    preauthenticated: bool,
    duration: u32,
}

#[derive(Debug, Deserialize)]
struct DescribeDataObjectsResponse {
    results: Vec<DescribeResult>,
}

#[derive(Debug, Deserialize)]
struct DescribeResult {
    describe: Option<DescribedObject>,
}

#[derive(Debug, Deserialize)]
struct DescribedObject {
    id: String,
    state: String,
}

#[derive(Debug, Deserialize)]
struct DownloadResponse {
    url: String,
}

fn remote_states(response: DescribeDataObjectsResponse) -> Vec<RemoteObjectState> {
    response
        .results
        .into_iter()
        .filter_map(|result| result.describe)
        .filter_map(|object| match AssetState::from_str(object.state.as_str()) {
            Ok(state) => Some(RemoteObjectState {
                dxid: object.id,
                state,
            }),
            Err(error) => {
                warn!(dxid = %object.id, error = %error, "ignoring unknown remote object state");
                None
            }
        })
        .collect()
}

#[async_trait]
impl StoragePlatform for DnanexusPlatformClient {
    async fn remove_objects(&self, token: &str, project: &str, dxids: &[String]) -> AppResult<()> {
        let _: serde_json::Value = self
            .call(token, project, "removeObjects", &ObjectsRequest { objects: dxids })
            .await?;
        Ok(())
    }

    async fn describe_object_states(
        &self,
        token: &str,
        dxids: &[String],
    ) -> AppResult<Vec<RemoteObjectState>> {
        if dxids.is_empty() {
            return Ok(Vec::new());
        }

        let response: DescribeDataObjectsResponse = self
            .call(
                token,
                "system",
                "describeDataObjects",
                &ObjectsRequest { objects: dxids },
            )
            .await?;

        Ok(remote_states(response))
    }

    async fn download_url(&self, token: &str, project: &str, dxid: &str) -> AppResult<String> {
        let response: DownloadResponse = self
            .call(
                token,
                dxid,
                "download",
                &DownloadRequest {
                    project,
                    preauthenticated: true,
                    duration: DOWNLOAD_LINK_SECONDS,
                },
            )
            .await?;

        Ok(response.url)
    }
}
