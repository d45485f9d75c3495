use log::debug;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use url::Url;

use crate::auth::{AuthToken, Credentials};
use crate::error::{FeedError, Result};

use super::types::{BuildResources, Pipeline, RawJob};

const TEAM: &str = "main";

/// Thin client over the Concourse REST API.
///
/// Retry and timeout policy is whatever the underlying `reqwest` client
/// applies; every failure is returned to the caller as-is.
pub struct ConcourseClient {
    client: Client,
    api_url: Url,
}

impl ConcourseClient {
    pub fn new(base_url: &Url) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("concourse-feed/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FeedError::Config(format!("Failed to create HTTP client: {e}")))?;

        // Keep any path prefix of the base URL; `join` replaces the last segment otherwise.
        let mut base = base_url.clone();
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let api_url = base
            .join("api/v1/")
            .map_err(|e| FeedError::Config(format!("Invalid API base URL: {e}")))?;

        Ok(Self { client, api_url })
    }

    /// Requests a team token using basic auth.
    pub async fn get_token(&self, credentials: &Credentials) -> Result<AuthToken> {
        let url = self.api_url.join(&format!("teams/{TEAM}/auth/token"))?;
        debug!("Requesting auth token from {url}");

        let response = self
            .client
            .get(url)
            .basic_auth(&credentials.username, credentials.password.as_ref())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Auth {
                status: status.as_u16(),
            });
        }

        decode(response).await
    }

    pub async fn list_pipelines(&self, authorization: &str) -> Result<Vec<Pipeline>> {
        let url = self.api_url.join(&format!("teams/{TEAM}/pipelines"))?;
        self.get_json(self.client.get(url), authorization).await
    }

    pub async fn list_jobs(&self, pipeline: &str, authorization: &str) -> Result<Vec<RawJob>> {
        let url = self.pipeline_url(pipeline, &["jobs"])?;
        self.get_json(self.client.get(url), authorization).await
    }

    pub async fn get_job(
        &self,
        pipeline: &str,
        job: &str,
        authorization: &str,
    ) -> Result<RawJob> {
        let url = self.pipeline_url(pipeline, &["jobs", job])?;
        self.get_json(self.client.get(url), authorization).await
    }

    pub async fn build_resources(
        &self,
        build_id: u64,
        authorization: &str,
    ) -> Result<BuildResources> {
        let url = self.api_url.join(&format!("builds/{build_id}/resources"))?;
        self.get_json(self.client.get(url), authorization).await
    }

    // Segments are percent-encoded, so pipeline and job names may contain '/'.
    fn pipeline_url(&self, pipeline: &str, rest: &[&str]) -> Result<Url> {
        let mut url = self.api_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                FeedError::Config(format!("API URL cannot be a base: {}", self.api_url))
            })?
            .pop_if_empty()
            .extend(["teams", TEAM, "pipelines", pipeline])
            .extend(rest);
        Ok(url)
    }

    async fn get_json<T>(&self, request: RequestBuilder, authorization: &str) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let response = request.header(AUTHORIZATION, authorization).send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            return Err(FeedError::Api {
                status: status.as_u16(),
                message,
            });
        }

        decode(response).await
    }
}

async fn decode<T>(response: reqwest::Response) -> Result<T>
where
    T: DeserializeOwned,
{
    let body = response.bytes().await?;
    Ok(serde_json::from_slice(&body)?)
}
