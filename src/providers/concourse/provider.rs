use futures::future::try_join_all;
use log::{debug, info, warn};
use url::Url;

use crate::auth::Credentials;
use crate::error::Result;
use crate::feed::{self, JobStats, Project, Resource};

use super::client::ConcourseClient;
use super::types::RawJob;

/// Concourse build status provider.
///
/// Every call runs a fresh fetch-and-map cycle against the API: authenticate,
/// list pipelines, fetch the jobs of every pipeline, then map. Nothing is
/// cached between calls and any upstream failure fails the whole call.
pub struct ConcourseProvider {
    client: ConcourseClient,
    credentials: Credentials,
}

impl ConcourseProvider {
    /// Creates a provider for the Concourse instance at `api_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client or the API URL cannot be built.
    pub fn new(api_url: &Url, credentials: Credentials) -> Result<Self> {
        let client = ConcourseClient::new(api_url)?;

        Ok(Self {
            client,
            credentials,
        })
    }

    /// Fetches the jobs of every named pipeline concurrently.
    ///
    /// The result is ordered by pipeline, then by the order the API returned
    /// each pipeline's jobs, regardless of which request finished first.
    ///
    /// # Errors
    ///
    /// Fails as soon as any single pipeline request fails.
    pub async fn fetch_all_jobs(
        &self,
        pipeline_names: &[String],
        authorization: &str,
    ) -> Result<Vec<RawJob>> {
        info!(
            "Fetching jobs for {} pipelines in parallel...",
            pipeline_names.len()
        );

        let futures = pipeline_names
            .iter()
            .map(|name| self.client.list_jobs(name, authorization));

        let jobs: Vec<RawJob> = try_join_all(futures).await?.into_iter().flatten().collect();

        debug!("Fetched {} jobs", jobs.len());

        Ok(jobs)
    }

    /// Builds the CCTray projects for every job with a finished build.
    ///
    /// # Arguments
    ///
    /// * `base_uri` - Concourse web URL; only its origin is used, for `webUrl`
    ///
    /// # Errors
    ///
    /// Returns an error if authentication, the pipeline listing or any job
    /// listing fails.
    pub async fn build_feed(&self, base_uri: &Url) -> Result<Vec<Project>> {
        let jobs = self.fetch_jobs().await?;
        Ok(jobs
            .iter()
            .filter_map(|job| feed::to_project(base_uri, job))
            .collect())
    }

    /// Same as [`Self::build_feed`] but in the job-stats shape.
    pub async fn build_stats(&self, base_uri: &Url) -> Result<Vec<JobStats>> {
        let jobs = self.fetch_jobs().await?;
        Ok(jobs
            .iter()
            .filter_map(|job| feed::to_job_stats(base_uri, job))
            .collect())
    }

    /// Lists the input resources of a job's last finished build.
    ///
    /// Uses the resources embedded in the build record when present and asks
    /// the build resources endpoint otherwise. A job that has never finished
    /// a build has no resources.
    pub async fn job_resources(&self, pipeline: &str, job: &str) -> Result<Vec<Resource>> {
        let authorization = self.authorize().await?;
        let raw_job = self.client.get_job(pipeline, job, &authorization).await?;

        let Some(build) = raw_job.finished_build else {
            debug!("{pipeline}#{job} has no finished build");
            return Ok(Vec::new());
        };

        let inputs = match build.resources {
            Some(resources) => resources,
            None => {
                self.client
                    .build_resources(build.id, &authorization)
                    .await?
                    .inputs
            }
        };

        Ok(feed::to_resources(&inputs))
    }

    async fn authorize(&self) -> Result<String> {
        let token = self.client.get_token(&self.credentials).await?;
        Ok(token.authorization())
    }

    async fn fetch_jobs(&self) -> Result<Vec<RawJob>> {
        let authorization = self.authorize().await?;

        let pipelines = self.client.list_pipelines(&authorization).await?;
        if pipelines.is_empty() {
            warn!("No pipelines found for team");
        }

        let names: Vec<String> = pipelines.into_iter().map(|p| p.name).collect();
        self.fetch_all_jobs(&names, &authorization).await
    }
}
