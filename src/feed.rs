//! Normalized build status model and the pure mappings from Concourse records.

use chrono::{DateTime, SecondsFormat};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::providers::concourse::{RawBuild, RawJob, RawResource};

/// Concourse team used for every web link.
const TEAM: &str = "main";

/// Whether a job currently has a build in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Activity {
    Building,
    Sleeping,
}

impl Activity {
    pub fn as_str(self) -> &'static str {
        match self {
            Activity::Building => "Building",
            Activity::Sleeping => "Sleeping",
        }
    }
}

/// Outcome of the last finished build, in CCTray vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BuildStatus {
    Success,
    Failure,
}

impl BuildStatus {
    /// Classifies an upstream status string.
    ///
    /// Only `failed` and `errored` count as failures. Every other value,
    /// including `aborted` and statuses this code has never seen, reports as
    /// `Success`.
    pub fn normalize(raw: &str) -> Self {
        match raw {
            "failed" | "errored" => BuildStatus::Failure,
            _ => BuildStatus::Success,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BuildStatus::Success => "Success",
            BuildStatus::Failure => "Failure",
        }
    }
}

/// A job as rendered in the CCTray feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub name: String,
    pub activity: Activity,
    pub last_build_status: BuildStatus,
    pub last_build_label: String,
    pub last_build_time: String,
    pub web_url: String,
}

/// A job as rendered in the JSON stats feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStats {
    pub id: String,
    pub name: String,
    pub activity: Activity,
    pub last_build_status: BuildStatus,
    pub last_build_label: String,
    pub last_build_time: String,
    pub web_url: String,
}

/// A build input resource with its upstream version passed through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub name: String,
    #[serde(rename = "type")]
    pub resource_type: String,
    pub version: IndexMap<String, serde_json::Value>,
}

/// Maps a job to its CCTray project, or `None` if it has never finished a build.
pub fn to_project(base_uri: &Url, job: &RawJob) -> Option<Project> {
    let build = job.finished_build.as_ref()?;

    Some(Project {
        name: format!("{}#{}", job.pipeline_name, job.name),
        activity: activity(job),
        last_build_status: BuildStatus::normalize(&build.status),
        last_build_label: build.pipeline_name.clone(),
        last_build_time: format_end_time(build),
        web_url: build_url(base_uri, job, build),
    })
}

/// Maps a job to its stats entry, or `None` if it has never finished a build.
pub fn to_job_stats(base_uri: &Url, job: &RawJob) -> Option<JobStats> {
    let project = to_project(base_uri, job)?;

    Some(JobStats {
        id: format!("{}-{}-id", job.pipeline_name, job.name),
        name: project.name,
        activity: project.activity,
        last_build_status: project.last_build_status,
        last_build_label: project.last_build_label,
        last_build_time: project.last_build_time,
        web_url: project.web_url,
    })
}

pub fn to_resources(resources: &[RawResource]) -> Vec<Resource> {
    resources
        .iter()
        .map(|r| Resource {
            name: r.resource_name.clone(),
            resource_type: r.resource_type.clone(),
            version: r.version.clone(),
        })
        .collect()
}

fn activity(job: &RawJob) -> Activity {
    if job.next_build.is_some() {
        Activity::Building
    } else {
        Activity::Sleeping
    }
}

// Empty when the build carries no usable end time.
fn format_end_time(build: &RawBuild) -> String {
    build
        .end_time
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .map(|time| time.to_rfc3339_opts(SecondsFormat::Millis, true))
        .unwrap_or_default()
}

fn build_url(base_uri: &Url, job: &RawJob, build: &RawBuild) -> String {
    format!(
        "{}/teams/{TEAM}/pipelines/{}/jobs/{}/builds/{}",
        base_uri.origin().ascii_serialization(),
        job.pipeline_name,
        job.name,
        build.id
    )
}
