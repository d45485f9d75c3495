use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A Concourse pipeline as returned by the pipeline listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pipeline {
    pub name: String,
}

/// A job within a Concourse pipeline.
///
/// Every field other than the two build slots is defaulted when absent, so a
/// sparse record such as `{"next_build": null, "finished_build": null}` still
/// deserializes and is later skipped by the mapper instead of failing the
/// whole listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawJob {
    #[serde(default)]
    pub id: u64,
    /// Job name within its pipeline
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub pipeline_name: String,
    /// Build currently in flight, if any
    #[serde(default)]
    pub next_build: Option<RawBuild>,
    /// Most recent completed build, if any
    #[serde(default)]
    pub finished_build: Option<RawBuild>,
}

/// A single build of a job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawBuild {
    #[serde(default)]
    pub id: u64,
    /// Build label (e.g. "42")
    #[serde(default)]
    pub name: String,
    /// Upstream status string (e.g. "succeeded", "failed", "errored")
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub job_name: String,
    #[serde(default)]
    pub pipeline_name: String,
    /// Completion time in epoch seconds
    #[serde(default)]
    pub end_time: Option<i64>,
    #[serde(default)]
    pub resources: Option<Vec<RawResource>>,
}

/// A versioned resource consumed or produced by a build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawResource {
    #[serde(default)]
    pub resource_name: String,
    #[serde(default)]
    pub resource_type: String,
    /// Opaque, resource-type specific version (e.g. `{"number": "0.1.0"}`)
    #[serde(default)]
    pub version: IndexMap<String, serde_json::Value>,
}

/// Response of the build resources endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildResources {
    #[serde(default)]
    pub inputs: Vec<RawResource>,
    #[serde(default)]
    pub outputs: Vec<RawResource>,
}
