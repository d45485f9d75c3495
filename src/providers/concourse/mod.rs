mod client;
mod provider;
mod types;

pub use provider::ConcourseProvider;
pub use types::{RawBuild, RawJob, RawResource};
