pub mod concourse;

pub use concourse::ConcourseProvider;
