pub mod features;
pub mod jobs;
