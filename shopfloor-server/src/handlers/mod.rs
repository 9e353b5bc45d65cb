pub mod jobs;
pub mod programs;
pub mod reports;
