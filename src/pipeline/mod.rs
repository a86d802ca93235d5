pub mod flatten;
pub mod job_runner;
pub mod progress;
