pub mod config;
pub mod error;
pub mod host;
pub mod output;
pub mod pdf;
pub mod pipeline;
