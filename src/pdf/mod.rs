pub mod copier;
pub mod forms;
pub mod metadata;
pub mod reader;
pub mod writer;
