pub mod app;
pub mod batch;
pub mod config;
pub mod engine;
pub mod logging;
pub mod manifest;
pub mod report;
pub mod version;
