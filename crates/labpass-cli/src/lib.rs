pub mod cli;
pub mod client;
pub mod commands;
pub mod config;
pub mod observability;
pub mod output;
pub mod pipeline;
pub mod snapshot;

pub use client::FhirClient;
pub use config::{ConfigOverrides, RunConfig, load_config};
pub use pipeline::{RunSummary, run_recipe};
pub use snapshot::{SnapshotWriter, Stage};
