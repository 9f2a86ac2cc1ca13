pub mod api;
pub mod checkpoint;
pub mod cli;
pub mod config;
pub mod dedup;
pub mod ingest;
pub mod normalize;
pub mod regions;
pub mod server;
pub mod store;
pub mod ui;

pub use cli::{Cli, Commands};
pub use ingest::{IngestOptions, IngestSummary, Ingestor};
pub use ui::{Phase, SilentUi, Ui, UiApp};
