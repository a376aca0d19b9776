//! Core library surface for the book search TUI.
//!
//! The binary wires these pieces together; the controller and the HTTP client
//! are usable on their own, which is how the integration tests drive them.
pub mod api;
pub mod config;
pub mod controller;
pub mod error;
pub mod logging;
pub mod models;
pub mod ui;

/// HTTP client for the catalog and the bridge that runs searches off the UI
/// thread.
pub use api::{BookClient, Fetcher};

pub use config::{Cli, Config};
pub use controller::{FetchOutcome, FetchRequest, PageController};
pub use error::SearchError;

/// The domain types that other layers manipulate.
pub use models::{FetchResult, ResultRow, SearchState, SortField};

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
