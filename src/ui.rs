//! Ratatui front-end: a search box with a sort toggle, a pager line, the
//! results table and a footer for status messages and key hints.

mod app;
mod helpers;
mod terminal;

pub use app::App;
pub use terminal::run_app;
