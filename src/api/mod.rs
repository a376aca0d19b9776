//! HTTP side of the application: the catalog client, the search request and
//! the bridge that runs requests off the UI thread.

mod client;
mod fetcher;
mod search;

pub use client::BookClient;
pub use fetcher::Fetcher;
