//! Command-line and environment configuration.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use directories::BaseDirs;
use reqwest::Url;

use crate::error::SearchError;
use crate::models::DEFAULT_PAGE_SIZE;

/// Catalog endpoint used when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "https://openlibrary.org/search.json";
/// Quiet period after the last keystroke before a search is sent.
pub const DEFAULT_DEBOUNCE_MS: u64 = 1000;
/// Folder name used beneath the user's home directory for the log file.
const DATA_DIR_NAME: &str = ".book-search";
/// Log file name stored inside the data directory.
const LOG_FILE_NAME: &str = "book-search.log";
const MAX_PAGE_SIZE: u32 = 100;

#[derive(Parser, Debug, Clone)]
#[command(name = "book-search", version, about = "Search the Open Library catalog from the terminal")]
pub struct Cli {
    /// Search endpoint queried with q/offset/limit/sort parameters.
    #[arg(long, env = "BOOK_SEARCH_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Rows per page.
    #[arg(long, env = "BOOK_SEARCH_PAGE_SIZE", default_value_t = DEFAULT_PAGE_SIZE)]
    pub page_size: u32,

    /// Milliseconds of typing silence before a search is sent.
    #[arg(long, env = "BOOK_SEARCH_DEBOUNCE_MS", default_value_t = DEFAULT_DEBOUNCE_MS)]
    pub debounce_ms: u64,

    /// Query to search for at startup.
    #[arg(long, short, default_value = "")]
    pub query: String,

    /// Where diagnostic logs are written.
    #[arg(long, env = "BOOK_SEARCH_LOG")]
    pub log_file: Option<PathBuf>,
}

/// Validated runtime settings.
#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: Url,
    pub page_size: u32,
    pub debounce: Duration,
    pub initial_query: String,
    pub log_file: PathBuf,
}

impl Config {
    pub fn from_cli(cli: Cli) -> Result<Self, SearchError> {
        let base_url = parse_base_url(&cli.base_url)?;

        if cli.page_size == 0 || cli.page_size > MAX_PAGE_SIZE {
            return Err(SearchError::InvalidConfig(format!(
                "page size must be between 1 and {MAX_PAGE_SIZE}, got {}",
                cli.page_size
            )));
        }

        let log_file = match cli.log_file {
            Some(path) => path,
            None => default_log_path()?,
        };

        Ok(Self {
            base_url,
            page_size: cli.page_size,
            debounce: Duration::from_millis(cli.debounce_ms),
            initial_query: cli.query,
            log_file,
        })
    }
}

fn parse_base_url(raw: &str) -> Result<Url, SearchError> {
    let trimmed = raw.trim();
    let url = Url::parse(trimmed)
        .map_err(|err| SearchError::InvalidConfig(format!("base URL '{trimmed}': {err}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(SearchError::InvalidConfig(format!(
            "base URL must use http or https, got '{other}'"
        ))),
    }
}

/// Resolve the default log location inside the user's home.
fn default_log_path() -> Result<PathBuf, SearchError> {
    let base_dirs = BaseDirs::new()
        .ok_or_else(|| SearchError::InvalidConfig("could not locate home directory".into()))?;
    Ok(base_dirs.home_dir().join(DATA_DIR_NAME).join(LOG_FILE_NAME))
}
