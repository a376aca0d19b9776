//! Binary entry point: parse configuration, route logs to a file, start the
//! async runtime that carries HTTP requests, and drive the Ratatui event loop
//! on the main thread until the user exits.
use anyhow::Context;
use book_search::{
    logging, run_app, App, BookClient, Cli, Config, Fetcher, PageController, SearchState,
};
use clap::Parser;
use tracing::info;

fn main() -> anyhow::Result<()> {
    let config = Config::from_cli(Cli::parse())?;
    logging::init_file_logging(&config.log_file)?;
    info!(endpoint = %config.base_url, page_size = config.page_size, "starting book search");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    let client = BookClient::new(config.base_url.clone())?;
    let fetcher = Fetcher::new(client, runtime.handle().clone());
    let controller = PageController::new(
        SearchState::new(config.initial_query, config.page_size),
        config.debounce,
    );

    let mut app = App::new(controller, fetcher);
    app.start();
    run_app(&mut app)
}
