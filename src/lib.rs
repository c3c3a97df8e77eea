pub mod completion;
pub mod config;
pub mod error;
mod http_errors;
pub mod logging;
pub mod repl;
pub mod session;
pub mod transcript;

use std::io;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use tracing::info;

use completion::HttpTransport;
use config::Config;
use repl::run_repl;
use session::Session;

pub async fn run() -> Result<()> {
    let cfg = Config::load().context("Failed to load configuration")?;
    let _log_guard = logging::init();
    info!(
        model = %cfg.model,
        endpoint = %cfg.endpoint,
        request_timeout_secs = ?cfg.request_timeout_secs,
        max_history_messages = ?cfg.max_history_messages,
        error_policy = ?cfg.error_policy,
        "loaded runtime configuration"
    );

    let mut builder = Client::builder();
    if let Some(secs) = cfg.request_timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    let client = builder.build().context("Failed to initialize HTTP client")?;

    let mut session = Session::new(HttpTransport::new(client, &cfg), cfg.model.clone())
        .with_history_limit(cfg.max_history_messages);

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    run_repl(&mut session, stdin.lock(), &mut stdout, cfg.error_policy).await
}
