//! Research Notes Module Service: publishes agent-written notes.
//!
//! Validates notes and writes them to the configured GitHub repository through
//! the contents API. Exposes StarkBot-compatible RPC endpoints.
//!
//! Default: http://127.0.0.1:9110/

use research_notes::config::Config;
use research_notes::routes::{self, AppState};
use research_notes::{GitHubContentsClient, NoteSubmitter};
use std::sync::Arc;
use std::time::Instant;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    env_logger::init();

    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            log::error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    let client = GitHubContentsClient::new(&config.api_url, &config.owner, &config.repo, &config.token)
        .with_timeout(config.http_timeout);
    let client = match client {
        Ok(c) => c,
        Err(e) => {
            log::error!("Failed to build HTTP client: {}", e);
            std::process::exit(1);
        }
    };

    let mut submitter = NoteSubmitter::new(client, &config.branch);
    if let Some(site_url) = &config.site_url {
        submitter = submitter.with_site_url(site_url);
    }

    log::info!(
        "Publishing research notes to {} (branch {})",
        config.repository(),
        config.branch
    );

    let state = Arc::new(AppState {
        submitter,
        repository: config.repository(),
        start_time: Instant::now(),
    });

    let cors = tower_http::cors::CorsLayer::permissive();
    let app = routes::router(state).layer(cors);

    let addr = format!("127.0.0.1:{}", config.port);
    log::info!("Research Notes Module Service listening on http://{}", addr);

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            log::error!("Failed to bind {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    if let Err(e) = axum::serve(listener, app).await {
        log::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
