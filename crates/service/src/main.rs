mod app;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use librarian_core::LibrarianConfig;

use crate::app::{router, AppState};

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    init_tracing();
    let config = LibrarianConfig::load_from_env().context("failed to load librarian config")?;
    if config.shell_compat {
        warn!("shell_compat enabled: field text reaches `sh -c` unescaped");
    }
    let addr: SocketAddr = config
        .bind_addr
        .parse()
        .with_context(|| format!("invalid bind address {}", config.bind_addr))?;
    info!(
        tool = %config.tool_dir.join(&config.tool_name).display(),
        mode = ?config.invocation_mode(),
        "lookup tool configured"
    );
    let app = router(Arc::new(AppState::new(config)));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("listening" = %addr);
    axum::serve(listener, app).await?;
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
