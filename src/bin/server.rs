use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use panda_merge::config::ServerArgs;
use panda_merge::server::{build_router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = ServerArgs::parse();
    let state = AppState::from_args(&args).context("preparing server state")?;
    info!("Public dir: {}", state.public_dir.display());
    info!("Generated dir: {}", state.generated_dir.display());
    info!("Sessions dir: {}", state.sessions.root().display());

    let app = build_router(state);

    let addr = args.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!("Server listening on http://{addr}");

    axum::serve(listener, app).await?;
    Ok(())
}
