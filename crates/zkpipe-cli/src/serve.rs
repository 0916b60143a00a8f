//! # `zkpipe serve`
//!
//! Runs the API server over the assembled pipeline, with a Prometheus
//! recorder installed for the `/metrics` endpoint.

use anyhow::Context as _;
use clap::Args;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

use zkpipe_api::{app, AppState};

use crate::context::CliContext;

/// Arguments for the serve subcommand.
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Address to bind.
    #[arg(long, default_value = "127.0.0.1:8080")]
    pub bind: SocketAddr,
}

/// Run the serve subcommand.
pub async fn run(ctx: &CliContext, args: ServeArgs) -> anyhow::Result<()> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .context("installing metrics recorder")?;
    let state = AppState::new(ctx.pipeline.clone()).with_metrics(handle);

    let listener = tokio::net::TcpListener::bind(args.bind)
        .await
        .with_context(|| format!("binding {}", args.bind))?;
    tracing::info!(
        addr = %args.bind,
        workspace = %ctx.pipeline.workspace().root.display(),
        "zkpipe API listening"
    );
    axum::serve(listener, app(state))
        .await
        .context("serving API")?;
    Ok(())
}
