use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use drone_sentry::config::PluginConfig;
use drone_sentry::{ApiResponse, Client, DeployDetails, ReleaseApi, ReleaseDetails};

mod cli;
mod exit_codes;

use cli::Args;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("drone_sentry=info")),
        )
        .init();

    let args = Args::parse();
    if let Err(e) = run(args).await {
        tracing::error!("{e:#}");
        std::process::exit(exit_codes::for_error(&e));
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    let config = PluginConfig::load(&args.config)
        .with_context(|| format!("failed to load {}", args.config.display()))?;
    let plan = args.resolve(config, |key| std::env::var(key).ok())?;

    let client = Client::new(plan.client);
    tracing::debug!("reporting to {}", client.server());
    dispatch(&client, plan.release, plan.deploy).await
}

/// Release first, then deploy. A failed release stops the deploy; a failed
/// deploy leaves the release in place.
async fn dispatch(
    api: &dyn ReleaseApi,
    release: Option<ReleaseDetails>,
    deploy: Option<DeployDetails>,
) -> anyhow::Result<()> {
    if let Some(mut release) = release {
        let result = api.submit_release(&mut release).await;
        print_response(&result);
        result.context("task failed")?;
    }

    if let Some(mut deploy) = deploy {
        let result = api.submit_deploy(&mut deploy).await;
        print_response(&result);
        result.context("task failed")?;
    }

    Ok(())
}

/// Prints whatever the server sent back, including on API errors.
fn print_response(result: &drone_sentry::Result<ApiResponse>) {
    let body = match result {
        Ok(body) => Some(body),
        Err(e) => e.response(),
    };
    if let Some(body) = body.filter(|b| !b.is_empty()) {
        tracing::info!("got response:");
        println!("{body}");
    }
}
