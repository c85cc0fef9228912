use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use trueno_curves::cli::Args;
use trueno_curves::config::PlotConfig;
use trueno_curves::pipeline::make_plots;

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = PlotConfig::from(Args::parse());
    let saved = make_plots(&config)?;
    tracing::debug!(path = %saved.display(), "done");
    Ok(())
}
