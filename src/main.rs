mod application;
mod cli;
mod data;
mod domain;
mod features;
mod infra;
mod ml;
mod web;

use anyhow::Result;
use clap::Parser;
use cli::Cli;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("review_sentiment=info".parse()?),
        )
        .init();

    Cli::parse().run()
}
