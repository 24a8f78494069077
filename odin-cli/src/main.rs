//! ODIN CLI - search satellite imagery at a point and export its time series.

use clap::Parser;
use log::debug;

#[derive(Parser)]
#[command(
    name = "odin-cli",
    version,
    about = "Point-based satellite time series toolkit"
)]
struct Cli {
    #[command(flatten)]
    global: odin_cmd::GlobalArgs,

    #[command(subcommand)]
    command: odin_cmd::Command,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    debug!("STAC {} / WTSS {}", cli.global.stac_url, cli.global.wtss_url);
    odin_cmd::run(cli.global, cli.command).await
}
