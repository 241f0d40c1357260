//! FCP CLI - Command line tool for exploring forestry commodity prices.

use clap::Parser;

#[derive(Parser)]
#[command(
    name = "fcp-cli",
    version,
    about = "Forestry commodity price dashboard toolkit"
)]
struct Cli {
    #[command(subcommand)]
    command: fcp_cmd::Command,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    fcp_cmd::run(cli.command).await
}
