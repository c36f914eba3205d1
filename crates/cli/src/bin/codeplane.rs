use clap::Parser;
use codeplane_cli::Args;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    codeplane_cli::run(Args::parse()).await
}
