mod cli;
mod config;
mod export;
mod main_lib;

use clap::Parser;

use cli::Cli;
use main_lib::{init_tracing, run};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();
    init_tracing(&cli.log);

    let output = run(cli).await?;
    println!("{}", output.display());
    Ok(())
}
