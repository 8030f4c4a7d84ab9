use anyhow::Result;
use clap::Parser;

use labpass_cli::cli::{Cli, Commands};
use labpass_cli::output::print_error;
use labpass_cli::{commands, observability};
use labpass_core::CoreError;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        if let Some(core) = e.downcast_ref::<CoreError>() {
            tracing::error!(category = %core.category(), remote = core.is_remote(), "command failed");
        }
        print_error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    observability::init_tracing_with_level(&cli.log_level);
    let server = cli.server.as_deref();

    match &cli.command {
        Commands::Run(args) => commands::run::run(server, args).await?,
        Commands::Get(args) => commands::get::get(server, args).await?,
        Commands::Recipes => commands::recipes::list(),
    }

    Ok(())
}
