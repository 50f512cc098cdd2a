use clap::Parser;
use colored::Colorize;
use rdcli::config::CliConfiguration;
use rdcli::error::Result;

mod args;
mod connect;

use args::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(&cli).await {
        eprintln!("{}", format!("(error) {}", err).red());
        std::process::exit(1);
    }
}

async fn run(cli: &Cli) -> Result<()> {
    let config = CliConfiguration::load(&cli.config)?;
    let mut session = connect::create_session(cli, &config).await?;

    if cli.command.is_empty() {
        session.run_interactive().await
    } else {
        session.run_once(&cli.command).await
    }
}
