mod cli;
mod cli_help;

use std::error::Error;

use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use suitescore::config::Settings;
use suitescore::{diff, history, score};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn dispatch(cli: Cli) -> Result<(), Box<dyn Error>> {
    if let Commands::Completions { shell } = cli.command {
        clap_complete::generate(shell, &mut Cli::command(), "sscore", &mut std::io::stdout());
        return Ok(());
    }

    let settings = Settings::load(cli.config.as_deref())?;
    match cli.command {
        Commands::Score {
            report,
            reference,
            depth,
            output,
        } => score::run(&settings, &report, reference.as_deref(), output.json, depth),
        Commands::Diff {
            current,
            reference,
            epsilon,
            changed_only,
            output,
        } => {
            let settings = match epsilon {
                Some(e) => settings.with_epsilon(e)?,
                None => settings,
            };
            diff::run(&settings, &current, &reference, output.json, changed_only)
        }
        Commands::History { report, id, output } => {
            history::run(&settings, &report, id.as_deref(), output.json)
        }
        Commands::Completions { .. } => Ok(()),
    }
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    if let Err(err) = dispatch(cli) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
