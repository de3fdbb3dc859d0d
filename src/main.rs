//! Binary entry point: resolve configuration, set up logging, open the
//! database, then either run one command or drive the Ratatui loop until the
//! user exits.
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use library_desk::cli::{Cli, Command};
use library_desk::logging::{self, LogOptions};
use library_desk::{run_app, App, Config, Library};

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    cli.apply_overrides(&mut config);
    let log_options = LogOptions { debug: cli.debug };

    match cli.command {
        Some(command) => {
            logging::init_stderr(log_options)?;
            let mut library = open_library(&config)?;
            let code = run_command(&command, &mut library);
            library.close().context("failed to close the database")?;
            Ok(code)
        }
        None => {
            logging::init_file(log_options, &config.log_path())?;
            let library = open_library(&config)?;
            let mut app = App::new(library, config.pause_on_lock);
            run_app(&mut app)?;
            app.into_library()
                .close()
                .context("failed to close the database")?;
            info!("session closed");
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn open_library(config: &Config) -> Result<Library> {
    let library = Library::open(&config.database_path, config.busy_timeout())
        .context("Failed to connect to the database")?;
    info!(path = %config.database_path.display(), "database connection established");
    Ok(library)
}

/// Print the command's text; failures still print but exit non-zero.
fn run_command(command: &Command, library: &mut Library) -> ExitCode {
    let text = command.run(library);
    println!("{}", text.trim_end_matches('\n'));
    if text.starts_with("Error ") {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
