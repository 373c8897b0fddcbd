mod cli;
mod commands;
mod config;
mod mailer;
mod paths;
mod progress;
mod report;
mod ui;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{Cli, Command};
use config::AppConfig;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Exit status after Ctrl-C
const EXIT_INTERRUPTED: u8 = 130;

/// Global context for the application
pub struct Context {
    pub quiet: bool,
    pub config_path: Option<PathBuf>,
}

impl Context {
    /// Load the config file named on the command line, or the default one
    pub fn config(&self) -> Result<AppConfig> {
        let path = paths::config_file(self.config_path.as_deref())?;
        AppConfig::load(&path)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(if cli.quiet {
            log::LevelFilter::Error
        } else {
            log_level
        })
        .format_timestamp(None)
        .init();

    let ctx = Context {
        quiet: cli.quiet,
        config_path: cli.config,
    };

    match run(&ctx, cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if is_interrupted(&e) => {
            ui::warn("Interrupted");
            ExitCode::from(EXIT_INTERRUPTED)
        }
        Err(e) => {
            log::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(ctx: &Context, command: Command) -> Result<()> {
    match command {
        Command::Sync(args) => {
            let interrupt = Arc::new(AtomicBool::new(false));
            let flag = Arc::clone(&interrupt);
            if let Err(e) = ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst)) {
                log::warn!("Could not install Ctrl-C handler: {e}");
            }
            commands::sync::run(ctx, args, &interrupt)
        }
        Command::LsIpa => commands::list::ls_ipa(ctx),
        Command::LsBamboo => commands::list::ls_bamboo(ctx),
        Command::Search { keyword } => commands::search::run(ctx, &keyword),
        Command::CheckIpa => commands::check::ipa(ctx),
        Command::CheckBamboo => commands::check::bamboo(ctx),
        Command::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "bamboo-ipa-sync", &mut io::stdout());
            Ok(())
        }
    }
}

fn is_interrupted(error: &anyhow::Error) -> bool {
    error
        .downcast_ref::<reconcile::Error>()
        .is_some_and(reconcile::Error::is_interrupted)
}
