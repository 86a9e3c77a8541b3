//! `br` binary entry point.
//!
//! Parses the command line, loads the defaults file, installs the log sink,
//! and runs the chosen command.  Parse errors exit with clap's status 2; any
//! other failure is logged, printed, and exits with 1.

use std::process::ExitCode;

use anyhow::Result;
use br_backup::{
    cli::{Cli, Command},
    commands::backup::{self, Invocation},
    config,
    context::ExecutionContext,
    glue::EngineGlue,
    logging,
    runner::EngineRunner,
    runtime::RuntimeToggles,
};
use clap::Parser;
use tracing::error;

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        },
    }
}

fn run(cli: &Cli) -> Result<()> {
    let defaults = config::load_file_config(cli.config.as_deref())?;

    let level = cli.log_level.as_deref().or(defaults.log.level.as_deref());
    let log_file = cli.log_file.as_deref().or(defaults.log.file.as_deref());
    let sink = logging::init(level, log_file, cli.log_format)?;

    let ctx = ExecutionContext::interruptible();
    let mut toggles = RuntimeToggles::default();

    let res = match &cli.command {
        Command::Backup(args) => {
            let glue = EngineGlue::from_settings(args.flags.engine.as_deref(), &defaults.engine);
            let runner = EngineRunner::default();
            let mut inv = Invocation {
                runner: &runner,
                glue: &glue,
                ctx: &ctx,
                toggles: &mut toggles,
                defaults: &defaults,
                has_log_file: sink.has_log_file(),
            };
            backup::execute(args, &mut inv)
        },
    };

    if let Err(ref err) = res {
        error!(error = %format!("{err:#}"), "command failed");
    }
    res
}
