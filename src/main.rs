use anyhow::Context;
use clap::Parser;
use pb_sync::cli::{Cli, Command};
use pb_sync::output;
use pb_sync::process::SystemRunner;
use pb_sync::prompt::TerminalPrompter;
use pb_sync::workflow::SyncWorkflow;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::print_error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir().context("Failed to read the current directory")?;
    let working_dir = match &cli.directory {
        Some(dir) => cwd.join(dir),
        None => cwd,
    };
    let config = cli.config();
    output::print_working_dir(&working_dir, &config);

    let runner = SystemRunner::new(config.timeout, config.command_logger());
    let mut workflow =
        SyncWorkflow::new(config, runner, TerminalPrompter::default(), working_dir);

    match cli.command {
        Command::Fetch => {
            workflow.fetch()?;
        }
        Command::Update => {
            workflow.update()?;
        }
        Command::Merge => {
            workflow.merge()?;
        }
        Command::Push => {
            workflow.push()?;
        }
        Command::Create => {
            workflow.create()?;
        }
        Command::Config => {
            workflow.reconfigure()?;
        }
        Command::Check => {
            for (project_type, result) in workflow.check() {
                output::print_check_report(project_type, &result);
            }
        }
    }
    Ok(())
}
