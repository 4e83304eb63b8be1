//! Spinners, colored status lines and check reports.

use crate::config::Config;
use crate::constants::PROGRESS_TICK_MS;
use crate::detect::{CheckResult, ProjectType};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;

pub fn print_working_dir(path: &Path, config: &Config) {
    if config.is_quiet() {
        return;
    }
    println!(
        "{} {}",
        "Working in:".cyan(),
        path.display().to_string().white().bold()
    )
}

pub fn print_project_type(project_type: ProjectType, config: &Config) {
    if !config.is_verbose() {
        return;
    }
    eprintln!("{}", format!("Detected a {} project", project_type).dimmed());
}

/// Announces a step, verbose mode only.
pub fn print_step(message: &str, config: &Config) {
    if !config.is_verbose() {
        return;
    }
    eprintln!("  {}...", message.dimmed());
}

pub fn print_info(message: &str, config: &Config) {
    if config.is_quiet() {
        return;
    }
    println!("{}", message.dimmed());
}

pub fn print_success(message: &str, config: &Config) {
    if config.is_quiet() {
        return;
    }
    println!("{} {}", "✓".green(), message);
}

/// Warnings are shown even in quiet mode.
pub fn print_warning(message: &str) {
    eprintln!("{} {}", "!".yellow().bold(), message.yellow());
}

pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red(), message.red());
}

pub fn print_check_report(project_type: ProjectType, result: &CheckResult) {
    let passed = result.values().all(Option::is_none);
    let title = format!("{} project", project_type);
    if passed {
        println!("{}", title.green().bold());
    } else {
        println!("{}", title.white().bold());
    }
    for (name, failure) in result {
        match failure {
            None => println!("  {} {}", "✓".green(), name),
            Some(reason) => println!("  {} {}: {}", "✗".red(), name, reason.dimmed()),
        }
    }
}

/// Spinner shown while a long step runs.
/// Hidden in quiet or verbose mode, where it would fight with other output.
pub struct StepProgress {
    spinner: Option<ProgressBar>,
}

impl StepProgress {
    pub fn update(&self, message: &str) {
        if let Some(spinner) = &self.spinner {
            spinner.set_message(format!("{}...", message));
        }
    }

    pub fn finish_success(&self, message: &str) {
        if let Some(spinner) = &self.spinner {
            spinner.finish_with_message(format!("{} {}", "✓".green(), message));
        }
    }

    pub fn finish_failed(&self, error: &str) {
        if let Some(spinner) = &self.spinner {
            spinner.finish_with_message(format!("{} failed: {}", "✗".red(), error));
        }
    }
}

#[must_use]
pub fn create_step_progress(config: &Config) -> StepProgress {
    let spinner = if config.is_quiet() || config.is_verbose() {
        None
    } else {
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
            .template("{spinner:.cyan} {msg}")
        {
            spinner.set_style(style);
        }
        spinner.enable_steady_tick(Duration::from_millis(PROGRESS_TICK_MS));
        Some(spinner)
    };

    StepProgress { spinner }
}
