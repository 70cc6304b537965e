//! namedupe - name-based duplicate file cleaner
//!
//! Finds files whose names carry a duplicate marker (`report (1).txt`,
//! `photo.copy.jpg`), groups them per directory with the file they copy, keeps
//! the oldest file of each group, and deletes the rest after confirmation.

pub mod actions;
pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod scanner;
pub mod signal;

use std::io::{self, BufRead, IsTerminal, Write};

use anyhow::{Context, Result};

use crate::actions::confirm::{confirm_deletion, Confirmation};
use crate::actions::delete::{delete_batch, BatchDeleteResult, DeleteConfig};
use crate::cli::{Cli, OutputFormat};
use crate::config::Config;
use crate::duplicates::{deletion_candidates, DuplicateFinder, FinderConfig};
use crate::error::ExitCode;
use crate::output::{write_dry_run_outcome, CsvOutput, JsonOutput, TextProgress, TextReport};
use crate::scanner::WalkerConfig;

/// Run with the process's stdin, stdout and stderr.
///
/// # Errors
///
/// Returns any error that ends the run; see [`ExitCode::from_error`].
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    if !io::stdout().is_terminal() {
        yansi::disable();
    }
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut out = io::stdout().lock();
    let mut err = io::stderr().lock();
    run_app_with_io(cli, &mut input, &mut out, &mut err)
}

/// Run with explicit streams: answers are read from `input`, the report
/// goes to `out`, and the prompt of a JSON or CSV run goes to `err`.
///
/// # Errors
///
/// - `ConfigError` for an unreadable or invalid config file
/// - `FinderError` for a bad pattern, an unusable directory, or Ctrl+C
///   during the scan
/// - I/O errors writing the report
pub fn run_app_with_io(
    cli: Cli,
    input: &mut dyn BufRead,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<ExitCode> {
    if cli.no_color {
        yansi::disable();
    }
    log::debug!("Log level: {}", logging::current_level_name());

    let mut config = Config::load(cli.config.as_deref())?;
    config.apply_cli(&cli);
    log::debug!("Effective configuration: {:?}", config);

    if cli.print_config {
        write!(out, "{}", config.to_toml()?)?;
        return Ok(ExitCode::Success);
    }

    let handler = signal::install_handler().context("cannot set up Ctrl+C handling")?;

    let finder_config = FinderConfig::default()
        .with_pattern(config.pattern.as_str())
        .with_detect_copy(config.detect_copy)
        .with_walker(WalkerConfig::new(
            config.recursive,
            config.follow_symlinks,
            config.time_source,
        ))
        .with_shutdown_flag(handler.get_flag());
    let finder = DuplicateFinder::new(finder_config)?;
    let (groups, summary) = finder.find_duplicates(&cli.path)?;
    let candidates = deletion_candidates(&groups);

    if config.output == OutputFormat::Text {
        TextReport::new(&groups, &summary, config.time_source).write_to(out)?;
    }

    let delete_config = DeleteConfig::default()
        .with_dry_run(cli.dry_run)
        .with_time_source(config.time_source)
        .with_shutdown_flag(handler.get_flag());

    let mut deletion: Option<BatchDeleteResult> = None;
    if candidates.is_empty() {
        log::debug!("Nothing to delete");
    } else if cli.dry_run {
        let result = delete_batch::<TextProgress<&mut dyn Write>>(&candidates, &delete_config, None);
        if config.output == OutputFormat::Text {
            write_dry_run_outcome(out, &result)?;
        }
    } else {
        let prompt_out: &mut dyn Write = if config.output == OutputFormat::Text {
            &mut *out
        } else {
            &mut *err
        };
        let approved = cli.yes || ask_user(input, prompt_out, &summary, candidates.len())?;

        if approved {
            let result = if config.output == OutputFormat::Text {
                let progress = TextProgress::new(&mut *out, &summary.root);
                delete_batch(&candidates, &delete_config, Some(&progress))
            } else {
                delete_batch::<TextProgress<&mut dyn Write>>(&candidates, &delete_config, None)
            };
            deletion = Some(result);
        }
    }

    let exit_code = if deletion.as_ref().is_some_and(|d| d.interrupted) {
        ExitCode::Interrupted
    } else {
        ExitCode::Success
    };

    match config.output {
        OutputFormat::Text => {}
        OutputFormat::Json => {
            let mut json = JsonOutput::new(&groups, &summary, cli.dry_run, exit_code);
            if let Some(result) = &deletion {
                json = json.with_deletion(result);
            }
            json.write_to(out)?;
        }
        OutputFormat::Csv => CsvOutput::new(&candidates).write_to(&mut *out)?,
    }

    Ok(exit_code)
}

/// Prompt for confirmation, reporting a refusal on the same stream.
fn ask_user(
    input: &mut dyn BufRead,
    prompt_out: &mut dyn Write,
    summary: &duplicates::ScanSummary,
    count: usize,
) -> Result<bool> {
    writeln!(prompt_out)?;
    let answer = confirm_deletion(input, prompt_out, count, summary.reclaimable_space)
        .context("cannot read confirmation")?;

    match answer {
        Confirmation::Confirmed => return Ok(true),
        Confirmation::Declined => writeln!(prompt_out, "Deletion cancelled by user.")?,
        Confirmation::NoInput => {
            writeln!(prompt_out, "No confirmation provided (end of input). Aborting.")?;
        }
    }
    log::debug!("Deletion declined, no files were deleted");
    Ok(false)
}
