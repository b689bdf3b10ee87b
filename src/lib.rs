//! rhythmdupe - duplicate finder for personal music libraries.
//!
//! Finds byte-identical duplicate files using a two-phase pipeline: a cheap
//! size-bucket pre-filter followed by streaming BLAKE3 content hashing of
//! the surviving candidates. Each confirmed duplicate set gets exactly one
//! deterministically chosen "keep" member; the rest can be permanently
//! deleted after explicit confirmation.

pub mod actions;
pub mod cli;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod progress;
pub mod scanner;

use cli::{Cli, StdinConfirmer};
use duplicates::{DeleteOutcome, ScanSession};
use error::ExitCode;
use progress::{ConsoleReporter, NullReporter, ProgressReporter};

use crate::actions::delete::{AssumeYes, ConfirmDeletion};

/// Run the application logic and return the exit code.
///
/// # Errors
///
/// Returns an error for configuration problems (unusable root) and any
/// unexpected failure; per-file I/O problems are handled inside the
/// pipeline and surface only in the exit code.
pub fn run_app(cli: Cli) -> anyhow::Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);

    let reporter: Box<dyn ProgressReporter> = if cli.quiet || cli.json {
        Box::new(NullReporter)
    } else {
        Box::new(ConsoleReporter::new())
    };

    let session = ScanSession::new();
    let outcome = session.scan(&cli.root, reporter.as_ref())?;

    if cli.json {
        cli::print_json_report(&outcome)?;
    } else {
        cli::print_report(&outcome);
    }

    if outcome.is_clean() {
        return Ok(ExitCode::NoDuplicates);
    }

    let mut exit = if outcome.stats.has_skips() {
        ExitCode::PartialSuccess
    } else {
        ExitCode::Success
    };

    if cli.delete {
        let confirmer: Box<dyn ConfirmDeletion> = if cli.yes {
            Box::new(AssumeYes)
        } else {
            Box::new(StdinConfirmer)
        };

        match session.delete_duplicates(&outcome.sets, confirmer.as_ref())? {
            DeleteOutcome::Cancelled => {
                if !cli.json {
                    println!("Deletion cancelled; no files were removed.");
                }
                session.dismiss();
            }
            DeleteOutcome::Completed(result) => {
                if !cli.json {
                    println!("{}", result.summary());
                }
                if result.failure_count() > 0 {
                    exit = ExitCode::PartialSuccess;
                }

                // Deletions invalidate everything cached from the first
                // pass, so rescan from scratch to report the new state.
                let after = session.scan(&cli.root, reporter.as_ref())?;
                if !cli.json {
                    if after.is_clean() {
                        println!("Rescan: no duplicate files remain.");
                    } else {
                        println!(
                            "Rescan: {} duplicate file(s) still present in {} set(s).",
                            after.stats.redundant_files, after.stats.duplicate_sets
                        );
                    }
                }
                session.dismiss();
            }
        }
    } else {
        session.dismiss();
    }

    Ok(exit)
}
