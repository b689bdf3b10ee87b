//! Command-line interface: argument definitions, the interactive deletion
//! prompt, and report printing.
//!
//! # Example
//!
//! ```bash
//! # Find duplicates under a music library
//! rhythmdupe ~/Music
//!
//! # Find and delete, prompting before anything is removed
//! rhythmdupe ~/Music --delete
//!
//! # Non-interactive cleanup for scripts
//! rhythmdupe ~/Music --delete --yes --json
//! ```

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use bytesize::ByteSize;
use clap::Parser;

use crate::actions::delete::ConfirmDeletion;
use crate::duplicates::ScanOutcome;

/// Duplicate finder for personal music libraries.
///
/// Finds byte-identical files under ROOT using a size pre-filter plus
/// content hashing, marks one copy per set to keep, and can permanently
/// delete the rest after confirmation.
#[derive(Debug, Parser)]
#[command(name = "rhythmdupe")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory to scan for duplicate files
    #[arg(value_name = "ROOT")]
    pub root: PathBuf,

    /// Delete the redundant copies after presenting the duplicate sets
    ///
    /// Deletion is permanent and prompts for confirmation unless --yes is
    /// given.
    #[arg(long)]
    pub delete: bool,

    /// Assume "yes" at the deletion confirmation prompt
    #[arg(short = 'y', long, requires = "delete")]
    pub yes: bool,

    /// Emit the duplicate report as JSON instead of text
    #[arg(long)]
    pub json: bool,

    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress output and all logging except errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Report errors as structured JSON on stderr
    #[arg(long)]
    pub json_errors: bool,
}

/// Interactive confirmation reading a y/n line from stdin.
///
/// Presents the candidate count and total reclaimable size; anything other
/// than `y`/`yes` (case-insensitive) declines, as does a failed read. The
/// prompt goes to stderr so a `--json` report on stdout stays parseable.
#[derive(Debug, Default)]
pub struct StdinConfirmer;

impl StdinConfirmer {
    /// Write the prompt and read one decision line.
    fn prompt_and_read(
        input: &mut dyn BufRead,
        prompt_out: &mut dyn Write,
        file_count: usize,
        reclaimable_bytes: u64,
    ) -> bool {
        let prompt = format!(
            "About to permanently delete {} file(s), freeing approximately {}.\n\
             This action cannot be undone.\n\
             Proceed? [y/N] ",
            file_count,
            ByteSize::b(reclaimable_bytes)
        );
        if prompt_out.write_all(prompt.as_bytes()).is_err() || prompt_out.flush().is_err() {
            return false;
        }

        let mut line = String::new();
        if input.read_line(&mut line).is_err() {
            return false;
        }
        matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes")
    }
}

impl ConfirmDeletion for StdinConfirmer {
    fn confirm(&self, file_count: usize, reclaimable_bytes: u64) -> bool {
        Self::prompt_and_read(
            &mut io::stdin().lock(),
            &mut io::stderr().lock(),
            file_count,
            reclaimable_bytes,
        )
    }
}

/// Print the duplicate report as text, mirroring the scan summary the user
/// reviews before deciding on deletion.
pub fn print_report(outcome: &ScanOutcome) {
    if outcome.sets.is_empty() {
        println!("No duplicate files were found.");
        return;
    }

    for (i, set) in outcome.sets.iter().enumerate() {
        println!(
            "Duplicate set {} ({} files, {} each):",
            i + 1,
            set.len(),
            ByteSize::b(set.size)
        );
        for (j, path) in set.paths.iter().enumerate() {
            let mark = if j == 0 { "keep  " } else { "delete" };
            println!("  [{}] {}", mark, path.display());
        }
    }

    println!(
        "Found {} duplicate file(s) in {} set(s); {} reclaimable.",
        outcome.stats.redundant_files,
        outcome.stats.duplicate_sets,
        ByteSize::b(outcome.stats.reclaimable_bytes)
    );
}

/// Print the duplicate report as pretty JSON for scripting.
///
/// # Errors
///
/// Returns an error if serialization fails (it should not for this type).
pub fn print_json_report(outcome: &ScanOutcome) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(outcome)?);
    Ok(())
}
