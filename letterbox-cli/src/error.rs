//! Error types emitted by the Letterbox CLI.
//!
//! Keep this error type reasonably small, as every command helper returns
//! `Result<_, CliError>` and the workspace enables `clippy::result_large_err`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use chrono::NaiveDate;
use letterbox_core::{IdentifierError, StoreError};
use letterbox_leaderboard::{LeaderboardError, SubmissionError};
use letterbox_puzzle::PuzzleError;
use thiserror::Error;

/// Errors emitted by the Letterbox CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        field: &'static str,
        env: &'static str,
    },
    /// A referenced input path does not exist on disk.
    #[error("{field} path {path:?} does not exist")]
    MissingSourceFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// A referenced input path exists but is not a file.
    #[error("{field} path {path:?} exists but is not a file")]
    SourcePathNotFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// A referenced input path could not be inspected due to an IO error.
    #[error("failed to inspect {field} path {path:?}: {source}")]
    InspectSourcePath {
        field: &'static str,
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// An actor or game identifier was rejected.
    #[error(transparent)]
    Identifier(#[from] IdentifierError),
    /// Opening the SQLite database failed.
    #[error("failed to open database at {path:?}: {source}")]
    OpenDatabase {
        path: Utf8PathBuf,
        #[source]
        source: StoreError,
    },
    /// A direct store read failed.
    #[error("failed to {operation}: {source}")]
    Store {
        operation: &'static str,
        #[source]
        source: StoreError,
    },
    /// No puzzle has been generated for the date.
    #[error("no puzzle exists for {date}; run `letterbox generate --date {date}` first")]
    NoPuzzle { date: NaiveDate },
    /// Generating or looking up a puzzle failed.
    #[error(transparent)]
    Puzzle(#[from] PuzzleError),
    /// Submitting a word failed.
    #[error(transparent)]
    Submission(#[from] SubmissionError),
    /// Reading a leaderboard failed.
    #[error(transparent)]
    Leaderboard(#[from] LeaderboardError),
    /// Serializing command output failed.
    #[error("failed to serialize output: {0}")]
    SerialiseOutput(#[source] serde_json::Error),
    /// Writing command output failed.
    #[error("failed to write output: {0}")]
    WriteOutput(#[source] std::io::Error),
}

impl CliError {
    pub(crate) fn store(operation: &'static str) -> impl FnOnce(StoreError) -> Self {
        move |source| Self::Store { operation, source }
    }
}
