//! Command-line interface for operating the Letterbox engine.
//!
//! Every command works against a SQLite database and prints JSON to
//! standard output. Options can come from CLI flags, `LETTERBOX_*`
//! environment variables or configuration files.
#![forbid(unsafe_code)]

use std::io::Write;
use std::sync::Arc;

use camino::Utf8Path;
use clap::{Parser, Subcommand};
use letterbox_core::{GameId, SqliteStore};
use serde::Serialize;

mod error;
mod generate;
mod standings;
mod submit;

pub use error::CliError;

use generate::GenerateArgs;
use standings::{LeaderboardArgs, RankArgs};
use submit::SubmitArgs;

const ARG_DATABASE: &str = "database";
const ARG_DATE: &str = "date";
const ARG_ACTOR: &str = "actor";
const ARG_GAME: &str = "game";
const ARG_PERIOD: &str = "period";
const ARG_PERIOD_KEY: &str = "period-key";
const DEFAULT_GAME: &str = "anagram";

/// Run the Letterbox CLI with the current process arguments and environment.
///
/// # Errors
/// Returns [`CliError`] when arguments are invalid, configuration cannot be
/// merged or the command itself fails.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    let mut stdout = std::io::stdout().lock();
    run_command(cli.command, &mut stdout)
}

fn run_command(command: Command, writer: &mut dyn Write) -> Result<(), CliError> {
    match command {
        Command::Generate(args) => generate::run_generate(args, writer),
        Command::Submit(args) => submit::run_submit(args, writer),
        Command::Leaderboard(args) => standings::run_leaderboard(args, writer),
        Command::Rank(args) => standings::run_rank(args, writer),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "letterbox",
    about = "Operator tooling for the Letterbox daily anagram engine",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Ensure the puzzle for a date exists and print it.
    Generate(GenerateArgs),
    /// Submit a word on behalf of an actor.
    Submit(SubmitArgs),
    /// Print the top standings of a leaderboard period.
    Leaderboard(LeaderboardArgs),
    /// Print one actor's rank in a leaderboard period.
    Rank(RankArgs),
}

fn require<T>(value: Option<T>, field: &'static str, env: &'static str) -> Result<T, CliError> {
    value.ok_or(CliError::MissingArgument { field, env })
}

fn require_existing(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
    match letterbox_fs::file_is_file(path) {
        Ok(true) => Ok(()),
        Ok(false) => Err(CliError::SourcePathNotFile {
            field,
            path: path.to_path_buf(),
        }),
        Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
            Err(CliError::MissingSourceFile {
                field,
                path: path.to_path_buf(),
            })
        }
        Err(source) => Err(CliError::InspectSourcePath {
            field,
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn game_id(raw: Option<String>) -> Result<GameId, CliError> {
    let raw = raw.unwrap_or_else(|| DEFAULT_GAME.to_owned());
    Ok(GameId::new(raw)?)
}

fn open_store(path: &Utf8Path) -> Result<Arc<SqliteStore>, CliError> {
    SqliteStore::open(path)
        .map(Arc::new)
        .map_err(|source| CliError::OpenDatabase {
            path: path.to_path_buf(),
            source,
        })
}

fn write_output<T: Serialize + ?Sized>(writer: &mut dyn Write, value: &T) -> Result<(), CliError> {
    let payload = serde_json::to_string_pretty(value).map_err(CliError::SerialiseOutput)?;
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::WriteOutput)?;
    writer.write_all(b"\n").map_err(CliError::WriteOutput)?;
    Ok(())
}

#[cfg(test)]
mod tests;
