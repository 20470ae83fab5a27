//! Submit command implementation for the Letterbox CLI.

use std::io::Write;
use std::sync::Arc;

use camino::Utf8PathBuf;
use chrono::NaiveDate;
use clap::Parser;
use letterbox_core::{ActorId, GameId, MemoryCache, PuzzleStore};
use letterbox_leaderboard::{LeaderboardAggregator, SubmissionOutcome, WordSubmitter};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::{
    ARG_ACTOR, ARG_DATABASE, ARG_DATE, ARG_GAME, CliError, game_id, open_store, require,
    write_output,
};

pub(crate) const ARG_WORD: &str = "word";
pub(crate) const ENV_SUBMIT_DATABASE: &str = "LETTERBOX_CMDS_SUBMIT_DATABASE";
pub(crate) const ENV_SUBMIT_DATE: &str = "LETTERBOX_CMDS_SUBMIT_DATE";
pub(crate) const ENV_SUBMIT_ACTOR: &str = "LETTERBOX_CMDS_SUBMIT_ACTOR";
pub(crate) const ENV_SUBMIT_WORD: &str = "LETTERBOX_CMDS_SUBMIT_WORD";

/// CLI arguments for the `submit` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Submit a word found by an actor in the puzzle for a date. \
                 Accepted words raise the actor's daily, monthly and all-time \
                 leaderboard entries to their new puzzle total.",
    about = "Submit a word on behalf of an actor"
)]
#[ortho_config(prefix = "LETTERBOX")]
pub(crate) struct SubmitArgs {
    /// Path to the SQLite database.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
    /// Date of the puzzle (YYYY-MM-DD).
    #[arg(long = ARG_DATE, value_name = "date")]
    #[serde(default)]
    pub(crate) date: Option<NaiveDate>,
    /// Actor submitting the word.
    #[arg(long = ARG_ACTOR, value_name = "id")]
    #[serde(default)]
    pub(crate) actor: Option<String>,
    /// The word found.
    #[arg(long = ARG_WORD, value_name = "word")]
    #[serde(default)]
    pub(crate) word: Option<String>,
    /// Game whose leaderboard receives the score.
    #[arg(long = ARG_GAME, value_name = "id")]
    #[serde(default)]
    pub(crate) game: Option<String>,
}

impl SubmitArgs {
    pub(crate) fn into_config(self) -> Result<SubmitConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        SubmitConfig::try_from(merged)
    }
}

/// Resolved `submit` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SubmitConfig {
    pub(crate) database: Utf8PathBuf,
    pub(crate) date: NaiveDate,
    pub(crate) actor: ActorId,
    pub(crate) word: String,
    pub(crate) game: GameId,
}

impl TryFrom<SubmitArgs> for SubmitConfig {
    type Error = CliError;

    fn try_from(args: SubmitArgs) -> Result<Self, Self::Error> {
        let database = require(args.database, ARG_DATABASE, ENV_SUBMIT_DATABASE)?;
        let date = require(args.date, ARG_DATE, ENV_SUBMIT_DATE)?;
        let actor = ActorId::new(require(args.actor, ARG_ACTOR, ENV_SUBMIT_ACTOR)?)?;
        let word = require(args.word, ARG_WORD, ENV_SUBMIT_WORD)?;
        Ok(Self {
            database,
            date,
            actor,
            word,
            game: game_id(args.game)?,
        })
    }
}

pub(crate) fn run_submit(args: SubmitArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    let outcome = execute_submit(&config)?;
    write_output(writer, &outcome)
}

pub(crate) fn execute_submit(config: &SubmitConfig) -> Result<SubmissionOutcome, CliError> {
    let store = open_store(&config.database)?;
    let puzzle = store
        .find_puzzle_by_date(config.date)
        .map_err(CliError::store("look up puzzle"))?
        .ok_or(CliError::NoPuzzle { date: config.date })?;
    let aggregator = LeaderboardAggregator::new(Arc::clone(&store), MemoryCache::new());
    let submitter = WordSubmitter::new(config.game.clone(), store, aggregator);
    Ok(submitter.submit_word(&puzzle, &config.actor, &config.word)?)
}
