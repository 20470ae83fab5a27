//! Generate command implementation for the Letterbox CLI.

use std::io::Write;
use std::sync::Arc;

use camino::Utf8PathBuf;
use chrono::NaiveDate;
use clap::Parser;
use letterbox_core::{MemoryCache, Puzzle, PuzzleStore, ScoredWord, SystemClock};
use letterbox_dictionary::{AnagramDictionary, FileWordSource};
use letterbox_puzzle::{PuzzleGenerator, PuzzleGeneratorConfig};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::{
    ARG_DATABASE, ARG_DATE, CliError, open_store, require, require_existing, write_output,
};

pub(crate) const ARG_WORD_LIST: &str = "word-list";
pub(crate) const ARG_SEED: &str = "seed";
pub(crate) const ENV_GENERATE_DATABASE: &str = "LETTERBOX_CMDS_GENERATE_DATABASE";
pub(crate) const ENV_GENERATE_WORD_LIST: &str = "LETTERBOX_CMDS_GENERATE_WORD_LIST";

/// CLI arguments for the `generate` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Ensure the puzzle for a date exists, drawing letters and \
                 enumerating their solutions from the word list when it does \
                 not. An existing puzzle is printed unchanged.",
    about = "Ensure the puzzle for a date exists"
)]
#[ortho_config(prefix = "LETTERBOX")]
pub(crate) struct GenerateArgs {
    /// Puzzle date (YYYY-MM-DD); defaults to today in UTC.
    #[arg(long = ARG_DATE, value_name = "date")]
    #[serde(default)]
    pub(crate) date: Option<NaiveDate>,
    /// Path to the SQLite database.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
    /// Path to the word list, one word per line.
    #[arg(long = ARG_WORD_LIST, value_name = "path")]
    #[serde(default)]
    pub(crate) word_list: Option<Utf8PathBuf>,
    /// Seed making the drawn letters reproducible.
    #[arg(long = ARG_SEED, value_name = "n")]
    #[serde(default)]
    pub(crate) seed: Option<u64>,
}

impl GenerateArgs {
    pub(crate) fn into_config(self) -> Result<GenerateConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        GenerateConfig::try_from(merged)
    }
}

/// Resolved `generate` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct GenerateConfig {
    pub(crate) date: Option<NaiveDate>,
    pub(crate) database: Utf8PathBuf,
    pub(crate) word_list: Utf8PathBuf,
    pub(crate) seed: Option<u64>,
}

impl GenerateConfig {
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        require_existing(&self.word_list, ARG_WORD_LIST)
    }
}

impl TryFrom<GenerateArgs> for GenerateConfig {
    type Error = CliError;

    fn try_from(args: GenerateArgs) -> Result<Self, Self::Error> {
        Ok(Self {
            date: args.date,
            database: require(args.database, ARG_DATABASE, ENV_GENERATE_DATABASE)?,
            word_list: require(args.word_list, ARG_WORD_LIST, ENV_GENERATE_WORD_LIST)?,
            seed: args.seed,
        })
    }
}

/// A puzzle together with its solution words.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct GeneratedPuzzle {
    #[serde(flatten)]
    pub(crate) puzzle: Puzzle,
    pub(crate) words: Vec<ScoredWord>,
}

pub(crate) fn run_generate(args: GenerateArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    config.validate_sources()?;
    let generated = execute_generate(&config)?;
    write_output(writer, &generated)
}

pub(crate) fn execute_generate(config: &GenerateConfig) -> Result<GeneratedPuzzle, CliError> {
    let store = open_store(&config.database)?;
    let cache = Arc::new(MemoryCache::new());
    let dictionary = AnagramDictionary::new(
        FileWordSource::new(config.word_list.clone()),
        Arc::clone(&cache),
    );
    let generator_config = PuzzleGeneratorConfig {
        seed: config.seed,
        ..PuzzleGeneratorConfig::default()
    };
    let generator = PuzzleGenerator::with_config(
        Arc::clone(&store),
        dictionary,
        cache,
        SystemClock,
        generator_config,
    );
    let puzzle = config.date.map_or_else(
        || generator.ensure_todays_puzzle(),
        |date| generator.ensure_puzzle_for_date(date),
    )?;
    let words = store
        .words_for_puzzle(puzzle.id)
        .map_err(CliError::store("list puzzle words"))?
        .into_iter()
        .map(|word| ScoredWord {
            text: word.text,
            score: word.score,
        })
        .collect();
    Ok(GeneratedPuzzle { puzzle, words })
}
