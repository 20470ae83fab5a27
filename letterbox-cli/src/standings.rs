//! Leaderboard and rank commands for the Letterbox CLI.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use letterbox_core::{ActorId, GameId, MemoryCache, PeriodType, Rank, Standing};
use letterbox_leaderboard::LeaderboardAggregator;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::{
    ARG_ACTOR, ARG_DATABASE, ARG_GAME, ARG_PERIOD, ARG_PERIOD_KEY, CliError, game_id, open_store,
    require, write_output,
};

pub(crate) const ARG_LIMIT: &str = "limit";
pub(crate) const DEFAULT_LIMIT: usize = 10;
pub(crate) const ENV_LEADERBOARD_DATABASE: &str = "LETTERBOX_CMDS_LEADERBOARD_DATABASE";
pub(crate) const ENV_LEADERBOARD_PERIOD: &str = "LETTERBOX_CMDS_LEADERBOARD_PERIOD";
pub(crate) const ENV_RANK_DATABASE: &str = "LETTERBOX_CMDS_RANK_DATABASE";
pub(crate) const ENV_RANK_ACTOR: &str = "LETTERBOX_CMDS_RANK_ACTOR";
pub(crate) const ENV_RANK_PERIOD: &str = "LETTERBOX_CMDS_RANK_PERIOD";

/// CLI arguments for the `leaderboard` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Print the highest scores of a leaderboard period. Daily and \
                 monthly periods need a period key (YYYY-MM-DD, or YYYY-MM \
                 for months); all-time periods take none.",
    about = "Print the top standings of a leaderboard period"
)]
#[ortho_config(prefix = "LETTERBOX")]
pub(crate) struct LeaderboardArgs {
    /// Path to the SQLite database.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
    /// Period type: daily, monthly or all_time.
    #[arg(long = ARG_PERIOD, value_name = "type")]
    #[serde(default)]
    pub(crate) period: Option<PeriodType>,
    /// Period key for daily and monthly periods.
    #[arg(long = ARG_PERIOD_KEY, value_name = "key")]
    #[serde(default)]
    pub(crate) period_key: Option<String>,
    /// Number of standings to print.
    #[arg(long = ARG_LIMIT, value_name = "n")]
    #[serde(default)]
    pub(crate) limit: Option<usize>,
    /// Game whose leaderboard is read.
    #[arg(long = ARG_GAME, value_name = "id")]
    #[serde(default)]
    pub(crate) game: Option<String>,
}

impl LeaderboardArgs {
    pub(crate) fn into_config(self) -> Result<LeaderboardConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        LeaderboardConfig::try_from(merged)
    }
}

/// Resolved `leaderboard` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LeaderboardConfig {
    pub(crate) database: Utf8PathBuf,
    pub(crate) period: PeriodType,
    pub(crate) period_key: Option<String>,
    pub(crate) limit: usize,
    pub(crate) game: GameId,
}

impl TryFrom<LeaderboardArgs> for LeaderboardConfig {
    type Error = CliError;

    fn try_from(args: LeaderboardArgs) -> Result<Self, Self::Error> {
        Ok(Self {
            database: require(args.database, ARG_DATABASE, ENV_LEADERBOARD_DATABASE)?,
            period: require(args.period, ARG_PERIOD, ENV_LEADERBOARD_PERIOD)?,
            period_key: args.period_key,
            limit: args.limit.unwrap_or(DEFAULT_LIMIT),
            game: game_id(args.game)?,
        })
    }
}

/// CLI arguments for the `rank` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Print an actor's rank and score in a leaderboard period, or \
                 null when the actor has no entry. Tied scores share a rank.",
    about = "Print one actor's rank in a leaderboard period"
)]
#[ortho_config(prefix = "LETTERBOX")]
pub(crate) struct RankArgs {
    /// Path to the SQLite database.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
    /// Actor whose rank is printed.
    #[arg(long = ARG_ACTOR, value_name = "id")]
    #[serde(default)]
    pub(crate) actor: Option<String>,
    /// Period type: daily, monthly or all_time.
    #[arg(long = ARG_PERIOD, value_name = "type")]
    #[serde(default)]
    pub(crate) period: Option<PeriodType>,
    /// Period key for daily and monthly periods.
    #[arg(long = ARG_PERIOD_KEY, value_name = "key")]
    #[serde(default)]
    pub(crate) period_key: Option<String>,
    /// Game whose leaderboard is read.
    #[arg(long = ARG_GAME, value_name = "id")]
    #[serde(default)]
    pub(crate) game: Option<String>,
}

impl RankArgs {
    pub(crate) fn into_config(self) -> Result<RankConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        RankConfig::try_from(merged)
    }
}

/// Resolved `rank` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RankConfig {
    pub(crate) database: Utf8PathBuf,
    pub(crate) actor: ActorId,
    pub(crate) period: PeriodType,
    pub(crate) period_key: Option<String>,
    pub(crate) game: GameId,
}

impl TryFrom<RankArgs> for RankConfig {
    type Error = CliError;

    fn try_from(args: RankArgs) -> Result<Self, Self::Error> {
        Ok(Self {
            database: require(args.database, ARG_DATABASE, ENV_RANK_DATABASE)?,
            actor: ActorId::new(require(args.actor, ARG_ACTOR, ENV_RANK_ACTOR)?)?,
            period: require(args.period, ARG_PERIOD, ENV_RANK_PERIOD)?,
            period_key: args.period_key,
            game: game_id(args.game)?,
        })
    }
}

pub(crate) fn run_leaderboard(
    args: LeaderboardArgs,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    let standings = execute_leaderboard(&config)?;
    write_output(writer, &standings)
}

pub(crate) fn execute_leaderboard(config: &LeaderboardConfig) -> Result<Vec<Standing>, CliError> {
    let aggregator = LeaderboardAggregator::new(open_store(&config.database)?, MemoryCache::new());
    Ok(aggregator.leaderboard_for(
        &config.game,
        config.period,
        config.period_key.as_deref(),
        config.limit,
    )?)
}

pub(crate) fn run_rank(args: RankArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    let rank = execute_rank(&config)?;
    write_output(writer, &rank)
}

pub(crate) fn execute_rank(config: &RankConfig) -> Result<Option<Rank>, CliError> {
    let aggregator = LeaderboardAggregator::new(open_store(&config.database)?, MemoryCache::new());
    Ok(aggregator.user_rank_for(
        &config.game,
        &config.actor,
        config.period,
        config.period_key.as_deref(),
    )?)
}
