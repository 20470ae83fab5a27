//! Leaderboards and word submission for the Letterbox anagram engine.
//!
//! [`WordSubmitter`] records the words actors find, once each, and hands the
//! resulting puzzle total to a [`LeaderboardAggregator`]. The aggregator
//! keeps one entry per actor for the day, the month and all time, raising
//! each to the larger of its stored and submitted value, and serves ranked
//! lists and single-actor ranks through a short-lived cache. After every
//! write the [`CacheInvalidationManager`] evicts the cache keys the write
//! can affect.

#![forbid(unsafe_code)]

mod aggregator;
mod config;
mod error;
mod invalidation;
pub mod keys;
mod submitter;

pub use aggregator::{LeaderboardAggregator, RecordedScores, ScoreRecorder};
pub use config::LeaderboardConfig;
pub use error::{LeaderboardError, SubmissionError};
pub use invalidation::CacheInvalidationManager;
pub use submitter::{RejectionReason, SubmissionOutcome, WordSubmitter};

#[cfg(test)]
mod tests;
