//! Error types raised by leaderboard aggregation and word submission.

use letterbox_core::{PeriodError, StoreError};
use thiserror::Error;

/// Errors raised by [`LeaderboardAggregator`](crate::LeaderboardAggregator).
#[derive(Debug, Error)]
pub enum LeaderboardError {
    /// A store operation failed.
    #[error("failed to {operation}")]
    Store {
        /// Description of the failed operation.
        operation: &'static str,
        /// Source error from the store.
        #[source]
        source: StoreError,
    },
    /// A host-supplied period could not be interpreted.
    #[error("invalid leaderboard period")]
    Period(#[from] PeriodError),
}

/// Errors raised by [`WordSubmitter`](crate::WordSubmitter).
///
/// Domain rejections are not errors; they are reported through
/// [`SubmissionOutcome`](crate::SubmissionOutcome).
#[derive(Debug, Error)]
pub enum SubmissionError {
    /// A store operation failed.
    #[error("failed to {operation}")]
    Store {
        /// Description of the failed operation.
        operation: &'static str,
        /// Source error from the store.
        #[source]
        source: StoreError,
    },
    /// Recording the new total on the leaderboard failed.
    #[error("failed to record submission score")]
    Leaderboard(#[from] LeaderboardError),
}

impl LeaderboardError {
    pub(crate) fn store(operation: &'static str) -> impl FnOnce(StoreError) -> Self {
        move |source| Self::Store { operation, source }
    }
}

impl SubmissionError {
    pub(crate) fn store(operation: &'static str) -> impl FnOnce(StoreError) -> Self {
        move |source| Self::Store { operation, source }
    }
}
