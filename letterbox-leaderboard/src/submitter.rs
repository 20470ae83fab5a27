//! Word submission with found-once semantics.

use std::fmt;

use letterbox_core::{
    ActorId, Clock, GameId, Insertion, Puzzle, PuzzleStore, Submission, SubmissionStore,
    SubmissionTotals, SystemClock, normalise_word,
};
use serde::Serialize;

use crate::{ScoreRecorder, SubmissionError};

/// Why a submission was not accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    /// The word is not one of the puzzle's solutions.
    NotInPuzzle,
    /// The actor already found the word in this puzzle.
    AlreadyFound,
}

impl RejectionReason {
    /// Player-facing description.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::NotInPuzzle => "not a valid word for this puzzle",
            Self::AlreadyFound => "already found",
        }
    }
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Result of [`WordSubmitter::submit_word`].
///
/// Rejections carry the actor's current totals so callers can redraw the
/// player's progress either way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionOutcome {
    /// Whether the word was recorded.
    pub accepted: bool,
    /// The normalised word.
    pub word: String,
    /// Rejection reason, when not accepted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<RejectionReason>,
    /// Player-facing rejection message, when not accepted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
    /// Score of the word, when accepted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<u32>,
    /// The actor's totals for the puzzle after this submission.
    pub totals: SubmissionTotals,
}

impl SubmissionOutcome {
    fn accepted(word: String, score: u32, totals: SubmissionTotals) -> Self {
        Self {
            accepted: true,
            word,
            reason: None,
            message: None,
            score: Some(score),
            totals,
        }
    }

    fn rejected(word: String, reason: RejectionReason, totals: SubmissionTotals) -> Self {
        Self {
            accepted: false,
            word,
            reason: Some(reason),
            message: Some(reason.message()),
            score: None,
            totals,
        }
    }

    /// Report whether the word was recorded.
    #[must_use]
    pub const fn is_accepted(&self) -> bool {
        self.accepted
    }
}

/// Validates and records words found by actors, feeding each actor's
/// running puzzle total to the leaderboard.
///
/// The total is summed from persisted submissions rather than supplied by
/// the caller, and recorded with max semantics, so retries and races cannot
/// inflate or lower it.
pub struct WordSubmitter<S, R, K = SystemClock> {
    game: GameId,
    store: S,
    recorder: R,
    clock: K,
}

impl<S, R> WordSubmitter<S, R, SystemClock>
where
    S: PuzzleStore + SubmissionStore,
    R: ScoreRecorder,
{
    /// Construct a submitter for `game` driven by the system clock.
    pub const fn new(game: GameId, store: S, recorder: R) -> Self {
        Self::with_clock(game, store, recorder, SystemClock)
    }
}

impl<S, R, K> WordSubmitter<S, R, K>
where
    S: PuzzleStore + SubmissionStore,
    R: ScoreRecorder,
    K: Clock,
{
    /// Construct a submitter stamping submissions with `clock`.
    pub const fn with_clock(game: GameId, store: S, recorder: R, clock: K) -> Self {
        Self {
            game,
            store,
            recorder,
            clock,
        }
    }

    /// The game whose leaderboard receives totals.
    #[must_use]
    pub const fn game(&self) -> &GameId {
        &self.game
    }

    /// Submit `word` as found by `actor` in `puzzle`.
    ///
    /// Words outside the puzzle's solution set and words the actor already
    /// found are rejected without error. Accepted and already-found words
    /// both raise the actor's daily, monthly and all-time entries to their
    /// persisted puzzle total, so retrying after a failed leaderboard write
    /// repairs the entries.
    ///
    /// # Errors
    /// Returns [`SubmissionError`] when the store or leaderboard write
    /// fails.
    pub fn submit_word(
        &self,
        puzzle: &Puzzle,
        actor: &ActorId,
        word: &str,
    ) -> Result<SubmissionOutcome, SubmissionError> {
        let text = normalise_word(word);
        let Some(solution) = self
            .store
            .find_word(puzzle.id, &text)
            .map_err(SubmissionError::store("look up puzzle word"))?
        else {
            let totals = self.totals(puzzle, actor)?;
            return Ok(SubmissionOutcome::rejected(
                text,
                RejectionReason::NotInPuzzle,
                totals,
            ));
        };

        let submission = Submission {
            puzzle_id: puzzle.id,
            actor: actor.clone(),
            text: solution.text,
            score: solution.score,
            submitted_at: self.clock.now(),
        };
        let inserted = self
            .store
            .insert_submission(&submission)
            .map_err(SubmissionError::store("record submission"))?;
        let totals = self.totals(puzzle, actor)?;
        // Duplicates re-record the persisted total; max semantics make the
        // write idempotent.
        self.recorder
            .record_score(&self.game, actor, totals.score, puzzle.date)?;

        match inserted {
            Insertion::Conflict => Ok(SubmissionOutcome::rejected(
                submission.text,
                RejectionReason::AlreadyFound,
                totals,
            )),
            Insertion::Inserted(recorded) => {
                log::debug!(
                    "{actor} found {} in puzzle {} for {} points",
                    recorded.text,
                    puzzle.id,
                    recorded.score
                );
                Ok(SubmissionOutcome::accepted(
                    recorded.text,
                    recorded.score,
                    totals,
                ))
            }
        }
    }

    /// The actor's totals for `puzzle`.
    ///
    /// # Errors
    /// Returns [`SubmissionError::Store`] when the store read fails.
    pub fn totals(
        &self,
        puzzle: &Puzzle,
        actor: &ActorId,
    ) -> Result<SubmissionTotals, SubmissionError> {
        self.store
            .submission_totals(puzzle.id, actor)
            .map_err(SubmissionError::store("total submissions"))
    }
}
