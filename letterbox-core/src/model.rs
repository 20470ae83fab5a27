//! Plain data records persisted and exchanged by the engine.
//!
//! The records carry no behaviour beyond validation of identifiers;
//! persistence lives behind the traits in [`crate::store`].

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;

use crate::period::Period;

/// Store-assigned identifier of a [`Puzzle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct PuzzleId(pub i64);

impl fmt::Display for PuzzleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Errors returned when constructing an [`ActorId`] or [`GameId`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentifierError {
    /// The identifier was empty or only whitespace.
    #[error("{kind} identifier must not be blank")]
    Blank {
        /// Which identifier was rejected.
        kind: &'static str,
    },
    /// The identifier contained a `:`, which is reserved for cache keys.
    #[error("{kind} identifier {value:?} must not contain ':'")]
    ReservedCharacter {
        /// Which identifier was rejected.
        kind: &'static str,
        /// The rejected value.
        value: String,
    },
}

fn validate_identifier(kind: &'static str, raw: String) -> Result<String, IdentifierError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(IdentifierError::Blank { kind });
    }
    if trimmed.contains(':') {
        return Err(IdentifierError::ReservedCharacter {
            kind,
            value: trimmed.to_owned(),
        });
    }
    Ok(trimmed.to_owned())
}

macro_rules! string_identifier {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[cfg_attr(
            feature = "serde",
            derive(serde::Serialize, serde::Deserialize),
            serde(try_from = "String", into = "String")
        )]
        pub struct $name(String);

        impl $name {
            /// Validate and construct the identifier.
            ///
            /// Surrounding whitespace is trimmed.
            ///
            /// # Errors
            /// Returns [`IdentifierError`] for blank input or input
            /// containing `:`.
            pub fn new(raw: impl Into<String>) -> Result<Self, IdentifierError> {
                validate_identifier($kind, raw.into()).map(Self)
            }

            /// Borrow the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl TryFrom<String> for $name {
            type Error = IdentifierError;

            fn try_from(raw: String) -> Result<Self, Self::Error> {
                Self::new(raw)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

string_identifier!(
    /// Identity of a player: an authenticated user or an anonymous guest.
    ///
    /// # Examples
    /// ```
    /// use letterbox_core::ActorId;
    ///
    /// let actor = ActorId::new(" guest-42 ").expect("valid actor");
    /// assert_eq!(actor.as_str(), "guest-42");
    /// assert!(ActorId::new("   ").is_err());
    /// ```
    ActorId,
    "actor"
);

string_identifier!(
    /// Identity of the game a leaderboard belongs to.
    GameId,
    "game"
);

/// A dated letter puzzle.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Puzzle {
    /// Store-assigned identifier.
    pub id: PuzzleId,
    /// The puzzle letters in display order.
    pub letters: String,
    /// Calendar date the puzzle belongs to; unique across puzzles.
    pub date: NaiveDate,
    /// Number of solution words stored for the puzzle.
    pub possible_word_count: u32,
}

/// A solution word paired with its score, prior to persistence.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScoredWord {
    /// Lowercase word text.
    pub text: String,
    /// Score awarded for finding the word.
    pub score: u32,
}

/// Everything needed to create a puzzle and its solution list in one write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPuzzle {
    /// The puzzle letters in display order.
    pub letters: String,
    /// Calendar date the puzzle belongs to.
    pub date: NaiveDate,
    /// Every solution word for the letters.
    pub words: Vec<ScoredWord>,
}

impl NewPuzzle {
    /// Number of solution words, saturating at `u32::MAX`.
    #[must_use]
    pub fn possible_word_count(&self) -> u32 {
        u32::try_from(self.words.len()).unwrap_or(u32::MAX)
    }
}

/// A persisted solution word for a puzzle.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Word {
    /// Puzzle the word solves.
    pub puzzle_id: PuzzleId,
    /// Lowercase word text.
    pub text: String,
    /// Score awarded for finding the word.
    pub score: u32,
}

/// A word found by an actor.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Submission {
    /// Puzzle the word was found in.
    pub puzzle_id: PuzzleId,
    /// Who found it.
    pub actor: ActorId,
    /// Lowercase word text.
    pub text: String,
    /// Score awarded.
    pub score: u32,
    /// When the submission was accepted.
    pub submitted_at: DateTime<Utc>,
}

/// Running totals for one actor on one puzzle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SubmissionTotals {
    /// Sum of the scores of every word found.
    pub score: u64,
    /// Number of distinct words found.
    pub words_found: u32,
}

/// An actor's best score within one leaderboard period.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LeaderboardEntry {
    /// Game the leaderboard belongs to.
    pub game: GameId,
    /// Actor holding the entry.
    pub actor: ActorId,
    /// Period the score counts towards.
    pub period: Period,
    /// Highest score recorded for the period.
    pub score: u64,
}

/// One row of a ranked leaderboard listing.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Standing {
    /// Actor holding the position.
    pub actor: ActorId,
    /// The actor's score for the period.
    pub score: u64,
}

/// An actor's 1-based position within a period.
///
/// Ties share a rank: the rank is one more than the number of entries with
/// a strictly greater score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rank {
    /// 1-based rank.
    pub rank: u64,
    /// The actor's score for the period.
    pub score: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("\t\n")]
    fn blank_identifiers_are_rejected(#[case] raw: &str) {
        assert_eq!(
            ActorId::new(raw),
            Err(IdentifierError::Blank { kind: "actor" })
        );
        assert_eq!(GameId::new(raw), Err(IdentifierError::Blank { kind: "game" }));
    }

    #[rstest]
    fn reserved_separator_is_rejected() {
        let err = GameId::new("a:b").expect_err("colon should be rejected");
        assert!(matches!(err, IdentifierError::ReservedCharacter { .. }));
    }

    #[rstest]
    fn identifiers_display_their_value() {
        let game = GameId::new("anagram").expect("valid game");
        assert_eq!(game.to_string(), "anagram");
        assert_eq!(PuzzleId(7).to_string(), "7");
    }

    #[rstest]
    fn new_puzzle_counts_words() {
        let puzzle = NewPuzzle {
            letters: "artesni".into(),
            date: NaiveDate::from_ymd_opt(2024, 3, 1).expect("valid date"),
            words: vec![
                ScoredWord {
                    text: "rat".into(),
                    score: 1,
                },
                ScoredWord {
                    text: "rats".into(),
                    score: 2,
                },
            ],
        };
        assert_eq!(puzzle.possible_word_count(), 2);
    }
}
