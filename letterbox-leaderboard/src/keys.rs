//! Cache keys for leaderboard lists and ranks.
//!
//! Keys embed the period key, or `all` for the all-time period, so every
//! cached value can be reconstructed from its inputs.

use letterbox_core::{ActorId, GameId, Period};

/// List sizes hosts are expected to request; invalidation covers these.
pub const COMMON_LIMITS: [usize; 4] = [10, 25, 50, 100];

/// Key for a cached leaderboard list.
///
/// # Examples
/// ```
/// use chrono::NaiveDate;
/// use letterbox_core::{GameId, Period};
/// use letterbox_leaderboard::keys::leaderboard_key;
///
/// let game = GameId::new("anagram").expect("valid game");
/// let day = NaiveDate::from_ymd_opt(2024, 3, 17).expect("valid date");
/// assert_eq!(
///     leaderboard_key(&game, &Period::daily(day), 10),
///     "leaderboard:anagram:daily:2024-03-17:10"
/// );
/// assert_eq!(
///     leaderboard_key(&game, &Period::AllTime, 25),
///     "leaderboard:anagram:all_time:all:25"
/// );
/// ```
#[must_use]
pub fn leaderboard_key(game: &GameId, period: &Period, limit: usize) -> String {
    format!(
        "leaderboard:{game}:{}:{}:{limit}",
        period.period_type(),
        period.key_segment()
    )
}

/// Key for a cached actor rank.
#[must_use]
pub fn rank_key(game: &GameId, actor: &ActorId, period: &Period) -> String {
    format!(
        "rank:{game}:{actor}:{}:{}",
        period.period_type(),
        period.key_segment()
    )
}
