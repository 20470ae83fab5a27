//! Unit coverage for aggregation, caching and submission.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use chrono::NaiveDate;
use letterbox_core::test_support::{FailingCache, ManualClock, MemoryStore};
use letterbox_core::{
    ActorId, Cache, GameId, Insertion, MemoryCache, NewPuzzle, Period, PeriodType, Puzzle,
    PuzzleStore, Rank, ScoredWord, SqliteStore, StoreError, SubmissionStore, SubmissionTotals,
    score_word,
};
use rstest::{fixture, rstest};

use crate::keys::leaderboard_key;
use crate::{
    LeaderboardAggregator, LeaderboardConfig, LeaderboardError, RecordedScores, RejectionReason,
    ScoreRecorder, SubmissionError, SubmissionOutcome, WordSubmitter,
};

type Aggregator = LeaderboardAggregator<Arc<MemoryStore>, Arc<MemoryCache>>;

struct Harness {
    store: Arc<MemoryStore>,
    cache: Arc<MemoryCache>,
    aggregator: Arc<Aggregator>,
}

#[fixture]
fn harness() -> Harness {
    let store = Arc::new(MemoryStore::new());
    let cache = Arc::new(MemoryCache::new());
    let aggregator = Arc::new(LeaderboardAggregator::new(
        Arc::clone(&store),
        Arc::clone(&cache),
    ));
    Harness {
        store,
        cache,
        aggregator,
    }
}

#[fixture]
fn game() -> GameId {
    GameId::new("anagram").expect("valid game")
}

#[fixture]
fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 17).expect("valid date")
}

fn actor(raw: &str) -> ActorId {
    ActorId::new(raw).expect("valid actor")
}

fn seed_scores(h: &Harness, game: &GameId, date: NaiveDate, scores: &[(&str, u64)]) {
    for &(who, score) in scores {
        h.aggregator
            .record_score(game, &actor(who), score, date)
            .expect("record score");
    }
}

#[rstest]
fn ties_share_a_rank(harness: Harness, game: GameId, today: NaiveDate) {
    seed_scores(
        &harness,
        &game,
        today,
        &[("dora", 30), ("bob", 80), ("carol", 50), ("alice", 80)],
    );
    let period = Period::daily(today);

    let standings = harness
        .aggregator
        .leaderboard(&game, &period, 4)
        .expect("leaderboard");
    let order: Vec<_> = standings
        .iter()
        .map(|standing| (standing.actor.as_str(), standing.score))
        .collect();
    assert_eq!(
        order,
        [("alice", 80), ("bob", 80), ("carol", 50), ("dora", 30)]
    );

    let ranks: Vec<u64> = ["alice", "bob", "carol", "dora"]
        .into_iter()
        .map(|who| {
            harness
                .aggregator
                .user_rank(&game, &actor(who), &period)
                .expect("rank")
                .expect("ranked")
                .rank
        })
        .collect();
    assert_eq!(ranks, [1, 1, 3, 4]);
}

#[rstest]
fn scores_only_rise(harness: Harness, game: GameId, today: NaiveDate) {
    let alice = actor("alice");
    let first = harness
        .aggregator
        .record_score(&game, &alice, 40, today)
        .expect("record");
    assert_eq!(
        first,
        RecordedScores {
            daily: 40,
            monthly: 40,
            all_time: 40
        }
    );

    let lower = harness
        .aggregator
        .record_score(&game, &alice, 15, today)
        .expect("record");
    assert_eq!(lower, first);

    let higher = harness
        .aggregator
        .record_score(&game, &alice, 55, today)
        .expect("record");
    assert_eq!(higher.all_time, 55);
}

#[rstest]
fn periods_track_separate_maxima(harness: Harness, game: GameId, today: NaiveDate) {
    let alice = actor("alice");
    let yesterday = today.pred_opt().expect("previous day");
    seed_scores(&harness, &game, yesterday, &[("alice", 70)]);
    let recorded = harness
        .aggregator
        .record_score(&game, &alice, 20, today)
        .expect("record");

    assert_eq!(
        recorded,
        RecordedScores {
            daily: 20,
            monthly: 70,
            all_time: 70
        }
    );
}

#[rstest]
fn zero_limit_is_empty(harness: Harness, game: GameId, today: NaiveDate) {
    seed_scores(&harness, &game, today, &[("alice", 10)]);
    let standings = harness
        .aggregator
        .leaderboard(&game, &Period::AllTime, 0)
        .expect("leaderboard");
    assert!(standings.is_empty());
    assert!(harness.cache.is_empty());
}

#[rstest]
fn oversized_limits_are_clamped(harness: Harness, game: GameId, today: NaiveDate) {
    seed_scores(&harness, &game, today, &[("alice", 10)]);
    harness
        .aggregator
        .leaderboard(&game, &Period::AllTime, 5_000)
        .expect("leaderboard");
    let clamped_key = leaderboard_key(&game, &Period::AllTime, 100);
    assert!(harness.cache.get(&clamped_key).expect("get").is_some());
}

#[rstest]
fn custom_max_limit_truncates(game: GameId, today: NaiveDate) {
    let store = Arc::new(MemoryStore::new());
    let aggregator = LeaderboardAggregator::with_config(
        Arc::clone(&store),
        MemoryCache::new(),
        LeaderboardConfig::default().with_max_limit(2),
    );
    for (who, score) in [("a", 1), ("b", 2), ("c", 3)] {
        aggregator
            .record_score(&game, &actor(who), score, today)
            .expect("record");
    }
    let standings = aggregator
        .leaderboard(&game, &Period::daily(today), 10)
        .expect("leaderboard");
    assert_eq!(standings.len(), 2);
}

#[rstest]
fn common_limits_are_fresh_after_a_write(harness: Harness, game: GameId, today: NaiveDate) {
    seed_scores(&harness, &game, today, &[("alice", 10)]);
    let period = Period::daily(today);
    for limit in [7, 10, 100] {
        harness
            .aggregator
            .leaderboard(&game, &period, limit)
            .expect("prime cache");
    }

    seed_scores(&harness, &game, today, &[("bob", 99)]);

    for limit in [10, 100] {
        let standings = harness
            .aggregator
            .leaderboard(&game, &period, limit)
            .expect("leaderboard");
        assert_eq!(
            standings.first().map(|standing| standing.actor.as_str()),
            Some("bob")
        );
    }
    let uncommon = harness
        .aggregator
        .leaderboard(&game, &period, 7)
        .expect("leaderboard");
    assert_eq!(uncommon.len(), 1, "uncommon limits stay cached until expiry");
}

#[rstest]
fn stale_uncommon_limit_expires_with_ttl(game: GameId, today: NaiveDate) {
    let store = Arc::new(MemoryStore::new());
    let clock = Arc::new(ManualClock::at_ymd_hms(2024, 3, 17, 12, 0, 0));
    let cache = MemoryCache::with_clock(Arc::clone(&clock));
    let aggregator = LeaderboardAggregator::new(Arc::clone(&store), cache);
    let period = Period::daily(today);

    aggregator
        .record_score(&game, &actor("alice"), 10, today)
        .expect("record");
    aggregator
        .leaderboard(&game, &period, 7)
        .expect("prime cache");
    aggregator
        .record_score(&game, &actor("bob"), 99, today)
        .expect("record");

    clock.advance(aggregator.config().leaderboard_ttl);
    let standings = aggregator
        .leaderboard(&game, &period, 7)
        .expect("leaderboard");
    assert_eq!(standings.len(), 2);
}

#[rstest]
fn rank_is_none_without_an_entry(harness: Harness, game: GameId, today: NaiveDate) {
    let alice = actor("alice");
    let period = Period::daily(today);
    assert_eq!(
        harness
            .aggregator
            .user_rank(&game, &alice, &period)
            .expect("rank"),
        None
    );

    seed_scores(&harness, &game, today, &[("alice", 12)]);
    assert_eq!(
        harness
            .aggregator
            .user_rank(&game, &alice, &period)
            .expect("rank"),
        Some(Rank {
            rank: 1,
            score: 12
        })
    );
}

#[rstest]
fn fresh_rank_bypasses_the_cache(harness: Harness, game: GameId, today: NaiveDate) {
    seed_scores(&harness, &game, today, &[("alice", 50), ("bob", 20)]);
    let bob = actor("bob");
    let period = Period::AllTime;
    let cached = harness
        .aggregator
        .user_rank(&game, &bob, &period)
        .expect("rank");
    assert_eq!(cached.map(|rank| rank.rank), Some(2));

    seed_scores(&harness, &game, today, &[("carol", 90)]);
    let stale = harness
        .aggregator
        .user_rank(&game, &bob, &period)
        .expect("rank");
    assert_eq!(stale.map(|rank| rank.rank), Some(2));

    let fresh = harness
        .aggregator
        .user_rank_fresh(&game, &bob, &period)
        .expect("rank");
    assert_eq!(fresh.map(|rank| rank.rank), Some(3));
    let refreshed = harness
        .aggregator
        .user_rank(&game, &bob, &period)
        .expect("rank");
    assert_eq!(refreshed, fresh);
}

#[rstest]
fn host_periods_are_validated(harness: Harness, game: GameId) {
    let err = harness
        .aggregator
        .leaderboard_for(&game, PeriodType::Daily, None, 10)
        .expect_err("daily needs a key");
    assert!(matches!(err, LeaderboardError::Period(_)));

    let err = harness
        .aggregator
        .user_rank_for(&game, &actor("alice"), PeriodType::AllTime, Some("2024"))
        .expect_err("all-time takes no key");
    assert!(matches!(err, LeaderboardError::Period(_)));
}

#[rstest]
fn failing_cache_reads_through(game: GameId, today: NaiveDate) {
    let aggregator = LeaderboardAggregator::new(MemoryStore::new(), FailingCache);
    aggregator
        .record_score(&game, &actor("alice"), 5, today)
        .expect("record");
    let standings = aggregator
        .leaderboard(&game, &Period::monthly(today), 10)
        .expect("leaderboard");
    assert_eq!(standings.len(), 1);
}

fn artesni_puzzle<S: PuzzleStore>(store: &S, date: NaiveDate) -> Puzzle {
    let words = ["rats", "star", "arts", "nitres", "retains"]
        .into_iter()
        .map(|text| ScoredWord {
            text: text.into(),
            score: score_word(text),
        })
        .collect();
    let created = store
        .create_puzzle(&NewPuzzle {
            letters: "artesni".into(),
            date,
            words,
        })
        .expect("create puzzle");
    match created {
        Insertion::Inserted(puzzle) => puzzle,
        Insertion::Conflict => panic!("puzzle already exists"),
    }
}

#[rstest]
fn submission_scenario(harness: Harness, game: GameId, today: NaiveDate) {
    let puzzle = artesni_puzzle(&harness.store, today);
    let submitter = WordSubmitter::new(
        game.clone(),
        Arc::clone(&harness.store),
        Arc::clone(&harness.aggregator),
    );
    let alice = actor("alice");

    let first = submitter
        .submit_word(&puzzle, &alice, "RATS")
        .expect("submit");
    assert!(first.is_accepted());
    assert_eq!(first.score, Some(2));
    assert_eq!(
        first.totals,
        SubmissionTotals {
            score: 2,
            words_found: 1
        }
    );

    let again = submitter
        .submit_word(&puzzle, &alice, "rats")
        .expect("submit");
    assert!(!again.is_accepted());
    assert_eq!(again.reason, Some(RejectionReason::AlreadyFound));
    assert_eq!(again.message, Some("already found"));
    assert_eq!(again.totals.score, 2);

    let bogus = submitter
        .submit_word(&puzzle, &alice, "ZZZZZ")
        .expect("submit");
    assert!(!bogus.is_accepted());
    assert_eq!(bogus.reason, Some(RejectionReason::NotInPuzzle));
    assert_eq!(bogus.message, Some("not a valid word for this puzzle"));
}

#[rstest]
fn accepted_words_feed_the_running_total(harness: Harness, game: GameId, today: NaiveDate) {
    let puzzle = artesni_puzzle(&harness.store, today);
    let submitter = WordSubmitter::new(
        game.clone(),
        Arc::clone(&harness.store),
        Arc::clone(&harness.aggregator),
    );
    let alice = actor("alice");
    for word in ["rats", "retains", "star"] {
        assert!(
            submitter
                .submit_word(&puzzle, &alice, word)
                .expect("submit")
                .is_accepted()
        );
    }

    let rank = harness
        .aggregator
        .user_rank_fresh(&game, &alice, &Period::daily(today))
        .expect("rank")
        .expect("ranked");
    assert_eq!(rank.score, 2 + 10 + 2);
    let standings = harness
        .aggregator
        .leaderboard(&game, &Period::AllTime, 10)
        .expect("leaderboard");
    assert_eq!(standings.first().map(|standing| standing.score), Some(14));
}

#[rstest]
fn actors_find_words_independently(harness: Harness, game: GameId, today: NaiveDate) {
    let puzzle = artesni_puzzle(&harness.store, today);
    let submitter = WordSubmitter::new(
        game,
        Arc::clone(&harness.store),
        Arc::clone(&harness.aggregator),
    );
    assert!(
        submitter
            .submit_word(&puzzle, &actor("alice"), "star")
            .expect("submit")
            .is_accepted()
    );
    assert!(
        submitter
            .submit_word(&puzzle, &actor("bob"), "star")
            .expect("submit")
            .is_accepted()
    );
}

#[rstest]
fn outcomes_serialise_for_hosts(harness: Harness, game: GameId, today: NaiveDate) {
    let puzzle = artesni_puzzle(&harness.store, today);
    let submitter = WordSubmitter::new(
        game,
        Arc::clone(&harness.store),
        Arc::clone(&harness.aggregator),
    );
    let outcome = submitter
        .submit_word(&puzzle, &actor("alice"), "zzzzz")
        .expect("submit");
    let json = serde_json::to_value(&outcome).expect("serialise");
    assert_eq!(
        json,
        serde_json::json!({
            "accepted": false,
            "word": "zzzzz",
            "reason": "not_in_puzzle",
            "message": "not a valid word for this puzzle",
            "totals": { "score": 0, "words_found": 0 }
        })
    );
}

/// Recorder whose first write fails before reaching the aggregator.
struct FailsOnce {
    inner: Arc<Aggregator>,
    failed: AtomicBool,
}

impl ScoreRecorder for FailsOnce {
    fn record_score(
        &self,
        game: &GameId,
        actor: &ActorId,
        score: u64,
        date: NaiveDate,
    ) -> Result<RecordedScores, LeaderboardError> {
        if self.failed.swap(true, Ordering::SeqCst) {
            self.inner.record_score(game, actor, score, date)
        } else {
            Err(LeaderboardError::Store {
                operation: "raise daily score",
                source: StoreError::Unavailable {
                    reason: "connection reset".into(),
                },
            })
        }
    }
}

#[rstest]
fn retrying_after_a_failed_leaderboard_write_records_the_total(
    harness: Harness,
    game: GameId,
    today: NaiveDate,
) {
    let puzzle = artesni_puzzle(&harness.store, today);
    let recorder = FailsOnce {
        inner: Arc::clone(&harness.aggregator),
        failed: AtomicBool::new(false),
    };
    let submitter = WordSubmitter::new(game.clone(), Arc::clone(&harness.store), recorder);
    let alice = actor("alice");

    let err = submitter
        .submit_word(&puzzle, &alice, "retains")
        .expect_err("leaderboard write fails");
    assert!(matches!(err, SubmissionError::Leaderboard(_)));

    let retry = submitter
        .submit_word(&puzzle, &alice, "retains")
        .expect("retry");
    assert_eq!(retry.reason, Some(RejectionReason::AlreadyFound));
    assert_eq!(retry.totals.score, 10);

    let rank = harness
        .aggregator
        .user_rank_fresh(&game, &alice, &Period::daily(today))
        .expect("rank");
    assert_eq!(rank, Some(Rank { rank: 1, score: 10 }));
}

#[rstest]
fn racing_duplicate_submissions_are_found_once(game: GameId, today: NaiveDate) {
    let store = Arc::new(SqliteStore::open_in_memory().expect("open store"));
    let aggregator = Arc::new(LeaderboardAggregator::new(
        Arc::clone(&store),
        MemoryCache::new(),
    ));
    let puzzle = artesni_puzzle(&store, today);
    let submitter = WordSubmitter::new(game.clone(), Arc::clone(&store), Arc::clone(&aggregator));
    let alice = actor("alice");
    let (submitter, puzzle_ref, alice_ref) = (&submitter, &puzzle, &alice);

    let outcomes: Vec<SubmissionOutcome> = thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| scope.spawn(move || submitter.submit_word(puzzle_ref, alice_ref, "retains")))
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().expect("thread").expect("submit"))
            .collect()
    });

    let (accepted, rejected): (Vec<_>, Vec<_>) =
        outcomes.iter().partition(|outcome| outcome.is_accepted());
    assert_eq!(accepted.len(), 1);
    assert_eq!(rejected.len(), 7);
    assert!(
        rejected
            .iter()
            .all(|outcome| outcome.reason == Some(RejectionReason::AlreadyFound))
    );
    assert_eq!(
        store.submission_totals(puzzle.id, &alice).expect("totals"),
        SubmissionTotals {
            score: 10,
            words_found: 1
        }
    );
    let rank = aggregator
        .user_rank_fresh(&game, &alice, &Period::AllTime)
        .expect("rank");
    assert_eq!(rank, Some(Rank { rank: 1, score: 10 }));
}
