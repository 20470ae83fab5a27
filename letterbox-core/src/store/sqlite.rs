//! SQLite-backed implementation of every repository trait.

use std::fmt;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use camino::Utf8Path;
use chrono::NaiveDate;
use letterbox_fs::ensure_parent_dir;
use rusqlite::{Connection, OptionalExtension, Row, Transaction};

use super::{
    Insertion, LeaderboardStore, PuzzleStore, StoreError, SubmissionStore, distinct_words,
};
use crate::model::{
    ActorId, GameId, LeaderboardEntry, NewPuzzle, Puzzle, PuzzleId, Standing, Submission,
    SubmissionTotals, Word,
};
use crate::period::Period;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// How long a connection waits for another writer's lock.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// `SQLite` treats NULLs as distinct inside unique constraints, so the
/// all-time period is stored with an empty key.
const ALL_TIME_KEY: &str = "";

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS puzzles (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    letters TEXT NOT NULL,
    date TEXT NOT NULL UNIQUE,
    possible_word_count INTEGER NOT NULL
);
CREATE TABLE IF NOT EXISTS words (
    puzzle_id INTEGER NOT NULL REFERENCES puzzles (id) ON DELETE CASCADE,
    text TEXT NOT NULL,
    score INTEGER NOT NULL,
    PRIMARY KEY (puzzle_id, text)
);
CREATE TABLE IF NOT EXISTS submissions (
    puzzle_id INTEGER NOT NULL,
    actor_id TEXT NOT NULL,
    text TEXT NOT NULL,
    score INTEGER NOT NULL,
    submitted_at TEXT NOT NULL,
    PRIMARY KEY (puzzle_id, actor_id, text),
    FOREIGN KEY (puzzle_id, text) REFERENCES words (puzzle_id, text)
);
CREATE TABLE IF NOT EXISTS leaderboard_entries (
    game_id TEXT NOT NULL,
    actor_id TEXT NOT NULL,
    period_type TEXT NOT NULL,
    period_key TEXT NOT NULL,
    score INTEGER NOT NULL,
    PRIMARY KEY (game_id, actor_id, period_type, period_key)
);
CREATE INDEX IF NOT EXISTS leaderboard_ranking
    ON leaderboard_entries (game_id, period_type, period_key, score DESC);
";

/// Store backed by a single `SQLite` connection.
///
/// The connection is guarded by a `Mutex`, so the store is `Send + Sync`
/// and statements from concurrent callers are serialised. Tables are
/// created on open when missing.
pub struct SqliteStore {
    connection: Mutex<Connection>,
}

impl fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteStore").finish_non_exhaustive()
    }
}

impl SqliteStore {
    /// Open (or create) a database file, creating parent directories as
    /// needed.
    ///
    /// # Errors
    /// Returns [`StoreError`] when the directory cannot be created, the
    /// database cannot be opened or the schema cannot be applied.
    pub fn open(path: &Utf8Path) -> Result<Self, StoreError> {
        ensure_parent_dir(path).map_err(|source| StoreError::CreateDirectory {
            path: path.to_string(),
            source,
        })?;
        let connection =
            Connection::open(path.as_std_path()).map_err(|source| StoreError::OpenDatabase {
                path: path.to_string(),
                source,
            })?;
        Self::from_connection(connection)
    }

    /// Open a private in-memory database.
    ///
    /// # Errors
    /// Returns [`StoreError`] when the schema cannot be applied.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let connection =
            Connection::open_in_memory().map_err(|source| StoreError::OpenDatabase {
                path: ":memory:".to_owned(),
                source,
            })?;
        Self::from_connection(connection)
    }

    fn from_connection(connection: Connection) -> Result<Self, StoreError> {
        connection
            .busy_timeout(BUSY_TIMEOUT)
            .map_err(query_error("set SQLite busy timeout"))?;
        connection
            .pragma_update(None, "foreign_keys", true)
            .map_err(query_error("enable SQLite foreign keys"))?;
        connection
            .execute_batch(SCHEMA)
            .map_err(query_error("create letterbox schema"))?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.connection.lock().map_err(|_| StoreError::Poisoned)
    }
}

fn query_error(operation: &'static str) -> impl FnOnce(rusqlite::Error) -> StoreError {
    move |source| StoreError::Query { operation, source }
}

fn to_sql_int(field: &'static str, value: u64) -> Result<i64, StoreError> {
    i64::try_from(value).map_err(|_| StoreError::OutOfRange {
        field,
        value: value.to_string(),
    })
}

fn from_sql_int<T: TryFrom<i64>>(field: &'static str, value: i64) -> Result<T, StoreError> {
    T::try_from(value).map_err(|_| StoreError::OutOfRange {
        field,
        value: value.to_string(),
    })
}

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn parse_date(raw: &str) -> Result<NaiveDate, StoreError> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|_| StoreError::Decode {
        field: "date",
        value: raw.to_owned(),
    })
}

fn parse_actor(raw: String) -> Result<ActorId, StoreError> {
    ActorId::new(raw.clone()).map_err(|_| StoreError::Decode {
        field: "actor_id",
        value: raw,
    })
}

fn period_columns(period: &Period) -> (&'static str, String) {
    (
        period.period_type().as_str(),
        period.key().unwrap_or_else(|| ALL_TIME_KEY.to_owned()),
    )
}

struct PuzzleRow {
    id: i64,
    letters: String,
    date: String,
    possible_word_count: i64,
}

impl PuzzleRow {
    const COLUMNS: &'static str = "id, letters, date, possible_word_count";

    fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            letters: row.get(1)?,
            date: row.get(2)?,
            possible_word_count: row.get(3)?,
        })
    }

    fn into_puzzle(self) -> Result<Puzzle, StoreError> {
        Ok(Puzzle {
            id: PuzzleId(self.id),
            letters: self.letters,
            date: parse_date(&self.date)?,
            possible_word_count: from_sql_int("possible_word_count", self.possible_word_count)?,
        })
    }
}

fn find_puzzle_where(
    connection: &Connection,
    clause: &str,
    value: &dyn rusqlite::ToSql,
) -> Result<Option<Puzzle>, StoreError> {
    let query = format!("SELECT {} FROM puzzles WHERE {clause}", PuzzleRow::COLUMNS);
    connection
        .query_row(&query, [value], PuzzleRow::read)
        .optional()
        .map_err(query_error("look up puzzle"))?
        .map(PuzzleRow::into_puzzle)
        .transpose()
}

fn insert_words(
    transaction: &Transaction<'_>,
    puzzle_id: i64,
    puzzle: &NewPuzzle,
) -> Result<u32, StoreError> {
    let words = distinct_words(puzzle);
    let mut statement = transaction
        .prepare("INSERT INTO words (puzzle_id, text, score) VALUES (?1, ?2, ?3)")
        .map_err(query_error("prepare word insert"))?;
    for word in &words {
        statement
            .execute((puzzle_id, word.text.as_str(), i64::from(word.score)))
            .map_err(query_error("insert puzzle word"))?;
    }
    Ok(u32::try_from(words.len()).unwrap_or(u32::MAX))
}

impl PuzzleStore for SqliteStore {
    fn find_puzzle(&self, id: PuzzleId) -> Result<Option<Puzzle>, StoreError> {
        let connection = self.lock()?;
        find_puzzle_where(&connection, "id = ?1", &id.0)
    }

    fn find_puzzle_by_date(&self, date: NaiveDate) -> Result<Option<Puzzle>, StoreError> {
        let connection = self.lock()?;
        find_puzzle_where(&connection, "date = ?1", &format_date(date))
    }

    fn create_puzzle(&self, puzzle: &NewPuzzle) -> Result<Insertion<Puzzle>, StoreError> {
        let mut connection = self.lock()?;
        let transaction = connection
            .transaction()
            .map_err(query_error("begin puzzle transaction"))?;

        let date = format_date(puzzle.date);
        let inserted = transaction
            .execute(
                "INSERT INTO puzzles (letters, date, possible_word_count) VALUES (?1, ?2, 0)
                 ON CONFLICT (date) DO NOTHING",
                (puzzle.letters.as_str(), date.as_str()),
            )
            .map_err(query_error("insert puzzle"))?;
        if inserted == 0 {
            // Dropping the transaction rolls it back.
            return Ok(Insertion::Conflict);
        }

        let id = transaction.last_insert_rowid();
        let count = insert_words(&transaction, id, puzzle)?;
        transaction
            .execute(
                "UPDATE puzzles SET possible_word_count = ?1 WHERE id = ?2",
                (i64::from(count), id),
            )
            .map_err(query_error("record possible word count"))?;
        transaction
            .commit()
            .map_err(query_error("commit puzzle transaction"))?;

        Ok(Insertion::Inserted(Puzzle {
            id: PuzzleId(id),
            letters: puzzle.letters.clone(),
            date: puzzle.date,
            possible_word_count: count,
        }))
    }

    fn find_word(&self, puzzle_id: PuzzleId, text: &str) -> Result<Option<Word>, StoreError> {
        let connection = self.lock()?;
        let row: Option<(String, i64)> = connection
            .query_row(
                "SELECT text, score FROM words WHERE puzzle_id = ?1 AND text = ?2",
                (puzzle_id.0, text.to_lowercase()),
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()
            .map_err(query_error("look up word"))?;
        row.map(|(text, score)| {
            Ok(Word {
                puzzle_id,
                text,
                score: from_sql_int("score", score)?,
            })
        })
        .transpose()
    }

    fn words_for_puzzle(&self, puzzle_id: PuzzleId) -> Result<Vec<Word>, StoreError> {
        let connection = self.lock()?;
        let mut statement = connection
            .prepare("SELECT text, score FROM words WHERE puzzle_id = ?1 ORDER BY text")
            .map_err(query_error("prepare word listing"))?;
        let rows = statement
            .query_map([puzzle_id.0], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
            })
            .map_err(query_error("list puzzle words"))?;

        let mut words = Vec::new();
        for row in rows {
            let (text, score) = row.map_err(query_error("read word row"))?;
            words.push(Word {
                puzzle_id,
                text,
                score: from_sql_int("score", score)?,
            });
        }
        Ok(words)
    }
}

impl SubmissionStore for SqliteStore {
    fn insert_submission(
        &self,
        submission: &Submission,
    ) -> Result<Insertion<Submission>, StoreError> {
        let connection = self.lock()?;
        let text = submission.text.to_lowercase();
        let inserted = connection
            .execute(
                "INSERT INTO submissions (puzzle_id, actor_id, text, score, submitted_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT (puzzle_id, actor_id, text) DO NOTHING",
                (
                    submission.puzzle_id.0,
                    submission.actor.as_str(),
                    text.as_str(),
                    i64::from(submission.score),
                    submission.submitted_at.to_rfc3339(),
                ),
            )
            .map_err(query_error("insert submission"))?;
        if inserted == 0 {
            return Ok(Insertion::Conflict);
        }
        Ok(Insertion::Inserted(Submission {
            text,
            ..submission.clone()
        }))
    }

    fn submission_totals(
        &self,
        puzzle_id: PuzzleId,
        actor: &ActorId,
    ) -> Result<SubmissionTotals, StoreError> {
        let connection = self.lock()?;
        let (score, words_found): (i64, i64) = connection
            .query_row(
                "SELECT COALESCE(SUM(score), 0), COUNT(*) FROM submissions
                 WHERE puzzle_id = ?1 AND actor_id = ?2",
                (puzzle_id.0, actor.as_str()),
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .map_err(query_error("total submissions"))?;
        Ok(SubmissionTotals {
            score: from_sql_int("score", score)?,
            words_found: from_sql_int("words_found", words_found)?,
        })
    }
}

impl LeaderboardStore for SqliteStore {
    fn raise_score(
        &self,
        game: &GameId,
        actor: &ActorId,
        period: &Period,
        score: u64,
    ) -> Result<u64, StoreError> {
        let connection = self.lock()?;
        let (period_type, period_key) = period_columns(period);
        let stored: i64 = connection
            .query_row(
                "INSERT INTO leaderboard_entries (game_id, actor_id, period_type, period_key, score)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT (game_id, actor_id, period_type, period_key)
                 DO UPDATE SET score = MAX(score, excluded.score)
                 RETURNING score",
                (
                    game.as_str(),
                    actor.as_str(),
                    period_type,
                    period_key.as_str(),
                    to_sql_int("score", score)?,
                ),
                |row| row.get(0),
            )
            .map_err(query_error("raise leaderboard score"))?;
        from_sql_int("score", stored)
    }

    fn top_scores(
        &self,
        game: &GameId,
        period: &Period,
        limit: usize,
    ) -> Result<Vec<Standing>, StoreError> {
        let connection = self.lock()?;
        let (period_type, period_key) = period_columns(period);
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let mut statement = connection
            .prepare(
                "SELECT actor_id, score FROM leaderboard_entries
                 WHERE game_id = ?1 AND period_type = ?2 AND period_key = ?3
                 ORDER BY score DESC, actor_id ASC
                 LIMIT ?4",
            )
            .map_err(query_error("prepare leaderboard listing"))?;
        let rows = statement
            .query_map(
                (game.as_str(), period_type, period_key.as_str(), limit),
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)),
            )
            .map_err(query_error("list leaderboard"))?;

        let mut standings = Vec::new();
        for row in rows {
            let (actor, score) = row.map_err(query_error("read leaderboard row"))?;
            standings.push(Standing {
                actor: parse_actor(actor)?,
                score: from_sql_int("score", score)?,
            });
        }
        Ok(standings)
    }

    fn find_entry(
        &self,
        game: &GameId,
        actor: &ActorId,
        period: &Period,
    ) -> Result<Option<LeaderboardEntry>, StoreError> {
        let connection = self.lock()?;
        let (period_type, period_key) = period_columns(period);
        let score: Option<i64> = connection
            .query_row(
                "SELECT score FROM leaderboard_entries
                 WHERE game_id = ?1 AND actor_id = ?2 AND period_type = ?3 AND period_key = ?4",
                (game.as_str(), actor.as_str(), period_type, period_key.as_str()),
                |row| row.get(0),
            )
            .optional()
            .map_err(query_error("look up leaderboard entry"))?;
        score
            .map(|raw| {
                Ok(LeaderboardEntry {
                    game: game.clone(),
                    actor: actor.clone(),
                    period: *period,
                    score: from_sql_int("score", raw)?,
                })
            })
            .transpose()
    }

    fn count_higher(
        &self,
        game: &GameId,
        period: &Period,
        score: u64,
    ) -> Result<u64, StoreError> {
        let connection = self.lock()?;
        let (period_type, period_key) = period_columns(period);
        let count: i64 = connection
            .query_row(
                "SELECT COUNT(*) FROM leaderboard_entries
                 WHERE game_id = ?1 AND period_type = ?2 AND period_key = ?3 AND score > ?4",
                (
                    game.as_str(),
                    period_type,
                    period_key.as_str(),
                    to_sql_int("score", score)?,
                ),
                |row| row.get(0),
            )
            .map_err(query_error("count higher scores"))?;
        from_sql_int("count", count)
    }
}
