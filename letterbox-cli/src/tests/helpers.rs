//! Test helpers for building CLI workspaces on disk.

use camino::Utf8PathBuf;
use chrono::NaiveDate;
use letterbox_core::{Insertion, NewPuzzle, Puzzle, PuzzleStore, ScoredWord, score_word};
use tempfile::TempDir;

use super::*;

pub(super) const ARTESNI_WORDS: &[&str] = &["rats", "star", "arts", "tears", "rains", "retains"];

/// A temporary directory holding a database and a word list.
pub(super) struct Workspace {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl Workspace {
    pub(super) fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 workspace");
        Self { _dir: dir, root }
    }

    pub(super) fn database(&self) -> Utf8PathBuf {
        self.root.join("letterbox.db")
    }

    pub(super) fn path(&self, name: &str) -> Utf8PathBuf {
        self.root.join(name)
    }

    pub(super) fn write_word_list(&self, words: &[&str]) -> Utf8PathBuf {
        let path = self.root.join("words.txt");
        let mut contents = words.join("\n");
        contents.push('\n');
        std::fs::write(path.as_std_path(), contents).expect("write word list");
        path
    }

    /// Persist the ARTESNI puzzle for `date` directly through the store.
    pub(super) fn seed_artesni(&self, date: NaiveDate) -> Puzzle {
        let store = open_store(&self.database()).expect("open store");
        let words = ARTESNI_WORDS
            .iter()
            .map(|&text| ScoredWord {
                text: text.to_owned(),
                score: score_word(text),
            })
            .collect();
        let created = store
            .create_puzzle(&NewPuzzle {
                letters: "artesni".to_owned(),
                date,
                words,
            })
            .expect("create puzzle");
        match created {
            Insertion::Inserted(puzzle) => puzzle,
            Insertion::Conflict => panic!("puzzle for {date} already seeded"),
        }
    }
}

pub(super) fn day(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, day).expect("valid date")
}

pub(super) fn output_json(bytes: &[u8]) -> serde_json::Value {
    serde_json::from_slice(bytes).expect("command output is JSON")
}
