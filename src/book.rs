/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{fs, path::Path, str::FromStr};

use anyhow::{bail, Context, Result};
use rand::Rng;

use crate::{Move, Position, MAX_NUM_MOVES};

/// One candidate move for a position in the opening book.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookEntry {
    /// Second lock word of the position's [`ZobristKey`](crate::ZobristKey).
    pub lock: u32,

    /// The move to play.
    pub mv: Move,

    /// Relative likelihood of choosing this move.
    pub weight: u32,
}

impl FromStr for BookEntry {
    type Err = anyhow::Error;

    /// Parses a `lock,move,weight` record.
    ///
    /// `move` (the move's raw encoding) and `weight` are both 16-bit signed integers, so most
    /// moves read as negative numbers. Negative weights are treated as zero.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields = s.split(',').map(str::trim).collect::<Vec<_>>();
        let &[lock, mv, weight] = fields.as_slice() else {
            bail!("Expected 3 comma-separated fields, found {}", fields.len());
        };

        let lock = lock
            .parse::<u32>()
            .with_context(|| format!("Invalid lock {lock:?}"))?;
        let mv = mv
            .parse::<i16>()
            .with_context(|| format!("Invalid move {mv:?}"))?;
        let weight = weight
            .parse::<i16>()
            .with_context(|| format!("Invalid weight {weight:?}"))?;

        Ok(Self {
            lock,
            mv: Move::from_bits(mv as u16),
            weight: weight.max(0) as u32,
        })
    }
}

/// A table of known-good opening moves, keyed by position.
///
/// Only one side of each left-right symmetric pair of positions needs to be stored:
/// lookups that miss are retried on the mirrored position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OpeningBook {
    /// All entries, sorted by lock.
    entries: Vec<BookEntry>,
}

impl OpeningBook {
    /// Loads a book from a text file of `lock,move,weight` lines.
    ///
    /// Malformed lines are logged and skipped.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read opening book {}", path.display()))?;

        let book = Self::from_entries(Self::parse_lines(&contents));
        log::info!("Loaded {} book entries from {}", book.len(), path.display());
        Ok(book)
    }

    /// Builds a book from any list of entries.
    pub fn from_entries(entries: impl IntoIterator<Item = BookEntry>) -> Self {
        let mut entries = entries.into_iter().collect::<Vec<_>>();
        entries.sort_by_key(|entry| entry.lock);
        Self { entries }
    }

    /// Parses every well-formed, non-blank line of `contents`.
    fn parse_lines(contents: &str) -> Vec<BookEntry> {
        contents
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .filter_map(|(i, line)| match line.parse() {
                Ok(entry) => Some(entry),
                Err(e) => {
                    log::warn!("Skipping book line {}: {e:#}", i + 1);
                    None
                }
            })
            .collect()
    }

    /// Number of entries in the book.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the book has no entries.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries stored under `lock`.
    fn entries_for(&self, lock: u32) -> &[BookEntry] {
        let start = self.entries.partition_point(|entry| entry.lock < lock);
        let end = self.entries.partition_point(|entry| entry.lock <= lock);
        &self.entries[start..end]
    }

    /// Every book move for `position` that passes [`Position::legal_move`], with its weight.
    ///
    /// If `position` itself is not in the book, its mirror image is tried and the moves
    /// found are mirrored back.
    pub fn candidates(&self, position: &Position) -> Vec<(Move, u32)> {
        let mut mirrored = false;
        let mut entries = self.entries_for(position.key().lock1());

        if entries.is_empty() {
            mirrored = true;
            entries = self.entries_for(position.mirror().key().lock1());
        }

        entries
            .iter()
            .map(|entry| {
                let mv = if mirrored { entry.mv.mirror() } else { entry.mv };
                (mv, entry.weight)
            })
            .filter(|&(mv, _)| position.legal_move(mv))
            .take(MAX_NUM_MOVES)
            .collect()
    }

    /// Picks a book move for `position` at random, weighted by each move's weight.
    ///
    /// Returns `None` if the position is not in the book, none of its moves are legal, or
    /// all of their weights are zero.
    pub fn probe(&self, position: &Position, rng: &mut impl Rng) -> Option<Move> {
        let candidates = self.candidates(position);
        let total = candidates
            .iter()
            .map(|&(_, weight)| weight as u64)
            .sum::<u64>();

        if total == 0 {
            return None;
        }

        let mut pick = rng.random_range(0..total);
        for (mv, weight) in candidates {
            if pick < weight as u64 {
                return Some(mv);
            }
            pick -= weight as u64;
        }

        None
    }
}

impl FromStr for OpeningBook {
    type Err = anyhow::Error;

    /// Parses a book from the contents of a book file. Malformed lines are skipped.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_entries(Self::parse_lines(s)))
    }
}
