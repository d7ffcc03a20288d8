/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{path::PathBuf, str::FromStr, time::Duration};

use clap::Parser;

use crate::{Move, SearchConfig, Square, TTable, FEN_STARTPOS, LIMIT_DEPTH};

/// Command-line arguments of the engine binary.
#[derive(Debug, Clone, Parser)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Opening book to load on startup, as `lock,move,weight` lines.
    #[arg(short, long, value_name = "PATH")]
    pub book: Option<PathBuf>,

    /// Maximum depth of every search.
    #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..=LIMIT_DEPTH as u64))]
    pub depth: Option<u64>,

    /// Soft time limit of every search, in milliseconds.
    #[arg(short, long, value_name = "MS")]
    pub movetime: Option<u64>,

    /// Size of the transposition table, in megabytes.
    #[arg(long, default_value_t = TTable::DEFAULT_SIZE)]
    pub hash: usize,

    /// Log search internals to stderr.
    #[arg(long, default_value = "false")]
    pub debug: bool,
}

impl Cli {
    /// Search limits requested on the command line, with defaults for the rest.
    pub fn search_config(&self) -> SearchConfig {
        let default = SearchConfig::default();

        SearchConfig {
            max_depth: self.depth.map_or(default.max_depth, |d| d as usize),
            soft_timeout: self
                .movetime
                .map_or(default.soft_timeout, Duration::from_millis),
            hash_size: self.hash,
        }
    }
}

/// A command to be sent to the engine.
#[derive(Debug, Clone, Parser)]
#[command(
    multicall = true,
    about,
    rename_all = "lower",
    override_usage("<ENGINE COMMAND>")
)]
pub enum EngineCommand {
    /// Load an opening book, replacing the current one.
    Book { path: PathBuf },

    /// Print a visual representation of the current board state.
    #[command(alias = "d")]
    Display,

    /// Print an evaluation of the current position.
    Eval {
        /// If set, the contribution of every piece will be printed too.
        #[arg(short, long, default_value = "false")]
        pretty: bool,
    },

    /// Quit the engine.
    #[command(alias = "quit")]
    Exit,

    /// Generate and print a FEN string for the current position.
    Fen,

    /// Search the current position and play the best move found.
    Go {
        /// Override the maximum depth for this search.
        #[arg(short, long)]
        depth: Option<usize>,

        /// Override the soft time limit for this search, in milliseconds.
        #[arg(short, long)]
        movetime: Option<u64>,
    },

    /// Play a move, given in ICCS notation (such as `h2e2`).
    #[command(alias = "m")]
    Move { mv: Move },

    /// Shows all legal moves in the current position, or for a specific piece.
    Moves {
        square: Option<Square>,

        /// If set, moves will be sorted in alphabetical order.
        ///
        /// By default, moves are generated in no particular order.
        #[arg(short, long, default_value = "false")]
        sort: bool,
    },

    /// Start a new game from the starting position.
    #[command(alias = "newgame")]
    New,

    /// Set up a position from a FEN string, or `startpos`.
    Position {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true, required = true)]
        fen: Vec<String>,
    },

    /// Performs a perft on the current position at the supplied depth, printing total node count.
    Perft { depth: usize },

    /// Performs a split perft on the current position at the supplied depth.
    #[command(alias = "sperft")]
    Splitperft { depth: usize },

    /// Print whether the game is over, from the perspective of the side that moved last.
    Status,
}

impl EngineCommand {
    /// Joins the words of a `position` command back into a FEN string.
    ///
    /// `startpos` stands for the standard starting position.
    pub fn fen_string(words: &[String]) -> String {
        match words {
            [word] if word == "startpos" => FEN_STARTPOS.to_string(),
            _ => words.join(" "),
        }
    }
}

impl FromStr for EngineCommand {
    type Err = clap::Error;
    /// Attempt to parse an [`EngineCommand`] from a string.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_parse_from(s.split_ascii_whitespace())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        let cmd: EngineCommand = "move h2e2".parse().unwrap();
        assert!(matches!(cmd, EngineCommand::Move { mv } if mv.to_string() == "h2e2"));

        let cmd: EngineCommand = "go --depth 3".parse().unwrap();
        assert!(matches!(
            cmd,
            EngineCommand::Go {
                depth: Some(3),
                movetime: None
            }
        ));

        assert!(matches!(
            "d".parse::<EngineCommand>(),
            Ok(EngineCommand::Display)
        ));
        assert!("move z9z9".parse::<EngineCommand>().is_err());
        assert!("fly".parse::<EngineCommand>().is_err());
    }

    #[test]
    fn test_position_words() {
        let EngineCommand::Position { fen } = FEN_STARTPOS
            .split(' ')
            .fold(String::from("position"), |acc, word| acc + " " + word)
            .parse::<EngineCommand>()
            .unwrap()
        else {
            panic!("Not a position command");
        };
        assert_eq!(EngineCommand::fen_string(&fen), FEN_STARTPOS);

        let cmd = "position startpos".parse::<EngineCommand>().unwrap();
        let EngineCommand::Position { fen } = cmd else {
            panic!("Not a position command");
        };
        assert_eq!(EngineCommand::fen_string(&fen), FEN_STARTPOS);
    }

    #[test]
    fn test_cli_config() {
        let cli = Cli::try_parse_from(["xiangqi", "--depth", "5", "--movetime", "250"]).unwrap();
        let config = cli.search_config();
        assert_eq!(config.max_depth, 5);
        assert_eq!(config.soft_timeout, Duration::from_millis(250));
        assert_eq!(config.hash_size, TTable::DEFAULT_SIZE);

        assert!(Cli::try_parse_from(["xiangqi", "--depth", "0"]).is_err());
    }
}
