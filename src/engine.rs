/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{
    io,
    path::Path,
    sync::mpsc::{channel, Receiver, Sender},
    thread,
    time::Duration,
};

use anyhow::{bail, Context, Result};
use clap::Parser;

use crate::{
    perft, splitperft, EngineCommand, Evaluator, Game, Move, OpeningBook, Position, SearchConfig,
    Square,
};

/// The Xiangqi engine: a [`Game`] driven by text commands.
#[derive(Debug)]
pub struct Engine {
    /// The game being played, as known to the engine.
    ///
    /// This is modified whenever moves are played or new positions are given,
    /// and is reset whenever the engine is told to start a new game.
    game: Game,

    /// One half of a channel, responsible for sending commands to the engine to execute.
    sender: Sender<EngineCommand>,

    /// One half of a channel, responsible for receiving commands for the engine to execute.
    receiver: Receiver<EngineCommand>,
}

impl Engine {
    /// Constructs a new [`Engine`] instance to be executed with [`Engine::run`].
    pub fn new(config: SearchConfig) -> Self {
        let (sender, receiver) = channel();

        Self {
            game: Game::new(config),
            sender,
            receiver,
        }
    }

    /// Returns a string of the engine's name and current version.
    pub fn name(&self) -> String {
        format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
    }

    /// The game being played.
    #[inline(always)]
    pub fn game(&self) -> &Game {
        &self.game
    }

    /// Loads the opening book at `path` into the game.
    pub fn load_book(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let book = OpeningBook::load(path)?;
        self.game.set_book(book);
        Ok(())
    }

    /// Sends an [`EngineCommand`] to the engine to be executed.
    pub fn send_command(&self, command: EngineCommand) -> Result<()> {
        self.sender
            .send(command)
            .context("Failed to send command to engine")
    }

    /// Execute the main event loop for the engine.
    ///
    /// This function spawns a thread to handle input from `stdin` and waits on received commands.
    pub fn run(&mut self) -> Result<()> {
        println!("{}", self.name());

        // Spawn a separate thread for handling user input
        let sender = self.sender.clone();
        thread::spawn(|| {
            if let Err(err) = input_handler(sender) {
                log::debug!("Input handler thread stopping: {err:#}");
            }
        });

        // Loop on user input
        while let Ok(cmd) = self.receiver.recv() {
            if matches!(cmd, EngineCommand::Exit) {
                break;
            }

            // Keep running, even on error
            if let Err(e) = self.handle_command(cmd) {
                eprintln!("Error: {e:#}");
            }
        }

        Ok(())
    }

    /// Executes a single [`EngineCommand`].
    ///
    /// [`EngineCommand::Exit`] is handled by [`Engine::run`], and does nothing here.
    pub fn handle_command(&mut self, cmd: EngineCommand) -> Result<()> {
        match cmd {
            EngineCommand::Book { path } => self.load_book(path)?,

            EngineCommand::Display => self.display(),

            EngineCommand::Eval { pretty } => self.eval(pretty),

            EngineCommand::Exit => {}

            EngineCommand::Fen => println!("{}", self.game.position().to_fen()),

            EngineCommand::Go { depth, movetime } => self.go(depth, movetime),

            EngineCommand::Move { mv } => self.make_move(mv)?,

            EngineCommand::Moves { square, sort } => self.moves(square, sort),

            EngineCommand::New => self.game.new_game(),

            EngineCommand::Position { fen } => {
                let fen = EngineCommand::fen_string(&fen);
                let position = Position::from_fen(&fen)?;
                self.game.set_position(position);
            }

            EngineCommand::Perft { depth } => {
                let mut position = self.game.position().clone();
                println!("{}", perft(&mut position, depth));
            }

            EngineCommand::Splitperft { depth } => {
                let mut position = self.game.position().clone();
                let nodes = splitperft(&mut position, depth);
                println!("\n{nodes}");
            }

            EngineCommand::Status => println!("{}", self.game.status()),
        };

        Ok(())
    }

    /// Executes the `display` command, printing the current position.
    fn display(&self) {
        println!("{}", self.game.position());
    }

    /// Executes the `eval` command, printing an evaluation of the current position.
    fn eval(&self, pretty: bool) {
        let evaluator = Evaluator::new(self.game.position());
        if pretty {
            println!("{evaluator}");
        } else {
            println!("{}", evaluator.eval());
        }
    }

    /// Executes the `moves` command, printing all legal moves (optionally, only those from `square`).
    fn moves(&self, square: Option<Square>, sort: bool) {
        let mut position = self.game.position().clone();
        let mut moves = position
            .legal_moves()
            .into_iter()
            .filter(|mv| square.map_or(true, |sq| mv.src() == sq))
            .map(|mv| mv.to_string())
            .collect::<Vec<_>>();

        if sort {
            moves.sort();
        }

        // If there are none, print "(none)"
        if moves.is_empty() {
            println!("(none)");
        } else {
            println!("{}", moves.join(", "));
        }
    }

    /// Executes the `move` command, playing `mv` for the side to move.
    fn make_move(&mut self, mv: Move) -> Result<()> {
        let outcome = self.game.play(mv);
        if !outcome.accepted {
            bail!("Illegal move {mv} in {}", self.game.position().to_fen());
        }

        if outcome.status.is_over() {
            println!("status {}", outcome.status);
        }

        Ok(())
    }

    /// Executes the `go` command, searching with any overridden limits and playing the result.
    fn go(&mut self, depth: Option<usize>, movetime: Option<u64>) {
        let saved = *self.game.config();
        let mut config = saved;
        if let Some(depth) = depth {
            config.max_depth = depth;
        }
        if let Some(ms) = movetime {
            config.soft_timeout = Duration::from_millis(ms);
        }

        self.game.set_config(config);
        let mv = self.game.request_engine_move();
        self.game.set_config(saved);

        match mv {
            Some(mv) => println!("bestmove {mv}"),
            None => println!("bestmove (none)"),
        }

        let status = self.game.status();
        if status.is_over() {
            println!("status {status}");
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(SearchConfig::default())
    }
}

/// Loops endlessly to await input via `stdin`, sending all successfully-parsed commands through the supplied `sender`.
fn input_handler(sender: Sender<EngineCommand>) -> Result<()> {
    let mut buffer = String::with_capacity(256);

    loop {
        // Clear the buffer, read input, and trim the trailing newline
        buffer.clear();
        let bytes = io::stdin()
            .read_line(&mut buffer)
            .context("Failed to read line from stdin")?;

        // For ctrl + d
        if 0 == bytes {
            sender
                .send(EngineCommand::Exit)
                .context("Failed to send 'exit' command after receiving empty input")?;

            bail!("Engine received input of 0 bytes and is quitting");
        }

        // Trim any leading/trailing whitespace
        let buf = buffer.trim();

        // Ignore empty lines
        if buf.is_empty() {
            continue;
        }

        match EngineCommand::try_parse_from(buf.split_ascii_whitespace()) {
            // If successful, send the command to the engine
            Ok(cmd) => sender
                .send(cmd)
                .context("Failed to send command to engine")?,

            // If an invalid command was received, just print the error and continue running
            Err(err) => eprintln!("{err}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Terminal, FEN_STARTPOS};

    fn engine() -> Engine {
        Engine::new(SearchConfig {
            max_depth: 3,
            hash_size: 1,
            ..Default::default()
        })
    }

    fn send(engine: &mut Engine, line: &str) -> Result<()> {
        engine.handle_command(line.parse()?)
    }

    #[test]
    fn test_moves_and_positions() {
        let mut engine = engine();

        send(&mut engine, "move h2e2").unwrap();
        assert_eq!(
            engine.game().position().last_move(),
            Some(Move::from_iccs("h2e2").unwrap())
        );

        // Red can't move twice in a row
        assert!(send(&mut engine, "move e2e6").is_err());

        send(&mut engine, "new").unwrap();
        assert_eq!(engine.game().position().to_fen(), FEN_STARTPOS);

        send(&mut engine, "position 3k5/R8/9/9/9/9/9/9/9/1R2K4 w - - 0 1").unwrap();
        assert_eq!(engine.game().position().side_to_move(), crate::Side::Red);
        assert!(send(&mut engine, "position not/a/fen").is_err());
    }

    #[test]
    fn test_go_plays_a_move() {
        let mut engine = engine();
        send(&mut engine, "position 3k5/R8/9/9/9/9/9/9/9/1R2K4 w - - 0 1").unwrap();
        send(&mut engine, "go").unwrap();

        assert!(engine.game().position().last_move().is_some());
        assert_eq!(engine.game().status(), Terminal::Win);
        assert_eq!(engine.game().config().max_depth, 3);
    }
}
