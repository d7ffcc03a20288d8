/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use xiangqi::{Game, Move, Position, SearchConfig, Square, Terminal};

fn game_from(fen: &str) -> Game {
    let mut game = Game::new(SearchConfig {
        max_depth: 3,
        hash_size: 1,
        ..Default::default()
    });
    game.set_position(Position::from_fen(fen).unwrap());
    game
}

/// Plays `moves` in a loop until the game ends, returning the status and the number of moves played.
fn play_cycle(game: &mut Game, moves: &[&str]) -> (Terminal, usize) {
    for (played, mv) in moves.iter().cycle().take(40).enumerate() {
        let outcome = game.play(Move::from_iccs(mv).unwrap());
        assert!(outcome.accepted, "{mv} was rejected after {played} moves");

        if outcome.status.is_over() {
            return (outcome.status, played + 1);
        }
    }

    (game.status(), 40)
}

#[test]
fn test_perpetual_check_loses() {
    // Red's Chariot checks on every move while the Black King steps up and down
    let mut game = game_from("9/4k4/R8/9/9/9/9/9/9/3K5 w - - 0 1");
    assert!(game.play(Move::from_iccs("a7a8").unwrap()).accepted);

    // The fourth time Black faces the same check, Red (the last mover) has lost
    let (status, played) = play_cycle(&mut game, &["e8e9", "a8a9", "e9e8", "a9a8"]);
    assert_eq!(status, Terminal::Loss);
    assert_eq!(played, 12);
}

#[test]
fn test_quiet_repetition_draws() {
    let mut game = game_from("9/4k4/9/9/9/9/9/9/9/3K5 w - - 0 1");
    let (status, _) = play_cycle(&mut game, &["d0d1", "e8e9", "d1d0", "e9e8"]);
    assert_eq!(status, Terminal::Draw);

    // Game over; nothing more can be played
    let outcome = game.attempt_move("d0".parse::<Square>().unwrap(), "d1".parse().unwrap());
    assert!(!outcome.accepted);
    assert_eq!(outcome.status, Terminal::Draw);
}

#[test]
fn test_engine_finds_mate() {
    let mut game = game_from("3k5/R8/9/9/9/9/9/9/9/1R2K4 w - - 0 1");
    assert!(game.request_engine_move().is_some());
    assert_eq!(game.status(), Terminal::Win);
    assert_eq!(game.request_engine_move(), None);
}

#[test]
fn test_elephants_develop_from_startpos() {
    let mut game = Game::default();
    let (c0, e2) = ("c0".parse::<Square>().unwrap(), "e2".parse::<Square>().unwrap());
    let outcome = game.attempt_move(c0, e2);
    assert!(outcome.accepted);
    assert_eq!(outcome.status, Terminal::None);

    // Black answers in kind
    let outcome = game.attempt_move("g9".parse().unwrap(), "e7".parse().unwrap());
    assert!(outcome.accepted);

    // Elephants only move two points diagonally
    assert!(!game.attempt_move(e2, "e4".parse().unwrap()).accepted);
    assert!(game.attempt_move(e2, "c4".parse().unwrap()).accepted);
}
