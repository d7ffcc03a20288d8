/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{fs, path::PathBuf};

use xiangqi::{Game, Move, OpeningBook, Position, Rc4, SearchConfig};

fn iccs(s: &str) -> Move {
    Move::from_iccs(s).unwrap()
}

/// Writes `contents` to a file unique to this test, returning its path.
fn book_file(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("xiangqi-{}-{name}.txt", std::process::id()));
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_load_book_file() {
    let lock = Position::startpos().key().lock1();
    let contents = format!(
        "{lock},{},3\n{lock},{},1\ngarbage\n",
        iccs("h2e2").bits() as i16,
        iccs("b2e2").bits() as i16
    );
    let path = book_file("load", &contents);

    let book = OpeningBook::load(&path).unwrap();
    fs::remove_file(&path).unwrap();
    assert_eq!(book.len(), 2);

    let pos = Position::startpos();
    let mut rng = Rc4::new();
    for _ in 0..16 {
        let mv = book.probe(&pos, &mut rng).unwrap();
        assert!(mv == iccs("h2e2") || mv == iccs("b2e2"));
    }
}

#[test]
fn test_missing_book_file() {
    let path = std::env::temp_dir().join("xiangqi-this-book-does-not-exist.txt");
    assert!(OpeningBook::load(path).is_err());
}

#[test]
fn test_engine_plays_from_book() {
    let startpos = Position::startpos();
    let contents = format!(
        "{},{},1\n",
        startpos.key().lock1(),
        iccs("b2e2").bits() as i16
    );
    let book: OpeningBook = contents.parse().unwrap();

    let config = SearchConfig {
        max_depth: 2,
        hash_size: 1,
        ..Default::default()
    };
    let mut game = Game::new(config).with_book(book);

    assert_eq!(game.request_engine_move(), Some(iccs("b2e2")));
    assert_eq!(game.position().last_move(), Some(iccs("b2e2")));
}
