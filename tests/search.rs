/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::time::{Duration, Instant};

use xiangqi::{Move, Position, Score, Search, SearchConfig, SearchContext};

fn config(max_depth: usize, soft_timeout: Duration) -> SearchConfig {
    SearchConfig {
        max_depth,
        soft_timeout,
        hash_size: 1,
    }
}

#[test]
fn test_black_mate_in_1() {
    // Mirror image of Red's back rank mate: a Black Chariot drops to the d-file
    let mut pos = Position::from_fen("1r2k4/9/9/9/9/9/9/9/r8/3K5 b - - 0 1").unwrap();
    let mut ctx = SearchContext::new(1);

    let res = Search::new(&mut pos, &mut ctx, config(6, Duration::from_secs(60))).start();
    assert_eq!(res.score, Score::MATE - 1, "{res:#?}");

    assert!(pos.make_move(res.bestmove.unwrap()));
    assert!(pos.is_mate());
}

#[test]
fn test_soft_timeout_stops_deepening() {
    let mut pos = Position::startpos();
    let mut ctx = SearchContext::new(1);
    let timeout = Duration::from_millis(1);

    let starttime = Instant::now();
    let res = Search::new(&mut pos, &mut ctx, config(64, timeout)).start();

    // The first iteration always completes, and no iteration starts after the timeout
    assert!(res.depth >= 1 && res.depth < 64, "{res:#?}");
    assert!(res.bestmove.is_some());
    assert!(starttime.elapsed() < Duration::from_secs(30));
    assert_eq!(pos, Position::startpos());
}

#[test]
fn test_result_is_a_legal_move() {
    let fen = "r1ba1a3/4kn3/2n1b4/pNp1p1p1p/4c4/6P2/P1P2R2P/1CcC5/9/2BAKAB2 w - - 0 1";
    let mut pos = Position::from_fen(fen).unwrap();
    let mut ctx = SearchContext::new(1);

    let res = Search::new(&mut pos, &mut ctx, config(3, Duration::from_secs(60))).start();
    let mv: Move = res.bestmove.unwrap();
    assert!(pos.legal_moves().contains(&mv));
    assert_eq!(res.depth, 3);
    assert!(res.nodes > 0);
    assert_eq!(pos.to_fen(), fen);
}
