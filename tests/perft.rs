/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use xiangqi::{perft, perft_generic, Position, FEN_STARTPOS};

fn test_perft_fen_nodes(depth: usize, fen: &str, expected: u64) {
    let mut position = Position::from_fen(fen).unwrap();
    let before = position.clone();

    let res = perft(&mut position, depth);
    assert_eq!(res, expected, "PERFT({depth}) failed on {fen}");
    assert_eq!(position, before, "PERFT({depth}) did not restore {fen}");

    // Without bulk counting, every leaf is visited
    let res = perft_generic::<false, false>(&mut position, depth);
    assert_eq!(res, expected, "PERFT({depth}) without bulk counting failed on {fen}");
}

#[test]
fn test_startpos_perft() {
    test_perft_fen_nodes(1, FEN_STARTPOS, 44);
    test_perft_fen_nodes(2, FEN_STARTPOS, 1_920);
    test_perft_fen_nodes(3, FEN_STARTPOS, 79_666);
}

#[test]
fn test_mirrored_startpos_perft() {
    let mut position = Position::startpos().mirror();
    assert_eq!(perft(&mut position, 2), 1_920);
}
