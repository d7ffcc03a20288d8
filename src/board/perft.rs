/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use super::Position;

/// Perform a perft at the specified depth, collecting only data about the number of possible positions (nodes).
///
/// This performs bulk counting, meaning that, at depth 1, it returns the number of legal moves,
/// rather than making them, recursing again, and returning 1 for each terminal case.
#[inline(always)]
pub fn perft(position: &mut Position, depth: usize) -> u64 {
    perft_generic::<true, false>(position, depth)
}

/// Perform a splitperft at the specified depth, printing the number of nodes reachable after
/// each move available at the root node.
#[inline(always)]
pub fn splitperft(position: &mut Position, depth: usize) -> u64 {
    perft_generic::<true, true>(position, depth)
}

/// Generic version of `perft` that allows you to specify whether to perform bulk counting and splitperft.
///
/// If `BULK` is set to `true`, this will perform bulk counting.
/// If `SPLIT` is set to `true`, this will perform a splitperft.
pub fn perft_generic<const BULK: bool, const SPLIT: bool>(
    position: &mut Position,
    depth: usize,
) -> u64 {
    // Bulk counting; no need to recurse again just to apply a singular move and return 1.
    if BULK && !SPLIT && depth == 1 {
        return position.legal_moves().len() as u64;
    }
    // Recursion limit; return 1, since we're fathoming this node.
    else if depth == 0 {
        return 1;
    }

    let mut nodes = 0;
    for mv in position.generate_moves(false) {
        if !position.make_move(mv) {
            continue;
        }

        let new_nodes = perft_generic::<BULK, false>(position, depth - 1);
        position.undo_make_move();

        if SPLIT {
            println!("{mv}\t{new_nodes}");
        }

        nodes += new_nodes;
    }

    nodes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bulk_matches_full_count() {
        let mut pos = Position::startpos();
        let bulk = perft_generic::<true, false>(&mut pos, 2);
        let full = perft_generic::<false, false>(&mut pos, 2);
        assert_eq!(bulk, full);
        assert_eq!(pos, Position::startpos());
    }
}
