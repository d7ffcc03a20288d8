/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

/// Magnitude of a mate score at the root.
macro_rules! mate_value {
    () => {
        10_000
    };
}
pub(crate) use mate_value;

/// Contempt for a draw, awarded to whichever side is not to move at an even ply.
macro_rules! draw_value {
    () => {
        20
    };
}
pub(crate) use draw_value;

/// Bonus for having the move, added to every static evaluation.
macro_rules! advanced_value {
    () => {
        3
    };
}
pub(crate) use advanced_value;

/// Material (excluding the opponent's) the side to move needs before a null move is tried.
macro_rules! null_margin {
    () => {
        400
    };
}
pub(crate) use null_margin;

/// Extra depth reduction applied to the null move search.
macro_rules! null_depth {
    () => {
        2
    };
}
pub(crate) use null_depth;

/// Mask applied to random draws when jittering root scores.
macro_rules! random_mask {
    () => {
        7
    };
}
pub(crate) use random_mask;

/// Number of reversible plies after which a game is drawn.
macro_rules! natural_limit {
    () => {
        100
    };
}
pub(crate) use natural_limit;

/// Default soft time limit of a search, in milliseconds.
macro_rules! soft_timeout_ms {
    () => {
        1_000
    };
}
pub(crate) use soft_timeout_ms;
