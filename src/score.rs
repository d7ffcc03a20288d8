/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use crate::tune;

pub type ScoreInternal = i32;

/// A numerical evaluation of a position, relative to the side to move.
///
/// Scores above [`Score::WIN`] are wins for the side to move (mates, or the opponent being
/// forced into perpetual check), scores below `-WIN` are losses.
#[derive(Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Score(ScoreInternal);

impl Score {
    /// Score of being mated in the current position.
    pub const MATE: Self = Self(tune::mate_value!());

    /// Anything beyond this is a perpetual-check ban or a mate.
    pub const BAN: Self = Self(tune::mate_value!() - 100);

    /// Anything beyond this is decisive.
    pub const WIN: Self = Self(tune::mate_value!() - 200);

    /// Score of a neutral draw.
    pub const DRAW: Self = Self(0);

    /// Initial value of alpha in alpha-beta pruning.
    pub const ALPHA: Self = Self(-tune::mate_value!());

    /// Initial value of beta in alpha-beta pruning.
    pub const BETA: Self = Self(tune::mate_value!());

    /// Constructs a new [`Score`] instance.
    #[inline(always)]
    pub const fn new(score: ScoreInternal) -> Self {
        Self(score)
    }

    /// Inner value of this score.
    #[inline(always)]
    pub const fn inner(self) -> ScoreInternal {
        self.0
    }

    /// Score for the side to move having been mated `ply` plies from the root.
    #[inline(always)]
    pub const fn mated_in(ply: usize) -> Self {
        Self(ply as ScoreInternal - Self::MATE.0)
    }

    /// Returns `true` if the score is decisive (mate or perpetual-check ban).
    #[inline(always)]
    pub const fn is_decisive(&self) -> bool {
        self.0.abs() > Self::WIN.0
    }

    /// Returns `true` if the score comes from a perpetual-check ruling rather than a mate.
    ///
    /// These depend on the path taken to reach a position, so they are never trusted from the
    /// transposition table.
    #[inline(always)]
    pub const fn is_ban(&self) -> bool {
        let abs = self.0.abs();
        abs > Self::WIN.0 && abs < Self::BAN.0
    }

    /// Returns `true` if the score is a mate score.
    #[inline(always)]
    pub const fn is_mate(&self) -> bool {
        self.is_decisive() && !self.is_ban()
    }

    /// Returns the number of plies this score is from mate.
    #[inline(always)]
    pub const fn plies_to_mate(&self) -> ScoreInternal {
        Self::MATE.0 - self.0.abs()
    }

    /// Normalize a decisive score found at `ply` so that it is relative to the node it is stored for.
    #[inline(always)]
    pub fn relative(self, ply: usize) -> Self {
        let ply = ply as ScoreInternal;
        if self > Self::WIN {
            self + ply
        } else if self < -Self::WIN {
            self - ply
        } else {
            self
        }
    }

    /// De-normalize a decisive score so that it is relative to the root again.
    #[inline(always)]
    pub fn absolute(self, ply: usize) -> Self {
        let ply = ply as ScoreInternal;
        if self > Self::WIN {
            self - ply
        } else if self < -Self::WIN {
            self + ply
        } else {
            self
        }
    }

    /// Returns the absolute value of this [`Score`].
    #[inline(always)]
    pub const fn abs(self) -> Self {
        Self(self.0.abs())
    }
}

macro_rules! impl_binary_op {
    ($trait:tt, $fn:ident) => {
        impl std::ops::$trait for Score {
            type Output = Self;

            #[inline(always)]
            fn $fn(self, rhs: Self) -> Self::Output {
                Self(self.0.$fn(rhs.0))
            }
        }

        impl std::ops::$trait<ScoreInternal> for Score {
            type Output = Self;

            #[inline(always)]
            fn $fn(self, rhs: ScoreInternal) -> Self::Output {
                Self(self.0.$fn(rhs))
            }
        }

        impl std::ops::$trait<Score> for ScoreInternal {
            type Output = Score;

            #[inline(always)]
            fn $fn(self, rhs: Score) -> Self::Output {
                Score(self.$fn(rhs.0))
            }
        }
    };
}

macro_rules! impl_binary_op_assign {
    ($trait:tt, $fn:ident) => {
        impl std::ops::$trait for Score {
            #[inline(always)]
            fn $fn(&mut self, rhs: Self) {
                self.0.$fn(rhs.0);
            }
        }

        impl std::ops::$trait<ScoreInternal> for Score {
            #[inline(always)]
            fn $fn(&mut self, rhs: ScoreInternal) {
                self.0.$fn(rhs);
            }
        }
    };
}

impl_binary_op!(Add, add);
impl_binary_op!(Sub, sub);

impl_binary_op_assign!(AddAssign, add_assign);
impl_binary_op_assign!(SubAssign, sub_assign);

impl std::ops::Neg for Score {
    type Output = Self;

    #[inline(always)]
    fn neg(self) -> Self::Output {
        Self(self.0.neg())
    }
}

impl PartialEq<ScoreInternal> for Score {
    #[inline(always)]
    fn eq(&self, other: &ScoreInternal) -> bool {
        self.0.eq(other)
    }
}

impl PartialOrd<ScoreInternal> for Score {
    #[inline(always)]
    fn partial_cmp(&self, other: &ScoreInternal) -> Option<std::cmp::Ordering> {
        self.0.partial_cmp(other)
    }
}

impl fmt::Display for Score {
    #[inline(always)]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::Debug for Score {
    #[inline(always)]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_mate() {
            write!(f, "{} (mate in {} plies)", self.0, self.plies_to_mate())
        } else if self.is_ban() {
            write!(f, "{} (perpetual check)", self.0)
        } else {
            write!(f, "{}", self.0)
        }
    }
}
