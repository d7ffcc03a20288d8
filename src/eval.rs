/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use crate::{tune, Position, Psqt, Score, Side, Square};

impl Position {
    /// Evaluate this position from the side-to-move's perspective.
    ///
    /// Shorthand for `Evaluator::new(self).eval()`.
    #[inline(always)]
    pub fn evaluate(&self) -> Score {
        Evaluator::new(self).eval()
    }
}

/// Encapsulates the logic of scoring a Xiangqi position.
///
/// Piece-square values (material included) are kept up to date incrementally by the
/// [`Position`], so evaluation is a difference of two sums plus a bonus for having the move.
#[derive(Debug, Clone)]
pub struct Evaluator<'a> {
    /// The position to evaluate.
    position: &'a Position,
}

impl<'a> Evaluator<'a> {
    /// Construct a new [`Evaluator`].
    #[inline(always)]
    pub fn new(position: &'a Position) -> Self {
        Self { position }
    }

    /// Evaluate this position from the side-to-move's perspective.
    ///
    /// A positive/high number is good for the side-to-move, while a negative number is better for the opponent.
    #[inline(always)]
    pub fn eval(&self) -> Score {
        self.eval_for(self.position.side_to_move())
    }

    /// Evaluate this position from `side`'s perspective.
    #[inline(always)]
    fn eval_for(&self, side: Side) -> Score {
        let own = self.position.material(side);
        let opp = self.position.material(!side);
        Score::new(own - opp + tune::advanced_value!())
    }

    /// Fetches the value for the piece on the specified square, if one exists.
    ///
    /// Values are positive for Red and negative for Black. Only used when printing the evaluator.
    #[inline(always)]
    fn value_at(&self, square: Square) -> Option<i32> {
        let piece = self.position.piece_at(square);
        let side = piece.side()?;
        let value = Psqt::eval(piece, square);

        Some(match side {
            Side::Red => value,
            Side::Black => -value,
        })
    }
}

impl fmt::Display for Evaluator<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let side = self.position.side_to_move();

        write!(f, "  +")?;
        for _ in Square::FILE_LEFT..=Square::FILE_RIGHT {
            write!(f, "-----+")?;
        }
        writeln!(f)?;

        for rank in Square::RANK_TOP..=Square::RANK_BOTTOM {
            write!(f, "{} |", Square::RANK_BOTTOM - rank)?;

            // Step 1: Write the piece char
            for file in Square::FILE_LEFT..=Square::FILE_RIGHT {
                let piece = self.position.piece_at(Square::new(file, rank));
                write!(f, "  {piece}  |")?;
            }
            writeln!(f)?;
            write!(f, "  |")?;

            // Step 2: Write the contribution of that piece
            for file in Square::FILE_LEFT..=Square::FILE_RIGHT {
                let score = match self.value_at(Square::new(file, rank)) {
                    Some(val) if val > 0 => format!("{:^5}", format!("+{val}")),
                    Some(val) => format!("{val:^5}"),
                    None => String::from("     "),
                };
                write!(f, "{score}|")?;
            }
            writeln!(f)?;

            write!(f, "  +")?;
            for _ in Square::FILE_LEFT..=Square::FILE_RIGHT {
                write!(f, "-----+")?;
            }
            writeln!(f)?;
        }
        for file in 'a'..='i' {
            write!(f, "     {file}")?;
        }

        let score = self.eval_for(side);
        let winning_side = if score > Score::DRAW {
            Some(side)
        } else if score < Score::DRAW {
            Some(!side)
        } else {
            None
        };

        writeln!(
            f,
            "\n\nMaterial: {} (Red) {} (Black)",
            self.position.material(Side::Red),
            self.position.material(Side::Black)
        )?;
        writeln!(
            f,
            "Winning side: {}",
            winning_side.map(|s| s.name()).unwrap_or("N/A")
        )?;
        writeln!(f, "Score: {score}")?;

        Ok(())
    }
}
