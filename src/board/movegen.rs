/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use super::{
    advisor_span, elephant_eye, elephant_span, king_span, knight_leg, Move, MoveList, PieceKind,
    Position, Square, ADVISOR_DELTA, KING_DELTA, KNIGHT_DELTA,
};

impl Position {
    /// Generates every pseudo-legal move for the side to move, in board-scan order.
    ///
    /// If `captures_only` is set, only moves landing on an enemy piece are generated.
    /// Moves that leave the mover in check are included; [`Position::make_move`] rejects them.
    pub fn generate_moves(&self, captures_only: bool) -> MoveList {
        let side = self.side_to_move();
        let mut moves = MoveList::new();

        for src in Square::iter() {
            let piece = self.piece_at(src);
            if !piece.is_side(side) {
                continue;
            }
            let Some(kind) = piece.kind() else {
                continue;
            };

            match kind {
                PieceKind::King => {
                    for delta in KING_DELTA {
                        let dst = src.offset(delta);
                        if dst.in_palace() {
                            self.push_move(&mut moves, src, dst, captures_only);
                        }
                    }
                }

                PieceKind::Advisor => {
                    for delta in ADVISOR_DELTA {
                        let dst = src.offset(delta);
                        if dst.in_palace() {
                            self.push_move(&mut moves, src, dst, captures_only);
                        }
                    }
                }

                PieceKind::Elephant => {
                    for delta in ADVISOR_DELTA {
                        let eye = src.offset(delta);
                        let dst = eye.offset(delta);
                        if dst.is_on_board()
                            && dst.on_home_half(side)
                            && self.piece_at(eye).is_empty()
                        {
                            self.push_move(&mut moves, src, dst, captures_only);
                        }
                    }
                }

                PieceKind::Horse => {
                    for (leg_delta, jumps) in KING_DELTA.into_iter().zip(KNIGHT_DELTA) {
                        if !self.piece_at(src.offset(leg_delta)).is_empty() {
                            continue;
                        }

                        for delta in jumps {
                            let dst = src.offset(delta);
                            if dst.is_on_board() {
                                self.push_move(&mut moves, src, dst, captures_only);
                            }
                        }
                    }
                }

                PieceKind::Chariot => {
                    for delta in KING_DELTA {
                        let mut dst = src.offset(delta);
                        while dst.is_on_board() {
                            let target = self.piece_at(dst);
                            if target.is_empty() {
                                if !captures_only {
                                    moves.push(Move::new(src, dst));
                                }
                            } else {
                                if target.is_side(!side) {
                                    moves.push(Move::new(src, dst));
                                }
                                break;
                            }
                            dst = dst.offset(delta);
                        }
                    }
                }

                PieceKind::Cannon => {
                    for delta in KING_DELTA {
                        // Slide like a Chariot until the screen
                        let mut dst = src.offset(delta);
                        while dst.is_on_board() {
                            if !self.piece_at(dst).is_empty() {
                                break;
                            }
                            if !captures_only {
                                moves.push(Move::new(src, dst));
                            }
                            dst = dst.offset(delta);
                        }

                        // Then capture the first piece beyond it
                        dst = dst.offset(delta);
                        while dst.is_on_board() {
                            let target = self.piece_at(dst);
                            if !target.is_empty() {
                                if target.is_side(!side) {
                                    moves.push(Move::new(src, dst));
                                }
                                break;
                            }
                            dst = dst.offset(delta);
                        }
                    }
                }

                PieceKind::Soldier => {
                    let dst = src.forward(side);
                    if dst.is_on_board() {
                        self.push_move(&mut moves, src, dst, captures_only);
                    }

                    if src.across_river(side) {
                        for delta in [-1, 1] {
                            let dst = src.offset(delta);
                            if dst.is_on_board() {
                                self.push_move(&mut moves, src, dst, captures_only);
                            }
                        }
                    }
                }
            }
        }

        moves
    }

    /// Pushes `src -> dst` if the destination is not occupied by a friendly piece
    /// (or, when `captures_only` is set, if it is occupied by an enemy one).
    #[inline(always)]
    fn push_move(&self, moves: &mut MoveList, src: Square, dst: Square, captures_only: bool) {
        let side = self.side_to_move();
        let target = self.piece_at(dst);

        let accepted = if captures_only {
            target.is_side(!side)
        } else {
            !target.is_side(side)
        };

        if accepted {
            moves.push(Move::new(src, dst));
        }
    }

    /// Returns `true` if `mv` is pseudo-legal for the side to move.
    ///
    /// This agrees with [`Position::generate_moves`] without generating anything, which makes
    /// it cheap enough to validate hash moves, killers, and book moves.
    pub fn legal_move(&self, mv: Move) -> bool {
        let (src, dst) = (mv.src(), mv.dst());
        if !src.is_on_board() || !dst.is_on_board() {
            return false;
        }

        let side = self.side_to_move();
        let piece = self.piece_at(src);
        if !piece.is_side(side) {
            return false;
        }

        let target = self.piece_at(dst);
        if target.is_side(side) {
            return false;
        }

        let Some(kind) = piece.kind() else {
            return false;
        };

        match kind {
            PieceKind::King => dst.in_palace() && king_span(src, dst),

            PieceKind::Advisor => dst.in_palace() && advisor_span(src, dst),

            PieceKind::Elephant => {
                dst.on_home_half(side)
                    && elephant_span(src, dst)
                    && self.piece_at(elephant_eye(src, dst)).is_empty()
            }

            PieceKind::Horse => {
                knight_leg(src, dst).is_some_and(|leg| self.piece_at(leg).is_empty())
            }

            PieceKind::Chariot | PieceKind::Cannon => {
                let Some(delta) = src.direction_to(dst) else {
                    return false;
                };

                let mut sq = src.offset(delta);
                while sq != dst && self.piece_at(sq).is_empty() {
                    sq = sq.offset(delta);
                }

                if sq == dst {
                    // Unobstructed: both slide, only the Chariot captures
                    return target.is_empty() || kind == PieceKind::Chariot;
                }

                // `sq` is a screen; only a Cannon capture may jump it
                if target.is_empty() || kind != PieceKind::Cannon {
                    return false;
                }

                sq = sq.offset(delta);
                while sq != dst && self.piece_at(sq).is_empty() {
                    sq = sq.offset(delta);
                }
                sq == dst
            }

            PieceKind::Soldier => {
                if src.across_river(side) && (dst == src.offset(-1) || dst == src.offset(1)) {
                    return true;
                }
                dst == src.forward(side)
            }
        }
    }

    /// Returns every fully legal move for the side to move.
    pub fn legal_moves(&mut self) -> MoveList {
        self.generate_moves(false)
            .into_iter()
            .filter(|&mv| {
                let legal = self.make_move(mv);
                if legal {
                    self.undo_make_move();
                }
                legal
            })
            .collect()
    }

    /// Returns `true` if the side to move has no move that leaves its King safe.
    ///
    /// This covers both checkmate and stalemate, which is also a loss in Xiangqi.
    pub fn is_mate(&mut self) -> bool {
        for mv in self.generate_moves(false) {
            if self.make_move(mv) {
                self.undo_make_move();
                return false;
            }
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Piece, Side, FEN_STARTPOS};

    /// Positions with a mix of crossed Soldiers, Cannon screens, and hobbled Horses.
    const TEST_FENS: [&str; 4] = [
        FEN_STARTPOS,
        "r1ba1a3/4kn3/2n1b4/pNp1p1p1p/4c4/6P2/P1P2R2P/1CcC5/9/2BAKAB2 w - - 0 1",
        "2bak4/4a4/4b4/p1C1p3p/6p1r/2P5P/P3P4/4C4/4A4/2BAK4 b - - 0 1",
        "3k5/4P4/9/9/2n6/9/9/9/4p4/4K4 w - - 0 1",
    ];

    #[test]
    fn test_startpos_move_count() {
        let mut pos = Position::startpos();
        assert_eq!(pos.generate_moves(false).len(), 44);
        assert_eq!(pos.legal_moves().len(), 44);

        // Both Cannons can take a Horse by jumping over the Black Cannons
        let mut captures = pos
            .generate_moves(true)
            .into_iter()
            .map(|mv| mv.to_string())
            .collect::<Vec<_>>();
        captures.sort();
        assert_eq!(captures, ["b2b9", "h2h9"]);
    }

    #[test]
    fn test_red_elephant_moves() {
        let pos = Position::startpos();
        let c0e2 = Move::from_iccs("c0e2").unwrap();
        let g0i2 = Move::from_iccs("g0i2").unwrap();

        assert!(pos.generate_moves(false).contains(&c0e2));
        assert!(pos.legal_move(c0e2));
        assert!(pos.legal_move(g0i2));

        // Blocked eye
        let pos = Position::from_fen("3k5/9/9/9/9/9/9/9/3P5/2B1K4 w - - 0 1").unwrap();
        assert!(!pos.legal_move(c0e2));
        assert!(pos.legal_move(Move::from_iccs("c0a2").unwrap()));
    }

    #[test]
    fn test_legal_move_agrees_with_generator() {
        for fen in TEST_FENS {
            let pos = Position::from_fen(fen).unwrap();
            let generated = pos.generate_moves(false);

            for mv in generated.iter() {
                assert!(pos.legal_move(*mv), "{mv} was generated but rejected on {fen}");
            }

            // Every other from/to pair must be rejected
            let mut accepted = 0;
            for src in Square::iter() {
                for dst in Square::iter() {
                    if pos.legal_move(Move::new(src, dst)) {
                        accepted += 1;
                    }
                }
            }
            assert_eq!(accepted, generated.len(), "Mismatch on {fen}");
        }
    }

    #[test]
    fn test_captures_are_subset() {
        for fen in TEST_FENS {
            let pos = Position::from_fen(fen).unwrap();
            let all = pos.generate_moves(false);
            for mv in pos.generate_moves(true) {
                assert!(all.contains(&mv));
                assert!(pos.piece_at(mv.dst()).is_side(!pos.side_to_move()));
            }
        }
    }

    #[test]
    fn test_null_move_is_never_legal() {
        assert!(!Position::startpos().legal_move(Move::NULL));
    }

    #[test]
    fn test_soldier_moves() {
        // Red Soldier on e8 has crossed the river and can go forward and sideways
        let pos = Position::from_fen("3k5/9/4P4/9/9/9/9/9/9/5K3 w - - 0 1").unwrap();
        let e7 = Square::from_iccs(4, 7);
        let soldier_moves = pos
            .generate_moves(false)
            .into_iter()
            .filter(|mv| mv.src() == e7)
            .count();
        assert_eq!(soldier_moves, 3);

        // Never backwards
        assert!(!pos.legal_move(Move::new(e7, Square::from_iccs(4, 6))));
    }

    #[test]
    fn test_elephant_cannot_cross_river() {
        let pos = Position::from_fen("3k5/9/9/9/9/9/9/9/9/2B1K4 w - - 0 1").unwrap();
        let c0 = Square::from_iccs(2, 0);
        assert_eq!(pos.piece_at(c0), Piece::new(Side::Red, PieceKind::Elephant));

        let from_c0 = pos
            .generate_moves(false)
            .into_iter()
            .filter(|mv| mv.src() == c0)
            .count();
        assert_eq!(from_c0, 2);
    }

    #[test]
    fn test_mate_detection() {
        // The d-file Chariot checks, the a8 Chariot covers d8, and the Red King covers e9
        let mut mated = Position::from_fen("3k5/R8/9/9/9/9/9/9/9/3RK4 b - - 0 1").unwrap();
        assert!(mated.checked());
        assert!(mated.is_mate());
        assert!(mated.legal_moves().is_empty());

        let mut free = Position::startpos();
        assert!(!free.is_mate());
    }

    #[test]
    fn test_stalemate_counts_as_mate() {
        // Not in check, but both d8 and e9 are covered
        let mut pos = Position::from_fen("3k5/R8/9/9/9/9/9/9/9/4K4 b - - 0 1").unwrap();
        assert!(!pos.checked());
        assert!(pos.is_mate());
    }
}
