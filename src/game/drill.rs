// Copyright 2023 Tobin Edwards
//
//    Licensed under the Apache License, Version 2.0 (the "License");
//    you may not use this file except in compliance with the License.
//    You may obtain a copy of the License at
//
//        http://www.apache.org/licenses/LICENSE-2.0
//
//    Unless required by applicable law or agreed to in writing, software
//    distributed under the License is distributed on an "AS IS" BASIS,
//    WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//    See the License for the specific language governing permissions and
//    limitations under the License.

#[cfg(feature = "random")]
use rand::Rng;

use crate::{Move, MoveRules, Piece, Pos, Position, Promotion, Turn};
#[cfg(feature = "random")]
use crate::{CastlingFlags, Color, Material, Square};

/// Moves applied before an endgame drill is called off.
pub const DRILL_MOVE_CAP: usize = 50;

/// White king and rook against the black king, White to move. The kings
/// are never adjacent and the rook never shares a row or column with the
/// black king. No castling is possible.
#[cfg(feature = "random")]
pub fn random_endgame<R: Rng>(rng: &mut R) -> Position {
    let mut random_square = || Square::from_index(rng.gen_range(0..64));
    loop {
        let white_king = random_square();
        let white_rook = random_square();
        let black_king = random_square();
        if (white_king - black_king).distance() <= 1 {
            continue;
        }
        if white_rook.row() == black_king.row() || white_rook.col() == black_king.col() {
            continue;
        }
        if white_rook == white_king {
            continue;
        }
        let mut pos = Position::empty(Color::White);
        pos.place(white_king, Material::WK);
        pos.place(white_rook, Material::WR);
        pos.place(black_king, Material::BK);
        *pos.castling_mut() = CastlingFlags::all_moved();
        return pos;
    }
}

/// One-ply move picker: the first legal move that leaves the opponent
/// checkmated, otherwise the first legal move. Pawns reaching the last
/// rank promote to a queen.
pub fn mating_move(pos: &Position) -> Option<Move> {
    let color = pos.turn();
    let last_row = (!color).home_row();
    let moves: Vec<Move> = pos
        .legal_moves(color)
        .into_iter()
        .map(|mut mv| {
            let is_pawn = pos.contents(mv.from).is_some_and(|m| m.piece() == Piece::Pawn);
            if is_pawn && mv.to.row() == last_row {
                mv.promotion = Some(Promotion::Queen);
            }
            mv
        })
        .collect();
    moves
        .iter()
        .copied()
        .find(|mv| {
            let mut trial = pos.clone();
            trial.apply_move(*mv).is_ok()
                && trial.is_in_check(!color)
                && trial.legal_moves(!color).is_empty()
        })
        .or_else(|| moves.first().copied())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::*;
    use Color::*;
    use Square::*;

    #[test]
    fn test_finds_back_rank_mate() {
        let pos = Position::from_rows(
            White,
            &[
                ".......k", "........", "......K.", "........", "........", "........", "........",
                "R.......",
            ],
        )
        .unwrap();
        assert_eq!(mating_move(&pos), Some(Move::new(A1, A8, None)));
    }

    #[test]
    fn test_first_legal_move_without_mate() {
        let pos = Position::classical();
        assert_eq!(mating_move(&pos), Some(Move::new(A2, A4, None)));
    }

    #[test]
    fn test_no_move_when_stalemated() {
        let pos = Position::from_rows(
            Black,
            &[
                "k.......", "........", ".Q......", "........", "........", "........", "........",
                "....K...",
            ],
        )
        .unwrap();
        assert_eq!(mating_move(&pos), None);
    }

    #[test]
    fn test_promotes_to_queen() {
        let pos = Position::from_rows(
            White,
            &[
                "........", "P.......", "........", "........", "........", "........", "........",
                "k.K.....",
            ],
        )
        .unwrap();
        assert_eq!(mating_move(&pos), Some(Move::new(A7, A8, Some(Promotion::Queen))));
    }

    #[cfg(feature = "random")]
    #[test]
    fn test_random_endgame_layout() {
        use rand::rngs::StdRng;
        use rand::SeedableRng;

        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let pos = random_endgame(&mut rng);
            assert_eq!(pos.turn(), White);
            assert_eq!(pos.occupied_by(White).len(), 2);
            assert_eq!(pos.occupied_by(Black).len(), 1);
            let white_king = pos.king_square(White).unwrap();
            let black_king = pos.king_square(Black).unwrap();
            assert!((white_king - black_king).distance() > 1);
            let rook = pos.occupied_by(White).iter().find(|&sq| sq != white_king).unwrap();
            assert_eq!(pos.contents(rook), Some(Material::WR));
            assert_ne!(rook.row(), black_king.row());
            assert_ne!(rook.col(), black_king.col());
            assert!(pos.castling().king_moved(White));
            assert!(pos.castling().king_moved(Black));
        }
    }
}
