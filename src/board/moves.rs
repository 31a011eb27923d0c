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

use serde::{Deserialize, Serialize};
use std::fmt;
use strum::IntoEnumIterator;
use thiserror::Error;

use super::material::{Color, Piece, Promotion};
use super::position::{between, Pos, Position};
use super::square::{Offset, Square};

use Piece::*;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveError {
    #[error("No piece on {0}")]
    EmptySquare(Square),
    #[error("Not a legal move: {0}")]
    IllegalMove(Move),
    #[error("The game is over")]
    GameOver,
}

/// A resolved move: origin, destination and the piece a pawn promotes to.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<Promotion>,
}

impl Move {
    pub fn new(from: Square, to: Square, promotion: Option<Promotion>) -> Self {
        Self {
            from,
            to,
            promotion,
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.from, self.to)?;
        if let Some(promotion) = self.promotion {
            write!(f, "={}", Piece::from(promotion).to_char())?;
        }
        Ok(())
    }
}

/// Movement rules, check detection and legal move generation for any
/// owner of a position.
pub trait MoveRules: Pos {
    /// Whether `piece` of `color` standing on `from` could move to `to`,
    /// ignoring the safety of its own king. Castling is never a king move
    /// here.
    fn is_pseudo_legal(&self, piece: Piece, color: Color, from: Square, to: Square) -> bool {
        if from == to {
            return false;
        }
        if matches!(self.contents(to), Some(m) if m.color() == color) {
            return false;
        }
        let offset = to - from;
        match piece {
            Pawn => self.pawn_reaches(color, from, to),
            Knight => matches!(
                (offset.x.unsigned_abs(), offset.y.unsigned_abs()),
                (1, 2) | (2, 1)
            ),
            Bishop => offset.x.abs() == offset.y.abs() && self.is_path_clear(from, to),
            Rook => (offset.x == 0 || offset.y == 0) && self.is_path_clear(from, to),
            Queen => offset.to_unit().is_some() && self.is_path_clear(from, to),
            King => offset.distance() == 1,
        }
    }

    fn pawn_reaches(&self, color: Color, from: Square, to: Square) -> bool {
        let forward = color.forward();
        let offset = to - from;
        match (offset.x.abs(), offset.y) {
            (0, y) if y == forward => self.is_vacant(to),
            (0, y) if y == 2 * forward && from.row() == color.pawn_row() => {
                let skipped = from + Offset::new(0, forward);
                skipped.is_some_and(|sq| self.is_vacant(sq)) && self.is_vacant(to)
            }
            (1, y) if y == forward => self.is_occupied(to) || self.en_passant() == Some(to),
            _ => false,
        }
    }

    /// True if every square strictly between `from` and `to` is empty.
    fn is_path_clear(&self, from: Square, to: Square) -> bool {
        between(from, to).iter().all(|square| self.is_vacant(square))
    }

    /// Whether any opposing piece attacks `color`'s king. A missing king
    /// is never in check.
    fn is_in_check(&self, color: Color) -> bool {
        let Some(king) = self.king_square(color) else {
            return false;
        };
        Square::iter().any(|square| {
            matches!(self.contents(square), Some(m)
                if m.color() != color && self.is_pseudo_legal(m.piece(), m.color(), square, king))
        })
    }

    /// Every pseudo-legal relocation for `color` that does not leave its
    /// own king attacked, in board order (a8 first). Castling is not
    /// included. Each candidate is tried on a private clone.
    fn legal_moves(&self, color: Color) -> Vec<Move> {
        let pos: &Position = self.as_ref();
        let mut moves = Vec::new();
        for from in pos.occupied_by(color).iter() {
            let Some(material) = pos.contents(from) else {
                continue;
            };
            for to in Square::iter() {
                if !pos.is_pseudo_legal(material.piece(), color, from, to) {
                    continue;
                }
                let mut trial = pos.clone();
                trial.relocate(from, to);
                if !trial.is_in_check(color) {
                    moves.push(Move::new(from, to, None));
                }
            }
        }
        moves
    }

    /// Whether playing `mv`, with all its side effects, would leave the
    /// mover's king attacked.
    fn leaves_king_in_check(&self, mv: Move) -> bool {
        let pos: &Position = self.as_ref();
        let Some(material) = pos.contents(mv.from) else {
            return false;
        };
        let mut trial = pos.clone();
        trial.apply_move(mv).is_ok() && trial.is_in_check(material.color())
    }
}

impl MoveRules for Position {}
