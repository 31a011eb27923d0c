// Copyright 2026 Tobin Edwards
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

use anyhow::Result;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter};
use thiserror::Error;

use super::material::{Color, Material, Pair, Piece};
use super::moves::MoveRules;
use super::position::{between, Pos, Position};
use super::square::Square;
use super::Turn;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CastlingError {
    #[error("King not found on its home square")]
    KingMissing,
    #[error("Rook not found on its home square")]
    RookMissing,
    #[error("Squares between king and rook are not empty")]
    PathBlocked,
    #[error("King or rook has moved before")]
    AlreadyMoved,
    #[error("King is in check or would pass through or land on an attacked square")]
    KingAttacked,
}
use CastlingError::*;

const KING_COL: usize = 4;

#[derive(Debug, Serialize, Deserialize, Display, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum CastlingSide {
    KingSide,
    QueenSide,
}

impl CastlingSide {
    /// Recognizes the `0-0` and `0-0-0` input tokens.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "0-0" => Some(Self::KingSide),
            "0-0-0" => Some(Self::QueenSide),
            _ => None,
        }
    }

    pub fn token(&self) -> &'static str {
        match self {
            Self::KingSide => "0-0",
            Self::QueenSide => "0-0-0",
        }
    }

    fn rook_col(&self) -> usize {
        match self {
            Self::KingSide => 7,
            Self::QueenSide => 0,
        }
    }

    fn king_dest_col(&self) -> usize {
        match self {
            Self::KingSide => 6,
            Self::QueenSide => 2,
        }
    }

    fn rook_dest_col(&self) -> usize {
        match self {
            Self::KingSide => 5,
            Self::QueenSide => 3,
        }
    }
}

#[inline]
fn home_square(color: Color, col: usize) -> Square {
    Square::from_index(color.home_row() * 8 + col)
}

#[inline]
pub fn king_home(color: Color) -> Square {
    home_square(color, KING_COL)
}

#[inline]
pub fn rook_home(color: Color, side: CastlingSide) -> Square {
    home_square(color, side.rook_col())
}

#[inline]
pub fn king_dest(color: Color, side: CastlingSide) -> Square {
    home_square(color, side.king_dest_col())
}

#[inline]
pub fn rook_dest(color: Color, side: CastlingSide) -> Square {
    home_square(color, side.rook_dest_col())
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MovedFlags {
    king: bool,
    kingside_rook: bool,
    queenside_rook: bool,
}

/// Which kings and rooks have ever left their home squares. Flags are
/// only ever set, never cleared.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CastlingFlags(Pair<MovedFlags>);

impl CastlingFlags {
    /// Flags for a position where no king or rook can castle any more.
    pub fn all_moved() -> Self {
        let moved = MovedFlags {
            king: true,
            kingside_rook: true,
            queenside_rook: true,
        };
        Self(Pair::new(moved, moved))
    }

    #[inline]
    pub fn king_moved(&self, color: Color) -> bool {
        self.0[color].king
    }

    #[inline]
    pub fn rook_moved(&self, color: Color, side: CastlingSide) -> bool {
        match side {
            CastlingSide::KingSide => self.0[color].kingside_rook,
            CastlingSide::QueenSide => self.0[color].queenside_rook,
        }
    }

    /// Records that a king or rook left `square`. Only the home squares
    /// carry a flag, whichever piece vacates them.
    pub fn update(&mut self, square: Square) {
        for color in Color::iter() {
            let flags = &mut self.0[color];
            if square == king_home(color) {
                flags.king = true;
            }
            if square == rook_home(color, CastlingSide::KingSide) {
                flags.kingside_rook = true;
            }
            if square == rook_home(color, CastlingSide::QueenSide) {
                flags.queenside_rook = true;
            }
        }
    }
}

impl Position {
    /// Checks that the side to move may castle on `side`: king and rook
    /// on their home squares, nothing between them and neither moved.
    /// Attacked squares are not considered here, see `is_castling_safe`.
    pub fn validate_castle(&self, side: CastlingSide) -> Result<(), CastlingError> {
        let color = self.turn();
        let king_src = king_home(color);
        let rook_src = rook_home(color, side);
        if self.contents(king_src) != Some(Material::new(color, Piece::King)) {
            return Err(KingMissing);
        }
        if self.contents(rook_src) != Some(Material::new(color, Piece::Rook)) {
            return Err(RookMissing);
        }
        if between(king_src, rook_src).iter().any(|sq| self.is_occupied(sq)) {
            return Err(PathBlocked);
        }
        if self.castling().king_moved(color) || self.castling().rook_moved(color, side) {
            return Err(AlreadyMoved);
        }
        Ok(())
    }

    /// True if the king is not in check, and would not be on any square
    /// it crosses or lands on while castling on `side`.
    pub fn is_castling_safe(&self, side: CastlingSide) -> bool {
        let color = self.turn();
        let king_src = king_home(color);
        let transit = [rook_dest(color, side), king_dest(color, side)];
        if self.is_in_check(color) {
            return false;
        }
        transit.into_iter().all(|square| {
            let mut trial = self.clone();
            trial.relocate(king_src, square);
            !trial.is_in_check(color)
        })
    }

    /// Castles the side to move and passes the turn. Both the king and
    /// the rook are marked as moved.
    pub fn castle(&mut self, side: CastlingSide) -> Result<()> {
        self.validate_castle(side)?;
        let color = self.turn();
        self.relocate(king_home(color), king_dest(color, side));
        self.relocate(rook_home(color, side), rook_dest(color, side));
        let flags = self.castling_mut();
        flags.update(king_home(color));
        flags.update(rook_home(color, side));
        self.finish_quiet_move();
        Ok(())
    }
}
