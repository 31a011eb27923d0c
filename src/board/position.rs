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

use anyhow::Result;
use once_cell::sync::Lazy;
use serde::ser::SerializeTuple;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Index, IndexMut};
use strum::IntoEnumIterator;
use thiserror::Error;

use super::castling::CastlingFlags;
use super::material::{Color, Material, Piece};
use super::moves::{Move, MoveError};
use super::square::{Mask, Offset, Square};
use super::Turn;

use Color::*;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    #[error("Expecting 8 rows, found {0}")]
    RowCount(usize),
    #[error("Rank {0} must hold exactly 8 squares")]
    RowLength(usize),
    #[error("Unknown piece symbol '{0}'")]
    UnknownSymbol(char),
}

/// The engine's opening array: White's f-pawn already stands on f4.
const DEFAULT_ROWS: [&str; 8] = [
    "rnbqkbnr", "pppppppp", "........", "........", ".....P..", "........", "PPPPP.PP",
    "RNBQKBNR",
];

const CLASSICAL_ROWS: [&str; 8] = [
    "rnbqkbnr", "pppppppp", "........", "........", "........", "........", "PPPPPPPP",
    "RNBQKBNR",
];

static DEFAULT_POSITION: Lazy<Position> = Lazy::new(|| {
    // Safety: the static layout is well formed
    Position::from_rows(White, &DEFAULT_ROWS).expect("default layout")
});

static CLASSICAL_POSITION: Lazy<Position> = Lazy::new(|| {
    // Safety: the static layout is well formed
    Position::from_rows(White, &CLASSICAL_ROWS).expect("classical layout")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Squares([Option<Material>; 64]);

impl Squares {
    fn empty() -> Self {
        Self([None; 64])
    }

    pub fn from_rows<S: AsRef<str>>(rows: &[S]) -> Result<Self, LayoutError> {
        if rows.len() != 8 {
            return Err(LayoutError::RowCount(rows.len()));
        }
        let mut squares = Self::empty();
        for (row, line) in rows.iter().enumerate() {
            let symbols: Vec<char> = line.as_ref().chars().collect();
            if symbols.len() != 8 {
                return Err(LayoutError::RowLength(8 - row));
            }
            for (col, symbol) in symbols.into_iter().enumerate() {
                squares.0[row * 8 + col] = match symbol {
                    '.' => None,
                    c => Some(Material::from_symbol(c).ok_or(LayoutError::UnknownSymbol(c))?),
                };
            }
        }
        Ok(squares)
    }

    /// Rows of the snapshot, rank 8 first, `.` for an empty square.
    pub fn rows(&self) -> Vec<String> {
        self.0
            .chunks(8)
            .map(|row| {
                row.iter()
                    .map(|cell| cell.map_or('.', |material| material.to_symbol()))
                    .collect()
            })
            .collect()
    }
}

impl Index<Square> for Squares {
    type Output = Option<Material>;
    fn index(&self, index: Square) -> &Self::Output {
        &self.0[index.to_index()]
    }
}

impl IndexMut<Square> for Squares {
    fn index_mut(&mut self, index: Square) -> &mut Self::Output {
        &mut self.0[index.to_index()]
    }
}

impl Serialize for Squares {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut tuple = serializer.serialize_tuple(8)?;
        for row in self.rows() {
            tuple.serialize_element(&row)?;
        }
        tuple.end()
    }
}

impl<'de> Deserialize<'de> for Squares {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct SquaresVisitor;
        impl<'de> serde::de::Visitor<'de> for SquaresVisitor {
            type Value = Squares;
            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a board condensed into 8 rows of symbols")
            }
            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: serde::de::SeqAccess<'de>,
            {
                let mut rows: Vec<String> = Vec::with_capacity(8);
                for _ in 0..8 {
                    let row = seq
                        .next_element()?
                        .ok_or_else(|| serde::de::Error::custom("Missing rows"))?;
                    rows.push(row);
                }
                Squares::from_rows(&rows[..]).map_err(serde::de::Error::custom)
            }
        }
        deserializer.deserialize_tuple(8, SquaresVisitor)
    }
}

/// Complete state of the board: the squares, the side to move, the
/// castling flags, the en passant target and the half-move clock.
///
/// Cloning is a flat copy, so legality checks always work on their own
/// private position and never touch the live one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    squares: Squares,
    turn: Color,
    castling: CastlingFlags,
    en_passant: Option<Square>,
    halfmove_clock: u16,
}

impl Default for Position {
    fn default() -> Self {
        DEFAULT_POSITION.clone()
    }
}

impl Position {
    pub fn empty(turn: Color) -> Self {
        Self {
            squares: Squares::empty(),
            turn,
            castling: CastlingFlags::default(),
            en_passant: None,
            halfmove_clock: 0,
        }
    }

    /// The conventional opening array, with every pawn at home.
    pub fn classical() -> Self {
        CLASSICAL_POSITION.clone()
    }

    /// Builds a position from snapshot rows (rank 8 first, file a first).
    /// Castling flags start cleared, so presence on the home squares is
    /// all that castling will check.
    pub fn from_rows<S: AsRef<str>>(turn: Color, rows: &[S]) -> Result<Self> {
        let squares = Squares::from_rows(rows)?;
        Ok(Self {
            squares,
            ..Self::empty(turn)
        })
    }

    pub fn squares(&self) -> &Squares {
        &self.squares
    }

    pub fn castling(&self) -> &CastlingFlags {
        &self.castling
    }

    pub fn rows(&self) -> Vec<String> {
        self.squares.rows()
    }

    /// Applies a resolved move for the side to move and passes the turn.
    ///
    /// Handles the en passant capture, promotion, the half-move clock,
    /// the en passant target and the castling flags. The move is assumed
    /// to have been validated already; only an empty origin is rejected.
    pub fn apply_move(&mut self, mv: Move) -> Result<()> {
        let material = self.squares[mv.from].ok_or(MoveError::EmptySquare(mv.from))?;
        let captured = self.squares[mv.to];
        let piece = material.piece();
        let en_passant_capture = piece.is_pawn()
            && mv.from.col().abs_diff(mv.to.col()) == 1
            && captured.is_none()
            && self.en_passant == Some(mv.to);

        self.remove(mv.from);
        let mut placed = material;
        if let Some(promotion) = mv.promotion {
            placed.set_piece(promotion.into());
        }
        self.place(mv.to, placed);

        if en_passant_capture {
            // the captured pawn sits behind the target, on the mover's side
            let behind = Offset::new(0, -material.color().forward());
            if let Some(square) = mv.to + behind {
                self.remove(square);
            }
            self.halfmove_clock = 0;
        } else if captured.is_some() || piece.is_pawn() {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock = self.halfmove_clock.saturating_add(1);
        }

        self.en_passant = if piece.is_pawn() && mv.from.row().abs_diff(mv.to.row()) == 2 {
            mv.from + Offset::new(0, material.color().forward())
        } else {
            None
        };

        if piece.is_king() || piece.is_rook() {
            self.castling.update(mv.from);
        }
        self.turn = !self.turn;
        Ok(())
    }

    /// Bare relocation with none of the side effects of `apply_move`.
    /// Used to test whether a move would leave a king attacked.
    pub(crate) fn relocate(&mut self, from: Square, to: Square) {
        if let Some(material) = self.remove(from) {
            self.place(to, material);
        }
    }

    pub(crate) fn place(&mut self, square: Square, material: Material) -> Option<Material> {
        self.squares[square].replace(material)
    }

    pub(crate) fn remove(&mut self, square: Square) -> Option<Material> {
        self.squares[square].take()
    }

    pub(crate) fn castling_mut(&mut self) -> &mut CastlingFlags {
        &mut self.castling
    }

    /// Bookkeeping shared by every non-capturing, non-pawn move that does
    /// not go through `apply_move`.
    pub(crate) fn finish_quiet_move(&mut self) {
        self.en_passant = None;
        self.halfmove_clock = self.halfmove_clock.saturating_add(1);
        self.turn = !self.turn;
    }
}

impl Turn for Position {
    #[inline]
    fn turn(&self) -> Color {
        self.turn
    }
}

impl Index<Square> for Position {
    type Output = Option<Material>;
    #[inline]
    fn index(&self, index: Square) -> &Self::Output {
        &self.squares[index]
    }
}

impl AsRef<Self> for Position {
    fn as_ref(&self) -> &Self {
        self
    }
}

impl Pos for Position {}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows = self.rows();
        if f.alternate() {
            writeln!(f, "  a b c d e f g h")?;
            for (i, row) in rows.iter().enumerate() {
                let spaced: Vec<String> = row.chars().map(String::from).collect();
                writeln!(f, "{}| {} |{}", 8 - i, spaced.join(" "), 8 - i)?;
            }
            write!(f, "  a b c d e f g h")
        } else {
            write!(f, "{}", rows.join("\n"))
        }
    }
}

/// Read access to a position, shared by everything that owns one.
pub trait Pos: Turn + AsRef<Position> {
    #[inline]
    fn contents(&self, square: Square) -> Option<Material> {
        let pos: &Position = self.as_ref();
        pos.squares[square]
    }
    #[inline]
    fn is_vacant(&self, square: Square) -> bool {
        self.contents(square).is_none()
    }
    #[inline]
    fn is_occupied(&self, square: Square) -> bool {
        self.contents(square).is_some()
    }
    fn occupied_by(&self, color: Color) -> Mask {
        Mask::from_squares(
            Square::iter().filter(|&sq| matches!(self.contents(sq), Some(m) if m.color() == color)),
        )
    }
    /// Square of `color`'s king, or `None` if it is not on the board.
    fn king_square(&self, color: Color) -> Option<Square> {
        let king = Material::new(color, Piece::King);
        Square::iter().find(|&sq| self.contents(sq) == Some(king))
    }
    #[inline]
    fn en_passant(&self) -> Option<Square> {
        let pos: &Position = self.as_ref();
        pos.en_passant
    }
    #[inline]
    fn halfmove_clock(&self) -> usize {
        let pos: &Position = self.as_ref();
        pos.halfmove_clock as usize
    }
}

#[inline]
pub(super) fn between(from: Square, to: Square) -> Mask {
    let index = from.to_index() * 64 + to.to_index();
    SQUARES_BETWEEN[index]
}

pub(super) static SQUARES_BETWEEN: Lazy<[Mask; 64 * 64]> = Lazy::new(|| {
    // Returns a mask of squares between `start` and `end` (exclusive of both)
    // if they are not equal and in a line. Otherwise returns an empty mask.
    fn squares_between(start: Square, end: Square) -> Mask {
        let mut mask = Mask::empty();
        if let Some(step) = (end - start).to_unit() {
            let mut next = start + step;
            while let Some(square) = next {
                if square == end {
                    break;
                }
                mask |= square;
                next = square + step;
            }
        }
        mask
    }

    let mut array = [Mask::empty(); 64 * 64];
    for start in Square::iter() {
        for end in Square::iter() {
            array[start.to_index() * 64 + end.to_index()] = squares_between(start, end);
        }
    }
    array
});

#[cfg(test)]
impl Position {
    pub fn set_contents(mut self, square: Square, value: Option<Material>) -> Self {
        self.squares[square] = value;
        self
    }
    pub fn set_turn(mut self, value: Color) -> Self {
        self.turn = value;
        self
    }
    pub fn set_en_passant(mut self, value: Option<Square>) -> Self {
        self.en_passant = value;
        self
    }
    pub fn set_halfmove_clock(mut self, value: u16) -> Self {
        self.halfmove_clock = value;
        self
    }
}
