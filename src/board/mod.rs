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

//! Rule-validating chess board
//!
//! A _board_ holds a position and decides whether a proposed move is
//! legal, applies it, and classifies the result. The following
//! features are supported:
//!
//! [x] Per-piece movement rules, including en passant and promotion
//! [x] Check detection and legal move generation
//! [x] Checkmate and stalemate detection
//! [x] Half-move draw rule (50 half-moves by default)
//! [x] Algebraic notation with file/rank disambiguation
//! [x] Castling with `0-0` and `0-0-0`
//! [ ] Castling legality under attack (optional, off by default)
//! [ ] Three-fold repetition
//! [ ] Insufficient mating material
//!
//! Some of the key abstractions include:
//!
//! * A `Square` represents the coordinates of a single square. Squares
//!   are numbered from `A8` (row 0, column 0) to `H1` (row 7, column 7),
//!   so row 0 is rank 8 and White's pawns advance toward row 0.
//!
//! * A `Mask` is a 64-bit value in which each bit maps to a square. The
//!   static "squares between" table hands out masks for sliding pieces
//!   and castling paths.
//!
//! * `Material` is a `Piece` of a specific `Color`. Color is always an
//!   explicit field; letter case only appears in board snapshots.
//!
//! * A `Position` holds the squares, the side to move, the castling
//!   flags, the en passant target and the half-move clock. `apply_move`
//!   and `castle` are the only public methods that modify it. Legality
//!   trial moves clone it and never mutate the live position.
//!
//! * `MoveRules` decides pseudo-legal reachability, detects check and
//!   generates legal moves for anything that owns a position.
//!
//! * `MoveDescriptor` is a parsed algebraic token and `resolve` matches
//!   it against a position to a unique `Move`.
//!
//! * A `Board` ties these together: it accepts notation, applies the
//!   move, records it and evaluates the new `BoardStatus`.
//!

mod castling;
mod material;
mod moves;
mod play;
mod position;
mod san;
mod square;

pub use castling::*;
pub use material::*;
pub use moves::*;
pub use play::*;
pub use position::*;
pub use san::*;
pub use square::*;

pub trait Turn {
    fn turn(&self) -> Color;
}
