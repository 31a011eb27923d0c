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
use serde::{Deserialize, Serialize};
use std::ops::Index;

use super::castling::{CastlingError, CastlingSide};
use super::material::{Color, Material};
use super::moves::{Move, MoveError, MoveRules};
use super::position::{Pos, Position};
use super::san::{check_promotion, resolve, MoveDescriptor, ResolutionError};
use super::square::Square;
use super::Turn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BoardStatus {
    Ongoing,
    CheckMate(Color),
    StaleMate,
    FiftyMoves,
}

impl BoardStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, BoardStatus::Ongoing)
    }
}

/// Classifies `pos` for the side to move. The half-move limit is checked
/// first, so it ends the game even when legal moves remain. Castling is
/// not counted as a legal move.
pub fn evaluate(pos: &Position, halfmove_limit: usize) -> BoardStatus {
    use BoardStatus::*;
    if pos.halfmove_clock() >= halfmove_limit {
        return FiftyMoves;
    }
    let color = pos.turn();
    if !pos.legal_moves(color).is_empty() {
        Ongoing
    } else if pos.is_in_check(color) {
        CheckMate(!color)
    } else {
        StaleMate
    }
}

/// Rule switches for behaviour that differs from standard chess.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleSet {
    /// Half-moves without a capture or pawn move before the game is drawn.
    pub halfmove_limit: usize,
    /// Reject a resolved move that leaves the mover's king attacked.
    pub reject_self_check: bool,
    /// Allow castling out of, through or into check.
    pub castling_through_check: bool,
    /// A pawn reaching the last rank must name its promotion piece, and
    /// no other move may carry one. When off, a suffix is applied as given.
    pub require_promotion: bool,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self {
            halfmove_limit: 50,
            reject_self_check: true,
            castling_through_check: true,
            require_promotion: true,
        }
    }
}

/// A position with its rules, the record of accepted moves and the
/// current status. Every rejected submission leaves it untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Board {
    position: Position,
    rules: RuleSet,
    history: Vec<String>,
    status: BoardStatus,
}

impl Default for Board {
    fn default() -> Self {
        Self::standard()
    }
}

impl Board {
    pub fn new(position: Position, rules: RuleSet) -> Self {
        let status = evaluate(&position, rules.halfmove_limit);
        Self {
            position,
            rules,
            history: Vec::new(),
            status,
        }
    }

    pub fn standard() -> Self {
        Self::new(Position::default(), RuleSet::default())
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Accepted move notations, oldest first.
    pub fn history(&self) -> &[String] {
        &self.history
    }

    pub fn status(&self) -> BoardStatus {
        self.status
    }

    /// Plays a move given in algebraic notation, or `0-0` / `0-0-0`.
    pub fn submit(&mut self, notation: &str) -> Result<BoardStatus> {
        self.ensure_ongoing()?;
        if let Some(side) = CastlingSide::from_token(notation) {
            return self.castle(side);
        }
        let descriptor = MoveDescriptor::parse(notation)?;
        let mv = resolve(&self.position, &descriptor)?;
        self.check_promotion(mv)?;
        if self.rules.reject_self_check && self.position.leaves_king_in_check(mv) {
            return Err(ResolutionError::LeavesKingInCheck.into());
        }
        self.position.apply_move(mv)?;
        Ok(self.record(notation.to_string()))
    }

    pub fn castle(&mut self, side: CastlingSide) -> Result<BoardStatus> {
        self.ensure_ongoing()?;
        self.position.validate_castle(side)?;
        if !self.rules.castling_through_check && !self.position.is_castling_safe(side) {
            return Err(CastlingError::KingAttacked.into());
        }
        self.position.castle(side)?;
        Ok(self.record(side.token().to_string()))
    }

    /// Plays an already resolved move. Only moves produced by the legal
    /// move generator are accepted.
    pub fn apply(&mut self, mv: Move) -> Result<BoardStatus> {
        self.ensure_ongoing()?;
        let color = self.turn();
        let legal = self
            .legal_moves(color)
            .into_iter()
            .any(|m| m.from == mv.from && m.to == mv.to);
        if !legal {
            return Err(MoveError::IllegalMove(mv).into());
        }
        self.check_promotion(mv)?;
        self.position.apply_move(mv)?;
        Ok(self.record(mv.to_string()))
    }

    fn ensure_ongoing(&self) -> Result<()> {
        if self.status.is_terminal() {
            return Err(MoveError::GameOver.into());
        }
        Ok(())
    }

    fn check_promotion(&self, mv: Move) -> Result<(), ResolutionError> {
        match self.position[mv.from] {
            Some(m) if self.rules.require_promotion => {
                check_promotion(m.piece(), m.color(), mv.to, mv.promotion)
            }
            _ => Ok(()),
        }
    }

    fn record(&mut self, notation: String) -> BoardStatus {
        self.history.push(notation);
        self.status = evaluate(&self.position, self.rules.halfmove_limit);
        self.status
    }
}

impl Turn for Board {
    #[inline]
    fn turn(&self) -> Color {
        self.position.turn()
    }
}

impl AsRef<Position> for Board {
    fn as_ref(&self) -> &Position {
        &self.position
    }
}

impl Index<Square> for Board {
    type Output = Option<Material>;
    fn index(&self, index: Square) -> &Self::Output {
        self.position.index(index)
    }
}

impl Pos for Board {}

impl MoveRules for Board {}
