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
#[cfg(feature = "random")]
use rand::thread_rng;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

use crate::{Board, BoardStatus, Color, Move, MoveRules, Pos, Position, RuleSet, Turn};

mod clock;
mod config;
mod drill;

pub use clock::*;
pub use config::*;
pub use drill::*;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameError {
    #[error("The game is over")]
    GameOver,
    #[error("No draw offer to respond to")]
    NoDrawOffer,
    #[error("A draw offer is waiting for a response")]
    DrawOfferPending,
    #[error("No legal move to play")]
    NoLegalMove,
    #[error("Random positions need the `random` feature")]
    RandomDisabled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameResult {
    Win(Color, WinReason),
    Draw(DrawReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WinReason {
    CheckMate,
    TimeExpired,
    Resigned,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DrawReason {
    Agreed,
    StaleMate,
    FiftyMoves,
}

impl GameResult {
    pub fn from_status(status: BoardStatus) -> Option<Self> {
        match status {
            BoardStatus::Ongoing => None,
            BoardStatus::CheckMate(winner) => Some(Self::Win(winner, WinReason::CheckMate)),
            BoardStatus::StaleMate => Some(Self::Draw(DrawReason::StaleMate)),
            BoardStatus::FiftyMoves => Some(Self::Draw(DrawReason::FiftyMoves)),
        }
    }
}

/// A line of input from the player to move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Resign,
    OfferDraw,
    Move(String),
}

impl FromStr for Input {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Ok(if s.eq_ignore_ascii_case("resign") {
            Input::Resign
        } else if s == "(=)" {
            Input::OfferDraw
        } else {
            Input::Move(s.to_string())
        })
    }
}

/// A game session: a board plus resignation, draw offers, an optional
/// clock and an optional cap on the number of moves.
#[derive(Debug, Clone)]
pub struct Game {
    board: Board,
    clock: Option<Clock>,
    result: Option<GameResult>,
    draw_offer: Option<Color>,
    move_cap: Option<usize>,
    moves_played: usize,
}

impl Game {
    pub fn new(config: &GameConfig) -> Result<Self> {
        let mut game = match config.start {
            StartPosition::Default => Self::with_board(Board::new(Position::default(), config.rules)),
            StartPosition::Classical => {
                Self::with_board(Board::new(Position::classical(), config.rules))
            }
            StartPosition::Endgame => Self::endgame_drill(random_start()?, config.rules),
        };
        game.clock = config.clock_budget().map(Clock::new);
        Ok(game)
    }

    pub fn with_board(board: Board) -> Self {
        let result = GameResult::from_status(board.status());
        Self {
            board,
            clock: None,
            result,
            draw_offer: None,
            move_cap: None,
            moves_played: 0,
        }
    }

    /// A drill from `position` that is drawn after `DRILL_MOVE_CAP` moves.
    pub fn endgame_drill(position: Position, rules: RuleSet) -> Self {
        Self {
            move_cap: Some(DRILL_MOVE_CAP),
            ..Self::with_board(Board::new(position, rules))
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn clock(&self) -> Option<&Clock> {
        self.clock.as_ref()
    }

    pub fn result(&self) -> Option<GameResult> {
        self.result
    }

    /// The color that offered a draw, while the offer is open.
    pub fn draw_offer(&self) -> Option<Color> {
        self.draw_offer
    }

    pub fn moves_played(&self) -> usize {
        self.moves_played
    }

    /// Handles one line of input, charging the wall-clock time since the
    /// last turn boundary to the mover.
    pub fn submit(&mut self, input: &str) -> Result<Option<GameResult>> {
        let elapsed = self.clock.as_ref().map(Clock::elapsed).unwrap_or_default();
        self.submit_after(input, elapsed)
    }

    /// Like `submit`, with the time spent on the move given explicitly.
    pub fn submit_after(&mut self, input: &str, elapsed: Duration) -> Result<Option<GameResult>> {
        self.ensure_ongoing()?;
        if self.draw_offer.is_some() {
            return Err(GameError::DrawOfferPending.into());
        }
        let mover = self.turn();
        match input.parse::<Input>() {
            Ok(Input::Resign) => {
                self.result = Some(GameResult::Win(!mover, WinReason::Resigned));
            }
            Ok(Input::OfferDraw) => {
                self.draw_offer = Some(mover);
            }
            Ok(Input::Move(notation)) => {
                let status = self.board.submit(&notation)?;
                self.finish_turn(mover, status, elapsed);
            }
            Err(never) => match never {},
        }
        Ok(self.result)
    }

    /// Accepting ends the game in a draw; declining lets the offering
    /// side carry on, with its turn timed from the refusal.
    pub fn respond_to_draw(&mut self, accept: bool) -> Result<Option<GameResult>> {
        self.ensure_ongoing()?;
        self.draw_offer.take().ok_or(GameError::NoDrawOffer)?;
        if accept {
            self.result = Some(GameResult::Draw(DrawReason::Agreed));
        } else if let Some(clock) = self.clock.as_mut() {
            clock.restart_turn();
        }
        Ok(self.result)
    }

    /// Plays the one-ply mating move picker for the side to move.
    pub fn play_engine_move(&mut self) -> Result<Move> {
        self.ensure_ongoing()?;
        if self.draw_offer.is_some() {
            return Err(GameError::DrawOfferPending.into());
        }
        let mv = mating_move(self.board.position()).ok_or(GameError::NoLegalMove)?;
        let mover = self.turn();
        let elapsed = self.clock.as_ref().map(Clock::elapsed).unwrap_or_default();
        let status = self.board.apply(mv)?;
        self.finish_turn(mover, status, elapsed);
        Ok(mv)
    }

    fn ensure_ongoing(&self) -> Result<()> {
        if self.result.is_some() {
            return Err(GameError::GameOver.into());
        }
        Ok(())
    }

    fn finish_turn(&mut self, mover: Color, status: BoardStatus, elapsed: Duration) {
        self.moves_played += 1;
        if let Some(clock) = self.clock.as_mut() {
            if !clock.charge(mover, elapsed) {
                self.result = Some(GameResult::Win(!mover, WinReason::TimeExpired));
                return;
            }
        }
        self.result = GameResult::from_status(status);
        if self.result.is_none() && self.move_cap.is_some_and(|cap| self.moves_played >= cap) {
            self.result = Some(GameResult::Draw(DrawReason::FiftyMoves));
        }
    }
}

#[cfg(feature = "random")]
fn random_start() -> Result<Position> {
    Ok(random_endgame(&mut thread_rng()))
}

#[cfg(not(feature = "random"))]
fn random_start() -> Result<Position> {
    Err(GameError::RandomDisabled.into())
}

/// The labelled board, followed by both clocks in a timed game.
impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#}", self.board.position())?;
        if let Some(clock) = &self.clock {
            for color in [Color::White, Color::Black] {
                write!(
                    f,
                    "\n{}'s time: {:.2} seconds",
                    color,
                    clock.remaining(color).as_secs_f64()
                )?;
            }
        }
        Ok(())
    }
}

impl Turn for Game {
    fn turn(&self) -> Color {
        self.board.turn()
    }
}

impl AsRef<Position> for Game {
    fn as_ref(&self) -> &Position {
        self.board.as_ref()
    }
}

impl Pos for Game {}

impl MoveRules for Game {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::*;
    use Color::*;
    use Square::*;

    fn game_from(turn: Color, rows: [&str; 8]) -> Game {
        let pos = Position::from_rows(turn, &rows).unwrap();
        Game::with_board(Board::new(pos, RuleSet::default()))
    }

    #[test]
    fn test_input_tokens() {
        assert_eq!("resign".parse::<Input>(), Ok(Input::Resign));
        assert_eq!("Resign".parse::<Input>(), Ok(Input::Resign));
        assert_eq!("(=)".parse::<Input>(), Ok(Input::OfferDraw));
        assert_eq!("Nf3".parse::<Input>(), Ok(Input::Move("Nf3".to_string())));
        assert_eq!("0-0".parse::<Input>(), Ok(Input::Move("0-0".to_string())));
    }

    #[test]
    fn test_default_config() {
        let game = Game::new(&GameConfig::default()).unwrap();
        assert_eq!(game.result(), None);
        assert!(game.clock().is_none());
        assert_eq!(game.contents(F4), Some(Material::WP));
        let game = Game::new(&GameConfig {
            start: StartPosition::Classical,
            ..Default::default()
        })
        .unwrap();
        assert_eq!(game.contents(F2), Some(Material::WP));
    }

    #[test]
    fn test_resign() {
        let mut game = Game::new(&GameConfig::default()).unwrap();
        game.submit("e4").unwrap();
        assert_eq!(
            game.submit("resign").unwrap(),
            Some(GameResult::Win(White, WinReason::Resigned))
        );
        let err = game.submit("e5").unwrap_err();
        assert_eq!(err.downcast_ref::<GameError>(), Some(&GameError::GameOver));
    }

    #[test]
    fn test_draw_offer_declined_then_accepted() {
        let mut game = Game::new(&GameConfig::default()).unwrap();
        assert_eq!(game.submit("(=)").unwrap(), None);
        assert_eq!(game.draw_offer(), Some(White));
        let err = game.submit("e4").unwrap_err();
        assert_eq!(err.downcast_ref::<GameError>(), Some(&GameError::DrawOfferPending));
        assert_eq!(game.respond_to_draw(false).unwrap(), None);
        assert_eq!(game.turn(), White);
        let err = game.respond_to_draw(true).unwrap_err();
        assert_eq!(err.downcast_ref::<GameError>(), Some(&GameError::NoDrawOffer));

        game.submit("e4").unwrap();
        game.submit("(=)").unwrap();
        assert_eq!(game.draw_offer(), Some(Black));
        assert_eq!(
            game.respond_to_draw(true).unwrap(),
            Some(GameResult::Draw(DrawReason::Agreed))
        );
    }

    #[test]
    fn test_declined_draw_restarts_turn() {
        let mut game = Game::new(&GameConfig::timed(10)).unwrap();
        game.submit("(=)").unwrap();
        std::thread::sleep(Duration::from_millis(50));
        assert!(game.clock().unwrap().elapsed() >= Duration::from_millis(50));
        game.respond_to_draw(false).unwrap();
        assert!(game.clock().unwrap().elapsed() < Duration::from_millis(50));
        assert_eq!(game.clock().unwrap().remaining(White), Duration::from_secs(10));
        assert_eq!(game.clock().unwrap().remaining(Black), Duration::from_secs(10));
    }

    #[test]
    fn test_display_with_clock() {
        let mut game = Game::new(&GameConfig {
            clock_seconds: Some(10),
            start: StartPosition::Classical,
            ..Default::default()
        })
        .unwrap();
        game.submit_after("e4", Duration::from_millis(2500)).unwrap();
        let text = game.to_string();
        assert!(text.starts_with("  a b c d e f g h\n8| r n b q k b n r |8\n"));
        assert!(text.contains("4| . . . . P . . . |4"));
        assert!(text.ends_with("White's time: 7.50 seconds\nBlack's time: 10.00 seconds"));

        let game = Game::new(&GameConfig::default()).unwrap();
        let text = game.to_string();
        assert_eq!(text, format!("{:#}", game.board().position()));
        assert!(!text.contains("time"));
    }

    #[test]
    fn test_rejected_move_keeps_turn() {
        let mut game = Game::new(&GameConfig::default()).unwrap();
        assert!(game.submit("Qh5").is_err());
        assert!(game.submit("xyz").is_err());
        assert_eq!(game.turn(), White);
        assert_eq!(game.moves_played(), 0);
        assert!(game.board().history().is_empty());
    }

    #[test]
    fn test_time_expires() {
        let mut game = Game::new(&GameConfig::timed(10)).unwrap();
        assert_eq!(game.submit_after("e4", Duration::from_secs(3)).unwrap(), None);
        let clock = game.clock().unwrap();
        assert_eq!(clock.remaining(White), Duration::from_secs(7));
        assert_eq!(clock.remaining(Black), Duration::from_secs(10));
        assert_eq!(
            game.submit_after("e5", Duration::from_secs(11)).unwrap(),
            Some(GameResult::Win(White, WinReason::TimeExpired))
        );
    }

    #[test]
    fn test_checkmate_result() {
        let mut game = game_from(
            White,
            [
                ".......k", "......pp", "........", "........", "........", "........", "........",
                "R.....K.",
            ],
        );
        assert_eq!(
            game.submit("Ra8").unwrap(),
            Some(GameResult::Win(White, WinReason::CheckMate))
        );
    }

    #[test]
    fn test_stalemate_result() {
        let mut game = game_from(
            White,
            [
                "k.......", "........", "........", "........", "........", "........", "........",
                ".Q..K...",
            ],
        );
        assert_eq!(
            game.submit("Qb6").unwrap(),
            Some(GameResult::Draw(DrawReason::StaleMate))
        );
    }

    #[test]
    fn test_engine_move_mates() {
        let pos = Position::from_rows(
            White,
            &[
                ".......k", "........", "......K.", "........", "........", "........", "........",
                "R.......",
            ],
        )
        .unwrap();
        let mut game = Game::endgame_drill(pos, RuleSet::default());
        let mv = game.play_engine_move().unwrap();
        assert_eq!(mv, Move::new(A1, A8, None));
        assert_eq!(game.board().history(), ["a1-a8"]);
        assert_eq!(game.result(), Some(GameResult::Win(White, WinReason::CheckMate)));
        let err = game.play_engine_move().unwrap_err();
        assert_eq!(err.downcast_ref::<GameError>(), Some(&GameError::GameOver));
    }

    #[test]
    fn test_drill_move_cap() {
        let pos = Position::from_rows(
            White,
            &[
                ".......k", "........", "........", "........", "........", "........", "........",
                "K.......",
            ],
        )
        .unwrap();
        let rules = RuleSet {
            halfmove_limit: 1000,
            ..Default::default()
        };
        let mut game = Game::endgame_drill(pos, rules);
        let cycle = ["Kb1", "Kg8", "Ka1", "Kh8"];
        for notation in cycle.iter().cycle().take(DRILL_MOVE_CAP - 1) {
            assert_eq!(game.submit(notation).unwrap(), None);
        }
        assert_eq!(game.moves_played(), DRILL_MOVE_CAP - 1);
        assert_eq!(
            game.submit("Kg8").unwrap(),
            Some(GameResult::Draw(DrawReason::FiftyMoves))
        );
    }

    #[cfg(feature = "random")]
    #[test]
    fn test_endgame_config() {
        let game = Game::new(&GameConfig::endgame()).unwrap();
        assert_eq!(game.turn(), White);
        assert_eq!(game.occupied_by(White).len(), 2);
        assert_eq!(game.occupied_by(Black).len(), 1);
        assert_eq!(game.result(), None);
    }
}
