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
use std::str::FromStr;
use strum::IntoEnumIterator;
use thiserror::Error;

use super::material::{Color, Piece, Promotion};
use super::moves::{Move, MoveRules};
use super::position::{Pos, Position};
use super::square::{File, Rank, Square};
use super::Turn;

use Piece::*;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NotationError {
    #[error("Invalid move format: '{0}'")]
    InvalidFormat(String),
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionError {
    #[error("No {0} can move to {1}")]
    NoMatch(Piece, Square),
    #[error("More than one piece can move to {0}")]
    Ambiguous(Square),
    #[error("Invalid promotion on {0}")]
    InvalidPromotion(Square),
    #[error("Move would leave the king in check")]
    LeavesKingInCheck,
}

/// A parsed move in algebraic notation, before it is matched against
/// a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveDescriptor {
    pub piece: Piece,
    pub file: Option<File>,
    pub rank: Option<Rank>,
    pub target: Square,
    pub promotion: Option<Promotion>,
}

impl MoveDescriptor {
    /// Scans a single token such as `e4`, `Nbd7`, `R1xa3`, `exd8=Q+`.
    ///
    /// The capture mark `x` and a trailing `+` or `#` are accepted and
    /// discarded; nothing is checked against the board here.
    pub fn parse(notation: &str) -> Result<Self, NotationError> {
        let invalid = || NotationError::InvalidFormat(notation.to_string());
        let chars: Vec<char> = notation.chars().collect();

        let mut rest = &chars[..];
        if let Some((last, head)) = rest.split_last() {
            if matches!(last, '+' | '#') {
                rest = head;
            }
        }

        let mut promotion = None;
        if let [head @ .., '=', symbol] = rest {
            promotion = Some(Promotion::from_char(*symbol).ok_or_else(invalid)?);
            rest = head;
        }

        let [prefix @ .., file, rank] = rest else {
            return Err(invalid());
        };
        let target = Square::try_from_chars(*file, *rank).ok_or_else(invalid)?;

        let mut prefix = prefix;
        if let [head @ .., 'x'] = prefix {
            prefix = head;
        }

        let mut symbols = prefix.iter().copied().peekable();
        let piece = match symbols.peek().copied() {
            Some(c @ ('K' | 'Q' | 'R' | 'B' | 'N')) => {
                symbols.next();
                Piece::from_char(c).ok_or_else(invalid)?
            }
            _ => Pawn,
        };
        let file = symbols.peek().copied().and_then(File::try_from_char);
        if file.is_some() {
            symbols.next();
        }
        let rank = symbols.peek().copied().and_then(Rank::try_from_char);
        if rank.is_some() {
            symbols.next();
        }
        if symbols.next().is_some() {
            return Err(invalid());
        }

        Ok(Self {
            piece,
            file,
            rank,
            target,
            promotion,
        })
    }
}

impl FromStr for MoveDescriptor {
    type Err = NotationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Matches a descriptor against the side to move: same piece kind, the
/// optional file and rank, and a pseudo-legal path to the target. Only a
/// single surviving origin resolves.
///
/// Candidates are not filtered for leaving their own king in check, and a
/// missing or misplaced promotion is left to the caller.
pub fn resolve(pos: &Position, descriptor: &MoveDescriptor) -> Result<Move> {
    let color = pos.turn();
    let candidates: Vec<Square> = Square::iter()
        .filter(|&sq| {
            matches!(pos.contents(sq), Some(m) if m.color() == color && m.piece() == descriptor.piece)
        })
        .filter(|sq| descriptor.file.map_or(true, |file| sq.file() == file))
        .filter(|sq| descriptor.rank.map_or(true, |rank| sq.rank() == rank))
        .filter(|&sq| pos.is_pseudo_legal(descriptor.piece, color, sq, descriptor.target))
        .collect();

    let from = match candidates[..] {
        [from] => from,
        [] => return Err(ResolutionError::NoMatch(descriptor.piece, descriptor.target).into()),
        _ => return Err(ResolutionError::Ambiguous(descriptor.target).into()),
    };
    Ok(Move::new(from, descriptor.target, descriptor.promotion))
}

/// A pawn reaching the last rank must name its promotion piece, and
/// nothing else may.
pub(super) fn check_promotion(
    piece: Piece,
    color: Color,
    to: Square,
    promotion: Option<Promotion>,
) -> Result<(), ResolutionError> {
    let last_row = (!color).home_row();
    let promotes = piece == Pawn && to.row() == last_row;
    if promotes != promotion.is_some() {
        return Err(ResolutionError::InvalidPromotion(to));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::*;
    use Color::*;
    use Piece::*;
    use Square::*;

    fn parse(s: &str) -> MoveDescriptor {
        MoveDescriptor::parse(s).unwrap()
    }

    fn resolution_error(pos: &Position, s: &str) -> ResolutionError {
        let err = resolve(pos, &parse(s)).unwrap_err();
        *err.downcast_ref::<ResolutionError>().unwrap()
    }

    #[test]
    fn test_parse_pawn_push() {
        let d = parse("e4");
        assert_eq!(d.piece, Pawn);
        assert_eq!(d.target, E4);
        assert_eq!(d.file, None);
        assert_eq!(d.rank, None);
        assert_eq!(d.promotion, None);
    }

    #[test]
    fn test_parse_full_token() {
        let d = parse("Qh4xe1#");
        assert_eq!(d.piece, Queen);
        assert_eq!(d.file, Some(File::FileH));
        assert_eq!(d.rank, Some(Rank::Rank4));
        assert_eq!(d.target, E1);

        let d = parse("exd8=N+");
        assert_eq!(d.piece, Pawn);
        assert_eq!(d.file, Some(File::FileE));
        assert_eq!(d.target, D8);
        assert_eq!(d.promotion, Some(Promotion::Knight));

        let d: MoveDescriptor = "R1a3".parse().unwrap();
        assert_eq!(d.piece, Rook);
        assert_eq!(d.rank, Some(Rank::Rank1));
        assert_eq!(d.target, A3);
    }

    #[test]
    fn test_parse_rejects_bad_format() {
        for s in [
            "", "e", "e9", "i4", "Pe4", "ne4", "Nxxe4", "e8=K", "e8=", "e4++", "Ke1e2e3", "0-0",
            "resign", "e4 ",
        ] {
            assert_eq!(
                MoveDescriptor::parse(s),
                Err(NotationError::InvalidFormat(s.to_string())),
                "{s}"
            );
        }
    }

    #[test]
    fn test_resolve_pawn_push() {
        let pos = Position::classical();
        let mv = resolve(&pos, &parse("e4")).unwrap();
        assert_eq!(mv, Move::new(E2, E4, None));
    }

    #[test]
    fn test_resolve_black_knight() {
        let pos = Position::classical().set_turn(Black);
        let mv = resolve(&pos, &parse("Nf6")).unwrap();
        assert_eq!(mv, Move::new(G8, F6, None));
    }

    #[test]
    fn test_ambiguous_knights() {
        let pos = Position::classical()
            .set_contents(G1, None)
            .set_contents(E1, None)
            .set_contents(E5, Some(Material::WN))
            .set_contents(G5, Some(Material::WN))
            .set_contents(H1, Some(Material::WK));
        let before = pos.clone();
        assert_eq!(resolution_error(&pos, "Nf3"), ResolutionError::Ambiguous(F3));
        assert_eq!(pos, before);
        assert_eq!(resolve(&pos, &parse("Nef3")).unwrap(), Move::new(E5, F3, None));
        // both knights stand on the fifth rank
        assert_eq!(resolution_error(&pos, "N5f3"), ResolutionError::Ambiguous(F3));
    }

    #[test]
    fn test_disambiguate_by_rank() {
        let pos = Position::empty(White)
            .set_contents(A1, Some(Material::WR))
            .set_contents(A5, Some(Material::WR))
            .set_contents(H1, Some(Material::WK))
            .set_contents(H8, Some(Material::BK));
        assert_eq!(resolution_error(&pos, "Ra3"), ResolutionError::Ambiguous(A3));
        assert_eq!(resolve(&pos, &parse("R1a3")).unwrap(), Move::new(A1, A3, None));
        assert_eq!(resolve(&pos, &parse("R5a3")).unwrap(), Move::new(A5, A3, None));
        assert_eq!(resolve(&pos, &parse("Ra1a3")).unwrap(), Move::new(A1, A3, None));
    }

    #[test]
    fn test_no_match() {
        let pos = Position::classical();
        assert_eq!(resolution_error(&pos, "e5"), ResolutionError::NoMatch(Pawn, E5));
        assert_eq!(resolution_error(&pos, "Bc4"), ResolutionError::NoMatch(Bishop, C4));
        // wrong side: it is White's turn
        assert_eq!(resolution_error(&pos, "Nf6"), ResolutionError::NoMatch(Knight, F6));
        assert_eq!(resolution_error(&pos, "Nbf3"), ResolutionError::NoMatch(Knight, F3));
    }

    #[test]
    fn test_capture_mark_is_not_checked() {
        let pos = Position::classical();
        assert_eq!(resolve(&pos, &parse("Nxf3")).unwrap(), Move::new(G1, F3, None));
    }

    #[test]
    fn test_promotion() {
        let pos = Position::empty(White)
            .set_contents(B7, Some(Material::WP))
            .set_contents(A8, Some(Material::BR))
            .set_contents(H1, Some(Material::WK))
            .set_contents(H5, Some(Material::BK));
        assert_eq!(
            resolve(&pos, &parse("b8=Q")).unwrap(),
            Move::new(B7, B8, Some(Promotion::Queen))
        );
        assert_eq!(
            resolve(&pos, &parse("bxa8=N")).unwrap(),
            Move::new(B7, A8, Some(Promotion::Knight))
        );
    }

    #[test]
    fn test_resolution_ignores_promotion_rules() {
        let pos = Position::empty(White)
            .set_contents(B7, Some(Material::WP))
            .set_contents(H1, Some(Material::WK))
            .set_contents(H5, Some(Material::BK));
        assert_eq!(resolve(&pos, &parse("b8")).unwrap(), Move::new(B7, B8, None));
        assert_eq!(
            resolve(&pos, &parse("Kh2=Q")).unwrap(),
            Move::new(H1, H2, Some(Promotion::Queen))
        );
    }

    #[test]
    fn test_check_promotion() {
        assert_eq!(check_promotion(Pawn, White, B8, Some(Promotion::Queen)), Ok(()));
        assert_eq!(
            check_promotion(Pawn, White, B8, None),
            Err(ResolutionError::InvalidPromotion(B8))
        );
        assert_eq!(
            check_promotion(King, White, H2, Some(Promotion::Queen)),
            Err(ResolutionError::InvalidPromotion(H2))
        );
        assert_eq!(check_promotion(Pawn, Black, C1, Some(Promotion::Rook)), Ok(()));
        // black promotes on rank 1, not rank 8
        assert_eq!(
            check_promotion(Pawn, Black, C8, Some(Promotion::Queen)),
            Err(ResolutionError::InvalidPromotion(C8))
        );
        assert_eq!(
            check_promotion(Pawn, Black, C5, Some(Promotion::Queen)),
            Err(ResolutionError::InvalidPromotion(C5))
        );
    }

    #[test]
    fn test_black_promotion_rank() {
        let pos = Position::empty(Black)
            .set_contents(C2, Some(Material::BP))
            .set_contents(C6, Some(Material::BP))
            .set_contents(H1, Some(Material::WK))
            .set_contents(H8, Some(Material::BK));
        assert_eq!(
            resolve(&pos, &parse("c1=R")).unwrap(),
            Move::new(C2, C1, Some(Promotion::Rook))
        );
    }

    #[test]
    fn test_resolution_ignores_self_check() {
        // the e2 bishop is pinned, yet resolves
        let pos = Position::empty(White)
            .set_contents(E1, Some(Material::WK))
            .set_contents(E2, Some(Material::WB))
            .set_contents(E8, Some(Material::BR))
            .set_contents(A8, Some(Material::BK));
        let mv = resolve(&pos, &parse("Bd3")).unwrap();
        assert_eq!(mv, Move::new(E2, D3, None));
        assert!(pos.leaves_king_in_check(mv));
    }
}
