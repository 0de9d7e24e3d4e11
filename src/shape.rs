//! Shape templates for the 7 falling pieces
//!
//! Each template is a fixed blueprint over the top two rows of the board,
//! expressed column -> rows like the live piece itself. Blueprints are value
//! data; `blueprint` always builds a fresh `Piece`, so mutating a spawned
//! piece can never corrupt the template.

use crate::piece::Piece;

/// The 7 shape kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    J,
    L,
    I,
    O,
    S,
    Z,
    T,
}

impl ShapeKind {
    /// All kinds, for uniform random selection
    pub fn all() -> [ShapeKind; 7] {
        [
            ShapeKind::J,
            ShapeKind::L,
            ShapeKind::I,
            ShapeKind::O,
            ShapeKind::S,
            ShapeKind::Z,
            ShapeKind::T,
        ]
    }

    /// A fresh piece for this kind, placed in the top two rows of a board
    /// with the given height
    pub fn blueprint(self, height: i32) -> Piece {
        let a = height - 1; // top row
        let b = height - 2; // row below it
        match self {
            ShapeKind::J => {
                Piece::from_columns([(2, vec![a]), (3, vec![a]), (4, vec![a, b])])
            }
            ShapeKind::L => {
                Piece::from_columns([(2, vec![a, b]), (3, vec![a]), (4, vec![a])])
            }
            ShapeKind::I => Piece::from_columns([
                (2, vec![a]),
                (3, vec![a]),
                (4, vec![a]),
                (5, vec![a]),
            ]),
            ShapeKind::O => Piece::from_columns([(3, vec![a, b]), (4, vec![a, b])]),
            ShapeKind::Z => {
                Piece::from_columns([(3, vec![a]), (4, vec![a, b]), (5, vec![b])])
            }
            ShapeKind::S => {
                Piece::from_columns([(3, vec![b]), (4, vec![a, b]), (5, vec![a])])
            }
            ShapeKind::T => {
                Piece::from_columns([(3, vec![b]), (4, vec![a, b]), (5, vec![b])])
            }
        }
    }
}
