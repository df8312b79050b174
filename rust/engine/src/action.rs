use serde::{Deserialize, Serialize};

use crate::cards::Card;

/// One player move on one board.
///
/// `Raise` carries the active seat's absolute pip target on that board,
/// not an increment. `Assign` carries the hole-card pair the player routes
/// to that board; it is empty only when mirroring the opponent's hidden
/// assignment on the player side of the wire.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub enum Action {
    /// Fold and forfeit this board
    Fold,
    /// Match the opponent's pips on this board
    Call,
    /// No bet; also the dummy acknowledgement on settled and terminal boards
    Check,
    /// Raise this board's pips to the given absolute amount
    Raise(u32),
    /// Route two of the round hand's cards to this board
    Assign(Vec<Card>),
}

/// Legality tag for an [`Action`], without its payload.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub enum ActionKind {
    Fold,
    Call,
    Check,
    Raise,
    Assign,
}

impl Action {
    pub fn kind(&self) -> ActionKind {
        match self {
            Action::Fold => ActionKind::Fold,
            Action::Call => ActionKind::Call,
            Action::Check => ActionKind::Check,
            Action::Raise(_) => ActionKind::Raise,
            Action::Assign(_) => ActionKind::Assign,
        }
    }
}
