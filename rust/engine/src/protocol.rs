//! Text wire codec between the engine and player processes.
//!
//! Messages are single lines. Clauses are separated by spaces; board
//! sub-clauses within one clause are separated by `;`. Every clause carries
//! its tag at byte 0 with the payload starting at byte 1; board sub-clauses
//! carry the 1-based board digit at byte 0, the action letter at byte 1,
//! and any payload from byte 2.
//!
//! Engine to player: `T<clock>`, `P<seat>`, `H<cards>`, `<b>B<cards>`,
//! `<b>F|C|K|R<amt>|A[<cards>]`, `<b>O[<cards>]`, `D<delta>;D<opp>`, `Q`.
//! Player to engine: `NUM_BOARDS` `;`-joined board clauses, each
//! `<b>F|C|K|R<amt>|A<c1>,<c2>`.

use thiserror::Error;

use crate::action::{Action, ActionKind};
use crate::cards::Card;
use crate::NUM_BOARDS;

/// A response line the codec cannot decode. Distinct from an illegal but
/// well-formed action, which the referee substitutes per board.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("clause too short: {0:?}")]
    TruncatedClause(String),
    #[error("unknown action code in {0:?}")]
    UnknownAction(String),
    #[error("bad raise amount in {0:?}")]
    BadAmount(String),
    #[error("bad card code in {0:?}")]
    BadCard(String),
    #[error("expected {expected} board clauses, got {got}")]
    WrongBoardCount { expected: usize, got: usize },
}

/// Comma-joined wire codes, e.g. `Ah,Kd,2c`.
pub fn cards_code(cards: &[Card]) -> String {
    cards
        .iter()
        .map(Card::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

/// Parses a comma-joined card list; the empty string is the empty list.
pub fn parse_cards(code: &str) -> Result<Vec<Card>, ProtocolError> {
    if code.is_empty() {
        return Ok(Vec::new());
    }
    code.split(',')
        .map(|s| s.parse().map_err(|_| ProtocolError::BadCard(code.to_string())))
        .collect()
}

/// Game clock clause, three decimals: `T12.345`.
pub fn clock_clause(seconds: f64) -> String {
    format!("T{:.3}", seconds)
}

/// Seat index clause: `P0` or `P1`.
pub fn seat_clause(seat: usize) -> String {
    format!("P{}", seat)
}

/// Private round hand clause: `H<c1>,...,<c2N>`.
pub fn hand_clause(cards: &[Card]) -> String {
    format!("H{}", cards_code(cards))
}

/// Community clause across boards: `1B<cards>;2B<cards>;...`. Terminal
/// boards contribute an empty card list.
pub fn community_clause(boards: &[Vec<Card>]) -> String {
    boards
        .iter()
        .enumerate()
        .map(|(i, cards)| format!("{}B{}", i + 1, cards_code(cards)))
        .collect::<Vec<_>>()
        .join(";")
}

/// One action's wire code on one board, e.g. `2R40` or `1AAh,Ad`.
pub fn action_code(board_num: usize, action: &Action) -> String {
    match action {
        Action::Fold => format!("{}F", board_num),
        Action::Call => format!("{}C", board_num),
        Action::Check => format!("{}K", board_num),
        Action::Raise(amount) => format!("{}R{}", board_num, amount),
        Action::Assign(cards) => format!("{}A{}", board_num, cards_code(cards)),
    }
}

/// The opponent-facing echo of an assignment step: bare `A` codes that
/// reveal nothing, `1A;2A;...`.
pub fn hidden_assign_clause() -> String {
    (1..=NUM_BOARDS)
        .map(|b| format!("{}A", b))
        .collect::<Vec<_>>()
        .join(";")
}

/// Showdown reveal code for one board: `3O<c1>,<c2>`, or bare `3O` after a
/// fold.
pub fn reveal_code(board_num: usize, cards: &[Card]) -> String {
    format!("{}O{}", board_num, cards_code(cards))
}

/// Round delta clause from the recipient's perspective: `D<own>;D<opp>`.
pub fn delta_clause(delta: i32, opp_delta: i32) -> String {
    format!("D{};D{}", delta, opp_delta)
}

/// Encodes a full action tuple as a response line body, `1K;2K;3K` style.
pub fn encode_actions(actions: &[Action]) -> String {
    actions
        .iter()
        .enumerate()
        .map(|(i, a)| action_code(i + 1, a))
        .collect::<Vec<_>>()
        .join(";")
}

/// Splits a response line into exactly `NUM_BOARDS` board clauses.
///
/// A line containing `;` must carry one clause per board. A lone clause --
/// typically the end-of-round acknowledgement -- is interpreted for every
/// board.
pub fn split_response(line: &str) -> Result<Vec<String>, ProtocolError> {
    let line = line.trim();
    if line.contains(';') {
        let clauses: Vec<String> = line.split(';').map(str::to_string).collect();
        if clauses.len() != NUM_BOARDS {
            return Err(ProtocolError::WrongBoardCount {
                expected: NUM_BOARDS,
                got: clauses.len(),
            });
        }
        Ok(clauses)
    } else {
        Ok(vec![line.to_string(); NUM_BOARDS])
    }
}

/// Decodes just the action letter of a board clause, without touching the
/// payload. The referee checks legality of the letter before paying any
/// attention to amounts or cards.
pub fn decode_kind(clause: &str) -> Result<ActionKind, ProtocolError> {
    let bytes = clause.as_bytes();
    if bytes.len() < 2 {
        return Err(ProtocolError::TruncatedClause(clause.to_string()));
    }
    match bytes[1] {
        b'F' => Ok(ActionKind::Fold),
        b'C' => Ok(ActionKind::Call),
        b'K' => Ok(ActionKind::Check),
        b'R' => Ok(ActionKind::Raise),
        b'A' => Ok(ActionKind::Assign),
        _ => Err(ProtocolError::UnknownAction(clause.to_string())),
    }
}

/// Decodes one board clause into an action.
///
/// The board digit at byte 0 is positional and not cross-checked. An `A`
/// clause with no payload decodes to an empty assignment; that form only
/// appears in the opponent-facing history echo.
pub fn decode_action(clause: &str) -> Result<Action, ProtocolError> {
    let payload = clause.get(2..).unwrap_or("");
    match decode_kind(clause)? {
        ActionKind::Fold => Ok(Action::Fold),
        ActionKind::Call => Ok(Action::Call),
        ActionKind::Check => Ok(Action::Check),
        ActionKind::Raise => payload
            .parse()
            .map(Action::Raise)
            .map_err(|_| ProtocolError::BadAmount(clause.to_string())),
        ActionKind::Assign => parse_cards(payload).map(Action::Assign),
    }
}
