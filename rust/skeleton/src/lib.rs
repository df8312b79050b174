//! # triboard-skeleton
//!
//! The player side of the triple-board match protocol. The engine sends an
//! incremental transcript of the round over a line-oriented socket; the
//! [`runner::Runner`] replays it through the shared game tree in
//! `triboard-engine` so a bot sees the same `RoundState` the referee holds,
//! minus the opponent's hidden cards.
//!
//! Implement [`Bot`] and hand it to [`runner::run_bot`].

pub mod runner;

use triboard_engine::action::Action;
use triboard_engine::round::{RoundState, TerminalRound};
use triboard_engine::NUM_BOARDS;

/// Match-level standing as seen by this player.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GameState {
    /// Net chips won or lost since the match began
    pub bankroll: i64,
    /// Same, for the opponent
    pub opp_bankroll: i64,
    /// Seconds of thinking time left for the whole match
    pub game_clock: f64,
    /// Current round number, starting at 1
    pub round_num: u32,
}

/// The hooks a bot implements. `get_actions` is called whenever the engine
/// is waiting on this player mid-round; the two handlers bracket each round.
pub trait Bot {
    fn handle_new_round(&mut self, game: &GameState, round: &RoundState, seat: usize);
    fn handle_round_over(&mut self, game: &GameState, terminal: &TerminalRound, seat: usize);
    fn get_actions(
        &mut self,
        game: &GameState,
        round: &RoundState,
        seat: usize,
    ) -> [Action; NUM_BOARDS];
}
