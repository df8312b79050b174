use std::array;

use clap::Parser;

use triboard_engine::action::{Action, ActionKind};
use triboard_engine::round::{RoundState, TerminalRound};
use triboard_engine::NUM_BOARDS;
use triboard_skeleton::runner::run_bot;
use triboard_skeleton::{Bot, GameState};

/// Reference bot: assigns its hole cards to boards in dealt order, then
/// check/calls everything.
#[derive(Debug, Parser)]
#[command(name = "example-bot")]
struct Args {
    /// Host the engine is listening on
    #[arg(long, default_value = "localhost")]
    host: String,
    /// Port assigned by the engine
    port: u16,
}

struct ExampleBot;

impl Bot for ExampleBot {
    fn handle_new_round(&mut self, _game: &GameState, _round: &RoundState, _seat: usize) {}

    fn handle_round_over(&mut self, _game: &GameState, _terminal: &TerminalRound, _seat: usize) {}

    fn get_actions(
        &mut self,
        _game: &GameState,
        round: &RoundState,
        seat: usize,
    ) -> [Action; NUM_BOARDS] {
        let legal = round.legal_actions();
        array::from_fn(|i| {
            if legal[i].contains(&ActionKind::Assign) {
                Action::Assign(round.hands[seat][2 * i..2 * i + 2].to_vec())
            } else if legal[i].contains(&ActionKind::Check) {
                Action::Check
            } else {
                Action::Call
            }
        })
    }
}

fn main() {
    let args = Args::parse();
    if let Err(e) = run_bot(ExampleBot, &args.host, args.port) {
        eprintln!("Could not run bot against {}:{}: {}", args.host, args.port, e);
        std::process::exit(1);
    }
}
