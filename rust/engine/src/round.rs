use crate::action::{Action, ActionKind};
use crate::board::{active_seat, Board, BoardState};
use crate::cards::Card;
use crate::deck::Deck;
use crate::{BIG_BLIND, NUM_BOARDS, SMALL_BLIND, STARTING_STACK};

/// Immutable snapshot of one round across all boards.
///
/// `button` is a step counter, not a seat: it starts at -2 so that both
/// players assign their cards before the small blind opens the betting, and
/// its parity selects the active seat throughout. `street` is 0 before the
/// flop and then the number of revealed community cards (3, 4, 5).
#[derive(Debug, Clone)]
pub struct RoundState {
    pub button: i32,
    pub street: u8,
    /// Chips behind, per seat; shared by every board.
    pub stacks: [u32; 2],
    /// Each seat's full round hand of `2 * NUM_BOARDS` cards.
    pub hands: [Vec<Card>; 2],
    pub boards: [Board; NUM_BOARDS],
    pub previous: Option<Box<RoundState>>,
}

/// Finished round: net chip deltas versus the starting stack, per seat.
/// The deltas always sum to zero or to the negated count of discarded
/// odd-split chips.
#[derive(Debug, Clone)]
pub struct TerminalRound {
    pub deltas: [i32; 2],
    pub previous: RoundState,
}

/// A round in progress or finished.
#[derive(Debug, Clone)]
pub enum Round {
    Live(RoundState),
    Terminal(TerminalRound),
}

impl RoundState {
    /// Deals a fresh round from `master`: `2 * NUM_BOARDS` cards per seat in
    /// order, then one independently shuffled copy of the residual deck per
    /// board, so no board's run-out can collide with a hole card.
    pub fn deal(master: &mut Deck) -> RoundState {
        master.shuffle();
        let hands = [master.deal(2 * NUM_BOARDS), master.deal(2 * NUM_BOARDS)];
        let boards = std::array::from_fn(|i| {
            let mut board_deck = master.residual();
            board_deck.shuffle();
            let run_out = board_deck.deal(5);
            Board::Live(BoardState::open(
                (i as u32 + 1) * BIG_BLIND,
                [SMALL_BLIND, BIG_BLIND],
                run_out,
            ))
        });
        RoundState {
            button: -2,
            street: 0,
            stacks: [
                STARTING_STACK - NUM_BOARDS as u32 * SMALL_BLIND,
                STARTING_STACK - NUM_BOARDS as u32 * BIG_BLIND,
            ],
            hands,
            boards,
            previous: None,
        }
    }

    /// The seat acting this step.
    pub fn active(&self) -> usize {
        active_seat(self.button)
    }

    /// The active seat's admissible action tags, board by board. Terminal
    /// boards accept only the dummy `Check`.
    pub fn legal_actions(&self) -> [Vec<ActionKind>; NUM_BOARDS] {
        std::array::from_fn(|i| match &self.boards[i] {
            Board::Live(state) => state.legal_actions(self.button, self.stacks),
            Board::Terminal(_) => vec![ActionKind::Check],
        })
    }

    /// Minimum and maximum legal raise totals summed across boards.
    ///
    /// The lower bound is always zero because the player may call or check
    /// everywhere instead; per-board minimums still apply to each individual
    /// raise.
    pub fn raise_bounds(&self) -> (u32, u32) {
        let active = self.active();
        let mut net_continue_cost = 0;
        let mut net_pips_unsettled = 0;
        for board in &self.boards {
            if let Board::Live(state) = board {
                if !state.settled {
                    net_continue_cost +=
                        state.pips[1 - active].saturating_sub(state.pips[active]);
                    net_pips_unsettled += state.pips[active];
                }
            }
        }
        (
            0,
            net_pips_unsettled + self.stacks[active].min(self.stacks[1 - active] + net_continue_cost),
        )
    }

    /// Advances every board by the active seat's action tuple, charges the
    /// seat's stack for its total pip increase, and advances the street when
    /// every board has settled.
    pub fn proceed(&self, actions: &[Action; NUM_BOARDS]) -> Round {
        let active = self.active();
        let boards: [Board; NUM_BOARDS] = std::array::from_fn(|i| match &self.boards[i] {
            Board::Live(state) => state.proceed(&actions[i], self.button, self.street),
            terminal => terminal.clone(),
        });
        let mut contribution = 0;
        for i in 0..NUM_BOARDS {
            if let (Board::Live(after), Board::Live(before)) = (&boards[i], &self.boards[i]) {
                contribution += after.pips[active].saturating_sub(before.pips[active]);
            }
        }
        debug_assert!(contribution <= self.stacks[active], "pip increase exceeds stack");
        let mut stacks = self.stacks;
        stacks[active] = stacks[active].saturating_sub(contribution);
        let all_settled = boards.iter().all(Board::is_settled);
        let state = RoundState {
            button: self.button + 1,
            street: self.street,
            stacks,
            hands: self.hands.clone(),
            boards,
            previous: Some(Box::new(self.clone())),
        };
        if all_settled {
            state.proceed_street()
        } else {
            Round::Live(state)
        }
    }

    /// Folds every live board's pips into its pot and moves to the next
    /// street, or to showdown after the river (or once every board is done).
    pub fn proceed_street(&self) -> Round {
        let boards: [Board; NUM_BOARDS] = std::array::from_fn(|i| match &self.boards[i] {
            Board::Live(state) => Board::Live(BoardState {
                pot: state.pot + state.pips[0] + state.pips[1],
                pips: [0, 0],
                hands: state.hands.clone(),
                deck: state.deck.clone(),
                previous: Some(Box::new(state.clone())),
                settled: false,
                reveal: true,
            }),
            terminal => terminal.clone(),
        });
        let all_terminal = boards.iter().all(|b| matches!(b, Board::Terminal(_)));
        if self.street == 5 || all_terminal {
            let state = RoundState {
                button: self.button,
                street: 5,
                stacks: self.stacks,
                hands: self.hands.clone(),
                boards,
                previous: Some(Box::new(self.clone())),
            };
            return Round::Terminal(state.showdown());
        }
        let street = if self.street == 0 { 3 } else { self.street + 1 };
        Round::Live(RoundState {
            button: 1,
            street,
            stacks: self.stacks,
            hands: self.hands.clone(),
            boards,
            previous: Some(Box::new(self.clone())),
        })
    }

    /// Resolves every live board, sums payouts, and nets them against the
    /// starting stack.
    pub fn showdown(&self) -> TerminalRound {
        let boards: [Board; NUM_BOARDS] = std::array::from_fn(|i| match &self.boards[i] {
            Board::Live(state) => Board::Terminal(state.showdown()),
            terminal => terminal.clone(),
        });
        let mut winnings = [0u32; 2];
        for board in &boards {
            if let Board::Terminal(terminal) = board {
                winnings[0] += terminal.deltas[0];
                winnings[1] += terminal.deltas[1];
            }
        }
        let deltas = [
            (self.stacks[0] + winnings[0]) as i32 - STARTING_STACK as i32,
            (self.stacks[1] + winnings[1]) as i32 - STARTING_STACK as i32,
        ];
        TerminalRound {
            deltas,
            previous: RoundState {
                button: self.button,
                street: self.street,
                stacks: self.stacks,
                hands: self.hands.clone(),
                boards,
                previous: Some(Box::new(self.clone())),
            },
        }
    }
}
