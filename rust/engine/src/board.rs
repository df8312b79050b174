use crate::action::{Action, ActionKind};
use crate::cards::Card;
use crate::hand::evaluate;
use crate::BIG_BLIND;

/// Immutable snapshot of one board's sub-game within a round.
///
/// Every transition produces a fresh snapshot whose `previous` field owns
/// the predecessor, so a board's full history hangs off its latest state.
/// The chain is dropped when the round's terminal state is logged.
#[derive(Debug, Clone)]
pub struct BoardState {
    /// Chips committed to this board in prior streets.
    pub pot: u32,
    /// Chips committed this street, per seat.
    pub pips: [u32; 2],
    /// `None` until the round hand is partitioned onto boards; afterwards an
    /// empty vec marks a seat that has not assigned (or whose cards are
    /// unknown on the player side).
    pub hands: Option<[Vec<Card>; 2]>,
    /// This board's community run-out. The engine holds all five cards and
    /// reveals prefixes by street; the player side holds what was revealed.
    pub deck: Vec<Card>,
    pub previous: Option<Box<BoardState>>,
    /// Street action finished, waiting for the street to advance.
    pub settled: bool,
    /// Whether this board will show both hands at round end; cleared on fold.
    pub reveal: bool,
}

/// Finished board: per-seat payouts plus the snapshot that produced them.
#[derive(Debug, Clone)]
pub struct TerminalBoard {
    /// Chip payout per seat from this board alone. Sums to the board's pot
    /// unless an odd split discarded the remainder chip.
    pub deltas: [u32; 2],
    pub previous: BoardState,
}

/// A board mid-round: still playing, or folded/shown down.
#[derive(Debug, Clone)]
pub enum Board {
    Live(BoardState),
    Terminal(TerminalBoard),
}

impl Board {
    pub fn as_live(&self) -> Option<&BoardState> {
        match self {
            Board::Live(state) => Some(state),
            Board::Terminal(_) => None,
        }
    }

    /// Terminal boards count as settled for street-advancement purposes.
    pub fn is_settled(&self) -> bool {
        match self {
            Board::Live(state) => state.settled,
            Board::Terminal(_) => true,
        }
    }
}

/// The active seat for a given button counter.
pub fn active_seat(button: i32) -> usize {
    button.rem_euclid(2) as usize
}

impl BoardState {
    /// A board at round start: blinds posted as pips, pot pre-seeded with the
    /// board's blind offset, hands not yet partitioned.
    pub fn open(pot: u32, pips: [u32; 2], deck: Vec<Card>) -> Self {
        Self {
            pot,
            pips,
            hands: None,
            deck,
            previous: None,
            settled: false,
            reveal: true,
        }
    }

    fn seat_hand(&self, seat: usize) -> Option<&[Card]> {
        self.hands.as_ref().map(|h| h[seat].as_slice())
    }

    /// The admissible action tags for the active seat on this board.
    pub fn legal_actions(&self, button: i32, stacks: [u32; 2]) -> Vec<ActionKind> {
        let active = active_seat(button);
        let unassigned = match self.seat_hand(active) {
            None => true,
            Some(cards) => cards.is_empty(),
        };
        if unassigned {
            return vec![ActionKind::Assign];
        }
        if self.settled {
            return vec![ActionKind::Check];
        }
        let continue_cost = self.pips[1 - active].saturating_sub(self.pips[active]);
        if continue_cost == 0 {
            // raising requires both players to be able to put chips behind it
            if stacks[0] == 0 || stacks[1] == 0 {
                vec![ActionKind::Check]
            } else {
                vec![ActionKind::Check, ActionKind::Raise]
            }
        } else if continue_cost == stacks[active] || stacks[1 - active] == 0 {
            vec![ActionKind::Fold, ActionKind::Call]
        } else {
            vec![ActionKind::Fold, ActionKind::Call, ActionKind::Raise]
        }
    }

    /// Minimum and maximum legal raise totals for the active seat, expressed
    /// as absolute pips on this board.
    pub fn raise_bounds(&self, button: i32, stacks: [u32; 2]) -> (u32, u32) {
        let active = active_seat(button);
        let continue_cost = self.pips[1 - active].saturating_sub(self.pips[active]);
        let max_contribution = stacks[active].min(stacks[1 - active] + continue_cost);
        let min_contribution = max_contribution.min(continue_cost + continue_cost.max(BIG_BLIND));
        (
            self.pips[active] + min_contribution,
            self.pips[active] + max_contribution,
        )
    }

    /// Advances this board by one action of the active seat.
    pub fn proceed(&self, action: &Action, button: i32, street: u8) -> Board {
        let active = active_seat(button);
        match action {
            Action::Assign(cards) => {
                let mut hands: [Vec<Card>; 2] = [Vec::new(), Vec::new()];
                hands[active] = cards.clone();
                if let Some(existing) = &self.hands {
                    hands[1 - active] = existing[1 - active].clone();
                }
                Board::Live(BoardState {
                    pot: self.pot,
                    pips: self.pips,
                    hands: Some(hands),
                    deck: self.deck.clone(),
                    previous: Some(Box::new(self.clone())),
                    settled: false,
                    reveal: true,
                })
            }
            Action::Fold => {
                let pot = self.pot + self.pips[0] + self.pips[1];
                let deltas = if active == 0 { [0, pot] } else { [pot, 0] };
                Board::Terminal(TerminalBoard {
                    deltas,
                    previous: BoardState {
                        pot,
                        pips: [0, 0],
                        hands: self.hands.clone(),
                        deck: self.deck.clone(),
                        previous: Some(Box::new(self.clone())),
                        settled: true,
                        reveal: false,
                    },
                })
            }
            Action::Call => {
                if button == 0 {
                    // small blind completes pre-flop; big blind still gets an option
                    return Board::Live(BoardState {
                        pot: self.pot,
                        pips: [BIG_BLIND, BIG_BLIND],
                        hands: self.hands.clone(),
                        deck: self.deck.clone(),
                        previous: Some(Box::new(self.clone())),
                        settled: false,
                        reveal: true,
                    });
                }
                let mut pips = self.pips;
                pips[active] = pips[1 - active];
                Board::Live(BoardState {
                    pot: self.pot,
                    pips,
                    hands: self.hands.clone(),
                    deck: self.deck.clone(),
                    previous: Some(Box::new(self.clone())),
                    settled: true,
                    reveal: true,
                })
            }
            Action::Check => {
                let both_acted = (street == 0 && button > 0) || button > 1;
                Board::Live(BoardState {
                    pot: self.pot,
                    pips: self.pips,
                    hands: self.hands.clone(),
                    deck: self.deck.clone(),
                    previous: Some(Box::new(self.clone())),
                    settled: both_acted || self.settled,
                    reveal: self.reveal,
                })
            }
            Action::Raise(amount) => {
                let mut pips = self.pips;
                pips[active] = *amount;
                Board::Live(BoardState {
                    pot: self.pot,
                    pips,
                    hands: self.hands.clone(),
                    deck: self.deck.clone(),
                    previous: Some(Box::new(self.clone())),
                    settled: false,
                    reveal: true,
                })
            }
        }
    }

    /// Resolves this board by hand rank.
    ///
    /// With full information (both two-card hands and a five-card run-out)
    /// the higher hand wins the pot and ties split it, floor division both
    /// ways. With anything less -- which is what the player-side mirror has
    /// -- the payout is a zero-delta placeholder that the wire's `D` clause
    /// later overwrites.
    pub fn showdown(&self) -> TerminalBoard {
        let deltas = match (&self.hands, self.deck.len() >= 5) {
            (Some(hands), true) if hands[0].len() == 2 && hands[1].len() == 2 => {
                let value0 = evaluate(&seven_cards(&self.deck[..5], &hands[0]));
                let value1 = evaluate(&seven_cards(&self.deck[..5], &hands[1]));
                if value0 > value1 {
                    [self.pot, 0]
                } else if value0 < value1 {
                    [0, self.pot]
                } else {
                    // odd pots discard the remainder chip
                    [self.pot / 2, self.pot / 2]
                }
            }
            _ => [0, 0],
        };
        TerminalBoard {
            deltas,
            previous: self.clone(),
        }
    }
}

fn seven_cards(community: &[Card], hole: &[Card]) -> [Card; 7] {
    [
        community[0],
        community[1],
        community[2],
        community[3],
        community[4],
        hole[0],
        hole[1],
    ]
}
