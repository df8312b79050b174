//! Reconstructs the round on the player side of the socket.
//!
//! The engine sends each state change exactly once. The runner folds every
//! clause into a mirrored [`Round`], invokes the bot's hooks, and answers
//! each in-round packet with the bot's actions (or the end-of-round
//! acknowledgement). Everything is replayed through the same `proceed`
//! logic the referee uses, so the mirror cannot drift from the engine.

use std::io::{self, BufRead, BufReader, Write};
use std::net::TcpStream;

use triboard_engine::action::Action;
use triboard_engine::board::{Board, BoardState};
use triboard_engine::cards::Card;
use triboard_engine::protocol;
use triboard_engine::round::{Round, RoundState, TerminalRound};
use triboard_engine::{BIG_BLIND, NUM_BOARDS, SMALL_BLIND, STARTING_STACK};

use crate::{Bot, GameState};

/// Drives one bot over a pair of line-oriented streams. Generic over the
/// streams so tests can run it against in-memory transcripts.
pub struct Runner<B, R, W> {
    bot: B,
    reader: R,
    writer: W,
}

/// Connects to the engine and runs the bot until the quit clause.
pub fn run_bot<B: Bot>(bot: B, host: &str, port: u16) -> io::Result<()> {
    let stream = TcpStream::connect((host, port))?;
    let reader = BufReader::new(stream.try_clone()?);
    let mut runner = Runner::new(bot, reader, stream);
    runner.run()
}

impl<B: Bot, R: BufRead, W: Write> Runner<B, R, W> {
    pub fn new(bot: B, reader: R, writer: W) -> Self {
        Self { bot, reader, writer }
    }

    fn send(&mut self, actions: &[Action; NUM_BOARDS]) -> io::Result<()> {
        writeln!(self.writer, "{}", protocol::encode_actions(actions))?;
        self.writer.flush()
    }

    pub fn run(&mut self) -> io::Result<()> {
        let mut game = GameState {
            bankroll: 0,
            opp_bankroll: 0,
            game_clock: 0.0,
            round_num: 1,
        };
        let mut seat = 0usize;
        let mut round: Option<Round> = None;
        let mut round_over = true;
        let mut line = String::new();
        loop {
            line.clear();
            if self.reader.read_line(&mut line)? == 0 {
                return Ok(());
            }
            for clause in line.split_whitespace() {
                match clause.as_bytes().first() {
                    Some(b'T') => {
                        if let Ok(clock) = clause[1..].parse() {
                            game.game_clock = clock;
                        }
                    }
                    Some(b'P') => {
                        if let Ok(index) = clause[1..].parse::<usize>() {
                            if index < 2 {
                                seat = index;
                            }
                        }
                    }
                    Some(b'H') => {
                        let Ok(cards) = protocol::parse_cards(&clause[1..]) else {
                            continue;
                        };
                        let state = fresh_round(cards, seat);
                        if round_over {
                            self.bot.handle_new_round(&game, &state, seat);
                            round_over = false;
                        }
                        round = Some(Round::Live(state));
                    }
                    Some(b'D') => {
                        let parts: Vec<&str> = clause.split(';').collect();
                        if parts.len() != 2 {
                            continue;
                        }
                        let delta: i32 = parts[0].get(1..).unwrap_or("").parse().unwrap_or(0);
                        let opp_delta: i32 = parts[1].get(1..).unwrap_or("").parse().unwrap_or(0);
                        match round.take() {
                            Some(Round::Terminal(settled)) => {
                                let mut deltas = [0i32; 2];
                                deltas[seat] = delta;
                                deltas[1 - seat] = opp_delta;
                                let terminal = TerminalRound {
                                    deltas,
                                    previous: settled.previous,
                                };
                                game.bankroll += delta as i64;
                                game.opp_bankroll += opp_delta as i64;
                                self.bot.handle_round_over(&game, &terminal, seat);
                                game.round_num += 1;
                                round_over = true;
                                round = Some(Round::Terminal(terminal));
                            }
                            other => round = other,
                        }
                    }
                    Some(b'Q') => return Ok(()),
                    Some(c) if c.is_ascii_digit() => {
                        round = round.map(|r| apply_board_clauses(clause, r, seat));
                    }
                    _ => {}
                }
            }
            if round_over {
                // acknowledge the end-of-round messages
                self.send(&std::array::from_fn(|_| Action::Check))?;
            } else if let Some(Round::Live(state)) = &round {
                let actions = self.bot.get_actions(&game, state, seat);
                self.send(&actions)?;
            }
        }
    }
}

/// The mirrored state at a round start: blinds posted, the opponent's cards
/// unknown, no community cards revealed yet.
fn fresh_round(cards: Vec<Card>, seat: usize) -> RoundState {
    let mut hands: [Vec<Card>; 2] = [Vec::new(), Vec::new()];
    hands[seat] = cards;
    let boards: [Board; NUM_BOARDS] = std::array::from_fn(|i| {
        Board::Live(BoardState::open(
            (i as u32 + 1) * BIG_BLIND,
            [SMALL_BLIND, BIG_BLIND],
            Vec::new(),
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

/// Dispatches a digit-prefixed compound clause by the letter of its first
/// sub-clause: community reveal, showdown reveal, or an action tuple.
fn apply_board_clauses(clause: &str, round: Round, seat: usize) -> Round {
    let subclauses: Vec<&str> = clause.split(';').collect();
    match subclauses.first().and_then(|s| s.as_bytes().get(1)) {
        Some(b'B') => apply_community(&subclauses, round),
        Some(b'O') => apply_reveals(&subclauses, round, seat),
        _ => apply_actions(&subclauses, round),
    }
}

/// Replaces each board's revealed community cards, inside live boards and
/// terminal wrappers alike.
fn apply_community(subclauses: &[&str], round: Round) -> Round {
    let state = match round {
        Round::Live(state) => state,
        terminal => return terminal,
    };
    let boards: [Board; NUM_BOARDS] = std::array::from_fn(|i| {
        let payload = subclauses.get(i).and_then(|s| s.get(2..)).unwrap_or("");
        let cards = protocol::parse_cards(payload).unwrap_or_default();
        match &state.boards[i] {
            Board::Live(board) => {
                let mut board = board.clone();
                board.deck = cards;
                Board::Live(board)
            }
            Board::Terminal(terminal) => {
                let mut terminal = terminal.clone();
                terminal.previous.deck = cards;
                Board::Terminal(terminal)
            }
        }
    });
    Round::Live(RoundState { boards, ..state })
}

/// Installs the opponent's revealed cards into each shown-down board and
/// rebuilds the terminal wrapper; the following `D` clause sets the deltas.
fn apply_reveals(subclauses: &[&str], round: Round, seat: usize) -> Round {
    let terminal = match round {
        Round::Terminal(terminal) => terminal,
        live => return live,
    };
    let inner = terminal.previous;
    let boards: [Board; NUM_BOARDS] = std::array::from_fn(|i| {
        let payload = subclauses.get(i).and_then(|s| s.get(2..)).unwrap_or("");
        let cards = match protocol::parse_cards(payload) {
            Ok(cards) if !cards.is_empty() => cards,
            _ => return inner.boards[i].clone(),
        };
        match &inner.boards[i] {
            Board::Terminal(board) => {
                let mut board = board.clone();
                if let Some(hands) = &mut board.previous.hands {
                    hands[1 - seat] = cards;
                }
                Board::Terminal(board)
            }
            live => live.clone(),
        }
    });
    Round::Terminal(TerminalRound {
        deltas: [0, 0],
        previous: RoundState { boards, ..inner },
    })
}

/// Advances the mirror by one action tuple (the engine echoes both players'
/// actions, so this is how the bot's own moves take effect too).
fn apply_actions(subclauses: &[&str], round: Round) -> Round {
    let state = match round {
        Round::Live(state) => state,
        terminal => return terminal,
    };
    let mut decoded = Vec::with_capacity(NUM_BOARDS);
    for i in 0..NUM_BOARDS {
        let sub = subclauses.get(i).copied().unwrap_or("");
        match protocol::decode_action(sub) {
            Ok(action) => decoded.push(action),
            Err(_) => return Round::Live(state),
        }
    }
    match <[Action; NUM_BOARDS]>::try_from(decoded) {
        Ok(actions) => state.proceed(&actions),
        Err(_) => Round::Live(state),
    }
}
