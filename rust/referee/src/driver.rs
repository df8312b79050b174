use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use tracing::warn;

use triboard_engine::action::Action;
use triboard_engine::board::Board;
use triboard_engine::cards::Card;
use triboard_engine::deck::Deck;
use triboard_engine::logger::{ActionEntry, BoardRecord, RoundLogger, RoundRecord};
use triboard_engine::protocol;
use triboard_engine::round::{Round, RoundState, TerminalRound};
use triboard_engine::{BIG_BLIND, NUM_BOARDS, SMALL_BLIND};

use crate::config::Config;
use crate::connector::PlayerSession;
use crate::error::RefereeError;
use crate::gamelog::{pretty_cards, street_name, GameLog};

/// Runs the match: `num_rounds` rounds against a pair of player sessions,
/// alternating seats between rounds, maintaining the game log and each
/// seat's pending protocol clauses.
pub struct Game {
    config: Config,
    log: GameLog,
    player_messages: [Vec<String>; 2],
    rng: ChaCha20Rng,
    round_logger: RoundLogger,
}

impl Game {
    pub fn new(config: &Config) -> Result<Self, RefereeError> {
        let log = GameLog::new(format!(
            "Triple-board hold'em - {} vs {}",
            config.player_1_name, config.player_2_name
        ));
        let seed = config.seed.unwrap_or_else(rand::random);
        let round_logger = match &config.round_log {
            Some(path) => RoundLogger::create(path)?,
            None => RoundLogger::disabled(),
        };
        Ok(Self {
            config: config.clone(),
            log,
            player_messages: [Vec::new(), Vec::new()],
            rng: ChaCha20Rng::seed_from_u64(seed),
            round_logger,
        })
    }

    pub fn game_log(&self) -> &GameLog {
        &self.log
    }

    /// Writes the transcript to `<game_log_filename>.txt`.
    pub fn write_game_log(&self) -> Result<(), RefereeError> {
        self.log
            .write_to(format!("{}.txt", self.config.game_log_filename))?;
        Ok(())
    }

    /// Plays out the whole match. Seats swap after every round so each
    /// player alternates between small and big blind.
    pub fn run<P: PlayerSession>(&mut self, players: &mut [P; 2]) {
        for round_num in 1..=self.config.num_rounds {
            self.log.push(String::new());
            self.log.push(format!("Round #{}{}", round_num, status(players)));
            self.run_round(players, round_num);
            players.swap(0, 1);
        }
        self.log.push(String::new());
        self.log.push(format!("Final{}", status(players)));
    }

    fn run_round<P: PlayerSession>(&mut self, players: &mut [P; 2], round_num: u32) {
        let mut master = Deck::new_with_seed(self.rng.next_u64());
        let mut round = Round::Live(RoundState::deal(&mut master));
        let mut entries: Vec<ActionEntry> = Vec::new();
        loop {
            let state = match &round {
                Round::Live(state) => state,
                Round::Terminal(_) => break,
            };
            self.log_round_state(players, state);
            let seat = state.active();
            let actions =
                players[seat].query(&round, &mut self.player_messages[seat], &mut self.log, seat);
            let street = state.street;
            let bet_overrides: [bool; NUM_BOARDS] = std::array::from_fn(|i| {
                state.boards[i]
                    .as_live()
                    .map(|b| b.pips == [0, 0])
                    .unwrap_or(false)
            });
            let name = players[seat].name().to_string();
            self.log_actions(&name, &actions, &bet_overrides, seat);
            for (i, action) in actions.iter().enumerate() {
                entries.push(ActionEntry {
                    seat,
                    street,
                    board: i + 1,
                    action: action.clone(),
                });
            }
            round = state.proceed(&actions);
        }
        let Round::Terminal(terminal) = &round else {
            return;
        };
        self.log_terminal_state(players, terminal);
        for seat in 0..2 {
            players[seat].query(&round, &mut self.player_messages[seat], &mut self.log, seat);
            players[seat].credit(terminal.deltas[seat] as i64);
        }
        self.write_round_record(players, terminal, entries, round_num);
    }

    /// Logs the new state and queues the protocol clauses it implies: the
    /// hand deal at round start, the community clause at each street start.
    fn log_round_state<P: PlayerSession>(&mut self, players: &[P; 2], state: &RoundState) {
        if state.street == 0 && state.button == -2 {
            self.log.push(format!(
                "{} posts the blind of {} on each board",
                players[0].name(),
                SMALL_BLIND
            ));
            self.log.push(format!(
                "{} posts the blind of {} on each board",
                players[1].name(),
                BIG_BLIND
            ));
            self.log.push(format!(
                "{} dealt {}",
                players[0].name(),
                pretty_cards(&state.hands[0])
            ));
            self.log.push(format!(
                "{} dealt {}",
                players[1].name(),
                pretty_cards(&state.hands[1])
            ));
            self.player_messages[0] = vec![
                "T0.000".to_string(),
                protocol::seat_clause(0),
                protocol::hand_clause(&state.hands[0]),
            ];
            self.player_messages[1] = vec![
                "T0.000".to_string(),
                protocol::seat_clause(1),
                protocol::hand_clause(&state.hands[1]),
            ];
        } else if state.street > 0 && state.button == 1 {
            let revealed: Vec<Vec<Card>> = state
                .boards
                .iter()
                .map(|board| match board {
                    Board::Live(bs) => {
                        bs.deck[..(state.street as usize).min(bs.deck.len())].to_vec()
                    }
                    Board::Terminal(_) => Vec::new(),
                })
                .collect();
            for i in 0..NUM_BOARDS {
                match &state.boards[i] {
                    Board::Live(bs) => self.log.push(format!(
                        "{} {}, ({}), {} ({}), {} ({}) on board {}",
                        street_name(state.street),
                        pretty_cards(&revealed[i]),
                        bs.pot,
                        players[0].name(),
                        state.stacks[0],
                        players[1].name(),
                        state.stacks[1],
                        i + 1
                    )),
                    Board::Terminal(tb) => self
                        .log
                        .push(format!("Board {}, ({})", i + 1, tb.previous.pot)),
                }
            }
            let clause = protocol::community_clause(&revealed);
            self.player_messages[0].push(clause.clone());
            self.player_messages[1].push(clause);
        }
    }

    /// Logs the action tuple and queues its wire echo. Assignments stay
    /// private: the opponent only learns that an assignment happened.
    fn log_actions(
        &mut self,
        name: &str,
        actions: &[Action; NUM_BOARDS],
        bet_overrides: &[bool; NUM_BOARDS],
        seat: usize,
    ) {
        let codes: Vec<String> = (0..NUM_BOARDS)
            .map(|i| self.log_board_action(name, &actions[i], bet_overrides[i], i + 1))
            .collect();
        let code = codes.join(";");
        if actions.iter().any(|a| matches!(a, Action::Assign(_))) {
            self.player_messages[seat].push(code);
            self.player_messages[1 - seat].push(protocol::hidden_assign_clause());
        } else {
            self.player_messages[0].push(code.clone());
            self.player_messages[1].push(code);
        }
    }

    fn log_board_action(
        &mut self,
        name: &str,
        action: &Action,
        bet_override: bool,
        board_num: usize,
    ) -> String {
        let phrasing = match action {
            Action::Assign(cards) => {
                format!(" assigns {} to board {}", pretty_cards(cards), board_num)
            }
            Action::Fold => format!(" folds on board {}", board_num),
            Action::Call => format!(" calls on board {}", board_num),
            Action::Check => format!(" checks on board {}", board_num),
            Action::Raise(amount) => format!(
                " {} {} on board {}",
                if bet_override { "bets" } else { "raises to" },
                amount,
                board_num
            ),
        };
        self.log.push(format!("{}{}", name, phrasing));
        protocol::action_code(board_num, action)
    }

    /// Logs reveals and payouts, and queues the `O` and `D` clauses from
    /// each seat's perspective.
    fn log_terminal_state<P: PlayerSession>(&mut self, players: &[P; 2], terminal: &TerminalRound) {
        let previous_round = &terminal.previous;
        let mut codes_zero = vec![String::new(); NUM_BOARDS];
        let mut codes_one = vec![String::new(); NUM_BOARDS];
        for i in 0..NUM_BOARDS {
            let shown = match &previous_round.boards[i] {
                Board::Terminal(tb) => {
                    let previous_board = &tb.previous;
                    match (&previous_board.hands, previous_board.reveal) {
                        (Some(hands), true) => Some([hands[0].clone(), hands[1].clone()]),
                        _ => None,
                    }
                }
                Board::Live(_) => None,
            };
            match shown {
                Some(hands) => {
                    self.log.push(format!(
                        "{} shows {} on board {}",
                        players[0].name(),
                        pretty_cards(&hands[0]),
                        i + 1
                    ));
                    self.log.push(format!(
                        "{} shows {} on board {}",
                        players[1].name(),
                        pretty_cards(&hands[1]),
                        i + 1
                    ));
                    codes_zero[i] = protocol::reveal_code(i + 1, &hands[1]);
                    codes_one[i] = protocol::reveal_code(i + 1, &hands[0]);
                }
                None => {
                    codes_zero[i] = protocol::reveal_code(i + 1, &[]);
                    codes_one[i] = protocol::reveal_code(i + 1, &[]);
                }
            }
        }
        self.player_messages[0].push(codes_zero.join(";"));
        self.player_messages[1].push(codes_one.join(";"));
        self.log.push(format!(
            "{} awarded {}",
            players[0].name(),
            terminal.deltas[0]
        ));
        self.log.push(format!(
            "{} awarded {}",
            players[1].name(),
            terminal.deltas[1]
        ));
        self.player_messages[0].push(protocol::delta_clause(
            terminal.deltas[0],
            terminal.deltas[1],
        ));
        self.player_messages[1].push(protocol::delta_clause(
            terminal.deltas[1],
            terminal.deltas[0],
        ));
    }

    fn write_round_record<P: PlayerSession>(
        &mut self,
        players: &[P; 2],
        terminal: &TerminalRound,
        actions: Vec<ActionEntry>,
        round_num: u32,
    ) {
        let boards = terminal
            .previous
            .boards
            .iter()
            .map(|board| match board {
                Board::Terminal(tb) => BoardRecord {
                    community: tb.previous.deck.clone(),
                    revealed: tb.previous.reveal,
                    winnings: tb.deltas,
                },
                Board::Live(bs) => BoardRecord {
                    community: bs.deck.clone(),
                    revealed: false,
                    winnings: [0, 0],
                },
            })
            .collect();
        let record = RoundRecord {
            round_num,
            boards,
            actions,
            deltas: terminal.deltas,
            bankrolls: [players[0].bankroll(), players[1].bankroll()],
            ts: None,
        };
        if let Err(e) = self.round_logger.write(&record) {
            warn!("round record write failed: {}", e);
        }
    }
}

fn status<P: PlayerSession>(players: &[P; 2]) -> String {
    players
        .iter()
        .map(|p| format!(", {} ({})", p.name(), p.bankroll()))
        .collect()
}
