use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, Read, Write};
use std::net::{Shutdown, TcpListener, TcpStream};
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use serde::Deserialize;
use tracing::{info, warn};

use triboard_engine::action::{Action, ActionKind};
use triboard_engine::board::Board;
use triboard_engine::cards::Card;
use triboard_engine::protocol::{self, ProtocolError};
use triboard_engine::round::Round;
use triboard_engine::NUM_BOARDS;

use crate::config::Config;
use crate::gamelog::GameLog;

/// Source of one player's actions for a step of the match loop.
///
/// The driver is generic over this seam so scripted sessions can stand in
/// for real subprocesses in tests.
pub trait PlayerSession {
    fn name(&self) -> &str;
    fn bankroll(&self) -> i64;
    fn credit(&mut self, delta: i64);
    /// Requests `NUM_BOARDS` actions. `message` is the pending clause list
    /// for this seat; a real session consumes it and resets it to the clock
    /// placeholder. At a round terminal this is the end-of-round
    /// acknowledgement query.
    fn query(
        &mut self,
        round: &Round,
        message: &mut Vec<String>,
        game_log: &mut GameLog,
        seat: usize,
    ) -> [Action; NUM_BOARDS];
    fn stop(&mut self) {}
}

/// The `commands.json` contract at each player path.
#[derive(Debug, Clone, Deserialize)]
struct Commands {
    build: Vec<String>,
    run: Vec<String>,
}

/// Why a reply line produced no usable action tuple.
#[derive(Debug)]
pub enum ReplyFault {
    /// Reply did not split into `NUM_BOARDS` board clauses; fatal to the
    /// player's clock
    WrongActionCount,
    /// Reply could not be decoded; carries the raw line for the log
    Misformatted(String),
    /// Decoded fine but failed a cross-board sanity check (already logged)
    Rejected,
}

/// Why a query produced no usable action tuple.
enum Fault {
    /// Game clock exhausted, or the socket read timed out
    OutOfTime,
    /// Socket write/read failed or the peer closed the connection
    Disconnected,
    /// The reply itself was unusable
    Reply(ReplyFault),
}

/// Owns one external player process: its build, its socket, its game clock,
/// and its captured output. Every communication fault degrades the player to
/// default actions instead of stopping the match.
pub struct Connector {
    name: String,
    path: PathBuf,
    game_clock: f64,
    bankroll: i64,
    enforce_game_clock: bool,
    build_timeout: Duration,
    connect_timeout: Duration,
    log_size_limit: usize,
    commands: Option<Commands>,
    child: Option<Child>,
    sock_reader: Option<BufReader<TcpStream>>,
    sock_writer: Option<TcpStream>,
    output_tx: Sender<Vec<u8>>,
    output_rx: Receiver<Vec<u8>>,
    drains: Vec<JoinHandle<()>>,
}

impl Connector {
    pub fn new(name: &str, path: &str, config: &Config) -> Self {
        let (output_tx, output_rx) = channel();
        Self {
            name: name.to_string(),
            path: PathBuf::from(path),
            game_clock: config.starting_game_clock,
            bankroll: 0,
            enforce_game_clock: config.enforce_game_clock,
            build_timeout: Duration::from_secs_f64(config.build_timeout),
            connect_timeout: Duration::from_secs_f64(config.connect_timeout),
            log_size_limit: config.player_log_size_limit,
            commands: None,
            child: None,
            sock_reader: None,
            sock_writer: None,
            output_tx,
            output_rx,
            drains: Vec::new(),
        }
    }

    /// Loads `commands.json` and runs the build command. Any failure leaves
    /// the connector unusable; the match continues with default actions.
    pub fn build(&mut self) {
        match fs::read_to_string(self.path.join("commands.json")) {
            Ok(text) => match serde_json::from_str::<Commands>(&text) {
                Ok(commands) => self.commands = Some(commands),
                Err(_) => warn!("{} commands.json misformatted", self.name),
            },
            Err(_) => warn!("{} commands.json not found - check the player path", self.name),
        }
        let build_cmd = match &self.commands {
            Some(commands) if !commands.build.is_empty() => commands.build.clone(),
            _ => return,
        };
        let mut child = match self.spawn_command(&build_cmd, None) {
            Ok(child) => child,
            Err(_) => {
                warn!("{} build failed - check \"build\" in commands.json", self.name);
                return;
            }
        };
        self.capture_output(&mut child);
        if !wait_with_deadline(&mut child, self.build_timeout) {
            let message = format!("Timed out waiting for {} to build", self.name);
            warn!("{}", message);
            let _ = self.output_tx.send(message.into_bytes());
            let _ = child.kill();
            let _ = child.wait();
            // the bot never finished building; treat it as absent
            self.commands = None;
        }
    }

    /// Starts the bot with an ephemeral listening port appended to its run
    /// command, then waits for it to connect back.
    pub fn run(&mut self) {
        let run_cmd = match &self.commands {
            Some(commands) if !commands.run.is_empty() => commands.run.clone(),
            _ => return,
        };
        let listener = match TcpListener::bind(("127.0.0.1", 0)) {
            Ok(listener) => listener,
            Err(e) => {
                warn!("{} could not open a listening socket: {}", self.name, e);
                return;
            }
        };
        let port = match listener.local_addr() {
            Ok(addr) => addr.port(),
            Err(_) => return,
        };
        let mut child = match self.spawn_command(&run_cmd, Some(port)) {
            Ok(child) => child,
            Err(_) => {
                warn!("{} run failed - check \"run\" in commands.json", self.name);
                return;
            }
        };
        self.capture_output(&mut child);
        self.child = Some(child);
        match accept_with_deadline(&listener, self.connect_timeout) {
            Some(stream) => {
                let _ = stream.set_read_timeout(Some(self.connect_timeout));
                let _ = stream.set_nodelay(true);
                match stream.try_clone() {
                    Ok(writer) => {
                        self.sock_reader = Some(BufReader::new(stream));
                        self.sock_writer = Some(writer);
                        info!("{} connected successfully", self.name);
                    }
                    Err(e) => warn!("{} socket setup failed: {}", self.name, e),
                }
            }
            None => warn!("Timed out waiting for {} to connect", self.name),
        }
    }

    /// Sends the quit clause, tears the subprocess down, and writes the
    /// captured output to `<name>.txt`, capped at the configured byte limit.
    pub fn shutdown(&mut self) {
        if let Some(writer) = &mut self.sock_writer {
            let _ = writer.write_all(b"Q\n");
            let _ = writer.flush();
            let _ = writer.shutdown(Shutdown::Both);
        }
        self.sock_reader = None;
        self.sock_writer = None;
        if let Some(mut child) = self.child.take() {
            if !wait_with_deadline(&mut child, self.connect_timeout) {
                warn!("Timed out waiting for {} to quit", self.name);
                let _ = child.kill();
                let _ = child.wait();
            }
        }
        for handle in self.drains.drain(..) {
            let _ = handle.join();
        }
        if let Ok(mut file) = File::create(format!("{}.txt", self.name)) {
            let mut written = 0usize;
            for chunk in self.output_rx.try_iter() {
                if written >= self.log_size_limit {
                    break;
                }
                let take = chunk.len().min(self.log_size_limit - written);
                let _ = file.write_all(&chunk[..take]);
                written += take;
            }
        }
    }

    fn spawn_command(&self, cmd: &[String], port: Option<u16>) -> io::Result<Child> {
        let mut command = Command::new(&cmd[0]);
        command
            .args(&cmd[1..])
            .current_dir(&self.path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(port) = port {
            command.arg(port.to_string());
        }
        command.spawn()
    }

    /// Starts daemon readers that copy the child's stdout and stderr into
    /// the output queue. They exit when the pipes close.
    fn capture_output(&mut self, child: &mut Child) {
        if let Some(stdout) = child.stdout.take() {
            self.drains.push(drain_pipe(stdout, self.output_tx.clone()));
        }
        if let Some(stderr) = child.stderr.take() {
            self.drains.push(drain_pipe(stderr, self.output_tx.clone()));
        }
    }

    fn exchange(
        &mut self,
        round: &Round,
        message: &mut Vec<String>,
        seat: usize,
        game_log: &mut GameLog,
    ) -> Result<[Action; NUM_BOARDS], Fault> {
        message[0] = protocol::clock_clause(self.game_clock);
        let outbound = format!("{}\n", message.join(" "));
        // the action history is only ever sent once
        message.truncate(1);

        let start = Instant::now();
        let writer = self.sock_writer.as_mut().ok_or(Fault::Disconnected)?;
        writer
            .write_all(outbound.as_bytes())
            .and_then(|_| writer.flush())
            .map_err(|_| Fault::Disconnected)?;
        let mut line = String::new();
        let reader = self.sock_reader.as_mut().ok_or(Fault::Disconnected)?;
        match reader.read_line(&mut line) {
            Ok(0) => return Err(Fault::Disconnected),
            Ok(_) => {}
            Err(e) if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) => {
                return Err(Fault::OutOfTime)
            }
            Err(_) => return Err(Fault::Disconnected),
        }
        if self.enforce_game_clock {
            self.game_clock -= start.elapsed().as_secs_f64();
        }
        if self.game_clock <= 0.0 {
            return Err(Fault::OutOfTime);
        }

        parse_reply(&self.name, &line, round, seat, game_log).map_err(Fault::Reply)
    }
}

/// Decodes and validates a full reply line against the current round.
///
/// Per-board illegal attempts are logged and replaced by that board's
/// default action; decode failures and failed cross-board sanity checks
/// void the whole reply so the caller falls back to defaults.
pub fn parse_reply(
    name: &str,
    line: &str,
    round: &Round,
    seat: usize,
    game_log: &mut GameLog,
) -> Result<[Action; NUM_BOARDS], ReplyFault> {
    let raw = line.trim().to_string();
    let clauses = protocol::split_response(&raw).map_err(|_| ReplyFault::WrongActionCount)?;
    let (button, stacks, boards, hands, live) = match round {
        Round::Live(state) => (state.button, state.stacks, &state.boards, &state.hands, true),
        Round::Terminal(terminal) => (
            terminal.previous.button,
            terminal.previous.stacks,
            &terminal.previous.boards,
            &terminal.previous.hands,
            false,
        ),
    };

    let mut decoded = Vec::with_capacity(NUM_BOARDS);
    for i in 0..NUM_BOARDS {
        let action = query_board(name, &boards[i], &clauses[i], button, stacks, game_log)
            .map_err(|_| ReplyFault::Misformatted(raw.clone()))?;
        decoded.push(action);
    }
    let Ok(actions) = <[Action; NUM_BOARDS]>::try_from(decoded) else {
        return Err(ReplyFault::Misformatted(raw));
    };

    if actions.iter().all(|a| matches!(a, Action::Assign(_))) {
        if assignment_covers_hand(&actions, &hands[seat]) {
            return Ok(actions);
        }
        game_log.push(format!("{} attempted illegal assignment", name));
        return Err(ReplyFault::Rejected);
    }

    // net chips this tuple adds across boards, bounded by the stack
    let mut contribution: i64 = 0;
    for i in 0..NUM_BOARDS {
        if let Board::Live(state) = &boards[i] {
            match &actions[i] {
                Action::Raise(amount) => contribution += *amount as i64 - state.pips[seat] as i64,
                Action::Call => {
                    contribution += state.pips[1 - seat] as i64 - state.pips[seat] as i64
                }
                _ => {}
            }
        }
    }
    let max_contribution = if live { stacks[seat] as i64 } else { 0 };
    if contribution < 0 || contribution > max_contribution {
        game_log.push(format!("{} attempted a net illegal raise or call total", name));
        return Err(ReplyFault::Rejected);
    }
    Ok(actions)
}

/// Decodes and validates one board's clause. Well-formed but illegal
/// attempts are logged and replaced by that board's default; decode
/// failures bubble up and void the whole reply.
fn query_board(
    name: &str,
    board: &Board,
    clause: &str,
    button: i32,
    stacks: [u32; 2],
    game_log: &mut GameLog,
) -> Result<Action, ProtocolError> {
    let legal = match board {
        Board::Live(state) => state.legal_actions(button, stacks),
        Board::Terminal(_) => vec![ActionKind::Check],
    };
    let kind = protocol::decode_kind(clause)?;
    if legal.contains(&kind) {
        match protocol::decode_action(clause)? {
            Action::Raise(amount) => {
                if let Board::Live(state) = board {
                    let (min_raise, max_raise) = state.raise_bounds(button, stacks);
                    if (min_raise..=max_raise).contains(&amount) {
                        return Ok(Action::Raise(amount));
                    }
                }
            }
            Action::Assign(cards) => {
                if cards.len() == 2 {
                    return Ok(Action::Assign(cards));
                }
            }
            action => return Ok(action),
        }
    }
    game_log.push(format!("{} attempted illegal {:?}", name, kind));
    Ok(default_for(&legal))
}

impl PlayerSession for Connector {
    fn name(&self) -> &str {
        &self.name
    }

    fn bankroll(&self) -> i64 {
        self.bankroll
    }

    fn credit(&mut self, delta: i64) {
        self.bankroll += delta;
    }

    fn query(
        &mut self,
        round: &Round,
        message: &mut Vec<String>,
        game_log: &mut GameLog,
        seat: usize,
    ) -> [Action; NUM_BOARDS] {
        if self.sock_writer.is_some() && self.game_clock > 0.0 {
            match self.exchange(round, message, seat, game_log) {
                Ok(actions) => return actions,
                Err(Fault::OutOfTime) => {
                    let line = format!("{} ran out of time", self.name);
                    warn!("{}", line);
                    game_log.push(line);
                    self.game_clock = 0.0;
                }
                Err(Fault::Reply(ReplyFault::WrongActionCount)) => {
                    let line = format!("{} did not submit {} actions", self.name, NUM_BOARDS);
                    warn!("{}", line);
                    game_log.push(line);
                    self.game_clock = 0.0;
                }
                Err(Fault::Disconnected) => {
                    let line = format!("{} disconnected", self.name);
                    warn!("{}", line);
                    game_log.push(line);
                    self.game_clock = 0.0;
                }
                Err(Fault::Reply(ReplyFault::Misformatted(raw))) => {
                    game_log.push(format!("{} response misformatted: {}", self.name, raw));
                }
                Err(Fault::Reply(ReplyFault::Rejected)) => {}
            }
        }
        default_actions(round)
    }

    fn stop(&mut self) {
        self.shutdown();
    }
}

/// The substitute action tuple for an unusable or misbehaving player:
/// `Check` where legal, `Fold` otherwise.
pub fn default_actions(round: &Round) -> [Action; NUM_BOARDS] {
    match round {
        Round::Live(state) => {
            let legal = state.legal_actions();
            std::array::from_fn(|i| default_for(&legal[i]))
        }
        Round::Terminal(_) => std::array::from_fn(|_| Action::Check),
    }
}

fn default_for(legal: &[ActionKind]) -> Action {
    if legal.contains(&ActionKind::Check) {
        Action::Check
    } else {
        Action::Fold
    }
}

/// Multiset equality between the assigned pairs and the player's round hand.
fn assignment_covers_hand(actions: &[Action; NUM_BOARDS], hand: &[Card]) -> bool {
    let mut assigned: Vec<Card> = actions
        .iter()
        .flat_map(|a| match a {
            Action::Assign(cards) => cards.clone(),
            _ => Vec::new(),
        })
        .collect();
    let mut expected = hand.to_vec();
    assigned.sort();
    expected.sort();
    assigned == expected
}

fn drain_pipe<R: Read + Send + 'static>(pipe: R, tx: Sender<Vec<u8>>) -> JoinHandle<()> {
    thread::spawn(move || {
        let mut reader = BufReader::new(pipe);
        loop {
            let mut buf = Vec::new();
            match reader.read_until(b'\n', &mut buf) {
                Ok(0) | Err(_) => break,
                Ok(_) => {
                    if tx.send(buf).is_err() {
                        break;
                    }
                }
            }
        }
    })
}

/// Polls the child until it exits or the deadline passes. Returns whether it
/// exited in time.
fn wait_with_deadline(child: &mut Child, deadline: Duration) -> bool {
    let start = Instant::now();
    loop {
        match child.try_wait() {
            Ok(Some(_)) => return true,
            Ok(None) => {}
            Err(_) => return true,
        }
        if start.elapsed() >= deadline {
            return false;
        }
        thread::sleep(Duration::from_millis(25));
    }
}

/// Accepts one inbound connection, or gives up after the deadline.
fn accept_with_deadline(listener: &TcpListener, deadline: Duration) -> Option<TcpStream> {
    if listener.set_nonblocking(true).is_err() {
        return None;
    }
    let start = Instant::now();
    loop {
        match listener.accept() {
            Ok((stream, _)) => {
                let _ = stream.set_nonblocking(false);
                return Some(stream);
            }
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                if start.elapsed() >= deadline {
                    return None;
                }
                thread::sleep(Duration::from_millis(10));
            }
            Err(_) => return None,
        }
    }
}
