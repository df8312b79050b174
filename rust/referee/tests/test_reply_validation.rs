use triboard_engine::action::Action;
use triboard_engine::board::{Board, BoardState, TerminalBoard};
use triboard_engine::cards::Card;
use triboard_engine::round::{Round, RoundState, TerminalRound};
use triboard_referee::connector::{parse_reply, ReplyFault};
use triboard_referee::gamelog::GameLog;

fn cards(codes: &[&str]) -> Vec<Card> {
    codes.iter().map(|c| c.parse().expect("card code")).collect()
}

fn log() -> GameLog {
    GameLog::new("test".to_string())
}

const HAND_0: [&str; 6] = ["Ah", "Ad", "Kh", "Kd", "Qh", "Qd"];
const HAND_1: [&str; 6] = ["2c", "3c", "4d", "5d", "6h", "7h"];

fn live_board(pot: u32, pips: [u32; 2], hand0: &[&str], hand1: &[&str]) -> Board {
    Board::Live(BoardState {
        pot,
        pips,
        hands: Some([cards(hand0), cards(hand1)]),
        deck: cards(&["2s", "7s", "9s", "Js", "4s"]),
        previous: None,
        settled: false,
        reveal: true,
    })
}

/// Small blind to act on all three boards, hands already partitioned.
fn small_blind_to_act() -> Round {
    Round::Live(RoundState {
        button: 0,
        street: 0,
        stacks: [197, 194],
        hands: [cards(&HAND_0), cards(&HAND_1)],
        boards: [
            live_board(2, [1, 2], &HAND_0[0..2], &HAND_1[0..2]),
            live_board(4, [1, 2], &HAND_0[2..4], &HAND_1[2..4]),
            live_board(6, [1, 2], &HAND_0[4..6], &HAND_1[4..6]),
        ],
        previous: None,
    })
}

/// Round start: neither seat has partitioned its cards yet.
fn nothing_assigned() -> Round {
    Round::Live(RoundState {
        button: -2,
        street: 0,
        stacks: [197, 194],
        hands: [cards(&HAND_0), cards(&HAND_1)],
        boards: [
            Board::Live(BoardState::open(2, [1, 2], Vec::new())),
            Board::Live(BoardState::open(4, [1, 2], Vec::new())),
            Board::Live(BoardState::open(6, [1, 2], Vec::new())),
        ],
        previous: None,
    })
}

fn finished_round() -> Round {
    let folded = BoardState {
        pot: 5,
        pips: [0, 0],
        hands: Some([cards(&HAND_0[0..2]), cards(&HAND_1[0..2])]),
        deck: cards(&["2s", "7s", "9s", "Js", "4s"]),
        previous: None,
        settled: true,
        reveal: false,
    };
    let boards: [Board; 3] = std::array::from_fn(|_| {
        Board::Terminal(TerminalBoard {
            deltas: [0, 5],
            previous: folded.clone(),
        })
    });
    Round::Terminal(TerminalRound {
        deltas: [-3, 15],
        previous: RoundState {
            button: 1,
            street: 0,
            stacks: [197, 194],
            hands: [cards(&HAND_0), cards(&HAND_1)],
            boards,
            previous: None,
        },
    })
}

#[test]
fn a_legal_tuple_passes_through() {
    let round = small_blind_to_act();
    let actions = parse_reply("A", "1C;2C;3C", &round, 0, &mut log()).expect("legal reply");
    assert_eq!(actions, [Action::Call, Action::Call, Action::Call]);
}

#[test]
fn a_legal_raise_is_kept_with_its_amount() {
    let round = small_blind_to_act();
    let actions = parse_reply("A", "1R40;2C;3F", &round, 0, &mut log()).expect("legal reply");
    assert_eq!(actions, [Action::Raise(40), Action::Call, Action::Fold]);
}

#[test]
fn a_below_minimum_raise_is_substituted_on_that_board_only() {
    let round = small_blind_to_act();
    let mut game_log = log();
    let actions = parse_reply("A", "1R1;2C;3C", &round, 0, &mut game_log).expect("substituted");
    // facing a bet, the fallback is a fold; the other boards stand
    assert_eq!(actions, [Action::Fold, Action::Call, Action::Call]);
    assert!(game_log
        .lines()
        .iter()
        .any(|l| l.contains("attempted illegal Raise")));
}

#[test]
fn an_oversized_raise_is_substituted_too() {
    let round = small_blind_to_act();
    let actions = parse_reply("A", "1R197;2C;3C", &round, 0, &mut log()).expect("substituted");
    assert_eq!(actions[0], Action::Fold);
}

#[test]
fn an_illegal_action_kind_is_substituted() {
    let round = small_blind_to_act();
    let mut game_log = log();
    // seat 0 faces a bet, so checking board 1 is not available
    let actions = parse_reply("A", "1K;2C;3C", &round, 0, &mut game_log).expect("substituted");
    assert_eq!(actions[0], Action::Fold);
    assert!(game_log
        .lines()
        .iter()
        .any(|l| l.contains("attempted illegal Check")));
}

#[test]
fn a_valid_assignment_is_accepted() {
    let round = nothing_assigned();
    let line = "1AAh,Ad;2AKh,Kd;3AQh,Qd";
    let actions = parse_reply("A", line, &round, 0, &mut log()).expect("assignment");
    assert_eq!(actions[0], Action::Assign(cards(&["Ah", "Ad"])));
    assert_eq!(actions[2], Action::Assign(cards(&["Qh", "Qd"])));
}

#[test]
fn assigning_cards_outside_the_hand_voids_the_reply() {
    let round = nothing_assigned();
    let mut game_log = log();
    let result = parse_reply("A", "1A2c,3c;2A4d,5d;3A6h,7h", &round, 0, &mut game_log);
    assert!(matches!(result, Err(ReplyFault::Rejected)));
    assert!(game_log
        .lines()
        .iter()
        .any(|l| l.contains("attempted illegal assignment")));
}

#[test]
fn assigning_the_same_cards_twice_voids_the_reply() {
    let round = nothing_assigned();
    let result = parse_reply("A", "1AAh,Ad;2AAh,Ad;3AQh,Qd", &round, 0, &mut log());
    assert!(matches!(result, Err(ReplyFault::Rejected)));
}

#[test]
fn raising_past_the_shared_stack_voids_the_reply() {
    let round = small_blind_to_act();
    let mut game_log = log();
    // each raise alone is inside its board's bounds, but the three together
    // cost more chips than the seat has behind
    let result = parse_reply("A", "1R196;2R196;3R196", &round, 0, &mut game_log);
    assert!(matches!(result, Err(ReplyFault::Rejected)));
    assert!(game_log
        .lines()
        .iter()
        .any(|l| l.contains("net illegal")));
}

#[test]
fn wrong_clause_counts_void_the_reply_fatally() {
    let round = small_blind_to_act();
    let result = parse_reply("A", "1C;2C", &round, 0, &mut log());
    assert!(matches!(result, Err(ReplyFault::WrongActionCount)));
}

#[test]
fn undecodable_payloads_void_the_reply() {
    let round = small_blind_to_act();
    let result = parse_reply("A", "1Rxx;2C;3C", &round, 0, &mut log());
    assert!(matches!(result, Err(ReplyFault::Misformatted(_))));
    let result = parse_reply("A", "1Z;2C;3C", &round, 0, &mut log());
    assert!(matches!(result, Err(ReplyFault::Misformatted(_))));
    let result = parse_reply("A", "", &round, 0, &mut log());
    assert!(matches!(result, Err(ReplyFault::Misformatted(_))));
}

#[test]
fn a_lone_acknowledgement_covers_every_board() {
    let round = finished_round();
    let actions = parse_reply("A", "1K", &round, 0, &mut log()).expect("ack");
    assert_eq!(actions, [Action::Check, Action::Check, Action::Check]);
}

#[test]
fn non_checks_at_a_terminal_are_substituted_with_checks() {
    let round = finished_round();
    let mut game_log = log();
    let actions = parse_reply("A", "1C;2C;3C", &round, 0, &mut game_log).expect("substituted");
    assert_eq!(actions, [Action::Check, Action::Check, Action::Check]);
    assert!(game_log
        .lines()
        .iter()
        .any(|l| l.contains("attempted illegal Call")));
}
