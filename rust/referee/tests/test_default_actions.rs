use triboard_engine::action::Action;
use triboard_engine::board::{Board, BoardState};
use triboard_engine::cards::Card;
use triboard_engine::round::{Round, RoundState};
use triboard_referee::config::Config;
use triboard_referee::connector::{default_actions, Connector, PlayerSession};
use triboard_referee::gamelog::GameLog;

fn cards(codes: &[&str]) -> Vec<Card> {
    codes.iter().map(|c| c.parse().expect("card code")).collect()
}

fn board(pips: [u32; 2], settled: bool) -> Board {
    Board::Live(BoardState {
        pot: 2,
        pips,
        hands: Some([cards(&["Ah", "Ad"]), cards(&["Kh", "Kd"])]),
        deck: Vec::new(),
        previous: None,
        settled,
        reveal: true,
    })
}

fn round_with(boards: [Board; 3], button: i32) -> Round {
    Round::Live(RoundState {
        button,
        street: 0,
        stacks: [197, 194],
        hands: [
            cards(&["Ah", "Ad", "Kh", "Kd", "Qh", "Qd"]),
            cards(&["2c", "3c", "4d", "5d", "6h", "7h"]),
        ],
        boards,
        previous: None,
    })
}

#[test]
fn defaults_check_where_legal_and_fold_otherwise() {
    // facing a bet on board 1, free to check boards 2 and 3
    let round = round_with(
        [board([1, 2], false), board([2, 2], true), board([0, 0], false)],
        2,
    );
    assert_eq!(
        default_actions(&round),
        [Action::Fold, Action::Check, Action::Check]
    );
}

#[test]
fn an_unpartitioned_board_defaults_to_a_fold() {
    // assignment is the only legal action, and the default cannot assign
    let round = round_with(
        std::array::from_fn(|_| Board::Live(BoardState::open(2, [1, 2], Vec::new()))),
        -2,
    );
    assert_eq!(
        default_actions(&round),
        [Action::Fold, Action::Fold, Action::Fold]
    );
}

#[test]
fn an_unusable_connector_answers_with_defaults_and_keeps_its_message() {
    let config = Config::default();
    let mut ghost = Connector::new("ghost", "./definitely-not-a-real-player", &config);
    ghost.build();
    ghost.run();
    let round = round_with(
        [board([1, 2], false), board([2, 2], true), board([0, 0], false)],
        2,
    );
    let mut message = vec!["T0.000".to_string(), "P0".to_string()];
    let mut game_log = GameLog::new("test".to_string());
    let actions = ghost.query(&round, &mut message, &mut game_log, 0);
    assert_eq!(actions, [Action::Fold, Action::Check, Action::Check]);
    // no socket, so the pending clauses were never consumed
    assert_eq!(message.len(), 2);
    assert_eq!(game_log.lines().len(), 1);
    ghost.stop();
    let _ = std::fs::remove_file("ghost.txt");
}
