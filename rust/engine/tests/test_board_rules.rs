use triboard_engine::action::{Action, ActionKind};
use triboard_engine::board::{Board, BoardState};
use triboard_engine::cards::Card;

fn cards(codes: &[&str]) -> Vec<Card> {
    codes.iter().map(|c| c.parse().expect("card code")).collect()
}

fn assigned_board(pot: u32, pips: [u32; 2]) -> BoardState {
    BoardState {
        pot,
        pips,
        hands: Some([cards(&["Ah", "Ad"]), cards(&["Kh", "Kd"])]),
        deck: cards(&["2c", "7d", "9h", "Jc", "4s"]),
        previous: None,
        settled: false,
        reveal: true,
    }
}

#[test]
fn unpartitioned_board_only_accepts_assignment() {
    let board = BoardState::open(2, [1, 2], Vec::new());
    assert_eq!(board.legal_actions(-2, [197, 194]), vec![ActionKind::Assign]);
    // seat 1 still has to assign after seat 0 did
    let board = match board.proceed(&Action::Assign(cards(&["Ah", "Ad"])), -2, 0) {
        Board::Live(state) => state,
        Board::Terminal(_) => panic!("assignment should not terminate a board"),
    };
    assert_eq!(board.legal_actions(-1, [197, 194]), vec![ActionKind::Assign]);
    // while the already-assigned seat is back to betting actions
    assert!(board.legal_actions(-2, [197, 194]).contains(&ActionKind::Call));
}

#[test]
fn assignment_preserves_the_opponents_cards() {
    let board = BoardState::open(2, [1, 2], Vec::new());
    let board = match board.proceed(&Action::Assign(cards(&["Ah", "Ad"])), -2, 0) {
        Board::Live(state) => state,
        Board::Terminal(_) => unreachable!(),
    };
    let board = match board.proceed(&Action::Assign(cards(&["Kh", "Kd"])), -1, 0) {
        Board::Live(state) => state,
        Board::Terminal(_) => unreachable!(),
    };
    let hands = board.hands.expect("both assigned");
    assert_eq!(hands[0], cards(&["Ah", "Ad"]));
    assert_eq!(hands[1], cards(&["Kh", "Kd"]));
}

#[test]
fn settled_board_only_accepts_the_dummy_check() {
    let mut board = assigned_board(4, [0, 0]);
    board.settled = true;
    assert_eq!(board.legal_actions(2, [100, 100]), vec![ActionKind::Check]);
}

#[test]
fn no_bet_to_match_allows_check_and_raise() {
    let board = assigned_board(4, [0, 0]);
    assert_eq!(
        board.legal_actions(2, [100, 100]),
        vec![ActionKind::Check, ActionKind::Raise]
    );
    // an empty stack on either side forbids opening a bet
    assert_eq!(board.legal_actions(2, [0, 100]), vec![ActionKind::Check]);
    assert_eq!(board.legal_actions(2, [100, 0]), vec![ActionKind::Check]);
}

#[test]
fn facing_a_bet_allows_fold_call_and_maybe_raise() {
    let board = assigned_board(4, [0, 10]);
    assert_eq!(
        board.legal_actions(2, [100, 90]),
        vec![ActionKind::Fold, ActionKind::Call, ActionKind::Raise]
    );
    // calling would put the active seat all in: no re-raise
    assert_eq!(
        board.legal_actions(2, [10, 90]),
        vec![ActionKind::Fold, ActionKind::Call]
    );
    // the bettor is all in: no re-raise either
    assert_eq!(
        board.legal_actions(2, [100, 0]),
        vec![ActionKind::Fold, ActionKind::Call]
    );
}

#[test]
fn raise_bounds_are_absolute_pip_targets() {
    let board = assigned_board(0, [4, 10]);
    // continue cost 6; max extra = min(90, 80 + 6); min extra = 6 + max(6, BB)
    assert_eq!(board.raise_bounds(2, [90, 80]), (16, 90));
}

#[test]
fn opening_raise_is_at_least_the_big_blind() {
    let board = assigned_board(4, [0, 0]);
    assert_eq!(board.raise_bounds(2, [50, 50]), (2, 50));
}

#[test]
fn short_stacks_clamp_the_minimum_raise() {
    let board = assigned_board(0, [0, 10]);
    // the opponent is nearly all in; min collapses to max
    assert_eq!(board.raise_bounds(2, [100, 1]), (11, 11));
}

#[test]
fn fold_awards_the_pot_and_cancels_the_reveal() {
    let board = assigned_board(10, [3, 5]);
    let terminal = match board.proceed(&Action::Fold, 2, 3) {
        Board::Terminal(terminal) => terminal,
        Board::Live(_) => panic!("fold must terminate the board"),
    };
    assert_eq!(terminal.deltas, [0, 18]);
    assert_eq!(terminal.previous.pot, 18);
    assert_eq!(terminal.previous.pips, [0, 0]);
    assert!(terminal.previous.settled);
    assert!(!terminal.previous.reveal);
}

#[test]
fn fold_by_the_other_seat_pays_seat_zero() {
    let board = assigned_board(10, [5, 3]);
    let terminal = match board.proceed(&Action::Fold, 3, 3) {
        Board::Terminal(terminal) => terminal,
        Board::Live(_) => unreachable!(),
    };
    assert_eq!(terminal.deltas, [18, 0]);
}

#[test]
fn small_blind_call_leaves_the_big_blind_an_option() {
    let board = assigned_board(2, [1, 2]);
    let board = match board.proceed(&Action::Call, 0, 0) {
        Board::Live(state) => state,
        Board::Terminal(_) => unreachable!(),
    };
    assert_eq!(board.pips, [2, 2]);
    assert!(!board.settled);
}

#[test]
fn later_calls_settle_the_street() {
    let board = assigned_board(2, [3, 7]);
    let board = match board.proceed(&Action::Call, 2, 0) {
        Board::Live(state) => state,
        Board::Terminal(_) => unreachable!(),
    };
    assert_eq!(board.pips, [7, 7]);
    assert!(board.settled);
}

#[test]
fn first_check_passes_the_action_second_check_settles() {
    let board = assigned_board(6, [0, 0]);
    let board = match board.proceed(&Action::Check, 1, 3) {
        Board::Live(state) => state,
        Board::Terminal(_) => unreachable!(),
    };
    assert!(!board.settled);
    let board = match board.proceed(&Action::Check, 2, 3) {
        Board::Live(state) => state,
        Board::Terminal(_) => unreachable!(),
    };
    assert!(board.settled);
}

#[test]
fn preflop_check_settles_once_both_blinds_acted() {
    // big blind checking back after the small blind completed
    let board = assigned_board(2, [2, 2]);
    let board = match board.proceed(&Action::Check, 1, 0) {
        Board::Live(state) => state,
        Board::Terminal(_) => unreachable!(),
    };
    assert!(board.settled);
}

#[test]
fn raise_sets_the_absolute_target_and_reopens_action() {
    let board = assigned_board(2, [2, 5]);
    let board = match board.proceed(&Action::Raise(12), 2, 0) {
        Board::Live(state) => state,
        Board::Terminal(_) => unreachable!(),
    };
    assert_eq!(board.pips, [12, 5]);
    assert!(!board.settled);
}

#[test]
fn every_transition_links_back_to_its_predecessor() {
    let board = assigned_board(2, [1, 2]);
    let after = match board.proceed(&Action::Call, 0, 0) {
        Board::Live(state) => state,
        Board::Terminal(_) => unreachable!(),
    };
    let previous = after.previous.as_deref().expect("history chain");
    assert_eq!(previous.pips, [1, 2]);
}
