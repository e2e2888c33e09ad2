//! 浏览器环境下的绑定测试：`wasm-pack test --headless --firefox`。

#![cfg(target_arch = "wasm32")]

use serde_wasm_bindgen::{from_value, to_value};
use tictactoe_wasm::{
    available_moves_js, compute_move, create_game_state, evaluate_board, validate_state,
    AiDecision, Board, GameEngine, GameState, Outcome, Player, TurnResolution,
};
use tictactoe_wasm::Mark::{Empty as E, O, X};
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn evaluate_board_reports_winning_line() {
    let board = Board::from_cells([X, X, X, O, O, E, E, E, E]);
    let outcome = evaluate_board(to_value(&board).unwrap()).expect("board should parse");
    let outcome: Outcome = from_value(outcome).unwrap();
    assert_eq!(
        outcome,
        Outcome::Win {
            winner: Player::X,
            line: [0, 1, 2]
        }
    );
}

#[wasm_bindgen_test]
fn available_moves_crosses_boundary() {
    let board = Board::from_cells([X, E, O, E, E, E, E, E, X]);
    let moves = available_moves_js(to_value(&board).unwrap()).unwrap();
    let moves: Vec<usize> = from_value(moves).unwrap();
    assert_eq!(moves, vec![1, 3, 4, 5, 6, 7]);
}

#[wasm_bindgen_test]
fn compute_move_hard_opening() {
    let decision = compute_move(to_value(&Board::new()).unwrap(), "O", Some("hard".into()), None)
        .expect("empty board has moves");
    let decision: AiDecision = from_value(decision).unwrap();
    assert_eq!(decision.index, 0);
}

#[wasm_bindgen_test]
fn compute_move_on_full_board_fails() {
    let full = Board::from_cells([X, O, X, O, X, O, O, X, O]);
    assert!(compute_move(to_value(&full).unwrap(), "O", None, None).is_err());
}

#[wasm_bindgen_test]
fn compute_move_rejects_unknown_names() {
    let board = to_value(&Board::new()).unwrap();
    assert!(compute_move(board.clone(), "O", Some("hrad".into()), None).is_err());
    assert!(compute_move(board.clone(), "O", None, Some("greedy".into())).is_err());

    let decision = compute_move(board, "O", Some("easy".into()), Some("minimax".into())).unwrap();
    let decision: AiDecision = from_value(decision).unwrap();
    assert_eq!(decision.index, 0);
}

#[wasm_bindgen_test]
fn created_state_is_valid() {
    let state = create_game_state().unwrap();
    validate_state(state.clone()).expect("fresh state is consistent");
    let state: GameState = from_value(state).unwrap();
    assert_eq!(state, GameState::new());
}

#[wasm_bindgen_test]
fn engine_plays_a_turn() {
    let mut engine = GameEngine::new(Some(r#"{"difficulty":"hard","seed":1}"#.into())).unwrap();
    assert!(engine.play_human_move(4).is_err(), "name is required first");

    engine.set_player_name("Ada");
    let turn: TurnResolution = serde_json::from_str(&engine.play_human_move(4).unwrap()).unwrap();
    assert_eq!(turn.resolution.state.next, Player::O);

    let reply: TurnResolution =
        serde_json::from_str(&engine.play_computer_move().unwrap()).unwrap();
    assert_eq!(reply.decision.map(|decision| decision.index), Some(0));
    assert_eq!(engine.status(), "Next player: X (Ada)");

    engine.reset().unwrap();
    assert_eq!(engine.player_name(), "");
}
