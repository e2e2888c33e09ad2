use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};

use super::state::{Board, BoardError, GameEvent, GameState, IntegrityError, Mark, Player};

/// 构成胜利的三个格子下标。
pub type WinLine = [usize; 3];

/// 固定的 8 条胜利线：三行、三列、两条对角线。顺序决定同时多线成立时报告哪一条。
pub const WIN_LINES: [WinLine; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(tag = "type")]
pub enum Outcome {
    InProgress,
    Win { winner: Player, line: WinLine },
    Draw,
}

impl Outcome {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Outcome::InProgress)
    }

    pub fn winner(&self) -> Option<Player> {
        match self {
            Outcome::Win { winner, .. } => Some(*winner),
            _ => None,
        }
    }
}

/// 纯函数：按固定顺序检查胜利线，返回第一条成立的线；否则判断平局或进行中。
pub fn evaluate_outcome(board: &Board) -> Outcome {
    let cells = board.cells();
    for line in WIN_LINES {
        let [a, b, c] = line;
        if let Some(winner) = cells[a].player() {
            if cells[a] == cells[b] && cells[a] == cells[c] {
                return Outcome::Win { winner, line };
            }
        }
    }

    if board.is_full() {
        Outcome::Draw
    } else {
        Outcome::InProgress
    }
}

/// 空格下标，按升序排列。
pub fn available_moves(board: &Board) -> Vec<usize> {
    board
        .cells()
        .iter()
        .enumerate()
        .filter(|(_, mark)| **mark == Mark::Empty)
        .map(|(index, _)| index)
        .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Display, Error)]
#[serde(tag = "type")]
pub enum RuleError {
    #[display("{error}")]
    Board { error: BoardError },
    #[display("no empty cell left to play")]
    NoMovesAvailable,
    #[display("game is already finished")]
    GameFinished,
    #[display("it is not this player's turn")]
    NotPlayerTurn,
    #[display("player name is required before playing")]
    PlayerNameMissing,
    #[display("state integrity violated: {error}")]
    IntegrityViolation { error: IntegrityError },
}

impl From<BoardError> for RuleError {
    fn from(error: BoardError) -> Self {
        RuleError::Board { error }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleResolution {
    pub state: GameState,
    pub events: Vec<GameEvent>,
    pub outcome: Outcome,
}

impl RuleResolution {
    pub fn new(state: GameState, events: Vec<GameEvent>) -> Self {
        let outcome = state.outcome;
        Self {
            state,
            events,
            outcome,
        }
    }
}

/// 状态转换入口。旧状态不被修改，成功时返回全新的状态。
#[derive(Debug, Default, Clone, Copy)]
pub struct RuleEngine;

impl RuleEngine {
    pub fn new() -> Self {
        Self
    }

    fn ensure_in_progress(state: &GameState) -> Result<(), RuleError> {
        if state.is_finished() {
            return Err(RuleError::GameFinished);
        }
        Ok(())
    }

    fn ensure_turn_owner(state: &GameState, player: Player) -> Result<(), RuleError> {
        if state.next != player {
            return Err(RuleError::NotPlayerTurn);
        }
        Ok(())
    }

    fn ensure_integrity(state: &GameState) -> Result<(), RuleError> {
        state
            .integrity_check()
            .map_err(|error| RuleError::IntegrityViolation { error })
    }

    pub fn play_move(
        &self,
        state: &GameState,
        player: Player,
        index: usize,
    ) -> Result<RuleResolution, RuleError> {
        Self::ensure_in_progress(state)?;
        Self::ensure_turn_owner(state, player)?;
        Self::ensure_integrity(state)?;

        let next = state.advance(index)?;
        let events = next.event_log[state.event_log.len()..].to_vec();
        Ok(RuleResolution::new(next, events))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::state::Mark::{Empty as E, O, X};
    use crate::game::state::BOARD_CELLS;

    fn board(cells: [Mark; BOARD_CELLS]) -> Board {
        Board::from_cells(cells)
    }

    /// 把 0..3^9 的编号展开为一张棋盘，用于穷举。
    fn decode(mut code: usize) -> Board {
        let mut cells = [E; BOARD_CELLS];
        for cell in cells.iter_mut() {
            *cell = match code % 3 {
                0 => E,
                1 => X,
                _ => O,
            };
            code /= 3;
        }
        board(cells)
    }

    fn has_uniform_line(board: &Board) -> bool {
        let cells = board.cells();
        WIN_LINES
            .iter()
            .any(|&[a, b, c]| cells[a] != E && cells[a] == cells[b] && cells[b] == cells[c])
    }

    #[test]
    fn empty_board_is_in_progress() {
        assert_eq!(evaluate_outcome(&Board::new()), Outcome::InProgress);
    }

    #[test]
    fn completing_top_row_wins_for_x() {
        let before = board([X, X, E, O, O, E, E, E, E]);
        assert_eq!(evaluate_outcome(&before), Outcome::InProgress);

        let after = before.with_mark(2, Player::X).expect("cell 2 is free");
        assert_eq!(
            evaluate_outcome(&after),
            Outcome::Win {
                winner: Player::X,
                line: [0, 1, 2]
            }
        );
    }

    #[test]
    fn full_board_without_line_is_draw() {
        let full = board([X, O, X, O, X, O, O, X, O]);
        assert_eq!(evaluate_outcome(&full), Outcome::Draw);
    }

    #[test]
    fn win_on_last_cell_is_not_a_draw() {
        let full = board([X, O, X, O, X, O, O, X, X]);
        assert_eq!(
            evaluate_outcome(&full),
            Outcome::Win {
                winner: Player::X,
                line: [0, 4, 8]
            }
        );
    }

    #[test]
    fn first_line_in_order_is_reported() {
        // 第一行与第一列同时成立，报告第一行。
        let double = board([O, O, O, O, X, X, O, X, X]);
        assert_eq!(
            evaluate_outcome(&double),
            Outcome::Win {
                winner: Player::O,
                line: [0, 1, 2]
            }
        );

        // 两条对角线同时成立，报告主对角线。
        let diagonals = board([X, O, X, O, X, O, X, O, X]);
        assert_eq!(
            evaluate_outcome(&diagonals),
            Outcome::Win {
                winner: Player::X,
                line: [0, 4, 8]
            }
        );
    }

    #[test]
    fn every_line_is_detected_for_both_players() {
        for line in WIN_LINES {
            for player in [Player::X, Player::O] {
                let mut cells = [E; BOARD_CELLS];
                for index in line {
                    cells[index] = player.into();
                }
                assert_eq!(
                    evaluate_outcome(&board(cells)),
                    Outcome::Win {
                        winner: player,
                        line
                    },
                    "line {line:?} should win for {player}"
                );
            }
        }
    }

    #[test]
    fn evaluator_is_consistent_on_every_board() {
        for code in 0..3usize.pow(BOARD_CELLS as u32) {
            let board = decode(code);
            let outcome = evaluate_outcome(&board);
            assert_eq!(outcome, evaluate_outcome(&board), "evaluation must be pure");

            match outcome {
                Outcome::InProgress => {
                    assert!(!has_uniform_line(&board));
                    assert!(!board.is_full());
                }
                Outcome::Draw => {
                    assert!(!has_uniform_line(&board));
                    assert!(board.is_full());
                }
                Outcome::Win { winner, line } => {
                    let mark = Mark::from(winner);
                    assert!(line.iter().all(|&index| board.cells()[index] == mark));
                    let first = WIN_LINES
                        .iter()
                        .position(|candidate| {
                            let [a, b, c] = *candidate;
                            let cells = board.cells();
                            cells[a] != E && cells[a] == cells[b] && cells[b] == cells[c]
                        })
                        .expect("a winning board has a uniform line");
                    assert_eq!(WIN_LINES[first], line, "first line in order must be reported");
                }
            }
        }
    }

    #[test]
    fn available_moves_are_ascending_empty_cells() {
        let partial = board([X, E, O, E, X, E, E, O, E]);
        assert_eq!(available_moves(&partial), vec![1, 3, 5, 6, 8]);
        assert_eq!(available_moves(&Board::new()), (0..9).collect::<Vec<_>>());
        assert!(available_moves(&board([X, O, X, O, X, O, O, X, O])).is_empty());
    }

    #[test]
    fn play_move_returns_new_state() {
        let engine = RuleEngine::new();
        let state = GameState::new();

        let resolution = engine
            .play_move(&state, Player::X, 4)
            .expect("opening move should succeed");

        assert_eq!(state.board, Board::new(), "previous state must stay untouched");
        assert_eq!(resolution.state.board.get(4), Ok(X));
        assert_eq!(resolution.state.next, Player::O);
        assert_eq!(resolution.outcome, Outcome::InProgress);
        assert_eq!(
            resolution.events,
            vec![GameEvent::MovePlayed {
                player: Player::X,
                index: 4
            }]
        );
    }

    #[test]
    fn play_move_rejects_contract_violations() {
        let engine = RuleEngine::new();
        let state = GameState::new();

        assert_eq!(
            engine.play_move(&state, Player::O, 0).unwrap_err(),
            RuleError::NotPlayerTurn
        );
        assert_eq!(
            engine.play_move(&state, Player::X, 9).unwrap_err(),
            RuleError::Board {
                error: BoardError::InvalidIndex { index: 9 }
            }
        );

        let state = engine.play_move(&state, Player::X, 0).unwrap().state;
        assert_eq!(
            engine.play_move(&state, Player::O, 0).unwrap_err(),
            RuleError::Board {
                error: BoardError::CellOccupied { index: 0 }
            }
        );
    }

    #[test]
    fn finished_game_rejects_further_moves() {
        let engine = RuleEngine::new();
        let mut state = GameState::new();
        for (player, index) in [
            (Player::X, 0),
            (Player::O, 3),
            (Player::X, 1),
            (Player::O, 4),
        ] {
            state = engine.play_move(&state, player, index).unwrap().state;
        }

        let resolution = engine.play_move(&state, Player::X, 2).unwrap();
        assert_eq!(
            resolution.outcome,
            Outcome::Win {
                winner: Player::X,
                line: [0, 1, 2]
            }
        );
        assert!(resolution.events.contains(&GameEvent::GameWon {
            winner: Player::X,
            line: [0, 1, 2]
        }));
        assert_eq!(
            engine
                .play_move(&resolution.state, Player::O, 5)
                .unwrap_err(),
            RuleError::GameFinished
        );
    }
}
