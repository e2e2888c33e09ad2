use std::fmt;

use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};

use super::rules::{evaluate_outcome, Outcome, WinLine};

/// 棋盘格子数量（3×3）。
pub const BOARD_CELLS: usize = 9;

/// 格子上的标记。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum Mark {
    #[default]
    Empty,
    X,
    O,
}

impl Mark {
    pub fn is_empty(self) -> bool {
        self == Mark::Empty
    }

    /// 非空标记对应的玩家。
    pub fn player(self) -> Option<Player> {
        match self {
            Mark::Empty => None,
            Mark::X => Some(Player::X),
            Mark::O => Some(Player::O),
        }
    }
}

/// 轮到落子的一方。人类固定为 X，电脑固定为 O。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Display)]
pub enum Player {
    X,
    O,
}

impl Player {
    pub fn opponent(self) -> Self {
        match self {
            Player::X => Player::O,
            Player::O => Player::X,
        }
    }
}

impl From<Player> for Mark {
    fn from(player: Player) -> Self {
        match player {
            Player::X => Mark::X,
            Player::O => Mark::O,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Display, Error)]
#[serde(tag = "type")]
pub enum BoardError {
    #[display("cell index {index} is outside 0..=8")]
    InvalidIndex { index: usize },
    #[display("cell {index} is already occupied")]
    CellOccupied { index: usize },
}

/// 3×3 棋盘，按行优先存储。长度由类型保证恒为 9。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(transparent)]
pub struct Board {
    cells: [Mark; BOARD_CELLS],
}

impl Board {
    pub fn new() -> Self {
        Self {
            cells: [Mark::Empty; BOARD_CELLS],
        }
    }

    pub fn from_cells(cells: [Mark; BOARD_CELLS]) -> Self {
        Self { cells }
    }

    pub fn cells(&self) -> &[Mark; BOARD_CELLS] {
        &self.cells
    }

    pub fn get(&self, index: usize) -> Result<Mark, BoardError> {
        self.cells
            .get(index)
            .copied()
            .ok_or(BoardError::InvalidIndex { index })
    }

    /// 在空格上落子；已占用的格子不会被覆盖。
    pub fn place(&mut self, index: usize, player: Player) -> Result<(), BoardError> {
        let cell = self
            .cells
            .get_mut(index)
            .ok_or(BoardError::InvalidIndex { index })?;
        if !cell.is_empty() {
            return Err(BoardError::CellOccupied { index });
        }
        *cell = player.into();
        Ok(())
    }

    /// 返回落子后的新棋盘，自身保持不变。
    pub fn with_mark(&self, index: usize, player: Player) -> Result<Board, BoardError> {
        let mut next = *self;
        next.place(index, player)?;
        Ok(next)
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|mark| !mark.is_empty())
    }

    pub fn count(&self, mark: Mark) -> usize {
        self.cells.iter().filter(|cell| **cell == mark).count()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (row, cells) in self.cells.chunks(3).enumerate() {
            if row > 0 {
                writeln!(f)?;
            }
            for cell in cells {
                let symbol = match cell {
                    Mark::Empty => '.',
                    Mark::X => 'X',
                    Mark::O => 'O',
                };
                write!(f, "{symbol}")?;
            }
        }
        Ok(())
    }
}

/// 对局事件流，供前端回放或调试。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum GameEvent {
    MovePlayed { player: Player, index: usize },
    GameWon { winner: Player, line: WinLine },
    GameDrawn,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Display, Error)]
#[serde(tag = "type")]
pub enum IntegrityError {
    #[display("mark counts are not reachable: {x} X against {o} O")]
    MarkCountMismatch { x: usize, o: usize },
    #[display("expected {expected} to move, state says {actual}")]
    WrongMover { expected: Player, actual: Player },
    #[display("stored outcome does not match the board")]
    StaleOutcome,
    #[display("expected turn {expected}, state says {actual}")]
    TurnMismatch { expected: u32, actual: u32 },
}

/// 完整对局状态。每次状态转换都整体替换，结局永远由棋盘推导。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameState {
    pub board: Board,
    pub next: Player,
    pub outcome: Outcome,
    #[serde(default)]
    pub turn: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub event_log: Vec<GameEvent>,
}

impl GameState {
    pub fn new() -> Self {
        Self::from_board(Board::new(), Player::X)
    }

    pub fn from_board(board: Board, next: Player) -> Self {
        let turn = (BOARD_CELLS - board.count(Mark::Empty)) as u32;
        Self {
            board,
            next,
            outcome: evaluate_outcome(&board),
            turn,
            event_log: Vec::new(),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.outcome.is_terminal()
    }

    /// 落子后的下一个状态。
    pub fn advance(&self, index: usize) -> Result<GameState, BoardError> {
        let board = self.board.with_mark(index, self.next)?;
        let outcome = evaluate_outcome(&board);

        let mut event_log = self.event_log.clone();
        event_log.push(GameEvent::MovePlayed {
            player: self.next,
            index,
        });
        match outcome {
            Outcome::Win { winner, line } => event_log.push(GameEvent::GameWon { winner, line }),
            Outcome::Draw => event_log.push(GameEvent::GameDrawn),
            Outcome::InProgress => {}
        }

        Ok(GameState {
            board,
            next: self.next.opponent(),
            outcome,
            turn: self.turn + 1,
            event_log,
        })
    }

    /// 校验反序列化得到的状态是否能由 X 先手的正常对局到达。
    pub fn integrity_check(&self) -> Result<(), IntegrityError> {
        let x = self.board.count(Mark::X);
        let o = self.board.count(Mark::O);
        let expected = match x.checked_sub(o) {
            Some(0) => Player::X,
            Some(1) => Player::O,
            _ => return Err(IntegrityError::MarkCountMismatch { x, o }),
        };

        if self.outcome != evaluate_outcome(&self.board) {
            return Err(IntegrityError::StaleOutcome);
        }

        if !self.is_finished() && self.next != expected {
            return Err(IntegrityError::WrongMover {
                expected,
                actual: self.next,
            });
        }

        let placed = (x + o) as u32;
        if self.turn != placed {
            return Err(IntegrityError::TurnMismatch {
                expected: placed,
                actual: self.turn,
            });
        }

        Ok(())
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}
