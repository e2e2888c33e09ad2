//! 游戏核心逻辑模块（棋盘、胜负判定、状态转换与对局控制）。

pub mod effects;
pub mod rules;
pub mod session;
pub mod state;

pub use effects::{announcement, status_text, terminal_effects, AudioCue, PresentationEffect};
pub use rules::{
    available_moves, evaluate_outcome, Outcome, RuleEngine, RuleError, RuleResolution, WinLine,
    WIN_LINES,
};
pub use session::{GameSession, SessionConfig, TurnResolution, COMPUTER, HUMAN};
pub use state::{
    Board, BoardError, GameEvent, GameState, IntegrityError, Mark, Player, BOARD_CELLS,
};
