//! 电脑对手（随机策略与极小化极大搜索）。

pub mod minimax;

pub use minimax::{
    minimax, AiAgent, AiConfig, AiDecision, AiDifficulty, AiStrategy, ScoredMove, SearchStats,
};
