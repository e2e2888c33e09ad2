use std::str::FromStr;

use derive_more::Display;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::game::{available_moves, evaluate_outcome, Board, Outcome, Player, RuleError};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Display)]
#[serde(rename_all = "lowercase")]
pub enum AiStrategy {
    #[display("random")]
    Random,
    #[display("minimax")]
    Minimax,
}

impl FromStr for AiStrategy {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "random" => Ok(AiStrategy::Random),
            "minimax" | "perfect" => Ok(AiStrategy::Minimax),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, Display)]
#[serde(rename_all = "lowercase")]
pub enum AiDifficulty {
    #[default]
    #[display("easy")]
    Easy,
    #[display("medium")]
    Medium,
    #[display("hard")]
    Hard,
}

impl FromStr for AiDifficulty {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "easy" => Ok(AiDifficulty::Easy),
            "medium" | "normal" => Ok(AiDifficulty::Medium),
            "hard" | "expert" => Ok(AiDifficulty::Hard),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct AiConfig {
    pub difficulty: AiDifficulty,
    pub strategy: AiStrategy,
}

impl AiConfig {
    /// Easy 与 Medium 目前策略相同（均为随机落子），源头规则未区分二者。
    pub fn from_difficulty(difficulty: AiDifficulty) -> Self {
        let strategy = match difficulty {
            AiDifficulty::Easy | AiDifficulty::Medium => AiStrategy::Random,
            AiDifficulty::Hard => AiStrategy::Minimax,
        };
        Self {
            difficulty,
            strategy,
        }
    }

    pub fn with_strategy(mut self, strategy: AiStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// 由前端传入的难度与策略名构造配置；缺省难度为 Easy，未知名称报错。
    pub fn from_names(difficulty: Option<&str>, strategy: Option<&str>) -> Result<Self, String> {
        let difficulty = match difficulty {
            Some(value) => AiDifficulty::from_str(value)
                .map_err(|_| format!("unknown difficulty: {value}"))?,
            None => AiDifficulty::default(),
        };
        let mut config = AiConfig::from_difficulty(difficulty);
        if let Some(value) = strategy {
            let strategy =
                AiStrategy::from_str(value).map_err(|_| format!("unknown strategy: {value}"))?;
            config = config.with_strategy(strategy);
        }
        Ok(config)
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        AiConfig::from_difficulty(AiDifficulty::default())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct AiDecision {
    pub index: usize,
    /// 以 O 视角的极小化极大评分；随机策略没有评分。
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evaluation: Option<i8>,
    pub nodes: u64,
    pub strategy: AiStrategy,
}

#[derive(Debug, Default)]
pub struct SearchStats {
    pub nodes: u64,
}

impl SearchStats {
    pub fn new() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoredMove {
    pub score: i8,
    /// 终局局面没有可选着法。
    pub index: Option<usize>,
}

/// 终局评分，始终以 O（电脑）视角：O 胜 +1，X 胜 -1，平局 0。
fn terminal_score(outcome: &Outcome) -> Option<i8> {
    match outcome {
        Outcome::Win {
            winner: Player::O, ..
        } => Some(1),
        Outcome::Win {
            winner: Player::X, ..
        } => Some(-1),
        Outcome::Draw => Some(0),
        Outcome::InProgress => None,
    }
}

/// 完整的极小化极大搜索，无剪枝。
///
/// 每个分支在棋盘副本上推演，调用方的棋盘不会被修改。O 取最大值、X 取最小值，
/// 同分时保留按下标升序最先遇到的着法。
pub fn minimax(
    board: Board,
    mover: Player,
    stats: &mut SearchStats,
) -> Result<ScoredMove, RuleError> {
    stats.nodes += 1;

    if let Some(score) = terminal_score(&evaluate_outcome(&board)) {
        return Ok(ScoredMove { score, index: None });
    }

    let mut best: Option<ScoredMove> = None;
    for index in available_moves(&board) {
        let child = board.with_mark(index, mover)?;
        let score = minimax(child, mover.opponent(), stats)?.score;

        let improves = match best {
            None => true,
            Some(current) => match mover {
                Player::O => score > current.score,
                Player::X => score < current.score,
            },
        };
        if improves {
            best = Some(ScoredMove {
                score,
                index: Some(index),
            });
        }
    }

    best.ok_or(RuleError::NoMovesAvailable)
}

pub struct AiAgent {
    config: AiConfig,
    rng: SmallRng,
}

impl AiAgent {
    pub fn new(config: AiConfig) -> Self {
        Self {
            config,
            rng: SmallRng::from_entropy(),
        }
    }

    pub fn with_seed(config: AiConfig, seed: u64) -> Self {
        Self {
            config,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    pub fn set_config(&mut self, config: AiConfig) {
        self.config = config;
    }

    fn random_decision(&mut self, board: &Board) -> Result<AiDecision, RuleError> {
        let moves = available_moves(board);
        let index = *moves
            .choose(&mut self.rng)
            .ok_or(RuleError::NoMovesAvailable)?;
        Ok(AiDecision {
            index,
            evaluation: None,
            nodes: 1,
            strategy: AiStrategy::Random,
        })
    }

    fn minimax_decision(&self, board: &Board, mover: Player) -> Result<AiDecision, RuleError> {
        let mut stats = SearchStats::new();
        let scored = minimax(*board, mover, &mut stats)?;
        let index = scored.index.ok_or(RuleError::NoMovesAvailable)?;
        log::debug!(
            "minimax picked cell {index} for {mover} (score {}, {} nodes)",
            scored.score,
            stats.nodes
        );
        Ok(AiDecision {
            index,
            evaluation: Some(scored.score),
            nodes: stats.nodes,
            strategy: AiStrategy::Minimax,
        })
    }

    /// 为 `mover` 选择一步棋。棋盘已满时返回 `NoMovesAvailable`，
    /// 已分胜负但仍有空格时返回 `GameFinished`。
    pub fn decide_move(&mut self, board: &Board, mover: Player) -> Result<AiDecision, RuleError> {
        if board.is_full() {
            return Err(RuleError::NoMovesAvailable);
        }
        if evaluate_outcome(board).is_terminal() {
            return Err(RuleError::GameFinished);
        }

        match self.config.strategy {
            AiStrategy::Random => self.random_decision(board),
            AiStrategy::Minimax => self.minimax_decision(board, mover),
        }
    }
}
