use serde::{Deserialize, Serialize};

use crate::ai::{AiAgent, AiConfig, AiDecision, AiDifficulty};

use super::effects::{status_text, terminal_effects, PresentationEffect};
use super::rules::{Outcome, RuleEngine, RuleError, RuleResolution};
use super::state::{GameState, Player};

const DEFAULT_COMPUTER_DELAY_MS: u32 = 500;
const DEFAULT_RESET_DELAY_MS: u32 = 3000;

/// 人类执子。
pub const HUMAN: Player = Player::X;
/// 电脑执子。
pub const COMPUTER: Player = Player::O;

fn default_computer_delay_ms() -> u32 {
    DEFAULT_COMPUTER_DELAY_MS
}

fn default_reset_delay_ms() -> u32 {
    DEFAULT_RESET_DELAY_MS
}

/// 会话配置，可由前端以 JSON 传入，缺省字段使用默认值。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionConfig {
    #[serde(default)]
    pub difficulty: AiDifficulty,
    #[serde(default = "default_computer_delay_ms")]
    pub computer_delay_ms: u32,
    #[serde(default = "default_reset_delay_ms")]
    pub reset_delay_ms: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            difficulty: AiDifficulty::default(),
            computer_delay_ms: DEFAULT_COMPUTER_DELAY_MS,
            reset_delay_ms: DEFAULT_RESET_DELAY_MS,
            seed: None,
        }
    }
}

/// 一次落子的完整结果：新状态、事件、展示层副作用与状态栏文本。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnResolution {
    #[serde(flatten)]
    pub resolution: RuleResolution,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decision: Option<AiDecision>,
    pub effects: Vec<PresentationEffect>,
    pub status: String,
}

/// 对局控制器：轮流落子、调用电脑决策、检测终局与重置。
pub struct GameSession {
    config: SessionConfig,
    state: GameState,
    player_name: String,
    engine: RuleEngine,
    agent: AiAgent,
    /// 思考阶段已给出、尚未落子的电脑决策。
    pending: Option<AiDecision>,
}

impl GameSession {
    pub fn new(config: SessionConfig) -> Self {
        let ai_config = AiConfig::from_difficulty(config.difficulty);
        let agent = match config.seed {
            Some(seed) => AiAgent::with_seed(ai_config, seed),
            None => AiAgent::new(ai_config),
        };
        Self {
            config,
            state: GameState::new(),
            player_name: String::new(),
            engine: RuleEngine::new(),
            agent,
            pending: None,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn difficulty(&self) -> AiDifficulty {
        self.config.difficulty
    }

    pub fn player_name(&self) -> &str {
        &self.player_name
    }

    pub fn set_player_name(&mut self, name: impl Into<String>) {
        self.player_name = name.into();
    }

    /// 切换难度会重开一局。
    pub fn set_difficulty(&mut self, difficulty: AiDifficulty) {
        self.config.difficulty = difficulty;
        self.agent.set_config(AiConfig::from_difficulty(difficulty));
        log::info!("difficulty set to {difficulty}");
        self.reset();
    }

    /// 清空棋盘与玩家名，难度保持不变。
    pub fn reset(&mut self) {
        self.state = GameState::new();
        self.player_name.clear();
        self.pending = None;
    }

    pub fn status(&self) -> String {
        status_text(&self.state, &self.player_name)
    }

    fn ensure_player_named(&self) -> Result<(), RuleError> {
        if self.player_name.trim().is_empty() {
            return Err(RuleError::PlayerNameMissing);
        }
        Ok(())
    }

    fn commit(
        &mut self,
        resolution: RuleResolution,
        decision: Option<AiDecision>,
    ) -> TurnResolution {
        self.state = resolution.state.clone();
        self.pending = None;

        let effects = match resolution.outcome {
            Outcome::InProgress if self.state.next == COMPUTER => {
                vec![PresentationEffect::ScheduleComputerMove {
                    delay_ms: self.config.computer_delay_ms,
                }]
            }
            Outcome::InProgress => Vec::new(),
            outcome => {
                log::info!("round finished: {outcome:?}");
                terminal_effects(&outcome, &self.player_name, self.config.reset_delay_ms)
            }
        };

        TurnResolution {
            resolution,
            decision,
            effects,
            status: self.status(),
        }
    }

    pub fn play_human_move(&mut self, index: usize) -> Result<TurnResolution, RuleError> {
        self.ensure_player_named()?;
        let resolution = self
            .engine
            .play_move(&self.state, HUMAN, index)
            .inspect_err(|error| log::warn!("human move on cell {index} rejected: {error}"))?;
        Ok(self.commit(resolution, None))
    }

    /// 电脑在当前局面上的决策，不修改棋盘。决策会被保留，
    /// 随后的 `play_computer_move` 落下同一格。
    pub fn think(&mut self) -> Result<AiDecision, RuleError> {
        if self.state.is_finished() {
            return Err(RuleError::GameFinished);
        }
        if self.state.next != COMPUTER {
            return Err(RuleError::NotPlayerTurn);
        }
        if let Some(decision) = self.pending {
            return Ok(decision);
        }
        let decision = self.agent.decide_move(&self.state.board, COMPUTER)?;
        self.pending = Some(decision);
        Ok(decision)
    }

    pub fn play_computer_move(&mut self) -> Result<TurnResolution, RuleError> {
        let decision = self.think()?;
        let resolution = self
            .engine
            .play_move(&self.state, COMPUTER, decision.index)?;
        Ok(self.commit(resolution, Some(decision)))
    }
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}
