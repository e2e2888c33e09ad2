pub mod ai;
pub mod game;
pub mod logging;

use gloo_timers::future::TimeoutFuture;
use serde::Serialize;
use serde_wasm_bindgen::{from_value, to_value};
use std::str::FromStr;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;
use web_sys::js_sys::Promise;

pub use ai::{
    minimax, AiAgent, AiConfig, AiDecision, AiDifficulty, AiStrategy, ScoredMove, SearchStats,
};
pub use game::{
    available_moves, evaluate_outcome, AudioCue, Board, BoardError, GameEvent, GameSession,
    GameState, IntegrityError, Mark, Outcome, Player, PresentationEffect, RuleEngine, RuleError,
    RuleResolution, SessionConfig, TurnResolution, WinLine, BOARD_CELLS, COMPUTER, HUMAN,
    WIN_LINES,
};

#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn start() {
    set_panic_hook();
    logging::init(logging::default_level());
}

fn to_js_error(error: RuleError) -> JsValue {
    to_value(&error).unwrap_or_else(|serialize_err| JsValue::from_str(&serialize_err.to_string()))
}

fn serde_to_js_error<E: std::fmt::Display>(error: E) -> JsValue {
    JsValue::from_str(&error.to_string())
}

fn to_json<T: Serialize>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value).map_err(serde_to_js_error)
}

fn parse_player(value: &str) -> Result<Player, JsValue> {
    match value.trim() {
        "X" | "x" => Ok(Player::X),
        "O" | "o" => Ok(Player::O),
        other => Err(JsValue::from_str(&format!("unknown player mark: {other}"))),
    }
}

#[wasm_bindgen]
pub struct GameEngine {
    session: GameSession,
}

#[wasm_bindgen]
impl GameEngine {
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<GameEngine, JsValue> {
        let config = if let Some(json) = config_json {
            serde_json::from_str(&json).map_err(serde_to_js_error)?
        } else {
            SessionConfig::default()
        };
        Ok(GameEngine {
            session: GameSession::new(config),
        })
    }

    pub fn state_json(&self) -> Result<String, JsValue> {
        to_json(self.session.state())
    }

    pub fn config_json(&self) -> Result<String, JsValue> {
        to_json(self.session.config())
    }

    pub fn status(&self) -> String {
        self.session.status()
    }

    pub fn player_name(&self) -> String {
        self.session.player_name().to_string()
    }

    pub fn set_player_name(&mut self, name: &str) {
        self.session.set_player_name(name);
    }

    pub fn difficulty(&self) -> String {
        self.session.difficulty().to_string()
    }

    pub fn set_difficulty(&mut self, difficulty: &str) -> Result<String, JsValue> {
        let difficulty = AiDifficulty::from_str(difficulty)
            .map_err(|_| JsValue::from_str(&format!("unknown difficulty: {difficulty}")))?;
        self.session.set_difficulty(difficulty);
        self.state_json()
    }

    pub fn play_human_move(&mut self, index: usize) -> Result<String, JsValue> {
        let turn = self.session.play_human_move(index).map_err(to_js_error)?;
        to_json(&turn)
    }

    pub fn play_computer_move(&mut self) -> Result<String, JsValue> {
        let turn = self.session.play_computer_move().map_err(to_js_error)?;
        to_json(&turn)
    }

    /// 延时后给出电脑的决策（不落子），供前端展示“思考中”。
    pub fn think_computer_move(&mut self, delay_ms: Option<u32>) -> Promise {
        let decision = self.session.think();
        let delay = delay_ms.unwrap_or(self.session.config().computer_delay_ms);

        future_to_promise(async move {
            if delay > 0 {
                TimeoutFuture::new(delay).await;
            }
            let decision = decision.map_err(to_js_error)?;
            let json = to_json(&decision)?;
            Ok(JsValue::from_str(&json))
        })
    }

    pub fn reset(&mut self) -> Result<String, JsValue> {
        self.session.reset();
        self.state_json()
    }
}

/// 返回一个空棋盘、X 先手的初始状态。
#[wasm_bindgen(js_name = "createGameState")]
pub fn create_game_state() -> Result<JsValue, JsValue> {
    to_value(&GameState::new()).map_err(JsValue::from)
}

#[wasm_bindgen(js_name = "evaluateBoard")]
pub fn evaluate_board(board: JsValue) -> Result<JsValue, JsValue> {
    let board: Board = from_value(board).map_err(JsValue::from)?;
    to_value(&evaluate_outcome(&board)).map_err(JsValue::from)
}

#[wasm_bindgen(js_name = "availableMoves")]
pub fn available_moves_js(board: JsValue) -> Result<JsValue, JsValue> {
    let board: Board = from_value(board).map_err(JsValue::from)?;
    to_value(&available_moves(&board)).map_err(JsValue::from)
}

#[wasm_bindgen(js_name = "computeMove")]
pub fn compute_move(
    board: JsValue,
    mover: &str,
    difficulty: Option<String>,
    strategy: Option<String>,
) -> Result<JsValue, JsValue> {
    let board: Board = from_value(board).map_err(JsValue::from)?;
    let mover = parse_player(mover)?;
    let config = AiConfig::from_names(difficulty.as_deref(), strategy.as_deref())
        .map_err(|message| JsValue::from_str(&message))?;
    let mut agent = AiAgent::new(config);
    match agent.decide_move(&board, mover) {
        Ok(decision) => to_value(&decision).map_err(JsValue::from),
        Err(error) => Err(to_js_error(error)),
    }
}

#[wasm_bindgen(js_name = "validateState")]
pub fn validate_state(state: JsValue) -> Result<(), JsValue> {
    let state: GameState = from_value(state).map_err(JsValue::from)?;
    state
        .integrity_check()
        .map_err(|error| to_js_error(RuleError::IntegrityViolation { error }))?;
    Ok(())
}

#[wasm_bindgen(js_name = "setLogLevel")]
pub fn set_log_level(level: &str) -> Result<(), JsValue> {
    let level = logging::parse_level(level)
        .ok_or_else(|| JsValue::from_str(&format!("unknown log level: {level}")))?;
    logging::init(level);
    Ok(())
}

#[cfg(feature = "console_error_panic_hook")]
fn set_panic_hook() {
    console_error_panic_hook::set_once();
}

#[cfg(not(feature = "console_error_panic_hook"))]
fn set_panic_hook() {}
