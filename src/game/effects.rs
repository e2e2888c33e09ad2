use serde::{Deserialize, Serialize};

use super::rules::Outcome;
use super::state::{GameState, Player};

/// 胜负音效。前端据此选择播放的音频文件。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AudioCue {
    Victory,
    Defeat,
}

impl AudioCue {
    /// 人类执 X：X 胜播放胜利音效，O 胜播放失败音效，平局无音效。
    pub fn for_outcome(outcome: &Outcome) -> Option<Self> {
        match outcome.winner()? {
            Player::X => Some(AudioCue::Victory),
            Player::O => Some(AudioCue::Defeat),
        }
    }
}

/// 交给展示层执行的副作用，按顺序执行。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum PresentationEffect {
    HighlightCells { cells: Vec<usize> },
    PlayCue { cue: AudioCue },
    Announce { message: String },
    ScheduleComputerMove { delay_ms: u32 },
    ScheduleReset { delay_ms: u32 },
}

/// 对局结束后的提示语。
pub fn announcement(outcome: &Outcome, player_name: &str) -> Option<String> {
    match outcome {
        Outcome::Win {
            winner: Player::X, ..
        } => Some(format!("Congratulations, {player_name}! You won!")),
        Outcome::Win {
            winner: Player::O, ..
        } => Some(format!("Sorry, {player_name}. You lost.")),
        Outcome::Draw => Some(format!("It's a draw, {player_name}!")),
        Outcome::InProgress => None,
    }
}

/// 状态栏文本。胜局的第二行沿用胜者标记：轮次在终局时不再前进。
pub fn status_text(state: &GameState, player_name: &str) -> String {
    match state.outcome {
        Outcome::Win { winner, .. } => {
            format!("Winner: {winner} ({player_name})\nNext player: {winner}")
        }
        Outcome::Draw => format!("It's a draw, {player_name}!"),
        Outcome::InProgress => format!("Next player: {} ({player_name})", state.next),
    }
}

/// 终局时的副作用序列：高亮胜利线、播放音效、宣布结果、延时重置。
pub fn terminal_effects(
    outcome: &Outcome,
    player_name: &str,
    reset_delay_ms: u32,
) -> Vec<PresentationEffect> {
    let mut effects = Vec::new();
    if let Outcome::Win { line, .. } = outcome {
        effects.push(PresentationEffect::HighlightCells {
            cells: line.to_vec(),
        });
    }
    if let Some(cue) = AudioCue::for_outcome(outcome) {
        effects.push(PresentationEffect::PlayCue { cue });
    }
    if let Some(message) = announcement(outcome, player_name) {
        effects.push(PresentationEffect::Announce { message });
        effects.push(PresentationEffect::ScheduleReset {
            delay_ms: reset_delay_ms,
        });
    }
    effects
}
