//! Events emitted by the round for the presentation layer
//!
//! The engine never plays sounds itself; it reports what happened and the
//! host maps events to cues.

use serde::{Deserialize, Serialize};

use super::state::BubbleId;

/// Sound cue types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cue {
    /// Any bubble popped
    Pop,
    /// Target reached, more levels to go
    CorrectProduct,
    /// Dead-end selection or time ran out
    Error,
    /// Clock is about to run out
    Tick,
    /// Final level cleared
    LevelComplete,
}

/// Something that happened inside the round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GameEvent {
    LevelGenerated { target: u32 },
    Popped { id: BubbleId, value: u32 },
    ProductAdvanced { running_product: u32 },
    /// `candidate` is `None` when the product overflowed `u32`
    DeadEnd {
        candidate: Option<u32>,
        penalty: u32,
    },
    SelectionReset,
    LevelCleared { round_score: u32, progress: u8 },
    TimedOut { penalty: u32, progress: u8 },
    ClockWarning { remaining: u32 },
    SessionCleared { final_score: u32 },
    Paused,
    Resumed,
}

impl GameEvent {
    /// Sound the presentation layer should play, if any
    pub fn cue(&self) -> Option<Cue> {
        match self {
            GameEvent::Popped { .. } | GameEvent::SelectionReset => Some(Cue::Pop),
            GameEvent::LevelCleared { .. } => Some(Cue::CorrectProduct),
            GameEvent::DeadEnd { .. } | GameEvent::TimedOut { .. } => Some(Cue::Error),
            GameEvent::ClockWarning { .. } => Some(Cue::Tick),
            GameEvent::SessionCleared { .. } => Some(Cue::LevelComplete),
            GameEvent::Paused | GameEvent::Resumed => Some(Cue::Pop),
            GameEvent::LevelGenerated { .. } | GameEvent::ProductAdvanced { .. } => None,
        }
    }
}
