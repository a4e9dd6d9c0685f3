//! Pop to Make - a multiplication bubble-popping game engine
//!
//! Core modules:
//! - `sim`: Deterministic round engine (level generation, pop/tick rules)
//! - `session`: Session lifecycle, timers and high-score hand-off
//! - `clock`: Periodic and one-shot timers fed by host time
//! - `highscores`: Best score per difficulty tier
//! - `persistence`: Key-value storage backends
//! - `tuning`: Data-driven game balance

pub mod clock;
pub mod highscores;
pub mod persistence;
pub mod session;
pub mod sim;
pub mod tuning;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use highscores::{HighScoreStore, HighScoreTable};
pub use session::{Session, SessionController, SessionPhase, SessionSnapshot, SessionSummary};
pub use sim::{DifficultyTier, GameEvent, PopOutcome, Round, TickOutcome};
pub use tuning::Tuning;

/// Engine timing constants
pub mod consts {
    /// Animation frame step (60 Hz)
    pub const FRAME_DT: f32 = 1.0 / 60.0;
    /// Maximum animation frames run per `advance` call
    pub const MAX_FRAME_SUBSTEPS: u32 = 8;
    /// Countdown clock period in seconds
    pub const TICK_PERIOD: f32 = 1.0;
    /// Longest wall-clock step accepted by `advance` (seconds)
    pub const MAX_ADVANCE_DT: f32 = 1.0;

    /// Drifting bubbles reverse direction outside this band (percent space)
    pub const FIELD_MIN_X: f32 = 5.0;
    pub const FIELD_MAX_X: f32 = 90.0;
    /// Vertical bob per frame
    pub const BOB_AMPLITUDE: f32 = 0.05;
}
