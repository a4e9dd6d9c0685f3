//! Deterministic game engine
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Seeded RNG only
//! - Stable bubble order (generation order)
//! - No rendering, audio or platform dependencies

pub mod events;
pub mod hint;
pub mod level;
pub mod round;
pub mod state;

pub use events::{Cue, GameEvent};
pub use hint::suggest_pop;
pub use level::LevelGenerator;
pub use round::{
    PROGRESS_CAP, PopOutcome, Round, RoundPhase, RoundSnapshot, RoundStats, TickOutcome,
    TimeUrgency,
};
pub use state::{Bubble, BubbleColor, BubbleId, DifficultyTier, Level, PoppingBubble};
