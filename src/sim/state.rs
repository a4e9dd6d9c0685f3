//! Core game types
//!
//! Difficulty tiers, bubbles and levels. Everything the presentation layer
//! reads is serializable so it can cross the wasm boundary as JSON.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Difficulty tier, fixed for the whole session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DifficultyTier {
    Beginner,
    Explorer,
    MathMaster,
}

impl DifficultyTier {
    pub const ALL: [DifficultyTier; 3] = [
        DifficultyTier::Beginner,
        DifficultyTier::Explorer,
        DifficultyTier::MathMaster,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DifficultyTier::Beginner => "Beginner",
            DifficultyTier::Explorer => "Explorer",
            DifficultyTier::MathMaster => "Math Master",
        }
    }

    /// Key used in the persisted high-score record
    pub fn storage_key(&self) -> &'static str {
        match self {
            DifficultyTier::Beginner => "easy",
            DifficultyTier::Explorer => "medium",
            DifficultyTier::MathMaster => "hard",
        }
    }

    /// Accepts display names and storage keys
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "beginner" | "easy" => Some(DifficultyTier::Beginner),
            "explorer" | "medium" => Some(DifficultyTier::Explorer),
            "mathmaster" | "math master" | "math_master" | "hard" => {
                Some(DifficultyTier::MathMaster)
            }
            _ => None,
        }
    }
}

/// Opaque bubble identifier, never reused within a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BubbleId(pub u32);

/// Bubble color tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BubbleColor {
    Red,
    Indigo,
    Green,
    Yellow,
    Purple,
    Pink,
}

impl BubbleColor {
    pub const PALETTE: [BubbleColor; 6] = [
        BubbleColor::Red,
        BubbleColor::Indigo,
        BubbleColor::Green,
        BubbleColor::Yellow,
        BubbleColor::Purple,
        BubbleColor::Pink,
    ];
}

/// A poppable value floating on screen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bubble {
    pub id: BubbleId,
    pub value: u32,
    /// Position in normalized percent space (0-100 on both axes)
    pub pos: Vec2,
    /// Horizontal drift per animation frame (signed)
    pub speed: f32,
    pub size: f32,
    pub color: BubbleColor,
}

impl Bubble {
    /// Phase offset for the vertical bob, stable per bubble
    pub fn bob_phase(&self) -> f32 {
        self.id.0 as f32
    }
}

/// One target product plus the bubbles that can reach it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
    pub target: u32,
    /// The seeded factor pair; the first two bubbles carry these values
    pub factors: (u32, u32),
    pub bubbles: Vec<Bubble>,
}

impl Level {
    pub fn bubble(&self, id: BubbleId) -> Option<&Bubble> {
        self.bubbles.iter().find(|b| b.id == id)
    }

    /// Remove a bubble from the active set
    pub fn take_bubble(&mut self, id: BubbleId) -> Option<Bubble> {
        let index = self.bubbles.iter().position(|b| b.id == id)?;
        Some(self.bubbles.remove(index))
    }

    /// Values of the bubbles still on screen
    pub fn values(&self) -> Vec<u32> {
        self.bubbles.iter().map(|b| b.value).collect()
    }
}

/// A popped bubble still playing its pop animation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoppingBubble {
    pub bubble: Bubble,
    /// Milliseconds left before it leaves the queue
    pub remaining_ms: f32,
}
