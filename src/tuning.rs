//! Data-driven game balance
//!
//! Every number the round rules depend on lives here so a build can ship a
//! different balance as JSON without touching the engine.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sim::DifficultyTier;

/// Errors produced while parsing or validating a tuning document
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("invalid tuning JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{tier:?}: max factor must be at least 2 (got {value})")]
    MaxFactorTooSmall { tier: DifficultyTier, value: u32 },
    #[error("{tier:?}: max factor {value} overflows level values")]
    MaxFactorTooLarge { tier: DifficultyTier, value: u32 },
    #[error("{tier:?}: time budget must be positive")]
    ZeroTimeBudget { tier: DifficultyTier },
    #[error("progress per clear must be within 1..=100 (got {0})")]
    ProgressStep(u8),
    #[error("range `{name}` is empty or inverted ({min}..{max})")]
    BadRange { name: &'static str, min: f32, max: f32 },
}

/// Per-tier rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierTuning {
    /// Largest seeded factor (inclusive)
    pub max_factor: u32,
    /// Seconds on the clock for every level
    pub time_budget_secs: u32,
}

/// Score and progress rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringTuning {
    pub clear_base: u32,
    pub bonus_per_second: u32,
    pub dead_end_penalty: u32,
    pub timeout_penalty: u32,
    pub progress_per_clear: u8,
    pub timeout_progress_penalty: u8,
}

impl Default for ScoringTuning {
    fn default() -> Self {
        Self {
            clear_base: 50,
            bonus_per_second: 5,
            dead_end_penalty: 10,
            timeout_penalty: 10,
            progress_per_clear: 20,
            timeout_progress_penalty: 10,
        }
    }
}

impl ScoringTuning {
    /// Points for clearing a level with `time_remaining` seconds left
    pub fn round_score(&self, time_remaining: u32) -> u32 {
        self.clear_base
            .saturating_add(self.bonus_per_second.saturating_mul(time_remaining))
    }
}

/// Level layout rules (normalized percent space)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelTuning {
    /// Distractors added after the two seeded factors
    pub distractors: usize,
    /// Distractor values range over `1..=max_factor + headroom`
    pub distractor_headroom: u32,
    pub spawn_x: (f32, f32),
    pub spawn_y: (f32, f32),
    pub size: (f32, f32),
    /// Drift speed magnitude; the sign is random
    pub speed: (f32, f32),
}

impl Default for LevelTuning {
    fn default() -> Self {
        Self {
            distractors: 10,
            distractor_headroom: 3,
            spawn_x: (5.0, 85.0),
            spawn_y: (10.0, 80.0),
            size: (60.0, 80.0),
            speed: (0.05, 0.15),
        }
    }
}

/// Presentation-facing timing rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingTuning {
    /// Delay between the final clear and the session completing
    pub celebration_ms: u32,
    /// Lifetime of an entry in the popping animation queue
    pub pop_animation_ms: u32,
    /// Below this many seconds the clock is `Low`
    pub low_time_secs: u32,
    /// Below this many seconds the clock is `Critical` and ticks emit warnings
    pub critical_time_secs: u32,
}

impl Default for TimingTuning {
    fn default() -> Self {
        Self {
            celebration_ms: 2000,
            pop_animation_ms: 300,
            low_time_secs: 10,
            critical_time_secs: 5,
        }
    }
}

/// Complete balance sheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub beginner: TierTuning,
    pub explorer: TierTuning,
    pub math_master: TierTuning,
    pub scoring: ScoringTuning,
    pub level: LevelTuning,
    pub timing: TimingTuning,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            beginner: TierTuning {
                max_factor: 5,
                time_budget_secs: 40,
            },
            explorer: TierTuning {
                max_factor: 10,
                time_budget_secs: 30,
            },
            math_master: TierTuning {
                max_factor: 12,
                time_budget_secs: 25,
            },
            scoring: ScoringTuning::default(),
            level: LevelTuning::default(),
            timing: TimingTuning::default(),
        }
    }
}

impl Tuning {
    /// Rules for one tier
    pub fn tier(&self, tier: DifficultyTier) -> TierTuning {
        match tier {
            DifficultyTier::Beginner => self.beginner,
            DifficultyTier::Explorer => self.explorer,
            DifficultyTier::MathMaster => self.math_master,
        }
    }

    /// Parse a (possibly partial) JSON document and validate it
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Parse `json` if present, falling back to defaults on any error
    pub fn load_or_default(json: Option<&str>) -> Self {
        let Some(json) = json else {
            return Self::default();
        };
        match Self::from_json(json) {
            Ok(tuning) => {
                log::info!("Loaded custom tuning");
                tuning
            }
            Err(err) => {
                log::warn!("Ignoring tuning override: {err}");
                Self::default()
            }
        }
    }

    /// Check the values the engine relies on
    pub fn validate(&self) -> Result<(), TuningError> {
        for tier in DifficultyTier::ALL {
            let rules = self.tier(tier);
            if rules.max_factor < 2 {
                return Err(TuningError::MaxFactorTooSmall {
                    tier,
                    value: rules.max_factor,
                });
            }
            let headroom = self.level.distractor_headroom;
            if rules.max_factor.checked_mul(rules.max_factor).is_none()
                || rules.max_factor.checked_add(headroom).is_none()
            {
                return Err(TuningError::MaxFactorTooLarge {
                    tier,
                    value: rules.max_factor,
                });
            }
            if rules.time_budget_secs == 0 {
                return Err(TuningError::ZeroTimeBudget { tier });
            }
        }

        let step = self.scoring.progress_per_clear;
        if step == 0 || step > 100 {
            return Err(TuningError::ProgressStep(step));
        }

        let ranges = [
            ("spawn_x", self.level.spawn_x),
            ("spawn_y", self.level.spawn_y),
            ("size", self.level.size),
            ("speed", self.level.speed),
        ];
        for (name, (min, max)) in ranges {
            if min.is_nan() || max.is_nan() || min >= max {
                return Err(TuningError::BadRange { name, min, max });
            }
        }
        Ok(())
    }
}
