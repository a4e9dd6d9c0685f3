//! Round state machine
//!
//! Owns the running product, score, progress and clock for one session at a
//! fixed tier. Inputs are pops, one-second ticks, animation frames and the
//! pause/resume/reset gates. Every transition completes synchronously.

use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::events::GameEvent;
use super::level::LevelGenerator;
use super::state::{Bubble, BubbleId, DifficultyTier, Level, PoppingBubble};
use crate::consts::{BOB_AMPLITUDE, FIELD_MAX_X, FIELD_MIN_X};
use crate::tuning::Tuning;

/// Progress value that completes a session
pub const PROGRESS_CAP: u8 = 100;

/// Lifecycle of a round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundPhase {
    /// Created, no level yet
    Idle,
    /// Accepting pops and ticks
    Active,
    /// Progress hit the cap; nothing else is accepted
    SessionComplete,
}

/// Result of a pop event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopOutcome {
    /// Not active, paused, or the bubble is already gone
    Ignored,
    /// The candidate divides the target; selection continues
    Partial { running_product: u32 },
    /// The candidate cannot reach the target; selection restarts.
    /// `candidate` is `None` when the product overflowed `u32`.
    DeadEnd {
        candidate: Option<u32>,
        penalty: u32,
    },
    /// Target reached, a new level is on screen
    LevelCleared { round_score: u32 },
    /// Target reached and progress hit the cap
    SessionComplete { final_score: u32 },
}

/// Result of a one-second tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Ignored,
    Counted { remaining: u32 },
    /// Clock ran out; penalties applied and a new level generated
    TimedOut,
}

/// How close the clock is to running out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeUrgency {
    Calm,
    Low,
    Critical,
}

/// Per-session counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundStats {
    pub pops: u32,
    pub levels_cleared: u32,
    pub timeouts: u32,
    pub dead_ends: u32,
}

/// Read-only view for rendering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundSnapshot {
    pub tier: DifficultyTier,
    pub phase: RoundPhase,
    pub paused: bool,
    pub target_product: u32,
    pub running_product: u32,
    pub score: u32,
    pub progress: u8,
    pub time_remaining: u32,
    pub time_budget: u32,
    /// Fraction of the budget left (0.0 - 1.0)
    pub time_fraction: f32,
    pub urgency: TimeUrgency,
    pub active_bubbles: Vec<Bubble>,
    pub popping: Vec<PoppingBubble>,
}

/// Round/session state for a single player
#[derive(Debug, Clone)]
pub struct Round<R: Rng = Pcg32> {
    tier: DifficultyTier,
    tuning: Tuning,
    generator: LevelGenerator<R>,
    phase: RoundPhase,
    paused: bool,
    level: Level,
    running_product: u32,
    score: u32,
    progress: u8,
    time_remaining: u32,
    popping: Vec<PoppingBubble>,
    events: Vec<GameEvent>,
    stats: RoundStats,
}

impl Round<Pcg32> {
    /// Round with a deterministic seeded generator
    pub fn seeded(tier: DifficultyTier, seed: u64, tuning: Tuning) -> Self {
        Self::new(tier, LevelGenerator::seeded(seed, tuning))
    }
}

impl<R: Rng> Round<R> {
    pub fn new(tier: DifficultyTier, generator: LevelGenerator<R>) -> Self {
        let tuning = generator.tuning().clone();
        let time_remaining = tuning.tier(tier).time_budget_secs;
        Self {
            tier,
            tuning,
            generator,
            phase: RoundPhase::Idle,
            paused: false,
            level: Level {
                target: 0,
                factors: (0, 0),
                bubbles: Vec::new(),
            },
            running_product: 0,
            score: 0,
            progress: 0,
            time_remaining,
            popping: Vec::new(),
            events: Vec::new(),
            stats: RoundStats::default(),
        }
    }

    /// Idle -> Active with a freshly generated level
    pub fn start(&mut self) {
        if self.phase != RoundPhase::Idle {
            return;
        }
        self.phase = RoundPhase::Active;
        log::info!("{} round started", self.tier.as_str());
        self.next_level();
    }

    /// Install a specific level as if it had just been generated
    pub fn replace_level(&mut self, level: Level) {
        if self.phase == RoundPhase::Idle {
            self.phase = RoundPhase::Active;
        }
        self.install_level(level);
    }

    fn next_level(&mut self) {
        let level = self.generator.generate(self.tier);
        self.install_level(level);
    }

    fn install_level(&mut self, level: Level) {
        self.events.push(GameEvent::LevelGenerated {
            target: level.target,
        });
        self.level = level;
        self.running_product = 0;
        self.time_remaining = self.time_budget();
        self.popping.clear();
    }

    fn accepts_input(&self) -> bool {
        self.phase == RoundPhase::Active && !self.paused
    }

    /// Pop a bubble by ID
    pub fn pop(&mut self, id: BubbleId) -> PopOutcome {
        if !self.accepts_input() {
            return PopOutcome::Ignored;
        }
        let Some(bubble) = self.level.take_bubble(id) else {
            return PopOutcome::Ignored;
        };

        let value = bubble.value;
        self.stats.pops += 1;
        self.events.push(GameEvent::Popped { id, value });
        self.popping.push(PoppingBubble {
            bubble,
            remaining_ms: self.tuning.timing.pop_animation_ms as f32,
        });

        let candidate = if self.running_product == 0 {
            Some(value)
        } else {
            self.running_product.checked_mul(value)
        };

        match candidate {
            Some(c) if c == self.level.target => self.clear_level(),
            Some(c) if c != 0 && self.level.target % c == 0 => {
                self.running_product = c;
                self.events.push(GameEvent::ProductAdvanced {
                    running_product: c,
                });
                PopOutcome::Partial {
                    running_product: c,
                }
            }
            other => self.dead_end(other),
        }
    }

    fn clear_level(&mut self) -> PopOutcome {
        let scoring = self.tuning.scoring;
        let round_score = scoring.round_score(self.time_remaining);
        self.score = self.score.saturating_add(round_score);
        self.progress = self
            .progress
            .saturating_add(scoring.progress_per_clear)
            .min(PROGRESS_CAP);
        self.stats.levels_cleared += 1;

        if self.progress == PROGRESS_CAP {
            self.phase = RoundPhase::SessionComplete;
            self.running_product = 0;
            self.events.push(GameEvent::SessionCleared {
                final_score: self.score,
            });
            log::info!(
                "{} session cleared with {} points",
                self.tier.as_str(),
                self.score
            );
            return PopOutcome::SessionComplete {
                final_score: self.score,
            };
        }

        log::info!(
            "Level {} cleared: +{} (score {}, progress {}%)",
            self.level.target,
            round_score,
            self.score,
            self.progress
        );
        self.events.push(GameEvent::LevelCleared {
            round_score,
            progress: self.progress,
        });
        self.next_level();
        PopOutcome::LevelCleared { round_score }
    }

    fn dead_end(&mut self, candidate: Option<u32>) -> PopOutcome {
        let penalty = self.tuning.scoring.dead_end_penalty;
        self.score = self.score.saturating_sub(penalty);
        self.running_product = 0;
        self.stats.dead_ends += 1;
        self.events.push(GameEvent::DeadEnd { candidate, penalty });
        PopOutcome::DeadEnd { candidate, penalty }
    }

    /// One elapsed second
    pub fn tick(&mut self) -> TickOutcome {
        if !self.accepts_input() {
            return TickOutcome::Ignored;
        }

        self.time_remaining = self.time_remaining.saturating_sub(1);
        if self.time_remaining == 0 {
            let scoring = self.tuning.scoring;
            self.score = self.score.saturating_sub(scoring.timeout_penalty);
            self.progress = self
                .progress
                .saturating_sub(scoring.timeout_progress_penalty);
            self.stats.timeouts += 1;
            log::info!(
                "Time ran out on {} (score {}, progress {}%)",
                self.level.target,
                self.score,
                self.progress
            );
            self.events.push(GameEvent::TimedOut {
                penalty: scoring.timeout_penalty,
                progress: self.progress,
            });
            self.next_level();
            return TickOutcome::TimedOut;
        }

        if self.time_remaining < self.tuning.timing.critical_time_secs {
            self.events.push(GameEvent::ClockWarning {
                remaining: self.time_remaining,
            });
        }
        TickOutcome::Counted {
            remaining: self.time_remaining,
        }
    }

    /// Clear the running product without penalty
    pub fn reset_selection(&mut self) -> bool {
        if !self.accepts_input() || self.running_product == 0 {
            return false;
        }
        self.running_product = 0;
        self.events.push(GameEvent::SelectionReset);
        true
    }

    pub fn pause(&mut self) -> bool {
        if self.phase != RoundPhase::Active || self.paused {
            return false;
        }
        self.paused = true;
        self.events.push(GameEvent::Paused);
        true
    }

    pub fn resume(&mut self) -> bool {
        if !self.paused {
            return false;
        }
        self.paused = false;
        self.events.push(GameEvent::Resumed);
        true
    }

    /// Drift bubbles for one animation frame; `time_secs` drives the bob
    pub fn animate_frame(&mut self, time_secs: f32) {
        if !self.accepts_input() {
            return;
        }
        for bubble in &mut self.level.bubbles {
            let phase = bubble.bob_phase();
            bubble.pos.x += bubble.speed;
            bubble.pos.y += (time_secs + phase).sin() * BOB_AMPLITUDE;
            if bubble.pos.x > FIELD_MAX_X || bubble.pos.x < FIELD_MIN_X {
                bubble.speed = -bubble.speed;
            }
        }
    }

    /// Age the popping queue by wall time (runs while paused too)
    pub fn expire_popping(&mut self, dt_ms: f32) {
        for entry in &mut self.popping {
            entry.remaining_ms -= dt_ms;
        }
        self.popping.retain(|p| p.remaining_ms > 0.0);
    }

    /// Take all events emitted since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn time_budget(&self) -> u32 {
        self.tuning.tier(self.tier).time_budget_secs
    }

    pub fn urgency(&self) -> TimeUrgency {
        let timing = self.tuning.timing;
        if self.time_remaining < timing.critical_time_secs {
            TimeUrgency::Critical
        } else if self.time_remaining < timing.low_time_secs {
            TimeUrgency::Low
        } else {
            TimeUrgency::Calm
        }
    }

    pub fn snapshot(&self) -> RoundSnapshot {
        let budget = self.time_budget();
        RoundSnapshot {
            tier: self.tier,
            phase: self.phase,
            paused: self.paused,
            target_product: self.level.target,
            running_product: self.running_product,
            score: self.score,
            progress: self.progress,
            time_remaining: self.time_remaining,
            time_budget: budget,
            time_fraction: self.time_remaining as f32 / budget.max(1) as f32,
            urgency: self.urgency(),
            active_bubbles: self.level.bubbles.clone(),
            popping: self.popping.clone(),
        }
    }

    pub fn tier(&self) -> DifficultyTier {
        self.tier
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn level(&self) -> &Level {
        &self.level
    }

    pub fn target(&self) -> u32 {
        self.level.target
    }

    pub fn running_product(&self) -> u32 {
        self.running_product
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn progress(&self) -> u8 {
        self.progress
    }

    pub fn time_remaining(&self) -> u32 {
        self.time_remaining
    }

    pub fn popping(&self) -> &[PoppingBubble] {
        &self.popping
    }

    pub fn stats(&self) -> RoundStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::events::Cue;

    fn beginner() -> Round {
        let mut round = Round::seeded(DifficultyTier::Beginner, 12345, Tuning::default());
        round.start();
        round
    }

    /// Install a level with explicit values and return the bubble IDs in order
    fn install(round: &mut Round, target: u32, values: &[u32]) -> Vec<BubbleId> {
        let mut generator = LevelGenerator::seeded(1, Tuning::default());
        let level = generator.level_from_values(target, (values[0], values[1]), values);
        let ids = level.bubbles.iter().map(|b| b.id).collect();
        round.replace_level(level);
        ids
    }

    #[test]
    fn test_start_generates_level() {
        let mut round = Round::seeded(DifficultyTier::Explorer, 5, Tuning::default());
        assert_eq!(round.phase(), RoundPhase::Idle);
        assert_eq!(round.tick(), TickOutcome::Ignored);

        round.start();
        assert_eq!(round.phase(), RoundPhase::Active);
        assert_eq!(round.level().bubbles.len(), 12);
        assert_eq!(round.time_remaining(), 30);
        assert_eq!(round.running_product(), 0);
    }

    #[test]
    fn test_clear_with_time_bonus() {
        let mut round = beginner();
        let ids = install(&mut round, 12, &[3, 4, 7, 1]);
        for _ in 0..5 {
            round.tick();
        }
        assert_eq!(round.time_remaining(), 35);

        assert_eq!(round.pop(ids[0]), PopOutcome::Partial { running_product: 3 });
        assert_eq!(round.pop(ids[1]), PopOutcome::LevelCleared { round_score: 225 });
        assert_eq!(round.score(), 225);
        assert_eq!(round.progress(), 20);
        assert_eq!(round.running_product(), 0);
        assert_eq!(round.time_remaining(), 40);
        assert!(round.popping().is_empty());
    }

    #[test]
    fn test_dead_end_floors_score() {
        let mut round = beginner();
        let ids = install(&mut round, 12, &[3, 4, 7]);

        assert_eq!(
            round.pop(ids[2]),
            PopOutcome::DeadEnd {
                candidate: Some(7),
                penalty: 10
            }
        );
        assert_eq!(round.score(), 0);
        assert_eq!(round.running_product(), 0);
    }

    #[test]
    fn test_dead_end_costs_ten_points() {
        let mut round = beginner();
        let ids = install(&mut round, 6, &[2, 3]);
        round.pop(ids[0]);
        round.pop(ids[1]);
        let before = round.score();
        assert_eq!(before, 250);

        let ids = install(&mut round, 12, &[3, 4, 7]);
        round.pop(ids[0]);
        assert!(matches!(round.pop(ids[2]), PopOutcome::DeadEnd { .. }));
        assert_eq!(round.score(), before - 10);
        assert_eq!(round.running_product(), 0);
        assert_eq!(round.stats().dead_ends, 1);
    }

    #[test]
    fn test_overflowing_product_is_dead_end() {
        let mut round = beginner();
        let ids = install(&mut round, 65536 * 65535, &[65536, 65535, 65536]);

        assert_eq!(round.pop(ids[0]), PopOutcome::Partial { running_product: 65536 });
        assert_eq!(
            round.pop(ids[2]),
            PopOutcome::DeadEnd {
                candidate: None,
                penalty: 10
            }
        );
        assert_eq!(round.running_product(), 0);
        assert!(round
            .drain_events()
            .contains(&GameEvent::DeadEnd { candidate: None, penalty: 10 }));
    }

    #[test]
    fn test_partial_product_kept() {
        let mut round = beginner();
        let ids = install(&mut round, 12, &[2, 3, 5]);

        round.pop(ids[0]);
        assert_eq!(round.running_product(), 2);
        assert_eq!(round.pop(ids[1]), PopOutcome::Partial { running_product: 6 });
        assert_eq!(round.running_product(), 6);
        assert_eq!(round.score(), 0);
    }

    #[test]
    fn test_overshoot_is_dead_end() {
        let mut round = beginner();
        let ids = install(&mut round, 4, &[2, 2, 4]);

        round.pop(ids[0]);
        // 2 * 4 = 8 does not divide 4
        assert!(matches!(round.pop(ids[2]), PopOutcome::DeadEnd { candidate: Some(8), .. }));
        assert_eq!(round.running_product(), 0);
    }

    #[test]
    fn test_pop_is_idempotent() {
        let mut round = beginner();
        let ids = install(&mut round, 12, &[2, 3, 5]);

        round.pop(ids[0]);
        assert_eq!(round.pop(ids[0]), PopOutcome::Ignored);
        assert_eq!(round.running_product(), 2);
        assert_eq!(round.stats().pops, 1);
    }

    #[test]
    fn test_timeout_penalties() {
        let mut round = beginner();
        let ids = install(&mut round, 4, &[2, 2, 5]);
        round.pop(ids[0]);
        round.pop(ids[1]);
        assert_eq!(round.score(), 250);
        assert_eq!(round.progress(), 20);

        let first_id = round.level().bubbles[0].id;
        for _ in 0..39 {
            assert!(matches!(round.tick(), TickOutcome::Counted { .. }));
        }
        assert_eq!(round.tick(), TickOutcome::TimedOut);
        assert_eq!(round.score(), 240);
        assert_eq!(round.progress(), 10);
        assert_eq!(round.time_remaining(), 40);
        assert_eq!(round.running_product(), 0);
        // A fresh level replaced the old bubbles
        assert!(round.level().bubble(first_id).is_none());
    }

    #[test]
    fn test_timeout_floors_at_zero() {
        let mut round = beginner();
        for _ in 0..40 {
            round.tick();
        }
        assert_eq!(round.score(), 0);
        assert_eq!(round.progress(), 0);
        assert_eq!(round.stats().timeouts, 1);
    }

    #[test]
    fn test_pause_gates_input() {
        let mut round = beginner();
        let ids = install(&mut round, 12, &[2, 3, 5]);

        assert!(round.pause());
        assert!(!round.pause());
        assert_eq!(round.tick(), TickOutcome::Ignored);
        assert_eq!(round.pop(ids[0]), PopOutcome::Ignored);
        assert_eq!(round.time_remaining(), 40);
        assert!(round.level().bubble(ids[0]).is_some());

        assert!(round.resume());
        assert!(matches!(round.pop(ids[0]), PopOutcome::Partial { .. }));
    }

    #[test]
    fn test_reset_selection() {
        let mut round = beginner();
        let ids = install(&mut round, 12, &[2, 3, 5]);
        assert!(!round.reset_selection());

        round.pop(ids[0]);
        assert!(round.reset_selection());
        assert_eq!(round.running_product(), 0);
        assert_eq!(round.score(), 0);
    }

    #[test]
    fn test_session_completes_once() {
        let mut round = beginner();
        let mut completions = 0;
        for _ in 0..5 {
            let ids = install(&mut round, 6, &[2, 3]);
            round.pop(ids[0]);
            if let PopOutcome::SessionComplete { final_score } = round.pop(ids[1]) {
                assert_eq!(final_score, round.score());
                completions += 1;
            }
        }
        assert_eq!(completions, 1);
        assert_eq!(round.progress(), 100);
        assert_eq!(round.phase(), RoundPhase::SessionComplete);
        assert_eq!(round.score(), 5 * 250);

        // Everything is ignored once complete
        assert_eq!(round.tick(), TickOutcome::Ignored);
        assert!(!round.pause());
        let cleared = round
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::SessionCleared { .. }))
            .count();
        assert_eq!(cleared, 1);
    }

    #[test]
    fn test_events_and_cues() {
        let mut round = beginner();
        round.drain_events();
        let ids = install(&mut round, 12, &[3, 4, 7]);
        round.pop(ids[2]);

        let cues: Vec<Cue> = round.drain_events().iter().filter_map(|e| e.cue()).collect();
        assert_eq!(cues, vec![Cue::Pop, Cue::Error]);
    }

    #[test]
    fn test_clock_warning_and_urgency() {
        let mut round = beginner();
        for _ in 0..31 {
            round.tick();
        }
        assert_eq!(round.time_remaining(), 9);
        assert_eq!(round.urgency(), TimeUrgency::Low);
        round.drain_events();

        for _ in 0..5 {
            round.tick();
        }
        assert_eq!(round.time_remaining(), 4);
        assert_eq!(round.urgency(), TimeUrgency::Critical);
        let warnings = round
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::ClockWarning { .. }))
            .count();
        assert_eq!(warnings, 1);
    }

    #[test]
    fn test_drift_bounces_at_edges() {
        let mut round = beginner();
        let ids = install(&mut round, 12, &[3, 4]);
        round.level.bubbles[0].pos.x = 89.95;
        round.level.bubbles[0].speed = 0.1;

        round.animate_frame(0.0);
        let bubble = round.level().bubble(ids[0]).unwrap();
        assert!(bubble.pos.x > 90.0);
        assert!(bubble.speed < 0.0);

        round.pause();
        let before = round.level().bubble(ids[0]).unwrap().pos;
        round.animate_frame(1.0);
        assert_eq!(round.level().bubble(ids[0]).unwrap().pos, before);
    }

    #[test]
    fn test_popping_queue_expires() {
        let mut round = beginner();
        let ids = install(&mut round, 12, &[2, 3, 5]);
        round.pop(ids[0]);
        assert_eq!(round.popping().len(), 1);

        round.pause();
        round.expire_popping(200.0);
        assert_eq!(round.popping().len(), 1);
        round.expire_popping(150.0);
        assert!(round.popping().is_empty());
    }

    #[test]
    fn test_snapshot() {
        let mut round = beginner();
        install(&mut round, 12, &[3, 4, 7]);
        for _ in 0..10 {
            round.tick();
        }
        let snap = round.snapshot();
        assert_eq!(snap.target_product, 12);
        assert_eq!(snap.time_remaining, 30);
        assert_eq!(snap.time_budget, 40);
        assert!((snap.time_fraction - 0.75).abs() < 0.0001);
        assert_eq!(snap.active_bubbles.len(), 3);
        assert_eq!(snap.urgency, TimeUrgency::Calm);
    }
}
