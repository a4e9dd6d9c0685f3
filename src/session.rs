//! Session controller
//!
//! A session is one play-through at a fixed tier. The controller starts
//! sessions, and when one finishes it compares the final score against the
//! stored best and writes it through if it is higher.
//!
//! The session owns two timers (one-second clock, 60 Hz animation frame)
//! driven by `advance`. Quitting or dropping the session tears both down.

use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::clock::{OneShotTimer, PeriodicTimer};
use crate::consts::{FRAME_DT, MAX_ADVANCE_DT, MAX_FRAME_SUBSTEPS, TICK_PERIOD};
use crate::highscores::{HighScoreStore, HighScoreTable};
use crate::persistence::Storage;
use crate::sim::{
    BubbleId, DifficultyTier, GameEvent, LevelGenerator, PopOutcome, Round, RoundSnapshot,
    RoundStats,
};
use crate::tuning::Tuning;

/// Where a session is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    /// Levels in progress (possibly paused)
    Playing,
    /// Final level cleared, waiting out the celebration delay
    Celebrating,
    /// Final score reported
    Finished,
    /// Player left; nothing will be persisted
    Quit,
}

/// Read-only view of a session for rendering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub phase: SessionPhase,
    /// `max(stored best, current score)`
    pub best: u32,
    pub round: RoundSnapshot,
}

/// Outcome of a finished session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub tier: DifficultyTier,
    pub final_score: u32,
    pub previous_best: u32,
    pub new_best: bool,
    pub stats: RoundStats,
}

/// One play-through at a fixed tier
#[derive(Debug)]
pub struct Session<R: Rng = Pcg32> {
    round: Round<R>,
    phase: SessionPhase,
    stored_best: u32,
    clock: PeriodicTimer,
    frames: PeriodicTimer,
    celebration: Option<OneShotTimer>,
    frame_time: f32,
    final_score: Option<u32>,
}

impl<R: Rng> Session<R> {
    /// Wrap a round and start it; `stored_best` is the persisted best for the tier
    pub fn new(mut round: Round<R>, stored_best: u32) -> Self {
        round.start();
        Self {
            round,
            phase: SessionPhase::Playing,
            stored_best,
            clock: PeriodicTimer::new(TICK_PERIOD),
            frames: PeriodicTimer::new(FRAME_DT),
            celebration: None,
            frame_time: 0.0,
            final_score: None,
        }
    }

    /// Forward a pop to the round
    pub fn pop(&mut self, id: BubbleId) -> PopOutcome {
        if self.phase != SessionPhase::Playing {
            return PopOutcome::Ignored;
        }
        let outcome = self.round.pop(id);
        if let PopOutcome::SessionComplete { final_score } = outcome {
            self.begin_celebration(final_score);
        }
        outcome
    }

    fn begin_celebration(&mut self, final_score: u32) {
        let delay = self.round.tuning().timing.celebration_ms as f32 / 1000.0;
        log::info!("Celebrating {} points for {:.1}s", final_score, delay);
        self.phase = SessionPhase::Celebrating;
        self.final_score = Some(final_score);
        self.clock.cancel();
        self.celebration = Some(OneShotTimer::new(delay));
    }

    pub fn pause(&mut self) -> bool {
        self.phase == SessionPhase::Playing && self.round.pause()
    }

    pub fn resume(&mut self) -> bool {
        self.phase == SessionPhase::Playing && self.round.resume()
    }

    pub fn reset_selection(&mut self) -> bool {
        self.phase == SessionPhase::Playing && self.round.reset_selection()
    }

    /// Advance wall-clock time by `dt` seconds.
    ///
    /// Returns the final score exactly once, when the celebration delay after
    /// the last level has elapsed.
    pub fn advance(&mut self, dt: f32) -> Option<u32> {
        let dt = dt.clamp(0.0, MAX_ADVANCE_DT);
        match self.phase {
            SessionPhase::Finished | SessionPhase::Quit => None,
            SessionPhase::Celebrating => {
                self.round.expire_popping(dt * 1000.0);
                let elapsed = self
                    .celebration
                    .as_mut()
                    .is_some_and(|timer| timer.advance(dt));
                if !elapsed {
                    return None;
                }
                self.phase = SessionPhase::Finished;
                self.frames.cancel();
                self.final_score
            }
            SessionPhase::Playing => {
                self.round.expire_popping(dt * 1000.0);
                if self.round.is_paused() {
                    return None;
                }

                let ticks = self.clock.advance(dt, u32::MAX);
                for _ in 0..ticks {
                    self.round.tick();
                }

                let frames = self.frames.advance(dt, MAX_FRAME_SUBSTEPS);
                for _ in 0..frames {
                    self.frame_time += FRAME_DT;
                    self.round.animate_frame(self.frame_time);
                }
                None
            }
        }
    }

    /// Leave the session; both timers stop and nothing is persisted
    pub fn quit(&mut self) {
        if matches!(self.phase, SessionPhase::Finished | SessionPhase::Quit) {
            return;
        }
        log::info!(
            "{} session quit at {} points",
            self.round.tier().as_str(),
            self.round.score()
        );
        self.phase = SessionPhase::Quit;
        self.clock.cancel();
        self.frames.cancel();
        if let Some(timer) = self.celebration.as_mut() {
            timer.cancel();
        }
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.round.drain_events()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            phase: self.phase,
            best: self.stored_best.max(self.round.score()),
            round: self.round.snapshot(),
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn tier(&self) -> DifficultyTier {
        self.round.tier()
    }

    pub fn round(&self) -> &Round<R> {
        &self.round
    }

    /// Direct access for hosts that drive ticks themselves
    pub fn round_mut(&mut self) -> &mut Round<R> {
        &mut self.round
    }

    pub fn stored_best(&self) -> u32 {
        self.stored_best
    }

    /// Final score once the session has finished
    pub fn final_score(&self) -> Option<u32> {
        match self.phase {
            SessionPhase::Finished => self.final_score,
            _ => None,
        }
    }

    /// Whether the timers are torn down
    pub fn timers_stopped(&self) -> bool {
        self.clock.is_cancelled() && self.frames.is_cancelled()
    }
}

/// Starts sessions and persists their results
#[derive(Debug)]
pub struct SessionController<S: Storage> {
    store: HighScoreStore<S>,
    tuning: Tuning,
}

impl<S: Storage> SessionController<S> {
    pub fn new(storage: S, tuning: Tuning) -> Self {
        Self {
            store: HighScoreStore::new(storage),
            tuning,
        }
    }

    /// Start a session with a random seed
    pub fn start_session(&self, tier: DifficultyTier) -> Session {
        self.start_seeded_session(tier, rand::random())
    }

    /// Start a reproducible session
    pub fn start_seeded_session(&self, tier: DifficultyTier, seed: u64) -> Session {
        let generator = LevelGenerator::seeded(seed, self.tuning.clone());
        self.start_with_generator(tier, generator)
    }

    /// Start a session with a caller-supplied random source
    pub fn start_with_generator<R: Rng>(
        &self,
        tier: DifficultyTier,
        generator: LevelGenerator<R>,
    ) -> Session<R> {
        let stored_best = self.store.load().best(tier);
        log::info!(
            "Starting {} session (best {})",
            tier.as_str(),
            stored_best
        );
        Session::new(Round::new(tier, generator), stored_best)
    }

    /// Record a final score; true when it is a new best for the tier
    pub fn on_session_complete(&mut self, tier: DifficultyTier, final_score: u32) -> bool {
        self.store.record(tier, final_score)
    }

    /// Tear down a session and persist its result if it finished.
    /// Quit or unfinished sessions return `None` and store nothing.
    pub fn finish<R: Rng>(&mut self, mut session: Session<R>) -> Option<SessionSummary> {
        let Some(final_score) = session.final_score() else {
            session.quit();
            return None;
        };
        let tier = session.tier();
        let previous_best = self.store.load().best(tier);
        let new_best = self.on_session_complete(tier, final_score);
        Some(SessionSummary {
            tier,
            final_score,
            previous_best,
            new_best,
            stats: session.round().stats(),
        })
    }

    pub fn high_scores(&self) -> HighScoreTable {
        self.store.load()
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn store(&self) -> &HighScoreStore<S> {
        &self.store
    }
}
