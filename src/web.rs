//! Browser binding
//!
//! Exposes the session engine to a JavaScript presentation layer. Snapshots
//! and events cross the boundary as JSON strings.

use wasm_bindgen::prelude::*;

use crate::persistence::LocalStorage;
use crate::session::{Session, SessionController};
use crate::sim::{BubbleId, DifficultyTier};
use crate::tuning::Tuning;

#[wasm_bindgen(start)]
pub fn wasm_main() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
    log::info!("Pop to Make engine loaded");
}

/// Engine handle owned by the page
#[wasm_bindgen]
pub struct WebGame {
    controller: SessionController<LocalStorage>,
    session: Option<Session>,
}

#[wasm_bindgen]
impl WebGame {
    /// `tuning_json` may be empty to use the default balance
    #[wasm_bindgen(constructor)]
    pub fn new(tuning_json: &str) -> WebGame {
        let tuning = if tuning_json.is_empty() {
            Tuning::default()
        } else {
            Tuning::load_or_default(Some(tuning_json))
        };
        WebGame {
            controller: SessionController::new(LocalStorage::new(), tuning),
            session: None,
        }
    }

    /// Start a session; returns false for an unknown tier name
    pub fn start(&mut self, tier: &str) -> bool {
        let Some(tier) = DifficultyTier::from_str(tier) else {
            log::warn!("Unknown tier {tier:?}");
            return false;
        };
        if let Some(mut old) = self.session.take() {
            old.quit();
        }
        self.session = Some(self.controller.start_session(tier));
        true
    }

    pub fn pop(&mut self, id: u32) {
        if let Some(session) = self.session.as_mut() {
            session.pop(BubbleId(id));
        }
    }

    pub fn reset_selection(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.reset_selection();
        }
    }

    pub fn pause(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.pause();
        }
    }

    pub fn resume(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.resume();
        }
    }

    /// Leave the current session without saving
    pub fn quit(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.quit();
        }
    }

    /// Advance by `dt` seconds. When the session completes this returns the
    /// summary as JSON (and the session is torn down); otherwise an empty string.
    pub fn advance(&mut self, dt: f32) -> String {
        let finished = self
            .session
            .as_mut()
            .and_then(|session| session.advance(dt))
            .is_some();
        if !finished {
            return String::new();
        }
        let Some(session) = self.session.take() else {
            return String::new();
        };
        self.controller
            .finish(session)
            .and_then(|summary| serde_json::to_string(&summary).ok())
            .unwrap_or_default()
    }

    /// Current session snapshot as JSON, or an empty string with no session
    pub fn snapshot(&self) -> String {
        self.session
            .as_ref()
            .and_then(|session| serde_json::to_string(&session.snapshot()).ok())
            .unwrap_or_default()
    }

    /// Events since the last call as a JSON array
    pub fn drain_events(&mut self) -> String {
        let events = self
            .session
            .as_mut()
            .map(|session| session.drain_events())
            .unwrap_or_default();
        serde_json::to_string(&events).unwrap_or_else(|_| "[]".to_string())
    }

    /// Stored high scores as JSON
    pub fn high_scores(&self) -> String {
        serde_json::to_string(&self.controller.high_scores()).unwrap_or_default()
    }
}
