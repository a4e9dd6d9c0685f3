//! Pop to Make entry point
//!
//! The browser build is driven from JavaScript through `pop_to_make::web`.
//! Natively this runs a headless demo session played by the hint search.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use pop_to_make::consts::FRAME_DT;
    use pop_to_make::persistence::FileStorage;
    use pop_to_make::sim::{Cue, suggest_pop};
    use pop_to_make::{DifficultyTier, SessionController, SessionPhase, Tuning};

    env_logger::init();
    log::info!("Pop to Make (native) starting...");

    let tier = std::env::args()
        .nth(1)
        .and_then(|arg| DifficultyTier::from_str(&arg))
        .unwrap_or(DifficultyTier::Explorer);
    let dir = std::env::temp_dir().join("pop-to-make");
    let mut controller = SessionController::new(FileStorage::new(&dir), Tuning::default());
    let mut session = controller.start_session(tier);

    // Demo player: one pop roughly every 1.5 seconds
    const FRAMES_PER_POP: u32 = 90;
    let mut frame = 0u32;
    loop {
        frame += 1;
        if session.phase() == SessionPhase::Playing && frame % FRAMES_PER_POP == 0 {
            let round = session.round();
            match suggest_pop(round.level(), round.running_product()) {
                Some(id) => {
                    session.pop(id);
                }
                None => {
                    session.reset_selection();
                }
            }
        }

        let done = session.advance(FRAME_DT).is_some();
        for event in session.drain_events() {
            if event.cue() == Some(Cue::CorrectProduct) || event.cue() == Some(Cue::LevelComplete) {
                println!("{event:?}");
            }
        }
        if done {
            break;
        }
    }

    match controller.finish(session) {
        Some(summary) => {
            println!(
                "{} finished with {} points ({} cleared, {} timeouts){}",
                summary.tier.as_str(),
                summary.final_score,
                summary.stats.levels_cleared,
                summary.stats.timeouts,
                if summary.new_best { " - new best!" } else { "" }
            );
        }
        None => println!("Session ended without a result"),
    }
    println!("High scores: {:?} (stored in {})", controller.high_scores(), dir.display());
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is web::wasm_main, this is just to satisfy the compiler
}
