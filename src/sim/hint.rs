//! Hint search
//!
//! Finds a bubble that moves the running product toward the target. Used by
//! the headless demo player and available to hosts that want a hint button.

use super::state::{BubbleId, Level};

/// Pick the next bubble to pop, or `None` if the current selection cannot
/// be completed with what is left on screen
pub fn suggest_pop(level: &Level, running_product: u32) -> Option<BubbleId> {
    let target = level.target;
    let remaining = if running_product == 0 {
        target
    } else if target % running_product == 0 {
        target / running_product
    } else {
        return None;
    };

    // Finish in one pop if possible
    if let Some(bubble) = level.bubbles.iter().find(|b| b.value == remaining) {
        return Some(bubble.id);
    }

    // Otherwise start a pair that completes it, skipping 1s (they never help)
    for (i, a) in level.bubbles.iter().enumerate() {
        if a.value <= 1 || remaining % a.value != 0 {
            continue;
        }
        let rest = remaining / a.value;
        let completes = level
            .bubbles
            .iter()
            .enumerate()
            .any(|(j, b)| j != i && b.value == rest);
        if completes {
            return Some(a.id);
        }
    }
    None
}
