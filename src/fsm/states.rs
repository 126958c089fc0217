//! Concrete state handler functions and table builder.
//!
//! Each state is defined by three plain `fn` pointers — no closures, no
//! dynamic dispatch, no heap.
//!
//! ```text
//!  IDLE ──[presence]──▶ DEBOUNCING ──[fresh detection]──▶ PROCESSING
//!    ▲                      │                                  │
//!    ├──[gone / suppressed]─┘                                  │
//!    └────────────[cycle complete (forced by service)]─────────┘
//! ```
//!
//! Processing never leaves on its own: the service runs the blocking sort
//! cycle and forces the machine back to Idle afterwards, so a second object
//! arriving mid-cycle is simply not sampled until Idle resumes.

use super::context::SortContext;
use super::{StateDescriptor, StateId};
use log::{debug, info};

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the static state table.  Called once at startup.
pub fn build_state_table() -> [StateDescriptor; StateId::COUNT] {
    [
        // Index 0 — Idle
        StateDescriptor {
            id: StateId::Idle,
            name: "Idle",
            on_enter: None,
            on_exit: None,
            on_update: idle_update,
        },
        // Index 1 — Debouncing
        StateDescriptor {
            id: StateId::Debouncing,
            name: "Debouncing",
            on_enter: Some(debouncing_enter),
            on_exit: None,
            on_update: debouncing_update,
        },
        // Index 2 — Processing
        StateDescriptor {
            id: StateId::Processing,
            name: "Processing",
            on_enter: Some(processing_enter),
            on_exit: None,
            on_update: processing_update,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  IDLE state — sampling the sensor each tick
// ═══════════════════════════════════════════════════════════════════════════

fn idle_update(ctx: &mut SortContext) -> Option<StateId> {
    if ctx.object_present {
        return Some(StateId::Debouncing);
    }
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  DEBOUNCING state — is this a fresh detection or sensor bounce?
// ═══════════════════════════════════════════════════════════════════════════

fn debouncing_enter(ctx: &mut SortContext) {
    debug!("DEBOUNCING: presence at t={}ms", ctx.now_ms);
}

fn debouncing_update(ctx: &mut SortContext) -> Option<StateId> {
    // Signal vanished before confirmation — bounce or a grazing pass.
    if !ctx.object_present {
        debug!("DEBOUNCING: presence gone, back to Idle");
        return Some(StateId::Idle);
    }

    // Too soon after the previous accepted detection — the same object
    // lingering in the field, or contact chatter.  Suppress.
    if !ctx.debounce_elapsed() {
        debug!(
            "DEBOUNCING: suppressed (last accepted {}ms ago, window {}ms)",
            ctx.last_accepted_ms.map_or(0, |t| ctx.now_ms.saturating_sub(t)),
            ctx.config.debounce_interval_ms
        );
        return Some(StateId::Idle);
    }

    Some(StateId::Processing)
}

// ═══════════════════════════════════════════════════════════════════════════
//  PROCESSING state — one full sort cycle owns the machine
// ═══════════════════════════════════════════════════════════════════════════

fn processing_enter(ctx: &mut SortContext) {
    info!(
        "PROCESSING: detection accepted at t={}ms (bin={})",
        ctx.now_ms, ctx.current_bin
    );
}

fn processing_update(_ctx: &mut SortContext) -> Option<StateId> {
    // The service runs the blocking cycle and forces the transition out;
    // nothing to decide per tick.
    None
}
