//! Interrupt-driven event system.
//!
//! Events are produced by:
//! - Timer callbacks (control ticks, telemetry)
//! - Software (manual sort triggers, future serial commands)
//!
//! Events are consumed by the main control loop, one at a time, in FIFO
//! order.  The queue is a lock-free SPSC ring so timer-task producers never
//! contend with the main-loop consumer.

use core::sync::atomic::{AtomicU8, Ordering};

/// Maximum number of pending events.
/// Power of 2 for efficient ring buffer modulo.
const EVENT_QUEUE_CAP: usize = 16;

/// System event types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Event {
    /// Detection loop tick — poll the IR sensor and advance the FSM.
    ControlTick = 0,
    /// Telemetry report timer fired.
    TelemetryTick = 1,
    /// Manual sort request (serial console, future RPC).
    TriggerSort = 2,
}

// ── Lock-free SPSC ring buffer ────────────────────────────────
//
// Timer callbacks write (produce), main loop reads (consume).
// Uses atomic head/tail indices; the buffer lives in a static so the
// esp_timer task callbacks can reach it.

static EVENT_HEAD: AtomicU8 = AtomicU8::new(0);
static EVENT_TAIL: AtomicU8 = AtomicU8::new(0);
// SAFETY: one producer (timer task), one consumer (main loop); the atomic
// head/tail indices enforce the SPSC discipline, so no slot is ever
// accessed concurrently.
static mut EVENT_BUFFER: [u8; EVENT_QUEUE_CAP] = [0; EVENT_QUEUE_CAP];

/// Push an event into the queue.
/// Safe to call from timer-task context (lock-free).
/// Returns `false` if the queue is full (event dropped).
pub fn push_event(event: Event) -> bool {
    let head = EVENT_HEAD.load(Ordering::Relaxed);
    let tail = EVENT_TAIL.load(Ordering::Acquire);
    let next_head = (head + 1) % EVENT_QUEUE_CAP as u8;

    if next_head == tail {
        return false; // Queue full — drop event.
    }

    // SAFETY: single producer; the slot at `head` is not visible to the
    // consumer until the Release store below.
    unsafe {
        EVENT_BUFFER[head as usize] = event as u8;
    }

    EVENT_HEAD.store(next_head, Ordering::Release);
    true
}

/// Pop the next event from the queue.
/// Called from the main loop (single consumer).
/// Returns `None` if the queue is empty.
pub fn pop_event() -> Option<Event> {
    let tail = EVENT_TAIL.load(Ordering::Relaxed);
    let head = EVENT_HEAD.load(Ordering::Acquire);

    if tail == head {
        return None; // Empty.
    }

    // SAFETY: single consumer; the Acquire load above synchronises with the
    // producer's Release store, so the slot contents are published.
    let raw = unsafe { EVENT_BUFFER[tail as usize] };
    EVENT_TAIL.store((tail + 1) % EVENT_QUEUE_CAP as u8, Ordering::Release);

    event_from_u8(raw)
}

/// Drain all pending events into a callback, FIFO order.
pub fn drain_events(mut handler: impl FnMut(Event)) {
    while let Some(event) = pop_event() {
        handler(event);
    }
}

/// Number of pending events.
pub fn queue_len() -> usize {
    let head = EVENT_HEAD.load(Ordering::Relaxed) as usize;
    let tail = EVENT_TAIL.load(Ordering::Relaxed) as usize;
    (head + EVENT_QUEUE_CAP - tail) % EVENT_QUEUE_CAP
}

// ── Internal ──────────────────────────────────────────────────

fn event_from_u8(raw: u8) -> Option<Event> {
    match raw {
        0 => Some(Event::ControlTick),
        1 => Some(Event::TelemetryTick),
        2 => Some(Event::TriggerSort),
        _ => None,
    }
}
