//! Unified error types for the SortBin firmware.
//!
//! A detection cycle can fail in exactly five ways, and every one of them is
//! cycle-local: the failure is logged and reported, the carousel does not
//! move, and the device returns to Idle to wait for the next trigger.  All
//! variants are `Copy` so they can be threaded through events and telemetry
//! without allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Cycle errors
// ---------------------------------------------------------------------------

/// Everything that can abort a single detection cycle.
///
/// None of these is fatal — there is no retry counter and no escalation;
/// every physical trigger starts an independent attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleError {
    /// Image acquisition failed locally; no network call was made.
    Capture,
    /// Transport or HTTP failure while talking to the classifier service.
    Network,
    /// The classifier responded, but the body was not a recognisable
    /// `{"label": ...}` document.
    Parse,
    /// The classifier returned a label that is not in the category table.
    UnknownLabel,
    /// The network link could not be (re)established within the timeout;
    /// the cycle aborted before any capture attempt.
    ConnectivityTimeout,
}

impl fmt::Display for CycleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Capture => write!(f, "image capture failed"),
            Self::Network => write!(f, "classifier request failed"),
            Self::Parse => write!(f, "classifier response unparseable"),
            Self::UnknownLabel => write!(f, "label not in category table"),
            Self::ConnectivityTimeout => write!(f, "connectivity timeout"),
        }
    }
}

impl core::error::Error for CycleError {}
