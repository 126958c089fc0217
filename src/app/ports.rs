//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService (domain)
//! ```
//!
//! Driven adapters (IR sensor, carousel, gate, buzzer, camera, HTTP client,
//! storage) implement these traits.  The [`AppService`](super::service::AppService)
//! consumes them via generics, so the domain core never touches hardware
//! directly and the whole sort cycle runs under test with mock adapters.

use crate::config::SystemConfig;

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: the detection loop samples the IR sensor through this.
pub trait SensorPort {
    /// Current, polarity-corrected object presence.
    fn object_present(&mut self) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port: the sort sequence commands the mechanics through this.
///
/// Both operations block until the physical motion is complete — the
/// single-threaded cycle depends on that ordering.
pub trait ActuatorPort {
    /// Rotate the carousel by `delta` bin positions.  Positive = clockwise.
    /// Callers must not invoke this with `delta == 0`.
    fn rotate_steps(&mut self, delta: i16);

    /// Drive the trapdoor servo to its open (`true`) or closed position.
    fn set_gate(&mut self, open: bool);

    /// De-energise everything (stepper released, gate closed, buzzer off).
    fn all_off(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Feedback port (driven adapter: domain → buzzer)
// ───────────────────────────────────────────────────────────────

/// Milestone signals, each rendered as a distinct audible pulse pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackPattern {
    /// Network link (re)established.
    Connected,
    /// Network link could not be re-established in time.
    ConnectFailed,
    /// A detection was accepted; the cycle is starting.
    ObjectDetected,
    /// Physical sorting (rotation + gate) is about to begin.
    SortStarted,
    /// The object has been released into its bin.
    SortComplete,
}

/// The domain emits milestone feedback through this port.  The hardware
/// adapter renders it on the piezo buzzer; mocks just record it.
pub trait FeedbackPort {
    fn play(&mut self, pattern: FeedbackPattern);
}

// ───────────────────────────────────────────────────────────────
// Camera port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Image acquisition failures.  These are local faults — the classifier
/// client maps them to a cycle abort without touching the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureError {
    /// Sensor not initialised or still powering up.
    NotReady,
    /// Frame grab failed or returned an empty buffer.
    FrameFailed,
}

/// One frame per call; the buffer is a complete JPEG.
pub trait CameraPort {
    fn capture_jpeg(&mut self) -> Result<Vec<u8>, CaptureError>;
}

// ───────────────────────────────────────────────────────────────
// HTTP port (driven adapter: domain → network)
// ───────────────────────────────────────────────────────────────

/// Transport-level failures below the HTTP status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportError {
    /// DNS / TCP / TLS establishment failed.
    Connect,
    /// Request body could not be written.
    Write,
    /// Response could not be read.
    Read,
}

/// A decoded HTTP response: status line plus full body.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

/// Single synchronous request/response exchange.  Timeout behaviour is the
/// transport's own; the domain never waits beyond it.
pub trait HttpPort {
    fn post(
        &mut self,
        url: &str,
        content_type: &str,
        body: &[u8],
    ) -> Result<HttpResponse, TransportError>;
}

// ───────────────────────────────────────────────────────────────
// Clock port (monotonic time + blocking delay)
// ───────────────────────────────────────────────────────────────

/// Monotonic time and blocking delays.  Every wait in the firmware
/// (debounce bookkeeping, connectivity polling, settle, dwell) goes through
/// this port so host tests can use a fake clock and never sleep.
pub trait ClockPort {
    /// Milliseconds since boot, monotonic.
    fn now_ms(&self) -> u64;

    /// Block the (single) control thread for `ms` milliseconds.
    fn delay_ms(&self, ms: u32);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go (serial log today,
/// MQTT or a fleet dashboard later).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists system configuration.
///
/// Implementations MUST validate config values before persisting: invalid
/// ranges are rejected with [`ConfigError::ValidationFailed`], not silently
/// clamped, so a bad update can never park the gate servo against its stop
/// or zero out the debounce window.
pub trait ConfigPort {
    /// Load configuration from persistent storage.
    /// Returns [`SystemConfig::default()`] if no stored config exists.
    fn load(&self) -> Result<SystemConfig, ConfigError>;

    /// Validate and persist configuration.
    fn save(&self, config: &SystemConfig) -> Result<(), ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Storage port (driven adapter: domain ↔ NVS / flash)
// ───────────────────────────────────────────────────────────────

/// Persistent key-value storage (WiFi credentials, future crash logs).
/// Keys are namespaced; writes are atomic (guaranteed natively by the
/// ESP-IDF NVS API, trivially by the in-memory simulation).
pub trait StoragePort {
    /// Read a value.  Returns the number of bytes written to `buf`.
    fn read(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError>;

    /// Write a value atomically.
    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError>;

    /// Delete a key.  Returns `Ok(())` even if the key didn't exist.
    fn delete(&mut self, namespace: &str, key: &str) -> Result<(), StorageError>;

    /// Check whether a key exists without reading it.
    fn exists(&self, namespace: &str, key: &str) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ConfigPort`] operations.
#[derive(Debug)]
pub enum ConfigError {
    /// No config found in storage (first boot).
    NotFound,
    /// Stored config failed integrity / deserialization check.
    Corrupted,
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
    /// Underlying storage is full.
    StorageFull,
    /// Generic I/O error from the storage backend.
    IoError,
}

/// Errors from [`StoragePort`] operations.
#[derive(Debug)]
pub enum StorageError {
    /// Requested key does not exist.
    NotFound,
    /// Storage partition is full.
    Full,
    /// Generic I/O error.
    IoError,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "config not found"),
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::StorageFull => write!(f, "storage full"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl core::fmt::Display for StorageError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "key not found"),
            Self::Full => write!(f, "storage full"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl core::error::Error for ConfigError {}
impl core::error::Error for StorageError {}
