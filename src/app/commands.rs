//! Commands accepted by the application service.

use crate::config::SystemConfig;

/// Imperative requests handled by [`AppService::handle_command`]
/// (manual triggers from a serial console today, a control channel later).
///
/// [`AppService::handle_command`]: super::service::AppService::handle_command
#[derive(Debug, Clone, PartialEq)]
pub enum AppCommand {
    /// Run one sort cycle as if the sensor had fired.  Ignored unless the
    /// machine is Idle — a cycle already in flight is never preempted.
    TriggerSort,
    /// Replace the running configuration.  Marked dirty and persisted by the
    /// debounced auto-save, not written to flash immediately.
    UpdateConfig(SystemConfig),
    /// Flush a dirty configuration to flash on the next service tick.
    SaveConfig,
}
