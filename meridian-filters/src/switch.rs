//! Administrative kill switch for the traffic gate.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared flag that, while enabled, lets every call bypass the traffic gate.
///
/// Clones observe the same flag, so operational tooling holds one clone and the gates
/// of every consumer hold the others.
#[derive(Debug, Clone, Default)]
pub struct ForceCloseSwitch {
    enabled: Arc<AtomicBool>,
}

impl ForceCloseSwitch {
    /// A switch in the off position.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether the gate is currently bypassed.
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    /// Flip the switch.
    pub fn set(&self, enabled: bool) {
        let previous = self.enabled.swap(enabled, Ordering::AcqRel);
        if previous != enabled {
            tracing::warn!(enabled, "traffic gate force-close switch changed");
        }
    }

    /// Bypass the gate.
    pub fn enable(&self) {
        self.set(true);
    }

    /// Enforce the gate again.
    pub fn disable(&self) {
        self.set(false);
    }
}
