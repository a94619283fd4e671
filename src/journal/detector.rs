use super::unit::Unit;
use crate::executor::{CommandExecutor, HostBridge, HostCommand};
use std::sync::Arc;
use tracing::{debug, info};

/// Checks whether any of the control units is running on the host.
pub struct ServiceDetector {
    executor: Arc<dyn CommandExecutor>,
    bridge: HostBridge,
    systemctl: String,
    units: Vec<Unit>,
}

impl ServiceDetector {
    pub fn new(
        executor: Arc<dyn CommandExecutor>,
        bridge: HostBridge,
        systemctl: impl Into<String>,
        units: Vec<Unit>,
    ) -> Self {
        Self {
            executor,
            bridge,
            systemctl: systemctl.into(),
            units,
        }
    }

    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    fn status_command(&self, unit: &Unit) -> HostCommand {
        self.bridge
            .command(&self.systemctl, ["status", unit.as_str()])
    }

    /// Checks units in priority order and stops at the first active one.
    /// A status check that cannot run counts as inactive.
    pub async fn detect(&self) -> bool {
        for unit in &self.units {
            let command = self.status_command(unit);
            match self.executor.status(&command).await {
                Ok(0) => {
                    info!(unit = %unit, "Detected active control unit");
                    return true;
                }
                Ok(code) => debug!(unit = %unit, code, "Unit not active"),
                Err(e) => debug!(unit = %unit, error = %e, "Status check failed, treating unit as inactive"),
            }
        }

        info!(checked = self.units.len(), "No active control unit detected");
        false
    }
}
