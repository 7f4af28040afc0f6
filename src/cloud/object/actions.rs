//! Custom actions for the CloudObject actor.

#[derive(Debug, Clone)]
pub enum CloudObjectAction {
    /// Sets the status code a service answers health probes with.
    SetHealthResponse(u16),
    /// Probes a service's health path.
    Probe,
}

/// Both actions report the status the service now answers with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloudObjectActionResult {
    HealthResponse(u16),
}
