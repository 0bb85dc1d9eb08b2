//! Dual-cadence backend health monitoring.
//!
//! Two independently-lived probes: the system backend (always on, fast
//! cadence) and the external intelligence endpoint (coarser cadence — the
//! endpoint is slower to probe and changes less often — and only active
//! when the configured provider is local). Whenever the settings snapshot
//! changes, both loops are torn down and restarted bound to the new values
//! so no probe ever closes over stale configuration.

use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

use super::{PollingLoop, Update};
use crate::client::ApiClient;
use crate::data::Settings;

/// Observed state of a monitored endpoint. Overwritten on every poll tick,
/// never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthSignal {
    /// No observation yet.
    Unknown,
    Up,
    /// Unreachable, timed out, or answered with an error status — the
    /// distinction is not surfaced.
    Down,
}

/// Intelligence endpoint state. Distinct from [`HealthSignal`] because an
/// inactive probe (cloud provider, or no base URL) is neither up nor down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntelligenceSignal {
    /// Probe not running for the current configuration.
    NotApplicable,
    Up,
    Down,
}

/// Probe cadences for the two endpoints.
#[derive(Debug, Clone, Copy)]
pub struct ProbePeriods {
    pub system: Duration,
    pub intelligence: Duration,
}

impl Default for ProbePeriods {
    fn default() -> Self {
        Self {
            system: Duration::from_secs(10),
            intelligence: Duration::from_secs(60),
        }
    }
}

/// Owns the two health polling loops and reconciles them against the
/// current settings snapshot.
#[derive(Debug)]
pub struct HealthMonitor {
    client: ApiClient,
    periods: ProbePeriods,
    tx: UnboundedSender<Update>,
    system: Option<PollingLoop>,
    intelligence: Option<PollingLoop>,
}

impl HealthMonitor {
    /// Create a monitor with no loops running. Call
    /// [`Self::reconcile`] to start probing.
    pub fn new(client: ApiClient, periods: ProbePeriods, tx: UnboundedSender<Update>) -> Self {
        Self {
            client,
            periods,
            tx,
            system: None,
            intelligence: None,
        }
    }

    /// Diff desired against actual polling state for the given settings
    /// snapshot and restart accordingly.
    ///
    /// Both loops are always torn down first: a restart bound to the fresh
    /// snapshot is the only way to guarantee no probe runs with stale
    /// configuration. `None` settings (initial load failed) still starts
    /// the system probe; the intelligence probe needs configuration to
    /// exist.
    pub fn reconcile(&mut self, settings: Option<&Settings>) {
        self.stop();

        let client = self.client.clone();
        let tx = self.tx.clone();
        self.system = Some(PollingLoop::spawn(self.periods.system, move || {
            let client = client.clone();
            let tx = tx.clone();
            async move {
                let update = match client.system_health().await {
                    Ok(payload) => Update::SystemHealth {
                        signal: HealthSignal::Up,
                        service: payload.service_id.or(payload.service),
                    },
                    Err(err) => {
                        debug!(%err, "system health probe failed");
                        Update::SystemHealth {
                            signal: HealthSignal::Down,
                            service: None,
                        }
                    }
                };
                let _ = tx.send(update);
            }
        }));

        let probe_base = settings.and_then(Settings::intelligence_probe_base);
        match probe_base {
            Some(base) => {
                let client = self.client.clone();
                let tx = self.tx.clone();
                self.intelligence =
                    Some(PollingLoop::spawn(self.periods.intelligence, move || {
                        let client = client.clone();
                        let tx = tx.clone();
                        let base = base.clone();
                        async move {
                            let signal = match client.intelligence_health(&base).await {
                                Ok(()) => IntelligenceSignal::Up,
                                Err(err) => {
                                    debug!(%err, "intelligence probe failed");
                                    IntelligenceSignal::Down
                                }
                            };
                            let _ = tx.send(Update::Intelligence(signal));
                        }
                    }));
            }
            None => {
                // Probe disabled for this configuration; show neutral
                // state rather than down.
                let _ = self
                    .tx
                    .send(Update::Intelligence(IntelligenceSignal::NotApplicable));
            }
        }
    }

    /// True while the intelligence loop is running.
    pub fn intelligence_active(&self) -> bool {
        self.intelligence.is_some()
    }

    /// Tear down both loops. Idempotent; no network activity follows.
    pub fn stop(&mut self) {
        if let Some(polling) = self.system.take() {
            polling.stop();
        }
        if let Some(polling) = self.intelligence.take() {
            polling.stop();
        }
    }
}

impl Drop for HealthMonitor {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tokio::sync::mpsc;

    fn local_settings(base_url: &str) -> Settings {
        let mut map = HashMap::new();
        map.insert("llm_provider".to_string(), "local".to_string());
        map.insert("llm_base_url".to_string(), base_url.to_string());
        Settings(map)
    }

    fn cloud_settings() -> Settings {
        let mut map = HashMap::new();
        map.insert("llm_provider".to_string(), "openai".to_string());
        Settings(map)
    }

    fn monitor(tx: mpsc::UnboundedSender<Update>) -> HealthMonitor {
        HealthMonitor::new(
            ApiClient::new("http://localhost:8000/api"),
            ProbePeriods::default(),
            tx,
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_local_provider_activates_intelligence_probe() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut health = monitor(tx);
        health.reconcile(Some(&local_settings("http://host:8080/v1")));
        assert!(health.intelligence_active());
        health.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn test_provider_switch_deactivates_intelligence_probe() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut health = monitor(tx);

        health.reconcile(Some(&local_settings("http://host:8080/v1")));
        assert!(health.intelligence_active());

        // Config change local -> openai tears the intelligence loop down
        // and reports the neutral state.
        health.reconcile(Some(&cloud_settings()));
        assert!(!health.intelligence_active());

        let mut saw_not_applicable = false;
        while let Ok(update) = rx.try_recv() {
            if matches!(update, Update::Intelligence(IntelligenceSignal::NotApplicable)) {
                saw_not_applicable = true;
            }
        }
        assert!(saw_not_applicable);
        health.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_settings_runs_system_probe_only() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut health = monitor(tx);
        health.reconcile(None);
        assert!(health.system.is_some());
        assert!(!health.intelligence_active());
        health.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_base_url_keeps_probe_inactive() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut health = monitor(tx);
        health.reconcile(Some(&local_settings("")));
        assert!(!health.intelligence_active());
        health.stop();
    }
}
