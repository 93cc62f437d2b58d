// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Restart escalation for repeated critical resource errors.
//!
//! A single out-of-memory rejection is ordinary; several within a few
//! minutes usually mean the host is wedged and a restart is the quickest
//! way out. [`EscalationMonitor`] counts critical `system-resource` errors
//! in a rolling window and flips [`should_suggest_restart`] once the
//! threshold is reached.
//!
//! [`should_suggest_restart`]: EscalationMonitor::should_suggest_restart

use crate::DomainError;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Rolling-window counter of critical resource errors.
#[derive(Debug)]
pub struct EscalationMonitor {
    window: Duration,
    threshold: usize,
    events: Mutex<VecDeque<Instant>>,
}

impl Default for EscalationMonitor {
    /// Three critical errors within five minutes.
    fn default() -> Self {
        Self::new(3, Duration::from_secs(300))
    }
}

impl EscalationMonitor {
    pub fn new(threshold: usize, window: Duration) -> Self {
        Self {
            window,
            threshold: threshold.max(1),
            events: Mutex::new(VecDeque::new()),
        }
    }

    /// Records `error` if it is a critical `system-resource` error.
    /// Returns `true` when the error was counted.
    pub fn record(&self, error: &DomainError) -> bool {
        self.record_at(error, Instant::now())
    }

    pub(crate) fn record_at(&self, error: &DomainError, now: Instant) -> bool {
        if !error.is_critical_resource() {
            return false;
        }
        let Ok(mut events) = self.events.lock() else {
            return false;
        };
        events.push_back(now);
        prune(&mut events, now, self.window);
        if events.len() >= self.threshold {
            tracing::warn!(
                count = events.len(),
                window_secs = self.window.as_secs(),
                "repeated critical resource errors, suggesting restart"
            );
        }
        true
    }

    /// Whether enough recent critical errors occurred to suggest a restart.
    pub fn should_suggest_restart(&self) -> bool {
        self.should_suggest_restart_at(Instant::now())
    }

    pub(crate) fn should_suggest_restart_at(&self, now: Instant) -> bool {
        self.events
            .lock()
            .map(|mut events| {
                prune(&mut events, now, self.window);
                events.len() >= self.threshold
            })
            .unwrap_or(false)
    }

    /// Forgets all recorded errors (e.g. after the user restarted).
    pub fn reset(&self) {
        if let Ok(mut events) = self.events.lock() {
            events.clear();
        }
    }
}

fn prune(events: &mut VecDeque<Instant>, now: Instant, window: Duration) {
    while let Some(&oldest) = events.front() {
        if now.saturating_duration_since(oldest) > window {
            events.pop_front();
        } else {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ErrorFactory, ResourceKind};

    fn oom() -> DomainError {
        ErrorFactory::from_resource_violation(ResourceKind::Memory, 2 << 30, 1 << 30)
    }

    #[test]
    fn test_threshold_reached() {
        let monitor = EscalationMonitor::default();
        let t0 = Instant::now();
        assert!(monitor.record_at(&oom(), t0));
        assert!(monitor.record_at(&oom(), t0 + Duration::from_secs(10)));
        assert!(!monitor.should_suggest_restart_at(t0 + Duration::from_secs(20)));
        monitor.record_at(&oom(), t0 + Duration::from_secs(30));
        assert!(monitor.should_suggest_restart_at(t0 + Duration::from_secs(40)));
    }

    #[test]
    fn test_window_expires() {
        let monitor = EscalationMonitor::new(2, Duration::from_secs(60));
        let t0 = Instant::now();
        monitor.record_at(&oom(), t0);
        monitor.record_at(&oom(), t0 + Duration::from_secs(61));
        assert!(!monitor.should_suggest_restart_at(t0 + Duration::from_secs(62)));
    }

    #[test]
    fn test_ignores_other_errors() {
        let monitor = EscalationMonitor::new(1, Duration::from_secs(60));
        let thermal = ErrorFactory::from_resource_violation(ResourceKind::Thermal, 2, 3);
        let crash = ErrorFactory::from_process_failure(Some(1), "");
        assert!(!monitor.record(&thermal));
        assert!(!monitor.record(&crash));
        assert!(!monitor.should_suggest_restart());
    }

    #[test]
    fn test_reset() {
        let monitor = EscalationMonitor::new(1, Duration::from_secs(60));
        monitor.record(&oom());
        assert!(monitor.should_suggest_restart());
        monitor.reset();
        assert!(!monitor.should_suggest_restart());
    }
}
