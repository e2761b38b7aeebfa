// src/exec/in_flight.rs

//! Per-executor registry of job labels that currently have a live submission.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::debug;

/// Set of in-flight job labels, shared by every clone of an executor.
#[derive(Debug, Default, Clone)]
pub struct InFlight {
    labels: Arc<Mutex<HashSet<String>>>,
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `label` as in flight.
    ///
    /// Returns `None` if it already is. The marker is released when the
    /// returned guard is dropped.
    pub fn claim(&self, label: &str) -> Option<InFlightGuard> {
        if !lock(&self.labels).insert(label.to_string()) {
            return None;
        }

        debug!(job = %label, "in-flight marker claimed");
        Some(InFlightGuard {
            labels: Arc::clone(&self.labels),
            label: label.to_string(),
        })
    }

    pub fn contains(&self, label: &str) -> bool {
        lock(&self.labels).contains(label)
    }

    /// Sorted snapshot of the labels currently in flight.
    pub fn snapshot(&self) -> Vec<String> {
        let mut labels: Vec<String> = lock(&self.labels).iter().cloned().collect();
        labels.sort();
        labels
    }
}

/// Releases its label on drop, including when a submission unwinds.
#[derive(Debug)]
pub struct InFlightGuard {
    labels: Arc<Mutex<HashSet<String>>>,
    label: String,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        lock(&self.labels).remove(&self.label);
        debug!(job = %self.label, "in-flight marker released");
    }
}

fn lock(labels: &Mutex<HashSet<String>>) -> MutexGuard<'_, HashSet<String>> {
    labels.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_claim_is_refused_until_release() {
        let registry = InFlight::new();

        let guard = registry.claim("ConfigureWifi").expect("first claim");
        assert!(registry.claim("ConfigureWifi").is_none());
        assert!(registry.contains("ConfigureWifi"));

        drop(guard);
        assert!(!registry.contains("ConfigureWifi"));
        assert!(registry.claim("ConfigureWifi").is_some());
    }

    #[test]
    fn snapshot_is_sorted() {
        let registry = InFlight::new();
        let _b = registry.claim("storage");
        let _a = registry.claim("network");
        assert_eq!(registry.snapshot(), vec!["network", "storage"]);
    }
}
