//! Admission control.
//!
//! A fixed ceiling on concurrently judged submissions. Slots are RAII: the
//! reserve is a CAS loop that never lets the counter pass the ceiling, and
//! the release runs on drop so every exit path (verdict, error, panic)
//! gives the slot back.

use crate::observability::MetricsRegistry;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

pub struct AdmissionController {
    in_flight: AtomicU64,
    max_requests: u64,
    metrics: Arc<MetricsRegistry>,
}

impl AdmissionController {
    pub fn new(max_requests: u64, metrics: Arc<MetricsRegistry>) -> Self {
        Self {
            in_flight: AtomicU64::new(0),
            max_requests,
            metrics,
        }
    }

    /// Reserve a slot, or refuse at the ceiling (counting the rejection).
    pub fn try_acquire(&self) -> Option<AdmissionSlot<'_>> {
        let mut current = self.in_flight.load(Ordering::Relaxed);
        loop {
            if current >= self.max_requests {
                self.metrics.throttling_total.inc();
                return None;
            }
            match self.in_flight.compare_exchange(
                current,
                current + 1,
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => {
                    self.metrics.executions.inc();
                    return Some(AdmissionSlot { controller: self });
                }
                Err(observed) => current = observed,
            }
        }
    }

    pub fn in_flight(&self) -> u64 {
        self.in_flight.load(Ordering::Acquire)
    }

    pub fn max_requests(&self) -> u64 {
        self.max_requests
    }

    fn release(&self) {
        self.in_flight.fetch_sub(1, Ordering::AcqRel);
        self.metrics.executions.dec();
    }
}

/// A held admission slot; dropping it releases the slot.
pub struct AdmissionSlot<'a> {
    controller: &'a AdmissionController,
}

impl Drop for AdmissionSlot<'_> {
    fn drop(&mut self) {
        self.controller.release();
    }
}
