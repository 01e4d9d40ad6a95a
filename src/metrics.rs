use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Request counters for monitoring
#[derive(Clone)]
pub struct Metrics {
    pub links_listed: Arc<AtomicU64>,
    pub link_lookups: Arc<AtomicU64>,
    pub sets_listed: Arc<AtomicU64>,
    pub set_lookups: Arc<AtomicU64>,
    pub qr_generated: Arc<AtomicU64>,
    pub qr_cache_hits: Arc<AtomicU64>,
    pub not_found: Arc<AtomicU64>,
    pub start_time: Instant,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            links_listed: Arc::new(AtomicU64::new(0)),
            link_lookups: Arc::new(AtomicU64::new(0)),
            sets_listed: Arc::new(AtomicU64::new(0)),
            set_lookups: Arc::new(AtomicU64::new(0)),
            qr_generated: Arc::new(AtomicU64::new(0)),
            qr_cache_hits: Arc::new(AtomicU64::new(0)),
            not_found: Arc::new(AtomicU64::new(0)),
            start_time: Instant::now(),
        }
    }

    pub fn inc_links_listed(&self) {
        self.links_listed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_link_lookups(&self) {
        self.link_lookups.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_sets_listed(&self) {
        self.sets_listed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_set_lookups(&self) {
        self.set_lookups.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_qr_generated(&self) {
        self.qr_generated.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_qr_cache_hits(&self) {
        self.qr_cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_not_found(&self) {
        self.not_found.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            links_listed: self.links_listed.load(Ordering::Relaxed),
            link_lookups: self.link_lookups.load(Ordering::Relaxed),
            sets_listed: self.sets_listed.load(Ordering::Relaxed),
            set_lookups: self.set_lookups.load(Ordering::Relaxed),
            qr_generated: self.qr_generated.load(Ordering::Relaxed),
            qr_cache_hits: self.qr_cache_hits.load(Ordering::Relaxed),
            not_found: self.not_found.load(Ordering::Relaxed),
            uptime_seconds: self.start_time.elapsed().as_secs(),
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize)]
pub struct MetricsSnapshot {
    pub links_listed: u64,
    pub link_lookups: u64,
    pub sets_listed: u64,
    pub set_lookups: u64,
    pub qr_generated: u64,
    pub qr_cache_hits: u64,
    pub not_found: u64,
    pub uptime_seconds: u64,
}
