// src/utils/metrics.rs
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

pub struct Metrics {
    start_time: Instant,
    templates_encoded: AtomicU64,
    templates_absent: AtomicU64,
    verifications: AtomicU64,
    verification_matches: AtomicU64,
    duplicate_scans: AtomicU64,
    duplicates_flagged: AtomicU64,
    fraud_reports: AtomicU64,
    processing_time: AtomicU64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub uptime_secs: u64,
    pub templates_encoded: u64,
    pub templates_absent: u64,
    pub verifications: u64,
    pub verification_matches: u64,
    pub duplicate_scans: u64,
    pub duplicates_flagged: u64,
    pub fraud_reports: u64,
    pub processing_time_us: u64,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            templates_encoded: AtomicU64::new(0),
            templates_absent: AtomicU64::new(0),
            verifications: AtomicU64::new(0),
            verification_matches: AtomicU64::new(0),
            duplicate_scans: AtomicU64::new(0),
            duplicates_flagged: AtomicU64::new(0),
            fraud_reports: AtomicU64::new(0),
            processing_time: AtomicU64::new(0),
        }
    }

    pub fn record_encoding(&self, produced: bool) {
        if produced {
            self.templates_encoded.fetch_add(1, Ordering::Relaxed);
        } else {
            self.templates_absent.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_verification(&self, duration: Duration, matched: bool) {
        self.verifications.fetch_add(1, Ordering::Relaxed);
        self.processing_time
            .fetch_add(duration.as_micros() as u64, Ordering::Relaxed);
        if matched {
            self.verification_matches.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_duplicate_scan(&self, duration: Duration, flagged: usize) {
        self.duplicate_scans.fetch_add(1, Ordering::Relaxed);
        self.duplicates_flagged
            .fetch_add(flagged as u64, Ordering::Relaxed);
        self.processing_time
            .fetch_add(duration.as_micros() as u64, Ordering::Relaxed);
    }

    pub fn record_report(&self, duration: Duration) {
        self.fraud_reports.fetch_add(1, Ordering::Relaxed);
        self.processing_time
            .fetch_add(duration.as_micros() as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            uptime_secs: self.start_time.elapsed().as_secs(),
            templates_encoded: self.templates_encoded.load(Ordering::Relaxed),
            templates_absent: self.templates_absent.load(Ordering::Relaxed),
            verifications: self.verifications.load(Ordering::Relaxed),
            verification_matches: self.verification_matches.load(Ordering::Relaxed),
            duplicate_scans: self.duplicate_scans.load(Ordering::Relaxed),
            duplicates_flagged: self.duplicates_flagged.load(Ordering::Relaxed),
            fraud_reports: self.fraud_reports.load(Ordering::Relaxed),
            processing_time_us: self.processing_time.load(Ordering::Relaxed),
        }
    }

    pub fn log_summary(&self) {
        let snapshot = self.snapshot();
        tracing::info!(
            uptime_secs = snapshot.uptime_secs,
            templates_encoded = snapshot.templates_encoded,
            templates_absent = snapshot.templates_absent,
            verifications = snapshot.verifications,
            verification_matches = snapshot.verification_matches,
            duplicate_scans = snapshot.duplicate_scans,
            duplicates_flagged = snapshot.duplicates_flagged,
            fraud_reports = snapshot.fraud_reports,
            "Engine metrics"
        );
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
