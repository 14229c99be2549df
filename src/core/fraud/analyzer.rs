// src/core/fraud/analyzer.rs
use chrono::{DateTime, Datelike, Duration, Timelike, Utc, Weekday};
use rayon::prelude::*;
use std::collections::BTreeMap;
use tracing::{debug, info};

use super::types::{
    DashboardStats, FraudReport, GhostReason, GhostWorker, PatternKind, RiskAssessment, RiskLevel,
    SuspiciousClaimPair, UnusualPattern,
};
use crate::{
    core::identity::types::{AttendanceRecord, BenefitClaim, DuplicateAlert, Subject, SubjectId},
    utils::config::FraudConfig,
};

/// Behavioural fraud detectors and additive risk fusion over loaded history.
#[derive(Debug, Clone)]
pub struct FraudAnalyzer {
    config: FraudConfig,
}

impl FraudAnalyzer {
    pub fn new(config: FraudConfig) -> Self {
        Self { config }
    }

    /// Flags active subjects registered before `now - days_threshold` that
    /// have never attended, or whose latest attendance predates that cutoff.
    pub fn detect_ghost_workers(
        &self,
        subjects: &[Subject],
        attendance: &[AttendanceRecord],
        days_threshold: i64,
        now: DateTime<Utc>,
    ) -> Vec<GhostWorker> {
        // A cutoff before the representable range excludes every subject.
        let Some(cutoff) = Duration::try_days(days_threshold)
            .and_then(|window| now.checked_sub_signed(window))
        else {
            return Vec::new();
        };

        let mut last_seen: BTreeMap<SubjectId, DateTime<Utc>> = BTreeMap::new();
        for record in attendance {
            last_seen
                .entry(record.subject_id)
                .and_modify(|latest| {
                    if record.check_in_time > *latest {
                        *latest = record.check_in_time;
                    }
                })
                .or_insert(record.check_in_time);
        }

        subjects
            .iter()
            .filter(|subject| subject.is_active() && subject.registered_at < cutoff)
            .filter_map(|subject| match last_seen.get(&subject.id) {
                None => Some(GhostWorker {
                    subject_id: subject.id,
                    name: subject.name.clone(),
                    reason: GhostReason::NoAttendanceRecords,
                    days_since_registration: Some((now - subject.registered_at).num_days()),
                    last_attendance: None,
                    days_since_attendance: None,
                }),
                Some(&latest) if latest < cutoff => Some(GhostWorker {
                    subject_id: subject.id,
                    name: subject.name.clone(),
                    reason: GhostReason::NoRecentAttendance {
                        threshold_days: days_threshold,
                    },
                    days_since_registration: None,
                    last_attendance: Some(latest),
                    days_since_attendance: Some((now - latest).num_days()),
                }),
                Some(_) => None,
            })
            .collect()
    }

    /// Flags every adjacent pair of a subject's claims, ordered by date, that
    /// lie closer than `window_hours`. Chains are reported pair by pair.
    pub fn detect_duplicate_claims(
        &self,
        claims: &[BenefitClaim],
        window_hours: f64,
    ) -> Vec<SuspiciousClaimPair> {
        let mut by_subject: BTreeMap<SubjectId, Vec<&BenefitClaim>> = BTreeMap::new();
        for claim in claims {
            by_subject.entry(claim.subject_id).or_default().push(claim);
        }

        let mut suspicious = Vec::new();
        for (subject_id, mut claims) in by_subject {
            claims.sort_by_key(|claim| claim.claim_date);

            for pair in claims.windows(2) {
                let hours = (pair[1].claim_date - pair[0].claim_date).num_milliseconds() as f64
                    / 3_600_000.0;
                if hours < window_hours {
                    suspicious.push(SuspiciousClaimPair {
                        subject_id,
                        claims: [pair[0].id, pair[1].id],
                        time_difference_hours: hours,
                        reason: format!("Multiple claims within {} hours", window_hours),
                    });
                }
            }
        }

        suspicious
    }

    /// Weekend check-ins, check-ins before the early hour and low-confidence
    /// verifications. One record can trip several rules.
    pub fn detect_unusual_patterns(&self, attendance: &[AttendanceRecord]) -> Vec<UnusualPattern> {
        let mut patterns = Vec::new();

        for record in attendance {
            let check_in = record.check_in_time;
            let mut flag = |kind: PatternKind, reason: String| {
                patterns.push(UnusualPattern {
                    kind,
                    attendance_id: record.id,
                    subject_id: record.subject_id,
                    check_in_time: check_in,
                    reason,
                });
            };

            if matches!(check_in.weekday(), Weekday::Sat | Weekday::Sun) {
                flag(PatternKind::WeekendCheckin, "Check-in on weekend".to_string());
            }

            if check_in.hour() < self.config.early_hour {
                flag(
                    PatternKind::UnusualHour,
                    format!("Check-in at unusual hour: {}:00", check_in.hour()),
                );
            }

            if let Some(confidence) = record.confidence_score {
                if confidence < self.config.low_confidence {
                    flag(
                        PatternKind::LowConfidence,
                        format!("Low verification confidence: {}%", confidence),
                    );
                }
            }
        }

        patterns
    }

    /// Flat additive risk for one subject. Each signal contributes its weight
    /// once, regardless of how many records trigger it.
    pub fn assess_risk(
        &self,
        subject: &Subject,
        attendance: &[AttendanceRecord],
        claims: &[BenefitClaim],
        alerts: &[DuplicateAlert],
        now: DateTime<Utc>,
    ) -> RiskAssessment {
        let weights = &self.config.weights;
        let mut score: u32 = 0;
        let mut factors = Vec::new();

        let pending = alerts
            .iter()
            .filter(|alert| alert.involves(subject.id) && alert.is_pending())
            .count();
        if pending > 0 {
            score = score.saturating_add(weights.pending_duplicate);
            factors.push(format!("{} pending duplicate alerts", pending));
        }

        let attended = attendance.iter().any(|record| record.subject_id == subject.id);
        if !attended && subject.is_active() {
            let days_since_registration = (now - subject.registered_at).num_days();
            if days_since_registration > self.config.grace_days {
                score = score.saturating_add(weights.no_attendance);
                factors.push(format!("No attendance in {} days", days_since_registration));
            }
        }

        let subject_claims: Vec<&BenefitClaim> = claims
            .iter()
            .filter(|claim| claim.subject_id == subject.id)
            .collect();
        let unverified = subject_claims
            .iter()
            .filter(|claim| !claim.verified_by_biometric)
            .count();
        if unverified > 0 {
            score = score.saturating_add(weights.unverified_claims);
            factors.push(format!("{} unverified benefit claims", unverified));
        }

        if subject_claims.len() > self.config.max_claims {
            score = score.saturating_add(weights.excess_claims);
            factors.push(format!(
                "High number of benefit claims ({})",
                subject_claims.len()
            ));
        }

        let risk_level = RiskLevel::from_score(score, &self.config.levels);
        debug!(subject_id = %subject.id, score, ?risk_level, "Risk assessed");

        RiskAssessment {
            subject_id: subject.id,
            risk_score: score.min(100),
            risk_level,
            risk_factors: factors,
        }
    }

    pub fn summarize(
        &self,
        subjects: &[Subject],
        attendance: &[AttendanceRecord],
        claims: &[BenefitClaim],
        alerts: &[DuplicateAlert],
        now: DateTime<Utc>,
    ) -> DashboardStats {
        DashboardStats {
            active_subjects: subjects.iter().filter(|s| s.is_active()).count(),
            total_attendance: attendance.len(),
            pending_duplicates: alerts.iter().filter(|a| a.is_pending()).count(),
            total_claims: claims.len(),
            ghost_worker_count: self
                .detect_ghost_workers(subjects, attendance, self.config.ghost_days, now)
                .len(),
        }
    }

    /// Runs every detector with the configured parameters and assesses each
    /// subject, highest risk first.
    pub fn report(
        &self,
        subjects: &[Subject],
        attendance: &[AttendanceRecord],
        claims: &[BenefitClaim],
        alerts: &[DuplicateAlert],
        now: DateTime<Utc>,
    ) -> FraudReport {
        let ghost_workers =
            self.detect_ghost_workers(subjects, attendance, self.config.ghost_days, now);
        let suspicious_claims = self.detect_duplicate_claims(claims, self.config.claim_window_hours);
        let unusual_patterns = self.detect_unusual_patterns(attendance);

        let mut assessments: Vec<RiskAssessment> = subjects
            .par_iter()
            .map(|subject| self.assess_risk(subject, attendance, claims, alerts, now))
            .collect();
        assessments.sort_by(|a, b| b.risk_score.cmp(&a.risk_score));

        let summary = DashboardStats {
            active_subjects: subjects.iter().filter(|s| s.is_active()).count(),
            total_attendance: attendance.len(),
            pending_duplicates: alerts.iter().filter(|a| a.is_pending()).count(),
            total_claims: claims.len(),
            ghost_worker_count: ghost_workers.len(),
        };

        info!(
            subjects = subjects.len(),
            ghost_workers = ghost_workers.len(),
            suspicious_claims = suspicious_claims.len(),
            unusual_patterns = unusual_patterns.len(),
            "Fraud report generated"
        );

        FraudReport {
            generated_at: now,
            summary,
            ghost_workers,
            suspicious_claims,
            unusual_patterns,
            assessments,
        }
    }
}

impl Default for FraudAnalyzer {
    fn default() -> Self {
        Self::new(FraudConfig::default())
    }
}
