// src/core/fraud/types.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::{core::identity::types::SubjectId, utils::config::RiskLevelThresholds};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GhostReason {
    NoAttendanceRecords,
    NoRecentAttendance { threshold_days: i64 },
}

impl fmt::Display for GhostReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GhostReason::NoAttendanceRecords => write!(f, "No attendance records"),
            GhostReason::NoRecentAttendance { threshold_days } => {
                write!(f, "No attendance in {} days", threshold_days)
            }
        }
    }
}

/// An active subject with no, or only stale, attendance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GhostWorker {
    pub subject_id: SubjectId,
    pub name: String,
    pub reason: GhostReason,
    pub days_since_registration: Option<i64>,
    pub last_attendance: Option<DateTime<Utc>>,
    pub days_since_attendance: Option<i64>,
}

/// Two consecutive claims by one subject closer together than the window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuspiciousClaimPair {
    pub subject_id: SubjectId,
    pub claims: [Uuid; 2],
    pub time_difference_hours: f64,
    pub reason: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    WeekendCheckin,
    UnusualHour,
    LowConfidence,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnusualPattern {
    pub kind: PatternKind,
    pub attendance_id: Uuid,
    pub subject_id: SubjectId,
    pub check_in_time: DateTime<Utc>,
    pub reason: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub fn from_score(score: u32, thresholds: &RiskLevelThresholds) -> Self {
        if score >= thresholds.critical {
            RiskLevel::Critical
        } else if score >= thresholds.high {
            RiskLevel::High
        } else if score >= thresholds.medium {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub subject_id: SubjectId,
    /// Additive score clamped to 100.
    pub risk_score: u32,
    pub risk_level: RiskLevel,
    pub risk_factors: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub active_subjects: usize,
    pub total_attendance: usize,
    pub pending_duplicates: usize,
    pub total_claims: usize,
    pub ghost_worker_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FraudReport {
    pub generated_at: DateTime<Utc>,
    pub summary: DashboardStats,
    pub ghost_workers: Vec<GhostWorker>,
    pub suspicious_claims: Vec<SuspiciousClaimPair>,
    pub unusual_patterns: Vec<UnusualPattern>,
    pub assessments: Vec<RiskAssessment>,
}
