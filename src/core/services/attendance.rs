// src/core/services/attendance.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use super::verification::VerificationService;
use crate::core::identity::types::{
    AttendanceRecord, BiometricSubmission, StoredTemplate, SubjectId, VerificationMethod,
};

const DEFAULT_LOCATION: &str = "Main Office";
const DEFAULT_DEVICE: &str = "WEB-APP";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckInRequest {
    pub subject_id: SubjectId,
    #[serde(default)]
    pub biometric: Option<BiometricSubmission>,
    #[serde(default)]
    pub verification_method: Option<VerificationMethod>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub device_id: Option<String>,
}

/// Records attendance, scoring the check-in with the verifier's confidence.
pub struct AttendanceService {
    verifier: Arc<VerificationService>,
}

impl AttendanceService {
    pub fn new(verifier: Arc<VerificationService>) -> Self {
        Self { verifier }
    }

    /// A check-in without biometric data is recorded at full confidence. An
    /// unspecified method is taken from the submitted biometric.
    /// A failed verification is still recorded; its low confidence is what
    /// the unusual-pattern detector later picks up.
    pub fn check_in(
        &self,
        request: &CheckInRequest,
        templates: &[StoredTemplate],
        now: DateTime<Utc>,
    ) -> AttendanceRecord {
        let confidence = match &request.biometric {
            Some(submission) => {
                let result = self.verifier.verify_best(submission, templates);
                if !result.matched {
                    warn!(
                        subject_id = %request.subject_id,
                        confidence = result.confidence,
                        "Check-in biometric did not match"
                    );
                }
                result.confidence
            }
            None => 100.0,
        };

        let record = AttendanceRecord {
            id: Uuid::new_v4(),
            subject_id: request.subject_id,
            check_in_time: now,
            verification_method: request
                .verification_method
                .or_else(|| request.biometric.as_ref().map(BiometricSubmission::method))
                .unwrap_or_default(),
            confidence_score: Some(confidence),
            location: request
                .location
                .clone()
                .unwrap_or_else(|| DEFAULT_LOCATION.to_string()),
            device_id: request
                .device_id
                .clone()
                .unwrap_or_else(|| DEFAULT_DEVICE.to_string()),
        };

        info!(
            subject_id = %record.subject_id,
            confidence,
            "Attendance recorded"
        );
        record
    }
}
