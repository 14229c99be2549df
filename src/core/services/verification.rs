// src/core/services/verification.rs
use std::sync::Arc;
use tracing::debug;

use crate::{
    core::identity::{
        biometric::BiometricEncoder,
        similarity::template_similarity,
        types::{BiometricSubmission, MatchResult, StoredTemplate, Template, TemplateKind},
    },
    utils::config::MatchingConfig,
};

/// One-to-one biometric verification against stored templates.
pub struct VerificationService {
    encoder: Arc<BiometricEncoder>,
    biometric_threshold: f64,
    fingerprint_confidence: f64,
}

/// A submission encoded once so it can be compared against many templates.
enum Probe {
    Fingerprint(Template),
    Facial(Option<Template>),
}

impl VerificationService {
    pub fn new(encoder: Arc<BiometricEncoder>, matching: &MatchingConfig) -> Self {
        Self {
            encoder,
            biometric_threshold: matching.biometric_threshold(),
            fingerprint_confidence: matching.fingerprint_confidence,
        }
    }

    pub fn verify(&self, submission: &BiometricSubmission, stored: &StoredTemplate) -> MatchResult {
        let probe = self.probe(submission);
        self.compare(&probe, stored)
    }

    /// Best-of-N over a subject's templates. The highest confidence wins and
    /// ties keep the first template encountered.
    pub fn verify_best(
        &self,
        submission: &BiometricSubmission,
        stored: &[StoredTemplate],
    ) -> MatchResult {
        let probe = self.probe(submission);

        let mut best = MatchResult::NO_MATCH;
        for template in stored {
            let result = self.compare(&probe, template);
            if result.confidence > best.confidence {
                best = result;
            }
        }

        debug!(
            templates = stored.len(),
            matched = best.matched,
            confidence = best.confidence,
            "Verification completed"
        );
        best
    }

    fn probe(&self, submission: &BiometricSubmission) -> Probe {
        match submission {
            BiometricSubmission::Fingerprint { payload } => {
                Probe::Fingerprint(self.encoder.encode_fingerprint(payload))
            }
            BiometricSubmission::Facial { photo } => Probe::Facial(self.encoder.encode_facial(photo)),
        }
    }

    fn compare(&self, probe: &Probe, stored: &StoredTemplate) -> MatchResult {
        match (probe, stored.kind) {
            (Probe::Fingerprint(submitted), TemplateKind::Fingerprint) => {
                if stored.template.as_ref() == Some(submitted) {
                    MatchResult {
                        matched: true,
                        confidence: self.fingerprint_confidence,
                    }
                } else {
                    MatchResult::NO_MATCH
                }
            }
            (Probe::Facial(Some(submitted)), TemplateKind::Facial) => {
                let similarity = template_similarity(Some(submitted), stored.template.as_ref());
                MatchResult {
                    matched: similarity > self.biometric_threshold,
                    confidence: similarity,
                }
            }
            _ => MatchResult::NO_MATCH,
        }
    }
}
