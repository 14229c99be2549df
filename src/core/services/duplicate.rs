// src/core/services/duplicate.rs
use chrono::{DateTime, Utc};
use rayon::prelude::*;
use tracing::debug;

use crate::{
    core::identity::{
        similarity::{name_similarity, template_similarity},
        types::{CandidateRecord, DuplicateAlert, DuplicateCandidate, ExistingRecord, MatchFactor},
    },
    utils::config::MatchingConfig,
};

/// Multi-factor duplicate screening of a candidate against a population.
///
/// Each factor is judged independently; the fused score is the plain mean of
/// the factors that hit. Alerting is a separate, later cut on that mean.
#[derive(Debug, Clone)]
pub struct DuplicateDetector {
    name_threshold: f64,
    biometric_threshold: f64,
    alert_threshold: f64,
}

impl DuplicateDetector {
    pub fn new(matching: &MatchingConfig) -> Self {
        Self {
            name_threshold: matching.name_threshold,
            biometric_threshold: matching.biometric_threshold(),
            alert_threshold: matching.alert_threshold,
        }
    }

    /// Compares against one existing record. `None` when no factor hits.
    pub fn compare(
        &self,
        candidate: &CandidateRecord,
        existing: &ExistingRecord,
    ) -> Option<DuplicateCandidate> {
        let mut hits: Vec<(MatchFactor, f64)> = Vec::with_capacity(3);

        if let (Some(ours), Some(theirs)) = (
            candidate.national_id.as_deref().filter(|id| !id.is_empty()),
            existing.national_id.as_deref().filter(|id| !id.is_empty()),
        ) {
            if ours == theirs {
                hits.push((MatchFactor::NationalId, 100.0));
            }
        }

        if !candidate.name.is_empty() && !existing.name.is_empty() {
            let score = name_similarity(&candidate.name, &existing.name);
            if score > self.name_threshold {
                hits.push((MatchFactor::Name, score));
            }
        }

        if candidate.template.is_some() && existing.template.is_some() {
            let score = template_similarity(candidate.template.as_ref(), existing.template.as_ref());
            if score > self.biometric_threshold {
                hits.push((MatchFactor::FacialRecognition, score));
            }
        }

        if hits.is_empty() {
            return None;
        }

        let similarity_score = hits.iter().map(|(_, score)| score).sum::<f64>() / hits.len() as f64;
        debug!(
            existing = %existing.id,
            similarity_score,
            factors = ?hits.iter().map(|(factor, _)| factor.as_str()).collect::<Vec<_>>(),
            "Duplicate factors matched"
        );

        Some(DuplicateCandidate {
            subject_id: existing.id,
            name: existing.name.clone(),
            similarity_score,
            matching_factors: hits.into_iter().map(|(factor, _)| factor).collect(),
        })
    }

    /// Scans the population in parallel and ranks hits by fused score,
    /// highest first. Equal scores keep population order. A record sharing
    /// the candidate's identifier is never compared with itself.
    pub fn detect(
        &self,
        candidate: &CandidateRecord,
        population: &[ExistingRecord],
    ) -> Vec<DuplicateCandidate> {
        let mut duplicates: Vec<DuplicateCandidate> = population
            .par_iter()
            .filter(|existing| existing.id != candidate.id)
            .filter_map(|existing| self.compare(candidate, existing))
            .collect();

        duplicates.sort_by(|a, b| b.similarity_score.total_cmp(&a.similarity_score));
        duplicates
    }

    pub fn should_alert(&self, duplicate: &DuplicateCandidate) -> bool {
        duplicate.similarity_score > self.alert_threshold
    }

    /// Builds pending alerts for every ranked duplicate above the alert cut.
    pub fn raise_alerts(
        &self,
        candidate: &CandidateRecord,
        duplicates: &[DuplicateCandidate],
        now: DateTime<Utc>,
    ) -> Vec<DuplicateAlert> {
        duplicates
            .iter()
            .filter(|duplicate| self.should_alert(duplicate))
            .map(|duplicate| DuplicateAlert::new(candidate.id, duplicate, now))
            .collect()
    }
}
