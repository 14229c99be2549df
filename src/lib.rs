pub mod core;
pub mod storage;
pub mod utils;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    core::{
        fraud::{
            types::{DashboardStats, FraudReport, RiskAssessment},
            FraudAnalyzer,
        },
        identity::{
            biometric::{BiometricEncoder, FaceExtractor},
            types::{
                AttendanceRecord, BiometricSubmission, CandidateRecord, DuplicateAlert,
                DuplicateCandidate, MatchResult, StoredTemplate, Subject, SubjectId, Template,
                TemplateKind,
            },
        },
        interfaces::{HistoryReader, PopulationReader, TemplateReader},
        services::{
            attendance::{AttendanceService, CheckInRequest},
            duplicate::DuplicateDetector,
            verification::VerificationService,
        },
    },
    utils::{
        config::Config,
        error::{NodeError, Result},
        metrics::Metrics,
    },
};

/// A registration submitted for screening. Photo bytes arrive decoded.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistrationRequest {
    pub name: String,
    #[serde(default)]
    pub national_id: Option<String>,
    #[serde(default)]
    pub photo: Option<Vec<u8>>,
    #[serde(default)]
    pub fingerprint: Option<String>,
}

/// Everything the caller needs to persist after screening a registration.
#[derive(Debug, Clone, Serialize)]
pub struct RegistrationScreening {
    pub subject: Subject,
    pub templates: Vec<StoredTemplate>,
    pub duplicates: Vec<DuplicateCandidate>,
    pub alerts: Vec<DuplicateAlert>,
}

/// Wires configuration into the encoder, matchers and fraud analyzer, and
/// runs them over records supplied by the reader collaborators.
pub struct Engine {
    config: Arc<Config>,
    encoder: Arc<BiometricEncoder>,
    detector: DuplicateDetector,
    verifier: Arc<VerificationService>,
    attendance: AttendanceService,
    analyzer: FraudAnalyzer,
    metrics: Arc<Metrics>,
}

impl Engine {
    pub fn new(config: Config, extractor: Option<Arc<dyn FaceExtractor>>) -> Result<Self> {
        config.validate()?;
        let config = Arc::new(config);

        let encoder = Arc::new(BiometricEncoder::new(
            &config.matching,
            &config.encoder,
            extractor,
        )?);
        info!(mode = ?encoder.mode(), "Biometric encoder initialized");

        let detector = DuplicateDetector::new(&config.matching);
        let verifier = Arc::new(VerificationService::new(encoder.clone(), &config.matching));
        let attendance = AttendanceService::new(verifier.clone());
        let analyzer = FraudAnalyzer::new(config.fraud.clone());

        info!(
            biometric_threshold = config.matching.biometric_threshold(),
            alert_threshold = config.matching.alert_threshold,
            "Engine initialized"
        );

        Ok(Self {
            config,
            encoder,
            detector,
            verifier,
            attendance,
            analyzer,
            metrics: Arc::new(Metrics::new()),
        })
    }

    pub fn metrics(&self) -> Arc<Metrics> {
        self.metrics.clone()
    }

    /// Encodes a facial image on the blocking pool. A decode that outlives the
    /// configured timeout yields no template.
    pub async fn encode_facial_bounded(&self, photo: Vec<u8>) -> Option<Template> {
        let encoder = self.encoder.clone();
        let task = tokio::task::spawn_blocking(move || encoder.encode_facial(&photo));

        let template = match tokio::time::timeout(self.config.get_encode_timeout(), task).await {
            Ok(Ok(template)) => template,
            Ok(Err(e)) => {
                warn!(error = %e, "Facial encoding task failed");
                None
            }
            Err(_) => {
                warn!(
                    timeout_ms = self.config.encoder.timeout_ms,
                    "Facial encoding timed out"
                );
                None
            }
        };

        self.metrics.record_encoding(template.is_some());
        template
    }

    /// Encodes a registration's biometrics and screens it against the active
    /// population. Nothing is persisted here.
    pub async fn screen_registration(
        &self,
        request: RegistrationRequest,
        population: &dyn PopulationReader,
        now: DateTime<Utc>,
    ) -> Result<RegistrationScreening> {
        let started = Instant::now();

        let mut subject = Subject::new(request.name, request.national_id, now);
        let mut templates = Vec::new();

        if let Some(photo) = request.photo {
            subject.facial_template = self.encode_facial_bounded(photo).await;
            if let Some(template) = &subject.facial_template {
                templates.push(StoredTemplate::new(subject.id, TemplateKind::Facial, template.clone()));
            }
        }

        if let Some(payload) = request.fingerprint.as_deref() {
            let template = self.encoder.encode_fingerprint(payload);
            self.metrics.record_encoding(true);
            templates.push(StoredTemplate::new(subject.id, TemplateKind::Fingerprint, template));
        }

        let candidate = CandidateRecord {
            id: subject.id,
            name: subject.name.clone(),
            national_id: subject.national_id.clone(),
            template: subject.facial_template.clone(),
        };

        let existing = population.active_records().await?;
        let duplicates = self.detector.detect(&candidate, &existing);
        let alerts = self.detector.raise_alerts(&candidate, &duplicates, now);

        self.metrics
            .record_duplicate_scan(started.elapsed(), alerts.len());
        info!(
            subject_id = %subject.id,
            population = existing.len(),
            duplicates = duplicates.len(),
            alerts = alerts.len(),
            "Registration screened"
        );

        Ok(RegistrationScreening {
            subject,
            templates,
            duplicates,
            alerts,
        })
    }

    /// Best-of-N verification against every template the subject owns.
    pub async fn verify(
        &self,
        subject_id: SubjectId,
        submission: &BiometricSubmission,
        records: &dyn TemplateReader,
    ) -> Result<MatchResult> {
        let started = Instant::now();
        let templates = self.templates_for_known_subject(subject_id, records).await?;

        let result = self.verifier.verify_best(submission, &templates);
        self.metrics
            .record_verification(started.elapsed(), result.matched);

        info!(
            subject_id = %subject_id,
            matched = result.matched,
            confidence = result.confidence,
            "Identity verification result"
        );
        Ok(result)
    }

    pub async fn check_in(
        &self,
        request: &CheckInRequest,
        records: &dyn TemplateReader,
        now: DateTime<Utc>,
    ) -> Result<AttendanceRecord> {
        let templates = self
            .templates_for_known_subject(request.subject_id, records)
            .await?;

        Ok(self.attendance.check_in(request, &templates, now))
    }

    pub async fn fraud_report(
        &self,
        history: &dyn HistoryReader,
        now: DateTime<Utc>,
    ) -> Result<FraudReport> {
        let started = Instant::now();

        let subjects = history.subjects().await?;
        let attendance = history.attendance().await?;
        let claims = history.claims().await?;
        let alerts = history.duplicate_alerts().await?;

        let report = self
            .analyzer
            .report(&subjects, &attendance, &claims, &alerts, now);
        self.metrics.record_report(started.elapsed());
        Ok(report)
    }

    pub async fn assess_subject(
        &self,
        subject_id: SubjectId,
        history: &dyn HistoryReader,
        now: DateTime<Utc>,
    ) -> Result<RiskAssessment> {
        let subjects = history.subjects().await?;
        let subject = subjects
            .iter()
            .find(|subject| subject.id == subject_id)
            .ok_or(NodeError::SubjectNotFound(subject_id))?;

        let attendance = history.attendance().await?;
        let claims = history.claims().await?;
        let alerts = history.duplicate_alerts().await?;

        Ok(self
            .analyzer
            .assess_risk(subject, &attendance, &claims, &alerts, now))
    }

    pub async fn dashboard(
        &self,
        history: &dyn HistoryReader,
        now: DateTime<Utc>,
    ) -> Result<DashboardStats> {
        let subjects = history.subjects().await?;
        let attendance = history.attendance().await?;
        let claims = history.claims().await?;
        let alerts = history.duplicate_alerts().await?;

        Ok(self
            .analyzer
            .summarize(&subjects, &attendance, &claims, &alerts, now))
    }

    async fn templates_for_known_subject(
        &self,
        subject_id: Uuid,
        records: &dyn TemplateReader,
    ) -> Result<Vec<StoredTemplate>> {
        if records.subject(subject_id).await?.is_none() {
            return Err(NodeError::SubjectNotFound(subject_id));
        }
        records.templates_for(subject_id).await
    }
}
