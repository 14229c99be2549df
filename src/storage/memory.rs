// src/storage/memory.rs
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;
use uuid::Uuid;

use crate::{
    core::{
        identity::types::{
            AlertStatus, AttendanceRecord, BenefitClaim, DuplicateAlert, ExistingRecord,
            StoredTemplate, Subject, SubjectId,
        },
        interfaces::{HistoryReader, PopulationReader, TemplateReader},
    },
    utils::error::{NodeError, Result},
};

/// Serialized registry contents, as exchanged with the binary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Dataset {
    pub subjects: Vec<Subject>,
    pub templates: Vec<StoredTemplate>,
    pub attendance: Vec<AttendanceRecord>,
    pub claims: Vec<BenefitClaim>,
    pub alerts: Vec<DuplicateAlert>,
}

/// Process-local registry implementing every reader the engine consumes.
#[derive(Default)]
pub struct RegistryStore {
    subjects: RwLock<Vec<Subject>>,
    templates: RwLock<Vec<StoredTemplate>>,
    attendance: RwLock<Vec<AttendanceRecord>>,
    claims: RwLock<Vec<BenefitClaim>>,
    alerts: RwLock<Vec<DuplicateAlert>>,
}

impl RegistryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_dataset(dataset: Dataset) -> Self {
        Self {
            subjects: RwLock::new(dataset.subjects),
            templates: RwLock::new(dataset.templates),
            attendance: RwLock::new(dataset.attendance),
            claims: RwLock::new(dataset.claims),
            alerts: RwLock::new(dataset.alerts),
        }
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let bytes = std::fs::read(path.as_ref())?;
        let dataset: Dataset = serde_json::from_slice(&bytes)?;

        if let Some(orphan) = dataset
            .templates
            .iter()
            .find(|t| !dataset.subjects.iter().any(|s| s.id == t.subject_id))
        {
            return Err(NodeError::Dataset(format!(
                "template {} references unknown subject {}",
                orphan.id, orphan.subject_id
            )));
        }

        info!(
            subjects = dataset.subjects.len(),
            attendance = dataset.attendance.len(),
            claims = dataset.claims.len(),
            "Dataset loaded from {}",
            path.as_ref().display()
        );
        Ok(Self::from_dataset(dataset))
    }

    pub fn snapshot(&self) -> Dataset {
        Dataset {
            subjects: self.subjects.read().clone(),
            templates: self.templates.read().clone(),
            attendance: self.attendance.read().clone(),
            claims: self.claims.read().clone(),
            alerts: self.alerts.read().clone(),
        }
    }

    pub fn add_subject(&self, subject: Subject) {
        self.subjects.write().push(subject);
    }

    pub fn add_template(&self, template: StoredTemplate) {
        self.templates.write().push(template);
    }

    pub fn add_attendance(&self, record: AttendanceRecord) {
        self.attendance.write().push(record);
    }

    pub fn add_claim(&self, claim: BenefitClaim) {
        self.claims.write().push(claim);
    }

    pub fn add_alerts(&self, alerts: impl IntoIterator<Item = DuplicateAlert>) {
        self.alerts.write().extend(alerts);
    }

    pub fn resolve_alert(
        &self,
        alert_id: Uuid,
        status: AlertStatus,
        notes: Option<String>,
        resolved_by: &str,
        at: DateTime<Utc>,
    ) -> Result<DuplicateAlert> {
        let mut alerts = self.alerts.write();
        let alert = alerts
            .iter_mut()
            .find(|alert| alert.id == alert_id)
            .ok_or_else(|| NodeError::Storage(format!("Alert {} not found", alert_id)))?;

        alert.resolve(status, notes, resolved_by, at);
        Ok(alert.clone())
    }
}

#[async_trait]
impl PopulationReader for RegistryStore {
    async fn active_records(&self) -> Result<Vec<ExistingRecord>> {
        Ok(self
            .subjects
            .read()
            .iter()
            .filter(|subject| subject.is_active())
            .map(ExistingRecord::from)
            .collect())
    }
}

#[async_trait]
impl TemplateReader for RegistryStore {
    async fn subject(&self, subject_id: SubjectId) -> Result<Option<Subject>> {
        Ok(self
            .subjects
            .read()
            .iter()
            .find(|subject| subject.id == subject_id)
            .cloned())
    }

    async fn templates_for(&self, subject_id: SubjectId) -> Result<Vec<StoredTemplate>> {
        Ok(self
            .templates
            .read()
            .iter()
            .filter(|template| template.subject_id == subject_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl HistoryReader for RegistryStore {
    async fn subjects(&self) -> Result<Vec<Subject>> {
        Ok(self.subjects.read().clone())
    }

    async fn attendance(&self) -> Result<Vec<AttendanceRecord>> {
        Ok(self.attendance.read().clone())
    }

    async fn claims(&self) -> Result<Vec<BenefitClaim>> {
        Ok(self.claims.read().clone())
    }

    async fn duplicate_alerts(&self) -> Result<Vec<DuplicateAlert>> {
        Ok(self.alerts.read().clone())
    }
}
