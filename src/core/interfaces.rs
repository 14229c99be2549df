// src/core/interfaces.rs
//! Collaborators that load already-persisted records for the engine.

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::{
    core::identity::types::{
        AttendanceRecord, BenefitClaim, DuplicateAlert, ExistingRecord, StoredTemplate, Subject,
        SubjectId,
    },
    utils::error::Result,
};

/// Supplies the active population scanned at registration.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait PopulationReader: Send + Sync {
    async fn active_records(&self) -> Result<Vec<ExistingRecord>>;
}

/// Supplies every stored template owned by one subject.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait TemplateReader: Send + Sync {
    async fn subject(&self, subject_id: SubjectId) -> Result<Option<Subject>>;

    async fn templates_for(&self, subject_id: SubjectId) -> Result<Vec<StoredTemplate>>;
}

/// Supplies the behavioural history consumed by fraud analysis.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait HistoryReader: Send + Sync {
    async fn subjects(&self) -> Result<Vec<Subject>>;

    async fn attendance(&self) -> Result<Vec<AttendanceRecord>>;

    async fn claims(&self) -> Result<Vec<BenefitClaim>>;

    async fn duplicate_alerts(&self) -> Result<Vec<DuplicateAlert>>;
}
