// src/core/identity/types.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;
use uuid::Uuid;

pub type SubjectId = Uuid;

/// Comparable representation of one biometric sample.
///
/// Persisted as a JSON array of feature values for vector templates and a hex
/// digest otherwise. Records read back through [`deserialize_template`], so a
/// corrupt stored value loads as no template instead of failing the load.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Template {
    Vector(Vec<f64>),
    Hash(String),
}

impl Template {
    /// Parses the persisted text form. Anything unrecognisable yields `None`,
    /// which every comparison treats as zero similarity.
    pub fn parse(stored: &str) -> Option<Self> {
        let stored = stored.trim();
        if stored.starts_with('[') {
            return serde_json::from_str::<Vec<f64>>(stored)
                .ok()
                .filter(|values| !values.is_empty())
                .map(Template::Vector);
        }

        if !stored.is_empty() && stored.chars().all(|c| c.is_ascii_hexdigit()) {
            return Some(Template::Hash(stored.to_ascii_lowercase()));
        }

        None
    }

    fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(text) => Self::parse(text),
            Value::Array(items) => {
                let values: Option<Vec<f64>> = items.iter().map(Value::as_f64).collect();
                values
                    .filter(|values| !values.is_empty())
                    .map(Template::Vector)
            }
            _ => None,
        }
    }
}

/// Reads an optional persisted template, degrading anything unparseable to
/// `None`.
pub fn deserialize_template<'de, D>(deserializer: D) -> Result<Option<Template>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|value| {
        let template = Template::from_json(&value);
        if template.is_none() && !value.is_null() {
            warn!("Discarding unparseable stored template");
        }
        template
    }))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateKind {
    Facial,
    Fingerprint,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredTemplate {
    pub id: Uuid,
    pub subject_id: SubjectId,
    pub kind: TemplateKind,
    /// `None` when the persisted value could not be parsed.
    #[serde(default, deserialize_with = "deserialize_template")]
    pub template: Option<Template>,
    pub quality_score: f64,
    pub created_at: DateTime<Utc>,
}

impl StoredTemplate {
    pub fn new(subject_id: SubjectId, kind: TemplateKind, template: Template) -> Self {
        let quality_score = match kind {
            TemplateKind::Facial => 90.0,
            TemplateKind::Fingerprint => 95.0,
        };

        Self {
            id: Uuid::new_v4(),
            subject_id,
            kind,
            template: Some(template),
            quality_score,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubjectStatus {
    #[default]
    Active,
    Inactive,
    Suspended,
}

/// A registered individual as the registry keeps it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subject {
    pub id: SubjectId,
    pub name: String,
    pub national_id: Option<String>,
    #[serde(default)]
    pub status: SubjectStatus,
    pub registered_at: DateTime<Utc>,
    /// Primary facial template, if one could be produced at registration.
    #[serde(default, deserialize_with = "deserialize_template")]
    pub facial_template: Option<Template>,
}

impl Subject {
    pub fn new(name: impl Into<String>, national_id: Option<String>, registered_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            national_id,
            status: SubjectStatus::Active,
            registered_at,
            facial_template: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == SubjectStatus::Active
    }
}

/// A prospective registration being screened against the population.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateRecord {
    pub id: SubjectId,
    pub name: String,
    pub national_id: Option<String>,
    #[serde(default, deserialize_with = "deserialize_template")]
    pub template: Option<Template>,
}

/// Read-only view of an accepted subject used for duplicate scanning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExistingRecord {
    pub id: SubjectId,
    pub name: String,
    pub national_id: Option<String>,
    #[serde(default, deserialize_with = "deserialize_template")]
    pub template: Option<Template>,
}

impl From<&Subject> for ExistingRecord {
    fn from(subject: &Subject) -> Self {
        Self {
            id: subject.id,
            name: subject.name.clone(),
            national_id: subject.national_id.clone(),
            template: subject.facial_template.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    #[serde(rename = "match")]
    pub matched: bool,
    pub confidence: f64,
}

impl MatchResult {
    pub const NO_MATCH: MatchResult = MatchResult {
        matched: false,
        confidence: 0.0,
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchFactor {
    NationalId,
    Name,
    FacialRecognition,
}

impl MatchFactor {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchFactor::NationalId => "national_id",
            MatchFactor::Name => "name",
            MatchFactor::FacialRecognition => "facial_recognition",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuplicateCandidate {
    pub subject_id: SubjectId,
    pub name: String,
    pub similarity_score: f64,
    pub matching_factors: Vec<MatchFactor>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertStatus {
    #[default]
    Pending,
    Resolved,
    ConfirmedDuplicate,
}

/// A persisted duplicate finding awaiting or past investigation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuplicateAlert {
    pub id: Uuid,
    pub subject_id_1: SubjectId,
    pub subject_id_2: SubjectId,
    pub similarity_score: f64,
    pub matching_factors: Vec<MatchFactor>,
    pub alert_date: DateTime<Utc>,
    #[serde(default)]
    pub status: AlertStatus,
    #[serde(default)]
    pub investigation_notes: Option<String>,
    #[serde(default)]
    pub resolved_by: Option<String>,
    #[serde(default)]
    pub resolved_date: Option<DateTime<Utc>>,
}

impl DuplicateAlert {
    pub fn new(subject_id: SubjectId, duplicate: &DuplicateCandidate, alert_date: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            subject_id_1: subject_id,
            subject_id_2: duplicate.subject_id,
            similarity_score: duplicate.similarity_score,
            matching_factors: duplicate.matching_factors.clone(),
            alert_date,
            status: AlertStatus::Pending,
            investigation_notes: None,
            resolved_by: None,
            resolved_date: None,
        }
    }

    pub fn involves(&self, subject_id: SubjectId) -> bool {
        self.subject_id_1 == subject_id || self.subject_id_2 == subject_id
    }

    pub fn is_pending(&self) -> bool {
        self.status == AlertStatus::Pending
    }

    pub fn resolve(
        &mut self,
        status: AlertStatus,
        notes: Option<String>,
        resolved_by: impl Into<String>,
        at: DateTime<Utc>,
    ) {
        self.status = status;
        self.investigation_notes = notes;
        self.resolved_by = Some(resolved_by.into());
        self.resolved_date = Some(at);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationMethod {
    Fingerprint,
    #[default]
    Facial,
    IdCard,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub id: Uuid,
    pub subject_id: SubjectId,
    pub check_in_time: DateTime<Utc>,
    #[serde(default)]
    pub verification_method: VerificationMethod,
    pub confidence_score: Option<f64>,
    pub location: String,
    pub device_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClaimStatus {
    #[default]
    Pending,
    Approved,
    Paid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenefitClaim {
    pub id: Uuid,
    pub subject_id: SubjectId,
    pub benefit_type: String,
    pub amount: f64,
    pub claim_date: DateTime<Utc>,
    #[serde(default)]
    pub status: ClaimStatus,
    #[serde(default)]
    pub verified_by_biometric: bool,
}

/// Biometric data presented for one-to-one verification.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BiometricSubmission {
    /// Opaque scanner payload, hashed before comparison.
    Fingerprint { payload: String },
    /// Already-decoded image bytes.
    Facial { photo: Vec<u8> },
}

impl BiometricSubmission {
    pub fn method(&self) -> VerificationMethod {
        match self {
            BiometricSubmission::Fingerprint { .. } => VerificationMethod::Fingerprint,
            BiometricSubmission::Facial { .. } => VerificationMethod::Facial,
        }
    }
}
