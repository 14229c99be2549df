// src/utils/sample.rs
//! Synthetic registry contents for demos and benchmarks.

use chrono::{DateTime, Datelike, Duration, TimeZone, Utc, Weekday};
use rand::{seq::SliceRandom, Rng};
use uuid::Uuid;

use crate::{
    core::identity::{
        biometric::sha256_hex,
        types::{
            AttendanceRecord, BenefitClaim, ClaimStatus, StoredTemplate, Subject, SubjectId,
            Template, TemplateKind, VerificationMethod,
        },
    },
    storage::memory::Dataset,
};

const FIRST_NAMES: &[&str] = &[
    "John", "Mary", "James", "Patricia", "Robert", "Jennifer", "Michael", "Linda", "William",
    "Elizabeth", "David", "Barbara", "Richard", "Susan", "Joseph", "Jessica", "Thomas", "Sarah",
    "Charles", "Karen", "Christopher", "Nancy", "Daniel", "Lisa", "Matthew", "Betty", "Anthony",
    "Margaret", "Donald", "Sandra",
];

const LAST_NAMES: &[&str] = &[
    "Smith", "Johnson", "Williams", "Brown", "Jones", "Garcia", "Miller", "Davis", "Rodriguez",
    "Martinez", "Hernandez", "Lopez", "Gonzalez", "Wilson", "Anderson", "Thomas", "Taylor",
    "Moore", "Jackson", "Martin", "Lee", "Perez", "Thompson", "White",
];

/// Benefit types with their (min, max) claim amounts.
const BENEFITS: &[(&str, f64, f64)] = &[
    ("Health Insurance", 5_000.0, 15_000.0),
    ("Pension", 10_000.0, 30_000.0),
    ("Housing Allowance", 8_000.0, 20_000.0),
    ("Transport Allowance", 3_000.0, 8_000.0),
    ("Education Grant", 10_000.0, 25_000.0),
    ("Medical Reimbursement", 2_000.0, 10_000.0),
    ("Annual Bonus", 15_000.0, 50_000.0),
];

const LOCATIONS: &[&str] = &["Main Office", "Branch A", "Branch B"];

const METHODS: &[VerificationMethod] = &[
    VerificationMethod::Fingerprint,
    VerificationMethod::Facial,
    VerificationMethod::IdCard,
];

const CLAIM_STATUSES: &[ClaimStatus] = &[ClaimStatus::Pending, ClaimStatus::Approved, ClaimStatus::Paid];

pub fn generate_dataset<R: Rng>(rng: &mut R, subjects: usize, now: DateTime<Utc>) -> Dataset {
    let mut dataset = Dataset::default();

    for _ in 0..subjects {
        let subject = generate_subject(rng, now);

        let payload: String = (0..32).map(|_| rng.gen_range(b'a'..=b'z') as char).collect();
        dataset.templates.push(StoredTemplate::new(
            subject.id,
            TemplateKind::Fingerprint,
            Template::Hash(sha256_hex(payload.as_bytes())),
        ));

        dataset
            .attendance
            .extend(generate_attendance(rng, subject.id, now - Duration::days(60), 40));

        for _ in 0..rng.gen_range(0..=3) {
            dataset.claims.push(generate_claim(rng, subject.id, now));
        }

        dataset.subjects.push(subject);
    }

    dataset
}

pub fn generate_subject<R: Rng>(rng: &mut R, now: DateTime<Utc>) -> Subject {
    let first = FIRST_NAMES.choose(rng).copied().unwrap_or("John");
    let last = LAST_NAMES.choose(rng).copied().unwrap_or("Smith");
    let registered_at = now - Duration::days(rng.gen_range(1..=365));

    Subject::new(
        format!("{} {}", first, last),
        Some(generate_national_id(rng)),
        registered_at,
    )
}

pub fn generate_national_id<R: Rng>(rng: &mut R) -> String {
    format!(
        "{}-{}-{}",
        rng.gen_range(100_000..=999_999),
        rng.gen_range(10..=99),
        rng.gen_range(1_000..=9_999)
    )
}

/// Weekday check-ins between 07:00 and 09:59 with roughly 70% attendance.
pub fn generate_attendance<R: Rng>(
    rng: &mut R,
    subject_id: SubjectId,
    start: DateTime<Utc>,
    num_days: usize,
) -> Vec<AttendanceRecord> {
    let mut logs = Vec::new();
    let mut day = start.date_naive();

    for _ in 0..num_days {
        while matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
            day += Duration::days(1);
        }

        if rng.gen::<f64>() > 0.3 {
            if let Some(naive) = day.and_hms_opt(rng.gen_range(7..=9), rng.gen_range(0..=59), 0) {
                logs.push(AttendanceRecord {
                    id: Uuid::new_v4(),
                    subject_id,
                    check_in_time: Utc.from_utc_datetime(&naive),
                    verification_method: METHODS.choose(rng).copied().unwrap_or_default(),
                    confidence_score: Some(rng.gen_range(85.0..99.0)),
                    location: LOCATIONS.choose(rng).copied().unwrap_or("Main Office").to_string(),
                    device_id: format!("DEVICE-{}", rng.gen_range(1..=5)),
                });
            }
        }

        day += Duration::days(1);
    }

    logs
}

pub fn generate_claim<R: Rng>(rng: &mut R, subject_id: SubjectId, now: DateTime<Utc>) -> BenefitClaim {
    let (benefit_type, min, max) = BENEFITS
        .choose(rng)
        .copied()
        .unwrap_or(("Pension", 1_000.0, 10_000.0));
    let amount = (rng.gen_range(min..max) * 100.0_f64).round() / 100.0;

    BenefitClaim {
        id: Uuid::new_v4(),
        subject_id,
        benefit_type: benefit_type.to_string(),
        amount,
        claim_date: now - Duration::days(rng.gen_range(1..=90)),
        status: CLAIM_STATUSES.choose(rng).copied().unwrap_or_default(),
        verified_by_biometric: rng.gen_bool(0.5),
    }
}
