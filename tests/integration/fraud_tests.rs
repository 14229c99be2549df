// tests/integration/fraud_tests.rs
use crate::common::TestContext;
use chrono::{DateTime, Duration, TimeZone, Utc};
use ghostguard::core::{
    fraud::types::{GhostReason, RiskLevel},
    identity::types::{
        AttendanceRecord, BenefitClaim, ClaimStatus, Subject, SubjectId, SubjectStatus,
        VerificationMethod,
    },
};
use uuid::Uuid;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 13, 10, 0, 0).unwrap()
}

fn subject(ctx: &TestContext, name: &str, days_ago: i64) -> Subject {
    ctx.add_subject(Subject::new(name, None, now() - Duration::days(days_ago)))
}

fn attend(ctx: &TestContext, subject_id: SubjectId, at: DateTime<Utc>) {
    ctx.store.add_attendance(AttendanceRecord {
        id: Uuid::new_v4(),
        subject_id,
        check_in_time: at,
        verification_method: VerificationMethod::Facial,
        confidence_score: Some(92.0),
        location: "Branch A".into(),
        device_id: "DEVICE-1".into(),
    });
}

fn claim(ctx: &TestContext, subject_id: SubjectId, at: DateTime<Utc>, verified: bool) -> BenefitClaim {
    let claim = BenefitClaim {
        id: Uuid::new_v4(),
        subject_id,
        benefit_type: "Pension".into(),
        amount: 12_500.0,
        claim_date: at,
        status: ClaimStatus::Pending,
        verified_by_biometric: verified,
    };
    ctx.store.add_claim(claim.clone());
    claim
}

#[tokio::test]
async fn test_ghost_workers_in_report() {
    let ctx = TestContext::new();
    let never = subject(&ctx, "Anthony Moore", 40);
    let recent_hire = subject(&ctx, "Margaret Davis", 5);
    let stale = subject(&ctx, "Charles Hernandez", 90);
    let regular = subject(&ctx, "Jessica Anderson", 90);
    attend(&ctx, stale.id, now() - Duration::days(45));
    attend(&ctx, regular.id, now() - Duration::days(1));

    let report = ctx.engine.fraud_report(&ctx.store, now()).await.unwrap();

    assert_eq!(report.ghost_workers.len(), 2);
    let never_ghost = report
        .ghost_workers
        .iter()
        .find(|ghost| ghost.subject_id == never.id)
        .unwrap();
    assert_eq!(never_ghost.reason, GhostReason::NoAttendanceRecords);
    assert_eq!(never_ghost.days_since_registration, Some(40));

    let stale_ghost = report
        .ghost_workers
        .iter()
        .find(|ghost| ghost.subject_id == stale.id)
        .unwrap();
    assert_eq!(stale_ghost.reason.to_string(), "No attendance in 30 days");
    assert_eq!(stale_ghost.days_since_attendance, Some(45));
    assert!(report.ghost_workers.iter().all(|g| g.subject_id != recent_hire.id));

    let assessment = |id: SubjectId| {
        report
            .assessments
            .iter()
            .find(|a| a.subject_id == id)
            .unwrap()
            .clone()
    };
    assert_eq!(assessment(never.id).risk_score, 30);
    assert_eq!(assessment(never.id).risk_level, RiskLevel::Medium);
    assert_eq!(assessment(recent_hire.id).risk_score, 0);
    assert_eq!(assessment(recent_hire.id).risk_level, RiskLevel::Low);
}

#[tokio::test]
async fn test_inactive_subject_is_never_a_ghost() {
    let ctx = TestContext::new();
    let mut retired = Subject::new("William Gonzalez", None, now() - Duration::days(200));
    retired.status = SubjectStatus::Inactive;
    ctx.add_subject(retired);

    let report = ctx.engine.fraud_report(&ctx.store, now()).await.unwrap();
    assert!(report.ghost_workers.is_empty());
    assert_eq!(report.assessments[0].risk_score, 0);
}

#[tokio::test]
async fn test_duplicate_claims_and_claim_risk() {
    let ctx = TestContext::new();
    let busy = subject(&ctx, "Richard Martinez", 100);
    let calm = subject(&ctx, "Sandra Rodriguez", 100);
    attend(&ctx, busy.id, now() - Duration::days(2));
    attend(&ctx, calm.id, now() - Duration::days(2));

    let base = now() - Duration::days(10);
    let first = claim(&ctx, busy.id, base, true);
    let second = claim(&ctx, busy.id, base + Duration::hours(3), false);
    for week in 1..=4 {
        claim(&ctx, busy.id, base + Duration::days(week * 2), true);
    }
    claim(&ctx, calm.id, base, true);
    claim(&ctx, calm.id, base + Duration::days(5), true);

    let report = ctx.engine.fraud_report(&ctx.store, now()).await.unwrap();

    assert_eq!(report.suspicious_claims.len(), 1);
    let pair = &report.suspicious_claims[0];
    assert_eq!(pair.subject_id, busy.id);
    assert_eq!(pair.claims, [first.id, second.id]);
    assert!((pair.time_difference_hours - 3.0).abs() < 1e-9);

    // One unverified claim plus six claims in total.
    assert_eq!(report.assessments[0].subject_id, busy.id);
    assert_eq!(report.assessments[0].risk_score, 30);
    assert_eq!(report.assessments[0].risk_factors.len(), 2);
    assert_eq!(report.assessments[1].risk_score, 0);
}

#[tokio::test]
async fn test_dashboard_counts() {
    let ctx = TestContext::new();
    let ghost = subject(&ctx, "Elizabeth Wilson", 60);
    let worker = subject(&ctx, "Michael Johnson", 60);
    let mut suspended = Subject::new("Joseph Brown", None, now() - Duration::days(60));
    suspended.status = SubjectStatus::Suspended;
    ctx.add_subject(suspended);

    attend(&ctx, worker.id, now() - Duration::days(1));
    attend(&ctx, worker.id, now() - Duration::days(2));
    claim(&ctx, ghost.id, now() - Duration::days(3), false);

    let stats = ctx.engine.dashboard(&ctx.store, now()).await.unwrap();
    assert_eq!(stats.active_subjects, 2);
    assert_eq!(stats.total_attendance, 2);
    assert_eq!(stats.total_claims, 1);
    assert_eq!(stats.pending_duplicates, 0);
    assert_eq!(stats.ghost_worker_count, 1);

    let report = ctx.engine.fraud_report(&ctx.store, now()).await.unwrap();
    assert_eq!(report.summary, stats);
}

#[tokio::test]
async fn test_sample_dataset_report_is_ranked() {
    use ghostguard::{storage::RegistryStore, utils::sample::generate_dataset};
    use rand::{rngs::StdRng, SeedableRng};

    let ctx = TestContext::new();
    let store = RegistryStore::from_dataset(generate_dataset(&mut StdRng::seed_from_u64(42), 25, now()));

    let report = ctx.engine.fraud_report(&store, now()).await.unwrap();
    assert_eq!(report.assessments.len(), 25);
    assert!(report
        .assessments
        .windows(2)
        .all(|pair| pair[0].risk_score >= pair[1].risk_score));
    assert!(report.assessments.iter().all(|a| a.risk_score <= 100));
}
