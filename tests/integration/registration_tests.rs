// tests/integration/registration_tests.rs
use crate::common::{face_a, face_b, request, TestContext};
use chrono::{Duration, TimeZone, Utc};
use ghostguard::core::{
    fraud::types::RiskLevel,
    identity::types::{AlertStatus, MatchFactor, Subject, SubjectStatus, TemplateKind},
};
use ghostguard::RegistrationRequest;

#[tokio::test]
async fn test_same_photo_registered_twice_is_flagged() {
    let ctx = TestContext::new();
    let now = Utc.with_ymd_and_hms(2024, 3, 13, 10, 0, 0).unwrap();

    let first = ctx
        .register(
            RegistrationRequest {
                photo: Some(face_a()),
                ..request("Mary Smith", None)
            },
            now,
        )
        .await;
    assert!(first.duplicates.is_empty());
    assert_eq!(first.templates.len(), 1);
    assert_eq!(first.templates[0].kind, TemplateKind::Facial);

    let second = ctx
        .register(
            RegistrationRequest {
                photo: Some(face_a()),
                ..request("Robert Brown", None)
            },
            now + Duration::hours(1),
        )
        .await;

    assert_eq!(second.duplicates.len(), 1);
    let duplicate = &second.duplicates[0];
    assert_eq!(duplicate.subject_id, first.subject.id);
    assert_eq!(duplicate.matching_factors, vec![MatchFactor::FacialRecognition]);
    assert_eq!(duplicate.similarity_score, 100.0);

    assert_eq!(second.alerts.len(), 1);
    assert_eq!(second.alerts[0].subject_id_1, second.subject.id);
    assert_eq!(second.alerts[0].subject_id_2, first.subject.id);
    assert_eq!(second.alerts[0].status, AlertStatus::Pending);
}

#[tokio::test]
async fn test_different_photos_are_not_duplicates() {
    let ctx = TestContext::new();
    let now = Utc::now();

    ctx.register(
        RegistrationRequest {
            photo: Some(face_a()),
            ..request("Mary Smith", None)
        },
        now,
    )
    .await;
    let second = ctx
        .register(
            RegistrationRequest {
                photo: Some(face_b()),
                ..request("Robert Brown", None)
            },
            now,
        )
        .await;

    assert!(second.duplicates.is_empty());
    assert!(second.alerts.is_empty());
}

#[tokio::test]
async fn test_shared_national_id_and_similar_name() {
    let ctx = TestContext::new();
    let now = Utc::now();

    let first = ctx.register(request("John Smith", Some("123456-78-9012")), now).await;
    let second = ctx.register(request("Jon Smith", Some("123456-78-9012")), now).await;

    assert_eq!(second.duplicates.len(), 1);
    let duplicate = &second.duplicates[0];
    assert_eq!(duplicate.subject_id, first.subject.id);
    assert_eq!(
        duplicate.matching_factors,
        vec![MatchFactor::NationalId, MatchFactor::Name]
    );
    assert!((duplicate.similarity_score - 95.0).abs() < 1e-9);
    assert_eq!(second.alerts.len(), 1);
}

#[tokio::test]
async fn test_duplicates_ranked_by_fused_score() {
    let ctx = TestContext::new();
    let now = Utc::now();

    // Name alone scores 90; name plus national id scores 95.
    let by_name = ctx.register(request("Jon Smith", None), now).await;
    let by_both = ctx.register(request("John Smyth", Some("222222-22-2222")), now).await;
    let candidate = ctx
        .register(request("John Smith", Some("222222-22-2222")), now)
        .await;

    assert_eq!(candidate.duplicates.len(), 2);
    assert_eq!(candidate.duplicates[0].subject_id, by_both.subject.id);
    assert_eq!(candidate.duplicates[1].subject_id, by_name.subject.id);
    assert!(candidate.duplicates[0].similarity_score >= candidate.duplicates[1].similarity_score);
    assert_eq!(candidate.alerts.len(), 2);
}

#[tokio::test]
async fn test_resolving_alert_lowers_risk() {
    let ctx = TestContext::new();
    let now = Utc::now();

    ctx.register(request("Nancy Wilson", Some("987654-32-1098")), now).await;
    let second = ctx
        .register(request("Nancy Willson", Some("987654-32-1098")), now)
        .await;
    assert_eq!(second.alerts.len(), 1);

    let before = ctx
        .engine
        .assess_subject(second.subject.id, &ctx.store, now)
        .await
        .unwrap();
    assert_eq!(before.risk_score, 40);
    assert_eq!(before.risk_level, RiskLevel::High);

    let resolved = ctx
        .store
        .resolve_alert(
            second.alerts[0].id,
            AlertStatus::Resolved,
            Some("Siblings with shared paperwork".into()),
            "auditor",
            now,
        )
        .unwrap();
    assert_eq!(resolved.resolved_by.as_deref(), Some("auditor"));
    assert_eq!(resolved.resolved_date, Some(now));

    let after = ctx
        .engine
        .assess_subject(second.subject.id, &ctx.store, now)
        .await
        .unwrap();
    assert_eq!(after.risk_score, 0);
    assert_eq!(after.risk_level, RiskLevel::Low);
}

#[tokio::test]
async fn test_inactive_subjects_are_not_screened() {
    let ctx = TestContext::new();
    let now = Utc::now();

    let mut gone = Subject::new("Karen Taylor", Some("111111-11-1111".into()), now);
    gone.status = SubjectStatus::Inactive;
    ctx.add_subject(gone);

    let screening = ctx.register(request("Karen Taylor", Some("111111-11-1111")), now).await;
    assert!(screening.duplicates.is_empty());
}
