// tests/integration/verification_tests.rs
use crate::common::{face_a, face_b, png, request, TestContext};
use chrono::{TimeZone, Utc};
use ghostguard::{
    core::{
        fraud::types::PatternKind,
        identity::types::{BiometricSubmission, MatchResult, VerificationMethod},
        services::attendance::CheckInRequest,
    },
    utils::error::NodeError,
    RegistrationRequest,
};
use uuid::Uuid;

fn facial(photo: Vec<u8>) -> BiometricSubmission {
    BiometricSubmission::Facial { photo }
}

fn fingerprint(payload: &str) -> BiometricSubmission {
    BiometricSubmission::Fingerprint {
        payload: payload.to_string(),
    }
}

#[tokio::test]
async fn test_same_photo_verifies_at_full_confidence() {
    let ctx = TestContext::new();
    let enrolled = ctx
        .register(
            RegistrationRequest {
                photo: Some(face_a()),
                ..request("Susan Martin", None)
            },
            Utc::now(),
        )
        .await;

    let result = ctx
        .engine
        .verify(enrolled.subject.id, &facial(face_a()), &ctx.store)
        .await
        .unwrap();

    assert!(result.matched);
    assert_eq!(result.confidence, 100.0);
}

#[tokio::test]
async fn test_different_photo_fails_in_hash_mode() {
    let ctx = TestContext::new();
    let enrolled = ctx
        .register(
            RegistrationRequest {
                photo: Some(face_a()),
                ..request("Susan Martin", None)
            },
            Utc::now(),
        )
        .await;

    let result = ctx
        .engine
        .verify(enrolled.subject.id, &facial(face_b()), &ctx.store)
        .await
        .unwrap();

    assert_eq!(result, MatchResult { matched: false, confidence: 0.0 });
}

#[tokio::test]
async fn test_fingerprint_verification() {
    let ctx = TestContext::new();
    let enrolled = ctx
        .register(
            RegistrationRequest {
                fingerprint: Some("whorl-0042".into()),
                ..request("Thomas Lopez", None)
            },
            Utc::now(),
        )
        .await;

    let genuine = ctx
        .engine
        .verify(enrolled.subject.id, &fingerprint("whorl-0042"), &ctx.store)
        .await
        .unwrap();
    assert_eq!(genuine, MatchResult { matched: true, confidence: 95.0 });

    let impostor = ctx
        .engine
        .verify(enrolled.subject.id, &fingerprint("whorl-0043"), &ctx.store)
        .await
        .unwrap();
    assert_eq!(impostor, MatchResult::NO_MATCH);
}

#[tokio::test]
async fn test_facial_probe_against_fingerprint_only_subject() {
    let ctx = TestContext::new();
    let enrolled = ctx
        .register(
            RegistrationRequest {
                fingerprint: Some("arch-7".into()),
                ..request("Lisa Perez", None)
            },
            Utc::now(),
        )
        .await;

    let result = ctx
        .engine
        .verify(enrolled.subject.id, &facial(face_a()), &ctx.store)
        .await
        .unwrap();
    assert_eq!(result, MatchResult::NO_MATCH);
}

#[tokio::test]
async fn test_unknown_subject_is_error() {
    let ctx = TestContext::new();
    let missing = Uuid::new_v4();

    let result = ctx
        .engine
        .verify(missing, &fingerprint("anything"), &ctx.store)
        .await;
    assert!(matches!(result, Err(NodeError::SubjectNotFound(id)) if id == missing));
}

#[tokio::test]
async fn test_vector_mode_tolerates_small_differences() {
    let ctx = TestContext::vector();
    let enrolled = ctx
        .register(
            RegistrationRequest {
                photo: Some(face_a()),
                ..request("Sarah Jackson", None)
            },
            Utc::now(),
        )
        .await;
    assert!(enrolled.subject.facial_template.is_some());

    // Mean luminance 125 enrolled, 120 probed.
    let close = ctx
        .engine
        .verify(enrolled.subject.id, &facial(face_b()), &ctx.store)
        .await
        .unwrap();
    assert!(close.matched);
    assert!(close.confidence > 95.0 && close.confidence < 100.0);

    let dark = ctx
        .engine
        .verify(enrolled.subject.id, &facial(png(96, |_, _| 10)), &ctx.store)
        .await
        .unwrap();
    assert!(!dark.matched);
    assert!(dark.confidence > 0.0 && dark.confidence < 85.0);

    let blank = ctx
        .engine
        .verify(enrolled.subject.id, &facial(png(96, |_, _| 0)), &ctx.store)
        .await
        .unwrap();
    assert_eq!(blank, MatchResult::NO_MATCH);
}

#[tokio::test]
async fn test_failed_check_in_surfaces_as_low_confidence() {
    let ctx = TestContext::new();
    let registered = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
    let wednesday = Utc.with_ymd_and_hms(2024, 3, 13, 8, 30, 0).unwrap();

    let enrolled = ctx
        .register(
            RegistrationRequest {
                fingerprint: Some("loop-19".into()),
                ..request("Daniel Thompson", None)
            },
            registered,
        )
        .await;

    let check_in = CheckInRequest {
        subject_id: enrolled.subject.id,
        biometric: Some(fingerprint("loop-20")),
        verification_method: Some(VerificationMethod::Fingerprint),
        location: None,
        device_id: None,
    };
    let record = ctx
        .engine
        .check_in(&check_in, &ctx.store, wednesday)
        .await
        .unwrap();
    assert_eq!(record.confidence_score, Some(0.0));
    assert_eq!(record.location, "Main Office");
    assert_eq!(record.device_id, "WEB-APP");
    ctx.store.add_attendance(record.clone());

    let report = ctx.engine.fraud_report(&ctx.store, wednesday).await.unwrap();
    assert_eq!(report.unusual_patterns.len(), 1);
    assert_eq!(report.unusual_patterns[0].kind, PatternKind::LowConfidence);
    assert_eq!(report.unusual_patterns[0].attendance_id, record.id);
}

#[tokio::test]
async fn test_check_in_without_biometric_is_full_confidence() {
    let ctx = TestContext::new();
    let enrolled = ctx.register(request("Betty Lee", None), Utc::now()).await;

    let check_in = CheckInRequest {
        subject_id: enrolled.subject.id,
        biometric: None,
        verification_method: Some(VerificationMethod::IdCard),
        location: Some("Branch B".into()),
        device_id: Some("KIOSK-3".into()),
    };
    let record = ctx
        .engine
        .check_in(&check_in, &ctx.store, Utc::now())
        .await
        .unwrap();

    assert_eq!(record.confidence_score, Some(100.0));
    assert_eq!(record.verification_method, VerificationMethod::IdCard);
    assert_eq!(record.location, "Branch B");
}
