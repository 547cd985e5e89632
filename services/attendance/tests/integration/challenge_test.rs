use chrono::{Duration, Utc};
use uuid::Uuid;

use campus_attendance::domain::types::{
    ChallengeState, MAX_VERIFICATION_ATTEMPTS, Redemption, VERIFICATION_CODE_LEN,
    VERIFICATION_CODE_TTL_SECS,
};
use campus_attendance::error::AttendanceServiceError;
use campus_attendance::locks::PairLocks;
use campus_attendance::usecase::challenge::{
    IssueVerificationCodeInput, IssueVerificationCodeUseCase, RedeemVerificationCodeUseCase,
};

use crate::helpers::{
    DeliveryMode, LONG_TIMEOUT, MockDelivery, MockProfileRepo, MockVerificationCodeRepo,
    SHORT_TIMEOUT, test_session, verification_code,
};

const CONTACT: &str = "student@campus.test";

fn issue_usecase(
    claimant_id: Uuid,
    codes: MockVerificationCodeRepo,
    delivery: MockDelivery,
) -> IssueVerificationCodeUseCase<MockProfileRepo, MockVerificationCodeRepo, MockDelivery> {
    IssueVerificationCodeUseCase {
        profiles: MockProfileRepo::with_contact(claimant_id, CONTACT),
        codes,
        delivery,
        locks: PairLocks::new(),
        delivery_timeout: LONG_TIMEOUT,
        store_timeout: LONG_TIMEOUT,
    }
}

#[tokio::test]
async fn should_issue_and_deliver_six_digit_code() {
    let claimant = Uuid::new_v4();
    let session = test_session(Uuid::new_v4(), Utc::now());
    let codes = MockVerificationCodeRepo::empty();
    let delivery = MockDelivery::accepting();
    let sent = delivery.sent_handle();

    let uc = issue_usecase(claimant, codes.clone(), delivery);
    let session_code_id = Uuid::new_v4();
    let before = Utc::now();
    let issued = uc
        .execute(IssueVerificationCodeInput {
            session: session.clone(),
            claimant_id: claimant,
            session_code_id: Some(session_code_id),
        })
        .await
        .unwrap();

    assert_eq!(issued.code.len(), VERIFICATION_CODE_LEN);
    assert!(issued.code.bytes().all(|b| b.is_ascii_digit()));
    assert_eq!(issued.attempts, 0);
    assert!(!issued.verified);
    assert_eq!(issued.session_code_id, Some(session_code_id));
    assert!(issued.expires_at >= before + Duration::seconds(VERIFICATION_CODE_TTL_SECS));
    assert_eq!(issued.state(Utc::now()), ChallengeState::Issued);

    assert_eq!(codes.get(session.id, claimant), Some(issued.clone()));

    let sent = sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].address, CONTACT);
    assert_eq!(sent[0].code, issued.code);
    assert_eq!(sent[0].subject, session.subject);
}

#[tokio::test]
async fn should_invalidate_previous_code_on_reissue() {
    let claimant = Uuid::new_v4();
    let session = test_session(Uuid::new_v4(), Utc::now());
    let codes = MockVerificationCodeRepo::empty();
    let uc = issue_usecase(claimant, codes.clone(), MockDelivery::accepting());

    let input = || IssueVerificationCodeInput {
        session: session.clone(),
        claimant_id: claimant,
        session_code_id: None,
    };
    let first = uc.execute(input()).await.unwrap();
    let second = uc.execute(input()).await.unwrap();

    let stored = codes.get(session.id, claimant).unwrap();
    assert_eq!(stored.id, second.id);
    assert_ne!(first.id, second.id);

    let redeem = RedeemVerificationCodeUseCase {
        codes: codes.clone(),
        store_timeout: LONG_TIMEOUT,
    };
    if first.code != second.code {
        let result = redeem.execute(session.id, claimant, &first.code).await;
        assert!(
            matches!(result, Err(AttendanceServiceError::Mismatch)),
            "old code must not verify, got {result:?}"
        );
    }
    let outcome = redeem
        .execute(session.id, claimant, &second.code)
        .await
        .unwrap();
    assert_eq!(outcome.redemption, Redemption::Fresh);
}

#[tokio::test]
async fn should_reject_issue_after_verified() {
    let claimant = Uuid::new_v4();
    let session = test_session(Uuid::new_v4(), Utc::now());
    let mut code = verification_code(session.id, claimant, "483920", Utc::now());
    code.verified = true;
    code.verified_at = Some(Utc::now());
    let codes = MockVerificationCodeRepo::with_code(code.clone());
    let delivery = MockDelivery::accepting();
    let sent = delivery.sent_handle();

    let uc = issue_usecase(claimant, codes.clone(), delivery);
    let result = uc
        .execute(IssueVerificationCodeInput {
            session: session.clone(),
            claimant_id: claimant,
            session_code_id: None,
        })
        .await;

    assert!(matches!(result, Err(AttendanceServiceError::AlreadyVerified)));
    assert_eq!(codes.get(session.id, claimant), Some(code));
    assert!(sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn should_return_claimant_not_found_without_profile() {
    let session = test_session(Uuid::new_v4(), Utc::now());
    let codes = MockVerificationCodeRepo::empty();
    let uc = IssueVerificationCodeUseCase {
        profiles: MockProfileRepo::empty(),
        codes: codes.clone(),
        delivery: MockDelivery::accepting(),
        locks: PairLocks::new(),
        delivery_timeout: LONG_TIMEOUT,
        store_timeout: LONG_TIMEOUT,
    };
    let claimant = Uuid::new_v4();
    let result = uc
        .execute(IssueVerificationCodeInput {
            session: session.clone(),
            claimant_id: claimant,
            session_code_id: None,
        })
        .await;
    assert!(matches!(result, Err(AttendanceServiceError::ClaimantNotFound)));
    assert!(codes.get(session.id, claimant).is_none());
}

#[tokio::test]
async fn should_report_delivery_failure() {
    let claimant = Uuid::new_v4();
    let session = test_session(Uuid::new_v4(), Utc::now());
    let codes = MockVerificationCodeRepo::empty();
    let uc = issue_usecase(claimant, codes.clone(), MockDelivery::new(DeliveryMode::Fail));

    let result = uc
        .execute(IssueVerificationCodeInput {
            session: session.clone(),
            claimant_id: claimant,
            session_code_id: None,
        })
        .await;
    let err = result.unwrap_err();
    assert!(matches!(err, AttendanceServiceError::DeliveryFailure));
    assert!(err.is_retryable());
    // Persisted before delivery; a retry simply replaces it.
    assert!(codes.get(session.id, claimant).is_some());
}

#[tokio::test]
async fn should_report_delivery_timeout_as_delivery_failure() {
    let claimant = Uuid::new_v4();
    let session = test_session(Uuid::new_v4(), Utc::now());
    let uc = IssueVerificationCodeUseCase {
        profiles: MockProfileRepo::with_contact(claimant, CONTACT),
        codes: MockVerificationCodeRepo::empty(),
        delivery: MockDelivery::new(DeliveryMode::Hang),
        locks: PairLocks::new(),
        delivery_timeout: SHORT_TIMEOUT,
        store_timeout: LONG_TIMEOUT,
    };

    let result = tokio::time::timeout(
        LONG_TIMEOUT,
        uc.execute(IssueVerificationCodeInput {
            session,
            claimant_id: claimant,
            session_code_id: None,
        }),
    )
    .await
    .expect("issue must give up on a hanging delivery");
    assert!(matches!(result, Err(AttendanceServiceError::DeliveryFailure)));
}

#[tokio::test]
async fn should_time_out_stalled_code_write_before_delivery() {
    let claimant = Uuid::new_v4();
    let session = test_session(Uuid::new_v4(), Utc::now());
    let delivery = MockDelivery::accepting();
    let sent = delivery.sent_handle();
    let mut uc = issue_usecase(
        claimant,
        MockVerificationCodeRepo::empty().stalling_writes(),
        delivery,
    );
    uc.store_timeout = SHORT_TIMEOUT;

    let result = tokio::time::timeout(
        LONG_TIMEOUT,
        uc.execute(IssueVerificationCodeInput {
            session,
            claimant_id: claimant,
            session_code_id: None,
        }),
    )
    .await
    .expect("issue must give up on a stalled store");
    assert!(matches!(result, Err(AttendanceServiceError::StoreTimeout)));
    assert!(sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn should_return_unknown_code_when_nothing_issued() {
    let redeem = RedeemVerificationCodeUseCase {
        codes: MockVerificationCodeRepo::empty(),
        store_timeout: LONG_TIMEOUT,
    };
    let result = redeem
        .execute(Uuid::new_v4(), Uuid::new_v4(), "483920")
        .await;
    assert!(matches!(result, Err(AttendanceServiceError::UnknownCode)));
}

#[tokio::test]
async fn should_reject_expired_code_even_when_correct() {
    let (session_id, claimant) = (Uuid::new_v4(), Uuid::new_v4());
    let issued_at = Utc::now() - Duration::seconds(VERIFICATION_CODE_TTL_SECS + 1);
    let codes =
        MockVerificationCodeRepo::with_code(verification_code(session_id, claimant, "483920", issued_at));

    let redeem = RedeemVerificationCodeUseCase {
        codes: codes.clone(),
        store_timeout: LONG_TIMEOUT,
    };
    let result = redeem.execute(session_id, claimant, "483920").await;
    assert!(matches!(result, Err(AttendanceServiceError::ExpiredCode)));
    assert!(!codes.get(session_id, claimant).unwrap().verified);
}

#[tokio::test]
async fn should_persist_attempts_until_exhausted() {
    let (session_id, claimant) = (Uuid::new_v4(), Uuid::new_v4());
    let codes = MockVerificationCodeRepo::with_code(verification_code(
        session_id,
        claimant,
        "483920",
        Utc::now(),
    ));
    let redeem = RedeemVerificationCodeUseCase {
        codes: codes.clone(),
        store_timeout: LONG_TIMEOUT,
    };

    let result = redeem.execute(session_id, claimant, "111111").await;
    assert!(matches!(result, Err(AttendanceServiceError::Mismatch)));
    assert_eq!(codes.get(session_id, claimant).unwrap().attempts, 1);

    for _ in 1..MAX_VERIFICATION_ATTEMPTS - 1 {
        let result = redeem.execute(session_id, claimant, "111111").await;
        assert!(matches!(result, Err(AttendanceServiceError::Mismatch)));
    }
    let result = redeem.execute(session_id, claimant, "111111").await;
    assert!(
        matches!(result, Err(AttendanceServiceError::AttemptsExhausted)),
        "fifth mismatch should exhaust, got {result:?}"
    );

    let result = redeem.execute(session_id, claimant, "483920").await;
    assert!(matches!(result, Err(AttendanceServiceError::AttemptsExhausted)));
    let stored = codes.get(session_id, claimant).unwrap();
    assert_eq!(stored.attempts, MAX_VERIFICATION_ATTEMPTS);
    assert!(!stored.verified);
}

#[tokio::test]
async fn should_accept_fresh_code_after_exhaustion_and_reissue() {
    let claimant = Uuid::new_v4();
    let session = test_session(Uuid::new_v4(), Utc::now());
    let mut dead = verification_code(session.id, claimant, "483920", Utc::now());
    dead.attempts = MAX_VERIFICATION_ATTEMPTS;
    let codes = MockVerificationCodeRepo::with_code(dead);

    let issue = issue_usecase(claimant, codes.clone(), MockDelivery::accepting());
    let fresh = issue
        .execute(IssueVerificationCodeInput {
            session: session.clone(),
            claimant_id: claimant,
            session_code_id: None,
        })
        .await
        .unwrap();
    assert_eq!(fresh.attempts, 0);

    let redeem = RedeemVerificationCodeUseCase {
        codes,
        store_timeout: LONG_TIMEOUT,
    };
    let outcome = redeem
        .execute(session.id, claimant, &fresh.code)
        .await
        .unwrap();
    assert_eq!(outcome.redemption, Redemption::Fresh);
    assert!(outcome.code.verified);
}

#[tokio::test]
async fn should_replay_success_without_touching_attempts() {
    let (session_id, claimant) = (Uuid::new_v4(), Uuid::new_v4());
    let codes = MockVerificationCodeRepo::with_code(verification_code(
        session_id,
        claimant,
        "483920",
        Utc::now(),
    ));
    let redeem = RedeemVerificationCodeUseCase {
        codes: codes.clone(),
        store_timeout: LONG_TIMEOUT,
    };

    let first = redeem.execute(session_id, claimant, "483920").await.unwrap();
    let again = redeem.execute(session_id, claimant, "483920").await.unwrap();
    assert_eq!(first.redemption, Redemption::Fresh);
    assert_eq!(again.redemption, Redemption::Replayed);
    assert_eq!(again.code.verified_at, first.code.verified_at);

    let wrong = redeem.execute(session_id, claimant, "000000").await;
    assert!(matches!(wrong, Err(AttendanceServiceError::Mismatch)));
    assert_eq!(codes.get(session_id, claimant).unwrap().attempts, 0);
}
