use chrono::NaiveDate;

use portal_mentorship::domain::types::NotificationTemplate;
use portal_mentorship::error::PortalServiceError;
use portal_mentorship::usecase::registration::{
    AcademicInput, PurgeExpiredTokensUseCase, SubmitRegistrationInput, SubmitRegistrationUseCase,
    VerifyEmailUseCase,
};

use crate::helpers::{ManualClock, MemoryRepo, RecordingNotifier};

fn input(email: &str) -> SubmitRegistrationInput {
    SubmitRegistrationInput {
        full_name: "Asha Rao".to_owned(),
        email: email.to_owned(),
        phone: "+91 98765-43210".to_owned(),
        city: "Pune".to_owned(),
        pincode: "411001".to_owned(),
        dob: NaiveDate::from_ymd_opt(2005, 4, 12),
        father_name: "Mohan Rao".to_owned(),
        mother_name: "Lata Rao".to_owned(),
        cet_taken: true,
        academics: vec![
            AcademicInput {
                level: "ug".to_owned(),
                degree: "B.Sc".to_owned(),
                institution: "Fergusson College".to_owned(),
                year: 2024,
                percentage: 81.5,
            },
            AcademicInput {
                level: String::new(),
                degree: String::new(),
                institution: String::new(),
                year: 0,
                percentage: 0.0,
            },
        ],
        ip: Some("198.51.100.4".to_owned()),
    }
}

fn verify_usecase(
    repo: &MemoryRepo,
    notifier: &RecordingNotifier,
    clock: &ManualClock,
) -> VerifyEmailUseCase<MemoryRepo, RecordingNotifier, ManualClock> {
    VerifyEmailUseCase {
        students: repo.clone(),
        notifier: notifier.clone(),
        clock: clock.clone(),
        site_base_url: "https://portal.test/".to_owned(),
    }
}

fn submit_usecase(
    repo: &MemoryRepo,
    notifier: &RecordingNotifier,
    clock: &ManualClock,
) -> SubmitRegistrationUseCase<MemoryRepo, RecordingNotifier, ManualClock> {
    SubmitRegistrationUseCase {
        students: repo.clone(),
        notifier: notifier.clone(),
        clock: clock.clone(),
        site_base_url: "https://portal.test/".to_owned(),
    }
}

#[tokio::test]
async fn should_register_then_verify_email() {
    let repo = MemoryRepo::new();
    let notifier = RecordingNotifier::default();
    let clock = ManualClock::new();

    let receipt = submit_usecase(&repo, &notifier, &clock)
        .execute(input("Asha@Example.com"))
        .await
        .unwrap();

    let token = {
        let world = repo.world();
        let student = &world.students[&receipt.account_id];
        assert!(!student.verified);
        assert_eq!(student.email, "asha@example.com");
        assert_eq!(world.records.len(), 1);
        world.tokens.keys().next().cloned().unwrap()
    };

    let sent = notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].template, NotificationTemplate::RegistrationReceived);
    let url = sent[0].context["verification_url"].as_str().unwrap();
    assert_eq!(url, format!("https://portal.test/verify-email?token={token}"));

    clock.advance(60 * 60);
    let verified = verify_usecase(&repo, &notifier, &clock)
        .execute(&token)
        .await
        .unwrap();

    assert_eq!(verified, receipt.account_id);
    {
        let world = repo.world();
        assert!(world.students[&receipt.account_id].verified);
        assert!(world.tokens.is_empty());
    }

    let sent = notifier.sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[1].template, NotificationTemplate::VerificationConfirmed);
    assert_eq!(sent[1].recipient, "asha@example.com");
    assert_eq!(sent[1].context["login_url"], "https://portal.test/login/");
}

#[tokio::test]
async fn should_refuse_expired_token() {
    let repo = MemoryRepo::new();
    let clock = ManualClock::new();
    submit_usecase(&repo, &RecordingNotifier::default(), &clock)
        .execute(input("asha@example.com"))
        .await
        .unwrap();
    let token = repo.world().tokens.keys().next().cloned().unwrap();

    clock.advance(24 * 60 * 60);
    let result = verify_usecase(&repo, &RecordingNotifier::default(), &clock)
        .execute(&token)
        .await;

    assert!(matches!(result, Err(PortalServiceError::TokenExpired)));
}

#[tokio::test]
async fn should_refuse_duplicate_email() {
    let repo = MemoryRepo::new();
    let clock = ManualClock::new();
    let uc = submit_usecase(&repo, &RecordingNotifier::default(), &clock);

    uc.execute(input("asha@example.com")).await.unwrap();
    let result = uc.execute(input("ASHA@example.com")).await;

    assert!(matches!(result, Err(PortalServiceError::EmailAlreadyRegistered)));
}

#[tokio::test]
async fn should_register_even_when_email_delivery_fails() {
    let repo = MemoryRepo::new();
    let clock = ManualClock::new();

    let receipt = submit_usecase(&repo, &RecordingNotifier::failing(), &clock)
        .execute(input("asha@example.com"))
        .await
        .unwrap();

    assert!(repo.world().students.contains_key(&receipt.account_id));
}

#[tokio::test]
async fn should_reject_unknown_token() {
    let repo = MemoryRepo::new();
    let result = verify_usecase(&repo, &RecordingNotifier::default(), &ManualClock::new())
        .execute("nope")
        .await;
    assert!(matches!(result, Err(PortalServiceError::InvalidToken)));
}

#[tokio::test]
async fn should_sweep_expired_tokens_and_leave_account_unverified() {
    let repo = MemoryRepo::new();
    let clock = ManualClock::new();
    let receipt = submit_usecase(&repo, &RecordingNotifier::default(), &clock)
        .execute(input("asha@example.com"))
        .await
        .unwrap();
    let token = repo.world().tokens.keys().next().cloned().unwrap();
    let sweeper = PurgeExpiredTokensUseCase {
        students: repo.clone(),
        clock: clock.clone(),
    };

    assert_eq!(sweeper.execute().await.unwrap(), 0);
    clock.advance(25 * 60 * 60);
    assert_eq!(sweeper.execute().await.unwrap(), 1);

    assert!(repo.world().tokens.is_empty());
    assert!(!repo.world().students[&receipt.account_id].verified);
    let result = verify_usecase(&repo, &RecordingNotifier::default(), &clock)
        .execute(&token)
        .await;
    assert!(matches!(result, Err(PortalServiceError::InvalidToken)));
}
