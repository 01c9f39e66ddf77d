use chrono::Utc;
use uuid::Uuid;

use portal_mentorship::domain::repository::MentorRequestRepository;
use portal_mentorship::domain::types::{MentorRequest, MentorRequestStatus, NotificationTemplate};
use portal_mentorship::error::PortalServiceError;
use portal_mentorship::usecase::mentor_request::{
    RejectMentorRequestUseCase, SubmitMentorRequestUseCase,
};

use crate::helpers::{MemoryRepo, RecordingNotifier, staff, student};

fn submit_usecase(
    repo: &MemoryRepo,
    notifier: &RecordingNotifier,
) -> SubmitMentorRequestUseCase<MemoryRepo, MemoryRepo, MemoryRepo, RecordingNotifier> {
    SubmitMentorRequestUseCase {
        students: repo.clone(),
        requests: repo.clone(),
        accounts: repo.clone(),
        notifier: notifier.clone(),
    }
}

#[tokio::test]
async fn should_refuse_second_pending_request() {
    let repo = MemoryRepo::new();
    let notifier = RecordingNotifier::default();
    let asha = repo.add_student("Asha");
    let uc = submit_usecase(&repo, &notifier);

    uc.execute(student(asha), Some("please".to_owned()))
        .await
        .unwrap();
    let result = uc.execute(student(asha), None).await;

    assert!(
        matches!(result, Err(PortalServiceError::DuplicateRequest)),
        "expected DuplicateRequest, got {result:?}"
    );
    assert_eq!(repo.world().pending_for(asha).len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn should_keep_one_pending_request_under_concurrency() {
    let repo = MemoryRepo::new();
    let notifier = RecordingNotifier::default();
    let asha = repo.add_student("Asha");

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let uc = submit_usecase(&repo, &notifier);
            tokio::spawn(async move { uc.execute(student(asha), None).await })
        })
        .collect();

    let mut created = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => created += 1,
            Err(PortalServiceError::DuplicateRequest) => {}
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }

    assert_eq!(created, 1);
    assert_eq!(repo.world().pending_for(asha).len(), 1);
}

#[tokio::test]
async fn should_notify_every_staff_account() {
    let repo = MemoryRepo::new();
    let notifier = RecordingNotifier::default();
    repo.add_staff("head@portal.test");
    repo.add_staff("desk@portal.test");
    let asha = repo.add_student("Asha");

    submit_usecase(&repo, &notifier)
        .execute(student(asha), None)
        .await
        .unwrap();

    let mut recipients: Vec<String> = notifier
        .sent()
        .into_iter()
        .filter(|n| n.template == NotificationTemplate::MentorRequested)
        .map(|n| n.recipient)
        .collect();
    recipients.sort();
    assert_eq!(recipients, vec!["desk@portal.test", "head@portal.test"]);
}

#[tokio::test]
async fn should_keep_request_when_notifier_fails() {
    let repo = MemoryRepo::new();
    repo.add_staff("head@portal.test");
    let asha = repo.add_student("Asha");

    let request = submit_usecase(&repo, &RecordingNotifier::failing())
        .execute(student(asha), None)
        .await
        .unwrap();

    assert_eq!(request.status, MentorRequestStatus::Pending);
    assert_eq!(repo.world().pending_for(asha).len(), 1);
}

#[tokio::test]
async fn should_allow_new_request_after_rejection() {
    let repo = MemoryRepo::new();
    let notifier = RecordingNotifier::default();
    let head = repo.add_staff("head@portal.test");
    let asha = repo.add_student("Asha");
    let uc = submit_usecase(&repo, &notifier);

    let first = uc.execute(student(asha), None).await.unwrap();
    RejectMentorRequestUseCase {
        requests: repo.clone(),
    }
    .execute(staff(head), first.id)
    .await
    .unwrap();

    let second = uc.execute(student(asha), None).await.unwrap();
    assert_ne!(first.id, second.id);

    let again = RejectMentorRequestUseCase {
        requests: repo.clone(),
    }
    .execute(staff(head), first.id)
    .await;
    assert!(matches!(again, Err(PortalServiceError::RequestNotPending)));
}

#[tokio::test]
async fn should_refuse_request_from_staff_with_student_profile() {
    let repo = MemoryRepo::new();
    let notifier = RecordingNotifier::default();
    let boss = repo.add_staff_with_profile("Boss");

    let result = submit_usecase(&repo, &notifier)
        .execute(staff(boss), None)
        .await;

    assert!(
        matches!(result, Err(PortalServiceError::PrivilegedMentee)),
        "expected PrivilegedMentee, got {result:?}"
    );
    assert!(repo.world().pending_for(boss).is_empty());
    assert!(notifier.sent().is_empty());
}

#[tokio::test]
async fn should_recheck_mentor_at_insert_time() {
    // An assignment that commits after the use case read the student must
    // still block the insert.
    let repo = MemoryRepo::new();
    let asha = repo.add_student("Asha");
    let mentor = repo.add_mentor("Dr Rao");
    if let Some(s) = repo.world().students.get_mut(&asha) {
        s.mentor_id = Some(mentor);
    }
    let now = Utc::now();
    let request = MentorRequest {
        id: Uuid::now_v7(),
        student_id: asha,
        status: MentorRequestStatus::Pending,
        message: String::new(),
        created_at: now,
        updated_at: now,
    };

    let result = repo.create_pending(&request).await;

    assert!(matches!(result, Err(PortalServiceError::AlreadyHasMentor)));
    assert!(repo.world().pending_for(asha).is_empty());
}
