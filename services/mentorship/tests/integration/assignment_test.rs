use uuid::Uuid;

use portal_mentorship::domain::types::{
    MENTOR_CAPACITY, MentorRequestStatus, NotificationChannel, NotificationTemplate,
};
use portal_mentorship::error::PortalServiceError;
use portal_mentorship::usecase::assignment::{AssignMentorUseCase, UnassignMentorUseCase};
use portal_mentorship::usecase::mentor::{DeleteMentorUseCase, MentorDirectory};
use portal_mentorship::usecase::mentor_request::SubmitMentorRequestUseCase;

use crate::helpers::{MemoryRepo, RecordingNotifier, staff, student};

type Assign = AssignMentorUseCase<MemoryRepo, MemoryRepo, MemoryRepo, RecordingNotifier>;

fn assign_usecase(repo: &MemoryRepo, notifier: &RecordingNotifier) -> Assign {
    AssignMentorUseCase {
        assignments: repo.clone(),
        students: repo.clone(),
        mentors: repo.clone(),
        notifier: notifier.clone(),
    }
}

async fn request_mentor(repo: &MemoryRepo, student_id: Uuid) {
    SubmitMentorRequestUseCase {
        students: repo.clone(),
        requests: repo.clone(),
        accounts: repo.clone(),
        notifier: RecordingNotifier::default(),
    }
    .execute(student(student_id), None)
    .await
    .unwrap();
}

#[tokio::test]
async fn should_assign_audit_and_approve_in_one_step() {
    let repo = MemoryRepo::new();
    let notifier = RecordingNotifier::default();
    let head = repo.add_staff("head@portal.test");
    let asha = repo.add_student("Asha");
    let ravi = repo.add_mentor("Ravi");
    request_mentor(&repo, asha).await;

    let outcome = assign_usecase(&repo, &notifier)
        .execute(staff(head), asha, ravi)
        .await
        .unwrap();

    let world = repo.world();
    assert_eq!(world.mentor_of(asha), Some(ravi));
    let history = world.history_for(asha);
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].mentor_name, "Ravi");
    assert_eq!(history[0].assigned_by, head);
    assert!(world.pending_for(asha).is_empty());
    let approved = world
        .requests
        .iter()
        .find(|r| Some(r.id) == outcome.approved_request)
        .unwrap();
    assert_eq!(approved.status, MentorRequestStatus::Approved);
}

#[tokio::test]
async fn should_change_nothing_when_mentor_is_full() {
    let repo = MemoryRepo::new();
    let notifier = RecordingNotifier::default();
    let head = repo.add_staff("head@portal.test");
    let asha = repo.add_student("Asha");
    let ravi = repo.add_mentor("Ravi");
    repo.fill_mentor(ravi, MENTOR_CAPACITY as usize);
    request_mentor(&repo, asha).await;

    let result = assign_usecase(&repo, &notifier)
        .execute(staff(head), asha, ravi)
        .await;

    assert!(matches!(result, Err(PortalServiceError::CapacityExceeded)));
    let world = repo.world();
    assert_eq!(world.mentor_of(asha), None);
    assert!(world.history_for(asha).is_empty());
    assert_eq!(world.pending_for(asha).len(), 1);
    assert!(notifier.sent().is_empty());
}

#[tokio::test]
async fn should_accept_tenth_and_refuse_eleventh_student() {
    let repo = MemoryRepo::new();
    let notifier = RecordingNotifier::default();
    let head = repo.add_staff("head@portal.test");
    let ravi = repo.add_mentor("Ravi");
    repo.fill_mentor(ravi, 9);
    let directory = MentorDirectory {
        mentors: repo.clone(),
    };
    assert!(directory.is_available(ravi).await.unwrap());

    let tenth = repo.add_student("Tenth");
    assign_usecase(&repo, &notifier)
        .execute(staff(head), tenth, ravi)
        .await
        .unwrap();
    assert!(!directory.is_available(ravi).await.unwrap());

    let eleventh = repo.add_student("Eleventh");
    let result = assign_usecase(&repo, &notifier)
        .execute(staff(head), eleventh, ravi)
        .await;
    assert!(matches!(result, Err(PortalServiceError::CapacityExceeded)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn should_not_overfill_mentor_under_concurrency() {
    let repo = MemoryRepo::new();
    let notifier = RecordingNotifier::default();
    let head = repo.add_staff("head@portal.test");
    let ravi = repo.add_mentor("Ravi");
    repo.fill_mentor(ravi, 8);
    let students: Vec<_> = (0..6)
        .map(|i| repo.add_student(&format!("Student {i}")))
        .collect();

    let handles: Vec<_> = students
        .into_iter()
        .map(|id| {
            let uc = assign_usecase(&repo, &notifier);
            tokio::spawn(async move { uc.execute(staff(head), id, ravi).await })
        })
        .collect();

    let mut assigned = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => assigned += 1,
            Err(PortalServiceError::CapacityExceeded) => {}
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }

    assert_eq!(assigned, 2);
    let world = repo.world();
    let active = world
        .students
        .values()
        .filter(|s| s.mentor_id == Some(ravi))
        .count() as u64;
    assert_eq!(active, MENTOR_CAPACITY);
}

#[tokio::test]
async fn should_refuse_staff_target_before_other_checks() {
    let repo = MemoryRepo::new();
    let notifier = RecordingNotifier::default();
    let head = repo.add_staff("head@portal.test");
    let colleague = repo.add_staff_with_profile("Colleague");
    let ravi = repo.add_mentor("Ravi");
    repo.fill_mentor(ravi, MENTOR_CAPACITY as usize);

    // Full mentor and unknown mentor both lose to the privilege check.
    for mentor in [ravi, Uuid::now_v7()] {
        let result = assign_usecase(&repo, &notifier)
            .execute(staff(head), colleague, mentor)
            .await;
        assert!(
            matches!(result, Err(PortalServiceError::PrivilegedMentee)),
            "expected PrivilegedMentee, got {result:?}"
        );
    }
    assert!(repo.world().history_for(colleague).is_empty());
}

#[tokio::test]
async fn should_send_student_messaging_and_mentor_notifications() {
    let repo = MemoryRepo::new();
    let notifier = RecordingNotifier::default();
    let head = repo.add_staff("head@portal.test");
    let asha = repo.add_student("Asha");
    let ravi = repo.add_mentor("Ravi");

    assign_usecase(&repo, &notifier)
        .execute(staff(head), asha, ravi)
        .await
        .unwrap();

    let sent = notifier.sent();
    assert_eq!(sent.len(), 3);
    assert!(sent.iter().any(|n| n.channel == NotificationChannel::Messaging
        && n.recipient == "+919876543210"));
    assert!(sent.iter().any(|n| n.template == NotificationTemplate::MenteeAssigned
        && n.recipient == "ravi@mentors.test"));
}

#[tokio::test]
async fn should_commit_assignment_when_notifier_fails() {
    let repo = MemoryRepo::new();
    let head = repo.add_staff("head@portal.test");
    let asha = repo.add_student("Asha");
    let ravi = repo.add_mentor("Ravi");

    assign_usecase(&repo, &RecordingNotifier::failing())
        .execute(staff(head), asha, ravi)
        .await
        .unwrap();

    assert_eq!(repo.world().mentor_of(asha), Some(ravi));
}

#[tokio::test]
async fn should_keep_history_after_unassign_and_reassign() {
    let repo = MemoryRepo::new();
    let notifier = RecordingNotifier::default();
    let head = repo.add_staff("head@portal.test");
    let asha = repo.add_student("Asha");
    let ravi = repo.add_mentor("Ravi");
    let meera = repo.add_mentor("Meera");
    let uc = assign_usecase(&repo, &notifier);

    uc.execute(staff(head), asha, ravi).await.unwrap();
    let previous = UnassignMentorUseCase {
        assignments: repo.clone(),
    }
    .execute(staff(head), asha)
    .await
    .unwrap();
    assert_eq!(previous, Some(ravi));
    uc.execute(staff(head), asha, meera).await.unwrap();

    let world = repo.world();
    assert_eq!(world.mentor_of(asha), Some(meera));
    let names: Vec<&str> = world
        .history_for(asha)
        .iter()
        .map(|a| a.mentor_name.as_str())
        .collect();
    assert_eq!(names, vec!["Ravi", "Meera"]);
}

#[tokio::test]
async fn should_release_students_when_mentor_deleted() {
    let repo = MemoryRepo::new();
    let notifier = RecordingNotifier::default();
    let head = repo.add_staff("head@portal.test");
    let asha = repo.add_student("Asha");
    let ravi = repo.add_mentor("Ravi");
    assign_usecase(&repo, &notifier)
        .execute(staff(head), asha, ravi)
        .await
        .unwrap();

    DeleteMentorUseCase {
        mentors: repo.clone(),
    }
    .execute(staff(head), ravi)
    .await
    .unwrap();

    let world = repo.world();
    assert_eq!(world.mentor_of(asha), None);
    assert_eq!(world.history_for(asha).len(), 1);
}
