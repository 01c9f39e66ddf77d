use chrono::Utc;
use uuid::Uuid;

use portal_domain::role::AccountRole;
use portal_mentorship::domain::types::{
    GrantOutcome, MAX_STAFF_ACCOUNTS, MentorRequest, MentorRequestStatus,
};
use portal_mentorship::error::PortalServiceError;
use portal_mentorship::usecase::privilege::{
    AdminQuotaGuard, GrantStaffUseCase, RevokeStaffUseCase,
};

use crate::helpers::{MemoryRepo, staff, student};

fn grant_usecase(repo: &MemoryRepo) -> GrantStaffUseCase<MemoryRepo> {
    GrantStaffUseCase {
        guard: AdminQuotaGuard {
            accounts: repo.clone(),
        },
    }
}

fn staff_count(repo: &MemoryRepo) -> u64 {
    repo.world()
        .accounts
        .values()
        .filter(|a| a.role.is_privileged())
        .count() as u64
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn should_grant_exactly_one_of_parallel_requests_at_three_staff() {
    let repo = MemoryRepo::new();
    let head = repo.add_staff("head@portal.test");
    repo.add_staff("desk@portal.test");
    repo.add_staff("ops@portal.test");
    let candidates: Vec<_> = (0..8)
        .map(|i| repo.add_account(&format!("candidate{i}@portal.test"), AccountRole::Student))
        .collect();

    let handles: Vec<_> = candidates
        .into_iter()
        .map(|id| {
            let uc = grant_usecase(&repo);
            tokio::spawn(async move { uc.execute(staff(head), id).await })
        })
        .collect();

    let mut granted = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(GrantOutcome::Granted) => granted += 1,
            Err(PortalServiceError::QuotaExceeded) => {}
            other => panic!("unexpected result: {other:?}"),
        }
    }

    assert_eq!(granted, 1);
    assert_eq!(staff_count(&repo), MAX_STAFF_ACCOUNTS);
}

#[tokio::test]
async fn should_refuse_grant_when_quota_full() {
    let repo = MemoryRepo::new();
    let head = repo.add_staff("a@portal.test");
    for email in ["b@portal.test", "c@portal.test", "d@portal.test"] {
        repo.add_staff(email);
    }
    let candidate = repo.add_account("e@portal.test", AccountRole::Student);

    let result = grant_usecase(&repo).execute(staff(head), candidate).await;

    assert!(matches!(result, Err(PortalServiceError::QuotaExceeded)));
    assert_eq!(staff_count(&repo), 4);
}

#[tokio::test]
async fn should_report_existing_staff_without_counting_quota() {
    let repo = MemoryRepo::new();
    let head = repo.add_staff("a@portal.test");
    for email in ["b@portal.test", "c@portal.test", "d@portal.test"] {
        repo.add_staff(email);
    }

    let outcome = grant_usecase(&repo).execute(staff(head), head).await.unwrap();
    assert_eq!(outcome, GrantOutcome::AlreadyStaff);
}

#[tokio::test]
async fn should_free_quota_after_revoke() {
    let repo = MemoryRepo::new();
    let head = repo.add_staff("a@portal.test");
    let leaving = repo.add_staff("b@portal.test");
    repo.add_staff("c@portal.test");
    repo.add_staff("d@portal.test");
    let candidate = repo.add_account("e@portal.test", AccountRole::Student);

    RevokeStaffUseCase {
        accounts: repo.clone(),
    }
    .execute(staff(head), leaving)
    .await
    .unwrap();
    let outcome = grant_usecase(&repo)
        .execute(staff(head), candidate)
        .await
        .unwrap();

    assert_eq!(outcome, GrantOutcome::Granted);
    assert_eq!(staff_count(&repo), 4);
}

#[tokio::test]
async fn should_forbid_grant_by_student() {
    let repo = MemoryRepo::new();
    let asha = repo.add_student("Asha");
    let result = grant_usecase(&repo).execute(student(asha), asha).await;
    assert!(matches!(result, Err(PortalServiceError::Forbidden)));
}

#[tokio::test]
async fn should_refuse_grant_to_student_with_active_mentor() {
    let repo = MemoryRepo::new();
    let head = repo.add_staff("a@portal.test");
    let mentor = repo.add_mentor("Dr Rao");
    let asha = repo.add_student("Asha");
    if let Some(s) = repo.world().students.get_mut(&asha) {
        s.mentor_id = Some(mentor);
    }

    let result = grant_usecase(&repo).execute(staff(head), asha).await;

    assert!(
        matches!(result, Err(PortalServiceError::AlreadyHasMentor)),
        "expected AlreadyHasMentor, got {result:?}"
    );
    assert_eq!(
        repo.world().accounts[&asha].role,
        AccountRole::Student,
        "role must be unchanged"
    );
}

#[tokio::test]
async fn should_reject_pending_request_when_granting_staff() {
    let repo = MemoryRepo::new();
    let head = repo.add_staff("a@portal.test");
    let asha = repo.add_student("Asha");
    let now = Utc::now();
    repo.world().requests.push(MentorRequest {
        id: Uuid::now_v7(),
        student_id: asha,
        status: MentorRequestStatus::Pending,
        message: String::new(),
        created_at: now,
        updated_at: now,
    });

    let outcome = grant_usecase(&repo).execute(staff(head), asha).await.unwrap();

    assert_eq!(outcome, GrantOutcome::Granted);
    let world = repo.world();
    assert!(world.pending_for(asha).is_empty());
    assert_eq!(world.requests[0].status, MentorRequestStatus::Rejected);
}
