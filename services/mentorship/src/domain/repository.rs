#![allow(async_fn_in_trait)]

use chrono::{DateTime, Utc};
use uuid::Uuid;

use portal_domain::pagination::PageRequest;

use crate::domain::lookup::University;
use crate::domain::types::{
    Account, AssignCommand, AssignmentOutcome, GrantOutcome, Mentor, MentorAssignment,
    MentorContactUpdate, MentorRequest, MentorSummary, NewRegistration, Notification,
    NotificationError, PageContent, PendingRequest, Program, ProgramUpdate, Student,
    VerificationToken,
};
use crate::error::PortalServiceError;

/// Wall clock, injected so window expiry and token expiry are testable.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Counter value with the seconds left until its window closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Counter {
    pub count: u64,
    pub resets_in_secs: u64,
}

/// Fixed-window counters (Redis or in-process).
pub trait CounterStore: Send + Sync {
    /// Current count; `None` when absent or expired. A key found without an
    /// expiry is given `window_secs` so it cannot block its client forever.
    async fn current(
        &self,
        key: &str,
        window_secs: u64,
    ) -> Result<Option<Counter>, PortalServiceError>;

    /// Increment. The expiry is set only when this call creates the key.
    async fn increment(&self, key: &str, window_secs: u64) -> Result<Counter, PortalServiceError>;
}

/// TTL cache for lookup payloads (JSON strings).
pub trait LookupCache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, PortalServiceError>;
    async fn put(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), PortalServiceError>;
}

/// Remote geographic and institution data.
pub trait LookupProvider: Send + Sync {
    async fn states(&self) -> Result<Vec<String>, PortalServiceError>;
    async fn cities(&self, state: &str) -> Result<Vec<String>, PortalServiceError>;
    async fn universities(&self) -> Result<Vec<University>, PortalServiceError>;
}

/// Outbound notifications. `Ok(false)` means accepted but not delivered
/// (for example, the channel is not configured).
pub trait NotificationPort: Send + Sync {
    async fn notify(&self, notification: Notification) -> Result<bool, NotificationError>;
}

pub trait AccountRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, PortalServiceError>;

    async fn count_staff(&self) -> Result<u64, PortalServiceError>;

    async fn list_staff_emails(&self) -> Result<Vec<String>, PortalServiceError>;

    /// Promote to staff. The quota is re-counted under a lock held until
    /// commit; returns `QuotaExceeded` with nothing written when full.
    /// A student with an active mentor is refused with `AlreadyHasMentor`;
    /// a pending mentor request is rejected in the same transaction.
    async fn grant_staff(
        &self,
        id: Uuid,
        max_staff: u64,
    ) -> Result<GrantOutcome, PortalServiceError>;

    /// Demote to student. Returns `false` if the account does not exist.
    async fn revoke_staff(&self, id: Uuid) -> Result<bool, PortalServiceError>;
}

pub trait StudentRepository: Send + Sync {
    async fn find_by_id(&self, account_id: Uuid) -> Result<Option<Student>, PortalServiceError>;

    async fn email_exists(&self, email: &str) -> Result<bool, PortalServiceError>;

    /// Write account, profile, records, token and log atomically.
    /// A racing duplicate email maps to `EmailAlreadyRegistered`.
    async fn register(&self, registration: &NewRegistration) -> Result<(), PortalServiceError>;

    async fn find_token(&self, token: &str) -> Result<Option<VerificationToken>, PortalServiceError>;

    /// Mark verified and consume the token in one transaction.
    async fn mark_verified(&self, account_id: Uuid, token: &str) -> Result<(), PortalServiceError>;

    async fn list_unassigned(&self, page: PageRequest) -> Result<Vec<Student>, PortalServiceError>;

    /// Registrations from non-staff accounts.
    async fn count_registrations(&self) -> Result<u64, PortalServiceError>;

    /// Delete verification tokens that expired before `now`. Returns the
    /// number removed.
    async fn delete_expired_tokens(&self, now: DateTime<Utc>) -> Result<u64, PortalServiceError>;
}

pub trait MentorRepository: Send + Sync {
    /// Returns `MentorEmailTaken` on a duplicate email.
    async fn create(&self, mentor: &Mentor) -> Result<(), PortalServiceError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Mentor>, PortalServiceError>;

    async fn active_count(&self, id: Uuid) -> Result<u64, PortalServiceError>;

    async fn list_with_counts(
        &self,
        page: PageRequest,
    ) -> Result<Vec<MentorSummary>, PortalServiceError>;

    async fn count(&self) -> Result<u64, PortalServiceError>;

    async fn update_contact(
        &self,
        id: Uuid,
        update: &MentorContactUpdate,
    ) -> Result<Option<Mentor>, PortalServiceError>;

    /// Delete and clear the active-mentor reference of its students. Audit
    /// rows are kept. Returns `false` if the mentor does not exist.
    async fn delete(&self, id: Uuid) -> Result<bool, PortalServiceError>;
}

pub trait MentorRequestRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<MentorRequest>, PortalServiceError>;

    async fn find_pending_by_student(
        &self,
        student_id: Uuid,
    ) -> Result<Option<MentorRequest>, PortalServiceError>;

    /// Insert a pending request after re-checking, under the student row
    /// lock, that the student is not staff (`PrivilegedMentee`) and has no
    /// mentor (`AlreadyHasMentor`). The pending-per-student unique index turns
    /// a concurrent duplicate into `DuplicateRequest`.
    async fn create_pending(&self, request: &MentorRequest) -> Result<(), PortalServiceError>;

    async fn list_pending(&self, page: PageRequest)
    -> Result<Vec<PendingRequest>, PortalServiceError>;

    async fn count_pending(&self) -> Result<u64, PortalServiceError>;

    /// pending → rejected. `RequestNotPending` for any other state.
    async fn reject(&self, id: Uuid) -> Result<MentorRequest, PortalServiceError>;
}

pub trait AssignmentRepository: Send + Sync {
    /// One transaction: lock the mentor, re-check every precondition, set the
    /// student's mentor, append the audit row and approve the pending request.
    async fn assign(
        &self,
        command: AssignCommand,
        capacity: u64,
    ) -> Result<AssignmentOutcome, PortalServiceError>;

    /// Clear the active mentor. Returns the previous mentor id.
    async fn unassign(&self, student_id: Uuid) -> Result<Option<Uuid>, PortalServiceError>;

    async fn history(&self, student_id: Uuid) -> Result<Vec<MentorAssignment>, PortalServiceError>;
}

pub trait ContentRepository: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<PageContent>, PortalServiceError>;
    async fn upsert(&self, content: &PageContent) -> Result<(), PortalServiceError>;
}

pub trait ProgramRepository: Send + Sync {
    async fn create(&self, program: &Program) -> Result<(), PortalServiceError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Program>, PortalServiceError>;

    /// Oldest first.
    async fn list(&self, page: PageRequest) -> Result<Vec<Program>, PortalServiceError>;

    /// Returns `None` if the program does not exist.
    async fn update(
        &self,
        id: Uuid,
        update: &ProgramUpdate,
    ) -> Result<Option<Program>, PortalServiceError>;

    /// Returns `false` if the program does not exist.
    async fn delete(&self, id: Uuid) -> Result<bool, PortalServiceError>;
}
