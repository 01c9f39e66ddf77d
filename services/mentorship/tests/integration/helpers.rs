use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use uuid::Uuid;

use portal_domain::pagination::PageRequest;
use portal_domain::role::AccountRole;
use portal_mentorship::domain::repository::{
    AccountRepository, AssignmentRepository, Clock, ContentRepository, MentorRepository,
    MentorRequestRepository, NotificationPort, ProgramRepository, StudentRepository,
};
use portal_mentorship::domain::types::{
    Account, AcademicRecord, Actor, AssignCommand, AssignmentOutcome, GrantOutcome, Mentor,
    MentorAssignment, MentorContactUpdate, MentorRequest, MentorRequestStatus, MentorSummary,
    NewRegistration, Notification, NotificationError, PageContent, PendingRequest, Program,
    ProgramUpdate, Student, VerificationToken,
};
use portal_mentorship::error::PortalServiceError;

// ── World ────────────────────────────────────────────────────────────────────

/// Whole-store state. Every repository call locks it once, so each call is
/// atomic the way a database transaction is.
#[derive(Default)]
pub struct World {
    pub accounts: HashMap<Uuid, Account>,
    pub students: HashMap<Uuid, Student>,
    pub records: Vec<AcademicRecord>,
    pub tokens: HashMap<String, VerificationToken>,
    pub mentors: HashMap<Uuid, Mentor>,
    pub requests: Vec<MentorRequest>,
    pub assignments: Vec<MentorAssignment>,
    pub contents: HashMap<String, PageContent>,
    pub programs: Vec<Program>,
}

impl World {
    fn student_view(&self, account_id: Uuid) -> Option<Student> {
        let mut student = self.students.get(&account_id)?.clone();
        if let Some(account) = self.accounts.get(&account_id) {
            student.email = account.email.clone();
            student.role = account.role;
        }
        Some(student)
    }

    fn active_count(&self, mentor_id: Uuid) -> u64 {
        self.students
            .values()
            .filter(|s| s.mentor_id == Some(mentor_id))
            .count() as u64
    }

    fn staff_count(&self) -> u64 {
        self.accounts
            .values()
            .filter(|a| a.role.is_privileged())
            .count() as u64
    }

    pub fn pending_for(&self, student_id: Uuid) -> Vec<&MentorRequest> {
        self.requests
            .iter()
            .filter(|r| r.student_id == student_id && r.status == MentorRequestStatus::Pending)
            .collect()
    }

    pub fn history_for(&self, student_id: Uuid) -> Vec<&MentorAssignment> {
        self.assignments
            .iter()
            .filter(|a| a.student_id == student_id)
            .collect()
    }

    pub fn mentor_of(&self, student_id: Uuid) -> Option<Uuid> {
        self.students.get(&student_id).and_then(|s| s.mentor_id)
    }
}

fn page<T: Clone>(items: &[T], page: PageRequest) -> Vec<T> {
    items
        .iter()
        .skip(page.offset() as usize)
        .take(page.limit() as usize)
        .cloned()
        .collect()
}

// ── MemoryRepo ───────────────────────────────────────────────────────────────

/// Implements every repository port over one shared [`World`].
#[derive(Clone, Default)]
pub struct MemoryRepo {
    pub world: Arc<Mutex<World>>,
}

impl MemoryRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn world(&self) -> MutexGuard<'_, World> {
        self.world.lock().unwrap()
    }

    pub fn add_account(&self, email: &str, role: AccountRole) -> Uuid {
        let id = Uuid::now_v7();
        self.world().accounts.insert(
            id,
            Account {
                id,
                email: email.to_owned(),
                display_name: email.to_owned(),
                role,
                created_at: Utc::now(),
            },
        );
        id
    }

    pub fn add_staff(&self, email: &str) -> Uuid {
        self.add_account(email, AccountRole::Staff)
    }

    /// Registered, verified student without a mentor.
    pub fn add_student(&self, name: &str) -> Uuid {
        let email = format!("{}@students.test", name.to_lowercase().replace(' ', "."));
        let id = self.add_account(&email, AccountRole::Student);
        self.insert_profile(id, name, &email, AccountRole::Student);
        id
    }

    /// Staff account that also holds a student profile.
    pub fn add_staff_with_profile(&self, name: &str) -> Uuid {
        let email = format!("{}@staff.test", name.to_lowercase().replace(' ', "."));
        let id = self.add_staff(&email);
        self.insert_profile(id, name, &email, AccountRole::Staff);
        id
    }

    fn insert_profile(&self, id: Uuid, name: &str, email: &str, role: AccountRole) {
        let now = Utc::now();
        self.world().students.insert(
            id,
            Student {
                account_id: id,
                email: email.to_owned(),
                role,
                full_name: name.to_owned(),
                phone: "09876543210".to_owned(),
                city: "Pune".to_owned(),
                pincode: "411001".to_owned(),
                dob: None,
                father_name: String::new(),
                mother_name: String::new(),
                cet_taken: false,
                verified: true,
                mentor_id: None,
                registration_source: "portal".to_owned(),
                created_at: now,
                updated_at: now,
            },
        );
    }

    pub fn add_mentor(&self, name: &str) -> Uuid {
        let id = Uuid::now_v7();
        let now = Utc::now();
        self.world().mentors.insert(
            id,
            Mentor {
                id,
                name: name.to_owned(),
                email: format!("{}@mentors.test", name.to_lowercase().replace(' ', ".")),
                portfolio_url: None,
                chat_group_link: Some("https://chat.test/g/1".to_owned()),
                bio: String::new(),
                created_at: now,
                updated_at: now,
            },
        );
        id
    }

    /// Give the mentor `n` fresh students.
    pub fn fill_mentor(&self, mentor_id: Uuid, n: usize) {
        for i in 0..n {
            let id = self.add_student(&format!("Filler {mentor_id} {i}"));
            if let Some(s) = self.world().students.get_mut(&id) {
                s.mentor_id = Some(mentor_id);
            }
        }
    }
}

impl AccountRepository for MemoryRepo {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, PortalServiceError> {
        Ok(self.world().accounts.get(&id).cloned())
    }

    async fn count_staff(&self) -> Result<u64, PortalServiceError> {
        Ok(self.world().staff_count())
    }

    async fn list_staff_emails(&self) -> Result<Vec<String>, PortalServiceError> {
        Ok(self
            .world()
            .accounts
            .values()
            .filter(|a| a.role.is_privileged())
            .map(|a| a.email.clone())
            .collect())
    }

    async fn grant_staff(
        &self,
        id: Uuid,
        max_staff: u64,
    ) -> Result<GrantOutcome, PortalServiceError> {
        let mut world = self.world();
        let staff = world.staff_count();
        let account = world
            .accounts
            .get(&id)
            .ok_or(PortalServiceError::AccountNotFound)?;
        if account.role.is_privileged() {
            return Ok(GrantOutcome::AlreadyStaff);
        }
        if world.mentor_of(id).is_some() {
            return Err(PortalServiceError::AlreadyHasMentor);
        }
        if staff >= max_staff {
            return Err(PortalServiceError::QuotaExceeded);
        }
        if let Some(account) = world.accounts.get_mut(&id) {
            account.role = AccountRole::Staff;
        }
        let now = Utc::now();
        for request in world
            .requests
            .iter_mut()
            .filter(|r| r.student_id == id && r.status == MentorRequestStatus::Pending)
        {
            request.status = MentorRequestStatus::Rejected;
            request.updated_at = now;
        }
        Ok(GrantOutcome::Granted)
    }

    async fn revoke_staff(&self, id: Uuid) -> Result<bool, PortalServiceError> {
        Ok(match self.world().accounts.get_mut(&id) {
            Some(account) => {
                account.role = AccountRole::Student;
                true
            }
            None => false,
        })
    }
}

impl StudentRepository for MemoryRepo {
    async fn find_by_id(&self, account_id: Uuid) -> Result<Option<Student>, PortalServiceError> {
        Ok(self.world().student_view(account_id))
    }

    async fn email_exists(&self, email: &str) -> Result<bool, PortalServiceError> {
        Ok(self.world().accounts.values().any(|a| a.email == email))
    }

    async fn register(&self, registration: &NewRegistration) -> Result<(), PortalServiceError> {
        let mut world = self.world();
        if world
            .accounts
            .values()
            .any(|a| a.email == registration.account.email)
        {
            return Err(PortalServiceError::EmailAlreadyRegistered);
        }
        world
            .accounts
            .insert(registration.account.id, registration.account.clone());
        world
            .students
            .insert(registration.student.account_id, registration.student.clone());
        world.records.extend(registration.records.iter().cloned());
        world
            .tokens
            .insert(registration.token.token.clone(), registration.token.clone());
        Ok(())
    }

    async fn find_token(&self, token: &str) -> Result<Option<VerificationToken>, PortalServiceError> {
        Ok(self.world().tokens.get(token).cloned())
    }

    async fn mark_verified(&self, account_id: Uuid, token: &str) -> Result<(), PortalServiceError> {
        let mut world = self.world();
        match world.tokens.get(token) {
            Some(t) if t.account_id == account_id => {}
            _ => return Err(PortalServiceError::InvalidToken),
        }
        world.tokens.remove(token);
        if let Some(s) = world.students.get_mut(&account_id) {
            s.verified = true;
        }
        Ok(())
    }

    async fn list_unassigned(&self, p: PageRequest) -> Result<Vec<Student>, PortalServiceError> {
        let world = self.world();
        let mut ids: Vec<Uuid> = world
            .students
            .values()
            .filter(|s| s.mentor_id.is_none())
            .map(|s| s.account_id)
            .collect();
        ids.sort();
        let students: Vec<Student> = ids
            .into_iter()
            .filter_map(|id| world.student_view(id))
            .filter(|s| !s.role.is_privileged())
            .collect();
        Ok(page(&students, p))
    }

    async fn count_registrations(&self) -> Result<u64, PortalServiceError> {
        let world = self.world();
        Ok(world
            .students
            .keys()
            .filter_map(|id| world.student_view(*id))
            .filter(|s| !s.role.is_privileged())
            .count() as u64)
    }

    async fn delete_expired_tokens(&self, now: DateTime<Utc>) -> Result<u64, PortalServiceError> {
        let mut world = self.world();
        let before = world.tokens.len();
        world.tokens.retain(|_, t| !t.is_expired_at(now));
        Ok((before - world.tokens.len()) as u64)
    }
}

impl MentorRepository for MemoryRepo {
    async fn create(&self, mentor: &Mentor) -> Result<(), PortalServiceError> {
        let mut world = self.world();
        if world.mentors.values().any(|m| m.email == mentor.email) {
            return Err(PortalServiceError::MentorEmailTaken);
        }
        world.mentors.insert(mentor.id, mentor.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Mentor>, PortalServiceError> {
        Ok(self.world().mentors.get(&id).cloned())
    }

    async fn active_count(&self, id: Uuid) -> Result<u64, PortalServiceError> {
        Ok(self.world().active_count(id))
    }

    async fn list_with_counts(
        &self,
        p: PageRequest,
    ) -> Result<Vec<MentorSummary>, PortalServiceError> {
        let world = self.world();
        let mut mentors: Vec<Mentor> = world.mentors.values().cloned().collect();
        mentors.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(page(&mentors, p)
            .into_iter()
            .map(|m| MentorSummary {
                active_count: world.active_count(m.id),
                mentor: m,
            })
            .collect())
    }

    async fn count(&self) -> Result<u64, PortalServiceError> {
        Ok(self.world().mentors.len() as u64)
    }

    async fn update_contact(
        &self,
        id: Uuid,
        update: &MentorContactUpdate,
    ) -> Result<Option<Mentor>, PortalServiceError> {
        let mut world = self.world();
        if let Some(email) = &update.email {
            if world
                .mentors
                .values()
                .any(|m| m.id != id && &m.email == email)
            {
                return Err(PortalServiceError::MentorEmailTaken);
            }
        }
        let Some(mentor) = world.mentors.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(email) = &update.email {
            mentor.email = email.clone();
        }
        if let Some(url) = &update.portfolio_url {
            mentor.portfolio_url = url.clone();
        }
        if let Some(link) = &update.chat_group_link {
            mentor.chat_group_link = link.clone();
        }
        mentor.updated_at = Utc::now();
        Ok(Some(mentor.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, PortalServiceError> {
        let mut world = self.world();
        if world.mentors.remove(&id).is_none() {
            return Ok(false);
        }
        for s in world.students.values_mut() {
            if s.mentor_id == Some(id) {
                s.mentor_id = None;
            }
        }
        Ok(true)
    }
}

impl MentorRequestRepository for MemoryRepo {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<MentorRequest>, PortalServiceError> {
        Ok(self.world().requests.iter().find(|r| r.id == id).cloned())
    }

    async fn find_pending_by_student(
        &self,
        student_id: Uuid,
    ) -> Result<Option<MentorRequest>, PortalServiceError> {
        Ok(self
            .world()
            .pending_for(student_id)
            .first()
            .map(|r| (*r).clone()))
    }

    async fn create_pending(&self, request: &MentorRequest) -> Result<(), PortalServiceError> {
        let mut world = self.world();
        let student = world
            .student_view(request.student_id)
            .ok_or(PortalServiceError::StudentNotFound)?;
        if student.role.is_privileged() {
            return Err(PortalServiceError::PrivilegedMentee);
        }
        if student.mentor_id.is_some() {
            return Err(PortalServiceError::AlreadyHasMentor);
        }
        if !world.pending_for(request.student_id).is_empty() {
            return Err(PortalServiceError::DuplicateRequest);
        }
        world.requests.push(request.clone());
        Ok(())
    }

    async fn list_pending(
        &self,
        p: PageRequest,
    ) -> Result<Vec<PendingRequest>, PortalServiceError> {
        let world = self.world();
        let pending: Vec<PendingRequest> = world
            .requests
            .iter()
            .filter(|r| r.status == MentorRequestStatus::Pending)
            .map(|r| {
                let student = world.student_view(r.student_id);
                PendingRequest {
                    request: r.clone(),
                    student_name: student.as_ref().map(|s| s.full_name.clone()).unwrap_or_default(),
                    student_email: student.map(|s| s.email).unwrap_or_default(),
                }
            })
            .collect();
        Ok(page(&pending, p))
    }

    async fn count_pending(&self) -> Result<u64, PortalServiceError> {
        Ok(self
            .world()
            .requests
            .iter()
            .filter(|r| r.status == MentorRequestStatus::Pending)
            .count() as u64)
    }

    async fn reject(&self, id: Uuid) -> Result<MentorRequest, PortalServiceError> {
        let mut world = self.world();
        let request = world
            .requests
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(PortalServiceError::MentorRequestNotFound)?;
        if request.status != MentorRequestStatus::Pending {
            return Err(PortalServiceError::RequestNotPending);
        }
        request.status = MentorRequestStatus::Rejected;
        request.updated_at = Utc::now();
        Ok(request.clone())
    }
}

impl AssignmentRepository for MemoryRepo {
    async fn assign(
        &self,
        command: AssignCommand,
        capacity: u64,
    ) -> Result<AssignmentOutcome, PortalServiceError> {
        let mut world = self.world();
        let mentor = world.mentors.get(&command.mentor_id).cloned();
        let student = world
            .student_view(command.student_id)
            .ok_or(PortalServiceError::StudentNotFound)?;
        if student.role.is_privileged() {
            return Err(PortalServiceError::PrivilegedMentee);
        }
        let mentor = mentor.ok_or(PortalServiceError::MentorNotFound)?;
        if student.mentor_id == Some(mentor.id) {
            return Err(PortalServiceError::MentorAlreadyAssigned);
        }
        if world.active_count(mentor.id) >= capacity {
            return Err(PortalServiceError::CapacityExceeded);
        }

        let now = Utc::now();
        if let Some(s) = world.students.get_mut(&command.student_id) {
            s.mentor_id = Some(mentor.id);
            s.updated_at = now;
        }
        let assignment = MentorAssignment {
            id: Uuid::now_v7(),
            student_id: command.student_id,
            mentor_id: mentor.id,
            mentor_name: mentor.name.clone(),
            assigned_by: command.staff_id,
            assigned_at: now,
        };
        world.assignments.push(assignment.clone());
        let approved_request = world
            .requests
            .iter_mut()
            .find(|r| {
                r.student_id == command.student_id && r.status == MentorRequestStatus::Pending
            })
            .map(|r| {
                r.status = MentorRequestStatus::Approved;
                r.updated_at = now;
                r.id
            });
        let student = world
            .student_view(command.student_id)
            .ok_or(PortalServiceError::StudentNotFound)?;

        Ok(AssignmentOutcome {
            student,
            mentor,
            assignment,
            approved_request,
        })
    }

    async fn unassign(&self, student_id: Uuid) -> Result<Option<Uuid>, PortalServiceError> {
        let mut world = self.world();
        let student = world
            .students
            .get_mut(&student_id)
            .ok_or(PortalServiceError::StudentNotFound)?;
        Ok(student.mentor_id.take())
    }

    async fn history(&self, student_id: Uuid) -> Result<Vec<MentorAssignment>, PortalServiceError> {
        let mut history: Vec<MentorAssignment> = self
            .world()
            .history_for(student_id)
            .into_iter()
            .cloned()
            .collect();
        history.reverse();
        Ok(history)
    }
}

impl ContentRepository for MemoryRepo {
    async fn get(&self, key: &str) -> Result<Option<PageContent>, PortalServiceError> {
        Ok(self.world().contents.get(key).cloned())
    }

    async fn upsert(&self, content: &PageContent) -> Result<(), PortalServiceError> {
        self.world()
            .contents
            .insert(content.key.clone(), content.clone());
        Ok(())
    }
}

impl ProgramRepository for MemoryRepo {
    async fn create(&self, program: &Program) -> Result<(), PortalServiceError> {
        self.world().programs.push(program.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Program>, PortalServiceError> {
        Ok(self.world().programs.iter().find(|p| p.id == id).cloned())
    }

    async fn list(&self, p: PageRequest) -> Result<Vec<Program>, PortalServiceError> {
        Ok(page(&self.world().programs, p))
    }

    async fn update(
        &self,
        id: Uuid,
        update: &ProgramUpdate,
    ) -> Result<Option<Program>, PortalServiceError> {
        let mut world = self.world();
        let Some(program) = world.programs.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        if let Some(name) = &update.name {
            program.name = name.clone();
        }
        if let Some(description) = &update.description {
            program.description = description.clone();
        }
        if let Some(url) = &update.video_url {
            program.video_url = url.clone();
        }
        if let Some(url) = &update.image_url {
            program.image_url = url.clone();
        }
        if let Some(url) = &update.brochure_url {
            program.brochure_url = url.clone();
        }
        Ok(Some(program.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, PortalServiceError> {
        let mut world = self.world();
        let before = world.programs.len();
        world.programs.retain(|p| p.id != id);
        Ok(world.programs.len() != before)
    }
}

// ── Notifier ─────────────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct RecordingNotifier {
    pub sent: Arc<Mutex<Vec<Notification>>>,
    pub fail: bool,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().unwrap().clone()
    }
}

impl NotificationPort for RecordingNotifier {
    async fn notify(&self, notification: Notification) -> Result<bool, NotificationError> {
        if self.fail {
            return Err(NotificationError::Transport(anyhow::anyhow!("smtp down")));
        }
        self.sent.lock().unwrap().push(notification);
        Ok(true)
    }
}

// ── Clock ────────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct ManualClock(pub Arc<Mutex<DateTime<Utc>>>);

impl ManualClock {
    pub fn new() -> Self {
        Self(Arc::new(Mutex::new(
            Utc.with_ymd_and_hms(2026, 10, 1, 9, 0, 0).unwrap(),
        )))
    }

    pub fn advance(&self, secs: i64) {
        *self.0.lock().unwrap() += TimeDelta::seconds(secs);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.0.lock().unwrap()
    }
}

// ── Actors ───────────────────────────────────────────────────────────────────

pub fn staff(account_id: Uuid) -> Actor {
    Actor {
        account_id,
        role: AccountRole::Staff,
    }
}

pub fn student(account_id: Uuid) -> Actor {
    Actor {
        account_id,
        role: AccountRole::Student,
    }
}
