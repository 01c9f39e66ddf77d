use std::collections::HashMap;

use anyhow::Context as _;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    FromQueryResult, IntoActiveModel as _, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    TransactionError, TransactionTrait,
    sea_query::{Expr, OnConflict},
};
use uuid::Uuid;

use portal_core::sea_ext::{advisory_xact_lock, is_unique_violation};
use portal_domain::pagination::PageRequest;
use portal_domain::role::AccountRole;
use portal_mentorship_schema::{
    academic_records, accounts, mentor_assignments, mentor_requests, mentors, page_contents,
    programs, registration_logs, students, verification_tokens,
};

use crate::domain::repository::{
    AccountRepository, AssignmentRepository, ContentRepository, MentorRepository,
    MentorRequestRepository, ProgramRepository, StudentRepository,
};
use crate::domain::types::{
    Account, AssignCommand, AssignmentOutcome, GrantOutcome, Mentor, MentorAssignment,
    MentorContactUpdate, MentorRequest, MentorRequestStatus, MentorSummary, NewRegistration,
    PageContent, PendingRequest, Program, ProgramUpdate, STAFF_QUOTA_LOCK_KEY, Student,
    VerificationToken,
};
use crate::error::PortalServiceError;

const STAFF_ROLE: i16 = AccountRole::Staff as i16;
const STUDENT_ROLE: i16 = AccountRole::Student as i16;
const PENDING: &str = "pending";

// ── Account repository ───────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbAccountRepository {
    pub db: DatabaseConnection,
}

impl AccountRepository for DbAccountRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, PortalServiceError> {
        let model = accounts::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find account by id")?;
        model.map(account_from_model).transpose()
    }

    async fn count_staff(&self) -> Result<u64, PortalServiceError> {
        let count = accounts::Entity::find()
            .filter(accounts::Column::Role.eq(STAFF_ROLE))
            .count(&self.db)
            .await
            .context("count staff accounts")?;
        Ok(count)
    }

    async fn list_staff_emails(&self) -> Result<Vec<String>, PortalServiceError> {
        let emails = accounts::Entity::find()
            .select_only()
            .column(accounts::Column::Email)
            .filter(accounts::Column::Role.eq(STAFF_ROLE))
            .into_tuple::<String>()
            .all(&self.db)
            .await
            .context("list staff emails")?;
        Ok(emails)
    }

    async fn grant_staff(
        &self,
        id: Uuid,
        max_staff: u64,
    ) -> Result<GrantOutcome, PortalServiceError> {
        let txn = self.db.begin().await.context("begin grant staff")?;
        // Every grant serializes here, so the count below cannot go stale
        // before commit.
        advisory_xact_lock(&txn, STAFF_QUOTA_LOCK_KEY)
            .await
            .context("acquire staff quota lock")?;

        // Student row before account row, the order assignment locks them in.
        let student = students::Entity::find_by_id(id)
            .lock_exclusive()
            .one(&txn)
            .await
            .context("lock student for grant")?;
        let account = accounts::Entity::find_by_id(id)
            .lock_exclusive()
            .one(&txn)
            .await
            .context("lock account for grant")?
            .ok_or(PortalServiceError::AccountNotFound)?;
        if account.role == STAFF_ROLE {
            return Ok(GrantOutcome::AlreadyStaff);
        }
        if student.is_some_and(|s| s.mentor_id.is_some()) {
            return Err(PortalServiceError::AlreadyHasMentor);
        }

        let staff = accounts::Entity::find()
            .filter(accounts::Column::Role.eq(STAFF_ROLE))
            .count(&txn)
            .await
            .context("count staff accounts in grant")?;
        if staff >= max_staff {
            return Err(PortalServiceError::QuotaExceeded);
        }

        let mut am = account.into_active_model();
        am.role = Set(STAFF_ROLE);
        am.update(&txn).await.context("promote account to staff")?;

        // Staff can never be assigned, so an open request would stay pending.
        mentor_requests::Entity::update_many()
            .col_expr(
                mentor_requests::Column::Status,
                Expr::value(MentorRequestStatus::Rejected.as_str()),
            )
            .col_expr(mentor_requests::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(mentor_requests::Column::StudentId.eq(id))
            .filter(mentor_requests::Column::Status.eq(PENDING))
            .exec(&txn)
            .await
            .context("reject pending request of new staff")?;
        txn.commit().await.context("commit grant staff")?;
        Ok(GrantOutcome::Granted)
    }

    async fn revoke_staff(&self, id: Uuid) -> Result<bool, PortalServiceError> {
        let result = accounts::Entity::update_many()
            .col_expr(accounts::Column::Role, Expr::value(STUDENT_ROLE))
            .filter(accounts::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .context("revoke staff")?;
        Ok(result.rows_affected > 0)
    }
}

fn role_from_db(value: i16) -> Result<AccountRole, PortalServiceError> {
    u8::try_from(value)
        .ok()
        .and_then(AccountRole::from_u8)
        .ok_or_else(|| anyhow::anyhow!("unknown account role {value}").into())
}

fn account_from_model(model: accounts::Model) -> Result<Account, PortalServiceError> {
    Ok(Account {
        id: model.id,
        email: model.email,
        display_name: model.display_name,
        role: role_from_db(model.role)?,
        created_at: model.created_at,
    })
}

// ── Student repository ───────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbStudentRepository {
    pub db: DatabaseConnection,
}

impl StudentRepository for DbStudentRepository {
    async fn find_by_id(&self, account_id: Uuid) -> Result<Option<Student>, PortalServiceError> {
        let row = students::Entity::find_by_id(account_id)
            .find_also_related(accounts::Entity)
            .one(&self.db)
            .await
            .context("find student by id")?;
        match row {
            Some((student, Some(account))) => Ok(Some(student_from_models(student, account)?)),
            Some((_, None)) => Err(anyhow::anyhow!("student {account_id} has no account").into()),
            None => Ok(None),
        }
    }

    async fn email_exists(&self, email: &str) -> Result<bool, PortalServiceError> {
        let count = accounts::Entity::find()
            .filter(accounts::Column::Email.eq(email))
            .count(&self.db)
            .await
            .context("check account email")?;
        Ok(count > 0)
    }

    async fn register(&self, registration: &NewRegistration) -> Result<(), PortalServiceError> {
        let reg = registration.clone();
        self.db
            .transaction::<_, (), DbErr>(|txn| {
                Box::pin(async move {
                    accounts::ActiveModel {
                        id: Set(reg.account.id),
                        email: Set(reg.account.email.clone()),
                        display_name: Set(reg.account.display_name.clone()),
                        role: Set(reg.account.role as i16),
                        created_at: Set(reg.account.created_at),
                    }
                    .insert(txn)
                    .await?;

                    let s = &reg.student;
                    students::ActiveModel {
                        account_id: Set(s.account_id),
                        full_name: Set(s.full_name.clone()),
                        phone: Set(s.phone.clone()),
                        city: Set(s.city.clone()),
                        pincode: Set(s.pincode.clone()),
                        dob: Set(s.dob),
                        father_name: Set(s.father_name.clone()),
                        mother_name: Set(s.mother_name.clone()),
                        cet_taken: Set(s.cet_taken),
                        verified: Set(s.verified),
                        mentor_id: Set(None),
                        registration_source: Set(s.registration_source.clone()),
                        created_at: Set(s.created_at),
                        updated_at: Set(s.updated_at),
                    }
                    .insert(txn)
                    .await?;

                    if !reg.records.is_empty() {
                        let rows = reg.records.iter().map(|r| academic_records::ActiveModel {
                            id: Set(r.id),
                            account_id: Set(r.account_id),
                            level: Set(r.level.as_str().to_owned()),
                            degree: Set(r.degree.clone()),
                            institution: Set(r.institution.clone()),
                            year: Set(r.year),
                            percentage: Set(r.percentage),
                            created_at: Set(r.created_at),
                        });
                        academic_records::Entity::insert_many(rows).exec(txn).await?;
                    }

                    verification_tokens::ActiveModel {
                        token: Set(reg.token.token.clone()),
                        account_id: Set(reg.token.account_id),
                        expires_at: Set(reg.token.expires_at),
                        created_at: Set(reg.token.created_at),
                    }
                    .insert(txn)
                    .await?;

                    registration_logs::ActiveModel {
                        id: Set(Uuid::now_v7()),
                        account_id: Set(Some(reg.account.id)),
                        ip: Set(reg.ip.clone()),
                        status: Set("submitted".to_owned()),
                        created_at: Set(reg.account.created_at),
                    }
                    .insert(txn)
                    .await?;

                    Ok(())
                })
            })
            .await
            .map_err(|e| match e {
                TransactionError::Transaction(ref db) if is_unique_violation(db) => {
                    PortalServiceError::EmailAlreadyRegistered
                }
                other => anyhow::Error::new(other).context("register student").into(),
            })
    }

    async fn find_token(&self, token: &str) -> Result<Option<VerificationToken>, PortalServiceError> {
        let model = verification_tokens::Entity::find_by_id(token.to_owned())
            .one(&self.db)
            .await
            .context("find verification token")?;
        Ok(model.map(|m| VerificationToken {
            token: m.token,
            account_id: m.account_id,
            expires_at: m.expires_at,
            created_at: m.created_at,
        }))
    }

    async fn mark_verified(&self, account_id: Uuid, token: &str) -> Result<(), PortalServiceError> {
        let txn = self.db.begin().await.context("begin verify email")?;
        let consumed = verification_tokens::Entity::delete_many()
            .filter(verification_tokens::Column::Token.eq(token))
            .filter(verification_tokens::Column::AccountId.eq(account_id))
            .exec(&txn)
            .await
            .context("consume verification token")?;
        // A concurrent verification already used it.
        if consumed.rows_affected == 0 {
            return Err(PortalServiceError::InvalidToken);
        }
        students::Entity::update_many()
            .col_expr(students::Column::Verified, Expr::value(true))
            .col_expr(students::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(students::Column::AccountId.eq(account_id))
            .exec(&txn)
            .await
            .context("mark student verified")?;
        txn.commit().await.context("commit verify email")?;
        Ok(())
    }

    async fn list_unassigned(&self, page: PageRequest) -> Result<Vec<Student>, PortalServiceError> {
        let rows = students::Entity::find()
            .find_also_related(accounts::Entity)
            .filter(students::Column::MentorId.is_null())
            .filter(accounts::Column::Role.eq(STUDENT_ROLE))
            .order_by_asc(students::Column::CreatedAt)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .context("list unassigned students")?;
        rows.into_iter()
            .filter_map(|(s, a)| a.map(|a| student_from_models(s, a)))
            .collect()
    }

    async fn count_registrations(&self) -> Result<u64, PortalServiceError> {
        let count = students::Entity::find()
            .inner_join(accounts::Entity)
            .filter(accounts::Column::Role.eq(STUDENT_ROLE))
            .count(&self.db)
            .await
            .context("count registrations")?;
        Ok(count)
    }

    async fn delete_expired_tokens(&self, now: DateTime<Utc>) -> Result<u64, PortalServiceError> {
        let deleted = verification_tokens::Entity::delete_many()
            .filter(verification_tokens::Column::ExpiresAt.lte(now))
            .exec(&self.db)
            .await
            .context("delete expired verification tokens")?;
        Ok(deleted.rows_affected)
    }
}

fn student_from_models(
    model: students::Model,
    account: accounts::Model,
) -> Result<Student, PortalServiceError> {
    Ok(Student {
        account_id: model.account_id,
        email: account.email,
        role: role_from_db(account.role)?,
        full_name: model.full_name,
        phone: model.phone,
        city: model.city,
        pincode: model.pincode,
        dob: model.dob,
        father_name: model.father_name,
        mother_name: model.mother_name,
        cet_taken: model.cet_taken,
        verified: model.verified,
        mentor_id: model.mentor_id,
        registration_source: model.registration_source,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

// ── Mentor repository ────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbMentorRepository {
    pub db: DatabaseConnection,
}

#[derive(Debug, FromQueryResult)]
struct ActiveCountRow {
    mentor_id: Option<Uuid>,
    active: i64,
}

impl MentorRepository for DbMentorRepository {
    async fn create(&self, mentor: &Mentor) -> Result<(), PortalServiceError> {
        mentors::ActiveModel {
            id: Set(mentor.id),
            name: Set(mentor.name.clone()),
            email: Set(mentor.email.clone()),
            portfolio_url: Set(mentor.portfolio_url.clone()),
            chat_group_link: Set(mentor.chat_group_link.clone()),
            bio: Set(mentor.bio.clone()),
            created_at: Set(mentor.created_at),
            updated_at: Set(mentor.updated_at),
        }
        .insert(&self.db)
        .await
        .map_err(|e| mentor_write_error(e, "create mentor"))?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Mentor>, PortalServiceError> {
        let model = mentors::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find mentor by id")?;
        Ok(model.map(mentor_from_model))
    }

    async fn active_count(&self, id: Uuid) -> Result<u64, PortalServiceError> {
        let count = students::Entity::find()
            .filter(students::Column::MentorId.eq(id))
            .count(&self.db)
            .await
            .context("count mentor students")?;
        Ok(count)
    }

    async fn list_with_counts(
        &self,
        page: PageRequest,
    ) -> Result<Vec<MentorSummary>, PortalServiceError> {
        let models = mentors::Entity::find()
            .order_by_asc(mentors::Column::Name)
            .order_by_asc(mentors::Column::Id)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .context("list mentors")?;
        if models.is_empty() {
            return Ok(vec![]);
        }

        let ids: Vec<Uuid> = models.iter().map(|m| m.id).collect();
        let counts: HashMap<Uuid, u64> = students::Entity::find()
            .select_only()
            .column(students::Column::MentorId)
            .column_as(Expr::col(students::Column::AccountId).count(), "active")
            .filter(students::Column::MentorId.is_in(ids))
            .group_by(students::Column::MentorId)
            .into_model::<ActiveCountRow>()
            .all(&self.db)
            .await
            .context("count students per mentor")?
            .into_iter()
            .filter_map(|row| row.mentor_id.map(|id| (id, row.active.max(0) as u64)))
            .collect();

        Ok(models
            .into_iter()
            .map(|m| {
                let active_count = counts.get(&m.id).copied().unwrap_or(0);
                MentorSummary {
                    mentor: mentor_from_model(m),
                    active_count,
                }
            })
            .collect())
    }

    async fn count(&self) -> Result<u64, PortalServiceError> {
        let count = mentors::Entity::find()
            .count(&self.db)
            .await
            .context("count mentors")?;
        Ok(count)
    }

    async fn update_contact(
        &self,
        id: Uuid,
        update: &MentorContactUpdate,
    ) -> Result<Option<Mentor>, PortalServiceError> {
        let Some(model) = mentors::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find mentor for update")?
        else {
            return Ok(None);
        };

        let mut am = model.into_active_model();
        if let Some(email) = &update.email {
            am.email = Set(email.clone());
        }
        if let Some(url) = &update.portfolio_url {
            am.portfolio_url = Set(url.clone());
        }
        if let Some(link) = &update.chat_group_link {
            am.chat_group_link = Set(link.clone());
        }
        am.updated_at = Set(Utc::now());
        let updated = am
            .update(&self.db)
            .await
            .map_err(|e| mentor_write_error(e, "update mentor contact"))?;
        Ok(Some(mentor_from_model(updated)))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, PortalServiceError> {
        let txn = self.db.begin().await.context("begin delete mentor")?;
        // Same lock order as assignment: mentor row first, then students.
        let Some(_) = mentors::Entity::find_by_id(id)
            .lock_exclusive()
            .one(&txn)
            .await
            .context("lock mentor for delete")?
        else {
            return Ok(false);
        };

        let cleared = students::Entity::update_many()
            .col_expr(students::Column::MentorId, Expr::value(Option::<Uuid>::None))
            .col_expr(students::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(students::Column::MentorId.eq(id))
            .exec(&txn)
            .await
            .context("unassign students of deleted mentor")?;
        mentors::Entity::delete_by_id(id)
            .exec(&txn)
            .await
            .context("delete mentor")?;
        txn.commit().await.context("commit delete mentor")?;

        tracing::info!(mentor_id = %id, unassigned = cleared.rows_affected, "mentor removed");
        Ok(true)
    }
}

fn mentor_write_error(e: DbErr, what: &'static str) -> PortalServiceError {
    if is_unique_violation(&e) {
        PortalServiceError::MentorEmailTaken
    } else {
        anyhow::Error::new(e).context(what).into()
    }
}

fn mentor_from_model(model: mentors::Model) -> Mentor {
    Mentor {
        id: model.id,
        name: model.name,
        email: model.email,
        portfolio_url: model.portfolio_url,
        chat_group_link: model.chat_group_link,
        bio: model.bio,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

// ── Mentor request repository ────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbMentorRequestRepository {
    pub db: DatabaseConnection,
}

impl MentorRequestRepository for DbMentorRequestRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<MentorRequest>, PortalServiceError> {
        let model = mentor_requests::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find mentor request by id")?;
        model.map(request_from_model).transpose()
    }

    async fn find_pending_by_student(
        &self,
        student_id: Uuid,
    ) -> Result<Option<MentorRequest>, PortalServiceError> {
        let model = mentor_requests::Entity::find()
            .filter(mentor_requests::Column::StudentId.eq(student_id))
            .filter(mentor_requests::Column::Status.eq(PENDING))
            .one(&self.db)
            .await
            .context("find pending mentor request")?;
        model.map(request_from_model).transpose()
    }

    async fn create_pending(&self, request: &MentorRequest) -> Result<(), PortalServiceError> {
        let txn = self.db.begin().await.context("begin mentor request")?;

        // Holding the student row keeps a concurrent assignment or grant from
        // committing between these checks and the insert.
        let student = students::Entity::find_by_id(request.student_id)
            .lock_exclusive()
            .one(&txn)
            .await
            .context("lock student for mentor request")?
            .ok_or(PortalServiceError::StudentNotFound)?;
        let account = accounts::Entity::find_by_id(request.student_id)
            .lock_shared()
            .one(&txn)
            .await
            .context("load requesting account")?
            .ok_or(PortalServiceError::StudentNotFound)?;
        if account.role == STAFF_ROLE {
            return Err(PortalServiceError::PrivilegedMentee);
        }
        if student.mentor_id.is_some() {
            return Err(PortalServiceError::AlreadyHasMentor);
        }

        mentor_requests::ActiveModel {
            id: Set(request.id),
            student_id: Set(request.student_id),
            status: Set(MentorRequestStatus::Pending.as_str().to_owned()),
            message: Set(request.message.clone()),
            created_at: Set(request.created_at),
            updated_at: Set(request.updated_at),
        }
        .insert(&txn)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                PortalServiceError::DuplicateRequest
            } else {
                anyhow::Error::new(e).context("create mentor request").into()
            }
        })?;
        txn.commit().await.context("commit mentor request")?;
        Ok(())
    }

    async fn list_pending(
        &self,
        page: PageRequest,
    ) -> Result<Vec<PendingRequest>, PortalServiceError> {
        let rows = mentor_requests::Entity::find()
            .find_also_related(students::Entity)
            .filter(mentor_requests::Column::Status.eq(PENDING))
            .order_by_asc(mentor_requests::Column::CreatedAt)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .context("list pending mentor requests")?;

        let student_ids: Vec<Uuid> = rows.iter().map(|(r, _)| r.student_id).collect();
        let emails: HashMap<Uuid, String> = accounts::Entity::find()
            .filter(accounts::Column::Id.is_in(student_ids))
            .all(&self.db)
            .await
            .context("load requesting accounts")?
            .into_iter()
            .map(|a| (a.id, a.email))
            .collect();

        rows.into_iter()
            .map(|(request, student)| {
                let student_email = emails.get(&request.student_id).cloned().unwrap_or_default();
                Ok(PendingRequest {
                    student_name: student.map(|s| s.full_name).unwrap_or_default(),
                    student_email,
                    request: request_from_model(request)?,
                })
            })
            .collect()
    }

    async fn count_pending(&self) -> Result<u64, PortalServiceError> {
        let count = mentor_requests::Entity::find()
            .filter(mentor_requests::Column::Status.eq(PENDING))
            .count(&self.db)
            .await
            .context("count pending mentor requests")?;
        Ok(count)
    }

    async fn reject(&self, id: Uuid) -> Result<MentorRequest, PortalServiceError> {
        let txn = self.db.begin().await.context("begin reject request")?;
        let model = mentor_requests::Entity::find_by_id(id)
            .lock_exclusive()
            .one(&txn)
            .await
            .context("lock mentor request")?
            .ok_or(PortalServiceError::MentorRequestNotFound)?;
        if model.status != PENDING {
            return Err(PortalServiceError::RequestNotPending);
        }

        let mut am = model.into_active_model();
        am.status = Set(MentorRequestStatus::Rejected.as_str().to_owned());
        am.updated_at = Set(Utc::now());
        let updated = am.update(&txn).await.context("reject mentor request")?;
        txn.commit().await.context("commit reject request")?;
        request_from_model(updated)
    }
}

fn request_from_model(model: mentor_requests::Model) -> Result<MentorRequest, PortalServiceError> {
    let status = MentorRequestStatus::parse(&model.status)
        .ok_or_else(|| anyhow::anyhow!("unknown mentor request status {}", model.status))?;
    Ok(MentorRequest {
        id: model.id,
        student_id: model.student_id,
        status,
        message: model.message,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

// ── Assignment repository ────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbAssignmentRepository {
    pub db: DatabaseConnection,
}

impl AssignmentRepository for DbAssignmentRepository {
    async fn assign(
        &self,
        command: AssignCommand,
        capacity: u64,
    ) -> Result<AssignmentOutcome, PortalServiceError> {
        let AssignCommand {
            staff_id,
            student_id,
            mentor_id,
        } = command;
        let now = Utc::now();
        let txn = self.db.begin().await.context("begin assign mentor")?;

        // Concurrent assignments to the same mentor queue on this row lock,
        // which makes the capacity count below exact.
        let mentor = mentors::Entity::find_by_id(mentor_id)
            .lock_exclusive()
            .one(&txn)
            .await
            .context("lock mentor for assignment")?;

        let student = students::Entity::find_by_id(student_id)
            .lock_exclusive()
            .one(&txn)
            .await
            .context("lock student for assignment")?
            .ok_or(PortalServiceError::StudentNotFound)?;
        let account = accounts::Entity::find_by_id(student_id)
            .lock_shared()
            .one(&txn)
            .await
            .context("load student account")?
            .ok_or(PortalServiceError::StudentNotFound)?;
        if role_from_db(account.role)?.is_privileged() {
            return Err(PortalServiceError::PrivilegedMentee);
        }

        let mentor = mentor.ok_or(PortalServiceError::MentorNotFound)?;
        if student.mentor_id == Some(mentor_id) {
            return Err(PortalServiceError::MentorAlreadyAssigned);
        }
        let active = students::Entity::find()
            .filter(students::Column::MentorId.eq(mentor_id))
            .count(&txn)
            .await
            .context("count mentor students in assignment")?;
        if active >= capacity {
            return Err(PortalServiceError::CapacityExceeded);
        }

        let mut am = student.into_active_model();
        am.mentor_id = Set(Some(mentor_id));
        am.updated_at = Set(now);
        let student = am.update(&txn).await.context("set student mentor")?;

        let audit = mentor_assignments::ActiveModel {
            id: Set(Uuid::now_v7()),
            student_id: Set(student_id),
            mentor_id: Set(mentor_id),
            mentor_name: Set(mentor.name.clone()),
            assigned_by: Set(staff_id),
            assigned_at: Set(now),
        }
        .insert(&txn)
        .await
        .context("append assignment audit")?;

        let pending = mentor_requests::Entity::find()
            .filter(mentor_requests::Column::StudentId.eq(student_id))
            .filter(mentor_requests::Column::Status.eq(PENDING))
            .lock_exclusive()
            .one(&txn)
            .await
            .context("find pending request for approval")?;
        let approved_request = match pending {
            Some(request) => {
                let id = request.id;
                let mut am = request.into_active_model();
                am.status = Set(MentorRequestStatus::Approved.as_str().to_owned());
                am.updated_at = Set(now);
                am.update(&txn).await.context("approve mentor request")?;
                Some(id)
            }
            None => None,
        };

        txn.commit().await.context("commit assign mentor")?;

        Ok(AssignmentOutcome {
            student: student_from_models(student, account)?,
            mentor: mentor_from_model(mentor),
            assignment: assignment_from_model(audit),
            approved_request,
        })
    }

    async fn unassign(&self, student_id: Uuid) -> Result<Option<Uuid>, PortalServiceError> {
        let txn = self.db.begin().await.context("begin unassign mentor")?;
        let student = students::Entity::find_by_id(student_id)
            .lock_exclusive()
            .one(&txn)
            .await
            .context("lock student for unassignment")?
            .ok_or(PortalServiceError::StudentNotFound)?;
        let previous = student.mentor_id;
        if previous.is_some() {
            let mut am = student.into_active_model();
            am.mentor_id = Set(None);
            am.updated_at = Set(Utc::now());
            am.update(&txn).await.context("clear student mentor")?;
        }
        txn.commit().await.context("commit unassign mentor")?;
        Ok(previous)
    }

    async fn history(&self, student_id: Uuid) -> Result<Vec<MentorAssignment>, PortalServiceError> {
        let models = mentor_assignments::Entity::find()
            .filter(mentor_assignments::Column::StudentId.eq(student_id))
            .order_by_desc(mentor_assignments::Column::AssignedAt)
            .all(&self.db)
            .await
            .context("list assignment history")?;
        Ok(models.into_iter().map(assignment_from_model).collect())
    }
}

fn assignment_from_model(model: mentor_assignments::Model) -> MentorAssignment {
    MentorAssignment {
        id: model.id,
        student_id: model.student_id,
        mentor_id: model.mentor_id,
        mentor_name: model.mentor_name,
        assigned_by: model.assigned_by,
        assigned_at: model.assigned_at,
    }
}

// ── Content repository ───────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbContentRepository {
    pub db: DatabaseConnection,
}

impl ContentRepository for DbContentRepository {
    async fn get(&self, key: &str) -> Result<Option<PageContent>, PortalServiceError> {
        let model = page_contents::Entity::find_by_id(key.to_owned())
            .one(&self.db)
            .await
            .context("find page content")?;
        Ok(model.map(|m| PageContent {
            key: m.key,
            value: m.value,
            updated_at: m.updated_at,
        }))
    }

    async fn upsert(&self, content: &PageContent) -> Result<(), PortalServiceError> {
        page_contents::Entity::insert(page_contents::ActiveModel {
            key: Set(content.key.clone()),
            value: Set(content.value.clone()),
            updated_at: Set(content.updated_at),
        })
        .on_conflict(
            OnConflict::column(page_contents::Column::Key)
                .update_columns([page_contents::Column::Value, page_contents::Column::UpdatedAt])
                .to_owned(),
        )
        .exec(&self.db)
        .await
        .context("upsert page content")?;
        Ok(())
    }
}

// ── Program repository ───────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbProgramRepository {
    pub db: DatabaseConnection,
}

impl ProgramRepository for DbProgramRepository {
    async fn create(&self, program: &Program) -> Result<(), PortalServiceError> {
        programs::ActiveModel {
            id: Set(program.id),
            name: Set(program.name.clone()),
            description: Set(program.description.clone()),
            video_url: Set(program.video_url.clone()),
            image_url: Set(program.image_url.clone()),
            brochure_url: Set(program.brochure_url.clone()),
            created_at: Set(program.created_at),
            updated_at: Set(program.updated_at),
        }
        .insert(&self.db)
        .await
        .context("create program")?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Program>, PortalServiceError> {
        let model = programs::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find program by id")?;
        Ok(model.map(program_from_model))
    }

    async fn list(&self, page: PageRequest) -> Result<Vec<Program>, PortalServiceError> {
        let models = programs::Entity::find()
            .order_by_asc(programs::Column::CreatedAt)
            .order_by_asc(programs::Column::Id)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .context("list programs")?;
        Ok(models.into_iter().map(program_from_model).collect())
    }

    async fn update(
        &self,
        id: Uuid,
        update: &ProgramUpdate,
    ) -> Result<Option<Program>, PortalServiceError> {
        let Some(model) = programs::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find program for update")?
        else {
            return Ok(None);
        };

        let mut am = model.into_active_model();
        if let Some(name) = &update.name {
            am.name = Set(name.clone());
        }
        if let Some(description) = &update.description {
            am.description = Set(description.clone());
        }
        if let Some(url) = &update.video_url {
            am.video_url = Set(url.clone());
        }
        if let Some(url) = &update.image_url {
            am.image_url = Set(url.clone());
        }
        if let Some(url) = &update.brochure_url {
            am.brochure_url = Set(url.clone());
        }
        am.updated_at = Set(Utc::now());
        let updated = am.update(&self.db).await.context("update program")?;
        Ok(Some(program_from_model(updated)))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, PortalServiceError> {
        let deleted = programs::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .context("delete program")?;
        Ok(deleted.rows_affected > 0)
    }
}

fn program_from_model(model: programs::Model) -> Program {
    Program {
        id: model.id,
        name: model.name,
        description: model.description,
        video_url: model.video_url,
        image_url: model.image_url,
        brochure_url: model.brochure_url,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}
