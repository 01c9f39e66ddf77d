use tracing::{info, warn};
use uuid::Uuid;

use portal_domain::phone::to_e164;

use crate::domain::repository::{
    AssignmentRepository, MentorRepository, NotificationPort, StudentRepository,
};
use crate::domain::types::{
    Actor, AssignCommand, AssignmentOutcome, MENTOR_CAPACITY, MentorAssignment, Notification,
    NotificationChannel, NotificationTemplate, has_capacity,
};
use crate::error::PortalServiceError;
use crate::usecase::notify::dispatch_best_effort;

// ── AssignMentor ─────────────────────────────────────────────────────────────

pub struct AssignMentorUseCase<A, S, M, N>
where
    A: AssignmentRepository,
    S: StudentRepository,
    M: MentorRepository,
    N: NotificationPort,
{
    pub assignments: A,
    pub students: S,
    pub mentors: M,
    pub notifier: N,
}

impl<A, S, M, N> AssignMentorUseCase<A, S, M, N>
where
    A: AssignmentRepository,
    S: StudentRepository,
    M: MentorRepository,
    N: NotificationPort,
{
    /// Pre-checks here give early, well-ordered errors; the repository
    /// repeats them inside the transaction where they are binding.
    pub async fn execute(
        &self,
        actor: Actor,
        student_id: Uuid,
        mentor_id: Uuid,
    ) -> Result<AssignmentOutcome, PortalServiceError> {
        actor.require_staff()?;

        let student = self
            .students
            .find_by_id(student_id)
            .await?
            .ok_or(PortalServiceError::StudentNotFound)?;
        if student.role.is_privileged() {
            return Err(PortalServiceError::PrivilegedMentee);
        }

        if self.mentors.find_by_id(mentor_id).await?.is_none() {
            return Err(PortalServiceError::MentorNotFound);
        }
        if student.mentor_id == Some(mentor_id) {
            return Err(PortalServiceError::MentorAlreadyAssigned);
        }
        if !has_capacity(self.mentors.active_count(mentor_id).await?) {
            return Err(PortalServiceError::CapacityExceeded);
        }

        let outcome = self
            .assignments
            .assign(
                AssignCommand {
                    staff_id: actor.account_id,
                    student_id,
                    mentor_id,
                },
                MENTOR_CAPACITY,
            )
            .await?;
        info!(
            %student_id,
            %mentor_id,
            assigned_by = %actor.account_id,
            approved_request = ?outcome.approved_request,
            "mentor assigned"
        );

        self.notify(&outcome).await;
        Ok(outcome)
    }

    async fn notify(&self, outcome: &AssignmentOutcome) {
        let AssignmentOutcome {
            student, mentor, ..
        } = outcome;
        let to_student = serde_json::json!({
            "student_name": student.full_name,
            "mentor_name": mentor.name,
            "mentor_email": mentor.email,
            "portfolio_url": mentor.portfolio_url,
            "chat_group_link": mentor.chat_group_link,
        });

        dispatch_best_effort(
            &self.notifier,
            Notification {
                channel: NotificationChannel::Email,
                recipient: student.email.clone(),
                template: NotificationTemplate::MentorAssigned,
                context: to_student.clone(),
            },
        )
        .await;

        match to_e164(&student.phone) {
            Some(phone) => {
                dispatch_best_effort(
                    &self.notifier,
                    Notification {
                        channel: NotificationChannel::Messaging,
                        recipient: phone,
                        template: NotificationTemplate::MentorAssigned,
                        context: to_student,
                    },
                )
                .await;
            }
            None => warn!(student_id = %student.account_id, "no usable phone for messaging"),
        }

        dispatch_best_effort(
            &self.notifier,
            Notification {
                channel: NotificationChannel::Email,
                recipient: mentor.email.clone(),
                template: NotificationTemplate::MenteeAssigned,
                context: serde_json::json!({
                    "mentor_name": mentor.name,
                    "student_name": student.full_name,
                    "student_email": student.email,
                    "student_phone": student.phone,
                    "student_city": student.city,
                }),
            },
        )
        .await;
    }
}

// ── UnassignMentor ───────────────────────────────────────────────────────────

pub struct UnassignMentorUseCase<A: AssignmentRepository> {
    pub assignments: A,
}

impl<A: AssignmentRepository> UnassignMentorUseCase<A> {
    /// Clears the active mentor. Idempotent; history is untouched.
    pub async fn execute(
        &self,
        actor: Actor,
        student_id: Uuid,
    ) -> Result<Option<Uuid>, PortalServiceError> {
        actor.require_staff()?;
        let previous = self.assignments.unassign(student_id).await?;
        if let Some(mentor_id) = previous {
            info!(%student_id, %mentor_id, unassigned_by = %actor.account_id, "mentor unassigned");
        }
        Ok(previous)
    }
}

// ── AssignmentHistory ────────────────────────────────────────────────────────

pub struct AssignmentHistoryUseCase<A: AssignmentRepository> {
    pub assignments: A,
}

impl<A: AssignmentRepository> AssignmentHistoryUseCase<A> {
    pub async fn execute(
        &self,
        student_id: Uuid,
    ) -> Result<Vec<MentorAssignment>, PortalServiceError> {
        self.assignments.history(student_id).await
    }
}
