use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use portal_domain::pagination::PageRequest;

use crate::domain::repository::{
    AccountRepository, MentorRequestRepository, NotificationPort, StudentRepository,
};
use crate::domain::types::{
    Actor, MentorRequest, MentorRequestStatus, Notification, NotificationChannel,
    NotificationTemplate, PendingRequest,
};
use crate::error::PortalServiceError;
use crate::usecase::notify::dispatch_best_effort;

const MAX_MESSAGE_LEN: usize = 2000;

// ── SubmitMentorRequest ──────────────────────────────────────────────────────

pub struct SubmitMentorRequestUseCase<S, R, A, N>
where
    S: StudentRepository,
    R: MentorRequestRepository,
    A: AccountRepository,
    N: NotificationPort,
{
    pub students: S,
    pub requests: R,
    pub accounts: A,
    pub notifier: N,
}

impl<S, R, A, N> SubmitMentorRequestUseCase<S, R, A, N>
where
    S: StudentRepository,
    R: MentorRequestRepository,
    A: AccountRepository,
    N: NotificationPort,
{
    pub async fn execute(
        &self,
        actor: Actor,
        message: Option<String>,
    ) -> Result<MentorRequest, PortalServiceError> {
        let message = message.unwrap_or_default().trim().to_owned();
        if message.chars().count() > MAX_MESSAGE_LEN {
            return Err(PortalServiceError::validation(
                "message",
                format!("must be at most {MAX_MESSAGE_LEN} characters"),
            ));
        }

        if actor.role.is_privileged() {
            return Err(PortalServiceError::PrivilegedMentee);
        }

        let student = self
            .students
            .find_by_id(actor.account_id)
            .await?
            .ok_or(PortalServiceError::StudentNotFound)?;
        if student.role.is_privileged() {
            return Err(PortalServiceError::PrivilegedMentee);
        }
        if student.has_mentor() {
            return Err(PortalServiceError::AlreadyHasMentor);
        }
        if self
            .requests
            .find_pending_by_student(student.account_id)
            .await?
            .is_some()
        {
            return Err(PortalServiceError::DuplicateRequest);
        }

        let now = Utc::now();
        let request = MentorRequest {
            id: Uuid::now_v7(),
            student_id: student.account_id,
            status: MentorRequestStatus::Pending,
            message,
            created_at: now,
            updated_at: now,
        };
        self.requests.create_pending(&request).await?;
        info!(request_id = %request.id, student_id = %student.account_id, "mentor requested");

        let staff_emails = match self.accounts.list_staff_emails().await {
            Ok(emails) => emails,
            Err(e) => {
                tracing::warn!(error = %e, "could not load staff recipients");
                vec![]
            }
        };
        for recipient in staff_emails {
            dispatch_best_effort(
                &self.notifier,
                Notification {
                    channel: NotificationChannel::Email,
                    recipient,
                    template: NotificationTemplate::MentorRequested,
                    context: serde_json::json!({
                        "student_name": student.full_name,
                        "student_email": student.email,
                        "message": request.message,
                    }),
                },
            )
            .await;
        }

        Ok(request)
    }
}

// ── ListPendingRequests ──────────────────────────────────────────────────────

pub struct ListPendingRequestsUseCase<R: MentorRequestRepository> {
    pub requests: R,
}

impl<R: MentorRequestRepository> ListPendingRequestsUseCase<R> {
    pub async fn execute(
        &self,
        actor: Actor,
        page: PageRequest,
    ) -> Result<Vec<PendingRequest>, PortalServiceError> {
        actor.require_staff()?;
        self.requests.list_pending(page).await
    }
}

// ── RejectMentorRequest ──────────────────────────────────────────────────────

pub struct RejectMentorRequestUseCase<R: MentorRequestRepository> {
    pub requests: R,
}

impl<R: MentorRequestRepository> RejectMentorRequestUseCase<R> {
    pub async fn execute(
        &self,
        actor: Actor,
        request_id: Uuid,
    ) -> Result<MentorRequest, PortalServiceError> {
        actor.require_staff()?;
        let rejected = self.requests.reject(request_id).await?;
        info!(%request_id, rejected_by = %actor.account_id, "mentor request rejected");
        Ok(rejected)
    }
}
