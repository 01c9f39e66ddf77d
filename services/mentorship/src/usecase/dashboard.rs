use portal_domain::pagination::PageRequest;

use crate::domain::repository::{MentorRepository, MentorRequestRepository, StudentRepository};
use crate::domain::types::{Actor, DashboardSummary};
use crate::error::PortalServiceError;

pub struct DashboardUseCase<S, R, M>
where
    S: StudentRepository,
    R: MentorRequestRepository,
    M: MentorRepository,
{
    pub students: S,
    pub requests: R,
    pub mentors: M,
}

impl<S, R, M> DashboardUseCase<S, R, M>
where
    S: StudentRepository,
    R: MentorRequestRepository,
    M: MentorRepository,
{
    pub async fn execute(
        &self,
        actor: Actor,
        page: PageRequest,
    ) -> Result<DashboardSummary, PortalServiceError> {
        actor.require_staff()?;
        Ok(DashboardSummary {
            registrations: self.students.count_registrations().await?,
            pending_requests: self.requests.count_pending().await?,
            mentors: self.mentors.count().await?,
            pending: self.requests.list_pending(page).await?,
            unassigned: self.students.list_unassigned(page).await?,
        })
    }
}
