use crate::domain::repository::{AssignmentRepository, MentorRepository, StudentRepository};
use crate::domain::types::{Actor, Mentor, MentorAssignment, Student};
use crate::error::PortalServiceError;

pub struct StudentProfile {
    pub student: Student,
    pub mentor: Option<Mentor>,
    pub history: Vec<MentorAssignment>,
}

/// The caller's own profile with the active mentor's contact details.
pub struct GetMyProfileUseCase<S, M, A>
where
    S: StudentRepository,
    M: MentorRepository,
    A: AssignmentRepository,
{
    pub students: S,
    pub mentors: M,
    pub assignments: A,
}

impl<S, M, A> GetMyProfileUseCase<S, M, A>
where
    S: StudentRepository,
    M: MentorRepository,
    A: AssignmentRepository,
{
    pub async fn execute(&self, actor: Actor) -> Result<StudentProfile, PortalServiceError> {
        let student = self
            .students
            .find_by_id(actor.account_id)
            .await?
            .ok_or(PortalServiceError::StudentNotFound)?;
        let mentor = match student.mentor_id {
            Some(id) => self.mentors.find_by_id(id).await?,
            None => None,
        };
        let history = self.assignments.history(student.account_id).await?;
        Ok(StudentProfile {
            student,
            mentor,
            history,
        })
    }
}
