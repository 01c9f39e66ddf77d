use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;
use uuid::Uuid;

use portal_auth_types::identity::IdentityHeaders;

use crate::domain::types::Actor;
use crate::error::PortalServiceError;
use crate::handlers::{AssignmentRecordResponse, MentorResponse, StudentResponse};
use crate::state::AppState;
use crate::usecase::assignment::AssignmentHistoryUseCase;
use crate::usecase::student::GetMyProfileUseCase;

#[derive(Serialize)]
pub struct StudentProfileResponse {
    #[serde(flatten)]
    pub student: StudentResponse,
    pub mentor: Option<MentorResponse>,
    pub history: Vec<AssignmentRecordResponse>,
}

// ── GET /students/@me ────────────────────────────────────────────────────────

pub async fn get_me(
    identity: IdentityHeaders,
    State(state): State<AppState>,
) -> Result<Json<StudentProfileResponse>, PortalServiceError> {
    let usecase = GetMyProfileUseCase {
        students: state.student_repo(),
        mentors: state.mentor_repo(),
        assignments: state.assignment_repo(),
    };
    let profile = usecase.execute(identity.into()).await?;
    Ok(Json(StudentProfileResponse {
        student: profile.student.into(),
        mentor: profile.mentor.map(Into::into),
        history: profile.history.into_iter().map(Into::into).collect(),
    }))
}

// ── GET /students/{id}/assignments ───────────────────────────────────────────

pub async fn get_assignment_history(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(student_id): Path<Uuid>,
) -> Result<Json<Vec<AssignmentRecordResponse>>, PortalServiceError> {
    Actor::from(identity).require_staff()?;
    let usecase = AssignmentHistoryUseCase {
        assignments: state.assignment_repo(),
    };
    let history = usecase.execute(student_id).await?;
    Ok(Json(history.into_iter().map(Into::into).collect()))
}
