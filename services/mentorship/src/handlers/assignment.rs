use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use portal_auth_types::identity::IdentityHeaders;

use crate::error::PortalServiceError;
use crate::handlers::AssignmentRecordResponse;
use crate::state::AppState;
use crate::usecase::assignment::{AssignMentorUseCase, UnassignMentorUseCase};

// ── POST /assignments ────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct AssignMentorRequest {
    pub student_id: Uuid,
    pub mentor_id: Uuid,
}

#[derive(Serialize)]
pub struct AssignMentorResponse {
    pub assignment: AssignmentRecordResponse,
    pub approved_request_id: Option<Uuid>,
}

pub async fn assign_mentor(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Json(body): Json<AssignMentorRequest>,
) -> Result<(StatusCode, Json<AssignMentorResponse>), PortalServiceError> {
    let usecase = AssignMentorUseCase {
        assignments: state.assignment_repo(),
        students: state.student_repo(),
        mentors: state.mentor_repo(),
        notifier: state.notifier.clone(),
    };
    let outcome = usecase
        .execute(identity.into(), body.student_id, body.mentor_id)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(AssignMentorResponse {
            assignment: outcome.assignment.into(),
            approved_request_id: outcome.approved_request,
        }),
    ))
}

// ── DELETE /students/{id}/mentor ─────────────────────────────────────────────

pub async fn unassign_mentor(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(student_id): Path<Uuid>,
) -> Result<StatusCode, PortalServiceError> {
    let usecase = UnassignMentorUseCase {
        assignments: state.assignment_repo(),
    };
    usecase.execute(identity.into(), student_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
