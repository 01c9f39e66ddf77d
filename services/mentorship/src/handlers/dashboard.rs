use axum::{
    Json,
    extract::{Query, State},
};
use serde::Serialize;

use portal_auth_types::identity::IdentityHeaders;

use crate::error::PortalServiceError;
use crate::handlers::PageQuery;
use crate::handlers::StudentResponse;
use crate::handlers::mentor_request::PendingRequestResponse;
use crate::state::AppState;
use crate::usecase::dashboard::DashboardUseCase;

#[derive(Serialize)]
pub struct DashboardCounts {
    pub registrations: u64,
    pub pending_requests: u64,
    pub mentors: u64,
}

#[derive(Serialize)]
pub struct DashboardResponse {
    pub counts: DashboardCounts,
    pub pending_requests: Vec<PendingRequestResponse>,
    pub unassigned_students: Vec<StudentResponse>,
}

// ── GET /dashboard ───────────────────────────────────────────────────────────

pub async fn get_dashboard(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<DashboardResponse>, PortalServiceError> {
    let usecase = DashboardUseCase {
        students: state.student_repo(),
        requests: state.request_repo(),
        mentors: state.mentor_repo(),
    };
    let summary = usecase
        .execute(identity.into(), query.page_request())
        .await?;
    Ok(Json(DashboardResponse {
        counts: DashboardCounts {
            registrations: summary.registrations,
            pending_requests: summary.pending_requests,
            mentors: summary.mentors,
        },
        pending_requests: summary
            .pending
            .into_iter()
            .map(|p| PendingRequestResponse {
                request: p.request.into(),
                student_name: p.student_name,
                student_email: p.student_email,
            })
            .collect(),
        unassigned_students: summary.unassigned.into_iter().map(Into::into).collect(),
    }))
}
