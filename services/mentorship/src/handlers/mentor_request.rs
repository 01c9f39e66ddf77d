use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use portal_auth_types::identity::IdentityHeaders;

use crate::error::PortalServiceError;
use crate::handlers::{MentorRequestResponse, PageQuery};
use crate::state::AppState;
use crate::usecase::mentor_request::{
    ListPendingRequestsUseCase, RejectMentorRequestUseCase, SubmitMentorRequestUseCase,
};

#[derive(Serialize)]
pub struct PendingRequestResponse {
    #[serde(flatten)]
    pub request: MentorRequestResponse,
    pub student_name: String,
    pub student_email: String,
}

// ── POST /mentor-requests ────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct SubmitMentorRequestBody {
    #[serde(default)]
    pub message: Option<String>,
}

pub async fn submit_mentor_request(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Json(body): Json<SubmitMentorRequestBody>,
) -> Result<(StatusCode, Json<MentorRequestResponse>), PortalServiceError> {
    let usecase = SubmitMentorRequestUseCase {
        students: state.student_repo(),
        requests: state.request_repo(),
        accounts: state.account_repo(),
        notifier: state.notifier.clone(),
    };
    let request = usecase.execute(identity.into(), body.message).await?;
    Ok((StatusCode::CREATED, Json(request.into())))
}

// ── GET /mentor-requests ─────────────────────────────────────────────────────

pub async fn list_pending_requests(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Vec<PendingRequestResponse>>, PortalServiceError> {
    let usecase = ListPendingRequestsUseCase {
        requests: state.request_repo(),
    };
    let pending = usecase
        .execute(identity.into(), query.page_request())
        .await?;
    Ok(Json(
        pending
            .into_iter()
            .map(|p| PendingRequestResponse {
                request: p.request.into(),
                student_name: p.student_name,
                student_email: p.student_email,
            })
            .collect(),
    ))
}

// ── POST /mentor-requests/{id}/rejection ─────────────────────────────────────

pub async fn reject_mentor_request(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(request_id): Path<Uuid>,
) -> Result<Json<MentorRequestResponse>, PortalServiceError> {
    let usecase = RejectMentorRequestUseCase {
        requests: state.request_repo(),
    };
    let rejected = usecase.execute(identity.into(), request_id).await?;
    Ok(Json(rejected.into()))
}
