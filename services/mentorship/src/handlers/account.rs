use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Serialize;
use uuid::Uuid;

use portal_auth_types::identity::IdentityHeaders;

use crate::domain::types::GrantOutcome;
use crate::error::PortalServiceError;
use crate::state::AppState;
use crate::usecase::privilege::{AdminQuotaGuard, GrantStaffUseCase, RevokeStaffUseCase};

#[derive(Serialize)]
pub struct GrantStaffResponse {
    pub account_id: Uuid,
    pub outcome: &'static str,
}

// ── POST /accounts/{id}/staff ────────────────────────────────────────────────

pub async fn grant_staff(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(account_id): Path<Uuid>,
) -> Result<Json<GrantStaffResponse>, PortalServiceError> {
    let usecase = GrantStaffUseCase {
        guard: AdminQuotaGuard {
            accounts: state.account_repo(),
        },
    };
    let outcome = usecase.execute(identity.into(), account_id).await?;
    Ok(Json(GrantStaffResponse {
        account_id,
        outcome: match outcome {
            GrantOutcome::Granted => "granted",
            GrantOutcome::AlreadyStaff => "already_staff",
        },
    }))
}

// ── DELETE /accounts/{id}/staff ──────────────────────────────────────────────

pub async fn revoke_staff(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(account_id): Path<Uuid>,
) -> Result<StatusCode, PortalServiceError> {
    let usecase = RevokeStaffUseCase {
        accounts: state.account_repo(),
    };
    usecase.execute(identity.into(), account_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
