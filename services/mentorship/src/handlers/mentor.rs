use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use portal_auth_types::identity::IdentityHeaders;

use crate::domain::types::MENTOR_CAPACITY;
use crate::error::PortalServiceError;
use crate::handlers::{MentorResponse, PageQuery, present};
use crate::state::AppState;
use crate::usecase::mentor::{
    CreateMentorInput, CreateMentorUseCase, DeleteMentorUseCase, MentorDirectory,
    UpdateMentorContactInput, UpdateMentorContactUseCase,
};

#[derive(Serialize)]
pub struct MentorSummaryResponse {
    #[serde(flatten)]
    pub mentor: MentorResponse,
    pub active_count: u64,
    pub capacity: u64,
    pub available: bool,
}

// ── GET /mentors ─────────────────────────────────────────────────────────────

pub async fn list_mentors(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Vec<MentorSummaryResponse>>, PortalServiceError> {
    let directory = MentorDirectory {
        mentors: state.mentor_repo(),
    };
    let mentors = directory
        .list(identity.into(), query.page_request())
        .await?;
    Ok(Json(
        mentors
            .into_iter()
            .map(|summary| MentorSummaryResponse {
                available: summary.is_available(),
                active_count: summary.active_count,
                capacity: MENTOR_CAPACITY,
                mentor: summary.mentor.into(),
            })
            .collect(),
    ))
}

// ── POST /mentors ────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateMentorRequest {
    pub name: String,
    pub email: String,
    pub portfolio_url: Option<String>,
    pub chat_group_link: Option<String>,
    pub bio: Option<String>,
}

pub async fn create_mentor(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Json(body): Json<CreateMentorRequest>,
) -> Result<(StatusCode, Json<MentorResponse>), PortalServiceError> {
    let usecase = CreateMentorUseCase {
        mentors: state.mentor_repo(),
    };
    let mentor = usecase
        .execute(
            identity.into(),
            CreateMentorInput {
                name: body.name,
                email: body.email,
                portfolio_url: body.portfolio_url,
                chat_group_link: body.chat_group_link,
                bio: body.bio,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(mentor.into())))
}

// ── PATCH /mentors/{id} ──────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct UpdateMentorRequest {
    pub email: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub portfolio_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub chat_group_link: Option<Option<String>>,
}

pub async fn update_mentor(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(mentor_id): Path<Uuid>,
    Json(body): Json<UpdateMentorRequest>,
) -> Result<Json<MentorResponse>, PortalServiceError> {
    let usecase = UpdateMentorContactUseCase {
        mentors: state.mentor_repo(),
    };
    let mentor = usecase
        .execute(
            identity.into(),
            mentor_id,
            UpdateMentorContactInput {
                email: body.email,
                portfolio_url: body.portfolio_url,
                chat_group_link: body.chat_group_link,
            },
        )
        .await?;
    Ok(Json(mentor.into()))
}

// ── DELETE /mentors/{id} ─────────────────────────────────────────────────────

pub async fn delete_mentor(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(mentor_id): Path<Uuid>,
) -> Result<StatusCode, PortalServiceError> {
    let usecase = DeleteMentorUseCase {
        mentors: state.mentor_repo(),
    };
    usecase.execute(identity.into(), mentor_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
