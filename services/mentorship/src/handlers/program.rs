use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use portal_auth_types::identity::IdentityHeaders;

use crate::domain::types::Program;
use crate::error::PortalServiceError;
use crate::handlers::{PageQuery, present};
use crate::state::AppState;
use crate::usecase::program::{
    CreateProgramInput, CreateProgramUseCase, DeleteProgramUseCase, ProgramCatalog,
    UpdateProgramInput, UpdateProgramUseCase,
};

#[derive(Serialize)]
pub struct ProgramResponse {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub video_url: Option<String>,
    pub image_url: Option<String>,
    pub brochure_url: Option<String>,
    #[serde(serialize_with = "portal_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(serialize_with = "portal_core::serde::to_rfc3339_ms")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<Program> for ProgramResponse {
    fn from(p: Program) -> Self {
        Self {
            id: p.id,
            name: p.name,
            description: p.description,
            video_url: p.video_url,
            image_url: p.image_url,
            brochure_url: p.brochure_url,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

// ── GET /programs ────────────────────────────────────────────────────────────

pub async fn list_programs(
    _identity: IdentityHeaders,
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Vec<ProgramResponse>>, PortalServiceError> {
    let catalog = ProgramCatalog {
        programs: state.program_repo(),
    };
    let programs = catalog.list(query.page_request()).await?;
    Ok(Json(programs.into_iter().map(Into::into).collect()))
}

// ── GET /programs/{id} ───────────────────────────────────────────────────────

pub async fn get_program(
    _identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(program_id): Path<Uuid>,
) -> Result<Json<ProgramResponse>, PortalServiceError> {
    let catalog = ProgramCatalog {
        programs: state.program_repo(),
    };
    Ok(Json(catalog.get(program_id).await?.into()))
}

// ── POST /programs ───────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateProgramRequest {
    pub name: String,
    pub description: String,
    pub video_url: Option<String>,
    pub image_url: Option<String>,
    pub brochure_url: Option<String>,
}

pub async fn create_program(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Json(body): Json<CreateProgramRequest>,
) -> Result<(StatusCode, Json<ProgramResponse>), PortalServiceError> {
    let usecase = CreateProgramUseCase {
        programs: state.program_repo(),
    };
    let program = usecase
        .execute(
            identity.into(),
            CreateProgramInput {
                name: body.name,
                description: body.description,
                video_url: body.video_url,
                image_url: body.image_url,
                brochure_url: body.brochure_url,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(program.into())))
}

// ── PATCH /programs/{id} ─────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct UpdateProgramRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub video_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub image_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub brochure_url: Option<Option<String>>,
}

pub async fn update_program(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(program_id): Path<Uuid>,
    Json(body): Json<UpdateProgramRequest>,
) -> Result<Json<ProgramResponse>, PortalServiceError> {
    let usecase = UpdateProgramUseCase {
        programs: state.program_repo(),
    };
    let program = usecase
        .execute(
            identity.into(),
            program_id,
            UpdateProgramInput {
                name: body.name,
                description: body.description,
                video_url: body.video_url,
                image_url: body.image_url,
                brochure_url: body.brochure_url,
            },
        )
        .await?;
    Ok(Json(program.into()))
}

// ── DELETE /programs/{id} ────────────────────────────────────────────────────

pub async fn delete_program(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(program_id): Path<Uuid>,
) -> Result<StatusCode, PortalServiceError> {
    let usecase = DeleteProgramUseCase {
        programs: state.program_repo(),
    };
    usecase.execute(identity.into(), program_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
