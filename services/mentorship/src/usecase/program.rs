use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use portal_domain::pagination::PageRequest;

use crate::domain::repository::ProgramRepository;
use crate::domain::types::{Actor, PROGRAM_NAME_MAX_LEN, Program, ProgramUpdate};
use crate::domain::validation;
use crate::error::PortalServiceError;

fn program_name(value: &str) -> Result<String, PortalServiceError> {
    let name = validation::require("name", value)?;
    if name.chars().count() > PROGRAM_NAME_MAX_LEN {
        return Err(PortalServiceError::validation(
            "name",
            format!("must be at most {PROGRAM_NAME_MAX_LEN} characters"),
        ));
    }
    Ok(name)
}

// ── ProgramCatalog ───────────────────────────────────────────────────────────

/// Read side, open to every signed-in account.
pub struct ProgramCatalog<P: ProgramRepository> {
    pub programs: P,
}

impl<P: ProgramRepository> ProgramCatalog<P> {
    pub async fn list(&self, page: PageRequest) -> Result<Vec<Program>, PortalServiceError> {
        self.programs.list(page).await
    }

    pub async fn get(&self, id: Uuid) -> Result<Program, PortalServiceError> {
        self.programs
            .find_by_id(id)
            .await?
            .ok_or(PortalServiceError::ProgramNotFound)
    }
}

// ── CreateProgram ────────────────────────────────────────────────────────────

pub struct CreateProgramInput {
    pub name: String,
    pub description: String,
    pub video_url: Option<String>,
    pub image_url: Option<String>,
    pub brochure_url: Option<String>,
}

pub struct CreateProgramUseCase<P: ProgramRepository> {
    pub programs: P,
}

impl<P: ProgramRepository> CreateProgramUseCase<P> {
    pub async fn execute(
        &self,
        actor: Actor,
        input: CreateProgramInput,
    ) -> Result<Program, PortalServiceError> {
        actor.require_staff()?;
        let now = Utc::now();
        let program = Program {
            id: Uuid::now_v7(),
            name: program_name(&input.name)?,
            description: validation::require("description", &input.description)?,
            video_url: validation::media_url("video_url", input.video_url.as_deref())?,
            image_url: validation::media_url("image_url", input.image_url.as_deref())?,
            brochure_url: validation::media_url("brochure_url", input.brochure_url.as_deref())?,
            created_at: now,
            updated_at: now,
        };
        self.programs.create(&program).await?;
        info!(program_id = %program.id, created_by = %actor.account_id, "program created");
        Ok(program)
    }
}

// ── UpdateProgram ────────────────────────────────────────────────────────────

pub struct UpdateProgramInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub video_url: Option<Option<String>>,
    pub image_url: Option<Option<String>>,
    pub brochure_url: Option<Option<String>>,
}

pub struct UpdateProgramUseCase<P: ProgramRepository> {
    pub programs: P,
}

fn media_change(
    field: &'static str,
    change: Option<Option<String>>,
) -> Result<Option<Option<String>>, PortalServiceError> {
    change
        .map(|v| validation::media_url(field, v.as_deref()))
        .transpose()
}

impl<P: ProgramRepository> UpdateProgramUseCase<P> {
    pub async fn execute(
        &self,
        actor: Actor,
        program_id: Uuid,
        input: UpdateProgramInput,
    ) -> Result<Program, PortalServiceError> {
        actor.require_staff()?;
        let update = ProgramUpdate {
            name: input.name.as_deref().map(program_name).transpose()?,
            description: input
                .description
                .as_deref()
                .map(|d| validation::require("description", d))
                .transpose()?,
            video_url: media_change("video_url", input.video_url)?,
            image_url: media_change("image_url", input.image_url)?,
            brochure_url: media_change("brochure_url", input.brochure_url)?,
        };
        let program = self
            .programs
            .update(program_id, &update)
            .await?
            .ok_or(PortalServiceError::ProgramNotFound)?;
        info!(%program_id, updated_by = %actor.account_id, "program updated");
        Ok(program)
    }
}

// ── DeleteProgram ────────────────────────────────────────────────────────────

pub struct DeleteProgramUseCase<P: ProgramRepository> {
    pub programs: P,
}

impl<P: ProgramRepository> DeleteProgramUseCase<P> {
    pub async fn execute(&self, actor: Actor, program_id: Uuid) -> Result<(), PortalServiceError> {
        actor.require_staff()?;
        if !self.programs.delete(program_id).await? {
            return Err(PortalServiceError::ProgramNotFound);
        }
        info!(%program_id, deleted_by = %actor.account_id, "program deleted");
        Ok(())
    }
}
