use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use portal_domain::pagination::PageRequest;

use crate::domain::repository::MentorRepository;
use crate::domain::types::{Actor, Mentor, MentorContactUpdate, MentorSummary, has_capacity};
use crate::domain::validation;
use crate::error::PortalServiceError;

// ── MentorDirectory ──────────────────────────────────────────────────────────

pub struct MentorDirectory<M: MentorRepository> {
    pub mentors: M,
}

impl<M: MentorRepository> MentorDirectory<M> {
    /// Whether the mentor can take one more student. Advisory; assignment
    /// re-checks under the mentor row lock.
    pub async fn is_available(&self, mentor_id: Uuid) -> Result<bool, PortalServiceError> {
        if self.mentors.find_by_id(mentor_id).await?.is_none() {
            return Err(PortalServiceError::MentorNotFound);
        }
        Ok(has_capacity(self.mentors.active_count(mentor_id).await?))
    }

    pub async fn list(
        &self,
        actor: Actor,
        page: PageRequest,
    ) -> Result<Vec<MentorSummary>, PortalServiceError> {
        actor.require_staff()?;
        self.mentors.list_with_counts(page).await
    }
}

// ── CreateMentor ─────────────────────────────────────────────────────────────

pub struct CreateMentorInput {
    pub name: String,
    pub email: String,
    pub portfolio_url: Option<String>,
    pub chat_group_link: Option<String>,
    pub bio: Option<String>,
}

pub struct CreateMentorUseCase<M: MentorRepository> {
    pub mentors: M,
}

impl<M: MentorRepository> CreateMentorUseCase<M> {
    pub async fn execute(
        &self,
        actor: Actor,
        input: CreateMentorInput,
    ) -> Result<Mentor, PortalServiceError> {
        actor.require_staff()?;
        let now = Utc::now();
        let mentor = Mentor {
            id: Uuid::now_v7(),
            name: validation::require("name", &input.name)?,
            email: validation::email("email", &input.email)?,
            portfolio_url: validation::optional(input.portfolio_url.as_deref()),
            chat_group_link: validation::optional(input.chat_group_link.as_deref()),
            bio: input.bio.unwrap_or_default().trim().to_owned(),
            created_at: now,
            updated_at: now,
        };
        self.mentors.create(&mentor).await?;
        info!(mentor_id = %mentor.id, "mentor created");
        Ok(mentor)
    }
}

// ── UpdateMentorContact ──────────────────────────────────────────────────────

pub struct UpdateMentorContactInput {
    pub email: Option<String>,
    pub portfolio_url: Option<Option<String>>,
    pub chat_group_link: Option<Option<String>>,
}

pub struct UpdateMentorContactUseCase<M: MentorRepository> {
    pub mentors: M,
}

impl<M: MentorRepository> UpdateMentorContactUseCase<M> {
    pub async fn execute(
        &self,
        actor: Actor,
        mentor_id: Uuid,
        input: UpdateMentorContactInput,
    ) -> Result<Mentor, PortalServiceError> {
        actor.require_staff()?;
        let update = MentorContactUpdate {
            email: input
                .email
                .as_deref()
                .map(|e| validation::email("email", e))
                .transpose()?,
            portfolio_url: input
                .portfolio_url
                .map(|v| validation::optional(v.as_deref())),
            chat_group_link: input
                .chat_group_link
                .map(|v| validation::optional(v.as_deref())),
        };
        self.mentors
            .update_contact(mentor_id, &update)
            .await?
            .ok_or(PortalServiceError::MentorNotFound)
    }
}

// ── DeleteMentor ─────────────────────────────────────────────────────────────

pub struct DeleteMentorUseCase<M: MentorRepository> {
    pub mentors: M,
}

impl<M: MentorRepository> DeleteMentorUseCase<M> {
    pub async fn execute(&self, actor: Actor, mentor_id: Uuid) -> Result<(), PortalServiceError> {
        actor.require_staff()?;
        if !self.mentors.delete(mentor_id).await? {
            return Err(PortalServiceError::MentorNotFound);
        }
        info!(%mentor_id, deleted_by = %actor.account_id, "mentor deleted");
        Ok(())
    }
}
