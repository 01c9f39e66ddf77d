use chrono::Utc;

use crate::domain::repository::ContentRepository;
use crate::domain::types::{Actor, PageContent};
use crate::error::PortalServiceError;

const MAX_KEY_LEN: usize = 100;

pub struct GetContentUseCase<R: ContentRepository> {
    pub contents: R,
}

impl<R: ContentRepository> GetContentUseCase<R> {
    pub async fn execute(&self, key: &str) -> Result<PageContent, PortalServiceError> {
        self.contents
            .get(key)
            .await?
            .ok_or(PortalServiceError::ContentNotFound)
    }
}

pub struct PutContentUseCase<R: ContentRepository> {
    pub contents: R,
}

impl<R: ContentRepository> PutContentUseCase<R> {
    pub async fn execute(
        &self,
        actor: Actor,
        key: &str,
        value: String,
    ) -> Result<PageContent, PortalServiceError> {
        actor.require_staff()?;
        let key = key.trim();
        if key.is_empty() || key.len() > MAX_KEY_LEN {
            return Err(PortalServiceError::validation(
                "key",
                format!("must be 1 to {MAX_KEY_LEN} characters"),
            ));
        }
        let content = PageContent {
            key: key.to_owned(),
            value,
            updated_at: Utc::now(),
        };
        self.contents.upsert(&content).await?;
        Ok(content)
    }
}
