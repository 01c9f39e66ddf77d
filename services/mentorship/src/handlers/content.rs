use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};

use portal_auth_types::identity::IdentityHeaders;

use crate::domain::types::PageContent;
use crate::error::PortalServiceError;
use crate::state::AppState;
use crate::usecase::content::{GetContentUseCase, PutContentUseCase};

#[derive(Serialize)]
pub struct ContentResponse {
    pub key: String,
    pub value: String,
    #[serde(serialize_with = "portal_core::serde::to_rfc3339_ms")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<PageContent> for ContentResponse {
    fn from(c: PageContent) -> Self {
        Self {
            key: c.key,
            value: c.value,
            updated_at: c.updated_at,
        }
    }
}

// ── GET /contents/{key} ──────────────────────────────────────────────────────

pub async fn get_content(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<ContentResponse>, PortalServiceError> {
    let usecase = GetContentUseCase {
        contents: state.content_repo(),
    };
    Ok(Json(usecase.execute(&key).await?.into()))
}

// ── PUT /contents/{key} ──────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct PutContentRequest {
    pub value: String,
}

pub async fn put_content(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(body): Json<PutContentRequest>,
) -> Result<Json<ContentResponse>, PortalServiceError> {
    let usecase = PutContentUseCase {
        contents: state.content_repo(),
    };
    let content = usecase.execute(identity.into(), &key, body.value).await?;
    Ok(Json(content.into()))
}
