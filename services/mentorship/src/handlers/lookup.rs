use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;

use crate::domain::lookup::{InstitutionFilter, LookupQuery};
use crate::domain::types::AcademicLevel;
use crate::error::PortalServiceError;
use crate::state::AppState;
use crate::usecase::lookup::LookupUseCase;

async fn run(state: &AppState, query: LookupQuery) -> Json<Vec<String>> {
    let usecase = LookupUseCase {
        cache: state.kv.clone(),
        provider: state.lookup_provider.clone(),
        clock: state.clock(),
    };
    Json(usecase.execute(&query).await)
}

// ── GET /lookups/states ──────────────────────────────────────────────────────

pub async fn get_states(State(state): State<AppState>) -> Json<Vec<String>> {
    run(&state, LookupQuery::States).await
}

// ── GET /lookups/cities ──────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CitiesQuery {
    #[serde(default)]
    pub state: String,
}

pub async fn get_cities(
    State(state): State<AppState>,
    Query(query): Query<CitiesQuery>,
) -> Json<Vec<String>> {
    run(&state, LookupQuery::Cities { state: query.state }).await
}

// ── GET /lookups/institutions ────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct InstitutionsQuery {
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub degree: String,
}

pub async fn get_institutions(
    State(state): State<AppState>,
    Query(query): Query<InstitutionsQuery>,
) -> Json<Vec<String>> {
    run(
        &state,
        LookupQuery::Institutions(InstitutionFilter {
            state: query.state,
            city: query.city,
            degree: query.degree,
        }),
    )
    .await
}

// ── GET /lookups/degrees ─────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct DegreesQuery {
    pub level: Option<String>,
}

pub async fn get_degrees(
    State(state): State<AppState>,
    Query(query): Query<DegreesQuery>,
) -> Result<Json<Vec<String>>, PortalServiceError> {
    let level = match query.level.as_deref() {
        None => AcademicLevel::Ug,
        Some(raw) => AcademicLevel::parse(raw)
            .ok_or_else(|| PortalServiceError::validation("level", "must be UG or PG"))?,
    };
    Ok(run(&state, LookupQuery::Degrees { level }).await)
}

// ── GET /lookups/years ───────────────────────────────────────────────────────

pub async fn get_years(State(state): State<AppState>) -> Json<Vec<String>> {
    run(&state, LookupQuery::Years).await
}
