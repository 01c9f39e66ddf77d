use axum::{extract::State, http::StatusCode};

use portal_core::health::readiness;

use crate::domain::repository::CounterStore;
use crate::state::AppState;

const READINESS_KEY: &str = "readyz:ping";

/// `GET /readyz`: database and counter store reachable.
pub async fn readyz(State(state): State<AppState>) -> StatusCode {
    let db = state.db.ping().await.is_ok();
    let kv = state.kv.current(READINESS_KEY, 1).await.is_ok();
    readiness(&[("database", db), (state.kv.backend(), kv)])
}
