use axum::http::StatusCode;

/// `GET /healthz`: the process is serving requests.
pub async fn healthz() -> StatusCode {
    StatusCode::OK
}

/// Fold named dependency checks into a readiness status. Any failed check
/// yields 503 and is logged by name.
pub fn readiness(checks: &[(&'static str, bool)]) -> StatusCode {
    let mut ready = true;
    for (name, ok) in checks {
        if !ok {
            tracing::warn!(dependency = name, "readiness check failed");
            ready = false;
        }
    }
    if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}
