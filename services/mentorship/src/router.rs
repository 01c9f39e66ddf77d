use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{delete, get, patch, post},
};
use tower_http::trace::TraceLayer;

use portal_core::health::healthz;
use portal_core::middleware::request_id_layer;

use crate::handlers::{
    account::{grant_staff, revoke_staff},
    assignment::{assign_mentor, unassign_mentor},
    content::{get_content, put_content},
    dashboard::get_dashboard,
    health::readyz,
    lookup::{get_cities, get_degrees, get_institutions, get_states, get_years},
    mentor::{create_mentor, delete_mentor, list_mentors, update_mentor},
    mentor_request::{list_pending_requests, reject_mentor_request, submit_mentor_request},
    program::{create_program, delete_program, get_program, list_programs, update_program},
    registration::{submit_registration, verify_email},
    student::{get_assignment_history, get_me},
};
use crate::middleware::{RegistrationThrottle, rate_limit_registration};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    // Only submission is throttled; verification links stay usable.
    let throttle = RegistrationThrottle {
        kv: state.kv.clone(),
        trusted_proxy_hops: state.trusted_proxy_hops,
    };
    let registration = Router::new()
        .route("/registrations", post(submit_registration))
        .route_layer(from_fn_with_state(throttle, rate_limit_registration));

    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Registration
        .merge(registration)
        .route("/registrations/verification", post(verify_email))
        // Students
        .route("/students/@me", get(get_me))
        .route("/students/{id}/mentor", delete(unassign_mentor))
        .route("/students/{id}/assignments", get(get_assignment_history))
        // Mentor requests
        .route(
            "/mentor-requests",
            post(submit_mentor_request).get(list_pending_requests),
        )
        .route("/mentor-requests/{id}/rejection", post(reject_mentor_request))
        // Assignments
        .route("/assignments", post(assign_mentor))
        // Mentors
        .route("/mentors", get(list_mentors).post(create_mentor))
        .route("/mentors/{id}", patch(update_mentor).delete(delete_mentor))
        // Programs
        .route("/programs", get(list_programs).post(create_program))
        .route(
            "/programs/{id}",
            get(get_program).patch(update_program).delete(delete_program),
        )
        // Staff privilege
        .route("/accounts/{id}/staff", post(grant_staff).delete(revoke_staff))
        // Dashboard
        .route("/dashboard", get(get_dashboard))
        // Page content
        .route("/contents/{key}", get(get_content).put(put_content))
        // Lookups
        .route("/lookups/states", get(get_states))
        .route("/lookups/cities", get(get_cities))
        .route("/lookups/institutions", get(get_institutions))
        .route("/lookups/degrees", get(get_degrees))
        .route("/lookups/years", get(get_years))
        .layer(TraceLayer::new_for_http())
        .layer(request_id_layer())
        .with_state(state)
}
