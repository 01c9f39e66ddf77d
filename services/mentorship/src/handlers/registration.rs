use axum::{Extension, Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::PortalServiceError;
use crate::middleware::ClientIp;
use crate::state::AppState;
use crate::usecase::registration::{
    AcademicInput, SubmitRegistrationInput, SubmitRegistrationUseCase, VerifyEmailUseCase,
};

// ── POST /registrations ──────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct AcademicRequest {
    pub level: String,
    pub degree: String,
    #[serde(default)]
    pub institution: String,
    pub year: i32,
    pub percentage: f64,
}

#[derive(Deserialize)]
pub struct RegistrationRequest {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub city: String,
    pub pincode: String,
    pub dob: Option<chrono::NaiveDate>,
    #[serde(default)]
    pub father_name: String,
    #[serde(default)]
    pub mother_name: String,
    #[serde(default)]
    pub cet_taken: bool,
    #[serde(default)]
    pub academics: Vec<AcademicRequest>,
}

#[derive(Serialize)]
pub struct RegistrationResponse {
    pub account_id: Uuid,
    #[serde(serialize_with = "portal_core::serde::to_rfc3339_ms")]
    pub verification_expires_at: chrono::DateTime<chrono::Utc>,
}

pub async fn submit_registration(
    State(state): State<AppState>,
    client_ip: Option<Extension<ClientIp>>,
    Json(body): Json<RegistrationRequest>,
) -> Result<(StatusCode, Json<RegistrationResponse>), PortalServiceError> {
    let usecase = SubmitRegistrationUseCase {
        students: state.student_repo(),
        notifier: state.notifier.clone(),
        clock: state.clock(),
        site_base_url: state.site_base_url.clone(),
    };
    let receipt = usecase
        .execute(SubmitRegistrationInput {
            full_name: body.full_name,
            email: body.email,
            phone: body.phone,
            city: body.city,
            pincode: body.pincode,
            dob: body.dob,
            father_name: body.father_name,
            mother_name: body.mother_name,
            cet_taken: body.cet_taken,
            academics: body
                .academics
                .into_iter()
                .map(|a| AcademicInput {
                    level: a.level,
                    degree: a.degree,
                    institution: a.institution,
                    year: a.year,
                    percentage: a.percentage,
                })
                .collect(),
            ip: client_ip.map(|Extension(ClientIp(ip))| ip),
        })
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(RegistrationResponse {
            account_id: receipt.account_id,
            verification_expires_at: receipt.verification_expires_at,
        }),
    ))
}

// ── POST /registrations/verification ─────────────────────────────────────────

#[derive(Deserialize)]
pub struct VerifyEmailRequest {
    pub token: String,
}

#[derive(Serialize)]
pub struct VerifyEmailResponse {
    pub account_id: Uuid,
    pub verified: bool,
}

pub async fn verify_email(
    State(state): State<AppState>,
    Json(body): Json<VerifyEmailRequest>,
) -> Result<Json<VerifyEmailResponse>, PortalServiceError> {
    let usecase = VerifyEmailUseCase {
        students: state.student_repo(),
        notifier: state.notifier.clone(),
        clock: state.clock(),
        site_base_url: state.site_base_url.clone(),
    };
    let account_id = usecase.execute(&body.token).await?;
    Ok(Json(VerifyEmailResponse {
        account_id,
        verified: true,
    }))
}
