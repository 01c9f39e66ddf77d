use chrono::{DateTime, Duration, NaiveDate, Utc};
use rand::RngExt;
use tracing::{info, warn};
use uuid::Uuid;

use portal_domain::role::AccountRole;

use crate::domain::repository::{Clock, NotificationPort, StudentRepository};
use crate::domain::types::{
    AcademicLevel, AcademicRecord, Account, NewRegistration, Notification, NotificationChannel,
    NotificationTemplate, Student, VERIFICATION_TOKEN_LEN, VERIFICATION_TOKEN_TTL_HOURS,
    VerificationToken,
};
use crate::domain::validation;
use crate::error::PortalServiceError;
use crate::usecase::notify::dispatch_best_effort;

const TOKEN_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
const REGISTRATION_SOURCE: &str = "portal";

fn generate_token() -> String {
    let mut rng = rand::rng();
    (0..VERIFICATION_TOKEN_LEN)
        .map(|_| TOKEN_CHARSET[rng.random_range(0..TOKEN_CHARSET.len())] as char)
        .collect()
}

// ── SubmitRegistration ───────────────────────────────────────────────────────

pub struct AcademicInput {
    pub level: String,
    pub degree: String,
    pub institution: String,
    pub year: i32,
    pub percentage: f64,
}

pub struct SubmitRegistrationInput {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub city: String,
    pub pincode: String,
    pub dob: Option<NaiveDate>,
    pub father_name: String,
    pub mother_name: String,
    pub cet_taken: bool,
    pub academics: Vec<AcademicInput>,
    pub ip: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RegistrationReceipt {
    pub account_id: Uuid,
    pub verification_expires_at: DateTime<Utc>,
}

pub struct SubmitRegistrationUseCase<S, N, C>
where
    S: StudentRepository,
    N: NotificationPort,
    C: Clock,
{
    pub students: S,
    pub notifier: N,
    pub clock: C,
    pub site_base_url: String,
}

impl<S, N, C> SubmitRegistrationUseCase<S, N, C>
where
    S: StudentRepository,
    N: NotificationPort,
    C: Clock,
{
    pub async fn execute(
        &self,
        input: SubmitRegistrationInput,
    ) -> Result<RegistrationReceipt, PortalServiceError> {
        let now = self.clock.now();
        let account_id = Uuid::now_v7();

        let full_name = validation::require("full_name", &input.full_name)?;
        let email = validation::email("email", &input.email)?;
        let phone = validation::phone(&input.phone)?;
        let pincode = validation::pincode(&input.pincode)?;
        let records = academic_records(account_id, input.academics, now)?;

        if self.students.email_exists(&email).await? {
            return Err(PortalServiceError::EmailAlreadyRegistered);
        }

        let token = VerificationToken {
            token: generate_token(),
            account_id,
            expires_at: now + Duration::hours(VERIFICATION_TOKEN_TTL_HOURS),
            created_at: now,
        };
        let registration = NewRegistration {
            account: Account {
                id: account_id,
                email: email.clone(),
                display_name: full_name.clone(),
                role: AccountRole::Student,
                created_at: now,
            },
            student: Student {
                account_id,
                email: email.clone(),
                role: AccountRole::Student,
                full_name: full_name.clone(),
                phone,
                city: input.city.trim().to_owned(),
                pincode,
                dob: input.dob,
                father_name: input.father_name.trim().to_owned(),
                mother_name: input.mother_name.trim().to_owned(),
                cet_taken: input.cet_taken,
                verified: false,
                mentor_id: None,
                registration_source: REGISTRATION_SOURCE.to_owned(),
                created_at: now,
                updated_at: now,
            },
            records,
            token: token.clone(),
            ip: input.ip,
        };
        self.students.register(&registration).await?;
        info!(%account_id, "registration submitted");

        let verification_url = format!(
            "{}/verify-email?token={}",
            self.site_base_url.trim_end_matches('/'),
            token.token
        );
        dispatch_best_effort(
            &self.notifier,
            Notification {
                channel: NotificationChannel::Email,
                recipient: email,
                template: NotificationTemplate::RegistrationReceived,
                context: serde_json::json!({
                    "full_name": full_name,
                    "verification_url": verification_url,
                    "expires_in_hours": VERIFICATION_TOKEN_TTL_HOURS,
                }),
            },
        )
        .await;

        Ok(RegistrationReceipt {
            account_id,
            verification_expires_at: token.expires_at,
        })
    }
}

/// Rows without a level or degree are skipped, matching a partially filled
/// form.
fn academic_records(
    account_id: Uuid,
    inputs: Vec<AcademicInput>,
    now: DateTime<Utc>,
) -> Result<Vec<AcademicRecord>, PortalServiceError> {
    inputs
        .into_iter()
        .filter(|a| !a.level.trim().is_empty() && !a.degree.trim().is_empty())
        .map(|a| {
            let level = AcademicLevel::parse(&a.level)
                .ok_or_else(|| PortalServiceError::validation("level", "must be UG or PG"))?;
            Ok(AcademicRecord {
                id: Uuid::now_v7(),
                account_id,
                level,
                degree: a.degree.trim().to_owned(),
                institution: a.institution.trim().to_owned(),
                year: validation::academic_year(a.year)?,
                percentage: validation::percentage(a.percentage)?,
                created_at: now,
            })
        })
        .collect()
}

// ── VerifyEmail ──────────────────────────────────────────────────────────────

pub struct VerifyEmailUseCase<S, N, C>
where
    S: StudentRepository,
    N: NotificationPort,
    C: Clock,
{
    pub students: S,
    pub notifier: N,
    pub clock: C,
    pub site_base_url: String,
}

impl<S, N, C> VerifyEmailUseCase<S, N, C>
where
    S: StudentRepository,
    N: NotificationPort,
    C: Clock,
{
    pub async fn execute(&self, token: &str) -> Result<Uuid, PortalServiceError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(PortalServiceError::InvalidToken);
        }
        let record = self
            .students
            .find_token(token)
            .await?
            .ok_or(PortalServiceError::InvalidToken)?;
        if record.is_expired_at(self.clock.now()) {
            return Err(PortalServiceError::TokenExpired);
        }
        self.students
            .mark_verified(record.account_id, &record.token)
            .await?;
        info!(account_id = %record.account_id, "email verified");

        // The account is verified at this point; a failed lookup only costs
        // the confirmation email.
        match self.students.find_by_id(record.account_id).await {
            Ok(Some(student)) => self.send_confirmation(student).await,
            Ok(None) => {}
            Err(e) => warn!(
                error = %e,
                account_id = %record.account_id,
                "skipping verification confirmation"
            ),
        }
        Ok(record.account_id)
    }

    async fn send_confirmation(&self, student: Student) {
        let login_url = format!("{}/login/", self.site_base_url.trim_end_matches('/'));
        dispatch_best_effort(
            &self.notifier,
            Notification {
                channel: NotificationChannel::Email,
                recipient: student.email,
                template: NotificationTemplate::VerificationConfirmed,
                context: serde_json::json!({
                    "full_name": student.full_name,
                    "login_url": login_url,
                }),
            },
        )
        .await;
    }
}

// ── PurgeExpiredTokens ───────────────────────────────────────────────────────

/// Deletes verification tokens past their expiry. Accounts stay unverified.
pub struct PurgeExpiredTokensUseCase<S: StudentRepository, C: Clock> {
    pub students: S,
    pub clock: C,
}

impl<S: StudentRepository, C: Clock> PurgeExpiredTokensUseCase<S, C> {
    pub async fn execute(&self) -> Result<u64, PortalServiceError> {
        let removed = self.students.delete_expired_tokens(self.clock.now()).await?;
        if removed > 0 {
            info!(removed, "expired verification tokens deleted");
        }
        Ok(removed)
    }
}
