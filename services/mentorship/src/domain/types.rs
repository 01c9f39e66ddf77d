use std::hash::{DefaultHasher, Hash, Hasher};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use portal_domain::role::AccountRole;

use crate::error::PortalServiceError;

/// Registration attempts allowed per client inside one window.
pub const RATE_LIMIT_MAX_ATTEMPTS: u64 = 5;
/// Fixed window length. The origin is the first call; later calls don't extend it.
pub const RATE_LIMIT_WINDOW_SECS: u64 = 60;
/// User-agent fingerprints are folded into this many buckets.
pub const FINGERPRINT_BUCKETS: u64 = 1000;

/// Upper bound on privileged (staff) accounts.
pub const MAX_STAFF_ACCOUNTS: u64 = 4;
/// Advisory lock key serializing staff grants.
pub const STAFF_QUOTA_LOCK_KEY: i64 = 0x6d65_6e74_6f72_0001;

/// Active students a single mentor may hold.
pub const MENTOR_CAPACITY: u64 = 10;

pub const VERIFICATION_TOKEN_TTL_HOURS: i64 = 24;
pub const VERIFICATION_TOKEN_LEN: usize = 48;

pub const LOOKUP_CACHE_TTL_SECS: u64 = 60 * 60 * 24;

/// Counter-store key for registration throttling: `rl:register:{ip}:{bucket}`.
///
/// Clients behind the same address whose user agents collide in the bucket
/// share a budget.
pub fn registration_client_key(ip: &str, user_agent: &str) -> String {
    format!("rl:register:{ip}:{}", fingerprint_bucket(user_agent))
}

/// `DefaultHasher::new()` uses fixed keys, so buckets are stable across
/// processes built with the same toolchain.
pub fn fingerprint_bucket(user_agent: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    user_agent.hash(&mut hasher);
    hasher.finish() % FINGERPRINT_BUCKETS
}

// ── Accounts ─────────────────────────────────────────────────────────────────

/// Caller of a use case, as asserted by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub account_id: Uuid,
    pub role: AccountRole,
}

impl Actor {
    pub fn require_staff(&self) -> Result<(), PortalServiceError> {
        if self.role.is_privileged() {
            Ok(())
        } else {
            Err(PortalServiceError::Forbidden)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
    pub role: AccountRole,
    pub created_at: DateTime<Utc>,
}

/// Result of a staff grant that passed the quota guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrantOutcome {
    Granted,
    AlreadyStaff,
}

// ── Students ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Student {
    pub account_id: Uuid,
    pub email: String,
    pub role: AccountRole,
    pub full_name: String,
    pub phone: String,
    pub city: String,
    pub pincode: String,
    pub dob: Option<NaiveDate>,
    pub father_name: String,
    pub mother_name: String,
    pub cet_taken: bool,
    pub verified: bool,
    pub mentor_id: Option<Uuid>,
    pub registration_source: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Student {
    pub fn has_mentor(&self) -> bool {
        self.mentor_id.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AcademicLevel {
    #[serde(rename = "UG")]
    Ug,
    #[serde(rename = "PG")]
    Pg,
}

impl AcademicLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ug => "UG",
            Self::Pg => "PG",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "UG" => Some(Self::Ug),
            "PG" => Some(Self::Pg),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AcademicRecord {
    pub id: Uuid,
    pub account_id: Uuid,
    pub level: AcademicLevel,
    pub degree: String,
    pub institution: String,
    pub year: i32,
    pub percentage: f64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationToken {
    pub token: String,
    pub account_id: Uuid,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl VerificationToken {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Everything written by a successful registration, in one transaction.
#[derive(Debug, Clone)]
pub struct NewRegistration {
    pub account: Account,
    pub student: Student,
    pub records: Vec<AcademicRecord>,
    pub token: VerificationToken,
    pub ip: Option<String>,
}

// ── Mentors ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mentor {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub portfolio_url: Option<String>,
    pub chat_group_link: Option<String>,
    pub bio: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Mentor plus the number of students currently assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MentorSummary {
    pub mentor: Mentor,
    pub active_count: u64,
}

impl MentorSummary {
    pub fn is_available(&self) -> bool {
        has_capacity(self.active_count)
    }
}

pub fn has_capacity(active_count: u64) -> bool {
    active_count < MENTOR_CAPACITY
}

/// Editable subset of a mentor. `None` leaves the field untouched.
#[derive(Debug, Clone, Default)]
pub struct MentorContactUpdate {
    pub email: Option<String>,
    pub portfolio_url: Option<Option<String>>,
    pub chat_group_link: Option<Option<String>>,
}

// ── Mentor requests ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MentorRequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl MentorRequestStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MentorRequest {
    pub id: Uuid,
    pub student_id: Uuid,
    pub status: MentorRequestStatus,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Pending request joined with the requesting student's contact details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRequest {
    pub request: MentorRequest,
    pub student_name: String,
    pub student_email: String,
}

// ── Assignments ──────────────────────────────────────────────────────────────

/// Audit row. Append-only; survives unassignment and mentor deletion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MentorAssignment {
    pub id: Uuid,
    pub student_id: Uuid,
    pub mentor_id: Uuid,
    pub mentor_name: String,
    pub assigned_by: Uuid,
    pub assigned_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy)]
pub struct AssignCommand {
    pub staff_id: Uuid,
    pub student_id: Uuid,
    pub mentor_id: Uuid,
}

#[derive(Debug, Clone)]
pub struct AssignmentOutcome {
    pub student: Student,
    pub mentor: Mentor,
    pub assignment: MentorAssignment,
    /// Pending request approved by this assignment, if there was one.
    pub approved_request: Option<Uuid>,
}

// ── Content / dashboard ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageContent {
    pub key: String,
    pub value: String,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct DashboardSummary {
    pub registrations: u64,
    pub pending_requests: u64,
    pub mentors: u64,
    pub pending: Vec<PendingRequest>,
    pub unassigned: Vec<Student>,
}

// ── Programs ─────────────────────────────────────────────────────────────────

pub const PROGRAM_NAME_MAX_LEN: usize = 255;

/// Academic program shown on the portal. Media are links to hosted files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub video_url: Option<String>,
    pub image_url: Option<String>,
    pub brochure_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial program edit. `Some(None)` clears a media link.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgramUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub video_url: Option<Option<String>>,
    pub image_url: Option<Option<String>>,
    pub brochure_url: Option<Option<String>>,
}

// ── Notifications ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationChannel {
    Email,
    Messaging,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationTemplate {
    /// To the student: registration received, with the verification link.
    RegistrationReceived,
    /// To the student: email confirmed, with the login link.
    VerificationConfirmed,
    /// To every staff account: a student asked for a mentor.
    MentorRequested,
    /// To the student: mentor contact details.
    MentorAssigned,
    /// To the mentor: new mentee details.
    MenteeAssigned,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub channel: NotificationChannel,
    pub recipient: String,
    pub template: NotificationTemplate,
    pub context: serde_json::Value,
}

#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("notification queue is full")]
    QueueFull,
    #[error("notification queue is closed")]
    QueueClosed,
    #[error("invalid recipient: {0}")]
    InvalidRecipient(String),
    #[error("delivery failed")]
    Transport(#[from] anyhow::Error),
}
