pub mod account;
pub mod assignment;
pub mod content;
pub mod dashboard;
pub mod health;
pub mod lookup;
pub mod mentor;
pub mod mentor_request;
pub mod program;
pub mod registration;
pub mod student;

use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use portal_auth_types::identity::IdentityHeaders;
use portal_domain::pagination::PageRequest;

use crate::domain::types::{Actor, Mentor, MentorAssignment, MentorRequest, Student};

impl From<IdentityHeaders> for Actor {
    fn from(identity: IdentityHeaders) -> Self {
        Self {
            account_id: identity.account_id,
            role: identity.role,
        }
    }
}

// ── Query params ─────────────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub struct PageQuery {
    pub per_page: Option<u32>,
    pub page: Option<u32>,
}

impl PageQuery {
    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(self.per_page, self.page)
    }
}

/// Distinguishes an absent field (`None`) from an explicit `null`
/// (`Some(None)`) in PATCH bodies.
pub(crate) fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

// ── Shared response types ────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct StudentResponse {
    pub account_id: Uuid,
    pub email: String,
    pub full_name: String,
    pub phone: String,
    pub city: String,
    pub pincode: String,
    pub dob: Option<chrono::NaiveDate>,
    pub father_name: String,
    pub mother_name: String,
    pub cet_taken: bool,
    pub verified: bool,
    pub mentor_id: Option<Uuid>,
    #[serde(serialize_with = "portal_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<Student> for StudentResponse {
    fn from(s: Student) -> Self {
        Self {
            account_id: s.account_id,
            email: s.email,
            full_name: s.full_name,
            phone: s.phone,
            city: s.city,
            pincode: s.pincode,
            dob: s.dob,
            father_name: s.father_name,
            mother_name: s.mother_name,
            cet_taken: s.cet_taken,
            verified: s.verified,
            mentor_id: s.mentor_id,
            created_at: s.created_at,
        }
    }
}

#[derive(Serialize)]
pub struct MentorResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub portfolio_url: Option<String>,
    pub chat_group_link: Option<String>,
    pub bio: String,
    #[serde(serialize_with = "portal_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(serialize_with = "portal_core::serde::to_rfc3339_ms")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<Mentor> for MentorResponse {
    fn from(m: Mentor) -> Self {
        Self {
            id: m.id,
            name: m.name,
            email: m.email,
            portfolio_url: m.portfolio_url,
            chat_group_link: m.chat_group_link,
            bio: m.bio,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Serialize)]
pub struct MentorRequestResponse {
    pub id: Uuid,
    pub student_id: Uuid,
    pub status: &'static str,
    pub message: String,
    #[serde(serialize_with = "portal_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(serialize_with = "portal_core::serde::to_rfc3339_ms")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<MentorRequest> for MentorRequestResponse {
    fn from(r: MentorRequest) -> Self {
        Self {
            id: r.id,
            student_id: r.student_id,
            status: r.status.as_str(),
            message: r.message,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[derive(Serialize)]
pub struct AssignmentRecordResponse {
    pub id: Uuid,
    pub student_id: Uuid,
    pub mentor_id: Uuid,
    pub mentor_name: String,
    pub assigned_by: Uuid,
    #[serde(serialize_with = "portal_core::serde::to_rfc3339_ms")]
    pub assigned_at: chrono::DateTime<chrono::Utc>,
}

impl From<MentorAssignment> for AssignmentRecordResponse {
    fn from(a: MentorAssignment) -> Self {
        Self {
            id: a.id,
            student_id: a.student_id,
            mentor_id: a.mentor_id,
            mentor_name: a.mentor_name,
            assigned_by: a.assigned_by,
            assigned_at: a.assigned_at,
        }
    }
}
