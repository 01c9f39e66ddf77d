//! Identity the gateway attaches to every authenticated request.

use axum::extract::FromRequestParts;
use http::request::Parts;
use http::{HeaderMap, StatusCode};
use uuid::Uuid;

use portal_domain::role::AccountRole;

pub const ACCOUNT_ID_HEADER: &str = "x-portal-account-id";
pub const ACCOUNT_ROLE_HEADER: &str = "x-portal-account-role";

/// Caller identity read from `x-portal-account-id` and
/// `x-portal-account-role`.
///
/// Extraction fails with 401 when either header is missing or does not parse.
/// Whether the role is allowed to do something is for the handler to decide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityHeaders {
    pub account_id: Uuid,
    pub role: AccountRole,
}

impl IdentityHeaders {
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());

        let account_id = header(ACCOUNT_ID_HEADER)?.parse::<Uuid>().ok()?;
        let role = header(ACCOUNT_ROLE_HEADER)?
            .parse::<u8>()
            .ok()
            .and_then(AccountRole::from_u8)?;
        Some(Self { account_id, role })
    }

    pub fn is_staff(&self) -> bool {
        self.role.is_privileged()
    }
}

impl<S> FromRequestParts<S> for IdentityHeaders
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    // Parsed up front so the returned future borrows nothing from `parts`.
    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let identity = Self::from_headers(&parts.headers);
        async move { identity.ok_or(StatusCode::UNAUTHORIZED) }
    }
}
