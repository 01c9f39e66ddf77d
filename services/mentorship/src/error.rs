use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};

/// Mentorship service error variants.
///
/// Notification failures never appear here: they are logged and dropped by
/// the dispatcher.
#[derive(Debug, thiserror::Error)]
pub enum PortalServiceError {
    #[error("invalid {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },
    #[error("student not found")]
    StudentNotFound,
    #[error("mentor not found")]
    MentorNotFound,
    #[error("account not found")]
    AccountNotFound,
    #[error("mentor request not found")]
    MentorRequestNotFound,
    #[error("content not found")]
    ContentNotFound,
    #[error("program not found")]
    ProgramNotFound,
    #[error("a mentor request is already pending")]
    DuplicateRequest,
    #[error("student already has a mentor")]
    AlreadyHasMentor,
    #[error("mentor is already assigned to this student")]
    MentorAlreadyAssigned,
    #[error("mentor is at capacity")]
    CapacityExceeded,
    #[error("staff accounts cannot be mentees")]
    PrivilegedMentee,
    #[error("mentor request is not pending")]
    RequestNotPending,
    #[error("email is already registered")]
    EmailAlreadyRegistered,
    #[error("mentor email is already taken")]
    MentorEmailTaken,
    #[error("staff account quota exceeded")]
    QuotaExceeded,
    #[error("too many registration attempts")]
    RateLimitExceeded { retry_after_secs: u64 },
    #[error("invalid verification token")]
    InvalidToken,
    #[error("verification token expired")]
    TokenExpired,
    #[error("forbidden")]
    Forbidden,
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl PortalServiceError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "VALIDATION",
            Self::StudentNotFound => "STUDENT_NOT_FOUND",
            Self::MentorNotFound => "MENTOR_NOT_FOUND",
            Self::AccountNotFound => "ACCOUNT_NOT_FOUND",
            Self::MentorRequestNotFound => "MENTOR_REQUEST_NOT_FOUND",
            Self::ContentNotFound => "CONTENT_NOT_FOUND",
            Self::ProgramNotFound => "PROGRAM_NOT_FOUND",
            Self::DuplicateRequest => "DUPLICATE_REQUEST",
            Self::AlreadyHasMentor => "ALREADY_HAS_MENTOR",
            Self::MentorAlreadyAssigned => "MENTOR_ALREADY_ASSIGNED",
            Self::CapacityExceeded => "CAPACITY_EXCEEDED",
            Self::PrivilegedMentee => "PRIVILEGED_MENTEE",
            Self::RequestNotPending => "REQUEST_NOT_PENDING",
            Self::EmailAlreadyRegistered => "EMAIL_ALREADY_REGISTERED",
            Self::MentorEmailTaken => "MENTOR_EMAIL_TAKEN",
            Self::QuotaExceeded => "QUOTA_EXCEEDED",
            Self::RateLimitExceeded { .. } => "RATE_LIMIT_EXCEEDED",
            Self::InvalidToken => "INVALID_TOKEN",
            Self::TokenExpired => "TOKEN_EXPIRED",
            Self::Forbidden => "FORBIDDEN",
            Self::Internal(_) => "INTERNAL",
        }
    }
}

impl IntoResponse for PortalServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Validation { .. } | Self::InvalidToken => StatusCode::BAD_REQUEST,
            Self::StudentNotFound
            | Self::MentorNotFound
            | Self::AccountNotFound
            | Self::MentorRequestNotFound
            | Self::ContentNotFound
            | Self::ProgramNotFound => StatusCode::NOT_FOUND,
            Self::DuplicateRequest
            | Self::AlreadyHasMentor
            | Self::MentorAlreadyAssigned
            | Self::CapacityExceeded
            | Self::PrivilegedMentee
            | Self::RequestNotPending
            | Self::EmailAlreadyRegistered
            | Self::MentorEmailTaken => StatusCode::CONFLICT,
            Self::QuotaExceeded | Self::Forbidden => StatusCode::FORBIDDEN,
            Self::RateLimitExceeded { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::TokenExpired => StatusCode::GONE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if let Self::Internal(ref e) = self {
            tracing::error!(error = format!("{e:#}"), kind = "INTERNAL", "internal error");
        }
        let retry_after = match &self {
            Self::RateLimitExceeded { retry_after_secs } => Some(*retry_after_secs),
            _ => None,
        };
        let body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        let mut response = (status, axum::Json(body)).into_response();
        if let Some(secs) = retry_after {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(secs));
        }
        response
    }
}
