use tracing::info;
use uuid::Uuid;

use crate::domain::repository::AccountRepository;
use crate::domain::types::{Actor, GrantOutcome, MAX_STAFF_ACCOUNTS};
use crate::error::PortalServiceError;

// ── AdminQuotaGuard ──────────────────────────────────────────────────────────

/// Caps privileged accounts at [`MAX_STAFF_ACCOUNTS`].
///
/// `can_grant` is advisory; the binding check runs again inside the grant
/// transaction.
pub struct AdminQuotaGuard<A: AccountRepository> {
    pub accounts: A,
}

impl<A: AccountRepository> AdminQuotaGuard<A> {
    pub async fn can_grant(&self) -> Result<bool, PortalServiceError> {
        Ok(self.accounts.count_staff().await? < MAX_STAFF_ACCOUNTS)
    }
}

// ── GrantStaff ───────────────────────────────────────────────────────────────

pub struct GrantStaffUseCase<A: AccountRepository> {
    pub guard: AdminQuotaGuard<A>,
}

impl<A: AccountRepository> GrantStaffUseCase<A> {
    pub async fn execute(
        &self,
        actor: Actor,
        account_id: Uuid,
    ) -> Result<GrantOutcome, PortalServiceError> {
        actor.require_staff()?;

        let accounts = &self.guard.accounts;
        let account = accounts
            .find_by_id(account_id)
            .await?
            .ok_or(PortalServiceError::AccountNotFound)?;
        if account.role.is_privileged() {
            return Ok(GrantOutcome::AlreadyStaff);
        }

        if !self.guard.can_grant().await? {
            return Err(PortalServiceError::QuotaExceeded);
        }

        let outcome = accounts.grant_staff(account_id, MAX_STAFF_ACCOUNTS).await?;
        info!(%account_id, granted_by = %actor.account_id, ?outcome, "staff privilege granted");
        Ok(outcome)
    }
}

// ── RevokeStaff ──────────────────────────────────────────────────────────────

pub struct RevokeStaffUseCase<A: AccountRepository> {
    pub accounts: A,
}

impl<A: AccountRepository> RevokeStaffUseCase<A> {
    pub async fn execute(&self, actor: Actor, account_id: Uuid) -> Result<(), PortalServiceError> {
        actor.require_staff()?;
        if !self.accounts.revoke_staff(account_id).await? {
            return Err(PortalServiceError::AccountNotFound);
        }
        info!(%account_id, revoked_by = %actor.account_id, "staff privilege revoked");
        Ok(())
    }
}
