use sea_orm::{ConnectionTrait, DbBackend, DbErr, SqlErr, Statement};

/// Whether a write failed because of a unique index (including partial ones).
pub fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

/// Take a Postgres transaction-scoped advisory lock.
///
/// Blocks until the lock is available; released automatically on commit or
/// rollback. Must be called on a transaction, never on a pooled connection.
pub async fn advisory_xact_lock<C>(conn: &C, key: i64) -> Result<(), DbErr>
where
    C: ConnectionTrait,
{
    conn.execute(Statement::from_sql_and_values(
        DbBackend::Postgres,
        "SELECT pg_advisory_xact_lock($1)",
        [key.into()],
    ))
    .await?;
    Ok(())
}
