use serde_json::Value;

use crate::auth::ActingUser;
use crate::db::Store;
use crate::errors::AppError;

/// Record who did what to which record. In memory mode the entry only goes
/// to the log.
pub async fn log(
    store: &Store,
    actor: &ActingUser,
    action: &str,
    target_type: &str,
    target_id: i64,
    details: Value,
) -> Result<(), AppError> {
    log::info!(
        "audit: user {} ({}) {} {} {}",
        actor.user_id,
        actor.role,
        action,
        target_type,
        target_id
    );
    let Some(pool) = store.pool() else {
        return Ok(());
    };
    sqlx::query(
        "INSERT INTO audit_log (user_id, action, target_type, target_id, details) \
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(actor.user_id)
    .bind(action)
    .bind(target_type)
    .bind(target_id)
    .bind(details.to_string())
    .execute(pool)
    .await?;
    Ok(())
}

/// Drop audit rows older than the retention window. Returns the number removed.
pub async fn cleanup_old_entries(store: &Store, retention_days: i64) -> Result<u64, AppError> {
    let Some(pool) = store.pool() else {
        return Ok(0);
    };
    let result = sqlx::query(
        "DELETE FROM audit_log WHERE created_at < now() - make_interval(days => $1)",
    )
    .bind(i32::try_from(retention_days).unwrap_or(i32::MAX))
    .execute(pool)
    .await?;
    if result.rows_affected() > 0 {
        log::info!("Removed {} audit entries older than {} days", result.rows_affected(), retention_days);
    }
    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;

    #[tokio::test]
    async fn memory_store_audit_is_a_no_op() {
        let actor = ActingUser::new(1, Role::Admin);
        let details = serde_json::json!({ "summary": "case assigned" });
        assert!(log(&Store::Memory, &actor, "case.assigned", "case", 4, details).await.is_ok());
        assert_eq!(cleanup_old_entries(&Store::Memory, 90).await.unwrap(), 0);
    }
}
