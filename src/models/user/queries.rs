use chrono::{DateTime, Utc};
use sqlx::{PgExecutor, PgPool};

use super::types::User;
use crate::auth::Role;
use crate::db::decode_error;
use crate::errors::AppError;

pub async fn find_all(pool: &PgPool) -> Result<Vec<User>, AppError> {
    #[derive(sqlx::FromRow)]
    struct Row {
        id: i64,
        username: String,
        display_name: String,
        email: String,
        role: String,
        created_at: DateTime<Utc>,
    }

    let rows = sqlx::query_as::<_, Row>(
        "SELECT id, username, display_name, email, role, created_at FROM users ORDER BY id",
    )
    .fetch_all(pool)
    .await?;

    rows.into_iter()
        .map(|row| {
            let role = Role::parse(&row.role).ok_or_else(|| decode_error("users.role", &row.role))?;
            Ok(User {
                id: row.id,
                username: row.username,
                display_name: row.display_name,
                email: row.email,
                role,
                created_at: row.created_at,
            })
        })
        .collect()
}

pub async fn upsert<'e, E: PgExecutor<'e>>(executor: E, user: &User) -> Result<(), AppError> {
    sqlx::query(
        "INSERT INTO users (id, username, display_name, email, role, created_at) \
         VALUES ($1, $2, $3, $4, $5, $6) \
         ON CONFLICT (id) DO UPDATE SET \
             username = EXCLUDED.username, \
             display_name = EXCLUDED.display_name, \
             email = EXCLUDED.email, \
             role = EXCLUDED.role",
    )
    .bind(user.id)
    .bind(&user.username)
    .bind(&user.display_name)
    .bind(&user.email)
    .bind(user.role.as_str())
    .bind(user.created_at)
    .execute(executor)
    .await?;
    Ok(())
}
