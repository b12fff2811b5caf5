use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use newsdesk_common::Session;

use crate::db::StoreError;

type SessionTuple = (Uuid, Uuid, String, DateTime<Utc>, DateTime<Utc>);

fn row_to_session((id, user_id, title, created_at, updated_at): SessionTuple) -> Session {
    Session {
        id,
        owner_id: user_id,
        title,
        created_at,
        updated_at,
    }
}

pub async fn insert(pool: &PgPool, user_id: Uuid, title: &str) -> Result<Session, StoreError> {
    let row = sqlx::query_as::<_, SessionTuple>(
        r#"
        INSERT INTO chat_sessions (id, user_id, title)
        VALUES ($1, $2, $3)
        RETURNING id, user_id, title, created_at, updated_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(title)
    .fetch_one(pool)
    .await?;

    Ok(row_to_session(row))
}

/// Newest first.
pub async fn list_by_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Session>, StoreError> {
    let rows = sqlx::query_as::<_, SessionTuple>(
        r#"
        SELECT id, user_id, title, created_at, updated_at
        FROM chat_sessions
        WHERE user_id = $1
        ORDER BY created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(row_to_session).collect())
}

/// Only matches when `user_id` owns the session.
pub async fn find_owned(
    pool: &PgPool,
    id: Uuid,
    user_id: Uuid,
) -> Result<Option<Session>, StoreError> {
    let row = sqlx::query_as::<_, SessionTuple>(
        r#"
        SELECT id, user_id, title, created_at, updated_at
        FROM chat_sessions
        WHERE id = $1 AND user_id = $2
        "#,
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(row_to_session))
}
