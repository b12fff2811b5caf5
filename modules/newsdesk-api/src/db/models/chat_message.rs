use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use newsdesk_common::{Role, TranscriptMessage};

use crate::db::StoreError;

type MessageTuple = (Uuid, Uuid, String, String, DateTime<Utc>, DateTime<Utc>);

fn row_to_message(
    (id, session_id, role, content, created_at, updated_at): MessageTuple,
) -> Result<TranscriptMessage, StoreError> {
    let role = role.parse::<Role>().map_err(|message| StoreError::Corrupt {
        table: "chat_messages",
        message,
    })?;
    Ok(TranscriptMessage {
        id,
        session_id,
        role,
        content,
        created_at,
        updated_at,
    })
}

pub async fn insert(
    pool: &PgPool,
    session_id: Uuid,
    role: Role,
    content: &str,
) -> Result<TranscriptMessage, StoreError> {
    let row = sqlx::query_as::<_, MessageTuple>(
        r#"
        INSERT INTO chat_messages (id, session_id, role, content)
        VALUES ($1, $2, $3, $4)
        RETURNING id, session_id, role, content, created_at, updated_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(session_id)
    .bind(role.as_str())
    .bind(content)
    .fetch_one(pool)
    .await?;

    row_to_message(row)
}

/// Transcript for a session, oldest first. `seq` breaks ties between rows
/// written within the same clock tick.
pub async fn list_by_session(
    pool: &PgPool,
    session_id: Uuid,
) -> Result<Vec<TranscriptMessage>, StoreError> {
    let rows = sqlx::query_as::<_, MessageTuple>(
        r#"
        SELECT id, session_id, role, content, created_at, updated_at
        FROM chat_messages
        WHERE session_id = $1
        ORDER BY created_at ASC, seq ASC
        "#,
    )
    .bind(session_id)
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(row_to_message).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_role_is_corrupt() {
        let now = Utc::now();
        let row = (Uuid::nil(), Uuid::nil(), "system".to_string(), "x".to_string(), now, now);
        assert!(matches!(
            row_to_message(row),
            Err(StoreError::Corrupt { table: "chat_messages", .. })
        ));
    }

    #[test]
    fn maps_known_role() {
        let now = Utc::now();
        let row = (Uuid::nil(), Uuid::nil(), "assistant".to_string(), "hi".to_string(), now, now);
        let message = row_to_message(row).unwrap();
        assert_eq!(message.role, Role::Assistant);
        assert_eq!(message.content, "hi");
    }
}
