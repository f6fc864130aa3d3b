use crate::Database;
use crate::models::{ConversationRow, MessageRow, UserListingRow, UserRow};
use anyhow::Result;
use rusqlite::{Connection, ErrorCode, Row, TransactionBehavior, ffi};

impl Database {
    // -- Users --

    /// Returns `false` if the email is already registered.
    pub fn create_user(&self, id: &str, email: &str, password_hash: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let inserted = conn.execute(
                "INSERT INTO users (id, email, password) VALUES (?1, ?2, ?3)",
                (id, email, password_hash),
            );

            match inserted {
                Ok(_) => Ok(true),
                Err(e) if is_unique_violation(&e) => Ok(false),
                Err(e) => Err(e.into()),
            }
        })
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "email", email))
    }

    pub fn get_user_by_id(&self, id: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "id", id))
    }

    /// Every user except `viewer_id`, flagged with whether the viewer blocked them.
    pub fn list_users_except(&self, viewer_id: &str) -> Result<Vec<UserListingRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT u.id, u.email, u.created_at, b.id IS NOT NULL
                 FROM users u
                 LEFT JOIN blocks b ON b.blocker_id = ?1 AND b.blockee_id = u.id
                 WHERE u.id != ?1
                 ORDER BY u.email",
            )?;

            let rows = stmt
                .query_map([viewer_id], |row| {
                    Ok(UserListingRow {
                        id: row.get(0)?,
                        email: row.get(1)?,
                        created_at: row.get(2)?,
                        blocked: row.get(3)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    // -- Conversations --

    pub fn create_conversation(&self, id: &str, sender_id: &str, recipient_id: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO conversations (id, sender_id, recipient_id) VALUES (?1, ?2, ?3)",
                (id, sender_id, recipient_id),
            )?;
            Ok(())
        })
    }

    /// The conversation between `sender_id` and `recipient_id` in either
    /// direction, created with `id` if there is none yet. The lookup and the
    /// insert share one immediate transaction. Returns `(row, created)`.
    pub fn find_or_create_conversation(
        &self,
        id: &str,
        sender_id: &str,
        recipient_id: &str,
    ) -> Result<(ConversationRow, bool)> {
        self.with_conn(|conn| {
            let tx = rusqlite::Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;

            if let Some(existing) = query_conversation_between(&tx, sender_id, recipient_id)? {
                tx.commit()?;
                return Ok((existing, false));
            }

            tx.execute(
                "INSERT INTO conversations (id, sender_id, recipient_id) VALUES (?1, ?2, ?3)",
                (id, sender_id, recipient_id),
            )?;
            let row = tx.query_row(
                "SELECT id, sender_id, recipient_id, created_at FROM conversations WHERE id = ?1",
                [id],
                conversation_from_row,
            )?;
            tx.commit()?;

            Ok((row, true))
        })
    }

    pub fn get_conversation(&self, id: &str) -> Result<Option<ConversationRow>> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT id, sender_id, recipient_id, created_at FROM conversations WHERE id = ?1",
                [id],
                conversation_from_row,
            )
            .optional()
        })
    }

    /// The conversation between two users, whichever of them started it.
    pub fn find_conversation_between(&self, a: &str, b: &str) -> Result<Option<ConversationRow>> {
        self.with_conn(|conn| query_conversation_between(conn, a, b))
    }

    pub fn list_conversations_for(&self, user_id: &str) -> Result<Vec<ConversationRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, sender_id, recipient_id, created_at FROM conversations
                 WHERE sender_id = ?1 OR recipient_id = ?1
                 ORDER BY created_at DESC, rowid DESC",
            )?;

            let rows = stmt
                .query_map([user_id], conversation_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    // -- Messages --

    /// Insert a message and return it as stored, timestamp included.
    pub fn insert_message(
        &self,
        id: &str,
        conversation_id: &str,
        user_id: &str,
        body: &str,
    ) -> Result<MessageRow> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO messages (id, conversation_id, user_id, body) VALUES (?1, ?2, ?3, ?4)",
                (id, conversation_id, user_id, body),
            )?;

            let row = conn.query_row(
                &format!("{} WHERE m.id = ?1", MESSAGE_SELECT),
                [id],
                message_from_row,
            )?;
            Ok(row)
        })
    }

    /// All messages of a conversation in the order they were written.
    pub fn get_messages(&self, conversation_id: &str) -> Result<Vec<MessageRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "{} WHERE m.conversation_id = ?1 ORDER BY m.created_at ASC, m.rowid ASC",
                MESSAGE_SELECT
            ))?;

            let rows = stmt
                .query_map([conversation_id], message_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }
}

fn query_user(conn: &Connection, column: &str, value: &str) -> Result<Option<UserRow>> {
    let sql = format!(
        "SELECT id, email, password, created_at FROM users WHERE {} = ?1",
        column
    );
    let mut stmt = conn.prepare(&sql)?;

    let row = stmt
        .query_row([value], |row| {
            Ok(UserRow {
                id: row.get(0)?,
                email: row.get(1)?,
                password: row.get(2)?,
                created_at: row.get(3)?,
            })
        })
        .optional()?;

    Ok(row)
}

// JOIN users to fetch the author's email in the same query
const MESSAGE_SELECT: &str = "SELECT m.id, m.conversation_id, m.user_id, u.email, m.body, m.created_at
     FROM messages m
     LEFT JOIN users u ON m.user_id = u.id";

fn message_from_row(row: &Row<'_>) -> rusqlite::Result<MessageRow> {
    Ok(MessageRow {
        id: row.get(0)?,
        conversation_id: row.get(1)?,
        user_id: row.get(2)?,
        author_email: row
            .get::<_, Option<String>>(3)?
            .unwrap_or_else(|| "unknown".to_string()),
        body: row.get(4)?,
        created_at: row.get(5)?,
    })
}

fn query_conversation_between(
    conn: &Connection,
    a: &str,
    b: &str,
) -> Result<Option<ConversationRow>> {
    conn.query_row(
        "SELECT id, sender_id, recipient_id, created_at FROM conversations
         WHERE (sender_id = ?1 AND recipient_id = ?2)
            OR (sender_id = ?2 AND recipient_id = ?1)
         ORDER BY created_at, rowid
         LIMIT 1",
        [a, b],
        conversation_from_row,
    )
    .optional()
}

/// True when an insert was rejected by a UNIQUE index.
pub(crate) fn is_unique_violation(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(err, _)
            if err.code == ErrorCode::ConstraintViolation
                && err.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

fn conversation_from_row(row: &Row<'_>) -> rusqlite::Result<ConversationRow> {
    Ok(ConversationRow {
        id: row.get(0)?,
        sender_id: row.get(1)?,
        recipient_id: row.get(2)?,
        created_at: row.get(3)?,
    })
}

/// Extension trait for optional query results
pub(crate) trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
