//! Store rows to API models.
//!
//! SQLite holds ids and timestamps as text. Rows that fail to parse are
//! logged and surfaced with default values rather than failing the request.

use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::warn;
use uuid::Uuid;

use murmur_db::models::{ConversationRow, MessageRow, UserListingRow};
use murmur_types::api::UserSummary;
use murmur_types::models::{Conversation, Message, User};

use crate::error::ApiError;

pub(crate) fn parse_id(raw: &str, what: &str) -> Uuid {
    raw.parse().unwrap_or_else(|e| {
        warn!("Corrupt {} '{}': {}", what, raw, e);
        Uuid::default()
    })
}

/// Parse a primary key taken from the URL. Anything that is not a UUID
/// names a record that cannot exist.
pub(crate) fn path_id(raw: &str, what: &'static str) -> Result<Uuid, ApiError> {
    raw.parse().map_err(|_| {
        warn!("Lookup of {} with malformed id '{}'", what, raw);
        ApiError::NotFound(what)
    })
}

pub(crate) fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    raw.parse::<DateTime<Utc>>()
        .or_else(|_| {
            // SQLite's datetime('now') has no timezone; it is UTC.
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            warn!("Corrupt timestamp '{}': {}", raw, e);
            DateTime::default()
        })
}

pub(crate) fn user_summary(row: UserListingRow) -> UserSummary {
    UserSummary {
        user: User {
            id: parse_id(&row.id, "user id"),
            email: row.email,
            created_at: parse_timestamp(&row.created_at),
        },
        blocked: row.blocked,
    }
}

pub(crate) fn conversation(row: &ConversationRow) -> Conversation {
    Conversation {
        id: parse_id(&row.id, "conversation id"),
        sender_id: parse_id(&row.sender_id, "sender_id"),
        recipient_id: parse_id(&row.recipient_id, "recipient_id"),
        created_at: parse_timestamp(&row.created_at),
    }
}

pub(crate) fn message(row: MessageRow) -> Message {
    Message {
        id: parse_id(&row.id, "message id"),
        conversation_id: parse_id(&row.conversation_id, "conversation_id"),
        user_id: parse_id(&row.user_id, "user_id"),
        author_email: row.author_email,
        body: row.body,
        created_at: parse_timestamp(&row.created_at),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sqlite_timestamp_is_utc() {
        let ts = parse_timestamp("2024-03-01 12:30:45");
        assert_eq!(ts.to_rfc3339(), "2024-03-01T12:30:45+00:00");
    }

    #[test]
    fn rfc3339_timestamp_accepted() {
        let ts = parse_timestamp("2024-03-01T12:30:45Z");
        assert_eq!(ts, parse_timestamp("2024-03-01 12:30:45"));
    }

    #[test]
    fn malformed_path_id_is_not_found() {
        assert!(matches!(path_id("42", "user"), Err(ApiError::NotFound("user"))));
        let id = Uuid::new_v4();
        assert_eq!(path_id(&id.to_string(), "user").unwrap(), id);
    }

    #[test]
    fn corrupt_values_fall_back_to_defaults() {
        assert_eq!(parse_id("not-a-uuid", "user id"), Uuid::default());
        assert_eq!(parse_timestamp("yesterday"), DateTime::<Utc>::default());
    }
}
