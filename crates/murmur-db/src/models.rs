//! Database row types. These map directly to SQLite rows and stay
//! independent of the murmur-types API models.

pub struct UserRow {
    pub id: String,
    pub email: String,
    pub password: String,
    pub created_at: String,
}

/// A user as seen from another user's listing.
pub struct UserListingRow {
    pub id: String,
    pub email: String,
    pub created_at: String,
    pub blocked: bool,
}

pub struct ConversationRow {
    pub id: String,
    pub sender_id: String,
    pub recipient_id: String,
    pub created_at: String,
}

pub struct MessageRow {
    pub id: String,
    pub conversation_id: String,
    pub user_id: String,
    pub author_email: String,
    pub body: String,
    pub created_at: String,
}
