use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Conversation, Message, User};

// -- JWT Claims --

/// Bearer token claims. `sub` is the user id, `email` the login handle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub exp: usize,
}

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub user_id: Uuid,
    pub token: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub user_id: Uuid,
    pub email: String,
    pub token: String,
}

// -- Home --

#[derive(Debug, Serialize, Deserialize)]
pub struct HomeResponse {
    pub user: CurrentUserView,
    pub alert: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUserView {
    pub id: Uuid,
    pub email: String,
}

// -- Users & blocks --

#[derive(Debug, Serialize, Deserialize)]
pub struct UserSummary {
    #[serde(flatten)]
    pub user: User,
    /// Whether the viewing user has blocked this user.
    pub blocked: bool,
}

/// Partial update returned by block/unblock for fragment requests.
#[derive(Debug, Serialize, Deserialize)]
pub struct BlockState {
    pub user_id: Uuid,
    pub blocked: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AlertResponse {
    pub alert: String,
}

// -- Conversations --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateConversationRequest {
    pub recipient_id: Uuid,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ConversationSummary {
    #[serde(flatten)]
    pub conversation: Conversation,
    pub other_party_id: Uuid,
}

// -- Messages --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateMessageRequest {
    pub message: MessageParams,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageParams {
    #[serde(default)]
    pub body: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageListResponse {
    pub conversation: Conversation,
    pub messages: Vec<Message>,
    /// Blank draft for the reply form.
    pub message: MessageParams,
}

/// State of the message form: a fresh draft, or a rejected submission with its errors.
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageFormResponse {
    pub conversation_id: Uuid,
    pub message: MessageParams,
    pub errors: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
