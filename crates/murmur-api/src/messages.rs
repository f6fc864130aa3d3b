use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use tracing::{info, warn};
use uuid::Uuid;

use murmur_types::api::{
    AlertResponse, CreateMessageRequest, MessageFormResponse, MessageListResponse, MessageParams,
};
use murmur_types::models::Conversation;

use crate::error::ApiError;
use crate::format::Format;
use crate::middleware::CurrentUser;
use crate::{AppState, convert, run_db};

pub const BLOCKED_ALERT: &str = "This user is blocked.";

const BLANK_BODY: &str = "Body can't be blank";

/// GET /conversations/{conversation_id}/messages
///
/// Denied when the current user has blocked the other participant. Only that
/// direction is checked: being blocked by the other side does not hide the thread.
pub async fn index(
    State(state): State<AppState>,
    Path(conversation_id): Path<String>,
    Extension(current): Extension<CurrentUser>,
    format: Format,
) -> Result<Response, ApiError> {
    let conversation = find_conversation(&state, &conversation_id, &current).await?;
    let conversation_id = conversation.id;
    let other_party = conversation.other_party(current.id);

    let (viewer, other, cid) = (
        current.id.to_string(),
        other_party.to_string(),
        conversation_id.to_string(),
    );
    let rows = run_db(&state, move |db| {
        if db.is_blocked(&viewer, &other)? {
            return Ok(None);
        }
        db.get_messages(&cid).map(Some)
    })
    .await?;

    let Some(rows) = rows else {
        info!(
            "User {} denied conversation {}: blocked {}",
            current.id, conversation_id, other_party
        );
        return blocked(format);
    };

    let messages: Vec<_> = rows.into_iter().map(convert::message).collect();

    Ok(Json(MessageListResponse {
        conversation,
        messages,
        message: MessageParams::default(),
    })
    .into_response())
}

/// GET /conversations/{conversation_id}/messages/new
pub async fn new(
    State(state): State<AppState>,
    Path(conversation_id): Path<String>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<MessageFormResponse>, ApiError> {
    let conversation_id = find_conversation(&state, &conversation_id, &current).await?.id;

    Ok(Json(MessageFormResponse {
        conversation_id,
        message: MessageParams::default(),
        errors: vec![],
    }))
}

/// POST /conversations/{conversation_id}/messages
///
/// Posting is not gated on blocks.
pub async fn create(
    State(state): State<AppState>,
    Path(conversation_id): Path<String>,
    Extension(current): Extension<CurrentUser>,
    format: Format,
    Json(req): Json<CreateMessageRequest>,
) -> Result<Response, ApiError> {
    let conversation_id = find_conversation(&state, &conversation_id, &current).await?.id;

    if req.message.body.trim().is_empty() {
        warn!(
            "Rejected blank message from {} in conversation {}",
            current.id, conversation_id
        );
        let form = MessageFormResponse {
            conversation_id,
            message: req.message,
            errors: vec![BLANK_BODY.to_string()],
        };
        return Ok((StatusCode::UNPROCESSABLE_ENTITY, Json(form)).into_response());
    }

    let message_id = Uuid::new_v4();
    let body = req.message.body;

    let (mid, cid, uid) = (
        message_id.to_string(),
        conversation_id.to_string(),
        current.id.to_string(),
    );
    let stored = run_db(&state, move |db| db.insert_message(&mid, &cid, &uid, &body)).await?;

    info!("User {} posted {} to conversation {}", current.id, message_id, conversation_id);

    match format {
        Format::Page => {
            Ok(Redirect::to(&format!("/conversations/{}/messages", conversation_id)).into_response())
        }
        Format::Fragment => {
            Ok((StatusCode::CREATED, Json(convert::message(stored))).into_response())
        }
    }
}

/// Load a conversation the current user takes part in.
/// An id that is not a UUID cannot exist, so it is reported as not found.
async fn find_conversation(
    state: &AppState,
    conversation_id: &str,
    current: &CurrentUser,
) -> Result<Conversation, ApiError> {
    let id = convert::path_id(conversation_id, "conversation")?.to_string();
    let row = run_db(state, move |db| db.get_conversation(&id))
        .await?
        .ok_or(ApiError::NotFound("conversation"))?;

    let conversation = convert::conversation(&row);
    if !conversation.involves(current.id) {
        warn!(
            "User {} is not a participant of conversation {}",
            current.id, conversation_id
        );
        return Err(ApiError::Forbidden);
    }

    Ok(conversation)
}

fn blocked(format: Format) -> Result<Response, ApiError> {
    match format {
        Format::Page => {
            let query = serde_urlencoded::to_string(&[("alert", BLOCKED_ALERT)])
                .map_err(anyhow::Error::from)?;
            Ok(Redirect::to(&format!("/?{}", query)).into_response())
        }
        Format::Fragment => Ok((
            StatusCode::FORBIDDEN,
            Json(AlertResponse {
                alert: BLOCKED_ALERT.to_string(),
            }),
        )
            .into_response()),
    }
}
