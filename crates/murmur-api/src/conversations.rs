use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use tracing::info;
use uuid::Uuid;

use murmur_types::api::{ConversationSummary, CreateConversationRequest};

use crate::error::ApiError;
use crate::middleware::CurrentUser;
use crate::{AppState, convert, run_db};

/// GET /conversations — threads the current user takes part in, newest first.
pub async fn index(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<Vec<ConversationSummary>>, ApiError> {
    let uid = current.id.to_string();
    let rows = run_db(&state, move |db| db.list_conversations_for(&uid)).await?;

    let conversations = rows
        .iter()
        .map(|row| {
            let conversation = convert::conversation(row);
            ConversationSummary {
                other_party_id: conversation.other_party(current.id),
                conversation,
            }
        })
        .collect();

    Ok(Json(conversations))
}

/// POST /conversations — reuse the thread between the two users, or start one.
pub async fn create(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<CreateConversationRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.recipient_id == current.id {
        return Err(ApiError::Validation(
            "You cannot start a conversation with yourself".into(),
        ));
    }

    let recipient = req.recipient_id.to_string();
    let sender = current.id.to_string();
    let conversation_id = Uuid::new_v4();

    let (row, created) = run_db(&state, move |db| {
        if db.get_user_by_id(&recipient)?.is_none() {
            return Ok(None);
        }
        let id = conversation_id.to_string();
        db.find_or_create_conversation(&id, &sender, &recipient).map(Some)
    })
    .await?
    .ok_or(ApiError::NotFound("user"))?;

    let conversation = convert::conversation(&row);
    let summary = ConversationSummary {
        other_party_id: conversation.other_party(current.id),
        conversation,
    };

    if created {
        info!("User {} started conversation {}", current.id, summary.conversation.id);
        Ok((StatusCode::CREATED, Json(summary)))
    } else {
        Ok((StatusCode::OK, Json(summary)))
    }
}
