use axum::{
    Extension, Json,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use tracing::{info, warn};
use uuid::Uuid;

use murmur_db::models::UserRow;
use murmur_types::api::{BlockState, UserSummary};

use crate::error::ApiError;
use crate::format::Format;
use crate::middleware::CurrentUser;
use crate::{AppState, convert, run_db};

/// GET /users — everyone except the current user.
pub async fn index(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<Vec<UserSummary>>, ApiError> {
    let viewer = current.id.to_string();
    let rows = run_db(&state, move |db| db.list_users_except(&viewer)).await?;

    Ok(Json(rows.into_iter().map(convert::user_summary).collect()))
}

/// POST /users/{id}/block
pub async fn block(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Extension(current): Extension<CurrentUser>,
    format: Format,
) -> Result<Response, ApiError> {
    let (user_id, target) = find_user(&state, &user_id).await?;
    if user_id == current.id {
        return Err(ApiError::Validation("You cannot block yourself".into()));
    }

    let block_id = Uuid::new_v4().to_string();
    let blocker = current.id.to_string();
    let created = run_db(&state, move |db| db.block_user(&block_id, &blocker, &target.id)).await?;

    if !created {
        warn!("User {} already blocks {}", current.id, user_id);
        return Err(ApiError::Conflict("User is already blocked".into()));
    }

    info!("User {} blocked {}", current.id, user_id);
    Ok(block_state(format, user_id, true))
}

/// POST /users/{id}/unblock
pub async fn unblock(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Extension(current): Extension<CurrentUser>,
    format: Format,
) -> Result<Response, ApiError> {
    let (user_id, target) = find_user(&state, &user_id).await?;

    let blocker = current.id.to_string();
    let removed = run_db(&state, move |db| db.unblock_user(&blocker, &target.id)).await?;

    if !removed {
        warn!("User {} tried to unblock {} without a block", current.id, user_id);
        return Err(ApiError::NotFound("block"));
    }

    info!("User {} unblocked {}", current.id, user_id);
    Ok(block_state(format, user_id, false))
}

/// Look up the target of a block/unblock. Ids that are not UUIDs cannot exist.
async fn find_user(state: &AppState, raw_id: &str) -> Result<(Uuid, UserRow), ApiError> {
    let user_id = convert::path_id(raw_id, "user")?;
    let id = user_id.to_string();
    let row = run_db(state, move |db| db.get_user_by_id(&id))
        .await?
        .ok_or(ApiError::NotFound("user"))?;

    Ok((user_id, row))
}

fn block_state(format: Format, user_id: Uuid, blocked: bool) -> Response {
    match format {
        Format::Page => Redirect::to("/").into_response(),
        Format::Fragment => Json(BlockState { user_id, blocked }).into_response(),
    }
}
