use axum::{
    Extension, Json,
    extract::Query,
};
use serde::Deserialize;

use murmur_types::api::{CurrentUserView, HomeResponse};

use crate::middleware::CurrentUser;

#[derive(Debug, Deserialize)]
pub struct HomeQuery {
    /// Flash message carried over from a redirect.
    pub alert: Option<String>,
}

/// GET / — landing view for the signed-in user.
pub async fn home(
    Extension(current): Extension<CurrentUser>,
    Query(query): Query<HomeQuery>,
) -> Json<HomeResponse> {
    Json(HomeResponse {
        user: CurrentUserView {
            id: current.id,
            email: current.email,
        },
        alert: query.alert,
    })
}
