#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, Response, header},
};
use http_body_util::BodyExt;
use serde::de::DeserializeOwned;
use tower::ServiceExt;
use uuid::Uuid;

use murmur_api::{AppState, AppStateInner, auth::create_token, router};
use murmur_db::Database;

pub const SECRET: &str = "test-secret";

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
}

pub struct TestUser {
    pub id: Uuid,
    pub token: String,
}

impl TestApp {
    pub fn new() -> Self {
        let state = Arc::new(AppStateInner {
            db: Database::open_in_memory().unwrap(),
            jwt_secret: SECRET.to_string(),
        });
        Self {
            router: router(state.clone()),
            state,
        }
    }

    /// Insert a user directly and mint a token for them.
    pub fn user(&self, email: &str) -> TestUser {
        let id = Uuid::new_v4();
        self.state
            .db
            .create_user(&id.to_string(), email, "not-a-real-hash")
            .unwrap();
        TestUser {
            id,
            token: create_token(SECRET, id, email).unwrap(),
        }
    }

    pub fn conversation(&self, sender: &TestUser, recipient: &TestUser) -> Uuid {
        let id = Uuid::new_v4();
        self.state
            .db
            .create_conversation(
                &id.to_string(),
                &sender.id.to_string(),
                &recipient.id.to_string(),
            )
            .unwrap();
        id
    }

    pub fn message_bodies(&self, conversation_id: Uuid) -> Vec<String> {
        self.state
            .db
            .get_messages(&conversation_id.to_string())
            .unwrap()
            .into_iter()
            .map(|m| m.body)
            .collect()
    }

    pub async fn send(&self, req: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(req).await.unwrap()
    }

    pub async fn get(&self, uri: &str, user: &TestUser) -> Response<Body> {
        self.send(authed(user, "GET", uri).body(Body::empty()).unwrap())
            .await
    }

    pub async fn post_json(
        &self,
        uri: &str,
        user: &TestUser,
        body: serde_json::Value,
    ) -> Response<Body> {
        self.send(
            authed(user, "POST", uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    pub async fn post_empty(&self, uri: &str, user: &TestUser) -> Response<Body> {
        self.send(authed(user, "POST", uri).body(Body::empty()).unwrap())
            .await
    }
}

pub fn authed(user: &TestUser, method: &str, uri: &str) -> axum::http::request::Builder {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", user.token))
}

pub async fn json<T: DeserializeOwned>(resp: Response<Body>) -> T {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub fn location(resp: &Response<Body>) -> &str {
    resp.headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}
