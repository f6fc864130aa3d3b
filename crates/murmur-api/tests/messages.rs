mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode, header},
};
use serde_json::json as body;

use murmur_types::api::{
    AlertResponse, ErrorResponse, HomeResponse, MessageFormResponse, MessageListResponse,
};
use murmur_types::models::Message;

use common::{TestApp, authed, json, location};

#[tokio::test]
async fn blocker_is_redirected_but_blockee_still_reads() {
    let app = TestApp::new();
    let ann = app.user("ann@example.com");
    let bob = app.user("bob@example.com");
    let conversation = app.conversation(&bob, &ann);
    let uri = format!("/conversations/{}/messages", conversation);

    app.post_json(&uri, &bob, body!({ "message": { "body": "hi ann" } }))
        .await;
    app.post_empty(&format!("/users/{}/block", bob.id), &ann).await;

    let resp = app.get(&uri, &ann).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/?alert=This+user+is+blocked.");

    let home: HomeResponse = json(app.get(location(&resp), &ann).await).await;
    assert_eq!(home.alert.as_deref(), Some("This user is blocked."));
    assert_eq!(home.user.id, ann.id);

    let resp = app.get(&uri, &bob).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let list: MessageListResponse = json(resp).await;
    assert_eq!(list.messages.len(), 1);
    assert_eq!(list.messages[0].body, "hi ann");
}

#[tokio::test]
async fn blocked_listing_as_fragment_is_forbidden() {
    let app = TestApp::new();
    let ann = app.user("ann@example.com");
    let bob = app.user("bob@example.com");
    let conversation = app.conversation(&ann, &bob);
    app.post_empty(&format!("/users/{}/block", bob.id), &ann).await;

    let req = authed(&ann, "GET", &format!("/conversations/{}/messages", conversation))
        .header(header::ACCEPT, "application/json")
        .body(Body::empty())
        .unwrap();
    let resp = app.send(req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let alert: AlertResponse = json(resp).await;
    assert_eq!(alert.alert, "This user is blocked.");
}

#[tokio::test]
async fn unblocking_restores_the_listing() {
    let app = TestApp::new();
    let ann = app.user("ann@example.com");
    let bob = app.user("bob@example.com");
    let conversation = app.conversation(&ann, &bob);
    let uri = format!("/conversations/{}/messages", conversation);

    app.post_empty(&format!("/users/{}/block", bob.id), &ann).await;
    assert_eq!(app.get(&uri, &ann).await.status(), StatusCode::SEE_OTHER);

    app.post_empty(&format!("/users/{}/unblock", bob.id), &ann).await;
    assert_eq!(app.get(&uri, &ann).await.status(), StatusCode::OK);
}

#[tokio::test]
async fn posted_messages_listed_in_order() {
    let app = TestApp::new();
    let ann = app.user("ann@example.com");
    let bob = app.user("bob@example.com");
    let conversation = app.conversation(&ann, &bob);
    let uri = format!("/conversations/{}/messages", conversation);

    let resp = app
        .post_json(&uri, &ann, body!({ "message": { "body": "hello" } }))
        .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), uri);

    app.post_json(&uri, &bob, body!({ "message": { "body": "hey" } }))
        .await;

    let list: MessageListResponse = json(app.get(&uri, &ann).await).await;
    let bodies: Vec<&str> = list.messages.iter().map(|m| m.body.as_str()).collect();
    assert_eq!(bodies, vec!["hello", "hey"]);
    assert_eq!(list.messages[0].user_id, ann.id);
    assert_eq!(list.messages[0].author_email, "ann@example.com");
    assert_eq!(list.conversation.id, conversation);
    assert!(list.message.body.is_empty());
}

#[tokio::test]
async fn fragment_create_returns_message() {
    let app = TestApp::new();
    let ann = app.user("ann@example.com");
    let bob = app.user("bob@example.com");
    let conversation = app.conversation(&ann, &bob);

    let req = authed(&ann, "POST", &format!("/conversations/{}/messages", conversation))
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::ACCEPT, "application/json")
        .body(Body::from(body!({ "message": { "body": "hello" } }).to_string()))
        .unwrap();
    let resp = app.send(req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let message: Message = json(resp).await;
    assert_eq!(message.body, "hello");
    assert_eq!(message.user_id, ann.id);
    assert_eq!(message.conversation_id, conversation);

    // The response carries the stored row, timestamp included.
    let list: MessageListResponse = json(
        app.get(&format!("/conversations/{}/messages", conversation), &ann)
            .await,
    )
    .await;
    assert_eq!(list.messages.len(), 1);
    assert_eq!(list.messages[0].id, message.id);
    assert_eq!(list.messages[0].created_at, message.created_at);
}

#[tokio::test]
async fn blank_body_not_persisted() {
    let app = TestApp::new();
    let ann = app.user("ann@example.com");
    let bob = app.user("bob@example.com");
    let conversation = app.conversation(&ann, &bob);
    let uri = format!("/conversations/{}/messages", conversation);

    app.post_json(&uri, &ann, body!({ "message": { "body": "kept" } }))
        .await;

    for blank in ["", "   "] {
        let resp = app
            .post_json(&uri, &ann, body!({ "message": { "body": blank } }))
            .await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let form: MessageFormResponse = json(resp).await;
        assert_eq!(form.errors, vec!["Body can't be blank".to_string()]);
        assert_eq!(form.message.body, blank);
    }

    let resp = app.post_json(&uri, &ann, body!({ "message": {} })).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    assert_eq!(app.message_bodies(conversation), vec!["kept".to_string()]);
}

#[tokio::test]
async fn blocked_user_can_still_post() {
    let app = TestApp::new();
    let ann = app.user("ann@example.com");
    let bob = app.user("bob@example.com");
    let conversation = app.conversation(&ann, &bob);
    let uri = format!("/conversations/{}/messages", conversation);

    app.post_empty(&format!("/users/{}/block", bob.id), &ann).await;

    let resp = app
        .post_json(&uri, &ann, body!({ "message": { "body": "still here" } }))
        .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(app.message_bodies(conversation), vec!["still here".to_string()]);
}

#[tokio::test]
async fn draft_form_is_blank() {
    let app = TestApp::new();
    let ann = app.user("ann@example.com");
    let bob = app.user("bob@example.com");
    let conversation = app.conversation(&ann, &bob);

    let resp = app
        .get(&format!("/conversations/{}/messages/new", conversation), &ann)
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let form: MessageFormResponse = json(resp).await;
    assert_eq!(form.conversation_id, conversation);
    assert!(form.message.body.is_empty());
    assert!(form.errors.is_empty());
}

#[tokio::test]
async fn missing_or_foreign_conversation() {
    let app = TestApp::new();
    let ann = app.user("ann@example.com");
    let bob = app.user("bob@example.com");
    let eve = app.user("eve@example.com");
    let conversation = app.conversation(&ann, &bob);

    let resp = app
        .get(&format!("/conversations/{}/messages", uuid::Uuid::new_v4()), &ann)
        .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let uri = format!("/conversations/{}/messages", conversation);
    assert_eq!(app.get(&uri, &eve).await.status(), StatusCode::FORBIDDEN);
    let resp = app
        .post_json(&uri, &eve, body!({ "message": { "body": "psst" } }))
        .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert!(app.message_bodies(conversation).is_empty());
}

#[tokio::test]
async fn malformed_conversation_id_is_not_found() {
    let app = TestApp::new();
    let ann = app.user("ann@example.com");

    for uri in ["/conversations/42/messages", "/conversations/42/messages/new"] {
        let resp = app.get(uri, &ann).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let err: ErrorResponse = json(resp).await;
        assert_eq!(err.error, "conversation not found");
    }

    let resp = app
        .post_json("/conversations/42/messages", &ann, body!({ "message": { "body": "hi" } }))
        .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let err: ErrorResponse = json(resp).await;
    assert_eq!(err.error, "conversation not found");
}

#[tokio::test]
async fn requests_without_token_rejected() {
    let app = TestApp::new();
    let ann = app.user("ann@example.com");
    let bob = app.user("bob@example.com");
    let conversation = app.conversation(&ann, &bob);

    let req = Request::builder()
        .uri(format!("/conversations/{}/messages", conversation))
        .body(Body::empty())
        .unwrap();
    assert_eq!(app.send(req).await.status(), StatusCode::UNAUTHORIZED);

    let req = Request::builder()
        .uri("/users")
        .header(header::AUTHORIZATION, "Bearer not.a.token")
        .body(Body::empty())
        .unwrap();
    assert_eq!(app.send(req).await.status(), StatusCode::UNAUTHORIZED);
}
