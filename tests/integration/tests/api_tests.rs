//! API Integration Tests
//!
//! Each test spawns a server on an ephemeral port backed by the in-memory
//! store and drives it over HTTP with identity tokens minted from the
//! shared test secret.
//!
//! Run with: cargo test -p integration-tests --test api_tests

use integration_tests::{
    assert_error, assert_json, assert_status, fixtures::*, Session, TestServer,
};
use reqwest::StatusCode;

async fn direct(server: &TestServer, from: &Session, to: &Session) -> String {
    let response = server
        .post_auth(
            "/api/v1/conversations/direct",
            &from.token,
            &DirectConversation {
                participant_id: &to.user_id,
            },
        )
        .await
        .expect("Request failed");
    assert_json::<IdBody>(response, StatusCode::OK).await.unwrap().id
}

async fn send(
    server: &TestServer,
    session: &Session,
    conversation_id: &str,
    content: &str,
) -> String {
    let response = server
        .post_auth(
            &format!("/api/v1/conversations/{conversation_id}/messages"),
            &session.token,
            &Content { content },
        )
        .await
        .expect("Request failed");
    assert_json::<IdBody>(response, StatusCode::CREATED).await.unwrap().id
}

async fn messages(
    server: &TestServer,
    session: &Session,
    conversation_id: &str,
) -> Vec<MessageBody> {
    let response = server
        .get_auth(
            &format!("/api/v1/conversations/{conversation_id}/messages"),
            &session.token,
        )
        .await
        .expect("Request failed");
    assert_json(response, StatusCode::OK).await.unwrap()
}

// ============================================================================
// Health Check Tests
// ============================================================================

#[tokio::test]
async fn test_health_check() {
    let server = TestServer::start().await.expect("Failed to start server");
    let response = server.get("/health").await.expect("Request failed");
    assert_status(response, StatusCode::OK).await.unwrap();
}

#[tokio::test]
async fn test_health_ready() {
    let server = TestServer::start().await.expect("Failed to start server");
    let response = server.get("/health/ready").await.expect("Request failed");
    assert_status(response, StatusCode::OK).await.unwrap();
}

// ============================================================================
// Authentication Tests
// ============================================================================

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let server = TestServer::start().await.expect("Failed to start server");
    let response = server.get("/api/v1/users/@me").await.expect("Request failed");
    assert_status(response, StatusCode::UNAUTHORIZED).await.unwrap();
}

#[tokio::test]
async fn test_invalid_token_is_unauthorized() {
    let server = TestServer::start().await.expect("Failed to start server");
    let response = server
        .get_auth("/api/v1/users/@me", "invalid.token.here")
        .await
        .expect("Request failed");
    let code = assert_error(response, StatusCode::UNAUTHORIZED).await.unwrap();
    assert_eq!(code, "INVALID_TOKEN");
}

#[tokio::test]
async fn test_unsynced_caller_is_not_found() {
    let server = TestServer::start().await.expect("Failed to start server");
    let token = server.token_for("idp|stranger");

    let response = server
        .get_auth("/api/v1/users/@me", &token)
        .await
        .expect("Request failed");
    let code = assert_error(response, StatusCode::NOT_FOUND).await.unwrap();
    assert_eq!(code, "USER_NOT_SYNCED");
}

// ============================================================================
// User Directory Tests
// ============================================================================

#[tokio::test]
async fn test_sync_is_idempotent_and_updates_profile() {
    let server = TestServer::start().await.expect("Failed to start server");
    let ada = server.sign_in("Ada").await.unwrap();

    let response = server
        .post_auth(
            "/api/v1/users/@me/sync",
            &ada.token,
            &SyncUser {
                name: "Ada Lovelace".to_string(),
                email: "ada@example.com".to_string(),
                avatar_url: None,
            },
        )
        .await
        .unwrap();
    let again: IdBody = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(again.id, ada.user_id);

    let response = server.get_auth("/api/v1/users/@me", &ada.token).await.unwrap();
    let me: CurrentUserBody = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(me.id, ada.user_id);
    assert_eq!(me.auth_id, "idp|ada");
    assert_eq!(me.display_name, "Ada Lovelace");
    assert_eq!(me.email, "ada@example.com");
}

#[tokio::test]
async fn test_sync_rejects_invalid_email() {
    let server = TestServer::start().await.expect("Failed to start server");
    let token = server.token_for("idp|ada");

    let response = server
        .post_auth(
            "/api/v1/users/@me/sync",
            &token,
            &SyncUser {
                name: "Ada".to_string(),
                email: "not-an-email".to_string(),
                avatar_url: None,
            },
        )
        .await
        .unwrap();
    let code = assert_error(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(code, "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_list_users_excludes_caller_and_reports_presence() {
    let server = TestServer::start().await.expect("Failed to start server");
    let ada = server.sign_in("Ada").await.unwrap();
    let bob = server.sign_in("Bob").await.unwrap();
    server.sign_in("Carol").await.unwrap();

    // syncing counts as a heartbeat
    let response = server.get_auth("/api/v1/users", &bob.token).await.unwrap();
    let users: Vec<UserSummaryBody> = assert_json(response, StatusCode::OK).await.unwrap();
    let names: Vec<_> = users.iter().map(|u| u.display_name.as_str()).collect();
    assert_eq!(names, ["Ada", "Carol"]);
    assert!(users.iter().all(|u| u.is_online));

    let response = server
        .put_auth("/api/v1/users/@me/presence", &ada.token, &Presence { is_online: false })
        .await
        .unwrap();
    assert_status(response, StatusCode::NO_CONTENT).await.unwrap();

    let response = server.get_auth("/api/v1/users", &bob.token).await.unwrap();
    let users: Vec<UserSummaryBody> = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(users[0].id, ada.user_id);
    assert!(!users[0].is_online);
    assert!(users[1].is_online);
}

#[tokio::test]
async fn test_heartbeat_reconnects() {
    let server = TestServer::start().await.expect("Failed to start server");
    let ada = server.sign_in("Ada").await.unwrap();

    let response = server
        .put_auth("/api/v1/users/@me/presence", &ada.token, &Presence { is_online: false })
        .await
        .unwrap();
    assert_status(response, StatusCode::NO_CONTENT).await.unwrap();

    let response = server.get_auth("/api/v1/users/@me", &ada.token).await.unwrap();
    let me: CurrentUserBody = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(!me.is_online);

    let response = server
        .post_empty("/api/v1/users/@me/heartbeat", &ada.token)
        .await
        .unwrap();
    assert_status(response, StatusCode::NO_CONTENT).await.unwrap();

    let response = server.get_auth("/api/v1/users/@me", &ada.token).await.unwrap();
    let me: CurrentUserBody = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(me.is_online);
}

// ============================================================================
// Conversation Tests
// ============================================================================

#[tokio::test]
async fn test_direct_conversation_is_resolved_once() {
    let server = TestServer::start().await.expect("Failed to start server");
    let ada = server.sign_in("Ada").await.unwrap();
    let bob = server.sign_in("Bob").await.unwrap();

    let first = direct(&server, &ada, &bob).await;
    let second = direct(&server, &bob, &ada).await;
    assert_eq!(first, second);

    let response = server
        .get_auth(&format!("/api/v1/conversations/{first}"), &ada.token)
        .await
        .unwrap();
    let detail: ConversationDetailBody = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(detail.id, first);
    assert!(!detail.is_group);
    assert_eq!(detail.other_user.map(|u| u.id), Some(bob.user_id.clone()));
    assert_eq!(detail.is_typing, Some(false));
}

#[tokio::test]
async fn test_direct_conversation_with_self_is_rejected() {
    let server = TestServer::start().await.expect("Failed to start server");
    let ada = server.sign_in("Ada").await.unwrap();

    let response = server
        .post_auth(
            "/api/v1/conversations/direct",
            &ada.token,
            &DirectConversation {
                participant_id: &ada.user_id,
            },
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::BAD_REQUEST).await.unwrap();
}

#[tokio::test]
async fn test_create_group() {
    let server = TestServer::start().await.expect("Failed to start server");
    let ada = server.sign_in("Ada").await.unwrap();
    let bob = server.sign_in("Bob").await.unwrap();
    let carol = server.sign_in("Carol").await.unwrap();

    let response = server
        .post_auth(
            "/api/v1/conversations/group",
            &ada.token,
            &GroupConversation {
                name: "  Engines  ",
                member_ids: vec![&bob.user_id, &carol.user_id],
            },
        )
        .await
        .unwrap();
    let group: IdBody = assert_json(response, StatusCode::CREATED).await.unwrap();

    let response = server
        .get_auth(&format!("/api/v1/conversations/{}", group.id), &carol.token)
        .await
        .unwrap();
    let detail: ConversationDetailBody = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(detail.is_group);
    assert_eq!(detail.name.as_deref(), Some("Engines"));
    assert_eq!(detail.member_count, Some(3));
    assert!(detail.is_typing.is_none());
}

#[tokio::test]
async fn test_create_group_with_unknown_member() {
    let server = TestServer::start().await.expect("Failed to start server");
    let ada = server.sign_in("Ada").await.unwrap();

    let response = server
        .post_auth(
            "/api/v1/conversations/group",
            &ada.token,
            &GroupConversation {
                name: "Ghosts",
                member_ids: vec!["4242"],
            },
        )
        .await
        .unwrap();
    let code = assert_error(response, StatusCode::NOT_FOUND).await.unwrap();
    assert_eq!(code, "UNKNOWN_USER");

    let response = server.get_auth("/api/v1/conversations", &ada.token).await.unwrap();
    let list: Vec<ConversationSummaryBody> = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(list.is_empty());
}

#[tokio::test]
async fn test_non_member_cannot_see_conversation() {
    let server = TestServer::start().await.expect("Failed to start server");
    let ada = server.sign_in("Ada").await.unwrap();
    let bob = server.sign_in("Bob").await.unwrap();
    let eve = server.sign_in("Eve").await.unwrap();
    let conversation = direct(&server, &ada, &bob).await;

    let response = server
        .get_auth(&format!("/api/v1/conversations/{conversation}"), &eve.token)
        .await
        .unwrap();
    let code = assert_error(response, StatusCode::NOT_FOUND).await.unwrap();
    assert_eq!(code, "UNKNOWN_CONVERSATION");

    let response = server
        .get_auth("/api/v1/conversations/4242", &eve.token)
        .await
        .unwrap();
    let code = assert_error(response, StatusCode::NOT_FOUND).await.unwrap();
    assert_eq!(code, "UNKNOWN_CONVERSATION");

    let response = server
        .get_auth(&format!("/api/v1/conversations/{conversation}/messages"), &eve.token)
        .await
        .unwrap();
    let code = assert_error(response, StatusCode::NOT_FOUND).await.unwrap();
    assert_eq!(code, "UNKNOWN_CONVERSATION");

    let response = server
        .post_auth(
            &format!("/api/v1/conversations/{conversation}/messages"),
            &eve.token,
            &Content { content: "hi" },
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::NOT_FOUND).await.unwrap();
}

#[tokio::test]
async fn test_invalid_conversation_id() {
    let server = TestServer::start().await.expect("Failed to start server");
    let ada = server.sign_in("Ada").await.unwrap();

    let response = server
        .get_auth("/api/v1/conversations/not-a-number", &ada.token)
        .await
        .unwrap();
    let code = assert_error(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(code, "INVALID_PATH_PARAMETER");
}

#[tokio::test]
async fn test_typing_indicator() {
    let server = TestServer::start().await.expect("Failed to start server");
    let ada = server.sign_in("Ada").await.unwrap();
    let bob = server.sign_in("Bob").await.unwrap();
    let conversation = direct(&server, &ada, &bob).await;
    let typing_path = format!("/api/v1/conversations/{conversation}/typing");
    let detail_path = format!("/api/v1/conversations/{conversation}");

    let response = server
        .put_auth(&typing_path, &bob.token, &Typing { is_typing: true })
        .await
        .unwrap();
    assert_status(response, StatusCode::NO_CONTENT).await.unwrap();

    let response = server.get_auth(&detail_path, &ada.token).await.unwrap();
    let detail: ConversationDetailBody = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(detail.is_typing, Some(true));

    // a viewer never sees their own typing
    let response = server.get_auth(&detail_path, &bob.token).await.unwrap();
    let detail: ConversationDetailBody = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(detail.is_typing, Some(false));

    let response = server
        .put_auth(&typing_path, &bob.token, &Typing { is_typing: false })
        .await
        .unwrap();
    assert_status(response, StatusCode::NO_CONTENT).await.unwrap();

    let response = server.get_auth(&detail_path, &ada.token).await.unwrap();
    let detail: ConversationDetailBody = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(detail.is_typing, Some(false));
}

#[tokio::test]
async fn test_unread_counts_and_mark_read() {
    let server = TestServer::start().await.expect("Failed to start server");
    let ada = server.sign_in("Ada").await.unwrap();
    let bob = server.sign_in("Bob").await.unwrap();
    let conversation = direct(&server, &ada, &bob).await;

    send(&server, &bob, &conversation, "one").await;
    send(&server, &bob, &conversation, "two").await;

    let response = server.get_auth("/api/v1/conversations", &ada.token).await.unwrap();
    let list: Vec<ConversationSummaryBody> = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].id, conversation);
    assert_eq!(list[0].unread_count, 2);
    assert_eq!(list[0].last_message.as_deref(), Some("two"));
    assert!(list[0].last_message_at.is_some());

    let response = server
        .post_empty(&format!("/api/v1/conversations/{conversation}/read"), &ada.token)
        .await
        .unwrap();
    assert_status(response, StatusCode::NO_CONTENT).await.unwrap();

    let response = server.get_auth("/api/v1/conversations", &ada.token).await.unwrap();
    let list: Vec<ConversationSummaryBody> = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(list[0].unread_count, 0);
}

// ============================================================================
// Message Tests
// ============================================================================

#[tokio::test]
async fn test_send_and_list_messages() {
    let server = TestServer::start().await.expect("Failed to start server");
    let ada = server.sign_in("Ada").await.unwrap();
    let bob = server.sign_in("Bob").await.unwrap();
    let conversation = direct(&server, &ada, &bob).await;

    let first = send(&server, &ada, &conversation, "hello").await;
    let second = send(&server, &bob, &conversation, "hi ada").await;

    let list = messages(&server, &bob, &conversation).await;
    let ids: Vec<_> = list.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, [first.as_str(), second.as_str()]);
    assert_eq!(list[0].conversation_id, conversation);
    assert_eq!(list[0].sender_id, ada.user_id);
    assert_eq!(list[0].sender_name.as_deref(), Some("Ada"));
    assert_eq!(list[1].content, "hi ada");
}

#[tokio::test]
async fn test_send_message_validation() {
    let server = TestServer::start().await.expect("Failed to start server");
    let ada = server.sign_in("Ada").await.unwrap();
    let bob = server.sign_in("Bob").await.unwrap();
    let conversation = direct(&server, &ada, &bob).await;
    let path = format!("/api/v1/conversations/{conversation}/messages");

    let response = server
        .post_auth(&path, &ada.token, &Content { content: "   " })
        .await
        .unwrap();
    assert_status(response, StatusCode::BAD_REQUEST).await.unwrap();

    let long = "x".repeat(4001);
    let response = server
        .post_auth(&path, &ada.token, &Content { content: &long })
        .await
        .unwrap();
    let code = assert_error(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(code, "CONTENT_TOO_LONG");
}

#[tokio::test]
async fn test_edit_message() {
    let server = TestServer::start().await.expect("Failed to start server");
    let ada = server.sign_in("Ada").await.unwrap();
    let bob = server.sign_in("Bob").await.unwrap();
    let conversation = direct(&server, &ada, &bob).await;
    let message = send(&server, &ada, &conversation, "helo").await;
    let path = format!("/api/v1/messages/{message}");

    let response = server
        .patch_auth(&path, &bob.token, &Content { content: "hijacked" })
        .await
        .unwrap();
    let code = assert_error(response, StatusCode::FORBIDDEN).await.unwrap();
    assert_eq!(code, "NOT_MESSAGE_AUTHOR");

    let response = server
        .patch_auth(&path, &ada.token, &Content { content: "hello" })
        .await
        .unwrap();
    assert_status(response, StatusCode::NO_CONTENT).await.unwrap();

    let list = messages(&server, &ada, &conversation).await;
    assert_eq!(list[0].content, "hello");
    assert!(list[0].is_edited);

    let response = server.get_auth("/api/v1/conversations", &bob.token).await.unwrap();
    let summaries: Vec<ConversationSummaryBody> =
        assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(summaries[0].last_message.as_deref(), Some("hello"));
}

#[tokio::test]
async fn test_delete_message() {
    let server = TestServer::start().await.expect("Failed to start server");
    let ada = server.sign_in("Ada").await.unwrap();
    let bob = server.sign_in("Bob").await.unwrap();
    let conversation = direct(&server, &ada, &bob).await;
    let message = send(&server, &ada, &conversation, "oops").await;
    let path = format!("/api/v1/messages/{message}");

    let response = server.delete_auth(&path, &bob.token).await.unwrap();
    assert_status(response, StatusCode::FORBIDDEN).await.unwrap();

    let response = server.delete_auth(&path, &ada.token).await.unwrap();
    assert_status(response, StatusCode::NO_CONTENT).await.unwrap();

    // deleting again is harmless
    let response = server.delete_auth(&path, &ada.token).await.unwrap();
    assert_status(response, StatusCode::NO_CONTENT).await.unwrap();

    let list = messages(&server, &bob, &conversation).await;
    assert!(list[0].deleted);

    let response = server
        .patch_auth(&path, &ada.token, &Content { content: "back" })
        .await
        .unwrap();
    let code = assert_error(response, StatusCode::CONFLICT).await.unwrap();
    assert_eq!(code, "MESSAGE_DELETED");

    let response = server
        .post_auth(&format!("{path}/reactions"), &bob.token, &Emoji { emoji: "👍" })
        .await
        .unwrap();
    assert_status(response, StatusCode::CONFLICT).await.unwrap();
}

#[tokio::test]
async fn test_unknown_message() {
    let server = TestServer::start().await.expect("Failed to start server");
    let ada = server.sign_in("Ada").await.unwrap();

    let response = server
        .patch_auth("/api/v1/messages/4242", &ada.token, &Content { content: "hello" })
        .await
        .unwrap();
    let code = assert_error(response, StatusCode::NOT_FOUND).await.unwrap();
    assert_eq!(code, "UNKNOWN_MESSAGE");
}

#[tokio::test]
async fn test_toggle_reaction() {
    let server = TestServer::start().await.expect("Failed to start server");
    let ada = server.sign_in("Ada").await.unwrap();
    let bob = server.sign_in("Bob").await.unwrap();
    let conversation = direct(&server, &ada, &bob).await;
    let message = send(&server, &ada, &conversation, "ship it").await;
    let path = format!("/api/v1/messages/{message}/reactions");

    let response = server
        .post_auth(&path, &bob.token, &Emoji { emoji: "🚀" })
        .await
        .unwrap();
    let toggled: ToggleBody = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(toggled.active);

    let list = messages(&server, &ada, &conversation).await;
    assert_eq!(list[0].reactions.len(), 1);
    assert_eq!(list[0].reactions[0].emoji, "🚀");
    assert_eq!(list[0].reactions[0].user_id, bob.user_id);

    let response = server
        .post_auth(&path, &bob.token, &Emoji { emoji: "🚀" })
        .await
        .unwrap();
    let toggled: ToggleBody = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(!toggled.active);

    let list = messages(&server, &ada, &conversation).await;
    assert!(list[0].reactions.is_empty());
}
