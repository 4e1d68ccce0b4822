//! Conversation resolution, groups, typing and read tracking

mod common;

use common::{domain, Harness};
use huddle_core::{DomainError, MembershipRepository, Snowflake};
use huddle_service::dto::CreateGroupRequest;

fn group(name: &str, member_ids: Vec<Snowflake>) -> CreateGroupRequest {
    CreateGroupRequest {
        name: name.to_string(),
        member_ids,
    }
}

async fn member_ids(h: &Harness, conversation_id: Snowflake) -> Vec<Snowflake> {
    let mut ids: Vec<_> = h
        .ctx
        .membership_repo()
        .find_by_conversation(conversation_id)
        .await
        .unwrap()
        .into_iter()
        .map(|m| m.user_id)
        .collect();
    ids.sort();
    ids
}

#[tokio::test]
async fn test_resolve_direct_is_idempotent() {
    let h = Harness::new();
    let a = h.user("Ada").await;
    let b = h.user("Bob").await;

    let first = h.conversations().resolve_direct(a, b).await.unwrap();
    let second = h.conversations().resolve_direct(a, b).await.unwrap();
    let reversed = h.conversations().resolve_direct(b, a).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first, reversed);

    let mut expected = vec![a, b];
    expected.sort();
    assert_eq!(member_ids(&h, first).await, expected);

    let detail = h.conversations().get_conversation(first, Some(a)).await.unwrap().unwrap();
    assert!(!detail.is_group);
    assert_eq!(detail.other_user.unwrap().id, b.to_string());

    let created = h
        .events
        .event_types()
        .into_iter()
        .filter(|t| *t == "CONVERSATION_CREATED")
        .count();
    assert_eq!(created, 1);
}

#[tokio::test]
async fn test_resolve_direct_ignores_groups() {
    let h = Harness::new();
    let a = h.user("Ada").await;
    let b = h.user("Bob").await;

    let team = h.conversations().create_group(a, &group("Pair", vec![b])).await.unwrap();
    let direct = h.conversations().resolve_direct(a, b).await.unwrap();

    assert_ne!(team, direct);
}

#[tokio::test]
async fn test_resolve_direct_validation() {
    let h = Harness::new();
    let a = h.user("Ada").await;

    let err = h.conversations().resolve_direct(a, a).await.unwrap_err();
    assert!(matches!(domain(&err), DomainError::ValidationError(_)));

    let err = h
        .conversations()
        .resolve_direct(a, Snowflake::new(404))
        .await
        .unwrap_err();
    assert!(matches!(domain(&err), DomainError::UserNotFound(_)));
}

#[tokio::test]
async fn test_create_group_members() {
    let h = Harness::new();
    let a = h.user("Ada").await;
    let b = h.user("Bob").await;
    let c = h.user("Carol").await;

    let id = h
        .conversations()
        .create_group(a, &group("  Team  ", vec![b, c, b]))
        .await
        .unwrap();

    let mut expected = vec![a, b, c];
    expected.sort();
    assert_eq!(member_ids(&h, id).await, expected);

    let detail = h.conversations().get_conversation(id, Some(c)).await.unwrap().unwrap();
    assert!(detail.is_group);
    assert_eq!(detail.name.as_deref(), Some("Team"));
    assert_eq!(detail.member_count, Some(3));
    assert!(detail.other_user.is_none());
    assert!(detail.is_typing.is_none());
}

#[tokio::test]
async fn test_create_group_validation() {
    let h = Harness::new();
    let a = h.user("Ada").await;
    let b = h.user("Bob").await;

    let err = h.conversations().create_group(a, &group("   ", vec![b])).await.unwrap_err();
    assert_eq!(err.status_code(), 400);

    let err = h.conversations().create_group(a, &group("Team", vec![])).await.unwrap_err();
    assert_eq!(err.status_code(), 400);

    let err = h.conversations().create_group(a, &group("Solo", vec![a])).await.unwrap_err();
    assert!(matches!(domain(&err), DomainError::ValidationError(_)));
}

#[tokio::test]
async fn test_create_group_unknown_member_leaves_nothing() {
    let h = Harness::new();
    let a = h.user("Ada").await;
    let b = h.user("Bob").await;

    let err = h
        .conversations()
        .create_group(a, &group("Team", vec![b, Snowflake::new(404)]))
        .await
        .unwrap_err();
    assert!(matches!(domain(&err), DomainError::UserNotFound(id) if *id == Snowflake::new(404)));

    assert!(h.conversations().list_conversations(a).await.unwrap().is_empty());
    assert!(h.conversations().list_conversations(b).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_get_conversation_hides_from_non_members() {
    let h = Harness::new();
    let a = h.user("Ada").await;
    let b = h.user("Bob").await;
    let c = h.user("Carol").await;
    let id = h.conversations().resolve_direct(a, b).await.unwrap();

    assert!(h.conversations().get_conversation(id, Some(c)).await.unwrap().is_none());
    assert!(h
        .conversations()
        .get_conversation(Snowflake::new(404), Some(a))
        .await
        .unwrap()
        .is_none());
    assert!(h.conversations().get_conversation(id, None).await.unwrap().is_some());
}

#[tokio::test]
async fn test_typing_lease_expires() {
    let h = Harness::new();
    let a = h.user("Ada").await;
    let b = h.user("Bob").await;
    let id = h.conversations().resolve_direct(a, b).await.unwrap();

    h.conversations().set_typing(id, a, true).await.unwrap();

    let is_typing = |detail: Option<huddle_service::dto::ConversationDetailResponse>| {
        detail.and_then(|d| d.is_typing)
    };

    let seen_by_b = h.conversations().get_conversation(id, Some(b)).await.unwrap();
    assert_eq!(is_typing(seen_by_b), Some(true));

    // the typist does not see themselves typing
    let seen_by_a = h.conversations().get_conversation(id, Some(a)).await.unwrap();
    assert_eq!(is_typing(seen_by_a), Some(false));

    h.advance_ms(1999);
    let seen_by_b = h.conversations().get_conversation(id, Some(b)).await.unwrap();
    assert_eq!(is_typing(seen_by_b), Some(true));

    h.advance_ms(1);
    let seen_by_b = h.conversations().get_conversation(id, Some(b)).await.unwrap();
    assert_eq!(is_typing(seen_by_b), Some(false));
}

#[tokio::test]
async fn test_typing_cleared_explicitly() {
    let h = Harness::new();
    let a = h.user("Ada").await;
    let b = h.user("Bob").await;
    let id = h.conversations().resolve_direct(a, b).await.unwrap();

    h.conversations().set_typing(id, a, true).await.unwrap();
    h.conversations().set_typing(id, a, false).await.unwrap();

    let detail = h.conversations().get_conversation(id, Some(b)).await.unwrap().unwrap();
    assert_eq!(detail.is_typing, Some(false));
}

#[tokio::test]
async fn test_typing_and_read_require_membership() {
    let h = Harness::new();
    let a = h.user("Ada").await;
    let b = h.user("Bob").await;
    let c = h.user("Carol").await;
    let id = h.conversations().resolve_direct(a, b).await.unwrap();

    let err = h.conversations().set_typing(id, c, true).await.unwrap_err();
    assert!(matches!(domain(&err), DomainError::NotMember(_)));
    assert_eq!(err.status_code(), 404);

    let err = h.conversations().mark_read(id, c).await.unwrap_err();
    assert!(matches!(domain(&err), DomainError::NotMember(_)));
}

#[tokio::test]
async fn test_mark_read_never_moves_backwards() {
    let h = Harness::new();
    let a = h.user("Ada").await;
    let b = h.user("Bob").await;
    let id = h.conversations().resolve_direct(a, b).await.unwrap();

    h.advance_secs(10);
    let later = h.conversations().mark_read(id, a).await.unwrap();

    h.clock.set(later - chrono::Duration::seconds(60));
    let again = h.conversations().mark_read(id, a).await.unwrap();

    assert_eq!(again, later);
}

#[tokio::test]
async fn test_list_orders_by_activity() {
    let h = Harness::new();
    let a = h.user("Ada").await;
    let b = h.user("Bob").await;
    let c = h.user("Carol").await;

    let with_b = h.conversations().resolve_direct(a, b).await.unwrap();
    let with_c = h.conversations().resolve_direct(a, c).await.unwrap();
    let team = h.conversations().create_group(a, &group("Team", vec![b, c])).await.unwrap();

    h.advance_secs(1);
    h.messages().send_message(with_c, c, "first").await.unwrap();
    h.advance_secs(1);
    h.messages().send_message(with_b, a, "second").await.unwrap();

    let rows = h.conversations().list_conversations(a).await.unwrap();
    let ids: Vec<_> = rows.iter().map(|r| r.id.clone()).collect();
    assert_eq!(
        ids,
        vec![with_b.to_string(), with_c.to_string(), team.to_string()]
    );

    assert_eq!(rows[0].last_message.as_deref(), Some("second"));
    assert_eq!(rows[0].other_user.as_ref().unwrap().display_name, "Bob");
    assert_eq!(rows[0].member_count, None);
    assert_eq!(rows[2].member_count, Some(3));
    assert!(rows[2].last_message_at.is_none());
}

#[tokio::test]
async fn test_unread_counts() {
    let h = Harness::new();
    let a = h.user("Ada").await;
    let b = h.user("Bob").await;
    let id = h.conversations().resolve_direct(a, b).await.unwrap();

    for text in ["one", "two", "three"] {
        h.advance_ms(10);
        h.messages().send_message(id, a, text).await.unwrap();
    }

    let unread = |rows: Vec<huddle_service::dto::ConversationSummaryResponse>| rows[0].unread_count;

    assert_eq!(unread(h.conversations().list_conversations(b).await.unwrap()), 3);

    h.advance_ms(10);
    h.conversations().mark_read(id, b).await.unwrap();
    assert_eq!(unread(h.conversations().list_conversations(b).await.unwrap()), 0);

    h.advance_ms(10);
    h.messages().send_message(id, a, "four").await.unwrap();
    assert_eq!(unread(h.conversations().list_conversations(b).await.unwrap()), 1);
}
