//! Integration tests for members added without a join request.

mod common;

use chrono::Utc;
use common::{CHAT, Failure, Harness, TransportCall};
use officer_bouncer::registry::{ChatListing, ManagedChat};
use officer_bouncer::{Action, BouncerError, MemberOutcome, NewMembersEvent, UserIdentity};

const BOT_ID: i64 = 999;

fn event(members: Vec<UserIdentity>) -> NewMembersEvent {
    NewMembersEvent {
        chat_id: CHAT,
        chat_title: "Ops Room".to_string(),
        bot_id: BOT_ID,
        members,
    }
}

fn bot() -> UserIdentity {
    UserIdentity::new(BOT_ID, "Bouncer")
}

#[tokio::test]
async fn test_bot_and_unauthorized_human_in_one_batch() {
    let h = Harness::new();

    let before = Utc::now();
    let outcomes = h
        .bouncer
        .on_new_members_added(event(vec![bot(), UserIdentity::new(8, "Mallory")]))
        .await
        .unwrap();

    assert_eq!(
        outcomes,
        vec![
            MemberOutcome::Provisioned {
                invite_link: "https://t.me/+link1".to_string()
            },
            MemberOutcome::Removed { user_id: 8 },
        ]
    );

    assert_eq!(
        h.registry.chats(),
        vec![ManagedChat {
            name: "Ops Room".to_string(),
            chat_id: CHAT,
            invite_link: "https://t.me/+link1".to_string(),
        }]
    );

    let calls = h.transport.calls();
    assert!(calls.contains(&TransportCall::CreateInviteLink {
        chat_id: CHAT,
        moderated: true
    }));

    let bans = h.transport.bans();
    assert_eq!(bans.len(), 1);
    let (chat_id, user_id, until) = bans[0];
    assert_eq!((chat_id, user_id), (CHAT, 8));
    let ban_secs = (until - before).num_seconds();
    assert!((59..=61).contains(&ban_secs), "ban lasted {}s", ban_secs);

    let announcements = h.transport.messages_to(CHAT);
    assert_eq!(announcements.len(), 1);
    assert!(announcements[0].contains("[Mallory](tg://user?id=8)"));
    assert!(announcements[0].contains("removing from group"));

    // Approve/decline only exist on the join-request path.
    assert!(h.transport.approvals().is_empty());
    assert!(h.transport.declines().is_empty());
}

#[tokio::test]
async fn test_authorized_human_is_left_alone() {
    let h = Harness::new();
    h.directory.add_officer(8);

    let outcomes = h
        .bouncer
        .on_new_members_added(event(vec![UserIdentity::new(8, "Olivia")]))
        .await
        .unwrap();

    assert_eq!(outcomes, vec![MemberOutcome::Admitted { user_id: 8 }]);
    assert!(h.transport.calls().is_empty());
    assert!(h.registry.chats().is_empty());
}

#[tokio::test]
async fn test_mixed_humans_are_screened_individually() {
    let h = Harness::new();
    h.directory.add_officer(8);
    h.directory.add_unverified(9);

    let outcomes = h
        .bouncer
        .on_new_members_added(event(vec![
            UserIdentity::new(9, "Uma"),
            UserIdentity::new(8, "Olivia"),
            UserIdentity::new(10, "Stranger"),
        ]))
        .await
        .unwrap();

    assert_eq!(
        outcomes,
        vec![
            MemberOutcome::Removed { user_id: 9 },
            MemberOutcome::Admitted { user_id: 8 },
            MemberOutcome::Removed { user_id: 10 },
        ]
    );
    let banned: Vec<i64> = h.transport.bans().iter().map(|b| b.1).collect();
    assert_eq!(banned, vec![9, 10]);
}

#[tokio::test]
async fn test_readding_bot_registers_chat_again() {
    let h = Harness::new();

    h.bouncer
        .on_new_members_added(event(vec![bot()]))
        .await
        .unwrap();
    h.bouncer
        .on_new_members_added(event(vec![bot()]))
        .await
        .unwrap();

    let chats = h.registry.chats();
    assert_eq!(chats.len(), 2);
    assert!(chats.iter().all(|c| c.chat_id == CHAT));
    assert_ne!(chats[0].invite_link, chats[1].invite_link);
}

#[tokio::test]
async fn test_ban_failure_stops_batch() {
    let h = Harness::new();
    h.transport.fail("ban_member", Failure::BadRequest);

    let err = h
        .bouncer
        .on_new_members_added(event(vec![
            UserIdentity::new(8, "Mallory"),
            UserIdentity::new(9, "Trent"),
        ]))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        BouncerError::Transport {
            action: Action::Ban,
            user_id: 8,
            ..
        }
    ));
    assert_eq!(h.transport.bans().len(), 1);
    assert!(h.transport.messages_to(CHAT).is_empty());
}

#[tokio::test]
async fn test_registry_failure_is_reported() {
    let h = Harness::new();
    h.registry.set_read_only(true);

    let err = h
        .bouncer
        .on_new_members_added(event(vec![bot()]))
        .await
        .unwrap_err();

    assert!(matches!(err, BouncerError::Registry { chat_id: CHAT, .. }));
    assert_eq!(err.error_code(), "registry");
}

#[tokio::test]
async fn test_list_groups_reads_registry() {
    let h = Harness::new();
    h.bouncer
        .on_new_members_added(event(vec![bot()]))
        .await
        .unwrap();

    let listed = h.bouncer.on_list_groups_requested().await.unwrap();
    assert_eq!(
        listed,
        vec![ChatListing {
            name: "Ops Room".to_string(),
            invite_link: "https://t.me/+link1".to_string(),
        }]
    );
}
