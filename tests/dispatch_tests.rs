//! Action transition table: unseen senders, identify chaining, retry caps,
//! and menu queries.

mod common;

use common::{harness, sam_fixture};
use leaguebot::core::models::{ActionKey, Message};

#[tokio::test]
async fn test_unseen_sender_routed_to_identify() {
    let h = harness(sam_fixture());

    h.dispatcher
        .dispatch(&Message::text_of("U1", "hello there"))
        .await
        .unwrap();

    let player = h.player("U1").await;
    assert_eq!(player.action.key, ActionKey::IdentifyUser);
    assert_eq!(player.action.state, "await_identity");

    let texts = h.sender.texts();
    assert_eq!(texts.len(), 1);
    assert!(texts[0].contains("email"));
}

#[tokio::test]
async fn test_identify_success_chains_welcome_then_homescreen() {
    let h = harness(sam_fixture());

    h.dispatcher
        .dispatch(&Message::text_of("U1", "hi"))
        .await
        .unwrap();
    h.sender.clear();

    // One inbound message carries the whole chain: identify -> welcome ->
    // homescreen, no further input needed.
    h.dispatcher
        .dispatch(&Message::text_of("U1", "it's sam@example.com"))
        .await
        .unwrap();

    let player = h.player("U1").await;
    assert_eq!(player.action.key, ActionKey::Homescreen);
    assert_eq!(player.action.state, "menu");
    assert_eq!(player.display_name, "Sam Decker");
    assert_eq!(player.team_ids, vec![7, 9]);
    assert_eq!(player.captain_of, vec![7]);

    let texts = h.sender.texts();
    assert!(texts[0].contains("Welcome, Sam!"));
    assert!(texts[0].contains("Hot Shots"));
    // The chained homescreen presented its menu.
    let menu = h.sender.last().unwrap();
    let payload = menu.payload.expect("menu has options");
    assert!(payload.options.iter().any(|o| o.token == "SCORE"));
}

#[tokio::test]
async fn test_identify_by_unique_name() {
    let h = harness(sam_fixture());

    h.dispatcher
        .dispatch(&Message::text_of("U2", "hi"))
        .await
        .unwrap();
    h.dispatcher
        .dispatch(&Message::text_of("U2", "Sam Decker"))
        .await
        .unwrap();

    let player = h.player("U2").await;
    assert_eq!(player.action.key, ActionKey::Homescreen);
}

#[tokio::test]
async fn test_identify_retry_cap_locks_out() {
    let h = harness(sam_fixture());

    h.dispatcher
        .dispatch(&Message::text_of("U1", "hi"))
        .await
        .unwrap();

    for _ in 0..2 {
        h.dispatcher
            .dispatch(&Message::text_of("U1", "wrong@example.com"))
            .await
            .unwrap();
        let player = h.player("U1").await;
        assert_eq!(player.action.state, "await_identity");
    }

    // Third strike locks the conversation.
    h.dispatcher
        .dispatch(&Message::text_of("U1", "wrong@example.com"))
        .await
        .unwrap();
    let player = h.player("U1").await;
    assert_eq!(player.action.state, "locked");

    // Locked players get the same notice for anything they send.
    h.sender.clear();
    h.dispatcher
        .dispatch(&Message::text_of("U1", "sam@example.com"))
        .await
        .unwrap();
    let player = h.player("U1").await;
    assert_eq!(player.action.state, "locked");
    assert!(h.sender.texts()[0].contains("league office"));
}

#[tokio::test]
async fn test_transient_platform_failure_does_not_burn_the_identity() {
    let h = harness(sam_fixture());

    h.dispatcher
        .dispatch(&Message::text_of("U1", "hi"))
        .await
        .unwrap();

    // The membership fetch fails once; the dispatch errors out, but no
    // claim marker and no failed attempt are left behind.
    *h.platform.team_lookup_failures.lock().unwrap() = 1;
    let result = h
        .dispatcher
        .dispatch(&Message::text_of("U1", "sam@example.com"))
        .await;
    assert!(result.is_err());

    let player = h.player("U1").await;
    assert_eq!(player.action.key, ActionKey::IdentifyUser);
    assert_eq!(player.action.state, "await_identity");

    // The platform recovers; the same identity now links cleanly.
    h.sender.clear();
    h.dispatcher
        .dispatch(&Message::text_of("U1", "sam@example.com"))
        .await
        .unwrap();

    let player = h.player("U1").await;
    assert_eq!(player.action.key, ActionKey::Homescreen);
    assert_eq!(player.display_name, "Sam Decker");
    assert!(h.sender.texts()[0].contains("Welcome, Sam!"));
}

#[tokio::test]
async fn test_already_claimed_player_counts_as_failed_attempt() {
    let h = harness(sam_fixture());

    // Another messenger account linked Sam first.
    h.dispatcher
        .dispatch(&Message::text_of("U9", "hi"))
        .await
        .unwrap();
    h.dispatcher
        .dispatch(&Message::text_of("U9", "sam@example.com"))
        .await
        .unwrap();

    h.dispatcher
        .dispatch(&Message::text_of("U1", "hi"))
        .await
        .unwrap();
    h.sender.clear();
    h.dispatcher
        .dispatch(&Message::text_of("U1", "sam@example.com"))
        .await
        .unwrap();

    let player = h.player("U1").await;
    assert_eq!(player.action.key, ActionKey::IdentifyUser);
    assert!(h.sender.texts()[0].contains("already linked"));
}

#[tokio::test]
async fn test_menu_query_answers_inline_and_stays_on_menu() {
    let mut platform = sam_fixture();
    platform.leaders = vec![leaguebot::platform::models::Leader {
        player_name: "Alex Park".to_string(),
        stat: "HR".to_string(),
        value: "14".to_string(),
    }];
    let h = harness(platform);

    h.dispatcher
        .dispatch(&Message::text_of("U1", "hi"))
        .await
        .unwrap();
    h.dispatcher
        .dispatch(&Message::text_of("U1", "sam@example.com"))
        .await
        .unwrap();
    h.sender.clear();

    h.dispatcher
        .dispatch(&Message::payload_of("U1", "LEADERS"))
        .await
        .unwrap();

    let texts = h.sender.texts();
    assert!(texts[0].contains("Alex Park"));
    assert!(texts[0].contains("14"));

    let player = h.player("U1").await;
    assert_eq!(player.action.key, ActionKey::Homescreen);
    assert_eq!(player.action.state, "menu");
}

#[tokio::test]
async fn test_unmatched_menu_text_reprompts() {
    let h = harness(sam_fixture());

    h.dispatcher
        .dispatch(&Message::text_of("U1", "hi"))
        .await
        .unwrap();
    h.dispatcher
        .dispatch(&Message::text_of("U1", "sam@example.com"))
        .await
        .unwrap();
    h.sender.clear();

    h.dispatcher
        .dispatch(&Message::text_of("U1", "what's the weather"))
        .await
        .unwrap();

    let texts = h.sender.texts();
    assert!(texts[0].contains("didn't catch that"));
    let player = h.player("U1").await;
    assert_eq!(player.action.state, "menu");
}

#[tokio::test]
async fn test_reminder_subscription_flow() {
    let h = harness(sam_fixture());

    h.dispatcher
        .dispatch(&Message::text_of("U1", "hi"))
        .await
        .unwrap();
    h.dispatcher
        .dispatch(&Message::text_of("U1", "sam@example.com"))
        .await
        .unwrap();

    h.dispatcher
        .dispatch(&Message::payload_of("U1", "SUBS"))
        .await
        .unwrap();
    h.dispatcher
        .dispatch(&Message::payload_of("U1", "T7"))
        .await
        .unwrap();
    h.dispatcher
        .dispatch(&Message::payload_of("U1", "NIGHT"))
        .await
        .unwrap();

    let player = h.player("U1").await;
    assert_eq!(player.action.state, "menu");
    assert_eq!(
        player.subscriptions.reminder_for(7),
        Some(leaguebot::core::subscriptions::ReminderTime::NightBefore)
    );

    // Turning reminders off removes the subscription.
    h.dispatcher
        .dispatch(&Message::payload_of("U1", "SUBS"))
        .await
        .unwrap();
    h.dispatcher
        .dispatch(&Message::payload_of("U1", "T7"))
        .await
        .unwrap();
    h.dispatcher
        .dispatch(&Message::payload_of("U1", "OFF"))
        .await
        .unwrap();

    let player = h.player("U1").await;
    assert!(!player.subscriptions.is_subscribed(7));
}
