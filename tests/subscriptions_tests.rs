//! Subscription timing windows in the league's local timezone.

use chrono::{Duration, TimeZone, Utc};
use chrono_tz::America::Toronto;
use leaguebot::core::subscriptions::{DUE_WINDOW_MINUTES, ReminderTime, Subscriptions};

// A Wednesday-night game: 2026-06-10 18:30 EDT == 22:30 UTC.
fn game_start() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 6, 10, 22, 30, 0).unwrap()
}

#[test]
fn test_hour_before_instant() {
    let at = ReminderTime::HourBefore.reminder_instant(game_start(), Toronto);
    assert_eq!(at, Utc.with_ymd_and_hms(2026, 6, 10, 21, 30, 0).unwrap());
}

#[test]
fn test_morning_of_is_eight_local() {
    // 08:00 EDT on game day == 12:00 UTC.
    let at = ReminderTime::MorningOf.reminder_instant(game_start(), Toronto);
    assert_eq!(at, Utc.with_ymd_and_hms(2026, 6, 10, 12, 0, 0).unwrap());
}

#[test]
fn test_night_before_crosses_the_day_boundary() {
    // 20:00 EDT on June 9 == 00:00 UTC on June 10: the previous local day,
    // even though the UTC date matches the game's.
    let at = ReminderTime::NightBefore.reminder_instant(game_start(), Toronto);
    assert_eq!(at, Utc.with_ymd_and_hms(2026, 6, 10, 0, 0, 0).unwrap());
}

#[test]
fn test_due_window_edges() {
    let reminder = ReminderTime::HourBefore;
    let at = reminder.reminder_instant(game_start(), Toronto);

    assert!(!reminder.is_due(at - Duration::seconds(1), game_start(), Toronto));
    assert!(reminder.is_due(at, game_start(), Toronto));
    assert!(reminder.is_due(
        at + Duration::minutes(DUE_WINDOW_MINUTES) - Duration::seconds(1),
        game_start(),
        Toronto
    ));
    assert!(!reminder.is_due(at + Duration::minutes(DUE_WINDOW_MINUTES), game_start(), Toronto));
}

#[test]
fn test_subscribe_replaces_existing_policy() {
    let mut subs = Subscriptions::default();
    subs.subscribe(7, ReminderTime::MorningOf);
    subs.subscribe(7, ReminderTime::HourBefore);

    assert_eq!(subs.reminder_for(7), Some(ReminderTime::HourBefore));
    assert_eq!(subs.iter().count(), 1);
}

#[test]
fn test_unsubscribe() {
    let mut subs = Subscriptions::default();
    subs.subscribe(7, ReminderTime::NightBefore);
    subs.subscribe(9, ReminderTime::MorningOf);

    subs.unsubscribe(7);
    assert!(!subs.is_subscribed(7));
    assert!(subs.is_subscribed(9));
    assert!(!subs.is_empty());
}
