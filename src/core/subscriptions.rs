//! Game-reminder subscriptions.
//!
//! A player opts in per team with a relative reminder policy. Reminder
//! instants are computed against the league's local timezone, since
//! "morning of" and "night before" are wall-clock notions.

use chrono::{DateTime, Duration, LocalResult, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// How long a computed reminder instant stays "due" before it is considered
/// missed.
pub const DUE_WINDOW_MINUTES: i64 = 15;

const MORNING_OF_HOUR: u32 = 8;
const NIGHT_BEFORE_HOUR: u32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderTime {
    MorningOf,
    NightBefore,
    HourBefore,
}

impl ReminderTime {
    /// The instant at which a reminder for a game starting at
    /// `game_start` should fire.
    #[must_use]
    pub fn reminder_instant(&self, game_start: DateTime<Utc>, tz: Tz) -> DateTime<Utc> {
        let local_start = game_start.with_timezone(&tz);
        match self {
            ReminderTime::HourBefore => game_start - Duration::hours(1),
            ReminderTime::MorningOf => {
                local_instant(tz, local_start.date_naive(), MORNING_OF_HOUR)
                    .unwrap_or(game_start)
            }
            ReminderTime::NightBefore => {
                let prev = local_start.date_naive() - Duration::days(1);
                local_instant(tz, prev, NIGHT_BEFORE_HOUR).unwrap_or(game_start)
            }
        }
    }

    /// Whether a reminder is currently due: `now` falls inside the fixed
    /// window starting at the reminder instant.
    #[must_use]
    pub fn is_due(&self, now: DateTime<Utc>, game_start: DateTime<Utc>, tz: Tz) -> bool {
        let at = self.reminder_instant(game_start, tz);
        now >= at && now < at + Duration::minutes(DUE_WINDOW_MINUTES)
    }
}

fn local_instant(tz: Tz, date: chrono::NaiveDate, hour: u32) -> Option<DateTime<Utc>> {
    use chrono::Datelike;
    match tz.with_ymd_and_hms(date.year(), date.month(), date.day(), hour, 0, 0) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => Some(dt.with_timezone(&Utc)),
        LocalResult::None => None,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub team_id: u64,
    pub reminder: ReminderTime,
}

/// Per-team reminder opt-ins. At most one subscription per team; a new
/// opt-in replaces the previous policy.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Subscriptions(Vec<Subscription>);

impl Subscriptions {
    pub fn subscribe(&mut self, team_id: u64, reminder: ReminderTime) {
        self.unsubscribe(team_id);
        self.0.push(Subscription { team_id, reminder });
    }

    pub fn unsubscribe(&mut self, team_id: u64) {
        self.0.retain(|s| s.team_id != team_id);
    }

    #[must_use]
    pub fn reminder_for(&self, team_id: u64) -> Option<ReminderTime> {
        self.0
            .iter()
            .find(|s| s.team_id == team_id)
            .map(|s| s.reminder)
    }

    #[must_use]
    pub fn is_subscribed(&self, team_id: u64) -> bool {
        self.reminder_for(team_id).is_some()
    }

    #[must_use]
    pub fn iter(&self) -> std::slice::Iter<'_, Subscription> {
        self.0.iter()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
