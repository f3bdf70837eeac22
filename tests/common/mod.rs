//! Shared fixtures: a scripted league platform, a recording outbound
//! sender, and a dispatcher harness over the in-memory store.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use leaguebot::actions::{BotContext, Dispatcher};
use leaguebot::core::models::{Player, Reply};
use leaguebot::errors::BotError;
use leaguebot::messenger::OutboundSender;
use leaguebot::platform::LeaguePlatform;
use leaguebot::platform::models::{
    FunMeter, Game, Leader, LeagueEvent, LeaguePlayer, ScoreSheet, TeamMembership,
};
use leaguebot::store::{MemoryPlayerStore, PlayerStore};

pub struct FakePlatform {
    pub players_by_email: HashMap<String, LeaguePlayer>,
    pub players_by_name: HashMap<String, Vec<LeaguePlayer>>,
    pub memberships: HashMap<u64, Vec<TeamMembership>>,
    pub rosters: HashMap<u64, Vec<LeaguePlayer>>,
    pub upcoming: HashMap<u64, Vec<Game>>,
    pub recent: HashMap<u64, Vec<Game>>,
    pub leaders: Vec<Leader>,
    pub events: Vec<LeagueEvent>,
    pub fun: FunMeter,
    pub submitted: Mutex<Vec<ScoreSheet>>,
    /// Remaining `teams_for_player` calls to fail with a 503.
    pub team_lookup_failures: Mutex<u32>,
}

impl FakePlatform {
    pub fn new() -> Self {
        Self {
            players_by_email: HashMap::new(),
            players_by_name: HashMap::new(),
            memberships: HashMap::new(),
            rosters: HashMap::new(),
            upcoming: HashMap::new(),
            recent: HashMap::new(),
            leaders: Vec::new(),
            events: Vec::new(),
            fun: FunMeter { score: 87, max: 100 },
            submitted: Mutex::new(Vec::new()),
            team_lookup_failures: Mutex::new(0),
        }
    }
}

#[async_trait]
impl LeaguePlatform for FakePlatform {
    async fn find_player_by_email(&self, email: &str) -> Result<LeaguePlayer, BotError> {
        self.players_by_email
            .get(&email.to_lowercase())
            .cloned()
            .ok_or(BotError::PlayerNotFound)
    }

    async fn find_players_by_name(&self, name: &str) -> Result<Vec<LeaguePlayer>, BotError> {
        Ok(self
            .players_by_name
            .get(&name.to_lowercase())
            .cloned()
            .unwrap_or_default())
    }

    async fn teams_for_player(&self, player_id: u64) -> Result<Vec<TeamMembership>, BotError> {
        {
            let mut failures = self
                .team_lookup_failures
                .lock()
                .map_err(|_| BotError::Store("poisoned".to_string()))?;
            if *failures > 0 {
                *failures -= 1;
                return Err(BotError::Platform {
                    status: 503,
                    body: "temporarily unavailable".to_string(),
                });
            }
        }
        Ok(self.memberships.get(&player_id).cloned().unwrap_or_default())
    }

    async fn get_roster(&self, team_id: u64) -> Result<Vec<LeaguePlayer>, BotError> {
        Ok(self.rosters.get(&team_id).cloned().unwrap_or_default())
    }

    async fn upcoming_games(&self, team_id: u64) -> Result<Vec<Game>, BotError> {
        Ok(self.upcoming.get(&team_id).cloned().unwrap_or_default())
    }

    async fn recent_games(&self, team_id: u64) -> Result<Vec<Game>, BotError> {
        Ok(self.recent.get(&team_id).cloned().unwrap_or_default())
    }

    async fn league_leaders(&self) -> Result<Vec<Leader>, BotError> {
        Ok(self.leaders.clone())
    }

    async fn event_calendar(&self) -> Result<Vec<LeagueEvent>, BotError> {
        Ok(self.events.clone())
    }

    async fn fun_meter(&self) -> Result<FunMeter, BotError> {
        Ok(self.fun.clone())
    }

    async fn submit_score_sheet(&self, sheet: &ScoreSheet) -> Result<(), BotError> {
        self.submitted
            .lock()
            .map_err(|_| BotError::Store("poisoned".to_string()))?
            .push(sheet.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingSender {
    pub sent: Mutex<Vec<(String, Reply)>>,
}

impl RecordingSender {
    pub fn texts(&self) -> Vec<String> {
        self.sent
            .lock()
            .map(|sent| sent.iter().map(|(_, r)| r.text.clone()).collect())
            .unwrap_or_default()
    }

    pub fn last(&self) -> Option<Reply> {
        self.sent
            .lock()
            .ok()
            .and_then(|sent| sent.last().map(|(_, r)| r.clone()))
    }

    pub fn clear(&self) {
        if let Ok(mut sent) = self.sent.lock() {
            sent.clear();
        }
    }
}

#[async_trait]
impl OutboundSender for RecordingSender {
    async fn send(&self, recipient_id: &str, reply: &Reply) -> Result<(), BotError> {
        self.sent
            .lock()
            .map_err(|_| BotError::Messenger("poisoned".to_string()))?
            .push((recipient_id.to_string(), reply.clone()));
        Ok(())
    }
}

pub struct Harness {
    pub store: Arc<MemoryPlayerStore>,
    pub platform: Arc<FakePlatform>,
    pub sender: Arc<RecordingSender>,
    pub dispatcher: Dispatcher,
}

pub fn harness(platform: FakePlatform) -> Harness {
    let store = Arc::new(MemoryPlayerStore::new());
    let platform = Arc::new(platform);
    let sender = Arc::new(RecordingSender::default());
    let ctx = BotContext {
        platform: platform.clone(),
        store: store.clone(),
        tz: chrono_tz::America::Toronto,
    };
    let dispatcher = Dispatcher::new(ctx, sender.clone());
    Harness {
        store,
        platform,
        sender,
        dispatcher,
    }
}

impl Harness {
    pub async fn player(&self, messenger_id: &str) -> Player {
        self.store
            .get(messenger_id)
            .await
            .expect("store get")
            .expect("player exists")
    }
}

/// A league fixture: Sam captains the Hot Shots (team 7) and also plays on
/// the Brew Jays (team 9).
pub fn sam_fixture() -> FakePlatform {
    let mut platform = FakePlatform::new();
    let sam = LeaguePlayer {
        id: 31,
        name: "Sam Decker".to_string(),
        gender: Some("f".to_string()),
        convenor: false,
    };
    platform
        .players_by_email
        .insert("sam@example.com".to_string(), sam.clone());
    platform
        .players_by_name
        .insert("sam decker".to_string(), vec![sam]);
    platform.memberships.insert(
        31,
        vec![
            TeamMembership {
                team_id: 7,
                team_name: "Hot Shots".to_string(),
                captain: true,
            },
            TeamMembership {
                team_id: 9,
                team_name: "Brew Jays".to_string(),
                captain: false,
            },
        ],
    );
    platform.rosters.insert(
        7,
        vec![
            LeaguePlayer {
                id: 101,
                name: "Alex Park".to_string(),
                gender: None,
                convenor: false,
            },
            LeaguePlayer {
                id: 102,
                name: "Brett Liu".to_string(),
                gender: None,
                convenor: false,
            },
        ],
    );
    platform.recent.insert(
        7,
        vec![
            Game {
                id: 42,
                starts_at: Utc.with_ymd_and_hms(2026, 6, 10, 22, 0, 0).unwrap(),
                home_team_id: 7,
                home_team_name: "Hot Shots".to_string(),
                away_team_id: 9,
                away_team_name: "Brew Jays".to_string(),
                location: Some("Diamond 2".to_string()),
                scored: false,
            },
            Game {
                id: 40,
                starts_at: Utc.with_ymd_and_hms(2026, 6, 3, 22, 0, 0).unwrap(),
                home_team_id: 8,
                home_team_name: "Base Invaders".to_string(),
                away_team_id: 7,
                away_team_name: "Hot Shots".to_string(),
                location: None,
                scored: true,
            },
        ],
    );
    platform
}
