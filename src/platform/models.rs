use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaguePlayer {
    pub id: u64,
    pub name: String,
    pub gender: Option<String>,
    #[serde(default)]
    pub convenor: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamMembership {
    pub team_id: u64,
    pub team_name: String,
    #[serde(default)]
    pub captain: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Game {
    pub id: u64,
    pub starts_at: DateTime<Utc>,
    pub home_team_id: u64,
    pub home_team_name: String,
    pub away_team_id: u64,
    pub away_team_name: String,
    pub location: Option<String>,
    /// Whether a score sheet has already been recorded for this game.
    #[serde(default)]
    pub scored: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Leader {
    pub player_name: String,
    pub stat: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeagueEvent {
    pub title: String,
    pub starts_at: DateTime<Utc>,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunMeter {
    pub score: u32,
    pub max: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreLine {
    pub player_id: u64,
    pub runs: u32,
    pub hits: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreSheet {
    pub game_id: u64,
    pub team_id: u64,
    pub submitted_by: u64,
    pub lines: Vec<ScoreLine>,
}
