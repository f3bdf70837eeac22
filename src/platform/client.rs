//! REST client for the league platform.
//!
//! Every call carries a shared-secret basic auth header. Non-2xx responses
//! become typed errors: a player lookup that misses is
//! [`BotError::PlayerNotFound`]; anything else surfaces the status and body.

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use reqwest::{Client, Response, StatusCode, header::AUTHORIZATION};
use serde::de::DeserializeOwned;
use std::time::Duration;

use super::models::{FunMeter, Game, Leader, LeagueEvent, LeaguePlayer, ScoreSheet, TeamMembership};
use crate::core::config::AppConfig;
use crate::errors::BotError;

static HTTP_CLIENT: std::sync::LazyLock<Client> = std::sync::LazyLock::new(|| {
    Client::builder()
        .timeout(Duration::from_secs(15))
        .build()
        .unwrap_or_else(|_| Client::new())
});

/// Everything the action handlers need from the league platform. A trait
/// seam so tests can swap in a scripted platform.
#[async_trait]
pub trait LeaguePlatform: Send + Sync {
    async fn find_player_by_email(&self, email: &str) -> Result<LeaguePlayer, BotError>;
    async fn find_players_by_name(&self, name: &str) -> Result<Vec<LeaguePlayer>, BotError>;
    async fn teams_for_player(&self, player_id: u64) -> Result<Vec<TeamMembership>, BotError>;
    async fn get_roster(&self, team_id: u64) -> Result<Vec<LeaguePlayer>, BotError>;
    async fn upcoming_games(&self, team_id: u64) -> Result<Vec<Game>, BotError>;
    async fn recent_games(&self, team_id: u64) -> Result<Vec<Game>, BotError>;
    async fn league_leaders(&self) -> Result<Vec<Leader>, BotError>;
    async fn event_calendar(&self) -> Result<Vec<LeagueEvent>, BotError>;
    async fn fun_meter(&self) -> Result<FunMeter, BotError>;
    async fn submit_score_sheet(&self, sheet: &ScoreSheet) -> Result<(), BotError>;
}

pub struct PlatformClient {
    base_url: String,
    auth_header: String,
}

impl PlatformClient {
    #[must_use]
    pub fn new(config: &AppConfig) -> Self {
        Self::with_credentials(
            &config.platform_base_url,
            &config.platform_api_user,
            &config.platform_api_secret,
        )
    }

    #[must_use]
    pub fn with_credentials(base_url: &str, user: &str, secret: &str) -> Self {
        let credentials = STANDARD.encode(format!("{user}:{secret}"));
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_header: format!("Basic {credentials}"),
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, BotError> {
        let response = HTTP_CLIENT
            .get(format!("{}{path}", self.base_url))
            .query(query)
            .header(AUTHORIZATION, &self.auth_header)
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, BotError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BotError::Platform {
                status: status.as_u16(),
                body,
            });
        }
        response
            .json()
            .await
            .map_err(|e| BotError::Parse(format!("Platform response: {e}")))
    }
}

#[async_trait]
impl LeaguePlatform for PlatformClient {
    async fn find_player_by_email(&self, email: &str) -> Result<LeaguePlayer, BotError> {
        let response = HTTP_CLIENT
            .get(format!("{}/players", self.base_url))
            .query(&[("email", email)])
            .header(AUTHORIZATION, &self.auth_header)
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(BotError::PlayerNotFound);
        }
        let players: Vec<LeaguePlayer> = Self::decode(response).await?;
        players.into_iter().next().ok_or(BotError::PlayerNotFound)
    }

    async fn find_players_by_name(&self, name: &str) -> Result<Vec<LeaguePlayer>, BotError> {
        let response = HTTP_CLIENT
            .get(format!("{}/players", self.base_url))
            .query(&[("name", name)])
            .header(AUTHORIZATION, &self.auth_header)
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }
        Self::decode(response).await
    }

    async fn teams_for_player(&self, player_id: u64) -> Result<Vec<TeamMembership>, BotError> {
        self.get_json(&format!("/players/{player_id}/teams"), &[])
            .await
    }

    async fn get_roster(&self, team_id: u64) -> Result<Vec<LeaguePlayer>, BotError> {
        self.get_json(&format!("/teams/{team_id}/roster"), &[])
            .await
    }

    async fn upcoming_games(&self, team_id: u64) -> Result<Vec<Game>, BotError> {
        self.get_json(&format!("/teams/{team_id}/games"), &[("when", "upcoming")])
            .await
    }

    async fn recent_games(&self, team_id: u64) -> Result<Vec<Game>, BotError> {
        self.get_json(&format!("/teams/{team_id}/games"), &[("when", "recent")])
            .await
    }

    async fn league_leaders(&self) -> Result<Vec<Leader>, BotError> {
        self.get_json("/leaders", &[]).await
    }

    async fn event_calendar(&self) -> Result<Vec<LeagueEvent>, BotError> {
        self.get_json("/events", &[]).await
    }

    async fn fun_meter(&self) -> Result<FunMeter, BotError> {
        self.get_json("/fun-meter", &[]).await
    }

    async fn submit_score_sheet(&self, sheet: &ScoreSheet) -> Result<(), BotError> {
        let response = HTTP_CLIENT
            .post(format!("{}/score-sheets", self.base_url))
            .header(AUTHORIZATION, &self.auth_header)
            .json(sheet)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BotError::Platform {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}
