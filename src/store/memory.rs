//! In-memory store used by the test suite.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use super::PlayerStore;
use crate::core::models::Player;
use crate::errors::BotError;

#[derive(Default)]
pub struct MemoryPlayerStore {
    players: Mutex<HashMap<String, Player>>,
    claims: Mutex<HashMap<u64, String>>,
}

impl MemoryPlayerStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a player record directly, bypassing the dispatcher.
    pub fn insert(&self, player: Player) {
        if let Ok(mut players) = self.players.lock() {
            players.insert(player.messenger_id.clone(), player);
        }
    }
}

#[async_trait]
impl PlayerStore for MemoryPlayerStore {
    async fn get(&self, messenger_id: &str) -> Result<Option<Player>, BotError> {
        let players = self
            .players
            .lock()
            .map_err(|_| BotError::Store("poisoned player lock".to_string()))?;
        Ok(players.get(messenger_id).cloned())
    }

    async fn save(&self, player: &Player) -> Result<(), BotError> {
        let mut players = self
            .players
            .lock()
            .map_err(|_| BotError::Store("poisoned player lock".to_string()))?;
        players.insert(player.messenger_id.clone(), player.clone());
        Ok(())
    }

    async fn claim_holder(&self, league_player_id: u64) -> Result<Option<String>, BotError> {
        let claims = self
            .claims
            .lock()
            .map_err(|_| BotError::Store("poisoned claim lock".to_string()))?;
        Ok(claims.get(&league_player_id).cloned())
    }

    async fn claim(&self, league_player_id: u64, messenger_id: &str) -> Result<(), BotError> {
        let mut claims = self
            .claims
            .lock()
            .map_err(|_| BotError::Store("poisoned claim lock".to_string()))?;
        claims.insert(league_player_id, messenger_id.to_string());
        Ok(())
    }
}
