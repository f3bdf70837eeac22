//! SSM Parameter Store backing: one JSON parameter per messenger id, one
//! claim marker per league player id, all under a configured prefix.

use async_trait::async_trait;
use aws_sdk_ssm::{Client as SsmClient, types::ParameterType};

use super::PlayerStore;
use crate::core::models::Player;
use crate::errors::BotError;

pub struct SsmPlayerStore {
    prefix: String,
}

impl SsmPlayerStore {
    #[must_use]
    pub fn new(prefix: &str) -> Self {
        let mut prefix = prefix.to_string();
        if !prefix.ends_with('/') {
            prefix.push('/');
        }
        Self { prefix }
    }

    fn player_key(&self, messenger_id: &str) -> String {
        format!("{}players/{messenger_id}", self.prefix)
    }

    fn claim_key(&self, league_player_id: u64) -> String {
        format!("{}claims/{league_player_id}", self.prefix)
    }

    async fn client() -> SsmClient {
        let shared = aws_config::from_env().load().await;
        SsmClient::new(&shared)
    }

    async fn get_parameter(name: &str) -> Result<Option<String>, BotError> {
        let client = Self::client().await;
        match client.get_parameter().name(name).send().await {
            Ok(resp) => {
                let Some(param) = resp.parameter else {
                    return Ok(None);
                };
                Ok(param.value().map(ToString::to_string))
            }
            Err(e) => {
                // If not found, return Ok(None); otherwise bubble error
                let msg = format!("{e}");
                if msg.contains("ParameterNotFound") {
                    Ok(None)
                } else {
                    Err(BotError::Aws(format!("ssm get_parameter: {e}")))
                }
            }
        }
    }

    async fn put_parameter(name: &str, value: &str) -> Result<(), BotError> {
        let client = Self::client().await;
        client
            .put_parameter()
            .name(name)
            .value(value)
            .r#type(ParameterType::String)
            .overwrite(true)
            .send()
            .await
            .map_err(|e| BotError::Aws(format!("ssm put_parameter: {e}")))?;
        Ok(())
    }
}

#[async_trait]
impl PlayerStore for SsmPlayerStore {
    async fn get(&self, messenger_id: &str) -> Result<Option<Player>, BotError> {
        let Some(value) = Self::get_parameter(&self.player_key(messenger_id)).await? else {
            return Ok(None);
        };
        let player: Player = serde_json::from_str(&value)
            .map_err(|e| BotError::Store(format!("player parse: {e}")))?;
        Ok(Some(player))
    }

    async fn save(&self, player: &Player) -> Result<(), BotError> {
        let value = serde_json::to_string(player)
            .map_err(|e| BotError::Store(format!("player serialize: {e}")))?;
        Self::put_parameter(&self.player_key(&player.messenger_id), &value).await
    }

    async fn claim_holder(&self, league_player_id: u64) -> Result<Option<String>, BotError> {
        Self::get_parameter(&self.claim_key(league_player_id)).await
    }

    async fn claim(&self, league_player_id: u64, messenger_id: &str) -> Result<(), BotError> {
        Self::put_parameter(&self.claim_key(league_player_id), messenger_id).await
    }
}
