//! Player/session persistence: an opaque key-value record per messenger id,
//! plus claim markers so a league player can only be linked once.

pub mod memory;
pub mod ssm;

use async_trait::async_trait;

use crate::core::models::Player;
use crate::errors::BotError;

#[async_trait]
pub trait PlayerStore: Send + Sync {
    async fn get(&self, messenger_id: &str) -> Result<Option<Player>, BotError>;

    async fn save(&self, player: &Player) -> Result<(), BotError>;

    /// The messenger id that has linked this league player, if any.
    async fn claim_holder(&self, league_player_id: u64) -> Result<Option<String>, BotError>;

    async fn claim(&self, league_player_id: u64, messenger_id: &str) -> Result<(), BotError>;
}

pub use memory::MemoryPlayerStore;
pub use ssm::SsmPlayerStore;
