//! The action state machine: one handler per named action, plus the
//! dispatcher that routes an inbound message to the handler owning the
//! player's current action key.

pub mod homescreen;
pub mod identify;
pub mod options;
pub mod submit_score;
pub mod welcome;

use std::sync::Arc;

use async_trait::async_trait;
use chrono_tz::Tz;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::core::models::{ActionKey, ActionState, Message, Player, Reply};
use crate::errors::BotError;
use crate::messenger::OutboundSender;
use crate::platform::LeaguePlatform;
use crate::store::PlayerStore;

/// Upper bound on handler chaining within one webhook delivery. Normal
/// flows chain at most twice (identify -> welcome -> homescreen).
pub const MAX_CHAIN_DEPTH: usize = 5;

/// Shared collaborators handlers may call into.
pub struct BotContext {
    pub platform: Arc<dyn LeaguePlatform>,
    pub store: Arc<dyn PlayerStore>,
    pub tz: Tz,
}

/// What a handler produced: replies to deliver, and optionally the next
/// action to chain into with the same inbound message.
pub struct Outcome {
    pub replies: Vec<Reply>,
    pub next: Option<ActionKey>,
}

impl Outcome {
    #[must_use]
    pub fn stay(replies: Vec<Reply>) -> Self {
        Self {
            replies,
            next: None,
        }
    }

    #[must_use]
    pub fn then(replies: Vec<Reply>, next: ActionKey) -> Self {
        Self {
            replies,
            next: Some(next),
        }
    }
}

/// One named action. Handlers mutate the player in place (their own
/// `ActionState` included) and never send messages themselves.
#[async_trait]
pub trait Action: Send + Sync {
    async fn handle(
        &self,
        ctx: &BotContext,
        player: &mut Player,
        message: &Message,
    ) -> Result<Outcome, BotError>;
}

fn handler_for(key: ActionKey) -> &'static dyn Action {
    match key {
        ActionKey::IdentifyUser => &identify::IdentifyUser,
        ActionKey::Welcome => &welcome::Welcome,
        ActionKey::Homescreen => &homescreen::Homescreen,
        ActionKey::SubmitScore => &submit_score::SubmitScore,
    }
}

pub struct Dispatcher {
    ctx: BotContext,
    outbound: Arc<dyn OutboundSender>,
}

impl Dispatcher {
    #[must_use]
    pub fn new(ctx: BotContext, outbound: Arc<dyn OutboundSender>) -> Self {
        Self { ctx, outbound }
    }

    /// Route one inbound message through the state machine.
    ///
    /// The player record is loaded once up front (created on first contact,
    /// which lands the sender in the identify flow) and saved after every
    /// handler invocation. When a handler names a next action, the
    /// dispatcher replaces the action state wholesale and re-invokes with
    /// the SAME message, so e.g. a successful identify greets and shows the
    /// homescreen without waiting for another inbound event.
    ///
    /// # Errors
    ///
    /// Propagates store and delivery failures, and any handler error the
    /// handler itself did not expect; the webhook layer logs and swallows
    /// these, leaving the user without a reply.
    pub async fn dispatch(&self, message: &Message) -> Result<(), BotError> {
        let correlation_id = Uuid::new_v4();

        let mut player = match self.ctx.store.get(&message.sender_id).await? {
            Some(player) => player,
            None => {
                info!(%correlation_id, sender_id = %message.sender_id, "First contact, creating player");
                let player = Player::new(&message.sender_id);
                self.ctx.store.save(&player).await?;
                player
            }
        };

        let mut key = player.action.key;
        for hop in 0..MAX_CHAIN_DEPTH {
            info!(%correlation_id, action = ?key, state = %player.action.state, hop, "Dispatching");

            let outcome = match handler_for(key).handle(&self.ctx, &mut player, message).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!(%correlation_id, action = ?key, "Handler failed: {}", e);
                    return Err(e);
                }
            };

            if let Some(next) = outcome.next {
                player.action = ActionState::new(next);
            }
            self.ctx.store.save(&player).await?;

            for reply in &outcome.replies {
                self.outbound.send(&message.sender_id, reply).await?;
            }

            match outcome.next {
                Some(next) => key = next,
                None => return Ok(()),
            }
        }

        warn!(%correlation_id, "Action chain exceeded {MAX_CHAIN_DEPTH} hops, stopping");
        Ok(())
    }
}
