//! One-shot greeting after a successful identify; chains straight to the
//! homescreen.

use async_trait::async_trait;

use super::{Action, BotContext, Outcome};
use crate::core::models::{ActionKey, Message, Player, Reply};
use crate::errors::BotError;

pub struct Welcome;

#[async_trait]
impl Action for Welcome {
    async fn handle(
        &self,
        ctx: &BotContext,
        player: &mut Player,
        _message: &Message,
    ) -> Result<Outcome, BotError> {
        let mut text = format!("Welcome, {}!", player.first_name());

        if let Some(league) = &player.league {
            let memberships = ctx.platform.teams_for_player(league.player_id).await?;
            let names: Vec<&str> = memberships.iter().map(|m| m.team_name.as_str()).collect();
            if !names.is_empty() {
                text.push_str(&format!(" You're on {}.", names.join(" and ")));
            }
            let captained: Vec<&str> = memberships
                .iter()
                .filter(|m| m.captain)
                .map(|m| m.team_name.as_str())
                .collect();
            if !captained.is_empty() {
                text.push_str(&format!(
                    " As captain of {} you can submit scores right from here.",
                    captained.join(" and ")
                ));
            }
        }

        Ok(Outcome::then(
            vec![Reply::text(text)],
            ActionKey::Homescreen,
        ))
    }
}
