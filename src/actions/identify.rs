//! The identify flow: link a messenger account to a league player.
//!
//! Asks for the email the player registered with; a full roster name works
//! too when it matches exactly one league player. Failed lookups loop back
//! to a retry prompt, capped at [`MAX_IDENTIFY_ATTEMPTS`], after which the
//! conversation is locked and every message gets the same notice.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;

use super::{Action, BotContext, Outcome, options};
use crate::core::models::{ActionKey, LeagueLink, Message, Player, Reply};
use crate::errors::BotError;

pub const MAX_IDENTIFY_ATTEMPTS: u64 = 3;

const STATE_AWAIT_IDENTITY: &str = "await_identity";
const STATE_LOCKED: &str = "locked";

const LOCKED_NOTICE: &str =
    "I couldn't verify who you are. Please contact the league office to get set up.";

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}").expect("static regex compile")
});

pub struct IdentifyUser;

#[async_trait]
impl Action for IdentifyUser {
    async fn handle(
        &self,
        ctx: &BotContext,
        player: &mut Player,
        message: &Message,
    ) -> Result<Outcome, BotError> {
        match player.action.state.as_str() {
            STATE_LOCKED => Ok(Outcome::stay(vec![Reply::text(LOCKED_NOTICE)])),
            STATE_AWAIT_IDENTITY => check_identity(ctx, player, message).await,
            _ => {
                player.action.state = STATE_AWAIT_IDENTITY.to_string();
                player.action.set("attempts", 0);
                Ok(Outcome::stay(vec![Reply::text(
                    "Hi, I'm the league bot! To get started, reply with the email \
                     address you registered with the league.",
                )]))
            }
        }
    }
}

async fn check_identity(
    ctx: &BotContext,
    player: &mut Player,
    message: &Message,
) -> Result<Outcome, BotError> {
    let text = options::text_of(message).unwrap_or("");

    let lookup = if let Some(email) = EMAIL_RE.find(text) {
        ctx.platform.find_player_by_email(email.as_str()).await
    } else if !text.is_empty() {
        // No email in the message; a name works if it is unambiguous.
        match ctx.platform.find_players_by_name(text).await {
            Ok(mut found) if found.len() == 1 => Ok(found.remove(0)),
            Ok(_) => Err(BotError::PlayerNotFound),
            Err(e) => Err(e),
        }
    } else {
        Err(BotError::PlayerNotFound)
    };

    let league_player = match lookup {
        Ok(found) => found,
        Err(BotError::PlayerNotFound) => {
            return Ok(failed_attempt(
                player,
                "I couldn't find a league member matching that.",
            ));
        }
        Err(e) => return Err(e),
    };

    if let Some(holder) = ctx.store.claim_holder(league_player.id).await? {
        if holder != player.messenger_id {
            return Ok(failed_attempt(
                player,
                "That league member is already linked to another messenger account.",
            ));
        }
    }

    // The claim is written last, after every fallible lookup; a failed
    // lookup must leave no claim behind.
    let memberships = ctx.platform.teams_for_player(league_player.id).await?;
    ctx.store
        .claim(league_player.id, &player.messenger_id)
        .await?;

    player.display_name = league_player.name.clone();
    player.convenor = league_player.convenor;
    player.league = Some(LeagueLink {
        player_id: league_player.id,
        name: league_player.name,
        gender: league_player.gender,
    });
    player.team_ids = memberships.iter().map(|m| m.team_id).collect();
    player.captain_of = memberships
        .iter()
        .filter(|m| m.captain)
        .map(|m| m.team_id)
        .collect();

    Ok(Outcome::then(Vec::new(), ActionKey::Welcome))
}

fn failed_attempt(player: &mut Player, why: &str) -> Outcome {
    let attempts = player.action.get_u64("attempts").unwrap_or(0) + 1;
    if attempts >= MAX_IDENTIFY_ATTEMPTS {
        player.action.state = STATE_LOCKED.to_string();
        return Outcome::stay(vec![Reply::text(LOCKED_NOTICE)]);
    }
    player.action.set("attempts", attempts);
    Outcome::stay(vec![Reply::text(format!(
        "{why} Try again with your registered email, or your full name as it \
         appears on your roster ({attempts} of {MAX_IDENTIFY_ATTEMPTS} attempts used)."
    ))])
}
