//! The submit-score flow: pick a team (captains only), pick an unscored
//! game, enter runs and hits for every roster player, confirm, submit.
//!
//! "cancel" aborts to the homescreen from anywhere in the flow; "back"
//! steps to the previous roster player, or back to game selection from the
//! first player. Invalid input re-prompts up to [`MAX_INPUT_RETRIES`] times
//! before aborting the flow.

use async_trait::async_trait;
use serde_json::{Value, json};

use super::{Action, BotContext, Outcome, options};
use crate::core::models::{ActionKey, Message, PayloadOption, Player, Reply};
use crate::errors::BotError;
use crate::platform::models::{Game, ScoreLine, ScoreSheet};

pub const MAX_INPUT_RETRIES: u64 = 3;

const STATE_PICK_TEAM: &str = "pick_team";
const STATE_PICK_GAME: &str = "pick_game";
const STATE_ENTER_LINE: &str = "enter_line";
const STATE_CONFIRM: &str = "confirm";

pub struct SubmitScore;

#[async_trait]
impl Action for SubmitScore {
    async fn handle(
        &self,
        ctx: &BotContext,
        player: &mut Player,
        message: &Message,
    ) -> Result<Outcome, BotError> {
        if !player.action.state.is_empty() && options::is_cancel(message) {
            return Ok(Outcome::then(
                vec![Reply::text("Okay, cancelled.")],
                ActionKey::Homescreen,
            ));
        }

        match player.action.state.as_str() {
            STATE_PICK_TEAM => pick_team(ctx, player, message).await,
            STATE_PICK_GAME => pick_game(ctx, player, message).await,
            STATE_ENTER_LINE => enter_line(player, message),
            STATE_CONFIRM => confirm(ctx, player, message).await,
            _ => start(ctx, player).await,
        }
    }
}

// ============================================================================
// Stage: team selection
// ============================================================================

async fn start(ctx: &BotContext, player: &mut Player) -> Result<Outcome, BotError> {
    let Some(league) = &player.league else {
        return Ok(Outcome::then(Vec::new(), ActionKey::IdentifyUser));
    };

    let memberships = ctx.platform.teams_for_player(league.player_id).await?;
    let submittable: Vec<_> = memberships
        .iter()
        .filter(|m| player.is_captain_of(m.team_id))
        .collect();

    if submittable.is_empty() {
        return Ok(Outcome::then(
            vec![Reply::text("Only team captains can submit scores.")],
            ActionKey::Homescreen,
        ));
    }

    if let [only] = submittable.as_slice() {
        return load_games(ctx, player, only.team_id).await;
    }

    let teams: Vec<Value> = submittable
        .iter()
        .map(|m| json!({ "id": m.team_id, "name": m.team_name }))
        .collect();
    let mut choices: Vec<PayloadOption> = submittable
        .iter()
        .map(|m| PayloadOption::new(&format!("T{}", m.team_id), &m.team_name))
        .collect();
    choices.push(PayloadOption::new("CANCEL", "Cancel"));

    player.action.state = STATE_PICK_TEAM.to_string();
    player.action.set("teams", teams);
    player.action.set("retries", 0);

    Ok(Outcome::stay(vec![Reply::quick_replies(
        "Which team is this score for?",
        choices,
    )]))
}

async fn pick_team(
    ctx: &BotContext,
    player: &mut Player,
    message: &Message,
) -> Result<Outcome, BotError> {
    let choices = stored_options(player, "teams", 'T');
    let Some(token) = pick_from(message, &choices)? else {
        return retry_or_abort(player, "Pick one of your teams:", &choices);
    };

    let Some(team_id) = token.strip_prefix('T').and_then(|s| s.parse::<u64>().ok()) else {
        return Err(BotError::MalformedOption(token));
    };
    if let Err(BotError::NotACaptain(_)) = ensure_captain(player, team_id) {
        return Ok(Outcome::then(
            vec![Reply::text("You're not a captain of that team.")],
            ActionKey::Homescreen,
        ));
    }

    load_games(ctx, player, team_id).await
}

fn ensure_captain(player: &Player, team_id: u64) -> Result<(), BotError> {
    if player.is_captain_of(team_id) {
        Ok(())
    } else {
        Err(BotError::NotACaptain(team_id))
    }
}

// ============================================================================
// Stage: game selection
// ============================================================================

async fn load_games(
    ctx: &BotContext,
    player: &mut Player,
    team_id: u64,
) -> Result<Outcome, BotError> {
    let games = ctx.platform.recent_games(team_id).await?;
    let unscored: Vec<&Game> = games.iter().filter(|g| !g.scored).collect();

    if unscored.is_empty() {
        return Ok(Outcome::then(
            vec![Reply::text("No games are waiting on a score sheet right now.")],
            ActionKey::Homescreen,
        ));
    }

    let stored: Vec<Value> = unscored
        .iter()
        .map(|g| json!({ "id": g.id, "name": game_label(g, team_id, ctx.tz) }))
        .collect();

    player.action.state = STATE_PICK_GAME.to_string();
    player.action.data.clear();
    player.action.set("team_id", team_id);
    player.action.set("games", stored);
    player.action.set("retries", 0);

    let mut choices = stored_options(player, "games", 'G');
    choices.push(PayloadOption::new("CANCEL", "Cancel"));

    Ok(Outcome::stay(vec![Reply::quick_replies(
        "Which game?",
        choices,
    )]))
}

fn game_label(game: &Game, team_id: u64, tz: chrono_tz::Tz) -> String {
    let opponent = if game.home_team_id == team_id {
        &game.away_team_name
    } else {
        &game.home_team_name
    };
    let when = game.starts_at.with_timezone(&tz).format("%b %-d");
    format!("vs {opponent} ({when})")
}

async fn pick_game(
    ctx: &BotContext,
    player: &mut Player,
    message: &Message,
) -> Result<Outcome, BotError> {
    let choices = stored_options(player, "games", 'G');
    let Some(token) = pick_from(message, &choices)? else {
        return retry_or_abort(player, "Which game?", &choices);
    };

    let Some(game_id) = token.strip_prefix('G').and_then(|s| s.parse::<u64>().ok()) else {
        return Err(BotError::MalformedOption(token));
    };
    let Some(team_id) = player.action.get_u64("team_id") else {
        return Ok(abort_home());
    };

    let roster = ctx.platform.get_roster(team_id).await?;
    if roster.is_empty() {
        return Ok(Outcome::then(
            vec![Reply::text("That team has no roster to score against.")],
            ActionKey::Homescreen,
        ));
    }

    let stored: Vec<Value> = roster
        .iter()
        .map(|p| json!({ "id": p.id, "name": p.name }))
        .collect();

    player.action.state = STATE_ENTER_LINE.to_string();
    player.action.set("game_id", game_id);
    player.action.set("roster", stored);
    player.action.set("index", 0);
    player.action.set("lines", Vec::<Value>::new());
    player.action.set("retries", 0);

    let first = roster_name(player, 0).unwrap_or_else(|| "the first player".to_string());
    Ok(Outcome::stay(vec![Reply::text(line_prompt(&first))]))
}

// ============================================================================
// Stage: per-player score lines
// ============================================================================

fn line_prompt(name: &str) -> String {
    format!("Runs and hits for {name}? (e.g. 3 2)")
}

fn roster_name(player: &Player, index: usize) -> Option<String> {
    player
        .action
        .get_array("roster")?
        .get(index)?
        .get("name")
        .and_then(Value::as_str)
        .map(ToString::to_string)
}

fn enter_line(player: &mut Player, message: &Message) -> Result<Outcome, BotError> {
    let index = player.action.get_u64("index").unwrap_or(0) as usize;
    let roster_len = player.action.get_array("roster").map_or(0, Vec::len);

    if options::is_back(message) {
        if index == 0 {
            // Back out of score entry entirely, to game selection.
            player.action.state = STATE_PICK_GAME.to_string();
            player.action.set("retries", 0);
            let mut choices = stored_options(player, "games", 'G');
            choices.push(PayloadOption::new("CANCEL", "Cancel"));
            return Ok(Outcome::stay(vec![Reply::quick_replies(
                "Which game?",
                choices,
            )]));
        }
        let previous = index - 1;
        if let Some(Value::Array(lines)) = player.action.data.get_mut("lines") {
            lines.pop();
        }
        player.action.set("index", previous as u64);
        player.action.set("retries", 0);
        let name = roster_name(player, previous).unwrap_or_else(|| "that player".to_string());
        return Ok(Outcome::stay(vec![Reply::text(line_prompt(&name))]));
    }

    let name = roster_name(player, index).unwrap_or_else(|| "this player".to_string());
    let Some((runs, hits)) = options::text_of(message).and_then(parse_line) else {
        let retries = player.action.get_u64("retries").unwrap_or(0) + 1;
        if retries >= MAX_INPUT_RETRIES {
            return Ok(Outcome::then(
                vec![Reply::text(
                    "I still couldn't read that. Let's try the score sheet again later.",
                )],
                ActionKey::Homescreen,
            ));
        }
        player.action.set("retries", retries);
        return Ok(Outcome::stay(vec![Reply::text(format!(
            "I need two numbers, runs then hits, like \"3 2\". {}",
            line_prompt(&name)
        ))]));
    };

    let player_id = player
        .action
        .get_array("roster")
        .and_then(|r| r.get(index))
        .and_then(|p| p.get("id"))
        .and_then(Value::as_u64)
        .unwrap_or(0);

    if let Some(Value::Array(lines)) = player.action.data.get_mut("lines") {
        lines.push(json!({ "player_id": player_id, "runs": runs, "hits": hits }));
    }
    player.action.set("retries", 0);

    let next = index + 1;
    if next < roster_len {
        player.action.set("index", next as u64);
        let next_name = roster_name(player, next).unwrap_or_else(|| "the next player".to_string());
        return Ok(Outcome::stay(vec![Reply::text(line_prompt(&next_name))]));
    }

    // Every roster player is scored; summarize and ask for confirmation.
    player.action.state = STATE_CONFIRM.to_string();
    let summary = summary_text(player);
    Ok(Outcome::stay(vec![Reply::quick_replies(
        summary,
        vec![
            PayloadOption::new("CONFIRM", "Submit"),
            PayloadOption::new("RESTART", "Start over"),
            PayloadOption::new("CANCEL", "Cancel"),
        ],
    )]))
}

/// Two non-negative integers, runs then hits. Commas and slashes work as
/// separators too.
fn parse_line(text: &str) -> Option<(u32, u32)> {
    let cleaned = text.replace([',', '/'], " ");
    let mut parts = cleaned.split_whitespace();
    let runs = parts.next()?.parse().ok()?;
    let hits = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some((runs, hits))
}

fn summary_text(player: &Player) -> String {
    let roster = player.action.get_array("roster").cloned().unwrap_or_default();
    let lines = player.action.get_array("lines").cloned().unwrap_or_default();

    let mut out = String::from("Here's what I have:\n");
    for (entry, line) in roster.iter().zip(lines.iter()) {
        let name = entry.get("name").and_then(Value::as_str).unwrap_or("?");
        let runs = line.get("runs").and_then(Value::as_u64).unwrap_or(0);
        let hits = line.get("hits").and_then(Value::as_u64).unwrap_or(0);
        out.push_str(&format!("{name}: {runs} runs, {hits} hits\n"));
    }
    out.push_str("Submit this score sheet?");
    out
}

// ============================================================================
// Stage: confirmation and submission
// ============================================================================

async fn confirm(
    ctx: &BotContext,
    player: &mut Player,
    message: &Message,
) -> Result<Outcome, BotError> {
    let choices = vec![
        PayloadOption::new("CONFIRM", "Submit"),
        PayloadOption::new("RESTART", "Start over"),
        PayloadOption::new("CANCEL", "Cancel"),
    ];
    let picked = match options::match_option(&choices, message) {
        Ok(Some(option)) => option.token.clone(),
        Ok(None) | Err(BotError::MalformedOption(_)) => {
            return retry_or_abort(player, "Submit this score sheet?", &choices);
        }
        Err(e) => return Err(e),
    };

    if picked == "CANCEL" {
        return Ok(Outcome::then(
            vec![Reply::text("Okay, cancelled.")],
            ActionKey::Homescreen,
        ));
    }
    if picked == "RESTART" {
        return Ok(Outcome::then(
            vec![Reply::text("Okay, let's start over.")],
            ActionKey::SubmitScore,
        ));
    }

    let sheet = build_sheet(player).ok_or_else(|| {
        BotError::Store("submit-score state lost its collected lines".to_string())
    })?;
    ctx.platform.submit_score_sheet(&sheet).await?;

    Ok(Outcome::then(
        vec![Reply::text("Score sheet submitted. Thanks, captain!")],
        ActionKey::Homescreen,
    ))
}

fn build_sheet(player: &Player) -> Option<ScoreSheet> {
    let game_id = player.action.get_u64("game_id")?;
    let team_id = player.action.get_u64("team_id")?;
    let submitted_by = player.league.as_ref()?.player_id;

    let lines = player
        .action
        .get_array("lines")?
        .iter()
        .map(|line| {
            Some(ScoreLine {
                player_id: line.get("player_id").and_then(Value::as_u64)?,
                runs: line.get("runs").and_then(Value::as_u64)? as u32,
                hits: line.get("hits").and_then(Value::as_u64)? as u32,
            })
        })
        .collect::<Option<Vec<_>>>()?;

    Some(ScoreSheet {
        game_id,
        team_id,
        submitted_by,
        lines,
    })
}

// ============================================================================
// Shared helpers
// ============================================================================

/// Options rebuilt from a stored `[{id, name}]` array, tokens prefixed with
/// the given letter.
fn stored_options(player: &Player, key: &str, prefix: char) -> Vec<PayloadOption> {
    player
        .action
        .get_array(key)
        .map(|entries| {
            entries
                .iter()
                .filter_map(|entry| {
                    let id = entry.get("id").and_then(Value::as_u64)?;
                    let name = entry.get("name").and_then(Value::as_str)?;
                    Some(PayloadOption::new(&format!("{prefix}{id}"), name))
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Match a selection against `choices`, treating a malformed payload like
/// unmatched text (stale buttons happen). Returns the matched token.
fn pick_from(
    message: &Message,
    choices: &[PayloadOption],
) -> Result<Option<String>, BotError> {
    match options::match_option(choices, message) {
        Ok(Some(option)) => Ok(Some(option.token.clone())),
        Ok(None) | Err(BotError::MalformedOption(_)) => Ok(None),
        Err(e) => Err(e),
    }
}

fn retry_or_abort(
    player: &mut Player,
    reprompt: &str,
    choices: &[PayloadOption],
) -> Result<Outcome, BotError> {
    let retries = player.action.get_u64("retries").unwrap_or(0) + 1;
    if retries >= MAX_INPUT_RETRIES {
        return Ok(abort_home_with(
            "I couldn't make sense of that. Let's try the score sheet again later.",
        ));
    }
    player.action.set("retries", retries);
    Ok(Outcome::stay(vec![Reply::quick_replies(
        format!("Sorry, I didn't catch that. {reprompt}"),
        choices.to_vec(),
    )]))
}

fn abort_home() -> Outcome {
    abort_home_with("Something went sideways, let's start from the top.")
}

fn abort_home_with(text: &str) -> Outcome {
    Outcome::then(vec![Reply::text(text)], ActionKey::Homescreen)
}
