//! The main menu. League queries (games, leaders, events, fun meter) are
//! answered inline and the menu is shown again; "submit a score" hands off
//! to the submit-score action; game reminders run a short quick-reply
//! toggle flow, since subscriptions live outside the nested action flows.

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::warn;

use super::{Action, BotContext, Outcome, options};
use crate::core::models::{ActionKey, Message, Payload, PayloadOption, Player, Reply};
use crate::core::subscriptions::ReminderTime;
use crate::errors::BotError;
use crate::platform::models::Game;

const STATE_MENU: &str = "menu";
const STATE_SUBS_TEAM: &str = "subs_team";
const STATE_SUBS_TIME: &str = "subs_time";

pub struct Homescreen;

#[async_trait]
impl Action for Homescreen {
    async fn handle(
        &self,
        ctx: &BotContext,
        player: &mut Player,
        message: &Message,
    ) -> Result<Outcome, BotError> {
        match player.action.state.as_str() {
            STATE_MENU => handle_menu(ctx, player, message).await,
            STATE_SUBS_TEAM => handle_subs_team(player, message),
            STATE_SUBS_TIME => handle_subs_time(player, message),
            // Fresh arrival (including via chaining): just show the menu.
            _ => {
                player.action.state = STATE_MENU.to_string();
                Ok(Outcome::stay(vec![menu_reply(player)]))
            }
        }
    }
}

// ============================================================================
// Menu
// ============================================================================

fn menu_options(player: &Player) -> Vec<PayloadOption> {
    let mut options = vec![
        PayloadOption::new("GAMES", "Upcoming games"),
        PayloadOption::new("LEADERS", "League leaders"),
        PayloadOption::new("EVENTS", "Event calendar"),
        PayloadOption::new("FUN", "Fun meter"),
        PayloadOption::new("SUBS", "Game reminders"),
    ];
    if player.can_submit_scores() {
        options.push(PayloadOption::new("SCORE", "Submit a score"));
    }
    options
}

fn menu_reply(player: &Player) -> Reply {
    Reply::buttons("What can I do for you?", menu_options(player))
}

async fn handle_menu(
    ctx: &BotContext,
    player: &mut Player,
    message: &Message,
) -> Result<Outcome, BotError> {
    let options = menu_options(player);
    let picked = match options::match_option(&options, message) {
        Ok(Some(option)) => option.token.clone(),
        Ok(None) => return Ok(didnt_catch_that(player)),
        Err(BotError::MalformedOption(payload)) => {
            // Stale button from an earlier menu; treat like unmatched text.
            warn!(payload = %payload, "Unrecognized menu payload");
            return Ok(didnt_catch_that(player));
        }
        Err(e) => return Err(e),
    };

    match picked.as_str() {
        "GAMES" => {
            let text = upcoming_games_text(ctx, player).await?;
            Ok(Outcome::stay(vec![Reply::text(text), menu_reply(player)]))
        }
        "LEADERS" => {
            let leaders = ctx.platform.league_leaders().await?;
            let text = if leaders.is_empty() {
                "No league leaders yet, get out there and hit.".to_string()
            } else {
                let lines: Vec<String> = leaders
                    .iter()
                    .take(5)
                    .map(|l| format!("{} - {} {}", l.player_name, l.value, l.stat))
                    .collect();
                format!("League leaders:\n{}", lines.join("\n"))
            };
            Ok(Outcome::stay(vec![Reply::text(text), menu_reply(player)]))
        }
        "EVENTS" => {
            let events = ctx.platform.event_calendar().await?;
            let text = if events.is_empty() {
                "Nothing on the league calendar right now.".to_string()
            } else {
                let lines: Vec<String> = events
                    .iter()
                    .take(3)
                    .map(|e| {
                        let when = e.starts_at.with_timezone(&ctx.tz).format("%a %b %-d");
                        match &e.location {
                            Some(loc) => format!("{when} - {} at {loc}", e.title),
                            None => format!("{when} - {}", e.title),
                        }
                    })
                    .collect();
                format!("Coming up:\n{}", lines.join("\n"))
            };
            Ok(Outcome::stay(vec![Reply::text(text), menu_reply(player)]))
        }
        "FUN" => {
            let meter = ctx.platform.fun_meter().await?;
            Ok(Outcome::stay(vec![
                Reply::text(format!(
                    "The league fun meter reads {}/{} right now.",
                    meter.score, meter.max
                )),
                menu_reply(player),
            ]))
        }
        "SUBS" => start_subs_flow(ctx, player).await,
        "SCORE" => {
            if player.can_submit_scores() {
                Ok(Outcome::then(Vec::new(), ActionKey::SubmitScore))
            } else {
                Ok(Outcome::stay(vec![
                    Reply::text("Only team captains can submit scores."),
                    menu_reply(player),
                ]))
            }
        }
        _ => Ok(didnt_catch_that(player)),
    }
}

fn didnt_catch_that(player: &Player) -> Outcome {
    Outcome::stay(vec![Reply::buttons(
        "Sorry, I didn't catch that. Here's what I can do:",
        menu_options(player),
    )])
}

async fn upcoming_games_text(ctx: &BotContext, player: &Player) -> Result<String, BotError> {
    let mut lines = Vec::new();
    for &team_id in &player.team_ids {
        let games = ctx.platform.upcoming_games(team_id).await?;
        for game in games.iter().take(3) {
            lines.push(format_game(game, ctx.tz));
        }
    }
    if lines.is_empty() {
        Ok("No upcoming games on the schedule.".to_string())
    } else {
        Ok(format!("Upcoming games:\n{}", lines.join("\n")))
    }
}

fn format_game(game: &Game, tz: chrono_tz::Tz) -> String {
    let when = game.starts_at.with_timezone(&tz).format("%a %b %-d %-I:%M %p");
    let base = format!("{when} - {} vs {}", game.home_team_name, game.away_team_name);
    match &game.location {
        Some(loc) => format!("{base} at {loc}"),
        None => base,
    }
}

// ============================================================================
// Reminder subscriptions (inline quick-reply flow)
// ============================================================================

async fn start_subs_flow(ctx: &BotContext, player: &mut Player) -> Result<Outcome, BotError> {
    let Some(league) = &player.league else {
        return Ok(Outcome::then(Vec::new(), ActionKey::IdentifyUser));
    };
    if player.team_ids.is_empty() {
        return Ok(Outcome::stay(vec![
            Reply::text("You're not on any teams yet, so there's nothing to remind you about."),
            menu_reply(player),
        ]));
    }

    let memberships = ctx.platform.teams_for_player(league.player_id).await?;
    let teams: Vec<Value> = memberships
        .iter()
        .map(|m| json!({ "id": m.team_id, "name": m.team_name }))
        .collect();

    let mut choices: Vec<PayloadOption> = memberships
        .iter()
        .map(|m| PayloadOption::new(&format!("T{}", m.team_id), &m.team_name))
        .collect();
    choices.push(PayloadOption::new("CANCEL", "Never mind"));

    player.action.state = STATE_SUBS_TEAM.to_string();
    player.action.set("teams", teams);

    Ok(Outcome::stay(vec![Reply::quick_replies(
        "Which team do you want game reminders for?",
        choices,
    )]))
}

fn subs_team_options(player: &Player) -> Vec<PayloadOption> {
    let mut choices: Vec<PayloadOption> = player
        .action
        .get_array("teams")
        .map(|teams| {
            teams
                .iter()
                .filter_map(|t| {
                    let id = t.get("id").and_then(Value::as_u64)?;
                    let name = t.get("name").and_then(Value::as_str)?;
                    Some(PayloadOption::new(&format!("T{id}"), name))
                })
                .collect()
        })
        .unwrap_or_default();
    choices.push(PayloadOption::new("CANCEL", "Never mind"));
    choices
}

fn handle_subs_team(player: &mut Player, message: &Message) -> Result<Outcome, BotError> {
    if options::is_cancel(message) {
        return Ok(back_to_menu(player, "No problem."));
    }

    let choices = subs_team_options(player);
    let picked = match options::match_option(&choices, message) {
        Ok(Some(option)) => option.clone(),
        Ok(None) | Err(BotError::MalformedOption(_)) => {
            return Ok(Outcome::stay(vec![Reply::quick_replies(
                "Pick one of your teams:",
                choices,
            )]));
        }
        Err(e) => return Err(e),
    };

    if picked.token == "CANCEL" {
        return Ok(back_to_menu(player, "No problem."));
    }
    let Some(team_id) = picked.token.strip_prefix('T').and_then(|s| s.parse::<u64>().ok())
    else {
        return Err(BotError::MalformedOption(picked.token));
    };

    player.action.state = STATE_SUBS_TIME.to_string();
    player.action.set("sub_team_id", team_id);
    player.action.set("sub_team_name", picked.title.as_str());

    Ok(Outcome::stay(vec![Reply::quick_replies(
        format!("When should I remind you about {} games?", picked.title),
        reminder_time_options(),
    )]))
}

fn reminder_time_options() -> Vec<PayloadOption> {
    vec![
        PayloadOption::new("MORNING", "Morning of"),
        PayloadOption::new("NIGHT", "Night before"),
        PayloadOption::new("HOUR", "An hour before"),
        PayloadOption::new("OFF", "Turn reminders off"),
    ]
}

fn handle_subs_time(player: &mut Player, message: &Message) -> Result<Outcome, BotError> {
    if options::is_cancel(message) {
        return Ok(back_to_menu(player, "No problem."));
    }

    let choices = reminder_time_options();
    let picked = match options::match_option(&choices, message) {
        Ok(Some(option)) => option.token.clone(),
        Ok(None) | Err(BotError::MalformedOption(_)) => {
            return Ok(Outcome::stay(vec![Reply::quick_replies(
                "When should I remind you?",
                choices,
            )]));
        }
        Err(e) => return Err(e),
    };

    let Some(team_id) = player.action.get_u64("sub_team_id") else {
        return Ok(back_to_menu(player, "Let's start over."));
    };
    let team_name = player
        .action
        .get_str("sub_team_name")
        .unwrap_or("that team")
        .to_string();

    let confirmation = match picked.as_str() {
        "MORNING" => {
            player
                .subscriptions
                .subscribe(team_id, ReminderTime::MorningOf);
            format!("Done. I'll ping you the morning of every {team_name} game.")
        }
        "NIGHT" => {
            player
                .subscriptions
                .subscribe(team_id, ReminderTime::NightBefore);
            format!("Done. I'll ping you the night before every {team_name} game.")
        }
        "HOUR" => {
            player
                .subscriptions
                .subscribe(team_id, ReminderTime::HourBefore);
            format!("Done. I'll ping you an hour before every {team_name} game.")
        }
        _ => {
            player.subscriptions.unsubscribe(team_id);
            format!("Okay, no more reminders for {team_name}.")
        }
    };

    Ok(back_to_menu(player, &confirmation))
}

fn back_to_menu(player: &mut Player, text: &str) -> Outcome {
    player.action.state = STATE_MENU.to_string();
    player.action.data.clear();
    Outcome::stay(vec![
        Reply::text(text),
        Reply {
            text: "What else can I do for you?".to_string(),
            payload: Some(Payload {
                options: menu_options(player),
                quick_reply: false,
            }),
        },
    ])
}
