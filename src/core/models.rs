use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::subscriptions::Subscriptions;

/// The named actions the conversation can be in. The key decides which
/// handler interprets the rest of the [`ActionState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKey {
    IdentifyUser,
    Welcome,
    Homescreen,
    SubmitScore,
}

/// Conversational position of one player: an action key, a free-form state
/// label, and a data bag. The label and bag are private to the handler that
/// owns the key and are replaced wholesale on every transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionState {
    pub key: ActionKey,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub data: Map<String, Value>,
}

impl ActionState {
    #[must_use]
    pub fn new(key: ActionKey) -> Self {
        Self {
            key,
            state: String::new(),
            data: Map::new(),
        }
    }

    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.data.insert(key.to_string(), value.into());
    }

    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(Value::as_str)
    }

    #[must_use]
    pub fn get_u64(&self, key: &str) -> Option<u64> {
        self.data.get(key).and_then(Value::as_u64)
    }

    #[must_use]
    pub fn get_array(&self, key: &str) -> Option<&Vec<Value>> {
        self.data.get(key).and_then(Value::as_array)
    }
}

/// League-side identity established by the identify flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeagueLink {
    pub player_id: u64,
    pub name: String,
    pub gender: Option<String>,
}

/// One messenger user, keyed by their messenger id. Created on first
/// contact, mutated by every handler, never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub messenger_id: String,
    #[serde(default)]
    pub display_name: String,
    pub league: Option<LeagueLink>,
    #[serde(default)]
    pub team_ids: Vec<u64>,
    #[serde(default)]
    pub captain_of: Vec<u64>,
    #[serde(default)]
    pub convenor: bool,
    #[serde(default)]
    pub subscriptions: Subscriptions,
    pub action: ActionState,
}

impl Player {
    #[must_use]
    pub fn new(messenger_id: &str) -> Self {
        Self {
            messenger_id: messenger_id.to_string(),
            display_name: String::new(),
            league: None,
            team_ids: Vec::new(),
            captain_of: Vec::new(),
            convenor: false,
            subscriptions: Subscriptions::default(),
            // Unseen senders always start in the identify flow.
            action: ActionState::new(ActionKey::IdentifyUser),
        }
    }

    /// Convenors carry captain privileges across every team.
    #[must_use]
    pub fn is_captain_of(&self, team_id: u64) -> bool {
        self.convenor || self.captain_of.contains(&team_id)
    }

    #[must_use]
    pub fn can_submit_scores(&self) -> bool {
        self.convenor || !self.captain_of.is_empty()
    }

    #[must_use]
    pub fn first_name(&self) -> &str {
        self.display_name
            .split_whitespace()
            .next()
            .unwrap_or("there")
    }
}

/// Normalized inbound event: who sent it, and what they sent. A button
/// click or quick reply carries a `payload`; typed text carries `text`;
/// a single event may carry both.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub sender_id: String,
    pub recipient_id: Option<String>,
    pub text: Option<String>,
    pub payload: Option<String>,
}

impl Message {
    #[must_use]
    pub fn text_of(sender_id: &str, text: &str) -> Self {
        Self {
            sender_id: sender_id.to_string(),
            recipient_id: None,
            text: Some(text.to_string()),
            payload: None,
        }
    }

    #[must_use]
    pub fn payload_of(sender_id: &str, payload: &str) -> Self {
        Self {
            sender_id: sender_id.to_string(),
            recipient_id: None,
            text: None,
            payload: Some(payload.to_string()),
        }
    }
}

/// One selectable option: a short payload token the provider echoes back,
/// and the human-readable title shown on the button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadOption {
    pub token: String,
    pub title: String,
}

impl PayloadOption {
    #[must_use]
    pub fn new(token: &str, title: &str) -> Self {
        Self {
            token: token.to_string(),
            title: title.to_string(),
        }
    }
}

/// A structured set of user-selectable options attached to a reply,
/// rendered as postback buttons or quick replies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payload {
    pub options: Vec<PayloadOption>,
    pub quick_reply: bool,
}

/// Normalized outbound reply before provider-specific rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reply {
    pub text: String,
    pub payload: Option<Payload>,
}

impl Reply {
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            payload: None,
        }
    }

    #[must_use]
    pub fn buttons(text: impl Into<String>, options: Vec<PayloadOption>) -> Self {
        Self {
            text: text.into(),
            payload: Some(Payload {
                options,
                quick_reply: false,
            }),
        }
    }

    #[must_use]
    pub fn quick_replies(text: impl Into<String>, options: Vec<PayloadOption>) -> Self {
        Self {
            text: text.into(),
            payload: Some(Payload {
                options,
                quick_reply: true,
            }),
        }
    }
}
