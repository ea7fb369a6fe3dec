use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A mutation the coach already performed server-side. Kept as an open
/// record so new action kinds pass through untouched; it is only displayed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    #[serde(rename = "action", alias = "name")]
    pub name: String,
    #[serde(rename = "args", alias = "arguments", default)]
    pub arguments: Value,
}

impl Action {
    fn label(&self) -> Option<&'static str> {
        match self.name.as_str() {
            "set_goal" => Some("Updated goals"),
            "add_food" => Some("Added food"),
            "log_meal" => Some("Logged meal"),
            "day_summary" => Some("Checked daily summary"),
            _ => None,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.label() {
            Some(label) => write!(f, "{label} ({}): {}", self.name, self.arguments),
            None => write!(f, "{}: {}", self.name, self.arguments),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Turn {
    pub role: Role,
    pub content: String,
    pub actions: Vec<Action>,
    pub is_error: bool,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            actions: Vec::new(),
            is_error: false,
        }
    }

    pub fn assistant(content: impl Into<String>, actions: Vec<Action>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            actions,
            is_error: false,
        }
    }

    pub fn failure(content: impl Into<String>) -> Self {
        Self {
            is_error: true,
            ..Self::assistant(content, Vec::new())
        }
    }
}

/// History as the chat endpoint accepts it: plain role/content pairs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    pub role: Role,
    pub content: String,
}

impl From<&Turn> for HistoryEntry {
    fn from(t: &Turn) -> Self {
        Self {
            role: t.role,
            content: t.content.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    pub message: String,
    pub history: Vec<HistoryEntry>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ExecutionReport {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChatResponse {
    #[serde(rename = "speak", alias = "reply")]
    pub reply: String,
    #[serde(default)]
    pub done: bool,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub actions: Vec<Action>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub sql_commands: Vec<ExecutionReport>,
}

fn null_as_empty<'de, D, T>(d: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(d)?.unwrap_or_default())
}
