//! Conversation log and its Idle / AwaitingReply protocol.
//!
//! Every transition goes through [`Conversation::apply`], so each one can be
//! driven and checked without a network.

use tracing::{debug, warn};

use crate::chat::dto::{ChatRequest, ChatResponse, HistoryEntry, Turn};
use crate::error::{CoreError, CoreResult};
use crate::flight::{Flight, Ticket};

pub const FALLBACK_REPLY: &str = "Sorry, I encountered an error. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatState {
    Idle,
    AwaitingReply,
}

#[derive(Debug, Clone)]
pub enum ChatEvent {
    Send(String),
    Replied { ticket: Ticket, response: ChatResponse },
    Failed { ticket: Ticket, error: CoreError },
    Clear,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Issue exactly this request and feed the outcome back with `ticket`.
    Request { ticket: Ticket, request: ChatRequest },
    Rejected(CoreError),
    Appended,
    /// The outcome belonged to a request that is no longer current.
    Discarded,
    Cleared,
}

/// Append-only list of turns. Turns are never edited or reordered; only
/// [`ChatEvent::Clear`] removes them.
#[derive(Debug)]
pub struct Conversation {
    turns: Vec<Turn>,
    flight: Flight,
}

impl Default for Conversation {
    fn default() -> Self {
        Self {
            turns: Vec::new(),
            flight: Flight::new("chat"),
        }
    }
}

impl Conversation {
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn state(&self) -> ChatState {
        if self.flight.is_busy() {
            ChatState::AwaitingReply
        } else {
            ChatState::Idle
        }
    }

    pub fn apply(&mut self, event: ChatEvent) -> Effect {
        match event {
            ChatEvent::Send(text) => match self.begin_send(text) {
                Ok((ticket, request)) => Effect::Request { ticket, request },
                Err(e) => Effect::Rejected(e),
            },
            ChatEvent::Replied { ticket, response } => self.resolve(ticket, Ok(response)),
            ChatEvent::Failed { ticket, error } => self.resolve(ticket, Err(error)),
            ChatEvent::Clear => {
                self.clear();
                Effect::Cleared
            }
        }
    }

    /// Records the user turn and builds the request. History holds only the
    /// turns that existed before this one. Rejected (not queued) while a
    /// reply is pending.
    pub fn begin_send(&mut self, text: String) -> CoreResult<(Ticket, ChatRequest)> {
        if text.trim().is_empty() {
            return Err(CoreError::validation("Message is empty"));
        }
        let ticket = self.flight.begin()?;
        let history = self.turns.iter().map(HistoryEntry::from).collect();
        self.turns.push(Turn::user(text.clone()));
        Ok((
            ticket,
            ChatRequest {
                message: text,
                history,
            },
        ))
    }

    /// Appends exactly one assistant turn for the current request and returns
    /// to Idle. Any failure becomes the fixed fallback turn.
    pub fn resolve(&mut self, ticket: Ticket, outcome: CoreResult<ChatResponse>) -> Effect {
        if !self.flight.finish(ticket) {
            return Effect::Discarded;
        }
        let turn = match outcome {
            Ok(resp) => {
                for report in resp.sql_commands.iter().filter(|r| !r.success) {
                    warn!(
                        description = %report.description,
                        error = report.error.as_deref().unwrap_or(""),
                        "coach action failed server-side"
                    );
                }
                debug!(actions = resp.actions.len(), done = resp.done, "coach replied");
                Turn::assistant(resp.reply, resp.actions)
            }
            Err(e) => {
                warn!(error = %e, "chat request failed");
                Turn::failure(FALLBACK_REPLY)
            }
        };
        self.turns.push(turn);
        Effect::Appended
    }

    /// Always allowed. A pending request becomes stale and its reply is dropped.
    pub fn clear(&mut self) {
        self.turns.clear();
        self.flight.abandon();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::dto::{Action, Role};
    use serde_json::json;

    fn reply(text: &str, actions: Vec<Action>) -> ChatResponse {
        ChatResponse {
            reply: text.into(),
            done: true,
            actions,
            sql_commands: Vec::new(),
        }
    }

    fn expect_request(effect: Effect) -> (Ticket, ChatRequest) {
        match effect {
            Effect::Request { ticket, request } => (ticket, request),
            other => panic!("expected a request, got {other:?}"),
        }
    }

    #[test]
    fn send_then_reply_round_trip() {
        let mut conv = Conversation::default();
        assert_eq!(conv.state(), ChatState::Idle);

        let (ticket, request) = expect_request(conv.apply(ChatEvent::Send("Log 2 eggs".into())));
        assert_eq!(conv.state(), ChatState::AwaitingReply);
        assert_eq!(conv.turns().len(), 1);
        assert_eq!(conv.turns()[0].role, Role::User);
        assert_eq!(request.message, "Log 2 eggs");
        assert!(request.history.is_empty());

        let action = Action {
            name: "log_meal".into(),
            arguments: json!({"items": [{"name": "egg", "qty": 2}]}),
        };
        let effect = conv.apply(ChatEvent::Replied {
            ticket,
            response: reply("Logged 2 eggs.", vec![action.clone()]),
        });
        assert_eq!(effect, Effect::Appended);
        assert_eq!(conv.state(), ChatState::Idle);
        assert_eq!(conv.turns().len(), 2);
        let last = &conv.turns()[1];
        assert_eq!(last.role, Role::Assistant);
        assert_eq!(last.content, "Logged 2 eggs.");
        assert_eq!(last.actions, vec![action]);
        assert!(!last.is_error);
    }

    #[test]
    fn second_send_while_awaiting_is_rejected() {
        let mut conv = Conversation::default();
        let (ticket, _) = expect_request(conv.apply(ChatEvent::Send("first".into())));
        let effect = conv.apply(ChatEvent::Send("second".into()));
        assert_eq!(effect, Effect::Rejected(CoreError::Busy("chat")));
        assert_eq!(conv.turns().len(), 1);

        conv.apply(ChatEvent::Replied {
            ticket,
            response: reply("ok", Vec::new()),
        });
        assert_eq!(conv.turns().len(), 2);
    }

    #[test]
    fn blank_text_is_rejected() {
        let mut conv = Conversation::default();
        let effect = conv.apply(ChatEvent::Send("   ".into()));
        assert!(matches!(effect, Effect::Rejected(CoreError::Validation(_))));
        assert!(conv.turns().is_empty());
        assert_eq!(conv.state(), ChatState::Idle);
    }

    #[test]
    fn failure_appends_one_fallback_and_returns_to_idle() {
        let mut conv = Conversation::default();
        let (ticket, _) = expect_request(conv.apply(ChatEvent::Send("hello".into())));
        conv.apply(ChatEvent::Failed {
            ticket,
            error: CoreError::remote(Some(500), "LLM error"),
        });
        assert_eq!(conv.state(), ChatState::Idle);
        assert_eq!(conv.turns().len(), 2);
        let last = &conv.turns()[1];
        assert!(last.is_error);
        assert_eq!(last.content, FALLBACK_REPLY);
        assert!(last.actions.is_empty());
    }

    #[test]
    fn history_excludes_the_new_turn() {
        let mut conv = Conversation::default();
        let (t1, _) = expect_request(conv.apply(ChatEvent::Send("one".into())));
        conv.apply(ChatEvent::Replied {
            ticket: t1,
            response: reply("uno", Vec::new()),
        });
        let (_, request) = expect_request(conv.apply(ChatEvent::Send("two".into())));
        let contents: Vec<_> = request.history.iter().map(|h| h.content.as_str()).collect();
        assert_eq!(contents, vec!["one", "uno"]);
        assert_eq!(request.message, "two");
    }

    #[test]
    fn clear_works_from_any_state_and_drops_late_reply() {
        let mut conv = Conversation::default();
        assert_eq!(conv.apply(ChatEvent::Clear), Effect::Cleared);

        let (ticket, _) = expect_request(conv.apply(ChatEvent::Send("hello".into())));
        conv.apply(ChatEvent::Clear);
        assert!(conv.turns().is_empty());
        assert_eq!(conv.state(), ChatState::Idle);

        let late = conv.apply(ChatEvent::Replied {
            ticket,
            response: reply("too late", Vec::new()),
        });
        assert_eq!(late, Effect::Discarded);
        assert!(conv.turns().is_empty());
    }
}
