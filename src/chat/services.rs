use tracing::instrument;

use crate::auth::AuthSession;
use crate::backend::NutritionBackend;
use crate::chat::dto::Turn;
use crate::chat::session::{Conversation, Effect};
use crate::error::CoreResult;

/// Runs one full exchange. Only local rejection (blank text, reply pending)
/// is an error; remote failures end up as an error-flagged assistant turn.
/// Returns the assistant turn, or `None` if the reply arrived stale.
#[instrument(skip(conv, backend, auth, text))]
pub async fn send_message<'a>(
    conv: &'a mut Conversation,
    backend: &dyn NutritionBackend,
    auth: &AuthSession,
    text: &str,
) -> CoreResult<Option<&'a Turn>> {
    let (ticket, request) = conv.begin_send(text.to_string())?;
    let outcome = backend.send_chat(auth, &request).await;
    match conv.resolve(ticket, outcome) {
        Effect::Appended => Ok(conv.turns().last()),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::fake::FakeBackend;
    use crate::chat::session::{ChatState, FALLBACK_REPLY};
    use crate::error::CoreError;

    #[tokio::test]
    async fn remote_failure_becomes_error_turn() {
        let backend = FakeBackend::default();
        let auth = AuthSession::with_token("t");
        let mut conv = Conversation::default();
        backend.fail_next(CoreError::remote(None, "connection reset"));

        let turn = send_message(&mut conv, &backend, &auth, "Log 2 eggs")
            .await
            .expect("send")
            .cloned()
            .expect("turn appended");
        assert!(turn.is_error);
        assert_eq!(turn.content, FALLBACK_REPLY);
        assert_eq!(conv.turns().len(), 2);
        assert_eq!(conv.state(), ChatState::Idle);
    }

    #[tokio::test]
    async fn reply_and_actions_are_recorded() {
        let backend = FakeBackend::default();
        let auth = AuthSession::with_token("t");
        let mut conv = Conversation::default();

        let turn = send_message(&mut conv, &backend, &auth, "Log 2 eggs")
            .await
            .expect("send")
            .cloned()
            .expect("turn appended");
        assert_eq!(turn.content, "echo: Log 2 eggs");
        assert_eq!(turn.actions.len(), 1);
        assert_eq!(backend.calls(), vec!["chat:Log 2 eggs (history 0)"]);
    }

    #[tokio::test]
    async fn blank_message_never_hits_the_wire() {
        let backend = FakeBackend::default();
        let auth = AuthSession::with_token("t");
        let mut conv = Conversation::default();
        let err = send_message(&mut conv, &backend, &auth, "\n ")
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
        assert!(backend.calls().is_empty());
    }
}
