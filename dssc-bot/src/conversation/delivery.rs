//! Hands reactions to the chat platform

use async_trait::async_trait;

use super::{Button, Choice, ConversationRouter, Outgoing, Reaction};
use crate::error::BotResult;

/// Outbound side of the chat platform. Sends return the new message id.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn send_text(&self, chat_id: i64, text: &str) -> BotResult<i32>;

    async fn present_choice(&self, chat_id: i64, text: &str, rows: &[Vec<Button>]) -> BotResult<i32>;

    async fn send_action_link(&self, chat_id: i64, text: &str, label: &str, url: &str) -> BotResult<i32>;

    /// Question the user answers with a reply
    async fn send_prompt(&self, chat_id: i64, text: &str) -> BotResult<i32>;

    async fn delete_message(&self, chat_id: i64, message_id: i32) -> BotResult<()>;
}

impl ConversationRouter {
    /// Send a reaction to `chat_id`. The bot only talks in private chats, so
    /// the chat id is also the user's platform id.
    pub async fn deliver(&self, transport: &dyn ChatTransport, chat_id: i64, reaction: Reaction) -> BotResult<()> {
        let outgoing = match reaction {
            Reaction::Ignored(reason) => {
                log::debug!("Nothing to send to {} ({:?})", chat_id, reason);
                return Ok(());
            }
            Reaction::Send(outgoing) => outgoing,
        };

        for item in outgoing {
            match item {
                Outgoing::Text(text) => {
                    transport.send_text(chat_id, &text).await?;
                }
                Outgoing::Choice(choice) => {
                    transport.present_choice(chat_id, &choice.text, &choice.rows).await?;
                }
                Outgoing::Menu(menu) => self.replace_menu(transport, chat_id, &menu).await?,
                Outgoing::ActionLink { text, label, url } => {
                    transport.send_action_link(chat_id, &text, &label, &url).await?;
                }
                Outgoing::Prompt(kind) => {
                    let message_id = transport.send_prompt(chat_id, kind.text()).await?;
                    self.db.record_pending_prompt(chat_id, message_id, kind)?;
                }
                Outgoing::Alert(text) => {
                    let alert = format!("⛔️ {}", text);
                    if let Err(e) = transport.send_text(self.bot_owner, &alert).await {
                        log::error!("Failed to alert the owner: {}", e);
                    }
                }
            }
        }
        Ok(())
    }

    async fn replace_menu(&self, transport: &dyn ChatTransport, chat_id: i64, menu: &Choice) -> BotResult<()> {
        let user = self.db.get_user_by_tg_id(chat_id)?;
        if let Some(old) = user.as_ref().and_then(|u| u.last_menu_id) {
            if let Err(e) = transport.delete_message(chat_id, old).await {
                log::debug!("Old menu {} already gone: {}", old, e);
            }
        }

        let message_id = transport.present_choice(chat_id, &menu.text, &menu.rows).await?;
        if let Some(user) = user {
            self.db.set_last_menu_id(user.id, Some(message_id))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::*;
    use super::super::{IgnoreReason, menus};
    use super::*;
    use crate::models::PromptKind;

    #[tokio::test]
    async fn test_ignored_sends_nothing() {
        let router = router();
        let transport = RecordingTransport::default();
        router
            .deliver(&transport, USER_ID, Reaction::Ignored(IgnoreReason::Unauthorized))
            .await
            .unwrap();
        assert!(transport.sent.lock().is_empty());
    }

    #[tokio::test]
    async fn test_prompt_is_recorded() {
        let router = router();
        let transport = RecordingTransport::default();
        router
            .deliver(&transport, USER_ID, Reaction::Send(vec![Outgoing::Prompt(PromptKind::AddWallet)]))
            .await
            .unwrap();

        assert_eq!(
            *transport.sent.lock(),
            vec![Sent::Prompt(USER_ID, PromptKind::AddWallet.text().to_string())]
        );
        assert_eq!(
            db(&router).get_pending_prompt(USER_ID, 1).unwrap(),
            Some(PromptKind::AddWallet)
        );
    }

    #[tokio::test]
    async fn test_menu_replaces_previous_menu() {
        let router = router();
        let user = register(&router, USER_ID);
        let transport = RecordingTransport::default();
        let menu = || Reaction::Send(vec![Outgoing::Menu(menus::wallets_menu())]);

        router.deliver(&transport, USER_ID, menu()).await.unwrap();
        router.deliver(&transport, USER_ID, menu()).await.unwrap();

        let sent = transport.sent.lock().clone();
        assert_eq!(sent.len(), 3);
        assert_eq!(sent[1], Sent::Deleted(USER_ID, 1));
        let stored = db(&router).get_user_by_tg_id(user.profile.tg_id).unwrap().unwrap();
        assert_eq!(stored.last_menu_id, Some(2));
    }

    #[tokio::test]
    async fn test_alert_goes_to_owner() {
        let router = router();
        let transport = RecordingTransport::default();
        router
            .deliver(
                &transport,
                USER_ID,
                Reaction::Send(vec![Outgoing::Text("oops".into()), Outgoing::Alert("db down".into())]),
            )
            .await
            .unwrap();
        assert_eq!(
            *transport.sent.lock(),
            vec![
                Sent::Text(USER_ID, "oops".into()),
                Sent::Text(OWNER_ID, "⛔️ db down".into()),
            ]
        );
    }

    #[tokio::test]
    async fn test_action_link() {
        let router = router();
        let transport = RecordingTransport::default();
        let link = Outgoing::ActionLink {
            text: "Delegate".into(),
            label: "10.0000 eGLD".into(),
            url: "https://wallet.example/hook".into(),
        };
        router.deliver(&transport, USER_ID, Reaction::Send(vec![link])).await.unwrap();
        assert_eq!(
            transport.sent.lock()[0],
            Sent::Link(USER_ID, "Delegate".into(), "10.0000 eGLD".into(), "https://wallet.example/hook".into())
        );
    }
}
