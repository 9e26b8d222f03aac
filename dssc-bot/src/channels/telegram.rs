use std::sync::Arc;

use async_trait::async_trait;
use teloxide::RequestError;
use teloxide::net::Download;
use teloxide::prelude::*;
use teloxide::types::{
    ForceReply, InlineKeyboardButton, InlineKeyboardMarkup, MessageId, ParseMode, ReplyMarkup,
};
use tokio::sync::oneshot;

use crate::conversation::{Attachment, Button, ChatTransport, ConversationRouter, Reply};
use crate::error::{BotError, BotResult};
use crate::models::UserProfile;

/// Key files are a few hundred bytes; anything bigger is not one
const MAX_ATTACHMENT_BYTES: u32 = 64 * 1024;

fn profile_of(user: &teloxide::types::User) -> UserProfile {
    UserProfile {
        tg_id: user.id.0 as i64,
        username: user.username.clone(),
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
    }
}

/// `/start@dssc_bot arg` → (`start`, `arg`)
fn parse_command(text: &str) -> Option<(&str, &str)> {
    let rest = text.strip_prefix('/')?;
    let (head, args) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
    let command = head.split('@').next().unwrap_or(head);
    if command.is_empty() {
        return None;
    }
    Some((command, args.trim()))
}

fn keyboard(rows: &[Vec<Button>]) -> BotResult<InlineKeyboardMarkup> {
    let rows = rows
        .iter()
        .map(|row| {
            row.iter()
                .map(|button| match button {
                    Button::Callback { label, data } => Ok(InlineKeyboardButton::callback(label, data)),
                    Button::Url { label, url } => {
                        let url = url::Url::parse(url)
                            .map_err(|e| BotError::Config(format!("invalid link {}: {}", url, e)))?;
                        Ok(InlineKeyboardButton::url(label, url))
                    }
                })
                .collect::<BotResult<Vec<_>>>()
        })
        .collect::<BotResult<Vec<_>>>()?;
    Ok(InlineKeyboardMarkup::new(rows))
}

pub struct TelegramTransport {
    bot: Bot,
}

impl TelegramTransport {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    /// Markdown first; error texts can carry characters Markdown rejects,
    /// so a parse failure is retried as plain text.
    async fn send(&self, chat_id: i64, text: &str, markup: Option<ReplyMarkup>) -> BotResult<i32> {
        let mut request = self
            .bot
            .send_message(ChatId(chat_id), text)
            .parse_mode(ParseMode::Markdown);
        if let Some(markup) = markup.clone() {
            request = request.reply_markup(markup);
        }

        match request.await {
            Ok(message) => Ok(message.id.0),
            Err(RequestError::Api(e)) => {
                log::debug!("Telegram: Markdown rejected ({}), sending plain text", e);
                let mut plain = self.bot.send_message(ChatId(chat_id), text);
                if let Some(markup) = markup {
                    plain = plain.reply_markup(markup);
                }
                Ok(plain.await?.id.0)
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl ChatTransport for TelegramTransport {
    async fn send_text(&self, chat_id: i64, text: &str) -> BotResult<i32> {
        self.send(chat_id, text, None).await
    }

    async fn present_choice(&self, chat_id: i64, text: &str, rows: &[Vec<Button>]) -> BotResult<i32> {
        let markup = keyboard(rows)?;
        self.send(chat_id, text, Some(ReplyMarkup::InlineKeyboard(markup))).await
    }

    async fn send_action_link(&self, chat_id: i64, text: &str, label: &str, url: &str) -> BotResult<i32> {
        let markup = keyboard(&[vec![Button::Url {
            label: label.to_string(),
            url: url.to_string(),
        }]])?;
        self.send(chat_id, text, Some(ReplyMarkup::InlineKeyboard(markup))).await
    }

    async fn send_prompt(&self, chat_id: i64, text: &str) -> BotResult<i32> {
        let message = self
            .bot
            .send_message(ChatId(chat_id), text)
            .reply_markup(ReplyMarkup::ForceReply(ForceReply::new()))
            .await?;
        Ok(message.id.0)
    }

    async fn delete_message(&self, chat_id: i64, message_id: i32) -> BotResult<()> {
        self.bot.delete_message(ChatId(chat_id), MessageId(message_id)).await?;
        Ok(())
    }
}

async fn download_attachment(bot: &Bot, msg: &Message) -> BotResult<Option<Attachment>> {
    let Some(document) = msg.document() else {
        return Ok(None);
    };
    if document.file.size > MAX_ATTACHMENT_BYTES {
        return Err(BotError::validation("File too large"));
    }

    let file = bot.get_file(&document.file.id).await?;
    let mut bytes = Vec::new();
    bot.download_file(&file.path, &mut bytes)
        .await
        .map_err(|e| BotError::Transport(format!("download failed: {}", e)))?;

    Ok(Some(Attachment {
        file_name: document.file_name.clone().unwrap_or_default(),
        bytes,
    }))
}

async fn handle_message(
    bot: Bot,
    msg: Message,
    router: Arc<ConversationRouter>,
    transport: Arc<TelegramTransport>,
) -> ResponseResult<()> {
    if !msg.chat.is_private() {
        log::debug!("Telegram: Ignoring message from non-private chat {}", msg.chat.id);
        return Ok(());
    }
    let Some(from) = msg.from() else {
        return Ok(());
    };
    let profile = profile_of(from);
    let chat_id = msg.chat.id.0;
    let text = msg.text().or(msg.caption()).unwrap_or_default().trim().to_string();

    let reaction = if let Some(original) = msg.reply_to_message() {
        match download_attachment(&bot, &msg).await {
            Ok(attachment) => {
                let reply = Reply {
                    chat_id,
                    reply_to_id: original.id.0,
                    reply_to_text: original.text().unwrap_or_default().to_string(),
                    text,
                    attachment,
                };
                router.on_reply(&profile, &reply).await
            }
            Err(e) => router.on_attachment_error(&profile, e),
        }
    } else if let Some((command, args)) = parse_command(&text) {
        router.on_command(&profile, command, args).await
    } else {
        log::debug!("Telegram: Ignoring free text from {}", profile.display_name());
        return Ok(());
    };

    if let Err(e) = router.deliver(transport.as_ref(), chat_id, reaction).await {
        log::error!("Telegram: Failed to answer {}: {}", profile.display_name(), e);
    }
    Ok(())
}

async fn handle_callback(
    bot: Bot,
    query: CallbackQuery,
    router: Arc<ConversationRouter>,
    transport: Arc<TelegramTransport>,
) -> ResponseResult<()> {
    if let Err(e) = bot.answer_callback_query(query.id.clone()).text("Ok").await {
        log::warn!("Telegram: Failed to answer callback query: {}", e);
    }

    let Some(data) = query.data.as_deref() else {
        return Ok(());
    };
    let profile = profile_of(&query.from);
    let reaction = router.on_selection(&profile, data).await;

    if let Err(e) = router.deliver(transport.as_ref(), profile.tg_id, reaction).await {
        log::error!("Telegram: Failed to answer {}: {}", profile.display_name(), e);
    }
    Ok(())
}

/// Run the bot until ctrl-c or `shutdown_rx`
pub async fn start_telegram_listener(
    bot_token: &str,
    router: Arc<ConversationRouter>,
    shutdown_rx: oneshot::Receiver<()>,
) -> BotResult<()> {
    log::info!("Starting Telegram listener");
    let bot = Bot::new(bot_token);

    log::info!("Telegram: Validating bot token...");
    let me = bot
        .get_me()
        .await
        .map_err(|e| BotError::Config(format!("invalid Telegram bot token: {}", e)))?;
    log::info!("Telegram: Bot validated - username: @{}, id: {}", me.username(), me.id);

    let transport = Arc::new(TelegramTransport::new(bot.clone()));
    let handler = dptree::entry()
        .branch(Update::filter_message().endpoint(handle_message))
        .branch(Update::filter_callback_query().endpoint(handle_callback));

    let mut dispatcher = Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![router, transport])
        .enable_ctrlc_handler()
        .build();

    tokio::select! {
        _ = shutdown_rx => {
            log::info!("Telegram listener received shutdown signal");
        }
        _ = dispatcher.dispatch() => {
            log::info!("Telegram listener stopped");
        }
    }
    Ok(())
}
