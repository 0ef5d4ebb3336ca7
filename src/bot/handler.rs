use std::sync::Arc;

use crate::assets::fetch::AvatarSource;
use crate::bot::model::{IncomingMessage, resolve_sender_name};
use crate::bot::transport::Transport;
use crate::foundation::error::{QuoteError, QuoteResult};
use crate::pipeline::{QuotePipeline, QuoteRequest};

pub const FAILURE_REPLY: &str = "❌ *Could not create the quote sticker*";

/// How a single incoming message was handled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HandleOutcome {
    /// Not a quote command.
    Ignored,
    /// Command without a quoted message; the user was told how to use it.
    MissingQuote,
    Sent,
    /// Rendering or encoding failed; the user got a failure reply.
    Failed,
}

/// Tally of a [`QuoteBot::run`] session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub ignored: usize,
    pub missing_quote: usize,
    pub sent: usize,
    pub failed: usize,
    /// Handlers that ended in a transport error or panicked.
    pub errors: usize,
}

impl RunSummary {
    fn record(&mut self, outcome: HandleOutcome) {
        match outcome {
            HandleOutcome::Ignored => self.ignored += 1,
            HandleOutcome::MissingQuote => self.missing_quote += 1,
            HandleOutcome::Sent => self.sent += 1,
            HandleOutcome::Failed => self.failed += 1,
        }
    }
}

/// Turns quote commands arriving on a [`Transport`] into stickers.
#[derive(Debug)]
pub struct QuoteBot<T> {
    transport: Arc<T>,
    pipeline: Arc<QuotePipeline>,
    command: String,
}

impl<T: Transport> QuoteBot<T> {
    pub fn new(transport: Arc<T>, pipeline: Arc<QuotePipeline>, command: impl Into<String>) -> Self {
        Self {
            transport,
            pipeline,
            command: command.into(),
        }
    }

    pub fn is_command(&self, body: &str) -> bool {
        body.starts_with(&self.command)
    }

    pub fn missing_quote_reply(&self) -> String {
        format!("❌ *Please reply to a message with {}*", self.command)
    }

    /// Handle one message. Only transport failures are returned as errors; pipeline failures
    /// are answered with [`FAILURE_REPLY`].
    #[tracing::instrument(skip_all, fields(msg = %msg.id, chat = %msg.chat_id))]
    pub async fn handle(&self, msg: &IncomingMessage) -> QuoteResult<HandleOutcome> {
        if !self.is_command(&msg.body) {
            return Ok(HandleOutcome::Ignored);
        }

        match self.quote_sticker(msg).await {
            Ok(()) => Ok(HandleOutcome::Sent),
            Err(QuoteError::MissingQuote) => {
                tracing::debug!("quote command without a quoted message");
                self.transport
                    .reply(msg, &self.missing_quote_reply())
                    .await?;
                Ok(HandleOutcome::MissingQuote)
            }
            Err(e @ QuoteError::Transport(_)) => Err(e),
            Err(e) => {
                tracing::warn!(error = %e, "quote sticker failed");
                self.transport.reply(msg, FAILURE_REPLY).await?;
                Ok(HandleOutcome::Failed)
            }
        }
    }

    async fn quote_sticker(&self, msg: &IncomingMessage) -> QuoteResult<()> {
        if !msg.has_quoted_msg {
            return Err(QuoteError::MissingQuote);
        }
        let quoted = self
            .transport
            .quoted_message(msg)
            .await?
            .ok_or(QuoteError::MissingQuote)?;
        let contact = self.transport.contact(&quoted).await?;
        let chat = self.transport.chat(msg).await?;

        let sender_name = resolve_sender_name(&contact, &chat, &quoted);
        let avatar = contact
            .profile_pic_url
            .filter(|u| !u.trim().is_empty())
            .map(AvatarSource::Url);
        let request = QuoteRequest::new(sender_name, quoted.body).with_avatar(avatar);

        let artifact = self.pipeline.run(&request).await?;
        let sent = self.transport.send_sticker(&msg.chat_id, &artifact).await;
        if let Err(e) = artifact.dispose() {
            tracing::warn!(error = %e, "failed to remove sticker files");
        }
        sent
    }

    /// Pull messages until the transport shuts down, handling each command in its own task.
    pub async fn run(self: Arc<Self>) -> QuoteResult<RunSummary> {
        let mut summary = RunSummary::default();
        let mut tasks = tokio::task::JoinSet::new();

        while let Some(msg) = self.transport.next_message().await? {
            if !self.is_command(&msg.body) {
                summary.record(HandleOutcome::Ignored);
                continue;
            }
            let bot = Arc::clone(&self);
            tasks.spawn(async move { bot.handle(&msg).await });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok(outcome)) => summary.record(outcome),
                Ok(Err(e)) => {
                    tracing::error!(error = %e, "message handler failed");
                    summary.errors += 1;
                }
                Err(e) => {
                    tracing::error!(error = %e, "message handler task panicked");
                    summary.errors += 1;
                }
            }
        }

        tracing::info!(?summary, "transport closed");
        Ok(summary)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/bot/handler.rs"]
mod tests;
