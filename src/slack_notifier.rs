use anyhow::{Context, Result};
use futures::future::BoxFuture;
use log::{debug, info};
use slack_morphism::prelude::*;

use crate::config::SlackConfig;
use crate::email::NormalizedMessage;
use crate::report::{preview, Reporter};

pub struct SlackNotifier {
    client: SlackClient<SlackClientHyperHttpsConnector>,
    token: SlackApiToken,
    channel_id: SlackChannelId,
}

impl SlackNotifier {
    pub fn new(config: &SlackConfig) -> Result<Self> {
        info!("Initializing Slack notifier");

        let client = SlackClient::new(SlackClientHyperHttpsConnector::new()?);
        let token = SlackApiToken::new(config.bot_token.clone().into());
        let channel_id = SlackChannelId::new(config.channel_id.clone());

        Ok(SlackNotifier {
            client,
            token,
            channel_id,
        })
    }

    pub async fn send_message(&self, text: &str) -> Result<()> {
        let post_chat_req = SlackApiChatPostMessageRequest::new(
            self.channel_id.clone(),
            SlackMessageContent::new().with_text(text.to_string()),
        );

        let session = self.client.open_session(&self.token);

        let response = session
            .chat_post_message(&post_chat_req)
            .await
            .context("Unable to send Slack message")?;

        debug!("Slack message sent: {:?}", response.ts);
        Ok(())
    }

    /// Notify the channel about new emails
    pub async fn notify_new_emails(&self, messages: &[NormalizedMessage]) -> Result<()> {
        if messages.is_empty() {
            return Ok(());
        }

        info!("Sending Slack notification for {} new email(s)", messages.len());
        self.send_message(&format_slack_message(messages)).await
    }
}

impl Reporter for SlackNotifier {
    fn report<'a>(&'a self, messages: &'a [NormalizedMessage]) -> BoxFuture<'a, Result<()>> {
        Box::pin(self.notify_new_emails(messages))
    }

    fn name(&self) -> &str {
        "slack"
    }
}

fn format_slack_message(messages: &[NormalizedMessage]) -> String {
    let mut text = format!("🔔 *{} new email(s)*\n", messages.len());

    for message in messages {
        text.push_str(&format!(
            "\n• *{}*\n  From: {}\n  Date: {}\n  > {}\n",
            message.subject,
            message.from,
            message.date,
            preview(message).replace('\n', " ")
        ));
    }

    text
}
