use std::fmt;
use std::time::Duration;

use anyhow::{Context, Result};
use log::{debug, error, info, warn};
use tokio_util::sync::CancellationToken;

use crate::email::{normalize, NormalizedMessage};
use crate::mailbox::{Mailbox, MAX_UNREAD_RESULTS};
use crate::report::Reporter;
use crate::seen_set::SeenSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    Idle,
    Listing,
    Fetching { index: usize, total: usize },
    Sleeping,
    Stopped,
}

impl fmt::Display for PollState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PollState::Idle => write!(f, "idle"),
            PollState::Listing => write!(f, "listing"),
            PollState::Fetching { index, total } => write!(f, "fetching {}/{}", index + 1, total),
            PollState::Sleeping => write!(f, "sleeping"),
            PollState::Stopped => write!(f, "stopped"),
        }
    }
}

/// Counters accumulated by [`Poller::run`]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PollSummary {
    pub cycles: usize,
    pub failed_cycles: usize,
    pub messages_reported: usize,
}

/// Detects new unread messages and hands them to the reporters
pub struct Poller<M: Mailbox> {
    mailbox: M,
    seen: SeenSet,
    reporters: Vec<Box<dyn Reporter>>,
    state: PollState,
}

impl<M: Mailbox> Poller<M> {
    pub fn new(mailbox: M, seen: SeenSet) -> Self {
        Poller {
            mailbox,
            seen,
            reporters: Vec::new(),
            state: PollState::Idle,
        }
    }

    pub fn with_reporter(mut self, reporter: Box<dyn Reporter>) -> Self {
        self.reporters.push(reporter);
        self
    }

    pub fn state(&self) -> PollState {
        self.state
    }

    pub fn seen(&self) -> &SeenSet {
        &self.seen
    }

    pub fn mailbox(&self) -> &M {
        &self.mailbox
    }

    pub fn into_mailbox(self) -> M {
        self.mailbox
    }

    fn set_state(&mut self, state: PollState) {
        debug!("Poller state: {} -> {}", self.state, state);
        self.state = state;
    }

    /// List unread messages and return the ones not reported yet.
    ///
    /// A message that fails to fetch or normalize is skipped and stays
    /// eligible for the next cycle. A listing failure aborts the cycle.
    pub async fn run_cycle(&mut self) -> Result<Vec<NormalizedMessage>> {
        self.set_state(PollState::Listing);

        let message_ids = self
            .mailbox
            .list_unread(MAX_UNREAD_RESULTS)
            .await
            .context("Error checking for unread emails")?;

        let new_ids: Vec<String> = message_ids
            .into_iter()
            .filter(|id| !self.seen.contains(id))
            .collect();

        debug!("{} unseen email(s) to fetch", new_ids.len());

        let mut new_emails = Vec::with_capacity(new_ids.len());
        let total = new_ids.len();

        for (index, message_id) in new_ids.iter().enumerate() {
            self.set_state(PollState::Fetching { index, total });

            // The provider may list the same id twice in one page
            if self.seen.contains(message_id) {
                continue;
            }

            let result = match self.mailbox.get_message(message_id).await {
                Ok(raw) => normalize(&raw).map_err(anyhow::Error::from),
                Err(e) => Err(e),
            };

            match result {
                Ok(email) => {
                    self.seen.insert(message_id);
                    new_emails.push(email);
                }
                Err(e) => {
                    error!("Error reading email {}: {:#}", message_id, e);
                }
            }
        }

        Ok(new_emails)
    }

    /// Run one cycle and send its results to every reporter.
    ///
    /// Returns the number of new messages.
    pub async fn tick(&mut self) -> Result<usize> {
        let new_emails = self.run_cycle().await?;

        if new_emails.is_empty() {
            debug!("No new emails");
        } else {
            info!("🔔 {} new email(s) detected", new_emails.len());
            self.publish(&new_emails).await;
        }

        Ok(new_emails.len())
    }

    async fn publish(&self, emails: &[NormalizedMessage]) {
        for reporter in &self.reporters {
            if let Err(e) = reporter.report(emails).await {
                warn!("⚠️  Reporter '{}' failed: {:#}", reporter.name(), e);
            }
        }
    }

    /// Poll until `shutdown` is cancelled.
    ///
    /// The interval is slept after each cycle ends, so a slow cycle delays
    /// the next one. Failed cycles are retried after the same interval.
    /// Cancellation is observed before a cycle starts and while sleeping;
    /// a request already in flight runs to completion.
    pub async fn run(&mut self, interval: Duration, shutdown: CancellationToken) -> PollSummary {
        let mut summary = PollSummary::default();

        info!("🔄 Polling for unread emails every {}s", interval.as_secs());

        loop {
            if shutdown.is_cancelled() {
                break;
            }

            summary.cycles += 1;
            match self.tick().await {
                Ok(count) => summary.messages_reported += count,
                Err(e) => {
                    summary.failed_cycles += 1;
                    error!("❌ Error during monitoring: {:#}", e);
                }
            }

            self.set_state(PollState::Sleeping);
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = tokio::time::sleep(interval) => {}
            }
        }

        self.set_state(PollState::Stopped);
        info!(
            "Polling stopped after {} cycle(s) ({} failed), {} email(s) reported",
            summary.cycles, summary.failed_cycles, summary.messages_reported
        );

        summary
    }
}
