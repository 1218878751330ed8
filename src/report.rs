use anyhow::Result;
use chrono::{DateTime, Local};
use futures::future::BoxFuture;

use crate::email::extractor::truncate_chars;
use crate::email::NormalizedMessage;

/// Number of body characters shown in the operator preview
pub const PREVIEW_MAX_CHARS: usize = 200;

/// Operator-facing sink for newly detected messages
pub trait Reporter: Send + Sync {
    fn report<'a>(&'a self, messages: &'a [NormalizedMessage]) -> BoxFuture<'a, Result<()>>;

    /// Name used in logs
    fn name(&self) -> &str;
}

pub fn preview(message: &NormalizedMessage) -> String {
    truncate_chars(&message.body, PREVIEW_MAX_CHARS)
}

/// Text block printed for one batch of new messages
pub fn format_report(messages: &[NormalizedMessage], at: DateTime<Local>) -> String {
    let mut out = format!(
        "\n🔔 {} new email(s) detected at {}!\n{}\n",
        messages.len(),
        at.format("%H:%M:%S"),
        "=".repeat(70)
    );

    for message in messages {
        out.push_str(&format!("\nSubject: {}\n", message.subject));
        out.push_str(&format!("From: {}\n", message.from));
        out.push_str(&format!("Date: {}\n", message.date));
        out.push_str(&format!("Preview: {}...\n", preview(message)));
        out.push_str(&"-".repeat(70));
        out.push('\n');
    }

    out
}

/// Prints new messages on stdout
#[derive(Debug, Default)]
pub struct ConsoleReporter;

impl ConsoleReporter {
    pub fn new() -> Self {
        ConsoleReporter
    }
}

impl Reporter for ConsoleReporter {
    fn report<'a>(&'a self, messages: &'a [NormalizedMessage]) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            if !messages.is_empty() {
                print!("{}", format_report(messages, Local::now()));
            }
            Ok(())
        })
    }

    fn name(&self) -> &str {
        "console"
    }
}
