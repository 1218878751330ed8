use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info, warn};
use tokio_util::sync::CancellationToken;

use mailwatch::config::Config;
use mailwatch::gmail_client::GmailClient;
use mailwatch::poller::Poller;
use mailwatch::report::ConsoleReporter;
use mailwatch::seen_set::SeenSet;
use mailwatch::slack_notifier::SlackNotifier;

#[derive(Parser)]
#[command(name = "mailwatch")]
#[command(about = "Watch a Gmail inbox and report new unread emails")]
#[command(version = "0.1.0")]
struct Args {
    /// Seconds between two checks (overrides POLL_INTERVAL_SECS)
    #[arg(short, long)]
    interval: Option<u64>,

    /// Check once, report new emails and exit
    #[arg(long)]
    once: bool,

    /// Check the configuration without connecting
    #[arg(long)]
    check_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present
    dotenv::dotenv().ok();

    let args = Args::parse();

    env_logger::init();

    let mut config = Config::new()?;

    if let Some(interval) = args.interval {
        if interval == 0 {
            anyhow::bail!("--interval must be at least 1 second");
        }
        config.poll.interval_secs = interval;
    }

    if args.check_config {
        println!("✅ Configuration valid!");
        println!("📧 Gmail API OAuth2");
        println!("🔑 Credentials: {}", config.gmail.credentials_path);
        println!("💾 Token cache: {}", config.gmail.token_cache_path);
        println!("⏱️  Interval: {}s", config.poll.interval_secs);
        match config.poll.seen_capacity {
            Some(capacity) => println!("🧠 Seen set capacity: {}", capacity),
            None => println!("🧠 Seen set capacity: unbounded"),
        }
        println!(
            "💬 Slack: {}",
            if config.slack.is_some() { "enabled" } else { "disabled" }
        );
        return Ok(());
    }

    let gmail = GmailClient::connect(&config.gmail)
        .await
        .context("✗ Connection failed")?;
    println!("✓ Connected to Gmail successfully");

    let mut poller = Poller::new(gmail, SeenSet::with_capacity_limit(config.poll.seen_capacity))
        .with_reporter(Box::new(ConsoleReporter::new()));

    if let Some(slack_config) = &config.slack {
        match SlackNotifier::new(slack_config) {
            Ok(notifier) => {
                info!("✅ Slack notifications enabled");
                poller = poller.with_reporter(Box::new(notifier));
            }
            Err(e) => {
                warn!("⚠️  Unable to initialize Slack notifier: {} - notifications disabled", e);
            }
        }
    }

    if args.once {
        let result = poller.tick().await;
        poller.into_mailbox().disconnect();
        let count = result?;
        info!("✅ Check completed, {} new email(s)", count);
        return Ok(());
    }

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => signal_token.cancel(),
            Err(e) => {
                error!("❌ Unable to listen for Ctrl+C: {}", e);
                return;
            }
        }

        // A second Ctrl+C leaves without waiting for a stalled request
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Forced exit");
            std::process::exit(130);
        }
    });

    let interval = config.poll.interval_secs;
    println!("\n📧 Starting email monitoring (checking every {}s)", interval);
    println!("Press Ctrl+C to stop\n");

    poller.run(Duration::from_secs(interval), shutdown).await;

    println!("\n\n✓ Monitoring stopped");
    poller.into_mailbox().disconnect();
    println!("✓ Gmail session closed");
    println!("✓ Program terminated");

    Ok(())
}
