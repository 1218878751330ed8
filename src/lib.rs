// Library exports for mailwatch crate
// This allows tests and the binary to use the modules

pub mod config;
pub mod email;
pub mod gmail_client;
pub mod mailbox;
pub mod poller;
pub mod report;
pub mod seen_set;
pub mod slack_notifier;
