use anyhow::Result;
use futures::future::BoxFuture;

use crate::email::RawMessage;

/// Provider-side query selecting unread messages
pub const UNREAD_QUERY: &str = "is:unread";

/// Number of unread ids requested per cycle (no pagination)
pub const MAX_UNREAD_RESULTS: u32 = 10;

/// Remote mailbox operations needed by the poller
pub trait Mailbox: Send + Sync {
    /// Ids of up to `max_results` unread messages, in provider order
    fn list_unread<'a>(&'a self, max_results: u32) -> BoxFuture<'a, Result<Vec<String>>>;

    /// Full message, headers and MIME tree included
    fn get_message<'a>(&'a self, id: &'a str) -> BoxFuture<'a, Result<RawMessage>>;
}
