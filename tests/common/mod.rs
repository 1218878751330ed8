#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use anyhow::Result;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use futures::future::BoxFuture;
use futures::FutureExt;
use serde_json::{json, Value};

use mailwatch::email::{NormalizedMessage, RawMessage};
use mailwatch::mailbox::Mailbox;
use mailwatch::report::Reporter;

pub fn b64(text: &str) -> String {
    URL_SAFE_NO_PAD.encode(text)
}

pub fn plain_part(text: &str) -> Value {
    json!({ "mimeType": "text/plain", "body": { "size": text.len(), "data": b64(text) } })
}

pub fn html_part(html: &str) -> Value {
    json!({ "mimeType": "text/html", "body": { "size": html.len(), "data": b64(html) } })
}

pub fn multipart(mime_type: &str, parts: Vec<Value>) -> Value {
    json!({ "mimeType": mime_type, "body": { "size": 0 }, "parts": parts })
}

/// Message in the shape returned by `users.messages.get?format=full`
pub fn gmail_message(id: &str, subject: Option<&str>, mut payload: Value) -> RawMessage {
    let mut headers = vec![
        json!({ "name": "From", "value": "Alice <alice@example.com>" }),
        json!({ "name": "Date", "value": "Thu, 9 Oct 2025 08:30:00 +0000" }),
    ];
    if let Some(subject) = subject {
        headers.push(json!({ "name": "Subject", "value": subject }));
    }
    payload["headers"] = Value::Array(headers);

    serde_json::from_value(json!({
        "id": id,
        "threadId": id,
        "labelIds": ["UNREAD", "INBOX"],
        "snippet": format!("snippet of {}", id),
        "payload": payload,
    }))
    .expect("valid Gmail message JSON")
}

pub fn simple_message(id: &str) -> RawMessage {
    gmail_message(id, Some(&format!("Subject {}", id)), plain_part(&format!("Body of {}", id)))
}

/// In-memory mailbox with scripted listings
#[derive(Default)]
pub struct FakeMailbox {
    listings: Mutex<VecDeque<Result<Vec<String>, String>>>,
    messages: Mutex<HashMap<String, RawMessage>>,
    failing: Mutex<Vec<String>>,
    list_calls: Mutex<usize>,
    fetched: Mutex<Vec<String>>,
}

impl FakeMailbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the ids returned by the next listing. The last listing repeats.
    pub fn push_listing(&self, ids: &[&str]) {
        self.listings
            .lock()
            .unwrap()
            .push_back(Ok(ids.iter().map(|id| id.to_string()).collect()));
    }

    pub fn push_listing_error(&self, reason: &str) {
        self.listings.lock().unwrap().push_back(Err(reason.to_string()));
    }

    pub fn add_message(&self, message: RawMessage) {
        self.messages
            .lock()
            .unwrap()
            .insert(message.id.clone(), message);
    }

    pub fn fail_fetch(&self, id: &str) {
        self.failing.lock().unwrap().push(id.to_string());
    }

    pub fn heal_fetch(&self, id: &str) {
        self.failing.lock().unwrap().retain(|failing| failing != id);
    }

    pub fn list_calls(&self) -> usize {
        *self.list_calls.lock().unwrap()
    }

    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }

    fn next_listing(&self) -> Result<Vec<String>> {
        *self.list_calls.lock().unwrap() += 1;

        let mut listings = self.listings.lock().unwrap();
        let listing = if listings.len() > 1 {
            listings.pop_front()
        } else {
            listings.front().cloned()
        };

        match listing {
            Some(Ok(ids)) => Ok(ids),
            Some(Err(reason)) => Err(anyhow::anyhow!(reason)),
            None => Ok(Vec::new()),
        }
    }

    fn fetch(&self, id: &str) -> Result<RawMessage> {
        self.fetched.lock().unwrap().push(id.to_string());

        if self.failing.lock().unwrap().iter().any(|failing| failing == id) {
            anyhow::bail!("HTTP 500 while fetching {}", id);
        }

        self.messages
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("message {} not found", id))
    }
}

impl Mailbox for FakeMailbox {
    fn list_unread<'a>(&'a self, _max_results: u32) -> BoxFuture<'a, Result<Vec<String>>> {
        let listing = self.next_listing();
        async move { listing }.boxed()
    }

    fn get_message<'a>(&'a self, id: &'a str) -> BoxFuture<'a, Result<RawMessage>> {
        let message = self.fetch(id);
        async move { message }.boxed()
    }
}

/// Mailbox whose listing never completes, like a hung connection
pub struct StalledMailbox;

impl Mailbox for StalledMailbox {
    fn list_unread<'a>(&'a self, _max_results: u32) -> BoxFuture<'a, Result<Vec<String>>> {
        futures::future::pending().boxed()
    }

    fn get_message<'a>(&'a self, _id: &'a str) -> BoxFuture<'a, Result<RawMessage>> {
        futures::future::pending().boxed()
    }
}

/// Reporter that keeps every batch it receives
#[derive(Clone, Default)]
pub struct RecordingReporter {
    pub batches: Arc<Mutex<Vec<Vec<NormalizedMessage>>>>,
    pub fail: bool,
}

impl RecordingReporter {
    pub fn reported_ids(&self) -> Vec<String> {
        self.batches
            .lock()
            .unwrap()
            .iter()
            .flatten()
            .map(|m| m.id.clone())
            .collect()
    }
}

impl Reporter for RecordingReporter {
    fn report<'a>(&'a self, messages: &'a [NormalizedMessage]) -> BoxFuture<'a, Result<()>> {
        self.batches.lock().unwrap().push(messages.to_vec());
        let fail = self.fail;
        async move {
            if fail {
                anyhow::bail!("sink unavailable");
            }
            Ok(())
        }
        .boxed()
    }

    fn name(&self) -> &str {
        "recording"
    }
}
