use anyhow::{Context, Result};
use base64::engine::general_purpose::URL_SAFE;
use base64::Engine as _;
use futures::future::BoxFuture;
use futures::FutureExt;
use google_gmail1::api::Scope;
use google_gmail1::{api, hyper, hyper_rustls, oauth2, Gmail};
use log::{debug, info};

use crate::config::GmailConfig;
use crate::email::{Header, MessagePart, PartContent, RawMessage};
use crate::mailbox::{Mailbox, UNREAD_QUERY};

const USER_ID: &str = "me";

/// Authenticated handle on the Gmail API
pub struct GmailClient {
    hub: Gmail<hyper_rustls::HttpsConnector<hyper::client::HttpConnector>>,
}

impl GmailClient {
    /// Authorize and build the API hub.
    ///
    /// Tokens are loaded from and saved to `token_cache_path`; the browser
    /// consent flow only runs when no usable token is cached. A token is
    /// requested right away so that authorization problems show up here
    /// rather than on the first poll.
    pub async fn connect(config: &GmailConfig) -> Result<Self> {
        info!("Connecting to Gmail API via OAuth2");

        let secret = oauth2::read_application_secret(&config.credentials_path)
            .await
            .with_context(|| {
                format!(
                    "Unable to read OAuth2 client credentials file {}",
                    config.credentials_path
                )
            })?;

        let auth = oauth2::InstalledFlowAuthenticator::builder(
            secret,
            oauth2::InstalledFlowReturnMethod::HTTPRedirect,
        )
        .persist_tokens_to_disk(&config.token_cache_path)
        .build()
        .await
        .context("Unable to create OAuth2 authenticator")?;

        auth.token(&[Scope::Readonly.as_ref()])
            .await
            .context("OAuth2 authorization failed")?;

        let connector = hyper_rustls::HttpsConnectorBuilder::new()
            .with_native_roots()?
            .https_or_http()
            .enable_http1()
            .build();

        let client = hyper::Client::builder().build(connector);
        let hub = Gmail::new(client, auth);

        info!("✅ Gmail API connection established successfully");

        Ok(GmailClient { hub })
    }

    pub async fn search_unread(&self, max_results: u32) -> Result<Vec<String>> {
        debug!("Search criteria: {} (max {})", UNREAD_QUERY, max_results);

        let result = self
            .hub
            .users()
            .messages_list(USER_ID)
            .q(UNREAD_QUERY)
            .max_results(max_results)
            .add_scope(Scope::Readonly)
            .doit()
            .await
            .context("Error searching for unread emails")?;

        let message_ids: Vec<String> = result
            .1
            .messages
            .unwrap_or_default()
            .into_iter()
            .filter_map(|msg| msg.id)
            .collect();

        debug!("Found {} unread email(s)", message_ids.len());

        Ok(message_ids)
    }

    pub async fn fetch_email_full(&self, message_id: &str) -> Result<RawMessage> {
        debug!("Full email retrieval for ID: {}", message_id);

        let (_, message) = self
            .hub
            .users()
            .messages_get(USER_ID, message_id)
            .format("full")
            .add_scope(Scope::Readonly)
            .doit()
            .await
            .with_context(|| format!("Unable to retrieve email {}", message_id))?;

        Ok(RawMessage {
            id: message.id.unwrap_or_else(|| message_id.to_string()),
            snippet: message.snippet,
            payload: message.payload.map(convert_part),
        })
    }

    pub fn disconnect(self) {
        info!("Gmail session closed");
    }
}

impl Mailbox for GmailClient {
    fn list_unread<'a>(&'a self, max_results: u32) -> BoxFuture<'a, Result<Vec<String>>> {
        self.search_unread(max_results).boxed()
    }

    fn get_message<'a>(&'a self, id: &'a str) -> BoxFuture<'a, Result<RawMessage>> {
        self.fetch_email_full(id).boxed()
    }
}

// google-gmail1 hands back part bodies already decoded; re-encode them so the
// extractor sees the same base64url text the REST API sends.
fn convert_part(part: api::MessagePart) -> MessagePart {
    let content = match part.parts {
        Some(children) => PartContent::Multipart(children.into_iter().map(convert_part).collect()),
        None => PartContent::Leaf {
            data: part
                .body
                .and_then(|body| body.data)
                .map(|bytes| URL_SAFE.encode(bytes)),
        },
    };

    let headers = part
        .headers
        .unwrap_or_default()
        .into_iter()
        .filter_map(|h| {
            Some(Header {
                name: h.name?,
                value: h.value.unwrap_or_default(),
            })
        })
        .collect();

    MessagePart {
        mime_type: part.mime_type.unwrap_or_default(),
        headers,
        content,
    }
}
