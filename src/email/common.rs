/// Common structures shared by the extractor, the poller and the reporters
use serde::Deserialize;

/// A single `name: value` header as returned by Gmail
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Header {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub value: String,
}

/// Content of a message part: either inline data or nested parts
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartContent {
    /// Leaf part. `data` is URL-safe base64, absent for empty bodies and attachments.
    Leaf { data: Option<String> },
    /// Branch part (multipart/*), children in document order.
    Multipart(Vec<MessagePart>),
}

/// One node of the MIME tree of a message
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "WirePart")]
pub struct MessagePart {
    pub mime_type: String,
    pub headers: Vec<Header>,
    pub content: PartContent,
}

impl MessagePart {
    pub fn leaf(mime_type: impl Into<String>, data: Option<String>) -> Self {
        MessagePart {
            mime_type: mime_type.into(),
            headers: Vec::new(),
            content: PartContent::Leaf { data },
        }
    }

    pub fn multipart(mime_type: impl Into<String>, parts: Vec<MessagePart>) -> Self {
        MessagePart {
            mime_type: mime_type.into(),
            headers: Vec::new(),
            content: PartContent::Multipart(parts),
        }
    }

    pub fn with_headers(mut self, headers: Vec<Header>) -> Self {
        self.headers = headers;
        self
    }

    /// Value of the first header named exactly `name`
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|h| h.name == name)
            .map(|h| h.value.as_str())
    }
}

// Shape of a part in the Gmail REST JSON (`users.messages.get?format=full`)
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WirePart {
    #[serde(default)]
    mime_type: String,
    #[serde(default)]
    headers: Vec<Header>,
    #[serde(default)]
    body: Option<WireBody>,
    #[serde(default)]
    parts: Option<Vec<WirePart>>,
}

#[derive(Deserialize)]
struct WireBody {
    #[serde(default)]
    data: Option<String>,
}

impl From<WirePart> for MessagePart {
    fn from(wire: WirePart) -> Self {
        let content = match wire.parts {
            Some(children) => {
                PartContent::Multipart(children.into_iter().map(MessagePart::from).collect())
            }
            None => PartContent::Leaf {
                data: wire.body.and_then(|b| b.data),
            },
        };

        MessagePart {
            mime_type: wire.mime_type,
            headers: wire.headers,
            content,
        }
    }
}

/// A message as fetched from the provider, before normalization
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawMessage {
    pub id: String,
    #[serde(default)]
    pub snippet: Option<String>,
    #[serde(default)]
    pub payload: Option<MessagePart>,
}

/// Flat view of a newly detected message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedMessage {
    pub id: String,
    pub subject: String,
    pub from: String,
    pub date: String,
    /// Plaintext body, at most 500 characters
    pub body: String,
    pub snippet: String,
}
