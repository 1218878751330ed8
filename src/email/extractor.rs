use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine as _;
use log::{debug, warn};
use thiserror::Error;

use super::common::{MessagePart, NormalizedMessage, PartContent, RawMessage};

/// Maximum number of characters kept from the extracted body
pub const BODY_MAX_CHARS: usize = 500;

const PLAIN_TEXT: &str = "text/plain";

// Gmail emits URL-safe base64, with or without padding depending on the endpoint
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("message {id} has no payload")]
    MissingPayload { id: String },
}

/// Decode URL-safe base64 content into text.
///
/// Invalid UTF-8 sequences are replaced; undecodable base64 yields an empty string.
pub fn decode_text(data: &str) -> String {
    if data.is_empty() {
        return String::new();
    }

    match URL_SAFE_LENIENT.decode(data) {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(e) => {
            warn!("⚠️  Unable to decode part content: {}", e);
            String::new()
        }
    }
}

/// Extract the plaintext body of a message payload.
///
/// Depth-first search in document order: the first `text/plain` child with
/// inline data wins, nested multiparts are searched as they are met, and a
/// leaf payload falls back to its own content. Returns an empty string when
/// nothing matches.
pub fn extract_body(payload: &MessagePart) -> String {
    match &payload.content {
        PartContent::Multipart(parts) => {
            for part in parts {
                match &part.content {
                    PartContent::Leaf { data } if part.mime_type == PLAIN_TEXT => {
                        if let Some(data) = data {
                            return decode_text(data);
                        }
                    }
                    PartContent::Multipart(_) => {
                        let body = extract_body(part);
                        if !body.is_empty() {
                            return body;
                        }
                    }
                    PartContent::Leaf { .. } => {}
                }
            }
            String::new()
        }
        PartContent::Leaf { data: Some(data) } => decode_text(data),
        PartContent::Leaf { data: None } => String::new(),
    }
}

/// First `max_chars` characters of `text`
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => text[..end].to_string(),
        None => text.to_string(),
    }
}

/// Build the flat record reported for a fetched message
pub fn normalize(raw: &RawMessage) -> Result<NormalizedMessage, ExtractError> {
    let payload = raw
        .payload
        .as_ref()
        .ok_or_else(|| ExtractError::MissingPayload { id: raw.id.clone() })?;

    let subject = payload.header("Subject").unwrap_or("No Subject").to_string();
    let from = payload.header("From").unwrap_or("Unknown").to_string();
    let date = payload.header("Date").unwrap_or("Unknown").to_string();

    let body = extract_body(payload);
    debug!("Extracted body of {} ({} chars)", raw.id, body.chars().count());

    Ok(NormalizedMessage {
        id: raw.id.clone(),
        subject,
        from,
        date,
        body: truncate_chars(&body, BODY_MAX_CHARS),
        snippet: raw.snippet.clone().unwrap_or_default(),
    })
}
