pub mod common;
pub mod extractor;

// Re-export commonly used items
pub use common::{Header, MessagePart, NormalizedMessage, PartContent, RawMessage};
pub use extractor::{extract_body, normalize, ExtractError};
