//! Coerces comment content supplied as text, bytes, or a byte stream into a
//! single string before reconciliation starts.

use std::fmt;
use std::str::FromStr;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};

#[derive(Debug, Error)]
/// Enumerates supported `ContentError` values.
pub enum ContentError {
    #[error("unsupported content encoding '{0}'; expected utf8, utf16le, latin1, ascii, base64, or hex")]
    UnsupportedEncoding(String),
    #[error("failed to read comment content stream: {0}")]
    Read(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
/// Character encoding applied to binary and streamed content.
pub enum ContentEncoding {
    #[default]
    Utf8,
    Utf16Le,
    Latin1,
    Ascii,
    Base64,
    Hex,
}

impl ContentEncoding {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Utf8 => "utf8",
            Self::Utf16Le => "utf16le",
            Self::Latin1 => "latin1",
            Self::Ascii => "ascii",
            Self::Base64 => "base64",
            Self::Hex => "hex",
        }
    }

    /// Decodes `bytes` into text. Invalid sequences become U+FFFD.
    pub fn decode(self, bytes: &[u8]) -> String {
        match self {
            Self::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
            Self::Utf16Le => {
                let units = bytes
                    .chunks_exact(2)
                    .map(|pair| u16::from_le_bytes([pair[0], pair[1]]));
                char::decode_utf16(units)
                    .map(|unit| unit.unwrap_or(char::REPLACEMENT_CHARACTER))
                    .collect()
            }
            Self::Latin1 => bytes.iter().map(|byte| char::from(*byte)).collect(),
            Self::Ascii => bytes.iter().map(|byte| char::from(byte & 0x7f)).collect(),
            // Binary-to-text encodings render the bytes rather than decode them.
            Self::Base64 => BASE64.encode(bytes),
            Self::Hex => hex::encode(bytes),
        }
    }
}

impl fmt::Display for ContentEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentEncoding {
    type Err = ContentError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized = raw.trim().to_ascii_lowercase().replace('-', "");
        match normalized.as_str() {
            "utf8" => Ok(Self::Utf8),
            "utf16le" | "ucs2" => Ok(Self::Utf16Le),
            "latin1" | "binary" => Ok(Self::Latin1),
            "ascii" => Ok(Self::Ascii),
            "base64" => Ok(Self::Base64),
            "hex" => Ok(Self::Hex),
            _ => Err(ContentError::UnsupportedEncoding(raw.to_string())),
        }
    }
}

/// Comment content as handed to the runtime by its caller.
pub enum CommentContent {
    Text(String),
    Binary(Vec<u8>),
    Stream(Box<dyn AsyncRead + Send + Unpin>),
}

impl fmt::Debug for CommentContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Self::Binary(bytes) => f.debug_tuple("Binary").field(&bytes.len()).finish(),
            Self::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

impl From<String> for CommentContent {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for CommentContent {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<Vec<u8>> for CommentContent {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Binary(bytes)
    }
}

/// Produces the final comment text, draining streams to completion first.
pub async fn materialize_content(
    content: CommentContent,
    encoding: ContentEncoding,
) -> Result<String, ContentError> {
    match content {
        CommentContent::Text(text) => Ok(text),
        CommentContent::Binary(bytes) => Ok(encoding.decode(&bytes)),
        CommentContent::Stream(mut reader) => {
            let mut bytes = Vec::new();
            reader.read_to_end(&mut bytes).await?;
            Ok(encoding.decode(&bytes))
        }
    }
}
