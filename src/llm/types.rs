//! Common types for chat interactions

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Role of a turn in the session history
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Model,
}

/// One part of a multi-part message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

impl Part {
    pub fn text(s: impl Into<String>) -> Self {
        Part::Text { text: s.into() }
    }

    pub fn inline_data(inline_data: InlineData) -> Self {
        Part::InlineData { inline_data }
    }
}

/// Base64 encoded binary content with its MIME type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PayloadError {
    #[error("Invalid image format")]
    InvalidImageFormat,
}

impl InlineData {
    /// Split a `data:<mime>;base64,<body>` URI into MIME type and body.
    ///
    /// Only the segment between the first and second comma is taken as the
    /// body. The MIME type is whatever sits between the first `:` and the
    /// following `;` of the header.
    pub fn from_data_uri(uri: &str) -> Result<Self, PayloadError> {
        let mut segments = uri.split(',');
        let header = segments.next().unwrap_or_default();
        let data = segments
            .next()
            .filter(|body| !body.is_empty())
            .ok_or(PayloadError::InvalidImageFormat)?;

        let mime_type = header
            .split_once(':')
            .and_then(|(_, rest)| rest.split_once(';'))
            .map(|(mime, _)| mime)
            .filter(|mime| !mime.is_empty())
            .ok_or(PayloadError::InvalidImageFormat)?;

        Ok(Self {
            mime_type: mime_type.to_string(),
            data: data.to_string(),
        })
    }
}

/// What a single `send` carries to the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatPayload {
    Text(String),
    Parts(Vec<Part>),
}

impl ChatPayload {
    /// Build the payload for a draft.
    ///
    /// With an image the payload is a parts list: a text part only when the
    /// text is not blank, then always the image part.
    pub fn from_draft(text: &str, image: Option<&str>) -> Result<Self, PayloadError> {
        let Some(image) = image else {
            return Ok(ChatPayload::Text(text.to_string()));
        };

        let inline_data = InlineData::from_data_uri(image)?;
        let mut parts = Vec::with_capacity(2);
        if !text.trim().is_empty() {
            parts.push(Part::text(text));
        }
        parts.push(Part::inline_data(inline_data));
        Ok(ChatPayload::Parts(parts))
    }

    pub fn into_parts(self) -> Vec<Part> {
        match self {
            ChatPayload::Text(text) => vec![Part::Text { text }],
            ChatPayload::Parts(parts) => parts,
        }
    }
}

/// A turn recorded in session history
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub role: Role,
    pub parts: Vec<Part>,
}

impl Turn {
    pub fn user(parts: Vec<Part>) -> Self {
        Self {
            role: Role::User,
            parts,
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            parts: vec![Part::text(text)],
        }
    }
}

/// Stateless generation request: the whole history plus the new turn
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub system_instruction: Option<String>,
    pub contents: Vec<Turn>,
}

/// Generation reply
#[derive(Debug, Clone, Default)]
pub struct GenerateReply {
    pub text: String,
    pub usage: Usage,
}

/// Usage statistics
#[derive(Debug, Clone, Default)]
pub struct Usage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}
