//! Uploaded and typed ticket input.

use serde::Serialize;
use thiserror::Error;

use super::split::split;

/// Errors that can occur while accepting an upload.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UploadError {
    #[error("Unsupported file type: {0} (only .txt files are accepted)")]
    UnsupportedType(String),

    #[error("File {filename} is not valid UTF-8: {reason}")]
    InvalidEncoding { filename: String, reason: String },
}

/// Whether a file name looks like a plain-text ticket export.
pub fn is_supported_upload(filename: &str) -> bool {
    filename.to_lowercase().ends_with(".txt")
}

/// A text blob submitted for batch processing, immutable once read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawUpload {
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    filename: Option<String>,
}

impl RawUpload {
    /// Wrap text that did not come from a file.
    pub fn from_text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            filename: None,
        }
    }

    /// Accept the bytes of an uploaded file.
    pub fn from_file(filename: impl Into<String>, bytes: Vec<u8>) -> Result<Self, UploadError> {
        let filename = filename.into();
        if !is_supported_upload(&filename) {
            return Err(UploadError::UnsupportedType(filename));
        }

        let content = String::from_utf8(bytes).map_err(|e| UploadError::InvalidEncoding {
            filename: filename.clone(),
            reason: e.utf8_error().to_string(),
        })?;

        Ok(Self {
            content,
            filename: Some(filename),
        })
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    pub fn size_bytes(&self) -> usize {
        self.content.len()
    }

    /// Human readable size, e.g. `"1.50 KB"`.
    pub fn size_label(&self) -> String {
        format!("{:.2} KB", self.size_bytes() as f64 / 1024.0)
    }

    /// Ticket candidates contained in this upload.
    pub fn candidates(&self) -> Vec<String> {
        split(&self.content)
    }
}

/// How the user supplied ticket text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InputMethod {
    Type,
    Upload,
}

/// Ticket text as it arrives from the dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TicketInput {
    Typed(String),
    Uploaded(RawUpload),
}

impl TicketInput {
    pub fn method(&self) -> InputMethod {
        match self {
            TicketInput::Typed(_) => InputMethod::Type,
            TicketInput::Uploaded(_) => InputMethod::Upload,
        }
    }

    /// Typed text must contain something besides whitespace, an upload only
    /// has to exist.
    pub fn has_content(&self) -> bool {
        match self {
            TicketInput::Typed(text) => !text.trim().is_empty(),
            TicketInput::Uploaded(_) => true,
        }
    }

    pub fn into_upload(self) -> RawUpload {
        match self {
            TicketInput::Typed(text) => RawUpload::from_text(text),
            TicketInput::Uploaded(upload) => upload,
        }
    }
}
