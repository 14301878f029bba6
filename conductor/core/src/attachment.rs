//! Attachment Intake
//!
//! A question may carry at most one file. Files are validated when they are
//! selected, before they reach the attachment slot; a refused selection never
//! touches the slot.
//!
//! Rules are checked in this order:
//!
//! 1. slot already occupied → [`AttachmentError::AlreadyAttached`]
//! 2. more than one file selected → [`AttachmentError::TooMany`]
//! 3. larger than [`MAX_ATTACHMENT_BYTES`] → [`AttachmentError::TooLarge`]
//! 4. MIME type outside [`ALLOWED_MIME_TYPES`] → [`AttachmentError::UnsupportedType`]

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Largest accepted file (1 MiB)
pub const MAX_ATTACHMENT_BYTES: u64 = 1_048_576;

/// MIME types the answering service accepts
pub const ALLOWED_MIME_TYPES: &[&str] = &[
    "text/plain",
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/webp",
];

/// Why a file selection was refused
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttachmentError {
    /// A file is already pending; remove it first
    #[error("a file is already attached; remove it before choosing another")]
    AlreadyAttached,
    /// More than one file was offered at once
    #[error("only one file can be attached at a time")]
    TooMany,
    /// The file exceeds the size limit
    #[error("file is larger than 1 MB")]
    TooLarge,
    /// The file type is not accepted
    #[error("unsupported file type")]
    UnsupportedType,
}

/// An unvalidated file offered by the user
#[derive(Clone, PartialEq, Eq)]
pub struct FileCandidate {
    /// File name shown to the user
    pub name: String,
    /// Declared size in bytes
    pub size_bytes: u64,
    /// Declared MIME type
    pub mime_type: String,
    /// Raw file content
    pub content: Vec<u8>,
}

impl FileCandidate {
    /// Build a candidate from in-memory content
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            size_bytes: content.len() as u64,
            mime_type: mime_type.into(),
            content,
        }
    }

    /// Load a candidate from disk, inferring the MIME type from the extension
    ///
    /// Files over the size limit are not read; their declared size is enough
    /// for the validator to refuse them.
    pub async fn from_path(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let metadata = tokio::fs::metadata(path).await?;
        if !metadata.is_file() {
            anyhow::bail!("{} is not a regular file", path.display());
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let mime_type = mime_guess::from_path(path)
            .first_or_octet_stream()
            .to_string();

        let content = if metadata.len() > MAX_ATTACHMENT_BYTES {
            Vec::new()
        } else {
            tokio::fs::read(path).await?
        };

        tracing::debug!(name = %name, size = metadata.len(), mime = %mime_type, "Loaded file candidate");

        Ok(Self {
            name,
            size_bytes: metadata.len(),
            mime_type,
            content,
        })
    }
}

impl fmt::Debug for FileCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileCandidate")
            .field("name", &self.name)
            .field("size_bytes", &self.size_bytes)
            .field("mime_type", &self.mime_type)
            .finish_non_exhaustive()
    }
}

/// A validated file, ready to occupy the attachment slot
///
/// Only [`validate`] constructs these.
#[derive(Clone, PartialEq, Eq)]
pub struct AttachmentRef {
    name: String,
    size_bytes: u64,
    mime_type: String,
    content: Vec<u8>,
}

impl AttachmentRef {
    /// File name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Size in bytes
    #[must_use]
    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    /// MIME type
    #[must_use]
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Raw content
    #[must_use]
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// Size in MiB with two decimals
    #[must_use]
    pub fn size_label(&self) -> String {
        size_label(self.size_bytes)
    }
}

impl fmt::Debug for AttachmentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttachmentRef")
            .field("name", &self.name)
            .field("size_bytes", &self.size_bytes)
            .field("mime_type", &self.mime_type)
            .finish_non_exhaustive()
    }
}

/// Format a byte count as MiB with two decimals (`"0.50 MB"`)
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn size_label(size_bytes: u64) -> String {
    format!("{:.2} MB", size_bytes as f64 / 1_048_576.0)
}

/// Check whether a MIME type is accepted
#[must_use]
pub fn is_allowed_mime_type(mime_type: &str) -> bool {
    ALLOWED_MIME_TYPES.contains(&mime_type)
}

/// Validate a file selection against the current slot
///
/// Returns `Ok(None)` for an empty selection (the picker was dismissed).
/// Never mutates anything; the caller decides whether to [`AttachmentSlot::accept`].
pub fn validate(
    pending: &AttachmentSlot,
    selection: &[FileCandidate],
) -> Result<Option<AttachmentRef>, AttachmentError> {
    if pending.is_occupied() {
        return Err(AttachmentError::AlreadyAttached);
    }
    if selection.len() > 1 {
        return Err(AttachmentError::TooMany);
    }
    let Some(file) = selection.first() else {
        return Ok(None);
    };
    if file.size_bytes > MAX_ATTACHMENT_BYTES {
        return Err(AttachmentError::TooLarge);
    }
    if !is_allowed_mime_type(&file.mime_type) {
        return Err(AttachmentError::UnsupportedType);
    }

    Ok(Some(AttachmentRef {
        name: file.name.clone(),
        size_bytes: file.size_bytes,
        mime_type: file.mime_type.clone(),
        content: file.content.clone(),
    }))
}

/// The single pending-file holding area
#[derive(Clone, Debug, Default)]
pub struct AttachmentSlot {
    pending: Option<AttachmentRef>,
}

impl AttachmentSlot {
    /// Create an empty slot
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a file is pending
    #[must_use]
    pub fn is_occupied(&self) -> bool {
        self.pending.is_some()
    }

    /// The pending file, if any
    #[must_use]
    pub fn pending(&self) -> Option<&AttachmentRef> {
        self.pending.as_ref()
    }

    /// Number of pending files (0 or 1)
    #[must_use]
    pub fn len(&self) -> usize {
        usize::from(self.pending.is_some())
    }

    /// Whether the slot is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_none()
    }

    /// Validate a selection and place it in the slot
    ///
    /// On error the slot is left as it was.
    pub fn offer(
        &mut self,
        selection: &[FileCandidate],
    ) -> Result<Option<&AttachmentRef>, AttachmentError> {
        match validate(self, selection)? {
            Some(attachment) => Ok(Some(self.accept(attachment))),
            None => Ok(None),
        }
    }

    /// Place a validated file in the slot, replacing nothing
    ///
    /// [`validate`] already refused occupied slots; a stale `accept` onto an
    /// occupied slot keeps the existing file.
    pub fn accept(&mut self, attachment: AttachmentRef) -> &AttachmentRef {
        self.pending.get_or_insert(attachment)
    }

    /// Move the pending file out (for sending)
    pub fn take(&mut self) -> Option<AttachmentRef> {
        self.pending.take()
    }

    /// Remove the pending file
    pub fn clear(&mut self) {
        self.pending = None;
    }
}
