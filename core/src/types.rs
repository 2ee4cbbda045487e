//! Domain types for the Crocodoc API.
//!
//! # Design
//! Each endpoint decodes into its own record. The wire uses camelCase keys
//! (`shortId`, `sessionId`); serde renames map them onto snake_case fields.
//! Identifiers stay opaque strings because the client never interprets them.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Document content sent with a multipart upload.
#[derive(Clone, PartialEq, Eq)]
pub struct FileUpload {
    pub filename: String,
    pub content: Vec<u8>,
}

impl FileUpload {
    pub fn new(filename: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            content,
        }
    }
}

// Content is elided so logging a request never dumps a whole document.
impl fmt::Debug for FileUpload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileUpload")
            .field("filename", &self.filename)
            .field("len", &self.content.len())
            .finish()
    }
}

/// What to convert: a document the service fetches itself, or local content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadSource {
    Url(String),
    File(FileUpload),
}

impl UploadSource {
    pub fn url(url: impl Into<String>) -> Self {
        UploadSource::Url(url.into())
    }

    /// Read a local file into memory for upload.
    pub fn from_path(path: &Path) -> Result<Self, ApiError> {
        let content = std::fs::read(path)?;
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string());
        Ok(UploadSource::File(FileUpload::new(filename, content)))
    }
}

/// Result of `document/upload`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedDocument {
    #[serde(rename = "shortId")]
    pub short_id: String,
    pub uuid: String,
}

/// Conversion state reported by `document/status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConversionStatus {
    Queued,
    Processing,
    Done,
    Available,
    Error,
    #[serde(other)]
    Unknown,
}

impl ConversionStatus {
    /// Conversion has stopped, successfully or not.
    pub fn is_finished(&self) -> bool {
        matches!(
            self,
            ConversionStatus::Done | ConversionStatus::Available | ConversionStatus::Error
        )
    }
}

/// One entry of the `document/status` array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentStatus {
    pub uuid: String,
    pub status: ConversionStatus,
    #[serde(default)]
    pub viewable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Result of `document/share`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedDocument {
    #[serde(rename = "shortId")]
    pub short_id: String,
}

/// Result of `session/get`. A session id may be used once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(rename = "sessionId")]
    pub session_id: String,
}

/// Error body the service sends alongside a success status.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorPayload {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uploaded_document_reads_camel_case_keys() {
        let doc: UploadedDocument =
            serde_json::from_str(r#"{"shortId":"Ni2Af","uuid":"34b17ba7-5035-46d5-f69a-457abbe69cd7"}"#)
                .unwrap();
        assert_eq!(doc.short_id, "Ni2Af");
        assert_eq!(doc.uuid, "34b17ba7-5035-46d5-f69a-457abbe69cd7");
    }

    #[test]
    fn unknown_status_value_is_tolerated() {
        let status: DocumentStatus =
            serde_json::from_str(r#"{"uuid":"u","status":"REVIEWING","viewable":false}"#).unwrap();
        assert_eq!(status.status, ConversionStatus::Unknown);
        assert!(!status.status.is_finished());
    }

    #[test]
    fn status_error_field_is_optional() {
        let status: DocumentStatus =
            serde_json::from_str(r#"{"uuid":"u","status":"ERROR","error":"bad file"}"#).unwrap();
        assert_eq!(status.status, ConversionStatus::Error);
        assert!(!status.viewable);
        assert_eq!(status.error.as_deref(), Some("bad file"));
    }

    #[test]
    fn file_upload_debug_hides_content() {
        let upload = FileUpload::new("a.pdf", vec![0; 4096]);
        let rendered = format!("{upload:?}");
        assert!(rendered.contains("len: 4096"));
        assert!(!rendered.contains("[0, 0"));
    }

    #[test]
    fn from_path_reads_file_name_and_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.pdf");
        std::fs::write(&path, b"%PDF-1.4").unwrap();
        match UploadSource::from_path(&path).unwrap() {
            UploadSource::File(upload) => {
                assert_eq!(upload.filename, "report.pdf");
                assert_eq!(upload.content, b"%PDF-1.4");
            }
            other => panic!("expected file source, got {other:?}"),
        }
    }

    #[test]
    fn from_path_missing_file_is_io_error() {
        let err = UploadSource::from_path(Path::new("/no/such/file.pdf")).unwrap_err();
        assert!(matches!(err, ApiError::Io(_)));
    }
}
