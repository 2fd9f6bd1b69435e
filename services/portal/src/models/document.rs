//! Document models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of document as tagged by the school office
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DocumentType {
    Transcript,
    Certificate,
    Diploma,
    /// Any other tag, kept verbatim
    Other(String),
}

impl DocumentType {
    /// Get the document type as sent over the wire
    pub fn as_str(&self) -> &str {
        match self {
            DocumentType::Transcript => "TRANSCRIPT",
            DocumentType::Certificate => "CERTIFICATE",
            DocumentType::Diploma => "DIPLOMA",
            DocumentType::Other(tag) => tag,
        }
    }

    /// Dashboard section this type is listed under
    pub fn category(&self) -> DocumentCategory {
        match self {
            DocumentType::Transcript => DocumentCategory::Transcripts,
            DocumentType::Certificate | DocumentType::Diploma => DocumentCategory::Certificates,
            DocumentType::Other(_) => DocumentCategory::Other,
        }
    }

    /// Label for the download action
    pub fn download_label(&self) -> &'static str {
        match self {
            DocumentType::Transcript => "Download Transcript",
            DocumentType::Certificate => "Download Certificate",
            DocumentType::Diploma => "Download Diploma",
            DocumentType::Other(_) => "Download",
        }
    }
}

impl Default for DocumentType {
    fn default() -> Self {
        DocumentType::Other(String::new())
    }
}

impl From<String> for DocumentType {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "TRANSCRIPT" => DocumentType::Transcript,
            "CERTIFICATE" => DocumentType::Certificate,
            "DIPLOMA" => DocumentType::Diploma,
            _ => DocumentType::Other(tag),
        }
    }
}

impl From<DocumentType> for String {
    fn from(kind: DocumentType) -> Self {
        match kind {
            DocumentType::Other(tag) => tag,
            known => known.as_str().to_string(),
        }
    }
}

/// Dashboard sections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentCategory {
    Transcripts,
    Certificates,
    Other,
}

impl DocumentCategory {
    pub const ALL: [DocumentCategory; 3] = [
        DocumentCategory::Transcripts,
        DocumentCategory::Certificates,
        DocumentCategory::Other,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            DocumentCategory::Transcripts => "Transcripts",
            DocumentCategory::Certificates => "Certificates & Testimonials",
            DocumentCategory::Other => "Other Documents",
        }
    }

    /// Message shown when the section has no documents
    pub fn empty_message(&self) -> &'static str {
        match self {
            DocumentCategory::Transcripts => "No transcripts available yet.",
            DocumentCategory::Certificates => "No certificates or testimonials available yet.",
            DocumentCategory::Other => "No other documents available.",
        }
    }
}

/// Document owned by the signed-in user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub document_type: DocumentType,
    #[serde(default)]
    pub file_url: Option<String>,
    pub uploaded_at: DateTime<Utc>,
    #[serde(default)]
    pub is_verified: bool,
    /// Size in bytes
    #[serde(default)]
    pub file_size: Option<u64>,
}
