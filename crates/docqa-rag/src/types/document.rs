//! Document and chunk types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Supported document types
///
/// The set is deliberately closed: the ingestion collaborator extracts text
/// per variant, and unknown uploads are rejected before they reach the
/// pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    /// Plain text file
    Txt,
    /// PDF document
    Pdf,
    /// Word-processor document (.docx)
    Docx,
    /// Unrecognized upload
    Unknown,
}

impl FileType {
    /// Detect file type from a filename extension
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "txt" | "text" => Self::Txt,
            "pdf" => Self::Pdf,
            "docx" => Self::Docx,
            _ => Self::Unknown,
        }
    }

    /// Detect file type from a MIME tag
    pub fn from_mime(mime: &str) -> Self {
        match mime {
            "text/plain" => Self::Txt,
            "application/pdf" => Self::Pdf,
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document" => {
                Self::Docx
            }
            _ => Self::Unknown,
        }
    }

    /// Whether this type can be ingested
    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Unknown)
    }

    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Txt => "Text File",
            Self::Pdf => "PDF",
            Self::Docx => "Word Document (.docx)",
            Self::Unknown => "Unknown",
        }
    }
}

/// A document supplied by the ingestion collaborator.
///
/// The collaborator owns the record; the pipeline only reads it, and the
/// chunk store keeps the fields needed to resolve citations later.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentRef {
    /// Unique document ID
    pub id: Uuid,
    /// Human-readable title (used in citations)
    pub title: String,
    /// Original filename as uploaded
    pub filename: String,
    /// Detected file type
    pub file_type: FileType,
    /// Declared page count (derivation is the collaborator's concern)
    pub page_count: u32,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last metadata update timestamp
    pub updated_at: DateTime<Utc>,
}

impl DocumentRef {
    /// Create a new document record
    pub fn new(title: String, filename: String, file_type: FileType, page_count: u32) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title,
            filename,
            file_type,
            page_count,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A persisted chunk of a document's text.
///
/// Chunks cascade-delete with their document. `chunk_index` is dense from
/// zero within a document; `embedding_key` is unique across the corpus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkRecord {
    /// Unique chunk ID
    pub id: Uuid,
    /// Owning document ID
    pub document_id: Uuid,
    /// Raw text content
    pub content: String,
    /// Page number when derivable from the source format
    pub page_number: Option<u32>,
    /// Zero-based index within the owning document
    pub chunk_index: u32,
    /// Globally unique embedding key
    pub embedding_key: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl ChunkRecord {
    /// Create a chunk with the embedding key derived as `{document_id}_{chunk_index}`.
    pub fn new(document_id: Uuid, content: String, chunk_index: u32) -> Self {
        let embedding_key = format!("{}_{}", document_id, chunk_index);
        Self {
            id: Uuid::new_v4(),
            document_id,
            content,
            page_number: None,
            chunk_index,
            embedding_key,
            created_at: Utc::now(),
        }
    }

    /// Override the derived embedding key
    pub fn with_embedding_key(mut self, key: String) -> Self {
        self.embedding_key = key;
        self
    }

    /// Attach a page number
    pub fn with_page_number(mut self, page: u32) -> Self {
        self.page_number = Some(page);
        self
    }
}
