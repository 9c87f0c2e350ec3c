use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// File record returned by the ingestion endpoint.
///
/// The attachment pipeline treats this as an opaque receipt; only the caller
/// inspects it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FileInfo {
    /// Server-assigned record id.
    pub id: u64,

    /// Owner of the uploaded file.
    pub user_id: u64,

    /// Original filename.
    pub filename: String,

    /// Where the object landed in storage.
    pub minio_path: String,

    /// Size in bytes.
    pub size: u64,

    /// When the server accepted the upload.
    #[serde(with = "crate::utils::time")]
    pub uploaded_at: OffsetDateTime,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_info_parses() {
        let info: FileInfo = serde_json::from_str(
            r#"{
                "id": 12,
                "user_id": 3,
                "filename": "handbook.docx",
                "minio_path": "https://minio.internal/kb/5f2c.docx",
                "size": 48231,
                "uploaded_at": "2025-02-11T09:15:00Z"
            }"#,
        )
        .unwrap();
        assert_eq!(info.id, 12);
        assert_eq!(info.filename, "handbook.docx");
        assert_eq!(info.size, 48231);
    }
}
