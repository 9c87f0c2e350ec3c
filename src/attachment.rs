//! Document selection and upload.
//!
//! The pipeline holds one candidate attachment at a time and uploads it with
//! single-flight semantics. Its pending state is independent of the
//! conversation's: a chat turn and an upload may overlap. A failed upload
//! keeps the selection so the user can retry without reselecting.

use std::path::Path;
use std::sync::Arc;

use crate::client::Transport;
use crate::error::{Error, Result};
use crate::observability;
use crate::session::SessionController;
use crate::types::FileInfo;

/// A candidate document for ingestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    name: String,
    bytes: Vec<u8>,
}

impl Attachment {
    /// Creates an attachment from an in-memory buffer.
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    /// Reads an attachment from disk, naming it after the file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| {
                Error::validation(
                    format!("{} has no file name", path.display()),
                    Some("file".to_string()),
                )
            })?;
        let bytes = std::fs::read(path)
            .map_err(|err| Error::io(format!("failed to read {}", path.display()), err))?;
        Ok(Self { name, bytes })
    }

    /// Returns the display name sent to the server.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the raw content.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns the content size in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns true if the content is empty.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Single-flight upload pipeline for the selected document.
pub struct AttachmentPipeline {
    transport: Arc<dyn Transport>,
    selected: Option<Attachment>,
    pending: bool,
}

impl AttachmentPipeline {
    /// Creates a pipeline with nothing selected.
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            selected: None,
            pending: false,
        }
    }

    /// Stores a candidate, replacing any previous unsent selection.
    pub fn select(&mut self, attachment: Attachment) {
        self.selected = Some(attachment);
    }

    /// Returns the current candidate, if any.
    pub fn selected(&self) -> Option<&Attachment> {
        self.selected.as_ref()
    }

    /// Returns true if an upload is in flight.
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Upload the selected document.
    ///
    /// Rejected without transport contact when nothing is selected or an
    /// upload is already pending. On success the selection clears; on failure
    /// it is retained for retry. An `Unauthorized` classification
    /// additionally invalidates the session.
    pub async fn upload(&mut self, session: &mut SessionController) -> Result<FileInfo> {
        if self.pending {
            return Err(Error::validation(
                "an upload is already in progress",
                None,
            ));
        }
        let Some(attachment) = self.selected.take() else {
            return Err(Error::validation("no file selected", Some("file".to_string())));
        };
        if let Err(err) = session.require_authenticated() {
            self.selected = Some(attachment);
            return Err(err);
        }

        self.pending = true;
        observability::UPLOADS.click();
        let outcome = self.transport.upload(&attachment).await;
        self.pending = false;

        match outcome {
            Ok(receipt) => Ok(receipt),
            Err(err) => {
                observability::UPLOAD_FAILURES.click();
                if err.is_unauthorized() {
                    session.invalidate();
                }
                self.selected = Some(attachment);
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use time::macros::datetime;

    use super::*;
    use crate::credentials::CredentialStore;
    use crate::types::{CompletionRequest, CompletionResponse, TokenResponse};

    struct UploadStub {
        replies: Mutex<VecDeque<Result<FileInfo>>>,
        uploads: Mutex<Vec<String>>,
    }

    impl UploadStub {
        fn new(replies: Vec<Result<FileInfo>>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
                uploads: Mutex::new(Vec::new()),
            })
        }

        fn upload_count(&self) -> usize {
            self.uploads.lock().unwrap().len()
        }
    }

    #[async_trait::async_trait]
    impl Transport for UploadStub {
        async fn exchange_credentials(
            &self,
            _username: &str,
            _password: &str,
        ) -> Result<TokenResponse> {
            Err(Error::validation("unused in these tests", None))
        }

        async fn complete(&self, _request: &CompletionRequest) -> Result<CompletionResponse> {
            Err(Error::validation("unused in these tests", None))
        }

        async fn upload(&self, attachment: &Attachment) -> Result<FileInfo> {
            self.uploads.lock().unwrap().push(attachment.name().to_string());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(Error::network("no scripted reply", None)))
        }
    }

    fn receipt(filename: &str) -> Result<FileInfo> {
        Ok(FileInfo {
            id: 1,
            user_id: 7,
            filename: filename.to_string(),
            minio_path: format!("https://minio.internal/kb/{filename}"),
            size: 3,
            uploaded_at: datetime!(2025-02-11 09:15:00 UTC),
        })
    }

    fn session_with_token(
        transport: Arc<dyn Transport>,
        token: Option<&str>,
    ) -> (tempfile::TempDir, SessionController) {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::with_path(dir.path().join("token"));
        if let Some(token) = token {
            store.set(token).unwrap();
        }
        let mut session = SessionController::new(transport, store);
        session.probe();
        (dir, session)
    }

    #[tokio::test]
    async fn upload_without_selection_is_validation_error() {
        let transport = UploadStub::new(vec![]);
        let (_dir, mut session) = session_with_token(transport.clone(), Some("tok"));
        let mut pipeline = AttachmentPipeline::new(transport.clone());

        let err = pipeline.upload(&mut session).await.unwrap_err();
        assert!(err.is_validation());
        assert_eq!(transport.upload_count(), 0);
    }

    #[tokio::test]
    async fn upload_success_clears_selection() {
        let transport = UploadStub::new(vec![receipt("notes.docx")]);
        let (_dir, mut session) = session_with_token(transport.clone(), Some("tok"));
        let mut pipeline = AttachmentPipeline::new(transport.clone());

        pipeline.select(Attachment::new("notes.docx", b"abc".to_vec()));
        let info = pipeline.upload(&mut session).await.unwrap();
        assert_eq!(info.filename, "notes.docx");
        assert!(pipeline.selected().is_none());

        // A second upload without reselecting is rejected before transport.
        let err = pipeline.upload(&mut session).await.unwrap_err();
        assert!(err.is_validation());
        assert_eq!(transport.upload_count(), 1);
    }

    #[tokio::test]
    async fn upload_failure_retains_selection() {
        let transport = UploadStub::new(vec![Err(Error::server(503, "overloaded"))]);
        let (_dir, mut session) = session_with_token(transport.clone(), Some("tok"));
        let mut pipeline = AttachmentPipeline::new(transport.clone());

        pipeline.select(Attachment::new("notes.docx", b"abc".to_vec()));
        let err = pipeline.upload(&mut session).await.unwrap_err();
        assert!(err.is_server());
        assert_eq!(
            pipeline.selected().map(Attachment::name),
            Some("notes.docx")
        );
        assert!(!pipeline.is_pending());
    }

    #[tokio::test]
    async fn selection_replaces_previous_candidate() {
        let transport = UploadStub::new(vec![]);
        let mut pipeline = AttachmentPipeline::new(transport);

        pipeline.select(Attachment::new("first.docx", b"1".to_vec()));
        pipeline.select(Attachment::new("second.docx", b"2".to_vec()));
        assert_eq!(
            pipeline.selected().map(Attachment::name),
            Some("second.docx")
        );
    }

    #[tokio::test]
    async fn upload_while_pending_is_rejected() {
        let transport = UploadStub::new(vec![]);
        let (_dir, mut session) = session_with_token(transport.clone(), Some("tok"));
        let mut pipeline = AttachmentPipeline::new(transport.clone());

        pipeline.select(Attachment::new("notes.docx", b"abc".to_vec()));
        pipeline.pending = true;
        let err = pipeline.upload(&mut session).await.unwrap_err();
        assert!(err.is_validation());
        assert_eq!(transport.upload_count(), 0);
        assert!(pipeline.selected().is_some());
    }

    #[tokio::test]
    async fn gate_rejection_keeps_selection() {
        let transport = UploadStub::new(vec![]);
        let (_dir, mut session) = session_with_token(transport.clone(), None);
        let mut pipeline = AttachmentPipeline::new(transport.clone());

        pipeline.select(Attachment::new("notes.docx", b"abc".to_vec()));
        let err = pipeline.upload(&mut session).await.unwrap_err();
        assert!(err.is_not_authenticated());
        assert!(pipeline.selected().is_some());
        assert_eq!(transport.upload_count(), 0);
    }

    #[tokio::test]
    async fn unauthorized_upload_invalidates_session() {
        let transport = UploadStub::new(vec![Err(Error::unauthorized("token expired"))]);
        let (_dir, mut session) = session_with_token(transport.clone(), Some("tok"));
        let mut pipeline = AttachmentPipeline::new(transport.clone());

        pipeline.select(Attachment::new("notes.docx", b"abc".to_vec()));
        let err = pipeline.upload(&mut session).await.unwrap_err();
        assert!(err.is_unauthorized());
        assert!(!session.is_authenticated());
        // Selection survives for a retry after re-login.
        assert!(pipeline.selected().is_some());
    }

    #[test]
    fn attachment_from_path_reads_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("handbook.docx");
        std::fs::write(&path, b"contents").unwrap();

        let attachment = Attachment::from_path(&path).unwrap();
        assert_eq!(attachment.name(), "handbook.docx");
        assert_eq!(attachment.bytes(), b"contents");
        assert_eq!(attachment.len(), 8);
        assert!(!attachment.is_empty());
    }

    #[test]
    fn attachment_from_missing_path_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Attachment::from_path(dir.path().join("absent.docx")).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }
}
