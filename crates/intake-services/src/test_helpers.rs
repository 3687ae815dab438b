//! In-memory service doubles for testing.
//!
//! These implement the collaborator traits without any network access, and
//! record enough of what happened for assertions: folder tree, uploaded
//! files, appended rows, and sent emails. Failure toggles let tests exercise
//! the pipeline's abort behavior.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::drive::{FileStore, FileStoreError, FileStoreResult};
use crate::mail::{MailError, Mailer};
use crate::sheets::{RowWriter, SheetError};

/// An uploaded file captured by [`MockFileStore`].
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub parent_id: String,
    pub filename: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

/// In-memory file store: folders keyed by (parent, name), uploads logged.
#[derive(Default)]
pub struct MockFileStore {
    folders: Mutex<HashMap<(String, String), String>>,
    uploads: Mutex<Vec<UploadedFile>>,
    create_calls: AtomicUsize,
    next_id: AtomicUsize,
    fail_uploads: AtomicBool,
}

impl MockFileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a folder, returning its identifier.
    pub fn seed_folder(&self, parent_id: &str, name: &str) -> String {
        let id = self.mint_id();
        self.folders
            .lock()
            .unwrap()
            .insert((parent_id.to_string(), name.to_string()), id.clone());
        id
    }

    /// Number of create_folder calls observed.
    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn uploads(&self) -> Vec<UploadedFile> {
        self.uploads.lock().unwrap().clone()
    }

    pub fn folder_id(&self, parent_id: &str, name: &str) -> Option<String> {
        self.folders
            .lock()
            .unwrap()
            .get(&(parent_id.to_string(), name.to_string()))
            .cloned()
    }

    /// Make every subsequent upload fail.
    pub fn fail_uploads(&self) {
        self.fail_uploads.store(true, Ordering::SeqCst);
    }

    fn mint_id(&self) -> String {
        format!("folder-{}", self.next_id.fetch_add(1, Ordering::SeqCst))
    }
}

#[async_trait]
impl FileStore for MockFileStore {
    async fn find_folder(&self, parent_id: &str, name: &str) -> FileStoreResult<Option<String>> {
        Ok(self.folder_id(parent_id, name))
    }

    async fn create_folder(&self, parent_id: &str, name: &str) -> FileStoreResult<String> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        let id = self.mint_id();
        self.folders
            .lock()
            .unwrap()
            .insert((parent_id.to_string(), name.to_string()), id.clone());
        Ok(id)
    }

    async fn upload_file(
        &self,
        parent_id: &str,
        filename: &str,
        content_type: &str,
        data: Vec<u8>,
    ) -> FileStoreResult<String> {
        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(FileStoreError::Api {
                status: 500,
                body: "mock upload failure".to_string(),
            });
        }
        let mut uploads = self.uploads.lock().unwrap();
        uploads.push(UploadedFile {
            parent_id: parent_id.to_string(),
            filename: filename.to_string(),
            content_type: content_type.to_string(),
            data,
        });
        Ok(format!("file-{}", uploads.len()))
    }

    fn folder_url(&self, folder_id: &str) -> String {
        format!("https://files.example.test/{}", folder_id)
    }
}

/// In-memory row writer: records appended rows.
#[derive(Default)]
pub struct MockRowWriter {
    rows: Mutex<Vec<Vec<String>>>,
    fail_appends: AtomicBool,
}

impl MockRowWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> Vec<Vec<String>> {
        self.rows.lock().unwrap().clone()
    }

    pub fn fail_appends(&self) {
        self.fail_appends.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl RowWriter for MockRowWriter {
    async fn append_row(&self, values: &[String]) -> Result<(), SheetError> {
        if self.fail_appends.load(Ordering::SeqCst) {
            return Err(SheetError::Api {
                status: 500,
                body: "mock append failure".to_string(),
            });
        }
        self.rows.lock().unwrap().push(values.to_vec());
        Ok(())
    }

    fn sheet_url(&self) -> String {
        "https://sheets.example.test/feedback".to_string()
    }
}

/// A sent email captured by [`MockMailer`].
#[derive(Debug, Clone)]
pub struct SentMail {
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// In-memory mailer: records verify calls and sent messages.
#[derive(Default)]
pub struct MockMailer {
    sent: Mutex<Vec<SentMail>>,
    verify_calls: AtomicUsize,
    fail_verify: AtomicBool,
    fail_sends: AtomicBool,
}

impl MockMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<SentMail> {
        self.sent.lock().unwrap().clone()
    }

    pub fn verify_calls(&self) -> usize {
        self.verify_calls.load(Ordering::SeqCst)
    }

    pub fn fail_verify(&self) {
        self.fail_verify.store(true, Ordering::SeqCst);
    }

    pub fn fail_sends(&self) {
        self.fail_sends.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl Mailer for MockMailer {
    async fn verify(&self) -> Result<(), MailError> {
        self.verify_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_verify.load(Ordering::SeqCst) {
            return Err(MailError::Transport("mock verify failure".to_string()));
        }
        Ok(())
    }

    async fn send_html(&self, to: &str, subject: &str, html: &str) -> Result<(), MailError> {
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(MailError::Transport("mock send failure".to_string()));
        }
        self.sent.lock().unwrap().push(SentMail {
            to: to.to_string(),
            subject: subject.to_string(),
            html: html.to_string(),
        });
        Ok(())
    }
}

/// Convenience bundle for wiring all three doubles into an `AppState`.
pub struct MockServices {
    pub file_store: Arc<MockFileStore>,
    pub row_writer: Arc<MockRowWriter>,
    pub mailer: Arc<MockMailer>,
}

impl MockServices {
    pub fn new() -> Self {
        Self {
            file_store: Arc::new(MockFileStore::new()),
            row_writer: Arc::new(MockRowWriter::new()),
            mailer: Arc::new(MockMailer::new()),
        }
    }
}

impl Default for MockServices {
    fn default() -> Self {
        Self::new()
    }
}
