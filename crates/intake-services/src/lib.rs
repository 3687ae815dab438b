//! External service clients for the intake service.
//!
//! Each collaborator sits behind a trait so the request pipeline depends on
//! contracts, not concrete SaaS clients: [`FileStore`] (Drive), [`RowWriter`]
//! (Sheets), and [`Mailer`] (SMTP). The real implementations share a
//! service-account token source in [`google`]. In-memory doubles for tests
//! live in [`test_helpers`].

pub mod drive;
pub mod google;
pub mod mail;
pub mod sheets;
pub mod test_helpers;

pub use drive::{DriveClient, FileStore, FileStoreError, FileStoreResult};
pub use google::GoogleAuth;
pub use mail::{MailError, Mailer, SmtpMailer};
pub use sheets::{RowWriter, SheetError, SheetsClient};
