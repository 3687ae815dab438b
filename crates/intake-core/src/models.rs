//! Submission domain model.

use std::path::PathBuf;

/// One attached file, spooled to local disk while the request is handled.
#[derive(Debug, Clone)]
pub struct Attachment {
    /// Original filename as supplied by the browser.
    pub filename: String,
    /// Declared MIME type from the multipart part.
    pub content_type: String,
    /// Size in bytes as spooled.
    pub size: u64,
    /// Path of the local spool copy; removed after a successful remote upload.
    pub spool_path: PathBuf,
}

/// A parsed feedback submission. Lives only for the duration of one request.
#[derive(Debug, Clone, Default)]
pub struct Submission {
    pub name: String,
    pub rank: String,
    pub relationship: String,
    pub branch: String,
    pub phone: String,
    pub email: Option<String>,
    pub identifier: Option<String>,
    pub feedback: Option<String>,
    pub attachments: Vec<Attachment>,
}

impl Submission {
    /// Required fields per the intake contract: name, phone, rank, branch,
    /// relationship. Blank strings count as missing.
    pub fn has_required_fields(&self) -> bool {
        !(self.name.trim().is_empty()
            || self.phone.trim().is_empty()
            || self.rank.trim().is_empty()
            || self.branch.trim().is_empty()
            || self.relationship.trim().is_empty())
    }

    /// Whether the submitter left a syntactically plausible email address.
    pub fn confirmation_address(&self) -> Option<&str> {
        self.email
            .as_deref()
            .map(str::trim)
            .filter(|e| e.contains('@'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled() -> Submission {
        Submission {
            name: "Asha Rao".to_string(),
            rank: "Major".to_string(),
            relationship: "Self".to_string(),
            branch: "Army".to_string(),
            phone: "9876543210".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn required_fields_reject_blank_values() {
        assert!(filled().has_required_fields());

        let mut missing = filled();
        missing.phone = "   ".to_string();
        assert!(!missing.has_required_fields());

        let mut missing = filled();
        missing.branch = String::new();
        assert!(!missing.has_required_fields());
    }

    #[test]
    fn confirmation_address_requires_an_at_sign() {
        let mut s = filled();
        assert!(s.confirmation_address().is_none());

        s.email = Some("not-an-address".to_string());
        assert!(s.confirmation_address().is_none());

        s.email = Some(" asha@example.com ".to_string());
        assert_eq!(s.confirmation_address(), Some("asha@example.com"));
    }
}
