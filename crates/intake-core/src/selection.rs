//! Attachment selection state machine.
//!
//! Backs the upload widget's file list: holds the chosen files, enforces the
//! count and per-file size policy, and produces a render-ready summary. The
//! same constants are re-applied server-side when the multipart body is
//! parsed, so the client-side checks are advisory, not load-bearing.

use serde::Serialize;

/// Maximum number of held files.
pub const MAX_FILES: usize = 10;

/// Per-file size limit in bytes (10 MiB).
pub const MAX_FILE_BYTES: u64 = 10 * 1024 * 1024;

/// A file the user has picked, before any upload happens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectedFile {
    pub name: String,
    pub size: u64,
    pub content_type: String,
}

/// Classification against the per-file size limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileClass {
    Ready,
    Oversized,
}

/// Classify a file: oversized iff it exceeds [`MAX_FILE_BYTES`].
/// A file of exactly the limit is still ready.
pub fn classify(file: &SelectedFile) -> FileClass {
    if file.size > MAX_FILE_BYTES {
        FileClass::Oversized
    } else {
        FileClass::Ready
    }
}

/// Result of an [`FileSelection::add`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddOutcome {
    /// Files from the incoming batch that were appended.
    pub accepted: usize,
    /// Files dropped because their name duplicated a held file.
    pub duplicates: usize,
    /// Files dropped because the 10-file cap was reached.
    pub truncated: usize,
}

impl AddOutcome {
    /// True when the cap forced part of the batch to be dropped; the widget
    /// surfaces this as a "limit reached, N of M added" warning.
    pub fn limit_reached(&self) -> bool {
        self.truncated > 0
    }
}

/// Render-ready counts and status line for the widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectionSummary {
    pub ready: usize,
    pub oversized: usize,
    pub status: String,
}

/// The held file list.
///
/// Invariants: never more than [`MAX_FILES`] entries, never two entries with
/// the same name, arrival order preserved.
#[derive(Debug, Default, Clone)]
pub struct FileSelection {
    files: Vec<SelectedFile>,
}

impl FileSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a batch of files.
    ///
    /// Name-duplicates (against held files and earlier files in the same
    /// batch) are dropped first; the remainder is truncated so the held list
    /// never exceeds the cap, and appended in arrival order. Previously held
    /// files are never displaced.
    pub fn add(&mut self, batch: Vec<SelectedFile>) -> AddOutcome {
        let mut outcome = AddOutcome {
            accepted: 0,
            duplicates: 0,
            truncated: 0,
        };

        for file in batch {
            if self.files.iter().any(|held| held.name == file.name) {
                outcome.duplicates += 1;
                continue;
            }
            if self.files.len() >= MAX_FILES {
                outcome.truncated += 1;
                continue;
            }
            self.files.push(file);
            outcome.accepted += 1;
        }

        outcome
    }

    /// Remove the file at `index`. Out-of-range is a no-op.
    pub fn remove(&mut self, index: usize) -> bool {
        if index < self.files.len() {
            self.files.remove(index);
            true
        } else {
            false
        }
    }

    pub fn files(&self) -> &[SelectedFile] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Files currently blocking submission, with their offending sizes.
    pub fn oversized(&self) -> Vec<&SelectedFile> {
        self.files
            .iter()
            .filter(|f| classify(f) == FileClass::Oversized)
            .collect()
    }

    /// Whether the submit button may dispatch: no oversized file held.
    pub fn can_submit(&self) -> bool {
        self.oversized().is_empty()
    }

    /// Counts plus a human-readable status line.
    pub fn summarize(&self) -> SelectionSummary {
        let oversized = self.oversized().len();
        let ready = self.files.len() - oversized;

        let status = match (ready, oversized) {
            (0, 0) => "No files selected".to_string(),
            (r, 0) => format!("{} file(s) ready to upload", r),
            (0, o) => format!("{} file(s) over the 10 MB limit", o),
            (r, o) => format!("{} file(s) ready, {} over the 10 MB limit", r, o),
        };

        SelectionSummary {
            ready,
            oversized,
            status,
        }
    }
}

/// Format a byte count for display, to the nearest sensible unit.
pub fn format_bytes(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * 1024;

    if size < KB {
        format!("{} bytes", size)
    } else if size < MB {
        format!("{:.1} KB", size as f64 / KB as f64)
    } else {
        format!("{:.1} MB", size as f64 / MB as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str, size: u64) -> SelectedFile {
        SelectedFile {
            name: name.to_string(),
            size,
            content_type: "application/octet-stream".to_string(),
        }
    }

    #[test]
    fn add_appends_in_arrival_order() {
        let mut sel = FileSelection::new();
        let outcome = sel.add(vec![file("a.pdf", 10), file("b.pdf", 20)]);
        assert_eq!(outcome.accepted, 2);
        assert_eq!(
            sel.files().iter().map(|f| f.name.as_str()).collect::<Vec<_>>(),
            vec!["a.pdf", "b.pdf"]
        );
    }

    #[test]
    fn add_drops_name_duplicates() {
        let mut sel = FileSelection::new();
        sel.add(vec![file("a.pdf", 10)]);
        let outcome = sel.add(vec![file("a.pdf", 99), file("b.pdf", 20)]);
        assert_eq!(outcome.accepted, 1);
        assert_eq!(outcome.duplicates, 1);
        assert_eq!(sel.len(), 2);
        // The originally held entry wins.
        assert_eq!(sel.files()[0].size, 10);
    }

    #[test]
    fn add_drops_duplicates_within_one_batch() {
        let mut sel = FileSelection::new();
        let outcome = sel.add(vec![file("a.pdf", 10), file("a.pdf", 20)]);
        assert_eq!(outcome.accepted, 1);
        assert_eq!(outcome.duplicates, 1);
    }

    #[test]
    fn cap_truncates_incoming_batch_and_keeps_held_files() {
        let mut sel = FileSelection::new();
        sel.add((0..8).map(|i| file(&format!("f{}.pdf", i), 1)).collect());

        let outcome = sel.add((0..5).map(|i| file(&format!("g{}.pdf", i), 1)).collect());
        assert_eq!(outcome.accepted, 2);
        assert_eq!(outcome.truncated, 3);
        assert!(outcome.limit_reached());
        assert_eq!(sel.len(), MAX_FILES);
        // All previously held files survive.
        assert!(sel.files().iter().any(|f| f.name == "f7.pdf"));
    }

    #[test]
    fn held_list_never_exceeds_cap_for_any_add_sequence() {
        let mut sel = FileSelection::new();
        for round in 0..5 {
            sel.add(
                (0..7)
                    .map(|i| file(&format!("r{}-{}.pdf", round, i), 1))
                    .collect(),
            );
            assert!(sel.len() <= MAX_FILES);
        }
        assert_eq!(sel.len(), MAX_FILES);
    }

    #[test]
    fn remove_out_of_range_is_noop() {
        let mut sel = FileSelection::new();
        sel.add(vec![file("a.pdf", 10)]);
        assert!(!sel.remove(5));
        assert_eq!(sel.len(), 1);
        assert!(sel.remove(0));
        assert!(sel.is_empty());
    }

    #[test]
    fn classify_boundary_at_ten_mib() {
        assert_eq!(classify(&file("edge.pdf", MAX_FILE_BYTES)), FileClass::Ready);
        assert_eq!(
            classify(&file("over.pdf", MAX_FILE_BYTES + 1)),
            FileClass::Oversized
        );
    }

    #[test]
    fn oversized_files_block_submission() {
        let mut sel = FileSelection::new();
        sel.add(vec![file("ok.pdf", 100), file("big.pdf", MAX_FILE_BYTES + 1)]);
        assert!(!sel.can_submit());
        let blocking = sel.oversized();
        assert_eq!(blocking.len(), 1);
        assert_eq!(blocking[0].name, "big.pdf");

        sel.remove(1);
        assert!(sel.can_submit());
    }

    #[test]
    fn summarize_covers_all_four_cases() {
        let mut sel = FileSelection::new();
        assert_eq!(sel.summarize().status, "No files selected");

        sel.add(vec![file("ok.pdf", 100)]);
        let s = sel.summarize();
        assert_eq!((s.ready, s.oversized), (1, 0));

        sel.add(vec![file("big.pdf", MAX_FILE_BYTES + 1)]);
        let s = sel.summarize();
        assert_eq!((s.ready, s.oversized), (1, 1));

        sel.remove(0);
        let s = sel.summarize();
        assert_eq!((s.ready, s.oversized), (0, 1));
    }

    #[test]
    fn format_bytes_picks_a_sensible_unit() {
        assert_eq!(format_bytes(512), "512 bytes");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(5 * 1024 * 1024), "5.0 MB");
    }
}
