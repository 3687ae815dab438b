//! Submission handler.
//!
//! The orchestration pipeline is strictly linear: validate, duplicate check,
//! upload attachments, append the spreadsheet row, send notifications,
//! respond. There are no retries; the first failing step aborts the request
//! and the client sees the generic contract error for anything downstream.

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    response::IntoResponse,
    Json,
};
use chrono::Local;
use serde::Serialize;
use tempfile::TempDir;

use intake_core::{error::AppError, sanitize, selection, Attachment, Submission};

use crate::error::HttpAppError;
use crate::guard::{GuardDecision, SubmissionGuard};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub success: bool,
    pub message: String,
}

/// Folder name used when sanitization strips a value down to nothing.
const FALLBACK_FOLDER_NAME: &str = "Unknown";

/// Cell placeholder for submissions without attachments.
const NO_FOLDER_PLACEHOLDER: &str = "-";

/// A submission parsed off the wire, plus the spool directory holding its
/// attachment bytes. The directory is removed when this value drops, so a
/// failure anywhere in the pipeline cannot leave spool files behind.
struct ParsedForm {
    submission: Submission,
    _spool_dir: TempDir,
}

/// `POST /submit`
#[tracing::instrument(skip_all)]
pub async fn submit(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let form = parse_form(&state, multipart).await?;
    let submission = &form.submission;

    // Step 1: validate. No side effects before this passes.
    if !submission.has_required_fields() {
        return Err(AppError::MissingFields.into());
    }

    // Step 2: duplicate check.
    let key = SubmissionGuard::submitter_key(&submission.name, &submission.phone);
    if state.guard.check(&key).await == GuardDecision::Duplicate {
        return Err(AppError::RateLimited.into());
    }

    tracing::info!(
        name = %submission.name,
        branch = %submission.branch,
        attachments = submission.attachments.len(),
        "Processing submission"
    );

    // Step 3: upload attachments into branch/person/timestamp folders.
    let folder_link = if submission.attachments.is_empty() {
        None
    } else {
        Some(upload_attachments(&state, submission).await?)
    };

    // Step 4: append the spreadsheet row.
    let row = build_row(submission, folder_link.as_deref());
    state.row_writer.append_row(&row).await?;

    // Step 5: notifications. Transport is verified before the first send.
    state.mailer.verify().await?;
    let sheet_url = state.row_writer.sheet_url();
    state
        .mailer
        .send_html(
            &state.config.admin_email,
            &format!("New feedback from {}", submission.name),
            &admin_email_html(submission, folder_link.as_deref(), &sheet_url),
        )
        .await?;
    if let Some(address) = submission.confirmation_address() {
        state
            .mailer
            .send_html(
                address,
                "We received your feedback",
                &confirmation_email_html(submission),
            )
            .await?;
    }

    // Step 6: respond. Reached only when every prior step succeeded.
    Ok(Json(SubmitResponse {
        success: true,
        message: "Feedback submitted successfully".to_string(),
    }))
}

/// Parse the multipart body: text fields into the submission, file parts
/// spooled to a per-request temp directory. The attachment policy (count cap,
/// per-file size cap) is enforced here, before any external side effect.
async fn parse_form(state: &AppState, mut multipart: Multipart) -> Result<ParsedForm, HttpAppError> {
    let mut submission = Submission::default();
    let spool_dir = tempfile::tempdir()?;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        tracing::debug!(error = %e, "Malformed multipart body");
        AppError::InvalidInput("Invalid form data".to_string())
    })? {
        let Some(field_name) = field.name().map(str::to_string) else {
            continue;
        };

        if field_name == "files" {
            if submission.attachments.len() >= state.config.max_files {
                return Err(AppError::InvalidInput(format!(
                    "At most {} files are allowed",
                    state.config.max_files
                ))
                .into());
            }

            let filename = field
                .file_name()
                .map(str::to_string)
                .unwrap_or_else(|| "attachment".to_string());
            let content_type = field
                .content_type()
                .map(str::to_string)
                .unwrap_or_else(|| "application/octet-stream".to_string());

            let data = field.bytes().await.map_err(|e| {
                tracing::debug!(error = %e, "Failed to read file part");
                AppError::InvalidInput("Invalid form data".to_string())
            })?;

            if data.len() as u64 > state.config.max_file_size_bytes {
                return Err(AppError::InvalidInput(format!(
                    "File '{}' is too large ({})",
                    filename,
                    selection::format_bytes(data.len() as u64)
                ))
                .into());
            }

            let spool_path = spool_file_path(&spool_dir, submission.attachments.len(), &filename);
            tokio::fs::write(&spool_path, &data).await?;

            submission.attachments.push(Attachment {
                filename,
                content_type,
                size: data.len() as u64,
                spool_path,
            });
            continue;
        }

        let value = field.text().await.map_err(|e| {
            tracing::debug!(error = %e, "Failed to read form field");
            AppError::InvalidInput("Invalid form data".to_string())
        })?;

        match field_name.as_str() {
            "name" => submission.name = value,
            "rank" => submission.rank = value,
            "relationship" => submission.relationship = value,
            "branch" => submission.branch = value,
            "phone" => submission.phone = value,
            "email" => submission.email = Some(value),
            "id" => submission.identifier = Some(value),
            "sugg" => submission.feedback = Some(value),
            _ => {}
        }
    }

    Ok(ParsedForm {
        submission,
        _spool_dir: spool_dir,
    })
}

/// Spool filenames are positional; the original name only decides the
/// extension, so hostile filenames never form a path.
fn spool_file_path(dir: &TempDir, index: usize, filename: &str) -> PathBuf {
    let extension = std::path::Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("bin");
    dir.path().join(format!("upload-{}.{}", index, extension))
}

/// Resolve the branch/person/timestamp folder chain and upload every
/// attachment in input order. Each spool copy is deleted right after its
/// successful upload. Returns the leaf folder link.
async fn upload_attachments(
    state: &AppState,
    submission: &Submission,
) -> Result<String, HttpAppError> {
    let branch = non_empty_or_fallback(sanitize::branch_folder_name(&submission.branch));
    let person = non_empty_or_fallback(sanitize::folder_name(&submission.name));
    let leaf = Local::now().format("%Y-%m-%d %H-%M-%S").to_string();

    let root = &state.config.drive_root_folder_id;
    let branch_id = state.file_store.ensure_folder(root, &branch).await?;
    let person_id = state.file_store.ensure_folder(&branch_id, &person).await?;
    let leaf_id = state.file_store.ensure_folder(&person_id, &leaf).await?;

    for attachment in &submission.attachments {
        let data = tokio::fs::read(&attachment.spool_path).await?;
        state
            .file_store
            .upload_file(
                &leaf_id,
                &attachment.filename,
                &attachment.content_type,
                data,
            )
            .await?;
        if let Err(e) = tokio::fs::remove_file(&attachment.spool_path).await {
            tracing::warn!(
                path = %attachment.spool_path.display(),
                error = %e,
                "Failed to remove spool file after upload"
            );
        }
    }

    Ok(state.file_store.folder_url(&leaf_id))
}

fn non_empty_or_fallback(name: String) -> String {
    if name.is_empty() {
        FALLBACK_FOLDER_NAME.to_string()
    } else {
        name
    }
}

/// One spreadsheet row: timestamp, rank, name, relationship, blank
/// placeholder, email, phone, branch, identifier, feedback, folder link.
fn build_row(submission: &Submission, folder_link: Option<&str>) -> Vec<String> {
    vec![
        Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        submission.rank.clone(),
        submission.name.clone(),
        submission.relationship.clone(),
        String::new(),
        submission.email.clone().unwrap_or_default(),
        submission.phone.clone(),
        submission.branch.clone(),
        submission.identifier.clone().unwrap_or_default(),
        submission.feedback.clone().unwrap_or_default(),
        folder_link.unwrap_or(NO_FOLDER_PLACEHOLDER).to_string(),
    ]
}

fn admin_email_html(
    submission: &Submission,
    folder_link: Option<&str>,
    sheet_url: &str,
) -> String {
    use html_escape::encode_text;

    let mut html = format!(
        "<h2>New feedback submission</h2>\
         <p><b>Name:</b> {}<br>\
         <b>Rank:</b> {}<br>\
         <b>Relationship:</b> {}<br>\
         <b>Branch:</b> {}<br>\
         <b>Phone:</b> {}<br>\
         <b>Email:</b> {}<br>\
         <b>ID:</b> {}</p>",
        encode_text(&submission.name),
        encode_text(&submission.rank),
        encode_text(&submission.relationship),
        encode_text(&submission.branch),
        encode_text(&submission.phone),
        encode_text(submission.email.as_deref().unwrap_or("-")),
        encode_text(submission.identifier.as_deref().unwrap_or("-")),
    );

    if let Some(feedback) = submission.feedback.as_deref().filter(|f| !f.is_empty()) {
        html.push_str(&format!("<p><b>Feedback:</b><br>{}</p>", encode_text(feedback)));
    }

    html.push_str(&format!(
        "<p><a href=\"{}\">Open spreadsheet</a></p>",
        encode_text(sheet_url)
    ));
    if let Some(link) = folder_link {
        html.push_str(&format!(
            "<p><a href=\"{}\">View attachments ({})</a></p>",
            encode_text(link),
            submission.attachments.len()
        ));
    }

    html
}

fn confirmation_email_html(submission: &Submission) -> String {
    use html_escape::encode_text;

    format!(
        "<p>Dear {},</p>\
         <p>Thank you for your feedback. It has been recorded and will be \
         reviewed by our team.</p>\
         <p>This is an automated message; no reply is needed.</p>",
        encode_text(&submission.name)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission() -> Submission {
        Submission {
            name: "Asha Rao".to_string(),
            rank: "Major".to_string(),
            relationship: "Self".to_string(),
            branch: "Army (Retd.)".to_string(),
            phone: "9876543210".to_string(),
            email: Some("asha@example.com".to_string()),
            identifier: Some("SVC-1234".to_string()),
            feedback: Some("The helpline <rocks>".to_string()),
            attachments: Vec::new(),
        }
    }

    #[test]
    fn row_has_eleven_cells_with_placeholder_when_no_folder() {
        let row = build_row(&submission(), None);
        assert_eq!(row.len(), 11);
        assert_eq!(row[1], "Major");
        assert_eq!(row[2], "Asha Rao");
        assert_eq!(row[4], "");
        assert_eq!(row[10], "-");
    }

    #[test]
    fn row_carries_folder_link_when_present() {
        let row = build_row(&submission(), Some("https://drive.example/f/1"));
        assert_eq!(row[10], "https://drive.example/f/1");
    }

    #[test]
    fn admin_email_escapes_user_content_and_links_folder() {
        let html = admin_email_html(
            &submission(),
            Some("https://drive.example/f/1"),
            "https://sheets.example/s/1",
        );
        assert!(html.contains("&lt;rocks&gt;"));
        assert!(!html.contains("<rocks>"));
        assert!(html.contains("https://drive.example/f/1"));
        assert!(html.contains("https://sheets.example/s/1"));
    }

    #[test]
    fn confirmation_email_addresses_the_submitter() {
        let html = confirmation_email_html(&submission());
        assert!(html.contains("Dear Asha Rao"));
    }

    #[test]
    fn spool_paths_are_positional_and_keep_only_the_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = spool_file_path(&dir, 3, "../../etc/passwd.txt");
        assert!(path.starts_with(dir.path()));
        assert_eq!(path.file_name().unwrap().to_str().unwrap(), "upload-3.txt");
    }
}
