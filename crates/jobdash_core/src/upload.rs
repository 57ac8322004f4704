//! Resume upload state machine.
//!
//! Merges the transport outcome of a submission with status-channel events
//! into one user-visible status. Terminal phases (`Success`, `Error`) ignore
//! further status events until a new submission or an explicit retry.
use std::path::{Path, PathBuf};

use crate::{AttemptId, PushEvent};

pub const INVALID_TYPE_MESSAGE: &str = "Please select a valid PDF or Word document";
pub const NO_FILE_MESSAGE: &str = "Please select a file to upload";
pub const TRANSPORT_FAILED_MESSAGE: &str = "Failed to upload resume. Please try again.";
pub const PROCESSING_FAILED_MESSAGE: &str = "Processing failed. Please try again.";

/// Progress shown as soon as a submission starts.
pub const SUBMIT_PROGRESS: u8 = 10;
/// Progress assumed when a `processing` event carries no hint.
pub const PROCESSING_DEFAULT_PROGRESS: u8 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UploadPhase {
    #[default]
    Idle,
    Uploading,
    Processing,
    Success,
    Error,
}

impl UploadPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, UploadPhase::Success | UploadPhase::Error)
    }

    pub fn is_busy(self) -> bool {
        matches!(self, UploadPhase::Uploading | UploadPhase::Processing)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Doc,
    Docx,
}

impl DocumentKind {
    pub fn mime(self) -> &'static str {
        match self {
            DocumentKind::Pdf => "application/pdf",
            DocumentKind::Doc => "application/msword",
            DocumentKind::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
        }
    }

    pub fn from_mime(mime: &str) -> Option<Self> {
        let mime = mime.split(';').next().unwrap_or(mime).trim();
        [DocumentKind::Pdf, DocumentKind::Doc, DocumentKind::Docx]
            .into_iter()
            .find(|kind| kind.mime().eq_ignore_ascii_case(mime))
    }

    pub fn from_file_name(name: &str) -> Option<Self> {
        let ext = Path::new(name).extension()?.to_str()?;
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Some(DocumentKind::Pdf),
            "doc" => Some(DocumentKind::Doc),
            "docx" => Some(DocumentKind::Docx),
            _ => None,
        }
    }
}

/// A resume file that passed the type check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedResume {
    pub path: PathBuf,
    pub file_name: String,
    pub kind: DocumentKind,
}

/// Checks the file type without touching the file.
///
/// The extension decides; a supplied MIME type must agree with it.
pub fn validate_resume_file(path: &Path, mime: Option<&str>) -> Result<SelectedResume, String> {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| INVALID_TYPE_MESSAGE.to_string())?;
    let kind = DocumentKind::from_file_name(file_name)
        .ok_or_else(|| INVALID_TYPE_MESSAGE.to_string())?;
    if let Some(mime) = mime {
        if DocumentKind::from_mime(mime) != Some(kind) {
            return Err(INVALID_TYPE_MESSAGE.to_string());
        }
    }
    Ok(SelectedResume {
        path: path.to_path_buf(),
        file_name: file_name.to_string(),
        kind,
    })
}

/// What a transition means for the rest of the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadSignal {
    None,
    /// Entered `Success`; raised once per successful upload.
    ResumeReady,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UploadMachine {
    phase: UploadPhase,
    progress: u8,
    error: Option<String>,
    validation_error: Option<String>,
    selected: Option<SelectedResume>,
    attempt: AttemptId,
}

impl UploadMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> UploadPhase {
        self.phase
    }

    pub fn progress(&self) -> u8 {
        self.progress
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn validation_error(&self) -> Option<&str> {
        self.validation_error.as_deref()
    }

    pub fn selected(&self) -> Option<&SelectedResume> {
        self.selected.as_ref()
    }

    pub fn attempt(&self) -> AttemptId {
        self.attempt
    }

    /// Records the picked file. Ignored while a submission is in progress.
    pub fn select_file(&mut self, path: &Path, mime: Option<&str>) -> bool {
        if self.phase.is_busy() {
            return false;
        }
        match validate_resume_file(path, mime) {
            Ok(selected) => {
                self.selected = Some(selected);
                self.validation_error = None;
            }
            Err(message) => {
                self.selected = None;
                self.validation_error = Some(message);
            }
        }
        true
    }

    /// Starts a new submission and returns the attempt to hand to the transport.
    ///
    /// Allowed from `Idle` and from `Success` (re-upload). `Error` needs a
    /// retry first.
    pub fn submit(&mut self) -> Option<(AttemptId, SelectedResume)> {
        if !matches!(self.phase, UploadPhase::Idle | UploadPhase::Success) {
            return None;
        }
        let Some(selected) = self.selected.clone() else {
            self.validation_error = Some(NO_FILE_MESSAGE.to_string());
            return None;
        };
        self.attempt += 1;
        self.phase = UploadPhase::Uploading;
        self.progress = SUBMIT_PROGRESS;
        self.error = None;
        self.validation_error = None;
        Some((self.attempt, selected))
    }

    /// Applies the transport result for `attempt`. Stale attempts are dropped.
    pub fn transport_finished(&mut self, attempt: AttemptId, result: Result<(), String>) -> bool {
        if attempt != self.attempt || !self.phase.is_busy() {
            return false;
        }
        match result {
            Ok(()) => {
                if self.phase == UploadPhase::Uploading {
                    self.phase = UploadPhase::Processing;
                }
            }
            Err(_) => self.fail(TRANSPORT_FAILED_MESSAGE.to_string()),
        }
        true
    }

    /// Applies a status event already known to target the current user.
    pub fn apply_event(&mut self, event: &PushEvent) -> (bool, UploadSignal) {
        if !self.phase.is_busy() {
            return (false, UploadSignal::None);
        }
        let signal = match event {
            PushEvent::Progress { progress, .. } => {
                if *progress >= 100 {
                    self.succeed()
                } else {
                    self.phase = UploadPhase::Processing;
                    self.progress = *progress;
                    UploadSignal::None
                }
            }
            PushEvent::Processing { progress, .. } => {
                self.phase = UploadPhase::Processing;
                self.progress = progress.unwrap_or(PROCESSING_DEFAULT_PROGRESS).min(100);
                UploadSignal::None
            }
            PushEvent::Processed { success: true, .. } => self.succeed(),
            PushEvent::Processed {
                success: false,
                error,
                ..
            }
            | PushEvent::Error { error, .. } => {
                self.fail(
                    error
                        .clone()
                        .unwrap_or_else(|| PROCESSING_FAILED_MESSAGE.to_string()),
                );
                UploadSignal::None
            }
        };
        (true, signal)
    }

    /// "Try again": `Error` back to `Idle`, clearing the picked file.
    pub fn retry(&mut self) -> bool {
        if self.phase != UploadPhase::Error {
            return false;
        }
        self.phase = UploadPhase::Idle;
        self.progress = 0;
        self.error = None;
        self.validation_error = None;
        self.selected = None;
        true
    }

    /// Back to a fresh form, as when the upload dialog is reopened.
    pub fn reset(&mut self) {
        let attempt = self.attempt;
        *self = Self {
            attempt,
            ..Self::default()
        };
    }

    fn succeed(&mut self) -> UploadSignal {
        self.phase = UploadPhase::Success;
        self.progress = 100;
        self.error = None;
        UploadSignal::ResumeReady
    }

    fn fail(&mut self, message: String) {
        self.phase = UploadPhase::Error;
        self.error = Some(message);
    }
}
