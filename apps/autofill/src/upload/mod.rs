#![allow(dead_code)]

//! Upload controller — file selection, drag state, and the upload lifecycle.
//!
//! Each call to `upload` starts a numbered attempt. The network work runs on a
//! spawned task that only sends `AttemptEvent`s back; the owner of the form
//! applies them in order with `UploadController::apply`. Events from any
//! attempt other than the latest are dropped.

use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::form::FormState;
use crate::models::file::SelectedFile;
use crate::parser_client::{ParseCvResponse, ParserClient};

pub const SUCCESS_MESSAGE: &str = "CV parsed successfully! Form has been auto-filled.";

/// How long a finished upload keeps showing its final progress.
pub const PROGRESS_RESET_DELAY: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum UploadStatus {
    #[default]
    Idle,
    /// In flight until the completion event. `parsed` is set once a
    /// successful response has autofilled the form.
    Uploading {
        progress: u8,
        parsed: bool,
    },
    Succeeded {
        progress: u8,
    },
    Failed {
        message: String,
    },
}

#[derive(Debug, Clone)]
pub enum UploadEvent {
    Progress { sent: u64, total: u64 },
    Response(ParseCvResponse),
    Failed(String),
    Completed,
    ProgressReset,
}

#[derive(Debug, Clone)]
pub struct AttemptEvent {
    pub attempt: u64,
    pub event: UploadEvent,
}

impl AttemptEvent {
    pub fn new(attempt: u64, event: UploadEvent) -> Self {
        Self { attempt, event }
    }
}

pub type EventSender = mpsc::UnboundedSender<AttemptEvent>;
pub type EventReceiver = mpsc::UnboundedReceiver<AttemptEvent>;

pub struct UploadController {
    client: ParserClient,
    events: EventSender,
    selected_file: Option<SelectedFile>,
    is_dragging: bool,
    status: UploadStatus,
    attempt: u64,
}

impl UploadController {
    pub fn new(client: ParserClient, events: EventSender) -> Self {
        Self {
            client,
            events,
            selected_file: None,
            is_dragging: false,
            status: UploadStatus::Idle,
            attempt: 0,
        }
    }

    pub fn status(&self) -> &UploadStatus {
        &self.status
    }

    pub fn current_attempt(&self) -> u64 {
        self.attempt
    }

    pub fn selected_file(&self) -> Option<&SelectedFile> {
        self.selected_file.as_ref()
    }

    pub fn is_dragging(&self) -> bool {
        self.is_dragging
    }

    pub fn is_uploading(&self) -> bool {
        matches!(self.status, UploadStatus::Uploading { .. })
    }

    pub fn progress_percent(&self) -> u8 {
        match self.status {
            UploadStatus::Uploading { progress, .. } | UploadStatus::Succeeded { progress } => {
                progress
            }
            UploadStatus::Idle | UploadStatus::Failed { .. } => 0,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.status {
            UploadStatus::Failed { message } => Some(message),
            _ => None,
        }
    }

    pub fn success_message(&self) -> Option<&str> {
        match self.status {
            UploadStatus::Uploading { parsed: true, .. } | UploadStatus::Succeeded { .. } => {
                Some(SUCCESS_MESSAGE)
            }
            _ => None,
        }
    }

    pub fn drag_over(&mut self) {
        self.is_dragging = true;
    }

    pub fn drag_leave(&mut self) {
        self.is_dragging = false;
    }

    /// Handles a drop; only the first file is taken.
    pub fn drop_files(&mut self, files: Vec<SelectedFile>) {
        self.is_dragging = false;
        if let Some(file) = files.into_iter().next() {
            self.select_file(file);
        }
    }

    /// Replaces the selection and clears any error shown from a previous attempt.
    pub fn select_file(&mut self, file: SelectedFile) {
        debug!(file = %file.name, bytes = file.len(), "File selected");
        self.selected_file = Some(file);
        if matches!(self.status, UploadStatus::Failed { .. }) {
            self.status = UploadStatus::Idle;
        }
    }

    /// Starts uploading the selected file and returns the new attempt id.
    /// Does nothing without a selection. An attempt already in flight is not
    /// cancelled; its remaining events are ignored.
    pub fn upload(&mut self) -> Option<u64> {
        let file = self.selected_file.clone()?;
        let attempt = self.begin_attempt();
        info!(attempt, file = %file.name, "Starting upload");

        let client = self.client.clone();
        let events = self.events.clone();
        tokio::spawn(async move {
            let progress_events = events.clone();
            let outcome = client
                .parse_cv(&file, move |sent, total| {
                    let _ = progress_events
                        .send(AttemptEvent::new(attempt, UploadEvent::Progress { sent, total }));
                })
                .await;

            let event = match outcome {
                Ok(response) => UploadEvent::Response(response),
                Err(e) => UploadEvent::Failed(e.user_message()),
            };
            let _ = events.send(AttemptEvent::new(attempt, event));
            let _ = events.send(AttemptEvent::new(attempt, UploadEvent::Completed));
        });

        Some(attempt)
    }

    fn begin_attempt(&mut self) -> u64 {
        if self.is_uploading() {
            warn!(superseded = self.attempt, "Upload already in flight; superseding it");
        }
        self.attempt += 1;
        self.status = UploadStatus::Uploading {
            progress: 0,
            parsed: false,
        };
        self.attempt
    }

    /// Applies one event to the upload state and, on success, to `form`.
    /// Returns false when the event belonged to a superseded attempt.
    pub fn apply(&mut self, event: AttemptEvent, form: &mut FormState) -> bool {
        if event.attempt != self.attempt {
            debug!(
                attempt = event.attempt,
                current = self.attempt,
                "Ignoring event from superseded upload"
            );
            return false;
        }

        match event.event {
            UploadEvent::Progress { sent, total } => {
                if let UploadStatus::Uploading { progress, .. } = &mut self.status {
                    if total > 0 {
                        *progress = percent(sent, total);
                    }
                }
            }
            UploadEvent::Response(response) => match response.parsed() {
                Some(parsed) => {
                    form.autofill(parsed);
                    self.status = UploadStatus::Uploading {
                        progress: 100,
                        parsed: true,
                    };
                    info!(attempt = event.attempt, "Résumé parsed; form autofilled");
                }
                None => {
                    debug!(
                        attempt = event.attempt,
                        error = response.error.as_deref().unwrap_or(""),
                        "Parser response did not report success; form left unchanged"
                    );
                }
            },
            UploadEvent::Failed(message) => {
                warn!(attempt = event.attempt, "Upload failed: {message}");
                self.status = UploadStatus::Failed { message };
            }
            UploadEvent::Completed => {
                self.status = match std::mem::take(&mut self.status) {
                    UploadStatus::Uploading {
                        progress,
                        parsed: true,
                    } => UploadStatus::Succeeded { progress },
                    UploadStatus::Uploading { parsed: false, .. } => UploadStatus::Idle,
                    settled => settled,
                };
                self.schedule_progress_reset(event.attempt);
            }
            UploadEvent::ProgressReset => {
                if let UploadStatus::Succeeded { progress } = &mut self.status {
                    *progress = 0;
                }
            }
        }
        true
    }

    fn schedule_progress_reset(&self, attempt: u64) {
        let events = self.events.clone();
        tokio::spawn(async move {
            tokio::time::sleep(PROGRESS_RESET_DELAY).await;
            let _ = events.send(AttemptEvent::new(attempt, UploadEvent::ProgressReset));
        });
    }
}

fn percent(sent: u64, total: u64) -> u8 {
    (100.0 * sent as f64 / total as f64).round().min(100.0) as u8
}
