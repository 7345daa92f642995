use tokio::sync::mpsc;

use crate::form::{FormState, Submission};
use crate::parser_client::ParserClient;
use crate::upload::{EventReceiver, UploadController, UploadEvent};

/// One page view: the form, the upload controller, and the event queue that
/// feeds the controller. All state changes happen on the task that owns this.
pub struct Session {
    pub form: FormState,
    pub upload: UploadController,
    events: EventReceiver,
}

impl Session {
    pub fn new(client: ParserClient) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            form: FormState::new(),
            upload: UploadController::new(client, tx),
            events: rx,
        }
    }

    /// Waits for the next event of the current attempt and applies it.
    /// Events from superseded attempts are dropped along the way.
    /// Returns `None` only once the event channel is closed.
    pub async fn next_event(&mut self) -> Option<UploadEvent> {
        loop {
            let event = self.events.recv().await?;
            let inner = event.event.clone();
            if self.upload.apply(event, &mut self.form) {
                return Some(inner);
            }
        }
    }

    /// Starts an upload and applies events until that attempt completes.
    /// Returns false when there was nothing to upload.
    pub async fn upload_and_wait(&mut self) -> bool {
        if self.upload.upload().is_none() {
            return false;
        }
        while let Some(event) = self.next_event().await {
            if matches!(event, UploadEvent::Completed) {
                break;
            }
        }
        true
    }

    pub fn submit(&mut self) -> Submission {
        self.form.submit()
    }
}
