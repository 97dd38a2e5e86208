//! Background execution of remote calls.
//!
//! The application logic is single-threaded; only I/O overlaps. Each
//! dispatched job runs on its own thread against the blocking collaborator
//! and always sends exactly one completion message back over the channel,
//! success or failure, which the main loop drains between updates.
//! At-most-one-in-flight per task kind is enforced by the task tracker at
//! dispatch time, not here.

use std::sync::Arc;
use std::thread;

use crossbeam_channel::{Receiver, Sender, unbounded};

use crate::message::{GalleryMessage, InsightMessage, LabelMessage, Message};
use crate::model::CoercedDraft;
use crate::store;
use crate::tasks::TaskKind;

use super::{AnalysisType, MediaType, RemoteCollaborator};

/// One unit of remote work.
#[derive(Debug, Clone)]
pub enum RemoteJob {
    Search {
        query: String,
        media_type: MediaType,
    },
    LoadSavedImages,
    LoadLabels {
        image_id: String,
    },
    CreateLabel {
        image_id: String,
        draft: CoercedDraft,
    },
    DeleteLabel {
        image_id: String,
        label_id: String,
    },
    Analyze {
        image_url: String,
        analysis_type: AnalysisType,
    },
    Discover,
}

impl RemoteJob {
    /// Task slot this job occupies while in flight.
    ///
    /// Label-list loads and the one-shot startup gallery load are
    /// untracked: overlapping loads are harmless because stale responses
    /// are discarded by image identity, and suppressing the load issued by
    /// a fast image switch would leave the new image without labels.
    pub fn kind(&self) -> Option<TaskKind> {
        match self {
            RemoteJob::Search { .. } => Some(TaskKind::Search),
            RemoteJob::LoadSavedImages => None,
            RemoteJob::LoadLabels { .. } => None,
            RemoteJob::CreateLabel { .. } | RemoteJob::DeleteLabel { .. } => {
                Some(TaskKind::LabelMutation)
            }
            RemoteJob::Analyze { .. } => Some(TaskKind::Analysis),
            RemoteJob::Discover => Some(TaskKind::Discovery),
        }
    }

    /// Execute against the collaborator, producing the completion message.
    fn run(self, api: &dyn RemoteCollaborator) -> Message {
        match self {
            RemoteJob::Search { query, media_type } => Message::Gallery(
                GalleryMessage::SearchCompleted(api.search_images(&query, media_type)),
            ),
            RemoteJob::LoadSavedImages => Message::Gallery(GalleryMessage::SavedImagesLoaded(
                api.list_saved_images(),
            )),
            RemoteJob::LoadLabels { image_id } => {
                let result = api.list_labels(&image_id);
                Message::Labels(LabelMessage::LoadCompleted { image_id, result })
            }
            RemoteJob::CreateLabel { image_id, draft } => {
                let result = store::create_and_reload(api, &image_id, &draft);
                Message::Labels(LabelMessage::MutationCompleted { image_id, result })
            }
            RemoteJob::DeleteLabel { image_id, label_id } => {
                let result = store::delete_and_reload(api, &image_id, &label_id);
                Message::Labels(LabelMessage::MutationCompleted { image_id, result })
            }
            RemoteJob::Analyze {
                image_url,
                analysis_type,
            } => {
                let result = api.analyze_image(&image_url, analysis_type);
                Message::Insight(InsightMessage::AnalysisCompleted { image_url, result })
            }
            RemoteJob::Discover => {
                Message::Insight(InsightMessage::DiscoveryCompleted(api.discover_patterns()))
            }
        }
    }
}

/// Dispatches jobs to worker threads and collects their completions.
pub struct RemoteWorker {
    api: Arc<dyn RemoteCollaborator>,
    tx: Sender<Message>,
    rx: Receiver<Message>,
}

impl RemoteWorker {
    pub fn new(api: Arc<dyn RemoteCollaborator>) -> Self {
        let (tx, rx) = unbounded();
        Self { api, tx, rx }
    }

    /// Run `job` on a fresh thread. The completion message is sent
    /// unconditionally once the call returns.
    pub fn dispatch(&self, job: RemoteJob) {
        log::debug!("dispatching remote job: {job:?}");
        let api = Arc::clone(&self.api);
        let tx = self.tx.clone();
        thread::spawn(move || {
            let completion = job.run(api.as_ref());
            if tx.send(completion).is_err() {
                log::debug!("completion dropped: application gone");
            }
        });
    }

    /// Take all completions received since the last call.
    pub fn drain(&self) -> Vec<Message> {
        self.rx.try_iter().collect()
    }

    /// Block until one completion arrives or `timeout` elapses.
    ///
    /// Used by the command-loop binary; the update cycle itself never
    /// blocks on remote I/O.
    pub fn recv_timeout(&self, timeout: std::time::Duration) -> Option<Message> {
        self.rx.recv_timeout(timeout).ok()
    }
}
