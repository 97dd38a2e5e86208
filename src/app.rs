//! Application core: explicit state plus a single update cycle.
//!
//! All mutable state lives in [`App`], split into per-component slices;
//! every change goes through [`App::update`]. Remote calls are dispatched
//! to worker threads and their completions re-enter the same update cycle
//! via [`App::poll`], so application logic stays single-threaded while I/O
//! overlaps.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use crate::handlers;
use crate::message::{GalleryMessage, LabelMessage, Message, PlacementMessage, ViewerMessage};
use crate::model::ImageRecord;
use crate::placement::PlacementController;
use crate::remote::{RemoteCollaborator, RemoteJob, RemoteWorker};
use crate::store::AnnotationStore;
use crate::tasks::TaskTracker;
use crate::viewer::{ViewerFactory, ViewerOptions, ViewerSession};
use crate::viewport::{self, NormalizedPoint, PixelPoint};

/// Search box and image gallery slice.
#[derive(Debug, Default)]
pub struct GalleryState {
    /// Current search input text.
    pub query: String,
    /// Images shown in the gallery (search results or saved images).
    pub images: Vec<ImageRecord>,
}

impl GalleryState {
    /// Find a gallery image by id.
    pub fn find(&self, image_id: &str) -> Option<&ImageRecord> {
        self.images.iter().find(|img| img.id == image_id)
    }
}

/// A dismissible text panel (AI analysis, pattern discoveries).
#[derive(Debug, Default)]
pub struct TextPanel {
    pub text: String,
    pub visible: bool,
}

impl TextPanel {
    /// Replace the content and show the panel.
    pub fn show(&mut self, text: String) {
        self.text = text;
        self.visible = true;
    }

    /// Hide and clear, e.g. when the owning image changes.
    pub fn clear(&mut self) {
        self.text.clear();
        self.visible = false;
    }
}

/// The explorer core.
pub struct App {
    pub gallery: GalleryState,
    /// Cached copy of the currently open image, if any.
    pub selected: Option<ImageRecord>,
    pub session: ViewerSession,
    pub store: AnnotationStore,
    pub placement: PlacementController,
    pub tasks: TaskTracker,
    pub analysis: TextPanel,
    pub patterns: TextPanel,
    notifications: Vec<String>,
    worker: RemoteWorker,
    /// Anchor staged by the canvas interaction handler, consumed by the
    /// placement controller within the same update.
    staged_anchor: Rc<RefCell<Option<NormalizedPoint>>>,
    /// Whether the in-flight label mutation is the draft submission
    /// (as opposed to a delete), so success knows to clear placement.
    pending_submission: bool,
}

impl App {
    /// Build the core and kick off the startup gallery load.
    pub fn new(
        api: Arc<dyn RemoteCollaborator>,
        factory: Box<dyn ViewerFactory>,
        options: ViewerOptions,
    ) -> Self {
        let worker = RemoteWorker::new(api);
        worker.dispatch(RemoteJob::LoadSavedImages);
        Self {
            gallery: GalleryState::default(),
            selected: None,
            session: ViewerSession::new(factory, options),
            store: AnnotationStore::new(),
            placement: PlacementController::new(),
            tasks: TaskTracker::new(),
            analysis: TextPanel::default(),
            patterns: TextPanel::default(),
            notifications: Vec::new(),
            worker,
            staged_anchor: Rc::new(RefCell::new(None)),
            pending_submission: false,
        }
    }

    /// Apply one message to the state.
    pub fn update(&mut self, msg: Message) {
        // Completions release their task slot before the payload is
        // examined; this is the single finally-style release point.
        if let Some(kind) = msg.completed_kind() {
            self.tasks.end(kind);
        }

        match msg {
            Message::Gallery(GalleryMessage::ImageSelected(id)) => self.select_image(&id),
            Message::Gallery(GalleryMessage::ImageDeselected) => self.deselect_image(),
            Message::Gallery(inner) => {
                let job = handlers::handle_gallery(inner, &mut self.gallery, &mut self.notifications);
                if let Some(job) = job {
                    self.submit(job);
                }
            }
            Message::Viewer(ViewerMessage::CanvasClicked(point)) => self.canvas_clicked(point),
            Message::Viewer(inner) => handlers::handle_viewer_nav(inner, &mut self.session),
            Message::Labels(inner) => self.handle_labels(inner),
            Message::Placement(PlacementMessage::Submitted) => self.submit_draft(),
            Message::Placement(inner) => handlers::handle_placement(inner, &mut self.placement),
            Message::Insight(inner) => {
                let job = handlers::handle_insight(
                    inner,
                    &mut self.analysis,
                    &mut self.patterns,
                    &mut self.notifications,
                    self.selected.as_ref().map(|img| img.url.as_str()),
                );
                if let Some(job) = job {
                    self.submit(job);
                }
            }
        }
    }

    /// Drain worker completions into the update cycle. Returns the number
    /// of messages processed.
    pub fn poll(&mut self) -> usize {
        let completions = self.worker.drain();
        let count = completions.len();
        for msg in completions {
            self.update(msg);
        }
        count
    }

    /// Block up to `timeout` for one completion and process everything
    /// available. For hosts without their own tick loop.
    pub fn poll_blocking(&mut self, timeout: std::time::Duration) -> usize {
        match self.worker.recv_timeout(timeout) {
            Some(msg) => {
                self.update(msg);
                1 + self.poll()
            }
            None => 0,
        }
    }

    /// Take the accumulated user-visible notifications.
    pub fn take_notifications(&mut self) -> Vec<String> {
        std::mem::take(&mut self.notifications)
    }

    /// Dispatch a job unless its task kind is already in flight.
    fn submit(&mut self, job: RemoteJob) -> bool {
        if let Some(kind) = job.kind() {
            if !self.tasks.begin(kind) {
                return false;
            }
        }
        self.worker.dispatch(job);
        true
    }

    /// Open an image: tear down the old viewer, bind the new one, and
    /// load its labels. The analysis panel and label store belong to the
    /// previous image and are evicted first.
    fn select_image(&mut self, image_id: &str) {
        let Some(record) = self.gallery.find(image_id).cloned() else {
            log::warn!("selected unknown image {image_id}");
            return;
        };

        self.placement.cancel();
        self.analysis.clear();
        self.store.evict();

        match self.session.bind(&record.url) {
            Ok(()) => {
                self.install_interaction_handler();
                self.store.bind_image(&record.id);
                log::info!("opened image {} ('{}')", record.id, record.title);
                self.selected = Some(record);
                self.submit(RemoteJob::LoadLabels {
                    image_id: image_id.to_string(),
                });
            }
            Err(e) => {
                self.selected = None;
                self.notifications.push(e.to_string());
            }
        }
    }

    fn deselect_image(&mut self) {
        self.placement.cancel();
        self.analysis.clear();
        self.store.evict();
        self.session.unbind();
        self.selected = None;
    }

    /// Wire the session's single interaction handler to stage normalized
    /// anchors. Re-bound on every image switch since `bind` drops the
    /// previous handler with its instance.
    fn install_interaction_handler(&mut self) {
        let cell = Rc::clone(&self.staged_anchor);
        self.session
            .set_interaction_handler(Box::new(move |pixel, state| {
                let anchor = viewport::to_normalized(pixel, state);
                *cell.borrow_mut() = Some(anchor);
            }));
    }

    /// Route a canvas click through the session handler and, when placing,
    /// into the placement controller.
    fn canvas_clicked(&mut self, point: PixelPoint) {
        if !self.session.dispatch_interaction(point) {
            return;
        }
        let staged = self.staged_anchor.borrow_mut().take();
        if let Some(anchor) = staged {
            if self.placement.is_active() {
                self.placement.place_anchor(anchor);
            }
        }
    }

    fn handle_labels(&mut self, msg: LabelMessage) {
        match msg {
            LabelMessage::DeleteRequested(label_id) => {
                let Some(image_id) = self.store.image_id().map(str::to_string) else {
                    return;
                };
                self.submit(RemoteJob::DeleteLabel { image_id, label_id });
            }
            LabelMessage::LoadCompleted { image_id, result } => match result {
                Ok(labels) => {
                    self.store.apply_loaded(&image_id, labels);
                }
                Err(e) => {
                    // Previous collection stays; the view goes stale
                    // rather than flashing empty.
                    log::warn!("label load failed for {image_id}: {e}");
                    self.notifications.push(e.to_string());
                }
            },
            LabelMessage::MutationCompleted { image_id, result } => {
                let was_submission = std::mem::take(&mut self.pending_submission);
                match result {
                    Ok(reload) => {
                        if was_submission {
                            // Collaborator confirmed the draft; placement
                            // returns to Inactive. Retrying now would
                            // persist a duplicate.
                            self.placement.clear();
                        }
                        match reload {
                            Ok(labels) => {
                                self.store.apply_loaded(&image_id, labels);
                            }
                            Err(e) => {
                                // Mutation landed but the fresh list is
                                // unavailable; keep the previous collection.
                                self.notifications.push(e.to_string());
                            }
                        }
                    }
                    Err(e) => {
                        // No remote change; a submission stays Drafting so
                        // the user can retry without re-entering data.
                        self.notifications.push(e.to_string());
                    }
                }
            }
        }
    }

    /// Submit the live draft to the collaborator.
    fn submit_draft(&mut self) {
        let Some(image_id) = self.store.image_id().map(str::to_string) else {
            log::debug!("draft submit ignored: no image open");
            return;
        };
        let Some(draft) = self.placement.submission() else {
            log::debug!("draft submit ignored: draft not ready");
            return;
        };
        if self.submit(RemoteJob::CreateLabel { image_id, draft }) {
            self.pending_submission = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RemoteError;
    use crate::message::InsightMessage;
    use crate::model::{CoercedDraft, Label};
    use crate::placement::{DraftField, PlacementState};
    use crate::remote::{AnalysisType, MemoryCollaborator};
    use crate::viewer::SoftwareViewerFactory;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::{Duration, Instant};

    /// Collaborator wrapper that counts calls, for suppression tests.
    struct Counting {
        inner: MemoryCollaborator,
        analyze_calls: AtomicUsize,
    }

    impl Counting {
        fn new(inner: MemoryCollaborator) -> Self {
            Self {
                inner,
                analyze_calls: AtomicUsize::new(0),
            }
        }
    }

    impl RemoteCollaborator for Counting {
        fn search_images(
            &self,
            query: &str,
            media_type: crate::remote::MediaType,
        ) -> Result<Vec<ImageRecord>, RemoteError> {
            self.inner.search_images(query, media_type)
        }
        fn list_saved_images(&self) -> Result<Vec<ImageRecord>, RemoteError> {
            self.inner.list_saved_images()
        }
        fn list_labels(&self, image_id: &str) -> Result<Vec<Label>, RemoteError> {
            self.inner.list_labels(image_id)
        }
        fn create_label(
            &self,
            image_id: &str,
            draft: &CoercedDraft,
        ) -> Result<Label, RemoteError> {
            self.inner.create_label(image_id, draft)
        }
        fn delete_label(&self, image_id: &str, label_id: &str) -> Result<(), RemoteError> {
            self.inner.delete_label(image_id, label_id)
        }
        fn analyze_image(
            &self,
            image_url: &str,
            analysis_type: AnalysisType,
        ) -> Result<String, RemoteError> {
            self.analyze_calls.fetch_add(1, Ordering::SeqCst);
            self.inner.analyze_image(image_url, analysis_type)
        }
        fn discover_patterns(&self) -> Result<String, RemoteError> {
            self.inner.discover_patterns()
        }
    }

    /// Collaborator whose label-list reads can be made to fail on demand.
    struct FlakyList {
        inner: MemoryCollaborator,
        fail_lists: AtomicBool,
    }

    impl RemoteCollaborator for FlakyList {
        fn search_images(
            &self,
            query: &str,
            media_type: crate::remote::MediaType,
        ) -> Result<Vec<ImageRecord>, RemoteError> {
            self.inner.search_images(query, media_type)
        }
        fn list_saved_images(&self) -> Result<Vec<ImageRecord>, RemoteError> {
            self.inner.list_saved_images()
        }
        fn list_labels(&self, image_id: &str) -> Result<Vec<Label>, RemoteError> {
            if self.fail_lists.load(Ordering::SeqCst) {
                return Err(RemoteError::Load("connection reset".to_string()));
            }
            self.inner.list_labels(image_id)
        }
        fn create_label(
            &self,
            image_id: &str,
            draft: &CoercedDraft,
        ) -> Result<Label, RemoteError> {
            self.inner.create_label(image_id, draft)
        }
        fn delete_label(&self, image_id: &str, label_id: &str) -> Result<(), RemoteError> {
            self.inner.delete_label(image_id, label_id)
        }
        fn analyze_image(
            &self,
            image_url: &str,
            analysis_type: AnalysisType,
        ) -> Result<String, RemoteError> {
            self.inner.analyze_image(image_url, analysis_type)
        }
        fn discover_patterns(&self) -> Result<String, RemoteError> {
            self.inner.discover_patterns()
        }
    }

    fn app_with(api: Arc<dyn RemoteCollaborator>) -> App {
        App::new(api, Box::new(SoftwareViewerFactory), ViewerOptions::default())
    }

    fn demo_app() -> App {
        let mut app = app_with(Arc::new(MemoryCollaborator::with_demo_gallery()));
        pump_until(&mut app, |a| !a.gallery.images.is_empty());
        app
    }

    /// Poll until `cond` holds or a deadline passes.
    fn pump_until(app: &mut App, cond: impl Fn(&App) -> bool) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while !cond(app) {
            assert!(Instant::now() < deadline, "condition not reached in time");
            app.poll_blocking(Duration::from_millis(20));
        }
    }

    fn select_first_matching(app: &mut App, query: &str) -> String {
        app.update(Message::Gallery(GalleryMessage::QueryChanged(
            query.to_string(),
        )));
        app.update(Message::Gallery(GalleryMessage::SearchSubmitted));
        pump_until(app, |a| !a.tasks.is_busy(crate::tasks::TaskKind::Search));
        let id = app.gallery.images[0].id.clone();
        app.update(Message::Gallery(GalleryMessage::ImageSelected(id.clone())));
        pump_until(app, |a| a.store.is_synced());
        id
    }

    #[test]
    fn startup_populates_gallery_from_saved_images() {
        let app = demo_app();
        assert_eq!(app.gallery.images.len(), 3);
        assert!(app.selected.is_none());
    }

    #[test]
    fn startup_with_empty_collection_starts_empty() {
        let mut app = app_with(Arc::new(MemoryCollaborator::new()));
        app.poll_blocking(Duration::from_secs(1));
        assert!(app.gallery.images.is_empty());
        assert!(app.take_notifications().is_empty());
    }

    #[test]
    fn search_select_place_and_submit_label() {
        let mut app = demo_app();

        let image_id = select_first_matching(&mut app, "nebula");
        assert_eq!(app.gallery.images.len(), 1);
        assert_eq!(app.session.bound_url(), Some(app.selected.as_ref().unwrap().url.as_str()));

        // enter placing mode and click where normalized (0.3, 0.4) sits
        app.update(Message::Placement(PlacementMessage::Toggled));
        let state = app.session.viewport_state().unwrap();
        let click = viewport::to_pixel(NormalizedPoint::new(0.3, 0.4), &state);
        app.update(Message::Viewer(ViewerMessage::CanvasClicked(click)));

        let draft = app.placement.draft().expect("draft should be staged");
        let anchor = draft.anchor.unwrap();
        assert!((anchor.x - 0.3).abs() < 1e-6);
        assert!((anchor.y - 0.4).abs() < 1e-6);

        app.update(Message::Placement(PlacementMessage::FieldChanged(
            DraftField::Name,
            "Core".to_string(),
        )));
        app.update(Message::Placement(PlacementMessage::Submitted));
        pump_until(&mut app, |a| !a.store.labels().is_empty());

        let label = &app.store.labels()[0];
        assert_eq!(label.label, "Core");
        assert!((label.x - 0.3).abs() < 1e-6);
        assert!((label.y - 0.4).abs() < 1e-6);
        assert_eq!(label.width, 0.0);
        assert_eq!(label.height, 0.0);
        assert_eq!(*app.placement.state(), PlacementState::Inactive);
        assert_eq!(app.store.image_id(), Some(image_id.as_str()));
    }

    #[test]
    fn submit_without_name_is_refused_and_draft_survives() {
        let mut app = demo_app();
        select_first_matching(&mut app, "nebula");

        app.update(Message::Placement(PlacementMessage::Toggled));
        let state = app.session.viewport_state().unwrap();
        let click = viewport::to_pixel(NormalizedPoint::new(0.5, 0.5), &state);
        app.update(Message::Viewer(ViewerMessage::CanvasClicked(click)));
        app.update(Message::Placement(PlacementMessage::Submitted));

        // nothing dispatched, still drafting
        assert!(!app.tasks.is_busy(crate::tasks::TaskKind::LabelMutation));
        assert!(app.placement.draft().is_some());
    }

    #[test]
    fn duplicate_analysis_request_is_suppressed() {
        let api = Arc::new(Counting::new(MemoryCollaborator::with_demo_gallery()));
        let mut app = app_with(Arc::clone(&api) as Arc<dyn RemoteCollaborator>);
        pump_until(&mut app, |a| !a.gallery.images.is_empty());
        select_first_matching(&mut app, "nebula");

        app.update(Message::Insight(InsightMessage::AnalysisRequested(
            AnalysisType::General,
        )));
        app.update(Message::Insight(InsightMessage::AnalysisRequested(
            AnalysisType::General,
        )));
        pump_until(&mut app, |a| a.analysis.visible);

        assert_eq!(api.analyze_calls.load(Ordering::SeqCst), 1);
        assert!(!app.tasks.is_busy(crate::tasks::TaskKind::Analysis));

        // slot released: a subsequent request proceeds
        app.update(Message::Insight(InsightMessage::AnalysisRequested(
            AnalysisType::Features,
        )));
        assert!(app.tasks.is_busy(crate::tasks::TaskKind::Analysis));
        pump_until(&mut app, |a| !a.tasks.any_busy());
        assert_eq!(api.analyze_calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn stale_label_load_is_discarded() {
        let mut app = demo_app();
        select_first_matching(&mut app, "nebula");

        let stale = Label {
            id: "ghost".to_string(),
            label: "Ghost".to_string(),
            description: String::new(),
            category: String::new(),
            x: 0.1,
            y: 0.1,
            width: 0.0,
            height: 0.0,
        };
        app.update(Message::Labels(LabelMessage::LoadCompleted {
            image_id: "some-other-image".to_string(),
            result: Ok(vec![stale]),
        }));
        assert!(app.store.labels().is_empty());
    }

    #[test]
    fn delete_already_deleted_label_converges() {
        let api = Arc::new(MemoryCollaborator::with_demo_gallery());
        let draft = CoercedDraft {
            label: "Doomed".to_string(),
            description: String::new(),
            category: String::new(),
            x: 0.2,
            y: 0.2,
            width: 0.0,
            height: 0.0,
        };

        let mut app = app_with(Arc::clone(&api) as Arc<dyn RemoteCollaborator>);
        pump_until(&mut app, |a| !a.gallery.images.is_empty());
        let image_id = select_first_matching(&mut app, "nebula");

        let created = api.create_label(&image_id, &draft).unwrap();
        app.update(Message::Labels(LabelMessage::DeleteRequested(
            created.id.clone(),
        )));
        pump_until(&mut app, |a| !a.tasks.any_busy());

        // deleted remotely behind our back, delete again via the app
        assert!(api.list_labels(&image_id).unwrap().is_empty());
        app.update(Message::Labels(LabelMessage::DeleteRequested(created.id)));
        pump_until(&mut app, |a| !a.tasks.any_busy());

        assert!(app.store.labels().is_empty());
        assert!(app.take_notifications().is_empty());
    }

    #[test]
    fn failed_submission_keeps_draft_for_retry() {
        let mut app = demo_app();
        select_first_matching(&mut app, "nebula");

        app.update(Message::Placement(PlacementMessage::Toggled));
        let state = app.session.viewport_state().unwrap();
        let click = viewport::to_pixel(NormalizedPoint::new(0.5, 0.5), &state);
        app.update(Message::Viewer(ViewerMessage::CanvasClicked(click)));
        app.update(Message::Placement(PlacementMessage::FieldChanged(
            DraftField::Name,
            "Retry me".to_string(),
        )));

        // inject a failed mutation completion as if the backend refused it
        app.update(Message::Labels(LabelMessage::MutationCompleted {
            image_id: app.store.image_id().unwrap().to_string(),
            result: Err(RemoteError::Persist("backend down".to_string())),
        }));

        assert!(app.placement.draft().is_some());
        let notes = app.take_notifications();
        assert_eq!(notes.len(), 1);
        assert!(notes[0].contains("backend down"));
    }

    #[test]
    fn reload_failure_after_create_clears_draft_without_duplicates() {
        let api = Arc::new(FlakyList {
            inner: MemoryCollaborator::with_demo_gallery(),
            fail_lists: AtomicBool::new(false),
        });
        let mut app = app_with(Arc::clone(&api) as Arc<dyn RemoteCollaborator>);
        pump_until(&mut app, |a| !a.gallery.images.is_empty());
        let image_id = select_first_matching(&mut app, "nebula");

        app.update(Message::Placement(PlacementMessage::Toggled));
        let state = app.session.viewport_state().unwrap();
        let click = viewport::to_pixel(NormalizedPoint::new(0.3, 0.4), &state);
        app.update(Message::Viewer(ViewerMessage::CanvasClicked(click)));
        app.update(Message::Placement(PlacementMessage::FieldChanged(
            DraftField::Name,
            "Core".to_string(),
        )));

        api.fail_lists.store(true, Ordering::SeqCst);
        app.update(Message::Placement(PlacementMessage::Submitted));
        pump_until(&mut app, |a| !a.tasks.any_busy());

        // the create landed, so the draft is done; only the reload failed
        assert_eq!(*app.placement.state(), PlacementState::Inactive);
        assert_eq!(api.inner.list_labels(&image_id).unwrap().len(), 1);
        // previous local view is kept rather than flashing empty
        assert!(app.store.labels().is_empty());
        let notes = app.take_notifications();
        assert_eq!(notes.len(), 1);
        assert!(notes[0].contains("connection reset"));
    }

    #[test]
    fn switching_images_evicts_labels_and_analysis() {
        let mut app = demo_app();
        select_first_matching(&mut app, "nebula");

        app.update(Message::Insight(InsightMessage::AnalysisRequested(
            AnalysisType::General,
        )));
        pump_until(&mut app, |a| a.analysis.visible);

        app.update(Message::Gallery(GalleryMessage::ImageDeselected));
        assert!(app.selected.is_none());
        assert!(!app.session.is_bound());
        assert!(app.store.labels().is_empty());
        assert!(!app.analysis.visible);
        assert!(app.analysis.text.is_empty());
    }

    #[test]
    fn selecting_unknown_image_is_ignored() {
        let mut app = demo_app();
        app.update(Message::Gallery(GalleryMessage::ImageSelected(
            "no-such-id".to_string(),
        )));
        assert!(app.selected.is_none());
        assert!(!app.session.is_bound());
    }

    #[test]
    fn click_outside_placing_mode_does_not_draft() {
        let mut app = demo_app();
        select_first_matching(&mut app, "nebula");

        let state = app.session.viewport_state().unwrap();
        let click = viewport::to_pixel(NormalizedPoint::new(0.5, 0.5), &state);
        app.update(Message::Viewer(ViewerMessage::CanvasClicked(click)));
        assert_eq!(*app.placement.state(), PlacementState::Inactive);
    }
}
