//! Deep-zoom viewer session and backends.
//!
//! A [`ViewerSession`] owns at most one live viewer instance bound to one
//! image URL. Binding a new image tears the old instance down before the
//! replacement is constructed; from the caller's perspective `bind` is
//! atomic, and a construction failure leaves the session cleanly unbound.
//!
//! The actual deep-zoom library sits behind the [`ViewerInstance`] /
//! [`ViewerFactory`] traits. [`SoftwareViewer`] is the built-in backend:
//! it tracks the viewport transform (zoom/pan/rotate with clamping) without
//! a rendering surface, which is all the annotation core needs.

use serde::{Deserialize, Serialize};

use crate::constants::{viewer as viewer_const, zoom as zoom_const};
use crate::error::ViewerError;
use crate::viewport::{PixelPoint, ViewportState};

/// Construction options for a viewer instance.
///
/// Defaults mirror the deep-zoom configuration the explorer has always used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerOptions {
    /// Seconds for zoom/pan spring animations
    pub animation_time: f64,
    /// Seconds for tile blend-in
    pub blend_time: f64,
    /// Minimum zoom level
    pub min_zoom: f64,
    /// Maximum zoom level
    pub max_zoom: f64,
    /// Fraction of the image kept visible while panning
    pub visibility_ratio: f64,
    /// Stiffness of the pan/zoom springs
    pub spring_stiffness: f64,
    /// Whether panning is constrained to the content bounds
    pub constrain_during_pan: bool,
    /// Single click zooms (off: clicks are reserved for placement)
    pub click_to_zoom: bool,
    /// Double click zooms
    pub double_click_to_zoom: bool,
    /// Scroll wheel zooms
    pub scroll_to_zoom: bool,
    /// Viewport width in pixels for headless backends
    pub viewport_width: f64,
    /// Viewport height in pixels for headless backends
    pub viewport_height: f64,
}

impl Default for ViewerOptions {
    fn default() -> Self {
        Self {
            animation_time: viewer_const::ANIMATION_TIME,
            blend_time: viewer_const::BLEND_TIME,
            min_zoom: zoom_const::MIN,
            max_zoom: zoom_const::MAX,
            visibility_ratio: viewer_const::VISIBILITY_RATIO,
            spring_stiffness: viewer_const::SPRING_STIFFNESS,
            constrain_during_pan: false,
            click_to_zoom: false,
            double_click_to_zoom: true,
            scroll_to_zoom: true,
            viewport_width: viewer_const::DEFAULT_VIEWPORT_WIDTH,
            viewport_height: viewer_const::DEFAULT_VIEWPORT_HEIGHT,
        }
    }
}

/// One live deep-zoom viewer bound to one image source.
///
/// Native resources are released on drop; no component may hold a reference
/// to a torn-down instance.
pub trait ViewerInstance {
    /// The image source this instance renders.
    fn source_url(&self) -> &str;

    /// Snapshot of the current transform.
    fn viewport_state(&self) -> ViewportState;

    /// Zoom by one step toward the viewport center.
    fn zoom_in(&mut self);

    /// Zoom out by one step.
    fn zoom_out(&mut self);

    /// Zoom by `factor` keeping the content under `cursor` fixed.
    fn zoom_at(&mut self, cursor: PixelPoint, factor: f64);

    /// Pan by a pixel delta.
    fn pan_by(&mut self, dx: f64, dy: f64);

    /// Rotate by a degree delta.
    fn rotate_by(&mut self, degrees: f64);

    /// Reset zoom, pan, and rotation to the home view.
    fn reset_view(&mut self);
}

/// Constructs viewer instances for a given image source.
pub trait ViewerFactory {
    /// Build a live instance, or fail with [`ViewerError::Init`].
    fn create(
        &self,
        source_url: &str,
        options: &ViewerOptions,
    ) -> Result<Box<dyn ViewerInstance>, ViewerError>;
}

// ============================================================================
// Software backend
// ============================================================================

/// Headless viewer: full transform bookkeeping, no rendering surface.
pub struct SoftwareViewer {
    source_url: String,
    state: ViewportState,
    min_zoom: f64,
    max_zoom: f64,
}

impl SoftwareViewer {
    fn new(source_url: &str, options: &ViewerOptions) -> Self {
        // Content is fit to the viewport at zoom 1; the normalized space is
        // anchored to content, so the nominal pixel size is arbitrary.
        let state = ViewportState::identity(
            options.viewport_width,
            options.viewport_height,
            options.viewport_width,
            options.viewport_height,
        );
        Self {
            source_url: source_url.to_string(),
            state,
            min_zoom: options.min_zoom,
            max_zoom: options.max_zoom,
        }
    }

    fn clamp_zoom(&self, zoom: f64) -> f64 {
        zoom.clamp(self.min_zoom, self.max_zoom)
    }
}

impl ViewerInstance for SoftwareViewer {
    fn source_url(&self) -> &str {
        &self.source_url
    }

    fn viewport_state(&self) -> ViewportState {
        self.state
    }

    fn zoom_in(&mut self) {
        self.state.zoom = self.clamp_zoom(self.state.zoom * zoom_const::FACTOR);
    }

    fn zoom_out(&mut self) {
        self.state.zoom = self.clamp_zoom(self.state.zoom / zoom_const::FACTOR);
    }

    fn zoom_at(&mut self, cursor: PixelPoint, factor: f64) {
        let new_zoom = self.clamp_zoom(self.state.zoom * factor);
        self.state = self.state.zoomed_to_cursor(new_zoom, cursor);
    }

    fn pan_by(&mut self, dx: f64, dy: f64) {
        self.state = self.state.panned_by(dx, dy);
    }

    fn rotate_by(&mut self, degrees: f64) {
        self.state = self.state.rotated_by(degrees);
    }

    fn reset_view(&mut self) {
        self.state = ViewportState::identity(
            self.state.viewport_width,
            self.state.viewport_height,
            self.state.content_width,
            self.state.content_height,
        );
    }
}

/// Factory for [`SoftwareViewer`] instances.
#[derive(Debug, Default)]
pub struct SoftwareViewerFactory;

impl ViewerFactory for SoftwareViewerFactory {
    fn create(
        &self,
        source_url: &str,
        options: &ViewerOptions,
    ) -> Result<Box<dyn ViewerInstance>, ViewerError> {
        if source_url.trim().is_empty() {
            return Err(ViewerError::init(source_url, "empty image source URL"));
        }
        Ok(Box::new(SoftwareViewer::new(source_url, options)))
    }
}

// ============================================================================
// Session
// ============================================================================

/// Callback invoked with pixel-space interaction points and the transform
/// current at dispatch time.
pub type InteractionHandler = Box<dyn FnMut(PixelPoint, &ViewportState)>;

/// Exclusive pairing of one image URL with one live viewer instance.
///
/// Replaced wholesale on every image switch, never mutated in place.
struct ViewerBinding {
    image_url: String,
    instance: Box<dyn ViewerInstance>,
}

/// Owns the viewer lifecycle across image switches.
pub struct ViewerSession {
    factory: Box<dyn ViewerFactory>,
    options: ViewerOptions,
    binding: Option<ViewerBinding>,
    handler: Option<InteractionHandler>,
}

impl ViewerSession {
    pub fn new(factory: Box<dyn ViewerFactory>, options: ViewerOptions) -> Self {
        Self {
            factory,
            options,
            binding: None,
            handler: None,
        }
    }

    /// Bind the session to `image_url`, replacing any prior instance.
    ///
    /// The old instance (and the handler wired to it) is torn down before
    /// the replacement is constructed. On failure the session is unbound.
    pub fn bind(&mut self, image_url: &str) -> Result<(), ViewerError> {
        if let Some(old) = self.binding.take() {
            log::debug!("tearing down viewer for '{}'", old.image_url);
            drop(old);
        }
        // Handlers are registered against one instance; never carry one
        // across a rebind.
        self.handler = None;

        match self.factory.create(image_url, &self.options) {
            Ok(instance) => {
                log::info!("viewer bound to '{image_url}'");
                self.binding = Some(ViewerBinding {
                    image_url: image_url.to_string(),
                    instance,
                });
                Ok(())
            }
            Err(e) => {
                log::warn!("viewer construction failed: {e}");
                Err(e)
            }
        }
    }

    /// Tear down the current instance. No-op when already unbound.
    pub fn unbind(&mut self) {
        if let Some(old) = self.binding.take() {
            log::debug!("viewer unbound from '{}'", old.image_url);
        }
        self.handler = None;
    }

    /// Whether the session currently owns a live instance.
    pub fn is_bound(&self) -> bool {
        self.binding.is_some()
    }

    /// URL of the bound image, if any.
    pub fn bound_url(&self) -> Option<&str> {
        self.binding.as_ref().map(|b| b.image_url.as_str())
    }

    /// Register the interaction handler. Re-registration replaces the
    /// previous handler; handlers never stack.
    pub fn set_interaction_handler(&mut self, handler: InteractionHandler) {
        self.handler = Some(handler);
    }

    /// Forward a pixel-space interaction point to the owned handler.
    ///
    /// Returns `true` if a handler received the point; `false` while
    /// unbound or before a handler is registered.
    pub fn dispatch_interaction(&mut self, point: PixelPoint) -> bool {
        let Some(binding) = &self.binding else {
            log::debug!("interaction ignored: session unbound");
            return false;
        };
        let Some(handler) = &mut self.handler else {
            return false;
        };
        let state = binding.instance.viewport_state();
        handler(point, &state);
        true
    }

    /// Current transform snapshot, if bound.
    pub fn viewport_state(&self) -> Option<ViewportState> {
        self.binding.as_ref().map(|b| b.instance.viewport_state())
    }

    /// Mutable access to the live instance for navigation commands.
    pub fn instance_mut(&mut self) -> Option<&mut (dyn ViewerInstance + 'static)> {
        self.binding.as_mut().map(|b| b.instance.as_mut())
    }
}
