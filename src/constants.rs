//! Application-wide constants.
//!
//! This module centralizes hardcoded values for zoom behavior, viewer
//! defaults, and label drafting.

/// Zoom behavior constants.
pub mod zoom {
    /// Multiplier applied per zoom-in/zoom-out step
    pub const FACTOR: f64 = 1.2;
    /// Minimum zoom level (matches the viewer's min zoom option)
    pub const MIN: f64 = 0.1;
    /// Maximum zoom level
    pub const MAX: f64 = 10.0;
}

/// Deep-zoom viewer option defaults.
pub mod viewer {
    /// Seconds for zoom/pan spring animations
    pub const ANIMATION_TIME: f64 = 0.5;
    /// Seconds for tile blend-in
    pub const BLEND_TIME: f64 = 0.1;
    /// Fraction of the image that must stay visible while panning
    pub const VISIBILITY_RATIO: f64 = 0.1;
    /// Stiffness of the pan/zoom springs
    pub const SPRING_STIFFNESS: f64 = 6.5;
    /// Degrees per rotate-left/rotate-right step
    pub const ROTATE_STEP_DEG: f64 = 90.0;
    /// Default viewport width in pixels for headless backends
    pub const DEFAULT_VIEWPORT_WIDTH: f64 = 1280.0;
    /// Default viewport height in pixels for headless backends
    pub const DEFAULT_VIEWPORT_HEIGHT: f64 = 800.0;
}

/// Label draft defaults used when numeric input cannot be parsed.
pub mod draft {
    /// Fallback normalized anchor coordinate (image center)
    pub const DEFAULT_ANCHOR: f64 = 0.5;
    /// Fallback normalized extent (point label, no area)
    pub const DEFAULT_EXTENT: f64 = 0.0;
}
