//! Pixel/normalized coordinate mathematics.
//!
//! Pure, stateless conversions between screen-pixel space and normalized
//! viewport space (0..1 anchored to image content), valid under any
//! combination of zoom, pan, and rotation. Extracted for testability.

/// A point in screen-pixel space (canvas coordinates).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

impl PixelPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A point in normalized content space.
///
/// (0,0) is the top-left of the image content, (1,1) the bottom-right,
/// regardless of the current viewport transform. Values outside [0,1]
/// describe positions outside the image content.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedPoint {
    pub x: f64,
    pub y: f64,
}

impl NormalizedPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Whether the point lies inside the image content.
    pub fn in_bounds(&self) -> bool {
        (0.0..=1.0).contains(&self.x) && (0.0..=1.0).contains(&self.y)
    }
}

/// Snapshot of the viewer's transform at one instant.
///
/// The content is laid out centered on the viewport center: a normalized
/// point is offset from the content center, scaled by `zoom`, rotated by
/// `rotation_deg`, then translated by the pan offset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportState {
    /// Current zoom level (1.0 = content at its nominal size)
    pub zoom: f64,
    /// Horizontal pan offset in pixels
    pub pan_x: f64,
    /// Vertical pan offset in pixels
    pub pan_y: f64,
    /// Rotation in degrees, clockwise
    pub rotation_deg: f64,
    /// Viewport width in pixels
    pub viewport_width: f64,
    /// Viewport height in pixels
    pub viewport_height: f64,
    /// Content width in pixels at zoom 1.0
    pub content_width: f64,
    /// Content height in pixels at zoom 1.0
    pub content_height: f64,
}

impl ViewportState {
    /// Identity transform for the given viewport and content dimensions.
    pub fn identity(
        viewport_width: f64,
        viewport_height: f64,
        content_width: f64,
        content_height: f64,
    ) -> Self {
        Self {
            zoom: 1.0,
            pan_x: 0.0,
            pan_y: 0.0,
            rotation_deg: 0.0,
            viewport_width,
            viewport_height,
            content_width,
            content_height,
        }
    }

    /// Whether the state describes an invertible transform.
    pub fn is_valid(&self) -> bool {
        self.zoom.is_finite()
            && self.zoom > 0.0
            && self.content_width > 0.0
            && self.content_height > 0.0
            && self.pan_x.is_finite()
            && self.pan_y.is_finite()
            && self.rotation_deg.is_finite()
    }

    /// Return a copy panned by the given pixel delta.
    pub fn panned_by(&self, dx: f64, dy: f64) -> Self {
        Self {
            pan_x: self.pan_x + dx,
            pan_y: self.pan_y + dy,
            ..*self
        }
    }

    /// Return a copy rotated by the given delta, normalized into [0, 360).
    pub fn rotated_by(&self, degrees: f64) -> Self {
        Self {
            rotation_deg: (self.rotation_deg + degrees).rem_euclid(360.0),
            ..*self
        }
    }

    /// Return a copy at `new_zoom` with pan adjusted so the content point
    /// under `cursor` stays under the cursor.
    pub fn zoomed_to_cursor(&self, new_zoom: f64, cursor: PixelPoint) -> Self {
        let anchor = to_normalized(cursor, self);
        let mut next = Self {
            zoom: new_zoom,
            pan_x: 0.0,
            pan_y: 0.0,
            ..*self
        };
        let landed = to_pixel(anchor, &next);
        next.pan_x = cursor.x - landed.x;
        next.pan_y = cursor.y - landed.y;
        next
    }
}

/// Convert a normalized content point to screen-pixel space.
pub fn to_pixel(point: NormalizedPoint, state: &ViewportState) -> PixelPoint {
    // Content-centered offset, scaled to pixels at the current zoom
    let cx = (point.x - 0.5) * state.content_width * state.zoom;
    let cy = (point.y - 0.5) * state.content_height * state.zoom;

    let (sin, cos) = state.rotation_deg.to_radians().sin_cos();
    let rx = cx * cos - cy * sin;
    let ry = cx * sin + cy * cos;

    PixelPoint {
        x: rx + state.pan_x + state.viewport_width / 2.0,
        y: ry + state.pan_y + state.viewport_height / 2.0,
    }
}

/// Convert a screen-pixel point to normalized content space.
///
/// Pixel input outside the visible content is allowed and yields a point
/// outside [0,1]; callers decide whether to reject it.
pub fn to_normalized(point: PixelPoint, state: &ViewportState) -> NormalizedPoint {
    let rx = point.x - state.pan_x - state.viewport_width / 2.0;
    let ry = point.y - state.pan_y - state.viewport_height / 2.0;

    // Inverse rotation
    let (sin, cos) = state.rotation_deg.to_radians().sin_cos();
    let cx = rx * cos + ry * sin;
    let cy = -rx * sin + ry * cos;

    NormalizedPoint {
        x: cx / (state.content_width * state.zoom) + 0.5,
        y: cy / (state.content_height * state.zoom) + 0.5,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-6;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < EPSILON
    }

    fn state(zoom: f64, pan_x: f64, pan_y: f64, rotation_deg: f64) -> ViewportState {
        ViewportState {
            zoom,
            pan_x,
            pan_y,
            rotation_deg,
            viewport_width: 1280.0,
            viewport_height: 800.0,
            content_width: 1024.0,
            content_height: 768.0,
        }
    }

    #[test]
    fn content_center_maps_to_viewport_center_at_identity() {
        let v = state(1.0, 0.0, 0.0, 0.0);
        let p = to_pixel(NormalizedPoint::new(0.5, 0.5), &v);
        assert!(approx_eq(p.x, 640.0));
        assert!(approx_eq(p.y, 400.0));
    }

    #[test]
    fn round_trip_identity() {
        let v = state(1.0, 0.0, 0.0, 0.0);
        let n = NormalizedPoint::new(0.3, 0.4);
        let back = to_normalized(to_pixel(n, &v), &v);
        assert!(approx_eq(back.x, n.x));
        assert!(approx_eq(back.y, n.y));
    }

    #[test]
    fn round_trip_under_zoom_pan_rotation() {
        let states = [
            state(2.5, 120.0, -45.0, 0.0),
            state(0.25, -300.0, 80.0, 90.0),
            state(7.0, 15.5, 99.25, 33.7),
            state(1.0, 0.0, 0.0, 270.0),
            state(4.2, -12.0, -800.0, 359.9),
        ];
        let points = [
            NormalizedPoint::new(0.0, 0.0),
            NormalizedPoint::new(1.0, 1.0),
            NormalizedPoint::new(0.5, 0.5),
            NormalizedPoint::new(0.123, 0.987),
            // outside content bounds is also round-trippable
            NormalizedPoint::new(-0.4, 1.7),
        ];
        for v in &states {
            for n in &points {
                let back = to_normalized(to_pixel(*n, v), v);
                assert!(
                    approx_eq(back.x, n.x) && approx_eq(back.y, n.y),
                    "round trip failed for {n:?} under {v:?}: got {back:?}"
                );
            }
        }
    }

    #[test]
    fn pixel_outside_content_yields_out_of_bounds_normalized() {
        let v = state(1.0, 0.0, 0.0, 0.0);
        // Far left of the content's left edge
        let n = to_normalized(PixelPoint::new(-500.0, 400.0), &v);
        assert!(n.x < 0.0);
        assert!(!n.in_bounds());
    }

    #[test]
    fn zoom_to_cursor_keeps_anchor_fixed() {
        let v = state(1.0, 50.0, 30.0, 45.0);
        let cursor = PixelPoint::new(150.0, 120.0);
        let anchor = to_normalized(cursor, &v);

        let zoomed = v.zoomed_to_cursor(2.0, cursor);
        assert!(approx_eq(zoomed.zoom, 2.0));

        let anchor_after = to_normalized(cursor, &zoomed);
        assert!(approx_eq(anchor.x, anchor_after.x));
        assert!(approx_eq(anchor.y, anchor_after.y));
    }

    #[test]
    fn zoom_to_cursor_at_viewport_center_preserves_center() {
        let v = state(1.0, 0.0, 0.0, 0.0);
        let center = PixelPoint::new(640.0, 400.0);
        let zoomed = v.zoomed_to_cursor(3.0, center);
        assert!(approx_eq(zoomed.pan_x, 0.0));
        assert!(approx_eq(zoomed.pan_y, 0.0));
    }

    #[test]
    fn panned_by_accumulates() {
        let v = state(1.0, 10.0, 20.0, 0.0).panned_by(5.0, -10.0);
        assert!(approx_eq(v.pan_x, 15.0));
        assert!(approx_eq(v.pan_y, 10.0));
    }

    #[test]
    fn rotated_by_wraps_into_degrees_range() {
        let v = state(1.0, 0.0, 0.0, 270.0).rotated_by(180.0);
        assert!(approx_eq(v.rotation_deg, 90.0));
        let w = state(1.0, 0.0, 0.0, 0.0).rotated_by(-90.0);
        assert!(approx_eq(w.rotation_deg, 270.0));
    }

    #[test]
    fn invalid_states_are_rejected() {
        assert!(state(1.0, 0.0, 0.0, 0.0).is_valid());
        assert!(!state(0.0, 0.0, 0.0, 0.0).is_valid());
        assert!(!state(f64::NAN, 0.0, 0.0, 0.0).is_valid());
        let mut v = state(1.0, 0.0, 0.0, 0.0);
        v.content_width = 0.0;
        assert!(!v.is_valid());
    }
}
