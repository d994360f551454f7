//! Keeps a tiling background pattern aligned with the pan/zoom transform
//! without repainting the canvas. It runs on its own frame loop and only
//! touches the surface when the pattern actually moved.

use web_sys::HtmlElement;

use super::viewport::Viewport;

pub const DEFAULT_GAP: f64 = 24.0;
const ZOOM_EPSILON: f64 = 0.0001;
const OFFSET_EPSILON: f64 = 0.5;

/// Whatever displays the pattern.
pub trait PatternSurface {
	fn set_pattern(&mut self, offset_x: f64, offset_y: f64, tile_size: f64);
	fn set_visible(&mut self, visible: bool);
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PatternFrame {
	pub zoom: f64,
	pub offset_x: f64,
	pub offset_y: f64,
	pub tile_size: f64,
}

impl PatternFrame {
	pub fn compute(viewport: &Viewport, gap: f64) -> Self {
		let zoom = viewport.zoom();
		let tile_size = gap * zoom;
		let (world_x, world_y) = viewport.graph_center();
		let (center_x, center_y) = (viewport.width / 2.0, viewport.height / 2.0);
		Self {
			zoom,
			offset_x: (center_x - world_x * zoom).rem_euclid(tile_size),
			offset_y: (center_y - world_y * zoom).rem_euclid(tile_size),
			tile_size,
		}
	}

	fn differs_from(&self, other: &PatternFrame) -> bool {
		(self.zoom - other.zoom).abs() > ZOOM_EPSILON
			|| (self.offset_x - other.offset_x).abs() > OFFSET_EPSILON
			|| (self.offset_y - other.offset_y).abs() > OFFSET_EPSILON
	}
}

#[derive(Clone, Debug)]
pub struct BackgroundSync {
	pub gap: f64,
	/// Pattern is hidden below this zoom.
	pub min_zoom: f64,
	applied: Option<PatternFrame>,
	visible: Option<bool>,
}

impl BackgroundSync {
	pub fn new(gap: f64, min_zoom: f64) -> Self {
		Self {
			gap,
			min_zoom,
			applied: None,
			visible: None,
		}
	}

	pub fn applied(&self) -> Option<PatternFrame> {
		self.applied
	}

	/// Returns whether the pattern geometry was pushed to the surface.
	pub fn tick(&mut self, viewport: &Viewport, surface: &mut impl PatternSurface) -> bool {
		if !viewport.transform.is_usable() || self.gap <= 0.0 {
			return false;
		}

		let visible = viewport.zoom() >= self.min_zoom;
		if self.visible != Some(visible) {
			surface.set_visible(visible);
			self.visible = Some(visible);
		}

		let frame = PatternFrame::compute(viewport, self.gap);
		if self.applied.is_some_and(|applied| !frame.differs_from(&applied)) {
			return false;
		}
		surface.set_pattern(frame.offset_x, frame.offset_y, frame.tile_size);
		self.applied = Some(frame);
		true
	}
}

/// Pattern drawn as a CSS background on an element stacked under the canvas.
pub struct ElementPatternSurface {
	element: HtmlElement,
}

impl ElementPatternSurface {
	pub fn new(element: HtmlElement, dot_color: &str) -> Self {
		let _ = element.style().set_property("transition", "opacity 150ms ease");
		let surface = Self { element };
		surface.set_dot_color(dot_color);
		surface
	}

	pub fn set_dot_color(&self, color: &str) {
		let _ = self.element.style().set_property(
			"background-image",
			&format!("radial-gradient(circle, {color} 1px, transparent 1px)"),
		);
	}
}

impl PatternSurface for ElementPatternSurface {
	fn set_pattern(&mut self, offset_x: f64, offset_y: f64, tile_size: f64) {
		let style = self.element.style();
		let _ = style.set_property("background-position", &format!("{offset_x}px {offset_y}px"));
		let _ = style.set_property("background-size", &format!("{tile_size}px {tile_size}px"));
	}

	fn set_visible(&mut self, visible: bool) {
		let style = self.element.style();
		let _ = style.set_property("opacity", if visible { "1" } else { "0" });
		let _ = style.set_property("visibility", if visible { "visible" } else { "hidden" });
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::graph_canvas::viewport::ViewTransform;

	#[derive(Default)]
	struct Recorder {
		patterns: Vec<(f64, f64, f64)>,
		visibility: Vec<bool>,
	}

	impl PatternSurface for Recorder {
		fn set_pattern(&mut self, offset_x: f64, offset_y: f64, tile_size: f64) {
			self.patterns.push((offset_x, offset_y, tile_size));
		}

		fn set_visible(&mut self, visible: bool) {
			self.visibility.push(visible);
		}
	}

	fn viewport(x: f64, y: f64, k: f64) -> Viewport {
		Viewport {
			transform: ViewTransform { x, y, k },
			..Viewport::new(800.0, 600.0)
		}
	}

	#[test]
	fn identity_transform_has_zero_offset() {
		let frame = PatternFrame::compute(&viewport(0.0, 0.0, 1.0), DEFAULT_GAP);
		assert!(frame.offset_x.rem_euclid(DEFAULT_GAP).abs() < 1e-9);
		assert!(frame.offset_y.rem_euclid(DEFAULT_GAP).abs() < 1e-9);
		assert_eq!(frame.tile_size, DEFAULT_GAP);
	}

	#[test]
	fn offset_tracks_pan_and_zoom() {
		let frame = PatternFrame::compute(&viewport(50.0, -10.0, 2.0), 24.0);
		assert_eq!(frame.tile_size, 48.0);
		assert!((frame.offset_x - 2.0).abs() < 1e-9);
		assert!((frame.offset_y - 38.0).abs() < 1e-9);
	}

	#[test]
	fn sub_threshold_changes_are_skipped() {
		let mut sync = BackgroundSync::new(24.0, 0.4);
		let mut surface = Recorder::default();

		assert!(sync.tick(&viewport(10.0, 10.0, 1.0), &mut surface));
		assert!(!sync.tick(&viewport(10.0, 10.0, 1.0), &mut surface));
		assert!(!sync.tick(&viewport(10.3, 10.2, 1.00005), &mut surface));
		assert!(sync.tick(&viewport(11.0, 10.0, 1.0), &mut surface));
		assert!(sync.tick(&viewport(11.0, 10.0, 1.001), &mut surface));
		assert_eq!(surface.patterns.len(), 3);
	}

	#[test]
	fn hidden_pattern_keeps_tracking() {
		let mut sync = BackgroundSync::new(24.0, 0.4);
		let mut surface = Recorder::default();

		sync.tick(&viewport(0.0, 0.0, 1.0), &mut surface);
		sync.tick(&viewport(0.0, 0.0, 0.2), &mut surface);
		sync.tick(&viewport(30.0, 0.0, 0.2), &mut surface);
		sync.tick(&viewport(30.0, 0.0, 0.2), &mut surface);
		sync.tick(&viewport(30.0, 0.0, 1.0), &mut surface);

		assert_eq!(surface.visibility, vec![true, false, true]);
		assert_eq!(surface.patterns.len(), 4);
	}
}
