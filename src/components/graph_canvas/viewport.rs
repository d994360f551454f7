pub const DEFAULT_CULL_MARGIN: f64 = 80.0;
pub const MIN_ZOOM: f64 = 0.05;
pub const MAX_ZOOM: f64 = 12.0;

/// Pan/zoom of the canvas: `screen = graph * k + (x, y)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self {
			x: 0.0,
			y: 0.0,
			k: 1.0,
		}
	}
}

impl ViewTransform {
	/// Canvas `setTransform` arguments.
	pub fn affine(&self) -> [f64; 6] {
		[self.k, 0.0, 0.0, self.k, self.x, self.y]
	}

	pub fn is_usable(&self) -> bool {
		self.k.is_finite() && self.k > 0.0 && self.x.is_finite() && self.y.is_finite()
	}

	pub fn graph_to_screen(&self, gx: f64, gy: f64) -> (f64, f64) {
		(gx * self.k + self.x, gy * self.k + self.y)
	}

	/// Falls back to the origin when the transform is not initialized.
	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		if !self.is_usable() {
			log::debug!("screen_to_graph on unusable transform {self:?}");
			return (0.0, 0.0);
		}
		((sx - self.x) / self.k, (sy - self.y) / self.k)
	}
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
	pub transform: ViewTransform,
	pub width: f64,
	pub height: f64,
	pub margin: f64,
}

impl Viewport {
	pub fn new(width: f64, height: f64) -> Self {
		Self {
			transform: ViewTransform {
				x: width / 2.0,
				y: height / 2.0,
				k: 1.0,
			},
			width,
			height,
			margin: DEFAULT_CULL_MARGIN,
		}
	}

	pub fn zoom(&self) -> f64 {
		self.transform.k
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}

	fn on_screen(&self, sx: f64, sy: f64) -> bool {
		let m = self.margin;
		(-m..=self.width + m).contains(&sx) && (-m..=self.height + m).contains(&sy)
	}

	pub fn node_visible(&self, gx: f64, gy: f64) -> bool {
		let (sx, sy) = self.transform.graph_to_screen(gx, gy);
		self.on_screen(sx, sy)
	}

	/// Accepts any edge whose projected bounding box touches the padded
	/// canvas, so some diagonals that miss the viewport are still drawn.
	pub fn edge_visible(&self, source: (f64, f64), target: (f64, f64)) -> bool {
		let (x1, y1) = self.transform.graph_to_screen(source.0, source.1);
		let (x2, y2) = self.transform.graph_to_screen(target.0, target.1);
		if self.on_screen(x1, y1) || self.on_screen(x2, y2) {
			return true;
		}

		let m = self.margin;
		let (min_x, max_x) = (x1.min(x2), x1.max(x2));
		let (min_y, max_y) = (y1.min(y2), y1.max(y2));
		!(max_x < -m || min_x > self.width + m || max_y < -m || min_y > self.height + m)
	}

	pub fn pan_by(&mut self, dx: f64, dy: f64) {
		self.transform.x += dx;
		self.transform.y += dy;
	}

	/// Scales around a screen point, keeping the graph point under it fixed.
	pub fn zoom_at(&mut self, sx: f64, sy: f64, factor: f64) {
		let t = &mut self.transform;
		let new_k = (t.k * factor).clamp(MIN_ZOOM, MAX_ZOOM);
		let ratio = new_k / t.k;
		t.x = sx - (sx - t.x) * ratio;
		t.y = sy - (sy - t.y) * ratio;
		t.k = new_k;
	}

	/// Graph point currently at the canvas center.
	pub fn graph_center(&self) -> (f64, f64) {
		self.transform
			.screen_to_graph(self.width / 2.0, self.height / 2.0)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn identity(width: f64, height: f64) -> Viewport {
		Viewport {
			transform: ViewTransform::default(),
			width,
			height,
			margin: DEFAULT_CULL_MARGIN,
		}
	}

	#[test]
	fn node_culling_boundary() {
		let viewport = identity(800.0, 600.0);
		let m = viewport.margin;
		assert!(!viewport.node_visible(-m - 1.0, 300.0));
		assert!(viewport.node_visible(-m + 1.0, 300.0));
		assert!(!viewport.node_visible(400.0, -m - 1.0));
		assert!(viewport.node_visible(400.0, -m + 1.0));
		assert!(!viewport.node_visible(800.0 + m + 1.0, 300.0));
		assert!(viewport.node_visible(400.0, 600.0 + m - 1.0));
	}

	#[test]
	fn culling_uses_projection() {
		let mut viewport = identity(800.0, 600.0);
		viewport.transform = ViewTransform {
			x: 100.0,
			y: 0.0,
			k: 2.0,
		};
		// 2 * -80 + 100 = -60
		assert!(viewport.node_visible(-80.0, 10.0));
		// 2 * -100 + 100 = -100
		assert!(!viewport.node_visible(-100.0, 10.0));
	}

	#[test]
	fn edge_crossing_viewport_is_kept() {
		let viewport = identity(800.0, 600.0);
		assert!(viewport.edge_visible((-500.0, 300.0), (1500.0, 300.0)));
		assert!(!viewport.edge_visible((-500.0, -500.0), (-200.0, -300.0)));
		// bounding box overlaps although the segment passes outside
		assert!(viewport.edge_visible((-400.0, 200.0), (200.0, -400.0)));
	}

	#[test]
	fn screen_to_graph_inverts_and_falls_back() {
		let transform = ViewTransform {
			x: 10.0,
			y: 20.0,
			k: 4.0,
		};
		let (sx, sy) = transform.graph_to_screen(3.0, -2.0);
		assert_eq!(transform.screen_to_graph(sx, sy), (3.0, -2.0));

		let broken = ViewTransform {
			k: 0.0,
			..transform
		};
		assert_eq!(broken.screen_to_graph(50.0, 50.0), (0.0, 0.0));
	}

	#[test]
	fn zoom_keeps_anchor_fixed() {
		let mut viewport = Viewport::new(800.0, 600.0);
		let before = viewport.transform.screen_to_graph(200.0, 150.0);
		viewport.zoom_at(200.0, 150.0, 1.7);
		let after = viewport.transform.screen_to_graph(200.0, 150.0);
		assert!((before.0 - after.0).abs() < 1e-9);
		assert!((before.1 - after.1).abs() < 1e-9);

		viewport.zoom_at(0.0, 0.0, 1e6);
		assert_eq!(viewport.zoom(), MAX_ZOOM);
	}
}
