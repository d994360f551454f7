use std::f64::consts::{FRAC_PI_2, PI};

use super::canvas::Canvas2d;
use super::error::DrawError;
use super::lod::rendered_size;
use super::render::FrameContext;
use super::transform::{RenderEdge, RenderModel};

const LABEL_BASE_FONT: f64 = 4.0;
const CURVE_HIT_SAMPLES: usize = 16;

type Point = (f64, f64);

fn sub(a: Point, b: Point) -> Point {
	(a.0 - b.0, a.1 - b.1)
}

fn add_scaled(a: Point, v: Point, s: f64) -> Point {
	(a.0 + v.0 * s, a.1 + v.1 * s)
}

fn unit(v: Point) -> Point {
	let len = v.0.hypot(v.1);
	if len <= f64::EPSILON {
		(0.0, 0.0)
	} else {
		(v.0 / len, v.1 / len)
	}
}

/// Drawn path of one edge, already trimmed to the node boundaries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgePath {
	pub start: Point,
	pub end: Point,
	/// Quadratic control point; `None` for straight edges.
	pub control: Option<Point>,
	pub target_center: Point,
	pub target_size: f64,
}

impl EdgePath {
	/// `curvature` offsets the control point from the midpoint along the
	/// normal by `curvature * distance`. `end_pullback` is the extra distance
	/// kept free in front of the target for an arrow head.
	pub fn new(
		source: Point,
		target: Point,
		curvature: f64,
		source_size: f64,
		target_size: f64,
		end_pullback: f64,
	) -> Option<Self> {
		let delta = sub(target, source);
		let distance = delta.0.hypot(delta.1);
		let gap = distance - source_size - target_size;
		if gap <= 0.0 {
			return None;
		}
		// The arrow head never pushes the end point behind the start.
		let end_pullback = end_pullback.clamp(0.0, gap);

		let control = (curvature != 0.0).then(|| {
			let mid = ((source.0 + target.0) / 2.0, (source.1 + target.1) / 2.0);
			let normal = (-delta.1 / distance, delta.0 / distance);
			add_scaled(mid, normal, curvature * distance)
		});
		let toward_target = unit(sub(control.unwrap_or(target), source));
		let toward_source = unit(sub(control.unwrap_or(source), target));

		Some(Self {
			start: add_scaled(source, toward_target, source_size),
			end: add_scaled(target, toward_source, target_size + end_pullback),
			control,
			target_center: target,
			target_size,
		})
	}

	pub fn point_at(&self, t: f64) -> Point {
		let (p0, p2) = (self.start, self.end);
		match self.control {
			None => add_scaled(p0, sub(p2, p0), t),
			Some(c) => {
				let u = 1.0 - t;
				(
					u * u * p0.0 + 2.0 * u * t * c.0 + t * t * p2.0,
					u * u * p0.1 + 2.0 * u * t * c.1 + t * t * p2.1,
				)
			}
		}
	}

	/// Unnormalized derivative of the path at `t`.
	pub fn tangent_at(&self, t: f64) -> Point {
		let (p0, p2) = (self.start, self.end);
		match self.control {
			None => sub(p2, p0),
			Some(c) => {
				let u = 1.0 - t;
				(
					2.0 * u * (c.0 - p0.0) + 2.0 * t * (p2.0 - c.0),
					2.0 * u * (c.1 - p0.1) + 2.0 * t * (p2.1 - c.1),
				)
			}
		}
	}

	/// Tip and unit direction of the arrow head at `rel_pos` along the edge.
	/// At 1 the tip sits on the target boundary.
	pub fn arrow(&self, rel_pos: f64, length: f64) -> (Point, Point) {
		if rel_pos >= 1.0 {
			let direction = match self.control {
				None => unit(sub(self.target_center, self.start)),
				Some(c) => unit(sub(self.target_center, c)),
			};
			let tip = add_scaled(self.target_center, direction, -self.target_size);
			return (tip, direction);
		}
		let rel_pos = rel_pos.max(0.0);
		let direction = unit(self.tangent_at(rel_pos));
		(add_scaled(self.point_at(rel_pos), direction, length / 2.0), direction)
	}

	/// Approximate distance from `point` to the drawn path.
	pub fn distance_to(&self, point: Point) -> f64 {
		match self.control {
			None => segment_distance(point, self.start, self.end),
			Some(_) => {
				let mut best = f64::INFINITY;
				let mut previous = self.start;
				for step in 1..=CURVE_HIT_SAMPLES {
					let next = self.point_at(step as f64 / CURVE_HIT_SAMPLES as f64);
					best = best.min(segment_distance(point, previous, next));
					previous = next;
				}
				best
			}
		}
	}
}

fn segment_distance(p: Point, a: Point, b: Point) -> f64 {
	let ab = sub(b, a);
	let len_sq = ab.0 * ab.0 + ab.1 * ab.1;
	let t = if len_sq <= f64::EPSILON {
		0.0
	} else {
		(((p.0 - a.0) * ab.0 + (p.1 - a.1) * ab.1) / len_sq).clamp(0.0, 1.0)
	};
	let closest = add_scaled(a, ab, t);
	(p.0 - closest.0).hypot(p.1 - closest.1)
}

/// Edge styles in precedence order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EdgeEmphasis {
	Current,
	Selected,
	Highlighted,
	Dimmed,
	Default,
}

pub fn edge_emphasis(edge: &RenderEdge, frame: &FrameContext<'_>) -> EdgeEmphasis {
	if frame.selection.current_edge.as_deref() == Some(edge.id.as_str()) {
		EdgeEmphasis::Current
	} else if frame.selection.edges.contains(&edge.id) {
		EdgeEmphasis::Selected
	} else if frame.highlight.has_link(&edge.key()) {
		EdgeEmphasis::Highlighted
	} else if frame.highlight.is_active() {
		EdgeEmphasis::Dimmed
	} else {
		EdgeEmphasis::Default
	}
}

/// Builds the trimmed path for an edge, or `None` when there is nothing to draw.
pub fn edge_path(
	model: &RenderModel,
	edge: &RenderEdge,
	frame: &FrameContext<'_>,
) -> Result<Option<EdgePath>, DrawError> {
	let (source, target) = edge
		.endpoints()
		.ok_or_else(|| DrawError::DanglingEdge { id: edge.id.clone() })?;
	let (source, target) = (&model.nodes[source], &model.nodes[target]);
	let arrow_at_target = frame.settings.link_directional_arrow_rel_pos >= 1.0;
	let pullback = if arrow_at_target {
		frame.settings.link_directional_arrow_length
	} else {
		0.0
	};
	Ok(EdgePath::new(
		(source.x, source.y),
		(target.x, target.y),
		edge.curvature,
		rendered_size(source, frame.settings, &frame.lod),
		rendered_size(target, frame.settings, &frame.lod),
		pullback,
	))
}

/// Draws one edge. Returns `Ok(false)` when it was skipped by LOD or culling.
pub fn draw_edge<C: Canvas2d>(
	ctx: &C,
	model: &RenderModel,
	edge: &RenderEdge,
	frame: &FrameContext<'_>,
) -> Result<bool, DrawError> {
	if !frame.lod.draw_edges {
		return Ok(false);
	}
	let (source, target) = edge
		.endpoints()
		.ok_or_else(|| DrawError::DanglingEdge { id: edge.id.clone() })?;
	let (source, target) = (&model.nodes[source], &model.nodes[target]);
	if !frame
		.viewport
		.edge_visible((source.x, source.y), (target.x, target.y))
	{
		return Ok(false);
	}
	let Some(path) = edge_path(model, edge, frame)? else {
		return Ok(false);
	};

	let k = frame.lod.zoom;
	let palette = frame.palette;
	let emphasis = edge_emphasis(edge, frame);
	let (color, width_factor) = match emphasis {
		EdgeEmphasis::Current => (palette.edge_current, 3.0),
		EdgeEmphasis::Selected => (palette.edge_selected, 2.5),
		EdgeEmphasis::Highlighted => (palette.edge_highlight, 2.0),
		EdgeEmphasis::Dimmed => (palette.edge_dimmed, 1.0),
		EdgeEmphasis::Default => (palette.edge, 1.0),
	};

	ctx.set_stroke_style(color);
	ctx.set_line_width(frame.settings.link_width * width_factor / k);
	ctx.begin_path();
	ctx.move_to(path.start.0, path.start.1);
	match path.control {
		Some((cx, cy)) => ctx.quadratic_curve_to(cx, cy, path.end.0, path.end.1),
		None => ctx.line_to(path.end.0, path.end.1),
	}
	ctx.stroke();

	let arrow_length = frame.settings.link_directional_arrow_length;
	if arrow_length > 0.0 {
		let (tip, direction) = path.arrow(frame.settings.link_directional_arrow_rel_pos, arrow_length);
		let back = add_scaled(tip, direction, -arrow_length);
		let perp = (-direction.1 * arrow_length * 0.5, direction.0 * arrow_length * 0.5);
		ctx.set_fill_style(color);
		ctx.begin_path();
		ctx.move_to(tip.0, tip.1);
		ctx.line_to(back.0 + perp.0, back.1 + perp.1);
		ctx.line_to(back.0 - perp.0, back.1 - perp.1);
		ctx.close_path();
		ctx.fill();
	}

	if let Some(label) = edge.label.as_deref().filter(|label| !label.is_empty())
		&& frame.highlight.has_link(&edge.key())
		&& frame.lod.edge_detail
	{
		draw_edge_label(ctx, &path, label, frame)?;
	}
	Ok(true)
}

/// Rotation that keeps text along `direction` upright.
pub fn upright_angle(direction: Point) -> f64 {
	let angle = direction.1.atan2(direction.0);
	if angle > FRAC_PI_2 {
		angle - PI
	} else if angle < -FRAC_PI_2 {
		angle + PI
	} else {
		angle
	}
}

fn draw_edge_label<C: Canvas2d>(
	ctx: &C,
	path: &EdgePath,
	label: &str,
	frame: &FrameContext<'_>,
) -> Result<(), DrawError> {
	let (x, y) = path.point_at(0.5);
	let font_size = LABEL_BASE_FONT * frame.settings.link_label_font_size / 100.0;

	ctx.save();
	let drawn = (|| -> Result<(), DrawError> {
		ctx.translate(x, y)?;
		ctx.rotate(upright_angle(path.tangent_at(0.5)))?;
		ctx.set_font(&format!("{font_size}px sans-serif"));
		ctx.set_text_align("center");
		ctx.set_text_baseline("bottom");
		ctx.set_fill_style(frame.palette.edge_label);
		ctx.fill_text(label, 0.0, -font_size * 0.2)?;
		Ok(())
	})();
	ctx.restore();
	drawn
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::graph_canvas::canvas::recording::RecordingCanvas;
	use crate::components::graph_canvas::render::tests::{FrameFixture, two_node_model};

	fn close(a: Point, b: Point) -> bool {
		(a.0 - b.0).abs() < 1e-9 && (a.1 - b.1).abs() < 1e-9
	}

	#[test]
	fn straight_path_stops_at_boundaries() {
		let path = EdgePath::new((0.0, 0.0), (100.0, 0.0), 0.0, 5.0, 8.0, 3.0).unwrap();
		assert!(close(path.start, (5.0, 0.0)));
		assert!(close(path.end, (89.0, 0.0)));
		assert_eq!(path.control, None);

		let (tip, direction) = path.arrow(1.0, 3.0);
		assert!(close(tip, (92.0, 0.0)));
		assert!(close(direction, (1.0, 0.0)));
		assert!(close(add_scaled(tip, direction, -3.0), path.end));
	}

	#[test]
	fn curved_path_offsets_control_along_normal() {
		let path = EdgePath::new((0.0, 0.0), (100.0, 0.0), 0.2, 5.0, 5.0, 0.0).unwrap();
		assert!(close(path.control.unwrap(), (50.0, 20.0)));
		let start_gap = path.start.0.hypot(path.start.1);
		assert!((start_gap - 5.0).abs() < 1e-9);

		let mirrored = EdgePath::new((0.0, 0.0), (100.0, 0.0), -0.2, 5.0, 5.0, 0.0).unwrap();
		assert!(close(mirrored.control.unwrap(), (50.0, -20.0)));
	}

	#[test]
	fn curved_arrow_touches_target_boundary() {
		let path = EdgePath::new((0.0, 0.0), (100.0, 0.0), 0.3, 4.0, 6.0, 2.0).unwrap();
		let (tip, direction) = path.arrow(1.0, 2.0);
		let from_center = sub(tip, path.target_center);
		assert!((from_center.0.hypot(from_center.1) - 6.0).abs() < 1e-9);
		assert!(close(add_scaled(tip, direction, -2.0), path.end));
	}

	#[test]
	fn quadratic_tangent_matches_endpoints() {
		let path = EdgePath::new((0.0, 0.0), (100.0, 0.0), 0.2, 1.0, 1.0, 0.0).unwrap();
		let c = path.control.unwrap();
		assert!(close(unit(path.tangent_at(0.0)), unit(sub(c, path.start))));
		assert!(close(unit(path.tangent_at(1.0)), unit(sub(path.end, c))));
		assert!(close(path.point_at(0.0), path.start));
		assert!(close(path.point_at(1.0), path.end));
	}

	#[test]
	fn close_nodes_never_reverse_the_segment() {
		let path = EdgePath::new((0.0, 0.0), (12.0, 0.0), 0.0, 5.0, 5.0, 3.5).unwrap();
		assert!(close(path.start, (5.0, 0.0)));
		assert!(close(path.end, (5.0, 0.0)));
		let (tip, direction) = path.arrow(1.0, 3.5);
		assert!(close(direction, (1.0, 0.0)));
		assert!(close(tip, (7.0, 0.0)));

		let roomy = EdgePath::new((0.0, 0.0), (20.0, 0.0), 0.0, 5.0, 5.0, 3.5).unwrap();
		assert!(close(roomy.end, (11.5, 0.0)));
	}

	#[test]
	fn overlapping_nodes_have_no_path() {
		assert!(EdgePath::new((0.0, 0.0), (6.0, 0.0), 0.0, 4.0, 4.0, 0.0).is_none());
	}

	#[test]
	fn upright_label_rotation() {
		assert!((upright_angle((1.0, 0.0))).abs() < 1e-12);
		assert!((upright_angle((-1.0, 0.0))).abs() < 1e-12);
		assert!((upright_angle((-1.0, -1.0)) - PI / 4.0).abs() < 1e-12);
		assert!((upright_angle((-1.0, 1.0)) + PI / 4.0).abs() < 1e-12);
	}

	#[test]
	fn hit_distance() {
		let path = EdgePath::new((0.0, 0.0), (100.0, 0.0), 0.0, 5.0, 5.0, 0.0).unwrap();
		assert!((path.distance_to((50.0, 3.0)) - 3.0).abs() < 1e-9);
		let curved = EdgePath::new((0.0, 0.0), (100.0, 0.0), 0.4, 5.0, 5.0, 0.0).unwrap();
		let apex = curved.point_at(0.5);
		assert!(curved.distance_to(apex) < 1e-9);
		assert!(curved.distance_to((50.0, 0.0)) > 10.0);
	}

	#[test]
	fn style_precedence() {
		let mut fixture = FrameFixture::new(two_node_model());
		let edge = &fixture.model.edges[0].clone();
		assert_eq!(edge_emphasis(edge, &fixture.frame()), EdgeEmphasis::Default);

		fixture.highlight.nodes.insert("zzz".into());
		assert_eq!(edge_emphasis(edge, &fixture.frame()), EdgeEmphasis::Dimmed);

		fixture.highlight.links.insert(edge.key());
		assert_eq!(edge_emphasis(edge, &fixture.frame()), EdgeEmphasis::Highlighted);

		fixture.selection.edges.insert(edge.id.clone());
		assert_eq!(edge_emphasis(edge, &fixture.frame()), EdgeEmphasis::Selected);

		fixture.selection.current_edge = Some(edge.id.clone());
		assert_eq!(edge_emphasis(edge, &fixture.frame()), EdgeEmphasis::Current);
	}

	#[test]
	fn edges_hidden_below_visibility_threshold() {
		let mut fixture = FrameFixture::new(two_node_model());
		fixture.set_zoom(0.1);
		let ctx = RecordingCanvas::default();
		let edge = fixture.model.edges[0].clone();
		assert!(!draw_edge(&ctx, &fixture.model, &edge, &fixture.frame()).unwrap());
		assert!(ctx.ops().is_empty());
	}

	#[test]
	fn label_only_for_highlighted_edge_at_detail_zoom() {
		let mut fixture = FrameFixture::new(two_node_model());
		fixture.set_zoom(2.0);
		let edge = fixture.model.edges[0].clone();

		let ctx = RecordingCanvas::default();
		assert!(draw_edge(&ctx, &fixture.model, &edge, &fixture.frame()).unwrap());
		assert!(!ctx.any("fill_text"));

		fixture.highlight.links.insert(edge.key());
		let ctx = RecordingCanvas::default();
		draw_edge(&ctx, &fixture.model, &edge, &fixture.frame()).unwrap();
		assert!(ctx.any("fill_text knows"));
		assert!(ctx.any("rotate"));

		fixture.set_zoom(1.0);
		let ctx = RecordingCanvas::default();
		draw_edge(&ctx, &fixture.model, &edge, &fixture.frame()).unwrap();
		assert!(!ctx.any("fill_text"));
	}

	#[test]
	fn dangling_edge_is_reported() {
		let mut fixture = FrameFixture::new(two_node_model());
		let mut edge = fixture.model.edges[0].clone();
		edge.target = None;
		fixture.set_zoom(1.0);
		let ctx = RecordingCanvas::default();
		assert!(matches!(
			draw_edge(&ctx, &fixture.model, &edge, &fixture.frame()),
			Err(DrawError::DanglingEdge { .. })
		));
	}
}
