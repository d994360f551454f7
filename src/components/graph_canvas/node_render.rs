use std::f64::consts::{FRAC_PI_2, FRAC_PI_6, PI};

use super::canvas::Canvas2d;
use super::color::{DIM_ALPHA, with_alpha};
use super::error::{CanvasError, DrawError};
use super::icons::flag_colors;
use super::image_cache::{CacheKey, ImageCache, ImageLoader};
use super::lod::rendered_size;
use super::render::FrameContext;
use super::transform::RenderNode;
use super::types::NodeShape;

/// Highlight ring width in screen pixels.
pub const RING_WIDTH: f64 = 4.0;
const FLAG_OFFSET: (f64, f64) = (0.45, -1.35);
const FLAG_SCALE: f64 = 0.8;
/// External images cover this share of the node diameter.
const IMAGE_FILL: f64 = 0.9;
/// Icon glyph box relative to the node diameter.
const ICON_SCALE: f64 = 1.2;
const LABEL_FONT_RATIO: f64 = 0.5;
const LABEL_PADDING: f64 = 0.4;
const MOCK_LABEL_MAX_CHARS: usize = 14;
const ICON_ON_FILL: &str = "#ffffff";

/// Adds the outline of `shape` centered on `(x, y)` as a closed path.
pub fn trace_shape<C: Canvas2d>(
	ctx: &C,
	shape: NodeShape,
	x: f64,
	y: f64,
	size: f64,
) -> Result<(), CanvasError> {
	ctx.begin_path();
	match shape {
		NodeShape::Circle => ctx.arc(x, y, size, 0.0, 2.0 * PI)?,
		NodeShape::Square => ctx.rect(x - size, y - size, size * 2.0, size * 2.0),
		NodeShape::Hexagon => polygon(ctx, x, y, size, 6, FRAC_PI_6),
		NodeShape::Triangle => polygon(ctx, x, y, size, 3, -FRAC_PI_2),
	}
	ctx.close_path();
	Ok(())
}

fn polygon<C: Canvas2d>(ctx: &C, x: f64, y: f64, radius: f64, sides: usize, rotation: f64) {
	for i in 0..sides {
		let angle = rotation + (i as f64) * 2.0 * PI / sides as f64;
		let (px, py) = (x + radius * angle.cos(), y + radius * angle.sin());
		if i == 0 {
			ctx.move_to(px, py);
		} else {
			ctx.line_to(px, py);
		}
	}
}

fn trace_pill<C: Canvas2d>(ctx: &C, x: f64, y: f64, w: f64, h: f64) -> Result<(), CanvasError> {
	let r = h / 2.0;
	ctx.begin_path();
	ctx.arc(x + r, y + r, r, FRAC_PI_2, 3.0 * FRAC_PI_2)?;
	ctx.line_to(x + w - r, y);
	ctx.arc(x + w - r, y + r, r, -FRAC_PI_2, FRAC_PI_2)?;
	ctx.close_path();
	Ok(())
}

/// Source rectangle that crops an `image_w`×`image_h` image to fill a square
/// of side `target` without distortion.
pub fn cover_crop(image_w: f64, image_h: f64, target: f64) -> [f64; 4] {
	let scale = (target / image_w).max(target / image_h);
	let (sw, sh) = (target / scale, target / scale);
	[(image_w - sw) / 2.0, (image_h - sh) / 2.0, sw, sh]
}

/// Image to draw inside a detailed node, most specific first. Keys that
/// already failed give way to the next one.
pub fn visual_key<L: ImageLoader>(
	node: &RenderNode,
	outlined: bool,
	images: &ImageCache<L>,
) -> Option<CacheKey> {
	let color = if outlined { node.color.as_str() } else { ICON_ON_FILL };
	let mut candidates = Vec::with_capacity(3);
	if let Some(url) = &node.image_url {
		candidates.push(CacheKey::Image { url: url.clone() });
	}
	if let Some(icon) = &node.icon {
		candidates.push(CacheKey::NamedIcon {
			icon: icon.clone(),
			color: color.to_owned(),
		});
	}
	candidates.push(CacheKey::TypeIcon {
		node_type: node.node_type.clone(),
		color: color.to_owned(),
	});
	candidates.into_iter().find(|key| !images.has_failed(key))
}

/// Draws one node. Returns `Ok(false)` when it was culled.
pub fn draw_node<C, L>(
	ctx: &C,
	node: &RenderNode,
	frame: &FrameContext<'_>,
	images: &ImageCache<L>,
) -> Result<bool, DrawError>
where
	C: Canvas2d,
	L: ImageLoader<Image = C::Image>,
{
	if !frame.viewport.node_visible(node.x, node.y) {
		return Ok(false);
	}

	let (x, y) = (node.x, node.y);
	let k = frame.lod.zoom;
	let size = rendered_size(node, frame.settings, &frame.lod);
	let palette = frame.palette;
	let outlined = frame.settings.node_outlined;
	let in_highlight = frame.highlight.has_node(&node.id);
	let dimmed = frame.highlight.is_active() && !in_highlight;

	if in_highlight {
		let tint = if frame.highlight.is_hovered(&node.id) {
			palette.hover_ring
		} else {
			palette.highlight_ring
		};
		ctx.begin_path();
		ctx.arc(x, y, size + RING_WIDTH / k, 0.0, 2.0 * PI)?;
		ctx.set_fill_style(tint);
		ctx.fill();
	}

	let color = if dimmed {
		with_alpha(&node.color, DIM_ALPHA)
	} else {
		node.color.clone()
	};
	trace_shape(ctx, node.shape, x, y, size)?;
	if outlined {
		ctx.set_stroke_style(&color);
		ctx.set_line_width(1.5 / k);
		ctx.stroke();
	} else {
		ctx.set_fill_style(&color);
		ctx.fill();
		ctx.set_stroke_style(palette.node_border);
		ctx.set_line_width(0.5 / k);
		ctx.stroke();
	}

	let alpha = if dimmed { DIM_ALPHA } else { 1.0 };
	ctx.set_global_alpha(alpha);
	let drawn = draw_decorations(ctx, node, size, frame, images);
	ctx.set_global_alpha(1.0);
	drawn?;
	Ok(true)
}

fn draw_decorations<C, L>(
	ctx: &C,
	node: &RenderNode,
	size: f64,
	frame: &FrameContext<'_>,
	images: &ImageCache<L>,
) -> Result<(), DrawError>
where
	C: Canvas2d,
	L: ImageLoader<Image = C::Image>,
{
	let (x, y) = (node.x, node.y);

	if let Some(tag) = &node.flag {
		let (stroke, fill) = flag_colors(tag);
		let key = CacheKey::Flag {
			stroke: stroke.to_owned(),
			fill: fill.to_owned(),
		};
		if let Some(flag) = images.get_or_spawn(key) {
			let side = size * FLAG_SCALE;
			ctx.draw_image(
				&flag,
				x + size * FLAG_OFFSET.0,
				y + size * FLAG_OFFSET.1,
				side,
				side,
			)?;
		}
	}

	if frame.lod.node_detail {
		let outlined = frame.settings.node_outlined;
		if let Some(key) = visual_key(node, outlined, images) {
			let external = matches!(key, CacheKey::Image { .. });
			if let Some(image) = images.get_or_spawn(key) {
				if external {
					draw_clipped_image(ctx, &image, node, size)?;
				} else {
					let side = size * 2.0 * ICON_SCALE;
					ctx.draw_image(&image, x - side / 2.0, y - side / 2.0, side, side)?;
				}
			}
		}
		draw_label(ctx, node, size, frame)?;
	} else {
		draw_mock_label(ctx, node, size, frame);
	}
	Ok(())
}

fn draw_clipped_image<C: Canvas2d>(
	ctx: &C,
	image: &C::Image,
	node: &RenderNode,
	size: f64,
) -> Result<(), DrawError> {
	let (iw, ih) = C::image_size(image);
	if iw <= 0.0 || ih <= 0.0 {
		return Ok(());
	}
	let side = size * 2.0 * IMAGE_FILL;
	ctx.save();
	let drawn = (|| -> Result<(), DrawError> {
		trace_shape(ctx, node.shape, node.x, node.y, size)?;
		ctx.clip();
		ctx.draw_image_region(
			image,
			cover_crop(iw, ih, side),
			[node.x - side / 2.0, node.y - side / 2.0, side, side],
		)?;
		Ok(())
	})();
	ctx.restore();
	drawn
}

fn draw_label<C: Canvas2d>(
	ctx: &C,
	node: &RenderNode,
	size: f64,
	frame: &FrameContext<'_>,
) -> Result<(), DrawError> {
	if node.label.is_empty() {
		return Ok(());
	}
	let font_size = size * LABEL_FONT_RATIO * frame.settings.node_label_font_size / 100.0;
	ctx.set_font(&format!("{font_size}px sans-serif"));
	let text_width = ctx.measure_text(&node.label)?;
	let padding = font_size * LABEL_PADDING;
	let (w, h) = (text_width + padding * 2.0, font_size * 1.4);
	let top = node.y + size + font_size * 0.3;

	trace_pill(ctx, node.x - w / 2.0, top, w, h)?;
	ctx.set_fill_style(frame.palette.label_pill);
	ctx.fill();

	ctx.set_text_align("center");
	ctx.set_text_baseline("middle");
	ctx.set_fill_style(frame.palette.label_text);
	ctx.fill_text(&node.label, node.x, top + h / 2.0)?;
	Ok(())
}

/// Stand-in for the label while zoomed out.
fn draw_mock_label<C: Canvas2d>(ctx: &C, node: &RenderNode, size: f64, frame: &FrameContext<'_>) {
	let chars = node.label.chars().count().min(MOCK_LABEL_MAX_CHARS);
	if chars == 0 {
		return;
	}
	let (w, h) = (chars as f64 * size * 0.22, size * 0.3);
	ctx.set_fill_style(frame.palette.mock_label);
	ctx.fill_rect(node.x - w / 2.0, node.y + size * 1.35, w, h);
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::graph_canvas::canvas::recording::{RecordingCanvas, TestImage};
	use crate::components::graph_canvas::image_cache::ImageResult;
	use crate::components::graph_canvas::render::tests::{FrameFixture, two_node_model};
	use futures::future::{FutureExt, LocalBoxFuture};
	use std::rc::Rc;

	struct InstantLoader;

	impl ImageLoader for InstantLoader {
		type Image = TestImage;

		fn load(&self, key: &CacheKey) -> LocalBoxFuture<'static, ImageResult<TestImage>> {
			let image = TestImage::new(&key.to_string(), 200.0, 100.0);
			async move { Ok(image) }.boxed_local()
		}
	}

	fn warm_cache(keys: &[CacheKey]) -> ImageCache<InstantLoader> {
		let cache = ImageCache::with_spawner(InstantLoader, Rc::new(|_: LocalBoxFuture<'static, ()>| {}));
		for key in keys {
			futures::executor::block_on(cache.request(key.clone())).unwrap();
		}
		cache
	}

	#[test]
	fn cover_crop_keeps_aspect() {
		assert_eq!(cover_crop(200.0, 100.0, 50.0), [50.0, 0.0, 100.0, 100.0]);
		assert_eq!(cover_crop(100.0, 300.0, 10.0), [0.0, 100.0, 100.0, 100.0]);
	}

	#[test]
	fn zoomed_out_node_is_simplified() {
		let mut fixture = FrameFixture::new(two_node_model());
		fixture.settings.lod.node_detail = 2.0;
		fixture.set_zoom(0.5);
		let mut node = fixture.model.nodes[0].clone();
		node.image_url = Some("a.png".into());
		let cache = warm_cache(&[CacheKey::Image {
			url: "a.png".into(),
		}]);

		let ctx = RecordingCanvas::default();
		assert!(draw_node(&ctx, &node, &fixture.frame(), &cache).unwrap());
		assert!(!ctx.any("draw_image"));
		assert!(!ctx.any("measure_text"));
		assert!(!ctx.any("fill_text"));
		assert_eq!(ctx.count("fill_rect"), 1);
		assert!(ctx.any("arc"));
	}

	#[test]
	fn detailed_node_draws_clipped_image_and_label() {
		let mut fixture = FrameFixture::new(two_node_model());
		fixture.set_zoom(2.0);
		let mut node = fixture.model.nodes[0].clone();
		node.image_url = Some("a.png".into());
		node.icon = Some("user".into());
		let cache = warm_cache(&[CacheKey::Image {
			url: "a.png".into(),
		}]);

		let ctx = RecordingCanvas::default();
		draw_node(&ctx, &node, &fixture.frame(), &cache).unwrap();
		let ops = ctx.ops();
		let clip = ops.iter().position(|op| op == "clip").unwrap();
		let image = ops
			.iter()
			.position(|op| op.starts_with("draw_image_region image:a.png"))
			.unwrap();
		assert!(clip < image);
		let side = rendered_size(&node, &fixture.settings, &fixture.frame().lod) * 2.0 * IMAGE_FILL;
		let dest = [node.x - side / 2.0, node.y - side / 2.0, side, side];
		assert!(ops[image].ends_with(&format!("{dest:?}")));
		assert!(ctx.any("measure_text Alice"));
		assert!(ctx.any("fill_text Alice"));
		assert!(!ctx.any("fill_rect"));
	}

	#[test]
	fn detailed_node_draws_icon_across_the_diameter() {
		let mut fixture = FrameFixture::new(two_node_model());
		fixture.set_zoom(2.0);
		let node = fixture.model.nodes[0].clone();
		let key = CacheKey::TypeIcon {
			node_type: "person".into(),
			color: ICON_ON_FILL.into(),
		};
		let cache = warm_cache(&[key.clone()]);

		let ctx = RecordingCanvas::default();
		draw_node(&ctx, &node, &fixture.frame(), &cache).unwrap();
		let size = rendered_size(&node, &fixture.settings, &fixture.frame().lod);
		let side = size * 2.0 * ICON_SCALE;
		assert!(ctx.any(&format!(
			"draw_image {key} {} {} {side} {side}",
			node.x - side / 2.0,
			node.y - side / 2.0
		)));
		assert!(!ctx.any("clip"));
	}

	#[test]
	fn missing_image_is_requested_and_omitted() {
		let mut fixture = FrameFixture::new(two_node_model());
		fixture.set_zoom(2.0);
		let node = fixture.model.nodes[0].clone();
		let cache = warm_cache(&[]);

		let ctx = RecordingCanvas::default();
		assert!(draw_node(&ctx, &node, &fixture.frame(), &cache).unwrap());
		assert!(!ctx.any("draw_image"));
		assert!(cache.is_loading(&CacheKey::TypeIcon {
			node_type: "person".into(),
			color: ICON_ON_FILL.into(),
		}));
	}

	#[test]
	fn icon_priority() {
		let fixture = FrameFixture::new(two_node_model());
		let mut node = fixture.model.nodes[0].clone();
		let cache = warm_cache(&[]);
		assert!(matches!(
			visual_key(&node, false, &cache),
			Some(CacheKey::TypeIcon { .. })
		));
		node.icon = Some("mail".into());
		assert!(matches!(
			visual_key(&node, false, &cache),
			Some(CacheKey::NamedIcon { .. })
		));
		node.image_url = Some("x.png".into());
		assert!(matches!(
			visual_key(&node, true, &cache),
			Some(CacheKey::Image { .. })
		));
	}

	#[test]
	fn highlight_ring_and_dimming() {
		let mut fixture = FrameFixture::new(two_node_model());
		fixture.set_zoom(0.5);
		let node = fixture.model.nodes[0].clone();
		let cache = warm_cache(&[]);

		fixture.highlight.nodes.insert("a".into());
		fixture.highlight.hovered = Some("a".into());
		let ctx = RecordingCanvas::default();
		draw_node(&ctx, &node, &fixture.frame(), &cache).unwrap();
		let hover = fixture.frame().palette.hover_ring;
		assert!(ctx.any(&format!("fill_style {hover}")));
		assert!(ctx.any(&format!("fill_style {}", node.color)));

		fixture.highlight.nodes.clear();
		fixture.highlight.nodes.insert("b".into());
		fixture.highlight.hovered = None;
		let ctx = RecordingCanvas::default();
		draw_node(&ctx, &node, &fixture.frame(), &cache).unwrap();
		assert_eq!(ctx.count("arc"), 1);
		assert!(ctx.any(&format!("fill_style {}", with_alpha(&node.color, DIM_ALPHA))));
		assert!(ctx.any(&format!("global_alpha {DIM_ALPHA}")));
	}

	#[test]
	fn outlined_nodes_are_stroked_only() {
		let mut fixture = FrameFixture::new(two_node_model());
		fixture.settings.node_outlined = true;
		fixture.set_zoom(0.5);
		let mut node = fixture.model.nodes[0].clone();
		node.shape = NodeShape::Hexagon;
		let cache = warm_cache(&[]);

		let ctx = RecordingCanvas::default();
		draw_node(&ctx, &node, &fixture.frame(), &cache).unwrap();
		assert_eq!(ctx.count("line_to"), 5);
		assert!(ctx.any(&format!("stroke_style {}", node.color)));
		assert!(!ctx.ops().iter().any(|op| op == "fill"));
	}

	#[test]
	fn culled_node_draws_nothing() {
		let mut fixture = FrameFixture::new(two_node_model());
		fixture.set_zoom(1.0);
		let mut node = fixture.model.nodes[0].clone();
		node.x = 10_000.0;
		let ctx = RecordingCanvas::default();
		assert!(!draw_node(&ctx, &node, &fixture.frame(), &warm_cache(&[])).unwrap());
		assert!(ctx.ops().is_empty());
	}

	#[test]
	fn canvas_failure_surfaces_as_error() {
		let mut fixture = FrameFixture::new(two_node_model());
		fixture.set_zoom(2.0);
		let node = fixture.model.nodes[0].clone();
		let ctx = RecordingCanvas {
			fail_text: true,
			..RecordingCanvas::default()
		};
		let result = draw_node(&ctx, &node, &fixture.frame(), &warm_cache(&[]));
		assert!(matches!(result, Err(DrawError::Canvas(_))));
		assert_eq!(ctx.ops().last().map(String::as_str), Some("global_alpha 1"));
	}
}
