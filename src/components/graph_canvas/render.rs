use super::canvas::Canvas2d;
use super::edge_render::draw_edge;
use super::error::{CanvasError, DrawError};
use super::highlight::HighlightState;
use super::image_cache::{ImageCache, ImageLoader};
use super::lod::LodState;
use super::node_render::draw_node;
use super::settings::{GraphSettings, Palette};
use super::state::{RenderState, Selection};
use super::viewport::Viewport;

const IDENTITY: [f64; 6] = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];

/// Read-only view of the state shared by the entity renderers of one frame.
pub struct FrameContext<'a> {
	pub settings: &'a GraphSettings,
	pub palette: &'a Palette,
	pub lod: LodState,
	pub highlight: &'a HighlightState,
	pub selection: &'a Selection,
	pub viewport: &'a Viewport,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
	pub nodes: usize,
	pub edges: usize,
}

fn tally(drawn: Result<bool, DrawError>, kind: &str, id: &str) -> usize {
	match drawn {
		Ok(drawn) => usize::from(drawn),
		Err(DrawError::DanglingEdge { .. }) => 0,
		Err(error) => {
			log::debug!("skipped {kind} {id}: {error}");
			0
		}
	}
}

/// Paints one frame: clears the canvas, then draws the visible edges and the
/// visible nodes on top. A failing entity is skipped, never the frame.
pub fn render_frame<C, L>(
	state: &RenderState,
	ctx: &C,
	images: &ImageCache<L>,
) -> Result<FrameStats, CanvasError>
where
	C: Canvas2d,
	L: ImageLoader<Image = C::Image>,
{
	let viewport = &state.viewport;
	let palette = state.palette();

	ctx.set_transform(IDENTITY)?;
	ctx.set_global_alpha(1.0);
	ctx.clear_rect(0.0, 0.0, viewport.width, viewport.height);

	if !viewport.transform.is_usable() {
		log::debug!("frame skipped, view transform {:?}", viewport.transform);
		return Ok(FrameStats::default());
	}
	ctx.set_transform(viewport.transform.affine())?;

	let highlight = state.highlight.current();
	let frame = FrameContext {
		settings: &state.settings,
		palette,
		lod: state.lod(),
		highlight: &highlight,
		selection: &state.selection,
		viewport,
	};

	let mut stats = FrameStats::default();
	for edge in &state.model.edges {
		stats.edges += tally(draw_edge(ctx, &state.model, edge, &frame), "edge", &edge.id);
	}
	for node in &state.model.nodes {
		stats.nodes += tally(draw_node(ctx, node, &frame, images), "node", &node.id);
	}
	Ok(stats)
}
