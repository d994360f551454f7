use std::collections::HashSet;
use std::rc::Rc;

use super::background::{BackgroundSync, DEFAULT_GAP};
use super::edge_render::EdgePath;
use super::highlight::HighlightEngine;
use super::layout::{ForceLayout, LayoutResult};
use super::lod::{LodState, rendered_size};
use super::scheduler::FrameScheduler;
use super::settings::{GraphSettings, Palette, Theme};
use super::transform::{RenderModel, build_render_model};
use super::types::{GraphData, TypeColors};
use super::viewport::Viewport;

/// Pointer travel in screen pixels below which a press counts as a click.
pub const CLICK_SLOP: f64 = 3.0;
/// Edge hit tolerance in screen pixels.
pub const EDGE_HIT_TOLERANCE: f64 = 4.0;

/// Externally selected entities.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Selection {
	pub nodes: HashSet<String>,
	pub edges: HashSet<String>,
	/// Edge being inspected; outranks every other edge style.
	pub current_edge: Option<String>,
}

/// Entity under the pointer, by index into the current model.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Hit {
	Node(usize),
	Edge(usize),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct HoverChange {
	pub left: Option<Hit>,
	pub entered: Option<Hit>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum PointerRelease {
	/// Press and release without moving; `None` is the background.
	Click(Option<Hit>),
	DragEnd { id: String, x: f64, y: f64 },
	PanEnd,
	Idle,
}

#[derive(Clone, Copy, Debug)]
struct Press {
	hit: Option<Hit>,
	start: (f64, f64),
	moved: bool,
}

#[derive(Clone, Copy, Debug)]
struct Drag {
	index: usize,
	/// Graph-space offset from the pointer to the node center.
	offset: (f64, f64),
}

#[derive(Clone, Copy, Debug)]
struct Pan {
	pointer: (f64, f64),
	transform: (f64, f64),
}

/// Everything one canvas needs between frames.
pub struct RenderState {
	data: GraphData,
	type_colors: TypeColors,
	pub model: RenderModel,
	pub settings: GraphSettings,
	pub theme: Theme,
	pub viewport: Viewport,
	pub highlight: HighlightEngine,
	pub selection: Selection,
	pub layout: ForceLayout,
	pub background: BackgroundSync,
	hovered: Option<Hit>,
	press: Option<Press>,
	drag: Option<Drag>,
	pan: Option<Pan>,
}

impl RenderState {
	pub fn new(scheduler: Rc<dyn FrameScheduler>, width: f64, height: f64) -> Self {
		let settings = GraphSettings::default();
		Self {
			data: GraphData::default(),
			type_colors: TypeColors::new(),
			model: RenderModel::default(),
			layout: ForceLayout::new(&settings),
			background: BackgroundSync::new(DEFAULT_GAP, settings.lod.background),
			settings,
			theme: Theme::default(),
			viewport: Viewport::new(width, height),
			highlight: HighlightEngine::new(scheduler),
			selection: Selection::default(),
			hovered: None,
			press: None,
			drag: None,
			pan: None,
		}
	}

	pub fn palette(&self) -> &'static Palette {
		self.theme.palette()
	}

	pub fn lod(&self) -> LodState {
		LodState::from_zoom(self.viewport.zoom(), &self.settings.lod)
	}

	pub fn hovered(&self) -> Option<Hit> {
		self.hovered
	}

	pub fn is_dragging(&self) -> bool {
		self.drag.is_some()
	}

	/// Replaces the graph. Known nodes keep their positions and the layout
	/// starts a new generation.
	pub fn set_data(&mut self, data: GraphData) {
		self.data = data;
		self.rebuild();
		self.highlight.reset();
		self.reapply_selection();
		self.hovered = None;
		self.press = None;
		self.drag = None;
		self.pan = None;
		self.layout.restart(&self.model);
	}

	pub fn set_type_colors(&mut self, type_colors: TypeColors) {
		self.type_colors = type_colors;
		self.rebuild();
	}

	fn rebuild(&mut self) {
		self.model = build_render_model(&self.data, &self.type_colors, Some(&self.model));
		log::debug!(
			"render model rebuilt: {} nodes, {} edges",
			self.model.nodes.len(),
			self.model.edges.len()
		);
	}

	pub fn set_settings(&mut self, settings: GraphSettings) {
		self.layout.configure(&settings);
		self.background.min_zoom = settings.lod.background;
		self.settings = settings;
	}

	pub fn set_theme(&mut self, theme: Theme) {
		self.theme = theme;
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.viewport.resize(width, height);
	}

	pub fn pan_by(&mut self, dx: f64, dy: f64) {
		self.viewport.pan_by(dx, dy);
	}

	pub fn zoom_at(&mut self, sx: f64, sy: f64, factor: f64) {
		self.viewport.zoom_at(sx, sy, factor);
	}

	/// Topmost entity at a screen point. Nodes win over edges.
	pub fn hit_test(&self, sx: f64, sy: f64) -> Option<Hit> {
		let (gx, gy) = self.viewport.transform.screen_to_graph(sx, sy);
		let lod = self.lod();

		let node = self.model.nodes.iter().enumerate().rev().find(|(_, node)| {
			let size = rendered_size(node, &self.settings, &lod);
			(node.x - gx).hypot(node.y - gy) <= size
		});
		if let Some((index, _)) = node {
			return Some(Hit::Node(index));
		}

		if !lod.draw_edges {
			return None;
		}
		let tolerance = EDGE_HIT_TOLERANCE / lod.zoom;
		let mut best: Option<(usize, f64)> = None;
		for (index, edge) in self.model.edges.iter().enumerate() {
			let Some((source, target)) = edge.endpoints() else {
				continue;
			};
			let (source, target) = (&self.model.nodes[source], &self.model.nodes[target]);
			let Some(path) = EdgePath::new(
				(source.x, source.y),
				(target.x, target.y),
				edge.curvature,
				rendered_size(source, &self.settings, &lod),
				rendered_size(target, &self.settings, &lod),
				0.0,
			) else {
				continue;
			};
			let distance = path.distance_to((gx, gy));
			if distance <= tolerance && best.is_none_or(|(_, d)| distance < d) {
				best = Some((index, distance));
			}
		}
		best.map(|(index, _)| Hit::Edge(index))
	}

	/// Moves the hover to whatever is at the point. Returns the change, if
	/// any, so enter and exit callbacks can fire.
	pub fn hover_at(&mut self, sx: f64, sy: f64) -> Option<HoverChange> {
		let hit = self.hit_test(sx, sy);
		self.set_hovered(hit)
	}

	fn set_hovered(&mut self, hit: Option<Hit>) -> Option<HoverChange> {
		if hit == self.hovered {
			return None;
		}
		match hit {
			Some(Hit::Node(index)) => self.highlight.hover_node(&self.model, index),
			Some(Hit::Edge(index)) => self.highlight.hover_edge(&self.model, index),
			None => self.highlight.clear_hover(),
		}
		let left = std::mem::replace(&mut self.hovered, hit);
		Some(HoverChange { left, entered: hit })
	}

	pub fn clear_hover(&mut self) -> Option<HoverChange> {
		self.set_hovered(None)
	}

	pub fn select_nodes(&mut self, ids: Vec<String>) {
		self.selection.nodes = ids.iter().cloned().collect();
		if ids.is_empty() {
			self.highlight.clear_selection();
		} else {
			self.highlight.select_nodes(&self.model, ids);
		}
	}

	pub fn select_edges(&mut self, ids: Vec<String>) {
		self.selection.edges = ids.into_iter().collect();
	}

	pub fn set_current_edge(&mut self, id: Option<String>) {
		self.selection.current_edge = id;
	}

	pub fn clear_selection(&mut self) {
		self.selection = Selection::default();
		self.highlight.clear_selection();
	}

	fn reapply_selection(&mut self) {
		if self.selection.nodes.is_empty() {
			return;
		}
		let ids = self.selection.nodes.iter().cloned().collect();
		self.highlight.select_nodes(&self.model, ids);
	}

	/// Starts a press: a drag on a node, a pan anywhere else.
	pub fn pointer_down(&mut self, sx: f64, sy: f64) -> Option<Hit> {
		let hit = self.hit_test(sx, sy);
		self.press = Some(Press {
			hit,
			start: (sx, sy),
			moved: false,
		});
		match hit {
			Some(Hit::Node(index)) => self.begin_drag(index, sx, sy),
			_ => self.begin_pan(sx, sy),
		}
		hit
	}

	/// Drags, pans or hovers depending on the press state.
	pub fn pointer_move(&mut self, sx: f64, sy: f64) -> Option<HoverChange> {
		if let Some(press) = &mut self.press
			&& !press.moved
		{
			press.moved = (sx - press.start.0).hypot(sy - press.start.1) > CLICK_SLOP;
		}
		let moved = self.press.is_some_and(|press| press.moved);

		if self.drag.is_some() {
			if moved {
				self.drag_to(sx, sy);
			}
			None
		} else if self.pan.is_some() {
			if moved {
				self.pan_to(sx, sy);
			}
			None
		} else {
			self.hover_at(sx, sy)
		}
	}

	pub fn pointer_up(&mut self) -> PointerRelease {
		let drag = self.end_drag();
		self.pan = None;
		let Some(press) = self.press.take() else {
			return PointerRelease::Idle;
		};
		if !press.moved {
			return PointerRelease::Click(press.hit);
		}
		drag.unwrap_or(PointerRelease::PanEnd)
	}

	/// Pointer left the canvas: abandons the press without a click.
	pub fn pointer_leave(&mut self) -> (Option<PointerRelease>, Option<HoverChange>) {
		let drag = self.end_drag();
		self.pan = None;
		let release = self
			.press
			.take()
			.and_then(|press| if press.moved { drag } else { None });
		(release, self.clear_hover())
	}

	pub fn begin_drag(&mut self, index: usize, sx: f64, sy: f64) {
		let Some(node) = self.model.nodes.get(index) else {
			return;
		};
		let (gx, gy) = self.viewport.transform.screen_to_graph(sx, sy);
		self.drag = Some(Drag {
			index,
			offset: (node.x - gx, node.y - gy),
		});
	}

	pub fn drag_to(&mut self, sx: f64, sy: f64) {
		let Some(drag) = self.drag else {
			return;
		};
		let (gx, gy) = self.viewport.transform.screen_to_graph(sx, sy);
		let (x, y) = (gx + drag.offset.0, gy + drag.offset.1);
		let Some(node) = self.model.nodes.get_mut(drag.index) else {
			return;
		};
		node.x = x;
		node.y = y;
		node.fixed = true;
		self.layout.pin(&node.id, x, y);
		self.layout.reheat();
	}

	/// Ends a drag. The node stays where it was dropped.
	pub fn end_drag(&mut self) -> Option<PointerRelease> {
		let drag = self.drag.take()?;
		let node = self.model.nodes.get(drag.index)?;
		Some(PointerRelease::DragEnd {
			id: node.id.clone(),
			x: node.x,
			y: node.y,
		})
	}

	pub fn begin_pan(&mut self, sx: f64, sy: f64) {
		let t = self.viewport.transform;
		self.pan = Some(Pan {
			pointer: (sx, sy),
			transform: (t.x, t.y),
		});
	}

	pub fn pan_to(&mut self, sx: f64, sy: f64) {
		if let Some(pan) = self.pan {
			self.viewport.transform.x = pan.transform.0 + (sx - pan.pointer.0);
			self.viewport.transform.y = pan.transform.1 + (sy - pan.pointer.1);
		}
	}

	/// Advances the layout one tick. Returns whether node positions changed.
	pub fn tick(&mut self, now_ms: f64) -> bool {
		match self.layout.step(now_ms) {
			Some(result) => self.apply_layout(&result),
			None => false,
		}
	}

	pub fn apply_layout(&mut self, result: &LayoutResult) -> bool {
		self.model.apply_layout(result, self.layout.generation())
	}
}
