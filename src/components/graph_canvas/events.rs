use leptos::prelude::{Callable, Callback};

use super::state::{Hit, HoverChange, PointerRelease, RenderState};
use super::transform::{RenderEdge, RenderNode};

pub type NodeCallback = Callback<RenderNode>;
pub type EdgeCallback = Callback<RenderEdge>;
/// Receives the graph-space point of the event.
pub type BackgroundCallback = Callback<(f64, f64)>;
/// Receives the dropped node's id and final position.
pub type DragEndCallback = Callback<(String, f64, f64)>;

/// Host callbacks. Every handler is optional.
#[derive(Clone, Default)]
pub struct GraphEvents {
	pub on_node_click: Option<NodeCallback>,
	pub on_node_right_click: Option<NodeCallback>,
	pub on_edge_click: Option<EdgeCallback>,
	pub on_edge_right_click: Option<EdgeCallback>,
	pub on_background_click: Option<BackgroundCallback>,
	pub on_background_right_click: Option<BackgroundCallback>,
	pub on_node_hover: Option<NodeCallback>,
	pub on_node_hover_end: Option<NodeCallback>,
	pub on_edge_hover: Option<EdgeCallback>,
	pub on_edge_hover_end: Option<EdgeCallback>,
	pub on_node_drag_end: Option<DragEndCallback>,
}

impl GraphEvents {
	fn node(&self, state: &RenderState, index: usize, handler: &Option<NodeCallback>) {
		if let (Some(handler), Some(node)) = (handler, state.model.nodes.get(index)) {
			handler.run(node.clone());
		}
	}

	fn edge(&self, state: &RenderState, index: usize, handler: &Option<EdgeCallback>) {
		if let (Some(handler), Some(edge)) = (handler, state.model.edges.get(index)) {
			handler.run(edge.clone());
		}
	}

	fn background(&self, state: &RenderState, sx: f64, sy: f64, handler: &Option<BackgroundCallback>) {
		if let Some(handler) = handler {
			let (gx, gy) = state.viewport.transform.screen_to_graph(sx, sy);
			handler.run((gx, gy));
		}
	}

	pub fn hover(&self, state: &RenderState, change: &HoverChange) {
		match change.left {
			Some(Hit::Node(index)) => self.node(state, index, &self.on_node_hover_end),
			Some(Hit::Edge(index)) => self.edge(state, index, &self.on_edge_hover_end),
			None => {}
		}
		match change.entered {
			Some(Hit::Node(index)) => self.node(state, index, &self.on_node_hover),
			Some(Hit::Edge(index)) => self.edge(state, index, &self.on_edge_hover),
			None => {}
		}
	}

	/// `(sx, sy)` is where the pointer was released.
	pub fn release(&self, state: &RenderState, release: &PointerRelease, sx: f64, sy: f64) {
		match release {
			PointerRelease::Click(Some(Hit::Node(index))) => {
				self.node(state, *index, &self.on_node_click)
			}
			PointerRelease::Click(Some(Hit::Edge(index))) => {
				self.edge(state, *index, &self.on_edge_click)
			}
			PointerRelease::Click(None) => self.background(state, sx, sy, &self.on_background_click),
			PointerRelease::DragEnd { id, x, y } => {
				if let Some(handler) = &self.on_node_drag_end {
					handler.run((id.clone(), *x, *y));
				}
			}
			PointerRelease::PanEnd | PointerRelease::Idle => {}
		}
	}

	pub fn context_menu(&self, state: &RenderState, hit: Option<Hit>, sx: f64, sy: f64) {
		match hit {
			Some(Hit::Node(index)) => self.node(state, index, &self.on_node_right_click),
			Some(Hit::Edge(index)) => self.edge(state, index, &self.on_edge_right_click),
			None => self.background(state, sx, sy, &self.on_background_right_click),
		}
	}
}
