use std::cell::{Cell, Ref, RefCell};
use std::collections::HashSet;
use std::rc::Rc;

use super::scheduler::{FrameHandle, FrameScheduler};
use super::transform::{RenderModel, edge_key};

/// Emphasized node ids and edge keys. Always replaced as a whole so the two
/// sets describe the same hover or selection.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HighlightState {
	pub nodes: HashSet<String>,
	pub links: HashSet<String>,
	/// Set only for hover highlights, never for a multi-selection.
	pub hovered: Option<String>,
}

impl HighlightState {
	pub fn is_active(&self) -> bool {
		!self.nodes.is_empty() || !self.links.is_empty()
	}

	pub fn has_node(&self, id: &str) -> bool {
		self.nodes.contains(id)
	}

	pub fn has_link(&self, key: &str) -> bool {
		self.links.contains(key)
	}

	pub fn is_hovered(&self, id: &str) -> bool {
		self.hovered.as_deref() == Some(id)
	}

	fn add_neighborhood(&mut self, model: &RenderModel, index: usize) {
		let Some(node) = model.nodes.get(index) else {
			return;
		};
		self.nodes.insert(node.id.clone());
		for &neighbor in &node.neighbors {
			self.nodes.insert(model.nodes[neighbor].id.clone());
		}
		for &edge in &node.links {
			self.links.insert(model.edges[edge].key());
		}
	}

	pub fn for_node(model: &RenderModel, index: usize) -> Self {
		let mut state = Self::default();
		state.add_neighborhood(model, index);
		state.hovered = model.nodes.get(index).map(|node| node.id.clone());
		state
	}

	pub fn for_edge(model: &RenderModel, index: usize) -> Self {
		let Some(edge) = model.edges.get(index) else {
			return Self::default();
		};
		Self {
			nodes: HashSet::from([edge.source_id.clone(), edge.target_id.clone()]),
			links: HashSet::from([edge_key(&edge.source_id, &edge.target_id)]),
			hovered: None,
		}
	}

	pub fn for_selection<'a>(model: &RenderModel, ids: impl IntoIterator<Item = &'a str>) -> Self {
		let mut state = Self::default();
		for id in ids {
			if let Some(&index) = model.index_by_id.get(id) {
				state.add_neighborhood(model, index);
			}
		}
		state
	}
}

/// Turns hover and selection input into highlight updates applied at most
/// once per frame. A newer request cancels the pending one, so the last
/// input of a frame is the one applied.
pub struct HighlightEngine {
	scheduler: Rc<dyn FrameScheduler>,
	current: Rc<RefCell<HighlightState>>,
	pending: Option<FrameHandle>,
	applied: Rc<Cell<u64>>,
	selection: Vec<String>,
}

impl HighlightEngine {
	pub fn new(scheduler: Rc<dyn FrameScheduler>) -> Self {
		Self {
			scheduler,
			current: Rc::default(),
			pending: None,
			applied: Rc::default(),
			selection: Vec::new(),
		}
	}

	pub fn current(&self) -> Ref<'_, HighlightState> {
		self.current.borrow()
	}

	/// Number of highlight updates that reached the renderers.
	pub fn updates_applied(&self) -> u64 {
		self.applied.get()
	}

	pub fn selection(&self) -> &[String] {
		&self.selection
	}

	fn schedule(&mut self, next: HighlightState) {
		if let Some(handle) = self.pending.take() {
			self.scheduler.cancel(handle);
		}
		let (current, applied) = (self.current.clone(), self.applied.clone());
		self.pending = Some(self.scheduler.request(Box::new(move || {
			*current.borrow_mut() = next;
			applied.set(applied.get() + 1);
		})));
	}

	pub fn hover_node(&mut self, model: &RenderModel, index: usize) {
		if self.selection.is_empty() {
			self.schedule(HighlightState::for_node(model, index));
		}
	}

	pub fn hover_edge(&mut self, model: &RenderModel, index: usize) {
		if self.selection.is_empty() {
			self.schedule(HighlightState::for_edge(model, index));
		}
	}

	/// Pointer left every entity.
	pub fn clear_hover(&mut self) {
		if self.selection.is_empty() {
			self.schedule(HighlightState::default());
		}
	}

	pub fn select_nodes(&mut self, model: &RenderModel, ids: Vec<String>) {
		let next = HighlightState::for_selection(model, ids.iter().map(String::as_str));
		self.selection = ids;
		self.schedule(next);
	}

	pub fn clear_selection(&mut self) {
		self.selection.clear();
		self.schedule(HighlightState::default());
	}

	/// Drops everything immediately; used when the graph data is replaced.
	pub fn reset(&mut self) {
		if let Some(handle) = self.pending.take() {
			self.scheduler.cancel(handle);
		}
		self.selection.clear();
		*self.current.borrow_mut() = HighlightState::default();
	}
}
