//! Force layout stepped once per frame.
//!
//! Every [`ForceLayout::restart`] starts a new generation. Position batches
//! carry the generation they were computed in, so a batch produced before a
//! data change can be recognized and thrown away.

use std::collections::HashMap;

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData, SimulationParameters};

use super::settings::GraphSettings;
use super::transform::RenderModel;

/// Simulated seconds per tick at full heat.
const TICK_DT: f64 = 0.016;
const NODE_MASS: f32 = 10.0;
/// Heat restored when the user drags a node.
const REHEAT_ALPHA: f64 = 0.3;

fn simulation_parameters(velocity_decay: f64) -> SimulationParameters {
	SimulationParameters {
		force_charge: 150.0,
		force_spring: 0.05,
		force_max: 100.0,
		node_speed: 3000.0,
		damping_factor: (1.0 - velocity_decay) as f32,
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct LayoutResult {
	pub generation: u64,
	pub positions: Vec<(String, f64, f64)>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Schedule {
	alpha_decay: f64,
	alpha_min: f64,
	cooldown_ticks: u32,
	cooldown_time: f64,
	warmup_ticks: u32,
}

impl From<&GraphSettings> for Schedule {
	fn from(settings: &GraphSettings) -> Self {
		Self {
			alpha_decay: settings.alpha_decay,
			alpha_min: settings.alpha_min,
			cooldown_ticks: settings.cooldown_ticks,
			cooldown_time: settings.cooldown_time,
			warmup_ticks: settings.warmup_ticks,
		}
	}
}

pub struct ForceLayout {
	graph: ForceGraph<String, ()>,
	index_by_id: HashMap<String, DefaultNodeIdx>,
	velocity_decay: f64,
	schedule: Schedule,
	generation: u64,
	alpha: f64,
	ticks: u32,
	started_at: Option<f64>,
	running: bool,
}

impl ForceLayout {
	pub fn new(settings: &GraphSettings) -> Self {
		Self {
			graph: ForceGraph::new(simulation_parameters(settings.velocity_decay)),
			index_by_id: HashMap::new(),
			velocity_decay: settings.velocity_decay,
			schedule: Schedule::from(settings),
			generation: 0,
			alpha: 0.0,
			ticks: 0,
			started_at: None,
			running: false,
		}
	}

	pub fn generation(&self) -> u64 {
		self.generation
	}

	pub fn is_running(&self) -> bool {
		self.running
	}

	pub fn alpha(&self) -> f64 {
		self.alpha
	}

	/// Ticks since the last (re)start, warmup excluded.
	pub fn ticks(&self) -> u32 {
		self.ticks
	}

	/// Takes effect for the current run; the force constants are rebuilt on
	/// the next restart.
	pub fn configure(&mut self, settings: &GraphSettings) {
		self.velocity_decay = settings.velocity_decay;
		self.schedule = Schedule::from(settings);
	}

	/// Rebuilds the simulation from `model` and starts a new generation.
	/// Warmup ticks run here, before anything is drawn.
	pub fn restart(&mut self, model: &RenderModel) {
		let mut graph = ForceGraph::new(simulation_parameters(self.velocity_decay));
		let mut index_by_id = HashMap::with_capacity(model.nodes.len());
		for node in &model.nodes {
			let index = graph.add_node(NodeData {
				x: node.x as f32,
				y: node.y as f32,
				mass: NODE_MASS,
				is_anchor: node.fixed,
				user_data: node.id.clone(),
			});
			index_by_id.insert(node.id.clone(), index);
		}
		for edge in &model.edges {
			if let Some((source, target)) = edge.endpoints()
				&& source != target
			{
				let source = index_by_id[&model.nodes[source].id];
				let target = index_by_id[&model.nodes[target].id];
				graph.add_edge(source, target, EdgeData::default());
			}
		}

		self.graph = graph;
		self.index_by_id = index_by_id;
		self.generation += 1;
		self.alpha = 1.0;
		self.ticks = 0;
		self.started_at = None;
		self.running = !model.is_empty();

		for _ in 0..self.schedule.warmup_ticks {
			self.advance();
		}
		log::debug!(
			"layout generation {} started with {} nodes",
			self.generation,
			model.nodes.len()
		);
	}

	/// Heats a cooled or cooling layout back up without a new generation.
	pub fn reheat(&mut self) {
		if self.index_by_id.is_empty() {
			return;
		}
		self.alpha = self.alpha.max(REHEAT_ALPHA);
		self.ticks = 0;
		self.started_at = None;
		self.running = true;
	}

	fn advance(&mut self) {
		self.graph.update((TICK_DT * self.alpha) as f32);
		self.alpha += (0.0 - self.alpha) * self.schedule.alpha_decay;
	}

	/// One tick. `now_ms` is a monotonic clock used for the cooldown time.
	pub fn step(&mut self, now_ms: f64) -> Option<LayoutResult> {
		if !self.running {
			return None;
		}
		let started_at = *self.started_at.get_or_insert(now_ms);

		self.advance();
		self.ticks += 1;

		let schedule = &self.schedule;
		if self.ticks >= schedule.cooldown_ticks
			|| now_ms - started_at >= schedule.cooldown_time
			|| self.alpha < schedule.alpha_min
		{
			log::debug!(
				"layout generation {} cooled after {} ticks",
				self.generation,
				self.ticks
			);
			self.running = false;
		}
		Some(self.snapshot())
	}

	pub fn snapshot(&self) -> LayoutResult {
		let mut positions = Vec::with_capacity(self.index_by_id.len());
		self.graph.visit_nodes(|node| {
			positions.push((
				node.data.user_data.clone(),
				node.x() as f64,
				node.y() as f64,
			));
		});
		LayoutResult {
			generation: self.generation,
			positions,
		}
	}

	/// Holds the node at a position; returns false for unknown ids.
	pub fn pin(&mut self, id: &str, x: f64, y: f64) -> bool {
		let Some(&index) = self.index_by_id.get(id) else {
			return false;
		};
		self.graph.visit_nodes_mut(|node| {
			if node.index() == index {
				node.data.x = x as f32;
				node.data.y = y as f32;
				node.data.is_anchor = true;
			}
		});
		true
	}
}

impl RenderModel {
	/// Copies positions from a batch of the `current` generation. Returns
	/// false and leaves the model untouched for stale batches.
	pub fn apply_layout(&mut self, result: &LayoutResult, current: u64) -> bool {
		if result.generation != current {
			log::debug!(
				"dropped layout batch of generation {} (current {current})",
				result.generation
			);
			return false;
		}
		for (id, x, y) in &result.positions {
			if let Some(node) = self.node_mut(id)
				&& !node.fixed
			{
				node.x = *x;
				node.y = *y;
			}
		}
		true
	}
}
