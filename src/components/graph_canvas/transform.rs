use std::collections::HashMap;
use std::f64::consts::PI;

use indexmap::IndexSet;

use super::types::{GraphData, NodeShape, TypeColors};

pub const DEFAULT_NODE_COLOR: &str = "#94a3b8";
pub const DEFAULT_NODE_SIZE: f64 = 4.0;
/// Scales the fallback size into the same visual range as declared sizes.
pub const NODE_VISUAL_SCALE: f64 = 1.25;
/// Spacing between the curves of a parallel edge bundle.
pub const CURVATURE_STEP: f64 = 0.2;

const SEED_RADIUS: f64 = 100.0;

#[derive(Clone, Debug, PartialEq)]
pub struct RenderNode {
	pub id: String,
	pub label: String,
	pub node_type: String,
	pub x: f64,
	pub y: f64,
	pub fixed: bool,
	pub size: f64,
	pub color: String,
	pub shape: NodeShape,
	pub icon: Option<String>,
	pub image_url: Option<String>,
	pub flag: Option<String>,
	/// Indices into [`RenderModel::nodes`], unique by id.
	pub neighbors: Vec<usize>,
	/// Indices into [`RenderModel::edges`].
	pub links: Vec<usize>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RenderEdge {
	pub id: String,
	pub source_id: String,
	pub target_id: String,
	/// `None` while the endpoint is not part of the node list.
	pub source: Option<usize>,
	pub target: Option<usize>,
	pub label: Option<String>,
	pub curvature: f64,
	pub group_index: usize,
	pub group_size: usize,
}

impl RenderEdge {
	pub fn key(&self) -> String {
		edge_key(&self.source_id, &self.target_id)
	}

	pub fn endpoints(&self) -> Option<(usize, usize)> {
		self.source.zip(self.target)
	}
}

pub fn edge_key(source: &str, target: &str) -> String {
	format!("{source}-{target}")
}

/// Curvature of edge `index` inside a bundle of `size` parallel edges.
pub fn bundle_curvature(index: usize, size: usize) -> f64 {
	(index as f64 - (size as f64 - 1.0) / 2.0) * CURVATURE_STEP
}

#[derive(Clone, Debug, Default)]
pub struct RenderModel {
	pub nodes: Vec<RenderNode>,
	pub edges: Vec<RenderEdge>,
	pub index_by_id: HashMap<String, usize>,
}

impl RenderModel {
	pub fn node(&self, id: &str) -> Option<&RenderNode> {
		self.index_by_id.get(id).map(|&index| &self.nodes[index])
	}

	pub fn node_mut(&mut self, id: &str) -> Option<&mut RenderNode> {
		let index = *self.index_by_id.get(id)?;
		self.nodes.get_mut(index)
	}

	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}
}

/// Builds a fresh render model. Positions of ids that already exist in
/// `previous` are carried over unless the data pins them explicitly.
pub fn build_render_model(
	data: &GraphData,
	type_colors: &TypeColors,
	previous: Option<&RenderModel>,
) -> RenderModel {
	let count = data.nodes.len();
	let mut index_by_id = HashMap::with_capacity(count);
	let mut nodes = Vec::with_capacity(count);

	for node in &data.nodes {
		if index_by_id.contains_key(&node.id) {
			log::warn!("duplicate node id {:?} ignored", node.id);
			continue;
		}
		let index = nodes.len();
		let carried = previous.and_then(|model| model.node(&node.id));
		let (x, y) = match (node.x, node.y, carried) {
			(Some(x), Some(y), _) => (x, y),
			(_, _, Some(prior)) => (prior.x, prior.y),
			_ => {
				let angle = (index as f64) * 2.0 * PI / count.max(1) as f64;
				(SEED_RADIUS * angle.cos(), SEED_RADIUS * angle.sin())
			}
		};
		let color = node
			.color
			.clone()
			.or_else(|| type_colors.get(&node.node_type).map(str::to_owned))
			.unwrap_or_else(|| DEFAULT_NODE_COLOR.to_owned());

		index_by_id.insert(node.id.clone(), index);
		nodes.push(RenderNode {
			id: node.id.clone(),
			label: node.label.clone(),
			node_type: node.node_type.clone(),
			x,
			y,
			fixed: node.fixed || carried.is_some_and(|prior| prior.fixed),
			size: node.size.unwrap_or(DEFAULT_NODE_SIZE * NODE_VISUAL_SCALE),
			color,
			shape: node.shape.unwrap_or_default(),
			icon: node.icon.clone(),
			image_url: node.image_url.clone(),
			flag: node.flag.clone(),
			neighbors: Vec::new(),
			links: Vec::new(),
		});
	}

	let mut groups: HashMap<(&str, &str), Vec<usize>> = HashMap::new();
	for (index, link) in data.links.iter().enumerate() {
		groups
			.entry((link.source.as_str(), link.target.as_str()))
			.or_default()
			.push(index);
	}
	let mut bundle = vec![(0usize, 1usize); data.links.len()];
	for members in groups.values() {
		for (position, &edge_index) in members.iter().enumerate() {
			bundle[edge_index] = (position, members.len());
		}
	}

	let mut neighbor_sets: HashMap<usize, IndexSet<usize>> = HashMap::new();
	let mut incident: HashMap<usize, Vec<usize>> = HashMap::new();
	let mut edges = Vec::with_capacity(data.links.len());

	for (edge_index, link) in data.links.iter().enumerate() {
		let source = index_by_id.get(&link.source).copied();
		let target = index_by_id.get(&link.target).copied();
		let (group_index, group_size) = bundle[edge_index];

		if let (Some(source), Some(target)) = (source, target) {
			incident.entry(source).or_default().push(edge_index);
			if source != target {
				incident.entry(target).or_default().push(edge_index);
				neighbor_sets.entry(source).or_default().insert(target);
				neighbor_sets.entry(target).or_default().insert(source);
			}
		} else {
			log::debug!("edge {:?} is dangling", link.id);
		}

		edges.push(RenderEdge {
			id: link.id.clone(),
			source_id: link.source.clone(),
			target_id: link.target.clone(),
			source,
			target,
			label: link.label.clone(),
			curvature: bundle_curvature(group_index, group_size),
			group_index,
			group_size,
		});
	}

	for (index, neighbors) in neighbor_sets {
		nodes[index].neighbors = neighbors.into_iter().collect();
	}
	for (index, links) in incident {
		nodes[index].links = links;
	}

	RenderModel {
		nodes,
		edges,
		index_by_id,
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::graph_canvas::types::{GraphLink, GraphNode};

	fn node(id: &str) -> GraphNode {
		GraphNode {
			id: id.into(),
			label: id.to_uppercase(),
			..GraphNode::default()
		}
	}

	fn link(id: &str, source: &str, target: &str) -> GraphLink {
		GraphLink {
			id: id.into(),
			source: source.into(),
			target: target.into(),
			label: None,
		}
	}

	#[test]
	fn parallel_pair_is_symmetric() {
		let data = GraphData {
			nodes: vec![
				GraphNode {
					size: Some(5.0),
					..node("a")
				},
				GraphNode {
					size: Some(5.0),
					..node("b")
				},
			],
			links: vec![link("e1", "a", "b"), link("e2", "a", "b")],
		};
		let model = build_render_model(&data, &TypeColors::new(), None);
		assert!((model.edges[0].curvature + 0.1).abs() < 1e-12);
		assert!((model.edges[1].curvature - 0.1).abs() < 1e-12);
	}

	#[test]
	fn bundle_curvature_is_even_and_centered() {
		for size in 1..8 {
			let values = (0..size).map(|i| bundle_curvature(i, size)).collect::<Vec<_>>();
			assert!(values.windows(2).all(|pair| pair[1] > pair[0]));
			for i in 0..size {
				assert!((values[i] + values[size - 1 - i]).abs() < 1e-12);
			}
		}
		assert_eq!(bundle_curvature(0, 1), 0.0);
	}

	#[test]
	fn reverse_direction_is_its_own_bundle() {
		let data = GraphData {
			nodes: vec![node("a"), node("b")],
			links: vec![link("e1", "a", "b"), link("e2", "b", "a")],
		};
		let model = build_render_model(&data, &TypeColors::new(), None);
		assert_eq!(model.edges[0].curvature, 0.0);
		assert_eq!(model.edges[1].curvature, 0.0);
		assert_eq!(model.edges[1].group_size, 1);
	}

	#[test]
	fn neighbors_are_unique_by_id() {
		let data = GraphData {
			nodes: vec![node("a"), node("b"), node("c")],
			links: vec![
				link("e1", "a", "b"),
				link("e2", "b", "a"),
				link("e3", "a", "b"),
				link("e4", "c", "a"),
			],
		};
		let model = build_render_model(&data, &TypeColors::new(), None);
		let a = model.node("a").unwrap();
		assert_eq!(a.neighbors, vec![1, 2]);
		assert_eq!(a.links, vec![0, 1, 2, 3]);
		assert_eq!(model.node("b").unwrap().neighbors, vec![0]);
	}

	#[test]
	fn dangling_and_self_loops() {
		let data = GraphData {
			nodes: vec![node("a")],
			links: vec![link("e1", "a", "ghost"), link("e2", "a", "a")],
		};
		let model = build_render_model(&data, &TypeColors::new(), None);
		assert_eq!(model.edges[0].endpoints(), None);
		assert_eq!(model.edges[1].endpoints(), Some((0, 0)));
		let a = model.node("a").unwrap();
		assert!(a.neighbors.is_empty());
		assert_eq!(a.links, vec![1]);
	}

	#[test]
	fn color_and_size_fallbacks() {
		let data = GraphData {
			nodes: vec![
				GraphNode {
					color: Some("#111111".into()),
					node_type: "person".into(),
					..node("a")
				},
				GraphNode {
					node_type: "person".into(),
					..node("b")
				},
				node("c"),
			],
			links: Vec::new(),
		};
		let colors = TypeColors::new().with("person", "#3b82f6");
		let model = build_render_model(&data, &colors, None);
		assert_eq!(model.nodes[0].color, "#111111");
		assert_eq!(model.nodes[1].color, "#3b82f6");
		assert_eq!(model.nodes[2].color, DEFAULT_NODE_COLOR);
		assert_eq!(model.nodes[2].size, DEFAULT_NODE_SIZE * NODE_VISUAL_SCALE);
	}

	#[test]
	fn rebuild_carries_positions() {
		let data = GraphData {
			nodes: vec![node("a"), node("b")],
			links: Vec::new(),
		};
		let mut first = build_render_model(&data, &TypeColors::new(), None);
		let a = first.node_mut("a").unwrap();
		a.x = 42.0;
		a.y = -7.0;
		a.fixed = true;

		let next = GraphData {
			nodes: vec![node("c"), node("a")],
			links: Vec::new(),
		};
		let second = build_render_model(&next, &TypeColors::new(), Some(&first));
		let a = second.node("a").unwrap();
		assert_eq!((a.x, a.y, a.fixed), (42.0, -7.0, true));
	}
}
