//! Zoom-dependent level of detail and the node size formula every renderer
//! shares. Edges terminate on the node boundary only because the edge
//! renderer, arrow placement and hit testing all go through [`rendered_size`].

use serde::Deserialize;

use super::settings::GraphSettings;
use super::transform::RenderNode;

/// Neighbor bonus stops growing past this many groups of five neighbors.
pub const NEIGHBOR_BONUS_CAP: f64 = 4.0;
/// Applied to every node while the view is zoomed out past the detail threshold.
pub const ZOOMED_OUT_MULTIPLIER: f64 = 1.35;

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LodThresholds {
	/// Below this zoom no edges are drawn.
	pub edge_visibility: f64,
	/// Below this zoom nodes are drawn simplified.
	pub node_detail: f64,
	/// Above this zoom highlighted edges carry their label.
	pub edge_detail: f64,
	/// Below this zoom the background pattern is hidden.
	pub background: f64,
}

impl Default for LodThresholds {
	fn default() -> Self {
		Self {
			edge_visibility: 0.25,
			node_detail: 1.2,
			edge_detail: 1.6,
			background: 0.4,
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LodState {
	pub zoom: f64,
	pub draw_edges: bool,
	pub node_detail: bool,
	pub edge_detail: bool,
}

impl LodState {
	pub fn from_zoom(zoom: f64, thresholds: &LodThresholds) -> Self {
		Self {
			zoom,
			draw_edges: zoom >= thresholds.edge_visibility,
			node_detail: zoom >= thresholds.node_detail,
			edge_detail: zoom > thresholds.edge_detail,
		}
	}
}

pub fn node_size(
	declared_size: f64,
	neighbor_count: usize,
	settings: &GraphSettings,
	detail: bool,
) -> f64 {
	let size_multiplier = settings.node_size / 100.0 + 0.2;
	let neighbor_bonus =
		(neighbor_count as f64 / 5.0).min(NEIGHBOR_BONUS_CAP) * settings.neighbor_weight_multiplier;
	let base_size = (declared_size + neighbor_bonus) * size_multiplier;
	if detail {
		base_size
	} else {
		base_size * ZOOMED_OUT_MULTIPLIER
	}
}

pub fn rendered_size(node: &RenderNode, settings: &GraphSettings, lod: &LodState) -> f64 {
	node_size(node.size, node.neighbors.len(), settings, lod.node_detail)
}
