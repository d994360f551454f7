use std::collections::HashMap;

use serde::Deserialize;

/// Shape a node is drawn with.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeShape {
	#[default]
	Circle,
	Square,
	Hexagon,
	Triangle,
}

/// A domain node as handed over by the investigation workspace.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GraphNode {
	pub id: String,
	pub label: String,
	#[serde(rename = "type")]
	pub node_type: String,
	pub size: Option<f64>,
	pub color: Option<String>,
	pub shape: Option<NodeShape>,
	pub icon: Option<String>,
	pub image_url: Option<String>,
	pub flag: Option<String>,
	pub lat: Option<f64>,
	pub lon: Option<f64>,
	pub x: Option<f64>,
	pub y: Option<f64>,
	pub fixed: bool,
}

/// A directed domain edge.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GraphLink {
	pub id: String,
	pub source: String,
	pub target: String,
	pub label: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct GraphData {
	pub nodes: Vec<GraphNode>,
	#[serde(alias = "edges")]
	pub links: Vec<GraphLink>,
}

/// Type name to CSS color lookup used when a node carries no explicit color.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(transparent)]
pub struct TypeColors(HashMap<String, String>);

impl TypeColors {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with(mut self, node_type: impl Into<String>, color: impl Into<String>) -> Self {
		self.0.insert(node_type.into(), color.into());
		self
	}

	pub fn get(&self, node_type: &str) -> Option<&str> {
		self.0.get(node_type).map(String::as_str)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn deserializes_domain_payload() {
		let data: GraphData = serde_json::from_str(
			r#"{
				"nodes": [
					{"id": "a", "label": "Alice", "type": "person", "imageUrl": "https://x/a.png", "shape": "hexagon"},
					{"id": "b", "label": "ACME", "type": "organization", "size": 7.5, "lat": 1.0, "extra": true}
				],
				"edges": [{"id": "e1", "source": "a", "target": "b"}]
			}"#,
		)
		.unwrap();

		assert_eq!(data.nodes.len(), 2);
		assert_eq!(data.nodes[0].shape, Some(NodeShape::Hexagon));
		assert_eq!(data.nodes[0].image_url.as_deref(), Some("https://x/a.png"));
		assert_eq!(data.nodes[1].size, Some(7.5));
		assert_eq!(data.links[0].label, None);
	}

	#[test]
	fn type_colors_lookup() {
		let colors = TypeColors::new().with("person", "#3b82f6");
		assert_eq!(colors.get("person"), Some("#3b82f6"));
		assert_eq!(colors.get("domain"), None);
	}
}
