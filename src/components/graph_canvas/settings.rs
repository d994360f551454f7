use serde::Deserialize;

use super::error::ConfigError;
use super::lod::LodThresholds;

/// Numeric rendering and simulation options, deserialized from the
/// workspace's camelCase settings object.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GraphSettings {
	/// Node size percentage.
	pub node_size: f64,
	pub neighbor_weight_multiplier: f64,
	pub link_width: f64,
	pub link_directional_arrow_length: f64,
	/// Arrow position along the edge, 0 at the source and 1 at the target.
	pub link_directional_arrow_rel_pos: f64,
	/// Node label size percentage.
	pub node_label_font_size: f64,
	/// Edge label size percentage.
	pub link_label_font_size: f64,
	pub node_outlined: bool,
	pub cooldown_ticks: u32,
	/// Milliseconds.
	pub cooldown_time: f64,
	pub alpha_decay: f64,
	pub alpha_min: f64,
	pub velocity_decay: f64,
	pub warmup_ticks: u32,
	pub lod: LodThresholds,
}

impl Default for GraphSettings {
	fn default() -> Self {
		Self {
			node_size: 80.0,
			neighbor_weight_multiplier: 1.0,
			link_width: 1.0,
			link_directional_arrow_length: 3.5,
			link_directional_arrow_rel_pos: 1.0,
			node_label_font_size: 100.0,
			link_label_font_size: 100.0,
			node_outlined: false,
			cooldown_ticks: 300,
			cooldown_time: 15_000.0,
			alpha_decay: 0.0228,
			alpha_min: 0.001,
			velocity_decay: 0.4,
			warmup_ticks: 0,
			lod: LodThresholds::default(),
		}
	}
}

impl GraphSettings {
	pub fn from_json(json: &str) -> Result<Self, ConfigError> {
		let settings: Self = serde_json::from_str(json)?;
		settings.validate()?;
		Ok(settings)
	}

	pub fn validate(&self) -> Result<(), ConfigError> {
		fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
			ConfigError::Invalid {
				field,
				reason: reason.into(),
			}
		}

		if !(0.0..=1.0).contains(&self.link_directional_arrow_rel_pos) {
			return Err(invalid("linkDirectionalArrowRelPos", "must be within 0..=1"));
		}
		for (field, value) in [
			("nodeSize", self.node_size),
			("nodeLabelFontSize", self.node_label_font_size),
			("linkLabelFontSize", self.link_label_font_size),
		] {
			if !value.is_finite() || value <= 0.0 {
				return Err(invalid(field, format!("must be positive, got {value}")));
			}
		}
		for (field, value) in [
			("linkWidth", self.link_width),
			("linkDirectionalArrowLength", self.link_directional_arrow_length),
			("neighborWeightMultiplier", self.neighbor_weight_multiplier),
			("cooldownTime", self.cooldown_time),
		] {
			if !value.is_finite() || value < 0.0 {
				return Err(invalid(field, format!("must not be negative, got {value}")));
			}
		}
		for (field, value) in [
			("alphaDecay", self.alpha_decay),
			("alphaMin", self.alpha_min),
			("velocityDecay", self.velocity_decay),
		] {
			if !(0.0..=1.0).contains(&value) {
				return Err(invalid(field, format!("must be within 0..=1, got {value}")));
			}
		}
		Ok(())
	}
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
	#[default]
	Light,
	Dark,
}

/// Resolved CSS colors for a theme.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Palette {
	pub background: &'static str,
	pub pattern_dot: &'static str,
	pub node_border: &'static str,
	pub label_text: &'static str,
	pub label_pill: &'static str,
	pub mock_label: &'static str,
	pub hover_ring: &'static str,
	pub highlight_ring: &'static str,
	pub edge: &'static str,
	pub edge_dimmed: &'static str,
	pub edge_highlight: &'static str,
	pub edge_selected: &'static str,
	pub edge_current: &'static str,
	pub edge_label: &'static str,
}

const LIGHT: Palette = Palette {
	background: "#f8fafc",
	pattern_dot: "rgba(100, 116, 139, 0.35)",
	node_border: "rgba(15, 23, 42, 0.25)",
	label_text: "#0f172a",
	label_pill: "rgba(255, 255, 255, 0.85)",
	mock_label: "rgba(15, 23, 42, 0.35)",
	hover_ring: "rgba(249, 115, 22, 0.55)",
	highlight_ring: "rgba(59, 130, 246, 0.35)",
	edge: "rgba(100, 116, 139, 0.6)",
	edge_dimmed: "rgba(100, 116, 139, 0.15)",
	edge_highlight: "#f97316",
	edge_selected: "#2563eb",
	edge_current: "#dc2626",
	edge_label: "#334155",
};

const DARK: Palette = Palette {
	background: "#1a1a2e",
	pattern_dot: "rgba(148, 163, 184, 0.22)",
	node_border: "rgba(255, 255, 255, 0.3)",
	label_text: "#f1f5f9",
	label_pill: "rgba(15, 23, 42, 0.8)",
	mock_label: "rgba(241, 245, 249, 0.35)",
	hover_ring: "rgba(251, 146, 60, 0.55)",
	highlight_ring: "rgba(100, 180, 255, 0.35)",
	edge: "rgba(100, 180, 255, 0.6)",
	edge_dimmed: "rgba(100, 180, 255, 0.12)",
	edge_highlight: "#fb923c",
	edge_selected: "#60a5fa",
	edge_current: "#f87171",
	edge_label: "#cbd5e1",
};

impl Theme {
	pub fn palette(self) -> &'static Palette {
		match self {
			Theme::Light => &LIGHT,
			Theme::Dark => &DARK,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn partial_json_keeps_defaults() {
		let settings =
			GraphSettings::from_json(r#"{"nodeSize": 120, "nodeOutlined": true}"#).unwrap();
		assert_eq!(settings.node_size, 120.0);
		assert!(settings.node_outlined);
		assert_eq!(settings.velocity_decay, GraphSettings::default().velocity_decay);
		assert_eq!(settings.lod, LodThresholds::default());
	}

	#[test]
	fn rejects_out_of_range_arrow_position() {
		let err = GraphSettings::from_json(r#"{"linkDirectionalArrowRelPos": 1.5}"#).unwrap_err();
		assert!(matches!(
			err,
			ConfigError::Invalid {
				field: "linkDirectionalArrowRelPos",
				..
			}
		));
	}

	#[test]
	fn rejects_malformed_json() {
		assert!(matches!(
			GraphSettings::from_json("{nodeSize:"),
			Err(ConfigError::Parse(_))
		));
	}

	#[test]
	fn theme_from_name() {
		let theme: Theme = serde_json::from_str("\"dark\"").unwrap();
		assert_eq!(theme.palette().background, "#1a1a2e");
	}
}
