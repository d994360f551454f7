use leptos::prelude::*;
use log::{info, warn};
use wasm_bindgen::JsCast;
use web_sys::HtmlScriptElement;

use crate::components::graph_canvas::{GraphCanvas, GraphData, GraphSettings, Theme};

fn script_text(id: &str) -> Option<String> {
	let document = web_sys::window()?.document()?;
	let script: HtmlScriptElement = document.get_element_by_id(id)?.dyn_into().ok()?;
	script.text().ok()
}

/// Reads a JSON graph from `<script id="graph-data">` when the page has one.
pub(crate) fn embedded_graph() -> Option<GraphData> {
	let json = script_text("graph-data")?;
	match serde_json::from_str::<GraphData>(&json) {
		Ok(data) => {
			info!("loaded {} nodes, {} edges", data.nodes.len(), data.links.len());
			Some(data)
		}
		Err(error) => {
			warn!("embedded graph data is invalid: {error}");
			None
		}
	}
}

/// Reads `<script id="graph-settings">`; invalid settings fall back to defaults.
pub(crate) fn embedded_settings() -> GraphSettings {
	let Some(json) = script_text("graph-settings") else {
		return GraphSettings::default();
	};
	GraphSettings::from_json(&json).unwrap_or_else(|error| {
		warn!("{error}");
		GraphSettings::default()
	})
}

/// Bare canvas for hosts that embed the graph in their own page.
#[component]
pub fn Embed() -> impl IntoView {
	let graph = embedded_graph().unwrap_or_default();
	let theme = match script_text("graph-theme").as_deref().map(str::trim) {
		Some("dark") => Theme::Dark,
		_ => Theme::Light,
	};
	let (graph_data, _) = signal(graph);

	view! { <GraphCanvas data=graph_data settings=embedded_settings() theme=theme fullscreen=true /> }
}
