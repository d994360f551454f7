//! Investigation graph canvas: a Leptos component that renders typed entity
//! graphs into a 2D canvas, plus a demo app that mounts it.
//!
//! Hosts embed [`GraphCanvas`] directly, or serve the app and hand the graph
//! over in `<script id="graph-data">` on the `/embed` route.

use leptos::prelude::*;
use leptos_meta::*;
use leptos_router::components::*;
use leptos_router::path;
use log::{Level, info};

mod components;
mod pages;

pub use components::graph_canvas::{
	CanvasError, ConfigError, DrawError, GraphCanvas, GraphData, GraphEvents, GraphLink, GraphNode,
	GraphSettings, ImageLoadError, LodThresholds, NodeShape, RenderEdge, RenderNode, Theme,
	TypeColors,
};

use crate::pages::embed::Embed;
use crate::pages::home::Home;
use crate::pages::not_found::NotFound;

const LOG_LEVEL: Level = if cfg!(debug_assertions) {
	Level::Debug
} else {
	Level::Info
};

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(LOG_LEVEL);
	console_error_panic_hook::set_once();
	info!("logging initialized at {LOG_LEVEL}");
}

/// Demo app: the sample investigation on `/`, the embedded graph on `/embed`.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	view! {
		<Html attr:lang="en" attr:dir="ltr" />
		<Title text="Investigation Graph" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<Router>
			<Routes fallback=|| view! { <NotFound /> }>
				<Route path=path!("/") view=Home />
				<Route path=path!("/embed") view=Embed />
			</Routes>
		</Router>
	}
}
