use leptos::prelude::*;
use log::info;

use super::embed::{embedded_graph, embedded_settings};
use crate::components::graph_canvas::{
	GraphCanvas, GraphData, GraphEvents, GraphLink, GraphNode, NodeShape, RenderNode, Theme,
	TypeColors,
};

const TYPES: &[(&str, &str)] = &[
	("person", "#6366f1"),
	("organization", "#0ea5e9"),
	("email", "#f59e0b"),
	("domain", "#10b981"),
	("phone", "#ec4899"),
];

/// Sample investigation: a few people around two companies, with the
/// mailboxes, domains and phones linking them.
fn sample_graph(people: usize) -> GraphData {
	let node = |id: String, label: String, node_type: &str| GraphNode {
		id,
		label,
		node_type: node_type.into(),
		..GraphNode::default()
	};
	let link = |source: &str, target: &str, label: &str| GraphLink {
		id: format!("{source}->{target}:{label}"),
		source: source.into(),
		target: target.into(),
		label: Some(label.into()),
	};

	let mut nodes = vec![
		GraphNode {
			shape: Some(NodeShape::Square),
			..node("org-0".into(), "Acme Holdings".into(), "organization")
		},
		GraphNode {
			shape: Some(NodeShape::Square),
			flag: Some("red".into()),
			..node("org-1".into(), "Blue Harbor Ltd".into(), "organization")
		},
		GraphNode {
			shape: Some(NodeShape::Hexagon),
			..node("domain-0".into(), "acme.example".into(), "domain")
		},
	];
	let mut links = vec![link("org-0", "domain-0", "owns"), link("org-1", "org-0", "subsidiary of")];

	for i in 0..people {
		let person = format!("person-{i}");
		let org = format!("org-{}", i % 2);
		nodes.push(node(person.clone(), format!("Person {i}"), "person"));
		links.push(link(&person, &org, "employed by"));

		if i % 3 == 0 {
			let mail = format!("email-{i}");
			nodes.push(GraphNode {
				shape: Some(NodeShape::Triangle),
				..node(mail.clone(), format!("p{i}@acme.example"), "email")
			});
			links.push(link(&person, &mail, "uses"));
			links.push(link(&mail, "domain-0", "hosted on"));
		}
		if i % 4 == 1 {
			let phone = format!("phone-{i}");
			nodes.push(node(phone.clone(), format!("+1 555 01{i:02}"), "phone"));
			links.push(link(&person, &phone, "calls"));
			links.push(link(&person, &phone, "texts"));
		}
	}
	GraphData { nodes, links }
}

fn type_colors() -> TypeColors {
	TYPES
		.iter()
		.fold(TypeColors::new(), |colors, (node_type, color)| colors.with(*node_type, *color))
}

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	let graph = embedded_graph().unwrap_or_else(|| sample_graph(12));
	let (graph_data, _) = signal(graph);
	let (theme, set_theme) = signal(Theme::Light);
	let (selected, set_selected) = signal(Vec::<String>::new());
	let (status, set_status) = signal(String::from("Click a node to select it."));

	let events = GraphEvents {
		on_node_click: Some(Callback::new(move |node: RenderNode| {
			set_selected.set(vec![node.id.clone()]);
			set_status.set(format!("{} ({})", node.label, node.node_type));
		})),
		on_background_click: Some(Callback::new(move |_: (f64, f64)| {
			set_selected.set(Vec::new());
			set_status.set(String::from("Click a node to select it."));
		})),
		on_node_drag_end: Some(Callback::new(move |(id, x, y): (String, f64, f64)| {
			info!("{id} dropped at ({x:.0}, {y:.0})");
		})),
		..GraphEvents::default()
	};

	let toggle_theme = move |_| {
		set_theme.update(|theme| {
			*theme = match theme {
				Theme::Light => Theme::Dark,
				Theme::Dark => Theme::Light,
			}
		})
	};

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>

			<div class="fullscreen-graph">
				<GraphCanvas
					data=graph_data
					settings=embedded_settings()
					theme=theme
					type_colors=type_colors()
					selected_nodes=selected
					events=events
					fullscreen=true
				/>
				<div class="graph-overlay">
					<h1>"Investigation Graph"</h1>
					<p class="subtitle">"Drag nodes to reposition. Scroll to zoom. Drag background to pan."</p>
					<p class="status">{status}</p>
					<button on:click=toggle_theme>"Toggle theme"</button>
				</div>
			</div>
		</ErrorBoundary>
	}
}
