use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use leptos::prelude::*;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlElement, MouseEvent, WheelEvent};

use super::background::ElementPatternSurface;
use super::events::GraphEvents;
use super::image_cache::{HtmlImageLoader, ImageCache};
use super::render::render_frame;
use super::scheduler::AnimationFrameScheduler;
use super::settings::{GraphSettings, Theme};
use super::state::{Hit, RenderState};
use super::types::{GraphData, TypeColors};

const ZOOM_STEP: f64 = 1.1;

/// Everything that exists once the canvas element is mounted.
struct Mounted {
	state: RenderState,
	ctx: CanvasRenderingContext2d,
	images: ImageCache<HtmlImageLoader>,
	surface: ElementPatternSurface,
}

type Shared = Rc<RefCell<Option<Mounted>>>;
type FrameLoop = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

fn measure(canvas: &HtmlCanvasElement, fullscreen: bool, width: Option<f64>, height: Option<f64>) -> (f64, f64) {
	let window_size = || {
		let window = web_sys::window()?;
		Some((
			window.inner_width().ok()?.as_f64()?,
			window.inner_height().ok()?.as_f64()?,
		))
	};
	if fullscreen && let Some(size) = window_size() {
		return size;
	}
	let parent = canvas.parent_element();
	(
		width.unwrap_or_else(|| parent.as_ref().map(|p| p.client_width() as f64).unwrap_or(800.0)),
		height.unwrap_or_else(|| parent.as_ref().map(|p| p.client_height() as f64).unwrap_or(600.0)),
	)
}

fn context_2d(canvas: &HtmlCanvasElement) -> Option<CanvasRenderingContext2d> {
	canvas.get_context("2d").ok().flatten()?.dyn_into().ok()
}

fn request_frame(frame: &FrameLoop) {
	let Some(window) = web_sys::window() else {
		return;
	};
	if let Some(cb) = frame.borrow().as_ref()
		&& let Err(error) = window.request_animation_frame(cb.as_ref().unchecked_ref())
	{
		log::warn!("requestAnimationFrame failed: {error:?}");
	}
}

/// Starts a loop that runs `body` once per display frame until `alive` drops.
fn frame_loop(alive: Arc<AtomicBool>, mut body: impl FnMut() + 'static) {
	let frame: FrameLoop = Rc::new(RefCell::new(None));
	let next = frame.clone();
	*frame.borrow_mut() = Some(Closure::new(move || {
		if !alive.load(Ordering::Relaxed) {
			return;
		}
		body();
		request_frame(&next);
	}));
	request_frame(&frame);
}

fn local_point(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some((
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

/// Graph canvas with its own render and background loops. Every input is
/// reactive; changing `data` keeps the positions of nodes that survive.
#[component]
pub fn GraphCanvas(
	#[prop(into)] data: Signal<GraphData>,
	#[prop(into, optional)] settings: MaybeProp<GraphSettings>,
	#[prop(into, optional)] theme: MaybeProp<Theme>,
	#[prop(into, optional)] type_colors: MaybeProp<TypeColors>,
	#[prop(into, optional)] selected_nodes: MaybeProp<Vec<String>>,
	#[prop(into, optional)] selected_edges: MaybeProp<Vec<String>>,
	#[prop(into, optional)] current_edge: MaybeProp<String>,
	#[prop(optional)] events: GraphEvents,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let pattern_ref = NodeRef::<leptos::html::Div>::new();
	let mounted: Shared = Rc::new(RefCell::new(None));
	let alive = Arc::new(AtomicBool::new(true));
	let resize_cb: FrameLoop = Rc::new(RefCell::new(None));

	let (mounted_init, alive_init) = (mounted.clone(), alive.clone());
	Effect::new(move |_| {
		if mounted_init.borrow().is_some() {
			return;
		}
		let (Some(canvas), Some(pattern)) = (canvas_ref.get(), pattern_ref.get()) else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let pattern: HtmlElement = pattern.into();
		let Some(ctx) = context_2d(&canvas) else {
			log::error!("canvas has no 2d context");
			return;
		};

		let (w, h) = measure(&canvas, fullscreen, width, height);
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let theme = theme.get_untracked().unwrap_or_default();
		let mut state = RenderState::new(Rc::new(AnimationFrameScheduler::new()), w, h);
		state.set_settings(settings.get_untracked().unwrap_or_default());
		state.set_theme(theme);
		state.set_type_colors(type_colors.get_untracked().unwrap_or_default());
		state.set_data(data.get_untracked());
		*mounted_init.borrow_mut() = Some(Mounted {
			state,
			ctx,
			images: ImageCache::new(HtmlImageLoader),
			surface: ElementPatternSurface::new(pattern, theme.palette().pattern_dot),
		});
		log::info!("graph canvas mounted at {w}x{h}");

		let (mounted_resize, canvas_resize) = (mounted_init.clone(), canvas.clone());
		let alive_resize = alive_init.clone();
		*resize_cb.borrow_mut() = Some(Closure::new(move || {
			if !alive_resize.load(Ordering::Relaxed) {
				return;
			}
			let (nw, nh) = measure(&canvas_resize, fullscreen, width, height);
			canvas_resize.set_width(nw as u32);
			canvas_resize.set_height(nh as u32);
			if let Some(m) = mounted_resize.borrow_mut().as_mut() {
				m.state.resize(nw, nh);
			}
		}));
		if let (Some(window), Some(cb)) = (web_sys::window(), resize_cb.borrow().as_ref()) {
			let _ = window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
		}

		let mounted_render = mounted_init.clone();
		frame_loop(alive_init.clone(), move || {
			if let Some(m) = mounted_render.borrow_mut().as_mut() {
				m.state.tick(js_sys::Date::now());
				if let Err(error) = render_frame(&m.state, &m.ctx, &m.images) {
					log::warn!("frame failed: {error}");
				}
			}
		});

		let mounted_pattern = mounted_init.clone();
		frame_loop(alive_init.clone(), move || {
			if let Some(m) = mounted_pattern.borrow_mut().as_mut() {
				let Mounted { state, surface, .. } = m;
				state.background.tick(&state.viewport, surface);
			}
		});
	});

	let with_state = {
		let mounted = mounted.clone();
		move |apply: &dyn Fn(&mut Mounted)| {
			if let Some(m) = mounted.borrow_mut().as_mut() {
				apply(m);
			}
		}
	};

	let sync = with_state.clone();
	Effect::new(move |_| {
		let data = data.get();
		sync(&|m| m.state.set_data(data.clone()));
	});
	let sync = with_state.clone();
	Effect::new(move |_| {
		let settings = settings.get().unwrap_or_default();
		sync(&|m| m.state.set_settings(settings.clone()));
	});
	let sync = with_state.clone();
	Effect::new(move |_| {
		let theme = theme.get().unwrap_or_default();
		sync(&|m| {
			m.state.set_theme(theme);
			m.surface.set_dot_color(theme.palette().pattern_dot);
		});
	});
	let sync = with_state.clone();
	Effect::new(move |_| {
		let colors = type_colors.get().unwrap_or_default();
		sync(&|m| m.state.set_type_colors(colors.clone()));
	});
	let sync = with_state.clone();
	Effect::new(move |_| {
		let ids = selected_nodes.get().unwrap_or_default();
		sync(&|m| m.state.select_nodes(ids.clone()));
	});
	let sync = with_state.clone();
	Effect::new(move |_| {
		let ids = selected_edges.get().unwrap_or_default();
		sync(&|m| m.state.select_edges(ids.clone()));
	});
	let sync = with_state;
	Effect::new(move |_| {
		let id = current_edge.get();
		sync(&|m| m.state.set_current_edge(id.clone()));
	});

	let alive_cleanup = alive;
	on_cleanup(move || alive_cleanup.store(false, Ordering::Relaxed));

	let mounted_md = mounted.clone();
	let on_mousedown = move |ev: MouseEvent| {
		if ev.button() != 0 {
			return;
		}
		let Some((x, y)) = local_point(canvas_ref, &ev) else {
			return;
		};
		if let Some(m) = mounted_md.borrow_mut().as_mut() {
			m.state.pointer_down(x, y);
		}
	};

	let (mounted_mm, events_mm) = (mounted.clone(), events.clone());
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = local_point(canvas_ref, &ev) else {
			return;
		};
		let change = match mounted_mm.borrow_mut().as_mut() {
			Some(m) => m.state.pointer_move(x, y),
			None => return,
		};
		let Some(change) = change else {
			return;
		};
		if let Some(m) = mounted_mm.borrow().as_ref() {
			events_mm.hover(&m.state, &change);
		}
		if let Some(canvas) = canvas_ref.get() {
			let cursor = if change.entered.is_some() { "pointer" } else { "grab" };
			let _ = HtmlElement::style(&canvas).set_property("cursor", cursor);
		}
	};

	let (mounted_mu, events_mu) = (mounted.clone(), events.clone());
	let on_mouseup = move |ev: MouseEvent| {
		let (x, y) = local_point(canvas_ref, &ev).unwrap_or_default();
		let release = match mounted_mu.borrow_mut().as_mut() {
			Some(m) => m.state.pointer_up(),
			None => return,
		};
		if let Some(m) = mounted_mu.borrow().as_ref() {
			events_mu.release(&m.state, &release, x, y);
		}
	};

	let (mounted_ml, events_ml) = (mounted.clone(), events.clone());
	let on_mouseleave = move |_: MouseEvent| {
		let (release, change) = match mounted_ml.borrow_mut().as_mut() {
			Some(m) => m.state.pointer_leave(),
			None => return,
		};
		if let Some(m) = mounted_ml.borrow().as_ref() {
			if let Some(release) = release {
				events_ml.release(&m.state, &release, 0.0, 0.0);
			}
			if let Some(change) = change {
				events_ml.hover(&m.state, &change);
			}
		}
	};

	let mounted_wh = mounted.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some((x, y)) = local_point(canvas_ref, &ev) else {
			return;
		};
		if let Some(m) = mounted_wh.borrow_mut().as_mut() {
			let factor = if ev.delta_y() > 0.0 { 1.0 / ZOOM_STEP } else { ZOOM_STEP };
			m.state.zoom_at(x, y, factor);
		}
	};

	let (mounted_cm, events_cm) = (mounted, events);
	let on_contextmenu = move |ev: MouseEvent| {
		ev.prevent_default();
		let Some((x, y)) = local_point(canvas_ref, &ev) else {
			return;
		};
		if let Some(m) = mounted_cm.borrow().as_ref() {
			let hit: Option<Hit> = m.state.hit_test(x, y);
			events_cm.context_menu(&m.state, hit, x, y);
		}
	};

	// The canvas is cleared to transparent, so the page color lives here.
	let container_style = move || {
		format!(
			"position: relative; width: 100%; height: 100%; overflow: hidden; background-color: {};",
			theme.get().unwrap_or_default().palette().background
		)
	};

	view! {
		<div class="graph-canvas" style=container_style>
			<div
				node_ref=pattern_ref
				class="graph-canvas-pattern"
				style="position: absolute; inset: 0; pointer-events: none;"
			/>
			<canvas
				node_ref=canvas_ref
				class="graph-canvas-surface"
				on:mousedown=on_mousedown
				on:mousemove=on_mousemove
				on:mouseup=on_mouseup
				on:mouseleave=on_mouseleave
				on:wheel=on_wheel
				on:contextmenu=on_contextmenu
				style="position: relative; display: block; cursor: grab;"
			/>
		</div>
	}
}
