use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use leptos::ev;
use leptos::prelude::*;
use log::{error, info};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, TouchEvent, WheelEvent, Window};

use super::config::MapConfig;
use super::render;
use super::state::MapState;
use super::topology::Topology;
use super::types::{MigrationRecord, Point};
use super::viewport::Gesture;

type SharedState = Arc<Mutex<Option<MapState>>>;

fn with_state(state: &SharedState, f: impl FnOnce(&mut MapState)) {
	if let Ok(mut guard) = state.lock() {
		if let Some(s) = guard.as_mut() {
			f(s);
		}
	}
}

fn now() -> f64 {
	web_sys::window()
		.and_then(|w| w.performance())
		.map(|p| p.now())
		.unwrap_or(0.0)
}

fn viewport_size(
	window: &Window,
	canvas: &HtmlCanvasElement,
	fullscreen: bool,
	width: Option<f64>,
	height: Option<f64>,
) -> (f64, f64) {
	if fullscreen {
		let dim = |v: Result<JsValue, JsValue>, fallback| v.ok().and_then(|v| v.as_f64()).unwrap_or(fallback);
		return (dim(window.inner_width(), 800.0), dim(window.inner_height(), 600.0));
	}
	(
		width.unwrap_or_else(|| {
			canvas
				.parent_element()
				.map(|p| p.client_width() as f64)
				.unwrap_or(800.0)
		}),
		height.unwrap_or_else(|| {
			canvas
				.parent_element()
				.map(|p| p.client_height() as f64)
				.unwrap_or(600.0)
		}),
	)
}

fn context_2d(canvas: &HtmlCanvasElement) -> Option<CanvasRenderingContext2d> {
	canvas.get_context("2d").ok().flatten()?.dyn_into().ok()
}

fn canvas_point(canvas_ref: NodeRef<leptos::html::Canvas>, client_x: i32, client_y: i32) -> Point {
	let (left, top) = canvas_ref
		.get_untracked()
		.map(|canvas| {
			let rect = canvas.get_bounding_client_rect();
			(rect.left(), rect.top())
		})
		.unwrap_or((0.0, 0.0));
	Point::new(client_x as f64 - left, client_y as f64 - top)
}

fn touch_points(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &TouchEvent) -> Vec<Point> {
	let touches = ev.touches();
	(0..touches.length())
		.filter_map(|i| touches.get(i))
		.map(|t| canvas_point(canvas_ref, t.client_x(), t.client_y()))
		.collect()
}

/// Animated migration flows into the focus country, over a pannable map.
///
/// The map state is rebuilt when the topology changes; dataset and focus
/// changes rebuild only the flows. Unmounting interrupts every animation.
#[component]
pub fn MigrationMap(
	/// Migration records, one per destination country.
	#[prop(into)]
	dataset: Signal<Vec<MigrationRecord>>,
	/// World boundaries; a change rebuilds the whole map.
	#[prop(into)]
	topology: Signal<Topology>,
	/// Destination country id; `None` or empty draws no flows.
	#[prop(into)]
	focus: Signal<Option<String>>,
	/// Tuning and style.
	#[prop(optional)]
	config: MapConfig,
	/// Fill the window and follow its resizes.
	#[prop(default = false)]
	fullscreen: bool,
	/// Canvas width; defaults to the parent's.
	#[prop(default = None)]
	width: Option<f64>,
	/// Canvas height; defaults to the parent's.
	#[prop(default = None)]
	height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let state: SharedState = Arc::new(Mutex::new(None));
	let alive = Arc::new(AtomicBool::new(true));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>> = Rc::new(RefCell::new(None));
	let resize_listener: Arc<Mutex<Option<WindowListenerHandle>>> = Arc::new(Mutex::new(None));
	let (state_init, animate_init, resize_init, alive_init) =
		(state.clone(), animate.clone(), resize_listener.clone(), alive.clone());

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			return;
		};
		let (w, h) = viewport_size(&window, &canvas, fullscreen, width, height);
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let Some(ctx) = context_2d(&canvas) else {
			error!("canvas has no 2d context");
			return;
		};

		let built = topology.with(|t| MapState::new(t, dataset.get_untracked(), w, h, config.clone()));
		let mut fresh = match built {
			Ok(s) => s,
			Err(err) => {
				error!("cannot draw map: {err}");
				return;
			}
		};
		fresh.set_focus(focus.get_untracked().as_deref(), now());
		if let Ok(mut guard) = state_init.lock() {
			if let Some(old) = guard.as_mut() {
				old.teardown();
			}
			*guard = Some(fresh);
		}

		// a new topology only swaps the state; the frame loop keeps running
		if animate_init.borrow().is_some() {
			return;
		}

		if fullscreen {
			let (state_resize, canvas_resize) = (state_init.clone(), canvas.clone());
			let handle = window_event_listener(ev::resize, move |_| {
				let Some(win) = web_sys::window() else {
					return;
				};
				let (nw, nh) = viewport_size(&win, &canvas_resize, true, None, None);
				canvas_resize.set_width(nw as u32);
				canvas_resize.set_height(nh as u32);
				with_state(&state_resize, |s| s.resize(nw, nh, now()));
			});
			if let Ok(mut slot) = resize_init.lock() {
				*slot = Some(handle);
			}
		}

		let (state_anim, animate_inner, alive_anim) =
			(state_init.clone(), animate_init.clone(), alive_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move |timestamp: f64| {
			if !alive_anim.load(Ordering::Relaxed) {
				return;
			}
			with_state(&state_anim, |s| {
				s.tick(timestamp);
				render::render(&s.scene(), &ctx, s.width, s.height);
			});
			if let (Some(cb), Some(win)) = (animate_inner.borrow().as_ref(), web_sys::window()) {
				let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
		info!("migration map mounted at {w}x{h}");
	});

	let state_data = state.clone();
	Effect::new(move |_| {
		let records = dataset.get();
		with_state(&state_data, |s| s.set_dataset(records, now()));
	});

	let state_focus = state.clone();
	Effect::new(move |_| {
		let focus = focus.get();
		with_state(&state_focus, |s| {
			s.set_focus(focus.as_deref(), now());
		});
	});

	// on_cleanup wants Send + Sync, hence Arc<Mutex<_>> for what it touches
	let (state_cleanup, alive_cleanup) = (state.clone(), alive.clone());
	on_cleanup(move || {
		// stop the frame loop and every particle before the canvas goes away
		alive_cleanup.store(false, Ordering::Relaxed);
		if let Some(handle) = resize_listener.lock().ok().and_then(|mut slot| slot.take()) {
			handle.remove();
		}
		if let Some(mut state) = state_cleanup.lock().ok().and_then(|mut slot| slot.take()) {
			state.teardown();
		}
		info!("migration map unmounted");
	});

	let state_md = state.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let at = canvas_point(canvas_ref, ev.client_x(), ev.client_y());
		with_state(&state_md, |s| {
			s.on_gesture(Gesture::PanStart(at));
		});
	};

	let state_mm = state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let at = canvas_point(canvas_ref, ev.client_x(), ev.client_y());
		with_state(&state_mm, |s| {
			s.on_gesture(Gesture::PanMove(at));
		});
	};

	let state_mu = state.clone();
	let on_mouseup = move |_: MouseEvent| {
		with_state(&state_mu, |s| {
			s.on_gesture(Gesture::PanEnd);
		});
	};

	let state_ml = state.clone();
	let on_mouseleave = move |_: MouseEvent| {
		with_state(&state_ml, |s| {
			s.on_gesture(Gesture::Leave);
		});
	};

	let state_wh = state.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let at = canvas_point(canvas_ref, ev.client_x(), ev.client_y());
		let delta_y = ev.delta_y();
		with_state(&state_wh, |s| {
			s.on_gesture(Gesture::Wheel { at, delta_y });
		});
	};

	let state_ts = state.clone();
	let on_touchstart = move |ev: TouchEvent| {
		let gesture = match touch_points(canvas_ref, &ev).as_slice() {
			[] => Gesture::PanEnd,
			[a] => Gesture::PanStart(*a),
			[a, b, ..] => Gesture::PinchStart(*a, *b),
		};
		with_state(&state_ts, |s| {
			s.on_gesture(gesture);
		});
	};

	let state_tm = state.clone();
	let on_touchmove = move |ev: TouchEvent| {
		ev.prevent_default();
		let gesture = match touch_points(canvas_ref, &ev).as_slice() {
			[] => return,
			[a] => Gesture::PanMove(*a),
			[a, b, ..] => Gesture::PinchMove(*a, *b),
		};
		with_state(&state_tm, |s| {
			s.on_gesture(gesture);
		});
	};

	let state_te = state.clone();
	let on_touchend = move |ev: TouchEvent| {
		// a lifted finger hands the gesture over to the ones still down
		let gesture = match touch_points(canvas_ref, &ev).as_slice() {
			[] => Gesture::PanEnd,
			[a] => Gesture::PanStart(*a),
			[a, b, ..] => Gesture::PinchStart(*a, *b),
		};
		with_state(&state_te, |s| {
			s.on_gesture(gesture);
		});
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="migration-map-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:wheel=on_wheel
			on:touchstart=on_touchstart
			on:touchmove=on_touchmove
			on:touchend=on_touchend
			style="display: block; cursor: grab; touch-action: none;"
		/>
	}
}
