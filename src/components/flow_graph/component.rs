use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use wasm_bindgen::prelude::*;
use web_sys::{
	CanvasRenderingContext2d, HtmlCanvasElement, KeyboardEvent, MouseEvent, WheelEvent, Window,
};

use super::keyboard::NavKey;
use super::render;
use super::state::ViewerState;

const FRAME_MS: f64 = 16.0;

fn pointer(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some((
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

fn window_size(window: &Window) -> (f64, f64) {
	let width = window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(800.0);
	let height = window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(600.0);
	(width, height)
}

/// Full-window canvas drawing the viewer state, with pointer and keyboard
/// navigation.
#[component]
pub fn FlowGraphCanvas(state: Rc<RefCell<ViewerState>>) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let keydown_cb: Rc<RefCell<Option<Closure<dyn FnMut(KeyboardEvent)>>>> =
		Rc::new(RefCell::new(None));
	let (state_init, animate_init, resize_cb_init, keydown_cb_init) = (
		state.clone(),
		animate.clone(),
		resize_cb.clone(),
		keydown_cb.clone(),
	);

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			return;
		};

		let (w, h) = window_size(&window);
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);
		state_init.borrow_mut().resize(w, h);

		let Some(ctx) = canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
		else {
			log::error!("canvas 2d context unavailable");
			return;
		};

		let (state_resize, canvas_resize) = (state_init.clone(), canvas.clone());
		*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
			let Some(win) = web_sys::window() else {
				return;
			};
			let (nw, nh) = window_size(&win);
			canvas_resize.set_width(nw as u32);
			canvas_resize.set_height(nh as u32);
			state_resize.borrow_mut().resize(nw, nh);
		}));
		if let Some(ref cb) = *resize_cb_init.borrow() {
			let _ = window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
		}

		let state_key = state_init.clone();
		*keydown_cb_init.borrow_mut() = Some(Closure::new(move |ev: KeyboardEvent| {
			let Some(key) = NavKey::from_key(&ev.key()) else {
				return;
			};
			let modifier = ev.ctrl_key() || ev.meta_key();
			if state_key.borrow_mut().handle_key(key, modifier) {
				ev.prevent_default();
			}
		}));
		if let Some(ref cb) = *keydown_cb_init.borrow() {
			let _ = window.add_event_listener_with_callback("keydown", cb.as_ref().unchecked_ref());
		}

		let (state_anim, animate_inner) = (state_init.clone(), animate_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			{
				let mut s = state_anim.borrow_mut();
				s.tick(FRAME_MS);
				render::render(&*s, &ctx);
			}
			if let (Some(win), Some(cb)) = (web_sys::window(), animate_inner.borrow().as_ref()) {
				let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let state_md = state.clone();
	let on_mousedown = move |ev: MouseEvent| {
		if let Some((x, y)) = pointer(canvas_ref, &ev) {
			state_md.borrow_mut().pointer_down(x, y);
		}
	};

	let state_mm = state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		if let Some((x, y)) = pointer(canvas_ref, &ev) {
			state_mm.borrow_mut().pointer_move(x, y);
		}
	};

	let state_mu = state.clone();
	let on_mouseup = move |_: MouseEvent| {
		state_mu.borrow_mut().pointer_up();
	};

	let state_ml = state.clone();
	let on_mouseleave = move |_: MouseEvent| {
		state_ml.borrow_mut().pointer_leave();
	};

	let state_wh = state.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		if let Some((x, y)) = pointer(canvas_ref, &ev) {
			state_wh.borrow_mut().wheel(ev.delta_y(), x, y);
		}
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="flow-graph-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:wheel=on_wheel
			style="display: block; cursor: grab;"
		/>
	}
}
