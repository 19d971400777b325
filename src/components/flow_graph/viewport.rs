//! Pan/zoom transform of the canvas and pointer gesture tracking.

use super::types::NodeId;

pub const MIN_SCALE: f64 = 0.05;
pub const MAX_SCALE: f64 = 20.0;
/// Screen distance from the top edge for non-centered scrolling.
pub const TOP_OFFSET: f64 = 60.0;
pub const DEFAULT_SCROLL_MS: f64 = 1000.0;
/// Pointer travel (screen px) after which a press becomes a drag.
pub const DRAG_THRESHOLD: f64 = 4.0;

/// Screen = graph * k + (x, y).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self {
			x: 0.0,
			y: 0.0,
			k: 1.0,
		}
	}
}

impl ViewTransform {
	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		((sx - self.x) / self.k, (sy - self.y) / self.k)
	}

	pub fn graph_to_screen(&self, gx: f64, gy: f64) -> (f64, f64) {
		(gx * self.k + self.x, gy * self.k + self.y)
	}
}

pub fn ease_out_cubic(t: f64) -> f64 {
	1.0 - (1.0 - t).powi(3)
}

#[derive(Clone, Debug)]
struct Transition {
	from: (f64, f64),
	to: (f64, f64),
	elapsed: f64,
	duration: f64,
}

#[derive(Clone, Debug)]
pub struct Viewport {
	transform: ViewTransform,
	width: f64,
	height: f64,
	transition: Option<Transition>,
}

impl Viewport {
	pub fn new(width: f64, height: f64) -> Self {
		Self {
			transform: ViewTransform::default(),
			width,
			height,
			transition: None,
		}
	}

	pub fn transform(&self) -> ViewTransform {
		self.transform
	}

	pub fn size(&self) -> (f64, f64) {
		(self.width, self.height)
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}

	pub fn scale(&mut self, factor: f64) {
		self.set_scale(self.transform.k * factor);
	}

	pub fn set_scale(&mut self, k: f64) {
		self.transition = None;
		self.transform.k = k.clamp(MIN_SCALE, MAX_SCALE);
	}

	pub fn translate(&mut self, dx: f64, dy: f64) {
		self.set_translate(self.transform.x + dx, self.transform.y + dy);
	}

	pub fn set_translate(&mut self, x: f64, y: f64) {
		self.transition = None;
		self.transform.x = x;
		self.transform.y = y;
	}

	/// Zooms by `factor` keeping the screen point (sx, sy) fixed.
	pub fn zoom_at(&mut self, factor: f64, sx: f64, sy: f64) {
		let t = self.transform;
		let new_k = (t.k * factor).clamp(MIN_SCALE, MAX_SCALE);
		let ratio = new_k / t.k;
		self.set_translate(sx - (sx - t.x) * ratio, sy - (sy - t.y) * ratio);
		self.transform.k = new_k;
	}

	/// Brings a graph-space position into view, either near the top edge or
	/// vertically centered. `None` means the node is not rendered.
	pub fn scroll_to(&mut self, position: Option<(f64, f64)>, center: bool, duration_ms: f64) -> bool {
		let Some((gx, gy)) = position else {
			return false;
		};
		let k = self.transform.k;
		let anchor_y = if center { self.height / 2.0 } else { TOP_OFFSET };
		let target = (-gx * k + self.width / 2.0, -gy * k + anchor_y);

		if duration_ms > 0.0 {
			self.transition = Some(Transition {
				from: (self.transform.x, self.transform.y),
				to: target,
				elapsed: 0.0,
				duration: duration_ms,
			});
		} else {
			self.set_translate(target.0, target.1);
		}
		true
	}

	pub fn is_animating(&self) -> bool {
		self.transition.is_some()
	}

	/// Translate the running transition will end at.
	pub fn target_translate(&self) -> (f64, f64) {
		match &self.transition {
			Some(tr) => tr.to,
			None => (self.transform.x, self.transform.y),
		}
	}

	pub fn tick(&mut self, dt_ms: f64) {
		let Some(tr) = self.transition.as_mut() else {
			return;
		};
		tr.elapsed += dt_ms;
		let t = (tr.elapsed / tr.duration).min(1.0);
		let e = ease_out_cubic(t);
		self.transform.x = tr.from.0 + (tr.to.0 - tr.from.0) * e;
		self.transform.y = tr.from.1 + (tr.to.1 - tr.from.1) * e;
		if t >= 1.0 {
			self.transition = None;
		}
	}
}

/// What the pointer went down on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GestureTarget {
	Background,
	Node(NodeId),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerMove {
	Idle,
	/// Background drag: the new view translate.
	Pan(f64, f64),
	/// Node drag: the node's new graph-space position.
	DragNode(NodeId, f64, f64),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerRelease {
	None,
	Click(GestureTarget),
	Drag,
}

#[derive(Clone, Debug, Default)]
struct Press {
	target: Option<GestureTarget>,
	start_x: f64,
	start_y: f64,
	origin_x: f64,
	origin_y: f64,
	k: f64,
}

/// Pointer press/move/release tracking. A press that travels further than
/// [`DRAG_THRESHOLD`] is a drag, never a click.
#[derive(Clone, Debug, Default)]
pub struct GestureState {
	press: Press,
	dragging: bool,
}

impl GestureState {
	/// `origin` is the view translate for background presses, or the node's
	/// graph position for node presses.
	pub fn press(&mut self, target: GestureTarget, sx: f64, sy: f64, origin: (f64, f64), k: f64) {
		self.press = Press {
			target: Some(target),
			start_x: sx,
			start_y: sy,
			origin_x: origin.0,
			origin_y: origin.1,
			k,
		};
		self.dragging = false;
	}

	pub fn is_dragging(&self) -> bool {
		self.dragging
	}

	pub fn moved(&mut self, sx: f64, sy: f64) -> PointerMove {
		let Some(target) = self.press.target else {
			return PointerMove::Idle;
		};
		let p = &self.press;
		let (dx, dy) = (sx - p.start_x, sy - p.start_y);
		if !self.dragging && (dx * dx + dy * dy).sqrt() > DRAG_THRESHOLD {
			self.dragging = true;
		}
		if !self.dragging {
			return PointerMove::Idle;
		}
		match target {
			GestureTarget::Background => PointerMove::Pan(p.origin_x + dx, p.origin_y + dy),
			GestureTarget::Node(id) => {
				PointerMove::DragNode(id, p.origin_x + dx / p.k, p.origin_y + dy / p.k)
			}
		}
	}

	pub fn release(&mut self) -> PointerRelease {
		let target = self.press.target.take();
		let dragging = std::mem::take(&mut self.dragging);
		match target {
			None => PointerRelease::None,
			Some(_) if dragging => PointerRelease::Drag,
			Some(target) => PointerRelease::Click(target),
		}
	}

	/// Pointer left the canvas: forget the press without a click.
	pub fn cancel(&mut self) {
		self.press.target = None;
		self.dragging = false;
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn close(a: f64, b: f64) -> bool {
		(a - b).abs() < 1e-9
	}

	#[test]
	fn scale_is_multiplicative_and_clamped() {
		let mut view = Viewport::new(800.0, 600.0);
		view.scale(1.1);
		assert!(close(view.transform().k, 1.1));
		view.scale(0.9);
		assert!(close(view.transform().k, 0.99));

		for _ in 0..200 {
			view.scale(0.5);
		}
		assert_eq!(view.transform().k, MIN_SCALE);
		view.set_scale(1000.0);
		assert_eq!(view.transform().k, MAX_SCALE);
	}

	#[test]
	fn translate_is_immediate() {
		let mut view = Viewport::new(800.0, 600.0);
		view.translate(0.0, 100.0);
		view.translate(-100.0, 0.0);
		assert_eq!(view.transform(), ViewTransform { x: -100.0, y: 100.0, k: 1.0 });
	}

	#[test]
	fn scroll_to_places_node_near_top_or_center() {
		let mut view = Viewport::new(800.0, 600.0);
		view.set_scale(2.0);

		assert!(view.scroll_to(Some((50.0, 20.0)), false, 0.0));
		assert_eq!(view.transform(), ViewTransform { x: 300.0, y: 20.0, k: 2.0 });
		assert_eq!(view.transform().graph_to_screen(50.0, 20.0), (400.0, TOP_OFFSET));

		assert!(view.scroll_to(Some((50.0, 20.0)), true, 0.0));
		assert_eq!(view.transform().graph_to_screen(50.0, 20.0), (400.0, 300.0));
	}

	#[test]
	fn scroll_to_missing_node_changes_nothing() {
		let mut view = Viewport::new(800.0, 600.0);
		view.translate(5.0, 5.0);
		assert!(!view.scroll_to(None, true, 500.0));
		assert!(!view.is_animating());
		assert_eq!(view.transform(), ViewTransform { x: 5.0, y: 5.0, k: 1.0 });
	}

	#[test]
	fn animated_scroll_arrives_after_duration() {
		let mut view = Viewport::new(800.0, 600.0);
		assert!(view.scroll_to(Some((0.0, 0.0)), true, 500.0));
		assert!(view.is_animating());
		assert_eq!(view.transform().x, 0.0);
		assert_eq!(view.target_translate(), (400.0, 300.0));

		view.tick(250.0);
		let halfway = view.transform();
		assert!(halfway.x > 200.0 && halfway.x < 400.0);

		view.tick(250.0);
		assert!(!view.is_animating());
		assert_eq!(view.transform(), ViewTransform { x: 400.0, y: 300.0, k: 1.0 });
	}

	#[test]
	fn zoom_at_keeps_pointer_fixed() {
		let mut view = Viewport::new(800.0, 600.0);
		view.translate(30.0, -10.0);
		let before = view.transform().screen_to_graph(200.0, 150.0);
		view.zoom_at(1.1, 200.0, 150.0);
		let after = view.transform().screen_to_graph(200.0, 150.0);
		assert!(close(before.0, after.0) && close(before.1, after.1));
	}

	#[test]
	fn short_press_is_a_click() {
		let mut gesture = GestureState::default();
		gesture.press(GestureTarget::Background, 10.0, 10.0, (0.0, 0.0), 1.0);
		assert_eq!(gesture.moved(12.0, 11.0), PointerMove::Idle);
		assert_eq!(gesture.release(), PointerRelease::Click(GestureTarget::Background));
		assert_eq!(gesture.release(), PointerRelease::None);
	}

	#[test]
	fn long_press_travel_is_a_drag() {
		let mut gesture = GestureState::default();
		gesture.press(GestureTarget::Background, 10.0, 10.0, (100.0, 50.0), 1.0);
		assert_eq!(gesture.moved(40.0, 10.0), PointerMove::Pan(130.0, 50.0));
		// back under the threshold still counts as a drag
		assert_eq!(gesture.moved(11.0, 10.0), PointerMove::Pan(101.0, 50.0));
		assert_eq!(gesture.release(), PointerRelease::Drag);

		gesture.press(GestureTarget::Node(7), 0.0, 0.0, (5.0, 5.0), 2.0);
		assert_eq!(gesture.moved(20.0, 0.0), PointerMove::DragNode(7, 15.0, 5.0));
		gesture.cancel();
		assert_eq!(gesture.release(), PointerRelease::None);
	}
}
