use log::{debug, info, warn};

use super::filter::{self, VisibleGraph, Whitelist};
use super::keyboard::{self, NavAction, NavKey, STEP_SCROLL_MS, Step};
use super::label::LabelOptions;
use super::layout::{ForceLayout, LayoutEngine, NodeBox};
use super::messages::MessageCache;
use super::model::{EdgeKey, FlowGraph};
use super::selection::{Highlight, Selection};
use super::types::{NodeId, Record};
use super::viewport::{
	DEFAULT_SCROLL_MS, GestureState, GestureTarget, PointerMove, PointerRelease, Viewport,
};
use crate::config::ViewerConfig;

const WHEEL_ZOOM_IN: f64 = 1.1;
const WHEEL_ZOOM_OUT: f64 = 0.9;

/// Everything the viewer knows: loaded records, the graph built from them,
/// focus, selection, view transform and layout.
pub struct ViewerState<L = ForceLayout> {
	records: Vec<Record>,
	messages: MessageCache,
	options: LabelOptions,
	graph: FlowGraph,
	whitelist: Option<Whitelist>,
	visible: VisibleGraph,
	selection: Selection,
	viewport: Viewport,
	gesture: GestureState,
	layout: L,
	pub flow_time: f64,
}

impl<L: LayoutEngine> ViewerState<L> {
	pub fn new(layout: L, width: f64, height: f64) -> Self {
		Self {
			records: Vec::new(),
			messages: MessageCache::new(),
			options: LabelOptions::default(),
			graph: FlowGraph::default(),
			whitelist: None,
			visible: VisibleGraph::default(),
			selection: Selection::default(),
			viewport: Viewport::new(width, height),
			gesture: GestureState::default(),
			layout,
			flow_time: 0.0,
		}
	}

	pub fn graph(&self) -> &FlowGraph {
		&self.graph
	}

	pub fn visible(&self) -> &VisibleGraph {
		&self.visible
	}

	pub fn viewport(&self) -> &Viewport {
		&self.viewport
	}

	pub fn layout(&self) -> &L {
		&self.layout
	}

	pub fn options(&self) -> LabelOptions {
		self.options
	}

	pub fn whitelist(&self) -> Option<&Whitelist> {
		self.whitelist.as_ref()
	}

	pub fn selected(&self) -> Option<NodeId> {
		self.selection.current()
	}

	pub fn node_highlight(&self, id: NodeId) -> Highlight {
		self.selection.node_highlight(id)
	}

	pub fn edge_highlight(&self, key: &EdgeKey) -> Highlight {
		self.selection.edge_highlight(key)
	}

	pub fn set_options(&mut self, options: LabelOptions) {
		self.options = options;
	}

	/// Replaces the loaded data, drops focus and selection, and renders with
	/// the first node at the top center of the view.
	pub fn load(&mut self, records: Vec<Record>, messages: MessageCache) {
		self.records = records;
		self.messages = messages;
		self.whitelist = None;
		self.selection.clear();
		self.refresh();
		info!(
			"loaded graph: {} nodes, {} edges, {} messages",
			self.graph.node_count(),
			self.graph.edge_count(),
			self.messages.len()
		);
		self.render();
		if let Some(&first) = self.visible.nodes().first() {
			self.scroll_to(first, false, 0.0);
		}
	}

	/// Applies the `entry` and `node` query keys after a load.
	pub fn apply_config(&mut self, config: &ViewerConfig) {
		if let Some(selected) = self.selected() {
			self.scroll_to(selected, false, DEFAULT_SCROLL_MS);
		}
		if let Some(entry) = &config.entry {
			match self.graph.find_entry(entry) {
				Some(id) => self.focus(Some(id), config.node.is_none()),
				None => warn!("entry point {entry:?} not found"),
			}
		}
		if let Some(name) = &config.node {
			match self.graph.find_by_name(name) {
				Some(id) => {
					self.select(id);
					self.scroll_to(id, true, DEFAULT_SCROLL_MS);
				}
				None => warn!("node {name:?} not found"),
			}
		}
	}

	/// Rebuilds the graph from the loaded records. Does not render.
	pub fn refresh(&mut self) {
		self.graph = FlowGraph::build(&self.records, self.options, &self.messages);
	}

	/// Hands the visible subgraph to the layout engine.
	pub fn render(&mut self) {
		self.visible = VisibleGraph::new(&self.graph, self.whitelist.as_ref());
		self.layout.render(&self.graph, &self.visible);
		self.selection.retain_visible(&self.visible);
	}

	pub fn render_and_keep_selection(&mut self) {
		let selected = self.selected();
		self.render();
		match selected {
			Some(id) => {
				self.select(id);
			}
			None => self.selection.clear(),
		}
	}

	pub fn set_show_names(&mut self, show: bool) {
		self.options.show_names = show;
		self.refresh();
		self.render_and_keep_selection();
	}

	pub fn set_show_params(&mut self, show: bool) {
		self.options.show_params = show;
		self.refresh();
		self.render_and_keep_selection();
	}

	/// Restricts rendering to the component of `node`, or to everything when
	/// `node` is `None`. With `scroll`, brings the node (or the current
	/// selection) into view.
	pub fn focus(&mut self, node: Option<NodeId>, scroll: bool) {
		let selected = self.selected();
		self.whitelist = node.and_then(|id| filter::component(&self.graph, id));
		debug!(
			"focus on {node:?}: {} node name(s)",
			self.whitelist.as_ref().map_or(0, |w| w.len())
		);
		self.render();
		if !scroll {
			return;
		}
		if let Some(id) = node.or(selected) {
			self.scroll_to(id, false, DEFAULT_SCROLL_MS);
		}
	}

	pub fn clear_focus(&mut self) {
		self.focus(None, false);
	}

	pub fn select(&mut self, id: NodeId) -> bool {
		self.selection.select(id, &self.visible)
	}

	pub fn clear_selection(&mut self) {
		self.selection.clear();
	}

	/// Selects a node from outside the canvas.
	pub fn jump_to(&mut self, id: NodeId) {
		if self.whitelist.is_some() {
			self.focus(Some(id), true);
			self.select(id);
		} else {
			self.viewport.set_scale(1.0);
			self.select(id);
			self.scroll_to(id, false, DEFAULT_SCROLL_MS);
		}
	}

	/// False when the node is not rendered.
	pub fn scroll_to(&mut self, id: NodeId, center: bool, duration_ms: f64) -> bool {
		let position = if self.visible.contains(id) {
			self.layout.position(id)
		} else {
			None
		};
		self.viewport.scroll_to(position, center, duration_ms)
	}

	pub fn step_selection(&mut self, step: Step) -> bool {
		let Some(current) = self.selected() else {
			return false;
		};
		let neighbors = match step {
			Step::Predecessor => self.graph.predecessors(current),
			Step::Successor => self.graph.successors(current),
		};
		let Some(&next) = neighbors.first() else {
			return false;
		};
		debug!("{step:?} of {current}: {next}");
		self.scroll_to(next, true, STEP_SCROLL_MS);
		self.select(next)
	}

	/// Returns whether the key was handled.
	pub fn handle_key(&mut self, key: NavKey, modifier: bool) -> bool {
		match keyboard::plan(key, modifier, self.selected()) {
			NavAction::ClearSelection => self.clear_selection(),
			NavAction::Zoom(factor) => self.viewport.scale(factor),
			NavAction::Pan(dx, dy) => self.viewport.translate(dx, dy),
			NavAction::StepSelection(step) => {
				self.step_selection(step);
			}
			NavAction::Nothing => return false,
		}
		true
	}

	/// Topmost rendered node under a screen point.
	pub fn node_at(&self, sx: f64, sy: f64) -> Option<NodeId> {
		let point = self.viewport.transform().screen_to_graph(sx, sy);
		self.visible.nodes().iter().rev().copied().find(|&id| {
			let (Some(node), Some(center)) = (self.graph.node(id), self.layout.position(id)) else {
				return false;
			};
			NodeBox::for_label(&node.label).contains(center, point)
		})
	}

	pub fn pointer_down(&mut self, sx: f64, sy: f64) {
		let t = self.viewport.transform();
		match self.node_at(sx, sy) {
			Some(id) => {
				let origin = self.layout.position(id).unwrap_or_default();
				self.gesture.press(GestureTarget::Node(id), sx, sy, origin, t.k);
			}
			None => self.gesture.press(GestureTarget::Background, sx, sy, (t.x, t.y), t.k),
		}
	}

	pub fn pointer_move(&mut self, sx: f64, sy: f64) {
		match self.gesture.moved(sx, sy) {
			PointerMove::Idle => {}
			PointerMove::Pan(x, y) => self.viewport.set_translate(x, y),
			PointerMove::DragNode(id, x, y) => self.layout.drag_node(id, x, y),
		}
	}

	/// A click on a node selects it; a click on the background clears the
	/// selection; drags do neither.
	pub fn pointer_up(&mut self) {
		match self.gesture.release() {
			PointerRelease::Click(GestureTarget::Node(id)) => {
				self.select(id);
			}
			PointerRelease::Click(GestureTarget::Background) => self.clear_selection(),
			PointerRelease::Drag | PointerRelease::None => {}
		}
	}

	pub fn pointer_leave(&mut self) {
		self.gesture.cancel();
	}

	pub fn is_dragging(&self) -> bool {
		self.gesture.is_dragging()
	}

	pub fn wheel(&mut self, delta_y: f64, sx: f64, sy: f64) {
		let factor = if delta_y > 0.0 {
			WHEEL_ZOOM_OUT
		} else {
			WHEEL_ZOOM_IN
		};
		self.viewport.zoom_at(factor, sx, sy);
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.viewport.resize(width, height);
	}

	pub fn tick(&mut self, dt_ms: f64) {
		self.viewport.tick(dt_ms);
		self.layout.tick(dt_ms);
		self.flow_time += dt_ms / 1000.0;
	}
}
