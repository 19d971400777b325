use std::collections::{HashMap, VecDeque};

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData, SimulationParameters};

use super::filter::VisibleGraph;
use super::model::{EdgeKey, FlowGraph};
use super::types::NodeId;

pub const FONT_SIZE: f64 = 12.0;
pub const LINE_HEIGHT: f64 = 15.0;
const CHAR_WIDTH: f64 = 7.2;
const BOX_PADDING: f64 = 8.0;
const MIN_BOX_WIDTH: f64 = 40.0;

/// Spacing between edges that join the same two nodes.
pub const LANE_GAP: f64 = 24.0;

const ROW_GAP: f64 = 140.0;
const COLUMN_GAP: f64 = 220.0;
const WARMUP_STEPS: usize = 120;
const STEP: f32 = 0.016;

/// Positions visible nodes. Positions are box centers in graph space.
pub trait LayoutEngine {
	fn render(&mut self, graph: &FlowGraph, visible: &VisibleGraph);

	fn position(&self, id: NodeId) -> Option<(f64, f64)>;

	fn tick(&mut self, _dt_ms: f64) {}

	/// Moves a node by hand and keeps it there.
	fn drag_node(&mut self, _id: NodeId, _x: f64, _y: f64) {}
}

/// Size of the box a label is drawn in.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct NodeBox {
	pub width: f64,
	pub height: f64,
}

impl NodeBox {
	pub fn for_label(label: &str) -> Self {
		let lines = label.lines().count().max(1);
		let longest = label.lines().map(|l| l.chars().count()).max().unwrap_or(0);
		Self {
			width: (longest as f64 * CHAR_WIDTH).max(MIN_BOX_WIDTH) + 2.0 * BOX_PADDING,
			height: lines as f64 * LINE_HEIGHT + 2.0 * BOX_PADDING,
		}
	}

	pub fn contains(&self, center: (f64, f64), point: (f64, f64)) -> bool {
		(point.0 - center.0).abs() <= self.width / 2.0
			&& (point.1 - center.1).abs() <= self.height / 2.0
	}
}

#[derive(Clone, Debug, Default)]
pub struct LayoutNode {
	pub id: NodeId,
}

/// Force-directed layout seeded with one row per distance from the roots.
pub struct ForceLayout {
	graph: ForceGraph<LayoutNode, ()>,
	index: HashMap<NodeId, DefaultNodeIdx>,
	positions: HashMap<NodeId, (f64, f64)>,
}

impl Default for ForceLayout {
	fn default() -> Self {
		Self::new()
	}
}

impl ForceLayout {
	pub fn new() -> Self {
		Self {
			graph: ForceGraph::new(simulation_parameters()),
			index: HashMap::new(),
			positions: HashMap::new(),
		}
	}

	fn step(&mut self, dt: f32) {
		self.graph.update(dt);
		self.positions.clear();
		let positions = &mut self.positions;
		self.graph.visit_nodes(|node| {
			positions.insert(node.data.user_data.id, (node.x() as f64, node.y() as f64));
		});
	}
}

impl LayoutEngine for ForceLayout {
	fn render(&mut self, graph: &FlowGraph, visible: &VisibleGraph) {
		let seeds = layered_seeds(graph, visible);
		let previous = std::mem::take(&mut self.positions);

		self.graph = ForceGraph::new(simulation_parameters());
		self.index.clear();
		for &id in visible.nodes() {
			let (x, y) = previous
				.get(&id)
				.or_else(|| seeds.get(&id))
				.copied()
				.unwrap_or_default();
			let idx = self.graph.add_node(NodeData {
				x: x as f32,
				y: y as f32,
				mass: 10.0,
				is_anchor: false,
				user_data: LayoutNode { id },
			});
			self.index.insert(id, idx);
		}

		for key in visible.edges() {
			if key.source == key.target {
				continue;
			}
			if let (Some(&src), Some(&tgt)) = (self.index.get(&key.source), self.index.get(&key.target)) {
				self.graph.add_edge(src, tgt, EdgeData::default());
			}
		}

		let warmup = if previous.is_empty() { WARMUP_STEPS } else { 1 };
		for _ in 0..warmup {
			self.step(STEP);
		}
	}

	fn position(&self, id: NodeId) -> Option<(f64, f64)> {
		self.positions.get(&id).copied()
	}

	fn tick(&mut self, dt_ms: f64) {
		self.step((dt_ms / 1000.0) as f32);
	}

	fn drag_node(&mut self, id: NodeId, x: f64, y: f64) {
		let Some(&idx) = self.index.get(&id) else {
			return;
		};
		self.graph.visit_nodes_mut(|node| {
			if node.index() == idx {
				node.data.x = x as f32;
				node.data.y = y as f32;
				node.data.is_anchor = true;
			}
		});
		self.positions.insert(id, (x, y));
	}
}

/// Sideways offset of each edge, in order, so edges joining the same pair
/// of nodes in either direction do not overlap. Offsets are measured to the
/// left of the direction from the lower node id to the higher one, and each
/// pair's lanes are centered on the straight line between them.
pub fn edge_lanes(edges: &[EdgeKey]) -> Vec<f64> {
	let pair = |k: &EdgeKey| (k.source.min(k.target), k.source.max(k.target));
	let mut totals: HashMap<(NodeId, NodeId), usize> = HashMap::new();
	for key in edges {
		*totals.entry(pair(key)).or_default() += 1;
	}

	let mut seen: HashMap<(NodeId, NodeId), usize> = HashMap::new();
	edges
		.iter()
		.map(|key| {
			let p = pair(key);
			let lane = seen.entry(p).or_default();
			let offset = (*lane as f64 - (totals[&p] as f64 - 1.0) / 2.0) * LANE_GAP;
			*lane += 1;
			offset
		})
		.collect()
}

fn simulation_parameters() -> SimulationParameters {
	SimulationParameters {
		force_charge: 4000.0,
		force_spring: 0.05,
		force_max: 200.0,
		node_speed: 3000.0,
		damping_factor: 0.9,
	}
}

/// One row per BFS depth from nodes without visible predecessors.
fn layered_seeds(graph: &FlowGraph, visible: &VisibleGraph) -> HashMap<NodeId, (f64, f64)> {
	let mut depth: HashMap<NodeId, usize> = HashMap::new();
	let has_parent = |id: NodeId| {
		graph
			.predecessors(id)
			.into_iter()
			.any(|p| p != id && visible.contains(p))
	};
	let roots: Vec<NodeId> = visible.nodes().iter().copied().filter(|&id| !has_parent(id)).collect();

	// cycles without a root get seeded from their first node
	for start in roots.into_iter().chain(visible.nodes().iter().copied()) {
		if depth.contains_key(&start) {
			continue;
		}
		depth.insert(start, 0);
		let mut queue = VecDeque::from([start]);
		while let Some(v) = queue.pop_front() {
			let d = depth[&v];
			for w in graph.successors(v) {
				if visible.contains(w) && !depth.contains_key(&w) {
					depth.insert(w, d + 1);
					queue.push_back(w);
				}
			}
		}
	}

	let mut rows: Vec<Vec<NodeId>> = Vec::new();
	for &id in visible.nodes() {
		let d = depth[&id];
		if rows.len() <= d {
			rows.resize(d + 1, Vec::new());
		}
		rows[d].push(id);
	}

	let mut seeds = HashMap::new();
	for (d, row) in rows.iter().enumerate() {
		let offset = (row.len() as f64 - 1.0) / 2.0;
		for (i, &id) in row.iter().enumerate() {
			seeds.insert(id, ((i as f64 - offset) * COLUMN_GAP, d as f64 * ROW_GAP));
		}
	}
	seeds
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::flow_graph::label::LabelOptions;
	use crate::components::flow_graph::messages::MessageCache;
	use crate::components::flow_graph::types::Record;

	fn diamond() -> FlowGraph {
		let records: Vec<Record> = serde_json::from_str(
			r#"[
			{"type":"node","id":1,"node_type":"entry","data":{"name":"Main"}},
			{"type":"node","id":2,"node_type":"fork"},
			{"type":"node","id":3,"node_type":"action"},
			{"type":"node","id":4,"node_type":"action"},
			{"type":"node","id":5,"node_type":"join"},
			{"type":"edge","source":1,"target":2},
			{"type":"edge","source":2,"target":3},
			{"type":"edge","source":2,"target":4},
			{"type":"edge","source":3,"target":5},
			{"type":"edge","source":4,"target":5},
			{"type":"edge","source":5,"target":2,"data":{"virtual":true}}
		]"#,
		)
		.unwrap();
		FlowGraph::build(&records, LabelOptions::default(), &MessageCache::new())
	}

	#[test]
	fn seeds_rows_by_depth() {
		let g = diamond();
		let seeds = layered_seeds(&g, &VisibleGraph::new(&g, None));
		assert_eq!(seeds[&1], (0.0, 0.0));
		assert_eq!(seeds[&2], (0.0, ROW_GAP));
		assert_eq!(seeds[&3], (-COLUMN_GAP / 2.0, 2.0 * ROW_GAP));
		assert_eq!(seeds[&4], (COLUMN_GAP / 2.0, 2.0 * ROW_GAP));
		assert_eq!(seeds[&5], (0.0, 3.0 * ROW_GAP));
	}

	#[test]
	fn rootless_cycle_still_gets_seeded() {
		let records: Vec<Record> = serde_json::from_str(
			r#"[
			{"type":"node","id":1,"node_type":"action"},
			{"type":"node","id":2,"node_type":"action"},
			{"type":"edge","source":1,"target":2},
			{"type":"edge","source":2,"target":1}
		]"#,
		)
		.unwrap();
		let g = FlowGraph::build(&records, LabelOptions::default(), &MessageCache::new());
		let seeds = layered_seeds(&g, &VisibleGraph::new(&g, None));
		assert_eq!(seeds[&1], (0.0, 0.0));
		assert_eq!(seeds[&2], (0.0, ROW_GAP));
	}

	#[test]
	fn force_layout_positions_only_visible_nodes() {
		let g = diamond();
		let whitelist = ["Main".to_owned()].into_iter().collect();
		let mut layout = ForceLayout::new();

		layout.render(&g, &VisibleGraph::new(&g, Some(&whitelist)));
		assert!(layout.position(1).is_some());
		assert!(layout.position(2).is_none());

		layout.render(&g, &VisibleGraph::new(&g, None));
		assert!((1..=5).all(|id| layout.position(id).is_some()));
	}

	#[test]
	fn dragged_node_stays_put() {
		let g = diamond();
		let mut layout = ForceLayout::new();
		layout.render(&g, &VisibleGraph::new(&g, None));

		layout.drag_node(3, 500.0, -40.0);
		assert_eq!(layout.position(3), Some((500.0, -40.0)));
		layout.tick(16.0);
		assert_eq!(layout.position(3), Some((500.0, -40.0)));
	}

	fn key(source: NodeId, target: NodeId, value: Option<&str>) -> EdgeKey {
		EdgeKey {
			source,
			target,
			value: value.map(String::from),
		}
	}

	#[test]
	fn single_edges_stay_straight() {
		let lanes = edge_lanes(&[key(1, 2, None), key(2, 3, None)]);
		assert_eq!(lanes, [0.0, 0.0]);
	}

	#[test]
	fn parallel_and_reciprocal_edges_get_own_lanes() {
		let lanes = edge_lanes(&[
			key(2, 3, Some("0")),
			key(1, 2, None),
			key(2, 3, Some("1")),
			key(3, 2, None),
		]);
		assert_eq!(lanes, [-LANE_GAP, 0.0, 0.0, LANE_GAP]);

		let two = edge_lanes(&[key(5, 4, None), key(4, 5, None)]);
		assert_eq!(two, [-LANE_GAP / 2.0, LANE_GAP / 2.0]);
	}

	#[test]
	fn box_grows_with_label() {
		let small = NodeBox::for_label("Fork");
		let big = NodeBox::for_label("Hero\nJump a very long way\nSpeed: 2");
		assert!(big.width > small.width);
		assert_eq!(big.height, 3.0 * LINE_HEIGHT + 2.0 * BOX_PADDING);
		assert!(big.contains((0.0, 0.0), (big.width / 2.0 - 1.0, 0.0)));
		assert!(!big.contains((0.0, 0.0), (0.0, big.height)));
	}
}
