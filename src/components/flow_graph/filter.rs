//! Focus mode: narrowing the rendered graph to one connected component.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet, VecDeque};

use super::model::{EdgeKey, FlowGraph};
use super::types::NodeId;

/// Node names allowed to render while focus mode is on.
pub type Whitelist = HashSet<String>;

/// Undirected connected components of a graph, computed in one pass.
#[derive(Clone, Debug, Default)]
pub struct Components {
	members: Vec<Vec<NodeId>>,
	component_of: HashMap<NodeId, usize>,
}

impl Components {
	pub fn compute(graph: &FlowGraph) -> Self {
		let mut components = Components::default();

		for start in graph.nodes().map(|n| n.id) {
			if components.component_of.contains_key(&start) {
				continue;
			}
			let idx = components.members.len();
			let mut members = Vec::new();
			let mut queue = VecDeque::from([start]);
			components.component_of.insert(start, idx);

			while let Some(v) = queue.pop_front() {
				members.push(v);
				for w in graph.successors(v).into_iter().chain(graph.predecessors(v)) {
					if let Entry::Vacant(slot) = components.component_of.entry(w) {
						slot.insert(idx);
						queue.push_back(w);
					}
				}
			}
			components.members.push(members);
		}

		components
	}

	pub fn len(&self) -> usize {
		self.members.len()
	}

	pub fn is_empty(&self) -> bool {
		self.members.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = &[NodeId]> {
		self.members.iter().map(Vec::as_slice)
	}

	pub fn component_of(&self, id: NodeId) -> Option<&[NodeId]> {
		self.component_of
			.get(&id)
			.map(|&idx| self.members[idx].as_slice())
	}
}

/// Names of every node in the component containing `id`.
pub fn component(graph: &FlowGraph, id: NodeId) -> Option<Whitelist> {
	let components = Components::compute(graph);
	let members = components.component_of(id)?;
	Some(
		members
			.iter()
			.filter_map(|&m| graph.node(m))
			.map(|n| n.name().to_owned())
			.collect(),
	)
}

/// The node and edge set handed to the layout engine.
#[derive(Clone, Debug, Default)]
pub struct VisibleGraph {
	nodes: Vec<NodeId>,
	node_set: HashSet<NodeId>,
	edges: Vec<EdgeKey>,
}

impl VisibleGraph {
	/// Without a whitelist everything is visible. Edges follow their source
	/// node; a visible edge may still point at a hidden or missing target.
	pub fn new(graph: &FlowGraph, whitelist: Option<&Whitelist>) -> Self {
		let nodes: Vec<NodeId> = graph
			.nodes()
			.filter(|n| whitelist.is_none_or(|w| w.contains(n.name())))
			.map(|n| n.id)
			.collect();
		let node_set: HashSet<NodeId> = nodes.iter().copied().collect();
		let edges = graph
			.edges()
			.map(|(key, _)| key)
			.filter(|key| whitelist.is_none() || node_set.contains(&key.source))
			.cloned()
			.collect();

		Self {
			nodes,
			node_set,
			edges,
		}
	}

	pub fn nodes(&self) -> &[NodeId] {
		&self.nodes
	}

	pub fn edges(&self) -> &[EdgeKey] {
		&self.edges
	}

	pub fn contains(&self, id: NodeId) -> bool {
		self.node_set.contains(&id)
	}
}
