use std::collections::HashMap;

use indexmap::IndexMap;
use log::warn;
use serde_json::Value;

use super::label::{LabelOptions, node_label};
use super::messages::MessageCache;
use super::types::{NodeData, NodeId, NodeType, Record};

#[derive(Clone, Debug)]
pub struct FlowNode {
	pub id: NodeId,
	pub label: String,
	pub node_type: NodeType,
	pub data: NodeData,
}

impl FlowNode {
	pub fn name(&self) -> &str {
		&self.data.name
	}

	pub fn class(&self) -> &'static str {
		self.node_type.class()
	}
}

/// Parallel edges between the same pair are told apart by their value.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeKey {
	pub source: NodeId,
	pub target: NodeId,
	pub value: Option<String>,
}

#[derive(Clone, Debug)]
pub struct FlowEdge {
	pub label: String,
	pub is_virtual: bool,
}

/// Directed multigraph built from a flat record list.
#[derive(Clone, Debug, Default)]
pub struct FlowGraph {
	nodes: IndexMap<NodeId, FlowNode>,
	edges: IndexMap<EdgeKey, FlowEdge>,
	outbound: HashMap<NodeId, Vec<usize>>,
	inbound: HashMap<NodeId, Vec<usize>>,
}

impl FlowGraph {
	/// Later records with an already-used id or edge key replace earlier ones
	/// in place.
	pub fn build(records: &[Record], opts: LabelOptions, messages: &MessageCache) -> Self {
		let mut graph = FlowGraph::default();

		for record in records {
			if let Record::Node(node) = record {
				graph.nodes.insert(
					node.id,
					FlowNode {
						id: node.id,
						label: node_label(node, opts, messages),
						node_type: node.node_type,
						data: node.data.clone(),
					},
				);
			}
		}

		for record in records {
			if let Record::Edge(edge) = record {
				let value = edge_value_text(&edge.data.value);
				graph.edges.insert(
					EdgeKey {
						source: edge.source,
						target: edge.target,
						value: value.clone(),
					},
					FlowEdge {
						label: value.unwrap_or_default(),
						is_virtual: edge.data.is_virtual,
					},
				);
			}
		}

		let mut dangling = 0;
		for (idx, key) in graph.edges.keys().enumerate() {
			graph.outbound.entry(key.source).or_default().push(idx);
			graph.inbound.entry(key.target).or_default().push(idx);
			if !graph.nodes.contains_key(&key.source) || !graph.nodes.contains_key(&key.target) {
				dangling += 1;
			}
		}
		if dangling > 0 {
			warn!("{dangling} edge(s) reference missing nodes");
		}

		graph
	}

	pub fn node(&self, id: NodeId) -> Option<&FlowNode> {
		self.nodes.get(&id)
	}

	pub fn contains(&self, id: NodeId) -> bool {
		self.nodes.contains_key(&id)
	}

	pub fn nodes(&self) -> impl Iterator<Item = &FlowNode> {
		self.nodes.values()
	}

	pub fn edges(&self) -> impl Iterator<Item = (&EdgeKey, &FlowEdge)> {
		self.edges.iter()
	}

	pub fn edge(&self, key: &EdgeKey) -> Option<&FlowEdge> {
		self.edges.get(key)
	}

	pub fn node_count(&self) -> usize {
		self.nodes.len()
	}

	pub fn edge_count(&self) -> usize {
		self.edges.len()
	}

	pub fn in_edges(&self, id: NodeId) -> Vec<&EdgeKey> {
		self.edge_keys(self.inbound.get(&id))
	}

	pub fn out_edges(&self, id: NodeId) -> Vec<&EdgeKey> {
		self.edge_keys(self.outbound.get(&id))
	}

	/// Distinct sources of inbound edges, lowest id first. Missing nodes are skipped.
	pub fn predecessors(&self, id: NodeId) -> Vec<NodeId> {
		self.neighbors(self.in_edges(id).into_iter().map(|k| k.source))
	}

	/// Distinct targets of outbound edges, lowest id first. Missing nodes are skipped.
	pub fn successors(&self, id: NodeId) -> Vec<NodeId> {
		self.neighbors(self.out_edges(id).into_iter().map(|k| k.target))
	}

	pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
		self.nodes().find(|n| n.name() == name).map(|n| n.id)
	}

	pub fn find_entry(&self, name: &str) -> Option<NodeId> {
		self.nodes()
			.find(|n| n.node_type == NodeType::Entry && n.name() == name)
			.map(|n| n.id)
	}

	fn edge_keys(&self, indices: Option<&Vec<usize>>) -> Vec<&EdgeKey> {
		indices
			.into_iter()
			.flatten()
			.filter_map(|&idx| self.edges.get_index(idx).map(|(key, _)| key))
			.collect()
	}

	fn neighbors(&self, ids: impl Iterator<Item = NodeId>) -> Vec<NodeId> {
		let mut out: Vec<NodeId> = ids.filter(|&id| self.contains(id)).collect();
		out.sort_unstable();
		out.dedup();
		out
	}
}

fn edge_value_text(value: &Value) -> Option<String> {
	match value {
		Value::Null => None,
		Value::String(s) => Some(s.clone()),
		Value::Number(n) if n.is_f64() => n.as_f64().map(|f| f.to_string()),
		other => Some(other.to_string()),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn graph(json: &str) -> FlowGraph {
		let records: Vec<Record> = serde_json::from_str(json).unwrap();
		FlowGraph::build(&records, LabelOptions::default(), &MessageCache::new())
	}

	#[test]
	fn counts_match_records() {
		let g = graph(
			r#"[
			{"type":"node","id":1,"node_type":"entry","data":{"name":"Main"}},
			{"type":"edge","source":1,"target":2,"data":{"value":null,"virtual":false}},
			{"type":"node","id":2,"node_type":"switch","data":{"name":"Q","actor":"Npc","query":"Ask"}},
			{"type":"node","id":3,"node_type":"fork","data":{"name":"F"}},
			{"type":"edge","source":2,"target":3,"data":{"value":0}},
			{"type":"edge","source":2,"target":3,"data":{"value":1}}
		]"#,
		);
		assert_eq!(g.node_count(), 3);
		assert_eq!(g.edge_count(), 3);
		assert_eq!(g.node(1).unwrap().label, "Main");
		assert_eq!(g.node(2).unwrap().class(), "switch");
	}

	#[test]
	fn parallel_edges_are_keyed_by_value() {
		let g = graph(
			r#"[
			{"type":"node","id":1,"node_type":"switch"},
			{"type":"node","id":2,"node_type":"fork"},
			{"type":"edge","source":1,"target":2,"data":{"value":0}},
			{"type":"edge","source":1,"target":2,"data":{"value":1,"virtual":true}},
			{"type":"edge","source":1,"target":2,"data":{"value":"yes"}}
		]"#,
		);
		let labels: Vec<(&str, bool)> = g.edges().map(|(_, e)| (e.label.as_str(), e.is_virtual)).collect();
		assert_eq!(labels, [("0", false), ("1", true), ("yes", false)]);
		assert_eq!(g.out_edges(1).len(), 3);
		assert_eq!(g.in_edges(2).len(), 3);
		assert_eq!(g.successors(1), [2]);
		assert_eq!(g.predecessors(2), [1]);
	}

	#[test]
	fn neighbors_come_back_by_ascending_id() {
		let g = graph(
			r#"[
			{"type":"node","id":1,"node_type":"action"},
			{"type":"node","id":3,"node_type":"action"},
			{"type":"node","id":5,"node_type":"action"},
			{"type":"node","id":9,"node_type":"action"},
			{"type":"edge","source":9,"target":5},
			{"type":"edge","source":3,"target":5},
			{"type":"edge","source":5,"target":9},
			{"type":"edge","source":5,"target":1},
			{"type":"edge","source":5,"target":9,"data":{"value":1}}
		]"#,
		);
		assert_eq!(g.predecessors(5), [3, 9]);
		assert_eq!(g.successors(5), [1, 9]);
	}

	#[test]
	fn duplicate_edge_key_keeps_last_data() {
		let g = graph(
			r#"[
			{"type":"node","id":1,"node_type":"action"},
			{"type":"node","id":2,"node_type":"action"},
			{"type":"edge","source":1,"target":2,"data":{"value":null,"virtual":false}},
			{"type":"edge","source":1,"target":2,"data":{"value":null,"virtual":true}}
		]"#,
		);
		assert_eq!(g.edge_count(), 1);
		let key = EdgeKey {
			source: 1,
			target: 2,
			value: None,
		};
		let edge = g.edge(&key).unwrap();
		assert!(edge.is_virtual);
		assert_eq!(edge.label, "");
	}

	#[test]
	fn dangling_edges_are_kept_but_not_neighbors() {
		let g = graph(
			r#"[
			{"type":"node","id":1,"node_type":"action"},
			{"type":"edge","source":1,"target":99},
			{"type":"edge","source":42,"target":1}
		]"#,
		);
		assert_eq!(g.edge_count(), 2);
		assert!(g.successors(1).is_empty());
		assert!(g.predecessors(1).is_empty());
		assert_eq!(g.out_edges(1).len(), 1);
	}

	#[test]
	fn finds_nodes_by_name() {
		let g = graph(
			r#"[
			{"type":"node","id":5,"node_type":"action","data":{"name":"Main"}},
			{"type":"node","id":6,"node_type":"entry","data":{"name":"Main"}}
		]"#,
		);
		assert_eq!(g.find_by_name("Main"), Some(5));
		assert_eq!(g.find_entry("Main"), Some(6));
		assert_eq!(g.find_entry("Nope"), None);
	}
}
