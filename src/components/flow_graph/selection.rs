use log::debug;

use super::filter::VisibleGraph;
use super::model::{EdgeKey, FlowGraph};
use super::types::NodeId;

/// Render style of a node or edge, derived from the current selection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Highlight {
	#[default]
	Normal,
	Selected,
	InEdge,
	OutEdge,
}

#[derive(Clone, Debug, Default)]
pub struct IncidentEdges<'g> {
	pub inbound: Vec<&'g EdgeKey>,
	pub outbound: Vec<&'g EdgeKey>,
}

/// At most one selected node.
#[derive(Clone, Debug, Default)]
pub struct Selection {
	selected: Option<NodeId>,
}

impl Selection {
	/// Replaces the selection. Ids that are not rendered leave nothing selected.
	pub fn select(&mut self, id: NodeId, visible: &VisibleGraph) -> bool {
		self.clear();
		if !visible.contains(id) {
			return false;
		}
		debug!("selected node {id}");
		self.selected = Some(id);
		true
	}

	pub fn clear(&mut self) {
		self.selected = None;
	}

	pub fn current(&self) -> Option<NodeId> {
		self.selected
	}

	/// Drops the selection if its node is no longer rendered.
	pub fn retain_visible(&mut self, visible: &VisibleGraph) {
		if self.selected.is_some_and(|id| !visible.contains(id)) {
			self.selected = None;
		}
	}

	pub fn incident_edges<'g>(&self, graph: &'g FlowGraph) -> IncidentEdges<'g> {
		match self.selected {
			Some(id) => IncidentEdges {
				inbound: graph.in_edges(id),
				outbound: graph.out_edges(id),
			},
			None => IncidentEdges::default(),
		}
	}

	pub fn node_highlight(&self, id: NodeId) -> Highlight {
		if self.selected == Some(id) {
			Highlight::Selected
		} else {
			Highlight::Normal
		}
	}

	/// A self-loop counts as outbound.
	pub fn edge_highlight(&self, key: &EdgeKey) -> Highlight {
		match self.selected {
			Some(id) if key.source == id => Highlight::OutEdge,
			Some(id) if key.target == id => Highlight::InEdge,
			_ => Highlight::Normal,
		}
	}
}
