use indexmap::IndexMap;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

pub type NodeId = i64;

/// One entry of a graph data file.
#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Record {
	Node(NodeRecord),
	Edge(EdgeRecord),
	#[serde(other)]
	Other,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
	Entry,
	Action,
	Switch,
	Fork,
	Join,
	SubFlow,
	#[default]
	#[serde(other)]
	Unknown,
}

impl NodeType {
	/// Style tag used by the renderer.
	pub fn class(self) -> &'static str {
		match self {
			NodeType::Entry => "entry",
			NodeType::Action => "action",
			NodeType::Switch => "switch",
			NodeType::Fork => "fork",
			NodeType::Join => "join",
			NodeType::SubFlow => "sub_flow",
			NodeType::Unknown => "unknown",
		}
	}
}

#[derive(Clone, Debug, Deserialize)]
pub struct NodeRecord {
	pub id: NodeId,
	#[serde(default)]
	pub node_type: NodeType,
	#[serde(default, deserialize_with = "null_as_default")]
	pub data: NodeData,
}

/// Variant-specific node fields. Anything missing reads as empty.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct NodeData {
	#[serde(deserialize_with = "null_as_default")]
	pub name: String,
	#[serde(deserialize_with = "null_as_default")]
	pub actor: String,
	#[serde(deserialize_with = "null_as_default")]
	pub action: String,
	#[serde(deserialize_with = "null_as_default")]
	pub query: String,
	#[serde(deserialize_with = "null_as_default")]
	pub res_flowchart_name: String,
	#[serde(deserialize_with = "null_as_default")]
	pub entry_point_name: String,
	pub params: Option<IndexMap<String, Value>>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct EdgeRecord {
	pub source: NodeId,
	pub target: NodeId,
	#[serde(default, deserialize_with = "null_as_default")]
	pub data: EdgeData,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct EdgeData {
	pub value: Value,
	#[serde(rename = "virtual", deserialize_with = "null_as_default")]
	pub is_virtual: bool,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
	D: Deserializer<'de>,
	T: Default + Deserialize<'de>,
{
	Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
