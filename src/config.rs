//! Viewer settings read from the page query string.

use crate::components::flow_graph::LabelOptions;

/// `?data=<graph.json>&names=1&params=1&entry=<name>&node=<name>`
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ViewerConfig {
	/// Path of the graph JSON file.
	pub data: Option<String>,
	/// Show name lines above node bodies.
	pub show_names: bool,
	/// Show parameter lines below node bodies.
	pub show_params: bool,
	/// Entry point to focus on load.
	pub entry: Option<String>,
	/// Node to select on load.
	pub node: Option<String>,
}

impl ViewerConfig {
	/// A key counts as set when present with a non-empty value.
	pub fn from_query(lookup: impl Fn(&str) -> Option<String>) -> Self {
		let text = |key: &str| lookup(key).filter(|v| !v.is_empty());
		Self {
			data: text("data"),
			show_names: text("names").is_some(),
			show_params: text("params").is_some(),
			entry: text("entry"),
			node: text("node"),
		}
	}

	/// Label options the graph starts with.
	pub fn label_options(&self) -> LabelOptions {
		LabelOptions {
			show_names: self.show_names,
			show_params: self.show_params,
		}
	}
}

#[cfg(test)]
mod tests {
	use std::collections::HashMap;

	use super::*;

	fn parse(pairs: &[(&str, &str)]) -> ViewerConfig {
		let query: HashMap<String, String> = pairs
			.iter()
			.map(|(k, v)| (k.to_string(), v.to_string()))
			.collect();
		ViewerConfig::from_query(|key| query.get(key).cloned())
	}

	#[test]
	fn reads_every_key() {
		let config = parse(&[
			("data", "/d/Demo.json"),
			("names", "1"),
			("params", "1"),
			("entry", "Main"),
			("node", "Hero"),
		]);
		assert_eq!(
			config,
			ViewerConfig {
				data: Some("/d/Demo.json".into()),
				show_names: true,
				show_params: true,
				entry: Some("Main".into()),
				node: Some("Hero".into()),
			}
		);
	}

	#[test]
	fn empty_values_are_unset() {
		let config = parse(&[("data", "/d/Demo.json"), ("names", "1"), ("params", ""), ("entry", "")]);
		assert!(config.show_names);
		assert!(!config.show_params);
		assert_eq!(config.entry, None);
		assert_eq!(config.node, None);
		assert_eq!(
			config.label_options(),
			LabelOptions {
				show_names: true,
				show_params: false
			}
		);
	}
}
