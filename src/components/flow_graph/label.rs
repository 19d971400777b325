use std::fmt::Write;

use serde_json::Value;

use super::messages::{MESSAGE_PARAM, MessageCache};
use super::types::{NodeRecord, NodeType};

/// Parameters that never show up in labels.
const HIDDEN_PARAM: &str = "IsWaitFinish";
const MESSAGE_DELIMITER_WIDTH: usize = 40;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LabelOptions {
	pub show_names: bool,
	pub show_params: bool,
}

/// Builds the multi-line label of a node.
pub fn node_label(node: &NodeRecord, opts: LabelOptions, messages: &MessageCache) -> String {
	let data = &node.data;
	let prefix = if opts.show_names {
		format!("{}\n", data.name)
	} else {
		String::new()
	};

	let mut label = match node.node_type {
		NodeType::Entry => data.name.clone(),
		NodeType::Action => format!("{prefix}{}\n{}", data.actor, data.action),
		NodeType::Switch => format!("{prefix}{}\n{}", data.actor, data.query),
		NodeType::Fork => format!("{prefix}Fork"),
		NodeType::Join => format!("{prefix}Join"),
		NodeType::SubFlow => format!(
			"{prefix}{}\n<{}>",
			data.res_flowchart_name, data.entry_point_name
		),
		NodeType::Unknown => node.id.to_string(),
	};

	let Some(params) = data.params.as_ref().filter(|_| opts.show_params) else {
		return label;
	};
	for (key, value) in params {
		if key == HIDDEN_PARAM {
			continue;
		}
		let text = scalar_text(value);
		let _ = write!(label, "\n{key}: {text}");
		if key == MESSAGE_PARAM {
			if let Some(message) = messages.lookup(&text) {
				let dash = format!("\n{}\n", "-".repeat(MESSAGE_DELIMITER_WIDTH));
				label.push_str(&dash);
				label.push_str(&message.text());
				label.push_str(&dash);
			}
		}
	}
	label
}

/// Fixed six decimals, then trailing zeros and a dangling point dropped.
pub fn format_number(n: f64) -> String {
	let fixed = format!("{n:.6}");
	if !fixed.contains('.') {
		return fixed;
	}
	fixed.trim_end_matches('0').trim_end_matches('.').to_owned()
}

/// Text of a parameter value as shown in a label.
pub fn scalar_text(value: &Value) -> String {
	match value {
		Value::String(s) => s.clone(),
		Value::Number(n) => n.as_f64().map(format_number).unwrap_or_else(|| n.to_string()),
		Value::Bool(b) => b.to_string(),
		Value::Null => "null".to_owned(),
		other => other.to_string(),
	}
}

#[cfg(test)]
mod tests {
	use rstest::rstest;

	use super::*;
	use crate::components::flow_graph::types::Record;

	fn node(json: &str) -> NodeRecord {
		match serde_json::from_str::<Record>(json).unwrap() {
			Record::Node(node) => node,
			other => panic!("expected node record, got {other:?}"),
		}
	}

	const NAMES: LabelOptions = LabelOptions {
		show_names: true,
		show_params: false,
	};
	const PARAMS: LabelOptions = LabelOptions {
		show_names: false,
		show_params: true,
	};

	#[rstest]
	#[case(0.5, "0.5")]
	#[case(3.0, "3")]
	#[case(1.2345, "1.2345")]
	#[case(100.0, "100")]
	#[case(0.0, "0")]
	#[case(-2.25, "-2.25")]
	#[case(0.1234567, "0.123457")]
	fn formats_numbers(#[case] input: f64, #[case] expected: &str) {
		assert_eq!(format_number(input), expected);
	}

	#[rstest]
	#[case(r#"{"type":"node","id":1,"node_type":"entry","data":{"name":"Main"}}"#, "Main")]
	#[case(
		r#"{"type":"node","id":2,"node_type":"action","data":{"name":"Ev","actor":"Hero","action":"Jump"}}"#,
		"Ev\nHero\nJump"
	)]
	#[case(
		r#"{"type":"node","id":3,"node_type":"switch","data":{"name":"Ev","actor":"Npc","query":"IsDay"}}"#,
		"Ev\nNpc\nIsDay"
	)]
	#[case(r#"{"type":"node","id":4,"node_type":"fork","data":{"name":"F"}}"#, "F\nFork")]
	#[case(r#"{"type":"node","id":5,"node_type":"join","data":{"name":"J"}}"#, "J\nJoin")]
	#[case(
		r#"{"type":"node","id":6,"node_type":"sub_flow","data":{"name":"S","res_flowchart_name":"Other","entry_point_name":"Start"}}"#,
		"S\nOther\n<Start>"
	)]
	#[case(r#"{"type":"node","id":7,"node_type":"mystery","data":{"name":"M"}}"#, "7")]
	fn labels_each_variant_with_names(#[case] json: &str, #[case] expected: &str) {
		assert_eq!(node_label(&node(json), NAMES, &MessageCache::new()), expected);
	}

	#[test]
	fn names_hidden_by_default() {
		let action = node(r#"{"type":"node","id":2,"node_type":"action","data":{"name":"Ev","actor":"Hero","action":"Jump"}}"#);
		assert_eq!(
			node_label(&action, LabelOptions::default(), &MessageCache::new()),
			"Hero\nJump"
		);
	}

	#[test]
	fn params_skip_wait_flag_and_keep_order() {
		let action = node(
			r#"{"type":"node","id":2,"node_type":"action","data":{"actor":"Hero","action":"Walk",
			"params":{"Speed":2.0,"IsWaitFinish":true,"Target":"Door","Loop":false}}}"#,
		);
		assert_eq!(
			node_label(&action, PARAMS, &MessageCache::new()),
			"Hero\nWalk\nSpeed: 2\nTarget: Door\nLoop: false"
		);
		assert_eq!(
			node_label(&action, LabelOptions::default(), &MessageCache::new()),
			"Hero\nWalk"
		);
	}

	#[test]
	fn message_text_is_delimited() {
		let mut messages = MessageCache::new();
		messages.merge(serde_json::from_str(r#"{"5":{"contents":[{"text":"Hi"},{"text":" there"}]}}"#).unwrap());
		let talk = node(
			r#"{"type":"node","id":9,"node_type":"action","data":{"actor":"Npc","action":"Talk",
			"params":{"MessageId":"File1:5","Speed":2.0}}}"#,
		);

		let dash = "-".repeat(40);
		assert_eq!(
			node_label(&talk, PARAMS, &messages),
			format!("Npc\nTalk\nMessageId: File1:5\n{dash}\nHi there\n{dash}\n\nSpeed: 2")
		);
	}

	#[test]
	fn unresolved_message_is_left_out() {
		let talk = node(
			r#"{"type":"node","id":9,"node_type":"action","data":{"actor":"Npc","action":"Talk",
			"params":{"MessageId":"File1:404"}}}"#,
		);
		assert_eq!(
			node_label(&talk, PARAMS, &MessageCache::new()),
			"Npc\nTalk\nMessageId: File1:404"
		);
	}
}
