//! Message text bundles referenced by `MessageId` node parameters.
//!
//! A `MessageId` value has the form `<file>:<id>`. Every distinct `<file>`
//! referenced by the loaded records is fetched once, all fetches run
//! concurrently, and the bundles are merged into one flat [`MessageCache`].

use std::collections::HashMap;
use std::future::Future;

use futures::future::try_join_all;
use log::debug;
use serde::Deserialize;

use super::types::Record;
use crate::error::ViewerError;

pub const MESSAGE_PARAM: &str = "MessageId";

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Message {
	#[serde(default)]
	pub contents: Vec<MessageContent>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct MessageContent {
	#[serde(default)]
	pub text: Option<String>,
}

impl Message {
	/// Concatenation of every non-empty text fragment.
	pub fn text(&self) -> String {
		self.contents
			.iter()
			.filter_map(|c| c.text.as_deref())
			.filter(|t| !t.is_empty())
			.collect()
	}
}

/// Contents of one bundle file, keyed by message id.
pub type MessageBundle = HashMap<String, Message>;

#[derive(Clone, Debug, Default)]
pub struct MessageCache {
	messages: HashMap<String, Message>,
}

impl MessageCache {
	pub fn new() -> Self {
		Self::default()
	}

	/// Later bundles overwrite earlier ones on key collision.
	pub fn merge(&mut self, bundle: MessageBundle) {
		self.messages.extend(bundle);
	}

	/// Looks up a full `MessageId` value, falling back to the id after the
	/// file prefix.
	pub fn lookup(&self, message_id: &str) -> Option<&Message> {
		self.messages.get(message_id).or_else(|| {
			message_id
				.split_once(':')
				.and_then(|(_, id)| self.messages.get(id))
		})
	}

	pub fn len(&self) -> usize {
		self.messages.len()
	}

	pub fn is_empty(&self) -> bool {
		self.messages.is_empty()
	}
}

/// Somewhere bundle files can be loaded from.
pub trait BundleSource {
	fn fetch_bundle(&self, file: &str) -> impl Future<Output = Result<MessageBundle, ViewerError>>;
}

/// File key of a `MessageId` value: everything before the first `:`.
pub fn file_key(message_id: &str) -> &str {
	message_id.split(':').next().unwrap_or(message_id)
}

/// Distinct bundle files referenced by node parameters, in first-seen order.
pub fn referenced_files(records: &[Record]) -> Vec<String> {
	let mut files: Vec<String> = Vec::new();
	for record in records {
		let Record::Node(node) = record else {
			continue;
		};
		let Some(message_id) = node
			.data
			.params
			.as_ref()
			.and_then(|p| p.get(MESSAGE_PARAM))
			.and_then(|v| v.as_str())
			.filter(|id| !id.is_empty())
		else {
			continue;
		};
		let key = file_key(message_id);
		if !files.iter().any(|f| f == key) {
			files.push(key.to_owned());
		}
	}
	files
}

/// Fetches every referenced bundle concurrently. Any failed fetch fails the
/// whole resolution.
pub async fn resolve<S: BundleSource>(
	source: &S,
	records: &[Record],
) -> Result<MessageCache, ViewerError> {
	let files = referenced_files(records);
	debug!("resolving {} message bundle(s)", files.len());

	let bundles = try_join_all(files.iter().map(|file| source.fetch_bundle(file))).await?;

	let mut cache = MessageCache::new();
	for bundle in bundles {
		cache.merge(bundle);
	}
	Ok(cache)
}
