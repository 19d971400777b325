//! Errors raised while loading graph data and message bundles.

/// Failure of the load sequence. Lookups that miss are never errors.
#[derive(Debug, thiserror::Error)]
pub enum ViewerError {
	/// The request could not be issued or the transport failed.
	#[error("failed to fetch {url}: {reason}")]
	Fetch { url: String, reason: String },

	/// The server answered with a non-success status.
	#[error("failed to fetch {url}: HTTP {status}")]
	Status { url: String, status: u16 },

	/// The body was not the expected JSON document.
	#[error("failed to decode {url}: {source}")]
	Decode {
		url: String,
		#[source]
		source: serde_json::Error,
	},

	/// A required query parameter was not given.
	#[error("missing `{0}` query parameter")]
	MissingQuery(&'static str),
}

impl ViewerError {
	pub(crate) fn fetch(url: &str, reason: impl std::fmt::Debug) -> Self {
		ViewerError::Fetch {
			url: url.to_owned(),
			reason: format!("{reason:?}"),
		}
	}
}
