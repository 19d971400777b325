//! Browser fetch of graph files and message bundles.

use log::info;
use serde::de::DeserializeOwned;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, RequestMode, Response};

use super::messages::{self, BundleSource, MessageBundle, MessageCache};
use super::types::Record;
use crate::config::ViewerConfig;
use crate::error::ViewerError;

/// Graph files may live on another origin.
const REQUEST_MODE: RequestMode = RequestMode::Cors;

/// Loads bundles from `<base>/<file>.json`.
#[derive(Clone, Debug)]
pub struct HttpBundleSource {
	base: String,
}

impl Default for HttpBundleSource {
	fn default() -> Self {
		Self { base: "msg".into() }
	}
}

impl BundleSource for HttpBundleSource {
	async fn fetch_bundle(&self, file: &str) -> Result<MessageBundle, ViewerError> {
		fetch_json(&format!("{}/{file}.json", self.base)).await
	}
}

pub async fn fetch_json<T: DeserializeOwned>(url: &str) -> Result<T, ViewerError> {
	let opts = RequestInit::new();
	opts.set_method("GET");
	opts.set_mode(REQUEST_MODE);

	let request = Request::new_with_str_and_init(url, &opts).map_err(|e| ViewerError::fetch(url, e))?;
	let window = web_sys::window().ok_or_else(|| ViewerError::fetch(url, "no window"))?;
	let resp_value = JsFuture::from(window.fetch_with_request(&request))
		.await
		.map_err(|e| ViewerError::fetch(url, e))?;
	let resp: Response = resp_value
		.dyn_into()
		.map_err(|_| ViewerError::fetch(url, "response is not a Response"))?;

	if !resp.ok() {
		return Err(ViewerError::Status {
			url: url.to_owned(),
			status: resp.status(),
		});
	}

	let text = JsFuture::from(resp.text().map_err(|e| ViewerError::fetch(url, e))?)
		.await
		.map_err(|e| ViewerError::fetch(url, e))?;
	let body = text.as_string().unwrap_or_default();
	serde_json::from_str(&body).map_err(|source| ViewerError::Decode {
		url: url.to_owned(),
		source,
	})
}

/// Fetches the graph named by `config.data` and every message bundle it
/// references. Nothing is returned unless all of it loaded.
pub async fn load_graph(config: &ViewerConfig) -> Result<(Vec<Record>, MessageCache), ViewerError> {
	let url = config.data.as_deref().ok_or(ViewerError::MissingQuery("data"))?;
	let records: Vec<Record> = fetch_json(url).await?;
	let messages = messages::resolve(&HttpBundleSource::default(), &records).await?;
	info!("fetched {url}: {} records", records.len());
	Ok((records, messages))
}
