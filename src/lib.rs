//! Leptos client-side app wiring and routes.

use leptos::prelude::*;
use leptos_meta::*;
use leptos_router::components::*;
use leptos_router::path;
use log::{Level, info};

// Modules
pub mod components;
pub mod config;
pub mod error;
mod pages;

// Top-Level pages
use crate::pages::not_found::NotFound;
use crate::pages::viewer::Viewer;

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("Logging initialized");
}

/// An app router which renders the viewer and handles 404's
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="dark" />

		<Title text="Event Flow Viewer" />

		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<Router>
			<Routes fallback=|| view! { <NotFound /> }>
				<Route path=path!("/") view=Viewer />
			</Routes>
		</Router>
	}
}
