use std::cell::RefCell;
use std::rc::Rc;

use leptos::ev;
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::hooks::use_query_map;
use log::error;

use crate::components::flow_graph::fetch::load_graph;
use crate::components::flow_graph::{FlowGraphCanvas, ForceLayout, ViewerState};
use crate::config::ViewerConfig;

/// Loads the graph named by the query string and shows it full-window.
#[component]
pub fn Viewer() -> impl IntoView {
	let query = use_query_map();
	let config = query.with_untracked(|q| ViewerConfig::from_query(|key| q.get(key)));

	let state = Rc::new(RefCell::new(ViewerState::new(ForceLayout::new(), 800.0, 600.0)));
	state.borrow_mut().set_options(config.label_options());

	let loading = RwSignal::new(true);
	let load_error = RwSignal::new(None::<String>);
	let show_names = RwSignal::new(config.show_names);
	let show_params = RwSignal::new(config.show_params);

	let state_load = state.clone();
	spawn_local(async move {
		match load_graph(&config).await {
			Ok((records, messages)) => {
				let mut s = state_load.borrow_mut();
				s.load(records, messages);
				s.apply_config(&config);
			}
			Err(e) => {
				error!("failed to load graph: {e}");
				load_error.set(Some(e.to_string()));
			}
		}
		loading.set(false);
	});

	let state_names = state.clone();
	let on_names = move |ev: ev::Event| {
		let checked = event_target_checked(&ev);
		show_names.set(checked);
		state_names.borrow_mut().set_show_names(checked);
	};

	let state_params = state.clone();
	let on_params = move |ev: ev::Event| {
		let checked = event_target_checked(&ev);
		show_params.set(checked);
		state_params.borrow_mut().set_show_params(checked);
	};

	view! {
		<div class="fullscreen-graph">
			<FlowGraphCanvas state=state />
			<div class="graph-overlay">
				<label>
					<input type="checkbox" prop:checked=show_names on:change=on_names />
					" names"
				</label>
				<label>
					<input type="checkbox" prop:checked=show_params on:change=on_params />
					" params"
				</label>
				<Show when=move || loading.get()>
					<p class="loading">"Loading..."</p>
				</Show>
			</div>
			{move || {
				load_error
					.get()
					.map(|message| {
						view! {
							<div class="error-banner" role="alert">
								<strong>"Could not load graph: "</strong>
								{message}
							</div>
						}
					})
			}}
		</div>
	}
}
