use super::types::NodeId;

pub const PAN_STEP: f64 = 100.0;
pub const ZOOM_IN: f64 = 1.1;
pub const ZOOM_OUT: f64 = 0.9;
/// Scroll duration when stepping the selection along an edge.
pub const STEP_SCROLL_MS: f64 = 500.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NavKey {
	Escape,
	Up,
	Down,
	Left,
	Right,
}

impl NavKey {
	/// Maps a DOM `KeyboardEvent.key` value.
	pub fn from_key(key: &str) -> Option<Self> {
		match key {
			"Escape" => Some(NavKey::Escape),
			"ArrowUp" => Some(NavKey::Up),
			"ArrowDown" => Some(NavKey::Down),
			"ArrowLeft" => Some(NavKey::Left),
			"ArrowRight" => Some(NavKey::Right),
			_ => None,
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
	Predecessor,
	Successor,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum NavAction {
	ClearSelection,
	Zoom(f64),
	Pan(f64, f64),
	StepSelection(Step),
	Nothing,
}

/// Decides what a key does given the modifier state and current selection.
///
/// With the modifier held, up/down zoom; left/right fall through to the
/// unmodified behavior. Left/right with a selection are reserved.
pub fn plan(key: NavKey, modifier: bool, selected: Option<NodeId>) -> NavAction {
	if key == NavKey::Escape {
		return NavAction::ClearSelection;
	}
	if modifier {
		match key {
			NavKey::Up => return NavAction::Zoom(ZOOM_IN),
			NavKey::Down => return NavAction::Zoom(ZOOM_OUT),
			_ => {}
		}
	}
	match (selected, key) {
		(None, NavKey::Up) => NavAction::Pan(0.0, PAN_STEP),
		(None, NavKey::Down) => NavAction::Pan(0.0, -PAN_STEP),
		(None, NavKey::Left) => NavAction::Pan(PAN_STEP, 0.0),
		(None, NavKey::Right) => NavAction::Pan(-PAN_STEP, 0.0),
		(Some(_), NavKey::Up) => NavAction::StepSelection(Step::Predecessor),
		(Some(_), NavKey::Down) => NavAction::StepSelection(Step::Successor),
		_ => NavAction::Nothing,
	}
}
