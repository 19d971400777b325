use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::layout::{FONT_SIZE, LINE_HEIGHT, LayoutEngine, NodeBox, edge_lanes};
use super::selection::Highlight;
use super::state::ViewerState;
use super::types::NodeType;

const BACKGROUND: &str = "#1a1a2e";
const EDGE_COLOR: &str = "rgba(100, 180, 255, 0.6)";
const IN_EDGE_COLOR: &str = "rgba(255, 170, 60, 0.95)";
const OUT_EDGE_COLOR: &str = "rgba(120, 230, 120, 0.95)";
const TEXT_COLOR: &str = "rgba(255, 255, 255, 0.9)";

fn node_color(node_type: NodeType) -> &'static str {
	match node_type {
		NodeType::Entry => "#1f77b4",
		NodeType::Action => "#2ca02c",
		NodeType::Switch => "#ff7f0e",
		NodeType::Fork => "#9467bd",
		NodeType::Join => "#8c564b",
		NodeType::SubFlow => "#17becf",
		NodeType::Unknown => "#7f7f7f",
	}
}

fn edge_color(highlight: Highlight) -> &'static str {
	match highlight {
		Highlight::InEdge => IN_EDGE_COLOR,
		Highlight::OutEdge => OUT_EDGE_COLOR,
		Highlight::Normal | Highlight::Selected => EDGE_COLOR,
	}
}

pub fn render<L: LayoutEngine>(state: &ViewerState<L>, ctx: &CanvasRenderingContext2d) {
	let (width, height) = state.viewport().size();
	let t = state.viewport().transform();
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, width, height);
	ctx.save();
	let _ = ctx.translate(t.x, t.y);
	let _ = ctx.scale(t.k, t.k);
	draw_edges(state, ctx);
	draw_nodes(state, ctx);
	ctx.restore();
}

fn draw_edges<L: LayoutEngine>(state: &ViewerState<L>, ctx: &CanvasRenderingContext2d) {
	let graph = state.graph();
	let layout = state.layout();
	let k = state.viewport().transform().k;
	let (dash, gap, arrow_size) = (8.0 / k, 4.0 / k, 8.0 / k);
	let dash_offset = -(state.flow_time * 30.0) % (dash + gap);
	let keys = state.visible().edges();
	let lanes = edge_lanes(keys);

	for (key, &lane) in keys.iter().zip(&lanes) {
		let (Some(edge), Some(source), Some(target)) = (
			graph.edge(key),
			graph.node(key.source),
			graph.node(key.target),
		) else {
			continue;
		};
		let (Some((x1, y1)), Some((x2, y2))) = (layout.position(key.source), layout.position(key.target))
		else {
			continue;
		};
		let (dx, dy) = (x2 - x1, y2 - y1);
		let dist = (dx * dx + dy * dy).sqrt();
		if dist < 0.001 {
			continue;
		}

		// lanes sit to the left of the lower id -> higher id direction
		let flip = if key.source <= key.target { 1.0 } else { -1.0 };
		let (nx, ny) = (-dy / dist * flip, dx / dist * flip);
		let (mx, my) = ((x1 + x2) / 2.0 + nx * lane, (y1 + y2) / 2.0 + ny * lane);
		// control point of a quadratic through (mx, my)
		let (cx, cy) = (2.0 * mx - (x1 + x2) / 2.0, 2.0 * my - (y1 + y2) / 2.0);

		let highlight = state.edge_highlight(key);
		let color = edge_color(highlight);
		let width = (if highlight == Highlight::Normal { 1.5 } else { 2.5 }) / k;
		ctx.set_stroke_style_str(color);
		ctx.set_line_width(width);
		if edge.is_virtual {
			let _ = ctx.set_line_dash(&js_sys::Array::of2(
				&JsValue::from_f64(dash),
				&JsValue::from_f64(gap),
			));
			ctx.set_line_dash_offset(dash_offset);
		}

		// clip both ends to the boxes along the curve's end tangents
		let (sx, sy) = unit(cx - x1, cy - y1);
		let (ex, ey) = unit(x2 - cx, y2 - cy);
		let start = box_exit(NodeBox::for_label(&source.label), sx, sy);
		let end = box_exit(NodeBox::for_label(&target.label), ex, ey);
		let (tip_x, tip_y) = (x2 - ex * end, y2 - ey * end);
		let (back_x, back_y) = (tip_x - ex * arrow_size, tip_y - ey * arrow_size);
		ctx.begin_path();
		ctx.move_to(x1 + sx * start, y1 + sy * start);
		ctx.quadratic_curve_to(cx, cy, back_x, back_y);
		ctx.stroke();
		let _ = ctx.set_line_dash(&js_sys::Array::new());

		ctx.set_fill_style_str(color);
		let (px, py) = (-ey * arrow_size * 0.5, ex * arrow_size * 0.5);
		ctx.begin_path();
		ctx.move_to(tip_x, tip_y);
		ctx.line_to(back_x + px, back_y + py);
		ctx.line_to(back_x - px, back_y - py);
		ctx.close_path();
		ctx.fill();

		if !edge.label.is_empty() {
			ctx.set_fill_style_str(if highlight == Highlight::Normal { TEXT_COLOR } else { color });
			ctx.set_font(&format!("{FONT_SIZE}px monospace"));
			let _ = ctx.fill_text(&edge.label, mx + 4.0, my);
		}
	}
}

fn unit(dx: f64, dy: f64) -> (f64, f64) {
	let len = (dx * dx + dy * dy).sqrt().max(1e-9);
	(dx / len, dy / len)
}

/// Distance from a box center to its border along a unit direction.
fn box_exit(b: NodeBox, ux: f64, uy: f64) -> f64 {
	let tx = if ux.abs() > 1e-9 { b.width / 2.0 / ux.abs() } else { f64::INFINITY };
	let ty = if uy.abs() > 1e-9 { b.height / 2.0 / uy.abs() } else { f64::INFINITY };
	tx.min(ty)
}

fn draw_nodes<L: LayoutEngine>(state: &ViewerState<L>, ctx: &CanvasRenderingContext2d) {
	let graph = state.graph();
	let k = state.viewport().transform().k;

	for &id in state.visible().nodes() {
		let (Some(node), Some((x, y))) = (graph.node(id), state.layout().position(id)) else {
			continue;
		};
		let b = NodeBox::for_label(&node.label);
		let (left, top) = (x - b.width / 2.0, y - b.height / 2.0);
		let selected = state.node_highlight(id) == Highlight::Selected;

		if selected {
			let glow = b.width.max(b.height);
			if let Ok(gradient) = ctx.create_radial_gradient(x, y, glow * 0.3, x, y, glow) {
				let _ = gradient.add_color_stop(0.0, "rgba(255, 255, 255, 0.3)");
				let _ = gradient.add_color_stop(1.0, "rgba(255, 255, 255, 0)");
				ctx.begin_path();
				let _ = ctx.arc(x, y, glow, 0.0, 2.0 * PI);
				#[allow(deprecated)]
				ctx.set_fill_style(&gradient);
				ctx.fill();
			}
		}

		ctx.set_fill_style_str(node_color(node.node_type));
		ctx.fill_rect(left, top, b.width, b.height);
		if selected {
			ctx.set_stroke_style_str("white");
			ctx.set_line_width(3.0 / k);
			ctx.stroke_rect(left, top, b.width, b.height);
		}

		ctx.set_fill_style_str(TEXT_COLOR);
		ctx.set_font(&format!("{FONT_SIZE}px monospace"));
		let first_line = top + (b.height - node.label.lines().count() as f64 * LINE_HEIGHT) / 2.0 + FONT_SIZE;
		for (i, line) in node.label.lines().enumerate() {
			let _ = ctx.fill_text(line, left + 8.0, first_line + i as f64 * LINE_HEIGHT);
		}
	}
}
