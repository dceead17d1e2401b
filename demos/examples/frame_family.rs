// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Ten nested frames painted through a text renderer.
//!
//! Each frame sits at `(10, 10)` inside the previous one, so every level moves
//! the absolute origin and grows the composed bound of all its ancestors. The
//! demo then pulls the innermost frame out to the top level and destroys a
//! middle frame while keeping its children.
//!
//! Run:
//! - `RUST_LOG=trellis_widget_tree=trace cargo run -p trellis_demos --example frame_family`

use trellis_widget_tree::{DestroyCx, Gui, PaintCx, Rect, WidgetId, WidgetKind, WidgetSpec};
use tracing_subscriber::EnvFilter;

/// Stand-in for a drawing backend: records one line per drawn rectangle.
#[derive(Default)]
struct TextCanvas {
    lines: Vec<String>,
    released: usize,
}

impl TextCanvas {
    fn fill(&mut self, label: &str, depth: usize, r: Rect) {
        let area = kurbo::Rect::from(r).area();
        self.lines.push(format!(
            "{:indent$}{label} at ({}, {}) {}x{} [{area} px]",
            "",
            r.x,
            r.y,
            r.width,
            r.height,
            indent = depth * 2
        ));
    }

    fn flush(&mut self) {
        for line in self.lines.drain(..) {
            println!("{line}");
        }
    }
}

/// Per-frame payload: nesting depth at creation time.
type Depth = usize;

fn paint_frame(cx: &mut PaintCx<'_, TextCanvas, Depth>) {
    let depth = *cx.data();
    let rect = cx.absolute_geometry();
    cx.renderer().fill("frame", depth, rect);
}

fn destroy_frame(cx: &mut DestroyCx<'_, TextCanvas, Depth>) {
    cx.renderer().released += 1;
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut gui: Gui<TextCanvas, Depth> = Gui::new(TextCanvas::default());
    let geometry = Rect::new(10, 10, 160, 120);

    let mut frames: Vec<WidgetId> = Vec::new();
    let mut parent = None;
    for depth in 0..10 {
        let spec = WidgetSpec::new(WidgetKind::Frame, geometry, depth)
            .with_paint(paint_frame)
            .with_destroy(destroy_frame);
        let id = gui.create(parent, spec).expect("fresh parent handle");
        frames.push(id);
        parent = Some(id);
    }

    tracing::info!(frames = frames.len(), "built frame family");

    println!("-- nested");
    gui.paint();
    gui.renderer_mut().flush();
    println!(
        "outermost composed: {:?}",
        gui.composed_geometry(frames[0]).expect("live")
    );

    // Keep the innermost frame where it was on screen after leaving its parent.
    let innermost = frames[9];
    let absolute = gui.absolute_geometry(innermost).expect("live");
    gui.reparent(innermost, None).expect("top level is never a cycle");
    gui.set_geometry(innermost, absolute).expect("size unchanged");

    println!("-- innermost moved to top level");
    gui.paint();
    gui.renderer_mut().flush();
    println!(
        "outermost composed: {:?}",
        gui.composed_geometry(frames[0]).expect("live")
    );

    // Children of a destroyed frame land under its parent with unchanged
    // relative geometry, so they shift by the destroyed frame's offset.
    let destroyed = gui.destroy(frames[4], false).expect("live");
    println!(
        "-- frame {} destroyed ({} released, payload depth {})",
        4,
        gui.renderer().released,
        destroyed[0].data
    );
    gui.paint();
    gui.renderer_mut().flush();

    if let Err(err) = gui.reparent(frames[0], Some(frames[3])) {
        println!("rejected: {err}");
    }
}
