// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Trellis Widget Tree: a retained-mode widget hierarchy for immediate-mode renderers.
//!
//! The crate keeps a forest of rectangular widgets, maintains three views of
//! their geometry, and drives a parent-first paint traversal. Drawing itself is
//! left to widget callbacks and to whatever renderer handle the GUI carries.
//!
//! ## Geometry
//!
//! Every widget stores a *relative* rectangle, positioned against its parent's
//! origin (or the coordinate origin for top-level widgets). From it the tree
//! derives:
//!
//! - *Absolute* geometry: the relative position plus the position of every
//!   ancestor. Computed on request, never cached.
//! - *Composed* geometry: the bound of the widget and its whole subtree, at the
//!   widget's relative position. Cached per widget and rebuilt eagerly, walking
//!   upward from whatever changed, after every create, reparent, destroy, or
//!   geometry change.
//!
//! ```text
//! 10,10 .-----------------------------.
//!       | root                        |
//! 10,30 .------------.                |
//!       | | child    |                |
//!       | |   40,20 .---------------. |
//!       | |         | grandchild    | |
//!       | |         `---------------' 80x40
//!       | `------------' 70x90        |
//!       `-----------------------------' 150x150
//! ```
//!
//! The grandchild's absolute position is `(10 + 10 + 40, 10 + 30 + 20) = (60, 60)`.
//! The child's composed geometry is `10,30 120x90`: the grandchild pokes out
//! to the right (`40 + 80 = 120`) but not below (`20 + 40 < 90`).
//!
//! ```rust
//! use trellis_widget_tree::{Gui, Rect, WidgetKind, WidgetSpec};
//!
//! let mut gui: Gui<()> = Gui::new(());
//! let frame = |r| WidgetSpec::empty(WidgetKind::Frame, r);
//!
//! let root = gui.create(None, frame(Rect::new(10, 10, 150, 150))).unwrap();
//! let child = gui.create(Some(root), frame(Rect::new(10, 30, 70, 90))).unwrap();
//! let grandchild = gui.create(Some(child), frame(Rect::new(40, 20, 80, 40))).unwrap();
//!
//! assert_eq!(gui.absolute_geometry(grandchild).unwrap(), Rect::new(60, 60, 80, 40));
//! assert_eq!(gui.composed_geometry(child).unwrap(), Rect::new(10, 30, 120, 90));
//! ```
//!
//! ## Structure
//!
//! A [`Gui`] owns a renderer and a [`WidgetTree`]. The tree can also be used on
//! its own, with the renderer passed to the calls that run callbacks.
//!
//! - [`WidgetTree::create`] appends a widget to its parent's children.
//! - [`WidgetTree::reparent`] moves a subtree; it never rewrites relative
//!   geometry and refuses to create cycles.
//! - [`WidgetTree::destroy`] removes a widget and either its whole subtree or
//!   just the widget, handing its children to its former parent. Payloads of
//!   destroyed widgets are returned to the caller.
//!
//! ## Painting
//!
//! [`Gui::paint`] and [`Gui::paint_widget`] walk the tree depth first. A widget's
//! [`PaintFn`] runs before any of its children's, and children paint in child
//! order, so later siblings end up on top. Hidden widgets are skipped with
//! their subtrees. Blocking events ([`WidgetTree::block_events`]) does not
//! affect painting.
//!
//! ## Threading
//!
//! Everything is synchronous and single-threaded. Callers that share a GUI
//! across threads must serialize access themselves.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod error;
mod geometry;
mod gui;
mod paint;
mod tree;
mod types;

pub use error::{Result, TreeError};
pub use geometry::{Rect, absolute, compose_into};
pub use gui::Gui;
pub use paint::{DestroyCx, DestroyFn, PaintCx, PaintFn};
pub use tree::{Destroyed, WidgetSpec, WidgetTree};
pub use types::{GuiId, Propagation, TreeConfig, WidgetFlags, WidgetId, WidgetKind};
