// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Paint traversal and the callback contexts handed to widget code.

use smallvec::SmallVec;

use crate::error::Result;
use crate::geometry::Rect;
use crate::tree::WidgetTree;
use crate::types::{WidgetFlags, WidgetId, WidgetKind};

/// Paint callback of a widget.
///
/// Runs after the parent has painted and before any child paints.
pub type PaintFn<R, D> = fn(&mut PaintCx<'_, R, D>);

/// Destroy callback of a widget.
///
/// Runs exactly once, after the widget has been detached from the tree and
/// after every destroyed descendant's own callback.
pub type DestroyFn<R, D> = fn(&mut DestroyCx<'_, R, D>);

/// Context passed to a [`PaintFn`].
///
/// Gives read access to the whole tree and write access to the renderer.
pub struct PaintCx<'a, R, D> {
    tree: &'a WidgetTree<R, D>,
    renderer: &'a mut R,
    widget: WidgetId,
}

impl<R, D> core::fmt::Debug for PaintCx<'_, R, D> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PaintCx")
            .field("widget", &self.widget)
            .finish_non_exhaustive()
    }
}

impl<'a, R, D> PaintCx<'a, R, D> {
    /// The widget being painted.
    pub fn widget(&self) -> WidgetId {
        self.widget
    }

    /// Kind tag of the widget being painted.
    pub fn kind(&self) -> WidgetKind {
        self.tree.node(self.widget).kind
    }

    /// Relative geometry of the widget being painted.
    pub fn geometry(&self) -> Rect {
        self.tree.node(self.widget).rect
    }

    /// Absolute geometry of the widget being painted. This is usually what a
    /// paint callback draws into.
    pub fn absolute_geometry(&self) -> Rect {
        self.tree.absolute_unchecked(self.widget)
    }

    /// Composed geometry of the widget being painted.
    pub fn composed_geometry(&self) -> Rect {
        self.tree.node(self.widget).composed
    }

    /// Payload of the widget being painted.
    pub fn data(&self) -> &D {
        &self.tree.node(self.widget).data
    }

    /// The tree, for looking at other widgets.
    pub fn tree(&self) -> &'a WidgetTree<R, D> {
        self.tree
    }

    /// The renderer.
    pub fn renderer(&mut self) -> &mut R {
        &mut *self.renderer
    }
}

/// Context passed to a [`DestroyFn`].
///
/// The widget is no longer part of the tree when this runs. Its payload is
/// still owned by the caller and is returned from
/// [`WidgetTree::destroy`] once every callback has run.
pub struct DestroyCx<'a, R, D> {
    pub(crate) widget: WidgetId,
    pub(crate) kind: WidgetKind,
    pub(crate) data: &'a mut D,
    pub(crate) renderer: &'a mut R,
}

impl<R, D> core::fmt::Debug for DestroyCx<'_, R, D> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DestroyCx")
            .field("widget", &self.widget)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

impl<R, D> DestroyCx<'_, R, D> {
    /// The widget being destroyed. The handle is already stale.
    pub fn widget(&self) -> WidgetId {
        self.widget
    }

    /// Kind tag of the widget being destroyed.
    pub fn kind(&self) -> WidgetKind {
        self.kind
    }

    /// Payload of the widget being destroyed.
    pub fn data(&mut self) -> &mut D {
        &mut *self.data
    }

    /// The renderer, for releasing backend resources the widget held.
    pub fn renderer(&mut self) -> &mut R {
        &mut *self.renderer
    }
}

impl<R, D> WidgetTree<R, D> {
    /// Paint `id` and its visible subtree.
    ///
    /// Hidden widgets are skipped together with everything below them.
    /// Otherwise the widget's paint callback runs first, then each child is
    /// painted in child order, so later children end up on top of earlier ones
    /// and every child ends up on top of its parent. Blocked widgets paint
    /// normally.
    pub fn paint(&self, id: WidgetId, renderer: &mut R) -> Result<()> {
        self.live(id)?;
        self.paint_subtree(id, renderer);
        Ok(())
    }

    /// Paint every top-level widget in top-level order.
    pub fn paint_all(&self, renderer: &mut R) {
        for &id in self.top_levels() {
            self.paint_subtree(id, renderer);
        }
    }

    fn paint_subtree(&self, root: WidgetId, renderer: &mut R) {
        let mut stack: SmallVec<[WidgetId; 32]> = SmallVec::new();
        stack.push(root);

        while let Some(id) = stack.pop() {
            let node = self.node(id);
            if node.flags.contains(WidgetFlags::HIDDEN) {
                continue;
            }
            if let Some(paint) = node.paint {
                let mut cx = PaintCx {
                    tree: self,
                    renderer: &mut *renderer,
                    widget: id,
                };
                paint(&mut cx);
            }
            // Reversed so that children pop in child order.
            stack.extend(node.children.iter().rev().copied());
        }
    }
}
