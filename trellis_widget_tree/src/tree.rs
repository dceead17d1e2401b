// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core tree implementation: node storage, structural edits, geometry upkeep.

use alloc::vec::Vec;
use smallvec::{SmallVec, smallvec};

use crate::error::{Result, TreeError};
use crate::geometry::{Rect, absolute, compose_into};
use crate::paint::{DestroyCx, DestroyFn, PaintFn};
use crate::types::{GuiId, Propagation, TreeConfig, WidgetFlags, WidgetId, WidgetKind};

/// Everything needed to create a widget.
pub struct WidgetSpec<R, D = ()> {
    /// Kind tag.
    pub kind: WidgetKind,
    /// Geometry relative to the parent.
    pub geometry: Rect,
    /// Paint callback; `None` paints nothing.
    pub paint: Option<PaintFn<R, D>>,
    /// Destroy callback; `None` does nothing.
    pub destroy: Option<DestroyFn<R, D>>,
    /// Caller-owned payload.
    pub data: D,
}

impl<R, D> core::fmt::Debug for WidgetSpec<R, D> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("WidgetSpec")
            .field("kind", &self.kind)
            .field("geometry", &self.geometry)
            .field("paint", &self.paint.is_some())
            .field("destroy", &self.destroy.is_some())
            .finish_non_exhaustive()
    }
}

impl<R, D> WidgetSpec<R, D> {
    /// A widget with no callbacks.
    pub fn new(kind: WidgetKind, geometry: Rect, data: D) -> Self {
        Self {
            kind,
            geometry,
            paint: None,
            destroy: None,
            data,
        }
    }

    /// Set the paint callback.
    #[must_use]
    pub fn with_paint(mut self, paint: PaintFn<R, D>) -> Self {
        self.paint = Some(paint);
        self
    }

    /// Set the destroy callback.
    #[must_use]
    pub fn with_destroy(mut self, destroy: DestroyFn<R, D>) -> Self {
        self.destroy = Some(destroy);
        self
    }
}

impl<R> WidgetSpec<R> {
    /// A widget with no callbacks and no payload.
    pub fn empty(kind: WidgetKind, geometry: Rect) -> Self {
        Self::new(kind, geometry, ())
    }
}

/// A widget removed by [`WidgetTree::destroy`], with its payload handed back.
#[derive(Debug)]
pub struct Destroyed<D> {
    /// The (now stale) handle.
    pub widget: WidgetId,
    /// Its kind tag.
    pub kind: WidgetKind,
    /// Its payload, for the caller to release.
    pub data: D,
}

pub(crate) struct Node<R, D> {
    generation: u32,
    pub(crate) kind: WidgetKind,
    parent: Option<WidgetId>,
    pub(crate) children: Vec<WidgetId>,
    pub(crate) rect: Rect,
    pub(crate) composed: Rect,
    pub(crate) flags: WidgetFlags,
    pub(crate) paint: Option<PaintFn<R, D>>,
    destroy: Option<DestroyFn<R, D>>,
    pub(crate) data: D,
}

impl<R, D> Node<R, D> {
    fn new(generation: u32, spec: WidgetSpec<R, D>) -> Self {
        Self {
            generation,
            kind: spec.kind,
            parent: None,
            children: Vec::new(),
            rect: spec.geometry,
            composed: spec.geometry,
            flags: WidgetFlags::default(),
            paint: spec.paint,
            destroy: spec.destroy,
            data: spec.data,
        }
    }
}

/// Widget storage for one GUI.
///
/// Widgets live in a slot arena and are addressed by [`WidgetId`]. A parent
/// owns its children: destroying it either destroys them or hands them to its
/// own parent. Relative geometry is what callers set; composed geometry is
/// cached per widget and rebuilt eagerly, walking upward from the changed
/// widget, after every edit that could affect it. Absolute geometry is
/// computed on request.
///
/// Child order is paint order: later children paint on top. The same holds
/// for the top-level sequence.
///
/// ```rust
/// use trellis_widget_tree::{Rect, WidgetKind, WidgetSpec, WidgetTree};
///
/// let mut tree: WidgetTree<()> = WidgetTree::new();
/// let frame = |r| WidgetSpec::empty(WidgetKind::Frame, r);
/// let root = tree.create(None, frame(Rect::new(0, 0, 10, 10))).unwrap();
/// let child = tree.create(Some(root), frame(Rect::new(5, 5, 20, 0))).unwrap();
/// assert_eq!(tree.composed_geometry(root).unwrap(), Rect::new(0, 0, 25, 10));
///
/// tree.set_hidden(child, true).unwrap();
/// tree.reparent(child, None).unwrap();
/// let destroyed = tree.destroy(root, true, &mut ()).unwrap();
/// assert_eq!(destroyed.len(), 1);
/// assert_eq!(tree.top_levels(), &[child]);
/// ```
pub struct WidgetTree<R, D = ()> {
    gui: GuiId,
    config: TreeConfig,
    /// slots
    nodes: Vec<Option<Node<R, D>>>,
    /// last generation per slot (persists across frees)
    generations: Vec<u32>,
    free_list: Vec<usize>,
    top_levels: Vec<WidgetId>,
    alive: usize,
}

impl<R, D> core::fmt::Debug for WidgetTree<R, D> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("WidgetTree")
            .field("gui", &self.gui)
            .field("config", &self.config)
            .field("nodes_total", &self.nodes.len())
            .field("nodes_alive", &self.alive)
            .field("free_list", &self.free_list.len())
            .field("top_levels", &self.top_levels)
            .finish_non_exhaustive()
    }
}

impl<R, D> Default for WidgetTree<R, D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R, D> WidgetTree<R, D> {
    /// Create an empty tree with the default [`TreeConfig`].
    ///
    /// The tree gets a fresh [`GuiId`]. Use it directly when the renderer is
    /// owned elsewhere and passed to [`WidgetTree::destroy`] and
    /// [`WidgetTree::paint`] per call; [`Gui`](crate::Gui) bundles both.
    pub fn new() -> Self {
        Self::with_config(TreeConfig::default())
    }

    /// Create an empty tree.
    pub fn with_config(config: TreeConfig) -> Self {
        Self {
            gui: GuiId::next(),
            config,
            nodes: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            top_levels: Vec::new(),
            alive: 0,
        }
    }

    /// The GUI this tree belongs to.
    pub fn gui(&self) -> GuiId {
        self.gui
    }

    /// Active configuration.
    pub fn config(&self) -> TreeConfig {
        self.config
    }

    /// Number of live widgets.
    pub fn len(&self) -> usize {
        self.alive
    }

    /// Whether the tree holds no widgets.
    pub fn is_empty(&self) -> bool {
        self.alive == 0
    }

    /// Widgets without a parent, in paint order.
    pub fn top_levels(&self) -> &[WidgetId] {
        &self.top_levels
    }

    /// Create a widget under `parent`, or as a new top-level widget if `None`.
    ///
    /// The widget is appended after its existing siblings, and the composed
    /// geometry of `parent` and every ancestor above it is rebuilt.
    ///
    /// On error nothing is added and `spec` is dropped.
    pub fn create(&mut self, parent: Option<WidgetId>, spec: WidgetSpec<R, D>) -> Result<WidgetId> {
        if let Some(p) = parent {
            self.live(p)?;
        }
        check_size(spec.geometry)?;

        // Reserve everything up front so a failure leaves no partial edit.
        self.siblings_mut(parent).try_reserve(1)?;
        if self.free_list.is_empty() {
            self.nodes.try_reserve(1)?;
            self.generations.try_reserve(1)?;
            if u32::try_from(self.nodes.len()).is_err() {
                return Err(TreeError::OutOfMemory);
            }
        }

        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            self.nodes[idx] = Some(Node::new(generation, spec));
            (idx, generation)
        } else {
            let generation = 1_u32;
            self.nodes.push(Some(Node::new(generation, spec)));
            self.generations.push(generation);
            (self.nodes.len() - 1, generation)
        };
        #[allow(
            clippy::cast_possible_truncation,
            reason = "slot count is checked against u32 before a slot is pushed"
        )]
        let id = WidgetId::new(idx as u32, generation, self.gui);
        self.alive += 1;

        self.link(id, parent);
        self.recompute_upward(parent);
        tracing::trace!(widget = ?id, ?parent, "created widget");
        Ok(id)
    }

    /// Move `id` (with its subtree) to the end of `new_parent`'s children, or
    /// to the end of the top-level sequence if `None`.
    ///
    /// Relative geometry is left alone, so the widget's absolute position moves
    /// with the new parent's origin; call [`WidgetTree::set_geometry`] to
    /// compensate. Composed geometry is rebuilt along both the old and the new
    /// ancestor chains, which makes this the most expensive structural edit.
    ///
    /// Fails with [`TreeError::Cycle`] if `new_parent` is `id` or lies inside
    /// its subtree.
    pub fn reparent(&mut self, id: WidgetId, new_parent: Option<WidgetId>) -> Result<()> {
        let old_parent = self.live(id)?.parent;
        if let Some(p) = new_parent {
            self.live(p)?;
            if self.is_ancestor_or_self(id, p) {
                tracing::debug!(widget = ?id, parent = ?p, "rejected reparent into own subtree");
                return Err(TreeError::Cycle {
                    widget: id,
                    parent: p,
                });
            }
        }
        if old_parent != new_parent {
            self.siblings_mut(new_parent).try_reserve(1)?;
        }

        self.unlink(id);
        self.link(id, new_parent);
        self.recompute_upward(old_parent);
        self.recompute_upward(new_parent);
        tracing::trace!(widget = ?id, ?old_parent, ?new_parent, "reparented widget");
        Ok(())
    }

    /// Destroy `id`.
    ///
    /// With `destroy_children` the whole subtree goes, and destroy callbacks run
    /// in post-order: every widget after all of its descendants. Without it,
    /// the direct children are moved to the end of `id`'s former parent's
    /// children (or the top-level sequence), in their current order and with
    /// their relative geometry unchanged, before `id` alone is destroyed.
    ///
    /// Either way the former parent's ancestor chain is rebuilt, and the
    /// destroyed widgets' payloads are returned in callback order. The tree
    /// never drops a payload itself.
    pub fn destroy(
        &mut self,
        id: WidgetId,
        destroy_children: bool,
        renderer: &mut R,
    ) -> Result<Vec<Destroyed<D>>> {
        let (parent, child_count) = {
            let node = self.live(id)?;
            (node.parent, node.children.len())
        };

        let doomed: SmallVec<[WidgetId; 16]> = if destroy_children {
            self.post_order(id)
        } else {
            self.siblings_mut(parent).try_reserve(child_count)?;
            smallvec![id]
        };
        let mut out = Vec::new();
        out.try_reserve_exact(doomed.len())?;
        self.free_list.try_reserve(doomed.len())?;

        self.unlink(id);
        if !destroy_children {
            let children = core::mem::take(&mut self.node_mut(id).children);
            for child in children {
                self.link(child, parent);
            }
        }

        for widget in doomed {
            out.push(self.release(widget, renderer));
        }
        self.recompute_upward(parent);
        tracing::trace!(
            widget = ?id,
            ?parent,
            destroyed = out.len(),
            destroy_children,
            "destroyed widget"
        );
        Ok(out)
    }

    /// Replace the relative geometry of `id`.
    ///
    /// The widget's own composed geometry and that of every ancestor is rebuilt
    /// from children, since a resize can shrink the bound as well as grow it.
    pub fn set_geometry(&mut self, id: WidgetId, geometry: Rect) -> Result<()> {
        self.live(id)?;
        check_size(geometry)?;
        self.node_mut(id).rect = geometry;
        self.recompute_upward(Some(id));
        tracing::trace!(widget = ?id, ?geometry, "set widget geometry");
        Ok(())
    }

    /// Relative geometry of `id`.
    pub fn geometry(&self, id: WidgetId) -> Result<Rect> {
        Ok(self.live(id)?.rect)
    }

    /// Absolute geometry of `id`: its relative position plus the relative
    /// position of every ancestor, with its own size.
    pub fn absolute_geometry(&self, id: WidgetId) -> Result<Rect> {
        self.live(id)?;
        Ok(self.absolute_unchecked(id))
    }

    /// Composed geometry of `id`: the bound of the widget and its whole subtree,
    /// positioned like the relative geometry.
    pub fn composed_geometry(&self, id: WidgetId) -> Result<Rect> {
        Ok(self.live(id)?.composed)
    }

    /// Parent of `id`, or `None` for a top-level widget.
    pub fn parent_of(&self, id: WidgetId) -> Result<Option<WidgetId>> {
        Ok(self.live(id)?.parent)
    }

    /// Children of `id` in paint order.
    pub fn children_of(&self, id: WidgetId) -> Result<&[WidgetId]> {
        Ok(&self.live(id)?.children)
    }

    /// Kind tag of `id`.
    pub fn kind(&self, id: WidgetId) -> Result<WidgetKind> {
        Ok(self.live(id)?.kind)
    }

    /// Payload of `id`.
    pub fn data(&self, id: WidgetId) -> Result<&D> {
        Ok(&self.live(id)?.data)
    }

    /// Mutable payload of `id`.
    pub fn data_mut(&mut self, id: WidgetId) -> Result<&mut D> {
        self.live(id)?;
        Ok(&mut self.node_mut(id).data)
    }

    /// Flags of `id`.
    pub fn flags(&self, id: WidgetId) -> Result<WidgetFlags> {
        Ok(self.live(id)?.flags)
    }

    /// Set or clear [`WidgetFlags::BLOCKED`]. Only the input router looks at it.
    pub fn block_events(&mut self, id: WidgetId, block: bool) -> Result<()> {
        self.set_flag(id, WidgetFlags::BLOCKED, block)
    }

    /// Whether `id` is blocked from receiving events.
    pub fn is_blocked(&self, id: WidgetId) -> Result<bool> {
        Ok(self.flags(id)?.contains(WidgetFlags::BLOCKED))
    }

    /// Set or clear [`WidgetFlags::HIDDEN`]. Geometry is unaffected.
    pub fn set_hidden(&mut self, id: WidgetId, hidden: bool) -> Result<()> {
        self.set_flag(id, WidgetFlags::HIDDEN, hidden)
    }

    /// Whether `id` is hidden.
    pub fn is_hidden(&self, id: WidgetId) -> Result<bool> {
        Ok(self.flags(id)?.contains(WidgetFlags::HIDDEN))
    }

    /// Returns true if `id` refers to a live widget of this tree.
    ///
    /// A handle is live if it was issued by this GUI, its slot is occupied,
    /// and the slot's generation matches the handle's.
    pub fn is_alive(&self, id: WidgetId) -> bool {
        id.gui() == self.gui
            && self
                .nodes
                .get(id.idx())
                .and_then(|n| n.as_ref())
                .is_some_and(|n| n.generation == id.generation())
    }

    /// Next widget in paint order across the whole forest.
    ///
    /// After the last widget of one top-level subtree comes the next top-level
    /// widget. Hidden widgets are not skipped. Returns `None` at the end or for
    /// stale handles.
    pub fn next_depth_first(&self, current: WidgetId) -> Option<WidgetId> {
        if !self.is_alive(current) {
            return None;
        }
        if let Some(&first_child) = self.node(current).children.first() {
            return Some(first_child);
        }
        let mut node = current;
        loop {
            if let Some(next) = self.next_sibling(node) {
                return Some(next);
            }
            node = self.node(node).parent?;
        }
    }

    /// Previous widget in paint order across the whole forest.
    ///
    /// Returns `None` at the beginning or for stale handles.
    pub fn prev_depth_first(&self, current: WidgetId) -> Option<WidgetId> {
        if !self.is_alive(current) {
            return None;
        }
        match self.prev_sibling(current) {
            Some(prev) => Some(self.last_in_subtree(prev)),
            None => self.node(current).parent,
        }
    }

    // --- internals ---

    pub(crate) fn live(&self, id: WidgetId) -> Result<&Node<R, D>> {
        if !self.is_alive(id) {
            return Err(TreeError::InvalidWidget(id));
        }
        Ok(self.node(id))
    }

    /// Access a node; panics if `id` is stale.
    pub(crate) fn node(&self, id: WidgetId) -> &Node<R, D> {
        self.nodes[id.idx()].as_ref().expect("dangling WidgetId")
    }

    /// Access a node mutably; panics if `id` is stale.
    fn node_mut(&mut self, id: WidgetId) -> &mut Node<R, D> {
        self.nodes[id.idx()].as_mut().expect("dangling WidgetId")
    }

    pub(crate) fn absolute_unchecked(&self, id: WidgetId) -> Rect {
        let node = self.node(id);
        let ancestors =
            core::iter::successors(node.parent, |&p| self.node(p).parent).map(|p| self.node(p).rect);
        absolute(node.rect, ancestors)
    }

    fn set_flag(&mut self, id: WidgetId, flag: WidgetFlags, on: bool) -> Result<()> {
        self.live(id)?;
        self.node_mut(id).flags.set(flag, on);
        Ok(())
    }

    /// Whether `ancestor` is `node` or one of its ancestors.
    fn is_ancestor_or_self(&self, ancestor: WidgetId, node: WidgetId) -> bool {
        core::iter::successors(Some(node), |&n| self.node(n).parent).any(|n| n == ancestor)
    }

    /// The sequence a child of `parent` lives in.
    fn siblings(&self, parent: Option<WidgetId>) -> &[WidgetId] {
        match parent {
            Some(p) => &self.node(p).children,
            None => &self.top_levels,
        }
    }

    fn siblings_mut(&mut self, parent: Option<WidgetId>) -> &mut Vec<WidgetId> {
        match parent {
            Some(p) => &mut self.node_mut(p).children,
            None => &mut self.top_levels,
        }
    }

    fn link(&mut self, id: WidgetId, parent: Option<WidgetId>) {
        self.siblings_mut(parent).push(id);
        self.node_mut(id).parent = parent;
    }

    fn unlink(&mut self, id: WidgetId) {
        let parent = self.node(id).parent;
        self.siblings_mut(parent).retain(|c| *c != id);
        self.node_mut(id).parent = None;
    }

    fn next_sibling(&self, node: WidgetId) -> Option<WidgetId> {
        let siblings = self.siblings(self.node(node).parent);
        let pos = siblings.iter().position(|&id| id == node)?;
        siblings.get(pos + 1).copied()
    }

    fn prev_sibling(&self, node: WidgetId) -> Option<WidgetId> {
        let siblings = self.siblings(self.node(node).parent);
        let pos = siblings.iter().position(|&id| id == node)?;
        pos.checked_sub(1).and_then(|p| siblings.get(p).copied())
    }

    fn last_in_subtree(&self, mut node: WidgetId) -> WidgetId {
        while let Some(&last) = self.node(node).children.last() {
            node = last;
        }
        node
    }

    /// Subtree of `root` in post-order, children in child order.
    fn post_order(&self, root: WidgetId) -> SmallVec<[WidgetId; 16]> {
        let mut out = SmallVec::new();
        // (widget, index of the next child to visit)
        let mut stack: SmallVec<[(WidgetId, usize); 16]> = SmallVec::new();
        stack.push((root, 0));
        while let Some(top) = stack.last_mut() {
            let (id, next) = *top;
            if let Some(&child) = self.node(id).children.get(next) {
                top.1 += 1;
                stack.push((child, 0));
            } else {
                out.push(id);
                stack.pop();
            }
        }
        out
    }

    /// Free the slot of a detached widget and run its destroy callback.
    fn release(&mut self, id: WidgetId, renderer: &mut R) -> Destroyed<D> {
        let Some(mut node) = self.nodes[id.idx()].take() else {
            unreachable!("released widgets are live until released");
        };
        self.free_list.push(id.idx());
        self.alive -= 1;
        if let Some(destroy) = node.destroy {
            let mut cx = DestroyCx {
                widget: id,
                kind: node.kind,
                data: &mut node.data,
                renderer,
            };
            destroy(&mut cx);
        }
        Destroyed {
            widget: id,
            kind: node.kind,
            data: node.data,
        }
    }

    /// Rebuild composed geometry from `start` up to its top-level widget.
    ///
    /// Each step only reads the cached composed rectangles of direct children,
    /// so the cost is bounded by depth times fan-out.
    fn recompute_upward(&mut self, start: Option<WidgetId>) {
        let stop_when_unchanged = self.config.propagation == Propagation::UntilUnchanged;
        let mut current = start;
        while let Some(id) = current {
            let node = self.node(id);
            let composed = compose_into(
                node.rect,
                node.children.iter().map(|&c| self.node(c).composed),
            );
            let node = self.node_mut(id);
            let unchanged = node.composed == composed;
            node.composed = composed;
            if unchanged && stop_when_unchanged {
                break;
            }
            current = node.parent;
        }
    }
}

fn check_size(geometry: Rect) -> Result<()> {
    if geometry.has_negative_size() {
        return Err(TreeError::NegativeSize {
            width: geometry.width,
            height: geometry.height,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn tree<R>() -> WidgetTree<R> {
        WidgetTree::new()
    }

    fn frame<R>(x: i32, y: i32, w: i32, h: i32) -> WidgetSpec<R> {
        WidgetSpec::empty(WidgetKind::Frame, Rect::new(x, y, w, h))
    }

    /// Checks the composed-geometry and membership invariants for every live widget.
    fn assert_consistent<R, D>(tree: &WidgetTree<R, D>) {
        for (idx, slot) in tree.nodes.iter().enumerate() {
            let Some(node) = slot else { continue };
            #[allow(clippy::cast_possible_truncation, reason = "test trees are tiny")]
            let id = WidgetId::new(idx as u32, node.generation, tree.gui);
            let expected =
                compose_into(node.rect, node.children.iter().map(|&c| tree.node(c).composed));
            assert_eq!(node.composed, expected, "stale composed geometry on {id:?}");
            let siblings = tree.siblings(node.parent);
            assert_eq!(
                siblings.iter().filter(|&&s| s == id).count(),
                1,
                "{id:?} must appear exactly once in its parent's sequence"
            );
            for &child in &node.children {
                assert_eq!(tree.node(child).parent, Some(id), "child back-reference");
            }
        }
    }

    #[test]
    fn nested_geometry_matches_documented_example() {
        let mut tree = tree::<()>();
        let root = tree.create(None, frame(10, 10, 150, 150)).unwrap();
        let r1 = tree.create(Some(root), frame(10, 30, 70, 90)).unwrap();
        let g1 = tree.create(Some(r1), frame(40, 20, 80, 40)).unwrap();

        assert_eq!(tree.absolute_geometry(g1).unwrap(), Rect::new(60, 60, 80, 40));
        assert_eq!(tree.absolute_geometry(r1).unwrap(), Rect::new(20, 40, 70, 90));
        assert_eq!(tree.composed_geometry(r1).unwrap(), Rect::new(10, 30, 120, 90));
        // 10 + 120 = 130 and 30 + 90 = 120 both fit inside 150x150.
        assert_eq!(tree.composed_geometry(root).unwrap(), Rect::new(10, 10, 150, 150));
        assert_consistent(&tree);
    }

    #[test]
    fn create_grows_every_ancestor() {
        let mut tree = tree::<()>();
        let root = tree.create(None, frame(0, 0, 10, 10)).unwrap();
        let a = tree.create(Some(root), frame(5, 5, 10, 10)).unwrap();
        let _b = tree.create(Some(a), frame(20, 0, 10, 30)).unwrap();

        assert_eq!(tree.composed_geometry(a).unwrap(), Rect::new(5, 5, 30, 30));
        assert_eq!(tree.composed_geometry(root).unwrap(), Rect::new(0, 0, 35, 35));
        assert_consistent(&tree);
    }

    #[test]
    fn composed_is_a_bound_of_own_rect() {
        let mut tree = tree::<()>();
        let root = tree.create(None, frame(3, 4, 50, 60)).unwrap();
        let child = tree.create(Some(root), frame(-10, -10, 5, 5)).unwrap();
        for id in [root, child] {
            let rect = tree.geometry(id).unwrap();
            let composed = tree.composed_geometry(id).unwrap();
            assert_eq!(composed.position(), rect.position());
            assert!(composed.width >= rect.width && composed.height >= rect.height);
        }
    }

    #[test]
    fn set_geometry_shrinks_ancestors_again() {
        let mut tree = tree::<()>();
        let root = tree.create(None, frame(0, 0, 10, 10)).unwrap();
        let a = tree.create(Some(root), frame(0, 0, 10, 10)).unwrap();
        let b = tree.create(Some(a), frame(0, 0, 100, 10)).unwrap();
        let _c = tree.create(Some(a), frame(0, 0, 40, 10)).unwrap();
        assert_eq!(tree.composed_geometry(root).unwrap().width, 100);

        // Shrinking b leaves c as the widest child, not the root's own width.
        tree.set_geometry(b, Rect::new(0, 0, 20, 10)).unwrap();
        assert_eq!(tree.composed_geometry(a).unwrap().width, 40);
        assert_eq!(tree.composed_geometry(root).unwrap().width, 40);

        // Moving a widget moves its composed rect with it.
        tree.set_geometry(a, Rect::new(7, 8, 10, 10)).unwrap();
        assert_eq!(tree.composed_geometry(a).unwrap(), Rect::new(7, 8, 40, 10));
        assert_eq!(tree.composed_geometry(root).unwrap(), Rect::new(0, 0, 47, 18));
        assert_consistent(&tree);
    }

    #[test]
    fn negative_size_is_rejected() {
        let mut tree = tree::<()>();
        let err = tree.create(None, frame(0, 0, -1, 5)).unwrap_err();
        assert_eq!(err, TreeError::NegativeSize { width: -1, height: 5 });
        assert!(tree.is_empty());

        let w = tree.create(None, frame(0, 0, 0, 0)).unwrap();
        assert!(tree.set_geometry(w, Rect::new(0, 0, 3, -3)).is_err());
        assert_eq!(tree.geometry(w).unwrap(), Rect::ZERO, "zero area is allowed");
    }

    #[test]
    fn reparent_moves_subtree_and_keeps_relative_geometry() {
        let mut tree = tree::<()>();
        let a = tree.create(None, frame(0, 0, 10, 10)).unwrap();
        let b = tree.create(None, frame(100, 100, 10, 10)).unwrap();
        let w = tree.create(Some(a), frame(5, 5, 50, 50)).unwrap();
        let leaf = tree.create(Some(w), frame(1, 1, 1, 1)).unwrap();

        tree.reparent(w, Some(b)).unwrap();
        assert_eq!(tree.parent_of(w).unwrap(), Some(b));
        assert!(tree.children_of(a).unwrap().is_empty());
        assert_eq!(tree.children_of(b).unwrap(), &[w]);
        assert_eq!(tree.geometry(w).unwrap(), Rect::new(5, 5, 50, 50));
        assert_eq!(tree.absolute_geometry(leaf).unwrap(), Rect::new(106, 106, 1, 1));
        assert_eq!(tree.composed_geometry(a).unwrap(), Rect::new(0, 0, 10, 10));
        assert_eq!(tree.composed_geometry(b).unwrap(), Rect::new(100, 100, 55, 55));
        assert_consistent(&tree);
    }

    #[test]
    fn reparent_round_trip_restores_composed_geometry() {
        let mut tree = tree::<()>();
        let root = tree.create(None, frame(0, 0, 200, 200)).unwrap();
        let a = tree.create(Some(root), frame(0, 0, 20, 20)).unwrap();
        let b = tree.create(Some(root), frame(50, 50, 20, 20)).unwrap();
        let w = tree.create(Some(a), frame(10, 10, 30, 30)).unwrap();
        let before = (
            tree.composed_geometry(a).unwrap(),
            tree.composed_geometry(b).unwrap(),
        );

        tree.reparent(w, Some(b)).unwrap();
        assert_ne!(tree.composed_geometry(a).unwrap(), before.0);
        tree.set_geometry(w, Rect::new(0, 0, 1, 1)).unwrap();
        tree.reparent(w, Some(a)).unwrap();
        tree.set_geometry(w, Rect::new(10, 10, 30, 30)).unwrap();

        assert_eq!(
            (
                tree.composed_geometry(a).unwrap(),
                tree.composed_geometry(b).unwrap(),
            ),
            before
        );
        assert_consistent(&tree);
    }

    #[test]
    fn reparent_to_top_level_and_back() {
        let mut tree = tree::<()>();
        let root = tree.create(None, frame(0, 0, 10, 10)).unwrap();
        let w = tree.create(Some(root), frame(0, 0, 30, 30)).unwrap();

        tree.reparent(w, None).unwrap();
        assert_eq!(tree.top_levels(), &[root, w]);
        assert_eq!(tree.parent_of(w).unwrap(), None);
        assert_eq!(tree.composed_geometry(root).unwrap(), Rect::new(0, 0, 10, 10));

        tree.reparent(w, Some(root)).unwrap();
        assert_eq!(tree.top_levels(), &[root]);
        assert_eq!(tree.composed_geometry(root).unwrap(), Rect::new(0, 0, 30, 30));
        assert_consistent(&tree);
    }

    #[test]
    fn reparent_under_same_parent_moves_to_end() {
        let mut tree = tree::<()>();
        let root = tree.create(None, frame(0, 0, 10, 10)).unwrap();
        let a = tree.create(Some(root), frame(0, 0, 1, 1)).unwrap();
        let b = tree.create(Some(root), frame(0, 0, 1, 1)).unwrap();

        tree.reparent(a, Some(root)).unwrap();
        assert_eq!(tree.children_of(root).unwrap(), &[b, a]);
    }

    #[test]
    fn reparent_into_own_subtree_is_rejected() {
        let mut tree = tree::<()>();
        let root = tree.create(None, frame(0, 0, 10, 10)).unwrap();
        let child = tree.create(Some(root), frame(0, 0, 20, 20)).unwrap();
        let grandchild = tree.create(Some(child), frame(0, 0, 30, 30)).unwrap();

        assert_eq!(
            tree.reparent(root, Some(child)),
            Err(TreeError::Cycle {
                widget: root,
                parent: child
            })
        );
        assert!(tree.reparent(root, Some(grandchild)).is_err());
        assert!(tree.reparent(child, Some(child)).is_err());

        assert_eq!(tree.top_levels(), &[root]);
        assert_eq!(tree.children_of(root).unwrap(), &[child]);
        assert_eq!(tree.parent_of(grandchild).unwrap(), Some(child));
        assert_consistent(&tree);
    }

    #[test]
    fn destroy_without_children_promotes_them() {
        let mut tree = tree::<()>();
        let root = tree.create(None, frame(0, 0, 10, 10)).unwrap();
        let a = tree.create(Some(root), frame(5, 5, 10, 10)).unwrap();
        let sibling = tree.create(Some(root), frame(0, 0, 1, 1)).unwrap();
        let b = tree.create(Some(a), frame(10, 10, 10, 10)).unwrap();
        let c = tree.create(Some(a), frame(0, 0, 2, 2)).unwrap();
        assert_eq!(tree.composed_geometry(root).unwrap(), Rect::new(0, 0, 25, 25));

        let destroyed = tree.destroy(a, false, &mut ()).unwrap();
        assert_eq!(destroyed.len(), 1);
        assert_eq!(destroyed[0].widget, a);

        assert!(!tree.is_alive(a));
        assert_eq!(tree.children_of(root).unwrap(), &[sibling, b, c]);
        assert_eq!(tree.parent_of(b).unwrap(), Some(root));
        assert_eq!(tree.geometry(b).unwrap(), Rect::new(10, 10, 10, 10));
        assert_eq!(tree.composed_geometry(root).unwrap(), Rect::new(0, 0, 20, 20));
        assert_eq!(tree.len(), 4);
        assert_consistent(&tree);
    }

    #[test]
    fn destroy_top_level_without_children_makes_them_top_level() {
        let mut tree = tree::<()>();
        let other = tree.create(None, frame(0, 0, 1, 1)).unwrap();
        let root = tree.create(None, frame(0, 0, 10, 10)).unwrap();
        let a = tree.create(Some(root), frame(0, 0, 1, 1)).unwrap();
        let b = tree.create(Some(root), frame(0, 0, 1, 1)).unwrap();

        let _ = tree.destroy(root, false, &mut ()).unwrap();
        assert_eq!(tree.top_levels(), &[other, a, b]);
        assert_eq!(tree.parent_of(a).unwrap(), None);
        assert_consistent(&tree);
    }

    fn log_destroy(cx: &mut DestroyCx<'_, Vec<WidgetId>, u32>) {
        *cx.data() += 1;
        let id = cx.widget();
        cx.renderer().push(id);
    }

    #[test]
    fn destroy_with_children_runs_callbacks_post_order() {
        let mut tree: WidgetTree<Vec<WidgetId>, u32> = WidgetTree::new();
        let spec = |n| {
            WidgetSpec::new(WidgetKind::Custom(n), Rect::new(0, 0, 1, 1), n).with_destroy(log_destroy)
        };
        // root -> [a -> [c, d], b]
        let root = tree.create(None, spec(0)).unwrap();
        let a = tree.create(Some(root), spec(1)).unwrap();
        let b = tree.create(Some(root), spec(2)).unwrap();
        let c = tree.create(Some(a), spec(3)).unwrap();
        let d = tree.create(Some(a), spec(4)).unwrap();

        let mut log = Vec::new();
        let destroyed = tree.destroy(root, true, &mut log).unwrap();

        assert_eq!(log, [c, d, a, b, root]);
        let returned: Vec<_> = destroyed.iter().map(|d| (d.widget, d.kind, d.data)).collect();
        assert_eq!(
            returned,
            vec![
                (c, WidgetKind::Custom(3), 4),
                (d, WidgetKind::Custom(4), 5),
                (a, WidgetKind::Custom(1), 2),
                (b, WidgetKind::Custom(2), 3),
                (root, WidgetKind::Custom(0), 1),
            ],
            "payloads come back after the callback touched them"
        );
        assert!(tree.is_empty());
        assert!(tree.top_levels().is_empty());
    }

    #[test]
    fn destroy_without_children_runs_only_own_callback() {
        let mut tree: WidgetTree<Vec<WidgetId>, u32> = WidgetTree::new();
        let spec = |n| {
            WidgetSpec::new(WidgetKind::Custom(n), Rect::new(0, 0, 1, 1), n).with_destroy(log_destroy)
        };
        let root = tree.create(None, spec(0)).unwrap();
        let a = tree.create(Some(root), spec(1)).unwrap();
        let b = tree.create(Some(a), spec(2)).unwrap();
        let c = tree.create(Some(b), spec(3)).unwrap();

        let mut log = Vec::new();
        let destroyed = tree.destroy(a, false, &mut log).unwrap();

        assert_eq!(log, [a]);
        assert_eq!(destroyed.len(), 1);
        assert_eq!(destroyed[0].data, 2);
        assert_eq!(tree.data(b).unwrap(), &2, "promoted payloads are untouched");
        assert_eq!(tree.data(c).unwrap(), &3);
        assert_eq!(tree.children_of(root).unwrap(), &[b]);
        assert_consistent(&tree);
    }

    #[test]
    fn destroyed_subtree_slots_are_all_reused() {
        let mut tree = tree::<()>();
        let root = tree.create(None, frame(0, 0, 1, 1)).unwrap();
        let a = tree.create(Some(root), frame(0, 0, 1, 1)).unwrap();
        let _a1 = tree.create(Some(a), frame(0, 0, 1, 1)).unwrap();
        let _a2 = tree.create(Some(a), frame(0, 0, 1, 1)).unwrap();
        let slots = tree.nodes.len();

        let _ = tree.destroy(a, true, &mut ()).unwrap();
        assert_eq!(tree.free_list.len(), 3);

        for _ in 0..3 {
            let _ = tree.create(Some(root), frame(0, 0, 1, 1)).unwrap();
        }
        assert!(tree.free_list.is_empty());
        assert_eq!(tree.nodes.len(), slots, "no slot growth while the free list has room");
        assert_eq!(tree.len(), 4);
        assert_consistent(&tree);
    }

    #[test]
    fn destroy_subtree_shrinks_former_parent() {
        let mut tree = tree::<()>();
        let root = tree.create(None, frame(0, 0, 10, 10)).unwrap();
        let a = tree.create(Some(root), frame(0, 0, 50, 50)).unwrap();
        let _a1 = tree.create(Some(a), frame(0, 0, 80, 80)).unwrap();
        assert_eq!(tree.composed_geometry(root).unwrap(), Rect::new(0, 0, 80, 80));

        let destroyed = tree.destroy(a, true, &mut ()).unwrap();
        assert_eq!(destroyed.len(), 2);
        assert_eq!(tree.composed_geometry(root).unwrap(), Rect::new(0, 0, 10, 10));
        assert_consistent(&tree);
    }

    #[test]
    fn stale_handles_are_reported() {
        let mut tree = tree::<()>();
        let w = tree.create(None, frame(0, 0, 1, 1)).unwrap();
        let _ = tree.destroy(w, true, &mut ()).unwrap();

        let err = TreeError::InvalidWidget(w);
        assert_eq!(tree.destroy(w, true, &mut ()).unwrap_err(), err);
        assert_eq!(tree.geometry(w), Err(err.clone()));
        assert_eq!(tree.set_geometry(w, Rect::ZERO), Err(err.clone()));
        assert_eq!(tree.reparent(w, None), Err(err.clone()));
        assert_eq!(tree.block_events(w, true), Err(err.clone()));
        assert!(tree.create(Some(w), frame(0, 0, 1, 1)).is_err());
        assert_eq!(tree.next_depth_first(w), None);
    }

    #[test]
    fn liveness_destroy_reuse() {
        let mut tree = tree::<()>();
        let root = tree.create(None, frame(0, 0, 1, 1)).unwrap();
        let a = tree.create(Some(root), frame(0, 0, 1, 1)).unwrap();
        let _ = tree.destroy(a, true, &mut ()).unwrap();

        let b = tree.create(Some(root), frame(0, 0, 1, 1)).unwrap();
        assert!(tree.is_alive(b));
        assert!(!tree.is_alive(a));
        if a.idx() == b.idx() {
            assert!(b.generation() > a.generation(), "generation must increase on reuse");
        }
    }

    #[test]
    fn flags_toggle_independently() {
        let mut tree = tree::<()>();
        let w = tree.create(None, frame(0, 0, 1, 1)).unwrap();

        tree.block_events(w, true).unwrap();
        tree.set_hidden(w, true).unwrap();
        assert_eq!(tree.flags(w).unwrap(), WidgetFlags::BLOCKED | WidgetFlags::HIDDEN);

        tree.block_events(w, false).unwrap();
        assert!(!tree.is_blocked(w).unwrap());
        assert!(tree.is_hidden(w).unwrap());
        assert_eq!(tree.composed_geometry(w).unwrap(), Rect::new(0, 0, 1, 1));
    }

    #[test]
    fn early_exit_propagation_agrees_with_full_propagation() {
        let config = TreeConfig::new().with_propagation(Propagation::UntilUnchanged);
        let mut lazy: WidgetTree<()> = WidgetTree::with_config(config);
        let mut eager = tree::<()>();

        for tree in [&mut lazy, &mut eager] {
            let root = tree.create(None, frame(0, 0, 100, 100)).unwrap();
            let a = tree.create(Some(root), frame(10, 10, 20, 20)).unwrap();
            let b = tree.create(Some(a), frame(5, 5, 5, 5)).unwrap();
            let c = tree.create(Some(root), frame(50, 50, 10, 10)).unwrap();
            // Inside every ancestor's bound: the walk may stop early.
            tree.set_geometry(b, Rect::new(1, 1, 2, 2)).unwrap();
            // Outside: every ancestor grows.
            tree.set_geometry(b, Rect::new(1, 1, 200, 2)).unwrap();
            tree.reparent(b, Some(c)).unwrap();
            let _ = tree.destroy(c, false, &mut ()).unwrap();
            assert_consistent(&*tree);
        }

        let roots = (lazy.top_levels()[0], eager.top_levels()[0]);
        assert_eq!(
            lazy.composed_geometry(roots.0).unwrap(),
            eager.composed_geometry(roots.1).unwrap()
        );
    }

    #[test]
    fn depth_first_traversal_spans_top_levels() {
        let mut tree = tree::<()>();
        // first -> [a -> [c], b]; second
        let first = tree.create(None, frame(0, 0, 1, 1)).unwrap();
        let a = tree.create(Some(first), frame(0, 0, 1, 1)).unwrap();
        let b = tree.create(Some(first), frame(0, 0, 1, 1)).unwrap();
        let c = tree.create(Some(a), frame(0, 0, 1, 1)).unwrap();
        let second = tree.create(None, frame(0, 0, 1, 1)).unwrap();

        let mut forward = vec![first];
        while let Some(next) = tree.next_depth_first(*forward.last().unwrap()) {
            forward.push(next);
        }
        assert_eq!(forward, [first, a, c, b, second]);

        let mut backward = vec![second];
        while let Some(prev) = tree.prev_depth_first(*backward.last().unwrap()) {
            backward.push(prev);
        }
        assert_eq!(backward, [second, b, c, a, first]);
    }
}
