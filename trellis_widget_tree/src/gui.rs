// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The GUI context: owner of the renderer handle and of the widget tree.

use alloc::vec::Vec;

use crate::error::Result;
use crate::geometry::Rect;
use crate::tree::{Destroyed, WidgetSpec, WidgetTree};
use crate::types::{GuiId, TreeConfig, WidgetId};

/// A GUI instance.
///
/// `R` is the renderer handle. The tree never looks inside it; it is only
/// lent to paint and destroy callbacks. `D` is the per-widget payload type.
///
/// Most methods forward to the matching [`WidgetTree`] method; see there for
/// the geometry rules.
pub struct Gui<R, D = ()> {
    renderer: R,
    tree: WidgetTree<R, D>,
}

impl<R, D> core::fmt::Debug for Gui<R, D> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Gui")
            .field("tree", &self.tree)
            .finish_non_exhaustive()
    }
}

impl<R, D> Gui<R, D> {
    /// Create a GUI around `renderer` with the default [`TreeConfig`].
    pub fn new(renderer: R) -> Self {
        Self::with_config(renderer, TreeConfig::default())
    }

    /// Create a GUI around `renderer`.
    pub fn with_config(renderer: R, config: TreeConfig) -> Self {
        let tree = WidgetTree::with_config(config);
        tracing::debug!(gui = tree.gui().get(), ?config, "created gui");
        Self { renderer, tree }
    }

    /// Identifier carried by every widget handle of this GUI.
    pub fn id(&self) -> GuiId {
        self.tree.gui()
    }

    /// The renderer handle.
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// The renderer handle, mutably.
    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    /// The renderer of the GUI `id` belongs to.
    pub fn widget_renderer(&self, id: WidgetId) -> Result<&R> {
        self.tree.live(id)?;
        Ok(&self.renderer)
    }

    /// The GUI a live widget belongs to.
    pub fn gui_of(&self, id: WidgetId) -> Result<GuiId> {
        self.tree.live(id)?;
        Ok(id.gui())
    }

    /// Read access to the tree.
    pub fn tree(&self) -> &WidgetTree<R, D> {
        &self.tree
    }

    /// See [`WidgetTree::create`].
    pub fn create(&mut self, parent: Option<WidgetId>, spec: WidgetSpec<R, D>) -> Result<WidgetId> {
        self.tree.create(parent, spec)
    }

    /// See [`WidgetTree::reparent`].
    pub fn reparent(&mut self, id: WidgetId, new_parent: Option<WidgetId>) -> Result<()> {
        self.tree.reparent(id, new_parent)
    }

    /// See [`WidgetTree::destroy`]. Destroy callbacks get this GUI's renderer.
    pub fn destroy(&mut self, id: WidgetId, destroy_children: bool) -> Result<Vec<Destroyed<D>>> {
        self.tree.destroy(id, destroy_children, &mut self.renderer)
    }

    /// See [`WidgetTree::set_geometry`].
    pub fn set_geometry(&mut self, id: WidgetId, geometry: Rect) -> Result<()> {
        self.tree.set_geometry(id, geometry)
    }

    /// See [`WidgetTree::geometry`].
    pub fn geometry(&self, id: WidgetId) -> Result<Rect> {
        self.tree.geometry(id)
    }

    /// See [`WidgetTree::absolute_geometry`].
    pub fn absolute_geometry(&self, id: WidgetId) -> Result<Rect> {
        self.tree.absolute_geometry(id)
    }

    /// See [`WidgetTree::composed_geometry`].
    pub fn composed_geometry(&self, id: WidgetId) -> Result<Rect> {
        self.tree.composed_geometry(id)
    }

    /// See [`WidgetTree::parent_of`].
    pub fn parent_of(&self, id: WidgetId) -> Result<Option<WidgetId>> {
        self.tree.parent_of(id)
    }

    /// See [`WidgetTree::children_of`].
    pub fn children_of(&self, id: WidgetId) -> Result<&[WidgetId]> {
        self.tree.children_of(id)
    }

    /// See [`WidgetTree::data`].
    pub fn data(&self, id: WidgetId) -> Result<&D> {
        self.tree.data(id)
    }

    /// See [`WidgetTree::data_mut`].
    pub fn data_mut(&mut self, id: WidgetId) -> Result<&mut D> {
        self.tree.data_mut(id)
    }

    /// See [`WidgetTree::block_events`].
    pub fn block_events(&mut self, id: WidgetId, block: bool) -> Result<()> {
        self.tree.block_events(id, block)
    }

    /// See [`WidgetTree::is_blocked`].
    pub fn is_blocked(&self, id: WidgetId) -> Result<bool> {
        self.tree.is_blocked(id)
    }

    /// See [`WidgetTree::set_hidden`].
    pub fn set_hidden(&mut self, id: WidgetId, hidden: bool) -> Result<()> {
        self.tree.set_hidden(id, hidden)
    }

    /// See [`WidgetTree::is_hidden`].
    pub fn is_hidden(&self, id: WidgetId) -> Result<bool> {
        self.tree.is_hidden(id)
    }

    /// Paint `id` and its visible subtree. See [`WidgetTree::paint`].
    pub fn paint_widget(&mut self, id: WidgetId) -> Result<()> {
        self.tree.paint(id, &mut self.renderer)
    }

    /// Paint every top-level widget.
    pub fn paint(&mut self) {
        self.tree.paint_all(&mut self.renderer);
    }
}
