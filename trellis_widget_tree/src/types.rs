// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the widget tree: handles, kinds, flags, and configuration.

use core::sync::atomic::{AtomicU32, Ordering};

/// Identifier of a [`Gui`](crate::Gui) instance.
///
/// Every widget handle records the context it was created in, so a handle
/// from one GUI is never mistaken for a live widget of another.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct GuiId(u32);

static NEXT_GUI_ID: AtomicU32 = AtomicU32::new(1);

impl GuiId {
    pub(crate) fn next() -> Self {
        Self(NEXT_GUI_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw value, for logging.
    pub const fn get(self) -> u32 {
        self.0
    }
}

/// Handle of a widget (generational, scoped to one [`GuiId`]).
///
/// Handles are `Copy` and never dangle: once the widget is destroyed the
/// handle is reported as invalid, even if its slot gets reused.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct WidgetId {
    idx: u32,
    generation: u32,
    gui: GuiId,
}

impl WidgetId {
    pub(crate) const fn new(idx: u32, generation: u32, gui: GuiId) -> Self {
        Self {
            idx,
            generation,
            gui,
        }
    }

    pub(crate) const fn idx(self) -> usize {
        self.idx as usize
    }

    pub(crate) const fn generation(self) -> u32 {
        self.generation
    }

    /// The GUI this widget was created in.
    pub const fn gui(self) -> GuiId {
        self.gui
    }
}

/// Kind tag of a widget.
///
/// Behavior comes from the paint and destroy callbacks chosen per instance,
/// not from the tag. The tag is there for embedders that need to tell widgets
/// apart, and it maps onto a raw numeric space in which everything from
/// [`WidgetKind::CUSTOM_BASE`] upward is reserved for user-defined kinds.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum WidgetKind {
    /// No particular kind.
    #[default]
    None,
    /// Framed container.
    Frame,
    /// Text label.
    Label,
    /// Push button.
    Button,
    /// User-defined kind; the value is the offset from [`WidgetKind::CUSTOM_BASE`].
    ///
    /// Offsets above [`WidgetKind::CUSTOM_MAX`] have no raw tag.
    Custom(u32),
}

impl WidgetKind {
    /// First raw value of the user-defined range.
    pub const CUSTOM_BASE: u32 = 0x10_0000;

    /// Largest custom offset that still fits the raw tag space.
    pub const CUSTOM_MAX: u32 = u32::MAX - Self::CUSTOM_BASE;

    /// Raw numeric tag, or `None` for a custom offset above [`WidgetKind::CUSTOM_MAX`].
    pub const fn to_raw(self) -> Option<u32> {
        match self {
            Self::None => Some(0),
            Self::Frame => Some(1),
            Self::Label => Some(2),
            Self::Button => Some(3),
            Self::Custom(n) => Self::CUSTOM_BASE.checked_add(n),
        }
    }

    /// Decode a raw tag. Values between the built-ins and the custom range are
    /// not assigned and yield `None`.
    pub const fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            0 => Some(Self::None),
            1 => Some(Self::Frame),
            2 => Some(Self::Label),
            3 => Some(Self::Button),
            r if r >= Self::CUSTOM_BASE => Some(Self::Custom(r - Self::CUSTOM_BASE)),
            _ => None,
        }
    }

    /// Whether this is one of the user-defined kinds.
    pub const fn is_custom(self) -> bool {
        matches!(self, Self::Custom(_))
    }
}

bitflags::bitflags! {
    /// Per-widget state flags.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct WidgetFlags: u8 {
        /// The widget and its subtree are skipped by paint traversal.
        const HIDDEN  = 0b0000_0001;
        /// The input router should not deliver events to this widget.
        /// Paint and geometry ignore this flag.
        const BLOCKED = 0b0000_0010;
    }
}

/// How far composed-geometry recomputation walks after a change.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Propagation {
    /// Rebuild every ancestor up to the top-level widget.
    #[default]
    ToRoot,
    /// Stop at the first ancestor whose rebuilt composed rectangle matches the
    /// cached one. Ancestors above it only depend on it, so they are unchanged too.
    UntilUnchanged,
}

/// Runtime configuration of a widget tree.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TreeConfig {
    /// Recomputation policy for composed geometry.
    pub propagation: Propagation,
}

impl TreeConfig {
    /// Default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use the given propagation policy.
    #[must_use]
    pub fn with_propagation(mut self, propagation: Propagation) -> Self {
        self.propagation = propagation;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_raw_round_trip_covers_custom_range() {
        assert_eq!(WidgetKind::Custom(0).to_raw(), Some(0x10_0000));
        assert_eq!(WidgetKind::from_raw(0x10_0014), Some(WidgetKind::Custom(20)));
        assert_eq!(WidgetKind::from_raw(3), Some(WidgetKind::Button));
        assert_eq!(WidgetKind::from_raw(4), None, "gap below custom range is unassigned");
        assert!(WidgetKind::Custom(7).is_custom());
        assert!(!WidgetKind::Frame.is_custom());
    }

    #[test]
    fn custom_offsets_past_the_raw_space_have_no_tag() {
        let last = WidgetKind::Custom(WidgetKind::CUSTOM_MAX);
        assert_eq!(last.to_raw(), Some(u32::MAX));
        assert_eq!(last.to_raw().and_then(WidgetKind::from_raw), Some(last));

        assert_eq!(WidgetKind::Custom(WidgetKind::CUSTOM_MAX + 1).to_raw(), None);
        assert_eq!(WidgetKind::Custom(u32::MAX).to_raw(), None);
    }

    #[test]
    fn gui_ids_are_unique() {
        let a = GuiId::next();
        let b = GuiId::next();
        assert_ne!(a, b);
    }

    #[test]
    fn default_flags_are_visible_and_unblocked() {
        let flags = WidgetFlags::default();
        assert!(!flags.contains(WidgetFlags::HIDDEN));
        assert!(!flags.contains(WidgetFlags::BLOCKED));
    }
}
