// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Integer rectangles and the two pure reductions the tree is built on.
//!
//! - [`absolute`] folds a chain of relative positions into origin space.
//! - [`compose_into`] folds a widget's own rectangle and its children's cached
//!   composed rectangles into the widget's composed rectangle.
//!
//! Both are `O(n)` in their input and never look further down the tree than
//! the slice of rectangles they are given.

/// A position and size in the backend's integer coordinate space.
///
/// The position is relative to the parent's origin (or to the coordinate
/// origin for top-level widgets) unless stated otherwise.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rect {
    /// Left edge.
    pub x: i32,
    /// Top edge.
    pub y: i32,
    /// Width. Never negative for geometry accepted by the tree.
    pub width: i32,
    /// Height. Never negative for geometry accepted by the tree.
    pub height: i32,
}

impl Rect {
    /// The empty rectangle at the origin.
    pub const ZERO: Self = Self::new(0, 0, 0, 0);

    /// Create a rectangle from position and size.
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Position as `(x, y)`.
    pub const fn position(self) -> (i32, i32) {
        (self.x, self.y)
    }

    /// Size as `(width, height)`.
    pub const fn size(self) -> (i32, i32) {
        (self.width, self.height)
    }

    /// Right edge (`x + width`).
    pub const fn right(self) -> i32 {
        self.x.saturating_add(self.width)
    }

    /// Bottom edge (`y + height`).
    pub const fn bottom(self) -> i32 {
        self.y.saturating_add(self.height)
    }

    /// `true` if either dimension is zero or negative.
    pub const fn is_empty(self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// `true` if either dimension is negative.
    pub const fn has_negative_size(self) -> bool {
        self.width < 0 || self.height < 0
    }

    /// Same size, position offset by `(dx, dy)`.
    #[must_use]
    pub const fn translate(self, dx: i32, dy: i32) -> Self {
        Self::new(
            self.x.saturating_add(dx),
            self.y.saturating_add(dy),
            self.width,
            self.height,
        )
    }

    /// Same size, new position.
    #[must_use]
    pub const fn with_position(self, x: i32, y: i32) -> Self {
        Self::new(x, y, self.width, self.height)
    }

    /// Whether `(px, py)` lies inside. The right and bottom edges are exclusive.
    pub const fn contains(self, px: i32, py: i32) -> bool {
        px >= self.x && py >= self.y && px < self.right() && py < self.bottom()
    }

    /// Convert to a [`kurbo::Rect`] (`x0, y0, x1, y1`) for kurbo-based renderers.
    pub fn to_kurbo(self) -> kurbo::Rect {
        kurbo::Rect::new(
            f64::from(self.x),
            f64::from(self.y),
            f64::from(self.right()),
            f64::from(self.bottom()),
        )
    }
}

impl From<Rect> for kurbo::Rect {
    fn from(r: Rect) -> Self {
        r.to_kurbo()
    }
}

/// Translate `own` into origin space by adding the position of every rectangle
/// in `ancestors`.
///
/// `ancestors` is the chain of relative rectangles from the direct parent up to
/// and including the top-level widget. The size of `own` is returned unchanged.
pub fn absolute<I>(own: Rect, ancestors: I) -> Rect
where
    I: IntoIterator<Item = Rect>,
{
    ancestors
        .into_iter()
        .fold(own, |acc, parent| acc.translate(parent.x, parent.y))
}

/// Bound `base` and every rectangle in `children`.
///
/// Each child rectangle is a composed rectangle whose position is relative to
/// `base`'s origin. The result keeps `base`'s position; its width is
/// `max(base.width, max(child.x + child.width))` and its height is computed the
/// same way on the other axis. Children that extend left of or above the origin
/// do not move the anchor.
pub fn compose_into<I>(base: Rect, children: I) -> Rect
where
    I: IntoIterator<Item = Rect>,
{
    let (width, height) = children
        .into_iter()
        .fold((base.width, base.height), |(w, h), child| {
            (w.max(child.right()), h.max(child.bottom()))
        });
    Rect::new(base.x, base.y, width, height)
}
