// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error type for tree operations.

use alloc::collections::TryReserveError;

use crate::types::WidgetId;

/// Result type alias for tree operations.
pub type Result<T> = core::result::Result<T, TreeError>;

/// Errors reported by tree operations.
///
/// A failed operation leaves the tree exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    /// The handle does not name a live widget of this GUI.
    #[error("widget handle {0:?} is stale or belongs to another GUI")]
    InvalidWidget(WidgetId),

    /// Reparenting would make a widget its own ancestor.
    #[error("cannot reparent {widget:?} under {parent:?}: the parent is inside its subtree")]
    Cycle {
        /// Widget being moved.
        widget: WidgetId,
        /// Requested new parent.
        parent: WidgetId,
    },

    /// Geometry with a negative width or height.
    #[error("negative widget size {width}x{height}")]
    NegativeSize {
        /// Requested width.
        width: i32,
        /// Requested height.
        height: i32,
    },

    /// Growing node storage or a child sequence failed.
    #[error("out of memory while growing widget storage")]
    OutOfMemory,
}

impl From<TryReserveError> for TreeError {
    fn from(_: TryReserveError) -> Self {
        Self::OutOfMemory
    }
}
