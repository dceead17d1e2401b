// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Runnable demos for `trellis_widget_tree`. See the `examples/` directory.
