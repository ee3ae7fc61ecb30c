//! SPDX-FileCopyrightText: © 2025 Cory Parent <goedelsoup+orasi@goedelsoup.io>
//! SPDX-License-Identifier: Apache-2.0
//!

//! Schema registries
//!
//! Two scopes: a process-wide store seeded with the meta-schemas, and a
//! per-validation local store for anchors and embedded resources.

pub mod global;
pub mod local;

// Re-export main types for convenience
pub use global::SchemaRegistry;
pub use local::LocalRegistry;
