// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Plugin registration: external behavior wired into the event bus and
//! installed onto a namespace of callable slots.
//!
//! Conflicts here are deliberately non-fatal. A colliding plugin name is
//! auto-renamed, an occupied install slot is skipped with a warning, and a
//! duplicate event subscription degrades to a warning; no sub-action ever
//! aborts the registration that carries it.

pub mod host;
pub mod namespace;
pub mod registry;

pub use host::PluginHost;
pub use namespace::{InstallOutcome, Namespace, PathLookup, Slot};
pub use registry::{InstallSpec, PluginFn, PluginHub, PluginOptions};
