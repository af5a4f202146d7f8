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

//! Dotted-path namespace of callable plugin slots.
//!
//! Installation resolves paths like `tools.camera.shake` over an explicit
//! tree of named slots, with typed results for every branch, so the
//! conflict handling in the plugin host is exhaustive instead of relying on
//! sentinel values.

use crate::plugin::registry::PluginFn;
use std::collections::HashMap;

/// A namespace entry: either a nested namespace or an installed callable.
pub enum Slot {
    /// A nested namespace node.
    Node(Namespace),
    /// An installed plugin function.
    Value(PluginFn),
}

/// Result of probing a dotted path without modifying the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathLookup {
    /// The full path resolves to an existing slot.
    Found,
    /// An intermediate segment is occupied by a value; the path can neither
    /// resolve nor be created.
    Missing,
    /// The final slot is free and installation would create it (creating
    /// intermediate nodes as needed).
    WouldCreate,
}

/// Result of an installation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallOutcome {
    /// The value was installed into a previously free slot.
    Added,
    /// The slot was occupied and `overwrite` was requested; the old value
    /// was replaced.
    Overwritten,
    /// The slot was occupied and `overwrite` was not requested; nothing
    /// changed.
    Occupied,
    /// The path was empty, had an empty segment, or ran through a slot
    /// occupied by a value.
    InvalidPath,
}

/// A tree of named slots that plugins install themselves into.
#[derive(Default)]
pub struct Namespace {
    slots: HashMap<String, Slot>,
}

impl Namespace {
    /// Creates an empty namespace.
    pub fn new() -> Self {
        Self::default()
    }

    /// Probes a dotted path without modifying the tree.
    pub fn lookup(&self, path: &str) -> PathLookup {
        let segments: Vec<&str> = path.split('.').collect();
        if segments.iter().any(|s| s.is_empty()) {
            return PathLookup::Missing;
        }

        let mut node = self;
        for (i, segment) in segments.iter().enumerate() {
            let last = i + 1 == segments.len();
            match node.slots.get(*segment) {
                Some(_) if last => return PathLookup::Found,
                Some(Slot::Node(next)) => node = next,
                Some(Slot::Value(_)) => return PathLookup::Missing,
                None => return PathLookup::WouldCreate,
            }
        }
        PathLookup::Found
    }

    /// Installs `value` at the dotted path, creating intermediate nodes.
    pub fn install(&mut self, path: &str, value: PluginFn, overwrite: bool) -> InstallOutcome {
        let segments: Vec<&str> = path.split('.').collect();
        if segments.iter().any(|s| s.is_empty()) {
            return InstallOutcome::InvalidPath;
        }

        let mut node = self;
        for segment in &segments[..segments.len() - 1] {
            let slot = node
                .slots
                .entry((*segment).to_string())
                .or_insert_with(|| Slot::Node(Namespace::new()));
            match slot {
                Slot::Node(next) => node = next,
                Slot::Value(_) => return InstallOutcome::InvalidPath,
            }
        }

        let leaf = segments[segments.len() - 1].to_string();
        match node.slots.get(&leaf) {
            Some(_) if !overwrite => InstallOutcome::Occupied,
            Some(_) => {
                node.slots.insert(leaf, Slot::Value(value));
                InstallOutcome::Overwritten
            }
            None => {
                node.slots.insert(leaf, Slot::Value(value));
                InstallOutcome::Added
            }
        }
    }

    /// Returns the callable installed at the dotted path, if any.
    pub fn get(&self, path: &str) -> Option<PluginFn> {
        let mut node = self;
        let segments: Vec<&str> = path.split('.').collect();
        for (i, segment) in segments.iter().enumerate() {
            let last = i + 1 == segments.len();
            match node.slots.get(*segment)? {
                Slot::Value(f) if last => return Some(f.clone()),
                Slot::Node(next) if !last => node = next,
                _ => return None,
            }
        }
        None
    }
}
