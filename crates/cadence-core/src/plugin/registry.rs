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

//! The shared plugin table.

use crate::event::bus::Callback;
use crate::utils::naming;
use std::cell::RefCell;
use std::rc::Rc;

/// Reserved base for auto-generated plugin keys.
const AUTO_NAME_BASE: &str = "plugin";
/// Delimiter between a plugin key base and its numeric suffix.
const NAME_DELIMITER: char = '-';

/// A plugin callable; same shape as an event listener, so subscribing a
/// plugin to an event type is a cheap handle clone.
pub type PluginFn = Callback;

/// Requested installation of a plugin onto a namespace slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallSpec {
    /// Dotted path on the target namespace, e.g. `tools.shake`.
    pub path: String,
    /// Replace the slot if it is already occupied.
    pub overwrite: bool,
}

/// Optional wiring for a registered plugin.
#[derive(Debug, Clone, Default)]
pub struct PluginOptions {
    /// Event types the plugin function subscribes to.
    pub event_types: Vec<String>,
    /// Namespace installation request, if any.
    pub install: Option<InstallSpec>,
}

pub(crate) struct PluginEntry {
    pub name: String,
    pub func: PluginFn,
    pub options: PluginOptions,
}

#[derive(Default)]
struct HubState {
    entries: Vec<PluginEntry>,
    revision: u64,
}

/// Shared registry of plugins.
///
/// Cloning the hub clones a handle. Registration bumps a revision counter,
/// parallel to the event-type revision, so per-instance
/// [`PluginHost`](crate::plugin::PluginHost) caches know when to
/// re-synchronize without scanning the table every step.
#[derive(Clone, Default)]
pub struct PluginHub {
    state: Rc<RefCell<HubState>>,
}

impl PluginHub {
    /// Creates an empty hub.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a plugin and returns its assigned key.
    ///
    /// An empty or colliding name degrades to auto-naming under the reserved
    /// `plugin` base; registration itself never fails.
    pub fn register(&self, func: PluginFn, name: Option<&str>, options: PluginOptions) -> String {
        let mut state = self.state.borrow_mut();
        let existing: Vec<&str> = state.entries.iter().map(|e| e.name.as_str()).collect();
        let assigned = match name {
            Some(n) if !n.is_empty() => {
                if existing.contains(&n) {
                    let renamed = naming::next_name(existing, n, NAME_DELIMITER);
                    log::warn!("Plugin name '{n}' is taken; registering as '{renamed}'");
                    renamed
                } else {
                    n.to_string()
                }
            }
            _ => naming::next_name(existing, AUTO_NAME_BASE, NAME_DELIMITER),
        };

        state.entries.push(PluginEntry {
            name: assigned.clone(),
            func,
            options,
        });
        state.revision += 1;
        log::info!("Plugin '{assigned}' registered (revision {})", state.revision);
        assigned
    }

    /// Returns true if a plugin is registered under `name`. Pure lookup.
    pub fn is_registered(&self, name: &str) -> bool {
        self.state
            .borrow()
            .entries
            .iter()
            .any(|e| e.name == name)
    }

    /// Number of registered plugins.
    pub fn len(&self) -> usize {
        self.state.borrow().entries.len()
    }

    /// Returns true if no plugins are registered.
    pub fn is_empty(&self) -> bool {
        self.state.borrow().entries.is_empty()
    }

    pub(crate) fn revision(&self) -> u64 {
        self.state.borrow().revision
    }

    /// Snapshot of the table in registration order.
    pub(crate) fn snapshot(&self) -> Vec<(String, PluginFn, PluginOptions)> {
        self.state
            .borrow()
            .entries
            .iter()
            .map(|e| (e.name.clone(), e.func.clone(), e.options.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::bus::callback;

    fn noop_fn() -> PluginFn {
        callback(|_| Ok(()))
    }

    #[test]
    fn register_assigns_requested_name() {
        let hub = PluginHub::new();
        let name = hub.register(noop_fn(), Some("shake"), PluginOptions::default());
        assert_eq!(name, "shake");
        assert!(hub.is_registered("shake"));
        assert!(!hub.is_registered("other"));
    }

    #[test]
    fn unnamed_plugins_are_auto_named() {
        let hub = PluginHub::new();
        assert_eq!(hub.register(noop_fn(), None, PluginOptions::default()), "plugin-0");
        assert_eq!(hub.register(noop_fn(), Some(""), PluginOptions::default()), "plugin-1");
        assert_eq!(hub.len(), 2);
    }

    #[test]
    fn colliding_name_degrades_to_auto_naming() {
        let hub = PluginHub::new();
        hub.register(noop_fn(), Some("shake"), PluginOptions::default());
        let second = hub.register(noop_fn(), Some("shake"), PluginOptions::default());
        assert_eq!(second, "shake-0");
        assert!(hub.is_registered("shake"));
        assert!(hub.is_registered("shake-0"));
    }

    #[test]
    fn revision_counts_registrations() {
        let hub = PluginHub::new();
        assert_eq!(hub.revision(), 0);
        hub.register(noop_fn(), None, PluginOptions::default());
        hub.register(noop_fn(), None, PluginOptions::default());
        assert_eq!(hub.revision(), 2);
    }

    #[test]
    fn clones_share_the_table() {
        let hub = PluginHub::new();
        let other = hub.clone();
        other.register(noop_fn(), Some("shared"), PluginOptions::default());
        assert!(hub.is_registered("shared"));
    }
}
