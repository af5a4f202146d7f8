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

//! Named publish/subscribe events.
//!
//! Event types live in a shared [`EventTypeRegistry`] that every
//! [`EventBus`] instance resolves against. The registry carries a revision
//! counter so that bus instances created before a type was declared pick it
//! up lazily, without rebuilding their listener maps on every call.

pub mod bus;
pub mod data;
pub mod error;

pub use bus::{Callback, Delivery, EventBus, RegisterOutcome};
pub use data::{DispatchReport, EventData, PluginNotice, StepInfo, TickInfo};
pub use error::BusError;

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Per-step simulation update.
pub const FRAME: &str = "frame";
/// Per-second telemetry publication.
pub const STATS: &str = "stats";
/// One refresh signal was observed and at least one step ran.
pub const TICK: &str = "tick";
/// One-shot lifecycle milestone: the scheduler came up.
pub const BOOT: &str = "boot";
/// One-shot lifecycle milestone: the runtime is ready for frames.
pub const READY: &str = "ready";
/// Internal meta-event emitted after every delivery.
pub const META_DISPATCH: &str = "dispatch";
/// Internal no-op type; dispatching it never touches the registry.
pub const NOOP: &str = "noop";
/// Internal notification: a plugin was installed onto a namespace slot.
pub const PLUGIN_ADDED: &str = "plugin-added";
/// Internal notification: a plugin replaced an occupied namespace slot.
pub const PLUGIN_OVERWRITTEN: &str = "plugin-overwritten";

/// Visibility of an event type.
///
/// Public types are the API surface applications subscribe to by name.
/// Internal types back runtime machinery; an unknown public name falls back
/// to the internal namespace during resolution, which is how the runtime's
/// own types stay reachable without polluting the public namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventScope {
    /// Application-facing event types.
    Public,
    /// Runtime-internal event types, also the home of late-declared types.
    Internal,
}

/// A fully resolved event type: scope plus name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeKey {
    /// The namespace the type was resolved in.
    pub scope: EventScope,
    /// The declared type name.
    pub name: String,
}

impl TypeKey {
    fn new(scope: EventScope, name: &str) -> Self {
        Self {
            scope,
            name: name.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
struct TypeInfo {
    one_shot: bool,
    satisfied: bool,
}

#[derive(Debug, Default)]
struct TypeTable {
    public: HashMap<String, TypeInfo>,
    internal: HashMap<String, TypeInfo>,
    revision: u64,
}

/// Shared table of declared event types.
///
/// Cloning the registry clones a handle; all clones observe the same set of
/// types and the same revision counter. [`EventBus`] instances compare their
/// cached revision against [`revision`](Self::revision) before every public
/// call and lazily materialize listener maps for newly declared types.
#[derive(Debug, Clone)]
pub struct EventTypeRegistry {
    table: Rc<RefCell<TypeTable>>,
}

impl EventTypeRegistry {
    /// Creates a registry seeded with the built-in runtime types.
    pub fn new() -> Self {
        let mut table = TypeTable::default();
        for name in [FRAME, STATS, TICK] {
            table.public.insert(
                name.to_string(),
                TypeInfo {
                    one_shot: false,
                    satisfied: false,
                },
            );
        }
        for name in [BOOT, READY] {
            table.public.insert(
                name.to_string(),
                TypeInfo {
                    one_shot: true,
                    satisfied: false,
                },
            );
        }
        for name in [META_DISPATCH, NOOP, PLUGIN_ADDED, PLUGIN_OVERWRITTEN] {
            table.internal.insert(
                name.to_string(),
                TypeInfo {
                    one_shot: false,
                    satisfied: false,
                },
            );
        }
        Self {
            table: Rc::new(RefCell::new(table)),
        }
    }

    /// Declares a new event type at runtime.
    ///
    /// Late-declared types land in the internal namespace, reachable through
    /// the resolution fallback. Fails with [`BusError::TypeExists`] if the
    /// name is already taken in either namespace.
    pub fn declare(&self, name: &str) -> Result<(), BusError> {
        self.declare_impl(name, false)
    }

    /// Declares a new one-shot event type.
    ///
    /// A one-shot type remembers that it fired; registering on it afterwards
    /// invokes the callback immediately instead of storing it.
    pub fn declare_one_shot(&self, name: &str) -> Result<(), BusError> {
        self.declare_impl(name, true)
    }

    fn declare_impl(&self, name: &str, one_shot: bool) -> Result<(), BusError> {
        let mut table = self.table.borrow_mut();
        if table.public.contains_key(name) || table.internal.contains_key(name) {
            return Err(BusError::TypeExists {
                name: name.to_string(),
            });
        }
        table.internal.insert(
            name.to_string(),
            TypeInfo {
                one_shot,
                satisfied: false,
            },
        );
        table.revision += 1;
        log::info!("Event type '{name}' declared (revision {})", table.revision);
        Ok(())
    }

    /// Resolves a name to a type key: public namespace first, then internal.
    pub fn resolve(&self, name: &str) -> Option<TypeKey> {
        let table = self.table.borrow();
        if table.public.contains_key(name) {
            Some(TypeKey::new(EventScope::Public, name))
        } else if table.internal.contains_key(name) {
            Some(TypeKey::new(EventScope::Internal, name))
        } else {
            None
        }
    }

    /// Current revision of the declared-type set.
    pub fn revision(&self) -> u64 {
        self.table.borrow().revision
    }

    /// All declared type keys, public and internal.
    pub fn keys(&self) -> Vec<TypeKey> {
        let table = self.table.borrow();
        table
            .public
            .keys()
            .map(|n| TypeKey::new(EventScope::Public, n))
            .chain(
                table
                    .internal
                    .keys()
                    .map(|n| TypeKey::new(EventScope::Internal, n)),
            )
            .collect()
    }

    /// All declared type names, sorted, public before internal.
    pub fn type_names(&self) -> Vec<String> {
        let table = self.table.borrow();
        let mut public: Vec<String> = table.public.keys().cloned().collect();
        let mut internal: Vec<String> = table.internal.keys().cloned().collect();
        public.sort();
        internal.sort();
        public.extend(internal);
        public
    }

    fn with_info<R>(&self, key: &TypeKey, f: impl FnOnce(&TypeInfo) -> R) -> Option<R> {
        let table = self.table.borrow();
        let map = match key.scope {
            EventScope::Public => &table.public,
            EventScope::Internal => &table.internal,
        };
        map.get(&key.name).map(f)
    }

    pub(crate) fn is_one_shot(&self, key: &TypeKey) -> bool {
        self.with_info(key, |info| info.one_shot).unwrap_or(false)
    }

    pub(crate) fn is_satisfied(&self, key: &TypeKey) -> bool {
        self.with_info(key, |info| info.satisfied).unwrap_or(false)
    }

    pub(crate) fn mark_satisfied(&self, key: &TypeKey) {
        let mut table = self.table.borrow_mut();
        let map = match key.scope {
            EventScope::Public => &mut table.public,
            EventScope::Internal => &mut table.internal,
        };
        if let Some(info) = map.get_mut(&key.name) {
            if info.one_shot {
                info.satisfied = true;
            }
        }
    }
}

impl Default for EventTypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}
