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

//! The event bus: named listeners, ordered delivery, fault isolation.

use crate::event::{self, BusError, EventData, EventScope, EventTypeRegistry, TypeKey};
use crate::event::data::DispatchReport;
use crate::utils::naming;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

/// Reserved base for auto-generated listener names.
const AUTO_NAME_BASE: &str = "anon";
/// Delimiter between a name base and its numeric suffix.
const NAME_DELIMITER: char = '-';

/// A shared, re-entrant listener callable.
///
/// Callbacks report faults through `anyhow::Result`; the dispatch boundary
/// logs the error and carries on with the remaining listeners.
pub type Callback = Rc<RefCell<dyn FnMut(&EventData) -> anyhow::Result<()>>>;

/// Wraps a closure into a [`Callback`] handle.
///
/// Useful when the same callable must be shared, e.g. a plugin function
/// subscribed to several event types.
pub fn callback<F>(f: F) -> Callback
where
    F: FnMut(&EventData) -> anyhow::Result<()> + 'static,
{
    Rc::new(RefCell::new(f))
}

/// Result of a successful registration call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegisterOutcome {
    /// The listener was stored under this (possibly auto-generated) name.
    Registered(String),
    /// The type is one-shot and already fired; the callback was invoked
    /// synchronously once and was not stored.
    AlreadySatisfied,
}

/// Result of a dispatch call on a known type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// This many listeners were invoked.
    Delivered(usize),
    /// The type is the designated no-op type; the registry was not touched.
    Suppressed,
}

struct Listener {
    name: String,
    once: bool,
    callback: Callback,
}

/// One publish/subscribe instance.
///
/// Each bus owns its listener map but shares the declared-type table with
/// every other bus created from the same [`EventTypeRegistry`]. Before any
/// public operation the bus compares its cached revision against the table
/// and materializes empty listener lists for types declared since.
///
/// All methods take `&self`; the bus is single-threaded and uses interior
/// mutability so that listeners may re-enter it (register, unregister, even
/// dispatch) from inside a delivery pass.
pub struct EventBus {
    types: EventTypeRegistry,
    listeners: RefCell<HashMap<TypeKey, Vec<Listener>>>,
    synced_revision: Cell<u64>,
    meta_guard: Cell<bool>,
}

impl EventBus {
    /// Creates a bus instance resolving against the given type registry.
    pub fn new(types: EventTypeRegistry) -> Self {
        let bus = Self {
            types,
            listeners: RefCell::new(HashMap::new()),
            synced_revision: Cell::new(0),
            meta_guard: Cell::new(false),
        };
        bus.materialize_types();
        log::info!("EventBus initialized.");
        bus
    }

    /// The shared type registry this bus resolves against.
    pub fn types(&self) -> &EventTypeRegistry {
        &self.types
    }

    /// Registers a callback under an auto-generated name.
    pub fn register<F>(&self, ty: &str, f: F) -> Result<RegisterOutcome, BusError>
    where
        F: FnMut(&EventData) -> anyhow::Result<()> + 'static,
    {
        self.register_callback(ty, None, false, callback(f))
    }

    /// Registers a callback under a caller-supplied name.
    ///
    /// If the name is already taken, a fresh numeric suffix is derived from
    /// it instead of failing.
    pub fn register_named<F>(
        &self,
        ty: &str,
        name: &str,
        f: F,
    ) -> Result<RegisterOutcome, BusError>
    where
        F: FnMut(&EventData) -> anyhow::Result<()> + 'static,
    {
        self.register_callback(ty, Some(name), false, callback(f))
    }

    /// Registers a callback that is removed after its first invocation.
    pub fn register_once<F>(&self, ty: &str, f: F) -> Result<RegisterOutcome, BusError>
    where
        F: FnMut(&EventData) -> anyhow::Result<()> + 'static,
    {
        self.register_callback(ty, None, true, callback(f))
    }

    /// Registers a named once-listener.
    pub fn register_named_once<F>(
        &self,
        ty: &str,
        name: &str,
        f: F,
    ) -> Result<RegisterOutcome, BusError>
    where
        F: FnMut(&EventData) -> anyhow::Result<()> + 'static,
    {
        self.register_callback(ty, Some(name), true, callback(f))
    }

    /// Registers a pre-wrapped [`Callback`] handle.
    ///
    /// This is the primitive the other `register_*` methods delegate to; the
    /// plugin host uses it to subscribe one shared plugin function to
    /// several event types.
    pub fn register_callback(
        &self,
        ty: &str,
        name: Option<&str>,
        once: bool,
        cb: Callback,
    ) -> Result<RegisterOutcome, BusError> {
        self.sync_types();
        let key = self.resolve(ty)?;

        // Immediate-fire: a one-shot milestone that already passed still
        // reaches late subscribers, exactly once, right now.
        if self.types.is_one_shot(&key) && self.types.is_satisfied(&key) {
            if let Err(e) = (cb.borrow_mut())(&EventData::None) {
                log::error!("Late listener for '{}' failed on immediate fire: {e:#}", key.name);
            }
            return Ok(RegisterOutcome::AlreadySatisfied);
        }

        let assigned = {
            let map = self.listeners.borrow();
            let existing = map.get(&key);
            let names = existing
                .map(|list| list.iter().map(|l| l.name.as_str()).collect::<Vec<_>>())
                .unwrap_or_default();
            match name {
                Some(n) if !n.is_empty() => {
                    if names.contains(&n) {
                        naming::next_name(names, n, NAME_DELIMITER)
                    } else {
                        n.to_string()
                    }
                }
                _ => naming::next_name(names, AUTO_NAME_BASE, NAME_DELIMITER),
            }
        };

        self.listeners
            .borrow_mut()
            .entry(key)
            .or_default()
            .push(Listener {
                name: assigned.clone(),
                once,
                callback: cb,
            });
        Ok(RegisterOutcome::Registered(assigned))
    }

    /// Removes one listener by name, or every listener for the type.
    pub fn unregister(&self, ty: &str, name: Option<&str>) -> Result<(), BusError> {
        self.sync_types();
        let key = self.resolve(ty)?;
        let mut map = self.listeners.borrow_mut();
        let list = map.entry(key).or_default();
        match name {
            None => {
                list.clear();
                Ok(())
            }
            Some(n) => {
                let before = list.len();
                list.retain(|l| l.name != n);
                if list.len() == before {
                    Err(BusError::UnknownListener {
                        event: ty.to_string(),
                        name: n.to_string(),
                    })
                } else {
                    Ok(())
                }
            }
        }
    }

    /// Delivers `data` to every live listener of `ty`, in registration order.
    ///
    /// A faulting listener is logged and isolated; it neither stops delivery
    /// to its siblings nor propagates to the caller. Once-listeners are
    /// removed within the same pass. After delivery a `dispatch` meta-event
    /// is emitted, except while a meta-event is already being delivered and
    /// except for the suppressed `noop` type.
    pub fn dispatch(&self, ty: &str, data: &EventData) -> Result<Delivery, BusError> {
        self.sync_types();
        let key = self.resolve(ty)?;

        if key.scope == EventScope::Internal && key.name == event::NOOP {
            return Ok(Delivery::Suppressed);
        }

        // A one-shot type fires at most once; remember that it did.
        self.types.mark_satisfied(&key);

        // Snapshot the listener list so callbacks may mutate it freely.
        let snapshot: Vec<(String, bool, Callback)> = {
            let map = self.listeners.borrow();
            map.get(&key)
                .map(|list| {
                    list.iter()
                        .map(|l| (l.name.clone(), l.once, Rc::clone(&l.callback)))
                        .collect()
                })
                .unwrap_or_default()
        };

        let mut delivered = 0usize;
        for (name, once, cb) in snapshot {
            // A callback earlier in this pass may have removed this one.
            let alive = {
                let map = self.listeners.borrow();
                map.get(&key).is_some_and(|list| {
                    list.iter()
                        .any(|l| l.name == name && Rc::ptr_eq(&l.callback, &cb))
                })
            };
            if !alive {
                continue;
            }

            if let Err(e) = (cb.borrow_mut())(data) {
                log::error!("Listener '{}' for event '{}' failed: {e:#}", name, key.name);
            }
            delivered += 1;

            if once {
                let mut map = self.listeners.borrow_mut();
                if let Some(list) = map.get_mut(&key) {
                    list.retain(|l| !(l.name == name && Rc::ptr_eq(&l.callback, &cb)));
                }
            }
        }

        let is_meta = key.scope == EventScope::Internal && key.name == event::META_DISPATCH;
        if !is_meta && !self.meta_guard.get() {
            self.meta_guard.set(true);
            let report = EventData::Report(DispatchReport {
                event: key.name.clone(),
                args: Box::new(data.clone()),
                delivered,
            });
            if let Err(e) = self.dispatch(event::META_DISPATCH, &report) {
                log::error!("Meta-dispatch failed: {e}");
            }
            self.meta_guard.set(false);
        }

        Ok(Delivery::Delivered(delivered))
    }

    /// Names of the live listeners for a type, in registration order.
    pub fn listener_names(&self, ty: &str) -> Result<Vec<String>, BusError> {
        self.sync_types();
        let key = self.resolve(ty)?;
        let map = self.listeners.borrow();
        Ok(map
            .get(&key)
            .map(|list| list.iter().map(|l| l.name.clone()).collect())
            .unwrap_or_default())
    }

    /// All declared type names known to the shared registry.
    pub fn type_names(&self) -> Vec<String> {
        self.types.type_names()
    }

    fn resolve(&self, ty: &str) -> Result<TypeKey, BusError> {
        self.types.resolve(ty).ok_or_else(|| BusError::UnknownType {
            name: ty.to_string(),
        })
    }

    /// Lazily re-synchronizes the listener map with the shared type table.
    fn sync_types(&self) {
        if self.synced_revision.get() == self.types.revision() {
            return;
        }
        self.materialize_types();
    }

    fn materialize_types(&self) {
        let mut map = self.listeners.borrow_mut();
        for key in self.types.keys() {
            map.entry(key).or_default();
        }
        self.synced_revision.set(self.types.revision());
    }
}
